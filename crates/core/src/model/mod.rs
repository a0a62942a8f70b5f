mod completion;
pub mod content;
mod course;
mod ids;
pub mod lesson_content;

pub use ids::{CourseId, LessonId, ParseIdError, Username};

pub use completion::{
    ChapterWithCompletion, CompletedLessons, Completion, CompletionNode, CourseCompletion,
    LessonWithCompletion, compute_course_completion,
};
pub use content::{
    Chapter, ContentNode, CourseContent, Lesson, create_chapter, create_course_content,
    create_lesson, extract_lesson_ids, traverse_course_content,
};
pub use course::{Course, CourseError};
pub use lesson_content::{LessonContentError, LessonContentItem, LessonMediaType};
