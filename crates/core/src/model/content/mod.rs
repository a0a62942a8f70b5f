mod builder;
mod node;
mod traverse;

pub use builder::create_course_content;
pub use node::{Chapter, ContentNode, CourseContent, Lesson, create_chapter, create_lesson};
pub use traverse::{
    PreOrder, TreeNode, count_lessons, extract_lesson_ids, traverse_course_content,
};
