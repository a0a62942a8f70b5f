use super::node::{Chapter, ContentNode, CourseContent, Lesson};

/// Assigns `chapter_number` and `lesson_number` to every node of a content tree.
///
/// Numbering is recomputed from scratch: whatever numbers the input carries
/// are discarded. Lessons are numbered `1..=N` in pre-order across the whole
/// tree. Chapters are numbered by their position among sibling chapters only,
/// prefixed with the parent chapter's number (`"2"`, `"2.1"`, `"2.1.3"`).
///
/// The input is consumed and a new tree is returned, so callers can never
/// observe a half-numbered tree through another handle.
#[must_use]
pub fn create_course_content(content: CourseContent) -> CourseContent {
    let (numbered, _) = number_siblings(content, "", 1);
    numbered
}

/// Numbers one sibling list and returns it with the next free lesson number.
fn number_siblings(
    siblings: CourseContent,
    parent_number: &str,
    mut next_lesson: u32,
) -> (CourseContent, u32) {
    let mut numbered = Vec::with_capacity(siblings.len());
    let mut chapter_position = 0_u32;

    for node in siblings {
        match node {
            ContentNode::Chapter(chapter) => {
                chapter_position += 1;
                let chapter_number = if parent_number.is_empty() {
                    chapter_position.to_string()
                } else {
                    format!("{parent_number}.{chapter_position}")
                };

                let (children, after) =
                    number_siblings(chapter.children, &chapter_number, next_lesson);
                next_lesson = after;

                numbered.push(ContentNode::Chapter(Chapter {
                    chapter_number,
                    children,
                    ..chapter
                }));
            }
            ContentNode::Lesson(lesson) => {
                numbered.push(ContentNode::Lesson(Lesson {
                    lesson_number: next_lesson,
                    ..lesson
                }));
                next_lesson += 1;
            }
        }
    }

    (numbered, next_lesson)
}
