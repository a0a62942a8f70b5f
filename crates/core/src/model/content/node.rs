use serde::{Deserialize, Serialize};

use crate::model::ids::LessonId;

//
// ─── NODE TYPES ────────────────────────────────────────────────────────────────
//

/// The top-level siblings of a course, in display order.
pub type CourseContent = Vec<ContentNode>;

/// One node of a course content tree.
///
/// Serialized with a `type` discriminant (`"chapter"` / `"lesson"`) so the
/// stored JSON matches what the CMS and the persistence layer exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentNode {
    Chapter(Chapter),
    Lesson(Lesson),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Dot-separated chapter number, i.e. `1` or `1.1` or `1.1.1`.
    #[serde(rename = "chapterNr", alias = "chapterNumber", default)]
    pub chapter_number: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "content", default)]
    pub children: CourseContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    /// Position of the lesson in the whole course, starting at 1.
    #[serde(rename = "lessonNr", alias = "lessonNumber", default)]
    pub lesson_number: u32,
    #[serde(rename = "lessonId")]
    pub lesson_id: LessonId,
}

//
// ─── CONSTRUCTORS ──────────────────────────────────────────────────────────────
//

/// Creates an un-numbered chapter node.
///
/// The chapter number stays empty until the content passes through
/// [`create_course_content`](super::create_course_content).
#[must_use]
pub fn create_chapter(
    title: impl Into<String>,
    children: CourseContent,
    description: Option<String>,
) -> ContentNode {
    ContentNode::Chapter(Chapter {
        chapter_number: String::new(),
        title: title.into(),
        description,
        children,
    })
}

/// Creates an un-numbered lesson node.
#[must_use]
pub fn create_lesson(lesson_id: impl Into<LessonId>) -> ContentNode {
    ContentNode::Lesson(Lesson {
        lesson_number: 0,
        lesson_id: lesson_id.into(),
    })
}

//
// ─── ACCESSORS ─────────────────────────────────────────────────────────────────
//

impl ContentNode {
    #[must_use]
    pub fn as_chapter(&self) -> Option<&Chapter> {
        match self {
            ContentNode::Chapter(chapter) => Some(chapter),
            ContentNode::Lesson(_) => None,
        }
    }

    #[must_use]
    pub fn as_lesson(&self) -> Option<&Lesson> {
        match self {
            ContentNode::Chapter(_) => None,
            ContentNode::Lesson(lesson) => Some(lesson),
        }
    }

    #[must_use]
    pub fn is_chapter(&self) -> bool {
        matches!(self, ContentNode::Chapter(_))
    }
}

impl Chapter {
    /// Number of segments in the chapter number, which equals the chapter's depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.chapter_number.is_empty() {
            0
        } else {
            self.chapter_number.split('.').count()
        }
    }
}
