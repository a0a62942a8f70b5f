use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::model::content::{
    ContentNode, CourseContent, PreOrder, create_course_content, extract_lesson_ids,
};
use crate::model::ids::{CourseId, LessonId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("course slug cannot be empty")]
    EmptySlug,

    #[error("chapter title cannot be empty")]
    EmptyChapterTitle,

    #[error("lesson id cannot be empty")]
    EmptyLessonId,

    #[error("lesson {0} appears more than once in the course")]
    DuplicateLessonId(LessonId),
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// A published course and its numbered content tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    id: CourseId,
    slug: String,
    title: String,
    subtitle: Option<String>,
    description: Option<String>,
    content: CourseContent,
}

impl Course {
    /// Creates a course and numbers its content.
    ///
    /// Whatever chapter and lesson numbers `content` carries are replaced.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` if the title, slug, a chapter title or a lesson id
    /// is blank, or if a lesson id occurs twice.
    pub fn new(
        id: CourseId,
        slug: impl Into<String>,
        title: impl Into<String>,
        subtitle: Option<String>,
        description: Option<String>,
        content: CourseContent,
    ) -> Result<Self, CourseError> {
        let slug = slug.into();
        if slug.trim().is_empty() {
            return Err(CourseError::EmptySlug);
        }
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyTitle);
        }
        validate_content(&content)?;

        Ok(Self {
            id,
            slug: slug.trim().to_owned(),
            title: title.trim().to_owned(),
            subtitle: non_blank(subtitle),
            description: non_blank(description),
            content: create_course_content(content),
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn content(&self) -> &[ContentNode] {
        &self.content
    }

    #[must_use]
    pub fn lesson_ids(&self) -> Vec<LessonId> {
        extract_lesson_ids(&self.content)
    }

    #[must_use]
    pub fn contains_lesson(&self, lesson_id: &LessonId) -> bool {
        PreOrder::new(&self.content)
            .filter_map(ContentNode::as_lesson)
            .any(|lesson| &lesson.lesson_id == lesson_id)
    }
}

fn validate_content(content: &[ContentNode]) -> Result<(), CourseError> {
    let mut seen = HashSet::new();
    for node in PreOrder::new(content) {
        match node {
            ContentNode::Chapter(chapter) => {
                if chapter.title.trim().is_empty() {
                    return Err(CourseError::EmptyChapterTitle);
                }
            }
            ContentNode::Lesson(lesson) => {
                if lesson.lesson_id.as_str().trim().is_empty() {
                    return Err(CourseError::EmptyLessonId);
                }
                if !seen.insert(&lesson.lesson_id) {
                    return Err(CourseError::DuplicateLessonId(lesson.lesson_id.clone()));
                }
            }
        }
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
