use std::sync::Arc;

use course_core::model::content::count_lessons;
use course_core::model::{Course, CourseContent, CourseId};
use serde::Deserialize;
use storage::repository::CourseRepository;
use tracing::{debug, info};

use crate::error::CourseServiceError;

/// An authored course as it arrives from the CMS, numbering not yet trusted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    pub id: CourseId,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: CourseContent,
}

/// Whether a save inserted a new course or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Updated,
}

/// Orchestrates course numbering and persistence.
#[derive(Clone)]
pub struct CourseService {
    courses: Arc<dyn CourseRepository>,
}

impl CourseService {
    #[must_use]
    pub fn new(courses: Arc<dyn CourseRepository>) -> Self {
        Self { courses }
    }

    /// Validate and renumber a draft, then persist it.
    ///
    /// The outcome comes from the repository write itself, so concurrent saves
    /// of a new id report `Created` exactly once.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Course` for validation failures.
    /// Returns `CourseServiceError::Storage` if persistence fails.
    pub async fn save_course(
        &self,
        draft: CourseDraft,
    ) -> Result<(Course, SaveOutcome), CourseServiceError> {
        let course = Course::new(
            draft.id,
            draft.slug,
            draft.title,
            draft.subtitle,
            draft.description,
            draft.content,
        )?;

        let outcome = if self.courses.upsert_course(&course).await? {
            SaveOutcome::Updated
        } else {
            SaveOutcome::Created
        };

        info!(
            course_id = %course.id(),
            slug = course.slug(),
            lessons = count_lessons(course.content()),
            ?outcome,
            "saved course"
        );
        Ok((course, outcome))
    }

    /// Fetch a course by slug.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn get_course_by_slug(&self, slug: &str) -> Result<Option<Course>, CourseServiceError> {
        debug!(slug, "loading course");
        Ok(self.courses.get_course_by_slug(slug).await?)
    }

    /// List courses ordered by ID, up to the given limit.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, CourseServiceError> {
        Ok(self.courses.list_courses(limit).await?)
    }

    /// Delete a course and return it, or `None` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn delete_course(&self, id: CourseId) -> Result<Option<Course>, CourseServiceError> {
        let Some(course) = self.courses.get_course(id).await? else {
            return Ok(None);
        };
        if !self.courses.delete_course(id).await? {
            return Ok(None);
        }
        info!(course_id = %id, slug = course.slug(), "deleted course");
        Ok(Some(course))
    }
}
