use std::sync::Arc;

use course_core::Clock;
use course_core::model::{Course, CourseCompletion, LessonId, Username, compute_course_completion};
use storage::repository::{CompletionRecord, CompletionRepository, CourseRepository};
use tracing::{debug, info};

use crate::error::CompletionError;

/// Records finished lessons and reports per-chapter progress.
#[derive(Clone)]
pub struct CompletionService {
    clock: Clock,
    courses: Arc<dyn CourseRepository>,
    completions: Arc<dyn CompletionRepository>,
}

impl CompletionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        courses: Arc<dyn CourseRepository>,
        completions: Arc<dyn CompletionRepository>,
    ) -> Self {
        Self {
            clock,
            courses,
            completions,
        }
    }

    /// Mark a lesson as completed and return the refreshed course progress.
    ///
    /// Completing a lesson twice keeps the first timestamp.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::MissingUser` for a blank username,
    /// `CompletionError::UnknownCourse` / `UnknownLesson` when the target does not exist,
    /// or `CompletionError::Storage` if persistence fails.
    pub async fn mark_as_completed(
        &self,
        username: &Username,
        course_slug: &str,
        lesson_id: &LessonId,
    ) -> Result<CourseCompletion, CompletionError> {
        ensure_user(username)?;
        let course = self.load_course(course_slug).await?;
        if !course.contains_lesson(lesson_id) {
            return Err(CompletionError::UnknownLesson {
                course_slug: course_slug.to_owned(),
                lesson_id: lesson_id.clone(),
            });
        }

        let record = CompletionRecord {
            username: username.clone(),
            course_id: course.id(),
            lesson_id: lesson_id.clone(),
            completed_at: self.clock.now(),
        };
        if self.completions.mark_lesson_completed(&record).await? {
            info!(user = %username, course = course.slug(), lesson = %lesson_id, "lesson completed");
        } else {
            debug!(user = %username, lesson = %lesson_id, "lesson already completed");
        }

        self.completion_for(username, &course).await
    }

    /// Current progress of a student through a course.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::MissingUser` for a blank username,
    /// `CompletionError::UnknownCourse` if the slug matches nothing,
    /// or `CompletionError::Storage` if repository access fails.
    pub async fn course_completion(
        &self,
        username: &Username,
        course_slug: &str,
    ) -> Result<CourseCompletion, CompletionError> {
        ensure_user(username)?;
        let course = self.load_course(course_slug).await?;
        self.completion_for(username, &course).await
    }

    async fn load_course(&self, course_slug: &str) -> Result<Course, CompletionError> {
        self.courses
            .get_course_by_slug(course_slug)
            .await?
            .ok_or_else(|| CompletionError::UnknownCourse(course_slug.to_owned()))
    }

    async fn completion_for(
        &self,
        username: &Username,
        course: &Course,
    ) -> Result<CourseCompletion, CompletionError> {
        let completed = self
            .completions
            .completed_lessons(username, course.id())
            .await?;
        Ok(compute_course_completion(course.content(), &completed))
    }
}

fn ensure_user(username: &Username) -> Result<(), CompletionError> {
    if username.as_str().trim().is_empty() {
        return Err(CompletionError::MissingUser);
    }
    Ok(())
}
