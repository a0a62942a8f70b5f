//! Shared error types for the services crate.

use thiserror::Error;

use course_core::model::{CourseError, LessonId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `CourseService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CourseServiceError {
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CompletionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompletionError {
    #[error("completion requested without a user")]
    MissingUser,
    #[error("course not found: {0}")]
    UnknownCourse(String),
    #[error("lesson {lesson_id} is not part of course {course_slug}")]
    UnknownLesson {
        course_slug: String,
        lesson_id: LessonId,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while processing CMS webhook notifications.
///
/// A payload that is well-formed but addressed to nothing we handle is not an
/// error; it yields a NOOP result instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WebhookError {
    #[error("validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),
    #[error(transparent)]
    Course(#[from] CourseServiceError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
