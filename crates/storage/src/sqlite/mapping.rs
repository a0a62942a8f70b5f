use course_core::model::{Course, CourseContent, CourseId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn course_id_to_i64(id: CourseId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("course_id overflow".into()))
}

pub(crate) fn course_id_from_i64(v: i64) -> Result<CourseId, StorageError> {
    u64::try_from(v)
        .map(CourseId::new)
        .map_err(|_| StorageError::Serialization("course_id sign overflow".into()))
}

/// Encodes a content tree in the JSON shape the CMS sends.
pub(crate) fn content_to_json(course: &Course) -> Result<String, StorageError> {
    serde_json::to_string(course.content()).map_err(ser)
}

/// Rebuilds a course from its row.
///
/// Goes through `Course::new`, so a row edited outside the application is
/// renumbered and validated on the way in.
pub(crate) fn course_from_row(row: &SqliteRow) -> Result<Course, StorageError> {
    let content: CourseContent =
        serde_json::from_str(&row.try_get::<String, _>("content").map_err(ser)?).map_err(ser)?;

    Course::new(
        course_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get::<String, _>("slug").map_err(ser)?,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<Option<String>, _>("subtitle").map_err(ser)?,
        row.try_get::<Option<String>, _>("description").map_err(ser)?,
        content,
    )
    .map_err(ser)
}

/// True when the database rejected a write because of a UNIQUE constraint.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
