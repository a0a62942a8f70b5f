use std::collections::HashSet;

use course_core::model::{CourseId, LessonId, Username};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{course_id_to_i64, ser};
use crate::repository::{CompletionRecord, CompletionRepository, StorageError};

#[async_trait::async_trait]
impl CompletionRepository for SqliteRepository {
    async fn mark_lesson_completed(&self, record: &CompletionRecord) -> Result<bool, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO completed_lessons (username, course_id, lesson_id, completed_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(username, course_id, lesson_id) DO NOTHING
            ",
        )
        .bind(record.username.as_str())
        .bind(course_id_to_i64(record.course_id)?)
        .bind(record.lesson_id.as_str())
        .bind(record.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.rows_affected() == 1)
    }

    async fn completed_lessons(
        &self,
        username: &Username,
        course_id: CourseId,
    ) -> Result<HashSet<LessonId>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT lesson_id FROM completed_lessons
            WHERE username = ?1 AND course_id = ?2
            ",
        )
        .bind(username.as_str())
        .bind(course_id_to_i64(course_id)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("lesson_id")
                    .map(LessonId::from)
                    .map_err(ser)
            })
            .collect()
    }
}
