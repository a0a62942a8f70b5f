use course_core::model::{Course, CourseId};

use super::SqliteRepository;
use super::mapping::{content_to_json, course_from_row, course_id_to_i64, is_unique_violation};
use crate::repository::{CourseRepository, StorageError};

const COURSE_COLUMNS: &str = "id, slug, title, subtitle, description, content";

#[async_trait::async_trait]
impl CourseRepository for SqliteRepository {
    async fn upsert_course(&self, course: &Course) -> Result<bool, StorageError> {
        let content = content_to_json(course)?;
        let id = course_id_to_i64(course.id())?;
        let write_err = |e: sqlx::Error| {
            if is_unique_violation(&e) {
                StorageError::Conflict
            } else {
                StorageError::Connection(e.to_string())
            }
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        // The insert alone decides the outcome: only one writer can create the row.
        let inserted = sqlx::query(
            r"
            INSERT INTO courses (id, slug, title, subtitle, description, content)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO NOTHING
            ",
        )
        .bind(id)
        .bind(course.slug())
        .bind(course.title())
        .bind(course.subtitle())
        .bind(course.description())
        .bind(&content)
        .execute(&mut *tx)
        .await
        .map_err(write_err)?
        .rows_affected()
            == 1;

        if !inserted {
            sqlx::query(
                r"
                UPDATE courses
                SET slug = ?2, title = ?3, subtitle = ?4, description = ?5, content = ?6
                WHERE id = ?1
                ",
            )
            .bind(id)
            .bind(course.slug())
            .bind(course.title())
            .bind(course.subtitle())
            .bind(course.description())
            .bind(&content)
            .execute(&mut *tx)
            .await
            .map_err(write_err)?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        tracing::debug!(course_id = %course.id(), slug = course.slug(), inserted, "stored course");
        Ok(!inserted)
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let row = sqlx::query(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?1"))
            .bind(course_id_to_i64(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(course_from_row).transpose()
    }

    async fn get_course_by_slug(&self, slug: &str) -> Result<Option<Course>, StorageError> {
        let row = sqlx::query(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE slug = ?1"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(course_from_row).transpose()
    }

    async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY id ASC LIMIT ?1"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(course_from_row).collect()
    }

    async fn delete_course(&self, id: CourseId) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM courses WHERE id = ?1")
            .bind(course_id_to_i64(id)?)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.rows_affected() > 0)
    }
}
