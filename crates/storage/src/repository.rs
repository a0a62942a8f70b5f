use async_trait::async_trait;
use chrono::{DateTime, Utc};
use course_core::model::{Course, CourseId, LessonId, Username};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// One lesson a student has completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    pub username: Username,
    pub course_id: CourseId,
    pub lesson_id: LessonId,
    pub completed_at: DateTime<Utc>,
}

/// Repository contract for courses and their content trees.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Persist or replace a course by id.
    ///
    /// Returns `true` if an existing course was replaced. The check and the
    /// write are one atomic step, so concurrent creates of the same id report
    /// at most one insert.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if another course already uses the slug,
    /// or other storage errors.
    async fn upsert_course(&self, course: &Course) -> Result<bool, StorageError>;

    /// Fetch a course by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the course cannot be read back.
    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError>;

    /// Fetch a course by slug.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the course cannot be read back.
    async fn get_course_by_slug(&self, slug: &str) -> Result<Option<Course>, StorageError>;

    /// List courses ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the courses cannot be read back.
    async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, StorageError>;

    /// Delete a course and every completion recorded for it.
    ///
    /// Returns whether a course was removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn delete_course(&self, id: CourseId) -> Result<bool, StorageError>;
}

#[async_trait]
pub trait CompletionRepository: Send + Sync {
    /// Record a completed lesson.
    ///
    /// Returns `false` if the student had already completed the lesson, in
    /// which case the original timestamp is kept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn mark_lesson_completed(&self, record: &CompletionRecord) -> Result<bool, StorageError>;

    /// All lessons of a course the student has completed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the records cannot be read.
    async fn completed_lessons(
        &self,
        username: &Username,
        course_id: CourseId,
    ) -> Result<HashSet<LessonId>, StorageError>;
}

type CompletionKey = (Username, CourseId, LessonId);

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    courses: Arc<Mutex<BTreeMap<CourseId, Course>>>,
    completions: Arc<Mutex<HashMap<CompletionKey, DateTime<Utc>>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn upsert_course(&self, course: &Course) -> Result<bool, StorageError> {
        let mut guard = self.courses.lock().map_err(poisoned)?;
        let slug_taken = guard
            .values()
            .any(|existing| existing.slug() == course.slug() && existing.id() != course.id());
        if slug_taken {
            return Err(StorageError::Conflict);
        }
        Ok(guard.insert(course.id(), course.clone()).is_some())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let guard = self.courses.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    async fn get_course_by_slug(&self, slug: &str) -> Result<Option<Course>, StorageError> {
        let guard = self.courses.lock().map_err(poisoned)?;
        Ok(guard.values().find(|course| course.slug() == slug).cloned())
    }

    async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, StorageError> {
        let guard = self.courses.lock().map_err(poisoned)?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(guard.values().take(limit).cloned().collect())
    }

    async fn delete_course(&self, id: CourseId) -> Result<bool, StorageError> {
        let removed = self.courses.lock().map_err(poisoned)?.remove(&id).is_some();
        if removed {
            self.completions
                .lock()
                .map_err(poisoned)?
                .retain(|(_, course_id, _), _| *course_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl CompletionRepository for InMemoryRepository {
    async fn mark_lesson_completed(&self, record: &CompletionRecord) -> Result<bool, StorageError> {
        let mut guard = self.completions.lock().map_err(poisoned)?;
        let key = (
            record.username.clone(),
            record.course_id,
            record.lesson_id.clone(),
        );
        if guard.contains_key(&key) {
            return Ok(false);
        }
        guard.insert(key, record.completed_at);
        Ok(true)
    }

    async fn completed_lessons(
        &self,
        username: &Username,
        course_id: CourseId,
    ) -> Result<HashSet<LessonId>, StorageError> {
        let guard = self.completions.lock().map_err(poisoned)?;
        Ok(guard
            .keys()
            .filter(|(user, course, _)| user == username && *course == course_id)
            .map(|(_, _, lesson)| lesson.clone())
            .collect())
    }
}

/// Aggregates course and completion repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub courses: Arc<dyn CourseRepository>,
    pub completions: Arc<dyn CompletionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let courses: Arc<dyn CourseRepository> = Arc::new(repo.clone());
        let completions: Arc<dyn CompletionRepository> = Arc::new(repo);
        Self {
            courses,
            completions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::{create_chapter, create_lesson};
    use course_core::time::fixed_now;

    fn build_course(id: u64, slug: &str) -> Course {
        Course::new(
            CourseId::new(id),
            slug,
            format!("Course {id}"),
            None,
            None,
            vec![create_chapter(
                "Intro",
                vec![
                    create_lesson(format!("{slug}-l1")),
                    create_lesson(format!("{slug}-l2")),
                ],
                None,
            )],
        )
        .unwrap()
    }

    fn record(user: &str, course_id: u64, lesson: &str) -> CompletionRecord {
        CompletionRecord {
            username: Username::new(user),
            course_id: CourseId::new(course_id),
            lesson_id: LessonId::new(lesson),
            completed_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn round_trips_course_by_id_and_slug() {
        let repo = InMemoryRepository::new();
        let course = build_course(1, "rust");
        repo.upsert_course(&course).await.unwrap();

        assert_eq!(repo.get_course(course.id()).await.unwrap(), Some(course.clone()));
        assert_eq!(repo.get_course_by_slug("rust").await.unwrap(), Some(course));
        assert_eq!(repo.get_course_by_slug("go").await.unwrap(), None);
    }

    #[tokio::test]
    async fn rejects_slug_owned_by_other_course() {
        let repo = InMemoryRepository::new();
        assert!(!repo.upsert_course(&build_course(1, "rust")).await.unwrap());

        let err = repo.upsert_course(&build_course(2, "rust")).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));

        // Same id may keep its slug.
        assert!(repo.upsert_course(&build_course(1, "rust")).await.unwrap());
    }

    #[tokio::test]
    async fn lists_courses_in_id_order() {
        let repo = InMemoryRepository::new();
        for (id, slug) in [(3, "c"), (1, "a"), (2, "b")] {
            repo.upsert_course(&build_course(id, slug)).await.unwrap();
        }

        let slugs: Vec<String> = repo
            .list_courses(2)
            .await
            .unwrap()
            .iter()
            .map(|course| course.slug().to_owned())
            .collect();
        assert_eq!(slugs, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn completion_is_recorded_once() {
        let repo = InMemoryRepository::new();
        assert!(repo.mark_lesson_completed(&record("ada", 1, "rust-l1")).await.unwrap());
        assert!(!repo.mark_lesson_completed(&record("ada", 1, "rust-l1")).await.unwrap());
        repo.mark_lesson_completed(&record("bob", 1, "rust-l2")).await.unwrap();

        let done = repo
            .completed_lessons(&Username::new("ada"), CourseId::new(1))
            .await
            .unwrap();
        assert_eq!(done, HashSet::from([LessonId::new("rust-l1")]));
    }

    #[tokio::test]
    async fn deleting_course_drops_its_completions() {
        let repo = InMemoryRepository::new();
        repo.upsert_course(&build_course(1, "rust")).await.unwrap();
        repo.mark_lesson_completed(&record("ada", 1, "rust-l1")).await.unwrap();

        assert!(repo.delete_course(CourseId::new(1)).await.unwrap());
        assert!(!repo.delete_course(CourseId::new(1)).await.unwrap());
        let done = repo
            .completed_lessons(&Username::new("ada"), CourseId::new(1))
            .await
            .unwrap();
        assert!(done.is_empty());
    }
}
