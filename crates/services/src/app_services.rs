use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::completion_service::CompletionService;
use crate::course_service::CourseService;
use crate::error::AppServicesError;
use crate::webhooks::WebhookService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    courses: Arc<CourseService>,
    completions: Arc<CompletionService>,
    webhooks: Arc<WebhookService>,
}

impl AppServices {
    /// Build services over an already opened storage.
    #[must_use]
    pub fn new(storage: &Storage, clock: Clock) -> Self {
        let courses = Arc::new(CourseService::new(Arc::clone(&storage.courses)));
        let completions = Arc::new(CompletionService::new(
            clock,
            Arc::clone(&storage.courses),
            Arc::clone(&storage.completions),
        ));
        let webhooks = Arc::new(WebhookService::new(Arc::clone(&courses)));

        Self {
            courses,
            completions,
            webhooks,
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(&storage, clock))
    }

    #[must_use]
    pub fn courses(&self) -> Arc<CourseService> {
        Arc::clone(&self.courses)
    }

    #[must_use]
    pub fn completions(&self) -> Arc<CompletionService> {
        Arc::clone(&self.completions)
    }

    #[must_use]
    pub fn webhooks(&self) -> Arc<WebhookService> {
        Arc::clone(&self.webhooks)
    }
}
