//! CMS webhook ingestion.
//!
//! Envelopes are validated before dispatch; entries are validated by the
//! model's handler. Payloads addressed to nothing we handle yield NOOP.

mod course_handler;
mod notification;

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::course_service::CourseService;
use crate::error::WebhookError;

pub use notification::{
    CmsEvent, CmsNotification, NotificationHandlerResult, Operation, TRIGGER_TEST_EVENT,
};

const COURSE_MODEL: &str = "course";

#[derive(Clone)]
pub struct WebhookService {
    courses: Arc<CourseService>,
}

impl WebhookService {
    #[must_use]
    pub fn new(courses: Arc<CourseService>) -> Self {
        Self { courses }
    }

    /// Process one CMS notification payload.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::ValidationFailed` with every collected message
    /// when the payload is malformed, or `WebhookError::Course` if saving fails.
    pub async fn process_notification(
        &self,
        payload: &Value,
    ) -> Result<NotificationHandlerResult, WebhookError> {
        if notification::raw_event(payload) == Some(TRIGGER_TEST_EVENT) {
            debug!("webhook test trigger received");
            return Ok(NotificationHandlerResult::noop());
        }

        let result = match notification::parse_notification(payload) {
            Ok(notification) if notification.model == COURSE_MODEL => {
                course_handler::handle_course_notification(&self.courses, &notification).await
            }
            Ok(notification) => {
                debug!(model = %notification.model, "no handler for model");
                Ok(NotificationHandlerResult::noop())
            }
            Err(errors) => Err(WebhookError::ValidationFailed(errors)),
        };

        if let Err(WebhookError::ValidationFailed(errors)) = &result {
            warn!(?errors, "rejected webhook payload");
        }
        result
    }
}
