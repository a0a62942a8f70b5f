#![forbid(unsafe_code)]

pub mod app_services;
pub mod completion_service;
pub mod course_service;
pub mod error;
pub mod webhooks;

pub use course_core::Clock;

pub use app_services::AppServices;
pub use completion_service::CompletionService;
pub use course_service::{CourseDraft, CourseService, SaveOutcome};
pub use error::{AppServicesError, CompletionError, CourseServiceError, WebhookError};
pub use webhooks::{NotificationHandlerResult, Operation, WebhookService};
