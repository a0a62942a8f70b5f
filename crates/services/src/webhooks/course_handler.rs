use serde_json::{Map, Value};
use tracing::info;

use course_core::model::{CourseContent, CourseId};

use crate::course_service::{CourseDraft, CourseService, SaveOutcome};
use crate::error::{CourseServiceError, WebhookError};
use crate::webhooks::notification::{
    CmsEvent, CmsNotification, NotificationHandlerResult, Operation, optional_string,
    required_string,
};

const ENTRY: &str = "entry.";

/// Applies a `course` notification through the course service.
pub(crate) async fn handle_course_notification(
    courses: &CourseService,
    notification: &CmsNotification,
) -> Result<NotificationHandlerResult, WebhookError> {
    match &notification.event {
        CmsEvent::EntryCreate | CmsEvent::EntryUpdate => {
            let draft =
                course_draft(&notification.entry).map_err(WebhookError::ValidationFailed)?;
            let (course, outcome) =
                courses
                    .save_course(draft)
                    .await
                    .map_err(|err| match err {
                        CourseServiceError::Course(err) => {
                            WebhookError::ValidationFailed(vec![err.to_string()])
                        }
                        other => WebhookError::Course(other),
                    })?;
            let operation = match outcome {
                SaveOutcome::Created => Operation::Create,
                SaveOutcome::Updated => Operation::Update,
            };
            Ok(NotificationHandlerResult::with_course(operation, course))
        }
        CmsEvent::EntryDelete => {
            let mut errors = Vec::new();
            let Some(id) = course_id(&notification.entry, &mut errors) else {
                return Err(WebhookError::ValidationFailed(errors));
            };
            match courses.delete_course(id).await? {
                Some(course) => Ok(NotificationHandlerResult::with_course(
                    Operation::Delete,
                    course,
                )),
                None => {
                    info!(course_id = %id, "delete for unknown course ignored");
                    Ok(NotificationHandlerResult::noop())
                }
            }
        }
        CmsEvent::Other(event) => {
            info!(event = %event, "no course handler for event");
            Ok(NotificationHandlerResult::noop())
        }
    }
}

/// Validates a course entry, collecting every violation.
fn course_draft(entry: &Map<String, Value>) -> Result<CourseDraft, Vec<String>> {
    let mut errors = Vec::new();
    let id = course_id(entry, &mut errors);
    let slug = required_string(entry, "slug", ENTRY, &mut errors);
    let title = required_string(entry, "title", ENTRY, &mut errors);
    let subtitle = optional_string(entry, "subtitle", ENTRY, &mut errors);
    let description = optional_string(entry, "description", ENTRY, &mut errors);
    let content = course_content(entry, &mut errors);

    match (id, slug, title, content) {
        (Some(id), Some(slug), Some(title), Some(content)) if errors.is_empty() => Ok(CourseDraft {
            id,
            slug: slug.to_owned(),
            title: title.to_owned(),
            subtitle,
            description,
            content,
        }),
        _ => Err(errors),
    }
}

fn course_id(entry: &Map<String, Value>, errors: &mut Vec<String>) -> Option<CourseId> {
    match entry.get("id") {
        None | Some(Value::Null) => {
            errors.push(format!("{ENTRY}id is a required field"));
            None
        }
        Some(value) => match value.as_u64().filter(|id| *id > 0) {
            Some(id) => Some(CourseId::new(id)),
            None => {
                errors.push(format!("{ENTRY}id must be a positive integer"));
                None
            }
        },
    }
}

fn course_content(entry: &Map<String, Value>, errors: &mut Vec<String>) -> Option<CourseContent> {
    match entry.get("content") {
        None | Some(Value::Null) => {
            errors.push(format!("{ENTRY}content is a required field"));
            None
        }
        Some(value @ Value::Array(_)) => match serde_json::from_value(value.clone()) {
            Ok(content) => Some(content),
            Err(err) => {
                errors.push(format!("{ENTRY}content is invalid: {err}"));
                None
            }
        },
        Some(_) => {
            errors.push(format!("{ENTRY}content must be an `array` type"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("entry must be an object"),
        }
    }

    #[test]
    fn accepts_complete_entry() {
        let draft = course_draft(&entry(json!({
            "id": 2,
            "slug": "rust",
            "title": "Rust",
            "subtitle": null,
            "description": "Ownership",
            "content": [
                { "type": "chapter", "title": "Intro", "content": [
                    { "type": "lesson", "lessonId": "l1" }
                ]}
            ]
        })))
        .unwrap();

        assert_eq!(draft.id, CourseId::new(2));
        assert_eq!(draft.subtitle, None);
        assert_eq!(draft.description.as_deref(), Some("Ownership"));
        assert_eq!(draft.content.len(), 1);
    }

    #[test]
    fn collects_entry_violations() {
        let errors = course_draft(&entry(json!({
            "id": -3,
            "title": 7,
            "content": {}
        })))
        .unwrap_err();

        assert_eq!(
            errors,
            vec![
                "entry.id must be a positive integer",
                "entry.slug is a required field",
                "entry.title must be a `string` type",
                "entry.content must be an `array` type",
            ]
        );
    }

    #[test]
    fn rejects_unparsable_content_nodes() {
        let errors = course_draft(&entry(json!({
            "id": 1,
            "slug": "rust",
            "title": "Rust",
            "content": [{ "type": "quiz" }]
        })))
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("entry.content is invalid"));
    }
}
