use serde::Serialize;
use serde_json::{Map, Value};

use course_core::model::Course;

/// Event the CMS sends when an admin presses "test webhook".
pub const TRIGGER_TEST_EVENT: &str = "trigger-test";

/// What a notification did to our data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Update,
    Delete,
    Noop,
}

/// Outcome of processing one notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationHandlerResult {
    pub operation: Operation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Course>,
}

impl NotificationHandlerResult {
    #[must_use]
    pub fn noop() -> Self {
        Self {
            operation: Operation::Noop,
            data: None,
        }
    }

    #[must_use]
    pub fn with_course(operation: Operation, course: Course) -> Self {
        Self {
            operation,
            data: Some(course),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmsEvent {
    EntryCreate,
    EntryUpdate,
    EntryDelete,
    Other(String),
}

impl CmsEvent {
    fn parse(raw: &str) -> Self {
        match raw {
            "entry.create" => Self::EntryCreate,
            "entry.update" => Self::EntryUpdate,
            "entry.delete" => Self::EntryDelete,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// A notification whose envelope has been validated.
#[derive(Debug, Clone, PartialEq)]
pub struct CmsNotification {
    pub event: CmsEvent,
    pub model: String,
    pub entry: Map<String, Value>,
}

/// Returns the raw `event` field if the payload carries one as a string.
pub(crate) fn raw_event(payload: &Value) -> Option<&str> {
    payload.get("event").and_then(Value::as_str)
}

/// Validates the envelope, collecting every violation.
pub(crate) fn parse_notification(payload: &Value) -> Result<CmsNotification, Vec<String>> {
    let Some(object) = payload.as_object() else {
        return Err(vec!["notification must be an `object` type".to_owned()]);
    };

    let mut errors = Vec::new();
    let event = required_string(object, "event", "", &mut errors);
    let model = required_string(object, "model", "", &mut errors);
    let entry = match object.get("entry") {
        None | Some(Value::Null) => {
            errors.push("entry is a required field".to_owned());
            None
        }
        Some(Value::Object(entry)) => Some(entry.clone()),
        Some(_) => {
            errors.push("entry must be an `object` type".to_owned());
            None
        }
    };

    match (event, model, entry) {
        (Some(event), Some(model), Some(entry)) if errors.is_empty() => Ok(CmsNotification {
            event: CmsEvent::parse(event),
            model: model.to_owned(),
            entry,
        }),
        _ => Err(errors),
    }
}

/// Reads a mandatory string field, recording a message when it is absent or mistyped.
pub(crate) fn required_string<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    prefix: &str,
    errors: &mut Vec<String>,
) -> Option<&'a str> {
    match object.get(field) {
        None | Some(Value::Null) => {
            errors.push(format!("{prefix}{field} is a required field"));
            None
        }
        Some(Value::String(value)) => Some(value),
        Some(_) => {
            errors.push(format!("{prefix}{field} must be a `string` type"));
            None
        }
    }
}

/// Reads an optional string field; `null` counts as absent.
pub(crate) fn optional_string(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
    errors: &mut Vec<String>,
) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            errors.push(format!("{prefix}{field} must be a `string` type"));
            None
        }
    }
}
