use std::fmt::{self, Display};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, trace};

use crate::sink::{EventSink, PullRequestRecord};

const ACTION: &str = "action";
const PULL_REQUEST: &str = "pull_request";
const PULL_REQUEST_HTML_URL: &str = "pull_request.html_url";

/// Fixed message sent back to GitHub for every accepted delivery.
pub const RECEIVED: &str = "Webhook received";

/// A pull request event, extracted from a raw JSON payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    pub action: String,
    pub pull_request_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Expected {
    String,
    Object,
}

impl Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "a string"),
            Self::Object => write!(f, "an object"),
        }
    }
}

/// Malformed input from the webhook sender. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` should be {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: Expected,
    },
}

impl ValidationError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::TypeMismatch { .. } => "type_mismatch",
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField(field) | Self::TypeMismatch { field, .. } => *field,
        }
    }

    pub fn expected(&self) -> Option<Expected> {
        match self {
            Self::MissingField(_) => None,
            Self::TypeMismatch { expected, .. } => Some(*expected),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    pub message: &'static str,
}

impl Acknowledgement {
    pub fn received() -> Self {
        Self { message: RECEIVED }
    }
}

/// Returns `Ok(None)` when the key is absent. `null` counts as a wrong type.
fn optional_str<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    field: &'static str,
) -> Result<Option<&'a str>, ValidationError> {
    match object.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(ValidationError::TypeMismatch {
            field,
            expected: Expected::String,
        }),
    }
}

impl TryFrom<&Map<String, Value>> for WebhookEvent {
    type Error = ValidationError;

    fn try_from(payload: &Map<String, Value>) -> Result<Self, Self::Error> {
        let action = optional_str(payload, ACTION, ACTION)?
            .ok_or(ValidationError::MissingField(ACTION))?;

        let pull_request_url = match payload.get(PULL_REQUEST) {
            None => None,
            Some(Value::Object(pull_request)) => {
                optional_str(pull_request, "html_url", PULL_REQUEST_HTML_URL)?
            }
            Some(_) => {
                return Err(ValidationError::TypeMismatch {
                    field: PULL_REQUEST,
                    expected: Expected::Object,
                })
            }
        };

        Ok(Self {
            action: action.to_owned(),
            pull_request_url: pull_request_url.map(str::to_owned),
        })
    }
}

impl From<WebhookEvent> for PullRequestRecord {
    fn from(event: WebhookEvent) -> Self {
        Self {
            action: event.action,
            pull_request_url: event.pull_request_url,
        }
    }
}

/// Validates a decoded webhook body and forwards it to `sink`.
///
/// The sink sees exactly one record per accepted payload, and nothing when validation fails.
pub fn handle(
    payload: &Map<String, Value>,
    sink: &dyn EventSink,
) -> Result<Acknowledgement, ValidationError> {
    let event = WebhookEvent::try_from(payload).map_err(|e| {
        debug!("rejected payload: {}", e);
        e
    })?;

    trace!("extracted event: {:?}", event);
    sink.emit(event.into());

    Ok(Acknowledgement::received())
}
