use std::convert::Infallible;

use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    response::{self, status, Responder},
    serde::json::Json,
    Request, State,
};
use serde::Serialize;
use tracing::{debug, info_span};

mod events;
pub use events::{handle, Acknowledgement, Expected, ValidationError};

mod payload;
use payload::JsonObject;

use crate::sink::EventSender;

const X_GITHUB_EVENT: &str = "X-GitHub-Event";
const X_GITHUB_DELIVERY: &str = "X-GitHub-Delivery";

#[rocket::post("/webhook", data = "<payload>")]
pub fn github_webhook(
    delivery: Delivery,
    payload: JsonObject,
    sender: &State<EventSender>,
) -> Result<Acknowledgement, ValidationError> {
    let span = info_span!(
        "webhook",
        event = delivery.event.as_deref().unwrap_or("unknown"),
        delivery = delivery.id.as_deref().unwrap_or("unknown"),
    );
    let _enter = span.enter();
    debug!("received webhook delivery");

    handle(&payload.0, sender.inner())
}

/// GitHub's delivery headers. Only used for diagnostics, both are optional.
#[derive(Debug)]
pub struct Delivery {
    pub event: Option<String>,
    pub id: Option<String>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Delivery {
    type Error = Infallible;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let headers = request.headers();

        Outcome::Success(Delivery {
            event: headers.get_one(X_GITHUB_EVENT).map(str::to_owned),
            id: headers.get_one(X_GITHUB_DELIVERY).map(str::to_owned),
        })
    }
}

impl<'r> Responder<'r, 'static> for Acknowledgement {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        self.message.respond_to(request)
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    kind: &'static str,
    field: &'static str,
    expected: Option<Expected>,
    message: String,
}

impl From<&ValidationError> for ErrorResponse {
    fn from(err: &ValidationError) -> Self {
        Self {
            error: ErrorDetail {
                kind: err.kind(),
                field: err.field(),
                expected: err.expected(),
                message: err.to_string(),
            },
        }
    }
}

impl<'r> Responder<'r, 'static> for ValidationError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        status::Custom(
            Status::UnprocessableEntity,
            Json(ErrorResponse::from(&self)),
        )
        .respond_to(request)
    }
}
