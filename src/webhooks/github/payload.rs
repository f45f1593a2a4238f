use std::io;

use anyhow::anyhow;
use rocket::{
    data::{ByteUnit, FromData, Outcome},
    http::Status,
    Data, Request,
};
use serde_json::{Map, Value};
use tracing::trace;

/// A webhook body that was decoded as a JSON object, with no further assumptions on its shape.
#[derive(Debug)]
pub struct JsonObject(pub Map<String, Value>);

const LIMIT: ByteUnit = ByteUnit::Mebibyte(1);

fn parse_object(content: &str) -> anyhow::Result<Map<String, Value>> {
    match serde_json::from_str(content)? {
        Value::Object(map) => Ok(map),
        other => Err(anyhow!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        )),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[rocket::async_trait]
impl<'r> FromData<'r> for JsonObject {
    type Error = anyhow::Error;

    async fn from_data(request: &'r Request<'_>, data: Data<'r>) -> Outcome<'r, Self> {
        trace!("received payload on webhook endpoint: {:?}", request);

        if !request.content_type().map_or(false, |ct| ct.is_json()) {
            trace!(
                "content type `{:?}` wasn't json, stopping here...",
                request.content_type()
            );
            return Outcome::Error((Status::BadRequest, anyhow!("wrong content type")));
        }

        let size_limit = request.limits().get("json").unwrap_or(LIMIT);
        let content = match data.open(size_limit).into_string().await {
            Ok(s) if s.is_complete() => s.into_inner(),
            Ok(_) => {
                let eof = io::ErrorKind::UnexpectedEof;
                trace!("payload was too big");
                return Outcome::Error((
                    Status::PayloadTooLarge,
                    io::Error::new(eof, "data limit exceeded").into(),
                ));
            }
            Err(e) => return Outcome::Error((Status::BadRequest, e.into())),
        };

        match parse_object(&content) {
            Ok(map) => {
                trace!("decoded webhook payload");
                Outcome::Success(JsonObject(map))
            }
            Err(e) => {
                trace!("couldn't decode payload: {}", e);
                Outcome::Error((Status::BadRequest, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object() {
        let map = parse_object(r#"{"action": "opened"}"#).unwrap();
        assert_eq!(map["action"], "opened");
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        let err = parse_object("[1, 2]").unwrap_err();
        assert_eq!(err.to_string(), "expected a JSON object, got an array");

        assert!(parse_object("\"opened\"").is_err());
        assert!(parse_object("{\"action\": ").is_err());
    }
}
