use std::str::FromStr;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use scoreline_core::DomainError;

use crate::app::errors;

/// Parse a path segment into a typed id, answering `400` on failure.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(errors::domain_error_to_response)
}

/// Unwrap a JSON body, answering `400` with a JSON error when it is missing
/// or malformed.
pub fn body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    body.map(|Json(b)| b).map_err(errors::json_rejection_to_response)
}

/// `?`-style early return for handlers that produce a `Response` either way.
macro_rules! try_response {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(resp) => return resp,
        }
    };
}

pub(crate) use try_response;
