//! Request handlers

use crate::error::{error_reply, ApiError};
use crate::ApiState;
use incident_core::{Incident, IncidentNumber, ModelError};
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::reply::{Reply, Response};
use warp::Rejection;

/// Decode a raw path segment into an incident number
///
/// # Errors
/// - `ModelError::MalformedIncidentNumber` if the segment does not decode
///   to UTF-8
/// - `ModelError::EmptyIncidentNumber` if it is blank after decoding
pub fn parse_incident_number(segment: &str) -> Result<IncidentNumber, ModelError> {
    let decoded =
        urlencoding::decode(segment).map_err(|_| ModelError::MalformedIncidentNumber)?;
    IncidentNumber::new(&decoded)
}

pub(crate) async fn get_incident(segment: String, state: ApiState) -> Result<Response, Infallible> {
    Ok(respond(fetch(&segment, &state).await))
}

pub(crate) async fn update_incident(
    segment: String,
    body: warp::hyper::body::Bytes,
    state: ApiState,
) -> Result<Response, Infallible> {
    Ok(respond(update(&segment, &body, &state).await))
}

pub(crate) async fn missing_incident_number() -> Result<Response, Infallible> {
    Ok(ApiError::MissingIncidentNumber.into_response())
}

async fn fetch(segment: &str, state: &ApiState) -> Result<Incident, ApiError> {
    let key = parse_incident_number(segment)?;

    state
        .store
        .fetch_by_key(&key)
        .await
        .map_err(ApiError::Fetch)?
        .ok_or(ApiError::NotFound)
}

async fn update(segment: &str, body: &[u8], state: &ApiState) -> Result<Incident, ApiError> {
    let key = parse_incident_number(segment)?;

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ModelError::NoFields.into());
    }
    let payload: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| ApiError::InvalidBody)?;
    let object = payload.as_object().ok_or(ApiError::InvalidBody)?;

    let fields = state.allow_list.filter(object)?;
    tracing::info!("Updating incident {} ({} field(s))", key, fields.len());

    state
        .store
        .update_fields(&key, &fields)
        .await
        .map_err(ApiError::Update)?
        .ok_or(ApiError::NotFound)
}

fn respond(result: Result<Incident, ApiError>) -> Response {
    match result {
        Ok(incident) => warp::reply::json(&incident).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Map unmatched routes and filter failures to JSON error bodies
pub(crate) async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found")
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Content length required")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    };

    Ok(error_reply(status, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incident_numbers_are_percent_decoded() {
        assert_eq!(parse_incident_number("INC%20123").unwrap().as_str(), "INC 123");
        assert_eq!(parse_incident_number("INC123").unwrap().as_str(), "INC123");
    }

    #[test]
    fn blank_or_malformed_numbers_are_rejected() {
        assert_eq!(
            parse_incident_number("%20%20"),
            Err(ModelError::EmptyIncidentNumber)
        );
        assert_eq!(
            parse_incident_number("%FF"),
            Err(ModelError::MalformedIncidentNumber)
        );
    }
}
