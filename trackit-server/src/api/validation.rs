//! Request validation helpers
//!
//! Required fields are modelled as `Option` in request structs so a missing
//! field reaches the handler and is answered with a descriptive 400, the
//! same as an empty string. Bodies that are not JSON, or carry a field of
//! the wrong type, are rejected by [`JsonBody`] with a 400 as well; query
//! strings that do not deserialize get the same treatment from
//! [`QueryParams`].

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::str::FromStr;
use trackit_common::time::to_iso;

use crate::error::{ApiError, ApiResult};

/// `Json` extractor whose rejection is a 400 [`ApiError`]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::BadRequest(format!(
                "Invalid request body: {}",
                rejection.body_text()
            ))),
        }
    }
}

/// `Query` extractor whose rejection is a 400 [`ApiError`]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::BadRequest(format!(
                "Invalid query string: {}",
                rejection.body_text()
            ))),
        }
    }
}

/// A required field that must be present
pub fn require<T>(value: Option<T>, field: &str) -> ApiResult<T> {
    value.ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}

/// A required string field that must be present and non-blank
pub fn require_text(value: Option<String>, field: &str) -> ApiResult<String> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(ApiError::BadRequest(format!("{field} is required"))),
    }
}

/// Blank optional strings count as absent
pub fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Parse an enumerated value such as a status or priority
pub fn parse_enum<T>(value: &str, field: &str) -> ApiResult<T>
where
    T: FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e: String| ApiError::BadRequest(format!("{field}: {e}")))
}

/// `HH:MM` wall-clock time, returned normalized
pub fn parse_clock_time(value: &str, field: &str) -> ApiResult<String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| ApiError::BadRequest(format!("{field} must be HH:MM, got {value:?}")))
}

/// `YYYY-MM-DD` calendar date, returned normalized
pub fn parse_date(value: &str, field: &str) -> ApiResult<String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| ApiError::BadRequest(format!("{field} must be YYYY-MM-DD, got {value:?}")))
}

/// RFC 3339 timestamp, returned as UTC with milliseconds
pub fn parse_timestamp(value: &str, field: &str) -> ApiResult<String> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| to_iso(ts.with_timezone(&Utc)))
        .map_err(|_| ApiError::BadRequest(format!("{field} must be an RFC 3339 timestamp, got {value:?}")))
}

/// RFC 3339 timestamp or bare date (taken as midnight UTC)
pub fn parse_date_or_timestamp(value: &str, field: &str) -> ApiResult<String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(to_iso(ts.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| to_iso(dt.and_utc()))
        .ok_or_else(|| ApiError::BadRequest(format!("{field} must be a date or timestamp, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackit_common::db::models::AttendanceStatus;

    #[test]
    fn test_require_text_rejects_blank() {
        assert!(require_text(Some("  ".into()), "name").is_err());
        assert!(require_text(None, "name").is_err());
        assert_eq!(require_text(Some("CS".into()), "name").unwrap(), "CS");
    }

    #[test]
    fn test_parse_enum_reports_field() {
        let err = parse_enum::<AttendanceStatus>("HERE", "status").unwrap_err();
        assert!(err.to_string().starts_with("status:"));
    }

    #[test]
    fn test_time_and_date_formats() {
        assert_eq!(parse_clock_time("9:05", "startTime").unwrap(), "09:05");
        assert!(parse_clock_time("25:00", "startTime").is_err());
        assert_eq!(parse_date("2025-03-01", "date").unwrap(), "2025-03-01");
        assert!(parse_date("03/01/2025", "date").is_err());
    }

    #[test]
    fn test_timestamps_normalize_to_utc() {
        assert_eq!(
            parse_timestamp("2025-03-01T10:00:00+02:00", "startTime").unwrap(),
            "2025-03-01T08:00:00.000Z"
        );
        assert_eq!(
            parse_date_or_timestamp("2026-06-30", "targetDate").unwrap(),
            "2026-06-30T00:00:00.000Z"
        );
        assert!(parse_date_or_timestamp("soon", "targetDate").is_err());
    }
}
