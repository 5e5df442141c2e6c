use serde::Serialize;
use axum::Json;
use axum::http::StatusCode;

use crate::api::models::ErrorResponse;
use crate::error::AppError;

pub fn success<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

/// Error body for a failed request; `with_details` adds the full error rendering.
pub fn error(err: &AppError, with_details: bool) -> (StatusCode, Json<ErrorResponse>) {
    (
        err.status_code(),
        Json(ErrorResponse {
            error: err.to_string(),
            stack: with_details.then(|| format!("{err:?}")),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_hides_details_by_default() {
        let err = AppError::AuditFailure("net::ERR_CONNECTION_REFUSED".to_string());
        let (status, Json(body)) = error(&err, false);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Audit failed: net::ERR_CONNECTION_REFUSED");
        assert!(body.stack.is_none());
    }

    #[test]
    fn error_includes_details_in_development() {
        let err = AppError::MalformedBaseUrl("\"::\"".to_string());
        let (_, Json(body)) = error(&err, true);
        assert!(body.stack.unwrap().starts_with("MalformedBaseUrl"));
    }
}
