//! Unified error handling for dashboard routes.
//!
//! Store failures never reach this type: pages render them as empty
//! tables with a notice (see [`crate::db::Fetched`]).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::export::ExportError;

/// Application-level error type for the dashboard.
#[derive(Debug, Error)]
pub enum AppError {
    /// Requested column selection is invalid.
    #[error("Bad request: {0}")]
    Export(#[from] ExportError),

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Export(_) => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
            Self::Template(_) => {
                // Log server errors with Sentry
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Dashboard request error"
                );
                // Don't expose internal error details to clients
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::from(ExportError::UnknownColumn {
            column: "password".to_string(),
            available: "id".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Bad request: unknown column 'password' (available: id)"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::from(ExportError::UnknownColumn {
                column: "colour".to_string(),
                available: "name".to_string(),
            })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::from(askama::Error::from(std::fmt::Error))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
