//! HTTP mapping for [`Error`].

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

impl Error {
    /// Stable machine-readable code sent to clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::InvalidDate { .. } => "invalid_date",
            Self::InvalidOperation { .. } => "invalid_operation",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden { .. } => "forbidden",
            Self::Config { .. } | Self::Database(_) | Self::Io(_) | Self::EnvVar(_) => "internal",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidArgument { .. } | Self::InvalidAmount { .. } | Self::InvalidDate { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidOperation { .. } => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) | Self::EnvVar(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details stay in the log
        let message = if status.is_server_error() {
            error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            if matches!(self, Self::Unauthorized | Self::Forbidden { .. }) {
                warn!(error = %self, "Access denied");
            }
            self.to_string()
        };

        let body = Json(json!({
            "error": self.code(),
            "message": message,
        }));
        (status, body).into_response()
    }
}
