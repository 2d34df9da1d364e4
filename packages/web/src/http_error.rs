//! HTTP error handling for the web front end
//!
//! Errors are rendered as HTML pages; the status is derived from the
//! machine-readable code.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use treegraph_core::TreeServiceError;

use crate::views;

/// HTTP error with a user-facing message and a machine-readable code
#[derive(Debug)]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    /// Optional detailed error information, logged but not rendered
    pub details: Option<String>,
}

impl HttpError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: Some(details.into()),
        }
    }

    pub fn node_not_found(uuid: &str) -> Self {
        Self::new(format!("No node for uuid [{}] found", uuid), "NODE_NOT_FOUND")
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "NODE_NOT_FOUND" => StatusCode::NOT_FOUND,
            "INVALID_ARGUMENT" | "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(
                code = %self.code,
                details = self.details.as_deref().unwrap_or_default(),
                "{}",
                self.message
            );
        } else {
            tracing::debug!(code = %self.code, "{}", self.message);
        }

        (status, Html(views::error_page(status, &self.message))).into_response()
    }
}

impl From<TreeServiceError> for HttpError {
    fn from(err: TreeServiceError) -> Self {
        match err {
            TreeServiceError::InvalidArgument(message) => HttpError::new(message, "INVALID_ARGUMENT"),
            TreeServiceError::ValidationFailed(validation) => {
                HttpError::new(validation.to_string(), "VALIDATION_ERROR")
            }
            TreeServiceError::DatabaseError(db_err) => HttpError::with_details(
                "Database operation failed",
                "DATABASE_ERROR",
                db_err.to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treegraph_core::ValidationError;

    #[test]
    fn test_status_from_code() {
        assert_eq!(HttpError::node_not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            HttpError::from(TreeServiceError::invalid_argument("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HttpError::from(TreeServiceError::ValidationFailed(ValidationError::EmptyName)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HttpError::new("boom", "SOMETHING_ELSE").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_response_is_html_page() {
        let response = HttpError::node_not_found("abc").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/html"));
    }
}
