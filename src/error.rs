use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Missing prompt")]
    MissingPrompt,
    #[error("invalid request: {0}")]
    BadRequest(String),
    #[error("Server missing {0}")]
    MissingServerConfig(&'static str),
    /// Upstream answered with a non-success status. The raw body is passed through.
    #[error("{provider} error {status}: {body}")]
    Upstream {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("{provider} request failed: {message}")]
    UpstreamUnreachable {
        provider: &'static str,
        message: String,
    },
    #[error("{provider} returned non-JSON response")]
    MalformedUpstream { provider: &'static str },
    #[error("Image fetch failed: {0}")]
    ImageFetch(String),
    #[error("No image returned")]
    NoImageReturned,
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServiceError::MissingPrompt | ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::MissingServerConfig(_)
            | ServiceError::NoImageReturned
            | ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Upstream { .. }
            | ServiceError::UpstreamUnreachable { .. }
            | ServiceError::MalformedUpstream { .. }
            | ServiceError::ImageFetch(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = serde_json::json!({
            "error": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_carries_status_and_body() {
        let err = ServiceError::Upstream {
            provider: "OpenAI",
            status: 500,
            body: "rate limited".into(),
        };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "OpenAI error 500: rate limited");
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            ServiceError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(ServiceError::MissingPrompt.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServiceError::MissingServerConfig("GEMINI_API_KEY").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::NoImageReturned.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::MalformedUpstream { provider: "Gemini" }.status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
