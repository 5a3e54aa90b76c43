use super::types::ErrorResponse;
use crate::relay::RelayError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Error returned by handlers, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        if err.is_bad_request() {
            Self::bad_request(err.to_string())
        } else {
            Self::internal(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_relay_error_status_mapping() {
        let cases = [
            (RelayError::Rejected("short".into()), StatusCode::BAD_REQUEST),
            (
                RelayError::Misconfigured("no key".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                RelayError::Storage("disk full".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                RelayError::Provider {
                    kind: ProviderErrorKind::InvalidInput,
                    message: "bad".into(),
                    bad_request: true,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                RelayError::Provider {
                    kind: ProviderErrorKind::Transient,
                    message: "timeout".into(),
                    bad_request: false,
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status, expected);
        }
    }
}
