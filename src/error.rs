use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Invalid relay transition: {current} -> {requested}")]
    Lifecycle { current: String, requested: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn provider(kind: ProviderErrorKind, msg: impl Into<String>) -> Self {
        Self::Provider(ProviderError::new(kind, msg))
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Failure classes reported by a remote inference provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Authentication,
    QuotaExceeded,
    InvalidInput,
    Transient,
    Unknown,
}

impl ProviderErrorKind {
    /// Whether the failure is attributable to the caller's key, quota or input
    /// rather than to the provider itself.
    pub fn is_client_fault(self) -> bool {
        matches!(
            self,
            Self::Authentication | Self::QuotaExceeded | Self::InvalidInput
        )
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Authentication => "authentication failed",
            Self::QuotaExceeded => "quota exceeded",
            Self::InvalidInput => "invalid input",
            Self::Transient => "provider unavailable",
            Self::Unknown => "provider error",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Provider error ({kind}): {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<async_openai::error::OpenAIError> for ProviderError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        use async_openai::error::OpenAIError;

        let kind = match &err {
            OpenAIError::ApiError(api) => {
                let error_type = api.r#type.as_deref().unwrap_or_default();
                let message = api.message.to_ascii_lowercase();
                if message.contains("api key") || error_type == "authentication_error" {
                    ProviderErrorKind::Authentication
                } else if error_type == "insufficient_quota" || message.contains("rate limit") {
                    ProviderErrorKind::QuotaExceeded
                } else if error_type == "invalid_request_error" {
                    ProviderErrorKind::InvalidInput
                } else {
                    ProviderErrorKind::Unknown
                }
            }
            OpenAIError::Reqwest(e) if e.is_timeout() || e.is_connect() => {
                ProviderErrorKind::Transient
            }
            OpenAIError::InvalidArgument(_) => ProviderErrorKind::InvalidInput,
            _ => ProviderErrorKind::Unknown,
        };

        Self::new(kind, err.to_string())
    }
}

impl From<async_openai::error::OpenAIError> for Error {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        Self::Provider(err.into())
    }
}
