use super::lifecycle::{RelayEvent, RelayLifecycle, RelayStage};
use crate::{Error, error::ProviderErrorKind};
use thiserror::Error;
use tracing::{error, warn};

/// What a relay does when dispatch fails. Chosen once per endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum FailurePolicy<T> {
    /// Surface the failure. With `client_faults_as_bad_request`, failures the
    /// provider blames on the caller (key, quota, input) are reported as 400.
    ReturnError { client_faults_as_bad_request: bool },
    /// Answer with a fixed payload, flagged with `warning`.
    ReturnFallback { payload: T, warning: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Success(T),
    Degraded { payload: T, warning: String },
}

impl<T> Reply<T> {
    pub fn payload(&self) -> &T {
        match self {
            Self::Success(payload) | Self::Degraded { payload, .. } => payload,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Degraded { warning, .. } => Some(warning),
        }
    }

    pub fn into_parts(self) -> (T, Option<String>) {
        match self {
            Self::Success(payload) => (payload, None),
            Self::Degraded { payload, warning } => (payload, Some(warning)),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelayError {
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Misconfigured(String),

    #[error("{0}")]
    Storage(String),

    #[error("{message}")]
    Provider {
        kind: ProviderErrorKind,
        message: String,
        bad_request: bool,
    },

    #[error("{0}")]
    Internal(String),
}

impl RelayError {
    pub fn is_bad_request(&self) -> bool {
        match self {
            Self::Rejected(_) => true,
            Self::Provider { bad_request, .. } => *bad_request,
            _ => false,
        }
    }
}

impl From<Error> for RelayError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => Self::Rejected(msg),
            Error::Config(msg) => Self::Misconfigured(msg),
            Error::Storage(msg) => Self::Storage(msg),
            Error::Io(e) => Self::Storage(e.to_string()),
            Error::Provider(e) => Self::Provider {
                kind: e.kind,
                message: e.to_string(),
                bad_request: false,
            },
            other => Self::Internal(other.to_string()),
        }
    }
}

/// The result of one relayed request together with the stages it visited.
#[derive(Debug)]
pub struct Relayed<T> {
    pub result: Result<Reply<T>, RelayError>,
    pub stages: Vec<RelayStage>,
}

impl<T> Relayed<T> {
    pub fn into_result(self) -> Result<Reply<T>, RelayError> {
        self.result
    }

    pub fn visited(&self, stage: RelayStage) -> bool {
        self.stages.contains(&stage)
    }
}

/// Shared orchestration for one endpoint: applies the failure policy and
/// drives the request lifecycle.
#[derive(Debug, Clone)]
pub struct Relay<T> {
    endpoint: &'static str,
    action: &'static str,
    policy: FailurePolicy<T>,
}

impl<T: Clone> Relay<T> {
    pub fn new(endpoint: &'static str, action: &'static str, policy: FailurePolicy<T>) -> Self {
        Self {
            endpoint,
            action,
            policy,
        }
    }

    pub fn start(&self) -> RelayLifecycle {
        RelayLifecycle::new(self.endpoint)
    }

    /// Ends a request that never reached the provider.
    pub fn reject(&self, mut lifecycle: RelayLifecycle, err: Error) -> Relayed<T> {
        if let Err(e) = lifecycle.advance(RelayEvent::InputRejected) {
            return Self::relayed(lifecycle, Err(e.into()));
        }

        let result = match &self.policy {
            FailurePolicy::ReturnFallback { payload, warning } => {
                warn!("{}: serving fallback without dispatch: {}", self.endpoint, err);
                Ok(Reply::Degraded {
                    payload: payload.clone(),
                    warning: warning.clone(),
                })
            }
            FailurePolicy::ReturnError { .. } => {
                warn!("{}: request rejected: {}", self.endpoint, err);
                Err(err.into())
            }
        };
        Self::relayed(lifecycle, result)
    }

    /// Records the dispatch outcome and applies the failure policy.
    pub fn settle(
        &self,
        lifecycle: &mut RelayLifecycle,
        outcome: crate::Result<T>,
    ) -> Result<Reply<T>, RelayError> {
        let event = if outcome.is_ok() {
            RelayEvent::ProviderSucceeded
        } else {
            RelayEvent::ProviderFailed
        };
        lifecycle.advance(event)?;

        let err = match outcome {
            Ok(payload) => return Ok(Reply::Success(payload)),
            Err(err) => err,
        };

        match &self.policy {
            FailurePolicy::ReturnFallback { payload, warning } => {
                warn!(
                    "{}: provider failed, serving fallback: {}",
                    self.endpoint, err
                );
                Ok(Reply::Degraded {
                    payload: payload.clone(),
                    warning: warning.clone(),
                })
            }
            FailurePolicy::ReturnError {
                client_faults_as_bad_request,
            } => {
                error!("{}: provider failed: {}", self.endpoint, err);
                Err(match RelayError::from(err) {
                    RelayError::Provider { kind, message, .. } => RelayError::Provider {
                        kind,
                        message: format!("{} failed: {}", self.action, message),
                        bad_request: *client_faults_as_bad_request && kind.is_client_fault(),
                    },
                    other => other,
                })
            }
        }
    }

    /// Marks the response as ready and packages the result. A lifecycle that
    /// already ended in `Rejected` is left as is.
    pub fn finish(
        &self,
        mut lifecycle: RelayLifecycle,
        result: Result<Reply<T>, RelayError>,
    ) -> Relayed<T> {
        if lifecycle.is_terminal() {
            return Self::relayed(lifecycle, result);
        }
        if let Err(e) = lifecycle.advance(RelayEvent::ResponseReady) {
            return Self::relayed(lifecycle, Err(e.into()));
        }
        Self::relayed(lifecycle, result)
    }

    fn relayed(lifecycle: RelayLifecycle, result: Result<Reply<T>, RelayError>) -> Relayed<T> {
        Relayed {
            result,
            stages: lifecycle.history().to_vec(),
        }
    }
}
