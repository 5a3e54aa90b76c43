use crate::{Error, Result};
use tracing::{debug, warn};

// Relay stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayStage {
    Received,
    Validated,
    Stored,
    Dispatched,
    Succeeded,
    Failed,
    Released,
    Responded,
    Rejected,
}

// Relay events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayEvent {
    InputAccepted,
    InputRejected,
    UploadStored,
    ProviderCalled,
    ProviderSucceeded,
    ProviderFailed,
    UploadReleased,
    ResponseReady,
}

/// Tracks one request through
/// `Received -> Validated -> (Stored) -> Dispatched -> Succeeded | Failed -> (Released) -> Responded`.
///
/// Validation, configuration and storage short-circuits end in `Rejected`.
#[derive(Debug)]
pub struct RelayLifecycle {
    endpoint: &'static str,
    stage: RelayStage,
    history: Vec<RelayStage>,
}

impl RelayLifecycle {
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            endpoint,
            stage: RelayStage::Received,
            history: vec![RelayStage::Received],
        }
    }

    pub fn stage(&self) -> RelayStage {
        self.stage
    }

    /// Every stage visited so far, starting with `Received`.
    pub fn history(&self) -> &[RelayStage] {
        &self.history
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.stage, RelayStage::Responded | RelayStage::Rejected)
    }

    pub fn advance(&mut self, event: RelayEvent) -> Result<RelayStage> {
        use RelayEvent as E;
        use RelayStage as S;

        let next = match (self.stage, event) {
            (S::Received, E::InputAccepted) => S::Validated,
            (S::Received, E::InputRejected) => S::Rejected,
            (S::Validated, E::UploadStored) => S::Stored,
            (S::Validated, E::InputRejected) => S::Rejected,
            (S::Validated, E::ProviderCalled) => S::Dispatched,
            (S::Stored, E::ProviderCalled) => S::Dispatched,
            (S::Dispatched, E::ProviderSucceeded) => S::Succeeded,
            (S::Dispatched, E::ProviderFailed) => S::Failed,
            (S::Succeeded | S::Failed, E::UploadReleased) => S::Released,
            (S::Succeeded | S::Failed | S::Released, E::ResponseReady) => S::Responded,
            (current, event) => {
                warn!(
                    "Invalid relay transition on {} from {:?} with event {:?}",
                    self.endpoint, current, event
                );
                return Err(Error::Lifecycle {
                    current: format!("{:?}", current),
                    requested: format!("{:?}", event),
                });
            }
        };

        debug!(
            "{}: {:?} -> {:?} (event: {:?})",
            self.endpoint, self.stage, next, event
        );
        self.stage = next;
        self.history.push(next);
        Ok(next)
    }
}
