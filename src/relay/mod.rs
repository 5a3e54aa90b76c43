//! Per-endpoint request relays.
//!
//! Each relay validates its input, hands a provider-specific payload to an
//! injected provider and turns the outcome into a [`Reply`] according to the
//! endpoint's [`FailurePolicy`].

mod lifecycle;
mod policy;
pub mod prompts;
mod recommend;
mod summary;
mod titles;
mod transcribe;

pub use lifecycle::{RelayEvent, RelayLifecycle, RelayStage};
pub use policy::{FailurePolicy, Relay, RelayError, Relayed, Reply};
pub use recommend::{FALLBACK_RECOMMENDATION, FALLBACK_WARNING, RecommendationRelay};
pub use summary::SummaryRelay;
pub use titles::{TitleRelay, TitleSuggestion};
pub use transcribe::{TranscriptionRelay, VideoUpload};

use crate::{Error, Result};

/// Shortest text, in characters, worth sending to a provider.
pub const MIN_TEXT_CHARS: usize = 10;

/// Checks that a text field is present and at least [`MIN_TEXT_CHARS`] long
/// once surrounding whitespace is removed.
pub fn validate_text<'a>(
    text: Option<&'a str>,
    field: &str,
    too_short: &str,
) -> Result<&'a str> {
    let text = text
        .ok_or_else(|| Error::validation(format!("No '{}' field found in the request.", field)))?
        .trim();

    if text.chars().count() < MIN_TEXT_CHARS {
        return Err(Error::validation(too_short));
    }
    Ok(text)
}
