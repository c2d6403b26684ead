// Maps a failed model call to a hint the user can act on.
//
// The structured kind is used when the server sent one. Message matching is
// the fallback, and it is brittle: it depends on wording the API is free to
// change.

use crate::api::{ApiError, ApiErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    RateLimited,
    Credential,
    ModelUnavailable,
    Generic,
}

impl Advice {
    pub fn for_error(err: &ApiError) -> Advice {
        match err.kind {
            ApiErrorKind::RateLimited => Advice::RateLimited,
            ApiErrorKind::PermissionDenied => Advice::Credential,
            ApiErrorKind::NotFound => Advice::ModelUnavailable,
            _ => Advice::from_message(&err.to_string()),
        }
    }

    /// Substring table used when no structured kind is available.
    pub fn from_message(message: &str) -> Advice {
        if message.contains("RESOURCE_EXHAUSTED") {
            Advice::RateLimited
        } else if message.contains("PERMISSION_DENIED") || message.contains("API key not valid") {
            Advice::Credential
        } else if message.contains("model is not found") || message.contains("not supported") {
            Advice::ModelUnavailable
        } else {
            Advice::Generic
        }
    }

    /// Lines to show the user. `model` fills in the unavailable-model hint.
    pub fn lines(self, model: &str) -> Vec<String> {
        match self {
            Advice::RateLimited => {
                vec!["You might have hit a rate limit. Wait a bit and try again.".into()]
            }
            Advice::Credential => {
                vec!["Your API key might have issues. Verify permissions in Google AI Studio.".into()]
            }
            Advice::ModelUnavailable => vec![
                format!("The model '{}' might no longer be available.", model),
                "Run `apicheck` to see available models.".into(),
            ],
            Advice::Generic => {
                vec!["Please check your API key, network connection, or try again later.".into()]
            }
        }
    }
}
