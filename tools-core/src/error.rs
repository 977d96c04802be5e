//! Error taxonomy shared by the clock, weather and tool layers.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    /// A provider answered with a non-success status.
    #[error("{endpoint} request failed with status {status}: {body}")]
    Http {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    /// The geocoder returned an empty match sequence.
    #[error("No location found for '{0}'")]
    NoMatch(String),

    /// A provider response did not have the expected shape.
    #[error("Unexpected provider response: {0}")]
    Data(String),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid tool call: {0}")]
    ToolCall(String),
}

impl ToolError {
    pub fn is_http_error(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    /// Empty or malformed provider data, including "no match".
    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::NoMatch(_) | Self::Data(_))
    }

    /// Status code for HTTP errors, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
