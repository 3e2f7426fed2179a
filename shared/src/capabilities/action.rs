//! Shared result types for fire-and-report platform actions (linking, share sheet).

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalAction {
    OpenInMaps,
    ShareLocation,
}

impl ExternalAction {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::OpenInMaps => "open_in_maps",
            Self::ShareLocation => "share_location",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Completed,
    Dismissed,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActionError {
    #[error("no application can handle {url}")]
    NoHandler { url: String },

    #[error("action not supported on this platform")]
    NotSupported,

    #[error("action failed: {message}")]
    Failed { message: String },
}

pub type ActionResult = Result<ActionOutcome, ActionError>;
