//! Errors for the authoring and persistence paths
//!
//! Simulation calls never produce these; they degrade silently instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecoilError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unit id {0} leaves no room for another id")]
    IdOverflow(u32),

    #[error("clipboard contains no unit positions")]
    EmptyClipboard,
}

pub type Result<T> = std::result::Result<T, RecoilError>;
