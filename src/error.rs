//! Error types shared by every fallible curses operation.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CursesError {
    /// The terminal could not be put into curses mode. Nothing else is
    /// meaningful on that session afterwards.
    #[error("Failed to initialize terminal: {0}")]
    Init(#[source] io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The terminal lacks a feature (colors, mouse, an attribute). Callers
    /// usually degrade gracefully instead of treating this as a bug.
    #[error("Not supported by this terminal: {0}")]
    CapabilityAbsent(String),

    #[error("No event pending")]
    NoEvent,

    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

impl CursesError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        CursesError::InvalidParameter(msg.into())
    }

    pub(crate) fn unsupported(what: impl Into<String>) -> Self {
        CursesError::CapabilityAbsent(what.into())
    }

    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, CursesError::InvalidParameter(_))
    }

    pub fn is_capability_absent(&self) -> bool {
        matches!(self, CursesError::CapabilityAbsent(_))
    }
}

pub type Result<T> = std::result::Result<T, CursesError>;
