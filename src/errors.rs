//! Error taxonomy for the harness.
//!
//! Only [`ConfigError`] ever propagates out of a suite run: it marks misuse
//! of the harness itself (an empty suite, a plan declared too late). Failed
//! assertions, plan mismatches and aborted case bodies are contained at the
//! case boundary and show up only in counters and report text.

use std::any::Any;
use std::fmt;
use std::panic::Location;

use thiserror::Error;

/// Harness misuse. The one error callers of [`crate::suite::Suite::run`]
/// have to handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("suite '{name}' contains no test cases")]
    EmptySuite { name: String },
    #[error("expect() called after an assertion in '{case}'")]
    PlanAfterAssertion { case: String },
    #[error("plan already declared for '{case}'")]
    PlanRedeclared { case: String },
}

/// The terminal error of a case body that did not run to completion, either
/// returned as `Err` by the test function or recovered from a panic. The
/// suite converts it into a single synthetic failed "case" assertion; it is
/// never propagated further.
#[derive(Debug, Clone)]
pub struct AbortError {
    message: String,
    location: Option<String>,
}

impl AbortError {
    /// Builds an abort carrying the caller's source location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        AbortError {
            message: message.into(),
            location: Some(Location::caller().to_string()),
        }
    }

    /// Recovers an abort from a panic payload. String payloads (the common
    /// `panic!` and `assert!` cases) keep their text; anything else gets a
    /// generic description.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "case body panicked".to_string()
        };
        AbortError {
            message,
            location: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

impl fmt::Display for AbortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AbortError {}

// Lets a case body bail out of harness misuse with `?`; the suite still
// reports the underlying ConfigError to its caller.
impl From<ConfigError> for AbortError {
    fn from(err: ConfigError) -> Self {
        AbortError {
            message: err.to_string(),
            location: None,
        }
    }
}

impl From<String> for AbortError {
    fn from(message: String) -> Self {
        AbortError {
            message,
            location: None,
        }
    }
}

impl From<&str> for AbortError {
    fn from(message: &str) -> Self {
        AbortError {
            message: message.to_string(),
            location: None,
        }
    }
}
