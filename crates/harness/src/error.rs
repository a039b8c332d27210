//! Error types for the MuniQA harness

use thiserror::Error;

/// Result type alias using the harness error
pub type HarnessResult<T> = std::result::Result<T, HarnessError>;

/// Failures are classified by cause, not just "timeout vs. everything else";
/// the link checker maps a subset of these onto [`crate::linkcheck::LinkOutcome`].
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("WebDriver endpoint unreachable at {url}: {reason}")]
    DriverUnreachable { url: String, reason: String },

    #[error("failed to open WebDriver session: {0}")]
    NewSession(#[from] fantoccini::error::NewSessionError),

    #[error("WebDriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    #[error("element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("timed out after {seconds}s waiting for {what}")]
    Timeout { what: String, seconds: u64 },

    #[error("no new window opened after clicking '{label}'")]
    NoNewWindow { label: String },

    #[error("navigation landed on unexpected URL: expected part '{expected}', got '{actual}'")]
    UrlMismatch { expected: String, actual: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HarnessError {
    /// Whether a retry of the same operation can plausibly succeed.
    ///
    /// Stale element references and command-level failures are transient on
    /// the portal's re-rendering frontend; a missing session or bad config
    /// is not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            HarnessError::WebDriver(_)
                | HarnessError::ElementNotFound { .. }
                | HarnessError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        let e = HarnessError::ElementNotFound {
            selector: "//a".into(),
        };
        assert!(e.is_transient());

        let e = HarnessError::InvalidConfig("missing url".into());
        assert!(!e.is_transient());
    }
}
