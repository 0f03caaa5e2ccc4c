//! Common error types for Bulwark components.

use thiserror::Error;

/// Hard failures. Adversarial conditions (bad password, lockout, rate limit,
/// CAPTCHA) are never errors; they travel as [`crate::LoginStatus`].
#[derive(Debug, Error)]
pub enum BulwarkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// User store could not be read or written
    #[error("Store error: {0}")]
    Store(String),

    /// Candidate credential list is missing or empty
    #[error("Candidate source unavailable: {0}")]
    CandidateSourceUnavailable(String),

    /// Reporting sink failed
    #[error("Report error: {0}")]
    Report(String),

    /// A wait was interrupted by shutdown
    #[error("Operation cancelled")]
    Cancelled,
}

impl BulwarkError {
    /// Returns true if the failure only ends the current run, not the process
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CandidateSourceUnavailable(_) | Self::Report(_) | Self::Cancelled
        )
    }
}
