//! Core types shared across Bulwark components.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unix epoch seconds with sub-second precision
pub type Timestamp = f64;

/// Persisted state of a known account.
///
/// Field names on disk follow the store format used by `users.json`:
/// `password`, `failed_attempts`, `last_attempt`, `locked_until`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Hex digest of the credential
    #[serde(rename = "password")]
    pub digested_credential: String,

    /// Failures since the last success or window expiry
    pub failed_attempts: u32,

    /// Time of the last counted attempt
    pub last_attempt: Timestamp,

    /// Account refuses logins until this time
    pub locked_until: Timestamp,
}

impl AccountRecord {
    pub fn new(digested_credential: String) -> Self {
        Self {
            digested_credential,
            failed_attempts: 0,
            last_attempt: 0.0,
            locked_until: 0.0,
        }
    }

    /// Check if the lock is still in force at `now`
    pub fn is_locked_at(&self, now: Timestamp) -> bool {
        self.locked_until > now
    }
}

/// Result of a single login verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStatus {
    /// Credential matched
    Success,
    /// Wrong password or unknown user; retry immediately
    InvalidCredentials,
    /// Too many failures inside the rate-limit window
    RateLimited,
    /// Account locked; retry after `remaining_secs`, then solve a CAPTCHA
    Locked { remaining_secs: u64 },
    /// A CAPTCHA must be solved before the next attempt
    CaptchaRequired,
}

impl LoginStatus {
    /// Seconds the caller must wait before retrying, if any
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::Locked { remaining_secs } => Some(*remaining_secs),
            _ => None,
        }
    }

    /// Human-readable reason shown to whoever is typing
    pub fn message(&self) -> String {
        match self {
            Self::Success => "Login successful".to_string(),
            Self::InvalidCredentials => "Invalid username or password".to_string(),
            Self::RateLimited => "Too many attempts. Please wait before trying again".to_string(),
            Self::Locked { remaining_secs } => {
                format!("You cannot attempt again for {} seconds", remaining_secs)
            }
            Self::CaptchaRequired => "CAPTCHA required before next attempt".to_string(),
        }
    }
}

impl fmt::Display for LoginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Category label attached to every event-log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventCategory {
    Info,
    Warning,
    Error,
    Attack,
    Success,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Attack => "ATTACK",
            Self::Success => "SUCCESS",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One point on an attack timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// Seconds since the attack started
    pub elapsed_secs: f64,

    /// Index of the submission this point belongs to (1-based)
    pub attempt_index: u32,
}

/// A candidate actually submitted to verification
pub type AttemptRecord = TimelinePoint;

/// The engine answered `RateLimited`
pub type RateLimitEvent = TimelinePoint;

/// The engine answered `Locked`
pub type LockoutEvent = TimelinePoint;

/// How an attack run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttackOutcome {
    /// A candidate matched
    Found { password: String },
    /// Every candidate was tried without success
    Exhausted,
    /// A wait was interrupted before the list was exhausted
    Cancelled,
}

/// Everything the attacker hands to a reporting sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackReport {
    /// Username under attack
    pub target: String,

    /// How the run ended
    pub outcome: AttackOutcome,

    /// One entry per submitted candidate
    pub attempts: Vec<AttemptRecord>,

    /// Rate-limit responses
    pub rate_limits: Vec<RateLimitEvent>,

    /// Lockout responses
    pub lockouts: Vec<LockoutEvent>,

    /// Wall-clock start of the run
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AttackReport {
    pub fn new(target: String) -> Self {
        Self {
            target,
            outcome: AttackOutcome::Exhausted,
            attempts: Vec::new(),
            rate_limits: Vec::new(),
            lockouts: Vec::new(),
            started_at: chrono::Utc::now(),
        }
    }

    /// The password that worked, if any
    pub fn found_password(&self) -> Option<&str> {
        match &self.outcome {
            AttackOutcome::Found { password } => Some(password),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_record_wire_names() {
        let record = AccountRecord {
            digested_credential: "abc".to_string(),
            failed_attempts: 2,
            last_attempt: 10.5,
            locked_until: 40.5,
        };
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["password"], "abc");
        assert_eq!(value["failed_attempts"], 2);
        assert_eq!(value["last_attempt"], 10.5);
        assert_eq!(value["locked_until"], 40.5);
    }

    #[test]
    fn test_account_record_accepts_integer_timestamps() {
        let json = r#"{"password": "abc", "failed_attempts": 0, "last_attempt": 0, "locked_until": 0}"#;
        let record: AccountRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, AccountRecord::new("abc".to_string()));
        assert!(!record.is_locked_at(0.0));
    }

    #[test]
    fn test_login_status_messages() {
        let locked = LoginStatus::Locked { remaining_secs: 30 };
        assert_eq!(locked.message(), "You cannot attempt again for 30 seconds");
        assert_eq!(locked.retry_after_secs(), Some(30));
        assert_eq!(LoginStatus::RateLimited.retry_after_secs(), None);
    }

    #[test]
    fn test_event_category_labels() {
        assert_eq!(EventCategory::Attack.to_string(), "ATTACK");
        assert_eq!(
            serde_json::to_string(&EventCategory::Warning).unwrap(),
            "\"WARNING\""
        );
    }
}
