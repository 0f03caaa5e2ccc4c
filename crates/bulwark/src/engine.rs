//! Authentication defense engine.
//!
//! Owns the account records loaded from the [`UserStore`] plus per-username
//! runtime counters (CAPTCHA cadence, lockout history, unknown-user
//! lockouts). Runtime counters are never persisted and live as long as the
//! engine.
//!
//! `verify_login` runs its checks in a fixed order, each short-circuiting:
//! CAPTCHA gate, lockout, unknown user, rate limit, digest comparison.

use std::collections::HashMap;
use std::sync::Arc;

use bulwark_common::{AccountRecord, EventCategory, LoginStatus, Timestamp};
use tracing::{debug, error, info, warn};

use crate::captcha::{AnswerProvider, CaptchaVerdict, ChallengeGenerator};
use crate::clock::Clock;
use crate::config::{CaptchaConfig, DefenseConfig};
use crate::digest::digest;
use crate::store::{UserStore, Users};

/// Per-username counters that exist whether or not the username is known
#[derive(Debug, Clone, Default)]
struct RuntimeState {
    /// Verifications against an unknown username
    attempt_tally: u32,
    /// `attempt_tally` at the most recent unknown-user lockout
    lockout_mark: u32,
    /// Invocations of `should_show_captcha`
    captcha_checks: u32,
    /// Lockouts served; only ever grows
    lockout_count: u32,
    /// Sticky until a CAPTCHA is solved
    captcha_required: bool,
}

/// Login defense state machine
pub struct DefenseEngine {
    policy: DefenseConfig,
    store: Box<dyn UserStore>,
    clock: Arc<dyn Clock>,
    challenges: ChallengeGenerator,
    captcha_max_attempts: u32,
    users: Users,
    runtime: HashMap<String, RuntimeState>,
    unknown_lockouts: HashMap<String, Timestamp>,
    total_attempts: u64,
}

impl DefenseEngine {
    /// Build an engine, loading accounts from `store`.
    ///
    /// A store that cannot be read is logged and treated as empty.
    pub fn new(
        policy: DefenseConfig,
        captcha: &CaptchaConfig,
        store: Box<dyn UserStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let users = match store.load() {
            Ok(users) => users,
            Err(e) => {
                error!(
                    category = %EventCategory::Error,
                    error = %e,
                    "Failed to load user store, starting empty"
                );
                Users::new()
            }
        };

        debug!(accounts = users.len(), "User store loaded");

        Self {
            policy,
            store,
            clock,
            challenges: ChallengeGenerator::new(captcha.min_number, captcha.max_number),
            captcha_max_attempts: captcha.max_attempts,
            users,
            runtime: HashMap::new(),
            unknown_lockouts: HashMap::new(),
            total_attempts: 0,
        }
    }

    /// Current time according to the engine's clock
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    #[cfg(test)]
    pub fn account(&self, username: &str) -> Option<&AccountRecord> {
        self.users.get(username)
    }

    /// Failed verifications across every username since startup
    pub fn total_attempts(&self) -> u64 {
        self.total_attempts
    }

    /// Lockouts served by `username` so far
    pub fn lockout_count(&self, username: &str) -> u32 {
        self.runtime.get(username).map_or(0, |s| s.lockout_count)
    }

    /// Verify a credential, applying every defense in order
    pub fn verify_login(&mut self, username: &str, credential: &str) -> LoginStatus {
        if self.is_captcha_required(username) {
            return LoginStatus::CaptchaRequired;
        }

        let now = self.clock.now();

        if let Some(remaining_secs) = self.check_account_lockout(username) {
            warn!(
                category = %EventCategory::Warning,
                username,
                remaining_secs,
                "Account locked"
            );
            return LoginStatus::Locked { remaining_secs };
        }

        if !self.users.contains_key(username) {
            return self.reject_unknown(username, now);
        }

        if self.check_rate_limit(username) {
            warn!(category = %EventCategory::Warning, username, "Rate limit exceeded");
            return LoginStatus::RateLimited;
        }

        let Some(user) = self.users.get_mut(username) else {
            return LoginStatus::InvalidCredentials;
        };

        if user.digested_credential == digest(credential) {
            user.failed_attempts = 0;
            user.last_attempt = now;
            self.persist();
            info!(category = %EventCategory::Info, username, "Successful login");
            return LoginStatus::Success;
        }

        user.failed_attempts += 1;
        user.last_attempt = now;
        let failed_attempts = user.failed_attempts;
        self.total_attempts += 1;

        if failed_attempts >= self.policy.max_login_attempts {
            let duration = self.calculate_lockout_duration(username);
            if let Some(user) = self.users.get_mut(username) {
                user.locked_until = now + duration as f64;
            }
            self.persist();
            warn!(
                category = %EventCategory::Warning,
                username,
                failed_attempts,
                lockout_secs = duration,
                "Account locked due to too many failed attempts"
            );
            return LoginStatus::Locked {
                remaining_secs: duration,
            };
        }

        self.persist();
        warn!(
            category = %EventCategory::Warning,
            username,
            failed_attempts,
            "Failed login attempt"
        );
        LoginStatus::InvalidCredentials
    }

    /// Unknown usernames are throttled like real ones so that the absence of
    /// throttling cannot reveal which accounts exist.
    fn reject_unknown(&mut self, username: &str, now: Timestamp) -> LoginStatus {
        warn!(
            category = %EventCategory::Warning,
            username,
            "Login attempt for non-existent user"
        );
        self.total_attempts += 1;

        let max = self.policy.max_login_attempts;
        let state = self.runtime.entry(username.to_string()).or_default();
        state.attempt_tally += 1;
        if state.attempt_tally - state.lockout_mark < max {
            return LoginStatus::InvalidCredentials;
        }
        state.lockout_mark = state.attempt_tally;

        let duration = self.calculate_lockout_duration(username);
        self.unknown_lockouts
            .insert(username.to_string(), now + duration as f64);
        warn!(
            category = %EventCategory::Warning,
            username,
            lockout_secs = duration,
            "Non-existent user locked out"
        );
        LoginStatus::Locked {
            remaining_secs: duration,
        }
    }

    /// Lockout length for the next lockout of `username`; records the lockout.
    ///
    /// `initial + served * increment`, strictly increasing per username.
    pub fn calculate_lockout_duration(&mut self, username: &str) -> u64 {
        let state = self.runtime.entry(username.to_string()).or_default();
        let duration = self.policy.initial_lockout_secs
            + u64::from(state.lockout_count) * self.policy.lockout_increment_secs;
        state.lockout_count += 1;
        duration
    }

    /// True while a known user sits at or above the rate-limit threshold
    /// inside the window. An expired window clears the failure count.
    pub fn check_rate_limit(&mut self, username: &str) -> bool {
        let now = self.clock.now();
        let window = self.policy.rate_limit_window_secs as f64;
        let threshold = self.policy.rate_limit_attempts;

        let Some(user) = self.users.get_mut(username) else {
            return false;
        };

        if now - user.last_attempt > window {
            user.failed_attempts = 0;
            user.last_attempt = now;
            return false;
        }

        user.failed_attempts >= threshold
    }

    /// Whole seconds left on a lockout (rounded up), or `None` when not locked
    pub fn check_account_lockout(&self, username: &str) -> Option<u64> {
        let now = self.clock.now();

        let locked_until = match self.users.get(username) {
            Some(user) if user.is_locked_at(now) => user.locked_until,
            Some(_) => return None,
            None => *self.unknown_lockouts.get(username).filter(|until| **until > now)?,
        };

        Some(((locked_until - now).ceil() as u64).max(1))
    }

    /// Count a CAPTCHA check for `username`; every Nth check demands a challenge.
    ///
    /// Every invocation counts, including ones made after a successful login
    /// and ones for unknown usernames.
    pub fn should_show_captcha(&mut self, username: &str) -> bool {
        let every = self.policy.captcha_trigger_after.max(1);
        let state = self.runtime.entry(username.to_string()).or_default();
        state.captcha_checks += 1;

        if state.captcha_checks % every == 0 {
            state.captcha_required = true;
            debug!(username, checks = state.captcha_checks, "CAPTCHA triggered");
            return true;
        }
        false
    }

    pub fn is_captcha_required(&self, username: &str) -> bool {
        self.runtime
            .get(username)
            .is_some_and(|s| s.captcha_required)
    }

    /// Demand a CAPTCHA before the next attempt
    pub fn require_captcha(&mut self, username: &str) {
        self.runtime
            .entry(username.to_string())
            .or_default()
            .captcha_required = true;
    }

    /// Present challenges until one is answered correctly.
    ///
    /// Wrong or non-numeric replies get a fresh challenge. Retries are
    /// unbounded unless `captcha.max_attempts` is set. Returns false when the
    /// provider runs out of answers or the bound is reached; the flag stays
    /// as it was.
    pub async fn solve_captcha<P: AnswerProvider>(&mut self, username: &str, provider: &mut P) -> bool {
        let mut replies = 0u32;

        loop {
            if self.captcha_max_attempts > 0 && replies >= self.captcha_max_attempts {
                warn!(
                    category = %EventCategory::Warning,
                    username,
                    replies,
                    "CAPTCHA attempts exhausted"
                );
                return false;
            }

            let challenge = self.challenges.generate();
            let Some(reply) = provider.answer(&challenge.question).await else {
                debug!(username, "No CAPTCHA answer available");
                return false;
            };
            replies += 1;

            let verdict = match reply.trim().parse::<i64>() {
                Ok(value) if challenge.check(value) => CaptchaVerdict::Correct,
                Ok(_) => CaptchaVerdict::Incorrect,
                Err(_) => CaptchaVerdict::NotANumber,
            };
            provider.verdict(verdict);

            if verdict == CaptchaVerdict::Correct {
                self.runtime
                    .entry(username.to_string())
                    .or_default()
                    .captcha_required = false;
                info!(category = %EventCategory::Info, username, "CAPTCHA solved");
                return true;
            }
        }
    }

    /// Rewrite the store; failures are logged and the in-memory state kept
    fn persist(&self) {
        if let Err(e) = self.store.save(&self.users) {
            error!(
                category = %EventCategory::Error,
                error = %e,
                "Failed to persist user store"
            );
        }
    }
}
