//! Scripted brute-force attacker.
//!
//! Walks a candidate list against the [`DefenseEngine`] through its public
//! contract only, obeying every defensive signal: waits out lockouts and rate
//! limits, solves CAPTCHAs when demanded, and skips a candidate when a
//! CAPTCHA cannot be solved.
//!
//! ```text
//! locked? ──► countdown ──► CAPTCHA ──┐
//! CAPTCHA required? ──► solve ────────┤ (unsolved: skip candidate)
//! verify_login ──► RateLimited: wait window, next
//!              ──► Locked(d):   countdown d, CAPTCHA, next
//!              ──► Success:     stop
//!              ──► failure:     should_show_captcha? solve; delay, next
//! ```

use std::time::Duration;

use bulwark_common::{
    AttackOutcome, AttackReport, BulwarkError, EventCategory, LoginStatus, TimelinePoint,
};
use tracing::{error, info, warn};

use crate::candidates::CandidateSource;
use crate::captcha::AnswerProvider;
use crate::engine::DefenseEngine;
use crate::report::ReportSink;
use crate::wait::{Waiter, countdown_bar, update_countdown};

/// Attacker pacing
#[derive(Debug, Clone)]
pub struct AttackSettings {
    /// Pause between submissions that drew no rate limit or lockout
    pub delay: Duration,
    /// Pause after a rate-limit response
    pub rate_limit_wait: Duration,
    /// Draw countdown bars on the terminal
    pub show_progress: bool,
}

/// Brute-force attack against one username
pub struct BruteForceAttack<'a, W, P> {
    engine: &'a mut DefenseEngine,
    waiter: W,
    solver: P,
    settings: AttackSettings,
}

impl<'a, W: Waiter, P: AnswerProvider> BruteForceAttack<'a, W, P> {
    pub fn new(engine: &'a mut DefenseEngine, waiter: W, solver: P, settings: AttackSettings) -> Self {
        Self {
            engine,
            waiter,
            solver,
            settings,
        }
    }

    /// Run the attack and hand the timelines to `sink`.
    ///
    /// Fails with [`BulwarkError::CandidateSourceUnavailable`] when the list is
    /// missing or empty; the engine is untouched in that case.
    pub async fn simulate_attack(
        &mut self,
        target: &str,
        source: &dyn CandidateSource,
        sink: &mut dyn ReportSink,
    ) -> Result<AttackReport, BulwarkError> {
        let report = self.run(target, source).await?;

        if !report.attempts.is_empty() {
            if let Err(e) = sink.publish(&report) {
                error!(category = %EventCategory::Error, error = %e, "Failed to publish attack report");
            }
        }

        Ok(report)
    }

    /// Run the attack without reporting
    pub async fn run(
        &mut self,
        target: &str,
        source: &dyn CandidateSource,
    ) -> Result<AttackReport, BulwarkError> {
        let candidates = match source.load() {
            Ok(candidates) if !candidates.is_empty() => candidates,
            Ok(_) => {
                let err = BulwarkError::CandidateSourceUnavailable("candidate list is empty".to_string());
                error!(category = %EventCategory::Error, error = %err, "No passwords to try");
                return Err(err);
            }
            Err(e) => {
                error!(category = %EventCategory::Error, error = %e, "No passwords to try");
                return Err(e);
            }
        };

        let mut report = AttackReport::new(target.to_string());

        info!(
            category = %EventCategory::Attack,
            target,
            candidates = candidates.len(),
            "Starting brute force attack"
        );
        println!("\nAttack Progress:");
        println!("{}", "-".repeat(50));

        match self.try_candidates(target, &candidates, &mut report).await {
            Ok(()) => {}
            Err(BulwarkError::Cancelled) => {
                warn!(
                    category = %EventCategory::Warning,
                    target,
                    attempts = report.attempts.len(),
                    "Attack cancelled"
                );
                report.outcome = AttackOutcome::Cancelled;
            }
            Err(e) => return Err(e),
        }

        if report.outcome == AttackOutcome::Exhausted {
            info!(
                category = %EventCategory::Attack,
                target,
                attempts = report.attempts.len(),
                "Candidate list exhausted"
            );
        }

        Ok(report)
    }

    async fn try_candidates(
        &mut self,
        target: &str,
        candidates: &[String],
        report: &mut AttackReport,
    ) -> Result<(), BulwarkError> {
        let start = self.engine.now();
        let mut attempt_index = 0u32;

        for password in candidates {
            if let Some(remaining) = self.engine.check_account_lockout(target) {
                println!("\nAccount is currently locked. {} seconds remaining.", remaining);
                if !self.wait_out_lockout(target, remaining).await? {
                    continue;
                }
            }

            if self.engine.is_captcha_required(target) {
                println!("\nCAPTCHA required before next attempt!");
                if !self.solve(target).await {
                    continue;
                }
            }

            attempt_index += 1;
            let point = TimelinePoint {
                elapsed_secs: self.engine.now() - start,
                attempt_index,
            };
            report.attempts.push(point);

            let status = self.engine.verify_login(target, password);

            println!("\nAttempt {}:", attempt_index);
            println!("Trying password: {}", password);
            println!("Result: {}", status);

            match status {
                LoginStatus::RateLimited => {
                    report.rate_limits.push(point);
                    println!("Rate limit triggered - waiting...");
                    self.pause(self.settings.rate_limit_wait).await?;
                    continue;
                }
                LoginStatus::Locked { remaining_secs } => {
                    report.lockouts.push(point);
                    warn!(
                        category = %EventCategory::Attack,
                        target,
                        attempt = attempt_index,
                        lockouts_served = self.engine.lockout_count(target),
                        remaining_secs,
                        "Target locked out"
                    );
                    self.wait_out_lockout(target, remaining_secs).await?;
                    continue;
                }
                LoginStatus::Success => {
                    info!(
                        category = %EventCategory::Success,
                        target,
                        attempts = attempt_index,
                        "Attack successful! Password found: {}",
                        password
                    );
                    report.outcome = AttackOutcome::Found {
                        password: password.clone(),
                    };
                    return Ok(());
                }
                LoginStatus::InvalidCredentials | LoginStatus::CaptchaRequired => {
                    if self.engine.should_show_captcha(target) {
                        println!("\nCAPTCHA triggered!");
                        if !self.solve(target).await {
                            continue;
                        }
                    }
                }
            }

            self.pause(self.settings.delay).await?;
        }

        Ok(())
    }

    /// Count down a lockout, then solve the CAPTCHA that follows it.
    /// `Ok(false)` means the CAPTCHA was not solved.
    async fn wait_out_lockout(&mut self, target: &str, secs: u64) -> Result<bool, BulwarkError> {
        println!("\nAccount locked for {} seconds", secs);
        println!("Waiting for lockout period to end...");

        let total = Duration::from_secs(secs);
        let bar = countdown_bar(total, self.settings.show_progress);
        let result = self
            .waiter
            .wait(total, &mut |remaining| update_countdown(&bar, remaining))
            .await;
        bar.finish_and_clear();
        result?;

        println!("Lockout period ended. Solve CAPTCHA to continue.");
        Ok(self.solve(target).await)
    }

    async fn solve(&mut self, target: &str) -> bool {
        let solved = self.engine.solve_captcha(target, &mut self.solver).await;
        if !solved {
            println!("CAPTCHA failed - skipping attempt");
        }
        solved
    }

    async fn pause(&mut self, duration: Duration) -> Result<(), BulwarkError> {
        if duration.is_zero() {
            return Ok(());
        }
        self.waiter.wait(duration, &mut |_| {}).await
    }
}
