//! Cancellable waits with progress notification.
//!
//! Lockout countdowns and rate-limit pauses go through [`Waiter`] so timing is
//! decoupled from display and tests can run without sleeping.

use std::future::Future;
use std::time::Duration;

use bulwark_common::BulwarkError;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::watch;

/// Suspends the caller for a duration
pub trait Waiter {
    /// Wait for `duration`, calling `on_tick` with the time still remaining
    /// about once per second and once more with zero at the end.
    ///
    /// Returns [`BulwarkError::Cancelled`] if shutdown is requested first.
    fn wait(
        &mut self,
        duration: Duration,
        on_tick: &mut dyn FnMut(Duration),
    ) -> impl Future<Output = Result<(), BulwarkError>>;
}

/// Real-time waiter on the tokio timer, cancelled by the shutdown channel
#[derive(Debug, Clone)]
pub struct TokioWaiter {
    shutdown: watch::Receiver<bool>,
}

impl TokioWaiter {
    pub fn new(shutdown: watch::Receiver<bool>) -> Self {
        Self { shutdown }
    }
}

impl Waiter for TokioWaiter {
    async fn wait(
        &mut self,
        duration: Duration,
        on_tick: &mut dyn FnMut(Duration),
    ) -> Result<(), BulwarkError> {
        let tick = Duration::from_secs(1);
        let mut remaining = duration;

        while !remaining.is_zero() {
            if *self.shutdown.borrow() {
                return Err(BulwarkError::Cancelled);
            }
            on_tick(remaining);

            let step = remaining.min(tick);
            tokio::select! {
                _ = tokio::time::sleep(step) => {}
                changed = self.shutdown.changed() => {
                    if changed.is_ok() && *self.shutdown.borrow() {
                        return Err(BulwarkError::Cancelled);
                    }
                    // Sender gone or flag cleared; finish this step quietly.
                    tokio::time::sleep(step).await;
                }
            }
            remaining -= step;
        }

        on_tick(Duration::ZERO);
        Ok(())
    }
}

/// Countdown bar for lockout waits
pub fn countdown_bar(total: Duration, visible: bool) -> ProgressBar {
    let target = if visible {
        ProgressDrawTarget::stderr()
    } else {
        ProgressDrawTarget::hidden()
    };

    let bar = ProgressBar::with_draw_target(Some(total.as_secs().max(1)), target);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.yellow} [{bar:30.red/blue}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

/// Advance `bar` to reflect `remaining` out of its total
pub fn update_countdown(bar: &ProgressBar, remaining: Duration) {
    let total = bar.length().unwrap_or(0);
    bar.set_position(total.saturating_sub(remaining.as_secs()));
    bar.set_message(format!("Time remaining: {} seconds", remaining.as_secs()));
}

#[cfg(test)]
pub use clocked::ClockWaiter;

#[cfg(test)]
mod clocked {
    use super::Waiter;
    use crate::clock::ManualClock;
    use bulwark_common::BulwarkError;
    use std::time::Duration;

    /// Moves a manual clock instead of sleeping; can simulate shutdown
    /// after a number of waits.
    #[derive(Debug, Clone)]
    pub struct ClockWaiter {
        clock: ManualClock,
        pub waits: Vec<Duration>,
        cancel_after: Option<usize>,
    }

    impl ClockWaiter {
        pub fn new(clock: ManualClock) -> Self {
            Self {
                clock,
                waits: Vec::new(),
                cancel_after: None,
            }
        }

        pub fn cancel_after(mut self, waits: usize) -> Self {
            self.cancel_after = Some(waits);
            self
        }
    }

    impl Waiter for ClockWaiter {
        async fn wait(
            &mut self,
            duration: Duration,
            on_tick: &mut dyn FnMut(Duration),
        ) -> Result<(), BulwarkError> {
            if self.cancel_after == Some(self.waits.len()) {
                return Err(BulwarkError::Cancelled);
            }
            on_tick(duration);
            self.clock.advance(duration.as_secs_f64());
            self.waits.push(duration);
            on_tick(Duration::ZERO);
            Ok(())
        }
    }
}
