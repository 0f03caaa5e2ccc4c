//! Application state and shared resources.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::attack::AttackSettings;
use crate::clock::SystemClock;
use crate::config::AppConfig;
use crate::console::Console;
use crate::engine::DefenseEngine;
use crate::store::JsonFileStore;
use crate::wait::TokioWaiter;

/// Everything a command needs, built once from configuration
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Defense engine backed by the JSON user store
    pub engine: DefenseEngine,

    /// Flips to `true` on Ctrl-C
    shutdown: watch::Receiver<bool>,
}

impl AppState {
    pub fn new(config: AppConfig, shutdown: watch::Receiver<bool>) -> Self {
        let store = JsonFileStore::new(config.files.users_file.clone());
        tracing::debug!(path = %store.path().display(), "Using user store");
        let engine = DefenseEngine::new(
            config.defense.clone(),
            &config.captcha,
            Box::new(store),
            Arc::new(SystemClock),
        );

        Self {
            config,
            engine,
            shutdown,
        }
    }

    /// Real-time waiter tied to the shutdown signal
    pub fn waiter(&self) -> TokioWaiter {
        TokioWaiter::new(self.shutdown.clone())
    }

    /// Stdin prompter that gives up on Ctrl-C
    pub fn console(&self) -> Console {
        Console::new(self.shutdown.clone())
    }

    pub fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Attacker pacing from configuration
    pub fn attack_settings(&self, show_progress: bool) -> AttackSettings {
        AttackSettings {
            delay: Duration::from_secs_f64(self.config.attack.delay_secs),
            rate_limit_wait: Duration::from_secs(self.config.defense.rate_limit_window_secs),
            show_progress,
        }
    }
}
