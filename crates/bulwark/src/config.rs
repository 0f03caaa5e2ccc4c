//! Configuration management for Bulwark.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use bulwark_common::BulwarkError;
use bulwark_common::constants::{
    ATTACK_DELAY_SECS, CAPTCHA_MAX_NUMBER, CAPTCHA_MIN_NUMBER, CAPTCHA_OPERAND_LIMIT,
    CAPTCHA_TRIGGER_AFTER, DEFAULT_PASSWORD_LIST_FILE, DEFAULT_USERS_FILE, INITIAL_LOCKOUT_SECS,
    LOCKOUT_INCREMENT_SECS, MAX_LOGIN_ATTEMPTS, RATE_LIMIT_ATTEMPTS, RATE_LIMIT_WINDOW_SECS,
};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Lockout, rate-limit and CAPTCHA cadence policy
    #[serde(default)]
    pub defense: DefenseConfig,

    /// CAPTCHA challenge configuration
    #[serde(default)]
    pub captcha: CaptchaConfig,

    /// Store and candidate list locations
    #[serde(default)]
    pub files: FilesConfig,

    /// Attacker pacing
    #[serde(default)]
    pub attack: AttackConfig,
}

/// Defense engine policy
#[derive(Debug, Clone, Deserialize)]
pub struct DefenseConfig {
    /// Failures that lock an account
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: u32,

    /// First lockout length in seconds
    #[serde(default = "default_initial_lockout")]
    pub initial_lockout_secs: u64,

    /// Seconds added per lockout already served
    #[serde(default = "default_lockout_increment")]
    pub lockout_increment_secs: u64,

    /// Failures inside the window that trigger rate limiting
    #[serde(default = "default_rate_limit_attempts")]
    pub rate_limit_attempts: u32,

    /// Rate-limit window in seconds
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,

    /// Every Nth CAPTCHA check demands a challenge
    #[serde(default = "default_captcha_trigger_after")]
    pub captcha_trigger_after: u32,
}

impl Default for DefenseConfig {
    fn default() -> Self {
        Self {
            max_login_attempts: default_max_login_attempts(),
            initial_lockout_secs: default_initial_lockout(),
            lockout_increment_secs: default_lockout_increment(),
            rate_limit_attempts: default_rate_limit_attempts(),
            rate_limit_window_secs: default_rate_limit_window(),
            captcha_trigger_after: default_captcha_trigger_after(),
        }
    }
}

/// CAPTCHA-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaConfig {
    /// Smallest operand
    #[serde(default = "default_captcha_min")]
    pub min_number: i64,

    /// Largest operand
    #[serde(default = "default_captcha_max")]
    pub max_number: i64,

    /// Replies allowed per solve; 0 retries forever
    #[serde(default)]
    pub max_attempts: u32,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            min_number: default_captcha_min(),
            max_number: default_captcha_max(),
            max_attempts: 0,
        }
    }
}

/// File locations
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// JSON user store
    #[serde(default = "default_users_file")]
    pub users_file: PathBuf,

    /// Candidate credentials, one per line
    #[serde(default = "default_password_list")]
    pub password_list: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            users_file: default_users_file(),
            password_list: default_password_list(),
        }
    }
}

/// Attacker configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AttackConfig {
    /// Pause between submissions in seconds
    #[serde(default = "default_attack_delay")]
    pub delay_secs: f64,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            delay_secs: default_attack_delay(),
        }
    }
}

// Default value functions
fn default_max_login_attempts() -> u32 { MAX_LOGIN_ATTEMPTS }
fn default_initial_lockout() -> u64 { INITIAL_LOCKOUT_SECS }
fn default_lockout_increment() -> u64 { LOCKOUT_INCREMENT_SECS }
fn default_rate_limit_attempts() -> u32 { RATE_LIMIT_ATTEMPTS }
fn default_rate_limit_window() -> u64 { RATE_LIMIT_WINDOW_SECS }
fn default_captcha_trigger_after() -> u32 { CAPTCHA_TRIGGER_AFTER }
fn default_captcha_min() -> i64 { CAPTCHA_MIN_NUMBER }
fn default_captcha_max() -> i64 { CAPTCHA_MAX_NUMBER }
fn default_users_file() -> PathBuf { PathBuf::from(DEFAULT_USERS_FILE) }
fn default_password_list() -> PathBuf { PathBuf::from(DEFAULT_PASSWORD_LIST_FILE) }
fn default_attack_delay() -> f64 { ATTACK_DELAY_SECS }

impl AppConfig {
    /// Load configuration from file and `BULWARK_*` environment, with CLI overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        let mut builder = config::Config::builder();

        if Path::new(config_path).exists() {
            builder = builder.add_source(config::File::with_name(config_path));
        } else {
            // Use defaults if config file doesn't exist
            tracing::warn!(path = config_path, "Config file not found, using defaults");
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("BULWARK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load config")?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .context("Failed to parse config")?;

        // Apply CLI overrides
        if let Some(ref users_file) = args.users_file {
            config.files.users_file = users_file.clone();
        }
        if let Some(ref password_list) = args.password_list {
            config.files.password_list = password_list.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject policies the engine cannot run with
    pub fn validate(&self) -> Result<(), BulwarkError> {
        if self.defense.max_login_attempts == 0 {
            return Err(BulwarkError::Config(
                "defense.max_login_attempts must be at least 1".to_string(),
            ));
        }
        if self.defense.captcha_trigger_after == 0 {
            return Err(BulwarkError::Config(
                "defense.captcha_trigger_after must be at least 1".to_string(),
            ));
        }
        for bound in [self.captcha.min_number, self.captcha.max_number] {
            if !(-CAPTCHA_OPERAND_LIMIT..=CAPTCHA_OPERAND_LIMIT).contains(&bound) {
                return Err(BulwarkError::Config(format!(
                    "captcha operands must lie within ±{}",
                    CAPTCHA_OPERAND_LIMIT
                )));
            }
        }
        if !self.attack.delay_secs.is_finite() || self.attack.delay_secs < 0.0 {
            return Err(BulwarkError::Config(
                "attack.delay_secs must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_defaults_match_constants() {
        let config = AppConfig::default();
        assert_eq!(config.defense.max_login_attempts, 3);
        assert_eq!(config.defense.initial_lockout_secs, 30);
        assert_eq!(config.defense.lockout_increment_secs, 60);
        assert_eq!(config.defense.rate_limit_attempts, 5);
        assert_eq!(config.defense.rate_limit_window_secs, 60);
        assert_eq!(config.defense.captcha_trigger_after, 3);
        assert_eq!((config.captcha.min_number, config.captcha.max_number), (1, 10));
        assert_eq!(config.captcha.max_attempts, 0);
        assert_eq!(config.files.users_file, PathBuf::from("users.json"));
        assert_eq!(config.attack.delay_secs, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_overrides_and_cli_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[defense]\nmax_login_attempts = 5\ninitial_lockout_secs = 10\n\n[attack]\ndelay_secs = 0.0"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let args = crate::Args::parse_from([
            "bulwark",
            "--config",
            path.as_str(),
            "--users-file",
            "custom.json",
            "seed",
        ]);
        let config = AppConfig::load(&path, &args).unwrap();

        assert_eq!(config.defense.max_login_attempts, 5);
        assert_eq!(config.defense.initial_lockout_secs, 10);
        assert_eq!(config.defense.lockout_increment_secs, 60);
        assert_eq!(config.attack.delay_secs, 0.0);
        assert_eq!(config.files.users_file, PathBuf::from("custom.json"));
        assert_eq!(config.files.password_list, PathBuf::from("password_list.txt"));
    }

    #[test]
    fn test_zero_trigger_is_rejected() {
        let mut config = AppConfig::default();
        config.defense.captcha_trigger_after = 0;
        assert!(matches!(config.validate(), Err(BulwarkError::Config(_))));
    }

    #[test]
    fn test_oversized_captcha_operands_are_rejected() {
        let mut config = AppConfig::default();
        config.captcha.max_number = 4_000_000_000;
        assert!(matches!(config.validate(), Err(BulwarkError::Config(_))));

        let mut config = AppConfig::default();
        config.captcha.min_number = -CAPTCHA_OPERAND_LIMIT;
        config.captcha.max_number = CAPTCHA_OPERAND_LIMIT;
        assert!(config.validate().is_ok());
    }
}
