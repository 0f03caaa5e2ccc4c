//! Shared constants for Bulwark components.

/// Consecutive failures that trigger a lockout
pub const MAX_LOGIN_ATTEMPTS: u32 = 3;

/// Length of the first lockout (seconds)
pub const INITIAL_LOCKOUT_SECS: u64 = 30;

/// Extra seconds added for every lockout already served
pub const LOCKOUT_INCREMENT_SECS: u64 = 60;

/// Failures inside the window that trigger rate limiting
pub const RATE_LIMIT_ATTEMPTS: u32 = 5;

/// Rate-limit window (seconds)
pub const RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Every Nth CAPTCHA check demands a challenge
pub const CAPTCHA_TRIGGER_AFTER: u32 = 3;

/// Smallest operand in an arithmetic challenge
pub const CAPTCHA_MIN_NUMBER: i64 = 1;

/// Largest operand in an arithmetic challenge
pub const CAPTCHA_MAX_NUMBER: i64 = 10;

/// Largest operand magnitude a configuration may ask for
pub const CAPTCHA_OPERAND_LIMIT: i64 = 1_000_000;

/// Default user store location
pub const DEFAULT_USERS_FILE: &str = "users.json";

/// Default candidate list location
pub const DEFAULT_PASSWORD_LIST_FILE: &str = "password_list.txt";

/// Pause between attacker submissions (seconds)
pub const ATTACK_DELAY_SECS: f64 = 0.5;

/// Accounts written by `bulwark seed` when no store exists: (username, password)
pub const DEFAULT_USERS: &[(&str, &str)] = &[("admin", "admin123"), ("user1", "password123")];

/// Candidate list written by `bulwark seed` when none exists
pub const COMMON_PASSWORDS: &[&str] = &[
    "password123",
    "admin123",
    "123456",
    "qwerty",
    "letmein",
    "welcome",
    "monkey123",
    "dragon",
    "baseball",
    "football",
    "superman",
    "trustno1",
    "iloveyou",
    "sunshine",
    "master",
    "hello123",
    "shadow",
    "ashley",
    "michael",
    "hunter",
];
