//! CAPTCHA generation and solving.
//!
//! Challenges are small arithmetic problems. Answers come from an
//! [`AnswerProvider`]: a person at the console, or [`AutoSolver`] for
//! unattended runs.

mod generator;
mod solver;

pub use generator::{Challenge, ChallengeGenerator};
pub use solver::{AnswerProvider, AutoSolver, CaptchaVerdict};
