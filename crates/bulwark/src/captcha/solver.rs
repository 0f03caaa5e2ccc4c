//! Answer providers for CAPTCHA challenges.

use std::future::Future;

use super::Challenge;

/// How a single reply was judged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptchaVerdict {
    Correct,
    Incorrect,
    NotANumber,
}

/// Something that answers CAPTCHA questions.
///
/// Returning `None` means no answer will ever come (input closed), which
/// ends the solving attempt.
pub trait AnswerProvider {
    fn answer(&mut self, question: &str) -> impl Future<Output = Option<String>>;

    /// Feedback after each reply
    fn verdict(&mut self, _verdict: CaptchaVerdict) {}
}

/// Reads the arithmetic question and answers it, standing in for a
/// CAPTCHA-solving service during unattended attacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoSolver;

impl AnswerProvider for AutoSolver {
    async fn answer(&mut self, question: &str) -> Option<String> {
        let answer = Challenge::evaluate(question);
        tracing::debug!(question, answer = ?answer, "Auto-solving CAPTCHA");
        answer.map(|value| value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captcha::generator::Operator;

    #[test]
    fn test_auto_solver_answers_correctly() {
        let challenge = Challenge::new(6, Operator::Mul, 7);
        let reply = tokio_test::block_on(AutoSolver.answer(&challenge.question)).unwrap();
        assert!(challenge.check(reply.parse().unwrap()));
    }

    #[test]
    fn test_auto_solver_gives_up_on_unknown_format() {
        let reply = tokio_test::block_on(AutoSolver.answer("what colour is the sky?"));
        assert!(reply.is_none());
    }
}
