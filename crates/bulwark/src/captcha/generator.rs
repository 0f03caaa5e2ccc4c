//! Arithmetic challenge generation.

use rand::Rng;
use std::fmt;

/// Operator used in a challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
}

impl Operator {
    const ALL: [Operator; 3] = [Operator::Add, Operator::Sub, Operator::Mul];

    /// Widened so no pair of `i64` operands can overflow
    pub fn apply(&self, lhs: i64, rhs: i64) -> i128 {
        let (lhs, rhs) = (i128::from(lhs), i128::from(rhs));
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A question shown to the solver and the answer it must produce
#[derive(Debug, Clone)]
pub struct Challenge {
    /// e.g. `"7 * 3"`
    pub question: String,
    answer: i128,
}

impl Challenge {
    pub fn new(lhs: i64, op: Operator, rhs: i64) -> Self {
        Self {
            question: format!("{} {} {}", lhs, op, rhs),
            answer: op.apply(lhs, rhs),
        }
    }

    /// Check a numeric reply
    pub fn check(&self, reply: i64) -> bool {
        i128::from(reply) == self.answer
    }

    /// Evaluate a question of the form `"<int> <op> <int>"`.
    ///
    /// `None` when malformed or when the result does not fit in an `i64`.
    pub fn evaluate(question: &str) -> Option<i64> {
        let mut parts = question.split_whitespace();
        let lhs = parts.next()?.parse::<i64>().ok()?;
        let op = Operator::from_symbol(parts.next()?)?;
        let rhs = parts.next()?.parse::<i64>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        i64::try_from(op.apply(lhs, rhs)).ok()
    }
}

/// Challenge generator service
#[derive(Debug, Clone)]
pub struct ChallengeGenerator {
    min: i64,
    max: i64,
}

impl ChallengeGenerator {
    /// Operands are drawn from `min..=max`; reversed bounds are swapped.
    pub fn new(min: i64, max: i64) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Generate a new challenge from the thread-local RNG
    pub fn generate(&self) -> Challenge {
        self.generate_with(&mut rand::rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Challenge {
        let lhs = rng.random_range(self.min..=self.max);
        let rhs = rng.random_range(self.min..=self.max);
        let op = Operator::ALL[rng.random_range(0..Operator::ALL.len())];

        tracing::debug!(lhs, rhs, op = %op, "Generated CAPTCHA challenge");

        Challenge::new(lhs, op, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generated_operands_stay_in_range() {
        let generator = ChallengeGenerator::new(1, 10);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let challenge = generator.generate_with(&mut rng);
            let parts: Vec<&str> = challenge.question.split_whitespace().collect();
            assert_eq!(parts.len(), 3);

            let lhs: i64 = parts[0].parse().unwrap();
            let rhs: i64 = parts[2].parse().unwrap();
            assert!((1..=10).contains(&lhs));
            assert!((1..=10).contains(&rhs));
            assert!(Operator::from_symbol(parts[1]).is_some());

            let expected = Challenge::evaluate(&challenge.question).unwrap();
            assert!(challenge.check(expected));
            assert!(!challenge.check(expected + 1));
        }
    }

    #[test]
    fn test_subtraction_may_go_negative() {
        let challenge = Challenge::new(2, Operator::Sub, 9);
        assert_eq!(challenge.question, "2 - 9");
        assert!(challenge.check(-7));
    }

    #[test]
    fn test_evaluate_rejects_malformed_questions() {
        assert_eq!(Challenge::evaluate("3 * 4"), Some(12));
        assert_eq!(Challenge::evaluate("3 / 4"), None);
        assert_eq!(Challenge::evaluate("3 *"), None);
        assert_eq!(Challenge::evaluate("3 * 4 + 1"), None);
        assert_eq!(Challenge::evaluate("x + 1"), None);
    }

    #[test]
    fn test_large_operands_do_not_overflow() {
        let challenge = Challenge::new(4_000_000_000, Operator::Mul, 4_000_000_000);
        assert!(!challenge.check(i64::MAX));
        assert_eq!(Challenge::evaluate(&challenge.question), None);

        let max = i64::MAX.to_string();
        assert_eq!(Challenge::evaluate(&format!("{} - 1", max)), Some(i64::MAX - 1));
        assert_eq!(Challenge::evaluate(&format!("{} + 1", max)), None);
    }

    #[test]
    fn test_reversed_bounds_are_swapped() {
        let generator = ChallengeGenerator::new(5, 5);
        let challenge = generator.generate_with(&mut StdRng::seed_from_u64(1));
        assert!(challenge.question.starts_with("5 "));

        let generator = ChallengeGenerator::new(9, 3);
        assert_eq!((generator.min, generator.max), (3, 9));
    }
}
