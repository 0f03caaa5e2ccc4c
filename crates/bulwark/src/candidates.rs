//! Candidate credential lists for the attacker.

use std::path::PathBuf;

use bulwark_common::BulwarkError;

/// Ordered list of plaintext credentials to try
pub trait CandidateSource {
    fn load(&self) -> Result<Vec<String>, BulwarkError>;
}

/// One credential per line; surrounding whitespace trimmed, blank lines dropped
#[derive(Debug, Clone)]
pub struct FileCandidates {
    path: PathBuf,
}

impl FileCandidates {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CandidateSource for FileCandidates {
    fn load(&self) -> Result<Vec<String>, BulwarkError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            BulwarkError::CandidateSourceUnavailable(format!("{}: {}", self.path.display(), e))
        })?;

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

impl CandidateSource for Vec<String> {
    fn load(&self) -> Result<Vec<String>, BulwarkError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_lines_are_trimmed_and_blanks_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("password_list.txt");
        std::fs::write(&path, "password123\n  admin123  \n\n\t\nqwerty").unwrap();

        let candidates = FileCandidates::new(path).load().unwrap();
        assert_eq!(candidates, vec!["password123", "admin123", "qwerty"]);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileCandidates::new(dir.path().join("nope.txt"))
            .load()
            .unwrap_err();
        assert!(matches!(err, BulwarkError::CandidateSourceUnavailable(_)));
    }
}
