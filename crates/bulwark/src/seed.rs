//! Default data for first runs.

use std::path::Path;

use anyhow::{Context, Result};
use bulwark_common::AccountRecord;
use bulwark_common::constants::{COMMON_PASSWORDS, DEFAULT_USERS};

use crate::digest::digest;
use crate::store::{JsonFileStore, UserStore, Users};

/// Write the default accounts and candidate list where they do not exist yet.
/// Existing files are left alone.
pub fn ensure_defaults(users_file: &Path, password_list: &Path) -> Result<()> {
    if !users_file.exists() {
        let users: Users = DEFAULT_USERS
            .iter()
            .map(|(name, password)| (name.to_string(), AccountRecord::new(digest(password))))
            .collect();

        JsonFileStore::new(users_file)
            .save(&users)
            .context("Failed to write default users")?;
        tracing::info!(path = %users_file.display(), accounts = users.len(), "Created default users");
    }

    if !password_list.exists() {
        std::fs::write(password_list, COMMON_PASSWORDS.join("\n"))
            .with_context(|| format!("Failed to write {}", password_list.display()))?;
        tracing::info!(
            path = %password_list.display(),
            candidates = COMMON_PASSWORDS.len(),
            "Created default password list"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::{CandidateSource, FileCandidates};

    #[test]
    fn test_creates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let users_file = dir.path().join("users.json");
        let list = dir.path().join("password_list.txt");

        ensure_defaults(&users_file, &list).unwrap();

        let users = JsonFileStore::new(&users_file).load().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users["admin"].digested_credential, digest("admin123"));
        assert_eq!(users["user1"], AccountRecord::new(digest("password123")));

        let candidates = FileCandidates::new(&list).load().unwrap();
        assert_eq!(candidates.len(), 20);
        assert_eq!(candidates[0], "password123");
        assert_eq!(candidates[19], "hunter");
    }

    #[test]
    fn test_leaves_existing_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let users_file = dir.path().join("users.json");
        let list = dir.path().join("password_list.txt");
        std::fs::write(&users_file, "{}").unwrap();
        std::fs::write(&list, "only-one").unwrap();

        ensure_defaults(&users_file, &list).unwrap();

        assert_eq!(std::fs::read_to_string(&users_file).unwrap(), "{}");
        assert_eq!(std::fs::read_to_string(&list).unwrap(), "only-one");
    }
}
