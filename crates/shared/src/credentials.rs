//! On-disk record of the client registration and the last issued tokens.
//!
//! Lets a long-lived session survive process restarts: the CLI reads it at
//! startup and rewrites it after every successful token exchange or refresh.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Persisted client id, secret and tokens
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub access_token: String,
    pub refresh_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |secret: &str| if secret.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("StoredCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl StoredCredentials {
    /// Whether an access token has been stored
    pub fn has_tokens(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Copy every non-empty field of `patch` over this record.
    ///
    /// The expiry belongs to the access token: a patch carrying a new access
    /// token always replaces it, an unknown expiry included.
    pub fn merge(&mut self, patch: StoredCredentials) {
        fn take(slot: &mut String, value: String) {
            if !value.is_empty() {
                *slot = value;
            }
        }

        if !patch.access_token.is_empty() || patch.expires_at.is_some() {
            self.expires_at = patch.expires_at;
        }
        take(&mut self.client_id, patch.client_id);
        take(&mut self.client_secret, patch.client_secret);
        take(&mut self.access_token, patch.access_token);
        take(&mut self.refresh_token, patch.refresh_token);
    }
}

/// TOML file holding [`StoredCredentials`]
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored record. A missing file yields an empty record.
    pub fn load(&self) -> Result<StoredCredentials> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No stored credentials");
            return Ok(StoredCredentials::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read credentials file: {}", self.path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse credentials file: {}", self.path.display()))
    }

    /// Overwrite the stored record, creating parent directories as needed
    pub fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(credentials).context("Failed to serialize credentials")?;

        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write credentials file: {}", self.path.display()))?;

        tracing::info!(path = %self.path.display(), "Credentials saved");
        Ok(())
    }

    /// Merge `patch` into the stored record and write it back
    pub fn update(&self, patch: StoredCredentials) -> Result<StoredCredentials> {
        let mut current = self.load()?;
        current.merge(patch);
        self.save(&current)?;
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_is_empty() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = CredentialStore::new(temp_dir.path().join("none.toml"));

        let creds = store.load()?;
        assert_eq!(creds, StoredCredentials::default());
        assert!(!creds.has_tokens());
        Ok(())
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = CredentialStore::new(temp_dir.path().join("nested/credentials.toml"));

        let creds = StoredCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Some(Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap()),
        };
        store.save(&creds)?;

        assert_eq!(store.load()?, creds);
        Ok(())
    }

    #[test]
    fn test_update_keeps_unset_fields() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = CredentialStore::new(temp_dir.path().join("credentials.toml"));
        store.save(&StoredCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            access_token: "old".to_string(),
            refresh_token: "old-refresh".to_string(),
            expires_at: None,
        })?;

        let updated = store.update(StoredCredentials {
            access_token: "new".to_string(),
            ..Default::default()
        })?;

        assert_eq!(updated.client_id, "id");
        assert_eq!(updated.access_token, "new");
        assert_eq!(updated.refresh_token, "old-refresh");
        assert_eq!(store.load()?, updated);
        Ok(())
    }

    #[test]
    fn test_new_token_replaces_expiry() {
        let expiry = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut creds = StoredCredentials {
            client_id: "id".to_string(),
            access_token: "old".to_string(),
            expires_at: Some(expiry),
            ..Default::default()
        };

        // A patch without a token leaves the expiry alone
        creds.merge(StoredCredentials {
            client_secret: "secret".to_string(),
            ..Default::default()
        });
        assert_eq!(creds.expires_at, Some(expiry));

        // A new token with unknown expiry clears the old one
        creds.merge(StoredCredentials {
            access_token: "new".to_string(),
            ..Default::default()
        });
        assert_eq!(creds.access_token, "new");
        assert_eq!(creds.expires_at, None);
        assert!(!format!("{:?}", creds).contains("new"));
    }

    #[test]
    fn test_parse_plain_key_values() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("credentials.toml");
        std::fs::write(&path, "client_id = \"abc\"\naccess_token = \"tok\"\n")?;

        let creds = CredentialStore::new(&path).load()?;
        assert_eq!(creds.client_id, "abc");
        assert_eq!(creds.access_token, "tok");
        assert!(creds.refresh_token.is_empty());
        assert!(creds.expires_at.is_none());
        Ok(())
    }
}
