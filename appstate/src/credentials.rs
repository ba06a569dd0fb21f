//! Credential storage for the SiliconFlow API key.
//!
//! The secret lives in two places: a `.env`-style key-value file colocated
//! with the service (durable, survives restarts) and an in-process
//! snapshot behind an `RwLock` (what `get()` reads). Writes rewrite the
//! key's line in the file while preserving every other line, then swap the
//! snapshot under the same write lock so concurrent `set` calls cannot
//! interleave file writes.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::error::RecognitionError;

/// Key under which the secret is persisted.
pub const CREDENTIAL_KEY: &str = "SILICONFLOW_API_KEY";

/// Fixed mask returned for secrets of 8 characters or fewer.
const SHORT_MASK: &str = "****";

/// Stores and retrieves the SiliconFlow API credential.
pub struct CredentialStore {
    path: PathBuf,
    current: RwLock<Option<String>>,
}

impl CredentialStore {
    /// Load the store, reading any previously persisted secret.
    ///
    /// The key-value file takes precedence; the process environment is
    /// consulted only as a fallback source so that deployments which
    /// export the variable directly keep working.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let from_file = read_key_from_file(&path);
        let current = from_file.or_else(|| std::env::var(CREDENTIAL_KEY).ok());

        if current.is_some() {
            tracing::info!(path = %path.display(), "API credential loaded");
        } else {
            tracing::info!(path = %path.display(), "No API credential configured yet");
        }

        Self {
            path,
            current: RwLock::new(current),
        }
    }

    /// Current secret, if one has been configured.
    pub fn get(&self) -> Option<String> {
        self.current.read().clone()
    }

    /// Whether a secret is configured.
    pub fn is_configured(&self) -> bool {
        self.current.read().is_some()
    }

    /// Masked form of the current secret, for display.
    pub fn masked(&self) -> Option<String> {
        self.current.read().as_deref().map(mask)
    }

    /// Persist a new secret and update the in-process view.
    ///
    /// The secret is trimmed before validation and storage. Returns the
    /// masked form — never the raw secret.
    pub fn set(&self, secret: &str) -> Result<String, RecognitionError> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(RecognitionError::InvalidCredentialInput {
                reason: "api_key is required".to_string(),
            });
        }

        // Write lock doubles as the critical section against concurrent
        // set() calls writing the same file.
        let mut current = self.current.write();
        self.persist(secret).map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to write credential file");
            RecognitionError::CredentialStorage {
                reason: e.to_string(),
            }
        })?;
        *current = Some(secret.to_string());

        tracing::info!(path = %self.path.display(), "API credential stored");
        Ok(mask(secret))
    }

    /// Rewrite the credential file, preserving unrelated lines.
    fn persist(&self, secret: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let existing = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e),
        };

        let mut lines: Vec<String> = Vec::new();
        let mut replaced = false;
        for line in existing.lines() {
            if !replaced && parse_entry(line).map(|(k, _)| k) == Some(CREDENTIAL_KEY) {
                lines.push(format!("{CREDENTIAL_KEY}={secret}"));
                replaced = true;
            } else {
                lines.push(line.to_string());
            }
        }
        if !replaced {
            lines.push(format!("{CREDENTIAL_KEY}={secret}"));
        }

        let mut contents = lines.join("\n");
        contents.push('\n');
        std::fs::write(&self.path, contents)
    }
}

/// Redact a secret for display: first 4 and last 4 characters with an
/// ellipsis between, or a fixed mask when the secret is short.
pub fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return SHORT_MASK.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

fn read_key_from_file(path: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(path).ok()?;
    contents
        .lines()
        .filter_map(parse_entry)
        .find(|(key, _)| *key == CREDENTIAL_KEY)
        .map(|(_, value)| value.to_string())
        .filter(|v| !v.is_empty())
}

/// Parse one `KEY=VALUE` line; tolerates surrounding quotes on the value.
fn parse_entry(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    let value = value.trim();
    let value = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')))
        .unwrap_or(value);
    Some((key.trim(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> CredentialStore {
        CredentialStore::load(dir.path().join(".env"))
    }

    #[test]
    fn unconfigured_store_returns_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.get().is_none());
        assert!(!store.is_configured());
        assert!(store.masked().is_none());
    }

    #[test]
    fn set_then_get_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set("sk-abcdef").unwrap();
        assert_eq!(store.get().as_deref(), Some("sk-abcdef"));
        assert!(store.is_configured());
    }

    #[test]
    fn set_rejects_empty_secret() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let err = store.set("").unwrap_err();
        assert!(matches!(
            err,
            RecognitionError::InvalidCredentialInput { .. }
        ));
    }

    #[test]
    fn set_rejects_whitespace_only_secret() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let err = store.set("   ").unwrap_err();
        assert!(matches!(
            err,
            RecognitionError::InvalidCredentialInput { .. }
        ));
    }

    #[test]
    fn set_trims_before_storing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set("  sk-abcdef  ").unwrap();
        assert_eq!(store.get().as_deref(), Some("sk-abcdef"));
    }

    #[test]
    fn set_returns_masked_not_raw() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let masked = store.set("sk-1234567890abcdef").unwrap();
        assert_eq!(masked, "sk-1...cdef");
        assert_ne!(masked, "sk-1234567890abcdef");
    }

    #[test]
    fn short_secret_gets_fixed_mask() {
        assert_eq!(mask("sk-abc"), "****");
        assert_eq!(mask("12345678"), "****");
        // 9 chars is the first length with a structural mask
        assert_eq!(mask("123456789"), "1234...6789");
    }

    #[test]
    fn persisted_value_survives_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        CredentialStore::load(&path).set("sk-persisted-key").unwrap();

        let reloaded = CredentialStore::load(&path);
        assert_eq!(reloaded.get().as_deref(), Some("sk-persisted-key"));
    }

    #[test]
    fn other_keys_are_preserved_across_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "OTHER_KEY=keep-me\n# a comment\n").unwrap();

        let store = CredentialStore::load(&path);
        store.set("sk-first").unwrap();
        store.set("sk-second").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("OTHER_KEY=keep-me"));
        assert!(contents.contains("# a comment"));
        assert!(contents.contains("SILICONFLOW_API_KEY=sk-second"));
        assert!(!contents.contains("sk-first"));
    }

    #[test]
    fn reads_quoted_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "SILICONFLOW_API_KEY='sk-quoted-key'\n").unwrap();
        let store = CredentialStore::load(&path);
        assert_eq!(store.get().as_deref(), Some("sk-quoted-key"));
    }
}
