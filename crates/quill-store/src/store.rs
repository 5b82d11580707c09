//! The flat-file profile store.
//!
//! One store manages one file containing one JSON object — the profile
//! record. All operations are gated on credentials: nothing is loaded
//! and nothing is overwritten unless the caller can name the stored
//! username and password.
//!
//! The store assumes a single writer. Writes truncate and rewrite the
//! file in place rather than going through a temp-file rename, so a
//! crash mid-write can leave a torn record; the corruption surfaces as
//! [`StoreError::Corrupt`] on the next read.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::StoreError;
use crate::profile::Profile;

/// A handle to one profile file on disk.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    /// Creates a store for the given path. The file need not exist yet;
    /// the first successful [`save`] creates it.
    ///
    /// [`save`]: ProfileStore::save
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checks the given credentials against the stored record.
    ///
    /// Returns `Ok(false)` when the file is absent or empty, or when
    /// either the username or the password differs from what is stored.
    /// Comparison is exact; there is no hashing.
    pub fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, StoreError> {
        let Some(record) = self.read_record()? else {
            return Ok(false);
        };
        Ok(field_matches(&record, "username", username)
            && field_matches(&record, "password", password))
    }

    /// Loads the stored profile, gated on credentials.
    ///
    /// Fail-closed: an absent file, an empty file, a username that does
    /// not match, or a password that does not match all yield
    /// `Ok(None)` — never a partial or wrong-user profile. A file that
    /// exists but does not parse is a hard [`StoreError::Corrupt`].
    pub fn load(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Profile>, StoreError> {
        let Some(record) = self.read_record()? else {
            return Ok(None);
        };
        if !field_matches(&record, "username", username) {
            tracing::debug!(path = %self.path.display(), "load refused: different user");
            return Ok(None);
        }
        if !field_matches(&record, "password", password) {
            tracing::debug!(path = %self.path.display(), "load refused: bad credentials");
            return Ok(None);
        }
        let profile = serde_json::from_value(record).map_err(StoreError::Corrupt)?;
        Ok(Some(profile))
    }

    /// Writes the profile to disk, gated on the stored credentials.
    ///
    /// When no record exists yet the profile is written fresh. When one
    /// does, the write is refused (`Ok(false)`) unless the stored
    /// username and password both match the profile's — a profile for
    /// user A never clobbers user B's file, and a stale password never
    /// overwrites a record it can no longer open.
    ///
    /// A permitted write is a shallow merge: every top-level key of the
    /// profile replaces the stored one wholesale (the ledgers are not
    /// spliced), while stored keys the profile does not know about are
    /// carried through untouched.
    pub fn save(&self, profile: &Profile) -> Result<bool, StoreError> {
        let update = serde_json::to_value(profile).map_err(StoreError::Serialize)?;

        let merged = match self.read_record()? {
            None => update,
            Some(existing) => {
                if !field_matches(&existing, "username", &profile.username) {
                    tracing::warn!(
                        path = %self.path.display(),
                        username = %profile.username,
                        "save refused: file belongs to a different user"
                    );
                    return Ok(false);
                }
                if !field_matches(&existing, "password", &profile.password) {
                    tracing::warn!(
                        path = %self.path.display(),
                        username = %profile.username,
                        "save refused: credentials do not match stored record"
                    );
                    return Ok(false);
                }
                merge_records(existing, update)
            }
        };

        let text = serde_json::to_string(&merged).map_err(StoreError::Serialize)?;
        fs::write(&self.path, text)?;
        tracing::debug!(path = %self.path.display(), "profile saved");
        Ok(true)
    }

    /// Reads the raw record. `Ok(None)` when the file is absent or
    /// blank; [`StoreError::Corrupt`] when it holds anything that is not
    /// valid JSON.
    fn read_record(&self) -> Result<Option<Value>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::Io(err)),
        };
        if text.trim().is_empty() {
            return Ok(None);
        }
        let record = serde_json::from_str(&text).map_err(StoreError::Corrupt)?;
        Ok(Some(record))
    }
}

/// True when `record[key]` is a string equal to `expected`.
fn field_matches(record: &Value, key: &str, expected: &str) -> bool {
    record.get(key).and_then(Value::as_str) == Some(expected)
}

/// Shallow merge: `update`'s top-level keys win; `existing` keys absent
/// from `update` survive. Non-object records cannot get this far —
/// the credential gate already refused them.
fn merge_records(existing: Value, update: Value) -> Value {
    match (existing, update) {
        (Value::Object(mut base), Value::Object(update)) => {
            base.extend(update);
            Value::Object(base)
        }
        (_, update) => update,
    }
}

// =========================================================================
// Tests
// =========================================================================
