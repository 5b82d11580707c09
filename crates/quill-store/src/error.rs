//! Error types for the store layer.
//!
//! Expected refusals — username mismatch on save, failed credential
//! check — are NOT errors; they come back as boolean/`None` results from
//! the store operations. A `StoreError` means the durable record is in an
//! unknown or unreachable state, which the caller must not ignore.

/// A storage fault: the profile file could not be read, written, or
/// understood.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The file exists but could not be read or written (permissions,
    /// disk full, …). Distinct from "file absent", which is a normal
    /// outcome for every operation.
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// The file's contents are not a valid profile record. Distinct from
    /// both "absent" and "refused" — the record may need manual repair.
    #[error("profile record is corrupt: {0}")]
    Corrupt(serde_json::Error),

    /// An in-memory profile failed to serialize.
    #[error("profile serialization failed: {0}")]
    Serialize(serde_json::Error),
}
