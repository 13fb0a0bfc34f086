//! Error taxonomy shared by every layer of the engine.
//!
//! Four cases, none retried, none swallowed: callers always see the
//! original failure as a typed value.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// Caller-correctable input problem (empty password, empty plaintext,
    /// malformed container length). Raised before any I/O is attempted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Padding or cipher rejection. The container format carries no
    /// authentication tag, so this is the only wrong-password signal and
    /// cannot be told apart from corruption of the ciphertext itself.
    #[error("Decryption failed - wrong password or corrupted archive")]
    DecryptionFailed,

    /// The payload is not a well-formed ZIP, or a ZIP entry carries an
    /// unsafe path.
    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    /// File-system failure, always carrying the offending path.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PackError {
    /// Attach a path to a raw `io::Error` (the common map_err shape).
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| PackError::Io { path, source }
    }
}
