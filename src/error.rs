use thiserror::Error;

/// Errors returned by the fallible tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtError {
    /// Keys are non-empty byte strings.
    #[error("keys must be at least one byte long")]
    EmptyKey,

    /// The key is a strict prefix of a stored key, or a stored key is a strict prefix of it.
    /// Leaves only live at node boundaries, so the two cannot coexist.
    #[error("key {key:?} conflicts with a stored key that it prefixes or is prefixed by")]
    PrefixConflict { key: Vec<u8> },

    #[error("key {key:?} is not present")]
    KeyNotFound { key: Vec<u8> },
}
