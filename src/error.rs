//! Recoverable errors: invalid configuration and unsupported operations.
//!
//! Caller misuse of node handles (stale IDs, out-of-range values) is not represented here;
//! such bugs panic at the point of detection.

/// Errors reported by manager construction, variable registration, views and the parser.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum MddError {
    #[error("variable '{key}' has invalid domain size {nbval} (expected 2..=255)")]
    InvalidDomain { key: String, nbval: usize },

    #[error("a store needs at least one leaf")]
    InvalidLeafCount,

    #[error("variable '{0}' is already defined")]
    DuplicateVariable(String),

    #[error("leaf {leaf} does not exist in a store with {leaves} leaves")]
    UnknownLeaf { leaf: u32, leaves: u32 },

    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("invalid value range [{start}, {end}] for a domain of size {nbval}")]
    InvalidRange { start: usize, end: usize, nbval: usize },

    #[error("invalid variable order: {0}")]
    InvalidOrder(String),

    #[error("not supported: {0}")]
    Unsupported(String),

    #[error("parse error at {position}: {message}")]
    Parse { position: usize, message: String },
}

pub type Result<T> = std::result::Result<T, MddError>;
