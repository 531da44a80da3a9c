//! Cryptographic error types.

use thiserror::Error;

/// Cryptographic errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Authentication tag mismatch on decrypt. The caller must discard any
    /// plaintext produced alongside this error.
    #[error("authentication failed: tag mismatch")]
    AuthenticationFailed,

    /// Invalid parameter (key too short, zero-length tag, ...)
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Generate called before the generator was seeded
    #[error("generator has not been seeded")]
    NotSeeded,

    /// Heap allocation for an oversized buffer failed
    #[error("allocation of {0} bytes failed")]
    AllocationFailed(usize),

    /// Power-on known-answer self-test failed
    #[error("self-test failed: {0}")]
    SelfTestFailed(&'static str),

    /// OS random number source failed
    #[error("random number generation failed")]
    RandomFailed,
}
