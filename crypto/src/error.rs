//! Error types shared by every primitive.

use core::fmt;

/// Cryptographic error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// Missing, malformed or mutually inconsistent parameter
    InvalidParameter,
    /// Key length outside the set accepted by the algorithm
    InvalidKeyLength,
    /// Data or buffer length not acceptable to the operation
    InvalidLength,
    /// Working memory could not be reserved
    OutOfMemory,
    /// Authentication tag mismatch
    AuthenticationFailed,
    /// Generic computation failure
    Failure,
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::InvalidParameter => write!(f, "Invalid parameter"),
            CryptoError::InvalidKeyLength => write!(f, "Invalid key length"),
            CryptoError::InvalidLength => write!(f, "Invalid length"),
            CryptoError::OutOfMemory => write!(f, "Out of memory"),
            CryptoError::AuthenticationFailed => write!(f, "Authentication failed"),
            CryptoError::Failure => write!(f, "Cryptographic failure"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CryptoError {}

/// Result type for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;
