//! # Key Derivation
//!
//! - Concat KDF (NIST SP 800-56A single-step KDF)
//! - PBKDF2 (RFC 8018) with HMAC over any registered hash
//! - scrypt (RFC 7914), heap-backed, behind the `alloc` feature

pub mod concat_kdf;
pub mod pbkdf2;
#[cfg(feature = "alloc")]
pub mod scrypt;

pub use self::concat_kdf::concat_kdf;
pub use self::pbkdf2::pbkdf2;
#[cfg(feature = "alloc")]
pub use self::scrypt::scrypt;
