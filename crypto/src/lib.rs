//! # Helix Crypto
//!
//! Portable symmetric cryptography for the Helix OS Framework. Every
//! primitive is written in plain Rust with no platform dependencies, so the
//! same code serves the kernel, its filesystems and host-side tooling.
//!
//! - Block ciphers: AES, ARIA, CAST-128, CAST-256, Serpent, Twofish, SM4, TEA,
//!   XTEA
//! - Stream ciphers: Salsa20, Trivium, ZUC
//! - Modes: CTR, CFB, XTS, GCM
//! - MACs: CMAC, XCBC-MAC, GMAC, HMAC, KMAC
//! - Hashes: SM3, SHA-256
//! - KDFs: Concat KDF, PBKDF2, scrypt
//!
//! ## Algorithm Descriptors
//!
//! Each algorithm publishes a static descriptor ([`CipherAlgo`],
//! [`HashAlgo`], [`cipher::StreamAlgo`]) carrying its name, OID and sizes,
//! and a constructor for a context of the matching closed-set enum. The
//! built-in registries in [`cipher`] and [`hash`] allow lookup by name or
//! OID at run time; [`accel::OverrideRegistry`] lets platform code put
//! accelerated implementations in front of them.
//!
//! ## Context Lifetime
//!
//! Contexts are plain values owned by the caller. They are not internally
//! synchronized and wipe their key material when dropped.
//!
//! ## Features
//!
//! - `alloc` (default): scrypt, boxed custom ciphers, override registry
//! - `std`: `std::error::Error` for [`CryptoError`]
//! - `gmac-table-8`: 256-entry GHASH tables instead of 16-entry ones

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod accel;
pub mod cipher;
pub mod error;
pub mod hash;
pub mod kdf;
pub mod mac;
pub mod modes;
pub mod util;

pub use cipher::{BlockCipher, CipherAlgo, StreamCipher};
pub use error::{CryptoError, CryptoResult};
pub use hash::{HashAlgo, HashFunction};
