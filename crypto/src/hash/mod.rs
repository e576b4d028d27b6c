//! # Hash Functions
//!
//! Merkle-Damgard hash primitives with a common descriptor and a
//! closed-set context used by HMAC and the KDFs.
//!
//! - SM3 (GB/T 32905)
//! - SHA-256 (FIPS 180-4)
//!
//! The Keccak sponge behind KMAC lives here too but is crate-private.

pub(crate) mod keccak;
pub mod sha256;
pub mod sm3;

use core::fmt;

use crate::error::CryptoResult;

use self::sha256::Sha256;
use self::sm3::Sm3;

/// Largest digest size of any registered hash
pub const MAX_DIGEST_SIZE: usize = 32;

/// Largest block size of any registered hash
pub const MAX_HASH_BLOCK_SIZE: usize = 64;

// ============================================================================
// Trait
// ============================================================================

/// Incremental hash computation.
pub trait HashFunction {
    /// Descriptor of the underlying algorithm
    fn algo(&self) -> &'static HashAlgo;

    /// Reset to the initial state
    fn init(&mut self);

    /// Absorb more message bytes
    fn update(&mut self, data: &[u8]);

    /// Pad, write the digest into `digest` and clear the state.
    ///
    /// `digest` must be exactly `digest_size` bytes long.
    fn finalize(&mut self, digest: &mut [u8]) -> CryptoResult<()>;

    /// Write the current chaining value without padding.
    ///
    /// The state is left untouched so absorption can continue.
    fn finalize_raw(&mut self, digest: &mut [u8]) -> CryptoResult<()>;
}

// ============================================================================
// Descriptor
// ============================================================================

/// Hash algorithm descriptor
pub struct HashAlgo {
    /// Algorithm name
    pub name: &'static str,
    /// DER-encoded object identifier
    pub oid: &'static [u8],
    /// Size of the hash context in bytes
    pub context_size: usize,
    /// Compression block size in bytes
    pub block_size: usize,
    /// Digest size in bytes
    pub digest_size: usize,
    /// Minimum number of padding bytes appended by finalization
    pub min_pad_size: usize,
    /// Whether `finalize` wipes the chaining state
    pub final_clears_state: bool,
    /// Fresh context
    pub init: fn() -> HashContext,
}

impl HashAlgo {
    /// Create a context in the initial state
    pub fn new_context(&self) -> HashContext {
        (self.init)()
    }

    /// Digest `data` in one call
    pub fn compute(&self, data: &[u8], digest: &mut [u8]) -> CryptoResult<()> {
        let mut ctx = self.new_context();
        ctx.update(data);
        ctx.finalize(digest)
    }
}

impl fmt::Debug for HashAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashAlgo")
            .field("name", &self.name)
            .field("block_size", &self.block_size)
            .field("digest_size", &self.digest_size)
            .finish()
    }
}

// ============================================================================
// Context
// ============================================================================

/// Hash context for any registered algorithm
#[derive(Clone)]
pub enum HashContext {
    /// SM3
    Sm3(Sm3),
    /// SHA-256
    Sha256(Sha256),
}

macro_rules! dispatch {
    ($ctx:expr, $h:ident => $body:expr) => {
        match $ctx {
            HashContext::Sm3($h) => $body,
            HashContext::Sha256($h) => $body,
        }
    };
}

impl HashFunction for HashContext {
    fn algo(&self) -> &'static HashAlgo {
        dispatch!(self, h => h.algo())
    }

    fn init(&mut self) {
        dispatch!(self, h => HashFunction::init(h))
    }

    fn update(&mut self, data: &[u8]) {
        dispatch!(self, h => HashFunction::update(h, data))
    }

    fn finalize(&mut self, digest: &mut [u8]) -> CryptoResult<()> {
        dispatch!(self, h => HashFunction::finalize(h, digest))
    }

    fn finalize_raw(&mut self, digest: &mut [u8]) -> CryptoResult<()> {
        dispatch!(self, h => HashFunction::finalize_raw(h, digest))
    }
}

impl fmt::Debug for HashContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashContext({})", self.algo().name)
    }
}

/// Implement [`HashFunction`] over the inherent array-based API
macro_rules! impl_hash_function {
    ($ty:ty, $algo:expr, $size:expr) => {
        impl $crate::hash::HashFunction for $ty {
            fn algo(&self) -> &'static $crate::hash::HashAlgo {
                &$algo
            }

            fn init(&mut self) {
                <$ty>::init(self)
            }

            fn update(&mut self, data: &[u8]) {
                <$ty>::update(self, data)
            }

            fn finalize(&mut self, digest: &mut [u8]) -> $crate::error::CryptoResult<()> {
                let digest = <&mut [u8; $size]>::try_from(digest)
                    .map_err(|_| $crate::error::CryptoError::InvalidLength)?;
                <$ty>::finalize(self, digest);
                Ok(())
            }

            fn finalize_raw(&mut self, digest: &mut [u8]) -> $crate::error::CryptoResult<()> {
                let digest = <&mut [u8; $size]>::try_from(digest)
                    .map_err(|_| $crate::error::CryptoError::InvalidLength)?;
                <$ty>::finalize_raw(self, digest);
                Ok(())
            }
        }
    };
}

pub(crate) use impl_hash_function;

// ============================================================================
// Block buffering
// ============================================================================

/// 64-byte message buffer with a running length, shared by the
/// Merkle-Damgard hashes.
#[derive(Clone)]
pub(crate) struct BlockBuffer {
    buffer: [u8; 64],
    buf_len: usize,
    /// Total message length in bytes
    total_len: u64,
}

impl BlockBuffer {
    pub(crate) const fn new() -> Self {
        Self {
            buffer: [0; 64],
            buf_len: 0,
            total_len: 0,
        }
    }

    pub(crate) fn reset(&mut self) {
        crate::util::zeroize(&mut self.buffer);
        self.buf_len = 0;
        self.total_len = 0;
    }

    /// Feed `data`, calling `compress` on every completed block
    pub(crate) fn update(&mut self, data: &[u8], mut compress: impl FnMut(&[u8; 64])) {
        self.total_len = self.total_len.wrapping_add(data.len() as u64);
        let mut data = data;

        // Fill buffer if partial
        if self.buf_len > 0 {
            let n = core::cmp::min(64 - self.buf_len, data.len());
            self.buffer[self.buf_len..self.buf_len + n].copy_from_slice(&data[..n]);
            self.buf_len += n;
            data = &data[n..];

            if self.buf_len < 64 {
                return;
            }
            compress(&self.buffer);
            self.buf_len = 0;
        }

        // Process full blocks
        let mut blocks = data.chunks_exact(64);
        for block in &mut blocks {
            if let Ok(block) = <&[u8; 64]>::try_from(block) {
                compress(block);
            }
        }

        // Save remainder
        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buf_len = rest.len();
    }

    /// Append `0x80`, zero fill and the 64-bit big-endian bit length
    pub(crate) fn pad_be64(&mut self, mut compress: impl FnMut(&[u8; 64])) {
        let bits = self.total_len.wrapping_mul(8);

        self.buffer[self.buf_len] = 0x80;
        self.buffer[self.buf_len + 1..].fill(0);
        if self.buf_len >= 56 {
            compress(&self.buffer);
            self.buffer.fill(0);
        }
        self.buffer[56..].copy_from_slice(&bits.to_be_bytes());
        compress(&self.buffer);
        self.buf_len = 0;
    }
}

// ============================================================================
// Registry
// ============================================================================

static HASH_ALGOS: [&HashAlgo; 2] = [&sm3::SM3_HASH_ALGO, &sha256::SHA256_HASH_ALGO];

static_assertions::const_assert!(sm3::SM3_DIGEST_SIZE <= MAX_DIGEST_SIZE);
static_assertions::const_assert!(sha256::SHA256_DIGEST_SIZE <= MAX_DIGEST_SIZE);

/// All built-in hash algorithms
pub fn algorithms() -> &'static [&'static HashAlgo] {
    &HASH_ALGOS
}

/// Look up a hash by name (case-insensitive)
pub fn find_by_name(name: &str) -> Option<&'static HashAlgo> {
    HASH_ALGOS
        .iter()
        .copied()
        .find(|a| a.name.eq_ignore_ascii_case(name))
}

/// Look up a hash by DER-encoded OID
pub fn find_by_oid(oid: &[u8]) -> Option<&'static HashAlgo> {
    if oid.is_empty() {
        return None;
    }
    HASH_ALGOS.iter().copied().find(|a| a.oid == oid)
}
