//! # Cipher Primitives
//!
//! Block and stream ciphers, their algorithm descriptors and the
//! built-in registry.
//!
//! ## Block ciphers
//!
//! - AES (128/192/256-bit keys)
//! - ARIA (128/192/256-bit keys)
//! - CAST-128, CAST-256
//! - Serpent, Twofish
//! - SM4
//! - TEA, XTEA
//!
//! ## Stream ciphers
//!
//! - Salsa20
//! - Trivium
//! - ZUC-128
//!
//! Every algorithm publishes a static descriptor ([`CipherAlgo`] or
//! [`StreamAlgo`]) that modes and MACs use to instantiate contexts.

pub mod aes;
pub mod aria;
pub mod cast128;
pub mod cast256;
pub mod salsa20;
pub mod serpent;
pub mod sm4;
pub mod tea;
pub mod trivium;
pub mod twofish;
pub mod xtea;
pub mod zuc;

#[cfg(feature = "alloc")]
use alloc::boxed::Box;
use bitflags::bitflags;
use core::fmt;

use crate::error::{CryptoError, CryptoResult};

use self::aes::Aes;
use self::aria::Aria;
use self::cast128::Cast128;
use self::cast256::Cast256;
use self::salsa20::Salsa20;
use self::serpent::Serpent;
use self::sm4::Sm4;
use self::tea::Tea;
use self::trivium::Trivium;
use self::twofish::Twofish;
use self::xtea::Xtea;
use self::zuc::Zuc;

/// Largest block size of any registered block cipher
pub const MAX_BLOCK_SIZE: usize = 16;

// ============================================================================
// Traits
// ============================================================================

/// Keyed permutation over fixed-size blocks.
///
/// Both operations reject buffers that are not exactly one block long
/// with [`CryptoError::InvalidLength`].
pub trait BlockCipher {
    /// Block size in bytes
    fn block_size(&self) -> usize;

    /// Encrypt exactly one block
    fn encrypt_block(&self, input: &[u8], output: &mut [u8]) -> CryptoResult<()>;

    /// Decrypt exactly one block
    fn decrypt_block(&self, input: &[u8], output: &mut [u8]) -> CryptoResult<()>;
}

impl<C: BlockCipher + ?Sized> BlockCipher for &C {
    fn block_size(&self) -> usize {
        (**self).block_size()
    }

    fn encrypt_block(&self, input: &[u8], output: &mut [u8]) -> CryptoResult<()> {
        (**self).encrypt_block(input, output)
    }

    fn decrypt_block(&self, input: &[u8], output: &mut [u8]) -> CryptoResult<()> {
        (**self).decrypt_block(input, output)
    }
}

/// Keystream generator applied by XOR.
///
/// Encryption and decryption are the same operation. Reusing a key/IV
/// pair across messages is the caller's responsibility.
pub trait StreamCipher {
    /// XOR the keystream over `data`
    fn apply_in_place(&mut self, data: &mut [u8]);

    /// XOR the keystream over `input` into `output`
    fn apply(&mut self, input: &[u8], output: &mut [u8]) -> CryptoResult<()> {
        if input.len() != output.len() {
            return Err(CryptoError::InvalidLength);
        }
        output.copy_from_slice(input);
        self.apply_in_place(output);
        Ok(())
    }
}

/// Borrow a one-block input/output pair as fixed-size arrays
pub(crate) fn block_pair<'a, 'b, const N: usize>(
    input: &'a [u8],
    output: &'b mut [u8],
) -> CryptoResult<(&'a [u8; N], &'b mut [u8; N])> {
    let input = <&[u8; N]>::try_from(input).map_err(|_| CryptoError::InvalidLength)?;
    let output = <&mut [u8; N]>::try_from(output).map_err(|_| CryptoError::InvalidLength)?;
    Ok((input, output))
}

/// Implement [`BlockCipher`] on top of inherent `encrypt`/`decrypt` over arrays
macro_rules! impl_block_cipher {
    ($ty:ty, $size:expr) => {
        impl $crate::cipher::BlockCipher for $ty {
            fn block_size(&self) -> usize {
                $size
            }

            fn encrypt_block(
                &self,
                input: &[u8],
                output: &mut [u8],
            ) -> $crate::error::CryptoResult<()> {
                let (input, output) = $crate::cipher::block_pair::<{ $size }>(input, output)?;
                self.encrypt(input, output);
                Ok(())
            }

            fn decrypt_block(
                &self,
                input: &[u8],
                output: &mut [u8],
            ) -> $crate::error::CryptoResult<()> {
                let (input, output) = $crate::cipher::block_pair::<{ $size }>(input, output)?;
                self.decrypt(input, output);
                Ok(())
            }
        }
    };
}

pub(crate) use impl_block_cipher;

// ============================================================================
// Descriptors
// ============================================================================

/// Cipher family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherKind {
    /// Fixed-size block transform
    Block,
    /// Keystream generator
    Stream,
}

/// Accepted key (or IV) lengths, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySizes {
    /// Explicit list
    Fixed(&'static [usize]),
    /// Inclusive range with a step
    Range {
        /// Smallest length
        min: usize,
        /// Largest length
        max: usize,
        /// Increment between accepted lengths
        step: usize,
    },
}

impl KeySizes {
    /// Check whether `len` is accepted
    pub fn contains(&self, len: usize) -> bool {
        match *self {
            KeySizes::Fixed(sizes) => sizes.contains(&len),
            KeySizes::Range { min, max, step } => {
                len >= min && len <= max && (len - min) % step.max(1) == 0
            }
        }
    }
}

bitflags! {
    /// Cipher capability flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CipherFlags: u32 {
        /// Key length may vary within a range
        const VARIABLE_KEY = 1 << 0;
        /// 128-bit block, usable with XTS, GCM, GMAC and XCBC-MAC
        const WIDE_BLOCK = 1 << 1;
        /// Published by a platform override rather than built in
        const ACCELERATED = 1 << 2;
    }
}

/// Block cipher descriptor.
///
/// One immutable instance exists per algorithm. Contexts reference it
/// but never own it.
pub struct CipherAlgo {
    /// Algorithm name
    pub name: &'static str,
    /// DER-encoded object identifier (empty when none is assigned)
    pub oid: &'static [u8],
    /// Size of the expanded-key context in bytes
    pub context_size: usize,
    /// Cipher family
    pub kind: CipherKind,
    /// Block size in bytes
    pub block_size: usize,
    /// Accepted key lengths
    pub key_sizes: KeySizes,
    /// Capability flags
    pub flags: CipherFlags,
    /// Key expansion
    pub init: fn(&[u8]) -> CryptoResult<CipherContext>,
}

impl CipherAlgo {
    /// Expand `key` into a new context
    pub fn new_context(&self, key: &[u8]) -> CryptoResult<CipherContext> {
        if !self.key_sizes.contains(key.len()) {
            return Err(CryptoError::InvalidKeyLength);
        }
        log::debug!("{} context initialized ({}-bit key)", self.name, key.len() * 8);
        (self.init)(key)
    }

    /// Whether the cipher has a 128-bit block
    pub fn is_wide_block(&self) -> bool {
        self.flags.contains(CipherFlags::WIDE_BLOCK)
    }
}

impl fmt::Debug for CipherAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherAlgo")
            .field("name", &self.name)
            .field("block_size", &self.block_size)
            .field("key_sizes", &self.key_sizes)
            .field("flags", &self.flags)
            .finish()
    }
}

/// Stream cipher descriptor
pub struct StreamAlgo {
    /// Algorithm name
    pub name: &'static str,
    /// Size of the generator state in bytes
    pub context_size: usize,
    /// Cipher family
    pub kind: CipherKind,
    /// Accepted key lengths
    pub key_sizes: KeySizes,
    /// Accepted IV lengths
    pub iv_sizes: KeySizes,
    /// State setup
    pub init: fn(&[u8], &[u8]) -> CryptoResult<StreamContext>,
}

impl StreamAlgo {
    /// Set up a new keystream generator
    pub fn new_context(&self, key: &[u8], iv: &[u8]) -> CryptoResult<StreamContext> {
        if !self.key_sizes.contains(key.len()) {
            return Err(CryptoError::InvalidKeyLength);
        }
        if !self.iv_sizes.contains(iv.len()) {
            return Err(CryptoError::InvalidParameter);
        }
        log::debug!("{} keystream initialized ({}-bit key)", self.name, key.len() * 8);
        (self.init)(key, iv)
    }
}

impl fmt::Debug for StreamAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamAlgo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("key_sizes", &self.key_sizes)
            .field("iv_sizes", &self.iv_sizes)
            .finish()
    }
}

// ============================================================================
// Contexts
// ============================================================================

/// Expanded-key context for any registered block cipher
pub enum CipherContext {
    /// AES
    Aes(Aes),
    /// ARIA
    Aria(Aria),
    /// CAST-128
    Cast128(Cast128),
    /// CAST-256
    Cast256(Cast256),
    /// Serpent
    Serpent(Serpent),
    /// Twofish
    Twofish(Twofish),
    /// SM4
    Sm4(Sm4),
    /// TEA
    Tea(Tea),
    /// XTEA
    Xtea(Xtea),
    /// Externally supplied implementation (hardware backends)
    #[cfg(feature = "alloc")]
    Custom(Box<dyn BlockCipher + Send + Sync>),
}

macro_rules! dispatch {
    ($ctx:expr, $c:ident => $body:expr) => {
        match $ctx {
            CipherContext::Aes($c) => $body,
            CipherContext::Aria($c) => $body,
            CipherContext::Cast128($c) => $body,
            CipherContext::Cast256($c) => $body,
            CipherContext::Serpent($c) => $body,
            CipherContext::Twofish($c) => $body,
            CipherContext::Sm4($c) => $body,
            CipherContext::Tea($c) => $body,
            CipherContext::Xtea($c) => $body,
            #[cfg(feature = "alloc")]
            CipherContext::Custom($c) => $body,
        }
    };
}

impl BlockCipher for CipherContext {
    fn block_size(&self) -> usize {
        dispatch!(self, c => c.block_size())
    }

    fn encrypt_block(&self, input: &[u8], output: &mut [u8]) -> CryptoResult<()> {
        dispatch!(self, c => c.encrypt_block(input, output))
    }

    fn decrypt_block(&self, input: &[u8], output: &mut [u8]) -> CryptoResult<()> {
        dispatch!(self, c => c.decrypt_block(input, output))
    }
}

impl fmt::Debug for CipherContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CipherContext::Aes(_) => "AES",
            CipherContext::Aria(_) => "ARIA",
            CipherContext::Cast128(_) => "CAST-128",
            CipherContext::Cast256(_) => "CAST-256",
            CipherContext::Serpent(_) => "Serpent",
            CipherContext::Twofish(_) => "Twofish",
            CipherContext::Sm4(_) => "SM4",
            CipherContext::Tea(_) => "TEA",
            CipherContext::Xtea(_) => "XTEA",
            #[cfg(feature = "alloc")]
            CipherContext::Custom(_) => "custom",
        };
        write!(f, "CipherContext({name})")
    }
}

/// Keystream generator state for any registered stream cipher
#[derive(Debug)]
pub enum StreamContext {
    /// Salsa20
    Salsa20(Salsa20),
    /// Trivium
    Trivium(Trivium),
    /// ZUC-128
    Zuc(Zuc),
}

impl StreamCipher for StreamContext {
    fn apply_in_place(&mut self, data: &mut [u8]) {
        match self {
            StreamContext::Salsa20(c) => c.apply_in_place(data),
            StreamContext::Trivium(c) => c.apply_in_place(data),
            StreamContext::Zuc(c) => c.apply_in_place(data),
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

static BLOCK_ALGOS: [&CipherAlgo; 9] = [
    &aes::AES_CIPHER_ALGO,
    &aria::ARIA_CIPHER_ALGO,
    &cast128::CAST128_CIPHER_ALGO,
    &cast256::CAST256_CIPHER_ALGO,
    &serpent::SERPENT_CIPHER_ALGO,
    &twofish::TWOFISH_CIPHER_ALGO,
    &sm4::SM4_CIPHER_ALGO,
    &tea::TEA_CIPHER_ALGO,
    &xtea::XTEA_CIPHER_ALGO,
];

static STREAM_ALGOS: [&StreamAlgo; 3] = [
    &salsa20::SALSA20_STREAM_ALGO,
    &trivium::TRIVIUM_STREAM_ALGO,
    &zuc::ZUC_STREAM_ALGO,
];

/// All built-in block ciphers
pub fn algorithms() -> &'static [&'static CipherAlgo] {
    &BLOCK_ALGOS
}

/// All built-in stream ciphers
pub fn stream_algorithms() -> &'static [&'static StreamAlgo] {
    &STREAM_ALGOS
}

/// Look up a built-in block cipher by name (case-insensitive)
pub fn find_by_name(name: &str) -> Option<&'static CipherAlgo> {
    BLOCK_ALGOS
        .iter()
        .copied()
        .find(|a| a.name.eq_ignore_ascii_case(name))
}

/// Look up a built-in block cipher by DER-encoded OID
pub fn find_by_oid(oid: &[u8]) -> Option<&'static CipherAlgo> {
    if oid.is_empty() {
        return None;
    }
    BLOCK_ALGOS.iter().copied().find(|a| a.oid == oid)
}

/// Look up a built-in stream cipher by name (case-insensitive)
pub fn find_stream_by_name(name: &str) -> Option<&'static StreamAlgo> {
    STREAM_ALGOS
        .iter()
        .copied()
        .find(|a| a.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::XorShift;

    #[test]
    fn test_key_sizes() {
        let fixed = KeySizes::Fixed(&[16, 24, 32]);
        assert!(fixed.contains(24));
        assert!(!fixed.contains(20));

        let range = KeySizes::Range { min: 16, max: 32, step: 4 };
        assert!(range.contains(20));
        assert!(!range.contains(18));
        assert!(!range.contains(36));
    }

    #[test]
    fn test_registry_lookup() {
        assert_eq!(find_by_name("cast-128").map(|a| a.block_size), Some(8));
        assert_eq!(find_by_name("SM4").map(|a| a.block_size), Some(16));
        assert!(find_by_name("DES").is_none());
        assert!(find_by_oid(&[]).is_none());

        let sm4 = find_by_oid(sm4::SM4_CIPHER_ALGO.oid).unwrap();
        assert_eq!(sm4.name, "SM4");
        assert!(find_stream_by_name("zuc-128").is_some());

        let algo = find_by_name("aria").unwrap();
        assert!(algo.is_wide_block());
        assert!(find_by_oid(&aria::ARIA128_ECB_OID).is_none());
    }

    #[test]
    fn test_registry_kinds() {
        assert_eq!(algorithms().len(), 9);
        assert!(algorithms().iter().all(|a| a.kind == CipherKind::Block));
        assert_eq!(stream_algorithms().len(), 3);
        assert!(stream_algorithms().iter().all(|a| a.kind == CipherKind::Stream));
    }

    #[test]
    fn test_descriptor_rejects_bad_key() {
        for algo in algorithms() {
            assert_eq!(
                algo.new_context(&[0u8; 3]).err(),
                Some(CryptoError::InvalidKeyLength),
                "{}",
                algo.name
            );
        }
        for algo in stream_algorithms() {
            assert_eq!(
                algo.new_context(&[0u8; 3], &[0u8; 8]).err(),
                Some(CryptoError::InvalidKeyLength),
                "{}",
                algo.name
            );
        }
    }

    #[test]
    fn test_block_length_checked() {
        let ctx = tea::TEA_CIPHER_ALGO.new_context(&[0u8; 16]).unwrap();
        let mut out = [0u8; 8];
        assert_eq!(ctx.encrypt_block(&[0u8; 7], &mut out), Err(CryptoError::InvalidLength));
        assert_eq!(ctx.decrypt_block(&[0u8; 8], &mut [0u8; 16]), Err(CryptoError::InvalidLength));
    }

    /// 1000 random blocks per key size through every registered cipher
    #[test]
    fn test_round_trip_all_algorithms() {
        let mut rng = XorShift(0x9E37_79B9_7F4A_7C15);
        for algo in algorithms() {
            let key_lens: Vec<usize> = (1..=64).filter(|&l| algo.key_sizes.contains(l)).collect();
            assert!(!key_lens.is_empty());
            for key_len in key_lens {
                let mut key = vec![0u8; key_len];
                rng.fill(&mut key);
                let ctx = algo.new_context(&key).unwrap();
                assert_eq!(ctx.block_size(), algo.block_size);

                let n = algo.block_size;
                for _ in 0..1000 {
                    let mut pt = [0u8; MAX_BLOCK_SIZE];
                    let mut ct = [0u8; MAX_BLOCK_SIZE];
                    let mut back = [0u8; MAX_BLOCK_SIZE];
                    rng.fill(&mut pt[..n]);
                    ctx.encrypt_block(&pt[..n], &mut ct[..n]).unwrap();
                    ctx.decrypt_block(&ct[..n], &mut back[..n]).unwrap();
                    assert_eq!(pt[..n], back[..n], "{} key_len={}", algo.name, key_len);
                }
            }
        }
    }

    #[test]
    fn test_stream_contexts_symmetric() {
        let mut rng = XorShift(42);
        for algo in stream_algorithms() {
            let key_len = (1..=64).find(|&l| algo.key_sizes.contains(l)).unwrap();
            let iv_len = (0..=64).rev().find(|&l| algo.iv_sizes.contains(l)).unwrap();
            let mut key = vec![0u8; key_len];
            let mut iv = vec![0u8; iv_len];
            rng.fill(&mut key);
            rng.fill(&mut iv);

            let mut msg = [0u8; 77];
            rng.fill(&mut msg);
            let mut ct = [0u8; 77];
            algo.new_context(&key, &iv).unwrap().apply(&msg, &mut ct).unwrap();
            assert_ne!(ct, msg);

            let mut back = ct;
            algo.new_context(&key, &iv).unwrap().apply_in_place(&mut back);
            assert_eq!(back, msg, "{}", algo.name);
        }
    }
}
