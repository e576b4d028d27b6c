//! # Accelerator Support
//!
//! - [`SharedCipher`]: a keyed cipher living on a single shared engine,
//!   with the engine lock held around each operation
//! - [`OverrideRegistry`]: runtime replacement of built-in algorithms by
//!   accelerated implementations
//!
//! The portable implementations stay canonical. Overrides are optional and
//! only consulted through [`OverrideRegistry::resolve`].

#[cfg(feature = "alloc")]
use alloc::{collections::BTreeMap, string::String};
use spin::Mutex;
#[cfg(feature = "alloc")]
use spin::RwLock;

use crate::cipher::BlockCipher;
#[cfg(feature = "alloc")]
use crate::cipher::{self, CipherAlgo, CipherFlags};
use crate::error::CryptoResult;
#[cfg(feature = "alloc")]
use crate::error::CryptoError;

// ============================================================================
// Shared engine
// ============================================================================

/// Block cipher behind a mutex, one instance per physical engine.
///
/// Each block operation acquires and releases the lock. Use
/// [`SharedCipher::with`] to keep the engine for a whole mode operation.
pub struct SharedCipher<C> {
    engine: Mutex<C>,
}

impl<C: BlockCipher> SharedCipher<C> {
    /// Wrap a keyed cipher
    pub const fn new(cipher: C) -> Self {
        Self {
            engine: Mutex::new(cipher),
        }
    }

    /// Run `f` with the engine held.
    ///
    /// `f` receives the inner cipher only. The lock is not reentrant:
    /// calling any method of this `SharedCipher` from inside `f`,
    /// [`BlockCipher::block_size`] included, spins forever.
    pub fn with<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        let engine = self.engine.lock();
        f(&engine)
    }

    /// Like [`SharedCipher::with`], but returns `None` instead of waiting
    /// when the engine is held elsewhere
    pub fn try_with<R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        let engine = self.engine.try_lock()?;
        Some(f(&engine))
    }

    /// Whether another caller currently holds the engine
    pub fn is_busy(&self) -> bool {
        self.engine.is_locked()
    }

    /// Release the wrapper, returning the cipher
    pub fn into_inner(self) -> C {
        self.engine.into_inner()
    }
}

impl<C: BlockCipher> BlockCipher for SharedCipher<C> {
    fn block_size(&self) -> usize {
        self.engine.lock().block_size()
    }

    fn encrypt_block(&self, input: &[u8], output: &mut [u8]) -> CryptoResult<()> {
        self.engine.lock().encrypt_block(input, output)
    }

    fn decrypt_block(&self, input: &[u8], output: &mut [u8]) -> CryptoResult<()> {
        self.engine.lock().decrypt_block(input, output)
    }
}

impl<C> core::fmt::Debug for SharedCipher<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedCipher")
            .field("busy", &self.engine.is_locked())
            .finish()
    }
}

// ============================================================================
// Override registry
// ============================================================================

/// Name-keyed table of accelerated replacements for built-in ciphers.
#[cfg(feature = "alloc")]
pub struct OverrideRegistry {
    /// Overrides keyed by lowercase algorithm name
    overrides: RwLock<BTreeMap<String, &'static CipherAlgo>>,
}

#[cfg(feature = "alloc")]
impl OverrideRegistry {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self {
            overrides: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register an override.
    ///
    /// The descriptor must carry [`CipherFlags::ACCELERATED`]. A previous
    /// override of the same name is replaced.
    pub fn register(&self, algo: &'static CipherAlgo) -> CryptoResult<()> {
        if !algo.flags.contains(CipherFlags::ACCELERATED) {
            return Err(CryptoError::InvalidParameter);
        }

        if cipher::find_by_name(algo.name).is_some() {
            log::warn!("Cipher {} overridden by accelerated implementation", algo.name);
        }

        let previous = self
            .overrides
            .write()
            .insert(algo.name.to_ascii_lowercase(), algo);
        if previous.is_some() {
            log::warn!("Replaced existing override for {}", algo.name);
        }

        log::info!("Registered cipher override: {}", algo.name);
        Ok(())
    }

    /// Remove the override for `name`, returning it
    pub fn unregister(&self, name: &str) -> Option<&'static CipherAlgo> {
        self.overrides.write().remove(&name.to_ascii_lowercase())
    }

    /// Registered override for `name`, if any
    pub fn get(&self, name: &str) -> Option<&'static CipherAlgo> {
        self.overrides.read().get(&name.to_ascii_lowercase()).copied()
    }

    /// Override for `name`, else the built-in algorithm
    pub fn resolve(&self, name: &str) -> Option<&'static CipherAlgo> {
        self.get(name).or_else(|| cipher::find_by_name(name))
    }

    /// Number of overrides
    pub fn len(&self) -> usize {
        self.overrides.read().len()
    }

    /// Whether no override is registered
    pub fn is_empty(&self) -> bool {
        self.overrides.read().is_empty()
    }
}

#[cfg(feature = "alloc")]
impl Default for OverrideRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "alloc")]
impl core::fmt::Debug for OverrideRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.overrides.read().values().map(|a| a.name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::aes::{Aes, AES_CIPHER_ALGO};
    use crate::cipher::tea::Tea;
    use crate::modes::ctr;
    use crate::util::testing::hex;

    #[test]
    fn test_shared_cipher_matches_inner() {
        let key = hex("000102030405060708090a0b0c0d0e0f");
        let shared = SharedCipher::new(Aes::new(&key).unwrap());
        assert_eq!(shared.block_size(), 16);

        let mut out = [0u8; 16];
        shared
            .encrypt_block(&hex("00112233445566778899aabbccddeeff"), &mut out)
            .unwrap();
        assert_eq!(out.to_vec(), hex("69c4e0d86a7b0430d8cdb78070b4c55a"));
        assert!(!shared.is_busy());

        // A whole CTR operation under one acquisition
        let mut ct = [0u8; 20];
        let mut counter = [0u8; 16];
        shared
            .with(|aes| {
                assert!(shared.is_busy());
                ctr::encrypt(aes, 128, &mut counter, &[0x55; 20], &mut ct)
            })
            .unwrap();
        assert!(!shared.is_busy());

        let mut back = [0u8; 20];
        let mut counter = [0u8; 16];
        ctr::decrypt(&shared, 128, &mut counter, &ct, &mut back).unwrap();
        assert_eq!(back, [0x55; 20]);
    }

    #[test]
    fn test_try_with_while_held() {
        let shared = SharedCipher::new(Tea::new(&[0u8; 16]).unwrap());
        assert_eq!(shared.try_with(|tea| tea.block_size()), Some(8));

        let nested = shared.with(|tea| {
            assert_eq!(tea.block_size(), 8);
            shared.try_with(|inner| inner.block_size())
        });
        assert_eq!(nested, None);
        assert!(!shared.is_busy());
    }

    #[test]
    fn test_shared_cipher_propagates_errors() {
        let shared = SharedCipher::new(Tea::new(&[0u8; 16]).unwrap());
        assert_eq!(
            shared.encrypt_block(&[0u8; 16], &mut [0u8; 16]),
            Err(crate::error::CryptoError::InvalidLength)
        );
        let tea = shared.into_inner();
        assert_eq!(tea.block_size(), 8);
    }

    #[cfg(feature = "alloc")]
    fn accelerated_aes(key: &[u8]) -> CryptoResult<cipher::CipherContext> {
        Ok(cipher::CipherContext::Custom(alloc::boxed::Box::new(
            SharedCipher::new(Aes::new(key)?),
        )))
    }

    #[cfg(feature = "alloc")]
    static ACCEL_AES: CipherAlgo = CipherAlgo {
        name: "AES",
        oid: &[],
        context_size: core::mem::size_of::<SharedCipher<Aes>>(),
        kind: cipher::CipherKind::Block,
        block_size: 16,
        key_sizes: cipher::KeySizes::Fixed(&[16, 24, 32]),
        flags: CipherFlags::WIDE_BLOCK.union(CipherFlags::ACCELERATED),
        init: accelerated_aes,
    };

    #[cfg(feature = "alloc")]
    static PLAIN_AES: CipherAlgo = CipherAlgo {
        name: "AES-plain",
        oid: &[],
        context_size: 0,
        kind: cipher::CipherKind::Block,
        block_size: 16,
        key_sizes: cipher::KeySizes::Fixed(&[16]),
        flags: CipherFlags::WIDE_BLOCK,
        init: accelerated_aes,
    };

    #[test]
    #[cfg(feature = "alloc")]
    fn test_override_registry() {
        let registry = OverrideRegistry::new();
        assert!(registry.is_empty());
        assert!(core::ptr::eq(registry.resolve("aes").unwrap(), &AES_CIPHER_ALGO));

        assert_eq!(registry.register(&PLAIN_AES), Err(CryptoError::InvalidParameter));

        registry.register(&ACCEL_AES).unwrap();
        assert_eq!(registry.len(), 1);
        let algo = registry.resolve("aes").unwrap();
        assert!(core::ptr::eq(algo, &ACCEL_AES));

        // The override produces the same ciphertext as the portable AES
        let key = [9u8; 16];
        let fast = algo.new_context(&key).unwrap();
        let slow = AES_CIPHER_ALGO.new_context(&key).unwrap();
        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        fast.encrypt_block(&[1u8; 16], &mut a).unwrap();
        slow.encrypt_block(&[1u8; 16], &mut b).unwrap();
        assert_eq!(a, b);

        // Unknown names fall through to nothing
        assert!(registry.resolve("rc4").is_none());

        assert!(registry.unregister("AES").is_some());
        assert!(core::ptr::eq(registry.resolve("AES").unwrap(), &AES_CIPHER_ALGO));
    }
}
