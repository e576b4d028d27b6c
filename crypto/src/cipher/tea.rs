//! TEA (Tiny Encryption Algorithm).
//!
//! 64-bit block, 128-bit key, 32 cycles. Words are big-endian.

use super::{CipherAlgo, CipherContext, CipherFlags, CipherKind, KeySizes};
use crate::error::{CryptoError, CryptoResult};
use crate::util::{load32_be, store32_be, zeroize};

/// TEA block size
pub const TEA_BLOCK_SIZE: usize = 8;

/// TEA key size
pub const TEA_KEY_SIZE: usize = 16;

/// Key schedule constant, 2^32 / golden ratio
pub(super) const DELTA: u32 = 0x9E37_79B9;

/// Number of cycles (two Feistel rounds each)
pub(super) const CYCLES: u32 = 32;

/// Common interface for TEA
pub static TEA_CIPHER_ALGO: CipherAlgo = CipherAlgo {
    name: "TEA",
    oid: &[],
    context_size: core::mem::size_of::<Tea>(),
    kind: CipherKind::Block,
    block_size: TEA_BLOCK_SIZE,
    key_sizes: KeySizes::Fixed(&[TEA_KEY_SIZE]),
    flags: CipherFlags::empty(),
    init: init_context,
};

fn init_context(key: &[u8]) -> CryptoResult<CipherContext> {
    Ok(CipherContext::Tea(Tea::new(key)?))
}

/// Load a 16-byte key as four big-endian words
pub(super) fn key_words(key: &[u8]) -> CryptoResult<[u32; 4]> {
    if key.len() != TEA_KEY_SIZE {
        return Err(CryptoError::InvalidKeyLength);
    }
    Ok([
        load32_be(&key[0..]),
        load32_be(&key[4..]),
        load32_be(&key[8..]),
        load32_be(&key[12..]),
    ])
}

/// TEA context.
pub struct Tea {
    k: [u32; 4],
}

impl Tea {
    /// Load a 16-byte key
    pub fn new(key: &[u8]) -> CryptoResult<Self> {
        Ok(Self { k: key_words(key)? })
    }

    /// Encrypt a single block
    pub fn encrypt(&self, input: &[u8; 8], output: &mut [u8; 8]) {
        let [k0, k1, k2, k3] = self.k;
        let mut y = load32_be(&input[0..]);
        let mut z = load32_be(&input[4..]);
        let mut sum = 0u32;

        for _ in 0..CYCLES {
            sum = sum.wrapping_add(DELTA);
            y = y.wrapping_add(
                (z << 4).wrapping_add(k0) ^ z.wrapping_add(sum) ^ (z >> 5).wrapping_add(k1),
            );
            z = z.wrapping_add(
                (y << 4).wrapping_add(k2) ^ y.wrapping_add(sum) ^ (y >> 5).wrapping_add(k3),
            );
        }

        store32_be(y, &mut output[0..]);
        store32_be(z, &mut output[4..]);
    }

    /// Decrypt a single block
    pub fn decrypt(&self, input: &[u8; 8], output: &mut [u8; 8]) {
        let [k0, k1, k2, k3] = self.k;
        let mut y = load32_be(&input[0..]);
        let mut z = load32_be(&input[4..]);
        let mut sum = DELTA.wrapping_mul(CYCLES);

        for _ in 0..CYCLES {
            z = z.wrapping_sub(
                (y << 4).wrapping_add(k2) ^ y.wrapping_add(sum) ^ (y >> 5).wrapping_add(k3),
            );
            y = y.wrapping_sub(
                (z << 4).wrapping_add(k0) ^ z.wrapping_add(sum) ^ (z >> 5).wrapping_add(k1),
            );
            sum = sum.wrapping_sub(DELTA);
        }

        store32_be(y, &mut output[0..]);
        store32_be(z, &mut output[4..]);
    }
}

impl Drop for Tea {
    fn drop(&mut self) {
        zeroize(&mut self.k);
    }
}

impl core::fmt::Debug for Tea {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Tea { .. }")
    }
}

super::impl_block_cipher!(Tea, TEA_BLOCK_SIZE);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::hex;

    fn check(key: &str, pt: &str, ct: &str) {
        let c = Tea::new(&hex(key)).unwrap();
        let pt: [u8; 8] = hex(pt).try_into().unwrap();
        let mut out = [0u8; 8];
        c.encrypt(&pt, &mut out);
        assert_eq!(out.to_vec(), hex(ct));
        let mut back = [0u8; 8];
        c.decrypt(&out, &mut back);
        assert_eq!(back, pt);
    }

    #[test]
    fn test_vectors() {
        check("00000000000000000000000000000000", "0000000000000000", "41ea3a0a94baa940");
        check("000102030405060708090a0b0c0d0e0f", "4142434445464748", "df25fc4279b8f929");
    }

    #[test]
    fn test_key_length() {
        assert_eq!(Tea::new(&[0u8; 15]).err(), Some(CryptoError::InvalidKeyLength));
    }
}
