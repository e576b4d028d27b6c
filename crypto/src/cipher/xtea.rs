//! XTEA block cipher.
//!
//! Same block, key and word layout as [`super::tea`], with a revised key
//! schedule that selects one key word per half-round from the running sum.

use super::tea::{key_words, CYCLES, DELTA, TEA_BLOCK_SIZE, TEA_KEY_SIZE};
use super::{CipherAlgo, CipherContext, CipherFlags, CipherKind, KeySizes};
use crate::error::CryptoResult;
use crate::util::{load32_be, store32_be, zeroize};

/// XTEA block size
pub const XTEA_BLOCK_SIZE: usize = TEA_BLOCK_SIZE;

/// Common interface for XTEA
pub static XTEA_CIPHER_ALGO: CipherAlgo = CipherAlgo {
    name: "XTEA",
    oid: &[],
    context_size: core::mem::size_of::<Xtea>(),
    kind: CipherKind::Block,
    block_size: XTEA_BLOCK_SIZE,
    key_sizes: KeySizes::Fixed(&[TEA_KEY_SIZE]),
    flags: CipherFlags::empty(),
    init: init_context,
};

fn init_context(key: &[u8]) -> CryptoResult<CipherContext> {
    Ok(CipherContext::Xtea(Xtea::new(key)?))
}

#[inline]
fn mix(v: u32) -> u32 {
    ((v << 4) ^ (v >> 5)).wrapping_add(v)
}

/// XTEA context.
pub struct Xtea {
    k: [u32; 4],
}

impl Xtea {
    /// Load a 16-byte key
    pub fn new(key: &[u8]) -> CryptoResult<Self> {
        Ok(Self { k: key_words(key)? })
    }

    /// Encrypt a single block
    pub fn encrypt(&self, input: &[u8; 8], output: &mut [u8; 8]) {
        let k = &self.k;
        let mut y = load32_be(&input[0..]);
        let mut z = load32_be(&input[4..]);
        let mut sum = 0u32;

        for _ in 0..CYCLES {
            y = y.wrapping_add(mix(z) ^ sum.wrapping_add(k[(sum & 3) as usize]));
            sum = sum.wrapping_add(DELTA);
            z = z.wrapping_add(mix(y) ^ sum.wrapping_add(k[((sum >> 11) & 3) as usize]));
        }

        store32_be(y, &mut output[0..]);
        store32_be(z, &mut output[4..]);
    }

    /// Decrypt a single block
    pub fn decrypt(&self, input: &[u8; 8], output: &mut [u8; 8]) {
        let k = &self.k;
        let mut y = load32_be(&input[0..]);
        let mut z = load32_be(&input[4..]);
        let mut sum = DELTA.wrapping_mul(CYCLES);

        for _ in 0..CYCLES {
            z = z.wrapping_sub(mix(y) ^ sum.wrapping_add(k[((sum >> 11) & 3) as usize]));
            sum = sum.wrapping_sub(DELTA);
            y = y.wrapping_sub(mix(z) ^ sum.wrapping_add(k[(sum & 3) as usize]));
        }

        store32_be(y, &mut output[0..]);
        store32_be(z, &mut output[4..]);
    }
}

impl Drop for Xtea {
    fn drop(&mut self) {
        zeroize(&mut self.k);
    }
}

impl core::fmt::Debug for Xtea {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Xtea { .. }")
    }
}

super::impl_block_cipher!(Xtea, XTEA_BLOCK_SIZE);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::hex;

    #[test]
    fn test_vectors() {
        let cases = [
            ("00000000000000000000000000000000", "0000000000000000", "dee9d4d8f7131ed9"),
            ("000102030405060708090a0b0c0d0e0f", "4142434445464748", "497df3d072612cb5"),
        ];
        for (key, pt, ct) in cases {
            let c = Xtea::new(&hex(key)).unwrap();
            let pt: [u8; 8] = hex(pt).try_into().unwrap();
            let mut out = [0u8; 8];
            c.encrypt(&pt, &mut out);
            assert_eq!(out.to_vec(), hex(ct));
            let mut back = [0u8; 8];
            c.decrypt(&out, &mut back);
            assert_eq!(back, pt);
        }
    }

    #[test]
    fn test_differs_from_tea() {
        let key = [7u8; 16];
        let mut a = [0u8; 8];
        let mut b = [0u8; 8];
        Xtea::new(&key).unwrap().encrypt(&[1u8; 8], &mut a);
        super::super::tea::Tea::new(&key).unwrap().encrypt(&[1u8; 8], &mut b);
        assert_ne!(a, b);
    }
}
