//! Serpent block cipher.
//!
//! 128-bit block, 32 rounds, 128/192/256-bit keys. The S-boxes are applied
//! in bitslice form over the four 32-bit state words, one nibble column at
//! a time.

use super::{CipherAlgo, CipherContext, CipherFlags, CipherKind, KeySizes};
use crate::error::{CryptoError, CryptoResult};
use crate::util::{load32_le, store32_le, zeroize};

/// Serpent block size
pub const SERPENT_BLOCK_SIZE: usize = 16;

const ROUNDS: usize = 32;

/// Golden-ratio constant of the prekey recurrence
const PHI: u32 = 0x9E37_79B9;

/// Common interface for Serpent
pub static SERPENT_CIPHER_ALGO: CipherAlgo = CipherAlgo {
    name: "Serpent",
    oid: &[],
    context_size: core::mem::size_of::<Serpent>(),
    kind: CipherKind::Block,
    block_size: SERPENT_BLOCK_SIZE,
    key_sizes: KeySizes::Fixed(&[16, 24, 32]),
    flags: CipherFlags::WIDE_BLOCK,
    init: init_context,
};

fn init_context(key: &[u8]) -> CryptoResult<CipherContext> {
    Ok(CipherContext::Serpent(Serpent::new(key)?))
}

const SBOX: [[u8; 16]; 8] = [
    [3, 8, 15, 1, 10, 6, 5, 11, 14, 13, 4, 2, 7, 0, 9, 12],
    [15, 12, 2, 7, 9, 0, 5, 10, 1, 11, 14, 8, 6, 13, 3, 4],
    [8, 6, 7, 9, 3, 12, 10, 15, 13, 1, 14, 4, 0, 11, 5, 2],
    [0, 15, 11, 8, 12, 9, 6, 3, 13, 1, 2, 4, 10, 7, 5, 14],
    [1, 15, 8, 3, 12, 0, 11, 6, 2, 5, 4, 10, 9, 14, 7, 13],
    [15, 5, 2, 11, 4, 10, 9, 12, 0, 3, 14, 8, 13, 6, 7, 1],
    [7, 2, 12, 5, 8, 4, 6, 11, 14, 9, 1, 15, 13, 3, 10, 0],
    [1, 13, 15, 0, 14, 8, 2, 11, 7, 4, 12, 10, 9, 3, 5, 6],
];

const SBOX_INV: [[u8; 16]; 8] = invert_sboxes(&SBOX);

const fn invert_sboxes(s: &[[u8; 16]; 8]) -> [[u8; 16]; 8] {
    let mut inv = [[0u8; 16]; 8];
    let mut i = 0;
    while i < 8 {
        let mut j = 0;
        while j < 16 {
            inv[i][s[i][j] as usize] = j as u8;
            j += 1;
        }
        i += 1;
    }
    inv
}

type Block = [u32; 4];

/// Apply a 4-bit S-box to each of the 32 bit columns of `x`
fn sbox(table: &[u8; 16], x: &Block) -> Block {
    let mut out = [0u32; 4];
    for bit in 0..32 {
        let n = ((x[0] >> bit) & 1)
            | (((x[1] >> bit) & 1) << 1)
            | (((x[2] >> bit) & 1) << 2)
            | (((x[3] >> bit) & 1) << 3);
        let v = u32::from(table[n as usize]);
        for (k, o) in out.iter_mut().enumerate() {
            *o |= ((v >> k) & 1) << bit;
        }
    }
    out
}

fn linear_transform(x: &mut Block) {
    x[0] = x[0].rotate_left(13);
    x[2] = x[2].rotate_left(3);
    x[1] ^= x[0] ^ x[2];
    x[3] ^= x[2] ^ (x[0] << 3);
    x[1] = x[1].rotate_left(1);
    x[3] = x[3].rotate_left(7);
    x[0] ^= x[1] ^ x[3];
    x[2] ^= x[3] ^ (x[1] << 7);
    x[0] = x[0].rotate_left(5);
    x[2] = x[2].rotate_left(22);
}

fn inverse_linear_transform(x: &mut Block) {
    x[2] = x[2].rotate_right(22);
    x[0] = x[0].rotate_right(5);
    x[2] ^= x[3] ^ (x[1] << 7);
    x[0] ^= x[1] ^ x[3];
    x[3] = x[3].rotate_right(7);
    x[1] = x[1].rotate_right(1);
    x[3] ^= x[2] ^ (x[0] << 3);
    x[1] ^= x[0] ^ x[2];
    x[2] = x[2].rotate_right(3);
    x[0] = x[0].rotate_right(13);
}

#[inline]
fn xor_key(x: &mut Block, k: &Block) {
    for (a, b) in x.iter_mut().zip(k) {
        *a ^= b;
    }
}

// ============================================================================
// Serpent Context
// ============================================================================

/// Serpent expanded-key context.
pub struct Serpent {
    /// 33 round keys
    k: [Block; ROUNDS + 1],
}

impl Serpent {
    /// Expand a 16, 24 or 32-byte key
    pub fn new(key: &[u8]) -> CryptoResult<Self> {
        if !matches!(key.len(), 16 | 24 | 32) {
            return Err(CryptoError::InvalidKeyLength);
        }

        // Short keys are padded with a single one bit
        let mut padded = [0u8; 32];
        padded[..key.len()].copy_from_slice(key);
        if key.len() < 32 {
            padded[key.len()] = 0x01;
        }

        let mut w = [0u32; 8 + 132];
        for i in 0..8 {
            w[i] = load32_le(&padded[4 * i..]);
        }
        for i in 0..132 {
            w[i + 8] = (w[i] ^ w[i + 3] ^ w[i + 5] ^ w[i + 7] ^ PHI ^ i as u32).rotate_left(11);
        }

        let mut ctx = Self {
            k: [[0; 4]; ROUNDS + 1],
        };
        for (i, rk) in ctx.k.iter_mut().enumerate() {
            let pre = [w[8 + 4 * i], w[9 + 4 * i], w[10 + 4 * i], w[11 + 4 * i]];
            *rk = sbox(&SBOX[(ROUNDS + 3 - i) % 8], &pre);
        }

        zeroize(&mut padded);
        zeroize(&mut w);
        Ok(ctx)
    }

    /// Encrypt a single block
    pub fn encrypt(&self, input: &[u8; 16], output: &mut [u8; 16]) {
        let mut x = load_block(input);
        for r in 0..ROUNDS {
            xor_key(&mut x, &self.k[r]);
            x = sbox(&SBOX[r % 8], &x);
            if r < ROUNDS - 1 {
                linear_transform(&mut x);
            } else {
                xor_key(&mut x, &self.k[ROUNDS]);
            }
        }
        store_block(&x, output);
    }

    /// Decrypt a single block
    pub fn decrypt(&self, input: &[u8; 16], output: &mut [u8; 16]) {
        let mut x = load_block(input);
        for r in (0..ROUNDS).rev() {
            if r < ROUNDS - 1 {
                inverse_linear_transform(&mut x);
            } else {
                xor_key(&mut x, &self.k[ROUNDS]);
            }
            x = sbox(&SBOX_INV[r % 8], &x);
            xor_key(&mut x, &self.k[r]);
        }
        store_block(&x, output);
    }
}

fn load_block(b: &[u8; 16]) -> Block {
    [load32_le(&b[0..]), load32_le(&b[4..]), load32_le(&b[8..]), load32_le(&b[12..])]
}

fn store_block(x: &Block, b: &mut [u8; 16]) {
    for (i, v) in x.iter().enumerate() {
        store32_le(*v, &mut b[4 * i..]);
    }
}

impl Drop for Serpent {
    fn drop(&mut self) {
        for rk in self.k.iter_mut() {
            zeroize(rk);
        }
    }
}

impl core::fmt::Debug for Serpent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Serpent { .. }")
    }
}

super::impl_block_cipher!(Serpent, SERPENT_BLOCK_SIZE);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::hex;

    fn check(key: &str, pt: &str, ct: &str) {
        let c = Serpent::new(&hex(key)).unwrap();
        let pt: [u8; 16] = hex(pt).try_into().unwrap();
        let mut out = [0u8; 16];
        c.encrypt(&pt, &mut out);
        assert_eq!(out.to_vec(), hex(ct));
        let mut back = [0u8; 16];
        c.decrypt(&out, &mut back);
        assert_eq!(back, pt);
    }

    #[test]
    fn test_nessie_vectors() {
        check(
            "00000000000000000000000000000000",
            "00000000000000000000000000000000",
            "3620b17ae6a993d09618b8768266bae9",
        );
        check(
            "000102030405060708090a0b0c0d0e0f",
            "00112233445566778899aabbccddeeff",
            "563e2cf8740a27c164804560391e9b27",
        );
        check(
            "2bd6459f82c5b300952c49104881ff48",
            "ea024714ad5c4d84ea024714ad5c4d84",
            "92d7f8ef2c36c53409f275902f06539f",
        );
    }

    #[test]
    fn test_sbox_inverse() {
        for (s, inv) in SBOX.iter().zip(SBOX_INV.iter()) {
            for v in 0..16u8 {
                assert_eq!(inv[s[v as usize] as usize], v);
            }
        }
    }

    #[test]
    fn test_linear_transform_inverse() {
        let orig = [0x0123_4567, 0x89AB_CDEF, 0xDEAD_BEEF, 0x0BAD_F00D];
        let mut x = orig;
        linear_transform(&mut x);
        assert_ne!(x, orig);
        inverse_linear_transform(&mut x);
        assert_eq!(x, orig);
    }
}
