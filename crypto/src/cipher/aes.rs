//! AES block cipher (FIPS 197).
//!
//! Byte-oriented software implementation supporting 128, 192 and
//! 256-bit keys.

use super::{CipherAlgo, CipherContext, CipherFlags, CipherKind, KeySizes};
use crate::error::{CryptoError, CryptoResult};
use crate::util::zeroize;

// ============================================================================
// Constants
// ============================================================================

/// AES block size
pub const AES_BLOCK_SIZE: usize = 16;

/// AES S-box
pub(super) const SBOX: [u8; 256] = [
    0x63, 0x7c, 0x77, 0x7b, 0xf2, 0x6b, 0x6f, 0xc5, 0x30, 0x01, 0x67, 0x2b, 0xfe, 0xd7, 0xab, 0x76,
    0xca, 0x82, 0xc9, 0x7d, 0xfa, 0x59, 0x47, 0xf0, 0xad, 0xd4, 0xa2, 0xaf, 0x9c, 0xa4, 0x72, 0xc0,
    0xb7, 0xfd, 0x93, 0x26, 0x36, 0x3f, 0xf7, 0xcc, 0x34, 0xa5, 0xe5, 0xf1, 0x71, 0xd8, 0x31, 0x15,
    0x04, 0xc7, 0x23, 0xc3, 0x18, 0x96, 0x05, 0x9a, 0x07, 0x12, 0x80, 0xe2, 0xeb, 0x27, 0xb2, 0x75,
    0x09, 0x83, 0x2c, 0x1a, 0x1b, 0x6e, 0x5a, 0xa0, 0x52, 0x3b, 0xd6, 0xb3, 0x29, 0xe3, 0x2f, 0x84,
    0x53, 0xd1, 0x00, 0xed, 0x20, 0xfc, 0xb1, 0x5b, 0x6a, 0xcb, 0xbe, 0x39, 0x4a, 0x4c, 0x58, 0xcf,
    0xd0, 0xef, 0xaa, 0xfb, 0x43, 0x4d, 0x33, 0x85, 0x45, 0xf9, 0x02, 0x7f, 0x50, 0x3c, 0x9f, 0xa8,
    0x51, 0xa3, 0x40, 0x8f, 0x92, 0x9d, 0x38, 0xf5, 0xbc, 0xb6, 0xda, 0x21, 0x10, 0xff, 0xf3, 0xd2,
    0xcd, 0x0c, 0x13, 0xec, 0x5f, 0x97, 0x44, 0x17, 0xc4, 0xa7, 0x7e, 0x3d, 0x64, 0x5d, 0x19, 0x73,
    0x60, 0x81, 0x4f, 0xdc, 0x22, 0x2a, 0x90, 0x88, 0x46, 0xee, 0xb8, 0x14, 0xde, 0x5e, 0x0b, 0xdb,
    0xe0, 0x32, 0x3a, 0x0a, 0x49, 0x06, 0x24, 0x5c, 0xc2, 0xd3, 0xac, 0x62, 0x91, 0x95, 0xe4, 0x79,
    0xe7, 0xc8, 0x37, 0x6d, 0x8d, 0xd5, 0x4e, 0xa9, 0x6c, 0x56, 0xf4, 0xea, 0x65, 0x7a, 0xae, 0x08,
    0xba, 0x78, 0x25, 0x2e, 0x1c, 0xa6, 0xb4, 0xc6, 0xe8, 0xdd, 0x74, 0x1f, 0x4b, 0xbd, 0x8b, 0x8a,
    0x70, 0x3e, 0xb5, 0x66, 0x48, 0x03, 0xf6, 0x0e, 0x61, 0x35, 0x57, 0xb9, 0x86, 0xc1, 0x1d, 0x9e,
    0xe1, 0xf8, 0x98, 0x11, 0x69, 0xd9, 0x8e, 0x94, 0x9b, 0x1e, 0x87, 0xe9, 0xce, 0x55, 0x28, 0xdf,
    0x8c, 0xa1, 0x89, 0x0d, 0xbf, 0xe6, 0x42, 0x68, 0x41, 0x99, 0x2d, 0x0f, 0xb0, 0x54, 0xbb, 0x16,
];

/// Inverse S-box, derived from [`SBOX`]
pub(super) const INV_SBOX: [u8; 256] = invert_sbox(&SBOX);

/// Round constants
const RCON: [u8; 10] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1b, 0x36];

pub(super) const fn invert_sbox(sbox: &[u8; 256]) -> [u8; 256] {
    let mut inv = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        inv[sbox[i] as usize] = i as u8;
        i += 1;
    }
    inv
}

/// Common interface for AES
pub static AES_CIPHER_ALGO: CipherAlgo = CipherAlgo {
    name: "AES",
    oid: &[],
    context_size: core::mem::size_of::<Aes>(),
    kind: CipherKind::Block,
    block_size: AES_BLOCK_SIZE,
    key_sizes: KeySizes::Fixed(&[16, 24, 32]),
    flags: CipherFlags::WIDE_BLOCK,
    init: init_context,
};

fn init_context(key: &[u8]) -> CryptoResult<CipherContext> {
    Ok(CipherContext::Aes(Aes::new(key)?))
}

// ============================================================================
// AES Context
// ============================================================================

/// AES expanded-key context.
pub struct Aes {
    /// Round keys (up to 15 x 16 bytes)
    round_keys: [u8; 240],
    /// Number of rounds (10, 12 or 14)
    rounds: usize,
}

impl Aes {
    /// Expand a 16, 24 or 32-byte key
    pub fn new(key: &[u8]) -> CryptoResult<Self> {
        let rounds = match key.len() {
            16 => 10,
            24 => 12,
            32 => 14,
            _ => return Err(CryptoError::InvalidKeyLength),
        };

        let mut ctx = Self {
            round_keys: [0; 240],
            rounds,
        };
        ctx.key_expansion(key);
        Ok(ctx)
    }

    /// Number of rounds
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    fn key_expansion(&mut self, key: &[u8]) {
        let nk = key.len();
        let total = (self.rounds + 1) * 16;
        self.round_keys[..nk].copy_from_slice(key);

        let mut rcon_idx = 0;
        let mut i = nk;

        while i < total {
            let mut temp = [0u8; 4];
            temp.copy_from_slice(&self.round_keys[i - 4..i]);

            if i % nk == 0 {
                temp.rotate_left(1);
                for b in &mut temp {
                    *b = SBOX[*b as usize];
                }
                temp[0] ^= RCON[rcon_idx];
                rcon_idx += 1;
            } else if nk == 32 && i % nk == 16 {
                // Extra SubWord for 256-bit keys
                for b in &mut temp {
                    *b = SBOX[*b as usize];
                }
            }

            for j in 0..4 {
                self.round_keys[i + j] = self.round_keys[i - nk + j] ^ temp[j];
            }

            i += 4;
        }
    }

    fn add_round_key(&self, state: &mut [u8; 16], round: usize) {
        let round_key = &self.round_keys[round * 16..round * 16 + 16];
        for (s, k) in state.iter_mut().zip(round_key) {
            *s ^= k;
        }
    }

    /// Encrypt a single block
    pub fn encrypt(&self, input: &[u8; 16], output: &mut [u8; 16]) {
        let mut state = *input;
        self.add_round_key(&mut state, 0);

        for round in 1..self.rounds {
            sub_bytes(&mut state, &SBOX);
            shift_rows(&mut state);
            mix_columns(&mut state);
            self.add_round_key(&mut state, round);
        }

        // Final round (no MixColumns)
        sub_bytes(&mut state, &SBOX);
        shift_rows(&mut state);
        self.add_round_key(&mut state, self.rounds);

        *output = state;
    }

    /// Decrypt a single block
    pub fn decrypt(&self, input: &[u8; 16], output: &mut [u8; 16]) {
        let mut state = *input;
        self.add_round_key(&mut state, self.rounds);

        for round in (1..self.rounds).rev() {
            inv_shift_rows(&mut state);
            sub_bytes(&mut state, &INV_SBOX);
            self.add_round_key(&mut state, round);
            inv_mix_columns(&mut state);
        }

        inv_shift_rows(&mut state);
        sub_bytes(&mut state, &INV_SBOX);
        self.add_round_key(&mut state, 0);

        *output = state;
    }
}

impl Drop for Aes {
    fn drop(&mut self) {
        zeroize(&mut self.round_keys);
    }
}

impl core::fmt::Debug for Aes {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Aes").field("rounds", &self.rounds).finish_non_exhaustive()
    }
}

super::impl_block_cipher!(Aes, AES_BLOCK_SIZE);

// ============================================================================
// Round transformations
// ============================================================================

fn sub_bytes(state: &mut [u8; 16], sbox: &[u8; 256]) {
    for b in state.iter_mut() {
        *b = sbox[*b as usize];
    }
}

fn shift_rows(state: &mut [u8; 16]) {
    let s = *state;
    for col in 0..4 {
        for row in 0..4 {
            state[col * 4 + row] = s[((col + row) % 4) * 4 + row];
        }
    }
}

fn inv_shift_rows(state: &mut [u8; 16]) {
    let s = *state;
    for col in 0..4 {
        for row in 0..4 {
            state[((col + row) % 4) * 4 + row] = s[col * 4 + row];
        }
    }
}

fn mix_columns(state: &mut [u8; 16]) {
    for col in state.chunks_exact_mut(4) {
        let (a, b, c, d) = (col[0], col[1], col[2], col[3]);
        col[0] = gf_mul(a, 2) ^ gf_mul(b, 3) ^ c ^ d;
        col[1] = a ^ gf_mul(b, 2) ^ gf_mul(c, 3) ^ d;
        col[2] = a ^ b ^ gf_mul(c, 2) ^ gf_mul(d, 3);
        col[3] = gf_mul(a, 3) ^ b ^ c ^ gf_mul(d, 2);
    }
}

fn inv_mix_columns(state: &mut [u8; 16]) {
    for col in state.chunks_exact_mut(4) {
        let (a, b, c, d) = (col[0], col[1], col[2], col[3]);
        col[0] = gf_mul(a, 14) ^ gf_mul(b, 11) ^ gf_mul(c, 13) ^ gf_mul(d, 9);
        col[1] = gf_mul(a, 9) ^ gf_mul(b, 14) ^ gf_mul(c, 11) ^ gf_mul(d, 13);
        col[2] = gf_mul(a, 13) ^ gf_mul(b, 9) ^ gf_mul(c, 14) ^ gf_mul(d, 11);
        col[3] = gf_mul(a, 11) ^ gf_mul(b, 13) ^ gf_mul(c, 9) ^ gf_mul(d, 14);
    }
}

/// GF(2^8) multiplication modulo x^8 + x^4 + x^3 + x + 1
#[inline]
fn gf_mul(mut a: u8, mut b: u8) -> u8 {
    let mut p = 0u8;
    while b != 0 {
        if b & 1 != 0 {
            p ^= a;
        }
        let hi = a & 0x80;
        a <<= 1;
        if hi != 0 {
            a ^= 0x1b;
        }
        b >>= 1;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::hex;

    fn check(key: &str, pt: &str, ct: &str) {
        let aes = Aes::new(&hex(key)).unwrap();
        let pt: [u8; 16] = hex(pt).try_into().unwrap();
        let ct: [u8; 16] = hex(ct).try_into().unwrap();
        let mut out = [0u8; 16];
        aes.encrypt(&pt, &mut out);
        assert_eq!(out, ct);
        aes.decrypt(&ct, &mut out);
        assert_eq!(out, pt);
    }

    #[test]
    fn test_fips197_vectors() {
        let pt = "00112233445566778899aabbccddeeff";
        check("000102030405060708090a0b0c0d0e0f", pt, "69c4e0d86a7b0430d8cdb78070b4c55a");
        check(
            "000102030405060708090a0b0c0d0e0f1011121314151617",
            pt,
            "dda97ca4864cdfe06eaf70a0ec0d7191",
        );
        check(
            "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
            pt,
            "8ea2b7ca516745bfeafc49904b496089",
        );
    }

    #[test]
    fn test_aes_context() {
        assert_eq!(Aes::new(&[0u8; 32]).unwrap().rounds(), 14);
        assert_eq!(Aes::new(&[0u8; 16]).unwrap().rounds(), 10);
        assert_eq!(Aes::new(&[0u8; 20]).err(), Some(CryptoError::InvalidKeyLength));
    }

    #[test]
    fn test_gf_mul() {
        assert_eq!(gf_mul(0x57, 2), 0xae);
        assert_eq!(gf_mul(0x57, 3), 0xf9);
        assert_eq!(gf_mul(0x57, 0x13), 0xfe);
    }
}
