//! CAST-256 block cipher (RFC 2612).
//!
//! 128-bit block, 128 to 256-bit keys in 32-bit increments. Shares the
//! round functions and S-boxes S1..S4 with CAST-128.

use super::cast128::{f1, f2, f3};
use super::{CipherAlgo, CipherContext, CipherFlags, CipherKind, KeySizes};
use crate::error::{CryptoError, CryptoResult};
use crate::util::{load32_be, store32_be, zeroize};

/// CAST-256 block size
pub const CAST256_BLOCK_SIZE: usize = 16;

/// Common interface for CAST-256
pub static CAST256_CIPHER_ALGO: CipherAlgo = CipherAlgo {
    name: "CAST-256",
    oid: &[],
    context_size: core::mem::size_of::<Cast256>(),
    kind: CipherKind::Block,
    block_size: CAST256_BLOCK_SIZE,
    key_sizes: KeySizes::Range { min: 16, max: 32, step: 4 },
    flags: CipherFlags::VARIABLE_KEY.union(CipherFlags::WIDE_BLOCK),
    init: init_context,
};

fn init_context(key: &[u8]) -> CryptoResult<CipherContext> {
    Ok(CipherContext::Cast256(Cast256::new(key)?))
}

// ============================================================================
// Key schedule constants
// ============================================================================

/// Masking (`Tm`) and rotation (`Tr`) constants for the 24 key-schedule
/// octaves, generated from Cm = 2^30 * sqrt(2) and Mm = 2^30 * sqrt(3).
const TM_TR: ([[u32; 8]; 24], [[u32; 8]; 24]) = schedule_constants();

const fn schedule_constants() -> ([[u32; 8]; 24], [[u32; 8]; 24]) {
    let mut tm = [[0u32; 8]; 24];
    let mut tr = [[0u32; 8]; 24];
    let mut cm: u32 = 0x5A82_7999;
    let mut cr: u32 = 19;
    let mut i = 0;
    while i < 24 {
        let mut j = 0;
        while j < 8 {
            tm[i][j] = cm;
            cm = cm.wrapping_add(0x6ED9_EBA1);
            tr[i][j] = cr;
            cr = (cr + 17) % 32;
            j += 1;
        }
        i += 1;
    }
    (tm, tr)
}

/// Forward octave `W_i` over the key words `A..H`
fn octave(w: &mut [u32; 8], i: usize) {
    let (tm, tr) = (&TM_TR.0[i], &TM_TR.1[i]);
    let [a, b, c, d, e, f, g, h] = [0, 1, 2, 3, 4, 5, 6, 7];
    w[g] ^= f1(w[h], tm[0], tr[0]);
    w[f] ^= f2(w[g], tm[1], tr[1]);
    w[e] ^= f3(w[f], tm[2], tr[2]);
    w[d] ^= f1(w[e], tm[3], tr[3]);
    w[c] ^= f2(w[d], tm[4], tr[4]);
    w[b] ^= f3(w[c], tm[5], tr[5]);
    w[a] ^= f1(w[b], tm[6], tr[6]);
    w[h] ^= f2(w[a], tm[7], tr[7]);
}

// ============================================================================
// CAST-256 Context
// ============================================================================

/// CAST-256 expanded-key context.
pub struct Cast256 {
    /// Masking subkeys, four per quad-round
    km: [[u32; 4]; 12],
    /// Rotation subkeys, four per quad-round
    kr: [[u32; 4]; 12],
}

impl Cast256 {
    /// Expand a 16, 20, 24, 28 or 32-byte key
    pub fn new(key: &[u8]) -> CryptoResult<Self> {
        if key.len() < 16 || key.len() > 32 || key.len() % 4 != 0 {
            return Err(CryptoError::InvalidKeyLength);
        }

        let mut padded = [0u8; 32];
        padded[..key.len()].copy_from_slice(key);
        let mut w = [0u32; 8];
        for (i, v) in w.iter_mut().enumerate() {
            *v = load32_be(&padded[4 * i..]);
        }
        zeroize(&mut padded);

        let mut ctx = Self {
            km: [[0; 4]; 12],
            kr: [[0; 4]; 12],
        };

        for i in 0..12 {
            octave(&mut w, 2 * i);
            octave(&mut w, 2 * i + 1);
            ctx.kr[i] = [w[0] & 0x1F, w[2] & 0x1F, w[4] & 0x1F, w[6] & 0x1F];
            ctx.km[i] = [w[7], w[5], w[3], w[1]];
        }

        zeroize(&mut w);
        Ok(ctx)
    }

    /// Forward quad-round
    #[inline]
    fn q(&self, x: &mut [u32; 4], i: usize) {
        let (km, kr) = (&self.km[i], &self.kr[i]);
        x[2] ^= f1(x[3], km[0], kr[0]);
        x[1] ^= f2(x[2], km[1], kr[1]);
        x[0] ^= f3(x[1], km[2], kr[2]);
        x[3] ^= f1(x[0], km[3], kr[3]);
    }

    /// Reverse quad-round
    #[inline]
    fn qbar(&self, x: &mut [u32; 4], i: usize) {
        let (km, kr) = (&self.km[i], &self.kr[i]);
        x[3] ^= f1(x[0], km[3], kr[3]);
        x[0] ^= f3(x[1], km[2], kr[2]);
        x[1] ^= f2(x[2], km[1], kr[1]);
        x[2] ^= f1(x[3], km[0], kr[0]);
    }

    /// Encrypt a single block
    pub fn encrypt(&self, input: &[u8; 16], output: &mut [u8; 16]) {
        let mut x = load_block(input);
        for i in 0..6 {
            self.q(&mut x, i);
        }
        for i in 6..12 {
            self.qbar(&mut x, i);
        }
        store_block(&x, output);
    }

    /// Decrypt a single block
    pub fn decrypt(&self, input: &[u8; 16], output: &mut [u8; 16]) {
        let mut x = load_block(input);
        for i in (6..12).rev() {
            self.q(&mut x, i);
        }
        for i in (0..6).rev() {
            self.qbar(&mut x, i);
        }
        store_block(&x, output);
    }
}

fn load_block(b: &[u8; 16]) -> [u32; 4] {
    [load32_be(&b[0..]), load32_be(&b[4..]), load32_be(&b[8..]), load32_be(&b[12..])]
}

fn store_block(x: &[u32; 4], b: &mut [u8; 16]) {
    for (i, v) in x.iter().enumerate() {
        store32_be(*v, &mut b[4 * i..]);
    }
}

impl Drop for Cast256 {
    fn drop(&mut self) {
        for (km, kr) in self.km.iter_mut().zip(self.kr.iter_mut()) {
            zeroize(km);
            zeroize(kr);
        }
    }
}

impl core::fmt::Debug for Cast256 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Cast256 { .. }")
    }
}

super::impl_block_cipher!(Cast256, CAST256_BLOCK_SIZE);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::hex;

    #[test]
    fn test_rfc2612_vectors() {
        let cases = [
            ("2342bb9efa38542c0af75647f29f615d", "c842a08972b43d20836c91d1b7530f6b"),
            (
                "2342bb9efa38542cbed0ac83940ac298bac77a7717942863",
                "1b386c0210dcadcbdd0e41aa08a7a7e8",
            ),
            (
                "2342bb9efa38542cbed0ac83940ac2988d7c47ce264908461cc1b5137ae6b604",
                "4f6a2038286897b9c9870136553317fa",
            ),
        ];
        for (key, ct) in cases {
            let c = Cast256::new(&hex(key)).unwrap();
            let mut out = [0u8; 16];
            c.encrypt(&[0u8; 16], &mut out);
            assert_eq!(out.to_vec(), hex(ct));
            let mut back = [0xFFu8; 16];
            c.decrypt(&out, &mut back);
            assert_eq!(back, [0u8; 16]);
        }
    }

    #[test]
    fn test_schedule_constants() {
        assert_eq!(TM_TR.0[0][0], 0x5A82_7999);
        assert_eq!(TM_TR.0[0][1], 0xC95C_653A);
        assert_eq!(TM_TR.1[0][0], 19);
        assert_eq!(TM_TR.1[0][1], 4);
        assert_eq!(TM_TR.1[23][7], (19 + 17 * 191) % 32);
    }

    #[test]
    fn test_key_lengths() {
        assert!(Cast256::new(&[0u8; 20]).is_ok());
        assert_eq!(Cast256::new(&[0u8; 18]).err(), Some(CryptoError::InvalidKeyLength));
        assert_eq!(Cast256::new(&[0u8; 36]).err(), Some(CryptoError::InvalidKeyLength));
    }
}
