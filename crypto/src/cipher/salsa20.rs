//! Salsa20 stream cipher.
//!
//! 16 or 32-byte key, 8-byte nonce, 64-bit block counter and 20 rounds.
//! The core permutation is exported for reduced-round use by scrypt.

use super::{CipherKind, KeySizes, StreamAlgo, StreamCipher, StreamContext};
use crate::error::{CryptoError, CryptoResult};
use crate::util::{load32_le, zeroize};

/// Keystream block size
pub const SALSA20_BLOCK_SIZE: usize = 64;

/// Nonce size
pub const SALSA20_NONCE_SIZE: usize = 8;

const ROUNDS: usize = 20;

/// "expand 32-byte k"
const SIGMA: [u32; 4] = [0x6170_7865, 0x3320_646E, 0x7962_2D32, 0x6B20_6574];
/// "expand 16-byte k"
const TAU: [u32; 4] = [0x6170_7865, 0x3120_646E, 0x7962_2D36, 0x6B20_6574];

/// Common interface for Salsa20
pub static SALSA20_STREAM_ALGO: StreamAlgo = StreamAlgo {
    name: "Salsa20",
    context_size: core::mem::size_of::<Salsa20>(),
    kind: CipherKind::Stream,
    key_sizes: KeySizes::Fixed(&[16, 32]),
    iv_sizes: KeySizes::Fixed(&[SALSA20_NONCE_SIZE]),
    init: init_context,
};

fn init_context(key: &[u8], iv: &[u8]) -> CryptoResult<StreamContext> {
    Ok(StreamContext::Salsa20(Salsa20::new(key, iv)?))
}

#[inline(always)]
fn quarter_round(x: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    x[b] ^= x[a].wrapping_add(x[d]).rotate_left(7);
    x[c] ^= x[b].wrapping_add(x[a]).rotate_left(9);
    x[d] ^= x[c].wrapping_add(x[b]).rotate_left(13);
    x[a] ^= x[d].wrapping_add(x[c]).rotate_left(18);
}

/// Salsa20 core with `rounds` rounds (8, 12 or 20), feed-forward included
pub fn salsa20_core(input: &[u32; 16], output: &mut [u32; 16], rounds: usize) {
    let mut x = *input;
    for _ in 0..rounds / 2 {
        // Column round
        quarter_round(&mut x, 0, 4, 8, 12);
        quarter_round(&mut x, 5, 9, 13, 1);
        quarter_round(&mut x, 10, 14, 2, 6);
        quarter_round(&mut x, 15, 3, 7, 11);
        // Row round
        quarter_round(&mut x, 0, 1, 2, 3);
        quarter_round(&mut x, 5, 6, 7, 4);
        quarter_round(&mut x, 10, 11, 8, 9);
        quarter_round(&mut x, 15, 12, 13, 14);
    }
    for ((o, a), b) in output.iter_mut().zip(x.iter()).zip(input.iter()) {
        *o = a.wrapping_add(*b);
    }
    zeroize(&mut x);
}

// ============================================================================
// Salsa20 Context
// ============================================================================

/// Salsa20 keystream state.
pub struct Salsa20 {
    state: [u32; 16],
    block: [u8; SALSA20_BLOCK_SIZE],
    /// Next unused byte of `block`
    pos: usize,
}

impl Salsa20 {
    /// Set up a keystream from a 16 or 32-byte key and an 8-byte nonce
    pub fn new(key: &[u8], nonce: &[u8]) -> CryptoResult<Self> {
        let (constants, k2) = match key.len() {
            16 => (&TAU, &key[..16]),
            32 => (&SIGMA, &key[16..]),
            _ => return Err(CryptoError::InvalidKeyLength),
        };
        if nonce.len() != SALSA20_NONCE_SIZE {
            return Err(CryptoError::InvalidParameter);
        }

        let mut state = [0u32; 16];
        state[0] = constants[0];
        for i in 0..4 {
            state[1 + i] = load32_le(&key[4 * i..]);
            state[11 + i] = load32_le(&k2[4 * i..]);
        }
        state[5] = constants[1];
        state[6] = load32_le(&nonce[0..]);
        state[7] = load32_le(&nonce[4..]);
        // Block counter starts at zero
        state[10] = constants[2];
        state[15] = constants[3];

        Ok(Self {
            state,
            block: [0; SALSA20_BLOCK_SIZE],
            pos: SALSA20_BLOCK_SIZE,
        })
    }

    fn refill(&mut self) {
        let mut out = [0u32; 16];
        salsa20_core(&self.state, &mut out, ROUNDS);
        for (chunk, w) in self.block.chunks_exact_mut(4).zip(out.iter()) {
            chunk.copy_from_slice(&w.to_le_bytes());
        }
        zeroize(&mut out);

        let counter = ((u64::from(self.state[9]) << 32) | u64::from(self.state[8])).wrapping_add(1);
        self.state[8] = counter as u32;
        self.state[9] = (counter >> 32) as u32;
        self.pos = 0;
    }
}

impl StreamCipher for Salsa20 {
    fn apply_in_place(&mut self, data: &mut [u8]) {
        for b in data.iter_mut() {
            if self.pos == SALSA20_BLOCK_SIZE {
                self.refill();
            }
            *b ^= self.block[self.pos];
            self.pos += 1;
        }
    }
}

impl Drop for Salsa20 {
    fn drop(&mut self) {
        zeroize(&mut self.state);
        zeroize(&mut self.block);
    }
}

impl core::fmt::Debug for Salsa20 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Salsa20 { .. }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::hex;

    fn keystream(key: &[u8], nonce: &[u8], len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        Salsa20::new(key, nonce).unwrap().apply_in_place(&mut buf);
        buf
    }

    #[test]
    fn test_estream_vectors() {
        let mut key = [0u8; 32];
        key[0] = 0x80;
        assert_eq!(
            keystream(&key[..16], &[0u8; 8], 16),
            hex("4dfa5e481da23ea09a31022050859936")
        );
        assert_eq!(keystream(&key, &[0u8; 8], 16), hex("e3be8fdd8beca2e3ea8ef9475b29a6e7"));
    }

    #[test]
    fn test_counter_advances() {
        let key: Vec<u8> = (0..32).collect();
        let nonce: Vec<u8> = (0..8).collect();
        let ks = keystream(&key, &nonce, 130);
        assert_eq!(ks[64..80].to_vec(), hex("a13a2b59d9047b8dbeb93ec4b78ce1a5"));

        // Split application matches one-shot
        let mut split = vec![0u8; 130];
        let mut c = Salsa20::new(&key, &nonce).unwrap();
        c.apply_in_place(&mut split[..7]);
        c.apply_in_place(&mut split[7..100]);
        c.apply_in_place(&mut split[100..]);
        assert_eq!(split, ks);
    }

    #[test]
    fn test_salsa20_8_core() {
        let input = hex(
            "7e879a214f3ec9867ca940e641718f26baee555b8c61c1b50df846116dcd3b1d\
             ee24f319df9b3d8514121e4b5ac5aa3276021d2909c74829edebc68db8b8c25e",
        );
        let expected = hex(
            "a41f859c6608cc993b81cacb020cef05044b2181a2fd337dfd7b1c6396682f29\
             b4393168e3c9e6bcfe6bc5b7a06d96bae424cc102c91745c24ad673dc7618f81",
        );
        let mut words = [0u32; 16];
        for (w, c) in words.iter_mut().zip(input.chunks(4)) {
            *w = load32_le(c);
        }
        let mut out = [0u32; 16];
        salsa20_core(&words, &mut out, 8);
        let bytes: Vec<u8> = out.iter().flat_map(|w| w.to_le_bytes()).collect();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_bad_parameters() {
        assert_eq!(Salsa20::new(&[0u8; 24], &[0u8; 8]).err(), Some(CryptoError::InvalidKeyLength));
        assert_eq!(Salsa20::new(&[0u8; 16], &[0u8; 12]).err(), Some(CryptoError::InvalidParameter));
        let mut out = [0u8; 3];
        let mut c = Salsa20::new(&[0u8; 16], &[0u8; 8]).unwrap();
        assert_eq!(c.apply(&[0u8; 4], &mut out), Err(CryptoError::InvalidLength));
    }
}
