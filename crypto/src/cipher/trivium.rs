//! Trivium stream cipher (eSTREAM hardware profile).
//!
//! 80-bit key, IV of up to 80 bits. The 288-bit state is kept as its three
//! shift registers (93, 84 and 111 bits), bit `i` of each register word
//! holding register stage `i`.

use super::{CipherKind, KeySizes, StreamAlgo, StreamCipher, StreamContext};
use crate::error::{CryptoError, CryptoResult};
use crate::util::zeroize;

/// Trivium key size
pub const TRIVIUM_KEY_SIZE: usize = 10;

/// Largest accepted IV
pub const TRIVIUM_MAX_IV_SIZE: usize = 10;

/// Warm-up clocks before output (4 full state cycles)
const INIT_ROUNDS: usize = 4 * 288;

const MASK_A: u128 = (1 << 93) - 1;
const MASK_B: u128 = (1 << 84) - 1;
const MASK_C: u128 = (1 << 111) - 1;

/// Common interface for Trivium
pub static TRIVIUM_STREAM_ALGO: StreamAlgo = StreamAlgo {
    name: "Trivium",
    context_size: core::mem::size_of::<Trivium>(),
    kind: CipherKind::Stream,
    key_sizes: KeySizes::Fixed(&[TRIVIUM_KEY_SIZE]),
    iv_sizes: KeySizes::Range { min: 0, max: TRIVIUM_MAX_IV_SIZE, step: 1 },
    init: init_context,
};

fn init_context(key: &[u8], iv: &[u8]) -> CryptoResult<StreamContext> {
    Ok(StreamContext::Trivium(Trivium::new(key, iv)?))
}

#[inline(always)]
fn bit(x: u128, i: u32) -> u128 {
    (x >> i) & 1
}

/// Load up to 80 bits into the top of an 80-stage register prefix
fn load_register(bytes: &[u8]) -> u128 {
    let mut r = 0u128;
    for i in 0..bytes.len() * 8 {
        let b = u128::from((bytes[i / 8] >> (i % 8)) & 1);
        r |= b << (79 - i);
    }
    r
}

/// Trivium keystream state.
pub struct Trivium {
    a: u128,
    b: u128,
    c: u128,
}

impl Trivium {
    /// Load a 10-byte key and an IV of 0 to 10 bytes, then run the warm-up
    pub fn new(key: &[u8], iv: &[u8]) -> CryptoResult<Self> {
        if key.len() != TRIVIUM_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength);
        }
        if iv.len() > TRIVIUM_MAX_IV_SIZE {
            return Err(CryptoError::InvalidParameter);
        }

        let mut ctx = Self {
            a: load_register(key),
            b: load_register(iv),
            c: 0b111 << 108,
        };
        for _ in 0..INIT_ROUNDS {
            ctx.clock();
        }
        Ok(ctx)
    }

    /// Clock the registers once, returning the output bit
    #[inline]
    fn clock(&mut self) -> u8 {
        let (a, b, c) = (self.a, self.b, self.c);
        let mut t1 = bit(a, 65) ^ bit(a, 92);
        let mut t2 = bit(b, 68) ^ bit(b, 83);
        let mut t3 = bit(c, 65) ^ bit(c, 110);
        let z = t1 ^ t2 ^ t3;

        t1 ^= (bit(a, 90) & bit(a, 91)) ^ bit(b, 77);
        t2 ^= (bit(b, 81) & bit(b, 82)) ^ bit(c, 86);
        t3 ^= (bit(c, 108) & bit(c, 109)) ^ bit(a, 68);

        self.a = ((a << 1) | t3) & MASK_A;
        self.b = ((b << 1) | t1) & MASK_B;
        self.c = ((c << 1) | t2) & MASK_C;
        z as u8
    }

    /// Next keystream bit (0 or 1)
    pub fn generate_bit(&mut self) -> u8 {
        self.clock()
    }

    /// Next keystream byte, first bit in the least significant position
    pub fn generate_byte(&mut self) -> u8 {
        (0..8).fold(0u8, |acc, j| acc | (self.clock() << j))
    }
}

impl StreamCipher for Trivium {
    fn apply_in_place(&mut self, data: &mut [u8]) {
        for b in data.iter_mut() {
            *b ^= self.generate_byte();
        }
    }
}

impl Drop for Trivium {
    fn drop(&mut self) {
        zeroize(core::slice::from_mut(&mut self.a));
        zeroize(core::slice::from_mut(&mut self.b));
        zeroize(core::slice::from_mut(&mut self.c));
    }
}

impl core::fmt::Debug for Trivium {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Trivium { .. }")
    }
}
