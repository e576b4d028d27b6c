//! SM3 hash function (GB/T 32905-2016).
//!
//! 512-bit blocks, 256-bit digest, 64 rounds with message expansion to 68
//! words plus 64 derived words.

use super::{BlockBuffer, HashAlgo, HashContext};
use crate::util::{load32_be, store32_be, zeroize};

/// SM3 block size
pub const SM3_BLOCK_SIZE: usize = 64;

/// SM3 digest size
pub const SM3_DIGEST_SIZE: usize = 32;

/// SM3 minimum padding (0x80 byte plus 64-bit length)
pub const SM3_MIN_PAD_SIZE: usize = 9;

/// SM3 OID (1.0.10118.3.0.65)
pub const SM3_OID: &[u8] = &[0x28, 0xCF, 0x06, 0x03, 0x00, 0x41];

/// Common interface for SM3
pub static SM3_HASH_ALGO: HashAlgo = HashAlgo {
    name: "SM3",
    oid: SM3_OID,
    context_size: core::mem::size_of::<Sm3>(),
    block_size: SM3_BLOCK_SIZE,
    digest_size: SM3_DIGEST_SIZE,
    min_pad_size: SM3_MIN_PAD_SIZE,
    final_clears_state: true,
    init: init_context,
};

fn init_context() -> HashContext {
    HashContext::Sm3(Sm3::new())
}

const IV: [u32; 8] = [
    0x7380_166F, 0x4914_B2B9, 0x1724_42D7, 0xDA8A_0600,
    0xA96F_30BC, 0x1631_38AA, 0xE38D_EE4D, 0xB0FB_0E4E,
];

const T_LOW: u32 = 0x79CC_4519;
const T_HIGH: u32 = 0x7A87_9D8A;

#[inline(always)]
fn ff(j: usize, x: u32, y: u32, z: u32) -> u32 {
    if j < 16 {
        x ^ y ^ z
    } else {
        (x & y) | (x & z) | (y & z)
    }
}

#[inline(always)]
fn gg(j: usize, x: u32, y: u32, z: u32) -> u32 {
    if j < 16 {
        x ^ y ^ z
    } else {
        (x & y) | (!x & z)
    }
}

#[inline(always)]
fn p0(x: u32) -> u32 {
    x ^ x.rotate_left(9) ^ x.rotate_left(17)
}

#[inline(always)]
fn p1(x: u32) -> u32 {
    x ^ x.rotate_left(15) ^ x.rotate_left(23)
}

/// SM3 hash state.
#[derive(Clone)]
pub struct Sm3 {
    state: [u32; 8],
    buf: BlockBuffer,
}

impl Sm3 {
    /// Create a context in the initial state
    pub const fn new() -> Self {
        Self {
            state: IV,
            buf: BlockBuffer::new(),
        }
    }

    /// Reset to the initial state
    pub fn init(&mut self) {
        self.state = IV;
        self.buf.reset();
    }

    /// Absorb more message bytes
    pub fn update(&mut self, data: &[u8]) {
        self.buf.update(data, |block| compress(&mut self.state, block));
    }

    /// Pad, write the digest and wipe the state
    pub fn finalize(&mut self, digest: &mut [u8; SM3_DIGEST_SIZE]) {
        self.buf.pad_be64(|block| compress(&mut self.state, block));
        self.finalize_raw(digest);
        zeroize(&mut self.state);
        self.buf.reset();
    }

    /// Write the chaining value without padding
    pub fn finalize_raw(&self, digest: &mut [u8; SM3_DIGEST_SIZE]) {
        for (i, w) in self.state.iter().enumerate() {
            store32_be(*w, &mut digest[4 * i..]);
        }
    }

    /// Digest `data` in one call
    pub fn compute(data: &[u8], digest: &mut [u8; SM3_DIGEST_SIZE]) {
        let mut ctx = Self::new();
        ctx.update(data);
        ctx.finalize(digest);
    }
}

/// Compression function `CF`
fn compress(state: &mut [u32; 8], block: &[u8; 64]) {
    let mut w = [0u32; 68];
    for (i, v) in w.iter_mut().take(16).enumerate() {
        *v = load32_be(&block[4 * i..]);
    }
    for j in 16..68 {
        w[j] = p1(w[j - 16] ^ w[j - 9] ^ w[j - 3].rotate_left(15))
            ^ w[j - 13].rotate_left(7)
            ^ w[j - 6];
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;
    for j in 0..64 {
        let t = if j < 16 { T_LOW } else { T_HIGH };
        let a12 = a.rotate_left(12);
        let ss1 = a12
            .wrapping_add(e)
            .wrapping_add(t.rotate_left((j % 32) as u32))
            .rotate_left(7);
        let ss2 = ss1 ^ a12;
        let w1 = w[j] ^ w[j + 4];
        let tt1 = ff(j, a, b, c).wrapping_add(d).wrapping_add(ss2).wrapping_add(w1);
        let tt2 = gg(j, e, f, g).wrapping_add(h).wrapping_add(ss1).wrapping_add(w[j]);
        d = c;
        c = b.rotate_left(9);
        b = a;
        a = tt1;
        h = g;
        g = f.rotate_left(19);
        f = e;
        e = p0(tt2);
    }

    for (s, v) in state.iter_mut().zip([a, b, c, d, e, f, g, h]) {
        *s ^= v;
    }
    zeroize(&mut w);
}

impl Default for Sm3 {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Sm3 {
    fn drop(&mut self) {
        zeroize(&mut self.state);
        self.buf.reset();
    }
}

impl core::fmt::Debug for Sm3 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Sm3 { .. }")
    }
}

super::impl_hash_function!(Sm3, SM3_HASH_ALGO, SM3_DIGEST_SIZE);
