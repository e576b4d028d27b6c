//! GHASH universal hash over GF(2^128), shared by GCM and GMAC.
//!
//! Multiplication by the hash key `H` uses a precomputed table of
//! `H * n` for every `TABLE_BITS`-bit value `n` (Shoup's method). Values
//! are held as big-endian `u128`, so bit 127 is the coefficient of `x^0`.

use static_assertions::const_assert_eq;

use crate::util::zeroize;

cfg_if::cfg_if! {
    if #[cfg(feature = "gmac-table-8")] {
        /// Bits consumed per table lookup
        const TABLE_BITS: u32 = 8;
    } else {
        /// Bits consumed per table lookup
        const TABLE_BITS: u32 = 4;
    }
}

const TABLE_SIZE: usize = 1 << TABLE_BITS;
const MASK: u128 = (1 << TABLE_BITS) - 1;

const_assert_eq!(128 % TABLE_BITS, 0);

/// x^128 + x^7 + x^2 + x + 1, reflected
const R: u128 = 0xE1 << 120;

/// Multiply by `x`
const fn mul_x(v: u128) -> u128 {
    (v >> 1) ^ if v & 1 != 0 { R } else { 0 }
}

/// Reduction of the `TABLE_BITS` bits shifted out of the accumulator
static REDUCE: [u128; TABLE_SIZE] = reduction_table();

const fn reduction_table() -> [u128; TABLE_SIZE] {
    let mut t = [0u128; TABLE_SIZE];
    let mut b = 0;
    while b < TABLE_SIZE {
        let mut v = b as u128;
        let mut i = 0;
        while i < TABLE_BITS {
            v = mul_x(v);
            i += 1;
        }
        t[b] = v;
        b += 1;
    }
    t
}

/// Precomputed multiples of the hash key.
#[derive(Clone)]
pub(crate) struct GHashKey {
    m: [u128; TABLE_SIZE],
}

impl GHashKey {
    /// Build the table for `H`
    pub(crate) fn new(h: &[u8; 16]) -> Self {
        let mut m = [0u128; TABLE_SIZE];

        // Single-bit entries: the top bit of the index is x^0
        let mut v = u128::from_be_bytes(*h);
        let mut i = TABLE_SIZE / 2;
        while i > 0 {
            m[i] = v;
            v = mul_x(v);
            i /= 2;
        }

        // Remaining entries by linearity
        let mut i = 2;
        while i < TABLE_SIZE {
            for j in 1..i {
                m[i + j] = m[i] ^ m[j];
            }
            i *= 2;
        }

        Self { m }
    }

    /// Multiply `x` by `H`
    pub(crate) fn mul(&self, x: u128) -> u128 {
        let mut z = 0u128;
        let mut shift = 0;
        while shift < 128 {
            if shift != 0 {
                z = (z >> TABLE_BITS) ^ REDUCE[(z & MASK) as usize];
            }
            z ^= self.m[((x >> shift) & MASK) as usize];
            shift += TABLE_BITS;
        }
        z
    }
}

impl Drop for GHashKey {
    fn drop(&mut self) {
        zeroize(&mut self.m);
    }
}

/// Running GHASH value with a partial-block buffer.
#[derive(Clone)]
pub(crate) struct GHash {
    y: u128,
    buffer: [u8; 16],
    buf_len: usize,
}

impl GHash {
    pub(crate) const fn new() -> Self {
        Self {
            y: 0,
            buffer: [0; 16],
            buf_len: 0,
        }
    }

    fn process_block(&mut self, key: &GHashKey, block: &[u8; 16]) {
        self.y = key.mul(self.y ^ u128::from_be_bytes(*block));
    }

    /// Absorb data
    pub(crate) fn update(&mut self, key: &GHashKey, data: &[u8]) {
        let mut data = data;

        if self.buf_len > 0 {
            let n = core::cmp::min(16 - self.buf_len, data.len());
            self.buffer[self.buf_len..self.buf_len + n].copy_from_slice(&data[..n]);
            self.buf_len += n;
            data = &data[n..];
            if self.buf_len < 16 {
                return;
            }
            let block = self.buffer;
            self.process_block(key, &block);
            self.buf_len = 0;
        }

        let mut blocks = data.chunks_exact(16);
        for block in &mut blocks {
            let mut b = [0u8; 16];
            b.copy_from_slice(block);
            self.process_block(key, &b);
        }

        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buf_len = rest.len();
    }

    /// Zero-pad and absorb any partial block
    pub(crate) fn pad(&mut self, key: &GHashKey) {
        if self.buf_len > 0 {
            self.buffer[self.buf_len..].fill(0);
            let block = self.buffer;
            self.process_block(key, &block);
            self.buf_len = 0;
        }
    }

    /// Absorb the closing length block (lengths in bytes, encoded in bits)
    pub(crate) fn finish(&mut self, key: &GHashKey, len_a: u64, len_c: u64) -> [u8; 16] {
        self.pad(key);
        let mut block = [0u8; 16];
        block[..8].copy_from_slice(&len_a.wrapping_mul(8).to_be_bytes());
        block[8..].copy_from_slice(&len_c.wrapping_mul(8).to_be_bytes());
        self.process_block(key, &block);
        self.y.to_be_bytes()
    }

    pub(crate) fn reset(&mut self) {
        self.y = 0;
        zeroize(&mut self.buffer);
        self.buf_len = 0;
    }
}

impl Drop for GHash {
    fn drop(&mut self) {
        self.reset();
    }
}

/// Pre-counter block `J0` for an IV of any non-zero length
pub(crate) fn pre_counter_block(key: &GHashKey, iv: &[u8]) -> [u8; 16] {
    if iv.len() == 12 {
        let mut j0 = [0u8; 16];
        j0[..12].copy_from_slice(iv);
        j0[15] = 1;
        j0
    } else {
        // GHASH(IV || 0^s || 0^64 || [len(IV)]_64)
        let mut g = GHash::new();
        g.update(key, iv);
        g.finish(key, 0, iv.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::hex;

    /// Bit-serial reference multiplication
    fn mul_reference(x: u128, h: u128) -> u128 {
        let mut z = 0u128;
        let mut v = h;
        for i in (0..128).rev() {
            if (x >> i) & 1 != 0 {
                z ^= v;
            }
            v = mul_x(v);
        }
        z
    }

    #[test]
    fn test_table_matches_reference() {
        let h: [u8; 16] = hex("66e94bd4ef8a2c3b884cfa59ca342b2e").try_into().unwrap();
        let key = GHashKey::new(&h);
        let hv = u128::from_be_bytes(h);
        let mut x = 0x0388_DACE_60B6_A392_F328_C2B9_71B2_FE78u128;
        for _ in 0..32 {
            assert_eq!(key.mul(x), mul_reference(x, hv));
            x = x.rotate_left(13) ^ 0x9E37_79B9;
        }
    }

    #[test]
    fn test_ghash_gcm_case_2() {
        // H = AES_0(0^128), C = 0388dace60b6a392f328c2b971b2fe78
        let h: [u8; 16] = hex("66e94bd4ef8a2c3b884cfa59ca342b2e").try_into().unwrap();
        let key = GHashKey::new(&h);
        let mut g = GHash::new();
        g.update(&key, &hex("0388dace60b6a392f328c2b971b2fe78"));
        let s = g.finish(&key, 0, 16);
        assert_eq!(s.to_vec(), hex("f38cbb1ad69223dcc3457ae5b6b0f885"));
    }

    #[test]
    fn test_unaligned_updates() {
        let key = GHashKey::new(&[0x5Au8; 16]);
        let data: Vec<u8> = (0..45u8).collect();
        let mut a = GHash::new();
        a.update(&key, &data);
        let mut b = GHash::new();
        for chunk in data.chunks(7) {
            b.update(&key, chunk);
        }
        assert_eq!(a.finish(&key, 3, 45), b.finish(&key, 3, 45));
    }
}
