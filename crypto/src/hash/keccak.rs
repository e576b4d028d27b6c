//! Keccak-f[1600] sponge (FIPS 202) with the cSHAKE framing of
//! NIST SP 800-185.
//!
//! Only the pieces KMAC needs are exposed: absorb, zero-fill to a block
//! boundary, pad with a domain byte and squeeze an arbitrary amount.

use crate::util::zeroize;

/// Number of 64-bit lanes in the state
const LANES: usize = 25;

/// Rate of cSHAKE128 in bytes
pub(crate) const CSHAKE128_RATE: usize = 168;

/// Rate of cSHAKE256 in bytes
pub(crate) const CSHAKE256_RATE: usize = 136;

/// Domain byte for SHAKE (`1111` then the first pad bit)
#[cfg(test)]
const SHAKE_DOMAIN: u8 = 0x1F;

/// Domain byte for cSHAKE with a non-empty name or customization (`00`)
const CSHAKE_DOMAIN: u8 = 0x04;

#[rustfmt::skip]
const RC: [u64; 24] = [
    0x0000_0000_0000_0001, 0x0000_0000_0000_8082, 0x8000_0000_0000_808A, 0x8000_0000_8000_8000,
    0x0000_0000_0000_808B, 0x0000_0000_8000_0001, 0x8000_0000_8000_8081, 0x8000_0000_0000_8009,
    0x0000_0000_0000_008A, 0x0000_0000_0000_0088, 0x0000_0000_8000_8009, 0x0000_0000_8000_000A,
    0x0000_0000_8000_808B, 0x8000_0000_0000_008B, 0x8000_0000_0000_8089, 0x8000_0000_0000_8003,
    0x8000_0000_0000_8002, 0x8000_0000_0000_0080, 0x0000_0000_0000_800A, 0x8000_0000_8000_000A,
    0x8000_0000_8000_8081, 0x8000_0000_0000_8080, 0x0000_0000_8000_0001, 0x8000_0000_8000_8008,
];

/// Rotation offsets along the rho-pi walk
const RHO: [u32; 24] = [
    1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 2, 14, 27, 41, 56, 8, 25, 43, 62, 18, 39, 61, 20, 44,
];

/// Lane visited at each step of the rho-pi walk, starting from lane 1
const PI: [usize; 24] = [
    10, 7, 11, 17, 18, 3, 5, 16, 8, 21, 24, 4, 15, 23, 19, 13, 12, 2, 20, 14, 22, 9, 6, 1,
];

/// Keccak-f[1600], lane `(x, y)` at index `x + 5y`
fn keccak_f1600(a: &mut [u64; LANES]) {
    for &rc in RC.iter() {
        // Theta
        let mut c = [0u64; 5];
        for (x, col) in c.iter_mut().enumerate() {
            *col = a[x] ^ a[x + 5] ^ a[x + 10] ^ a[x + 15] ^ a[x + 20];
        }
        for x in 0..5 {
            let d = c[(x + 4) % 5] ^ c[(x + 1) % 5].rotate_left(1);
            for y in 0..5 {
                a[5 * y + x] ^= d;
            }
        }

        // Rho and pi
        let mut last = a[1];
        for (&j, &r) in PI.iter().zip(RHO.iter()) {
            let next = a[j];
            a[j] = last.rotate_left(r);
            last = next;
        }

        // Chi
        for y in 0..5 {
            let mut row = [0u64; 5];
            row.copy_from_slice(&a[5 * y..5 * y + 5]);
            for x in 0..5 {
                a[5 * y + x] = row[x] ^ (!row[(x + 1) % 5] & row[(x + 2) % 5]);
            }
        }

        // Iota
        a[0] ^= rc;
    }
}

/// `left_encode(x)`: byte count first, then `x` big-endian without
/// leading zeroes. Returns the buffer and the used length.
pub(crate) fn left_encode(x: u64) -> ([u8; 9], usize) {
    let n = encoded_len(x);
    let mut buf = [0u8; 9];
    buf[0] = n as u8;
    buf[1..=n].copy_from_slice(&x.to_be_bytes()[8 - n..]);
    (buf, n + 1)
}

/// `right_encode(x)`: `x` big-endian without leading zeroes, then the
/// byte count.
pub(crate) fn right_encode(x: u64) -> ([u8; 9], usize) {
    let n = encoded_len(x);
    let mut buf = [0u8; 9];
    buf[..n].copy_from_slice(&x.to_be_bytes()[8 - n..]);
    buf[n] = n as u8;
    (buf, n + 1)
}

/// Bytes needed for `x`, at least one
fn encoded_len(x: u64) -> usize {
    let bits = 64 - x.leading_zeros() as usize;
    bits.div_ceil(8).max(1)
}

// ============================================================================
// Sponge
// ============================================================================

/// Keccak sponge state plus the byte position inside the current block.
#[derive(Clone)]
pub(crate) struct Keccak {
    a: [u64; LANES],
    rate: usize,
    pos: usize,
}

impl Keccak {
    /// Empty sponge with `rate` bytes per block
    pub(crate) const fn new(rate: usize) -> Self {
        Self {
            a: [0; LANES],
            rate,
            pos: 0,
        }
    }

    /// cSHAKE sponge after absorbing `bytepad(encode_string(N) || encode_string(S), rate)`
    pub(crate) fn cshake(rate: usize, name: &[u8], custom: &[u8]) -> Self {
        let mut k = Self::new(rate);
        k.absorb_bytepad(&[name, custom]);
        k
    }

    /// Absorb `bytepad(encode_string(s_1) || ... , rate)`
    pub(crate) fn absorb_bytepad(&mut self, strings: &[&[u8]]) {
        let (w, len) = left_encode(self.rate as u64);
        self.absorb(&w[..len]);
        for s in strings {
            self.absorb_encoded_string(s);
        }
        self.fill_block();
    }

    /// `encode_string(s) = left_encode(8 * len(s)) || s`
    fn absorb_encoded_string(&mut self, s: &[u8]) {
        let (prefix, len) = left_encode((s.len() as u64).wrapping_mul(8));
        self.absorb(&prefix[..len]);
        self.absorb(s);
    }

    #[inline]
    fn xor_byte(&mut self, pos: usize, b: u8) {
        self.a[pos / 8] ^= u64::from(b) << (8 * (pos % 8));
    }

    /// Absorb message bytes
    pub(crate) fn absorb(&mut self, data: &[u8]) {
        let mut data = data;

        // Whole blocks straight into the lanes
        if self.pos == 0 {
            while data.len() >= self.rate {
                let (block, rest) = data.split_at(self.rate);
                for (lane, chunk) in self.a.iter_mut().zip(block.chunks_exact(8)) {
                    let mut word = [0u8; 8];
                    word.copy_from_slice(chunk);
                    *lane ^= u64::from_le_bytes(word);
                }
                keccak_f1600(&mut self.a);
                data = rest;
            }
        }

        for &b in data {
            self.xor_byte(self.pos, b);
            self.pos += 1;
            if self.pos == self.rate {
                keccak_f1600(&mut self.a);
                self.pos = 0;
            }
        }
    }

    /// Zero-pad up to the next block boundary
    pub(crate) fn fill_block(&mut self) {
        if self.pos != 0 {
            keccak_f1600(&mut self.a);
            self.pos = 0;
        }
    }

    /// Apply `pad10*1` after the domain bits and switch to squeezing
    fn pad(&mut self, domain: u8) {
        self.xor_byte(self.pos, domain);
        self.xor_byte(self.rate - 1, 0x80);
        keccak_f1600(&mut self.a);
        self.pos = 0;
    }

    /// Read output bytes; may be called repeatedly after padding
    fn squeeze(&mut self, out: &mut [u8]) {
        for b in out.iter_mut() {
            if self.pos == self.rate {
                keccak_f1600(&mut self.a);
                self.pos = 0;
            }
            *b = (self.a[self.pos / 8] >> (8 * (self.pos % 8))) as u8;
            self.pos += 1;
        }
    }

    /// Pad with the cSHAKE domain and fill `out`
    pub(crate) fn finish_cshake(&mut self, out: &mut [u8]) {
        self.pad(CSHAKE_DOMAIN);
        self.squeeze(out);
    }

    /// Clear the state
    pub(crate) fn wipe(&mut self) {
        zeroize(&mut self.a);
        self.pos = 0;
    }
}

impl Drop for Keccak {
    fn drop(&mut self) {
        self.wipe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::hex;

    fn shake(rate: usize, msg: &[u8], out_len: usize) -> Vec<u8> {
        let mut k = Keccak::new(rate);
        k.absorb(msg);
        k.pad(SHAKE_DOMAIN);
        let mut out = vec![0u8; out_len];
        k.squeeze(&mut out);
        out
    }

    #[test]
    fn test_shake_vectors() {
        assert_eq!(
            shake(CSHAKE128_RATE, b"", 32),
            hex("7f9c2ba4e88f827d616045507605853ed73b8093f6efbc88eb1a6eacfa66ef26")
        );
        assert_eq!(
            shake(CSHAKE256_RATE, b"abc", 32),
            hex("483366601360a8771c6863080cc4114d8db44530f8f1e1ee4f94ea37e78b5739")
        );
    }

    #[test]
    fn test_block_and_byte_paths_agree() {
        let msg: Vec<u8> = (0..500u32).map(|i| i as u8).collect();
        let whole = shake(CSHAKE128_RATE, &msg, 400);

        let mut k = Keccak::new(CSHAKE128_RATE);
        for chunk in msg.chunks(13) {
            k.absorb(chunk);
        }
        k.pad(SHAKE_DOMAIN);
        let mut split = vec![0u8; 400];
        let (a, b) = split.split_at_mut(100);
        k.squeeze(a);
        k.squeeze(b);
        assert_eq!(whole, split);
    }

    #[test]
    fn test_integer_encodings() {
        let (buf, len) = left_encode(0);
        assert_eq!(&buf[..len], &[0x01, 0x00]);
        let (buf, len) = left_encode(168);
        assert_eq!(&buf[..len], &[0x01, 0xA8]);
        let (buf, len) = right_encode(256);
        assert_eq!(&buf[..len], &[0x01, 0x00, 0x02]);
        let (buf, len) = right_encode(u64::MAX);
        assert_eq!(len, 9);
        assert_eq!(buf[8], 8);
    }
}
