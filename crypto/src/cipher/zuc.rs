//! ZUC-128 stream cipher (GB/T 33133).
//!
//! 128-bit key and IV. A 16-stage LFSR over GF(2^31 - 1) feeds a bit
//! reorganization layer and a non-linear function `F` with two 32-bit
//! memory cells. The keystream is a sequence of 32-bit words, applied to
//! data in big-endian byte order.

use super::{CipherKind, KeySizes, StreamAlgo, StreamCipher, StreamContext};
use crate::error::{CryptoError, CryptoResult};
use crate::util::zeroize;

/// ZUC key size
pub const ZUC_KEY_SIZE: usize = 16;

/// ZUC IV size
pub const ZUC_IV_SIZE: usize = 16;

/// 2^31 - 1
const P: u32 = 0x7FFF_FFFF;

/// Key loading constants
const D: [u32; 16] = [
    0x44D7, 0x26BC, 0x626B, 0x135E, 0x5789, 0x35E2, 0x7135, 0x09AF,
    0x4D78, 0x2F13, 0x6BC4, 0x1AF1, 0x5E26, 0x3C4D, 0x789A, 0x47AC,
];

/// Common interface for ZUC-128
pub static ZUC_STREAM_ALGO: StreamAlgo = StreamAlgo {
    name: "ZUC-128",
    context_size: core::mem::size_of::<Zuc>(),
    kind: CipherKind::Stream,
    key_sizes: KeySizes::Fixed(&[ZUC_KEY_SIZE]),
    iv_sizes: KeySizes::Fixed(&[ZUC_IV_SIZE]),
    init: init_context,
};

fn init_context(key: &[u8], iv: &[u8]) -> CryptoResult<StreamContext> {
    Ok(StreamContext::Zuc(Zuc::new(key, iv)?))
}

#[inline(always)]
fn l1(x: u32) -> u32 {
    x ^ x.rotate_left(2) ^ x.rotate_left(10) ^ x.rotate_left(18) ^ x.rotate_left(24)
}

#[inline(always)]
fn l2(x: u32) -> u32 {
    x ^ x.rotate_left(8) ^ x.rotate_left(14) ^ x.rotate_left(22) ^ x.rotate_left(30)
}

#[inline(always)]
fn sbox(x: u32) -> u32 {
    let b = x.to_be_bytes();
    u32::from_be_bytes([
        S0[b[0] as usize],
        S1[b[1] as usize],
        S0[b[2] as usize],
        S1[b[3] as usize],
    ])
}

// ============================================================================
// ZUC Context
// ============================================================================

/// ZUC-128 keystream state.
pub struct Zuc {
    /// LFSR stages, 31 bits each
    s: [u32; 16],
    r1: u32,
    r2: u32,
    /// Current keystream word, big-endian
    word: [u8; 4],
    /// Next unused byte of `word`
    pos: usize,
}

impl Zuc {
    /// Load a 16-byte key and 16-byte IV and run the initialization rounds
    pub fn new(key: &[u8], iv: &[u8]) -> CryptoResult<Self> {
        if key.len() != ZUC_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength);
        }
        if iv.len() != ZUC_IV_SIZE {
            return Err(CryptoError::InvalidParameter);
        }

        let mut ctx = Self {
            s: [0; 16],
            r1: 0,
            r2: 0,
            word: [0; 4],
            pos: 4,
        };
        for (i, s) in ctx.s.iter_mut().enumerate() {
            *s = (u32::from(key[i]) << 23) | (D[i] << 8) | u32::from(iv[i]);
        }

        for _ in 0..32 {
            let x = ctx.bit_reconstruction();
            let w = ctx.f(&x);
            ctx.lfsr(w >> 1);
        }

        // First working-mode step discards the output of F
        let x = ctx.bit_reconstruction();
        ctx.f(&x);
        ctx.lfsr(0);

        Ok(ctx)
    }

    fn bit_reconstruction(&self) -> [u32; 4] {
        let s = &self.s;
        [
            ((s[15] & 0x7FFF_8000) << 1) | (s[14] & 0xFFFF),
            ((s[11] & 0xFFFF) << 16) | (s[9] >> 15),
            ((s[7] & 0xFFFF) << 16) | (s[5] >> 15),
            ((s[2] & 0xFFFF) << 16) | (s[0] >> 15),
        ]
    }

    fn f(&mut self, x: &[u32; 4]) -> u32 {
        let w = (x[0] ^ self.r1).wrapping_add(self.r2);
        let w1 = self.r1.wrapping_add(x[1]);
        let w2 = self.r2 ^ x[2];
        self.r1 = sbox(l1((w1 << 16) | (w2 >> 16)));
        self.r2 = sbox(l2((w2 << 16) | (w1 >> 16)));
        w
    }

    /// Clock the LFSR, adding `u` in initialization mode (0 in working mode)
    fn lfsr(&mut self, u: u32) {
        let s = &self.s;
        let mut sum = u64::from(u)
            + u64::from(s[0])
            + (u64::from(s[0]) << 8)
            + (u64::from(s[4]) << 20)
            + (u64::from(s[10]) << 21)
            + (u64::from(s[13]) << 17)
            + (u64::from(s[15]) << 15);

        // 2^31 = 1 mod P
        sum = (sum >> 31) + (sum & u64::from(P));
        sum = (sum >> 31) + (sum & u64::from(P));
        let mut v = sum as u32;
        if v == 0 {
            v = P;
        }

        self.s.copy_within(1.., 0);
        self.s[15] = v;
    }

    /// Next 32-bit keystream word
    pub fn generate_word(&mut self) -> u32 {
        let x = self.bit_reconstruction();
        let z = self.f(&x) ^ x[3];
        self.lfsr(0);
        z
    }

    /// Fill `out` with keystream words
    pub fn generate_keystream(&mut self, out: &mut [u32]) {
        for w in out.iter_mut() {
            *w = self.generate_word();
        }
    }
}

impl StreamCipher for Zuc {
    fn apply_in_place(&mut self, data: &mut [u8]) {
        for b in data.iter_mut() {
            if self.pos == 4 {
                self.word = self.generate_word().to_be_bytes();
                self.pos = 0;
            }
            *b ^= self.word[self.pos];
            self.pos += 1;
        }
    }
}

impl Drop for Zuc {
    fn drop(&mut self) {
        zeroize(&mut self.s);
        zeroize(&mut self.word);
        self.r1 = 0;
        self.r2 = 0;
    }
}

impl core::fmt::Debug for Zuc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Zuc { .. }")
    }
}


// ============================================================================
// S-boxes
// ============================================================================

#[rustfmt::skip]
const S0: [u8; 256] = [
    0x3e, 0x72, 0x5b, 0x47, 0xca, 0xe0, 0x00, 0x33, 0x04, 0xd1, 0x54, 0x98, 0x09, 0xb9, 0x6d, 0xcb,
    0x7b, 0x1b, 0xf9, 0x32, 0xaf, 0x9d, 0x6a, 0xa5, 0xb8, 0x2d, 0xfc, 0x1d, 0x08, 0x53, 0x03, 0x90,
    0x4d, 0x4e, 0x84, 0x99, 0xe4, 0xce, 0xd9, 0x91, 0xdd, 0xb6, 0x85, 0x48, 0x8b, 0x29, 0x6e, 0xac,
    0xcd, 0xc1, 0xf8, 0x1e, 0x73, 0x43, 0x69, 0xc6, 0xb5, 0xbd, 0xfd, 0x39, 0x63, 0x20, 0xd4, 0x38,
    0x76, 0x7d, 0xb2, 0xa7, 0xcf, 0xed, 0x57, 0xc5, 0xf3, 0x2c, 0xbb, 0x14, 0x21, 0x06, 0x55, 0x9b,
    0xe3, 0xef, 0x5e, 0x31, 0x4f, 0x7f, 0x5a, 0xa4, 0x0d, 0x82, 0x51, 0x49, 0x5f, 0xba, 0x58, 0x1c,
    0x4a, 0x16, 0xd5, 0x17, 0xa8, 0x92, 0x24, 0x1f, 0x8c, 0xff, 0xd8, 0xae, 0x2e, 0x01, 0xd3, 0xad,
    0x3b, 0x4b, 0xda, 0x46, 0xeb, 0xc9, 0xde, 0x9a, 0x8f, 0x87, 0xd7, 0x3a, 0x80, 0x6f, 0x2f, 0xc8,
    0xb1, 0xb4, 0x37, 0xf7, 0x0a, 0x22, 0x13, 0x28, 0x7c, 0xcc, 0x3c, 0x89, 0xc7, 0xc3, 0x96, 0x56,
    0x07, 0xbf, 0x7e, 0xf0, 0x0b, 0x2b, 0x97, 0x52, 0x35, 0x41, 0x79, 0x61, 0xa6, 0x4c, 0x10, 0xfe,
    0xbc, 0x26, 0x95, 0x88, 0x8a, 0xb0, 0xa3, 0xfb, 0xc0, 0x18, 0x94, 0xf2, 0xe1, 0xe5, 0xe9, 0x5d,
    0xd0, 0xdc, 0x11, 0x66, 0x64, 0x5c, 0xec, 0x59, 0x42, 0x75, 0x12, 0xf5, 0x74, 0x9c, 0xaa, 0x23,
    0x0e, 0x86, 0xab, 0xbe, 0x2a, 0x02, 0xe7, 0x67, 0xe6, 0x44, 0xa2, 0x6c, 0xc2, 0x93, 0x9f, 0xf1,
    0xf6, 0xfa, 0x36, 0xd2, 0x50, 0x68, 0x9e, 0x62, 0x71, 0x15, 0x3d, 0xd6, 0x40, 0xc4, 0xe2, 0x0f,
    0x8e, 0x83, 0x77, 0x6b, 0x25, 0x05, 0x3f, 0x0c, 0x30, 0xea, 0x70, 0xb7, 0xa1, 0xe8, 0xa9, 0x65,
    0x8d, 0x27, 0x1a, 0xdb, 0x81, 0xb3, 0xa0, 0xf4, 0x45, 0x7a, 0x19, 0xdf, 0xee, 0x78, 0x34, 0x60,
];

#[rustfmt::skip]
const S1: [u8; 256] = [
    0x55, 0xc2, 0x63, 0x71, 0x3b, 0xc8, 0x47, 0x86, 0x9f, 0x3c, 0xda, 0x5b, 0x29, 0xaa, 0xfd, 0x77,
    0x8c, 0xc5, 0x94, 0x0c, 0xa6, 0x1a, 0x13, 0x00, 0xe3, 0xa8, 0x16, 0x72, 0x40, 0xf9, 0xf8, 0x42,
    0x44, 0x26, 0x68, 0x96, 0x81, 0xd9, 0x45, 0x3e, 0x10, 0x76, 0xc6, 0xa7, 0x8b, 0x39, 0x43, 0xe1,
    0x3a, 0xb5, 0x56, 0x2a, 0xc0, 0x6d, 0xb3, 0x05, 0x22, 0x66, 0xbf, 0xdc, 0x0b, 0xfa, 0x62, 0x48,
    0xdd, 0x20, 0x11, 0x06, 0x36, 0xc9, 0xc1, 0xcf, 0xf6, 0x27, 0x52, 0xbb, 0x69, 0xf5, 0xd4, 0x87,
    0x7f, 0x84, 0x4c, 0xd2, 0x9c, 0x57, 0xa4, 0xbc, 0x4f, 0x9a, 0xdf, 0xfe, 0xd6, 0x8d, 0x7a, 0xeb,
    0x2b, 0x53, 0xd8, 0x5c, 0xa1, 0x14, 0x17, 0xfb, 0x23, 0xd5, 0x7d, 0x30, 0x67, 0x73, 0x08, 0x09,
    0xee, 0xb7, 0x70, 0x3f, 0x61, 0xb2, 0x19, 0x8e, 0x4e, 0xe5, 0x4b, 0x93, 0x8f, 0x5d, 0xdb, 0xa9,
    0xad, 0xf1, 0xae, 0x2e, 0xcb, 0x0d, 0xfc, 0xf4, 0x2d, 0x46, 0x6e, 0x1d, 0x97, 0xe8, 0xd1, 0xe9,
    0x4d, 0x37, 0xa5, 0x75, 0x5e, 0x83, 0x9e, 0xab, 0x82, 0x9d, 0xb9, 0x1c, 0xe0, 0xcd, 0x49, 0x89,
    0x01, 0xb6, 0xbd, 0x58, 0x24, 0xa2, 0x5f, 0x38, 0x78, 0x99, 0x15, 0x90, 0x50, 0xb8, 0x95, 0xe4,
    0xd0, 0x91, 0xc7, 0xce, 0xed, 0x0f, 0xb4, 0x6f, 0xa0, 0xcc, 0xf0, 0x02, 0x4a, 0x79, 0xc3, 0xde,
    0xa3, 0xef, 0xea, 0x51, 0xe6, 0x6b, 0x18, 0xec, 0x1b, 0x2c, 0x80, 0xf7, 0x74, 0xe7, 0xff, 0x21,
    0x5a, 0x6a, 0x54, 0x1e, 0x41, 0x31, 0x92, 0x35, 0xc4, 0x33, 0x07, 0x0a, 0xba, 0x7e, 0x0e, 0x34,
    0x88, 0xb1, 0x98, 0x7c, 0xf3, 0x3d, 0x60, 0x6c, 0x7b, 0xca, 0xd3, 0x1f, 0x32, 0x65, 0x04, 0x28,
    0x64, 0xbe, 0x85, 0x9b, 0x2f, 0x59, 0x8a, 0xd7, 0xb0, 0x25, 0xac, 0xaf, 0x12, 0x03, 0xe2, 0xf2,
];
