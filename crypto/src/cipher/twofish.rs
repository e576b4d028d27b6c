//! Twofish block cipher.
//!
//! 128-bit block, 16 rounds, 128/192/256-bit keys. The key-dependent
//! S-boxes are folded together with the MDS matrix into four 256-entry
//! tables at key setup.

use super::{CipherAlgo, CipherContext, CipherFlags, CipherKind, KeySizes};
use crate::error::{CryptoError, CryptoResult};
use crate::util::{load32_le, store32_le, zeroize};

/// Twofish block size
pub const TWOFISH_BLOCK_SIZE: usize = 16;

/// Common interface for Twofish
pub static TWOFISH_CIPHER_ALGO: CipherAlgo = CipherAlgo {
    name: "Twofish",
    oid: &[],
    context_size: core::mem::size_of::<Twofish>(),
    kind: CipherKind::Block,
    block_size: TWOFISH_BLOCK_SIZE,
    key_sizes: KeySizes::Fixed(&[16, 24, 32]),
    flags: CipherFlags::WIDE_BLOCK,
    init: init_context,
};

fn init_context(key: &[u8]) -> CryptoResult<CipherContext> {
    Ok(CipherContext::Twofish(Twofish::new(key)?))
}

// ============================================================================
// Fixed permutations
// ============================================================================

/// x^8 + x^6 + x^5 + x^3 + 1
const MDS_POLY: u8 = 0x69;
/// x^8 + x^6 + x^3 + x^2 + 1
const RS_POLY: u8 = 0x4D;

/// Which of q0/q1 is applied at each stage of `h`, per byte lane
const QORD: [[usize; 5]; 4] = [
    [1, 1, 0, 0, 1],
    [0, 1, 1, 0, 0],
    [0, 0, 0, 1, 1],
    [1, 0, 1, 1, 0],
];

#[rustfmt::skip]
const QBOX: [[[u8; 16]; 4]; 2] = [
    [
        [0x8, 0x1, 0x7, 0xD, 0x6, 0xF, 0x3, 0x2, 0x0, 0xB, 0x5, 0x9, 0xE, 0xC, 0xA, 0x4],
        [0xE, 0xC, 0xB, 0x8, 0x1, 0x2, 0x3, 0x5, 0xF, 0x4, 0xA, 0x6, 0x7, 0x0, 0x9, 0xD],
        [0xB, 0xA, 0x5, 0xE, 0x6, 0xD, 0x9, 0x0, 0xC, 0x8, 0xF, 0x3, 0x2, 0x4, 0x7, 0x1],
        [0xD, 0x7, 0xF, 0x4, 0x1, 0x2, 0x6, 0xE, 0x9, 0xB, 0x3, 0x0, 0x8, 0x5, 0xC, 0xA],
    ],
    [
        [0x2, 0x8, 0xB, 0xD, 0xF, 0x7, 0x6, 0xE, 0x3, 0x1, 0x9, 0x4, 0x0, 0xA, 0xC, 0x5],
        [0x1, 0xE, 0x2, 0xB, 0x4, 0xC, 0x3, 0x7, 0x6, 0xD, 0xA, 0x5, 0xF, 0x9, 0x0, 0x8],
        [0x4, 0xC, 0x7, 0x5, 0x1, 0x6, 0x9, 0xA, 0x0, 0xE, 0xD, 0x8, 0x2, 0xB, 0x3, 0xF],
        [0xB, 0x9, 0x5, 0x1, 0xC, 0x3, 0xD, 0xE, 0x6, 0x4, 0x7, 0xF, 0x2, 0x0, 0x8, 0xA],
    ],
];

/// Reed-Solomon matrix deriving the S-box key words
const RS: [[u8; 8]; 4] = [
    [0x01, 0xA4, 0x55, 0x87, 0x5A, 0x58, 0xDB, 0x9E],
    [0xA4, 0x56, 0x82, 0xF3, 0x1E, 0xC6, 0x68, 0xE5],
    [0x02, 0xA1, 0xFC, 0xC1, 0x47, 0xAE, 0x3D, 0x19],
    [0xA4, 0x55, 0x87, 0x5A, 0x58, 0xDB, 0x9E, 0x03],
];

/// q0 and q1, expanded from their nibble boxes
const Q: [[u8; 256]; 2] = q_tables();

const fn ror4(x: u8) -> u8 {
    ((x >> 1) | (x << 3)) & 0x0F
}

const fn q_perm(t: &[[u8; 16]; 4], x: u8) -> u8 {
    let (a0, b0) = (x >> 4, x & 0x0F);
    let a1 = a0 ^ b0;
    let b1 = a0 ^ ror4(b0) ^ ((a0 << 3) & 0x0F);
    let (a2, b2) = (t[0][a1 as usize], t[1][b1 as usize]);
    let a3 = a2 ^ b2;
    let b3 = a2 ^ ror4(b2) ^ ((a2 << 3) & 0x0F);
    let (a4, b4) = (t[2][a3 as usize], t[3][b3 as usize]);
    (b4 << 4) | a4
}

const fn q_tables() -> [[u8; 256]; 2] {
    let mut q = [[0u8; 256]; 2];
    let mut i = 0;
    while i < 2 {
        let mut x = 0;
        while x < 256 {
            q[i][x] = q_perm(&QBOX[i], x as u8);
            x += 1;
        }
        i += 1;
    }
    q
}

fn gf_mul(mut a: u8, mut b: u8, poly: u8) -> u8 {
    let mut r = 0u8;
    while a != 0 {
        if a & 1 != 0 {
            r ^= b;
        }
        a >>= 1;
        b = if b & 0x80 != 0 { (b << 1) ^ poly } else { b << 1 };
    }
    r
}

/// Column `c` of the MDS matrix multiplied by `x`
fn mds_column(x: u8, c: usize) -> u32 {
    let x5b = gf_mul(x, 0x5B, MDS_POLY);
    let xef = gf_mul(x, 0xEF, MDS_POLY);
    let col = match c {
        0 => [x, x5b, xef, xef],
        1 => [xef, xef, x5b, x],
        2 => [x5b, xef, x, xef],
        _ => [x5b, x, xef, x5b],
    };
    u32::from_le_bytes(col)
}

/// Chain of q permutations and key-byte XORs for byte lane `y` of `h`
fn h_byte(x: u8, y: usize, l: &[[u8; 4]]) -> u8 {
    let start = 4 - l.len();
    let mut g = Q[QORD[y][start]][x as usize];
    for (z, word) in (start + 1..5).zip(l) {
        g = Q[QORD[y][z]][(g ^ word[y]) as usize];
    }
    g
}

fn h(x: u32, l: &[[u8; 4]]) -> u32 {
    x.to_le_bytes()
        .iter()
        .enumerate()
        .fold(0, |acc, (y, &b)| acc ^ mds_column(h_byte(b, y, l), y))
}

// ============================================================================
// Twofish Context
// ============================================================================

/// Twofish expanded-key context.
pub struct Twofish {
    /// Whitening and round subkeys
    k: [u32; 40],
    /// Key-dependent S-boxes combined with the MDS matrix
    s: [[u32; 256]; 4],
}

impl Twofish {
    /// Expand a 16, 24 or 32-byte key
    pub fn new(key: &[u8]) -> CryptoResult<Self> {
        if !matches!(key.len(), 16 | 24 | 32) {
            return Err(CryptoError::InvalidKeyLength);
        }
        let n = key.len() / 8;

        // Even/odd key words, most significant pair first
        let mut me = [[0u8; 4]; 4];
        let mut mo = [[0u8; 4]; 4];
        // S-box key words, in key order
        let mut sk = [[0u8; 4]; 4];
        for i in 0..n {
            let m = &key[8 * i..8 * i + 8];
            me[n - 1 - i].copy_from_slice(&m[..4]);
            mo[n - 1 - i].copy_from_slice(&m[4..]);
            for (r, rs) in RS.iter().enumerate() {
                sk[i][r] = m
                    .iter()
                    .zip(rs)
                    .fold(0, |acc, (&a, &b)| acc ^ gf_mul(a, b, RS_POLY));
            }
        }

        let mut ctx = Self {
            k: [0; 40],
            s: [[0; 256]; 4],
        };

        for i in 0..20u32 {
            let a = h(0x0101_0101u32.wrapping_mul(2 * i), &me[..n]);
            let b = h(0x0101_0101u32.wrapping_mul(2 * i + 1), &mo[..n]).rotate_left(8);
            ctx.k[2 * i as usize] = a.wrapping_add(b);
            ctx.k[2 * i as usize + 1] = a.wrapping_add(b.wrapping_mul(2)).rotate_left(9);
        }

        for (y, table) in ctx.s.iter_mut().enumerate() {
            for (x, entry) in table.iter_mut().enumerate() {
                *entry = mds_column(h_byte(x as u8, y, &sk[..n]), y);
            }
        }

        for w in me.iter_mut().chain(mo.iter_mut()).chain(sk.iter_mut()) {
            zeroize(w);
        }
        Ok(ctx)
    }

    #[inline]
    fn g(&self, x: u32) -> u32 {
        let b = x.to_le_bytes();
        self.s[0][b[0] as usize]
            ^ self.s[1][b[1] as usize]
            ^ self.s[2][b[2] as usize]
            ^ self.s[3][b[3] as usize]
    }

    /// Encrypt a single block
    pub fn encrypt(&self, input: &[u8; 16], output: &mut [u8; 16]) {
        let mut p = [0u32; 4];
        for (i, w) in p.iter_mut().enumerate() {
            *w = load32_le(&input[4 * i..]) ^ self.k[i];
        }

        for r in 0..8 {
            let k = 4 * r + 8;
            let t1 = self.g(p[1].rotate_left(8));
            let t0 = self.g(p[0]).wrapping_add(t1);
            p[2] = (p[2] ^ t0.wrapping_add(self.k[k])).rotate_right(1);
            p[3] = p[3].rotate_left(1) ^ t0.wrapping_add(t1).wrapping_add(self.k[k + 1]);

            let t1 = self.g(p[3].rotate_left(8));
            let t0 = self.g(p[2]).wrapping_add(t1);
            p[0] = (p[0] ^ t0.wrapping_add(self.k[k + 2])).rotate_right(1);
            p[1] = p[1].rotate_left(1) ^ t0.wrapping_add(t1).wrapping_add(self.k[k + 3]);
        }

        store32_le(p[2] ^ self.k[4], &mut output[0..]);
        store32_le(p[3] ^ self.k[5], &mut output[4..]);
        store32_le(p[0] ^ self.k[6], &mut output[8..]);
        store32_le(p[1] ^ self.k[7], &mut output[12..]);
    }

    /// Decrypt a single block
    pub fn decrypt(&self, input: &[u8; 16], output: &mut [u8; 16]) {
        let mut c = [
            load32_le(&input[8..]) ^ self.k[6],
            load32_le(&input[12..]) ^ self.k[7],
            load32_le(&input[0..]) ^ self.k[4],
            load32_le(&input[4..]) ^ self.k[5],
        ];

        for r in (0..8).rev() {
            let k = 4 * r + 8;
            let t1 = self.g(c[3].rotate_left(8));
            let t0 = self.g(c[2]).wrapping_add(t1);
            c[0] = c[0].rotate_left(1) ^ t0.wrapping_add(self.k[k + 2]);
            c[1] = (c[1] ^ t0.wrapping_add(t1).wrapping_add(self.k[k + 3])).rotate_right(1);

            let t1 = self.g(c[1].rotate_left(8));
            let t0 = self.g(c[0]).wrapping_add(t1);
            c[2] = c[2].rotate_left(1) ^ t0.wrapping_add(self.k[k]);
            c[3] = (c[3] ^ t0.wrapping_add(t1).wrapping_add(self.k[k + 1])).rotate_right(1);
        }

        for (i, w) in c.iter().enumerate() {
            store32_le(w ^ self.k[i], &mut output[4 * i..]);
        }
    }
}

impl Drop for Twofish {
    fn drop(&mut self) {
        zeroize(&mut self.k);
        for table in self.s.iter_mut() {
            zeroize(table);
        }
    }
}

impl core::fmt::Debug for Twofish {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Twofish { .. }")
    }
}

super::impl_block_cipher!(Twofish, TWOFISH_BLOCK_SIZE);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::hex;

    #[test]
    fn test_reference_vectors() {
        let cases = [
            ("00000000000000000000000000000000", "9f589f5cf6122c32b6bfec2f2ae8c35a"),
            (
                "0123456789abcdeffedcba98765432100011223344556677",
                "cfd1d2e5a9be9cdf501f13b892bd2248",
            ),
            (
                "0123456789abcdeffedcba987654321000112233445566778899aabbccddeeff",
                "37527be0052334b89f0cfccae87cfa20",
            ),
        ];
        for (key, ct) in cases {
            let c = Twofish::new(&hex(key)).unwrap();
            let mut out = [0u8; 16];
            c.encrypt(&[0u8; 16], &mut out);
            assert_eq!(out.to_vec(), hex(ct), "key {key}");
            let mut back = [0xFFu8; 16];
            c.decrypt(&out, &mut back);
            assert_eq!(back, [0u8; 16]);
        }
    }

    #[test]
    fn test_first_subkey() {
        let c = Twofish::new(&[0u8; 16]).unwrap();
        assert_eq!(c.k[0], 0x52C5_4DDE);
    }

    #[test]
    fn test_q_tables_are_permutations() {
        for q in Q.iter() {
            let mut seen = [false; 256];
            for &v in q.iter() {
                assert!(!seen[v as usize]);
                seen[v as usize] = true;
            }
        }
        assert_eq!(Q[0][0], 0xA9);
        assert_eq!(Q[1][0], 0x75);
    }
}
