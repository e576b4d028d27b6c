//! ARIA block cipher (RFC 5794).
//!
//! 128-bit block, 128/192/256-bit keys, 12/14/16 rounds of an SPN with
//! two alternating substitution layers and an involutory 16x16 binary
//! diffusion matrix. The descriptor carries no OID because ARIA arcs are
//! assigned per key size; the full table is exported below.

use super::aes::{invert_sbox, INV_SBOX, SBOX};
use super::{CipherAlgo, CipherContext, CipherFlags, CipherKind, KeySizes};
use crate::error::{CryptoError, CryptoResult};
use crate::util::zeroize;

/// ARIA block size
pub const ARIA_BLOCK_SIZE: usize = 16;

/// ARIA OID prefix (1.2.410.200046.1.1)
const ARIA_OID_PREFIX: [u8; 8] = [0x2A, 0x83, 0x1A, 0x8C, 0x9A, 0x6E, 0x01, 0x01];

const fn aria_oid(arc: u8) -> [u8; 9] {
    let p = ARIA_OID_PREFIX;
    [p[0], p[1], p[2], p[3], p[4], p[5], p[6], p[7], arc]
}

/// ARIA-128 in ECB mode (1.2.410.200046.1.1.1)
pub const ARIA128_ECB_OID: [u8; 9] = aria_oid(1);
/// ARIA-128 in CBC mode (1.2.410.200046.1.1.2)
pub const ARIA128_CBC_OID: [u8; 9] = aria_oid(2);
/// ARIA-128 in CFB mode (1.2.410.200046.1.1.3)
pub const ARIA128_CFB_OID: [u8; 9] = aria_oid(3);
/// ARIA-128 in OFB mode (1.2.410.200046.1.1.4)
pub const ARIA128_OFB_OID: [u8; 9] = aria_oid(4);
/// ARIA-128 in CTR mode (1.2.410.200046.1.1.5)
pub const ARIA128_CTR_OID: [u8; 9] = aria_oid(5);
/// ARIA-192 in ECB mode (1.2.410.200046.1.1.6)
pub const ARIA192_ECB_OID: [u8; 9] = aria_oid(6);
/// ARIA-192 in CBC mode (1.2.410.200046.1.1.7)
pub const ARIA192_CBC_OID: [u8; 9] = aria_oid(7);
/// ARIA-192 in CFB mode (1.2.410.200046.1.1.8)
pub const ARIA192_CFB_OID: [u8; 9] = aria_oid(8);
/// ARIA-192 in OFB mode (1.2.410.200046.1.1.9)
pub const ARIA192_OFB_OID: [u8; 9] = aria_oid(9);
/// ARIA-192 in CTR mode (1.2.410.200046.1.1.10)
pub const ARIA192_CTR_OID: [u8; 9] = aria_oid(10);
/// ARIA-256 in ECB mode (1.2.410.200046.1.1.11)
pub const ARIA256_ECB_OID: [u8; 9] = aria_oid(11);
/// ARIA-256 in CBC mode (1.2.410.200046.1.1.12)
pub const ARIA256_CBC_OID: [u8; 9] = aria_oid(12);
/// ARIA-256 in CFB mode (1.2.410.200046.1.1.13)
pub const ARIA256_CFB_OID: [u8; 9] = aria_oid(13);
/// ARIA-256 in OFB mode (1.2.410.200046.1.1.14)
pub const ARIA256_OFB_OID: [u8; 9] = aria_oid(14);
/// ARIA-256 in CTR mode (1.2.410.200046.1.1.15)
pub const ARIA256_CTR_OID: [u8; 9] = aria_oid(15);
/// ARIA-128 in GCM mode (1.2.410.200046.1.1.34)
pub const ARIA128_GCM_OID: [u8; 9] = aria_oid(34);
/// ARIA-192 in GCM mode (1.2.410.200046.1.1.35)
pub const ARIA192_GCM_OID: [u8; 9] = aria_oid(35);
/// ARIA-256 in GCM mode (1.2.410.200046.1.1.36)
pub const ARIA256_GCM_OID: [u8; 9] = aria_oid(36);
/// ARIA-128 in CCM mode (1.2.410.200046.1.1.37)
pub const ARIA128_CCM_OID: [u8; 9] = aria_oid(37);
/// ARIA-192 in CCM mode (1.2.410.200046.1.1.38)
pub const ARIA192_CCM_OID: [u8; 9] = aria_oid(38);
/// ARIA-256 in CCM mode (1.2.410.200046.1.1.39)
pub const ARIA256_CCM_OID: [u8; 9] = aria_oid(39);

/// Common interface for ARIA
pub static ARIA_CIPHER_ALGO: CipherAlgo = CipherAlgo {
    name: "ARIA",
    oid: &[],
    context_size: core::mem::size_of::<Aria>(),
    kind: CipherKind::Block,
    block_size: ARIA_BLOCK_SIZE,
    key_sizes: KeySizes::Fixed(&[16, 24, 32]),
    flags: CipherFlags::WIDE_BLOCK,
    init: init_context,
};

fn init_context(key: &[u8]) -> CryptoResult<CipherContext> {
    Ok(CipherContext::Aria(Aria::new(key)?))
}

/// Key schedule constants (fractional part of 1/pi)
const C: [u128; 3] = [
    0x517c_c1b7_2722_0a94_fe13_abe8_fa9a_6ee0,
    0x6db1_4acc_9e21_c820_ff28_b1d5_ef5d_e2b0,
    0xdb92_371d_2126_e970_0324_9775_04e8_c90e,
];

/// Substitution layer of odd rounds
const SL1: [&[u8; 256]; 4] = [&SBOX, &SB2, &INV_SBOX, &SB4];

/// Substitution layer of even rounds
const SL2: [&[u8; 256]; 4] = [&INV_SBOX, &SB4, &SBOX, &SB2];

const SB4: [u8; 256] = invert_sbox(&SB2);

/// Apply a substitution layer, byte `i` goes through box `i mod 4`
#[inline]
fn substitute(x: u128, layer: &[&[u8; 256]; 4]) -> u128 {
    let mut b = x.to_be_bytes();
    for (i, v) in b.iter_mut().enumerate() {
        *v = layer[i % 4][*v as usize];
    }
    u128::from_be_bytes(b)
}

/// Diffusion layer `A`, its own inverse
fn diffuse(x: u128) -> u128 {
    let b = x.to_be_bytes();
    let mut y = [0u8; 16];
    for (out, row) in y.iter_mut().zip(DIFFUSION.iter()) {
        *out = row.iter().fold(0, |acc, &i| acc ^ b[i as usize]);
    }
    u128::from_be_bytes(y)
}

/// Odd round function
#[inline]
fn fo(d: u128, rk: u128) -> u128 {
    diffuse(substitute(d ^ rk, &SL1))
}

/// Even round function
#[inline]
fn fe(d: u128, rk: u128) -> u128 {
    diffuse(substitute(d ^ rk, &SL2))
}

// ============================================================================
// ARIA Context
// ============================================================================

/// ARIA expanded-key context.
pub struct Aria {
    nr: usize,
    ek: [u128; 17],
    dk: [u128; 17],
}

impl Aria {
    /// Expand a 16, 24 or 32-byte key
    pub fn new(key: &[u8]) -> CryptoResult<Self> {
        let (nr, first) = match key.len() {
            16 => (12, 0),
            24 => (14, 1),
            32 => (16, 2),
            _ => return Err(CryptoError::InvalidKeyLength),
        };

        // KL || KR is the key right-padded with zeroes to 256 bits
        let mut padded = [0u8; 32];
        padded[..key.len()].copy_from_slice(key);
        let mut half = [0u8; 16];
        half.copy_from_slice(&padded[..16]);
        let kl = u128::from_be_bytes(half);
        half.copy_from_slice(&padded[16..]);
        let kr = u128::from_be_bytes(half);
        zeroize(&mut padded);
        zeroize(&mut half);

        let ck = |i: usize| C[(first + i) % 3];
        let w0 = kl;
        let w1 = fo(w0, ck(0)) ^ kr;
        let w2 = fe(w1, ck(1)) ^ w0;
        let w3 = fo(w2, ck(2)) ^ w1;
        let mut w = [w0, w1, w2, w3];

        let mut ek = [0u128; 17];
        for (i, k) in ek.iter_mut().enumerate() {
            let next = w[(i + 1) % 4];
            let rotated = match i / 4 {
                0 => next.rotate_right(19),
                1 => next.rotate_right(31),
                2 => next.rotate_left(61),
                3 => next.rotate_left(31),
                _ => next.rotate_left(19),
            };
            *k = w[i % 4] ^ rotated;
        }
        zeroize(&mut w);

        let mut dk = [0u128; 17];
        dk[0] = ek[nr];
        for i in 1..nr {
            dk[i] = diffuse(ek[nr - i]);
        }
        dk[nr] = ek[0];

        Ok(Self { nr, ek, dk })
    }

    /// Number of rounds for the key size in use
    pub fn rounds(&self) -> usize {
        self.nr
    }

    fn crypt(&self, rk: &[u128; 17], input: &[u8; 16], output: &mut [u8; 16]) {
        let n = self.nr;
        let mut p = u128::from_be_bytes(*input);
        for (i, &k) in rk[..n - 1].iter().enumerate() {
            p = if i % 2 == 0 { fo(p, k) } else { fe(p, k) };
        }
        let c = substitute(p ^ rk[n - 1], &SL2) ^ rk[n];
        *output = c.to_be_bytes();
    }

    /// Encrypt a single block
    pub fn encrypt(&self, input: &[u8; 16], output: &mut [u8; 16]) {
        self.crypt(&self.ek, input, output);
    }

    /// Decrypt a single block
    pub fn decrypt(&self, input: &[u8; 16], output: &mut [u8; 16]) {
        self.crypt(&self.dk, input, output);
    }
}

impl Drop for Aria {
    fn drop(&mut self) {
        zeroize(&mut self.ek);
        zeroize(&mut self.dk);
    }
}

impl core::fmt::Debug for Aria {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Aria").field("rounds", &self.nr).finish_non_exhaustive()
    }
}

super::impl_block_cipher!(Aria, ARIA_BLOCK_SIZE);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::hex;

    const PLAINTEXT: &str = "00112233445566778899aabbccddeeff";

    fn check(key: &str, expected: &str, rounds: usize) {
        let c = Aria::new(&hex(key)).unwrap();
        assert_eq!(c.rounds(), rounds);

        let pt: [u8; 16] = hex(PLAINTEXT).try_into().unwrap();
        let mut ct = [0u8; 16];
        c.encrypt(&pt, &mut ct);
        assert_eq!(ct.to_vec(), hex(expected));

        let mut back = [0u8; 16];
        c.decrypt(&ct, &mut back);
        assert_eq!(back, pt);
    }

    #[test]
    fn test_rfc5794_128() {
        check(
            "000102030405060708090a0b0c0d0e0f",
            "d718fbd6ab644c739da95f3be6451778",
            12,
        );
    }

    #[test]
    fn test_rfc5794_192() {
        check(
            "000102030405060708090a0b0c0d0e0f 1011121314151617",
            "26449c1805dbe7aa25a468ce263a9e79",
            14,
        );
    }

    #[test]
    fn test_rfc5794_256() {
        check(
            "000102030405060708090a0b0c0d0e0f 101112131415161718191a1b1c1d1e1f",
            "f92bd7c79fb72e2f2b8f80c1972d24fc",
            16,
        );
    }

    #[test]
    fn test_substitution_boxes() {
        assert_eq!(SB2[0x00], 0xe2);
        for x in 0..=255u8 {
            assert_eq!(SB4[SB2[x as usize] as usize], x);
        }
    }

    #[test]
    fn test_diffusion_is_involution() {
        let x = 0x0123_4567_89ab_cdef_fedc_ba98_7654_3210u128;
        assert_ne!(diffuse(x), x);
        assert_eq!(diffuse(diffuse(x)), x);
    }

    #[test]
    fn test_bad_key_length() {
        assert_eq!(Aria::new(&[0u8; 20]).err(), Some(CryptoError::InvalidKeyLength));
    }

    #[test]
    fn test_oids() {
        assert!(ARIA_CIPHER_ALGO.oid.is_empty());
        assert_eq!(ARIA128_ECB_OID[..8], ARIA_OID_PREFIX);
        assert_eq!(ARIA256_CTR_OID[8], 15);
        assert_eq!(ARIA192_GCM_OID[8], 35);
        assert_eq!(ARIA256_CCM_OID[8], 39);
    }
}

// ============================================================================
// Tables
// ============================================================================

/// Byte indices XORed into each output byte of the diffusion layer
#[rustfmt::skip]
const DIFFUSION: [[u8; 7]; 16] = [
    [3, 4, 6, 8, 9, 13, 14],
    [2, 5, 7, 8, 9, 12, 15],
    [1, 4, 6, 10, 11, 12, 15],
    [0, 5, 7, 10, 11, 13, 14],
    [0, 2, 5, 8, 11, 14, 15],
    [1, 3, 4, 9, 10, 14, 15],
    [0, 2, 7, 9, 10, 12, 13],
    [1, 3, 6, 8, 11, 12, 13],
    [0, 1, 4, 7, 10, 13, 15],
    [0, 1, 5, 6, 11, 12, 14],
    [2, 3, 5, 6, 8, 13, 15],
    [2, 3, 4, 7, 9, 12, 14],
    [1, 2, 6, 7, 9, 11, 12],
    [0, 3, 6, 7, 8, 10, 13],
    [0, 3, 4, 5, 9, 11, 14],
    [1, 2, 4, 5, 8, 10, 15],
];

/// Second S-box; the first is the AES S-box
#[rustfmt::skip]
const SB2: [u8; 256] = [
    0xe2, 0x4e, 0x54, 0xfc, 0x94, 0xc2, 0x4a, 0xcc, 0x62, 0x0d, 0x6a, 0x46, 0x3c, 0x4d, 0x8b, 0xd1,
    0x5e, 0xfa, 0x64, 0xcb, 0xb4, 0x97, 0xbe, 0x2b, 0xbc, 0x77, 0x2e, 0x03, 0xd3, 0x19, 0x59, 0xc1,
    0x1d, 0x06, 0x41, 0x6b, 0x55, 0xf0, 0x99, 0x69, 0xea, 0x9c, 0x18, 0xae, 0x63, 0xdf, 0xe7, 0xbb,
    0x00, 0x73, 0x66, 0xfb, 0x96, 0x4c, 0x85, 0xe4, 0x3a, 0x09, 0x45, 0xaa, 0x0f, 0xee, 0x10, 0xeb,
    0x2d, 0x7f, 0xf4, 0x29, 0xac, 0xcf, 0xad, 0x91, 0x8d, 0x78, 0xc8, 0x95, 0xf9, 0x2f, 0xce, 0xcd,
    0x08, 0x7a, 0x88, 0x38, 0x5c, 0x83, 0x2a, 0x28, 0x47, 0xdb, 0xb8, 0xc7, 0x93, 0xa4, 0x12, 0x53,
    0xff, 0x87, 0x0e, 0x31, 0x36, 0x21, 0x58, 0x48, 0x01, 0x8e, 0x37, 0x74, 0x32, 0xca, 0xe9, 0xb1,
    0xb7, 0xab, 0x0c, 0xd7, 0xc4, 0x56, 0x42, 0x26, 0x07, 0x98, 0x60, 0xd9, 0xb6, 0xb9, 0x11, 0x40,
    0xec, 0x20, 0x8c, 0xbd, 0xa0, 0xc9, 0x84, 0x04, 0x49, 0x23, 0xf1, 0x4f, 0x50, 0x1f, 0x13, 0xdc,
    0xd8, 0xc0, 0x9e, 0x57, 0xe3, 0xc3, 0x7b, 0x65, 0x3b, 0x02, 0x8f, 0x3e, 0xe8, 0x25, 0x92, 0xe5,
    0x15, 0xdd, 0xfd, 0x17, 0xa9, 0xbf, 0xd4, 0x9a, 0x7e, 0xc5, 0x39, 0x67, 0xfe, 0x76, 0x9d, 0x43,
    0xa7, 0xe1, 0xd0, 0xf5, 0x68, 0xf2, 0x1b, 0x34, 0x70, 0x05, 0xa3, 0x8a, 0xd5, 0x79, 0x86, 0xa8,
    0x30, 0xc6, 0x51, 0x4b, 0x1e, 0xa6, 0x27, 0xf6, 0x35, 0xd2, 0x6e, 0x24, 0x16, 0x82, 0x5f, 0xda,
    0xe6, 0x75, 0xa2, 0xef, 0x2c, 0xb2, 0x1c, 0x9f, 0x5d, 0x6f, 0x80, 0x0a, 0x72, 0x44, 0x9b, 0x6c,
    0x90, 0x0b, 0x5b, 0x33, 0x7d, 0x5a, 0x52, 0xf3, 0x61, 0xa1, 0xf7, 0xb0, 0xd6, 0x3f, 0x7c, 0x6d,
    0xed, 0x14, 0xe0, 0xa5, 0x3d, 0x22, 0xb3, 0xf8, 0x89, 0xde, 0x71, 0x1a, 0xaf, 0xba, 0xb5, 0x81,
];
