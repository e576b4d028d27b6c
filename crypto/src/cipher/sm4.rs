//! SM4 block cipher (GB/T 32907-2016).
//!
//! 128-bit block and key, 32 rounds of an unbalanced Feistel network.
//! The OID registered for the descriptor is the ECB arc; the sibling arcs
//! for the other modes are exported alongside.

use super::{CipherAlgo, CipherContext, CipherFlags, CipherKind, KeySizes};
use crate::error::{CryptoError, CryptoResult};
use crate::util::{load32_be, store32_be, zeroize};

/// SM4 block size
pub const SM4_BLOCK_SIZE: usize = 16;

/// SM4 key size
pub const SM4_KEY_SIZE: usize = 16;

/// SM4 OID prefix (1.2.156.10197.1.104)
const SM4_OID_PREFIX: [u8; 7] = [0x2A, 0x81, 0x1C, 0xCF, 0x55, 0x01, 0x68];

const fn sm4_oid(arc: u8) -> [u8; 8] {
    let p = SM4_OID_PREFIX;
    [p[0], p[1], p[2], p[3], p[4], p[5], p[6], arc]
}

/// SM4 in ECB mode (1.2.156.10197.1.104.1)
pub const SM4_ECB_OID: [u8; 8] = sm4_oid(0x01);
/// SM4 in CBC mode (1.2.156.10197.1.104.2)
pub const SM4_CBC_OID: [u8; 8] = sm4_oid(0x02);
/// SM4 in OFB mode (1.2.156.10197.1.104.3)
pub const SM4_OFB_OID: [u8; 8] = sm4_oid(0x03);
/// SM4 in CFB mode (1.2.156.10197.1.104.4)
pub const SM4_CFB_OID: [u8; 8] = sm4_oid(0x04);
/// SM4 in CTR mode (1.2.156.10197.1.104.7)
pub const SM4_CTR_OID: [u8; 8] = sm4_oid(0x07);
/// SM4 in GCM mode (1.2.156.10197.1.104.8)
pub const SM4_GCM_OID: [u8; 8] = sm4_oid(0x08);
/// SM4 in CCM mode (1.2.156.10197.1.104.9)
pub const SM4_CCM_OID: [u8; 8] = sm4_oid(0x09);
/// SM4 in XTS mode (1.2.156.10197.1.104.10)
pub const SM4_XTS_OID: [u8; 8] = sm4_oid(0x0A);

/// Common interface for SM4
pub static SM4_CIPHER_ALGO: CipherAlgo = CipherAlgo {
    name: "SM4",
    oid: &SM4_ECB_OID,
    context_size: core::mem::size_of::<Sm4>(),
    kind: CipherKind::Block,
    block_size: SM4_BLOCK_SIZE,
    key_sizes: KeySizes::Fixed(&[SM4_KEY_SIZE]),
    flags: CipherFlags::WIDE_BLOCK,
    init: init_context,
};

fn init_context(key: &[u8]) -> CryptoResult<CipherContext> {
    Ok(CipherContext::Sm4(Sm4::new(key)?))
}

/// System parameters
const FK: [u32; 4] = [0xA3B1_BAC6, 0x56AA_3350, 0x677D_9197, 0xB270_22DC];

/// Fixed parameters, byte `j` of `CK[i]` is `(4i + j) * 7 mod 256`
const CK: [u32; 32] = fixed_parameters();

const fn fixed_parameters() -> [u32; 32] {
    let mut ck = [0u32; 32];
    let mut i = 0;
    while i < 32 {
        let mut j = 0;
        while j < 4 {
            let b = (((4 * i + j) * 7) & 0xFF) as u32;
            ck[i] |= b << (24 - 8 * j);
            j += 1;
        }
        i += 1;
    }
    ck
}

/// Non-linear substitution on each byte
#[inline]
fn tau(a: u32) -> u32 {
    let b = a.to_be_bytes();
    u32::from_be_bytes([
        SBOX[b[0] as usize],
        SBOX[b[1] as usize],
        SBOX[b[2] as usize],
        SBOX[b[3] as usize],
    ])
}

/// Round transform `T`
#[inline]
fn t(x: u32) -> u32 {
    let b = tau(x);
    b ^ b.rotate_left(2) ^ b.rotate_left(10) ^ b.rotate_left(18) ^ b.rotate_left(24)
}

/// Key schedule transform `T'`
#[inline]
fn t_prime(x: u32) -> u32 {
    let b = tau(x);
    b ^ b.rotate_left(13) ^ b.rotate_left(23)
}

// ============================================================================
// SM4 Context
// ============================================================================

/// SM4 expanded-key context.
pub struct Sm4 {
    rk: [u32; 32],
}

impl Sm4 {
    /// Expand a 16-byte key
    pub fn new(key: &[u8]) -> CryptoResult<Self> {
        if key.len() != SM4_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength);
        }

        let mut k = [0u32; 4];
        for (i, w) in k.iter_mut().enumerate() {
            *w = load32_be(&key[4 * i..]) ^ FK[i];
        }

        let mut rk = [0u32; 32];
        for (i, r) in rk.iter_mut().enumerate() {
            *r = k[0] ^ t_prime(k[1] ^ k[2] ^ k[3] ^ CK[i]);
            k = [k[1], k[2], k[3], *r];
        }
        zeroize(&mut k);

        Ok(Self { rk })
    }

    fn crypt(&self, input: &[u8; 16], output: &mut [u8; 16], decrypt: bool) {
        let mut x = [
            load32_be(&input[0..]),
            load32_be(&input[4..]),
            load32_be(&input[8..]),
            load32_be(&input[12..]),
        ];
        for i in 0..32 {
            let rk = if decrypt { self.rk[31 - i] } else { self.rk[i] };
            let n = x[0] ^ t(x[1] ^ x[2] ^ x[3] ^ rk);
            x = [x[1], x[2], x[3], n];
        }
        // Reverse word order R(A0, A1, A2, A3) = (A3, A2, A1, A0)
        for (i, w) in x.iter().rev().enumerate() {
            store32_be(*w, &mut output[4 * i..]);
        }
    }

    /// Encrypt a single block
    pub fn encrypt(&self, input: &[u8; 16], output: &mut [u8; 16]) {
        self.crypt(input, output, false);
    }

    /// Decrypt a single block
    pub fn decrypt(&self, input: &[u8; 16], output: &mut [u8; 16]) {
        self.crypt(input, output, true);
    }
}

impl Drop for Sm4 {
    fn drop(&mut self) {
        zeroize(&mut self.rk);
    }
}

impl core::fmt::Debug for Sm4 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Sm4 { .. }")
    }
}

super::impl_block_cipher!(Sm4, SM4_BLOCK_SIZE);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::hex;

    const KEY: &str = "0123456789abcdeffedcba9876543210";

    #[test]
    fn test_standard_vector() {
        let key = hex(KEY);
        let c = Sm4::new(&key).unwrap();
        assert_eq!(c.rk[0], 0xF121_86F9);
        assert_eq!(c.rk[31], 0x9124_A012);

        let pt: [u8; 16] = key.clone().try_into().unwrap();
        let mut ct = [0u8; 16];
        c.encrypt(&pt, &mut ct);
        assert_eq!(ct.to_vec(), hex("681edf34d206965e86b3e94f536e4246"));

        let mut back = [0u8; 16];
        c.decrypt(&ct, &mut back);
        assert_eq!(back, pt);
    }

    #[test]
    fn test_iterated_encryption() {
        let key = hex(KEY);
        let c = Sm4::new(&key).unwrap();
        let mut block: [u8; 16] = key.try_into().unwrap();
        for _ in 0..1000 {
            let input = block;
            c.encrypt(&input, &mut block);
        }
        assert_eq!(block.to_vec(), hex("d735e91cc5689cf312bcc1efb740e813"));
    }

    #[test]
    fn test_fixed_parameters() {
        assert_eq!(CK[0], 0x0007_0E15);
        assert_eq!(CK[31], 0x646B_7279);
    }

    #[test]
    fn test_oids() {
        assert_eq!(SM4_CIPHER_ALGO.oid, &SM4_ECB_OID[..]);
        assert_eq!(SM4_XTS_OID[7], 0x0A);
        assert_eq!(SM4_GCM_OID[..7], SM4_OID_PREFIX);
    }
}

// ============================================================================
// S-box
// ============================================================================

#[rustfmt::skip]
const SBOX: [u8; 256] = [
    0xd6, 0x90, 0xe9, 0xfe, 0xcc, 0xe1, 0x3d, 0xb7, 0x16, 0xb6, 0x14, 0xc2, 0x28, 0xfb, 0x2c, 0x05,
    0x2b, 0x67, 0x9a, 0x76, 0x2a, 0xbe, 0x04, 0xc3, 0xaa, 0x44, 0x13, 0x26, 0x49, 0x86, 0x06, 0x99,
    0x9c, 0x42, 0x50, 0xf4, 0x91, 0xef, 0x98, 0x7a, 0x33, 0x54, 0x0b, 0x43, 0xed, 0xcf, 0xac, 0x62,
    0xe4, 0xb3, 0x1c, 0xa9, 0xc9, 0x08, 0xe8, 0x95, 0x80, 0xdf, 0x94, 0xfa, 0x75, 0x8f, 0x3f, 0xa6,
    0x47, 0x07, 0xa7, 0xfc, 0xf3, 0x73, 0x17, 0xba, 0x83, 0x59, 0x3c, 0x19, 0xe6, 0x85, 0x4f, 0xa8,
    0x68, 0x6b, 0x81, 0xb2, 0x71, 0x64, 0xda, 0x8b, 0xf8, 0xeb, 0x0f, 0x4b, 0x70, 0x56, 0x9d, 0x35,
    0x1e, 0x24, 0x0e, 0x5e, 0x63, 0x58, 0xd1, 0xa2, 0x25, 0x22, 0x7c, 0x3b, 0x01, 0x21, 0x78, 0x87,
    0xd4, 0x00, 0x46, 0x57, 0x9f, 0xd3, 0x27, 0x52, 0x4c, 0x36, 0x02, 0xe7, 0xa0, 0xc4, 0xc8, 0x9e,
    0xea, 0xbf, 0x8a, 0xd2, 0x40, 0xc7, 0x38, 0xb5, 0xa3, 0xf7, 0xf2, 0xce, 0xf9, 0x61, 0x15, 0xa1,
    0xe0, 0xae, 0x5d, 0xa4, 0x9b, 0x34, 0x1a, 0x55, 0xad, 0x93, 0x32, 0x30, 0xf5, 0x8c, 0xb1, 0xe3,
    0x1d, 0xf6, 0xe2, 0x2e, 0x82, 0x66, 0xca, 0x60, 0xc0, 0x29, 0x23, 0xab, 0x0d, 0x53, 0x4e, 0x6f,
    0xd5, 0xdb, 0x37, 0x45, 0xde, 0xfd, 0x8e, 0x2f, 0x03, 0xff, 0x6a, 0x72, 0x6d, 0x6c, 0x5b, 0x51,
    0x8d, 0x1b, 0xaf, 0x92, 0xbb, 0xdd, 0xbc, 0x7f, 0x11, 0xd9, 0x5c, 0x41, 0x1f, 0x10, 0x5a, 0xd8,
    0x0a, 0xc1, 0x31, 0x88, 0xa5, 0xcd, 0x7b, 0xbd, 0x2d, 0x74, 0xd0, 0x12, 0xb8, 0xe5, 0xb4, 0xb0,
    0x89, 0x69, 0x97, 0x4a, 0x0c, 0x96, 0x77, 0x7e, 0x65, 0xb9, 0xf1, 0x09, 0xc5, 0x6e, 0xc6, 0x84,
    0x18, 0xf0, 0x7d, 0xec, 0x3a, 0xdc, 0x4d, 0x20, 0x79, 0xee, 0x5f, 0x3e, 0xd7, 0xcb, 0x39, 0x48,
];
