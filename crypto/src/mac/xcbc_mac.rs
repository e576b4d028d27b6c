//! AES-XCBC-MAC style MAC (RFC 3566) over any 128-bit block cipher.
//!
//! Three subkeys are derived from the user key:
//! `K1 = E(0x01..)`, `K2 = E(0x02..)` and `K3 = E(0x03..)`. The chain runs
//! under `K1`; the last block is masked with `K2` when complete and with
//! `K3` after `10*` padding otherwise.

use super::{check_mac_len, CbcMacState};
use crate::cipher::{BlockCipher, CipherAlgo, CipherContext};
use crate::error::{CryptoError, CryptoResult};
use crate::util::zeroize;

/// XCBC-MAC block and tag size
pub const XCBC_MAC_SIZE: usize = 16;

/// XCBC-MAC context.
pub struct XcbcMac {
    /// Cipher keyed with `K1`
    cipher: CipherContext,
    k2: [u8; 16],
    k3: [u8; 16],
    state: CbcMacState,
}

impl XcbcMac {
    /// Derive the three subkeys from a 16-byte key
    pub fn new(algo: &CipherAlgo, key: &[u8]) -> CryptoResult<Self> {
        if algo.block_size != XCBC_MAC_SIZE {
            return Err(CryptoError::InvalidParameter);
        }
        if key.len() != XCBC_MAC_SIZE {
            return Err(CryptoError::InvalidKeyLength);
        }

        let master = algo.new_context(key)?;
        let mut k1 = [0u8; 16];
        let mut k2 = [0u8; 16];
        let mut k3 = [0u8; 16];
        master.encrypt_block(&[0x01; 16], &mut k1)?;
        master.encrypt_block(&[0x02; 16], &mut k2)?;
        master.encrypt_block(&[0x03; 16], &mut k3)?;
        drop(master);

        let cipher = algo.new_context(&k1);
        zeroize(&mut k1);
        Ok(Self {
            cipher: cipher?,
            k2,
            k3,
            state: CbcMacState::new(XCBC_MAC_SIZE),
        })
    }

    /// Discard buffered input
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Absorb message bytes
    pub fn update(&mut self, data: &[u8]) -> CryptoResult<()> {
        self.state.update(&self.cipher, data)
    }

    /// Write the tag truncated to `mac.len()` (1 to 16 bytes) and reset
    pub fn finalize(&mut self, mac: &mut [u8]) -> CryptoResult<()> {
        check_mac_len(mac.len(), 1, XCBC_MAC_SIZE)?;

        let mut tag = [0u8; 16];
        self.state.finish(&self.cipher, &self.k2, &self.k3, &mut tag)?;
        mac.copy_from_slice(&tag[..mac.len()]);
        zeroize(&mut tag);
        Ok(())
    }

    /// XCBC-MAC of `data` in one call
    pub fn compute(algo: &CipherAlgo, key: &[u8], data: &[u8], mac: &mut [u8]) -> CryptoResult<()> {
        let mut ctx = Self::new(algo, key)?;
        ctx.update(data)?;
        ctx.finalize(mac)
    }
}

impl Drop for XcbcMac {
    fn drop(&mut self) {
        zeroize(&mut self.k2);
        zeroize(&mut self.k3);
    }
}

impl core::fmt::Debug for XcbcMac {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("XcbcMac { .. }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::{aes::AES_CIPHER_ALGO, cast128::CAST128_CIPHER_ALGO};
    use crate::util::testing::hex;

    fn xcbc(msg: &[u8]) -> Vec<u8> {
        let key: Vec<u8> = (0u8..16).collect();
        let mut mac = [0u8; 16];
        XcbcMac::compute(&AES_CIPHER_ALGO, &key, msg, &mut mac).unwrap();
        mac.to_vec()
    }

    #[test]
    fn test_rfc3566_vectors() {
        let msg: Vec<u8> = (0u8..40).collect();
        assert_eq!(xcbc(b""), hex("75f0251d528ac01c4573dfd584d79f29"));
        assert_eq!(xcbc(&msg[..3]), hex("5b376580ae2f19afe7219ceef172756f"));
        assert_eq!(xcbc(&msg[..16]), hex("d2a246fa349b68a79998a4394ff7a263"));
        assert_eq!(xcbc(&msg[..20]), hex("47f51b4564966215b8985c63055ed308"));
        assert_eq!(xcbc(&msg[..32]), hex("f54f0ec8d2b9f3d36807734bd5283fd4"));
        assert_eq!(xcbc(&msg[..34]), hex("becbb3bccdb518a30677d5481fb6b4d8"));
    }

    #[test]
    fn test_chunking_and_truncation() {
        let key: Vec<u8> = (0u8..16).collect();
        let msg: Vec<u8> = (0u8..34).collect();
        let mut ctx = XcbcMac::new(&AES_CIPHER_ALGO, &key).unwrap();
        ctx.update(&msg[..16]).unwrap();
        ctx.update(&msg[16..17]).unwrap();
        ctx.update(&msg[17..]).unwrap();

        // 96-bit truncation as used by IPsec
        let mut mac = [0u8; 12];
        ctx.finalize(&mut mac).unwrap();
        assert_eq!(mac.to_vec(), hex("becbb3bccdb518a30677d548"));

        assert_eq!(ctx.finalize(&mut [0u8; 17]), Err(CryptoError::InvalidParameter));
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            XcbcMac::new(&CAST128_CIPHER_ALGO, &[0u8; 16]).err(),
            Some(CryptoError::InvalidParameter)
        );
        assert_eq!(
            XcbcMac::new(&AES_CIPHER_ALGO, &[0u8; 32]).err(),
            Some(CryptoError::InvalidKeyLength)
        );
    }
}
