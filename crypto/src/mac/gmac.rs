//! GMAC: GCM authentication of associated data only (NIST SP 800-38D).
//!
//! The hash subkey `H` and its multiplication table are computed once in
//! [`Gmac::new`]. Each tag needs a fresh IV supplied through
//! [`Gmac::reset`].

use super::check_mac_len;
use crate::cipher::{BlockCipher, CipherAlgo, CipherContext};
use crate::error::{CryptoError, CryptoResult};
use crate::modes::gcm::{GCM_BLOCK_SIZE, GCM_MAX_TAG_SIZE, GCM_MIN_TAG_SIZE};
use crate::modes::ghash::{pre_counter_block, GHash, GHashKey};
use crate::util::{xor_in_place, zeroize};

/// GMAC context.
pub struct Gmac {
    cipher: CipherContext,
    key: GHashKey,
    ghash: GHash,
    j0: [u8; 16],
    len: u64,
    /// Set by `reset`, cleared by `finalize`
    has_iv: bool,
}

impl Gmac {
    /// Key the cipher and precompute the GHASH table
    pub fn new(algo: &CipherAlgo, key: &[u8]) -> CryptoResult<Self> {
        if algo.block_size != GCM_BLOCK_SIZE {
            return Err(CryptoError::InvalidParameter);
        }
        let cipher = algo.new_context(key)?;

        let mut h = [0u8; 16];
        cipher.encrypt_block(&[0u8; 16], &mut h)?;
        let key = GHashKey::new(&h);
        zeroize(&mut h);

        Ok(Self {
            cipher,
            key,
            ghash: GHash::new(),
            j0: [0; 16],
            len: 0,
            has_iv: false,
        })
    }

    /// Start a new tag under `iv`, reusing `H`
    pub fn reset(&mut self, iv: &[u8]) -> CryptoResult<()> {
        if iv.is_empty() {
            return Err(CryptoError::InvalidParameter);
        }
        self.j0 = pre_counter_block(&self.key, iv);
        self.ghash.reset();
        self.len = 0;
        self.has_iv = true;
        Ok(())
    }

    /// Absorb message bytes
    pub fn update(&mut self, data: &[u8]) {
        self.ghash.update(&self.key, data);
        self.len = self.len.wrapping_add(data.len() as u64);
    }

    /// Write the tag truncated to `mac.len()` (4 to 16 bytes).
    ///
    /// A new IV must be set with [`Gmac::reset`] before the next tag.
    pub fn finalize(&mut self, mac: &mut [u8]) -> CryptoResult<()> {
        check_mac_len(mac.len(), GCM_MIN_TAG_SIZE, GCM_MAX_TAG_SIZE)?;
        if !self.has_iv {
            return Err(CryptoError::InvalidParameter);
        }

        let mut s = self.ghash.finish(&self.key, self.len, 0);
        let mut ek = [0u8; 16];
        self.cipher.encrypt_block(&self.j0, &mut ek)?;
        xor_in_place(&mut s, &ek);
        mac.copy_from_slice(&s[..mac.len()]);

        zeroize(&mut s);
        zeroize(&mut ek);
        zeroize(&mut self.j0);
        self.ghash.reset();
        self.len = 0;
        self.has_iv = false;
        Ok(())
    }

    /// GMAC of `data` in one call
    pub fn compute(
        algo: &CipherAlgo,
        key: &[u8],
        iv: &[u8],
        data: &[u8],
        mac: &mut [u8],
    ) -> CryptoResult<()> {
        let mut ctx = Self::new(algo, key)?;
        ctx.reset(iv)?;
        ctx.update(data);
        ctx.finalize(mac)
    }
}

impl Drop for Gmac {
    fn drop(&mut self) {
        zeroize(&mut self.j0);
    }
}

impl core::fmt::Debug for Gmac {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Gmac")
            .field("cipher", &self.cipher)
            .field("has_iv", &self.has_iv)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::{aes::AES_CIPHER_ALGO, sm4::SM4_CIPHER_ALGO, xtea::XTEA_CIPHER_ALGO};
    use crate::modes::gcm::GcmContext;
    use crate::util::testing::hex;

    const K: &str = "feffe9928665731c6d6a8f9467308308";
    const A: &str = "feedfacedeadbeeffeedfacedeadbeefabaddad2";

    #[test]
    fn test_gmac_vectors() {
        let mut mac = [0u8; 16];
        Gmac::compute(&AES_CIPHER_ALGO, &hex(K), &hex("cafebabefacedbaddecaf888"), &hex(A), &mut mac)
            .unwrap();
        assert_eq!(mac.to_vec(), hex("346434fd51d5cd0c5887ec63e39b907a"));

        // Short IV goes through GHASH
        Gmac::compute(&AES_CIPHER_ALGO, &hex(K), &hex("cafebabefacedbad"), &hex(A), &mut mac)
            .unwrap();
        assert_eq!(mac.to_vec(), hex("ef6995e531e81a01f5b2f7762cc60bd2"));
    }

    #[test]
    fn test_matches_gcm_with_empty_plaintext() {
        let key = [0x42u8; 16];
        let iv = [9u8; 12];
        let aad = b"associated data only, no ciphertext at all";

        let gcm = GcmContext::new(&SM4_CIPHER_ALGO, &key).unwrap();
        let mut tag = [0u8; 16];
        gcm.encrypt(&iv, aad, &[], &mut [], &mut tag).unwrap();

        let mut ctx = Gmac::new(&SM4_CIPHER_ALGO, &key).unwrap();
        ctx.reset(&iv).unwrap();
        for chunk in aad.chunks(5) {
            ctx.update(chunk);
        }
        let mut mac = [0u8; 16];
        ctx.finalize(&mut mac).unwrap();
        assert_eq!(mac, tag);

        // Same H, new IV, truncated tag
        ctx.reset(&iv).unwrap();
        ctx.update(aad);
        let mut short = [0u8; 8];
        ctx.finalize(&mut short).unwrap();
        assert_eq!(short, tag[..8]);
    }

    #[test]
    fn test_iv_required() {
        let mut ctx = Gmac::new(&AES_CIPHER_ALGO, &[0u8; 16]).unwrap();
        assert_eq!(ctx.finalize(&mut [0u8; 16]), Err(CryptoError::InvalidParameter));
        assert_eq!(ctx.reset(&[]), Err(CryptoError::InvalidParameter));

        ctx.reset(&[1u8; 12]).unwrap();
        ctx.finalize(&mut [0u8; 16]).unwrap();
        // IV is consumed by finalize
        assert_eq!(ctx.finalize(&mut [0u8; 16]), Err(CryptoError::InvalidParameter));
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            Gmac::new(&XTEA_CIPHER_ALGO, &[0u8; 16]).err(),
            Some(CryptoError::InvalidParameter)
        );
        let mut ctx = Gmac::new(&AES_CIPHER_ALGO, &[0u8; 16]).unwrap();
        ctx.reset(&[1u8; 12]).unwrap();
        assert_eq!(ctx.finalize(&mut [0u8; 17]), Err(CryptoError::InvalidParameter));
        assert_eq!(ctx.finalize(&mut [0u8; 3]), Err(CryptoError::InvalidParameter));
    }
}
