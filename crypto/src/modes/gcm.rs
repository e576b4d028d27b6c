//! Galois/Counter Mode (NIST SP 800-38D).
//!
//! Requires a cipher with a 16-byte block. Tags of 4 to 16 bytes are
//! accepted. Decryption checks the tag before any plaintext is written.

use super::ctr;
use super::ghash::{pre_counter_block, GHash, GHashKey};
use crate::cipher::{BlockCipher, CipherAlgo, CipherContext};
use crate::error::{CryptoError, CryptoResult};
use crate::util::{ct_eq, xor_in_place, zeroize};

/// GCM block size
pub const GCM_BLOCK_SIZE: usize = 16;

/// Shortest accepted tag
pub const GCM_MIN_TAG_SIZE: usize = 4;

/// Longest tag
pub const GCM_MAX_TAG_SIZE: usize = 16;

/// Longest plaintext, `2^32 - 2` blocks before the 32-bit counter wraps
pub const GCM_MAX_TEXT_SIZE: u64 = (u32::MAX as u64 - 1) * GCM_BLOCK_SIZE as u64;

/// GCM context.
pub struct GcmContext {
    cipher: CipherContext,
    key: GHashKey,
}

impl GcmContext {
    /// Expand `key` and derive the hash subkey `H = E(0^128)`
    pub fn new(algo: &CipherAlgo, key: &[u8]) -> CryptoResult<Self> {
        if algo.block_size != GCM_BLOCK_SIZE {
            return Err(CryptoError::InvalidParameter);
        }
        let cipher = algo.new_context(key)?;
        Self::with_cipher(cipher)
    }

    /// Wrap an already keyed 16-byte block cipher
    pub fn with_cipher(cipher: CipherContext) -> CryptoResult<Self> {
        if cipher.block_size() != GCM_BLOCK_SIZE {
            return Err(CryptoError::InvalidParameter);
        }
        let mut h = [0u8; 16];
        cipher.encrypt_block(&[0u8; 16], &mut h)?;
        let key = GHashKey::new(&h);
        zeroize(&mut h);
        Ok(Self { cipher, key })
    }

    fn check(iv: &[u8], tag_len: usize) -> CryptoResult<()> {
        if iv.is_empty() || !(GCM_MIN_TAG_SIZE..=GCM_MAX_TAG_SIZE).contains(&tag_len) {
            return Err(CryptoError::InvalidParameter);
        }
        Ok(())
    }

    fn check_text_len(input_len: u64, output_len: u64) -> CryptoResult<()> {
        if input_len > GCM_MAX_TEXT_SIZE || output_len < input_len {
            return Err(CryptoError::InvalidLength);
        }
        Ok(())
    }

    /// `T = MSB_t(E(J0) XOR GHASH(A, C))`
    fn compute_tag(&self, j0: &[u8; 16], aad: &[u8], c: &[u8], tag: &mut [u8]) -> CryptoResult<()> {
        let mut g = GHash::new();
        g.update(&self.key, aad);
        g.pad(&self.key);
        g.update(&self.key, c);
        let mut s = g.finish(&self.key, aad.len() as u64, c.len() as u64);

        let mut ek = [0u8; 16];
        self.cipher.encrypt_block(j0, &mut ek)?;
        xor_in_place(&mut s, &ek);
        tag.copy_from_slice(&s[..tag.len()]);

        zeroize(&mut s);
        zeroize(&mut ek);
        Ok(())
    }

    /// GCTR starting from `inc32(J0)`
    fn gctr(&self, j0: &[u8; 16], input: &[u8], output: &mut [u8]) -> CryptoResult<()> {
        let mut counter = *j0;
        ctr::increment(&mut counter, 4);
        ctr::encrypt(&self.cipher, 32, &mut counter, input, output)
    }

    /// Authenticated encryption
    pub fn encrypt(
        &self,
        iv: &[u8],
        aad: &[u8],
        input: &[u8],
        output: &mut [u8],
        tag: &mut [u8],
    ) -> CryptoResult<()> {
        Self::check(iv, tag.len())?;
        Self::check_text_len(input.len() as u64, output.len() as u64)?;
        let output = &mut output[..input.len()];

        let j0 = pre_counter_block(&self.key, iv);
        self.gctr(&j0, input, output)?;
        self.compute_tag(&j0, aad, output, tag)
    }

    /// Authenticated decryption.
    ///
    /// Fails with [`CryptoError::AuthenticationFailed`] when the tag does
    /// not match, in which case `output` is zero-filled.
    pub fn decrypt(
        &self,
        iv: &[u8],
        aad: &[u8],
        input: &[u8],
        output: &mut [u8],
        tag: &[u8],
    ) -> CryptoResult<()> {
        Self::check(iv, tag.len())?;
        Self::check_text_len(input.len() as u64, output.len() as u64)?;
        let output = &mut output[..input.len()];

        let j0 = pre_counter_block(&self.key, iv);
        let mut expected = [0u8; GCM_MAX_TAG_SIZE];
        self.compute_tag(&j0, aad, input, &mut expected[..tag.len()])?;

        let ok = ct_eq(&expected[..tag.len()], tag);
        zeroize(&mut expected);
        if !ok {
            log::debug!("GCM tag mismatch");
            zeroize(output);
            return Err(CryptoError::AuthenticationFailed);
        }

        self.gctr(&j0, input, output)
    }
}

impl core::fmt::Debug for GcmContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GcmContext")
            .field("cipher", &self.cipher)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::{aes::AES_CIPHER_ALGO, tea::TEA_CIPHER_ALGO, twofish::TWOFISH_CIPHER_ALGO};
    use crate::util::testing::hex;

    const K: &str = "feffe9928665731c6d6a8f9467308308";
    const P: &str = "d9313225f88406e5a55909c5aff5269a86a7a9531534f7da2e4c303d8a318a72\
                     1c3c0c95956809532fcf0e2449a6b525b16aedf5aa0de657ba637b39";
    const A: &str = "feedfacedeadbeeffeedfacedeadbeefabaddad2";

    fn seal(key: &str, iv: &str, aad: &str, pt: &str) -> (Vec<u8>, Vec<u8>) {
        let gcm = GcmContext::new(&AES_CIPHER_ALGO, &hex(key)).unwrap();
        let pt = hex(pt);
        let mut ct = vec![0u8; pt.len()];
        let mut tag = [0u8; 16];
        gcm.encrypt(&hex(iv), &hex(aad), &pt, &mut ct, &mut tag).unwrap();
        (ct, tag.to_vec())
    }

    #[test]
    fn test_gcm_spec_cases() {
        // Test case 1: empty everything
        let (ct, tag) = seal("00000000000000000000000000000000", "000000000000000000000000", "", "");
        assert!(ct.is_empty());
        assert_eq!(tag, hex("58e2fccefa7e3061367f1d57a4e7455a"));

        // Test case 2
        let (ct, tag) = seal(
            "00000000000000000000000000000000",
            "000000000000000000000000",
            "",
            "00000000000000000000000000000000",
        );
        assert_eq!(ct, hex("0388dace60b6a392f328c2b971b2fe78"));
        assert_eq!(tag, hex("ab6e47d42cec13bdf53a67b21257bddf"));

        // Test case 4: AAD and a partial final block
        let (ct, tag) = seal(K, "cafebabefacedbaddecaf888", A, P);
        assert_eq!(
            ct,
            hex("42831ec2217774244b7221b784d0d49ce3aa212f2c02a4e035c17e2329aca12e\
                 21d514b25466931c7d8f6a5aac84aa051ba30b396a0aac973d58e091")
        );
        assert_eq!(tag, hex("5bc94fbc3221a5db94fae95ae7121a47"));
    }

    #[test]
    fn test_long_iv() {
        // Test case 6: 60-byte IV goes through GHASH
        let iv = "9313225df88406e555909c5aff5269aa6a7a9538534f7da1e4c303d2a318a728\
                  c3c0c95156809539fcf0e2429a6b525416aedbf5a0de6a57a637b39b";
        let (ct, tag) = seal(K, iv, A, P);
        assert_eq!(
            ct,
            hex("8ce24998625615b603a033aca13fb894be9112a5c3a211a8ba262a3cca7e2ca7\
                 01e4a9a4fba43c90ccdcb281d48c7c6fd62875d2aca417034c34aee5")
        );
        assert_eq!(tag, hex("619cc5aefffe0bfa462af43c1699d050"));
    }

    #[test]
    fn test_decrypt_verifies_tag() {
        let gcm = GcmContext::new(&AES_CIPHER_ALGO, &hex(K)).unwrap();
        let iv = hex("cafebabefacedbaddecaf888");
        let (ct, tag) = seal(K, "cafebabefacedbaddecaf888", A, P);

        let mut pt = vec![0u8; ct.len()];
        gcm.decrypt(&iv, &hex(A), &ct, &mut pt, &tag).unwrap();
        assert_eq!(pt, hex(P));

        // Truncated tags are accepted
        gcm.decrypt(&iv, &hex(A), &ct, &mut pt, &tag[..12]).unwrap();

        let mut bad = tag.clone();
        bad[15] ^= 1;
        let mut out = vec![0xAAu8; ct.len()];
        assert_eq!(
            gcm.decrypt(&iv, &hex(A), &ct, &mut out, &bad),
            Err(CryptoError::AuthenticationFailed)
        );
        assert!(out.iter().all(|&b| b == 0));

        let mut ct2 = ct.clone();
        ct2[0] ^= 0x80;
        assert_eq!(
            gcm.decrypt(&iv, &hex(A), &ct2, &mut out, &tag),
            Err(CryptoError::AuthenticationFailed)
        );
    }

    #[test]
    fn test_other_wide_cipher() {
        let gcm = GcmContext::new(&TWOFISH_CIPHER_ALGO, &[3u8; 32]).unwrap();
        let msg = b"twofish under galois counter mode";
        let mut ct = [0u8; 33];
        let mut tag = [0u8; 8];
        gcm.encrypt(b"nonce", b"hdr", msg, &mut ct, &mut tag).unwrap();
        let mut back = [0u8; 33];
        gcm.decrypt(b"nonce", b"hdr", &ct, &mut back, &tag).unwrap();
        assert_eq!(&back, msg);
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            GcmContext::new(&TEA_CIPHER_ALGO, &[0u8; 16]).err(),
            Some(CryptoError::InvalidParameter)
        );
        let gcm = GcmContext::new(&AES_CIPHER_ALGO, &[0u8; 16]).unwrap();
        let mut out = [0u8; 4];
        assert_eq!(
            gcm.encrypt(&[], &[], &[0u8; 4], &mut out, &mut [0u8; 16]),
            Err(CryptoError::InvalidParameter)
        );
        assert_eq!(
            gcm.encrypt(&[0u8; 12], &[], &[0u8; 4], &mut out, &mut [0u8; 3]),
            Err(CryptoError::InvalidParameter)
        );
        assert_eq!(
            gcm.encrypt(&[0u8; 12], &[], &[0u8; 4], &mut out, &mut [0u8; 17]),
            Err(CryptoError::InvalidParameter)
        );
    }

    #[test]
    fn test_text_length_limit() {
        assert_eq!(GCM_MAX_TEXT_SIZE, 0xF_FFFF_FFE0);
        assert!(GcmContext::check_text_len(GCM_MAX_TEXT_SIZE, GCM_MAX_TEXT_SIZE).is_ok());
        assert_eq!(
            GcmContext::check_text_len(GCM_MAX_TEXT_SIZE + 1, u64::MAX),
            Err(CryptoError::InvalidLength)
        );
        assert_eq!(GcmContext::check_text_len(17, 16), Err(CryptoError::InvalidLength));

        let gcm = GcmContext::new(&AES_CIPHER_ALGO, &[0u8; 16]).unwrap();
        let mut tag = [0u8; 16];
        assert_eq!(
            gcm.encrypt(&[0u8; 12], &[], &[0u8; 32], &mut [0u8; 31], &mut tag),
            Err(CryptoError::InvalidLength)
        );
        assert_eq!(
            gcm.decrypt(&[0u8; 12], &[], &[0u8; 32], &mut [0u8; 31], &tag),
            Err(CryptoError::InvalidLength)
        );
    }
}
