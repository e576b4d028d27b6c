//! KMAC128 and KMAC256 (NIST SP 800-185).
//!
//! Keyed cSHAKE under the function name `"KMAC"`. The requested tag
//! length is absorbed before squeezing, so a short tag is not a prefix of
//! a longer one over the same message.

use super::check_mac_len;
use crate::error::{CryptoError, CryptoResult};
use crate::hash::keccak::{right_encode, Keccak, CSHAKE128_RATE, CSHAKE256_RATE};

/// KMAC128 OID (2.16.840.1.101.3.4.2.19)
pub const KMAC128_OID: [u8; 9] = [0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x13];

/// KMAC256 OID (2.16.840.1.101.3.4.2.20)
pub const KMAC256_OID: [u8; 9] = [0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x14];

/// Longest tag, so that its length in bits still fits a `usize`
pub const KMAC_MAX_MAC_SIZE: usize = usize::MAX / 8;

/// Function name string fed to cSHAKE
const FUNCTION_NAME: &[u8] = b"KMAC";

/// KMAC context.
///
/// Both sponge states wipe themselves on drop.
#[derive(Clone)]
pub struct Kmac {
    strength: usize,
    /// State right after the key block, restored by `reset`
    keyed: Keccak,
    sponge: Keccak,
}

impl Kmac {
    /// Absorb the customization string and the padded key.
    ///
    /// `strength` selects KMAC128 or KMAC256 and must be 128 or 256.
    pub fn new(strength: usize, key: &[u8], custom: &[u8]) -> CryptoResult<Self> {
        let rate = match strength {
            128 => CSHAKE128_RATE,
            256 => CSHAKE256_RATE,
            _ => return Err(CryptoError::InvalidParameter),
        };

        let mut keyed = Keccak::cshake(rate, FUNCTION_NAME, custom);
        keyed.absorb_bytepad(&[key]);

        Ok(Self {
            strength,
            sponge: keyed.clone(),
            keyed,
        })
    }

    /// Security strength in bits
    pub fn strength(&self) -> usize {
        self.strength
    }

    /// OID of the variant in use
    pub fn oid(&self) -> &'static [u8] {
        if self.strength == 128 {
            &KMAC128_OID
        } else {
            &KMAC256_OID
        }
    }

    /// Default tag size, twice the security strength
    pub fn mac_size(&self) -> usize {
        self.strength / 4
    }

    /// Discard absorbed message bytes, keeping the key
    pub fn reset(&mut self) {
        self.sponge.clone_from(&self.keyed);
    }

    /// Absorb message bytes
    pub fn update(&mut self, data: &[u8]) {
        self.sponge.absorb(data);
    }

    /// Write a tag of exactly `mac.len()` bytes and reset.
    ///
    /// Any length from 1 to [`KMAC_MAX_MAC_SIZE`] is accepted.
    pub fn finalize(&mut self, mac: &mut [u8]) -> CryptoResult<()> {
        check_mac_len(mac.len(), 1, KMAC_MAX_MAC_SIZE)?;

        let (encoded, len) = right_encode(mac.len() as u64 * 8);
        self.sponge.absorb(&encoded[..len]);
        self.sponge.finish_cshake(mac);
        self.reset();
        Ok(())
    }

    /// KMAC of `data` in one call
    pub fn compute(
        strength: usize,
        key: &[u8],
        data: &[u8],
        custom: &[u8],
        mac: &mut [u8],
    ) -> CryptoResult<()> {
        let mut ctx = Self::new(strength, key, custom)?;
        ctx.update(data);
        ctx.finalize(mac)
    }
}

impl core::fmt::Debug for Kmac {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Kmac")
            .field("strength", &self.strength)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::hex;

    const TAGGED: &[u8] = b"My Tagged Application";

    fn key() -> Vec<u8> {
        (0x40u8..0x60).collect()
    }

    fn kmac(strength: usize, data: &[u8], custom: &[u8], len: usize) -> Vec<u8> {
        let mut mac = vec![0u8; len];
        Kmac::compute(strength, &key(), data, custom, &mut mac).unwrap();
        mac
    }

    #[test]
    fn test_kmac128_samples() {
        assert_eq!(
            kmac(128, &[0, 1, 2, 3], b"", 32),
            hex("e5780b0d3ea6f7d3a429c5706aa43a00fadbd7d49628839e3187243f456ee14e")
        );
        assert_eq!(
            kmac(128, &[0, 1, 2, 3], TAGGED, 32),
            hex("3b1fba963cd8b0b59e8c1a6d71888b7143651af8ba0a7070c0979e2811324aa5")
        );
        let data: Vec<u8> = (0u8..200).collect();
        assert_eq!(
            kmac(128, &data, TAGGED, 32),
            hex("1f5b4e6cca02209e0dcb5ca635b89a15e271ecc760071dfd805faa38f9729230")
        );
    }

    #[test]
    fn test_kmac256_samples() {
        assert_eq!(
            kmac(256, &[0, 1, 2, 3], TAGGED, 64),
            hex(
                "20c570c31346f703c9ac36c61c03cb64c3970d0cfc787e9b79599d273a68d2f7
                 f69d4cc3de9d104a351689f27cf6f5951f0103f33f4f24871024d9c27773a8dd"
            )
        );
        let data: Vec<u8> = (0u8..200).collect();
        assert_eq!(
            kmac(256, &data, b"", 64),
            hex(
                "75358cf39e41494e949707927cee0af20a3ff553904c86b08f21cc414bcfd691
                 589d27cf5e15369cbbff8b9a4c2eb17800855d0235ff635da82533ec6b759b69"
            )
        );
        assert_eq!(
            kmac(256, &data, TAGGED, 64),
            hex(
                "b58618f71f92e1d56c1b8c55ddd7cd188b97b4ca4d99831eb2699a837da2e4d9
                 70fbacfde50033aea585f1a2708510c32d07880801bd182898fe476876fc8965"
            )
        );
    }

    #[test]
    fn test_chunked_update_and_reuse() {
        let data: Vec<u8> = (0u8..200).collect();
        let mut ctx = Kmac::new(128, &key(), TAGGED).unwrap();
        assert_eq!(ctx.mac_size(), 32);
        assert_eq!(ctx.oid(), &KMAC128_OID[..]);
        for chunk in data.chunks(17) {
            ctx.update(chunk);
        }
        let mut mac = [0u8; 32];
        ctx.finalize(&mut mac).unwrap();
        assert_eq!(mac.to_vec(), kmac(128, &data, TAGGED, 32));

        // finalize leaves the context keyed for the next message
        ctx.update(&[0, 1, 2, 3]);
        ctx.finalize(&mut mac).unwrap();
        assert_eq!(mac.to_vec(), kmac(128, &[0, 1, 2, 3], TAGGED, 32));
    }

    #[test]
    fn test_length_is_bound() {
        let long = kmac(256, b"message", b"", 64);
        let short = kmac(256, b"message", b"", 32);
        assert_ne!(&long[..32], &short[..]);

        // Output longer than one cSHAKE128 block
        assert_eq!(kmac(128, b"message", b"", 200).len(), 200);
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(Kmac::new(192, &key(), b"").err(), Some(CryptoError::InvalidParameter));
        let mut ctx = Kmac::new(256, &key(), b"").unwrap();
        assert_eq!(ctx.oid(), &KMAC256_OID[..]);
        assert_eq!(ctx.finalize(&mut []), Err(CryptoError::InvalidParameter));
    }
}
