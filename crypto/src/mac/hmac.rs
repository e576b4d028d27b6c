//! HMAC (RFC 2104) over any [`HashAlgo`].
//!
//! The inner and outer hash states after absorbing the padded key are kept,
//! so each message costs only the data blocks plus two finalizations.

use super::check_mac_len;
use crate::error::CryptoResult;
use crate::hash::{HashAlgo, HashContext, HashFunction, MAX_DIGEST_SIZE, MAX_HASH_BLOCK_SIZE};
use crate::util::zeroize;

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5C;

/// HMAC context.
#[derive(Clone)]
pub struct Hmac {
    algo: &'static HashAlgo,
    /// State after `K0 ^ ipad`
    inner: HashContext,
    /// State after `K0 ^ opad`
    outer: HashContext,
    /// Running inner hash
    ctx: HashContext,
}

impl Hmac {
    /// Key an HMAC; keys longer than the hash block are hashed first
    pub fn new(algo: &'static HashAlgo, key: &[u8]) -> CryptoResult<Self> {
        let bs = algo.block_size;

        let mut k0 = [0u8; MAX_HASH_BLOCK_SIZE];
        if key.len() > bs {
            algo.compute(key, &mut k0[..algo.digest_size])?;
        } else {
            k0[..key.len()].copy_from_slice(key);
        }

        let mut pad = [0u8; MAX_HASH_BLOCK_SIZE];
        for (p, k) in pad.iter_mut().zip(&k0[..bs]) {
            *p = k ^ IPAD;
        }
        let mut inner = algo.new_context();
        inner.update(&pad[..bs]);

        for (p, k) in pad.iter_mut().zip(&k0[..bs]) {
            *p = k ^ OPAD;
        }
        let mut outer = algo.new_context();
        outer.update(&pad[..bs]);

        zeroize(&mut k0);
        zeroize(&mut pad);

        Ok(Self {
            algo,
            ctx: inner.clone(),
            inner,
            outer,
        })
    }

    /// Underlying hash
    pub fn algo(&self) -> &'static HashAlgo {
        self.algo
    }

    /// Native tag size
    pub fn mac_size(&self) -> usize {
        self.algo.digest_size
    }

    /// Restart with the same key
    pub fn reset(&mut self) {
        self.ctx = self.inner.clone();
    }

    /// Absorb message bytes
    pub fn update(&mut self, data: &[u8]) {
        self.ctx.update(data);
    }

    /// Write the tag truncated to `mac.len()` and reset
    pub fn finalize(&mut self, mac: &mut [u8]) -> CryptoResult<()> {
        let ds = self.algo.digest_size;
        check_mac_len(mac.len(), 1, ds)?;

        let mut digest = [0u8; MAX_DIGEST_SIZE];
        self.ctx.finalize(&mut digest[..ds])?;

        let mut outer = self.outer.clone();
        outer.update(&digest[..ds]);
        outer.finalize(&mut digest[..ds])?;
        mac.copy_from_slice(&digest[..mac.len()]);

        zeroize(&mut digest);
        self.reset();
        Ok(())
    }

    /// HMAC of `data` in one call
    pub fn compute(
        algo: &'static HashAlgo,
        key: &[u8],
        data: &[u8],
        mac: &mut [u8],
    ) -> CryptoResult<()> {
        let mut ctx = Self::new(algo, key)?;
        ctx.update(data);
        ctx.finalize(mac)
    }
}

impl core::fmt::Debug for Hmac {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Hmac({})", self.algo.name)
    }
}
