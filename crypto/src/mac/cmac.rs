//! CMAC (NIST SP 800-38B, RFC 4493).
//!
//! Works with 64-bit and 128-bit block ciphers. Subkeys are derived by
//! doubling `L = E(0)` in GF(2^b).

use super::{check_mac_len, CbcMacState};
use crate::cipher::{BlockCipher, CipherAlgo, CipherContext, MAX_BLOCK_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::util::zeroize;

/// Reduction constant for the block size
fn rb(block_size: usize) -> Option<u8> {
    match block_size {
        8 => Some(0x1B),
        16 => Some(0x87),
        _ => None,
    }
}

/// Multiply by `x` in GF(2^b), big-endian bit order
fn dbl(block: &mut [u8], rb: u8) {
    let msb = block[0] >> 7;
    let mut carry = 0;
    for b in block.iter_mut().rev() {
        let next = *b >> 7;
        *b = (*b << 1) | carry;
        carry = next;
    }
    // Constant-time conditional reduction
    let last = block.len() - 1;
    block[last] ^= rb & 0u8.wrapping_sub(msb);
}

/// CMAC context.
pub struct Cmac {
    cipher: CipherContext,
    k1: [u8; MAX_BLOCK_SIZE],
    k2: [u8; MAX_BLOCK_SIZE],
    state: CbcMacState,
}

impl Cmac {
    /// Key the cipher and derive `K1`/`K2`
    pub fn new(algo: &CipherAlgo, key: &[u8]) -> CryptoResult<Self> {
        rb(algo.block_size).ok_or(CryptoError::InvalidParameter)?;
        Self::with_cipher(algo.new_context(key)?)
    }

    /// Use an already keyed cipher
    pub fn with_cipher(cipher: CipherContext) -> CryptoResult<Self> {
        let bs = cipher.block_size();
        let rb = rb(bs).ok_or(CryptoError::InvalidParameter)?;

        let mut k1 = [0u8; MAX_BLOCK_SIZE];
        let mut k2 = [0u8; MAX_BLOCK_SIZE];
        cipher.encrypt_block(&[0u8; MAX_BLOCK_SIZE][..bs], &mut k1[..bs])?;
        dbl(&mut k1[..bs], rb);
        k2[..bs].copy_from_slice(&k1[..bs]);
        dbl(&mut k2[..bs], rb);

        Ok(Self {
            cipher,
            k1,
            k2,
            state: CbcMacState::new(bs),
        })
    }

    /// Native tag size
    pub fn mac_size(&self) -> usize {
        self.cipher.block_size()
    }

    /// Discard buffered input, keeping the subkeys
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Absorb message bytes
    pub fn update(&mut self, data: &[u8]) -> CryptoResult<()> {
        self.state.update(&self.cipher, data)
    }

    /// Write the tag, truncated to `mac.len()`, and reset.
    ///
    /// `mac` must be between 1 and the block size long.
    pub fn finalize(&mut self, mac: &mut [u8]) -> CryptoResult<()> {
        let bs = self.mac_size();
        check_mac_len(mac.len(), 1, bs)?;

        let mut tag = [0u8; MAX_BLOCK_SIZE];
        self.state
            .finish(&self.cipher, &self.k1[..bs], &self.k2[..bs], &mut tag)?;
        mac.copy_from_slice(&tag[..mac.len()]);
        zeroize(&mut tag);
        Ok(())
    }

    /// CMAC of `data` in one call
    pub fn compute(algo: &CipherAlgo, key: &[u8], data: &[u8], mac: &mut [u8]) -> CryptoResult<()> {
        let mut ctx = Self::new(algo, key)?;
        ctx.update(data)?;
        ctx.finalize(mac)
    }
}

impl Drop for Cmac {
    fn drop(&mut self) {
        zeroize(&mut self.k1);
        zeroize(&mut self.k2);
    }
}

impl core::fmt::Debug for Cmac {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cmac")
            .field("cipher", &self.cipher)
            .finish_non_exhaustive()
    }
}
