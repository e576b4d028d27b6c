//! # Message Authentication Codes
//!
//! Keyed MACs over the block ciphers and hashes of this crate.
//!
//! - CMAC (NIST SP 800-38B) for 64- and 128-bit block ciphers
//! - XCBC-MAC (RFC 3566) for 128-bit block ciphers
//! - GMAC (NIST SP 800-38D) for 128-bit block ciphers
//! - HMAC (RFC 2104) over any registered hash
//! - KMAC128/KMAC256 (NIST SP 800-185) over the Keccak sponge
//!
//! Every context follows the same life cycle: `new` derives subkeys once,
//! `update` may be called any number of times, and `finalize` writes a tag
//! truncated to the length of the output slice. Contexts are wiped on drop.

pub mod cmac;
pub mod gmac;
pub mod hmac;
pub mod kmac;
pub mod xcbc_mac;

use crate::cipher::{BlockCipher, MAX_BLOCK_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::util::{xor_in_place, zeroize};

/// Reject tag lengths outside `min..=max`
pub(crate) fn check_mac_len(len: usize, min: usize, max: usize) -> CryptoResult<()> {
    if len < min || len > max {
        return Err(CryptoError::InvalidParameter);
    }
    Ok(())
}

// ============================================================================
// CBC-MAC core
// ============================================================================

/// CBC chaining value plus a buffer that always holds the last, possibly
/// complete, block so the final block can be masked before encryption.
pub(crate) struct CbcMacState {
    c: [u8; MAX_BLOCK_SIZE],
    buffer: [u8; MAX_BLOCK_SIZE],
    buf_len: usize,
    block_size: usize,
}

impl CbcMacState {
    pub(crate) const fn new(block_size: usize) -> Self {
        Self {
            c: [0; MAX_BLOCK_SIZE],
            buffer: [0; MAX_BLOCK_SIZE],
            buf_len: 0,
            block_size,
        }
    }

    pub(crate) fn reset(&mut self) {
        zeroize(&mut self.c);
        zeroize(&mut self.buffer);
        self.buf_len = 0;
    }

    /// `C = E(C XOR block)` over the buffered block
    fn chain<C: BlockCipher + ?Sized>(&mut self, cipher: &C) -> CryptoResult<()> {
        let bs = self.block_size;
        xor_in_place(&mut self.c[..bs], &self.buffer[..bs]);
        let input = self.c;
        cipher.encrypt_block(&input[..bs], &mut self.c[..bs])
    }

    pub(crate) fn update<C: BlockCipher + ?Sized>(
        &mut self,
        cipher: &C,
        data: &[u8],
    ) -> CryptoResult<()> {
        let bs = self.block_size;
        let mut data = data;
        while !data.is_empty() {
            // A full buffer is only processed once more data shows up
            if self.buf_len == bs {
                self.chain(cipher)?;
                self.buf_len = 0;
            }
            let n = core::cmp::min(bs - self.buf_len, data.len());
            self.buffer[self.buf_len..self.buf_len + n].copy_from_slice(&data[..n]);
            self.buf_len += n;
            data = &data[n..];
        }
        Ok(())
    }

    /// Mask the last block with `full` if it is complete, otherwise pad it
    /// with `10*` and mask with `partial`, then encrypt into `tag`
    pub(crate) fn finish<C: BlockCipher + ?Sized>(
        &mut self,
        cipher: &C,
        full: &[u8],
        partial: &[u8],
        tag: &mut [u8],
    ) -> CryptoResult<()> {
        let bs = self.block_size;
        if self.buf_len == bs {
            xor_in_place(&mut self.buffer[..bs], full);
        } else {
            self.buffer[self.buf_len] = 0x80;
            self.buffer[self.buf_len + 1..bs].fill(0);
            xor_in_place(&mut self.buffer[..bs], partial);
        }
        self.chain(cipher)?;
        tag[..bs].copy_from_slice(&self.c[..bs]);
        self.reset();
        Ok(())
    }
}

impl Drop for CbcMacState {
    fn drop(&mut self) {
        self.reset();
    }
}
