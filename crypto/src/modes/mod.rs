//! # Cipher Modes
//!
//! Chaining and counter disciplines over any [`BlockCipher`].
//!
//! - CTR with an `m`-bit counter field
//! - CFB with `s`-bit segments
//! - XTS with ciphertext stealing
//! - GCM authenticated encryption
//!
//! [`BlockCipher`]: crate::cipher::BlockCipher

pub mod cfb;
pub mod ctr;
pub mod gcm;
pub(crate) mod ghash;
pub mod xts;

use crate::cipher::{BlockCipher, MAX_BLOCK_SIZE};
use crate::error::{CryptoError, CryptoResult};

/// Validate a mode's block size, IV length and buffer lengths
pub(crate) fn check_buffers<C: BlockCipher + ?Sized>(
    cipher: &C,
    iv: &[u8],
    input: &[u8],
    output: &[u8],
) -> CryptoResult<usize> {
    let block_size = cipher.block_size();
    if block_size == 0 || block_size > MAX_BLOCK_SIZE || iv.len() != block_size {
        return Err(CryptoError::InvalidParameter);
    }
    if output.len() < input.len() {
        return Err(CryptoError::InvalidLength);
    }
    Ok(block_size)
}
