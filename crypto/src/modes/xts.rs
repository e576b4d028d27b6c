//! XEX-based tweaked-codebook mode with ciphertext stealing (IEEE 1619).
//!
//! Requires a cipher with a 16-byte block. The key is the concatenation
//! of the data key and the tweak key, of equal length.

use crate::cipher::{BlockCipher, CipherAlgo, CipherContext};
use crate::error::{CryptoError, CryptoResult};
use crate::util::{xor_in_place, zeroize};

/// XTS block size
pub const XTS_BLOCK_SIZE: usize = 16;

/// Tweak value, multiplied by `x` in GF(2^128) after every block.
#[derive(Clone, Copy)]
struct Tweak([u8; XTS_BLOCK_SIZE]);

impl Tweak {
    /// Multiply by x in GF(2^128), little-endian byte order
    fn mul_by_x(&mut self) {
        let mut carry = 0u8;

        for b in self.0.iter_mut() {
            let new_carry = *b >> 7;
            *b = (*b << 1) | carry;
            carry = new_carry;
        }

        if carry != 0 {
            self.0[0] ^= 0x87; // x^128 + x^7 + x^2 + x + 1
        }
    }
}

/// XTS context (data and tweak cipher contexts).
pub struct XtsContext {
    /// Data encryption key context
    data_ctx: CipherContext,
    /// Tweak encryption key context
    tweak_ctx: CipherContext,
}

impl XtsContext {
    /// Initialize from concatenated data and tweak keys
    pub fn new(algo: &CipherAlgo, key: &[u8]) -> CryptoResult<Self> {
        if algo.block_size != XTS_BLOCK_SIZE {
            return Err(CryptoError::InvalidParameter);
        }
        if key.is_empty() || key.len() % 2 != 0 {
            return Err(CryptoError::InvalidKeyLength);
        }
        let (k1, k2) = key.split_at(key.len() / 2);
        Ok(Self {
            data_ctx: algo.new_context(k1)?,
            tweak_ctx: algo.new_context(k2)?,
        })
    }

    fn initial_tweak(&self, tweak: &[u8; 16]) -> CryptoResult<Tweak> {
        let mut t = Tweak([0; 16]);
        self.tweak_ctx.encrypt_block(tweak, &mut t.0)?;
        Ok(t)
    }

    /// `out = E(input XOR t) XOR t`
    fn xex(
        &self,
        decrypt: bool,
        t: &Tweak,
        input: &[u8],
        out: &mut [u8; 16],
    ) -> CryptoResult<()> {
        let mut x = [0u8; 16];
        x.copy_from_slice(input);
        xor_in_place(&mut x, &t.0);
        if decrypt {
            self.data_ctx.decrypt_block(&x, out)?;
        } else {
            self.data_ctx.encrypt_block(&x, out)?;
        }
        xor_in_place(out, &t.0);
        zeroize(&mut x);
        Ok(())
    }

    fn check(input: &[u8], output: &[u8]) -> CryptoResult<()> {
        if input.len() < XTS_BLOCK_SIZE || output.len() < input.len() {
            return Err(CryptoError::InvalidLength);
        }
        Ok(())
    }

    /// Encrypt a data unit of at least 16 bytes
    pub fn encrypt(&self, tweak: &[u8; 16], input: &[u8], output: &mut [u8]) -> CryptoResult<()> {
        Self::check(input, output)?;
        let output = &mut output[..input.len()];
        let mut t = self.initial_tweak(tweak)?;

        let r = input.len() % XTS_BLOCK_SIZE;
        let full = input.len() / XTS_BLOCK_SIZE - usize::from(r != 0);
        let mut block = [0u8; 16];

        for j in 0..full {
            let range = j * 16..(j + 1) * 16;
            self.xex(false, &t, &input[range.clone()], &mut block)?;
            output[range].copy_from_slice(&block);
            t.mul_by_x();
        }

        if r != 0 {
            let last = full * 16;
            // CC = XEX(P[m-1]); C[m] = first r bytes of CC
            let mut cc = [0u8; 16];
            self.xex(false, &t, &input[last..last + 16], &mut cc)?;
            t.mul_by_x();

            // PP = P[m] || tail of CC
            let mut pp = cc;
            pp[..r].copy_from_slice(&input[last + 16..]);
            self.xex(false, &t, &pp, &mut block)?;

            output[last..last + 16].copy_from_slice(&block);
            output[last + 16..].copy_from_slice(&cc[..r]);
            zeroize(&mut cc);
            zeroize(&mut pp);
        }

        zeroize(&mut block);
        Ok(())
    }

    /// Decrypt a data unit of at least 16 bytes
    pub fn decrypt(&self, tweak: &[u8; 16], input: &[u8], output: &mut [u8]) -> CryptoResult<()> {
        Self::check(input, output)?;
        let output = &mut output[..input.len()];
        let mut t = self.initial_tweak(tweak)?;

        let r = input.len() % XTS_BLOCK_SIZE;
        let full = input.len() / XTS_BLOCK_SIZE - usize::from(r != 0);
        let mut block = [0u8; 16];

        for j in 0..full {
            let range = j * 16..(j + 1) * 16;
            self.xex(true, &t, &input[range.clone()], &mut block)?;
            output[range].copy_from_slice(&block);
            t.mul_by_x();
        }

        if r != 0 {
            let last = full * 16;
            // The stolen block was produced under the following tweak
            let mut t_next = t;
            t_next.mul_by_x();

            let mut pp = [0u8; 16];
            self.xex(true, &t_next, &input[last..last + 16], &mut pp)?;

            // CC = C[m] || tail of PP
            let mut cc = pp;
            cc[..r].copy_from_slice(&input[last + 16..]);
            self.xex(true, &t, &cc, &mut block)?;

            output[last..last + 16].copy_from_slice(&block);
            output[last + 16..].copy_from_slice(&pp[..r]);
            zeroize(&mut cc);
            zeroize(&mut pp);
        }

        zeroize(&mut block);
        Ok(())
    }
}

impl core::fmt::Debug for XtsContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("XtsContext")
            .field("data_ctx", &self.data_ctx)
            .finish_non_exhaustive()
    }
}
