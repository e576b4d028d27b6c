//! Counter mode (NIST SP 800-38A).
//!
//! Only the `m` low-order bits of the counter block take part in the
//! increment; carries never propagate beyond them and the field wraps
//! silently on overflow.

use super::check_buffers;
use crate::cipher::{BlockCipher, MAX_BLOCK_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::util::{xor_into, zeroize};

/// Increment the low `m_bytes` bytes of `t` as a big-endian integer
pub(crate) fn increment(t: &mut [u8], m_bytes: usize) {
    for byte in t.iter_mut().rev().take(m_bytes) {
        let (v, carry) = byte.overflowing_add(1);
        *byte = v;
        if !carry {
            break;
        }
    }
}

/// CTR encryption.
///
/// `m` is the counter field width in bits, a multiple of 8 no larger
/// than the block. `counter` holds the initial counter block and is left
/// holding the next unused one, so a stream may be processed in pieces
/// whose lengths are multiples of the block size.
pub fn encrypt<C: BlockCipher + ?Sized>(
    cipher: &C,
    m: usize,
    counter: &mut [u8],
    input: &[u8],
    output: &mut [u8],
) -> CryptoResult<()> {
    let block_size = check_buffers(cipher, counter, input, output)?;
    if m % 8 != 0 || m / 8 > block_size {
        return Err(CryptoError::InvalidParameter);
    }
    let m_bytes = m / 8;

    let mut o = [0u8; MAX_BLOCK_SIZE];
    for (p, c) in input.chunks(block_size).zip(output.chunks_mut(block_size)) {
        // O(j) = CIPH(T(j))
        cipher.encrypt_block(counter, &mut o[..block_size])?;
        // C(j) = P(j) XOR O(j)
        xor_into(c, p, &o);
        increment(counter, m_bytes);
    }
    zeroize(&mut o);
    Ok(())
}

/// CTR decryption, identical to encryption
pub fn decrypt<C: BlockCipher + ?Sized>(
    cipher: &C,
    m: usize,
    counter: &mut [u8],
    input: &[u8],
    output: &mut [u8],
) -> CryptoResult<()> {
    encrypt(cipher, m, counter, input, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::aes::Aes;
    use crate::cipher::tea::Tea;
    use crate::util::testing::{hex, XorShift};

    const KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c";

    #[test]
    fn test_sp800_38a_aes128() {
        let aes = Aes::new(&hex(KEY)).unwrap();
        let mut counter = hex("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff");
        let pt = hex(
            "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51",
        );
        let mut ct = vec![0u8; pt.len()];
        encrypt(&aes, 128, &mut counter, &pt, &mut ct).unwrap();
        assert_eq!(
            ct,
            hex("874d6191b620e3261bef6864990db6ce9806f66b7970fdff8617187bb9fffdff")
        );
        assert_eq!(counter, hex("f0f1f2f3f4f5f6f7f8f9fafbfcfdff01"));

        let mut counter = hex("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff");
        let mut back = vec![0u8; pt.len()];
        decrypt(&aes, 128, &mut counter, &ct, &mut back).unwrap();
        assert_eq!(back, pt);
    }

    #[test]
    fn test_counter_field_wraps() {
        let mut t = [0x11, 0xFF, 0xFF];
        increment(&mut t, 2);
        assert_eq!(t, [0x11, 0x00, 0x00]);

        let mut t = [0x00, 0x00, 0xFF];
        increment(&mut t, 0);
        assert_eq!(t, [0x00, 0x00, 0xFF]);
    }

    #[test]
    fn test_partial_final_block() {
        let tea = Tea::new(&[9u8; 16]).unwrap();
        let msg = [0x5Au8; 13];
        let mut ct = [0u8; 13];
        let mut back = [0u8; 13];
        encrypt(&tea, 64, &mut [0u8; 8], &msg, &mut ct).unwrap();
        decrypt(&tea, 64, &mut [0u8; 8], &ct, &mut back).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_round_trip_boundary_lengths() {
        let aes = Aes::new(&hex(KEY)).unwrap();
        let mut rng = XorShift(7);
        for len in [0usize, 1, 15, 16, 55] {
            let mut msg = vec![0u8; len];
            rng.fill(&mut msg);
            let mut iv = [0u8; 16];
            rng.fill(&mut iv);

            let mut ct = vec![0u8; len];
            let mut back = vec![0u8; len];
            encrypt(&aes, 64, &mut iv.clone(), &msg, &mut ct).unwrap();
            decrypt(&aes, 64, &mut iv.clone(), &ct, &mut back).unwrap();
            assert_eq!(back, msg, "len={len}");
        }
    }

    #[test]
    fn test_invalid_parameters() {
        let aes = Aes::new(&hex(KEY)).unwrap();
        let mut out = [0u8; 16];
        assert_eq!(
            encrypt(&aes, 12, &mut [0u8; 16], &[0u8; 16], &mut out),
            Err(CryptoError::InvalidParameter)
        );
        assert_eq!(
            encrypt(&aes, 136, &mut [0u8; 16], &[0u8; 16], &mut out),
            Err(CryptoError::InvalidParameter)
        );
        assert_eq!(
            encrypt(&aes, 32, &mut [0u8; 8], &[0u8; 16], &mut out),
            Err(CryptoError::InvalidParameter)
        );
        assert_eq!(
            encrypt(&aes, 32, &mut [0u8; 16], &[0u8; 17], &mut out),
            Err(CryptoError::InvalidLength)
        );
    }
}
