//! Cipher feedback mode (NIST SP 800-38A).
//!
//! `s` is the segment size in bits, a multiple of 8 between 8 and the
//! cipher block size. The IV buffer is updated in place and carries the
//! chaining state between calls.

use super::check_buffers;
use crate::cipher::{BlockCipher, MAX_BLOCK_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::util::{xor_into, zeroize};

fn segment_bytes(s: usize, block_size: usize) -> CryptoResult<usize> {
    if s % 8 != 0 || s == 0 || s / 8 > block_size {
        return Err(CryptoError::InvalidParameter);
    }
    Ok(s / 8)
}

/// Shift the feedback register left by `s` bytes and append `segment`
fn shift_in(iv: &mut [u8], s: usize, segment: &[u8]) {
    let block_size = iv.len();
    iv.copy_within(s.., 0);
    iv[block_size - s..block_size - s + segment.len()].copy_from_slice(segment);
}

/// CFB encryption
pub fn encrypt<C: BlockCipher + ?Sized>(
    cipher: &C,
    s: usize,
    iv: &mut [u8],
    input: &[u8],
    output: &mut [u8],
) -> CryptoResult<()> {
    let block_size = check_buffers(cipher, iv, input, output)?;
    let s = segment_bytes(s, block_size)?;

    let mut o = [0u8; MAX_BLOCK_SIZE];
    for (p, c) in input.chunks(s).zip(output.chunks_mut(s)) {
        cipher.encrypt_block(iv, &mut o[..block_size])?;
        let n = p.len();
        xor_into(&mut c[..n], p, &o);
        shift_in(iv, s, &c[..n]);
    }
    zeroize(&mut o);
    Ok(())
}

/// CFB decryption
pub fn decrypt<C: BlockCipher + ?Sized>(
    cipher: &C,
    s: usize,
    iv: &mut [u8],
    input: &[u8],
    output: &mut [u8],
) -> CryptoResult<()> {
    let block_size = check_buffers(cipher, iv, input, output)?;
    let s = segment_bytes(s, block_size)?;

    let mut o = [0u8; MAX_BLOCK_SIZE];
    for (c, p) in input.chunks(s).zip(output.chunks_mut(s)) {
        cipher.encrypt_block(iv, &mut o[..block_size])?;
        shift_in(iv, s, c);
        xor_into(&mut p[..c.len()], c, &o);
    }
    zeroize(&mut o);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::aes::Aes;
    use crate::cipher::cast128::Cast128;
    use crate::util::testing::hex;

    fn aes() -> Aes {
        Aes::new(&hex("2b7e151628aed2a6abf7158809cf4f3c")).unwrap()
    }

    const IV: &str = "000102030405060708090a0b0c0d0e0f";

    #[test]
    fn test_cfb128_aes128() {
        let pt = hex("6bc1bee22e409f96e93d7e117393172a");
        let mut ct = [0u8; 16];
        let mut iv = hex(IV);
        encrypt(&aes(), 128, &mut iv, &pt, &mut ct).unwrap();
        assert_eq!(ct.to_vec(), hex("3b3fd92eb72dad20333449f8e83cfb4a"));
        // Next IV is the ciphertext block
        assert_eq!(iv, ct.to_vec());
    }

    #[test]
    fn test_cfb8_aes128() {
        let pt = hex("6bc1bee22e409f96e93d7e117393172aae2d");
        let expected = hex("3b79424c9c0dd436bace9e0ed4586a4f32b9");
        let mut ct = vec![0u8; pt.len()];
        encrypt(&aes(), 8, &mut hex(IV), &pt, &mut ct).unwrap();
        assert_eq!(ct, expected);

        let mut back = vec![0u8; pt.len()];
        decrypt(&aes(), 8, &mut hex(IV), &ct, &mut back).unwrap();
        assert_eq!(back, pt);
    }

    #[test]
    fn test_round_trip_split_calls() {
        let cast = Cast128::new(&[0x42u8; 16]).unwrap();
        let msg: Vec<u8> = (0..50u8).collect();

        let mut whole = vec![0u8; 50];
        encrypt(&cast, 32, &mut [7u8; 8], &msg, &mut whole).unwrap();

        // Segment-aligned pieces give the same stream
        let mut iv = [7u8; 8];
        let mut pieces = vec![0u8; 50];
        encrypt(&cast, 32, &mut iv, &msg[..20], &mut pieces[..20]).unwrap();
        encrypt(&cast, 32, &mut iv, &msg[20..], &mut pieces[20..]).unwrap();
        assert_eq!(pieces, whole);

        let mut back = vec![0u8; 50];
        decrypt(&cast, 32, &mut [7u8; 8], &whole, &mut back).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_invalid_segment() {
        let mut out = [0u8; 16];
        for s in [0, 12, 136] {
            assert_eq!(
                encrypt(&aes(), s, &mut hex(IV), &[0u8; 16], &mut out),
                Err(CryptoError::InvalidParameter)
            );
        }
    }
}
