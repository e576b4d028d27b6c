//! Concat KDF (NIST SP 800-56A, section 5.8.1).
//!
//! `dk = H(1 || Z || OtherInfo) || H(2 || Z || OtherInfo) || ...`, with a
//! 32-bit big-endian counter, truncated to the requested length.

use crate::error::{CryptoError, CryptoResult};
use crate::hash::{HashAlgo, HashFunction, MAX_DIGEST_SIZE};
use crate::util::zeroize;

/// Derive `dk.len()` bytes from the shared secret `z`.
///
/// Only the first `other_info_len` bytes of `other_info` are used. A
/// missing `other_info` with a non-zero length, or a length beyond the
/// slice, is rejected.
pub fn concat_kdf(
    hash: &HashAlgo,
    z: &[u8],
    other_info: Option<&[u8]>,
    other_info_len: usize,
    dk: &mut [u8],
) -> CryptoResult<()> {
    let other_info = match other_info {
        Some(info) if other_info_len <= info.len() => &info[..other_info_len],
        None if other_info_len == 0 => &[][..],
        _ => return Err(CryptoError::InvalidParameter),
    };

    let ds = hash.digest_size;
    if dk.len() as u64 > u64::from(u32::MAX) * ds as u64 {
        return Err(CryptoError::InvalidParameter);
    }

    let mut ctx = hash.new_context();
    let mut digest = [0u8; MAX_DIGEST_SIZE];
    for (i, chunk) in dk.chunks_mut(ds).enumerate() {
        let counter = (i as u32).wrapping_add(1);
        ctx.init();
        ctx.update(&counter.to_be_bytes());
        ctx.update(z);
        ctx.update(other_info);
        ctx.finalize(&mut digest[..ds])?;
        chunk.copy_from_slice(&digest[..chunk.len()]);
    }

    zeroize(&mut digest);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256::SHA256_HASH_ALGO;
    use crate::util::testing::hex;

    fn z() -> Vec<u8> {
        (0u8..32).collect()
    }

    #[test]
    fn test_truncated_last_block() {
        let mut dk = [0u8; 40];
        concat_kdf(&SHA256_HASH_ALGO, &z(), Some(b"helix"), 5, &mut dk).unwrap();
        assert_eq!(
            dk.to_vec(),
            hex("f2602d9b2d2cc4b438f62e0c12c2627d61615c7c7b40bbbeab0dcc97bf4c89db\
                 293a0ebf350541f0")
        );
    }

    #[test]
    fn test_other_info_length() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        concat_kdf(&SHA256_HASH_ALGO, &z(), None, 0, &mut a).unwrap();
        assert_eq!(
            a.to_vec(),
            hex("22b288a146b89e364069f6f367618a0ebeb5b83e5462685ab127b8edf8d2690a")
        );

        // Only other_info_len bytes take part
        concat_kdf(&SHA256_HASH_ALGO, &z(), Some(b"helixXYZ"), 5, &mut a).unwrap();
        concat_kdf(&SHA256_HASH_ALGO, &z(), Some(b"helix"), 5, &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_parameters() {
        let mut dk = [0u8; 16];
        assert_eq!(
            concat_kdf(&SHA256_HASH_ALGO, &z(), None, 4, &mut dk),
            Err(CryptoError::InvalidParameter)
        );
        assert_eq!(
            concat_kdf(&SHA256_HASH_ALGO, &z(), Some(b"abc"), 4, &mut dk),
            Err(CryptoError::InvalidParameter)
        );
    }
}
