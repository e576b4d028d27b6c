//! PBKDF2 (RFC 8018) with HMAC over any [`HashAlgo`].

use crate::error::{CryptoError, CryptoResult};
use crate::hash::{HashAlgo, MAX_DIGEST_SIZE};
use crate::mac::hmac::Hmac;
use crate::util::{xor_in_place, zeroize};

/// Derive `dk.len()` bytes from `password` and `salt`.
///
/// Zero iterations are rejected.
pub fn pbkdf2(
    hash: &'static HashAlgo,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    dk: &mut [u8],
) -> CryptoResult<()> {
    if iterations == 0 {
        return Err(CryptoError::InvalidParameter);
    }
    let ds = hash.digest_size;
    if dk.len() as u64 > u64::from(u32::MAX) * ds as u64 {
        return Err(CryptoError::InvalidParameter);
    }

    let prf = Hmac::new(hash, password)?;
    let mut salted = prf.clone();
    salted.update(salt);

    let mut u = [0u8; MAX_DIGEST_SIZE];
    let mut t = [0u8; MAX_DIGEST_SIZE];
    for (i, chunk) in dk.chunks_mut(ds).enumerate() {
        // U1 = PRF(P, S || INT(i))
        let mut ctx = salted.clone();
        ctx.update(&((i as u32).wrapping_add(1)).to_be_bytes());
        ctx.finalize(&mut u[..ds])?;
        t[..ds].copy_from_slice(&u[..ds]);

        // Uj = PRF(P, Uj-1)
        for _ in 1..iterations {
            let mut ctx = prf.clone();
            ctx.update(&u[..ds]);
            ctx.finalize(&mut u[..ds])?;
            xor_in_place(&mut t[..ds], &u[..ds]);
        }

        chunk.copy_from_slice(&t[..chunk.len()]);
    }

    zeroize(&mut u);
    zeroize(&mut t);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{sha256::SHA256_HASH_ALGO, sm3::SM3_HASH_ALGO};
    use crate::util::testing::hex;

    #[test]
    fn test_pbkdf2_sha256() {
        let mut dk = [0u8; 64];
        pbkdf2(&SHA256_HASH_ALGO, b"passwd", b"salt", 1, &mut dk).unwrap();
        assert_eq!(
            dk.to_vec(),
            hex("55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc\
                 49ca9cccf179b645991664b39d77ef317c71b845b1e30bd509112041d3a19783")
        );

        let mut dk = [0u8; 32];
        pbkdf2(&SHA256_HASH_ALGO, b"password", b"salt", 4096, &mut dk).unwrap();
        assert_eq!(
            dk.to_vec(),
            hex("c5e478d59288c841aa530db6845c4c8d962893a001ce4e11a4963873aa98134a")
        );

        let mut dk = [0u8; 40];
        pbkdf2(&SHA256_HASH_ALGO, b"password", b"salt", 2, &mut dk).unwrap();
        assert_eq!(
            dk.to_vec(),
            hex("ae4d0c95af6b46d32d0adff928f06dd02a303f8ef3c251dfd6e2d85a95474c43\
                 830651afcb5c862f")
        );
    }

    #[test]
    fn test_other_hash_and_prefix() {
        let mut long = [0u8; 48];
        let mut short = [0u8; 20];
        pbkdf2(&SM3_HASH_ALGO, b"pw", b"salt", 3, &mut long).unwrap();
        pbkdf2(&SM3_HASH_ALGO, b"pw", b"salt", 3, &mut short).unwrap();
        assert_eq!(long[..20], short);
    }

    #[test]
    fn test_zero_iterations() {
        assert_eq!(
            pbkdf2(&SHA256_HASH_ALGO, b"pw", b"salt", 0, &mut [0u8; 32]),
            Err(CryptoError::InvalidParameter)
        );
    }
}
