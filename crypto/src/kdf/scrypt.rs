//! scrypt (RFC 7914).
//!
//! `ROMix` needs `128 * r * n` bytes of working memory plus `256 * r`
//! bytes of scratch. Both are reserved up front and an allocation failure
//! is reported as [`CryptoError::OutOfMemory`].

use alloc::vec::Vec;

use super::pbkdf2::pbkdf2;
use crate::cipher::salsa20::salsa20_core;
use crate::error::{CryptoError, CryptoResult};
use crate::hash::sha256::SHA256_HASH_ALGO;
use crate::util::{load32_le, store32_le, zeroize};

/// Salsa20/8 rounds used by `BlockMix`
const SALSA_ROUNDS: usize = 8;

/// Words per 64-byte Salsa block
const SALSA_WORDS: usize = 16;

/// Validate `(n, r, p)`
fn check_params(n: u64, r: u32, p: u32) -> CryptoResult<()> {
    if n < 2 || !n.is_power_of_two() || r == 0 || p == 0 {
        return Err(CryptoError::InvalidParameter);
    }
    if u64::from(r) * u64::from(p) >= 1 << 30 {
        return Err(CryptoError::InvalidParameter);
    }
    // n < 2^(16 r)
    if r < 4 && n >> (16 * r) != 0 {
        return Err(CryptoError::InvalidParameter);
    }
    Ok(())
}

/// Zero-filled buffer, reserved fallibly
fn try_alloc<T: Copy + Default>(len: Option<usize>) -> CryptoResult<Vec<T>> {
    let len = len.ok_or(CryptoError::OutOfMemory)?;
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| CryptoError::OutOfMemory)?;
    v.resize(len, T::default());
    Ok(v)
}

/// `BlockMix` over `2r` Salsa blocks of `b`, result written back to `b`
fn block_mix(b: &mut [u32], y: &mut [u32]) {
    let blocks = b.len() / SALSA_WORDS;
    let half = blocks / 2;

    let mut x = [0u32; SALSA_WORDS];
    x.copy_from_slice(&b[(blocks - 1) * SALSA_WORDS..]);

    let mut t = [0u32; SALSA_WORDS];
    for i in 0..blocks {
        for (xv, bv) in x.iter_mut().zip(&b[i * SALSA_WORDS..(i + 1) * SALSA_WORDS]) {
            *xv ^= bv;
        }
        salsa20_core(&x, &mut t, SALSA_ROUNDS);
        x = t;

        // Even blocks go to the first half, odd ones to the second
        let dst = (i / 2 + (i % 2) * half) * SALSA_WORDS;
        y[dst..dst + SALSA_WORDS].copy_from_slice(&x);
    }
    b.copy_from_slice(y);

    zeroize(&mut x);
    zeroize(&mut t);
}

/// `Integerify(X) mod n`
fn integerify(x: &[u32], n: u64) -> u64 {
    let last = x.len() - SALSA_WORDS;
    ((u64::from(x[last + 1]) << 32) | u64::from(x[last])) & (n - 1)
}

/// `ROMix` over one `128 r`-byte block
fn ro_mix(block: &mut [u8], n: u64, v: &mut [u32], xy: &mut [u32]) {
    let words = block.len() / 4;
    let (x, y) = xy.split_at_mut(words);

    for (i, w) in x.iter_mut().enumerate() {
        *w = load32_le(&block[4 * i..]);
    }

    for chunk in v.chunks_exact_mut(words) {
        chunk.copy_from_slice(x);
        block_mix(x, y);
    }

    for _ in 0..n {
        let j = integerify(x, n) as usize;
        for (xv, vv) in x.iter_mut().zip(&v[j * words..(j + 1) * words]) {
            *xv ^= vv;
        }
        block_mix(x, y);
    }

    for (i, w) in x.iter().enumerate() {
        store32_le(*w, &mut block[4 * i..]);
    }
}

/// Derive `dk.len()` bytes from `password` and `salt`.
///
/// `n` is the CPU/memory cost (a power of two above 1), `r` the block size
/// factor and `p` the parallelization factor.
pub fn scrypt(
    password: &[u8],
    salt: &[u8],
    n: u64,
    r: u32,
    p: u32,
    dk: &mut [u8],
) -> CryptoResult<()> {
    check_params(n, r, p)?;

    let block_len = (r as usize).checked_mul(128).ok_or(CryptoError::OutOfMemory)?;
    let words = block_len / 4;
    let n_words = usize::try_from(n)
        .ok()
        .and_then(|n| n.checked_mul(words));

    log::debug!(
        "scrypt: n={} r={} p={}, reserving {} KiB",
        n,
        r,
        p,
        n_words.map_or(0, |w| w / 256)
    );

    let mut b: Vec<u8> = try_alloc(block_len.checked_mul(p as usize))?;
    let mut v: Vec<u32> = try_alloc(n_words)?;
    let mut xy: Vec<u32> = try_alloc(words.checked_mul(2))?;

    pbkdf2(&SHA256_HASH_ALGO, password, salt, 1, &mut b)?;
    for block in b.chunks_exact_mut(block_len) {
        ro_mix(block, n, &mut v, &mut xy);
    }
    let result = pbkdf2(&SHA256_HASH_ALGO, password, &b, 1, dk);

    zeroize(&mut b);
    zeroize(&mut v);
    zeroize(&mut xy);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::hex;

    #[test]
    fn test_rfc7914_vectors() {
        let mut dk = [0u8; 64];
        scrypt(b"", b"", 16, 1, 1, &mut dk).unwrap();
        assert_eq!(
            dk.to_vec(),
            hex("77d6576238657b203b19ca42c18a0497f16b4844e3074ae8dfdffa3fede21442\
                 fcd0069ded0948f8326a753a0fc81f17e8d3e0fb2e0d3628cf35e20c38d18906")
        );

        scrypt(b"password", b"NaCl", 1024, 8, 16, &mut dk).unwrap();
        assert_eq!(
            dk.to_vec(),
            hex("fdbabe1c9d3472007856e7190d01e9fe7c6ad7cbc8237830e77376634b373162\
                 2eaf30d92e22a3886ff109279d9830dac727afb94a83ee6d8360cbdfa2cc0640")
        );
    }

    #[test]
    fn test_parameters_change_output() {
        let mut base = [0u8; 20];
        scrypt(b"pw", b"na", 32, 2, 3, &mut base).unwrap();
        assert_eq!(base.to_vec(), hex("5561badc90f91a90f0554a5de13284ae59b04c09"));

        let mut again = [0u8; 20];
        scrypt(b"pw", b"na", 32, 2, 3, &mut again).unwrap();
        assert_eq!(base, again);

        let variants: [(&[u8], &[u8], u64, u32, u32); 5] = [
            (b"pX", b"na", 32, 2, 3),
            (b"pw", b"nX", 32, 2, 3),
            (b"pw", b"na", 64, 2, 3),
            (b"pw", b"na", 32, 3, 3),
            (b"pw", b"na", 32, 2, 2),
        ];
        for (pw, salt, n, r, p) in variants {
            let mut out = [0u8; 20];
            scrypt(pw, salt, n, r, p, &mut out).unwrap();
            assert_ne!(out, base);
        }
    }

    #[test]
    fn test_invalid_parameters() {
        let mut dk = [0u8; 16];
        for (n, r, p) in [(0, 1, 1), (1, 1, 1), (24, 1, 1), (16, 0, 1), (16, 1, 0), (1 << 16, 1, 1)] {
            assert_eq!(
                scrypt(b"pw", b"salt", n, r, p, &mut dk),
                Err(CryptoError::InvalidParameter),
                "n={n} r={r} p={p}"
            );
        }
        assert_eq!(check_params(16, 1 << 15, 1 << 15), Err(CryptoError::InvalidParameter));
        assert!(check_params(1 << 15, 1, 1).is_ok());
    }

    #[test]
    fn test_memory_reservation_failure() {
        assert_eq!(try_alloc::<u32>(None), Err(CryptoError::OutOfMemory));
        assert_eq!(try_alloc::<u32>(Some(usize::MAX)), Err(CryptoError::OutOfMemory));
        assert_eq!(try_alloc::<u8>(Some(3)), Ok(vec![0u8; 3]));
    }
}
