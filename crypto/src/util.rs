//! Byte and word helpers shared by the primitives.

use core::sync::atomic::{compiler_fence, Ordering};

/// Overwrite a buffer with default values using volatile writes
pub fn zeroize<T: Copy + Default>(buf: &mut [T]) {
    for v in buf.iter_mut() {
        // SAFETY: `v` is a valid, aligned, exclusive reference
        unsafe { core::ptr::write_volatile(v, T::default()) };
    }
    compiler_fence(Ordering::SeqCst);
}

/// `x[i] ^= a[i]` over the common length
#[inline]
pub fn xor_in_place(x: &mut [u8], a: &[u8]) {
    for (d, s) in x.iter_mut().zip(a) {
        *d ^= *s;
    }
}

/// `x[i] = a[i] ^ b[i]` for every byte of `x`
#[inline]
pub fn xor_into(x: &mut [u8], a: &[u8], b: &[u8]) {
    for ((d, s), t) in x.iter_mut().zip(a).zip(b) {
        *d = *s ^ *t;
    }
}

/// Compare two byte strings without data-dependent early exit
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b) {
        diff |= x ^ y;
    }
    diff == 0
}

#[inline]
pub(crate) fn load32_be(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

#[inline]
pub(crate) fn load32_le(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

#[inline]
pub(crate) fn store32_be(v: u32, b: &mut [u8]) {
    b[..4].copy_from_slice(&v.to_be_bytes());
}

#[inline]
pub(crate) fn store32_le(v: u32, b: &mut [u8]) {
    b[..4].copy_from_slice(&v.to_le_bytes());
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for unit tests only.

    /// Decode a hex string, panicking on malformed input
    pub fn hex(s: &str) -> Vec<u8> {
        let s: Vec<u8> = s.bytes().filter(|c| !c.is_ascii_whitespace()).collect();
        assert!(s.len() % 2 == 0, "odd hex length");
        s.chunks(2)
            .map(|p| u8::from_str_radix(core::str::from_utf8(p).unwrap(), 16).unwrap())
            .collect()
    }

    /// Deterministic xorshift64 byte source
    pub struct XorShift(pub u64);

    impl XorShift {
        pub fn next_u64(&mut self) -> u64 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            self.0 = x;
            x
        }

        pub fn fill(&mut self, buf: &mut [u8]) {
            for chunk in buf.chunks_mut(8) {
                let v = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&v[..chunk.len()]);
            }
        }
    }
}
