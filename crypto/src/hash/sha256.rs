//! SHA-256 (FIPS 180-4).

use super::{BlockBuffer, HashAlgo, HashContext};
use crate::util::{load32_be, store32_be, zeroize};

/// SHA-256 block size
pub const SHA256_BLOCK_SIZE: usize = 64;

/// SHA-256 digest size
pub const SHA256_DIGEST_SIZE: usize = 32;

/// SHA-256 minimum padding
pub const SHA256_MIN_PAD_SIZE: usize = 9;

/// SHA-256 OID (2.16.840.1.101.3.4.2.1)
pub const SHA256_OID: &[u8] = &[0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01];

/// Common interface for SHA-256
pub static SHA256_HASH_ALGO: HashAlgo = HashAlgo {
    name: "SHA-256",
    oid: SHA256_OID,
    context_size: core::mem::size_of::<Sha256>(),
    block_size: SHA256_BLOCK_SIZE,
    digest_size: SHA256_DIGEST_SIZE,
    min_pad_size: SHA256_MIN_PAD_SIZE,
    final_clears_state: true,
    init: init_context,
};

fn init_context() -> HashContext {
    HashContext::Sha256(Sha256::new())
}

/// SHA-256 initial hash values
const SHA256_H: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a,
    0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// SHA-256 round constants
const SHA256_K: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

/// SHA-256 hasher state.
#[derive(Clone)]
pub struct Sha256 {
    /// State
    state: [u32; 8],
    /// Pending partial block and message length
    buf: BlockBuffer,
}

impl Sha256 {
    /// Create new hasher
    pub const fn new() -> Self {
        Self {
            state: SHA256_H,
            buf: BlockBuffer::new(),
        }
    }

    /// Reset to the initial state
    pub fn init(&mut self) {
        self.state = SHA256_H;
        self.buf.reset();
    }

    /// Update with data
    pub fn update(&mut self, data: &[u8]) {
        self.buf.update(data, |block| process_block(&mut self.state, block));
    }

    /// Finalize, write the digest and wipe the state
    pub fn finalize(&mut self, digest: &mut [u8; SHA256_DIGEST_SIZE]) {
        self.buf.pad_be64(|block| process_block(&mut self.state, block));
        self.finalize_raw(digest);
        zeroize(&mut self.state);
        self.buf.reset();
    }

    /// Output the intermediate hash value without padding
    pub fn finalize_raw(&self, digest: &mut [u8; SHA256_DIGEST_SIZE]) {
        for (i, word) in self.state.iter().enumerate() {
            store32_be(*word, &mut digest[i * 4..]);
        }
    }

    /// Compute SHA-256 in one shot.
    pub fn compute(data: &[u8], digest: &mut [u8; SHA256_DIGEST_SIZE]) {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize(digest);
    }
}

/// Process a 64-byte block
fn process_block(state: &mut [u32; 8], block: &[u8; 64]) {
    let mut w = [0u32; 64];

    // Expand message
    for i in 0..16 {
        w[i] = load32_be(&block[i * 4..]);
    }

    for i in 16..64 {
        let s0 = w[i - 15].rotate_right(7) ^ w[i - 15].rotate_right(18) ^ (w[i - 15] >> 3);
        let s1 = w[i - 2].rotate_right(17) ^ w[i - 2].rotate_right(19) ^ (w[i - 2] >> 10);
        w[i] = w[i - 16].wrapping_add(s0).wrapping_add(w[i - 7]).wrapping_add(s1);
    }

    // Initialize working variables
    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;

    // Main loop
    for i in 0..64 {
        let s1 = e.rotate_right(6) ^ e.rotate_right(11) ^ e.rotate_right(25);
        let ch = (e & f) ^ ((!e) & g);
        let temp1 = h
            .wrapping_add(s1)
            .wrapping_add(ch)
            .wrapping_add(SHA256_K[i])
            .wrapping_add(w[i]);
        let s0 = a.rotate_right(2) ^ a.rotate_right(13) ^ a.rotate_right(22);
        let maj = (a & b) ^ (a & c) ^ (b & c);
        let temp2 = s0.wrapping_add(maj);

        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(temp1);
        d = c;
        c = b;
        b = a;
        a = temp1.wrapping_add(temp2);
    }

    // Update state
    for (s, v) in state.iter_mut().zip([a, b, c, d, e, f, g, h]) {
        *s = s.wrapping_add(v);
    }
    zeroize(&mut w);
}

impl Default for Sha256 {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Sha256 {
    fn drop(&mut self) {
        zeroize(&mut self.state);
        self.buf.reset();
    }
}

impl core::fmt::Debug for Sha256 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Sha256 { .. }")
    }
}

super::impl_hash_function!(Sha256, SHA256_HASH_ALGO, SHA256_DIGEST_SIZE);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::hex;

    fn digest(msg: &[u8]) -> Vec<u8> {
        let mut d = [0u8; SHA256_DIGEST_SIZE];
        Sha256::compute(msg, &mut d);
        d.to_vec()
    }

    #[test]
    fn test_sha256() {
        assert_eq!(
            digest(b""),
            hex("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
        assert_eq!(
            digest(b"abc"),
            hex("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
        assert_eq!(
            digest(b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq"),
            hex("248d6a61d20638b8e5c026930c3e6039a33ce45964ff2167f6ecedd419db06c1")
        );
    }

    #[test]
    fn test_init_resets() {
        let mut h = Sha256::new();
        h.update(b"garbage");
        h.init();
        h.update(b"abc");
        let mut d = [0u8; SHA256_DIGEST_SIZE];
        h.finalize(&mut d);
        assert_eq!(d.to_vec(), digest(b"abc"));
    }
}
