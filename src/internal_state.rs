use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes256;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

use crate::{BLOCK_BYTES, KEY_BYTES, PERTURBED_KEY_BYTE};

/// Hash `seed` with SHA-256 and bump byte [`PERTURBED_KEY_BYTE`] of the
/// digest, so the AES key never equals a bare SHA-256 of the same input.
pub(crate) fn derive_key(seed: &[u8]) -> Zeroizing<[u8; KEY_BYTES]> {
    let mut key = Zeroizing::new([0u8; KEY_BYTES]);
    key.copy_from_slice(Sha256::digest(seed).as_slice());
    key[PERTURBED_KEY_BYTE] = key[PERTURBED_KEY_BYTE].wrapping_add(1);
    key
}

/// Increment `counter` as a little-endian integer.
///
/// Byte 0 is the least significant. Carry moves to the next index only when
/// a byte wraps from `0xff` to `0x00`; the all-`0xff` counter wraps to zero.
pub(crate) fn increment_counter(counter: &mut [u8; BLOCK_BYTES]) {
    for byte in counter.iter_mut() {
        *byte = byte.wrapping_add(1);
        if *byte != 0 {
            break;
        }
    }
}

/// The state of a seeded generator: the AES-256 key schedule, the 128 bit
/// counter, the current keystream block and the cursor into it.
///
/// `cursor == BLOCK_BYTES` means the block is used up and the next output
/// byte needs a fresh block.
pub(crate) struct InternalState {
    cipher: Aes256,
    counter: [u8; BLOCK_BYTES],
    block: [u8; BLOCK_BYTES],
    cursor: usize,
}

impl InternalState {
    /// Derive the key from `seed` and start at counter zero with an exhausted
    /// block.
    pub(crate) fn from_seed(seed: &[u8]) -> Self {
        let key = derive_key(seed);
        Self {
            cipher: Aes256::new(GenericArray::from_slice(key.as_slice())),
            counter: [0; BLOCK_BYTES],
            block: [0; BLOCK_BYTES],
            cursor: BLOCK_BYTES,
        }
    }

    /// Step the counter and encrypt it into the keystream block.
    fn refill(&mut self) {
        increment_counter(&mut self.counter);
        self.cipher.encrypt_block_b2b(
            GenericArray::from_slice(&self.counter),
            GenericArray::from_mut_slice(&mut self.block),
        );
        self.cursor = 0;
    }

    /// Write the next `dest.len()` keystream bytes into `dest`.
    pub(crate) fn fill(&mut self, dest: &mut [u8]) {
        let mut written = 0;
        while written < dest.len() {
            if self.cursor == BLOCK_BYTES {
                self.refill();
            }
            let len = core::cmp::min(BLOCK_BYTES - self.cursor, dest.len() - written);
            dest[written..written + len]
                .copy_from_slice(&self.block[self.cursor..self.cursor + len]);
            self.cursor += len;
            written += len;
        }
    }

    #[cfg(test)]
    pub(crate) fn counter(&self) -> &[u8; BLOCK_BYTES] {
        &self.counter
    }

    #[cfg(test)]
    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    /// Overwrite the counter. Only tests need to jump ahead in the stream.
    #[cfg(test)]
    pub(crate) fn set_counter(&mut self, counter: [u8; BLOCK_BYTES]) {
        self.counter = counter;
        self.cursor = BLOCK_BYTES;
    }
}

impl Drop for InternalState {
    fn drop(&mut self) {
        self.counter.zeroize();
        self.block.zeroize();
        self.cursor.zeroize();
    }
}
