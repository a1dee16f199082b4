//! A deterministic cryptographic pseudo-random byte stream, derived from an
//! arbitrary-length seed with SHA-256 and AES-256 in counter mode.
//!
//! Parties that share a seed (nodes, test harnesses, deterministic key pair
//! derivation) obtain byte-identical streams without ever exchanging the
//! derived material. The output for a given seed is a protocol constant: it
//! does not change between versions, platforms or implementations.
//!
//! # Usage
//! Create a generator with [`SeededPrng::from_seed_bytes`], or construct an
//! empty one with [`SeededPrng::new`] and call [`SeededPrng::seed`] later.
//! Pull bytes with [`SeededPrng::read`], [`SeededPrng::fill_random_bytes`] or
//! [`SeededPrng::get_random_bytes`]. Reading from a generator that was never
//! seeded fails with [`Error::UninitializedState`].
//!
//! # Examples
//! Two parties deriving the same key material:
//! ```
//! use seeded_ctr_prng::SeededPrng;
//!
//! let mut alice = SeededPrng::from_seed_bytes(b"shared seed");
//! let mut bob = SeededPrng::new();
//! bob.seed(b"shared seed");
//!
//! let a = alice.get_random_bytes::<32>()?;
//! let b = bob.get_random_bytes::<32>()?;
//! assert_eq!(a, b);
//! # Ok::<(), seeded_ctr_prng::Error>(())
//! ```
//!
//! Reads can be split arbitrarily:
//! ```
//! use seeded_ctr_prng::SeededPrng;
//!
//! let mut whole = SeededPrng::from_seed_bytes(b"abc");
//! let mut parts = SeededPrng::from_seed_bytes(b"abc");
//!
//! let mut expected = [0u8; 16];
//! whole.read(&mut expected)?;
//!
//! let mut got = [0u8; 16];
//! parts.read(&mut got[..5])?;
//! parts.read(&mut got[5..])?;
//! assert_eq!(got, expected);
//! # Ok::<(), seeded_ctr_prng::Error>(())
//! ```
//!
//! # Construction
//! Seeding:
//!
//! 1. `k = SHA-256(seed)`, 32 bytes.
//! 2. `k[8] = k[8] + 1 (mod 256)`. This keeps the AES key distinct from a plain
//!    SHA-256 of the same seed that may be used as a key somewhere else.
//! 3. Expand `k` into an AES-256 key schedule.
//! 4. Set the 16 byte counter `n` to zero and mark the keystream block as
//!    used up.
//!
//! Output is AES-256-CTR with a little-endian counter, starting at one:
//! ```ascii
//!   n = 1              n = 2              n = 3
//!   01 00 .. 00        02 00 .. 00        03 00 .. 00
//!      │                  │                  │
//!   AES-256(k)         AES-256(k)         AES-256(k)
//!      │                  │                  │
//!   ┌──▼───────────┐   ┌──▼───────────┐   ┌──▼───────────┐
//!   │ bytes 0..16  │   │ bytes 16..32 │   │ bytes 32..48 │ ...
//!   └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//! Byte 0 of the counter is the least significant; a carry moves into byte 1
//! only when byte 0 wraps from `0xff` to `0x00`, and so on.
//!
//! # Security
//! The stream is as strong as AES-256-CTR under a key nobody else knows,
//! which means the seed must be secret and high-entropy when the output is
//! used as key material. There is no forward secrecy and no backtracking
//! resistance: anyone who obtains the seed, or the state, can reproduce the
//! whole stream.
//!
//! # Crate Features
//! - `getrandom` (default): Enable dependency on the [`getrandom` crate], for
//!   [`SeededPrng::new_from_getrandom`] and [`SeededPrng::seed_with_getrandom`].
//! - `rand-core`: Implement the Rng traits from the [`rand_core` crate] for
//!   [`SeededPrng`].
//! - `std`: Implement [`std::io::Read`] for [`SeededPrng`] and
//!   [`std::error::Error`] for [`Error`].
//!
//! [`getrandom` crate]: https://crates.io/crates/getrandom
//! [`rand_core` crate]: https://crates.io/crates/rand_core
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]
#![forbid(unsafe_code, rust_2018_compatibility)]
#![deny(future_incompatible, rust_2018_idioms)]
#![warn(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

#[cfg(feature = "std")]
extern crate std;

/// AES block size, and therefore the size of the counter and of one keystream
/// block.
const BLOCK_BYTES: usize = 16;
/// SHA-256 digest size, and the AES-256 key size.
const KEY_BYTES: usize = 32;
/// Index of the digest byte that is incremented before keying AES.
const PERTURBED_KEY_BYTE: usize = 8;

#[allow(clippy::assertions_on_constants)]
const _: () = assert!(PERTURBED_KEY_BYTE < KEY_BYTES);

mod error;
pub use error::Error;

/// Key schedule, counter and keystream buffer of a seeded generator.
mod internal_state;
use internal_state::InternalState;

/// Deterministic AES-256-CTR generator keyed from a seed.
///
/// An instance starts out empty ([`Self::new`]) and becomes usable once
/// seeded. Seeding again at any point discards all earlier state and starts
/// an independent stream, identical to that of a fresh instance seeded with
/// the same bytes.
///
/// The generator has no interior synchronization. Use one instance per
/// stream, or put it behind a lock when sharing.
///
/// # Examples
/// ```
/// use seeded_ctr_prng::{Error, SeededPrng};
///
/// let mut rng = SeededPrng::new();
/// assert_eq!(rng.get_random_bytes::<4>(), Err(Error::UninitializedState));
///
/// rng.seed(b"");
/// assert_eq!(
///     rng.get_random_bytes::<4>()?,
///     [0x97, 0xcd, 0xfe, 0x90],
/// );
/// # Ok::<(), Error>(())
/// ```
#[derive(Default)]
pub struct SeededPrng {
    state: Option<InternalState>,
}

impl SeededPrng {
    /// Create an unseeded instance. Reads fail until [`Self::seed`] is
    /// called.
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Create an instance seeded with `seed`.
    pub fn from_seed_bytes(seed: &[u8]) -> Self {
        let mut rng = Self::new();
        rng.seed(seed);
        rng
    }

    /// (Re)seed the generator with `seed`, which can be of any length
    /// (including empty). All earlier state is discarded.
    pub fn seed(&mut self, seed: &[u8]) {
        tracing::trace!(seed_len = seed.len(), reseed = self.is_seeded(), "seeding prng");
        self.state = Some(InternalState::from_seed(seed));
    }

    /// Whether [`Self::seed`] has been called on this instance.
    pub fn is_seeded(&self) -> bool {
        self.state.is_some()
    }

    /// Fill all of `dest` with the next bytes of the stream and return
    /// `dest.len()`.
    ///
    /// # Errors
    /// [`Error::UninitializedState`] if the generator was never seeded; `dest`
    /// is left untouched.
    pub fn read(&mut self, dest: &mut [u8]) -> Result<usize, Error> {
        let state = match self.state.as_mut() {
            Some(state) => state,
            None => {
                tracing::debug!(requested = dest.len(), "read from unseeded prng");
                return Err(Error::UninitializedState);
            }
        };
        state.fill(dest);
        Ok(dest.len())
    }

    /// Fill `dest` with the next bytes of the stream.
    ///
    /// # Errors
    /// [`Error::UninitializedState`] if the generator was never seeded.
    pub fn fill_random_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.read(dest)?;
        Ok(())
    }

    /// Output an array `[u8; N]` holding the next `N` bytes of the stream.
    ///
    /// # Errors
    /// [`Error::UninitializedState`] if the generator was never seeded.
    pub fn get_random_bytes<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut out = [0; N];
        self.fill_random_bytes(&mut out)?;
        Ok(out)
    }

    /// (Re)seed the generator with 32 bytes from the OS RNG (e.g. the
    /// `getrandom` syscall on linux). The resulting stream is not
    /// reproducible.
    #[cfg(feature = "getrandom")]
    #[cfg_attr(docsrs, doc(cfg(feature = "getrandom")))]
    pub fn seed_with_getrandom(&mut self) -> Result<(), getrandom::Error> {
        let mut seed = zeroize::Zeroizing::new([0u8; KEY_BYTES]);
        getrandom::fill(&mut seed[..])?;
        self.seed(&seed[..]);
        Ok(())
    }

    /// Create an instance seeded from the OS RNG.
    #[cfg(feature = "getrandom")]
    #[cfg_attr(docsrs, doc(cfg(feature = "getrandom")))]
    pub fn new_from_getrandom() -> Result<Self, getrandom::Error> {
        let mut rng = Self::new();
        rng.seed_with_getrandom()?;
        Ok(rng)
    }
}

impl core::fmt::Debug for SeededPrng {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SeededPrng")
            .field("seeded", &self.is_seeded())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "std")]
mod io_impl {
    use super::SeededPrng;
    use std::io;

    #[cfg_attr(docsrs, doc(cfg(feature = "std")))]
    impl io::Read for SeededPrng {
        /// Always fills all of `buf`. Fails with an error of kind
        /// [`io::ErrorKind::Other`] wrapping
        /// [`Error::UninitializedState`](crate::Error::UninitializedState) when
        /// unseeded.
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            SeededPrng::read(self, buf).map_err(|e| io::Error::new(io::ErrorKind::Other, e))
        }
    }
}

#[cfg(feature = "rand-core")]
mod rand_core_impl {
    use super::{SeededPrng, KEY_BYTES};
    use rand_core::{CryptoRng, RngCore, SeedableRng};

    #[cfg_attr(docsrs, doc(cfg(feature = "rand-core")))]
    impl RngCore for SeededPrng {
        fn next_u32(&mut self) -> u32 {
            rand_core::impls::next_u32_via_fill(self)
        }

        fn next_u64(&mut self) -> u64 {
            rand_core::impls::next_u64_via_fill(self)
        }

        /// Equivalent to [`SeededPrng::fill_random_bytes`].
        ///
        /// # Panics
        /// If the generator was never seeded. `RngCore` has no way to report
        /// the error; use [`SeededPrng::read`] to handle it.
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            if let Err(e) = self.fill_random_bytes(dest) {
                panic!("{}", e);
            }
        }
    }

    #[cfg_attr(docsrs, doc(cfg(feature = "rand-core")))]
    impl CryptoRng for SeededPrng {}

    #[cfg_attr(docsrs, doc(cfg(feature = "rand-core")))]
    impl SeedableRng for SeededPrng {
        type Seed = [u8; KEY_BYTES];

        /// Same as [`SeededPrng::from_seed_bytes`] on the 32 seed bytes.
        fn from_seed(seed: Self::Seed) -> Self {
            let seed = zeroize::Zeroizing::new(seed);
            Self::from_seed_bytes(&seed[..])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, SeededPrng, BLOCK_BYTES};

    #[test]
    fn unseeded_read_fails() {
        let mut rng = SeededPrng::new();
        assert!(!rng.is_seeded());
        let mut buf = [0xaau8; 8];
        assert_eq!(rng.read(&mut buf), Err(Error::UninitializedState));
        assert_eq!(buf, [0xaa; 8]);
        assert_eq!(rng.get_random_bytes::<1>(), Err(Error::UninitializedState));
    }

    #[test]
    fn unseeded_empty_read_fails() {
        let mut rng = SeededPrng::default();
        assert_eq!(rng.read(&mut []), Err(Error::UninitializedState));
    }

    #[test]
    fn seeding_makes_ready() {
        let mut rng = SeededPrng::new();
        rng.seed(b"HELLO WORLD");
        assert!(rng.is_seeded());
        let out1 = rng.get_random_bytes::<32>().unwrap();
        let out2 = rng.get_random_bytes::<32>().unwrap();
        assert_ne!(out1, out2);
    }

    #[test]
    fn read_reports_length() {
        let mut rng = SeededPrng::from_seed_bytes(b"len");
        for n in [0, 1, BLOCK_BYTES - 1, BLOCK_BYTES, BLOCK_BYTES + 1, 3 * BLOCK_BYTES, 1000] {
            let mut buf = [0u8; 1000];
            assert_eq!(rng.read(&mut buf[..n]), Ok(n));
        }
    }

    #[test]
    fn empty_seed_vector() {
        let mut rng = SeededPrng::from_seed_bytes(b"");
        let out = rng.get_random_bytes::<32>().unwrap();
        assert_eq!(
            out,
            [
                0x97, 0xcd, 0xfe, 0x90, 0x4b, 0xdc, 0x9d, 0x9c, 0x1c, 0x00, 0xfb, 0xbf, 0xea, 0xd2,
                0x2f, 0xef, 0xae, 0x1a, 0x4f, 0xfc, 0xf2, 0x99, 0xd9, 0xa0, 0xc7, 0x24, 0x6e, 0xd8,
                0xba, 0xe5, 0xf8, 0x9d,
            ]
        );
    }

    #[test]
    fn reseed_discards_state() {
        let mut rng = SeededPrng::from_seed_bytes(b"first");
        let _ = rng.get_random_bytes::<7>().unwrap();
        rng.seed(b"second");
        let got = rng.get_random_bytes::<40>().unwrap();

        let mut fresh = SeededPrng::from_seed_bytes(b"second");
        assert_eq!(got, fresh.get_random_bytes::<40>().unwrap());
    }

    #[test]
    fn debug_hides_state() {
        extern crate std;

        let rng = SeededPrng::from_seed_bytes(b"secret");
        assert_eq!(std::format!("{:?}", rng), "SeededPrng { seeded: true, .. }");
        assert_eq!(
            std::format!("{:?}", SeededPrng::new()),
            "SeededPrng { seeded: false, .. }"
        );
    }

    #[cfg(feature = "getrandom")]
    #[test]
    fn create_from_getrandom() {
        let mut rng = SeededPrng::new_from_getrandom().expect("error in getrandom");
        let out1 = rng.get_random_bytes::<32>().unwrap();
        let out2 = rng.get_random_bytes::<32>().unwrap();
        assert_ne!(out1, out2);
    }

    #[cfg(feature = "std")]
    #[test]
    fn io_read_fills_and_reports_unseeded() {
        use std::io::Read;

        let mut rng = SeededPrng::from_seed_bytes(b"");
        let mut buf = [0u8; 4];
        Read::read_exact(&mut rng, &mut buf).unwrap();
        assert_eq!(buf, [0x97, 0xcd, 0xfe, 0x90]);

        let mut unseeded = SeededPrng::new();
        let err = Read::read(&mut unseeded, &mut buf).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::Other);
    }

    #[cfg(feature = "rand-core")]
    #[test]
    fn rand_core_from_seed() {
        use rand_core::{RngCore, SeedableRng};

        let seed = [37u8; 32];
        let mut rng = SeededPrng::from_seed(seed);
        let mut expected = SeededPrng::from_seed_bytes(&seed);
        let mut buf = [0; 15];
        rng.fill_bytes(&mut buf);
        assert_eq!(buf, expected.get_random_bytes::<15>().unwrap());
        assert_eq!(
            rng.next_u32(),
            u32::from_le_bytes(expected.get_random_bytes::<4>().unwrap())
        );
    }

    #[cfg(feature = "rand-core")]
    #[test]
    #[should_panic(expected = "generator read before it was seeded")]
    fn rand_core_unseeded_panics() {
        use rand_core::RngCore;

        SeededPrng::new().next_u64();
    }
}
