//! # Reproducible random functions
//!
//! This module uses the [`ChaCha8Rng`] RNG from the [rand_chacha] crate
//! to achieve reproducible random number generation. The graph construction
//! and the tie-breaking of the hard decisions draw from RNGs of this type
//! unless the caller injects a different one.
//!
//! # Examples
//! ```
//! # use ldpc_list_decoder::rand::Rng;
//! # use ldpc_list_decoder::rand::*;
//! let seed = 42;
//! let mut rng = Rng::seed_from_u64(seed);
//! assert_eq!(rng.next_u64(), 12578764544318200737);
//! ```
use rand_chacha::ChaCha8Rng;
pub use rand_chacha::rand_core::SeedableRng;
pub use rand_core::RngCore;

/// The RNG used in throughout this crate for algorithms using pseudorandom
/// generation.
pub type Rng = ChaCha8Rng;

/// Returns an independent RNG for the stream `stream` of a seed.
///
/// Used to give each of several workers its own reproducible RNG derived from
/// a single user-provided seed.
pub fn stream_rng(seed: u64, stream: u64) -> Rng {
    let mut rng = Rng::seed_from_u64(seed);
    rng.set_stream(stream);
    rng
}
