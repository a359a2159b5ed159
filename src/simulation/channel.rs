//! Channel simulation.
//!
//! This module contains the simulation of a BPSK transmission over an AWGN
//! channel, producing the LLRs that the decoder consumes.

use rand::Rng;
use rand_distr::{Distribution, Normal};

/// AWGN channel simulation.
///
/// This struct is used to add AWGN to symbols.
#[derive(Debug, Clone)]
pub struct AwgnChannel {
    distr: Normal<f64>,
}

impl AwgnChannel {
    /// Creates a new AWGN channel.
    ///
    /// The channel noise follows a (real) normal distribution with mean zero
    /// and standard deviation sigma.
    ///
    /// # Panics
    ///
    /// This function panics if `noise_sigma` is not a positive finite number.
    pub fn new(noise_sigma: f64) -> AwgnChannel {
        assert!(noise_sigma >= 0.0);
        AwgnChannel {
            distr: Normal::new(0.0, noise_sigma).unwrap(),
        }
    }

    /// Adds noise to a sequence of symbols.
    ///
    /// The noise is added in-place to the slice `symbols`. An [Rng] is used as
    /// source of randomness.
    pub fn add_noise<R: Rng + ?Sized>(&self, rng: &mut R, symbols: &mut [f64]) {
        for x in symbols.iter_mut() {
            *x += self.distr.sample(rng);
        }
    }
}

/// BPSK transmission over an AWGN channel.
///
/// Maps the bit 0 to the symbol +1.0 and the bit 1 to the symbol -1.0, adds
/// noise, and computes the LLRs of the received symbols. With this mapping a
/// positive LLR favours the bit 0, as the decoder expects.
#[derive(Debug, Clone)]
pub struct BpskAwgn {
    channel: AwgnChannel,
    scale: f64,
}

impl BpskAwgn {
    /// Creates a new BPSK AWGN channel with noise standard deviation
    /// `noise_sigma`.
    pub fn new(noise_sigma: f64) -> BpskAwgn {
        BpskAwgn {
            channel: AwgnChannel::new(noise_sigma),
            scale: 2.0 / (noise_sigma * noise_sigma),
        }
    }

    /// Creates a BPSK AWGN channel for a given Eb/N0 and code rate.
    ///
    /// The Eb/N0 is given in dB units.
    pub fn from_ebn0_db(ebn0_db: f64, rate: f64) -> BpskAwgn {
        let ebn0 = 10.0_f64.powf(0.1 * ebn0_db);
        let esn0 = rate * ebn0;
        BpskAwgn::new((0.5 / esn0).sqrt())
    }

    /// Transmits a sequence of bits and returns the received LLRs.
    pub fn transmit<R: Rng + ?Sized>(&self, rng: &mut R, bits: &[u8]) -> Vec<f64> {
        let mut symbols = bits
            .iter()
            .map(|&b| if b == 0 { 1.0 } else { -1.0 })
            .collect::<Vec<f64>>();
        self.channel.add_noise(rng, &mut symbols);
        symbols.iter().map(|&x| self.scale * x).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rand::{Rng, SeedableRng};

    #[test]
    fn build_awgn() {
        let _channel = AwgnChannel::new(0.2);
    }

    #[test]
    #[should_panic]
    fn negative_noise_sigma() {
        let _channel = AwgnChannel::new(-3.5);
    }

    #[test]
    fn zero_noise_sigma() {
        let channel = AwgnChannel::new(0.0);
        let mut rng = Rng::seed_from_u64(0);
        let mut symbols = vec![1.0; 1024];
        let symbols_orig = symbols.clone();
        channel.add_noise(&mut rng, &mut symbols);
        assert_eq!(&symbols, &symbols_orig);
    }

    #[test]
    fn llr_signs() {
        // Very low noise, so the signs are never wrong
        let channel = BpskAwgn::new(0.01);
        let mut rng = Rng::seed_from_u64(0);
        let llrs = channel.transmit(&mut rng, &[0, 1, 1, 0]);
        assert!(llrs[0] > 0.0);
        assert!(llrs[1] < 0.0);
        assert!(llrs[2] < 0.0);
        assert!(llrs[3] > 0.0);
        // 2 / sigma^2 scaling
        assert!((llrs[0] - 2e4).abs() < 1e3);
    }

    #[test]
    fn ebn0() {
        // rate 1/2 at 0 dB gives Es/N0 = 1/2, so sigma = 1
        let channel = BpskAwgn::from_ebn0_db(0.0, 0.5);
        assert!((channel.scale - 2.0).abs() < 1e-12);
    }
}
