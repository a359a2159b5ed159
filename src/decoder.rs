//! LDPC belief propagation decoder.
//!
//! This module provides a decoder that runs belief propagation (the
//! sum-product algorithm) on a [`TannerGraph`] and turns the resulting beliefs
//! into hard decisions. Three kinds of decoding are supported, all of them
//! using the same message passing engine (see [`flooding`]):
//!
//! - decoding of the information bits,
//! - decoding of the full codeword, including frozen bits and parity bits,
//! - list decoding of the information bits, which produces several candidates
//!   by flipping the least reliable bits (see [`list`]).
//!
//! A hard decision on an LLR which is exactly zero is resolved by an unbiased
//! coin flip. The source of randomness is owned by the decoder and can be
//! injected, so that decoding is reproducible.

use crate::graph::TannerGraph;
use crate::rand::{Rng, SeedableRng};
use thiserror::Error;

pub mod flooding;
pub mod list;

pub use flooding::{Convergence, MAX_ITERATIONS};

/// LDPC decoder error.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// The number of channel LLRs does not match the code length.
    #[error("expected {expected} channel LLRs, got {got}")]
    InputSizeMismatch {
        /// Code length.
        expected: usize,
        /// Number of LLRs supplied.
        got: usize,
    },
    /// A list size of zero was requested.
    #[error("the list size must be at least one")]
    InvalidListSize,
    /// The list size requires flipping more bits than there are information
    /// bits.
    #[error("list size {list_size} is too large for {information_bits} information bits")]
    ListSizeTooLarge {
        /// Requested list size.
        list_size: usize,
        /// Number of information bits of the code.
        information_bits: usize,
    },
}

/// Generic LDPC decoder.
///
/// This trait is used to form LDPC decoder trait objects, abstracting over the
/// source of randomness of the decoder. Each method corresponds to one of the
/// decoding variants, and all of them run belief propagation on the channel
/// LLRs first. Not converging is not an error: the outputs always contain the
/// hard decisions on the final beliefs, together with the [`Convergence`]
/// information.
pub trait LdpcDecoder: std::fmt::Debug + Send {
    /// Decodes the information bits.
    ///
    /// The output contains one bit per information bit of the code, in the
    /// order given by [`TannerGraph::information_bits`].
    fn decode(&mut self, llrs: &[f64]) -> Result<DecoderOutput, Error>;

    /// Decodes the full codeword.
    ///
    /// The output contains one bit per variable node of the Tanner graph.
    fn decode_codeword(&mut self, llrs: &[f64]) -> Result<DecoderOutput, Error>;

    /// List decodes the information bits.
    ///
    /// The output contains `2^floor(log2(list_size))` candidates. The first
    /// candidate is equal to what [`LdpcDecoder::decode`] returns.
    fn list_decode(&mut self, llrs: &[f64], list_size: usize)
        -> Result<ListDecoderOutput, Error>;

    /// Returns the Tanner graph used by the decoder.
    fn graph(&self) -> &TannerGraph;
}

/// LDPC decoder output.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct DecoderOutput {
    /// Decoded bits.
    ///
    /// Contains the hard decision bits.
    pub bits: Vec<u8>,
    /// Outcome of the message passing.
    pub convergence: Convergence,
}

/// LDPC list decoder output.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ListDecoderOutput {
    /// Candidates.
    ///
    /// The first candidate is the hard decision. The remaining ones are
    /// obtained by flipping the bits listed in `flipped`.
    pub candidates: Vec<Vec<u8>>,
    /// Flipped bits.
    ///
    /// Positions (within the information bits) of the least reliable bits, in
    /// the order in which they were flipped.
    pub flipped: Vec<usize>,
    /// Outcome of the message passing.
    pub convergence: Convergence,
}

/// LDPC belief propagation decoder.
///
/// The decoder owns a [`TannerGraph`], whose node state is updated in place
/// during decoding, and an RNG used to break ties in the hard decisions.
#[derive(Debug, Clone)]
pub struct Decoder<R = Rng> {
    graph: TannerGraph,
    rng: R,
}

impl Decoder<Rng> {
    /// Creates a new decoder using the crate RNG with a `seed`.
    pub fn from_seed(graph: TannerGraph, seed: u64) -> Decoder<Rng> {
        Decoder::new(graph, Rng::seed_from_u64(seed))
    }
}

impl<R: rand::Rng> Decoder<R> {
    /// Creates a new decoder.
    ///
    /// The `rng` is used to break ties when a marginal LLR is exactly zero.
    pub fn new(graph: TannerGraph, rng: R) -> Decoder<R> {
        Decoder { graph, rng }
    }

    /// Returns the Tanner graph used by the decoder.
    pub fn graph(&self) -> &TannerGraph {
        &self.graph
    }

    /// Decodes the information bits.
    ///
    /// See [`LdpcDecoder::decode`].
    ///
    /// # Examples
    /// ```
    /// # use ldpc_list_decoder::decoder::Decoder;
    /// # use ldpc_list_decoder::graph::{Edge, TannerGraph};
    /// // Repetition code of length 3
    /// let edges = [(0, 0), (1, 0), (1, 1), (2, 1)]
    ///     .into_iter()
    ///     .map(|(variable, check)| Edge { variable, check });
    /// let graph = TannerGraph::new(3, 2, edges, std::iter::empty::<usize>()).unwrap();
    /// let mut decoder = Decoder::from_seed(graph, 0);
    /// let output = decoder.decode(&[-1.0, 0.5, -2.0]).unwrap();
    /// assert_eq!(output.bits, vec![1, 1, 1]);
    /// assert!(output.convergence.converged);
    /// ```
    pub fn decode(&mut self, llrs: &[f64]) -> Result<DecoderOutput, Error> {
        let convergence = flooding::execute_message_passing(&mut self.graph, llrs)?;
        Ok(DecoderOutput {
            bits: self.information_decisions(),
            convergence,
        })
    }

    /// Decodes the full codeword.
    ///
    /// See [`LdpcDecoder::decode_codeword`].
    pub fn decode_codeword(&mut self, llrs: &[f64]) -> Result<DecoderOutput, Error> {
        let convergence = flooding::execute_message_passing(&mut self.graph, llrs)?;
        let bits = (0..self.graph.code_length())
            .map(|v| hard_decision(self.graph.marginal_llr(v), &mut self.rng))
            .collect();
        Ok(DecoderOutput { bits, convergence })
    }

    /// List decodes the information bits.
    ///
    /// See [`LdpcDecoder::list_decode`].
    ///
    /// # Errors
    /// Besides [`Error::InputSizeMismatch`], this returns
    /// [`Error::InvalidListSize`] for a `list_size` of zero and
    /// [`Error::ListSizeTooLarge`] if the list size is larger than what can be
    /// obtained by flipping all the information bits. The list size is checked
    /// before running the message passing.
    pub fn list_decode(
        &mut self,
        llrs: &[f64],
        list_size: usize,
    ) -> Result<ListDecoderOutput, Error> {
        let ambiguous =
            list::ambiguous_bit_count(list_size, self.graph.information_bits().len())?;
        let convergence = flooding::execute_message_passing(&mut self.graph, llrs)?;
        let mut flipped = list::rank_by_reliability(&self.graph);
        flipped.truncate(ambiguous);
        let decision = self.information_decisions();
        Ok(ListDecoderOutput {
            candidates: list::expand_candidates(decision, &flipped),
            flipped,
            convergence,
        })
    }

    fn information_decisions(&mut self) -> Vec<u8> {
        let Decoder { graph, rng } = self;
        graph
            .information_bits()
            .iter()
            .map(|&v| hard_decision(graph.marginal_llr(v), &mut *rng))
            .collect()
    }
}

impl<R: rand::Rng + std::fmt::Debug + Send> LdpcDecoder for Decoder<R> {
    fn decode(&mut self, llrs: &[f64]) -> Result<DecoderOutput, Error> {
        Decoder::decode(self, llrs)
    }

    fn decode_codeword(&mut self, llrs: &[f64]) -> Result<DecoderOutput, Error> {
        Decoder::decode_codeword(self, llrs)
    }

    fn list_decode(
        &mut self,
        llrs: &[f64],
        list_size: usize,
    ) -> Result<ListDecoderOutput, Error> {
        Decoder::list_decode(self, llrs, list_size)
    }

    fn graph(&self) -> &TannerGraph {
        Decoder::graph(self)
    }
}

/// Hard decision on an LLR.
///
/// Positive LLRs give a 0 bit and negative LLRs give a 1 bit. Otherwise (zero
/// or NaN) the bit is drawn uniformly at random from `rng`.
pub fn hard_decision<R: rand::Rng + ?Sized>(llr: f64, rng: &mut R) -> u8 {
    if llr > 0.0 {
        0
    } else if llr < 0.0 {
        1
    } else {
        u8::from(rng.gen::<bool>())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::Edge;
    use crate::regular::Config;
    use rand::rngs::mock::StepRng;

    // One check joining all the bits. Bits 2 to 5 are frozen.
    fn single_check() -> TannerGraph {
        let edges = (0..6).map(|variable| Edge { variable, check: 0 });
        TannerGraph::new(6, 1, edges, [2, 3, 4, 5].iter()).unwrap()
    }

    fn regular_graph() -> TannerGraph {
        Config {
            code_length: 48,
            information_bits: 20,
            variable_degree: 3,
            check_degree: 6,
        }
        .run(7)
        .unwrap()
    }

    fn noisy_llrs(n: usize, seed: u64) -> Vec<f64> {
        use rand_distr::{Distribution, Normal};
        let mut rng = Rng::seed_from_u64(seed);
        let normal = Normal::new(2.0, 1.5).unwrap();
        (0..n).map(|_| normal.sample(&mut rng)).collect()
    }

    #[test]
    fn strong_zeros() {
        let mut decoder = Decoder::from_seed(single_check(), 0);
        let output = decoder.decode(&[5.0; 6]).unwrap();
        assert_eq!(output.bits, vec![0, 0]);
        assert!(output.convergence.converged);
        assert_eq!(output.convergence.iterations, 1);
    }

    #[test]
    fn flipped_information_bit() {
        let mut decoder = Decoder::from_seed(single_check(), 0);
        // The check forces both information bits to be equal, and the
        // negative LLR is the most reliable one
        let output = decoder
            .decode(&[-8.0, 5.0, 5.0, 5.0, 5.0, 5.0])
            .unwrap();
        assert_eq!(output.bits, vec![1, 1]);
        assert!(output.convergence.converged);
        let codeword = decoder
            .decode_codeword(&[-8.0, 5.0, 5.0, 5.0, 5.0, 5.0])
            .unwrap();
        assert_eq!(codeword.bits, vec![1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn tied_information_bits() {
        let mut decoder = Decoder::from_seed(single_check(), 0);
        // Both information bits have the same confidence in opposite
        // directions, so the marginals only keep the rounding error of the
        // tanh rule, which is a few ulps above zero for both bits
        let output = decoder
            .decode(&[-5.0, 5.0, 5.0, 5.0, 5.0, 5.0])
            .unwrap();
        assert_eq!(output.bits, vec![0, 0]);
        assert!(output.convergence.converged);
        assert_eq!(output.convergence.iterations, 1);
        let graph = decoder.graph();
        for &v in graph.information_bits() {
            let llr = graph.marginal_llr(v);
            assert!(llr > 0.0 && llr < 1e-12);
        }
    }

    #[test]
    fn frozen_bits_decode_to_zero() {
        let mut decoder = Decoder::from_seed(regular_graph(), 0);
        let llrs = vec![-3.0; 48];
        let output = decoder.decode_codeword(&llrs).unwrap();
        for &f in decoder.graph().frozen_bits() {
            assert_eq!(decoder.graph().marginal_llr(f), f64::INFINITY);
            assert_eq!(output.bits[f], 0);
        }
    }

    #[test]
    fn size_mismatch() {
        let mut decoder = Decoder::from_seed(single_check(), 0);
        let err = Error::InputSizeMismatch {
            expected: 6,
            got: 7,
        };
        assert_eq!(decoder.decode(&[1.0; 7]), Err(err));
        assert_eq!(decoder.decode_codeword(&[1.0; 7]), Err(err));
        assert_eq!(decoder.list_decode(&[1.0; 7], 2), Err(err));
    }

    #[test]
    fn tie_break_uses_rng() {
        // StepRng(0, 0) always produces false bools
        let mut rng = StepRng::new(0, 0);
        assert_eq!(hard_decision(0.0, &mut rng), 0);
        assert_eq!(hard_decision(f64::NAN, &mut rng), 0);
        assert_eq!(hard_decision(-0.0, &mut rng), 0);
        assert_eq!(hard_decision(1e-300, &mut rng), 0);
        assert_eq!(hard_decision(-1e-300, &mut rng), 1);
        let mut rng = StepRng::new(u64::MAX, 0);
        assert_eq!(hard_decision(0.0, &mut rng), 1);
    }

    #[test]
    fn zero_llrs_are_tie_broken() {
        let graph = single_check();
        let mut decoder = Decoder::new(graph.clone(), StepRng::new(0, 0));
        let output = decoder.decode(&[0.0; 6]).unwrap();
        assert_eq!(output.bits, vec![0, 0]);
        assert!(!output.convergence.converged);
        assert_eq!(output.convergence.iterations, MAX_ITERATIONS);
        let mut decoder = Decoder::new(graph, StepRng::new(u64::MAX, 0));
        assert_eq!(decoder.decode(&[0.0; 6]).unwrap().bits, vec![1, 1]);
    }

    #[test]
    fn idempotent() {
        let llrs = noisy_llrs(48, 1);
        let mut a = Decoder::new(regular_graph(), StepRng::new(0, 0));
        let first = a.decode(&llrs).unwrap();
        let second = a.decode(&llrs).unwrap();
        assert_eq!(first, second);
        let mut b = Decoder::new(regular_graph(), StepRng::new(0, 0));
        assert_eq!(b.decode(&llrs).unwrap(), first);
    }

    #[test]
    fn list_size_law() {
        let llrs = noisy_llrs(48, 2);
        for list_size in 1..=40 {
            let mut decoder = Decoder::new(regular_graph(), StepRng::new(0, 0));
            let output = decoder.list_decode(&llrs, list_size).unwrap();
            let expected: usize = 1 << list_size.ilog2();
            assert_eq!(output.candidates.len(), expected);
            assert_eq!(output.flipped.len(), list_size.ilog2() as usize);
            let mut decoder = Decoder::new(regular_graph(), StepRng::new(0, 0));
            assert_eq!(output.candidates[0], decoder.decode(&llrs).unwrap().bits);
        }
    }

    #[test]
    fn list_flip_law() {
        let llrs = noisy_llrs(48, 3);
        let mut decoder = Decoder::new(regular_graph(), StepRng::new(0, 0));
        let output = decoder.list_decode(&llrs, 16).unwrap();
        let graph = decoder.graph();
        let magnitudes = graph
            .information_bits()
            .iter()
            .map(|&v| graph.marginal_llr(v).abs())
            .collect::<Vec<_>>();
        // The flipped bits are the least reliable ones
        let max_flipped = output
            .flipped
            .iter()
            .map(|&p| magnitudes[p])
            .fold(0.0, f64::max);
        for (p, &m) in magnitudes.iter().enumerate() {
            if !output.flipped.contains(&p) {
                assert!(m >= max_flipped);
            }
        }
        // Each candidate differs from an earlier one in exactly one flipped bit
        for (j, candidate) in output.candidates.iter().enumerate().skip(1) {
            let found = output.candidates[..j].iter().any(|earlier| {
                let diffs = earlier
                    .iter()
                    .zip(candidate.iter())
                    .enumerate()
                    .filter(|(_, (a, b))| a != b)
                    .map(|(p, _)| p)
                    .collect::<Vec<_>>();
                diffs.len() == 1 && output.flipped.contains(&diffs[0])
            });
            assert!(found);
        }
    }

    #[test]
    fn list_size_errors() {
        let mut decoder = Decoder::from_seed(single_check(), 0);
        assert_eq!(
            decoder.list_decode(&[1.0; 6], 0),
            Err(Error::InvalidListSize)
        );
        assert_eq!(
            decoder.list_decode(&[1.0; 6], 8),
            Err(Error::ListSizeTooLarge {
                list_size: 8,
                information_bits: 2
            })
        );
        let output = decoder.list_decode(&[1.0; 6], 7).unwrap();
        assert_eq!(
            output.candidates,
            vec![vec![0, 0], vec![1, 0], vec![0, 1], vec![1, 1]]
        );
    }

    #[test]
    fn trait_object() {
        let mut decoder: Box<dyn LdpcDecoder> = Box::new(Decoder::from_seed(single_check(), 0));
        assert_eq!(decoder.graph().code_length(), 6);
        assert_eq!(decoder.decode(&[5.0; 6]).unwrap().bits, vec![0, 0]);
        assert_eq!(decoder.list_decode(&[5.0; 6], 2).unwrap().candidates.len(), 2);
    }
}
