//! # Random regular Tanner graph construction
//!
//! This builds a Tanner graph in which every variable node has degree `dv` and
//! every check node has degree `dc`. The construction lists `dv` sockets for
//! each variable node, shuffles the sockets uniformly, and assigns consecutive
//! groups of `dc` shuffled sockets to each check node. The degrees are
//! therefore exact, while the connections are random. Repeated edges between
//! the same pair of nodes are not rejected.
//!
//! The bit positions are partitioned as follows. The graph has
//! `n - n * dv / dc` design information bits. The first `k` positions are
//! information bits and the positions between `k` and the design information
//! size are frozen. The remaining positions are neither information nor frozen
//! bits.

use crate::graph::{self, Edge, TannerGraph};
use crate::rand::{Rng, *};
use rand::seq::SliceRandom;
use thiserror::Error;

/// Runtime errors of the regular graph construction.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// The number of edge sockets on the variable side is not divisible by the
    /// check node degree.
    #[error("code length {code_length} times variable degree {variable_degree} is not divisible by check degree {check_degree}")]
    InvalidDegreeConfiguration {
        /// Code length.
        code_length: usize,
        /// Variable node degree.
        variable_degree: usize,
        /// Check node degree.
        check_degree: usize,
    },
    /// The number of information bits is larger than the code length.
    #[error("{information_bits} information bits requested, but the code length is {code_length}")]
    InformationBitsExceedCodeLength {
        /// Number of information bits requested.
        information_bits: usize,
        /// Code length.
        code_length: usize,
    },
    /// The graph could not be assembled.
    #[error(transparent)]
    Graph(#[from] graph::Error),
}

/// Result type used to indicate regular construction runtime errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration for the random regular construction.
///
/// This configuration is used to set the parameters of the
/// Tanner graph to construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Code length (number of variable nodes).
    pub code_length: usize,
    /// Number of information bits.
    pub information_bits: usize,
    /// Degree of the variable nodes.
    pub variable_degree: usize,
    /// Degree of the check nodes.
    pub check_degree: usize,
}

impl Config {
    /// Runs the construction.
    ///
    /// The `seed` is used to obtain repeatable results.
    ///
    /// # Examples
    /// ```
    /// # use ldpc_list_decoder::regular::Config;
    /// let conf = Config {
    ///     code_length: 12,
    ///     information_bits: 4,
    ///     variable_degree: 3,
    ///     check_degree: 6,
    /// };
    /// let graph = conf.run(42).unwrap();
    /// assert_eq!(graph.num_checks(), 6);
    /// assert_eq!(graph.frozen_bits(), &[4, 5]);
    /// ```
    pub fn run(&self, seed: u64) -> Result<TannerGraph> {
        construct_code(
            self.code_length,
            self.information_bits,
            self.variable_degree,
            self.check_degree,
            &mut Rng::seed_from_u64(seed),
        )
    }
}

fn num_checks(code_length: usize, variable_degree: usize, check_degree: usize) -> Result<usize> {
    let sockets = code_length * variable_degree;
    if check_degree == 0 || sockets % check_degree != 0 {
        return Err(Error::InvalidDegreeConfiguration {
            code_length,
            variable_degree,
            check_degree,
        });
    }
    Ok(sockets / check_degree)
}

/// Constructs a random regular Tanner graph.
///
/// The graph has `code_length` variable nodes of degree `variable_degree` and
/// `code_length * variable_degree / check_degree` check nodes of degree
/// `check_degree`. The first `information_bits` positions are information bits
/// and the rest of the design information positions are frozen. If
/// `information_bits` is larger than the design information size, there are
/// no frozen bits and the graph is built anyway, although the information bits
/// then overlap positions that the design rate would use for parity.
///
/// # Errors
/// An error is returned if `code_length * variable_degree` is not divisible by
/// `check_degree`, or if `information_bits` exceeds `code_length`.
pub fn construct_code<R: rand::Rng + ?Sized>(
    code_length: usize,
    information_bits: usize,
    variable_degree: usize,
    check_degree: usize,
    rng: &mut R,
) -> Result<TannerGraph> {
    let num_checks = num_checks(code_length, variable_degree, check_degree)?;
    if information_bits > code_length {
        return Err(Error::InformationBitsExceedCodeLength {
            information_bits,
            code_length,
        });
    }
    let capacity = code_length.saturating_sub(num_checks);
    if information_bits > capacity {
        tracing::warn!(
            information_bits,
            capacity,
            "information bits exceed the design capacity; no bits are frozen"
        );
    }
    let edges = random_edges(code_length, variable_degree, check_degree, rng);
    Ok(TannerGraph::with_partition(
        code_length,
        num_checks,
        edges,
        (0..information_bits).collect(),
        (information_bits..capacity).collect(),
    )?)
}

fn random_edges<R: rand::Rng + ?Sized>(
    code_length: usize,
    variable_degree: usize,
    check_degree: usize,
    rng: &mut R,
) -> Vec<Edge> {
    let mut sockets = (0..code_length * variable_degree)
        .map(|j| j / variable_degree)
        .collect::<Vec<_>>();
    sockets.shuffle(rng);
    sockets
        .into_iter()
        .enumerate()
        .map(|(k, variable)| Edge {
            variable,
            check: k / check_degree,
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn degrees() {
        let conf = Config {
            code_length: 96,
            information_bits: 30,
            variable_degree: 3,
            check_degree: 6,
        };
        for seed in 0..10 {
            let graph = conf.run(seed).unwrap();
            assert_eq!(graph.code_length(), 96);
            assert_eq!(graph.num_checks(), 48);
            assert_eq!(graph.edges().len(), 96 * 3);
            for v in 0..graph.code_length() {
                assert_eq!(graph.variable_degree(v), 3);
            }
            for c in 0..graph.num_checks() {
                assert_eq!(graph.check_degree(c), 6);
            }
        }
    }

    #[test]
    fn partition() {
        let graph = Config {
            code_length: 20,
            information_bits: 6,
            variable_degree: 2,
            check_degree: 4,
        }
        .run(0)
        .unwrap();
        // 10 checks, so the design information size is 10
        assert_eq!(graph.information_bits(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(graph.frozen_bits(), &[6, 7, 8, 9]);
        assert!(graph.is_frozen(9));
        assert!(!graph.is_frozen(10));
        assert_eq!(graph.real_code_length(), 16);
        assert_eq!(graph.rate(), 6.0 / 16.0);
    }

    #[test]
    fn reproducible() {
        let conf = Config {
            code_length: 30,
            information_bits: 10,
            variable_degree: 2,
            check_degree: 3,
        };
        assert_eq!(conf.run(187).unwrap(), conf.run(187).unwrap());
    }

    #[test]
    fn invalid_degrees() {
        let mut rng = Rng::seed_from_u64(0);
        assert_eq!(
            construct_code(5, 2, 3, 4, &mut rng),
            Err(Error::InvalidDegreeConfiguration {
                code_length: 5,
                variable_degree: 3,
                check_degree: 4
            })
        );
        assert!(matches!(
            construct_code(5, 2, 3, 0, &mut rng),
            Err(Error::InvalidDegreeConfiguration { .. })
        ));
    }

    #[test]
    fn information_bits_beyond_capacity() {
        let mut rng = Rng::seed_from_u64(0);
        // The design information size is 6, so the frozen range is empty
        let graph = construct_code(12, 7, 3, 6, &mut rng).unwrap();
        assert_eq!(graph.information_bits(), &[0, 1, 2, 3, 4, 5, 6]);
        assert!(graph.frozen_bits().is_empty());
        assert_eq!(graph.num_checks(), 6);
        // Exactly the capacity gives no frozen bits either
        let graph = construct_code(12, 6, 3, 6, &mut rng).unwrap();
        assert_eq!(graph.information_bits().len(), 6);
        assert!(graph.frozen_bits().is_empty());
        assert_eq!(
            construct_code(12, 13, 3, 6, &mut rng),
            Err(Error::InformationBitsExceedCodeLength {
                information_bits: 13,
                code_length: 12
            })
        );
    }
}
