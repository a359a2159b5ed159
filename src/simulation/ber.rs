//! BER simulation
//!
//! This module contains utilities for BER simulation of the list decoder. The
//! all-zero codeword is transmitted, which is a valid codeword of every Tanner
//! graph and respects the frozen bits. Each Eb/N0 point is simulated
//! independently on its own thread with its own copy of the decoder.

use super::channel::BpskAwgn;
use crate::{
    decoder::{self, list, Decoder},
    graph::TannerGraph,
    rand::stream_rng,
};
use rayon::prelude::*;
use std::{
    sync::mpsc::Sender,
    time::{Duration, Instant},
};
use thiserror::Error;

/// BER test error.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// The code does not have any information bits.
    #[error("the code has no information bits")]
    NoInformationBits,
    /// The decoder returned an error.
    #[error(transparent)]
    Decoder(#[from] decoder::Error),
}

/// BER test.
///
/// This struct is used to configure and run a BER test.
#[derive(Debug)]
pub struct BerTest {
    graph: TannerGraph,
    list_size: usize,
    ebn0s_db: Vec<f32>,
    max_frame_errors: u64,
    max_frames: Option<u64>,
    seed: u64,
    reporter: Option<Reporter>,
}

/// BER test parameters.
#[derive(Debug)]
pub struct BerTestParameters<'a> {
    /// Tanner graph of the code.
    pub graph: TannerGraph,
    /// List size (1 disables list decoding).
    pub list_size: usize,
    /// List of Eb/N0 values to test, in dB.
    pub ebn0s_db: &'a [f32],
    /// Number of frame errors to collect for each Eb/N0.
    pub max_frame_errors: u64,
    /// Maximum number of frames to simulate for each Eb/N0.
    pub max_frames: Option<u64>,
    /// Seed for the simulation RNGs.
    pub seed: u64,
    /// Progress reporter.
    pub reporter: Option<Reporter>,
}

/// Progress reporter.
///
/// A reporter can optionally be passed to the BER test on construction to
/// receive messages with the statistics of the test while it is running.
#[derive(Debug, Clone)]
pub struct Reporter {
    /// Sender element of a channel used to send the reports.
    pub tx: Sender<Report>,
    /// Reporting interval.
    pub interval: Duration,
}

/// BER test progress report.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// Statistics of one of the Eb/N0 points.
    Statistics {
        /// Index of the Eb/N0 point.
        index: usize,
        /// Current statistics of that point.
        statistics: Statistics,
    },
    /// The BER test has finished.
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
struct CurrentStatistics {
    num_frames: u64,
    bit_errors: u64,
    frame_errors: u64,
    list_frame_errors: u64,
    false_decodes: u64,
    total_iterations: u64,
    start: Instant,
}

/// BER test statistics.
///
/// This structure contains the statistics for a single Eb/N0 case in a BER
/// test.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    /// Eb/N0 in dB units.
    pub ebn0_db: f32,
    /// Number of frames tested.
    pub num_frames: u64,
    /// Number of information bit errors in the first list candidate.
    pub bit_errors: u64,
    /// Number of frames whose first list candidate has errors.
    pub frame_errors: u64,
    /// Number of frames for which no list candidate is correct.
    pub list_frame_errors: u64,
    /// Number of frames falsely decoded.
    ///
    /// This are frames for which the message passing converged to a word
    /// satisfying all the checks, but the information bits are wrong.
    pub false_decodes: u64,
    /// Bit error rate.
    pub ber: f64,
    /// Frame error rate.
    pub fer: f64,
    /// Frame error rate of the list.
    pub list_fer: f64,
    /// Average message passing iterations.
    pub average_iterations: f64,
    /// Elapsed time for this test case.
    pub elapsed: Duration,
    /// Throughput in Mbps (referred to information bits).
    pub throughput_mbps: f64,
}

impl BerTest {
    /// Creates a new BER test.
    ///
    /// This function only defines the BER test. To run it it is necessary to
    /// call the [`BerTest::run`] method.
    ///
    /// # Errors
    /// An error is returned if the code has no information bits or if the
    /// list size is not valid for the code.
    pub fn new(parameters: BerTestParameters<'_>) -> Result<BerTest, Error> {
        let k = parameters.graph.information_bits().len();
        if k == 0 {
            return Err(Error::NoInformationBits);
        }
        list::ambiguous_bit_count(parameters.list_size, k)?;
        Ok(BerTest {
            graph: parameters.graph,
            list_size: parameters.list_size,
            ebn0s_db: parameters.ebn0s_db.to_owned(),
            max_frame_errors: parameters.max_frame_errors,
            max_frames: parameters.max_frames,
            seed: parameters.seed,
            reporter: parameters.reporter,
        })
    }

    /// Returns the number of information bits of the code.
    pub fn k(&self) -> usize {
        self.graph.information_bits().len()
    }

    /// Returns the codeword size of the code.
    pub fn n(&self) -> usize {
        self.graph.code_length()
    }

    /// Returns the rate of the code.
    pub fn rate(&self) -> f64 {
        self.graph.rate()
    }

    /// Returns the rate of the code taking into account the list size.
    pub fn list_rate(&self) -> f64 {
        self.graph.list_rate(self.list_size)
    }

    /// Runs the BER test.
    ///
    /// This function runs the BER test until completion. It returns a list of
    /// statistics for each Eb/N0, or an error.
    pub fn run(self) -> Result<Vec<Statistics>, Error> {
        tracing::debug!(
            n = self.n(),
            k = self.k(),
            list_size = self.list_size,
            points = self.ebn0s_db.len(),
            "starting BER test"
        );
        let statistics = self
            .ebn0s_db
            .par_iter()
            .enumerate()
            .map(|(index, &ebn0_db)| self.run_point(index, ebn0_db))
            .collect::<Result<Vec<_>, _>>();
        if let Some(reporter) = &self.reporter {
            let _ = reporter.tx.send(Report::Finished);
        }
        statistics
    }

    fn run_point(&self, index: usize, ebn0_db: f32) -> Result<Statistics, Error> {
        let stream = 2 * index as u64;
        let mut decoder = Decoder::new(self.graph.clone(), stream_rng(self.seed, stream));
        let mut rng = stream_rng(self.seed, stream + 1);
        let channel = BpskAwgn::from_ebn0_db(f64::from(ebn0_db), self.rate());
        let codeword = vec![0; self.n()];
        let mut current = CurrentStatistics::new();
        let mut last_report = Instant::now();
        while current.frame_errors < self.max_frame_errors
            && self.max_frames.map_or(true, |m| current.num_frames < m)
        {
            let llrs = channel.transmit(&mut rng, &codeword);
            let output = decoder.list_decode(&llrs, self.list_size)?;
            let bit_errors = output.candidates[0]
                .iter()
                .filter(|&&b| b != 0)
                .count() as u64;
            current.bit_errors += bit_errors;
            if bit_errors > 0 {
                current.frame_errors += 1;
                if output.convergence.converged {
                    current.false_decodes += 1;
                }
            }
            if !output
                .candidates
                .iter()
                .any(|candidate| candidate.iter().all(|&b| b == 0))
            {
                current.list_frame_errors += 1;
            }
            current.total_iterations += output.convergence.iterations as u64;
            current.num_frames += 1;
            if let Some(reporter) = &self.reporter {
                if last_report.elapsed() >= reporter.interval {
                    last_report = Instant::now();
                    self.report(reporter, index, &current, ebn0_db);
                }
            }
        }
        let statistics = Statistics::from_current(&current, ebn0_db, self.k());
        tracing::debug!(
            ebn0_db,
            frames = statistics.num_frames,
            ber = statistics.ber,
            fer = statistics.fer,
            list_fer = statistics.list_fer,
            "BER point finished"
        );
        if let Some(reporter) = &self.reporter {
            self.report(reporter, index, &current, ebn0_db);
        }
        Ok(statistics)
    }

    fn report(&self, reporter: &Reporter, index: usize, current: &CurrentStatistics, ebn0_db: f32) {
        // the receiver might have gone away; the test continues anyway
        let _ = reporter.tx.send(Report::Statistics {
            index,
            statistics: Statistics::from_current(current, ebn0_db, self.k()),
        });
    }
}

impl CurrentStatistics {
    fn new() -> CurrentStatistics {
        CurrentStatistics {
            num_frames: 0,
            bit_errors: 0,
            frame_errors: 0,
            list_frame_errors: 0,
            false_decodes: 0,
            total_iterations: 0,
            start: Instant::now(),
        }
    }
}

impl Statistics {
    fn from_current(stats: &CurrentStatistics, ebn0_db: f32, k: usize) -> Statistics {
        let elapsed = Instant::now() - stats.start;
        let frames = stats.num_frames as f64;
        Statistics {
            ebn0_db,
            num_frames: stats.num_frames,
            bit_errors: stats.bit_errors,
            frame_errors: stats.frame_errors,
            list_frame_errors: stats.list_frame_errors,
            false_decodes: stats.false_decodes,
            ber: stats.bit_errors as f64 / (k as f64 * frames),
            fer: stats.frame_errors as f64 / frames,
            list_fer: stats.list_frame_errors as f64 / frames,
            average_iterations: stats.total_iterations as f64 / frames,
            elapsed,
            throughput_mbps: 1e-6 * (k as f64 * frames) / elapsed.as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::regular::Config;
    use std::sync::mpsc;

    fn graph() -> TannerGraph {
        Config {
            code_length: 96,
            information_bits: 40,
            variable_degree: 3,
            check_degree: 6,
        }
        .run(0)
        .unwrap()
    }

    #[test]
    fn high_snr_has_no_errors() {
        let test = BerTest::new(BerTestParameters {
            graph: graph(),
            list_size: 4,
            ebn0s_db: &[12.0],
            max_frame_errors: 1,
            max_frames: Some(20),
            seed: 0,
            reporter: None,
        })
        .unwrap();
        assert_eq!(test.k(), 40);
        assert_eq!(test.n(), 96);
        let stats = test.run().unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].num_frames, 20);
        assert_eq!(stats[0].frame_errors, 0);
        assert_eq!(stats[0].list_frame_errors, 0);
        assert_eq!(stats[0].ber, 0.0);
    }

    #[test]
    fn reports_each_point_then_finishes() {
        let (tx, rx) = mpsc::channel();
        let test = BerTest::new(BerTestParameters {
            graph: graph(),
            list_size: 16,
            ebn0s_db: &[0.0, 1.0],
            max_frame_errors: 10,
            max_frames: Some(200),
            seed: 1,
            reporter: Some(Reporter {
                tx,
                interval: Duration::from_secs(3600),
            }),
        })
        .unwrap();
        let stats = test.run().unwrap();
        for s in &stats {
            assert!(s.list_frame_errors <= s.frame_errors);
        }
        // one final report per point, then the end of the test
        let reports = rx.iter().collect::<Vec<_>>();
        assert_eq!(reports.len(), 3);
        assert_eq!(reports.last(), Some(&Report::Finished));
    }

    #[test]
    fn invalid_parameters() {
        let frozen = (0..6).collect::<Vec<_>>();
        let edges = (0..6).map(|variable| crate::graph::Edge { variable, check: 0 });
        let all_frozen = TannerGraph::new(6, 1, edges, frozen.iter()).unwrap();
        let params = |graph, list_size| BerTestParameters {
            graph,
            list_size,
            ebn0s_db: &[0.0],
            max_frame_errors: 1,
            max_frames: None,
            seed: 0,
            reporter: None,
        };
        assert!(matches!(
            BerTest::new(params(all_frozen, 1)),
            Err(Error::NoInformationBits)
        ));
        assert!(matches!(
            BerTest::new(params(graph(), 0)),
            Err(Error::Decoder(decoder::Error::InvalidListSize))
        ));
    }
}
