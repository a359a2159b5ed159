//! Random regular graph construction CLI subcommand.
//!
//! This subcommand builds a random regular Tanner graph with
//! [`regular::Config`](crate::regular::Config). The alist of the graph is
//! written to stdout and the list of frozen bits to stderr, in the format
//! accepted by the `--frozen` option of the [decode](super::decode)
//! subcommand.
//!
//! # Examples
//!
//! A graph with 96 variable nodes of degree 3, check nodes of degree 6, and 40
//! information bits can be constructed with
//! ```shell
//! $ ldpc-list-decoder construct 96 40 3 6 0 > code.alist
//! frozen = 40,41,42,43,44,45,46,47
//! ```

use crate::cli::*;
use crate::regular::Config;
use clap::Parser;
use std::error::Error;

/// Random regular construction CLI arguments.
#[derive(Debug, Parser)]
#[command(about = "Generates random regular Tanner graphs")]
pub struct Args {
    /// Code length (number of variable nodes)
    code_length: usize,
    /// Number of information bits
    information_bits: usize,
    /// Variable node degree
    variable_degree: usize,
    /// Check node degree
    check_degree: usize,
    /// Seed
    seed: u64,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            code_length: self.code_length,
            information_bits: self.information_bits,
            variable_degree: self.variable_degree,
            check_degree: self.check_degree,
        }
    }
}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        let graph = self.config().run(self.seed)?;
        tracing::info!(
            n = graph.code_length(),
            checks = graph.num_checks(),
            k = graph.information_bits().len(),
            frozen = graph.frozen_bits().len(),
            "constructed regular graph"
        );
        eprintln!("frozen = {}", format_frozen_bits(graph.frozen_bits()));
        print!("{}", graph.alist());
        Ok(())
    }
}
