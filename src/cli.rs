//! `ldpc-list-decoder` CLI application
//!
//! The CLI application is organized in several subcommands. The
//! supported subcommands can be seen by running `ldpc-list-decoder`.
//! See the modules below for examples and more information about
//! how to use each subcommand.
//!
//! Log messages are written to stderr. Their verbosity is controlled with the
//! `RUST_LOG` environment variable (for instance, `RUST_LOG=debug`).

use clap::Parser;
use std::error::Error;

pub mod ber;
pub mod construct;
pub mod decode;

/// Trait to run a CLI subcommand
pub trait Run {
    /// Run the CLI subcommand
    fn run(&self) -> Result<(), Box<dyn Error>>;
}

/// CLI arguments.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    name = "ldpc-list-decoder",
    about = "LDPC belief propagation list decoder"
)]
pub enum Args {
    /// ber subcommand
    BER(ber::Args),
    /// construct subcommand
    Construct(construct::Args),
    /// decode subcommand
    Decode(decode::Args),
}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        match self {
            Args::BER(x) => x.run(),
            Args::Construct(x) => x.run(),
            Args::Decode(x) => x.run(),
        }
    }
}

/// Parses a list of frozen bits.
///
/// The list is given as comma separated bit positions, such as `"2,3,4"`. An
/// empty string gives an empty list.
///
/// # Examples
/// ```
/// # use ldpc_list_decoder::cli::parse_frozen_bits;
/// assert_eq!(parse_frozen_bits("2,3,4"), Ok(vec![2, 3, 4]));
/// assert_eq!(parse_frozen_bits(""), Ok(vec![]));
/// assert!(parse_frozen_bits("2,a").is_err());
/// ```
pub fn parse_frozen_bits(s: &str) -> Result<Vec<usize>, &'static str> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    s.split(',')
        .map(|a| a.trim().parse().map_err(|_| "invalid frozen bit list"))
        .collect()
}

/// Formats a list of frozen bits.
///
/// This produces the format accepted by [`parse_frozen_bits`].
pub fn format_frozen_bits(frozen_bits: &[usize]) -> String {
    frozen_bits
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Formats a word of bits as a string of `0` and `1` characters.
pub fn format_bits(bits: &[u8]) -> String {
    bits.iter().map(|&b| if b == 0 { '0' } else { '1' }).collect()
}
