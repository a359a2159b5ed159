//! Decode CLI subcommand.
//!
//! This subcommand decodes frames of channel LLRs with belief propagation. The
//! LLRs are read from a file, or from stdin if no file is given, with one frame
//! per line and the LLRs of a frame separated by whitespace. Blank lines are
//! ignored. A positive LLR favours the bit 0.
//!
//! For each frame the decoded bits are printed as a line of `0` and `1`
//! characters. By default the information bits are printed. With
//! `--codeword`, all the bits of the codeword are printed instead. With a
//! `--list-size` larger than one, the information bits are list decoded and
//! one line is printed per candidate, with an empty line after the candidates
//! of each frame.
//!
//! # Examples
//!
//! List decoding with 4 candidates a code constructed with the
//! [construct](super::construct) subcommand:
//! ```shell
//! $ ldpc-list-decoder decode --frozen 40,41,42,43,44,45,46,47 \
//!       --list-size 4 code.alist llrs.txt
//! ```

use crate::{cli::*, decoder::Decoder, graph::TannerGraph};
use clap::{builder::RangedU64ValueParser, Parser};
use std::{
    error::Error,
    fs::File,
    io::{BufRead, BufReader, Write},
    path::PathBuf,
};

/// Decode CLI arguments.
#[derive(Debug, Parser)]
#[command(about = "Decodes LLR frames")]
pub struct Args {
    /// alist file for the code
    alist: PathBuf,
    /// Input file with one frame of LLRs per line (defaults to stdin)
    input: Option<PathBuf>,
    /// Frozen bits (format "2,3,4")
    #[arg(long, default_value = "")]
    frozen: String,
    /// List size
    #[arg(
        long,
        default_value_t = 1,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    list_size: usize,
    /// Print the full codeword instead of the information bits
    #[arg(long, conflicts_with = "list_size")]
    codeword: bool,
    /// Seed for the tie-breaking RNG
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        let frozen = parse_frozen_bits(&self.frozen)?;
        let graph = TannerGraph::from_alist(&std::fs::read_to_string(&self.alist)?, frozen.iter())?;
        let mut decoder = Decoder::from_seed(graph, self.seed);
        let input: Box<dyn BufRead> = match &self.input {
            Some(path) => Box::new(BufReader::new(File::open(path)?)),
            None => Box::new(std::io::stdin().lock()),
        };
        let stdout = std::io::stdout();
        let mut output = stdout.lock();
        let mut frames = 0u64;
        let mut converged = 0u64;
        for (line_number, line) in input.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let llrs = parse_llrs(&line)
                .map_err(|e| format!("line {}: {}", line_number + 1, e))?;
            let convergence = if self.codeword {
                let decoded = decoder.decode_codeword(&llrs)?;
                writeln!(output, "{}", format_bits(&decoded.bits))?;
                decoded.convergence
            } else if self.list_size != 1 {
                let decoded = decoder.list_decode(&llrs, self.list_size)?;
                for candidate in &decoded.candidates {
                    writeln!(output, "{}", format_bits(candidate))?;
                }
                writeln!(output)?;
                decoded.convergence
            } else {
                let decoded = decoder.decode(&llrs)?;
                writeln!(output, "{}", format_bits(&decoded.bits))?;
                decoded.convergence
            };
            tracing::debug!(
                frame = frames,
                iterations = convergence.iterations,
                converged = convergence.converged,
                "frame decoded"
            );
            frames += 1;
            if convergence.converged {
                converged += 1;
            }
        }
        tracing::info!(frames, converged, "decoding finished");
        Ok(())
    }
}

/// Parses a frame of whitespace separated LLRs.
fn parse_llrs(line: &str) -> Result<Vec<f64>, std::num::ParseFloatError> {
    line.split_whitespace().map(str::parse).collect()
}
