//! BER test CLI subcommand.
//!
//! This subcommand can be used to perform a BER test of the list decoder on a
//! random regular Tanner graph. The all-zero codeword is transmitted with BPSK
//! over an AWGN channel. Besides the usual BER and FER of the first list
//! candidate, the FER of the list is reported. This counts the frames for which
//! the transmitted word is not among the candidates.
//!
//! The Eb/N0 points are simulated in parallel. The progress table is updated
//! while the simulation runs.
//!
//! # Examples
//!
//! A rate 5/12 code with 96 variable nodes can be simulated using a list of 16
//! candidates with
//! ```shell
//! $ ldpc-list-decoder ber --min-ebn0 0.0 --max-ebn0 4.05 --step-ebn0 0.5 \
//!       --list-size 16 96 40 3 6
//! ```

use crate::{
    cli::*,
    regular::Config,
    simulation::ber::{BerTest, BerTestParameters, Report, Reporter, Statistics},
};
use clap::{builder::RangedU64ValueParser, Parser};
use console::Term;
use std::{
    error::Error,
    fs::File,
    io::Write,
    sync::mpsc::{self, Receiver},
    time::Duration,
};

/// BER test CLI arguments.
#[derive(Debug, Parser)]
#[command(about = "Performs a BER simulation")]
pub struct Args {
    /// Code length (number of variable nodes)
    code_length: usize,
    /// Number of information bits
    information_bits: usize,
    /// Variable node degree
    variable_degree: usize,
    /// Check node degree
    check_degree: usize,
    /// Seed for the graph construction
    #[arg(long, default_value_t = 0)]
    graph_seed: u64,
    /// Output file for simulation results
    #[arg(long)]
    output_file: Option<String>,
    /// List size
    #[arg(
        long,
        default_value_t = 1,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    list_size: usize,
    /// Minimum Eb/N0 (dB)
    #[arg(long)]
    min_ebn0: f64,
    /// Maximum Eb/N0 (dB)
    #[arg(long)]
    max_ebn0: f64,
    /// Eb/N0 step (dB)
    #[arg(long)]
    step_ebn0: f64,
    /// Number of frame errors to collect
    #[arg(long, default_value = "100")]
    frame_errors: u64,
    /// Maximum number of frames to simulate for each Eb/N0
    #[arg(long)]
    max_frames: Option<u64>,
    /// Seed for the channel noise and the decoder
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        let graph = Config {
            code_length: self.code_length,
            information_bits: self.information_bits,
            variable_degree: self.variable_degree,
            check_degree: self.check_degree,
        }
        .run(self.graph_seed)?;
        let mut output_file = if let Some(f) = &self.output_file {
            Some(File::create(f)?)
        } else {
            None
        };
        let ebn0s = self.ebn0s();
        let (report_tx, report_rx) = mpsc::channel();
        let reporter = Reporter {
            tx: report_tx,
            interval: Duration::from_millis(500),
        };
        let test = BerTest::new(BerTestParameters {
            graph,
            list_size: self.list_size,
            ebn0s_db: &ebn0s,
            max_frame_errors: self.frame_errors,
            max_frames: self.max_frames,
            seed: self.seed,
            reporter: Some(reporter),
        })?;
        self.write_details(std::io::stdout(), &test)?;
        if let Some(f) = &mut output_file {
            self.write_details(&*f, &test)?;
        }
        tracing::info!(points = ebn0s.len(), "starting BER test");
        let mut progress = Progress::new(report_rx, ebn0s.len(), output_file);
        let progress = std::thread::spawn(move || progress.run());
        test.run()?;
        // This block cannot actually be written with the ? operator
        #[allow(clippy::question_mark)]
        if let Err(e) = progress.join().map_err(|_| "progress thread panicked")? {
            return Err(e);
        }
        Ok(())
    }
}

impl Args {
    fn ebn0s(&self) -> Vec<f32> {
        let num_ebn0s = ((self.max_ebn0 - self.min_ebn0) / self.step_ebn0).floor() as usize + 1;
        (0..num_ebn0s)
            .map(|k| (self.min_ebn0 + k as f64 * self.step_ebn0) as f32)
            .collect()
    }

    fn write_details<W: Write>(&self, mut f: W, test: &BerTest) -> std::io::Result<()> {
        writeln!(f, "BER TEST PARAMETERS")?;
        writeln!(f, "-------------------")?;
        writeln!(f, "Simulation:")?;
        writeln!(f, " - Minimum Eb/N0: {:.2} dB", self.min_ebn0)?;
        writeln!(f, " - Maximum Eb/N0: {:.2} dB", self.max_ebn0)?;
        writeln!(f, " - Eb/N0 step: {:.2} dB", self.step_ebn0)?;
        writeln!(f, " - Number of frame errors: {}", self.frame_errors)?;
        if let Some(max_frames) = self.max_frames {
            writeln!(f, " - Maximum number of frames: {max_frames}")?;
        }
        writeln!(f, " - Seed: {}", self.seed)?;
        writeln!(f, "Channel:")?;
        writeln!(f, " - Modulation: BPSK")?;
        writeln!(f, "LDPC code:")?;
        writeln!(
            f,
            " - Regular graph: dv = {}, dc = {}, seed = {}",
            self.variable_degree, self.check_degree, self.graph_seed
        )?;
        writeln!(f, " - Information bits (k): {}", test.k())?;
        writeln!(f, " - Codeword size (N): {}", test.n())?;
        writeln!(f, " - Code rate: {:.3}", test.rate())?;
        writeln!(f, "LDPC decoder:")?;
        writeln!(f, " - List size: {}", self.list_size)?;
        writeln!(f, " - Rate with list: {:.3}", test.list_rate())?;
        writeln!(f)?;
        Ok(())
    }
}

#[derive(Debug)]
struct Progress {
    rx: Receiver<Report>,
    term: Term,
    rows: Vec<Option<Statistics>>,
    output_file: Option<File>,
}

impl Progress {
    fn new(rx: Receiver<Report>, num_points: usize, output_file: Option<File>) -> Progress {
        Progress {
            rx,
            term: Term::stdout(),
            rows: vec![None; num_points],
            output_file,
        }
    }

    fn run(&mut self) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
        ctrlc::set_handler({
            let term = self.term.clone();
            move || {
                let _ = term.write_line("");
                let _ = term.show_cursor();
                std::process::exit(0);
            }
        })?;

        let ret = self.work();
        self.term.write_line("")?;
        self.term.show_cursor()?;
        ret
    }

    fn work(&mut self) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
        self.term.set_title("ldpc-list-decoder ber");
        self.term.hide_cursor()?;
        self.term.write_line(Self::format_header())?;
        let mut printed = 0;
        // the test sends Finished after all the points are done, or when it
        // fails, in which case the sender is dropped
        while let Ok(Report::Statistics { index, statistics }) = self.rx.recv() {
            if let Some(row) = self.rows.get_mut(index) {
                *row = Some(statistics);
            }
            if printed > 0 {
                self.term.clear_last_lines(printed)?;
            }
            printed = 0;
            for stats in self.rows.iter().flatten() {
                self.term.write_line(&Self::format_progress(stats))?;
                printed += 1;
            }
        }
        if let Some(f) = &mut self.output_file {
            writeln!(f, "{}", Self::format_header())?;
            for stats in self.rows.iter().flatten() {
                writeln!(f, "{}", Self::format_progress(stats))?;
            }
        }
        Ok(())
    }

    fn format_header() -> &'static str {
        "  Eb/N0 |   Frames | Bit errs | Frame er | False de |     BER |     FER | List FER | Avg iter | Throughp | Elapsed\n\
         --------|----------|----------|----------|----------|---------|---------|----------|----------|----------|----------"
    }

    fn format_progress(stats: &Statistics) -> String {
        format!(
            "{:7.2} | {:8} | {:8} | {:8} | {:8} | {:7.2e} | {:7.2e} | {:8.2e} | {:8.1} | {:8.3} | {}",
            stats.ebn0_db,
            stats.num_frames,
            stats.bit_errors,
            stats.frame_errors,
            stats.false_decodes,
            stats.ber,
            stats.fer,
            stats.list_fer,
            stats.average_iterations,
            stats.throughput_mbps,
            humantime::format_duration(Duration::from_secs(stats.elapsed.as_secs()))
        )
    }
}
