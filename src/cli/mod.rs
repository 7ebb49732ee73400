use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use peakalign::alignment::SimilarityMethod;

mod align;
mod demo;
mod info;
mod validate;

mod config;

/// peakalign - GC-MS peak list alignment
#[derive(Parser)]
#[command(name = "peakalign")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Similarity used to build the guide tree.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SimilarityArg {
    /// Match similarity minus gap penalties (default)
    Traceback,
    /// Mean match cost scaled by alignment length
    MeanMatchCost,
}

impl From<SimilarityArg> for SimilarityMethod {
    fn from(arg: SimilarityArg) -> Self {
        match arg {
            SimilarityArg::Traceback => SimilarityMethod::Traceback,
            SimilarityArg::MeanMatchCost => SimilarityMethod::MeanMatchCost,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Align the experiments named in a list file
    Align {
        /// Text file with one experiment JSON path per line
        #[arg(value_name = "LIST")]
        list: PathBuf,

        /// Output CSV of aligned retention times
        #[arg(long, value_name = "FILE", default_value = "rt.csv")]
        rt_out: PathBuf,

        /// Output CSV of aligned peak areas
        #[arg(long, value_name = "FILE", default_value = "area.csv")]
        area_out: PathBuf,

        /// Output CSV of composite (consensus) peaks
        #[arg(long, value_name = "FILE")]
        composite_out: Option<PathBuf>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Retention-time tolerance D in seconds (default: 2.5)
        #[arg(short = 'D', long)]
        rt_tolerance: Option<f64>,

        /// Gap penalty (default: 0.30)
        #[arg(short = 'g', long)]
        gap_penalty: Option<f64>,

        /// Minimum number of peaks per aligned position (default: 1)
        #[arg(short = 'm', long)]
        min_peaks: Option<usize>,

        /// Write retention times in seconds instead of minutes
        #[arg(long)]
        seconds: bool,

        /// Similarity used to build the guide tree
        #[arg(long, value_enum)]
        similarity: Option<SimilarityArg>,

        /// Run pairwise alignments in parallel (requires the parallel feature)
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },

    /// Validate the experiments named in a list file
    Validate {
        /// Text file with one experiment JSON path per line
        #[arg(value_name = "LIST")]
        list: PathBuf,
    },

    /// Display information about an experiment file
    Info {
        /// Experiment JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Generate synthetic experiments for testing
    Demo {
        /// Output directory
        #[arg(value_name = "DIR", default_value = "peakalign_demo")]
        output: PathBuf,

        /// Number of experiments to generate
        #[arg(short = 'n', long, default_value_t = 3)]
        experiments: usize,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Align {
            list,
            rt_out,
            area_out,
            composite_out,
            config,
            rt_tolerance,
            gap_penalty,
            min_peaks,
            seconds,
            similarity,
            parallel,
        } => align::run(align::AlignOptions {
            list,
            rt_out,
            area_out,
            composite_out,
            config,
            rt_tolerance,
            gap_penalty,
            min_peaks,
            seconds,
            similarity: similarity.map(SimilarityMethod::from),
            parallel,
        }),
        Commands::Validate { list } => validate::run(list),
        Commands::Info { file } => info::run(file),
        Commands::Demo {
            output,
            experiments,
            seed,
        } => demo::run(output, experiments, seed),
    }
}
