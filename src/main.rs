//! # peakalign
//!
//! Command-line tool for aligning GC-MS peak lists across experiments.
//!
//! ## Usage
//!
//! ```bash
//! # Generate synthetic experiments
//! peakalign demo demo_data --experiments 4
//!
//! # Check the inputs
//! peakalign validate demo_data/experiments.txt
//!
//! # Align them
//! peakalign align demo_data/experiments.txt --rt-out rt.csv --area-out area.csv
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
