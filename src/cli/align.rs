use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use peakalign::alignment::{
    align_with_tree, LogProgress, PairwiseAlignment, RunContext, SimilarityMethod,
};
use peakalign::experiment::read_experiment_list;
use peakalign::export::{write_composite_csv, write_csv};
use peakalign::report::{ProcessingHistory, ProcessingStep};
use peakalign::validator::validate_experiments;

use super::config::Config;

/// Settings collected from the command line
pub struct AlignOptions {
    pub list: PathBuf,
    pub rt_out: PathBuf,
    pub area_out: PathBuf,
    pub composite_out: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub rt_tolerance: Option<f64>,
    pub gap_penalty: Option<f64>,
    pub min_peaks: Option<usize>,
    pub seconds: bool,
    pub similarity: Option<SimilarityMethod>,
    pub parallel: bool,
}

/// Processing history lives next to the RT table as `<rt_out>.history.json`
fn history_path(rt_out: &Path) -> PathBuf {
    let mut name = rt_out.as_os_str().to_owned();
    name.push(".history.json");
    PathBuf::from(name)
}

/// Align the experiments named in a list file and write the tables
pub fn run(options: AlignOptions) -> Result<()> {
    let file_config = match &options.config {
        Some(path) => {
            info!("Loading config from: {}", path.display());
            Config::from_file(path)?
        }
        None => Config::default(),
    };

    let mut config = file_config.alignment.to_alignment_config();
    if let Some(d) = options.rt_tolerance {
        config.params.rt_tolerance = d;
    }
    if let Some(g) = options.gap_penalty {
        config.params.gap_penalty = g;
    }
    if let Some(method) = options.similarity {
        config.params.similarity = method;
    }
    if let Some(k) = options.min_peaks {
        config.min_peaks = k;
    }
    if options.seconds {
        config.minutes = false;
    }
    config.validate().context("Invalid alignment settings")?;

    let parallel = options.parallel || file_config.alignment.parallel.unwrap_or(false);
    if parallel && !cfg!(feature = "parallel") {
        warn!("Parallel alignment requested but the 'parallel' feature is not enabled");
    }

    let experiments = read_experiment_list(&options.list)
        .with_context(|| format!("Failed to read experiment list: {}", options.list.display()))?;

    let report = validate_experiments(&experiments);
    if report.has_failures() {
        eprintln!("{}", report);
        bail!("Experiments in {} failed validation", options.list.display());
    }
    if report.has_warnings() {
        warn!("Experiment validation produced {} warning(s)", report.warning_count());
    }

    info!(
        "Aligning {} experiments (D={:.2}s, gap={:.2}, min_peaks={})",
        experiments.len(),
        config.params.rt_tolerance,
        config.params.gap_penalty,
        config.min_peaks
    );

    let ctx = RunContext::new()
        .with_observer(Arc::new(LogProgress))
        .with_parallel(parallel);
    let pairwise = PairwiseAlignment::from_experiments(&experiments, &config.params, &ctx)
        .context("Failed to compute pairwise alignments")?;
    let alignment = align_with_tree(pairwise, config.min_peaks, &ctx)
        .context("Failed to align experiments with guide tree")?;

    write_csv(&alignment, &options.rt_out, &options.area_out, config.minutes)
        .context("Failed to write alignment tables")?;
    if let Some(path) = &options.composite_out {
        write_composite_csv(&alignment, path, config.minutes)
            .context("Failed to write composite peak table")?;
    }

    let mut history = ProcessingHistory::new();
    history.add_step(ProcessingStep::alignment(&config, experiments.len()));
    let history_path = history_path(&options.rt_out);
    history
        .to_json_file(&history_path)
        .context("Failed to write processing history")?;

    println!("Alignment complete!");
    println!("  Experiments: {}", alignment.nrows());
    println!("  Aligned positions: {}", alignment.ncols());
    println!("  Gaps: {}", alignment.gap_count());
    println!("  Retention times: {}", options.rt_out.display());
    println!("  Areas: {}", options.area_out.display());
    if let Some(path) = &options.composite_out {
        println!("  Composite peaks: {}", path.display());
    }
    println!("  History: {}", history_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_path_keeps_rt_extension() {
        assert_eq!(
            history_path(Path::new("out/rt.csv")),
            PathBuf::from("out/rt.csv.history.json")
        );
        assert_eq!(history_path(Path::new("times")), PathBuf::from("times.history.json"));
    }
}
