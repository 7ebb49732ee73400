use anyhow::{Context, Result};
use std::path::PathBuf;

use peakalign::experiment::Experiment;
use peakalign::peak::PeakTag;

/// Number of peaks listed in the preview
const PREVIEW_PEAKS: usize = 10;

/// Display information about an experiment file
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let experiment = Experiment::from_json_file(&file).context("Failed to read experiment file")?;

    println!("Experiment Information");
    println!("======================");
    println!("File: {}", file.display());
    println!("Code: {}", experiment.expr_code);
    println!();

    println!("Peak Statistics:");
    println!("  Peaks: {}", experiment.len());
    if let (Some(first), Some(last)) = (experiment.peaks.first(), experiment.peaks.last()) {
        println!(
            "  Retention time: {:.2} - {:.2} s ({:.2} - {:.2} min)",
            first.retention_time,
            last.retention_time,
            first.retention_time / 60.0,
            last.retention_time / 60.0
        );
        println!("  Mass axis points: {}", first.mass_spectrum.len());
        if let Some((lo, hi)) = first.mass_spectrum.mass_range() {
            println!("  Mass range: {:.1} - {:.1}", lo, hi);
        }
    }

    let references = experiment
        .peaks
        .iter()
        .filter(|p| matches!(p.tag, Some(PeakTag::Reference(_))))
        .count();
    let blanks = experiment
        .peaks
        .iter()
        .filter(|p| p.tag == Some(PeakTag::Blank))
        .count();
    println!("  Reference-tagged peaks: {}", references);
    println!("  Blank-tagged peaks: {}", blanks);
    if let Some(reference) = &experiment.ref_peak {
        println!("  Reference peak: {} at {:.2} s", reference.uid(), reference.retention_time);
    }
    println!();

    if !experiment.is_empty() {
        println!("Peaks:");
        for (i, peak) in experiment.peaks.iter().take(PREVIEW_PEAKS).enumerate() {
            println!(
                "  {:3}. {:>9.2} s  area {:>12.4}  {}",
                i + 1,
                peak.retention_time,
                peak.area(),
                peak.uid()
            );
        }
        if experiment.len() > PREVIEW_PEAKS {
            println!("  ... {} more", experiment.len() - PREVIEW_PEAKS);
        }
    }

    Ok(())
}
