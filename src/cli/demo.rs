use anyhow::{Context, Result};
use log::info;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use peakalign::experiment::Experiment;
use peakalign::peak::{MassSpectrum, Peak, PeakTag};

const MASS_MIN: usize = 50;
const MASS_MAX: usize = 300;
const COMPOUNDS: usize = 24;
const RT_START: f64 = 300.0;
const RT_STEP: f64 = 45.0;
const RT_JITTER: f64 = 1.5;
const DROP_PROBABILITY: f64 = 0.1;

struct Compound {
    retention_time: f64,
    area: f64,
    intensities: Vec<f64>,
}

/// Generate synthetic GC-MS peak lists
pub fn run(output: PathBuf, experiments: usize, seed: u64) -> Result<()> {
    info!("peakalign demo data generator");
    info!("=============================");

    if experiments == 0 {
        anyhow::bail!("At least one experiment must be generated");
    }

    fs::create_dir_all(&output)
        .with_context(|| format!("Failed to create directory: {}", output.display()))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let library = compound_library(&mut rng);
    let mass_list: Vec<f64> = (MASS_MIN..=MASS_MAX).map(|m| m as f64).collect();

    let list_path = output.join("experiments.txt");
    let mut list = fs::File::create(&list_path)
        .with_context(|| format!("Failed to create list file: {}", list_path.display()))?;

    let mut total_peaks = 0;
    for i in 0..experiments {
        let code = format!("expr_{:02}", i + 1);
        let experiment = synthetic_experiment(&code, &library, &mass_list, &mut rng)?;
        total_peaks += experiment.len();

        let file_name = format!("{}.json", code);
        experiment
            .to_json_file(output.join(&file_name))
            .with_context(|| format!("Failed to write experiment {}", code))?;
        writeln!(list, "{}", file_name)?;

        info!("  {}: {} peaks", code, experiment.len());
    }

    println!("Demo data generated!");
    println!("  Directory: {}", output.display());
    println!("  Experiments: {}", experiments);
    println!("  Total peaks: {}", total_peaks);
    println!("  List file: {}", list_path.display());
    println!();
    println!("Align with: peakalign align {}", list_path.display());

    Ok(())
}

fn compound_library(rng: &mut StdRng) -> Vec<Compound> {
    let axis_len = MASS_MAX - MASS_MIN + 1;
    (0..COMPOUNDS)
        .map(|i| {
            // A handful of dominant fragment ions over a low baseline
            let mut intensities: Vec<f64> = (0..axis_len).map(|_| rng.gen_range(0.0..5.0)).collect();
            for _ in 0..rng.gen_range(3..8) {
                let ion = rng.gen_range(0..axis_len);
                intensities[ion] += rng.gen_range(100.0..1000.0);
            }
            Compound {
                retention_time: RT_START + i as f64 * RT_STEP,
                area: rng.gen_range(1.0e4..1.0e6),
                intensities,
            }
        })
        .collect()
}

fn synthetic_experiment(
    code: &str,
    library: &[Compound],
    mass_list: &[f64],
    rng: &mut StdRng,
) -> Result<Experiment> {
    let mut peaks = Vec::with_capacity(library.len());
    for (i, compound) in library.iter().enumerate() {
        // First compound is the internal standard and is always present
        if i > 0 && rng.gen_bool(DROP_PROBABILITY) {
            continue;
        }

        let rt = compound.retention_time + rng.gen_range(-RT_JITTER..RT_JITTER);
        let area = compound.area * rng.gen_range(0.8..1.2);
        let intensities = compound
            .intensities
            .iter()
            .map(|v| v * rng.gen_range(0.9..1.1))
            .collect();
        let spectrum = MassSpectrum::new(mass_list.to_vec(), intensities)?;

        let mut peak = Peak::new(rt, area)?.with_mass_spectrum(spectrum);
        if i == 0 {
            peak = peak.with_tag(PeakTag::Reference("istd".to_string()));
        }
        peaks.push(peak);
    }

    Ok(Experiment::new(code, peaks))
}
