use log::info;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{Experiment, ExperimentError};

impl Experiment {
    /// Save the experiment as pretty-printed JSON
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ExperimentError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        info!("Experiment '{}' saved as '{}'", self.expr_code, path.display());
        Ok(())
    }

    /// Load an experiment saved with [`Experiment::to_json_file`]
    ///
    /// Peaks are re-ordered by retention time after loading.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ExperimentError> {
        let path = path.as_ref();
        info!("Loading experiment from '{}'", path.display());
        let reader = BufReader::new(File::open(path)?);
        Self::from_reader(reader)
    }

    /// Parse an experiment from any JSON reader
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, ExperimentError> {
        let expr: Experiment = serde_json::from_reader(reader)?;
        let mut ordered = Experiment::new(expr.expr_code, expr.peaks);
        ordered.ref_peak = expr.ref_peak;
        Ok(ordered)
    }
}

/// Read a list file naming one experiment JSON file per line
///
/// Blank lines and lines starting with `#` are ignored. Relative paths are
/// resolved against the directory containing the list file.
pub fn read_experiment_list<P: AsRef<Path>>(path: P) -> Result<Vec<Experiment>, ExperimentError> {
    let path = path.as_ref();
    let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let reader = BufReader::new(File::open(path)?);

    let mut experiments = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let entry = line.trim();
        if entry.is_empty() || entry.starts_with('#') {
            continue;
        }

        let mut expr_path = PathBuf::from(entry);
        if expr_path.is_relative() {
            expr_path = base.join(expr_path);
        }
        experiments.push(Experiment::from_json_file(&expr_path)?);
    }

    info!("Read {} experiment(s) from '{}'", experiments.len(), path.display());
    Ok(experiments)
}
