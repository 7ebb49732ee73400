use std::sync::Arc;

use super::AlignmentError;
use crate::experiment::Experiment;
use crate::peak::{MassSpectrum, Peak};

/// One position of an alignment row: a peak or an explicit gap
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// A peak aligned at this position
    Occupied(Arc<Peak>),
    /// No peak from this experiment at this position
    Gap,
}

impl Cell {
    /// The peak in this cell, if any
    pub fn peak(&self) -> Option<&Peak> {
        match self {
            Cell::Occupied(peak) => Some(peak),
            Cell::Gap => None,
        }
    }

    /// True for a gap
    pub fn is_gap(&self) -> bool {
        matches!(self, Cell::Gap)
    }
}

impl From<Peak> for Cell {
    fn from(peak: Peak) -> Self {
        Cell::Occupied(Arc::new(peak))
    }
}

/// Alignment of peak lists from one or more experiments
///
/// Rows correspond to experiments (in `expr_codes` order) and columns to
/// aligned peak positions. Column indices are only meaningful within one
/// alignment. Every row has exactly [`Alignment::ncols`] cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Alignment {
    expr_codes: Vec<String>,
    rows: Vec<Vec<Cell>>,
    ncols: usize,
    similarity: Option<f64>,
}

impl Alignment {
    /// Alignment with no rows and no columns
    pub fn empty() -> Self {
        Self::default()
    }

    /// Singleton alignment: one row holding every peak of the experiment, no gaps
    pub fn from_experiment(expr: &Experiment) -> Self {
        let row: Vec<Cell> = expr.peaks.iter().cloned().map(Cell::from).collect();
        Self {
            expr_codes: vec![expr.expr_code.clone()],
            ncols: row.len(),
            rows: vec![row],
            similarity: None,
        }
    }

    /// Build from explicit rows, checking that every row has the same length
    pub fn from_rows(expr_codes: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, AlignmentError> {
        if expr_codes.len() != rows.len() {
            return Err(AlignmentError::DimensionMismatch(format!(
                "{} experiment codes for {} rows",
                expr_codes.len(),
                rows.len()
            )));
        }
        let ncols = rows.first().map_or(0, Vec::len);
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != ncols {
                return Err(AlignmentError::RowLengthMismatch {
                    row: idx,
                    expected: ncols,
                    found: row.len(),
                });
            }
        }
        Ok(Self {
            expr_codes,
            rows,
            ncols,
            similarity: None,
        })
    }

    /// Build from columns (each column lists one cell per row)
    pub(crate) fn from_columns(
        expr_codes: Vec<String>,
        columns: Vec<Vec<Cell>>,
    ) -> Result<Self, AlignmentError> {
        let nrows = expr_codes.len();
        let mut rows: Vec<Vec<Cell>> = (0..nrows).map(|_| Vec::with_capacity(columns.len())).collect();
        for (idx, column) in columns.into_iter().enumerate() {
            if column.len() != nrows {
                return Err(AlignmentError::DimensionMismatch(format!(
                    "column {} has {} cells, expected {}",
                    idx,
                    column.len(),
                    nrows
                )));
            }
            for (row, cell) in rows.iter_mut().zip(column) {
                row.push(cell);
            }
        }
        Self::from_rows(expr_codes, rows)
    }

    /// Experiment codes in row order
    pub fn expr_codes(&self) -> &[String] {
        &self.expr_codes
    }

    /// Number of rows (experiments)
    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    /// Number of aligned positions
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// True when there are no aligned positions
    pub fn is_empty(&self) -> bool {
        self.ncols == 0
    }

    /// All rows
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Cell at `(row, col)`
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Cells of column `col`, one per row
    pub fn column(&self, col: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().filter_map(move |row| row.get(col))
    }

    /// Peaks (gaps skipped) of column `col`
    pub fn column_peaks(&self, col: usize) -> impl Iterator<Item = &Peak> + '_ {
        self.column(col).filter_map(Cell::peak)
    }

    /// Number of non-gap cells in column `col`
    pub fn column_peak_count(&self, col: usize) -> usize {
        self.column_peaks(col).count()
    }

    /// Mean retention time of the peaks in column `col`
    pub fn column_mean_rt(&self, col: usize) -> Option<f64> {
        let (sum, count) = self
            .column_peaks(col)
            .fold((0.0, 0usize), |(s, n), p| (s + p.retention_time, n + 1));
        (count > 0).then(|| sum / count as f64)
    }

    /// Total number of gap cells
    pub fn gap_count(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_gap()).count()
    }

    /// Similarity score recorded when this alignment was produced by merging
    pub fn similarity(&self) -> Option<f64> {
        self.similarity
    }

    pub(crate) fn set_similarity(&mut self, similarity: f64) {
        self.similarity = Some(similarity);
    }

    /// Drop every column with fewer than `min_peaks` non-gap cells
    ///
    /// Surviving columns keep their order and contents.
    pub fn filter_min_peaks(&mut self, min_peaks: usize) {
        let keep: Vec<bool> = (0..self.ncols)
            .map(|col| self.column_peak_count(col) >= min_peaks)
            .collect();
        for row in &mut self.rows {
            let mut flags = keep.iter();
            row.retain(|_| flags.next().copied().unwrap_or(false));
        }
        self.ncols = keep.iter().filter(|k| **k).count();
    }

    /// Consensus peak for column `col`
    ///
    /// Retention time is the mean over the column's peaks, and the spectrum is
    /// the mean of each peak's spectrum scaled to a maximum intensity of 1.
    /// The area is the mean peak area. Returns `None` for a column without
    /// peaks or whose spectra differ in length.
    pub fn composite_peak(&self, col: usize) -> Option<Peak> {
        let mut peaks = self.column_peaks(col);
        let first = peaks.next()?;

        let mass_list = first.mass_spectrum.mass_list.clone();
        let mut avg_spec = first.mass_spectrum.normalized_to_max();
        let mut avg_rt = first.retention_time;
        let mut avg_area = first.area();
        let mut count = 1usize;

        for peak in peaks {
            if peak.mass_spectrum.len() != avg_spec.len() {
                return None;
            }
            let spec = peak.mass_spectrum.normalized_to_max();
            for (acc, v) in avg_spec.iter_mut().zip(spec) {
                *acc += v;
            }
            avg_rt += peak.retention_time;
            avg_area += peak.area();
            count += 1;
        }

        let n = count as f64;
        avg_spec.iter_mut().for_each(|v| *v /= n);

        Some(Peak {
            retention_time: avg_rt / n,
            raw_area: avg_area / n,
            norm_area: None,
            mass_spectrum: MassSpectrum {
                mass_list,
                intensities: avg_spec,
            },
            tag: None,
        })
    }
}

/// Convert experiments into singleton alignments
pub fn experiments_to_alignments(exprs: &[Experiment]) -> Vec<Alignment> {
    exprs.iter().map(Alignment::from_experiment).collect()
}
