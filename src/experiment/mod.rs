//! # Experiments
//!
//! An [`Experiment`] is one GC-MS run: a code name plus its peak list ordered
//! by retention time. The operations here prepare a peak list before it is
//! turned into a singleton alignment (reference peak handling, blank removal,
//! area normalisation and peak selection).

mod error;
mod io;

pub use error::ExperimentError;
pub use io::read_experiment_list;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::peak::{Peak, PeakTag};

/// Parse a time string of the form `"<number>s"` or `"<number>m"` into seconds
pub fn parse_time_str(time: &str) -> Result<f64, ExperimentError> {
    let trimmed = time.trim();
    let invalid = || ExperimentError::InvalidTimeString(time.to_string());

    let (number, scale) = if let Some(value) = trimmed.strip_suffix('s') {
        (value, 1.0)
    } else if let Some(value) = trimmed.strip_suffix('m') {
        (value, 60.0)
    } else {
        return Err(invalid());
    };

    let value: f64 = number.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(value * scale)
}

/// A single experimental run and its detected peaks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    /// Code name identifying the run
    pub expr_code: String,
    /// Peaks ordered by retention time
    pub peaks: Vec<Peak>,
    /// Reference peak selected by [`Experiment::set_ref_peak`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_peak: Option<Peak>,
}

impl Experiment {
    /// Create an experiment, ordering the peaks by retention time
    pub fn new(expr_code: impl Into<String>, mut peaks: Vec<Peak>) -> Self {
        peaks.sort_by(|a, b| a.retention_time.total_cmp(&b.retention_time));
        Self {
            expr_code: expr_code.into(),
            peaks,
            ref_peak: None,
        }
    }

    /// Number of peaks
    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    /// True when the experiment has no peaks
    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// Select the reference peak named `ref_tag` and remove every reference peak from the list
    ///
    /// `ref_tag` is the name after the `rf-` prefix, e.g. `"si"` for a peak
    /// tagged `rf-si`.
    pub fn set_ref_peak(&mut self, ref_tag: &str) -> Result<(), ExperimentError> {
        let wanted = ref_tag.trim().to_lowercase();
        let mut ref_peaks: HashMap<String, usize> = HashMap::new();

        for (idx, peak) in self.peaks.iter().enumerate() {
            if let Some(PeakTag::Reference(name)) = &peak.tag {
                if ref_peaks.insert(name.clone(), idx).is_some() {
                    return Err(ExperimentError::DuplicateReference {
                        code: self.expr_code.clone(),
                        tag: name.clone(),
                    });
                }
            }
        }

        if ref_peaks.is_empty() {
            return Err(ExperimentError::NoReferencePeaks(self.expr_code.clone()));
        }

        let chosen = *ref_peaks
            .get(&wanted)
            .ok_or_else(|| ExperimentError::ReferenceNotFound {
                code: self.expr_code.clone(),
                tag: wanted.clone(),
            })?;

        let ref_peak = self.peaks[chosen].clone();
        info!(
            "Experiment {}: reference peak '{}' found @ {:.3} s",
            self.expr_code,
            wanted,
            ref_peak.retention_time
        );
        self.ref_peak = Some(ref_peak);

        let before = self.peaks.len();
        self.peaks.retain(|p| !p.is_reference());
        debug!(
            "Experiment {}: removed {} reference peak(s)",
            self.expr_code,
            before - self.peaks.len()
        );
        Ok(())
    }

    /// Remove peaks tagged as blank; returns the number removed
    pub fn remove_blank_peaks(&mut self) -> usize {
        let before = self.peaks.len();
        self.peaks.retain(|p| p.tag != Some(PeakTag::Blank));
        let removed = before - self.peaks.len();
        if removed == 0 {
            debug!("Experiment {}: no blank peaks to remove", self.expr_code);
        } else {
            info!("Experiment {}: removed {} blank peak(s)", self.expr_code, removed);
        }
        removed
    }

    /// Set each peak's normalised area to its raw area divided by the reference area
    ///
    /// With `to_reference == false` the reference area is taken as 1.0.
    pub fn normalise_peaks(&mut self, to_reference: bool) -> Result<(), ExperimentError> {
        let ref_area = if to_reference {
            let peak = self
                .ref_peak
                .as_ref()
                .ok_or_else(|| ExperimentError::ReferenceNotSet(self.expr_code.clone()))?;
            if peak.raw_area == 0.0 {
                return Err(ExperimentError::InvalidArgument(format!(
                    "reference peak of '{}' has zero area",
                    self.expr_code
                )));
            }
            peak.raw_area
        } else {
            1.0
        };

        self.peaks = self
            .peaks
            .iter()
            .map(|p| p.with_norm_area(p.raw_area / ref_area))
            .collect();
        Ok(())
    }

    /// Keep the `n` peaks with the largest area, preserving retention-time order
    pub fn select_top_peaks(&mut self, n: usize) {
        let mut peaks = std::mem::take(&mut self.peaks);
        peaks.sort_by(|a, b| b.area().total_cmp(&a.area()));
        peaks.truncate(n);
        peaks.sort_by(|a, b| a.retention_time.total_cmp(&b.retention_time));
        self.peaks = peaks;
        info!("Experiment {}: {} strongest peaks selected", self.expr_code, self.peaks.len());
    }

    /// Drop peaks whose area falls below `threshold`; returns the number removed
    pub fn purge_peaks(&mut self, threshold: f64) -> usize {
        let before = self.peaks.len();
        self.peaks.retain(|p| p.area() >= threshold);
        let purged = before - self.peaks.len();
        info!(
            "Experiment {}: {} peaks purged (below threshold={:.2})",
            self.expr_code, purged, threshold
        );
        purged
    }

    /// Multiply all normalised areas by `factor`
    pub fn scale_peaks(&mut self, factor: f64) -> Result<(), ExperimentError> {
        if !factor.is_finite() {
            return Err(ExperimentError::InvalidArgument(format!(
                "scale factor must be finite, got {}",
                factor
            )));
        }
        debug!("Experiment {}: scaling normalised areas by {:.2}", self.expr_code, factor);
        self.peaks = self
            .peaks
            .iter()
            .map(|p| p.with_norm_area(p.area() * factor))
            .collect();
        Ok(())
    }

    /// Keep only peaks strictly inside `(rt_lo, rt_hi)` seconds
    pub fn select_rt_range(&mut self, rt_lo: f64, rt_hi: f64) -> Result<usize, ExperimentError> {
        if !(rt_lo < rt_hi) {
            return Err(ExperimentError::InvalidArgument(format!(
                "lower retention time limit ({}) must be less than upper ({})",
                rt_lo, rt_hi
            )));
        }
        self.peaks
            .retain(|p| p.retention_time > rt_lo && p.retention_time < rt_hi);
        info!("Experiment {}: {} peaks selected", self.expr_code, self.peaks.len());
        Ok(self.peaks.len())
    }

    /// [`Experiment::select_rt_range`] with bounds given as time strings (`"5m"`, `"300s"`)
    pub fn select_rt_range_str(&mut self, lo: &str, hi: &str) -> Result<usize, ExperimentError> {
        self.select_rt_range(parse_time_str(lo)?, parse_time_str(hi)?)
    }

    /// The single peak within `tolerance` seconds of `rt`
    ///
    /// Returns `None` when no peak, or more than one peak, qualifies.
    pub fn find_peak_by_rt(&self, rt: f64, tolerance: f64) -> Option<&Peak> {
        let mut matches = self
            .peaks
            .iter()
            .filter(|p| (p.retention_time - rt).abs() < tolerance);
        let first = matches.next()?;
        match matches.next() {
            Some(_) => None,
            None => Some(first),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(rt: f64, area: f64) -> Peak {
        Peak::new(rt, area).unwrap()
    }

    fn tagged(rt: f64, area: f64, tag: &str) -> Peak {
        peak(rt, area).with_tag(tag.parse().unwrap())
    }

    #[test]
    fn test_new_orders_by_retention_time() {
        let expr = Experiment::new("a", vec![peak(30.0, 1.0), peak(10.0, 1.0), peak(20.0, 1.0)]);
        let rts: Vec<f64> = expr.peaks.iter().map(|p| p.retention_time).collect();
        assert_eq!(rts, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_parse_time_str() {
        assert_eq!(parse_time_str("30s").unwrap(), 30.0);
        assert_eq!(parse_time_str("1.5m").unwrap(), 90.0);
        assert!(parse_time_str("12").is_err());
        assert!(parse_time_str("xs").is_err());
    }

    #[test]
    fn test_set_ref_peak_removes_all_references() {
        let mut expr = Experiment::new(
            "a",
            vec![
                peak(10.0, 5.0),
                tagged(12.0, 50.0, "rf-si"),
                tagged(14.0, 70.0, "rf-nv"),
                peak(20.0, 5.0),
            ],
        );
        expr.set_ref_peak("si").unwrap();
        assert_eq!(expr.ref_peak.as_ref().unwrap().raw_area, 50.0);
        assert_eq!(expr.len(), 2);
        assert!(expr.peaks.iter().all(|p| !p.is_reference()));
    }

    #[test]
    fn test_set_ref_peak_errors() {
        let mut none = Experiment::new("a", vec![peak(10.0, 1.0)]);
        assert!(matches!(
            none.set_ref_peak("si"),
            Err(ExperimentError::NoReferencePeaks(_))
        ));

        let mut dup = Experiment::new(
            "b",
            vec![tagged(10.0, 1.0, "rf-si"), tagged(11.0, 1.0, "rf-si")],
        );
        assert!(matches!(
            dup.set_ref_peak("si"),
            Err(ExperimentError::DuplicateReference { .. })
        ));

        let mut missing = Experiment::new("c", vec![tagged(10.0, 1.0, "rf-nv")]);
        assert!(matches!(
            missing.set_ref_peak("si"),
            Err(ExperimentError::ReferenceNotFound { .. })
        ));
    }

    #[test]
    fn test_remove_blank_peaks() {
        let mut expr = Experiment::new(
            "a",
            vec![peak(10.0, 1.0), tagged(11.0, 1.0, "blank"), peak(12.0, 1.0)],
        );
        assert_eq!(expr.remove_blank_peaks(), 1);
        assert_eq!(expr.remove_blank_peaks(), 0);
        assert_eq!(expr.len(), 2);
    }

    #[test]
    fn test_normalise_to_reference() {
        let mut expr = Experiment::new(
            "a",
            vec![peak(10.0, 25.0), tagged(12.0, 50.0, "rf-si")],
        );
        assert!(matches!(
            expr.normalise_peaks(true),
            Err(ExperimentError::ReferenceNotSet(_))
        ));
        expr.set_ref_peak("si").unwrap();
        expr.normalise_peaks(true).unwrap();
        assert_eq!(expr.peaks[0].norm_area, Some(0.5));
    }

    #[test]
    fn test_select_purge_and_scale() {
        let mut expr = Experiment::new(
            "a",
            vec![peak(10.0, 1.0), peak(20.0, 9.0), peak(30.0, 4.0), peak(40.0, 7.0)],
        );
        expr.select_top_peaks(3);
        let rts: Vec<f64> = expr.peaks.iter().map(|p| p.retention_time).collect();
        assert_eq!(rts, vec![20.0, 30.0, 40.0]);

        expr.normalise_peaks(false).unwrap();
        expr.scale_peaks(0.5).unwrap();
        assert_eq!(expr.peaks[0].area(), 4.5);

        assert_eq!(expr.purge_peaks(3.0), 1);
        assert_eq!(expr.len(), 2);
        assert!(expr.scale_peaks(f64::NAN).is_err());
    }

    #[test]
    fn test_select_rt_range() {
        let mut expr = Experiment::new(
            "a",
            vec![peak(30.0, 1.0), peak(60.0, 1.0), peak(90.0, 1.0), peak(120.0, 1.0)],
        );
        assert!(expr.select_rt_range(100.0, 50.0).is_err());
        assert_eq!(expr.select_rt_range_str("0.5m", "100s").unwrap(), 2);
        let rts: Vec<f64> = expr.peaks.iter().map(|p| p.retention_time).collect();
        assert_eq!(rts, vec![60.0, 90.0]);
    }

    #[test]
    fn test_find_peak_by_rt() {
        let expr = Experiment::new("a", vec![peak(10.0, 1.0), peak(11.0, 1.0), peak(30.0, 1.0)]);
        assert_eq!(expr.find_peak_by_rt(30.5, 1.0).unwrap().retention_time, 30.0);
        // Two candidates within tolerance is ambiguous
        assert!(expr.find_peak_by_rt(10.5, 1.0).is_none());
        assert!(expr.find_peak_by_rt(50.0, 1.0).is_none());
    }
}
