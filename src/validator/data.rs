use crate::experiment::Experiment;
use crate::peak::Peak;

use super::{Finding, Location, Rule, ValidationReport};

/// Spectra shorter than this are unusual for GC-MS scans
const MIN_SPECTRUM_POINTS: usize = 10;

/// Step 2: per-peak data sanity against the set's common mass axis
///
/// The mass axis of the first peak in the set is taken as the reference.
pub(crate) fn check_data_sanity(experiments: &[Experiment], report: &mut ValidationReport) {
    let Some(axis_len) = experiments
        .iter()
        .find_map(|e| e.peaks.first())
        .map(|p| p.mass_spectrum.len())
    else {
        return;
    };

    if axis_len < MIN_SPECTRUM_POINTS {
        report.push(Finding::warning(
            Rule::ShortSpectrum,
            Location::Set,
            format!(
                "mass axis has {} points; cosine scores over fewer than {} are coarse",
                axis_len, MIN_SPECTRUM_POINTS
            ),
        ));
    }

    for expr in experiments {
        let mut previous: Option<f64> = None;
        for (index, peak) in expr.peaks.iter().enumerate() {
            let at = Location::peak(&expr.expr_code, index, peak.retention_time);
            check_peak(peak, previous, axis_len, at, report);
            previous = Some(peak.retention_time);
        }
    }
}

fn check_peak(
    peak: &Peak,
    previous: Option<f64>,
    axis_len: usize,
    at: Location,
    report: &mut ValidationReport,
) {
    if !peak.retention_time.is_finite() || !peak.raw_area.is_finite() {
        report.push(Finding::error(
            Rule::NonFiniteValue,
            at.clone(),
            format!("retention time {} s, area {}", peak.retention_time, peak.raw_area),
        ));
    }

    if let Some(prev) = previous.filter(|prev| peak.retention_time < *prev) {
        report.push(Finding::error(
            Rule::RetentionOrder,
            at.clone(),
            format!("elutes before the previous peak at {:.2} s", prev),
        ));
    }

    let len = peak.mass_spectrum.len();
    if len != axis_len {
        report.push(Finding::error(
            Rule::MassAxis,
            at.clone(),
            format!("spectrum has {} points, expected {}", len, axis_len),
        ));
    }

    let invalid = peak
        .mass_spectrum
        .intensities
        .iter()
        .filter(|v| **v < 0.0 || !v.is_finite())
        .count();
    if invalid > 0 {
        report.push(Finding::error(
            Rule::NegativeIntensity,
            at,
            format!("{} negative or non-finite intensities", invalid),
        ));
    } else if peak.mass_spectrum.max_intensity() <= 0.0 {
        report.push(Finding::warning(
            Rule::BlankSpectrum,
            at,
            "all intensities are zero; the peak can never match",
        ));
    }
}
