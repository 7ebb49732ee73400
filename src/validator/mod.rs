//! # Peak List Validation
//!
//! Pre-flight checks for a set of experiments before alignment. Every problem
//! is a [`Finding`] tied to the set, one experiment, or one peak by index and
//! retention time. Problems that would abort an alignment run are errors; data
//! that aligns but looks suspicious is a warning.
//!
//! ## Validation Checklist
//!
//! 1. **Structure**: the set is non-empty, experiment codes are unique and
//!    every experiment has peaks
//! 2. **Data Sanity**: retention times are finite and ordered, all spectra
//!    share one mass axis and intensities are non-negative
//!
//! ## Usage
//!
//! ```rust,no_run
//! use peakalign::experiment::read_experiment_list;
//! use peakalign::validator::validate_experiments;
//!
//! let experiments = read_experiment_list("experiments.txt").unwrap();
//! let report = validate_experiments(&experiments);
//! println!("{}", report);
//! ```

use log::debug;

use crate::experiment::Experiment;

pub use report::{ExperimentSummary, Finding, Location, Rule, Severity, ValidationReport};

mod data;
mod report;
mod structure;

/// Run every check against `experiments`
pub fn validate_experiments(experiments: &[Experiment]) -> ValidationReport {
    let mut report = ValidationReport::new(format!("{} experiment(s)", experiments.len()));
    report.experiments = experiments.iter().map(ExperimentSummary::of).collect();

    debug!("Step 1: Checking experiment set structure");
    structure::check_structure(experiments, &mut report);

    debug!("Step 2: Checking peak data");
    data::check_data_sanity(experiments, &mut report);

    debug!(
        "Validation found {} error(s) and {} warning(s)",
        report.failure_count(),
        report.warning_count()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peak::{MassSpectrum, Peak};

    fn peak(rt: f64, values: &[f64]) -> Peak {
        let masses = (0..values.len()).map(|i| 50.0 + i as f64).collect();
        Peak::new(rt, 1.0)
            .unwrap()
            .with_mass_spectrum(MassSpectrum::new(masses, values.to_vec()).unwrap())
    }

    fn rules_for(report: &ValidationReport, code: &str) -> Vec<Rule> {
        report.findings_for(code).map(|f| f.rule).collect()
    }

    #[test]
    fn test_valid_set_passes() {
        let exprs = vec![
            Experiment::new("a", vec![peak(10.0, &[1.0; 12]), peak(20.0, &[2.0; 12])]),
            Experiment::new("b", vec![peak(11.0, &[1.0; 12])]),
        ];
        let report = validate_experiments(&exprs);
        assert!(report.findings.is_empty(), "{}", report);
        assert_eq!(report.experiments.len(), 2);
        assert_eq!(report.experiments[0].rt_range, Some((10.0, 20.0)));
        assert_eq!(report.experiments[1].axis_len, Some(12));
    }

    #[test]
    fn test_empty_set_fails() {
        let report = validate_experiments(&[]);
        assert!(report.has_failures());
        assert_eq!(report.findings[0].rule, Rule::NoExperiments);
        assert_eq!(report.findings[0].location, Location::Set);
    }

    #[test]
    fn test_duplicate_codes_and_empty_experiment() {
        let exprs = vec![
            Experiment::new("a", vec![peak(10.0, &[1.0; 12])]),
            Experiment::new("a", Vec::new()),
            Experiment::new("c", Vec::new()),
        ];
        let report = validate_experiments(&exprs);
        assert!(report.has_rule(Rule::DuplicateCode));
        assert_eq!(rules_for(&report, "c"), vec![Rule::NoPeaks]);
        assert_eq!(report.experiment_severity("c"), Some(Severity::Error));
    }

    #[test]
    fn test_mass_axis_mismatch_names_the_peak() {
        let exprs = vec![
            Experiment::new("a", vec![peak(10.0, &[1.0; 12])]),
            Experiment::new("b", vec![peak(10.0, &[1.0; 12]), peak(15.0, &[1.0; 11])]),
        ];
        let report = validate_experiments(&exprs);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].rule, Rule::MassAxis);
        assert_eq!(report.findings[0].location, Location::peak("b", 1, 15.0));
        assert!(report.findings_for("a").next().is_none());
    }

    #[test]
    fn test_negative_intensity_and_short_spectra() {
        let exprs = vec![
            Experiment::new("a", vec![peak(10.0, &[1.0, -2.0])]),
            Experiment::new("b", vec![peak(10.0, &[0.0, 0.0])]),
        ];
        let report = validate_experiments(&exprs);
        assert_eq!(rules_for(&report, "a"), vec![Rule::NegativeIntensity]);
        assert_eq!(rules_for(&report, "b"), vec![Rule::BlankSpectrum]);
        assert_eq!(report.experiment_severity("b"), Some(Severity::Warning));
        assert!(report
            .findings
            .iter()
            .any(|f| f.rule == Rule::ShortSpectrum && f.location == Location::Set));
    }

    #[test]
    fn test_unordered_peaks_fail() {
        let mut expr = Experiment::new(
            "a",
            vec![peak(10.0, &[1.0; 12]), peak(20.0, &[1.0; 12]), peak(30.0, &[1.0; 12])],
        );
        expr.peaks.swap(1, 2);
        let report = validate_experiments(&[expr, Experiment::new("b", vec![peak(5.0, &[1.0; 12])])]);
        let order: Vec<&Finding> = report
            .findings
            .iter()
            .filter(|f| f.rule == Rule::RetentionOrder)
            .collect();
        assert_eq!(order.len(), 1);
        assert_eq!(order[0].location, Location::peak("a", 2, 20.0));
    }

    #[test]
    fn test_single_experiment_warns() {
        let report = validate_experiments(&[Experiment::new("a", vec![peak(10.0, &[1.0; 12])])]);
        assert!(!report.has_failures());
        assert!(report.has_rule(Rule::SingleExperiment));
    }
}
