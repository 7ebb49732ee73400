use std::collections::HashSet;

use crate::experiment::Experiment;

use super::{Finding, Location, Rule, ValidationReport};

/// Step 1: the set as a whole and each experiment's identity
pub(crate) fn check_structure(experiments: &[Experiment], report: &mut ValidationReport) {
    match experiments.len() {
        0 => {
            report.push(Finding::error(Rule::NoExperiments, Location::Set, "nothing to align"));
            return;
        }
        1 => report.push(Finding::warning(
            Rule::SingleExperiment,
            Location::Set,
            "only one experiment; alignment will only filter its peaks",
        )),
        _ => {}
    }

    let mut seen = HashSet::new();
    for expr in experiments {
        let here = || Location::Experiment(expr.expr_code.clone());
        if !seen.insert(expr.expr_code.as_str()) {
            report.push(Finding::error(
                Rule::DuplicateCode,
                here(),
                "code is used by an earlier experiment; table columns would be ambiguous",
            ));
        }
        if expr.is_empty() {
            report.push(Finding::error(Rule::NoPeaks, here(), "peak list is empty"));
        }
    }
}
