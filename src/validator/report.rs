use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;

use crate::experiment::Experiment;

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// The set aligns, but the result may be poor
    Warning,
    /// Alignment would fail or produce a meaningless table
    Error,
}

/// The rule a finding violates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// No experiments were given
    NoExperiments,
    /// Only one experiment, so nothing is aligned
    SingleExperiment,
    /// Two experiments share a code
    DuplicateCode,
    /// An experiment has an empty peak list
    NoPeaks,
    /// Retention time or area is NaN or infinite
    NonFiniteValue,
    /// A peak elutes before its predecessor
    RetentionOrder,
    /// A spectrum is not on the common mass axis
    MassAxis,
    /// The common mass axis is unusually short
    ShortSpectrum,
    /// A spectrum holds negative or non-finite intensities
    NegativeIntensity,
    /// A spectrum is all zeros and can never match
    BlankSpectrum,
}

impl Rule {
    /// Short human-readable title
    pub fn title(self) -> &'static str {
        match self {
            Rule::NoExperiments => "no experiments",
            Rule::SingleExperiment => "single experiment",
            Rule::DuplicateCode => "duplicate experiment code",
            Rule::NoPeaks => "empty peak list",
            Rule::NonFiniteValue => "non-finite value",
            Rule::RetentionOrder => "retention order",
            Rule::MassAxis => "mass axis",
            Rule::ShortSpectrum => "short spectra",
            Rule::NegativeIntensity => "invalid intensities",
            Rule::BlankSpectrum => "blank spectrum",
        }
    }
}

/// What a finding refers to
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    /// The experiment set as a whole
    Set,
    /// One experiment, by code
    Experiment(String),
    /// One peak, by experiment code and index into its peak list
    Peak {
        /// Experiment code
        experiment: String,
        /// Zero-based position in the peak list
        index: usize,
        /// Retention time of the peak in seconds
        retention_time: f64,
    },
}

impl Location {
    pub(crate) fn peak(experiment: &str, index: usize, retention_time: f64) -> Self {
        Location::Peak {
            experiment: experiment.to_string(),
            index,
            retention_time,
        }
    }

    /// Code of the experiment this location belongs to, if any
    pub fn experiment(&self) -> Option<&str> {
        match self {
            Location::Set => None,
            Location::Experiment(code) | Location::Peak { experiment: code, .. } => Some(code.as_str()),
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            Location::Peak {
                index,
                retention_time,
                ..
            } => Some(format!("peak #{} @ {:.2} s", index, retention_time)),
            _ => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Set => write!(f, "experiment set"),
            Location::Experiment(code) => write!(f, "{}", code),
            Location::Peak { experiment, .. } => {
                write!(f, "{} {}", experiment, self.detail().unwrap_or_default())
            }
        }
    }
}

/// One problem found in the input
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    /// Violated rule
    pub rule: Rule,
    /// Severity
    pub severity: Severity,
    /// What the finding refers to
    pub location: Location,
    /// Explanation with the offending values
    pub message: String,
}

impl Finding {
    pub(crate) fn error(rule: Rule, location: Location, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity: Severity::Error,
            location,
            message: message.into(),
        }
    }

    pub(crate) fn warning(rule: Rule, location: Location, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity: Severity::Warning,
            location,
            message: message.into(),
        }
    }
}

/// Overview of one experiment as it will enter the aligner
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentSummary {
    /// Experiment code
    pub code: String,
    /// Number of peaks
    pub peaks: usize,
    /// First and last retention time in seconds
    pub rt_range: Option<(f64, f64)>,
    /// Mass-axis length of the first peak
    pub axis_len: Option<usize>,
}

impl ExperimentSummary {
    pub(crate) fn of(experiment: &Experiment) -> Self {
        let first = experiment.peaks.first();
        Self {
            code: experiment.expr_code.clone(),
            peaks: experiment.len(),
            rt_range: first
                .zip(experiment.peaks.last())
                .map(|(a, b)| (a.retention_time, b.retention_time)),
            axis_len: first.map(|p| p.mass_spectrum.len()),
        }
    }
}

/// Findings for a set of experiments, grouped by experiment when rendered
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Where the experiments came from (list file or description)
    pub source: String,
    /// One entry per input experiment, in input order
    pub experiments: Vec<ExperimentSummary>,
    /// Every problem found, in discovery order
    pub findings: Vec<Finding>,
}

#[derive(Clone, Copy)]
enum Tone {
    Title,
    Label,
    Good,
    Warn,
    Bad,
}

impl ValidationReport {
    /// Empty report for `source`
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    pub(crate) fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// True if any finding is an error
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// True if any finding is a warning
    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    /// Number of error findings
    pub fn failure_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Number of warning findings
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    /// True if some finding violates `rule`
    pub fn has_rule(&self, rule: Rule) -> bool {
        self.findings.iter().any(|f| f.rule == rule)
    }

    /// Findings attached to experiment `code` or one of its peaks
    pub fn findings_for<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.findings
            .iter()
            .filter(move |f| f.location.experiment() == Some(code))
    }

    /// Worst severity among the findings of experiment `code`
    pub fn experiment_severity(&self, code: &str) -> Option<Severity> {
        self.findings_for(code).map(|f| f.severity).max()
    }

    fn verdict(&self) -> (&'static str, Tone) {
        if self.has_failures() {
            ("Validation FAILED", Tone::Bad)
        } else if self.has_warnings() {
            ("Validation PASSED with warnings", Tone::Warn)
        } else {
            ("Validation PASSED", Tone::Good)
        }
    }

    fn render(&self, paint: impl Fn(Tone, &str) -> String) -> String {
        let marker = |severity: Option<Severity>| match severity {
            None => paint(Tone::Good, "✓"),
            Some(Severity::Warning) => paint(Tone::Warn, "⚠"),
            Some(Severity::Error) => paint(Tone::Bad, "✗"),
        };
        let finding_line = |f: &Finding, indent: &str| {
            let label = match f.severity {
                Severity::Warning => paint(Tone::Warn, "WARNING"),
                Severity::Error => paint(Tone::Bad, "ERROR"),
            };
            let at = f.location.detail().map(|d| format!(" {}", d)).unwrap_or_default();
            format!("{}- {}{} ({}): {}\n", indent, label, at, f.rule.title(), f.message)
        };

        let mut out = String::new();
        out.push_str(&paint(Tone::Title, "Peak List Validation Report"));
        out.push('\n');
        out.push_str(&paint(Tone::Title, "==========================="));
        out.push('\n');
        out.push_str(&format!("{}: {}\n\n", paint(Tone::Label, "Source"), self.source));

        let set_findings: Vec<&Finding> = self
            .findings
            .iter()
            .filter(|f| f.location == Location::Set)
            .collect();
        if !set_findings.is_empty() {
            out.push_str(&format!("{}:\n", paint(Tone::Label, "Experiment set")));
            for finding in set_findings {
                out.push_str(&finding_line(finding, "  "));
            }
            out.push('\n');
        }

        if !self.experiments.is_empty() {
            out.push_str(&format!("{}:\n", paint(Tone::Label, "Experiments")));
            for summary in &self.experiments {
                let range = summary
                    .rt_range
                    .map(|(lo, hi)| format!("{:.2} - {:.2} s", lo, hi))
                    .unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "  [{}] {}: {} peaks, {}, {} m/z points\n",
                    marker(self.experiment_severity(&summary.code)),
                    summary.code,
                    summary.peaks,
                    range,
                    summary.axis_len.unwrap_or(0)
                ));
                for finding in self.findings_for(&summary.code) {
                    out.push_str(&finding_line(finding, "      "));
                }
            }
            out.push('\n');
        }

        out.push_str(&format!(
            "{}: {} experiment(s), {} error(s), {} warning(s)\n\n",
            paint(Tone::Label, "Summary"),
            self.experiments.len(),
            self.failure_count(),
            self.warning_count()
        ));
        let (verdict, tone) = self.verdict();
        out.push_str(&paint(tone, verdict));
        out.push('\n');
        out
    }

    /// Render with terminal colours (plain text without the `colorized_output` feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            self.render(|tone, text| {
                let styled = style(text);
                match tone {
                    Tone::Title => styled.bold().cyan(),
                    Tone::Label => styled.bold(),
                    Tone::Good => styled.green(),
                    Tone::Warn => styled.yellow().bold(),
                    Tone::Bad => styled.red().bold(),
                }
                .to_string()
            })
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            self.to_string()
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(|_, text| text.to_string()))
    }
}
