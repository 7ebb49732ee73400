//! # Peak Model
//!
//! Immutable records of detected GC-MS peaks. A [`Peak`] carries the apex
//! retention time (seconds), the integrated area and the mass spectrum taken
//! at the apex. Peaks are produced by an upstream peak-detection step and are
//! shared, never mutated, by the alignment structures. Editing operations such
//! as [`Peak::crop_mass`] return a new peak.

mod error;

pub use error::PeakError;

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Spectra with fewer points than this after cropping trigger a warning
const MIN_SPECTRUM_POINTS: usize = 10;

fn check_finite(field: &'static str, value: f64) -> Result<f64, PeakError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PeakError::NonFinite { field, value })
    }
}

/// Intensity vector over an m/z axis
///
/// `mass_list` and `intensities` are parallel vectors. Peaks compared by the
/// aligner must share the same mass axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MassSpectrum {
    /// m/z values of the axis
    pub mass_list: Vec<f64>,
    /// Intensity at each m/z
    pub intensities: Vec<f64>,
}

impl MassSpectrum {
    /// Create a spectrum, checking that both vectors have the same length
    pub fn new(mass_list: Vec<f64>, intensities: Vec<f64>) -> Result<Self, PeakError> {
        if mass_list.len() != intensities.len() {
            return Err(PeakError::InconsistentSpectrum {
                masses: mass_list.len(),
                intensities: intensities.len(),
            });
        }
        Ok(Self {
            mass_list,
            intensities,
        })
    }

    /// Number of points on the mass axis
    pub fn len(&self) -> usize {
        self.intensities.len()
    }

    /// True when the spectrum has no points
    pub fn is_empty(&self) -> bool {
        self.intensities.is_empty()
    }

    /// Euclidean norm of the intensity vector
    pub fn norm(&self) -> f64 {
        self.intensities.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Largest intensity, or 0.0 for an empty spectrum
    pub fn max_intensity(&self) -> f64 {
        self.intensities.iter().copied().fold(0.0, f64::max)
    }

    /// Intensities scaled so the most intense ion equals 1.0
    ///
    /// A spectrum without positive intensity maps to all zeros.
    pub fn normalized_to_max(&self) -> Vec<f64> {
        let max = self.max_intensity();
        if max > 0.0 {
            self.intensities.iter().map(|v| v / max).collect()
        } else {
            vec![0.0; self.intensities.len()]
        }
    }

    /// Smallest and largest m/z on the axis
    pub fn mass_range(&self) -> Option<(f64, f64)> {
        let min = self.mass_list.iter().copied().reduce(f64::min)?;
        let max = self.mass_list.iter().copied().reduce(f64::max)?;
        Some((min, max))
    }

    /// Indices of the two most intense ions (ties keep the lower index)
    fn top_two(&self) -> Option<(usize, usize)> {
        let mut first: Option<usize> = None;
        let mut second: Option<usize> = None;
        for (idx, &value) in self.intensities.iter().enumerate() {
            match first {
                Some(f) if value <= self.intensities[f] => {
                    if second.map_or(true, |s| value > self.intensities[s]) {
                        second = Some(idx);
                    }
                }
                _ => {
                    second = first;
                    first = Some(idx);
                }
            }
        }
        let first = first?;
        Some((first, second.unwrap_or(first)))
    }

    /// Short identifier built from the two dominant ions and a retention time
    ///
    /// Format is `"{m1}-{m2}-{ratio}-{rt}"` with integral masses, the
    /// percentage intensity ratio of the second ion to the first, and the
    /// retention time in minutes with two decimals.
    pub fn uid(&self, retention_time: f64) -> String {
        let minutes = retention_time / 60.0;
        match self.top_two() {
            Some((i1, i2)) => {
                let top = self.intensities[i1];
                let ratio = if top > 0.0 {
                    (100.0 * self.intensities[i2] / top).round() as i64
                } else {
                    0
                };
                format!(
                    "{}-{}-{}-{:.2}",
                    self.mass_list[i1] as i64, self.mass_list[i2] as i64, ratio, minutes
                )
            }
            None => format!("0-0-0-{:.2}", minutes),
        }
    }
}

/// Peak annotation supplied by the peak-list source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PeakTag {
    /// Reference (internal standard) peak, source tag `rf-<name>`
    Reference(String),
    /// Peak present in the blank run, source tag `blank`
    Blank,
}

impl FromStr for PeakTag {
    type Err = PeakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if lower == "blank" {
            return Ok(PeakTag::Blank);
        }
        match lower.strip_prefix("rf-") {
            Some(name) if !name.is_empty() => Ok(PeakTag::Reference(name.to_string())),
            _ => Err(PeakError::InvalidTag(s.to_string())),
        }
    }
}

impl TryFrom<String> for PeakTag {
    type Error = PeakError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PeakTag> for String {
    fn from(tag: PeakTag) -> Self {
        tag.to_string()
    }
}

impl fmt::Display for PeakTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeakTag::Reference(name) => write!(f, "rf-{}", name),
            PeakTag::Blank => write!(f, "blank"),
        }
    }
}

/// A detected chromatographic peak
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Apex retention time in seconds
    pub retention_time: f64,
    /// Integrated raw peak area
    pub raw_area: f64,
    /// Area after experiment-level normalisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub norm_area: Option<f64>,
    /// Mass spectrum at the apex
    #[serde(default)]
    pub mass_spectrum: MassSpectrum,
    /// Optional reference/blank annotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<PeakTag>,
}

impl Peak {
    /// Create a peak at `retention_time` seconds with an empty spectrum
    pub fn new(retention_time: f64, raw_area: f64) -> Result<Self, PeakError> {
        Ok(Self {
            retention_time: check_finite("retention_time", retention_time)?,
            raw_area: check_finite("raw_area", raw_area)?,
            norm_area: None,
            mass_spectrum: MassSpectrum::default(),
            tag: None,
        })
    }

    /// Create a peak whose retention time is given in minutes
    pub fn from_minutes(retention_time: f64, raw_area: f64) -> Result<Self, PeakError> {
        Self::new(retention_time * 60.0, raw_area)
    }

    /// Attach a mass spectrum
    pub fn with_mass_spectrum(mut self, mass_spectrum: MassSpectrum) -> Self {
        self.mass_spectrum = mass_spectrum;
        self
    }

    /// Attach a tag
    pub fn with_tag(mut self, tag: PeakTag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Copy of this peak with the normalised area set
    pub fn with_norm_area(&self, norm_area: f64) -> Self {
        Self {
            norm_area: Some(norm_area),
            ..self.clone()
        }
    }

    /// Normalised area when available, raw area otherwise
    pub fn area(&self) -> f64 {
        self.norm_area.unwrap_or(self.raw_area)
    }

    /// True if the peak carries a reference tag
    pub fn is_reference(&self) -> bool {
        matches!(self.tag, Some(PeakTag::Reference(_)))
    }

    /// Identifier derived from the spectrum's dominant ions and the retention time
    pub fn uid(&self) -> String {
        self.mass_spectrum.uid(self.retention_time)
    }

    /// Copy of this peak keeping only masses within `[mass_min, mass_max]`
    pub fn crop_mass(&self, mass_min: f64, mass_max: f64) -> Result<Self, PeakError> {
        if mass_min >= mass_max {
            return Err(PeakError::InvalidMassRange(format!(
                "'mass_min' ({}) must be less than 'mass_max' ({})",
                mass_min, mass_max
            )));
        }
        let (lowest, highest) = self
            .mass_spectrum
            .mass_range()
            .ok_or(PeakError::EmptySpectrum)?;
        if mass_min < lowest {
            return Err(PeakError::InvalidMassRange(format!(
                "'mass_min' ({}) is less than the smallest mass ({})",
                mass_min, lowest
            )));
        }
        if mass_max > highest {
            return Err(PeakError::InvalidMassRange(format!(
                "'mass_max' ({}) is greater than the largest mass ({})",
                mass_max, highest
            )));
        }

        let (mass_list, intensities): (Vec<f64>, Vec<f64>) = self
            .mass_spectrum
            .mass_list
            .iter()
            .zip(&self.mass_spectrum.intensities)
            .filter(|(mass, _)| **mass >= mass_min && **mass <= mass_max)
            .map(|(m, i)| (*m, *i))
            .unzip();

        if mass_list.is_empty() {
            return Err(PeakError::EmptySpectrum);
        }
        if mass_list.len() < MIN_SPECTRUM_POINTS {
            warn!(
                "Peak at {:.3} s: mass spectrum contains {} points after cropping",
                self.retention_time,
                mass_list.len()
            );
        }

        Ok(Self {
            mass_spectrum: MassSpectrum {
                mass_list,
                intensities,
            },
            ..self.clone()
        })
    }

    /// Copy of this peak with the intensity at the closest m/z to `mass` set to zero
    pub fn null_mass(&self, mass: f64) -> Result<Self, PeakError> {
        let (lowest, highest) = self
            .mass_spectrum
            .mass_range()
            .ok_or(PeakError::EmptySpectrum)?;
        if mass < lowest || mass > highest {
            return Err(PeakError::InvalidMassRange(format!(
                "'mass' ({}) not in mass range {} to {}",
                mass, lowest, highest
            )));
        }

        let closest = self
            .mass_spectrum
            .mass_list
            .iter()
            .enumerate()
            .fold((0, f64::INFINITY), |best, (idx, m)| {
                let diff = (m - mass).abs();
                if diff < best.1 {
                    (idx, diff)
                } else {
                    best
                }
            })
            .0;

        let mut peak = self.clone();
        peak.mass_spectrum.intensities[closest] = 0.0;
        Ok(peak)
    }
}
