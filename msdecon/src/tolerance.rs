//! Mass accuracy windows for comparing observed and expected m/z spacing
use std::fmt::Display;
use std::str::FromStr;

use mzpeaks::Tolerance;

use crate::config::DeconvolutionError;

/// The unit a tolerance value is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ToleranceType {
    /// Parts-per-million of the reference m/z
    PPM,
    /// Absolute mass units
    Da,
}

impl ToleranceType {
    /// Attach a magnitude to this unit
    pub fn with_value(&self, value: f64) -> Tolerance {
        match self {
            ToleranceType::PPM => Tolerance::PPM(value),
            ToleranceType::Da => Tolerance::Da(value),
        }
    }
}

impl Display for ToleranceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToleranceType::PPM => f.write_str("ppm"),
            ToleranceType::Da => f.write_str("da"),
        }
    }
}

impl FromStr for ToleranceType {
    type Err = DeconvolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ppm" => Ok(Self::PPM),
            "da" => Ok(Self::Da),
            _ => Err(DeconvolutionError::UnknownToleranceType(s.to_string())),
        }
    }
}

/// Converts a configured [`Tolerance`] into an acceptance window for each
/// comparison. Stateless beyond the tolerance itself.
#[derive(Debug, Clone, Copy)]
pub struct ToleranceMatcher {
    pub tolerance: Tolerance,
}

impl ToleranceMatcher {
    pub fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    /// The half-width of the acceptance window around `reference_mz`, in mass units
    #[inline]
    pub fn width(&self, reference_mz: f64) -> f64 {
        match self.tolerance {
            Tolerance::PPM(ppm) => ppm * reference_mz / 1e6,
            Tolerance::Da(da) => da,
        }
    }

    /// Test whether `observed_delta` is close enough to `expected_delta`, where
    /// relative tolerances are scaled by `reference_mz`.
    #[inline]
    pub fn within_tolerance(&self, observed_delta: f64, expected_delta: f64, reference_mz: f64) -> bool {
        (observed_delta - expected_delta).abs() <= self.width(reference_mz)
    }
}

impl From<Tolerance> for ToleranceMatcher {
    fn from(value: Tolerance) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("ppm".parse::<ToleranceType>().unwrap(), ToleranceType::PPM);
        assert_eq!("Da".parse::<ToleranceType>().unwrap(), ToleranceType::Da);
        assert!(matches!(
            "mmu".parse::<ToleranceType>(),
            Err(DeconvolutionError::UnknownToleranceType(_))
        ));
    }

    #[test]
    fn test_da_window() {
        let matcher = ToleranceMatcher::new(Tolerance::Da(0.01));
        assert!(matcher.within_tolerance(1.005, 1.0, 500.0));
        assert!(matcher.within_tolerance(0.991, 1.0, 5000.0));
        assert!(!matcher.within_tolerance(1.02, 1.0, 500.0));
    }

    #[test]
    fn test_ppm_window() {
        let matcher = ToleranceMatcher::new(Tolerance::PPM(10.0));
        // 10 ppm of 1000 m/z is 0.01
        assert!((matcher.width(1000.0) - 0.01).abs() < 1e-12);
        assert!(matcher.within_tolerance(1.008, 1.0, 1000.0));
        assert!(!matcher.within_tolerance(1.008, 1.0, 500.0));
    }

    #[test]
    fn test_zero_width() {
        let matcher = ToleranceMatcher::new(Tolerance::Da(0.0));
        assert!(matcher.within_tolerance(0.5, 0.5, 100.0));
        assert!(!matcher.within_tolerance(0.5 + 1e-9, 0.5, 100.0));
    }
}
