/*! Parameters that control a deconvolution run, and the errors raised when they are invalid */
use mzpeaks::Tolerance;
use thiserror::Error;

use crate::charge::ChargeRange;

/// An error that might occur before deconvolution starts. Once a run has begun
/// it always completes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeconvolutionError {
    #[error("Tolerance must be a finite, non-negative number, got {0}")]
    InvalidTolerance(f64),
    #[error("Unknown tolerance type {0:?}, expected \"ppm\" or \"da\"")]
    UnknownToleranceType(String),
    #[error("Invalid charge range ({0}, {1}), the minimum charge must be at least 1 and no greater than the maximum")]
    InvalidChargeRange(i32, i32),
    #[error("The {side} scale factor must be in (0, 1], got {value}")]
    InvalidScaleFactor { side: &'static str, value: f32 },
    #[error("Peak {index} has an invalid m/z {mz} or intensity {intensity}")]
    InvalidPeak { index: usize, mz: f64, intensity: f32 },
}

/// The default relative intensity bound when extending an envelope towards lower m/z
pub const DEFAULT_LEFT_SCALE_FACTOR: f32 = 0.6;
/// The default relative intensity bound when extending an envelope towards higher m/z.
/// Both 0.8 and 0.9 are used in practice.
pub const DEFAULT_RIGHT_SCALE_FACTOR: f32 = 0.9;

/// The complete set of parameters for a single deconvolution run
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeconvolutionParams {
    /// The mass accuracy constraint on the spacing between isotopic peaks
    pub error_tolerance: Tolerance,
    /// The minimum to maximum charge state to consider, inclusive
    pub charge_range: ChargeRange,
    /// A lower m/z neighbor's intensity may be at most this fraction of the current peak's
    pub left_scale_factor: f32,
    /// A higher m/z neighbor's intensity may be at most this fraction of the current peak's
    pub right_scale_factor: f32,
}

impl Default for DeconvolutionParams {
    fn default() -> Self {
        Self {
            error_tolerance: Tolerance::PPM(50.0),
            charge_range: (1, 3),
            left_scale_factor: DEFAULT_LEFT_SCALE_FACTOR,
            right_scale_factor: DEFAULT_RIGHT_SCALE_FACTOR,
        }
    }
}

impl DeconvolutionParams {
    pub fn new(
        error_tolerance: Tolerance,
        charge_range: ChargeRange,
        left_scale_factor: f32,
        right_scale_factor: f32,
    ) -> Self {
        Self {
            error_tolerance,
            charge_range,
            left_scale_factor,
            right_scale_factor,
        }
    }

    pub fn with_tolerance(mut self, value: Tolerance) -> Self {
        self.error_tolerance = value;
        self
    }

    pub fn with_charge_range(mut self, value: ChargeRange) -> Self {
        self.charge_range = value;
        self
    }

    pub fn with_left_scale_factor(mut self, value: f32) -> Self {
        self.left_scale_factor = value;
        self
    }

    pub fn with_right_scale_factor(mut self, value: f32) -> Self {
        self.right_scale_factor = value;
        self
    }

    /// Check every parameter, returning the first problem found
    pub fn validate(&self) -> Result<(), DeconvolutionError> {
        let magnitude = match self.error_tolerance {
            Tolerance::PPM(v) => v,
            Tolerance::Da(v) => v,
        };
        if !magnitude.is_finite() || magnitude < 0.0 {
            return Err(DeconvolutionError::InvalidTolerance(magnitude));
        }

        let (min_charge, max_charge) = self.charge_range;
        if min_charge < 1 || min_charge > max_charge {
            return Err(DeconvolutionError::InvalidChargeRange(min_charge, max_charge));
        }

        for (side, value) in [
            ("left", self.left_scale_factor),
            ("right", self.right_scale_factor),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(DeconvolutionError::InvalidScaleFactor { side, value });
            }
        }
        Ok(())
    }
}
