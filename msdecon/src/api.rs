//! * High level APIs for running deconvolution operations
use mzpeaks::CentroidPeak;

use crate::charge::ChargeRange;
use crate::config::{DeconvolutionError, DeconvolutionParams};
use crate::deconvoluter::Deconvoluter;
use crate::peaks::PeakStore;
use crate::solution::DeconvolutedPeak;
use crate::tolerance::ToleranceType;

/// A single-shot deconvolution of `(m/z, intensity)` pairs.
///
/// # Arguments
/// - `peaks`: The centroided peak list, in any order. Each peak's position in this sequence is its identifier.
/// - `tolerance`: The magnitude of the mass accuracy constraint on isotopic spacing
/// - `tolerance_type`: The unit of `tolerance`, either `"ppm"` or `"da"`
/// - `charge_range`: The minimum to maximum charge state to consider, inclusive
/// - `left_scale_factor`: The largest fraction of the current peak's intensity a lower m/z isotopic peak may have
/// - `right_scale_factor`: The largest fraction of the current peak's intensity a higher m/z isotopic peak may have
///
/// # Errors
/// Any invalid parameter or peak is reported before deconvolution begins. An empty
/// peak list is not an error and produces an empty result.
///
/// # See also
/// [`deconvolute_peaks`]
pub fn deconvolute<I: IntoIterator<Item = (f64, f32)>>(
    peaks: I,
    tolerance: f64,
    tolerance_type: &str,
    charge_range: ChargeRange,
    left_scale_factor: f32,
    right_scale_factor: f32,
) -> Result<Vec<DeconvolutedPeak>, DeconvolutionError> {
    let tolerance_type: ToleranceType = tolerance_type.parse()?;
    let params = DeconvolutionParams::new(
        tolerance_type.with_value(tolerance),
        charge_range,
        left_scale_factor,
        right_scale_factor,
    );
    deconvolute_peaks(peaks, &params)
}

/// Deconvolute `(m/z, intensity)` pairs with a pre-built set of parameters.
///
/// The result holds one [`DeconvolutedPeak`] per envelope, ordered as their seeds were
/// consumed: by descending seed intensity, with ties going to the lower m/z. Running
/// this twice on the same input produces the same output.
pub fn deconvolute_peaks<I: IntoIterator<Item = (f64, f32)>>(
    peaks: I,
    params: &DeconvolutionParams,
) -> Result<Vec<DeconvolutedPeak>, DeconvolutionError> {
    params.validate()?;
    let store = PeakStore::try_from_pairs(peaks)?;
    let mut deconvoluter = Deconvoluter::new(store, *params)?;
    Ok(deconvoluter.deconvolute())
}

/// As [`deconvolute_peaks`], but starting from [`CentroidPeak`]s. Their `index`
/// fields are overwritten with their position in `peaks`.
pub fn deconvolute_centroids(
    peaks: Vec<CentroidPeak>,
    params: &DeconvolutionParams,
) -> Result<Vec<DeconvolutedPeak>, DeconvolutionError> {
    params.validate()?;
    let store = PeakStore::try_new(peaks)?;
    let mut deconvoluter = Deconvoluter::new(store, *params)?;
    Ok(deconvoluter.deconvolute())
}
