//! Group the peaks of a centroided mass spectrum into isotopic envelopes and assign
//! each a charge state using purely structural rules.
//!
//! For every charge state in range, peaks whose m/z spacing matches the isotopic shift
//! for that charge are linked into a [`CandidateGraph`](graph::CandidateGraph). The most
//! intense unassigned peak is then repeatedly used as a seed, an envelope is traced
//! outward from it along each charge's graph while peak intensities decay, and the
//! charge whose envelope carries the most total intensity wins and claims its peaks.
//!
//! ```
//! use msdecon::api::deconvolute;
//!
//! let peaks = vec![(689.6649, 52.0), (689.93, 9.0), (689.9836, 71.0)];
//! let envelopes = deconvolute(peaks, 0.01, "da", (1, 3), 0.6, 0.9).unwrap();
//! assert_eq!(envelopes.len(), 3);
//! ```
pub mod api;
pub mod arbiter;
pub mod charge;
pub mod config;
pub mod deconvoluter;
pub mod envelope;
pub mod graph;
pub mod peaks;
pub mod solution;
pub mod tolerance;

pub use crate::api::{deconvolute, deconvolute_centroids, deconvolute_peaks};
pub use crate::charge::{ChargeRange, NEUTRON_MASS};
pub use crate::config::{DeconvolutionError, DeconvolutionParams};
pub use crate::deconvoluter::Deconvoluter;
pub use crate::peaks::{PeakId, PeakStore};
pub use crate::solution::DeconvolutedPeak;
pub use crate::tolerance::{ToleranceMatcher, ToleranceType};
