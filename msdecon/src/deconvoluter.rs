//! The greedy seed-and-trace loop that turns a peak list into isotopic envelopes
use mzpeaks::prelude::*;

use crate::arbiter::ChargeArbiter;
use crate::config::{DeconvolutionError, DeconvolutionParams};
use crate::envelope::EnvelopeTracer;
use crate::graph::{CandidateGraph, GraphBuilder};
use crate::peaks::{EnvelopeId, PeakStore};
use crate::solution::DeconvolutedPeak;
use crate::tolerance::ToleranceMatcher;

/// Owns the [`PeakStore`] and its assignment state for one run.
///
/// Seeds are consumed from most to least intense. Each seed's winning envelope
/// claims its members before the next seed is chosen, so the order in which
/// seeds are visited changes the result and the loop is strictly sequential.
#[derive(Debug)]
pub struct Deconvoluter {
    pub peaks: PeakStore,
    pub params: DeconvolutionParams,
}

impl Deconvoluter {
    /// Create a new [`Deconvoluter`], rejecting invalid parameters before any work is done
    pub fn new(peaks: PeakStore, params: DeconvolutionParams) -> Result<Self, DeconvolutionError> {
        params.validate()?;
        Ok(Self { peaks, params })
    }

    pub fn graph_builder(&self) -> GraphBuilder {
        GraphBuilder::new(
            ToleranceMatcher::new(self.params.error_tolerance),
            self.params.charge_range,
        )
    }

    /// Build the [`CandidateGraph`] for the current peak list
    pub fn build_graph(&self) -> CandidateGraph {
        self.graph_builder().build(&self.peaks)
    }

    /// Run the full deconvolution, returning one [`DeconvolutedPeak`] per envelope in the
    /// order their seeds were consumed, which is descending seed intensity.
    ///
    /// Every input peak ends up in exactly one envelope, possibly as a singleton.
    #[tracing::instrument(level = "debug", skip_all, fields(n_peaks = self.peaks.len()))]
    pub fn deconvolute(&mut self) -> Vec<DeconvolutedPeak> {
        let graph = self.build_graph();
        tracing::debug!(
            "Built candidate graph with {} edges over {} charge states",
            graph.edge_count(),
            graph.charges().count()
        );

        let mut solutions = Vec::new();
        let mut seeds = self.peaks.seeds();
        while let Some(seed) = seeds.next_seed(&self.peaks) {
            let tracer = EnvelopeTracer::new(
                &self.peaks,
                self.params.left_scale_factor,
                self.params.right_scale_factor,
            );
            let arbiter = ChargeArbiter::new(&graph, tracer);
            let Some(envelope) = arbiter.arbitrate(seed) else {
                break;
            };

            let envelope_id = solutions.len() as EnvelopeId;
            let solution = DeconvolutedPeak::from_envelope(envelope_id, &envelope, &self.peaks);
            tracing::debug!(
                "Envelope {envelope_id} seeded at {:0.4} with charge {} and {} peaks, total intensity {}",
                solution.seed.mz(),
                solution.charge,
                solution.len(),
                solution.total_intensity
            );
            self.peaks.mark_assigned(&envelope.peaks, envelope_id);
            solutions.push(solution);
        }

        debug_assert_eq!(self.peaks.unassigned_count(), 0);
        tracing::debug!(
            "Grouped {} peaks into {} envelopes, {} with isotopic peaks",
            self.peaks.len(),
            solutions.len(),
            solutions.iter().filter(|s| !s.is_singleton()).count()
        );
        solutions
    }
}

#[cfg(test)]
mod test {
    use mzpeaks::Tolerance;

    use super::*;
    use crate::charge::NEUTRON_MASS;
    use crate::peaks::Assignment;

    fn make_spectrum() -> Vec<(f64, f32)> {
        vec![
            // charge 2 at 900
            (900.0, 1000.0),
            (900.0 + NEUTRON_MASS / 2.0, 800.0),
            (900.0 + NEUTRON_MASS, 400.0),
            // charge 1 at 450
            (450.0, 500.0),
            (450.0 + NEUTRON_MASS, 250.0),
            (450.0 + 2.0 * NEUTRON_MASS, 100.0),
            // noise
            (455.123, 30.0),
        ]
    }

    #[test_log::test]
    fn test_deconvolute() {
        let store = PeakStore::try_from_pairs(make_spectrum()).unwrap();
        let params = DeconvolutionParams::default()
            .with_tolerance(Tolerance::PPM(10.0))
            .with_charge_range((1, 4));
        let mut task = Deconvoluter::new(store, params).unwrap();
        let solutions = task.deconvolute();

        assert_eq!(solutions.len(), 3);

        assert_eq!(solutions[0].charge, 2);
        assert_eq!(solutions[0].peak_ids().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(solutions[0].total_intensity, 2200.0);
        assert_eq!(solutions[0].monoisotopic_peak.mz, 900.0);

        assert_eq!(solutions[1].charge, 1);
        assert_eq!(solutions[1].peak_ids().collect::<Vec<_>>(), vec![3, 4, 5]);

        assert!(solutions[2].is_singleton());
        assert_eq!(solutions[2].charge, 1);
        assert_eq!(solutions[2].seed.index, 6);

        for (i, s) in solutions.iter().enumerate() {
            assert_eq!(s.envelope_id, i as EnvelopeId);
            for id in s.peak_ids() {
                assert_eq!(task.peaks.assignment(id), Assignment::Assigned(i as EnvelopeId));
            }
        }
    }

    #[test]
    fn test_rejects_bad_params() {
        let store = PeakStore::try_from_pairs(make_spectrum()).unwrap();
        let params = DeconvolutionParams::default().with_charge_range((3, 1));
        assert_eq!(
            Deconvoluter::new(store, params).unwrap_err(),
            DeconvolutionError::InvalidChargeRange(3, 1)
        );
    }

    #[test]
    fn test_empty() {
        let store = PeakStore::try_from_pairs(Vec::new()).unwrap();
        let mut task = Deconvoluter::new(store, DeconvolutionParams::default()).unwrap();
        assert!(task.deconvolute().is_empty());
    }
}
