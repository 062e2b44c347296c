//! Choose the charge state that best explains the peaks around a seed.
#[cfg(feature = "parallelism")]
use rayon::prelude::*;

use crate::envelope::{Envelope, EnvelopeTracer};
use crate::graph::CandidateGraph;
use crate::peaks::PeakId;

/// Whether `candidate` should replace `incumbent`: strictly more total intensity,
/// or equal intensity at a lower charge.
fn is_better(candidate: &Envelope, incumbent: &Envelope) -> bool {
    match candidate.total_intensity.total_cmp(&incumbent.total_intensity) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Equal => candidate.charge < incumbent.charge,
        std::cmp::Ordering::Less => false,
    }
}

/// Traces one [`Envelope`] per charge state for a seed and keeps the one with
/// the greatest total intensity, preferring the lowest charge among ties.
#[derive(Debug, Clone, Copy)]
pub struct ChargeArbiter<'a> {
    graph: &'a CandidateGraph,
    tracer: EnvelopeTracer<'a>,
}

impl<'a> ChargeArbiter<'a> {
    pub fn new(graph: &'a CandidateGraph, tracer: EnvelopeTracer<'a>) -> Self {
        Self { graph, tracer }
    }

    /// Every charge state's candidate for `seed`, in ascending charge order
    pub fn candidates(&self, seed: PeakId) -> Vec<Envelope> {
        self.graph
            .iter()
            .map(|g| self.tracer.trace(g, seed))
            .collect()
    }

    /// The winning candidate for `seed`. `None` only if the graph covers no charges.
    #[cfg(not(feature = "parallelism"))]
    pub fn arbitrate(&self, seed: PeakId) -> Option<Envelope> {
        self.graph
            .iter()
            .map(|g| self.tracer.trace(g, seed))
            .reduce(|best, next| if is_better(&next, &best) { next } else { best })
    }

    /// The winning candidate for `seed`. `None` only if the graph covers no charges.
    #[cfg(feature = "parallelism")]
    pub fn arbitrate(&self, seed: PeakId) -> Option<Envelope> {
        self.graph
            .as_slice()
            .par_iter()
            .map(|g| self.tracer.trace(g, seed))
            .reduce_with(|best, next| if is_better(&next, &best) { next } else { best })
    }
}

#[cfg(test)]
mod test {
    use mzpeaks::Tolerance;

    use super::*;
    use crate::charge::NEUTRON_MASS;
    use crate::graph::GraphBuilder;
    use crate::peaks::PeakStore;

    #[test]
    fn test_picks_most_intense_charge() {
        // A charge 2 envelope around 600 with a stray peak one neutron away from the seed
        let store = PeakStore::try_from_pairs(vec![
            (600.0, 100.0),
            (600.0 + NEUTRON_MASS / 2.0, 70.0),
            (600.0 + NEUTRON_MASS, 50.0),
            (600.0 + 3.0 * NEUTRON_MASS / 2.0, 30.0),
            (600.0 - NEUTRON_MASS, 10.0),
        ])
        .unwrap();
        let graph = GraphBuilder::new(Tolerance::PPM(10.0).into(), (1, 3)).build(&store);
        let tracer = EnvelopeTracer::new(&store, 0.6, 0.9);
        let arbiter = ChargeArbiter::new(&graph, tracer);

        let candidates = arbiter.candidates(0);
        assert_eq!(candidates.len(), 3);
        // charge 1: 598.99 -> 600 -> 601.01, 10 + 100 + 50
        assert_eq!(candidates[0].peaks, vec![4, 0, 2]);
        assert_eq!(candidates[0].total_intensity, 160.0);
        // charge 2: 600 -> 600.5 -> 601.01 -> 601.51
        assert_eq!(candidates[1].peaks, vec![0, 1, 2, 3]);
        assert_eq!(candidates[2].peaks, vec![0]);

        let best = arbiter.arbitrate(0).unwrap();
        assert_eq!(best.charge, 2);
        assert_eq!(best.total_intensity, 250.0);
        for c in candidates.iter() {
            assert!(best.total_intensity >= c.total_intensity);
        }
    }

    #[test]
    fn test_ties_prefer_lowest_charge() {
        let store = PeakStore::try_from_pairs(vec![(400.0, 10.0)]).unwrap();
        let graph = GraphBuilder::new(Tolerance::Da(0.02).into(), (2, 5)).build(&store);
        let tracer = EnvelopeTracer::new(&store, 0.6, 0.9);
        let arbiter = ChargeArbiter::new(&graph, tracer);
        let best = arbiter.arbitrate(0).unwrap();
        assert_eq!(best.charge, 2);
        assert_eq!(best.peaks, vec![0]);
    }

    #[test]
    fn test_tie_between_multi_peak_envelopes() {
        // Same intensity reachable at charge 1 and at charge 3
        let store = PeakStore::try_from_pairs(vec![
            (500.0, 100.0),
            (500.0 + NEUTRON_MASS, 40.0),
            (500.0 + NEUTRON_MASS / 3.0, 40.0),
        ])
        .unwrap();
        let graph = GraphBuilder::new(Tolerance::Da(0.005).into(), (1, 3)).build(&store);
        let tracer = EnvelopeTracer::new(&store, 0.6, 0.9);
        let arbiter = ChargeArbiter::new(&graph, tracer);
        let best = arbiter.arbitrate(0).unwrap();
        assert_eq!(best.charge, 1);
        assert_eq!(best.peaks, vec![0, 1]);
    }
}
