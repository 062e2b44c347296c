//! Trace isotopic envelopes outward from a seed peak along a single charge state's graph.
use std::cmp::Ordering;

use mzpeaks::prelude::*;

use crate::graph::{ChargeGraph, IsotopeEdge};
use crate::peaks::{Direction, PeakId, PeakStore};

/// A chain of peaks traced from one seed at one charge state
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub seed: PeakId,
    pub charge: i32,
    /// Member peaks in ascending m/z order, each linked to the next by an
    /// [`IsotopeEdge`] for `charge`
    pub peaks: Vec<PeakId>,
    pub total_intensity: f32,
}

impl Envelope {
    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// The lowest m/z member
    pub fn monoisotopic(&self) -> PeakId {
        self.peaks[0]
    }
}

/// Walks a [`ChargeGraph`] from a seed, taking one step at a time in each
/// direction while the next peak is unassigned and decays in intensity fast
/// enough.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeTracer<'a> {
    peaks: &'a PeakStore,
    pub left_scale_factor: f32,
    pub right_scale_factor: f32,
}

impl<'a> EnvelopeTracer<'a> {
    pub fn new(peaks: &'a PeakStore, left_scale_factor: f32, right_scale_factor: f32) -> Self {
        Self {
            peaks,
            left_scale_factor,
            right_scale_factor,
        }
    }

    fn scale_factor(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Left => self.left_scale_factor,
            Direction::Right => self.right_scale_factor,
        }
    }

    /// Order candidate edges by the intensity of the peak they lead to, then by
    /// how closely they match the expected spacing, then by lowest id.
    fn compare_steps(&self, a: &IsotopeEdge, b: &IsotopeEdge, direction: Direction) -> Ordering {
        let pa = self.peaks.get(a.endpoint(direction));
        let pb = self.peaks.get(b.endpoint(direction));
        pa.intensity()
            .total_cmp(&pb.intensity())
            .then_with(|| b.mz_error.abs().total_cmp(&a.mz_error.abs()))
            .then_with(|| pb.index.cmp(&pa.index))
    }

    /// The best peak a single step away from `current` that is still unassigned
    /// and no more intense than `scale` times the current peak
    fn next_candidate(
        &self,
        graph: &ChargeGraph,
        current: PeakId,
        direction: Direction,
        scale: f32,
    ) -> Option<PeakId> {
        let current_intensity = self.peaks[current].intensity();
        graph
            .edges_from(current, direction)
            .filter(|e| {
                let next = e.endpoint(direction);
                if self.peaks.is_assigned(next) {
                    return false;
                }
                let next_intensity = self.peaks[next].intensity();
                if next_intensity > scale * current_intensity {
                    tracing::trace!(
                        "Rejected {:?} step from {current} to {next} at charge {}: {next_intensity} > {scale} * {current_intensity}",
                        direction,
                        graph.charge,
                    );
                    return false;
                }
                true
            })
            .max_by(|a, b| self.compare_steps(a, b, direction))
            .map(|e| e.endpoint(direction))
    }

    /// Collect the chain leading away from `seed` in `direction`, nearest first.
    /// Stops at the first peak with no acceptable next step.
    fn extend(&self, graph: &ChargeGraph, seed: PeakId, direction: Direction) -> Vec<PeakId> {
        let scale = self.scale_factor(direction);
        let mut chain = Vec::new();
        let mut current = seed;
        while let Some(next) = self.next_candidate(graph, current, direction, scale) {
            chain.push(next);
            current = next;
        }
        chain
    }

    /// Build the maximal contiguous chain through `graph` containing `seed`
    pub fn trace(&self, graph: &ChargeGraph, seed: PeakId) -> Envelope {
        debug_assert!(!self.peaks.is_assigned(seed));
        let left = self.extend(graph, seed, Direction::Left);
        let right = self.extend(graph, seed, Direction::Right);

        let mut peaks = Vec::with_capacity(left.len() + right.len() + 1);
        peaks.extend(left.into_iter().rev());
        peaks.push(seed);
        peaks.extend(right);

        let total_intensity = peaks.iter().map(|i| self.peaks[*i].intensity()).sum();
        Envelope {
            seed,
            charge: graph.charge,
            peaks,
            total_intensity,
        }
    }
}
