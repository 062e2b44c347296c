//! Charge-partitioned graphs relating peaks whose m/z spacing matches an isotopic shift.
use std::collections::HashMap;

use identity_hash::BuildIdentityHasher;
use mzpeaks::CentroidPeak;

#[cfg(feature = "parallelism")]
use rayon::prelude::*;

use crate::charge::{isotopic_shift, ChargeRange, ChargeRangeIter};
use crate::peaks::{Direction, PeakId, PeakStore};
use crate::tolerance::ToleranceMatcher;

/// A directed link from a lower m/z peak to a higher m/z peak whose spacing
/// matches the isotopic shift for `charge`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsotopeEdge {
    pub lower: PeakId,
    pub higher: PeakId,
    pub charge: i32,
    /// The observed m/z difference, `higher - lower`
    pub delta: f64,
    /// The observed minus the expected spacing
    pub mz_error: f64,
    /// `mz_error` relative to the lower peak's m/z
    pub ppm_error: f64,
}

impl IsotopeEdge {
    pub fn new(lower: &CentroidPeak, higher: &CentroidPeak, charge: i32, expected: f64) -> Self {
        let delta = higher.mz - lower.mz;
        let mz_error = delta - expected;
        Self {
            lower: lower.index,
            higher: higher.index,
            charge,
            delta,
            mz_error,
            ppm_error: mz_error / lower.mz * 1e6,
        }
    }

    /// The end of the edge reached by moving in `direction`
    #[inline]
    pub fn endpoint(&self, direction: Direction) -> PeakId {
        match direction {
            Direction::Left => self.lower,
            Direction::Right => self.higher,
        }
    }
}

type Adjacency = HashMap<PeakId, Vec<usize>, BuildIdentityHasher<PeakId>>;

/// All [`IsotopeEdge`]s for a single charge state, with adjacency lists in both
/// directions keyed by [`PeakId`].
#[derive(Debug, Default)]
pub struct ChargeGraph {
    pub charge: i32,
    edges: Vec<IsotopeEdge>,
    /// Edges whose `lower` end is the key
    successors: Adjacency,
    /// Edges whose `higher` end is the key
    predecessors: Adjacency,
}

impl ChargeGraph {
    pub fn new(charge: i32) -> Self {
        Self {
            charge,
            ..Default::default()
        }
    }

    pub fn add_edge(&mut self, edge: IsotopeEdge) {
        debug_assert_eq!(edge.charge, self.charge);
        let k = self.edges.len();
        self.successors.entry(edge.lower).or_default().push(k);
        self.predecessors.entry(edge.higher).or_default().push(k);
        self.edges.push(edge);
    }

    /// The edges incident on `id` that lead in `direction`
    pub fn edges_from(
        &self,
        id: PeakId,
        direction: Direction,
    ) -> impl Iterator<Item = &IsotopeEdge> + '_ {
        let adjacency = match direction {
            Direction::Left => &self.predecessors,
            Direction::Right => &self.successors,
        };
        adjacency
            .get(&id)
            .into_iter()
            .flatten()
            .map(|k| &self.edges[*k])
    }

    pub fn edge_between(&self, lower: PeakId, higher: PeakId) -> Option<&IsotopeEdge> {
        self.edges_from(lower, Direction::Right)
            .find(|e| e.higher == higher)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IsotopeEdge> {
        self.edges.iter()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// One [`ChargeGraph`] per charge state in the configured range. Built once per run
/// and read-only afterwards.
#[derive(Debug, Default)]
pub struct CandidateGraph {
    /// Ordered by ascending charge
    graphs: Vec<ChargeGraph>,
}

impl CandidateGraph {
    pub fn get(&self, charge: i32) -> Option<&ChargeGraph> {
        let first = self.graphs.first()?.charge;
        if charge < first {
            return None;
        }
        self.graphs.get((charge - first) as usize)
    }

    /// The charge states covered, ascending
    pub fn charges(&self) -> impl Iterator<Item = i32> + '_ {
        self.graphs.iter().map(|g| g.charge)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChargeGraph> {
        self.graphs.iter()
    }

    pub fn as_slice(&self) -> &[ChargeGraph] {
        &self.graphs
    }

    pub fn edge_count(&self) -> usize {
        self.graphs.iter().map(|g| g.len()).sum()
    }
}

/// Proposes [`IsotopeEdge`]s between peaks for every charge in a range
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder {
    pub matcher: ToleranceMatcher,
    pub charge_range: ChargeRange,
}

impl GraphBuilder {
    pub fn new(matcher: ToleranceMatcher, charge_range: ChargeRange) -> Self {
        Self {
            matcher,
            charge_range,
        }
    }

    /// Scan forward from each peak through the peaks no further away than the
    /// isotopic shift plus the tolerance window, linking those that match.
    pub fn build_charge(&self, peaks: &PeakStore, charge: i32) -> ChargeGraph {
        let shift = isotopic_shift(charge);
        let mut graph = ChargeGraph::new(charge);
        for peak in peaks.iter() {
            let width = self.matcher.width(peak.mz);
            let candidates = peaks
                .neighbors(peak.index, Direction::Right)
                .take_while(|other| other.mz - peak.mz - shift <= width);
            for other in candidates {
                let delta = other.mz - peak.mz;
                // Duplicated m/z values are distinct nodes but are never isotopes of one another
                if delta <= 0.0 {
                    continue;
                }
                if self.matcher.within_tolerance(delta, shift, peak.mz) {
                    graph.add_edge(IsotopeEdge::new(peak, other, charge, shift));
                }
            }
        }
        tracing::debug!(charge, edges = graph.len(), "Built isotope graph");
        graph
    }

    #[cfg(not(feature = "parallelism"))]
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build(&self, peaks: &PeakStore) -> CandidateGraph {
        let graphs = ChargeRangeIter::from(self.charge_range)
            .map(|z| self.build_charge(peaks, z))
            .collect();
        CandidateGraph { graphs }
    }

    #[cfg(feature = "parallelism")]
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build(&self, peaks: &PeakStore) -> CandidateGraph {
        let charges: Vec<i32> = ChargeRangeIter::from(self.charge_range).collect();
        let graphs = charges
            .into_par_iter()
            .map(|z| self.build_charge(peaks, z))
            .collect();
        CandidateGraph { graphs }
    }
}
