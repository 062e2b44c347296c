//! The working set of experimental peaks for a single deconvolution run.
use std::cmp::Ordering;
use std::ops::Index;

use itertools::Either;
use mzpeaks::{prelude::*, CentroidPeak, IndexType};

use crate::config::DeconvolutionError;

/// The stable identifier of a peak, its position in the input sequence.
/// It is stored in the [`CentroidPeak::index`] field.
pub type PeakId = IndexType;

/// The identifier of a finalized envelope, its position in the output sequence
pub type EnvelopeId = u32;

/// A direction to move in m/z order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards lower m/z
    Left,
    /// Towards higher m/z
    Right,
}

/// Whether a peak has been claimed by an envelope yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Assignment {
    #[default]
    Unassigned,
    Assigned(EnvelopeId),
}

impl Assignment {
    pub fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned(_))
    }
}

fn seed_order(a: &CentroidPeak, b: &CentroidPeak) -> Ordering {
    b.intensity
        .total_cmp(&a.intensity)
        .then_with(|| a.mz.total_cmp(&b.mz))
        .then_with(|| a.index.cmp(&b.index))
}

/// Holds all peaks sorted by m/z with their assignment state.
///
/// Peaks are looked up by [`PeakId`]. The m/z ordering is used for window scans
/// and the intensity ordering for choosing seeds.
#[derive(Debug, Default, Clone)]
pub struct PeakStore {
    /// Sorted by m/z, ties broken by [`PeakId`]
    peaks: Vec<CentroidPeak>,
    /// Maps a [`PeakId`] to its position in `peaks`
    positions: Vec<usize>,
    /// Every [`PeakId`] ordered by descending intensity, then ascending m/z
    by_intensity: Vec<PeakId>,
    /// Indexed by [`PeakId`]
    assignments: Vec<Assignment>,
}

impl PeakStore {
    /// Build a store from `(m/z, intensity)` pairs, numbering them in input order
    pub fn try_from_pairs<I: IntoIterator<Item = (f64, f32)>>(
        pairs: I,
    ) -> Result<Self, DeconvolutionError> {
        let peaks = pairs
            .into_iter()
            .enumerate()
            .map(|(i, (mz, intensity))| CentroidPeak::new(mz, intensity, i as PeakId))
            .collect();
        Self::try_new(peaks)
    }

    /// Build a store from centroids, renumbering their `index` to input order
    pub fn try_new(mut peaks: Vec<CentroidPeak>) -> Result<Self, DeconvolutionError> {
        for (i, p) in peaks.iter_mut().enumerate() {
            if !(p.mz.is_finite() && p.mz > 0.0 && p.intensity.is_finite() && p.intensity >= 0.0) {
                return Err(DeconvolutionError::InvalidPeak {
                    index: i,
                    mz: p.mz,
                    intensity: p.intensity,
                });
            }
            p.index = i as PeakId;
        }

        // Still in input order here, so `peaks[id]` is the peak with that id
        let mut by_intensity: Vec<PeakId> = (0..peaks.len() as PeakId).collect();
        by_intensity.sort_by(|a, b| seed_order(&peaks[*a as usize], &peaks[*b as usize]));

        peaks.sort_by(|a, b| a.mz.total_cmp(&b.mz).then_with(|| a.index.cmp(&b.index)));

        let mut positions = vec![0; peaks.len()];
        for (position, p) in peaks.iter().enumerate() {
            positions[p.index as usize] = position;
        }
        let assignments = vec![Assignment::Unassigned; peaks.len()];

        Ok(Self {
            peaks,
            positions,
            by_intensity,
            assignments,
        })
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// Total ion current
    pub fn tic(&self) -> f32 {
        self.peaks.iter().map(|p| p.intensity()).sum()
    }

    pub fn get(&self, id: PeakId) -> &CentroidPeak {
        &self.peaks[self.positions[id as usize]]
    }

    /// The position of `id` in m/z order
    pub fn position(&self, id: PeakId) -> usize {
        self.positions[id as usize]
    }

    /// Iterate over all peaks in ascending m/z order
    pub fn iter(&self) -> std::slice::Iter<'_, CentroidPeak> {
        self.peaks.iter()
    }

    pub fn as_slice(&self) -> &[CentroidPeak] {
        &self.peaks
    }

    /// Walk outwards from `id` in m/z sort order, nearest peak first. This follows
    /// the sort order, not the isotope graph.
    pub fn neighbors(
        &self,
        id: PeakId,
        direction: Direction,
    ) -> impl Iterator<Item = &CentroidPeak> + '_ {
        let position = self.position(id);
        match direction {
            Direction::Left => Either::Left(self.peaks[..position].iter().rev()),
            Direction::Right => Either::Right(self.peaks[position + 1..].iter()),
        }
    }

    pub fn assignment(&self, id: PeakId) -> Assignment {
        self.assignments[id as usize]
    }

    pub fn is_assigned(&self, id: PeakId) -> bool {
        self.assignments[id as usize].is_assigned()
    }

    pub fn unassigned_count(&self) -> usize {
        self.assignments.iter().filter(|a| !a.is_assigned()).count()
    }

    /// Claim every peak in `ids` for `envelope`.
    ///
    /// Repeating the same claim is a no-op.
    ///
    /// # Panics
    /// If any peak already belongs to a different envelope. Assignment is exclusive,
    /// so this indicates a bug in the caller.
    pub fn mark_assigned(&mut self, ids: &[PeakId], envelope: EnvelopeId) {
        for id in ids {
            match self.assignments[*id as usize] {
                Assignment::Unassigned => {
                    self.assignments[*id as usize] = Assignment::Assigned(envelope);
                }
                Assignment::Assigned(prior) if prior == envelope => {}
                Assignment::Assigned(prior) => {
                    panic!(
                        "Peak {id} ({:0.4}) is already assigned to envelope {prior}, cannot assign it to {envelope}",
                        self.get(*id).mz
                    )
                }
            }
        }
    }

    /// Iterate over the peaks that are still unassigned from most to least intense,
    /// breaking ties by lower m/z.
    ///
    /// The sequence reads the assignment state as it goes, and a fresh call starts over.
    pub fn unassigned_peaks_by_intensity_descending(
        &self,
    ) -> impl Iterator<Item = &CentroidPeak> + '_ {
        self.by_intensity
            .iter()
            .filter(|id| !self.is_assigned(**id))
            .map(|id| self.get(*id))
    }

    /// Start a [`SeedCursor`] at the most intense peak
    pub fn seeds(&self) -> SeedCursor {
        SeedCursor::default()
    }
}

impl Index<PeakId> for PeakStore {
    type Output = CentroidPeak;

    fn index(&self, index: PeakId) -> &Self::Output {
        self.get(index)
    }
}

/// A position in a [`PeakStore`]'s seed ordering that does not hold a borrow
/// of the store, so the store may be mutated between steps.
///
/// Because peaks only ever move from unassigned to assigned, nothing behind
/// the cursor can become a valid seed again.
#[derive(Debug, Clone, Default)]
pub struct SeedCursor {
    offset: usize,
}

impl SeedCursor {
    /// Advance to the next unassigned peak in descending intensity order
    pub fn next_seed(&mut self, store: &PeakStore) -> Option<PeakId> {
        while let Some(id) = store.by_intensity.get(self.offset).copied() {
            self.offset += 1;
            if !store.is_assigned(id) {
                return Some(id);
            }
        }
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn make_store() -> PeakStore {
        PeakStore::try_from_pairs(vec![
            (500.5, 20.0),
            (500.0, 100.0),
            (501.0, 5.0),
            (499.0, 100.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_sorted_with_stable_ids() {
        let store = make_store();
        let mzs: Vec<_> = store.iter().map(|p| p.mz).collect();
        assert_eq!(mzs, vec![499.0, 500.0, 500.5, 501.0]);
        let ids: Vec<_> = store.iter().map(|p| p.index).collect();
        assert_eq!(ids, vec![3, 1, 0, 2]);
        assert_eq!(store[0].mz, 500.5);
        assert_eq!(store.position(0), 2);
        assert_eq!(store.len(), 4);
        assert_eq!(store.tic(), 225.0);
    }

    #[test]
    fn test_neighbors() {
        let store = make_store();
        let left: Vec<_> = store.neighbors(0, Direction::Left).map(|p| p.index).collect();
        assert_eq!(left, vec![1, 3]);
        let right: Vec<_> = store.neighbors(0, Direction::Right).map(|p| p.index).collect();
        assert_eq!(right, vec![2]);
        assert_eq!(store.neighbors(3, Direction::Left).count(), 0);
    }

    #[test]
    fn test_seed_order() {
        let mut store = make_store();
        let order: Vec<_> = store
            .unassigned_peaks_by_intensity_descending()
            .map(|p| p.index)
            .collect();
        // equal intensities prefer the lower m/z
        assert_eq!(order, vec![3, 1, 0, 2]);

        store.mark_assigned(&[1, 0], 0);
        let order: Vec<_> = store
            .unassigned_peaks_by_intensity_descending()
            .map(|p| p.index)
            .collect();
        assert_eq!(order, vec![3, 2]);
        assert_eq!(store.unassigned_count(), 2);
    }

    #[test]
    fn test_cursor_sees_mutation() {
        let mut store = make_store();
        let mut cursor = store.seeds();
        assert_eq!(cursor.next_seed(&store), Some(3));
        store.mark_assigned(&[3, 1], 0);
        assert_eq!(cursor.next_seed(&store), Some(0));
        store.mark_assigned(&[0], 1);
        assert_eq!(cursor.next_seed(&store), Some(2));
        assert_eq!(cursor.next_seed(&store), None);
    }

    #[test]
    fn test_mark_assigned_idempotent() {
        let mut store = make_store();
        store.mark_assigned(&[2], 4);
        store.mark_assigned(&[2], 4);
        assert_eq!(store.assignment(2), Assignment::Assigned(4));
    }

    #[test]
    #[should_panic(expected = "already assigned")]
    fn test_reassign_panics() {
        let mut store = make_store();
        store.mark_assigned(&[2], 0);
        store.mark_assigned(&[2], 1);
    }

    #[test]
    fn test_invalid_peak() {
        let err = PeakStore::try_from_pairs(vec![(100.0, 1.0), (-5.0, 1.0)]).unwrap_err();
        assert!(matches!(err, DeconvolutionError::InvalidPeak { index: 1, .. }));
        let err = PeakStore::try_from_pairs(vec![(100.0, f32::NAN)]).unwrap_err();
        assert!(matches!(err, DeconvolutionError::InvalidPeak { index: 0, .. }));
    }

    #[test]
    fn test_empty() {
        let store = PeakStore::try_from_pairs(Vec::new()).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.seeds().next_seed(&store), None);
    }
}
