use chemical_elements::{neutral_mass, PROTON};
use mzpeaks::{prelude::*, CentroidPeak};

use crate::envelope::Envelope;
use crate::peaks::{EnvelopeId, PeakId, PeakStore};

/// A finalized isotopic envelope, reduced to its monoisotopic peak, charge state
/// and total intensity.
///
/// Every member [`CentroidPeak`] keeps its input position in its `index` field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeconvolutedPeak {
    /// The position of this envelope in processing order
    pub envelope_id: EnvelopeId,
    /// The lowest m/z member
    pub monoisotopic_peak: CentroidPeak,
    /// The peak the envelope was traced from
    pub seed: CentroidPeak,
    pub charge: i32,
    /// The sum of all members' intensities
    pub total_intensity: f32,
    /// Members in ascending m/z order
    pub peaks: Vec<CentroidPeak>,
}

impl DeconvolutedPeak {
    pub fn from_envelope(envelope_id: EnvelopeId, envelope: &Envelope, store: &PeakStore) -> Self {
        let peaks: Vec<CentroidPeak> = envelope.peaks.iter().map(|i| store[*i].clone()).collect();
        Self {
            envelope_id,
            monoisotopic_peak: peaks[0].clone(),
            seed: store[envelope.seed].clone(),
            charge: envelope.charge,
            total_intensity: envelope.total_intensity,
            peaks,
        }
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// Whether no isotopic peaks were found alongside the seed, in which case
    /// the charge carries no information
    pub fn is_singleton(&self) -> bool {
        self.peaks.len() == 1
    }

    pub fn mz(&self) -> f64 {
        self.monoisotopic_peak.mz()
    }

    /// The uncharged mass implied by the monoisotopic peak and charge, assuming protonation
    pub fn neutral_mass(&self) -> f64 {
        neutral_mass(self.monoisotopic_peak.mz(), self.charge, PROTON)
    }

    /// The most intense member, which is usually but not always the seed
    pub fn largest_peak(&self) -> &CentroidPeak {
        self.peaks
            .iter()
            .reduce(|best, p| if p.intensity() > best.intensity() { p } else { best })
            .unwrap_or(&self.monoisotopic_peak)
    }

    /// The m/z span from the first to the last member
    pub fn mz_window(&self) -> (f64, f64) {
        match (self.peaks.first(), self.peaks.last()) {
            (Some(first), Some(last)) => (first.mz(), last.mz()),
            _ => (self.mz(), self.mz()),
        }
    }

    /// Input positions of the members, ascending m/z order
    pub fn peak_ids(&self) -> impl Iterator<Item = PeakId> + '_ {
        self.peaks.iter().map(|p| p.index)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::charge::NEUTRON_MASS;

    #[test]
    fn test_from_envelope() {
        let store = PeakStore::try_from_pairs(vec![
            (700.0 + NEUTRON_MASS / 2.0, 100.0),
            (700.0, 60.0),
            (700.0 + NEUTRON_MASS, 80.0),
        ])
        .unwrap();
        let envelope = Envelope {
            seed: 0,
            charge: 2,
            peaks: vec![1, 0, 2],
            total_intensity: 240.0,
        };
        let dpeak = DeconvolutedPeak::from_envelope(3, &envelope, &store);
        assert_eq!(dpeak.envelope_id, 3);
        assert_eq!(dpeak.monoisotopic_peak.index, 1);
        assert_eq!(dpeak.seed.index, 0);
        assert_eq!(dpeak.largest_peak().index, 0);
        assert_eq!(dpeak.peak_ids().collect::<Vec<_>>(), vec![1, 0, 2]);
        assert_eq!(dpeak.mz_window(), (700.0, 700.0 + NEUTRON_MASS));
        assert!(!dpeak.is_singleton());

        let expected = 700.0 * 2.0 - 2.0 * PROTON;
        assert!((dpeak.neutral_mass() - expected).abs() < 1e-6);
    }
}
