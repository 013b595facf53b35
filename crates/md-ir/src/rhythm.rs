//! Rhythms: sequences of beats, each independently slurrable.

use alloc::vec::Vec;

use crate::beat::Beat;
use crate::error::Result;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rhythm {
    beats: Vec<Beat>,
}

impl Rhythm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, beat: Beat) {
        self.beats.push(beat);
    }

    pub fn append(&mut self, other: &Rhythm) {
        self.beats.extend_from_slice(&other.beats);
    }

    pub fn len(&self) -> usize {
        self.beats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    pub fn beats(&self) -> &[Beat] {
        &self.beats
    }

    /// The beat at `index`, wrapping around past the end.
    pub fn get(&self, index: usize) -> Option<Beat> {
        if self.beats.is_empty() {
            None
        } else {
            Some(self.beats[index % self.beats.len()])
        }
    }

    pub fn is_slurred(&self, index: usize) -> bool {
        self.get(index).is_some_and(|b| b.is_slurred())
    }

    /// Total length in quarter notes.
    pub fn duration(&self) -> Beat {
        self.beats.iter().fold(Beat::default(), |acc, b| acc + *b)
    }

    /// Flip the slur flag of every beat.
    pub fn toggle_slur(&self) -> Rhythm {
        self.beats.iter().map(|b| b.toggle_slur()).collect()
    }

    pub fn with_slur(&self, slurred: bool) -> Rhythm {
        self.beats.iter().map(|b| b.with_slur(slurred)).collect()
    }

    /// Apply the same tuplet scaling to every beat.
    pub fn tuplet(&self, numerator: u32, denominator: u32) -> Result<Rhythm> {
        self.beats
            .iter()
            .map(|b| b.tuplet(numerator, denominator))
            .collect()
    }
}

impl FromIterator<Beat> for Rhythm {
    fn from_iter<I: IntoIterator<Item = Beat>>(iter: I) -> Self {
        Self {
            beats: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_sums_quarters() {
        let r: Rhythm = [Beat::QUARTER, Beat::EIGHTH, Beat::EIGHTH, Beat::HALF]
            .into_iter()
            .collect();
        assert_eq!(r.duration().num_quarters(), 4.0);
        assert_eq!(Rhythm::new().duration().num_quarters(), 0.0);
    }

    #[test]
    fn slur_toggling_is_per_beat() {
        let mut r: Rhythm = [Beat::QUARTER, Beat::QUARTER].into_iter().collect();
        r.push(Beat::QUARTER.with_slur(true));
        assert!(!r.is_slurred(0));
        assert!(r.is_slurred(2));
        let flipped = r.toggle_slur();
        assert!(flipped.is_slurred(0));
        assert!(!flipped.is_slurred(2));
    }

    #[test]
    fn index_wraps() {
        let r: Rhythm = [Beat::QUARTER, Beat::HALF].into_iter().collect();
        assert_eq!(r.get(3), Some(Beat::HALF));
        assert_eq!(Rhythm::new().get(0), None);
    }

    #[test]
    fn rhythm_tuplet() {
        let r: Rhythm = [Beat::EIGHTH; 3].into_iter().collect();
        let t = r.tuplet(3, 2).unwrap();
        assert!((t.duration().num_quarters() - 1.0).abs() < 1e-12);
        assert!(r.tuplet(0, 2).is_err());
    }
}
