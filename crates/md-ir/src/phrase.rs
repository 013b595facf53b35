//! A melody paired with a rhythm.

use crate::articulation::Articulated;
use crate::beat::Beat;
use crate::melody::Melody;
use crate::rhythm::Rhythm;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Phrase {
    pub melody: Melody,
    pub rhythm: Rhythm,
}

impl Phrase {
    pub fn new(melody: Melody, rhythm: Rhythm) -> Self {
        Self { melody, rhythm }
    }

    /// Number of zipped elements: the longer of the two sides, or zero
    /// when either side is empty.
    pub fn len(&self) -> usize {
        if self.melody.is_empty() || self.rhythm.is_empty() {
            0
        } else {
            self.melody.len().max(self.rhythm.len())
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zip melody and rhythm element-wise. The shorter side wraps around;
    /// a wrapped melody element is shifted up by the octaves it overflowed.
    pub fn iter(&self) -> impl Iterator<Item = (Articulated, Beat)> + '_ {
        (0..self.len()).filter_map(move |i| {
            Some((self.melody.get(i as i32)?, self.rhythm.get(i)?))
        })
    }

    /// Length in quarter notes of everything [`Phrase::iter`] yields.
    pub fn duration(&self) -> Beat {
        self.iter().fold(Beat::default(), |acc, (_, b)| acc + b)
    }
}
