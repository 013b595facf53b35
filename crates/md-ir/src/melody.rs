//! Melodies: sequences of articulated pitches and chords.

use alloc::vec::Vec;
use core::ops::Range;

use crate::articulation::Articulated;
use crate::chord::wrap_index;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Melody {
    elements: Vec<Articulated>,
}

impl Melody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: Articulated) {
        self.elements.push(element);
    }

    /// Append every element of `other`.
    pub fn append(&mut self, other: &Melody) {
        self.elements.extend(other.elements.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[Articulated] {
        &self.elements
    }

    /// Index with the same overflow rule as [`Chord::get`](crate::Chord::get):
    /// wrapping past either end shifts the element by the overflowed octaves.
    pub fn get(&self, index: i32) -> Option<Articulated> {
        if self.elements.is_empty() {
            return None;
        }
        let (i, octaves) = wrap_index(index, self.elements.len());
        let element = &self.elements[i];
        Some(if octaves == 0 {
            element.clone()
        } else {
            element.shift_octave(octaves)
        })
    }

    /// Elements at the logical indices in `range`, overflow rule applied.
    pub fn range(&self, range: Range<i32>) -> Melody {
        range.filter_map(|i| self.get(i)).collect()
    }

    pub fn shift_octave(&self, octaves: i32) -> Melody {
        self.elements.iter().map(|e| e.shift_octave(octaves)).collect()
    }
}

impl FromIterator<Articulated> for Melody {
    fn from_iter<I: IntoIterator<Item = Articulated>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}
