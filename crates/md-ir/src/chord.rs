//! Chords: ordered pitch stacks and chord-symbol resolution.

use alloc::vec::Vec;

use crate::pitch::Pitch;

/// Chord qualities by symbol suffix, as semitone offsets from the root.
const QUALITIES: &[(&str, &[i32])] = &[
    ("", &[0, 4, 7]),
    ("maj", &[0, 4, 7]),
    ("M", &[0, 4, 7]),
    ("min", &[0, 3, 7]),
    ("m", &[0, 3, 7]),
    ("dim", &[0, 3, 6]),
    ("aug", &[0, 4, 8]),
    ("+", &[0, 4, 8]),
    ("7", &[0, 4, 7, 10]),
    ("dom7", &[0, 4, 7, 10]),
    ("maj7", &[0, 4, 7, 11]),
    ("M7", &[0, 4, 7, 11]),
    ("min7", &[0, 3, 7, 10]),
    ("m7", &[0, 3, 7, 10]),
    ("minmaj7", &[0, 3, 7, 11]),
    ("mM7", &[0, 3, 7, 11]),
    ("dim7", &[0, 3, 6, 9]),
    ("m7b5", &[0, 3, 6, 10]),
    ("min7b5", &[0, 3, 6, 10]),
    ("aug7", &[0, 4, 8, 10]),
    ("+7", &[0, 4, 8, 10]),
    ("sus2", &[0, 2, 7]),
    ("sus4", &[0, 5, 7]),
    ("6", &[0, 4, 7, 9]),
    ("maj6", &[0, 4, 7, 9]),
    ("m6", &[0, 3, 7, 9]),
    ("min6", &[0, 3, 7, 9]),
    ("9", &[0, 4, 7, 10, 14]),
    ("maj9", &[0, 4, 7, 11, 14]),
    ("min9", &[0, 3, 7, 10, 14]),
    ("m9", &[0, 3, 7, 10, 14]),
    ("add9", &[0, 4, 7, 14]),
    ("11", &[0, 4, 7, 10, 14, 17]),
    ("13", &[0, 4, 7, 10, 14, 21]),
];

/// Split a logical index over `len` elements into a physical index and
/// the number of octaves the logical index overflowed by.
pub(crate) fn wrap_index(index: i32, len: usize) -> (usize, i32) {
    let len = len as i32;
    (index.rem_euclid(len) as usize, index.div_euclid(len))
}

/// An ordered stack of pitches. Insertion order is voicing order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Chord {
    pitches: Vec<Pitch>,
}

impl Chord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pitches(pitches: impl IntoIterator<Item = Pitch>) -> Self {
        Self {
            pitches: pitches.into_iter().collect(),
        }
    }

    /// Build a chord from semitone offsets above `root`.
    pub fn from_intervals(root: Pitch, intervals: &[i32]) -> Self {
        Self::from_pitches(intervals.iter().map(|&i| root.transpose(i)))
    }

    pub fn push(&mut self, pitch: Pitch) {
        self.pitches.push(pitch);
    }

    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    pub fn pitches(&self) -> &[Pitch] {
        &self.pitches
    }

    /// Index into the voicing. Indices past either end wrap around and
    /// shift the pitch by the number of octaves overflowed, so `get(len)`
    /// is the root an octave up and `get(-1)` is the top note an octave down.
    pub fn get(&self, index: i32) -> Option<Pitch> {
        if self.pitches.is_empty() {
            return None;
        }
        let (i, octaves) = wrap_index(index, self.pitches.len());
        Some(self.pitches[i].shift_octave(octaves))
    }

    pub fn shift_octave(&self, octaves: i32) -> Chord {
        Self::from_pitches(self.pitches.iter().map(|p| p.shift_octave(octaves)))
    }

    pub fn transpose(&self, semitones: i32) -> Chord {
        Self::from_pitches(self.pitches.iter().map(|p| p.transpose(semitones)))
    }

    /// The `n`th inversion: the voicing starting at logical index `n`.
    pub fn invert(&self, n: i32) -> Chord {
        let len = self.pitches.len() as i32;
        Self::from_pitches((n..n + len).filter_map(|i| self.get(i)))
    }

    /// Resolve a chord symbol such as `Cmaj7`, `F#min` or `Bb+1`.
    ///
    /// Grammar: a root letter, any number of `#`/`b` accidentals, a
    /// quality suffix, and an optional signed octave shift (`+1`, `-2`).
    /// A suffix that is itself a quality (`C+7`) is read as the quality.
    pub fn resolve(symbol: &str) -> Option<Chord> {
        let mut chars = symbol.chars();
        let mut root = chars
            .next()
            .filter(|c| c.is_ascii_uppercase())
            .and_then(Pitch::from_letter)?;
        let mut rest = chars.as_str();
        // Uppercase letters never start a quality, so a leading `b` is a flat.
        loop {
            if let Some(r) = rest.strip_prefix('#') {
                root = root.sharp();
                rest = r;
            } else if let Some(r) = rest.strip_prefix('b') {
                root = root.flat();
                rest = r;
            } else {
                break;
            }
        }

        if let Some(intervals) = quality(rest) {
            return Some(Self::from_intervals(root, intervals));
        }

        let split = rest.rfind(|c| c == '+' || c == '-')?;
        let (suffix, shift) = rest.split_at(split);
        let digits = &shift[1..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let octaves: i32 = digits.parse().ok()?;
        let octaves = if shift.starts_with('-') { -octaves } else { octaves };
        let intervals = quality(suffix)?;
        Some(Self::from_intervals(root, intervals).shift_octave(octaves))
    }
}

fn quality(suffix: &str) -> Option<&'static [i32]> {
    QUALITIES
        .iter()
        .find(|(name, _)| *name == suffix)
        .map(|(_, intervals)| *intervals)
}

impl FromIterator<Pitch> for Chord {
    fn from_iter<I: IntoIterator<Item = Pitch>>(iter: I) -> Self {
        Self::from_pitches(iter)
    }
}
