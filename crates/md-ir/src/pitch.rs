//! MIDI pitches and the rest sentinel.

use core::fmt;

use crate::error::{IrError, Result};

const REST_NUM: u8 = 0xFF;
const MAX_MIDI: i32 = 127;

/// A sounding MIDI note number (0-127) or a rest.
///
/// Every transform on [`Pitch::REST`] returns `REST`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pitch(u8);

/// All 128 note pitches, built once.
static PITCHES: [Pitch; 128] = {
    let mut table = [Pitch(0); 128];
    let mut i = 0;
    while i < 128 {
        table[i] = Pitch(i as u8);
        i += 1;
    }
    table
};

const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

impl Pitch {
    pub const REST: Pitch = Pitch(REST_NUM);

    pub const C: Pitch = Pitch(60);
    pub const D: Pitch = Pitch(62);
    pub const E: Pitch = Pitch(64);
    pub const F: Pitch = Pitch(65);
    pub const G: Pitch = Pitch(67);
    pub const A: Pitch = Pitch(69);
    pub const B: Pitch = Pitch(71);

    /// Look up the shared pitch for a MIDI note number.
    pub fn get(midi_num: u8) -> Result<Pitch> {
        PITCHES
            .get(midi_num as usize)
            .copied()
            .ok_or(IrError::PitchOutOfRange(midi_num as i32))
    }

    /// The MIDI note number, or `None` for a rest.
    pub fn midi_num(self) -> Option<u8> {
        if self.is_rest() {
            None
        } else {
            Some(self.0)
        }
    }

    pub fn is_rest(self) -> bool {
        self.0 == REST_NUM
    }

    /// Resolve a note letter (`A`-`G`, case-insensitive) in octave 4.
    pub fn from_letter(letter: char) -> Option<Pitch> {
        match letter.to_ascii_uppercase() {
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            'E' => Some(Self::E),
            'F' => Some(Self::F),
            'G' => Some(Self::G),
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            _ => None,
        }
    }

    /// Move by `semitones`, folding by octaves back into 0..=127 so the
    /// pitch class is preserved at the boundaries.
    pub fn transpose(self, semitones: i32) -> Pitch {
        self.fold(semitones as i64)
    }

    pub fn shift_octave(self, octaves: i32) -> Pitch {
        self.fold(octaves as i64 * 12)
    }

    fn fold(self, semitones: i64) -> Pitch {
        if self.is_rest() {
            return self;
        }
        let n = self.0 as i64 + semitones;
        let max = MAX_MIDI as i64;
        let folded = if n > max {
            max - (max - n).rem_euclid(12)
        } else if n < 0 {
            n.rem_euclid(12)
        } else {
            n
        };
        PITCHES[folded as usize]
    }

    pub fn sharp(self) -> Pitch {
        self.transpose(1)
    }

    pub fn flat(self) -> Pitch {
        self.transpose(-1)
    }

    pub fn minor_second(self) -> Pitch {
        self.transpose(1)
    }

    pub fn major_second(self) -> Pitch {
        self.transpose(2)
    }

    pub fn minor_third(self) -> Pitch {
        self.transpose(3)
    }

    pub fn major_third(self) -> Pitch {
        self.transpose(4)
    }

    pub fn perfect_fourth(self) -> Pitch {
        self.transpose(5)
    }

    pub fn diminished_fifth(self) -> Pitch {
        self.transpose(6)
    }

    pub fn perfect_fifth(self) -> Pitch {
        self.transpose(7)
    }

    pub fn augmented_fifth(self) -> Pitch {
        self.transpose(8)
    }

    pub fn major_sixth(self) -> Pitch {
        self.transpose(9)
    }

    /// Same interval as a major sixth, spelled for seventh chords.
    pub fn diminished_seventh(self) -> Pitch {
        self.transpose(9)
    }

    pub fn minor_seventh(self) -> Pitch {
        self.transpose(10)
    }

    pub fn major_seventh(self) -> Pitch {
        self.transpose(11)
    }

    pub fn octave(self) -> Pitch {
        self.transpose(12)
    }

    pub fn minor_ninth(self) -> Pitch {
        self.transpose(13)
    }

    pub fn major_ninth(self) -> Pitch {
        self.transpose(14)
    }

    pub fn perfect_eleventh(self) -> Pitch {
        self.transpose(17)
    }

    pub fn major_thirteenth(self) -> Pitch {
        self.transpose(21)
    }
}

impl fmt::Debug for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.midi_num() {
            None => write!(f, "*"),
            Some(n) => write!(
                f,
                "{}{}",
                NOTE_NAMES[(n % 12) as usize],
                (n / 12) as i32 - 1
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn extreme_shifts_fold_in_range() {
        assert_eq!(Pitch::C.shift_octave(i32::MAX).midi_num(), Some(120));
        assert_eq!(Pitch::C.shift_octave(i32::MIN).midi_num(), Some(0));
        assert_eq!(Pitch::C.shift_octave(200_000_000).midi_num(), Some(120));
        // 67 - 1_000_000_003 is a multiple of 12
        assert_eq!(Pitch::G.transpose(-1_000_000_003).midi_num(), Some(0));
        assert_eq!(Pitch::G.transpose(i32::MAX).midi_num(), Some(122));
        assert!(Pitch::REST.shift_octave(i32::MAX).is_rest());
    }

    #[test]
    fn midi_round_trip() {
        for n in 0..=127u8 {
            assert_eq!(Pitch::get(n).unwrap().midi_num(), Some(n));
        }
        assert!(Pitch::get(128).is_err());
    }

    #[test]
    fn rest_is_inert() {
        for k in -3..=3 {
            assert_eq!(Pitch::REST.shift_octave(k), Pitch::REST);
            assert_eq!(Pitch::REST.transpose(k), Pitch::REST);
        }
        assert_eq!(Pitch::REST.midi_num(), None);
        assert_eq!(Pitch::REST.perfect_fifth(), Pitch::REST);
    }

    #[test]
    fn octave_shift_folds_at_top() {
        let g9 = Pitch::get(127).unwrap();
        // G9 up an octave stays G9
        assert_eq!(g9.shift_octave(1), g9);
        let c = Pitch::C.shift_octave(10);
        assert_eq!(c.midi_num(), Some(120));
    }

    #[test]
    fn octave_shift_folds_at_bottom() {
        let low = Pitch::get(3).unwrap();
        assert_eq!(low.shift_octave(-1), low);
        assert_eq!(Pitch::C.shift_octave(-5).midi_num(), Some(0));
    }

    #[test]
    fn intervals() {
        assert_eq!(Pitch::C.major_third(), Pitch::E);
        assert_eq!(Pitch::C.perfect_fifth(), Pitch::G);
        assert_eq!(Pitch::C.major_seventh(), Pitch::B);
        assert_eq!(Pitch::D.flat().sharp(), Pitch::D);
    }

    #[test]
    fn display_names() {
        assert_eq!(format!("{}", Pitch::C), "C4");
        assert_eq!(format!("{}", Pitch::A.sharp()), "A#4");
        assert_eq!(format!("{}", Pitch::REST), "*");
    }
}
