//! Articulations and the playable values they decorate.

use crate::chord::Chord;
use crate::pitch::Pitch;

/// Off-velocity used when an articulation doesn't ask for one.
pub const DEFAULT_OFF_VELOCITY: u8 = 96;

/// GM2 sound controller: release time.
pub const RELEASE_TIME_CC: u8 = 72;
/// GM2 sound controller: attack time.
pub const ATTACK_TIME_CC: u8 = 73;

/// A performance modifier applied to a single note or chord.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Articulation {
    #[default]
    None,
    Staccato,
    Staccatissimo,
    Marcato,
    Accent,
    Tenuto,
    Gliscando,
}

impl Articulation {
    pub const ALL: [Articulation; 7] = [
        Articulation::None,
        Articulation::Staccato,
        Articulation::Staccatissimo,
        Articulation::Marcato,
        Articulation::Accent,
        Articulation::Tenuto,
        Articulation::Gliscando,
    ];

    /// Multiplier applied to the written duration to get the sounding one.
    pub fn duration_scale(self) -> f64 {
        match self {
            Articulation::Staccato => 1.0 / 4.0,
            Articulation::Staccatissimo | Articulation::Marcato => 1.0 / 3.0,
            Articulation::Tenuto => 1.0 + 1.0 / 8.0,
            Articulation::None | Articulation::Accent | Articulation::Gliscando => 1.0,
        }
    }

    /// Added to the channel dynamic for the note-on velocity.
    pub fn velocity_delta(self) -> i32 {
        match self {
            Articulation::Staccatissimo => 8,
            Articulation::Marcato => 12,
            Articulation::Accent => 16,
            _ => 0,
        }
    }

    pub fn off_velocity(self) -> u8 {
        match self {
            Articulation::Staccato | Articulation::Staccatissimo | Articulation::Marcato => 127,
            Articulation::Accent => 113,
            Articulation::Tenuto => 1,
            Articulation::None | Articulation::Gliscando => DEFAULT_OFF_VELOCITY,
        }
    }

    /// Controller values held for the length of the note, as `(cc, value)`.
    /// The previous values are restored when the note ends.
    pub fn knob_twists(self) -> &'static [(u8, u8)] {
        match self {
            Articulation::Staccato => &[(RELEASE_TIME_CC, 20)],
            Articulation::Staccatissimo => &[(RELEASE_TIME_CC, 0)],
            Articulation::Marcato => &[(ATTACK_TIME_CC, 20), (RELEASE_TIME_CC, 64)],
            _ => &[],
        }
    }
}

/// Something that can sound: a single pitch or a chord.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Playable {
    Pitch(Pitch),
    Chord(Chord),
}

impl Playable {
    pub fn shift_octave(&self, octaves: i32) -> Playable {
        match self {
            Playable::Pitch(p) => Playable::Pitch(p.shift_octave(octaves)),
            Playable::Chord(c) => Playable::Chord(c.shift_octave(octaves)),
        }
    }

    pub fn transpose(&self, semitones: i32) -> Playable {
        match self {
            Playable::Pitch(p) => Playable::Pitch(p.transpose(semitones)),
            Playable::Chord(c) => Playable::Chord(c.transpose(semitones)),
        }
    }

    pub fn is_rest(&self) -> bool {
        match self {
            Playable::Pitch(p) => p.is_rest(),
            Playable::Chord(c) => c.pitches().iter().all(|p| p.is_rest()),
        }
    }
}

impl From<Pitch> for Playable {
    fn from(pitch: Pitch) -> Self {
        Playable::Pitch(pitch)
    }
}

impl From<Chord> for Playable {
    fn from(chord: Chord) -> Self {
        Playable::Chord(chord)
    }
}

/// A pitch or chord tagged with its articulation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Articulated {
    pub playable: Playable,
    pub articulation: Articulation,
}

impl Articulated {
    pub fn new(playable: impl Into<Playable>, articulation: Articulation) -> Self {
        Self {
            playable: playable.into(),
            articulation,
        }
    }

    pub fn plain(playable: impl Into<Playable>) -> Self {
        Self::new(playable, Articulation::None)
    }

    pub fn shift_octave(&self, octaves: i32) -> Articulated {
        Self {
            playable: self.playable.shift_octave(octaves),
            articulation: self.articulation,
        }
    }
}
