//! Conversions between beats, MIDI ticks and real time.
//!
//! A [`TimingEnvironment`] is fixed at construction (time signature,
//! tempo, resolution) and shared read-only by every channel.

use crate::beat::Beat;
use crate::error::{IrError, Result};
use crate::event::MetaEvent;

/// Ticks per quarter note. Divisible by 2, 3, 4, 5, 6 and 8 so the
/// common tuplet subdivisions land on whole ticks.
pub const DEFAULT_PPQN: u16 = 960;

const MICROS_PER_MINUTE: u64 = 60_000_000;

/// Time signature, tempo and tick resolution of a composition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimingEnvironment {
    numerator: u8,
    denominator: u8,
    bpm: u32,
    ppqn: u16,
}

impl TimingEnvironment {
    pub fn new(numerator: u8, denominator: u8, bpm: u32) -> Result<Self> {
        Self::with_ppqn(numerator, denominator, bpm, DEFAULT_PPQN)
    }

    pub fn with_ppqn(numerator: u8, denominator: u8, bpm: u32, ppqn: u16) -> Result<Self> {
        if numerator == 0 || denominator == 0 {
            return Err(IrError::InvalidTimeSignature {
                numerator,
                denominator,
            });
        }
        // Tempo must also fit the 24-bit tempo meta event.
        if bpm == 0 || MICROS_PER_MINUTE / bpm as u64 > 0xFF_FFFF {
            return Err(IrError::InvalidTempo(bpm));
        }
        // The SMF header stores the division in 15 bits.
        if ppqn == 0 || ppqn > 0x7FFF {
            return Err(IrError::InvalidPpqn(ppqn));
        }
        Ok(Self {
            numerator,
            denominator,
            bpm,
            ppqn,
        })
    }

    pub fn numerator(&self) -> u8 {
        self.numerator
    }

    pub fn denominator(&self) -> u8 {
        self.denominator
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn ppqn(&self) -> u16 {
        self.ppqn
    }

    /// `round(PPQN * quarters)`.
    pub fn ticks_in_beat(&self, beat: Beat) -> u64 {
        libm::round(self.ppqn as f64 * beat.num_quarters()) as u64
    }

    pub fn ticks_to_micros(&self, ticks: u64) -> u64 {
        ticks * MICROS_PER_MINUTE / (self.ppqn as u64 * self.bpm as u64)
    }

    pub fn approx_duration_of_beat_in_micros(&self, beat: Beat) -> u64 {
        libm::round(MICROS_PER_MINUTE as f64 * beat.num_quarters() / self.bpm as f64) as u64
    }

    /// Microseconds per quarter note, as carried by the tempo meta event.
    pub fn micros_per_quarter(&self) -> u32 {
        (MICROS_PER_MINUTE / self.bpm as u64) as u32
    }

    /// Length of one measure. The denominator names the beat unit
    /// (4 = quarter, 8 = eighth).
    pub fn ticks_per_measure(&self) -> u64 {
        self.ppqn as u64 * 4 * self.numerator as u64 / self.denominator as u64
    }

    pub fn time_signature_event(&self) -> MetaEvent {
        MetaEvent::TimeSignature {
            numerator: self.numerator,
            denominator_log2: log2_floor(self.denominator),
            clocks_per_click: 24,
            thirty_seconds_per_quarter: 8,
        }
    }

    pub fn tempo_event(&self) -> MetaEvent {
        MetaEvent::Tempo {
            micros_per_quarter: self.micros_per_quarter(),
        }
    }
}

impl Default for TimingEnvironment {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
            bpm: 120,
            ppqn: DEFAULT_PPQN,
        }
    }
}

fn log2_floor(n: u8) -> u8 {
    (u8::BITS - 1 - n.leading_zeros()) as u8
}
