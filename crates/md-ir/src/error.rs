//! Construction-time validation errors.

use thiserror::Error;

use crate::dynamic::RampKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IrError {
    #[error("Invalid tuplet {numerator}:{denominator}: numerator must be > 1 and denominator > 0")]
    InvalidTuplet { numerator: u32, denominator: u32 },
    #[error("Invalid time signature {numerator}/{denominator}")]
    InvalidTimeSignature { numerator: u8, denominator: u8 },
    #[error("Invalid tempo: {0} bpm")]
    InvalidTempo(u32),
    #[error("Invalid PPQN: {0}")]
    InvalidPpqn(u16),
    #[error("Pitch out of range: {0}")]
    PitchOutOfRange(i32),
    #[error("{kind} from velocity {start} to {end} goes the wrong way")]
    InvalidRamp { kind: RampKind, start: u8, end: u8 },
    #[error("Invalid {what}: {value}")]
    InvalidData { what: &'static str, value: i32 },
    #[error("Beat durations cannot be negative: {0}")]
    NegativeBeat(f64),
}

pub type Result<T> = core::result::Result<T, IrError>;
