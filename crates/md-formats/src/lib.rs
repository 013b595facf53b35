//! File formats for mellowd.
//!
//! Writes a compiled [`md_engine::Sequence`] out as a Standard MIDI File
//! and reads SMF data back into `md-ir` events.

mod smf;

pub use smf::{read_smf, save_smf, smf_bytes, write_smf, SmfSong};

use md_engine::EngineError;
use md_ir::IrError;
use thiserror::Error;

/// Error type for format reading and writing.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Ir(#[from] IrError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed MIDI file: {0}")]
    Parse(#[from] midly::Error),
    /// SMF delta times are 28-bit.
    #[error("Gap of {0} ticks is too long for a MIDI file")]
    DeltaTooLarge(u64),
    #[error("SMPTE timecode timing is not supported")]
    UnsupportedTiming,
}

pub type Result<T> = std::result::Result<T, FormatError>;
