//! Error types for the scheduling engine.

use md_ir::IrError;
use thiserror::Error;

use crate::sequence::TrackId;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Ir(#[from] IrError),
    /// A MIDI message could not be built from the channel's state.
    #[error("{op} ({detail}): {source}")]
    InvalidMessage {
        op: &'static str,
        detail: String,
        source: IrError,
    },
    #[error("Sync needs at least 2 members, got {0}")]
    SyncMembers(usize),
    #[error("Track not registered: {0:?}")]
    UnknownTrack(TrackId),
    #[error("Shared state poisoned by a panicked worker")]
    Poisoned,
}

impl EngineError {
    pub(crate) fn invalid(op: &'static str, detail: String, source: IrError) -> Self {
        Self::InvalidMessage { op, detail, source }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
