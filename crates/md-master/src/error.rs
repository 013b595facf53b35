//! Errors raised while compiling a composition.

use std::time::Duration;

use md_engine::EngineError;
use md_formats::FormatError;
use thiserror::Error;

use crate::block::SourceLocation;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("No free channel for block '{block}' (percussion: {percussion})")]
    NoChannelAvailable { block: String, percussion: bool },
    /// A statement failed; `location` points at it in the source.
    #[error("Block '{block}' at {location}: {source}")]
    Block {
        block: String,
        location: SourceLocation,
        source: EngineError,
    },
    /// A sync names an output that no block of the composition drives.
    #[error("Sync at {location} names output {output}, which has no block")]
    UnknownOutput { output: u32, location: SourceLocation },
    #[error("Block '{0}' repeats without a bound")]
    UnboundedRepeat(String),
    #[error("Failed to start worker for block '{block}': {source}")]
    Spawn {
        block: String,
        source: std::io::Error,
    },
    #[error("Worker for block '{0}' panicked")]
    WorkerPanicked(String),
    #[error("No worker finished within {timeout:?}; still running: {blocks:?}")]
    Stalled {
        timeout: Duration,
        blocks: Vec<String>,
    },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Format(#[from] FormatError),
}

pub type Result<T> = std::result::Result<T, CompileError>;
