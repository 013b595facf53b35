//! Headless compiler driver for mellowd.
//!
//! Takes blocks of already-parsed statements, runs each block on its own
//! worker thread against its own channel, and collects the results into a
//! [`Sequence`] that can be written out as a MIDI file.

mod block;
mod channels;
mod error;
mod worker;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use md_engine::{OutputId, SyncLink};
use tracing::{error, info, warn};

use crate::worker::BlockJob;

// Re-export common types so callers don't need md-engine/md-formats directly.
pub use block::{Block, Located, SourceLocation, Statement};
pub use channels::ChannelAllocator;
pub use error::{CompileError, Result};
pub use md_engine::Sequence;
pub use md_formats::FormatError;
pub use md_ir::TimingEnvironment;

/// Compile-wide settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    pub timing: TimingEnvironment,
    /// How long to wait for the next worker to finish before giving up.
    pub join_timeout: Duration,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            timing: TimingEnvironment::default(),
            join_timeout: Duration::from_millis(3000),
        }
    }
}

/// A set of blocks compiled together. Each block's [`OutputId`] is its
/// position in the composition.
#[derive(Clone, Debug, Default)]
pub struct Composition {
    blocks: Vec<Block>,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_block(&mut self, block: Block) -> OutputId {
        self.blocks.push(block);
        OutputId(self.blocks.len() as u32 - 1)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block_mut(&mut self, output: OutputId) -> Option<&mut Block> {
        self.blocks.get_mut(output.0 as usize)
    }

    pub fn output_of(&self, name: &str) -> Option<OutputId> {
        self.blocks
            .iter()
            .position(|b| b.name() == name)
            .map(|i| OutputId(i as u32))
    }

    /// Add a shared sync point to each listed block at `location`.
    ///
    /// Every output must belong to a block of this composition; a member
    /// with nothing behind it would leave the others waiting forever.
    pub fn sync(&mut self, outputs: &[OutputId], location: SourceLocation) -> Result<()> {
        if let Some(missing) = outputs.iter().find(|o| o.0 as usize >= self.blocks.len()) {
            return Err(CompileError::UnknownOutput {
                output: missing.0,
                location,
            });
        }
        let link = Arc::new(SyncLink::new(outputs.iter().copied())?);
        for &output in link.members() {
            if let Some(block) = self.block_mut(output) {
                block.push_at(location, Statement::Sync(Arc::clone(&link)));
            }
        }
        Ok(())
    }

    /// Run every block on its own thread and gather the finished tracks.
    ///
    /// The first worker error to arrive is returned as soon as it is seen.
    /// If no worker finishes within `join_timeout` the compile fails with
    /// [`CompileError::Stalled`]; stalled workers are left running.
    pub fn compile(&self, options: &CompileOptions) -> Result<Arc<Sequence>> {
        info!(blocks = self.blocks.len(), bpm = options.timing.bpm(), "compile started");
        let sequence = Arc::new(Sequence::new(options.timing));

        // allocate up front so a shortage fails before anything runs
        let mut allocator = ChannelAllocator::new();
        let mut jobs = Vec::with_capacity(self.blocks.len());
        for (i, block) in self.blocks.iter().enumerate() {
            let channel = allocator.allocate(block.is_percussion()).ok_or_else(|| {
                CompileError::NoChannelAvailable {
                    block: block.name().to_string(),
                    percussion: block.is_percussion(),
                }
            })?;
            let (track_id, track) = sequence.create_track(channel)?;
            jobs.push(BlockJob {
                block: block.clone(),
                output: OutputId(i as u32),
                track_id,
                track,
                timing: options.timing,
                sequence: Arc::clone(&sequence),
            });
        }

        let (tx, rx) = crossbeam_channel::unbounded();
        let mut running = BTreeMap::new();
        for job in jobs {
            let name = job.block.name().to_string();
            let output = job.output;
            let tx = tx.clone();
            std::thread::Builder::new()
                .name(format!("block-{name}"))
                .spawn(move || {
                    let name = job.block.name().to_string();
                    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| job.run()))
                        .unwrap_or(Err(CompileError::WorkerPanicked(name)));
                    // receiver gone means compile already gave up
                    let _ = tx.send((output, result));
                })
                .map_err(|source| CompileError::Spawn {
                    block: name.clone(),
                    source,
                })?;
            running.insert(output, name);
        }
        drop(tx);

        while !running.is_empty() {
            match rx.recv_timeout(options.join_timeout) {
                Ok((output, result)) => {
                    running.remove(&output);
                    if let Err(e) = result {
                        error!(error = %e, "block failed");
                        return Err(e);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    let blocks: Vec<String> = running.into_values().collect();
                    warn!(?blocks, timeout = ?options.join_timeout, "workers stalled");
                    return Err(CompileError::Stalled {
                        timeout: options.join_timeout,
                        blocks,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    let blocks: Vec<String> = running.into_values().collect();
                    return Err(CompileError::WorkerPanicked(blocks.join(", ")));
                }
            }
        }

        info!(end_tick = sequence.end_tick()?, "compile finished");
        Ok(sequence)
    }

    /// Compile and encode as a Standard MIDI File.
    pub fn render_to_smf(&self, options: &CompileOptions) -> Result<Vec<u8>> {
        let sequence = self.compile(options)?;
        Ok(md_formats::smf_bytes(&sequence)?)
    }

    /// Compile and write a Standard MIDI File to `path`. Returns the
    /// compiled sequence.
    pub fn render_to_file(
        &self,
        path: impl AsRef<std::path::Path>,
        options: &CompileOptions,
    ) -> Result<Arc<Sequence>> {
        let sequence = self.compile(options)?;
        md_formats::save_smf(path, &sequence)?;
        Ok(sequence)
    }
}
