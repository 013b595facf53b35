//! Running one block's statements against its channel.

use std::sync::Arc;

use md_engine::{
    apply_gradual_dynamic, play_phrase, MidiChannel, OutputId, Sequence, Track, TrackId,
};
use md_ir::TimingEnvironment;
use tracing::debug;

use crate::block::{Block, Statement};
use crate::error::{CompileError, Result};

/// Everything a worker thread needs to compile one block.
pub(crate) struct BlockJob {
    pub block: Block,
    pub output: OutputId,
    pub track_id: TrackId,
    pub track: Track,
    pub timing: TimingEnvironment,
    pub sequence: Arc<Sequence>,
}

impl BlockJob {
    pub fn run(self) -> Result<()> {
        let BlockJob {
            block,
            output,
            track_id,
            track,
            timing,
            sequence,
        } = self;
        let mut channel = MidiChannel::new(track, block.is_percussion(), timing)?;
        debug!(block = block.name(), channel = channel.channel(), "worker started");

        let passes = match block.directive() {
            Some(d) => d
                .repeat
                .count
                .ok_or_else(|| CompileError::UnboundedRepeat(block.name().to_string()))?,
            None => 1,
        };
        for _ in 0..passes {
            if let Some(directive) = block.directive() {
                channel.apply_directive(directive)?;
            }
            for located in block.statements() {
                execute(&mut channel, output, &located.statement).map_err(|source| {
                    CompileError::Block {
                        block: block.name().to_string(),
                        location: located.location,
                        source,
                    }
                })?;
            }
        }

        let end = channel.flush()?;
        debug!(block = block.name(), end, events = channel.track().len(), "worker finished");
        sequence.submit(track_id, channel.into_track())?;
        Ok(())
    }
}

fn execute(
    channel: &mut MidiChannel,
    output: OutputId,
    statement: &Statement,
) -> md_engine::Result<()> {
    match statement {
        Statement::PlayPhrase(phrase) => play_phrase(channel, phrase).map(drop),
        Statement::Rest(beat) => channel.step_into_future_beat(*beat).map(drop),
        Statement::SetDynamic(dynamic) => {
            channel.set_dynamic(*dynamic);
            Ok(())
        }
        Statement::GradualDynamic(ramp) => apply_gradual_dynamic(channel, ramp),
        Statement::SetInstrument(program) => channel.set_instrument(*program),
        Statement::SetSoundBank(bank) => channel.set_sound_bank(*bank),
        Statement::SetOctave(octaves) => {
            channel.set_octave_shift(*octaves);
            Ok(())
        }
        Statement::SetTranspose(semitones) => {
            channel.set_transpose(*semitones);
            Ok(())
        }
        Statement::SetMuted(muted) => channel.set_muted(*muted),
        Statement::TwistKnob { controller, value } => channel.twist_knob(*controller, *value),
        Statement::PressPedal(controller) => channel.press_pedal(*controller),
        Statement::ReleasePedal(controller) => channel.release_pedal(*controller),
        Statement::SetPitchBend(value) => channel.set_pitch_bend(*value),
        Statement::Sync(link) => link.sync_channel(output, channel).map(drop),
        Statement::Directive(directive) => channel.apply_directive(directive).map(drop),
    }
}
