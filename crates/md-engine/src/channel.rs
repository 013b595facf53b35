//! Per-track channel state and its virtual clock.

use std::collections::BTreeMap;

use md_ir::{
    Beat, Dynamic, IrError, Message, Pitch, SchedulerDirective, TimingEnvironment,
    PITCH_BEND_CENTER,
};
use tracing::{debug, trace};

use crate::action_queue::{Action, ActionQueue};
use crate::controller::{Controller, ALL_SOUNDS_OFF_CC};
use crate::error::{EngineError, Result};
use crate::track::{EventKey, Track};

/// General MIDI reserves channel 10 (index 9) for percussion.
pub const PERCUSSION_CHANNEL: u8 = 9;

/// Velocity used when re-asserting held notes onto a fresh track.
pub const NEUTRAL_VELOCITY: u8 = 64;

const BANK_SELECT_MSB_CC: u8 = 0;
const BANK_SELECT_LSB_CC: u8 = 32;
/// Bank-select MSB that addresses the user sound banks.
const USER_BANK_MSB: u8 = 121;

/// What the channel last did with a key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoteState {
    #[default]
    Off,
    On,
    OnSlurred,
    /// Released while the channel was slurring; a re-strike may retract
    /// the release.
    OffSlurred,
}

impl NoteState {
    pub fn is_on(self) -> bool {
        matches!(self, NoteState::On | NoteState::OnSlurred)
    }
}

/// State machine for one output track.
///
/// Owns a virtual clock (`state_time`, in ticks) and a queue of deferred
/// actions. Every operation writes at the current clock; nothing moves
/// the clock without first running the actions that fall due.
#[derive(Debug)]
pub struct MidiChannel {
    track: Track,
    channel: u8,
    percussion: bool,
    timing: TimingEnvironment,

    state_time: u64,
    pending: ActionQueue,

    note_states: [NoteState; 128],
    /// Release event written for each key, kept so a slur can pull it back.
    last_off: [Option<EventKey>; 128],
    controllers: BTreeMap<u8, Controller>,

    dynamic: Dynamic,
    octave_shift: i32,
    transpose: i32,
    instrument: Option<u8>,
    sound_bank: Option<u8>,
    muted: bool,
    pitch_bend: u16,
    slurred: bool,
}

impl MidiChannel {
    /// Wrap `track`, writing on the track's channel number.
    pub fn new(track: Track, percussion: bool, timing: TimingEnvironment) -> Result<Self> {
        let channel = track.channel();
        if channel > 15 {
            return Err(IrError::InvalidData {
                what: "channel",
                value: channel as i32,
            }
            .into());
        }
        Ok(Self {
            track,
            channel,
            percussion,
            timing,
            state_time: 0,
            pending: ActionQueue::new(),
            note_states: [NoteState::Off; 128],
            last_off: [None; 128],
            controllers: BTreeMap::new(),
            dynamic: Dynamic::default(),
            octave_shift: 0,
            transpose: 0,
            instrument: None,
            sound_bank: None,
            muted: false,
            pitch_bend: PITCH_BEND_CENTER,
            slurred: false,
        })
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn is_percussion(&self) -> bool {
        self.percussion
    }

    pub fn timing(&self) -> &TimingEnvironment {
        &self.timing
    }

    /// Current position of the virtual clock, in ticks.
    pub fn state_time(&self) -> u64 {
        self.state_time
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn into_track(self) -> Track {
        self.track
    }

    /// Actions scheduled but not yet run.
    pub fn pending(&self) -> &ActionQueue {
        &self.pending
    }

    pub fn note_state(&self, key: u8) -> NoteState {
        self.note_states
            .get(key as usize)
            .copied()
            .unwrap_or_default()
    }

    // --- clock ---

    /// Advance the clock by `ticks`, running every action that falls due
    /// on the way in tick order. Returns the new clock.
    pub fn step_into_future(&mut self, ticks: u64) -> Result<u64> {
        let target = self.state_time + ticks;
        while let Some((tick, actions)) = self.pending.pop_due(target) {
            self.state_time = self.state_time.max(tick);
            for action in actions {
                self.run(action)?;
            }
        }
        self.state_time = target;
        Ok(target)
    }

    pub fn step_into_future_beat(&mut self, beat: Beat) -> Result<u64> {
        self.step_into_future(self.timing.ticks_in_beat(beat))
    }

    /// Move the clock forward to `tick`. Earlier ticks are ignored.
    pub fn leap_to(&mut self, tick: u64) -> Result<u64> {
        let delta = tick.saturating_sub(self.state_time);
        self.step_into_future(delta)
    }

    /// Schedule `action` for `now + delta`.
    ///
    /// A delta of zero or less is queued at the current tick rather than
    /// run inline. It runs on the next clock advance, including a
    /// zero-length [`step_into_future`](Self::step_into_future), after any
    /// action already queued for that tick.
    pub fn do_later(&mut self, delta: i64, action: Action) {
        let tick = if delta <= 0 {
            self.state_time
        } else {
            self.state_time + delta as u64
        };
        self.pending.push(tick, action);
    }

    pub fn do_later_beat(&mut self, beat: Beat, action: Action) {
        let ticks = self.timing.ticks_in_beat(beat);
        self.do_later(ticks as i64, action);
    }

    /// Run every pending action, moving the clock to the last one.
    pub fn flush(&mut self) -> Result<u64> {
        while let Some(last) = self.pending.last_due() {
            self.leap_to(last)?;
        }
        Ok(self.state_time)
    }

    /// Wait until the next tick the directive allows.
    pub fn apply_directive(&mut self, directive: &SchedulerDirective) -> Result<u64> {
        let tick = directive.aligned_tick(self.state_time, &self.timing);
        self.leap_to(tick)
    }

    fn run(&mut self, action: Action) -> Result<()> {
        trace!(channel = self.channel, tick = self.state_time, ?action, "run action");
        match action {
            Action::NoteOff { key, velocity } => self.note_off(key, velocity),
            Action::Play {
                key,
                velocity_mod,
                duration,
                off_velocity,
            } => self.play_key(key, velocity_mod, duration, off_velocity),
            Action::SetDynamic(dynamic) => {
                self.dynamic = dynamic;
                Ok(())
            }
            Action::TwistKnob { controller, value } => self.set_controller(controller, value),
            Action::PressPedal { controller } => self.press_pedal(controller),
            Action::ReleasePedal { controller } => self.release_pedal(controller),
            Action::PitchBend(value) => self.set_pitch_bend(value),
            Action::ResetPitchBend => self.reset_pitch_bend(),
        }
    }

    // --- notes ---

    /// The key that sounds for `pitch` after octave shift and transpose.
    /// Percussion keys name instruments and are never moved. `None` for
    /// a rest.
    pub fn sounding_key(&self, pitch: Pitch) -> Option<u8> {
        if self.percussion {
            return pitch.midi_num();
        }
        pitch
            .shift_octave(self.octave_shift)
            .transpose(self.transpose)
            .midi_num()
    }

    /// Strike `pitch` now and release it `duration` ticks later.
    ///
    /// While slurring, re-striking a key whose release was written within
    /// the last tick pulls that release back out and re-attacks softly,
    /// so the two notes join.
    pub fn play_note(
        &mut self,
        pitch: Pitch,
        velocity_mod: i32,
        duration: u64,
        off_velocity: u8,
    ) -> Result<()> {
        match self.sounding_key(pitch) {
            Some(key) => self.play_key(key, velocity_mod, duration, off_velocity),
            None => Ok(()),
        }
    }

    fn play_key(&mut self, key: u8, velocity_mod: i32, duration: u64, off_velocity: u8) -> Result<()> {
        let velocity = if self.retract_release(key) {
            let soften = -(self.dynamic.velocity() as i32 + velocity_mod) / 3;
            self.dynamic.louder(soften).max(1)
        } else {
            self.dynamic.louder(velocity_mod)
        };
        self.note_on(key, velocity)?;
        self.do_later(
            duration as i64,
            Action::NoteOff {
                key,
                velocity: off_velocity,
            },
        );
        Ok(())
    }

    /// Remove the release of a slurred key if it landed within one tick.
    fn retract_release(&mut self, key: u8) -> bool {
        let idx = key as usize;
        if !self.slurred || self.note_states[idx] != NoteState::OffSlurred {
            return false;
        }
        let Some(off) = self.last_off[idx] else {
            return false;
        };
        let recent = self
            .track
            .get(off)
            .is_some_and(|e| e.tick + 1 >= self.state_time);
        if !recent {
            return false;
        }
        self.track.remove(off);
        self.last_off[idx] = None;
        trace!(channel = self.channel, key, tick = self.state_time, "slur retracted release");
        true
    }

    fn note_on(&mut self, key: u8, velocity: u8) -> Result<()> {
        let msg = Message::note_on(self.channel, key, velocity).map_err(|e| {
            EngineError::invalid(
                "note on",
                format!("channel {} key {key} velocity {velocity}", self.channel),
                e,
            )
        })?;
        self.emit(msg);
        self.note_states[key as usize] = if self.slurred {
            NoteState::OnSlurred
        } else {
            NoteState::On
        };
        Ok(())
    }

    fn note_off(&mut self, key: u8, velocity: u8) -> Result<()> {
        let msg = Message::note_off(self.channel, key, velocity).map_err(|e| {
            EngineError::invalid(
                "note off",
                format!("channel {} key {key} velocity {velocity}", self.channel),
                e,
            )
        })?;
        self.last_off[key as usize] = self.emit(msg);
        self.note_states[key as usize] = if self.slurred {
            NoteState::OffSlurred
        } else {
            NoteState::Off
        };
        Ok(())
    }

    /// Write `msg` at the current tick unless muted.
    fn emit(&mut self, msg: Message) -> Option<EventKey> {
        if self.muted {
            return None;
        }
        Some(self.push(msg))
    }

    fn push(&mut self, msg: Message) -> EventKey {
        trace!(channel = self.channel, tick = self.state_time, ?msg, "emit");
        self.track.push(md_ir::Event::new(self.state_time, msg))
    }

    fn control_change(&mut self, controller: u8, value: u8) -> Result<Message> {
        Message::control_change(self.channel, controller, value).map_err(|e| {
            EngineError::invalid(
                "control change",
                format!("channel {} cc {controller} value {value}", self.channel),
                e,
            )
        })
    }

    // --- performance state ---

    pub fn dynamic(&self) -> Dynamic {
        self.dynamic
    }

    pub fn set_dynamic(&mut self, dynamic: Dynamic) {
        self.dynamic = dynamic;
    }

    pub fn octave_shift(&self) -> i32 {
        self.octave_shift
    }

    pub fn set_octave_shift(&mut self, octaves: i32) {
        self.octave_shift = octaves;
    }

    pub fn transpose(&self) -> i32 {
        self.transpose
    }

    pub fn set_transpose(&mut self, semitones: i32) {
        self.transpose = semitones;
    }

    pub fn is_slurred(&self) -> bool {
        self.slurred
    }

    pub fn set_slurred(&mut self, slurred: bool) {
        self.slurred = slurred;
    }

    pub fn instrument(&self) -> Option<u8> {
        self.instrument
    }

    /// Program change, preceded by bank select if a sound bank is set.
    pub fn set_instrument(&mut self, program: u8) -> Result<()> {
        let msg = Message::program_change(self.channel, program).map_err(|e| {
            EngineError::invalid(
                "program change",
                format!("channel {} program {program}", self.channel),
                e,
            )
        })?;
        if let Some(bank) = self.sound_bank {
            self.select_bank(bank)?;
        }
        self.emit(msg);
        self.instrument = Some(program);
        debug!(channel = self.channel, program, bank = ?self.sound_bank, "set instrument");
        Ok(())
    }

    pub fn sound_bank(&self) -> Option<u8> {
        self.sound_bank
    }

    /// Select a user bank and re-send the current program against it.
    pub fn set_sound_bank(&mut self, bank: u8) -> Result<()> {
        // validate before remembering
        self.control_change(BANK_SELECT_LSB_CC, bank)?;
        self.sound_bank = Some(bank);
        self.set_instrument(self.instrument.unwrap_or(0))
    }

    fn select_bank(&mut self, bank: u8) -> Result<()> {
        let msb = self.control_change(BANK_SELECT_MSB_CC, USER_BANK_MSB)?;
        let lsb = self.control_change(BANK_SELECT_LSB_CC, bank)?;
        self.emit(msb);
        self.emit(lsb);
        Ok(())
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Muting cuts sounding notes with an all-sounds-off that is written
    /// even though the channel is about to drop everything else.
    pub fn set_muted(&mut self, muted: bool) -> Result<()> {
        if muted && !self.muted {
            let msg = self.control_change(ALL_SOUNDS_OFF_CC, 0)?;
            self.push(msg);
        }
        self.muted = muted;
        Ok(())
    }

    pub fn pitch_bend(&self) -> u16 {
        self.pitch_bend
    }

    pub fn set_pitch_bend(&mut self, value: u16) -> Result<()> {
        let msg = Message::pitch_bend(self.channel, value).map_err(|e| {
            EngineError::invalid(
                "pitch bend",
                format!("channel {} value {value}", self.channel),
                e,
            )
        })?;
        self.emit(msg);
        self.pitch_bend = value;
        Ok(())
    }

    pub fn reset_pitch_bend(&mut self) -> Result<()> {
        self.set_pitch_bend(PITCH_BEND_CENTER)
    }

    // --- controllers ---

    /// The controller for `number`, attached on first use.
    pub fn controller(&mut self, number: u8) -> &Controller {
        self.controllers
            .entry(number)
            .or_insert_with(|| Controller::for_number(number))
    }

    /// Current value of a controller, or its default if never touched.
    pub fn controller_value(&self, number: u8) -> u8 {
        self.controllers
            .get(&number)
            .copied()
            .unwrap_or_else(|| Controller::for_number(number))
            .value()
    }

    /// Send a raw value to any controller and remember it.
    pub fn set_controller(&mut self, number: u8, value: u8) -> Result<()> {
        let msg = self.control_change(number, value)?;
        self.emit(msg);
        self.controllers
            .entry(number)
            .or_insert_with(|| Controller::for_number(number))
            .set(value);
        Ok(())
    }

    pub fn twist_knob(&mut self, number: u8, value: u8) -> Result<()> {
        self.set_controller(number, value)
    }

    pub fn press_pedal(&mut self, number: u8) -> Result<()> {
        self.set_controller(number, 127)
    }

    pub fn release_pedal(&mut self, number: u8) -> Result<()> {
        self.set_controller(number, 0)
    }

    // --- track replacement ---

    /// Swap in a fresh track and carry the channel's state over to it.
    ///
    /// Pending actions are rebased so the new track starts at tick 0.
    /// Held notes are re-struck at [`NEUTRAL_VELOCITY`] and the instrument,
    /// bank, bend and mute are written again. Controllers are not replayed.
    pub fn replace_track(&mut self, track: Track) -> Result<Track> {
        if track.channel() != self.channel {
            return Err(IrError::InvalidData {
                what: "replacement track channel",
                value: track.channel() as i32,
            }
            .into());
        }
        let elapsed = self.state_time;
        self.pending.rebase(elapsed);
        self.state_time = 0;
        self.last_off = [None; 128];
        let old = std::mem::replace(&mut self.track, track);
        debug!(channel = self.channel, elapsed, "replaced track");

        // TODO: replay knob and pedal state once it can be done without an
        // audible jump on the first note.
        if let Some(program) = self.instrument {
            self.set_instrument(program)?;
        }
        if self.pitch_bend != PITCH_BEND_CENTER {
            self.set_pitch_bend(self.pitch_bend)?;
        }
        if self.muted {
            let msg = self.control_change(ALL_SOUNDS_OFF_CC, 0)?;
            self.push(msg);
        }
        for key in 0..128u8 {
            if self.note_states[key as usize].is_on() {
                let msg = Message::note_on(self.channel, key, NEUTRAL_VELOCITY).map_err(|e| {
                    EngineError::invalid("note on", format!("re-assert key {key}"), e)
                })?;
                self.emit(msg);
            }
        }
        Ok(old)
    }
}
