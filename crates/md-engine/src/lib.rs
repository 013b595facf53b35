//! Scheduling engine for the mellowd compiler.
//!
//! Turns musical values from `md-ir` into per-channel streams of timed
//! MIDI events. Each [`MidiChannel`] owns a virtual clock and a queue of
//! deferred actions; [`SyncLink`] lets channels driven from different
//! threads meet at a common time.

mod action_queue;
mod channel;
mod controller;
mod error;
mod phrase;
mod ramp;
mod sequence;
mod sound;
mod sync;
mod track;

pub use action_queue::{Action, ActionQueue};
pub use channel::{MidiChannel, NoteState, NEUTRAL_VELOCITY, PERCUSSION_CHANNEL};
pub use controller::{Controller, Knob, Pedal, ALL_SOUNDS_OFF_CC, SUSTAIN_PEDAL_CC};
pub use error::{EngineError, Result};
pub use phrase::play_phrase;
pub use ramp::apply_gradual_dynamic;
pub use sequence::{Sequence, TrackEvents, TrackId};
pub use sound::{play_articulated, GLISS_STEPS};
pub use sync::{OutputId, SyncLink};
pub use track::{EventKey, Track};
