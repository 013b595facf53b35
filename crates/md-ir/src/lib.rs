//! Core value types for the mellowd compiler.
//!
//! This crate defines the immutable musical values (pitches, chords,
//! melodies, rhythms, dynamics) and the timing math shared by the
//! scheduling engine and the file writers.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod articulation;
mod beat;
mod chord;
mod directive;
mod dynamic;
mod error;
mod event;
pub mod instruments;
mod melody;
mod phrase;
mod pitch;
mod rhythm;
mod timing;

pub use articulation::{
    Articulated, Articulation, Playable, ATTACK_TIME_CC, DEFAULT_OFF_VELOCITY, RELEASE_TIME_CC,
};
pub use beat::Beat;
pub use chord::Chord;
pub use directive::{Alignment, RepeatPolicy, SchedulerDirective};
pub use dynamic::{Dynamic, GradualDynamic, RampKind};
pub use error::{IrError, Result};
pub use event::{EncodedMessage, Event, Message, MetaEvent, PITCH_BEND_CENTER, PITCH_BEND_MAX};
pub use melody::Melody;
pub use phrase::Phrase;
pub use pitch::Pitch;
pub use rhythm::Rhythm;
pub use timing::{TimingEnvironment, DEFAULT_PPQN};
