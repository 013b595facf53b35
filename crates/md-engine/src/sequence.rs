//! The multi-track container workers hand their finished tracks to.

use std::sync::Mutex;

use md_ir::{Event, TimingEnvironment};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::track::Track;

/// Registration handle for one track slot in a [`Sequence`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub u32);

#[derive(Debug)]
struct Slot {
    channel: u8,
    track: Option<Track>,
}

/// A finished track's events in write order.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackEvents {
    pub id: TrackId,
    pub channel: u8,
    pub events: Vec<Event>,
}

/// Tracks from every channel of one compilation, plus the global timing.
///
/// Registration and hand-off take a short lock; a worker builds its track
/// privately and only touches the container at those two points.
#[derive(Debug)]
pub struct Sequence {
    timing: TimingEnvironment,
    slots: Mutex<Vec<Slot>>,
}

impl Sequence {
    pub fn new(timing: TimingEnvironment) -> Self {
        Self {
            timing,
            slots: Mutex::new(Vec::new()),
        }
    }

    pub fn timing(&self) -> &TimingEnvironment {
        &self.timing
    }

    /// Reserve a slot and return an empty track to fill for it.
    pub fn create_track(&self, channel: u8) -> Result<(TrackId, Track)> {
        let mut slots = self.slots.lock().map_err(|_| EngineError::Poisoned)?;
        let id = TrackId(slots.len() as u32);
        slots.push(Slot { channel, track: None });
        debug!(?id, channel, "track registered");
        Ok((id, Track::new(channel)))
    }

    /// Hand a finished track back for the slot `id`.
    pub fn submit(&self, id: TrackId, track: Track) -> Result<()> {
        let mut slots = self.slots.lock().map_err(|_| EngineError::Poisoned)?;
        let slot = slots
            .get_mut(id.0 as usize)
            .ok_or(EngineError::UnknownTrack(id))?;
        slot.track = Some(track);
        Ok(())
    }

    /// Submitted tracks in registration order. Empty slots are skipped.
    pub fn tracks(&self) -> Result<Vec<TrackEvents>> {
        let slots = self.slots.lock().map_err(|_| EngineError::Poisoned)?;
        Ok(slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                slot.track.as_ref().map(|track| TrackEvents {
                    id: TrackId(i as u32),
                    channel: slot.channel,
                    events: track.events(),
                })
            })
            .collect())
    }

    /// Latest tick written to any track.
    pub fn end_tick(&self) -> Result<u64> {
        let slots = self.slots.lock().map_err(|_| EngineError::Poisoned)?;
        Ok(slots
            .iter()
            .filter_map(|s| s.track.as_ref())
            .map(Track::end_tick)
            .max()
            .unwrap_or(0))
    }
}
