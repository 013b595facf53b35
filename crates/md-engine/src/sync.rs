//! Rendezvous between channels driven from different threads.

use std::sync::{Condvar, Mutex};

use tracing::debug;

use crate::channel::MidiChannel;
use crate::error::{EngineError, Result};

/// Identifies one output taking part in a sync.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputId(pub u32);

#[derive(Debug)]
struct Arrivals {
    arrived: Vec<bool>,
    times: Vec<u64>,
    /// Bumped each time the last member arrives; waiters watch for it.
    generation: u64,
    join_time: u64,
}

/// Barrier over a fixed set of outputs.
///
/// Every member blocks in [`sync`](Self::sync) until all have arrived,
/// then all leave with the latest clock among them. The barrier resets
/// itself afterwards and can be reused. There is no timeout: a member
/// that never arrives stalls the rest.
#[derive(Debug)]
pub struct SyncLink {
    members: Vec<OutputId>,
    state: Mutex<Arrivals>,
    released: Condvar,
}

impl SyncLink {
    pub fn new(members: impl IntoIterator<Item = OutputId>) -> Result<Self> {
        let mut members: Vec<OutputId> = members.into_iter().collect();
        members.sort();
        members.dedup();
        if members.len() < 2 {
            return Err(EngineError::SyncMembers(members.len()));
        }
        let n = members.len();
        Ok(Self {
            members,
            state: Mutex::new(Arrivals {
                arrived: vec![false; n],
                times: vec![0; n],
                generation: 0,
                join_time: 0,
            }),
            released: Condvar::new(),
        })
    }

    pub fn members(&self) -> &[OutputId] {
        &self.members
    }

    pub fn is_member(&self, output: OutputId) -> bool {
        self.members.binary_search(&output).is_ok()
    }

    /// Arrive at the barrier with clock `state_time` and wait for the rest.
    ///
    /// Returns the join time, the maximum clock over all members, or
    /// `None` without blocking if `output` is not a member.
    pub fn sync(&self, output: OutputId, state_time: u64) -> Result<Option<u64>> {
        let Ok(idx) = self.members.binary_search(&output) else {
            return Ok(None);
        };
        let mut state = self.state.lock().map_err(|_| EngineError::Poisoned)?;
        state.arrived[idx] = true;
        state.times[idx] = state_time;

        if state.arrived.iter().all(|&a| a) {
            let join_time = state.times.iter().copied().max().unwrap_or(state_time);
            state.join_time = join_time;
            state.arrived.fill(false);
            state.generation += 1;
            debug!(?output, join_time, members = self.members.len(), "sync released");
            self.released.notify_all();
            return Ok(Some(join_time));
        }

        let generation = state.generation;
        while state.generation == generation {
            state = self.released.wait(state).map_err(|_| EngineError::Poisoned)?;
        }
        Ok(Some(state.join_time))
    }

    /// Sync `channel` as `output` and leap its clock to the join time,
    /// running whatever falls due along the way.
    pub fn sync_channel(&self, output: OutputId, channel: &mut MidiChannel) -> Result<u64> {
        match self.sync(output, channel.state_time())? {
            Some(join_time) => channel.leap_to(join_time),
            None => Ok(channel.state_time()),
        }
    }
}
