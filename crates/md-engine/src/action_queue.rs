//! Deferred actions keyed by the tick they fall due.

use std::collections::BTreeMap;

use md_ir::Dynamic;

/// Work a channel has promised to do at a later tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Release a key. `key` is the sounding key, already octave-shifted
    /// and transposed.
    NoteOff { key: u8, velocity: u8 },
    /// Start a sounding key and schedule its release `duration` ticks later.
    Play {
        key: u8,
        velocity_mod: i32,
        duration: u64,
        off_velocity: u8,
    },
    SetDynamic(Dynamic),
    TwistKnob { controller: u8, value: u8 },
    PressPedal { controller: u8 },
    ReleasePedal { controller: u8 },
    PitchBend(u16),
    ResetPitchBend,
}

/// Pending actions ordered by due tick.
///
/// Actions due on the same tick run in the order they were pushed.
#[derive(Clone, Debug, Default)]
pub struct ActionQueue {
    pending: BTreeMap<u64, Vec<Action>>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tick: u64, action: Action) {
        self.pending.entry(tick).or_default().push(action);
    }

    /// Tick of the earliest pending action.
    pub fn next_due(&self) -> Option<u64> {
        self.pending.keys().next().copied()
    }

    /// Tick of the latest pending action.
    pub fn last_due(&self) -> Option<u64> {
        self.pending.keys().next_back().copied()
    }

    /// Remove and return the earliest bucket if it falls at or before `tick`.
    pub fn pop_due(&mut self, tick: u64) -> Option<(u64, Vec<Action>)> {
        let first = self.next_due()?;
        if first > tick {
            return None;
        }
        self.pending.remove_entry(&first)
    }

    /// Shift every pending action `elapsed` ticks earlier.
    pub fn rebase(&mut self, elapsed: u64) {
        if elapsed == 0 {
            return;
        }
        let pending = std::mem::take(&mut self.pending);
        for (tick, mut actions) in pending {
            self.pending
                .entry(tick.saturating_sub(elapsed))
                .or_default()
                .append(&mut actions);
        }
    }

    /// All pending actions in due order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Action)> + '_ {
        self.pending
            .iter()
            .flat_map(|(tick, actions)| actions.iter().map(move |a| (*tick, a)))
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Returns the number of pending actions.
    pub fn len(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_tick_keeps_push_order() {
        let mut queue = ActionQueue::new();
        queue.push(10, Action::PitchBend(1));
        queue.push(5, Action::ResetPitchBend);
        queue.push(10, Action::PitchBend(2));

        let (tick, first) = queue.pop_due(100).unwrap();
        assert_eq!(tick, 5);
        assert_eq!(first, vec![Action::ResetPitchBend]);

        let (tick, second) = queue.pop_due(100).unwrap();
        assert_eq!(tick, 10);
        assert_eq!(second, vec![Action::PitchBend(1), Action::PitchBend(2)]);
        assert!(queue.is_empty());
    }

    #[test]
    fn pop_due_respects_limit() {
        let mut queue = ActionQueue::new();
        queue.push(480, Action::ResetPitchBend);
        assert!(queue.pop_due(479).is_none());
        assert!(queue.pop_due(480).is_some());
    }

    #[test]
    fn rebase_merges_buckets() {
        let mut queue = ActionQueue::new();
        queue.push(100, Action::PitchBend(1));
        queue.push(150, Action::PitchBend(2));
        queue.rebase(100);

        let ticks: Vec<u64> = queue.iter().map(|(t, _)| t).collect();
        assert_eq!(ticks, vec![0, 50]);
        assert_eq!(queue.len(), 2);
    }
}
