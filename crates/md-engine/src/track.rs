//! Per-channel event storage with retractable handles.

use md_ir::Event;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle to an event inside a [`Track`]. Stays valid until the event
    /// is removed, even as other events come and go.
    pub struct EventKey;
}

#[derive(Clone, Debug)]
struct Entry {
    /// Insertion order, breaks ties between events on the same tick.
    seq: u64,
    event: Event,
}

/// Events written for one MIDI channel.
///
/// Events are kept in an arena so a pending note-off can be pulled back
/// out when a slurred note is re-struck.
#[derive(Clone, Debug)]
pub struct Track {
    channel: u8,
    events: SlotMap<EventKey, Entry>,
    next_seq: u64,
}

impl Track {
    pub fn new(channel: u8) -> Self {
        Self {
            channel,
            events: SlotMap::with_key(),
            next_seq: 0,
        }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn push(&mut self, event: Event) -> EventKey {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.insert(Entry { seq, event })
    }

    pub fn remove(&mut self, key: EventKey) -> Option<Event> {
        self.events.remove(key).map(|e| e.event)
    }

    pub fn get(&self, key: EventKey) -> Option<&Event> {
        self.events.get(key).map(|e| &e.event)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Tick of the last event, or 0 for an empty track.
    pub fn end_tick(&self) -> u64 {
        self.events.values().map(|e| e.event.tick).max().unwrap_or(0)
    }

    /// Events sorted by tick, then by the order they were written.
    pub fn events(&self) -> Vec<Event> {
        let mut entries: Vec<&Entry> = self.events.values().collect();
        entries.sort_by_key(|e| (e.event.tick, e.seq));
        entries.into_iter().map(|e| e.event).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use md_ir::Message;

    fn on(tick: u64, key: u8) -> Event {
        Event::new(tick, Message::note_on(0, key, 64).unwrap())
    }

    #[test]
    fn events_sorted_with_stable_ties() {
        let mut track = Track::new(0);
        track.push(on(100, 60));
        track.push(on(0, 62));
        track.push(on(100, 64));

        let keys: Vec<u64> = track.events().iter().map(|e| e.tick).collect();
        assert_eq!(keys, vec![0, 100, 100]);
        let events = track.events();
        assert_eq!(events[1].message, Message::note_on(0, 60, 64).unwrap());
        assert_eq!(events[2].message, Message::note_on(0, 64, 64).unwrap());
    }

    #[test]
    fn removed_key_goes_stale() {
        let mut track = Track::new(3);
        let key = track.push(on(10, 60));
        let other = track.push(on(20, 61));

        assert_eq!(track.remove(key).map(|e| e.tick), Some(10));
        assert!(track.get(key).is_none());
        assert!(track.remove(key).is_none());
        assert_eq!(track.get(other).map(|e| e.tick), Some(20));
        assert_eq!(track.len(), 1);
        assert_eq!(track.end_tick(), 20);
    }
}
