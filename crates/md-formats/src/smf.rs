//! Standard MIDI File export and import.
//!
//! Output is format 1: a conductor track carrying the time signature and
//! tempo, followed by one track per compiled channel in registration order.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use md_engine::Sequence;
use md_ir::{Event, Message, MetaEvent, TimingEnvironment};
use midly::num::{u14, u15, u24, u28, u4, u7};
use midly::{
    Format, Header, MetaMessage, MidiMessage, PitchBend, Smf, Timing, TrackEvent, TrackEventKind,
};

use crate::{FormatError, Result};

const MAX_DELTA: u64 = 0x0FFF_FFFF;

/// A parsed MIDI file: resolution and each track's events at absolute ticks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SmfSong {
    pub ppqn: u16,
    pub tracks: Vec<Vec<Event>>,
}

impl SmfSong {
    /// First tempo found in any track, in microseconds per quarter.
    pub fn tempo(&self) -> Option<u32> {
        self.metas().find_map(|m| match m {
            MetaEvent::Tempo { micros_per_quarter } => Some(micros_per_quarter),
            _ => None,
        })
    }

    /// First time signature found, as `(numerator, denominator)`.
    pub fn time_signature(&self) -> Option<(u8, u8)> {
        self.metas().find_map(|m| match m {
            MetaEvent::TimeSignature {
                numerator,
                denominator_log2,
                ..
            } => Some((numerator, 1u8.checked_shl(denominator_log2 as u32)?)),
            _ => None,
        })
    }

    /// Channel-voice events from every track, merged by tick.
    pub fn channel_events(&self) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .tracks
            .iter()
            .flatten()
            .filter(|e| !matches!(e.message, Message::Meta(_)))
            .copied()
            .collect();
        events.sort_by_key(|e| e.tick);
        events
    }

    fn metas(&self) -> impl Iterator<Item = MetaEvent> + '_ {
        self.tracks.iter().flatten().filter_map(|e| match e.message {
            Message::Meta(meta) => Some(meta),
            _ => None,
        })
    }
}

// --- Writing ---

/// Write `sequence` as a format 1 MIDI file.
pub fn write_smf(w: &mut impl Write, sequence: &Sequence) -> Result<()> {
    let timing = sequence.timing();
    let header = Header::new(Format::Parallel, Timing::Metrical(u15::new(timing.ppqn())));
    let mut smf = Smf::new(header);

    smf.tracks.push(conductor_track(timing));
    for track in sequence.tracks()? {
        smf.tracks.push(encode_track(&track.events)?);
    }
    smf.write_std(w)?;
    Ok(())
}

pub fn smf_bytes(sequence: &Sequence) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_smf(&mut buf, sequence)?;
    Ok(buf)
}

pub fn save_smf(path: impl AsRef<Path>, sequence: &Sequence) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    write_smf(&mut w, sequence)?;
    w.flush()?;
    Ok(())
}

fn conductor_track(timing: &TimingEnvironment) -> Vec<TrackEvent<'static>> {
    vec![
        at_zero(meta_message(timing.time_signature_event())),
        at_zero(meta_message(timing.tempo_event())),
        at_zero(MetaMessage::EndOfTrack),
    ]
}

fn at_zero(meta: MetaMessage<'static>) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(meta),
    }
}

fn encode_track(events: &[Event]) -> Result<Vec<TrackEvent<'static>>> {
    let mut out = Vec::with_capacity(events.len() + 1);
    let mut last = 0u64;
    for event in events {
        let delta = event.tick.saturating_sub(last);
        if delta > MAX_DELTA {
            return Err(FormatError::DeltaTooLarge(delta));
        }
        last = last.max(event.tick);
        out.push(TrackEvent {
            delta: u28::new(delta as u32),
            kind: event_kind(&event.message),
        });
    }
    out.push(at_zero(MetaMessage::EndOfTrack));
    Ok(out)
}

fn event_kind(message: &Message) -> TrackEventKind<'static> {
    let midi = |channel: u8, message: MidiMessage| TrackEventKind::Midi {
        channel: u4::new(channel),
        message,
    };
    match *message {
        Message::NoteOn { channel, key, velocity } => midi(
            channel,
            MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(velocity),
            },
        ),
        Message::NoteOff { channel, key, velocity } => midi(
            channel,
            MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(velocity),
            },
        ),
        Message::ControlChange { channel, controller, value } => midi(
            channel,
            MidiMessage::Controller {
                controller: u7::new(controller),
                value: u7::new(value),
            },
        ),
        Message::ProgramChange { channel, program } => midi(
            channel,
            MidiMessage::ProgramChange {
                program: u7::new(program),
            },
        ),
        Message::PitchBend { channel, value } => midi(
            channel,
            MidiMessage::PitchBend {
                bend: PitchBend(u14::new(value)),
            },
        ),
        Message::Meta(meta) => TrackEventKind::Meta(meta_message(meta)),
    }
}

fn meta_message(meta: MetaEvent) -> MetaMessage<'static> {
    match meta {
        MetaEvent::TimeSignature {
            numerator,
            denominator_log2,
            clocks_per_click,
            thirty_seconds_per_quarter,
        } => MetaMessage::TimeSignature(
            numerator,
            denominator_log2,
            clocks_per_click,
            thirty_seconds_per_quarter,
        ),
        MetaEvent::Tempo { micros_per_quarter } => MetaMessage::Tempo(u24::new(micros_per_quarter)),
        MetaEvent::EndOfTrack => MetaMessage::EndOfTrack,
    }
}

// --- Reading ---

/// Parse a MIDI file into absolute-tick events.
///
/// Only the message kinds mellowd writes are kept; aftertouch, sysex and
/// other meta events are skipped.
pub fn read_smf(bytes: &[u8]) -> Result<SmfSong> {
    let smf = Smf::parse(bytes)?;
    let ppqn = match smf.header.timing {
        Timing::Metrical(t) => t.as_int(),
        Timing::Timecode(..) => return Err(FormatError::UnsupportedTiming),
    };

    let mut tracks = Vec::with_capacity(smf.tracks.len());
    for track in &smf.tracks {
        let mut tick = 0u64;
        let mut events = Vec::new();
        for ev in track {
            tick += ev.delta.as_int() as u64;
            if let Some(message) = decode_kind(&ev.kind)? {
                events.push(Event::new(tick, message));
            }
        }
        tracks.push(events);
    }
    Ok(SmfSong { ppqn, tracks })
}

fn decode_kind(kind: &TrackEventKind<'_>) -> Result<Option<Message>> {
    let message = match *kind {
        TrackEventKind::Midi { channel, message } => {
            let ch = channel.as_int();
            match message {
                MidiMessage::NoteOn { key, vel } => Message::note_on(ch, key.as_int(), vel.as_int())?,
                MidiMessage::NoteOff { key, vel } => {
                    Message::note_off(ch, key.as_int(), vel.as_int())?
                }
                MidiMessage::Controller { controller, value } => {
                    Message::control_change(ch, controller.as_int(), value.as_int())?
                }
                MidiMessage::ProgramChange { program } => {
                    Message::program_change(ch, program.as_int())?
                }
                MidiMessage::PitchBend { bend } => Message::pitch_bend(ch, bend.0.as_int())?,
                MidiMessage::Aftertouch { .. } | MidiMessage::ChannelAftertouch { .. } => {
                    return Ok(None)
                }
            }
        }
        TrackEventKind::Meta(MetaMessage::Tempo(t)) => Message::Meta(MetaEvent::Tempo {
            micros_per_quarter: t.as_int(),
        }),
        TrackEventKind::Meta(MetaMessage::TimeSignature(n, d, c, b)) => {
            Message::Meta(MetaEvent::TimeSignature {
                numerator: n,
                denominator_log2: d,
                clocks_per_click: c,
                thirty_seconds_per_quarter: b,
            })
        }
        TrackEventKind::Meta(MetaMessage::EndOfTrack) => Message::Meta(MetaEvent::EndOfTrack),
        _ => return Ok(None),
    };
    Ok(Some(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use md_engine::{play_phrase, MidiChannel};
    use md_ir::{Articulated, Beat, Melody, Phrase, Pitch, Rhythm};

    fn one_phrase_sequence() -> Sequence {
        let seq = Sequence::new(TimingEnvironment::default());
        let (id, track) = seq.create_track(0).unwrap();
        let mut ch = MidiChannel::new(track, false, *seq.timing()).unwrap();
        let melody: Melody = [Pitch::C, Pitch::E, Pitch::G]
            .into_iter()
            .map(Articulated::plain)
            .collect();
        let rhythm: Rhythm = [Beat::QUARTER].into_iter().collect();
        play_phrase(&mut ch, &Phrase::new(melody, rhythm)).unwrap();
        seq.submit(id, ch.into_track()).unwrap();
        seq
    }

    #[test]
    fn header_and_conductor_track() {
        let bytes = smf_bytes(&one_phrase_sequence()).unwrap();
        assert_eq!(&bytes[..4], b"MThd");

        let song = read_smf(&bytes).unwrap();
        assert_eq!(song.ppqn, 960);
        assert_eq!(song.tracks.len(), 2);
        assert_eq!(song.tempo(), Some(500_000));
        assert_eq!(song.time_signature(), Some((4, 4)));
    }

    #[test]
    fn notes_keep_their_ticks() {
        let song = read_smf(&smf_bytes(&one_phrase_sequence()).unwrap()).unwrap();
        let ons: Vec<(u64, Message)> = song
            .channel_events()
            .into_iter()
            .filter(|e| e.message.is_note_on())
            .map(|e| (e.tick, e.message))
            .collect();
        assert_eq!(
            ons,
            vec![
                (0, Message::note_on(0, 60, 64).unwrap()),
                (960, Message::note_on(0, 64, 64).unwrap()),
                (1920, Message::note_on(0, 67, 64).unwrap()),
            ]
        );
        let last = song.tracks[1].last().unwrap();
        assert_eq!(last.message, Message::Meta(MetaEvent::EndOfTrack));
        assert_eq!(last.tick, 2880);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(read_smf(b"not a midi file"), Err(FormatError::Parse(_))));
    }
}
