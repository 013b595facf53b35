//! Timed MIDI messages and their byte encodings.

use arrayvec::ArrayVec;

use crate::error::{IrError, Result};

/// Raw bytes of one encoded message (the longest is a time signature meta).
pub type EncodedMessage = ArrayVec<u8, 8>;

/// Meta events written to the conductor track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetaEvent {
    TimeSignature {
        numerator: u8,
        denominator_log2: u8,
        clocks_per_click: u8,
        thirty_seconds_per_quarter: u8,
    },
    /// 24-bit microseconds per quarter note
    Tempo { micros_per_quarter: u32 },
    EndOfTrack,
}

impl MetaEvent {
    pub fn subtype(&self) -> u8 {
        match self {
            MetaEvent::TimeSignature { .. } => 0x58,
            MetaEvent::Tempo { .. } => 0x51,
            MetaEvent::EndOfTrack => 0x2F,
        }
    }

    /// The meta payload, without the `FF type length` prefix.
    pub fn data(&self) -> ArrayVec<u8, 4> {
        let mut data = ArrayVec::new();
        match *self {
            MetaEvent::TimeSignature {
                numerator,
                denominator_log2,
                clocks_per_click,
                thirty_seconds_per_quarter,
            } => {
                data.push(numerator);
                data.push(denominator_log2);
                data.push(clocks_per_click);
                data.push(thirty_seconds_per_quarter);
            }
            MetaEvent::Tempo { micros_per_quarter } => {
                let [_, hi, mid, lo] = micros_per_quarter.to_be_bytes();
                data.push(hi);
                data.push(mid);
                data.push(lo);
            }
            MetaEvent::EndOfTrack => {}
        }
        data
    }
}

/// A channel-voice or meta message.
///
/// Use the checked constructors; they reject out-of-range data bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Message {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    /// 14-bit bend, 8192 = centre
    PitchBend { channel: u8, value: u16 },
    Meta(MetaEvent),
}

pub const PITCH_BEND_CENTER: u16 = 8192;
pub const PITCH_BEND_MAX: u16 = 16383;

fn check_channel(channel: u8) -> Result<u8> {
    if channel > 15 {
        return Err(IrError::InvalidData {
            what: "channel",
            value: channel as i32,
        });
    }
    Ok(channel)
}

fn check_data(what: &'static str, value: u8) -> Result<u8> {
    if value > 127 {
        return Err(IrError::InvalidData {
            what,
            value: value as i32,
        });
    }
    Ok(value)
}

impl Message {
    pub fn note_on(channel: u8, key: u8, velocity: u8) -> Result<Message> {
        Ok(Message::NoteOn {
            channel: check_channel(channel)?,
            key: check_data("key", key)?,
            velocity: check_data("velocity", velocity)?,
        })
    }

    pub fn note_off(channel: u8, key: u8, velocity: u8) -> Result<Message> {
        Ok(Message::NoteOff {
            channel: check_channel(channel)?,
            key: check_data("key", key)?,
            velocity: check_data("velocity", velocity)?,
        })
    }

    pub fn control_change(channel: u8, controller: u8, value: u8) -> Result<Message> {
        Ok(Message::ControlChange {
            channel: check_channel(channel)?,
            controller: check_data("controller", controller)?,
            value: check_data("controller value", value)?,
        })
    }

    pub fn program_change(channel: u8, program: u8) -> Result<Message> {
        Ok(Message::ProgramChange {
            channel: check_channel(channel)?,
            program: check_data("program", program)?,
        })
    }

    pub fn pitch_bend(channel: u8, value: u16) -> Result<Message> {
        if value > PITCH_BEND_MAX {
            return Err(IrError::InvalidData {
                what: "pitch bend",
                value: value as i32,
            });
        }
        Ok(Message::PitchBend {
            channel: check_channel(channel)?,
            value,
        })
    }

    pub fn is_note_on(&self) -> bool {
        matches!(self, Message::NoteOn { .. })
    }

    pub fn is_note_off(&self) -> bool {
        matches!(self, Message::NoteOff { .. })
    }

    /// Standard MIDI bytes: status + data for channel messages,
    /// `FF type length data` for meta events.
    pub fn encode(&self) -> EncodedMessage {
        let mut out = EncodedMessage::new();
        match *self {
            Message::NoteOn { channel, key, velocity } => {
                out.push(0x90 | channel);
                out.push(key);
                out.push(velocity);
            }
            Message::NoteOff { channel, key, velocity } => {
                out.push(0x80 | channel);
                out.push(key);
                out.push(velocity);
            }
            Message::ControlChange { channel, controller, value } => {
                out.push(0xB0 | channel);
                out.push(controller);
                out.push(value);
            }
            Message::ProgramChange { channel, program } => {
                out.push(0xC0 | channel);
                out.push(program);
            }
            Message::PitchBend { channel, value } => {
                out.push(0xE0 | channel);
                out.push((value & 0x7F) as u8);
                out.push((value >> 7) as u8);
            }
            Message::Meta(meta) => {
                let data = meta.data();
                out.push(0xFF);
                out.push(meta.subtype());
                out.push(data.len() as u8);
                for b in data {
                    out.push(b);
                }
            }
        }
        out
    }
}

/// A message at an absolute tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Event {
    pub tick: u64,
    pub message: Message,
}

impl Event {
    pub fn new(tick: u64, message: Message) -> Self {
        Self { tick, message }
    }
}
