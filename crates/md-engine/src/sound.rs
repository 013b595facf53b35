//! Playing an articulated pitch or chord on a channel.
//!
//! Each articulation shapes a note in the same order: twist any sound
//! controllers it needs, strike with the adjusted velocity, schedule the
//! release at the adjusted length, then put the controllers back when the
//! note ends.

use md_ir::{
    Articulated, Articulation, Beat, Chord, Pitch, Playable, PITCH_BEND_CENTER, PITCH_BEND_MAX,
};

use crate::action_queue::Action;
use crate::channel::MidiChannel;
use crate::error::Result;

/// Pitch-bend steps in a single-note glissando.
pub const GLISS_STEPS: u64 = 16;

/// Strike `sound` at the channel's current tick for the written length
/// `beat`. The channel clock does not move.
pub fn play_articulated(channel: &mut MidiChannel, sound: &Articulated, beat: Beat) -> Result<()> {
    if sound.playable.is_rest() {
        return Ok(());
    }
    let articulation = sound.articulation;
    let written = channel.timing().ticks_in_beat(beat);
    let duration = (written as f64 * articulation.duration_scale()).round() as u64;

    let mut restores = Vec::with_capacity(articulation.knob_twists().len());
    for &(controller, value) in articulation.knob_twists() {
        restores.push((controller, channel.controller_value(controller)));
        channel.twist_knob(controller, value)?;
    }

    let velocity_mod = articulation.velocity_delta();
    let off_velocity = articulation.off_velocity();
    strike(channel, sound, articulation, velocity_mod, duration, off_velocity)?;

    // queued after the releases so the knobs still shape them
    for (controller, value) in restores {
        channel.do_later(duration as i64, Action::TwistKnob { controller, value });
    }
    Ok(())
}

fn strike(
    channel: &mut MidiChannel,
    sound: &Articulated,
    articulation: Articulation,
    velocity_mod: i32,
    duration: u64,
    off_velocity: u8,
) -> Result<()> {
    match (&sound.playable, articulation) {
        (Playable::Pitch(pitch), Articulation::Gliscando) => {
            glissando(channel, *pitch, duration, off_velocity)
        }
        (Playable::Chord(chord), Articulation::Gliscando) => {
            roll(channel, chord, duration, off_velocity)
        }
        (Playable::Pitch(pitch), _) => {
            channel.play_note(*pitch, velocity_mod, duration, off_velocity)
        }
        (Playable::Chord(chord), _) => {
            for &pitch in chord.pitches() {
                channel.play_note(pitch, velocity_mod, duration, off_velocity)?;
            }
            Ok(())
        }
    }
}

/// Bend upward in equal steps across the note, then recentre.
fn glissando(channel: &mut MidiChannel, pitch: Pitch, duration: u64, off_velocity: u8) -> Result<()> {
    channel.play_note(pitch, 0, duration, off_velocity)?;
    let range = (PITCH_BEND_MAX - PITCH_BEND_CENTER) as u64;
    for step in 0..GLISS_STEPS {
        let tick = duration * step / GLISS_STEPS;
        let value = PITCH_BEND_CENTER + (range * (step + 1) / GLISS_STEPS) as u16;
        channel.do_later(tick as i64, Action::PitchBend(value));
    }
    channel.do_later(duration as i64, Action::ResetPitchBend);
    Ok(())
}

/// Strum the chord: tone `i` enters `i * duration / (4n)` ticks late and
/// holds until the written end.
fn roll(channel: &mut MidiChannel, chord: &Chord, duration: u64, off_velocity: u8) -> Result<()> {
    let n = chord.len() as u64;
    for (i, &pitch) in chord.pitches().iter().enumerate() {
        let delay = duration * i as u64 / (n * 4);
        let hold = duration - delay;
        if delay == 0 {
            channel.play_note(pitch, 0, hold, off_velocity)?;
        } else if let Some(key) = channel.sounding_key(pitch) {
            channel.do_later(
                delay as i64,
                Action::Play {
                    key,
                    velocity_mod: 0,
                    duration: hold,
                    off_velocity,
                },
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::Track;
    use md_ir::{Event, Message, TimingEnvironment, RELEASE_TIME_CC};

    fn channel() -> MidiChannel {
        MidiChannel::new(Track::new(0), false, TimingEnvironment::default()).unwrap()
    }

    fn play(ch: &mut MidiChannel, sound: Articulated, beat: Beat) -> Vec<Event> {
        play_articulated(ch, &sound, beat).unwrap();
        ch.step_into_future_beat(beat).unwrap();
        ch.track().events()
    }

    fn notes(events: &[Event]) -> Vec<(u64, Message)> {
        events
            .iter()
            .filter(|e| e.message.is_note_on() || e.message.is_note_off())
            .map(|e| (e.tick, e.message))
            .collect()
    }

    #[test]
    fn staccato_quarter_is_240_ticks() {
        let mut ch = channel();
        let ev = play(&mut ch, Articulated::new(Pitch::C, Articulation::Staccato), Beat::QUARTER);

        assert_eq!(
            notes(&ev),
            vec![
                (0, Message::note_on(0, 60, 64).unwrap()),
                (240, Message::note_off(0, 60, 127).unwrap()),
            ]
        );
        // release knob forced low, then restored to its default
        let knob: Vec<(u64, Message)> = ev
            .iter()
            .filter(|e| matches!(e.message, Message::ControlChange { .. }))
            .map(|e| (e.tick, e.message))
            .collect();
        assert_eq!(
            knob,
            vec![
                (0, Message::control_change(0, RELEASE_TIME_CC, 20).unwrap()),
                (240, Message::control_change(0, RELEASE_TIME_CC, 64).unwrap()),
            ]
        );
    }

    #[test]
    fn knobs_restored_after_release() {
        for articulation in [
            Articulation::Staccato,
            Articulation::Staccatissimo,
            Articulation::Marcato,
        ] {
            let mut ch = channel();
            let chord = Chord::from_pitches([Pitch::C, Pitch::E]);
            let ev = play(&mut ch, Articulated::new(chord, articulation), Beat::QUARTER);
            let release = notes(&ev).last().unwrap().0;
            let at_release: Vec<&Message> = ev
                .iter()
                .filter(|e| e.tick == release)
                .map(|e| &e.message)
                .collect();
            let first_cc = at_release
                .iter()
                .position(|m| matches!(m, Message::ControlChange { .. }))
                .unwrap();
            assert!(
                at_release[..first_cc].iter().all(|m| m.is_note_off()),
                "{articulation:?}: {at_release:?}"
            );
            assert_eq!(first_cc, 2, "{articulation:?}");
        }
    }

    #[test]
    fn accent_is_louder_full_length() {
        let mut ch = channel();
        let ev = play(&mut ch, Articulated::new(Pitch::C, Articulation::Accent), Beat::QUARTER);
        assert_eq!(
            notes(&ev),
            vec![
                (0, Message::note_on(0, 60, 80).unwrap()),
                (960, Message::note_off(0, 60, 113).unwrap()),
            ]
        );
    }

    #[test]
    fn tenuto_overlaps_with_soft_release() {
        let mut ch = channel();
        play_articulated(&mut ch, &Articulated::new(Pitch::C, Articulation::Tenuto), Beat::QUARTER)
            .unwrap();
        ch.step_into_future(2000).unwrap();
        let ev = ch.track().events();
        assert_eq!(notes(&ev)[1], (1080, Message::note_off(0, 60, 1).unwrap()));
    }

    #[test]
    fn marcato_twists_two_knobs() {
        let mut ch = channel();
        let ev = play(&mut ch, Articulated::new(Pitch::C, Articulation::Marcato), Beat::QUARTER);
        assert_eq!(notes(&ev)[0].1, Message::note_on(0, 60, 76).unwrap());
        assert_eq!(notes(&ev)[1].0, 320);
        let ccs = ev
            .iter()
            .filter(|e| matches!(e.message, Message::ControlChange { .. }))
            .count();
        assert_eq!(ccs, 4);
    }

    #[test]
    fn glissando_bends_then_resets() {
        let mut ch = channel();
        let ev = play(&mut ch, Articulated::new(Pitch::C, Articulation::Gliscando), Beat::QUARTER);

        let bends: Vec<(u64, u16)> = ev
            .iter()
            .filter_map(|e| match e.message {
                Message::PitchBend { value, .. } => Some((e.tick, value)),
                _ => None,
            })
            .collect();
        assert_eq!(bends.len(), GLISS_STEPS as usize + 1);
        assert_eq!(bends[0].0, 0);
        assert!(bends.windows(2).take(15).all(|w| w[0].1 < w[1].1));
        assert_eq!(bends[15], (900, PITCH_BEND_MAX));
        assert_eq!(bends[16], (960, PITCH_BEND_CENTER));
        assert_eq!(ch.pitch_bend(), PITCH_BEND_CENTER);
    }

    #[test]
    fn chord_glissando_rolls() {
        let mut ch = channel();
        let chord = Chord::resolve("C").unwrap();
        assert_eq!(chord.len(), 3);
        let ev = play(&mut ch, Articulated::new(chord, Articulation::Gliscando), Beat::QUARTER);

        let ons: Vec<(u64, Message)> = notes(&ev)
            .into_iter()
            .filter(|(_, m)| m.is_note_on())
            .collect();
        assert_eq!(
            ons,
            vec![
                (0, Message::note_on(0, 60, 64).unwrap()),
                (80, Message::note_on(0, 64, 64).unwrap()),
                (160, Message::note_on(0, 67, 64).unwrap()),
            ]
        );
        let offs = notes(&ev).iter().filter(|(t, m)| m.is_note_off() && *t == 960).count();
        assert_eq!(offs, 3);
    }

    #[test]
    fn plain_chord_strikes_together() {
        let mut ch = channel();
        let ev = play(&mut ch, Articulated::plain(Chord::resolve("Am").unwrap()), Beat::HALF);
        let ons = notes(&ev).iter().filter(|(t, m)| m.is_note_on() && *t == 0).count();
        assert_eq!(ons, 3);
    }

    #[test]
    fn rest_writes_nothing() {
        let mut ch = channel();
        let ev = play(&mut ch, Articulated::new(Pitch::REST, Articulation::Staccato), Beat::QUARTER);
        assert!(ev.is_empty());
        assert_eq!(ch.state_time(), 960);
    }
}
