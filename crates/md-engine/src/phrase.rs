//! Walking a phrase against a channel.

use md_ir::Phrase;
use tracing::trace;

use crate::channel::MidiChannel;
use crate::controller::SUSTAIN_PEDAL_CC;
use crate::error::Result;
use crate::sound::play_articulated;

/// Play every element of `phrase` and advance the clock past it.
///
/// Entering a slurred run presses the sustain pedal and turns slurring on;
/// leaving one turns slurring off and then lifts the pedal. Slurs never
/// carry past the end of a phrase. Returns the ticks the phrase took.
pub fn play_phrase(channel: &mut MidiChannel, phrase: &Phrase) -> Result<u64> {
    if phrase.is_empty() {
        return Ok(0);
    }
    let start = channel.state_time();
    let mut slurring = false;

    for (sound, beat) in phrase.iter() {
        let slurred = beat.is_slurred();
        if slurred && !slurring {
            channel.press_pedal(SUSTAIN_PEDAL_CC)?;
            channel.set_slurred(true);
        } else if !slurred && slurring {
            channel.set_slurred(false);
            channel.release_pedal(SUSTAIN_PEDAL_CC)?;
        }
        slurring = slurred;

        play_articulated(channel, &sound, beat)?;
        channel.step_into_future_beat(beat)?;
    }

    channel.set_slurred(false);
    channel.release_pedal(SUSTAIN_PEDAL_CC)?;

    let elapsed = channel.state_time() - start;
    trace!(channel = channel.channel(), elapsed, notes = phrase.len(), "phrase played");
    Ok(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::Track;
    use md_ir::{Articulated, Beat, Melody, Message, Pitch, Rhythm, TimingEnvironment};

    fn channel() -> MidiChannel {
        MidiChannel::new(Track::new(0), false, TimingEnvironment::default()).unwrap()
    }

    fn melody(pitches: &[Pitch]) -> Melody {
        pitches.iter().map(|&p| Articulated::plain(p)).collect()
    }

    #[test]
    fn empty_phrase_is_silent() {
        let mut ch = channel();
        let phrase = Phrase::new(melody(&[Pitch::C]), Rhythm::default());
        assert_eq!(play_phrase(&mut ch, &phrase).unwrap(), 0);
        assert!(ch.track().is_empty());
    }

    #[test]
    fn duration_is_sum_of_beats() {
        let mut ch = channel();
        let rhythm: Rhythm = [Beat::QUARTER, Beat::EIGHTH, Beat::HALF].into_iter().collect();
        let phrase = Phrase::new(melody(&[Pitch::C, Pitch::D, Pitch::E]), rhythm);
        assert_eq!(play_phrase(&mut ch, &phrase).unwrap(), 960 + 480 + 1920);
        assert_eq!(ch.state_time(), 3360);
    }

    #[test]
    fn slurred_repeat_joins_notes() {
        let mut ch = channel();
        let rhythm: Rhythm = [Beat::QUARTER, Beat::QUARTER]
            .into_iter()
            .collect::<Rhythm>()
            .with_slur(true);
        let phrase = Phrase::new(melody(&[Pitch::C, Pitch::C]), rhythm);
        play_phrase(&mut ch, &phrase).unwrap();

        let ev = ch.track().events();
        let offs: Vec<u64> = ev
            .iter()
            .filter(|e| e.message.is_note_off())
            .map(|e| e.tick)
            .collect();
        assert_eq!(offs, vec![1920]);

        let ons: Vec<(u64, Message)> = ev
            .iter()
            .filter(|e| e.message.is_note_on())
            .map(|e| (e.tick, e.message))
            .collect();
        assert_eq!(ons[1], (960, Message::note_on(0, 60, 43).unwrap()));
        assert!(!ch.is_slurred());
    }

    #[test]
    fn sustain_pedal_brackets_slur() {
        let mut ch = channel();
        let rhythm: Rhythm = [
            Beat::QUARTER,
            Beat::QUARTER.with_slur(true),
            Beat::QUARTER.with_slur(true),
            Beat::QUARTER,
        ]
        .into_iter()
        .collect();
        let phrase = Phrase::new(melody(&[Pitch::C, Pitch::D, Pitch::E, Pitch::F]), rhythm);
        play_phrase(&mut ch, &phrase).unwrap();

        let pedal: Vec<(u64, u8)> = ch
            .track()
            .events()
            .iter()
            .filter_map(|e| match e.message {
                Message::ControlChange { controller: 64, value, .. } => Some((e.tick, value)),
                _ => None,
            })
            .collect();
        assert_eq!(pedal, vec![(960, 127), (2880, 0), (3840, 0)]);
    }

    #[test]
    fn shorter_melody_wraps_an_octave_up() {
        let mut ch = channel();
        let rhythm: Rhythm = [Beat::QUARTER; 3].into_iter().collect();
        let phrase = Phrase::new(melody(&[Pitch::C, Pitch::E]), rhythm);
        play_phrase(&mut ch, &phrase).unwrap();

        let keys: Vec<u8> = ch
            .track()
            .events()
            .iter()
            .filter_map(|e| match e.message {
                Message::NoteOn { key, .. } => Some(key),
                _ => None,
            })
            .collect();
        assert_eq!(keys, vec![60, 64, 72]);
    }
}
