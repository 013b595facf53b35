//! Whole-engine properties over small exhaustive or stepped inputs.

use md_engine::{apply_gradual_dynamic, play_phrase, Action, MidiChannel, Track};
use md_ir::{
    Articulated, Beat, Chord, Dynamic, GradualDynamic, Melody, Phrase, Pitch, Rhythm,
    TimingEnvironment,
};

fn channel() -> MidiChannel {
    MidiChannel::new(Track::new(0), false, TimingEnvironment::default()).unwrap()
}

#[test]
fn tick_sums_stay_within_one() {
    let timing = TimingEnvironment::default();
    let beats = [
        Beat::WHOLE,
        Beat::QUARTER,
        Beat::EIGHTH.dot(1),
        Beat::QUARTER.tuplet(3, 2).unwrap(),
        Beat::SIXTEENTH.tuplet(5, 4).unwrap(),
        Beat::THIRTY_SECOND.tuplet(7, 4).unwrap(),
    ];
    for &a in &beats {
        for &b in &beats {
            let split = timing.ticks_in_beat(a) + timing.ticks_in_beat(b);
            let joined = timing.ticks_in_beat(a + b);
            assert!(split.abs_diff(joined) <= 1, "{a:?} + {b:?}");
        }
    }
    assert_eq!(timing.ticks_in_beat(Beat::QUARTER), 960);
}

#[test]
fn every_pitch_round_trips() {
    for n in 0..=127u8 {
        assert_eq!(Pitch::get(n).unwrap().midi_num(), Some(n));
    }
    for k in -12..=12 {
        assert_eq!(Pitch::REST.shift_octave(k), Pitch::REST);
        assert_eq!(Pitch::REST.transpose(k), Pitch::REST);
    }
}

#[test]
fn cmaj7_matches_intervals() {
    let c = Pitch::C;
    let built = Chord::from_pitches([c, c.major_third(), c.perfect_fifth(), c.major_seventh()]);
    assert_eq!(Chord::resolve("Cmaj7"), Some(built));
    assert_eq!(Chord::resolve("bogus123"), None);
}

#[test]
fn clock_is_monotonic_and_actions_run_once() {
    let mut ch = channel();
    for i in 0..50u64 {
        ch.do_later((i * 37 % 400) as i64, Action::PitchBend(8192 + i as u16));
    }

    let mut last = ch.state_time();
    for delta in [0u64, 13, 0, 101, 7, 250, 0, 1000] {
        let now = ch.step_into_future(delta).unwrap();
        assert!(now >= last);
        last = now;
        assert!(ch.pending().iter().all(|(tick, _)| tick > now));
    }
    assert!(ch.pending().is_empty());
    assert_eq!(ch.track().len(), 50);

    let ticks: Vec<u64> = ch.track().events().iter().map(|e| e.tick).collect();
    assert!(ticks.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn crescendo_steps_never_fall() {
    let mut ch = channel();
    let ramp = GradualDynamic::crescendo(
        Dynamic::from_velocity(40).unwrap(),
        Dynamic::from_velocity(100).unwrap(),
        Beat::QUARTER,
    )
    .unwrap();
    apply_gradual_dynamic(&mut ch, &ramp).unwrap();

    let mut seen = Vec::new();
    for _ in 0..=960 {
        ch.step_into_future(1).unwrap();
        seen.push(ch.dynamic().velocity());
    }
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert!(seen[0] >= 40);
    assert_eq!(*seen.last().unwrap(), 100);
}

#[test]
fn slurred_repeats_never_rearticulate() {
    let mut ch = channel();
    let melody: Melody = [Pitch::D; 4].into_iter().map(Articulated::plain).collect();
    let rhythm: Rhythm = [Beat::EIGHTH; 4].into_iter().collect::<Rhythm>().with_slur(true);
    play_phrase(&mut ch, &Phrase::new(melody, rhythm)).unwrap();

    let events = ch.track().events();
    let offs: Vec<u64> = events
        .iter()
        .filter(|e| e.message.is_note_off())
        .map(|e| e.tick)
        .collect();
    assert_eq!(offs, vec![1920]);
    // no off immediately followed by an on within one tick
    for off in events.iter().filter(|e| e.message.is_note_off()) {
        assert!(!events
            .iter()
            .any(|e| e.message.is_note_on() && e.tick >= off.tick && e.tick <= off.tick + 1));
    }
}
