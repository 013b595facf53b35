//! Integration test: blocks that meet at a sync point leave it together.

use std::sync::Arc;
use std::thread;

use md_engine::{MidiChannel, OutputId, SyncLink, Track};
use md_ir::{Articulated, Beat, Phrase, Pitch, TimingEnvironment};
use md_master::{Block, CompileOptions, Composition, SourceLocation, Statement};

fn ticks(n: u64) -> Beat {
    Beat::new(n as f64 / 960.0).unwrap()
}

fn note(pitch: Pitch) -> Statement {
    Statement::PlayPhrase(Phrase::new(
        [Articulated::plain(pitch)].into_iter().collect(),
        [Beat::QUARTER].into_iter().collect(),
    ))
}

/// Tick of the first note-on in each track, by channel.
fn first_note_ticks(comp: &Composition) -> Vec<(u8, u64)> {
    let seq = comp.compile(&CompileOptions::default()).unwrap();
    seq.tracks()
        .unwrap()
        .iter()
        .map(|t| {
            let tick = t
                .events
                .iter()
                .find(|e| e.message.is_note_on())
                .map(|e| e.tick)
                .unwrap();
            (t.channel, tick)
        })
        .collect()
}

#[test]
fn blocks_at_500_and_800_meet_at_800() {
    let mut comp = Composition::new();
    let mut a = Block::new("a");
    a.push(Statement::Rest(ticks(500)));
    let mut b = Block::new("b");
    b.push(Statement::Rest(ticks(800)));
    let a = comp.add_block(a);
    let b = comp.add_block(b);

    comp.sync(&[a, b], SourceLocation::new(3, 1)).unwrap();
    comp.block_mut(a).unwrap().push(note(Pitch::C));
    comp.block_mut(b).unwrap().push(note(Pitch::E));

    assert_eq!(first_note_ticks(&comp), vec![(0, 800), (1, 800)]);
}

#[test]
fn repeated_sync_points_realign_each_time() {
    let mut comp = Composition::new();
    let slow = comp.add_block(Block::new("slow"));
    let fast = comp.add_block(Block::new("fast"));

    for round in 0..3u32 {
        comp.block_mut(slow).unwrap().push(Statement::Rest(Beat::HALF));
        comp.block_mut(fast).unwrap().push(Statement::Rest(Beat::EIGHTH));
        comp.sync(&[slow, fast], SourceLocation::new(round + 1, 1))
            .unwrap();
    }
    comp.block_mut(fast).unwrap().push(note(Pitch::G));
    comp.block_mut(slow).unwrap().push(note(Pitch::G));

    // three half notes on the slow side set the pace
    assert_eq!(first_note_ticks(&comp), vec![(0, 5760), (1, 5760)]);
}

#[test]
fn leap_runs_pending_releases() {
    let timing = TimingEnvironment::default();
    let link = Arc::new(SyncLink::new([OutputId(0), OutputId(1)]).unwrap());

    let early = {
        let link = Arc::clone(&link);
        thread::spawn(move || {
            let mut ch = MidiChannel::new(Track::new(0), false, timing).unwrap();
            // release falls due at 960, inside the leap to 1920
            ch.play_note(Pitch::C, 0, 960, 96).unwrap();
            link.sync_channel(OutputId(0), &mut ch).unwrap();
            ch
        })
    };
    let late = thread::spawn(move || {
        let mut ch = MidiChannel::new(Track::new(1), false, timing).unwrap();
        ch.step_into_future(1920).unwrap();
        link.sync_channel(OutputId(1), &mut ch).unwrap();
        ch
    });

    let early = early.join().unwrap();
    let late = late.join().unwrap();
    assert_eq!(early.state_time(), 1920);
    assert_eq!(late.state_time(), 1920);

    let off = early
        .track()
        .events()
        .into_iter()
        .find(|e| e.message.is_note_off())
        .unwrap();
    assert_eq!(off.tick, 960);
}
