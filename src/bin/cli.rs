//! mellowd CLI: compiles the built-in demo composition to a MIDI file.
//!
//! Usage:
//!   md-cli [output.mid] [--tempo 120] [--time-sig 4/4]
//!
//! Logging follows `RUST_LOG`, e.g. `RUST_LOG=md_engine=trace`.

use std::env;

use anyhow::{bail, Context, Result};
use md_ir::{
    instruments, Articulated, Articulation, Beat, Chord, Dynamic, GradualDynamic, Melody, Phrase,
    Pitch, Rhythm, TimingEnvironment,
};
use md_master::{Block, CompileOptions, Composition, SourceLocation, Statement};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "md_cli=info,md_master=info".into()),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let output = args
        .iter()
        .find(|a| a.ends_with(".mid"))
        .cloned()
        .unwrap_or_else(|| "demo.mid".to_string());
    let bpm = match flag(&args, "--tempo") {
        Some(v) => v.parse::<u32>().with_context(|| format!("bad tempo '{v}'"))?,
        None => 120,
    };
    let (numerator, denominator) = match flag(&args, "--time-sig") {
        Some(v) => parse_time_signature(v)?,
        None => (4, 4),
    };

    let options = CompileOptions {
        timing: TimingEnvironment::new(numerator, denominator, bpm)?,
        ..CompileOptions::default()
    };
    tracing::info!(%output, bpm, numerator, denominator, "compiling demo");

    let composition = demo_composition()?;
    let sequence = composition
        .render_to_file(&output, &options)
        .with_context(|| format!("failed to render {output}"))?;

    println!(
        "Wrote {} tracks ({} ticks) to {}",
        sequence.tracks()?.len(),
        sequence.end_tick()?,
        output
    );
    Ok(())
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_time_signature(value: &str) -> Result<(u8, u8)> {
    let Some((n, d)) = value.split_once('/') else {
        bail!("time signature '{value}' should look like 3/4");
    };
    Ok((n.trim().parse()?, d.trim().parse()?))
}

fn melody(sounds: impl IntoIterator<Item = (Pitch, Articulation)>) -> Melody {
    sounds
        .into_iter()
        .map(|(p, a)| Articulated::new(p, a))
        .collect()
}

fn demo_composition() -> Result<Composition> {
    let mut comp = Composition::new();

    let mut lead = Block::new("lead");
    let opening = melody([
        (Pitch::C, Articulation::Accent),
        (Pitch::E, Articulation::None),
        (Pitch::G, Articulation::Staccato),
        (Pitch::G, Articulation::Staccato),
        (Pitch::A, Articulation::Tenuto),
        (Pitch::G, Articulation::None),
        (Pitch::E, Articulation::Marcato),
        (Pitch::C.shift_octave(1), Articulation::Gliscando),
    ]);
    let rhythm: Rhythm = [
        Beat::QUARTER,
        Beat::QUARTER,
        Beat::EIGHTH,
        Beat::EIGHTH,
        Beat::QUARTER.with_slur(true),
        Beat::QUARTER.with_slur(true),
        Beat::QUARTER.dot(1),
        Beat::EIGHTH,
    ]
    .into_iter()
    .collect();
    lead.push(Statement::instrument("Electric Piano 1").context("unknown instrument")?)
        .push(Statement::GradualDynamic(GradualDynamic::crescendo(
            Dynamic::P,
            Dynamic::F,
            Beat::WHOLE,
        )?))
        .push(Statement::PlayPhrase(Phrase::new(opening, rhythm)));

    let mut bass = Block::new("bass");
    let progression: Melody = ["C", "Am", "F", "G7"]
        .iter()
        .filter_map(|s| Chord::resolve(s))
        .map(|c| Articulated::new(c.shift_octave(-1), Articulation::Gliscando))
        .collect();
    bass.push(Statement::instrument("Acoustic Bass").context("unknown instrument")?)
        .push(Statement::SetDynamic(Dynamic::MP))
        .push(Statement::PlayPhrase(Phrase::new(
            progression,
            [Beat::HALF].into_iter().collect(),
        )));

    let mut drums = Block::percussion("drums");
    let kick = instruments::percussion_key("Bass Drum").context("unknown drum")?;
    let hat = instruments::percussion_key("Closed Hi-Hat").context("unknown drum")?;
    let groove: Melody = [kick, hat, hat, hat]
        .into_iter()
        .map(|k| Pitch::get(k).map(Articulated::plain))
        .collect::<md_ir::Result<_>>()?;
    let bar = Statement::PlayPhrase(Phrase::new(groove, [Beat::QUARTER].into_iter().collect()));
    drums.push(bar.clone()).push(bar);

    let lead = comp.add_block(lead);
    let bass = comp.add_block(bass);
    let drums = comp.add_block(drums);
    comp.sync(&[lead, bass, drums], SourceLocation::new(12, 1))?;

    // after the sync everyone plays the closing chord together
    for (output, chord) in [(lead, "Cmaj7+1"), (bass, "C-1")] {
        let chord = Chord::resolve(chord).context("unknown chord")?;
        if let Some(block) = comp.block_mut(output) {
            block.push(Statement::PlayPhrase(Phrase::new(
                [Articulated::new(chord, Articulation::Tenuto)].into_iter().collect(),
                [Beat::WHOLE].into_iter().collect(),
            )));
        }
    }
    Ok(comp)
}
