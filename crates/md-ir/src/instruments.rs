//! General MIDI instrument and percussion names.
//!
//! Lookups ignore case, spaces, dashes and underscores, so
//! `"Acoustic Grand Piano"`, `"acoustic_grand_piano"` and
//! `"AcousticGrandPiano"` all resolve to program 0.

/// GM program names, indexed by program number.
pub static PROGRAMS: [&str; 128] = [
    "Acoustic Grand Piano", "Bright Acoustic Piano", "Electric Grand Piano", "Honky-tonk Piano",
    "Electric Piano 1", "Electric Piano 2", "Harpsichord", "Clavinet",
    "Celesta", "Glockenspiel", "Music Box", "Vibraphone",
    "Marimba", "Xylophone", "Tubular Bells", "Dulcimer",
    "Drawbar Organ", "Percussive Organ", "Rock Organ", "Church Organ",
    "Reed Organ", "Accordion", "Harmonica", "Tango Accordion",
    "Acoustic Guitar Nylon", "Acoustic Guitar Steel", "Electric Guitar Jazz", "Electric Guitar Clean",
    "Electric Guitar Muted", "Overdriven Guitar", "Distortion Guitar", "Guitar Harmonics",
    "Acoustic Bass", "Electric Bass Finger", "Electric Bass Pick", "Fretless Bass",
    "Slap Bass 1", "Slap Bass 2", "Synth Bass 1", "Synth Bass 2",
    "Violin", "Viola", "Cello", "Contrabass",
    "Tremolo Strings", "Pizzicato Strings", "Orchestral Harp", "Timpani",
    "String Ensemble 1", "String Ensemble 2", "Synth Strings 1", "Synth Strings 2",
    "Choir Aahs", "Voice Oohs", "Synth Voice", "Orchestra Hit",
    "Trumpet", "Trombone", "Tuba", "Muted Trumpet",
    "French Horn", "Brass Section", "Synth Brass 1", "Synth Brass 2",
    "Soprano Sax", "Alto Sax", "Tenor Sax", "Baritone Sax",
    "Oboe", "English Horn", "Bassoon", "Clarinet",
    "Piccolo", "Flute", "Recorder", "Pan Flute",
    "Blown Bottle", "Shakuhachi", "Whistle", "Ocarina",
    "Lead 1 Square", "Lead 2 Sawtooth", "Lead 3 Calliope", "Lead 4 Chiff",
    "Lead 5 Charang", "Lead 6 Voice", "Lead 7 Fifths", "Lead 8 Bass And Lead",
    "Pad 1 New Age", "Pad 2 Warm", "Pad 3 Polysynth", "Pad 4 Choir",
    "Pad 5 Bowed", "Pad 6 Metallic", "Pad 7 Halo", "Pad 8 Sweep",
    "FX 1 Rain", "FX 2 Soundtrack", "FX 3 Crystal", "FX 4 Atmosphere",
    "FX 5 Brightness", "FX 6 Goblins", "FX 7 Echoes", "FX 8 Sci-fi",
    "Sitar", "Banjo", "Shamisen", "Koto",
    "Kalimba", "Bagpipe", "Fiddle", "Shanai",
    "Tinkle Bell", "Agogo", "Steel Drums", "Woodblock",
    "Taiko Drum", "Melodic Tom", "Synth Drum", "Reverse Cymbal",
    "Guitar Fret Noise", "Breath Noise", "Seashore", "Bird Tweet",
    "Telephone Ring", "Helicopter", "Applause", "Gunshot",
];

/// First key of the GM percussion map.
pub const FIRST_PERCUSSION_KEY: u8 = 35;

/// GM percussion names for keys 35..=81.
pub static PERCUSSION: [&str; 47] = [
    "Acoustic Bass Drum", "Bass Drum", "Side Stick", "Acoustic Snare",
    "Hand Clap", "Electric Snare", "Low Floor Tom", "Closed Hi-Hat",
    "High Floor Tom", "Pedal Hi-Hat", "Low Tom", "Open Hi-Hat",
    "Low Mid Tom", "Hi Mid Tom", "Crash Cymbal 1", "High Tom",
    "Ride Cymbal 1", "Chinese Cymbal", "Ride Bell", "Tambourine",
    "Splash Cymbal", "Cowbell", "Crash Cymbal 2", "Vibraslap",
    "Ride Cymbal 2", "Hi Bongo", "Low Bongo", "Mute Hi Conga",
    "Open Hi Conga", "Low Conga", "High Timbale", "Low Timbale",
    "High Agogo", "Low Agogo", "Cabasa", "Maracas",
    "Short Whistle", "Long Whistle", "Short Guiro", "Long Guiro",
    "Claves", "Hi Wood Block", "Low Wood Block", "Mute Cuica",
    "Open Cuica", "Mute Triangle", "Open Triangle",
];

fn same_name(table: &str, query: &str) -> bool {
    let keep = |c: &char| c.is_ascii_alphanumeric();
    let mut a = table.chars().filter(keep).map(|c| c.to_ascii_lowercase());
    let mut b = query.chars().filter(keep).map(|c| c.to_ascii_lowercase());
    loop {
        match (a.next(), b.next()) {
            (None, None) => return true,
            (x, y) if x == y => continue,
            _ => return false,
        }
    }
}

/// GM program number for an instrument name.
pub fn program(name: &str) -> Option<u8> {
    PROGRAMS
        .iter()
        .position(|p| same_name(p, name))
        .map(|i| i as u8)
}

pub fn program_name(program: u8) -> Option<&'static str> {
    PROGRAMS.get(program as usize).copied()
}

/// Drum key for a GM percussion name.
pub fn percussion_key(name: &str) -> Option<u8> {
    PERCUSSION
        .iter()
        .position(|p| same_name(p, name))
        .map(|i| FIRST_PERCUSSION_KEY + i as u8)
}

pub fn percussion_name(key: u8) -> Option<&'static str> {
    key.checked_sub(FIRST_PERCUSSION_KEY)
        .and_then(|i| PERCUSSION.get(i as usize))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_lookup_ignores_formatting() {
        assert_eq!(program("Acoustic Grand Piano"), Some(0));
        assert_eq!(program("acoustic_grand_piano"), Some(0));
        assert_eq!(program("violin"), Some(40));
        assert_eq!(program("Gunshot"), Some(127));
        assert_eq!(program("kazoo"), None);
    }

    #[test]
    fn percussion_lookup() {
        assert_eq!(percussion_key("Acoustic Snare"), Some(38));
        assert_eq!(percussion_key("closed hi-hat"), Some(42));
        assert_eq!(percussion_key("Open Triangle"), Some(81));
        assert_eq!(percussion_name(36), Some("Bass Drum"));
        assert_eq!(percussion_name(34), None);
        assert_eq!(percussion_name(82), None);
    }

    #[test]
    fn names_round_trip() {
        for p in 0..128u8 {
            assert_eq!(program(program_name(p).unwrap()), Some(p));
        }
    }
}
