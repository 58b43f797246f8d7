//! # Musical Tuning Module
//!
//! Maps detected frequencies onto equal-tempered notes named with solfège
//! syllables, and measures how far a sung pitch sits from a note in cents.
//!
//! ## Features
//! - Frequency to MIDI conversion (A4 = 440 Hz = MIDI 69)
//! - Nearest-note lookup with cents deviation in [-50, 50]
//! - Solfège note name parsing (e.g. "Sol4", "La#3", "Sib2")

use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::fmt;

/// The 12 chromatic pitch classes, starting at Do (C).
pub const NOTE_NAMES: [&str; 12] = [
    "Do", "Do#", "Re", "Re#", "Mi", "Fa", "Fa#", "Sol", "Sol#", "La", "La#", "Si",
];

/// Reference pitch for A4 in Hz.
pub const A4_FREQUENCY: f32 = 440.0;
/// MIDI number of A4.
pub const A4_MIDI: i32 = 69;
/// Highest MIDI note number (Sol9).
pub const MAX_MIDI: i32 = 127;

/// Pitch class lookup for note name parsing.
///
/// Holds the sharp spellings from [`NOTE_NAMES`] plus flat spellings
/// (e.g. "Mib"), so "Re#" and "Mib" both resolve to pitch class 3.
static PITCH_CLASSES: Lazy<BTreeMap<String, i32>> = Lazy::new(|| {
    let mut map: BTreeMap<String, i32> = NOTE_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| (name.to_string(), i as i32))
        .collect();

    for (i, name) in NOTE_NAMES.iter().enumerate() {
        if name.ends_with('#') {
            continue;
        }
        let class = (i as i32 - 1).rem_euclid(12);
        map.insert(format!("{}b", name), class);
    }
    map
});

/// A detected pitch mapped to its nearest note.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteObservation {
    /// Solfège syllable from [`NOTE_NAMES`].
    pub name: &'static str,
    /// Rounded MIDI note number.
    pub midi: i32,
    /// Octave in scientific pitch notation (Do4 is middle C).
    pub octave: i32,
    /// Deviation from the note, floored to whole cents.
    pub cents: i32,
    /// The frequency that was mapped, in Hz.
    pub frequency: f32,
}

impl NoteObservation {
    /// Maps a frequency to the nearest equal-tempered note.
    ///
    /// Returns `None` for non-positive or non-finite input.
    pub fn from_frequency(frequency: f32) -> Option<Self> {
        if !frequency.is_finite() || frequency <= 0.0 {
            return None;
        }
        let midi = frequency_to_midi(frequency);
        let rounded = midi.round();
        let midi_number = rounded as i32;
        let cents = ((midi - rounded) * 100.0).floor() as i32;

        Some(Self {
            name: note_name(midi_number),
            midi: midi_number,
            octave: octave_of(midi_number),
            cents,
            frequency,
        })
    }

    /// Name with octave, e.g. "La4".
    pub fn note_label(&self) -> String {
        format!("{}{}", self.name, self.octave)
    }
}

impl fmt::Display for NoteObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {:.1} Hz {:+} cents",
            self.note_label(),
            self.midi,
            self.frequency,
            self.cents
        )
    }
}

/// Converts a frequency to a fractional MIDI note number.
pub fn frequency_to_midi(frequency: f32) -> f32 {
    A4_MIDI as f32 + 12.0 * (frequency / A4_FREQUENCY).log2()
}

/// Converts a MIDI note number to its equal-tempered frequency.
pub fn midi_to_frequency(midi: f32) -> f32 {
    A4_FREQUENCY * 2.0_f32.powf((midi - A4_MIDI as f32) / 12.0)
}

/// Solfège name of a MIDI note.
///
/// Negative note numbers wrap onto the table like any other octave.
pub fn note_name(midi: i32) -> &'static str {
    NOTE_NAMES[midi.rem_euclid(12) as usize]
}

/// Octave of a MIDI note, with MIDI 60 in octave 4.
pub fn octave_of(midi: i32) -> i32 {
    midi.div_euclid(12) - 1
}

/// Parses a note such as "Sol4", "La#3" or "Sib2" into a MIDI number.
///
/// Syllables are case-insensitive ("sol4" and "Sol4" are the same note).
/// Returns `None` for unknown syllables, a missing octave, or a note outside
/// MIDI 0..=127.
pub fn parse_note(text: &str) -> Option<i32> {
    let text = text.trim();
    let split = text.find(|c: char| c.is_ascii_digit() || c == '-')?;
    let (name, octave) = text.split_at(split);
    let octave: i32 = octave.parse().ok()?;

    let mut chars = name.chars();
    let first = chars.next()?.to_ascii_uppercase();
    let normalized: String = std::iter::once(first)
        .chain(chars.map(|c| c.to_ascii_lowercase()))
        .collect();

    let class = *PITCH_CLASSES.get(&normalized)?;
    let mut midi = octave.checked_add(1)?.checked_mul(12)?.checked_add(class)?;
    // Flats of Do belong to the octave below, e.g. "Dob4" is Si3.
    if normalized == "Dob" {
        midi = midi.checked_sub(12)?;
    }
    (0..=MAX_MIDI).contains(&midi).then_some(midi)
}

/// Deviation of `frequency` from `target_frequency` in cents.
///
/// Positive values are sharp, negative values flat.
pub fn cents_between(frequency: f32, target_frequency: f32) -> f32 {
    1200.0 * (frequency / target_frequency).log2()
}
