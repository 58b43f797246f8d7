//! Text rendering of tracker readings, ranges and pitch contours.

use vocalizer_core::{NoteObservation, PitchEstimate, TrackerReading, VocalRange};

/// Width of the cent meter on either side of centre.
const METER_HALF_WIDTH: i32 = 10;

/// One line for a live reading, e.g. `La4 (69)  440.0 Hz   +0 cents  |----------|----------|`.
pub fn format_reading(reading: &TrackerReading) -> String {
    let deviation = reading.target_cents.unwrap_or(reading.cents as f32);
    let mut line = format!(
        "{:<6}({:>3}) {:>7.1} Hz {:>+4} cents  {}",
        reading.note_label(),
        reading.midi,
        reading.frequency_hz,
        reading.cents,
        cent_meter(deviation)
    );
    if let Some(target) = reading.target_cents {
        line.push_str(&format!("  target {:+.0} cents", target));
    }
    line
}

/// A text cent meter spanning -50..=50 cents; larger deviations pin to the ends.
pub fn cent_meter(cents: f32) -> String {
    let clamped = cents.clamp(-50.0, 50.0);
    let position = (clamped / 50.0 * METER_HALF_WIDTH as f32).round() as i32;
    let mut meter = String::with_capacity((METER_HALF_WIDTH * 2 + 3) as usize);
    meter.push('|');
    for i in -METER_HALF_WIDTH..=METER_HALF_WIDTH {
        meter.push(if i == position {
            '*'
        } else if i == 0 {
            '|'
        } else {
            '-'
        });
    }
    meter.push('|');
    meter
}

pub fn format_range(range: &VocalRange) -> String {
    match range.span_semitones() {
        Some(span) => format!("{} ({:.1} semitones)", range, span),
        None => format!("{}. Try singing closer to the microphone at medium volume.", range),
    }
}

pub fn format_contour_line(seconds: f32, estimate: PitchEstimate) -> String {
    match estimate
        .frequency()
        .and_then(NoteObservation::from_frequency)
    {
        Some(note) => format!(
            "{:>8.3}s {:>8.1} Hz  {} {:+}",
            seconds,
            note.frequency,
            note.note_label(),
            note.cents
        ),
        None => format!("{:>8.3}s {:>8} Hz  -", seconds, "-"),
    }
}
