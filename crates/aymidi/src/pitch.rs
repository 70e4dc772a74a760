//! Pitch and vibrato
//!
//! Notes map to tone periods through equal temperament with A = 220 Hz at
//! semitone 45. The vibrato is a sine LFO driven by the engine's sample
//! counter: a quarter cycle every [`MODULATION_QUARTER`] samples.

use std::f64::consts::FRAC_PI_2;

/// Semitone ratio as used by the original tuning tables
const SEMITONE_RATIO: f64 = 1.059463;

/// Reference frequency in Hz at [`REFERENCE_NOTE`]
const REFERENCE_HZ: f64 = 220.0;

/// Semitone number of the reference frequency
const REFERENCE_NOTE: f64 = 45.0;

/// Samples per quarter cycle of the vibrato LFO
pub const MODULATION_QUARTER: u32 = 2048;

/// Samples per full cycle of the vibrato LFO
pub const MODULATION_PERIOD: u32 = MODULATION_QUARTER * 4;

/// Deepest vibrato (modulation wheel fully up), in semitones
pub const MAX_MODULATION_DEPTH: f64 = 0.5;

/// Pitch bend range either side of center, in semitones
pub const BEND_RANGE: f64 = 12.0;

/// Center of the 14-bit pitch bend range
pub const BEND_CENTER: u16 = 0x2000;

/// Frequency of a (possibly fractional) semitone
#[inline]
pub fn note_frequency(semitone: f64) -> f64 {
    REFERENCE_HZ * SEMITONE_RATIO.powf(semitone - REFERENCE_NOTE)
}

/// Tone period for a semitone at a chip clock, rounded half up
///
/// Saturates at `u16::MAX` for very low notes on fast clocks; the chip only
/// keeps the low 12 bits anyway.
#[inline]
pub fn note_to_period(clock_hz: u32, semitone: f64) -> u16 {
    (clock_hz as f64 / (16.0 * note_frequency(semitone)) + 0.5) as u16
}

/// Bend in semitones from a raw 14-bit pitch bend value
#[inline]
pub fn bend_semitones(raw: u16) -> f64 {
    (raw as f64 - BEND_CENTER as f64) / BEND_CENTER as f64 * BEND_RANGE
}

/// Vibrato depth from a 7-bit modulation wheel value
#[inline]
pub fn modulation_depth(value: u8) -> f64 {
    value as f64 / 127.0 * MAX_MODULATION_DEPTH
}

/// Vibrato offset in semitones at a given sample counter
#[inline]
pub fn modulation_offset(depth: f64, counter: u32) -> f64 {
    let phase = (counter % MODULATION_PERIOD) as f64;
    depth * (FRAC_PI_2 * phase / MODULATION_QUARTER as f64).sin()
}
