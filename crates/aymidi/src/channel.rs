//! Per-voice state
//!
//! One [`Channel`] mirrors one tone channel of the chip and one MIDI channel
//! (0-2). It holds what the chip registers cannot: the active note, its
//! velocity, the controller volume it is scaled from, bend and vibrato depth.

use aymidi_psg::PanLaw;

/// Volume a reset leaves each channel at (MIDI volume 100 scaled to 4 bits)
pub const RESET_VOLUME: u8 = 100 >> 3;

/// State of one voice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channel {
    /// Active note, `None` when silent
    pub note: Option<u8>,
    /// Velocity of the active (or last) note
    pub velocity: u8,
    /// Channel volume (0-15)
    pub volume: u8,
    /// Route the envelope instead of the fixed level while sounding
    pub envelope_on: bool,
    /// Pitch bend in semitones
    pub bend_semitones: f64,
    /// Vibrato depth in semitones (0.0-0.5)
    pub modulation_depth: f64,
    /// Mixer tone flag
    pub tone_enabled: bool,
    /// Mixer noise flag
    pub noise_enabled: bool,
    /// Stereo position (0.0-1.0)
    pub pan: f64,
    /// Curve the pan was last pushed with
    pub pan_law: PanLaw,
    /// Last tone period pushed to the chip
    pub tone_period: u16,
}

impl Default for Channel {
    fn default() -> Self {
        Self {
            note: None,
            velocity: 0,
            volume: 0,
            envelope_on: false,
            bend_semitones: 0.0,
            modulation_depth: 0.0,
            tone_enabled: true,
            noise_enabled: false,
            pan: 0.5,
            pan_law: PanLaw::Linear,
            tone_period: 0,
        }
    }
}

impl Channel {
    /// Whether a note is active
    #[inline]
    pub fn is_sounding(&self) -> bool {
        self.note.is_some()
    }

    /// Chip level for the current volume and velocity, rounded half up
    #[inline]
    pub fn level(&self) -> u8 {
        scaled_level(self.volume, self.velocity)
    }

    /// Whether the vibrato has to be recomputed every sample
    #[inline]
    pub fn is_modulated(&self) -> bool {
        self.is_sounding() && self.modulation_depth != 0.0
    }

    /// Back to power-on defaults with the given volume
    pub fn reset(&mut self, volume: u8) {
        *self = Self {
            volume,
            ..Self::default()
        };
    }
}

/// `floor(volume * velocity / 127 + 0.5)`
#[inline]
pub fn scaled_level(volume: u8, velocity: u8) -> u8 {
    (volume as f64 * velocity as f64 / 127.0 + 0.5).floor() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_level_rounds_half_up() {
        assert_eq!(scaled_level(15, 127), 15);
        assert_eq!(scaled_level(12, 64), 6); // 6.047
        assert_eq!(scaled_level(15, 72), 9); // 8.504
        assert_eq!(scaled_level(15, 0), 0);
        assert_eq!(scaled_level(0, 127), 0);
    }

    #[test]
    fn test_sounding_follows_note() {
        let mut channel = Channel::default();
        assert!(!channel.is_sounding());
        channel.note = Some(60);
        assert!(channel.is_sounding());
        assert!(!channel.is_modulated());
        channel.modulation_depth = 0.25;
        assert!(channel.is_modulated());
    }

    #[test]
    fn test_reset_clears_note_and_modulation() {
        let mut channel = Channel {
            note: Some(64),
            velocity: 100,
            envelope_on: true,
            bend_semitones: 2.0,
            modulation_depth: 0.5,
            pan: 0.1,
            ..Channel::default()
        };
        channel.reset(RESET_VOLUME);
        assert_eq!(channel.note, None);
        assert_eq!(channel.volume, 12);
        assert!(!channel.envelope_on);
        assert_eq!(channel.bend_semitones, 0.0);
        assert_eq!(channel.modulation_depth, 0.0);
        assert_eq!(channel.pan, 0.5);
    }
}
