//! Tone, noise and envelope generators
//!
//! All three are driven by the same clock (chip clock / 8) through a
//! [`Divider`] that fires once every `period` ticks.

use crate::tables::{Segment, ENVELOPE_TOP, SHAPE_SEGMENTS};

/// Programmable clock divider
///
/// Fires on the tick that brings the count up to the period. Shrinking the
/// period below the current count makes it fire on the next tick.
#[derive(Clone, Debug)]
pub struct Divider {
    count: u32,
    period: u32,
}

impl Divider {
    /// Divider firing every tick
    pub const fn new() -> Self {
        Self { count: 0, period: 1 }
    }

    /// Ticks between two firings (0 is treated as 1)
    #[inline]
    pub fn set_period(&mut self, period: u32) {
        self.period = period.max(1);
    }

    /// Current period
    #[inline]
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Restart counting from zero
    #[inline]
    pub fn restart(&mut self) {
        self.count = 0;
    }

    /// Advance one tick; true when the divider fires
    #[inline]
    pub fn clock(&mut self) -> bool {
        self.count += 1;
        if self.count >= self.period {
            self.count = 0;
            true
        } else {
            false
        }
    }
}

impl Default for Divider {
    fn default() -> Self {
        Self::new()
    }
}

/// Square wave of one channel: `clock / (16 * period)` Hz
#[derive(Clone, Debug, Default)]
pub struct ToneGenerator {
    divider: Divider,
    bit: u32,
}

impl ToneGenerator {
    /// Low output, period 1
    pub fn new() -> Self {
        Self::default()
    }

    /// 12-bit period; the upper bits are ignored
    #[inline]
    pub fn set_period(&mut self, period: u16) {
        self.divider.set_period(u32::from(period & 0x0fff));
    }

    /// Effective period
    pub fn period(&self) -> u32 {
        self.divider.period()
    }

    /// Advance one tick and return the square-wave bit
    #[inline]
    pub fn tick(&mut self) -> u32 {
        if self.divider.clock() {
            self.bit ^= 1;
        }
        self.bit
    }

    /// Square-wave bit (0 or 1)
    #[inline]
    pub fn output(&self) -> u32 {
        self.bit
    }
}

/// Shared pseudo-random source: 17-bit LFSR with taps at bits 0 and 3
///
/// Shifts once every `2 * period` ticks.
#[derive(Clone, Debug)]
pub struct NoiseGenerator {
    divider: Divider,
    lfsr: u32,
}

impl NoiseGenerator {
    /// Seeded LFSR, period 1
    pub fn new() -> Self {
        let mut noise = Self {
            divider: Divider::new(),
            lfsr: 1,
        };
        noise.set_period(0);
        noise
    }

    /// 5-bit period; the upper bits are ignored
    #[inline]
    pub fn set_period(&mut self, period: u8) {
        let period = u32::from(period & 0x1f).max(1);
        self.divider.set_period(period * 2);
    }

    /// Effective period in noise steps
    pub fn period(&self) -> u32 {
        self.divider.period() / 2
    }

    /// Advance one tick and return the noise bit
    #[inline]
    pub fn tick(&mut self) -> u32 {
        if self.divider.clock() {
            let feedback = (self.lfsr ^ (self.lfsr >> 3)) & 1;
            self.lfsr = (self.lfsr >> 1) | (feedback << 16);
        }
        self.output()
    }

    /// Noise bit (0 or 1)
    #[inline]
    pub fn output(&self) -> u32 {
        self.lfsr & 1
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Envelope: a 0..=31 level walking through the two segments of its shape
#[derive(Clone, Debug)]
pub struct EnvelopeGenerator {
    divider: Divider,
    shape: u8,
    second_half: bool,
    level: i32,
}

impl EnvelopeGenerator {
    /// Shape 0, period 1
    pub fn new() -> Self {
        let mut envelope = Self {
            divider: Divider::new(),
            shape: 0,
            second_half: false,
            level: 0,
        };
        envelope.set_shape(0);
        envelope
    }

    /// 16-bit period (0 is treated as 1)
    #[inline]
    pub fn set_period(&mut self, period: u16) {
        self.divider.set_period(u32::from(period));
    }

    /// Effective period
    pub fn period(&self) -> u32 {
        self.divider.period()
    }

    /// Select a shape and restart from its first segment
    pub fn set_shape(&mut self, shape: u8) {
        self.shape = shape & 0x0f;
        self.second_half = false;
        self.divider.restart();
        self.level = self.segment().start_level();
    }

    /// Shape register (0-15)
    pub fn shape(&self) -> u8 {
        self.shape
    }

    fn segment(&self) -> Segment {
        SHAPE_SEGMENTS[usize::from(self.shape)][usize::from(self.second_half)]
    }

    /// Advance one tick
    #[inline]
    pub fn tick(&mut self) {
        if !self.divider.clock() {
            return;
        }
        let next = match self.segment() {
            Segment::SlideUp => self.level + 1,
            Segment::SlideDown => self.level - 1,
            Segment::HoldTop | Segment::HoldBottom => return,
        };
        if (0..=ENVELOPE_TOP).contains(&next) {
            self.level = next;
        } else {
            self.second_half = !self.second_half;
            self.level = self.segment().start_level();
        }
    }

    /// Current level (0-31), an index into the DAC table
    #[inline]
    pub fn level(&self) -> usize {
        self.level as usize
    }
}

impl Default for EnvelopeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(envelope: &mut EnvelopeGenerator, ticks: usize) -> Vec<usize> {
        (0..ticks)
            .map(|_| {
                envelope.tick();
                envelope.level()
            })
            .collect()
    }

    #[test]
    fn test_divider_fires_every_period() {
        let mut divider = Divider::new();
        divider.set_period(3);
        let fired: Vec<bool> = (0..7).map(|_| divider.clock()).collect();
        assert_eq!(fired, vec![false, false, true, false, false, true, false]);

        divider.set_period(0);
        assert_eq!(divider.period(), 1);
    }

    #[test]
    fn test_tone_period_masking() {
        let mut tone = ToneGenerator::new();
        tone.set_period(0);
        assert_eq!(tone.period(), 1);
        tone.set_period(0x1234);
        assert_eq!(tone.period(), 0x234);
    }

    #[test]
    fn test_tone_square_wave() {
        let mut tone = ToneGenerator::new();
        tone.set_period(4);
        let bits: Vec<u32> = (0..16).map(|_| tone.tick()).collect();
        assert_eq!(bits, vec![0, 0, 0, 1, 1, 1, 1, 0, 0, 0, 0, 1, 1, 1, 1, 0]);
    }

    #[test]
    fn test_noise_changes_every_second_tick_at_most() {
        let mut noise = NoiseGenerator::new();
        noise.set_period(1);
        assert_eq!(noise.period(), 1);
        let bits: Vec<u32> = (0..256).map(|_| noise.tick()).collect();

        assert!(bits.windows(2).any(|w| w[0] != w[1]));
        for pair in bits[1..255].chunks_exact(2) {
            assert_eq!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_noise_period_masking() {
        let mut noise = NoiseGenerator::new();
        noise.set_period(0x3f);
        assert_eq!(noise.period(), 0x1f);
        noise.set_period(0);
        assert_eq!(noise.period(), 1);
    }

    #[test]
    fn test_shape_write_restarts() {
        let mut envelope = EnvelopeGenerator::new();
        envelope.set_period(1);
        envelope.set_shape(0x0C);
        assert_eq!(levels(&mut envelope, 10).last(), Some(&10));

        envelope.set_shape(0x0C);
        assert_eq!(envelope.level(), 0);
    }

    #[test]
    fn test_decay_holds_bottom() {
        let mut envelope = EnvelopeGenerator::new();
        envelope.set_period(1);
        envelope.set_shape(0x00);
        assert_eq!(envelope.level(), 31);
        assert!(levels(&mut envelope, 100)[40..].iter().all(|l| *l == 0));
    }

    #[test]
    fn test_attack_holds_top() {
        let mut envelope = EnvelopeGenerator::new();
        envelope.set_period(1);
        envelope.set_shape(0x0D);
        assert_eq!(levels(&mut envelope, 200).last(), Some(&31));
    }

    #[test]
    fn test_sawtooth_repeats_every_32_steps() {
        let mut envelope = EnvelopeGenerator::new();
        envelope.set_period(1);
        envelope.set_shape(0x08);
        let first = levels(&mut envelope, 32);
        let second = levels(&mut envelope, 32);
        assert_eq!(first, second);
    }

    #[test]
    fn test_triangle_turns_around() {
        let mut envelope = EnvelopeGenerator::new();
        envelope.set_period(2);
        envelope.set_shape(0x0E);
        let walk = levels(&mut envelope, 2 * 64);
        assert_eq!(walk.iter().max(), Some(&31));
        assert_eq!(walk.iter().min(), Some(&0));
        assert_eq!(walk[2 * 64 - 1], 0);
    }
}
