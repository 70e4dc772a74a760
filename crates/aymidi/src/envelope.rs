//! Envelope register composition
//!
//! The envelope shape is four independent bits that controllers and
//! properties set one at a time; the period is a 16-bit value written in
//! coarse and fine parts.

use bitflags::bitflags;

bitflags! {
    /// Envelope shape register (R13)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct EnvelopeShape: u8 {
        /// Freeze at the end of the first cycle
        const HOLD = 0b0001;
        /// Reverse direction every cycle
        const ALTERNATE = 0b0010;
        /// Start counting up instead of down
        const ATTACK = 0b0100;
        /// Keep going after the first cycle
        const CONTINUE = 0b1000;
    }
}

impl EnvelopeShape {
    /// Shape selected by the General Purpose 4 controller
    ///
    /// The top three bits of the value pick hold, alternate and attack;
    /// continue is always set.
    #[inline]
    pub fn from_controller(value: u8) -> Self {
        Self::from_bits_truncate(value >> 4) | Self::CONTINUE
    }

    /// Raw 4-bit register value
    #[inline]
    pub fn register(self) -> u8 {
        self.bits()
    }
}

/// Empirical slope correction applied after a coarse period write
const CORRECTION_SCALE: f64 = 2.04e-7;
const CORRECTION_EXPONENT: f64 = 1.599763e-3;

/// Replace bits 7 and up of the envelope period (General Purpose 2)
///
/// Adds the calibration term `2.04e-7 * exp(1.599763e-3 * period)`,
/// truncates toward zero and clamps to 16 bits.
pub fn merge_coarse(period: u16, value: u8) -> u16 {
    let merged = (period as u32 & 0x007F) | ((value as u32) << 7);
    let corrected = merged as f64 + CORRECTION_SCALE * (CORRECTION_EXPONENT * merged as f64).exp();
    corrected.min(u16::MAX as f64) as u16
}

/// Replace the low 7 bits of the envelope period (General Purpose 3)
#[inline]
pub fn merge_fine(period: u16, value: u8) -> u16 {
    (period & 0xFF80) | (value as u16 & 0x7F)
}

/// Replace a bit range of the envelope period
///
/// `keep` selects the bits that survive, `bits` is OR-ed in after masking
/// with `!keep`.
#[inline]
pub fn merge_bits(period: u16, keep: u16, bits: u16) -> u16 {
    (period & keep) | (bits & !keep)
}
