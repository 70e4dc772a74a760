//! AY-3-8910 / YM2149 Programmable Sound Generator core
//!
//! A small stereo emulation of the General Instrument AY-3-8910 and its Yamaha
//! YM2149 clone, built to be driven at the register level by a synthesizer
//! engine rather than by a CPU writing ports.
//!
//! # Features
//! - 3 square-wave tone channels, shared noise LFSR and envelope generator
//! - AY (16-level) and YM (32-level) DAC curves, switchable at runtime
//! - Per-channel stereo panning with linear or equal-power law
//! - 8x oversampling with box decimation down to the host sample rate
//! - Optional DC offset removal
//!
//! # Backend Trait
//! The [`PsgBackend`] trait is the whole contract a synthesizer engine needs.
//! [`Psg`] is the reference implementation; alternative chips can be swapped in.
//!
//! # Quick start
//! ```
//! use aymidi_psg::{ChipMode, PanLaw, Psg, PsgBackend};
//!
//! let mut psg = Psg::new();
//! psg.configure(ChipMode::Ym, 2_000_000, 44_100).unwrap();
//! psg.set_mixer(0, true, false);
//! psg.set_tone_period(0, 284); // ~440 Hz at 2 MHz
//! psg.set_volume(0, 15);
//! psg.set_pan(0, 0.5, PanLaw::Linear);
//! let (left, right) = psg.process();
//! assert!(left >= 0.0 && right >= 0.0);
//! ```

#![warn(missing_docs)]

pub mod backend;
pub mod chip;
pub mod dc_filter;
pub mod generators;
pub mod tables;

/// Error types for PSG configuration
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PsgError {
    /// The clock is too fast for the sample rate: the decimator would skip chip ticks.
    #[error("clock {clock_hz} Hz is too high for sample rate {sample_rate} Hz (step {step:.3} >= 1)")]
    ClockTooHigh {
        /// Requested chip clock in Hz
        clock_hz: u32,
        /// Host sample rate in Hz
        sample_rate: u32,
        /// Resulting chip ticks per oversampled sub-sample
        step: f64,
    },

    /// A zero sample rate cannot drive the decimator at all.
    #[error("sample rate must be non-zero")]
    ZeroSampleRate,
}

/// Result type for PSG operations
pub type Result<T> = std::result::Result<T, PsgError>;

// Public API exports
pub use backend::{ChipMode, PanLaw, PsgBackend, NUM_CHANNELS};
pub use chip::{ChannelRegisters, Psg};
