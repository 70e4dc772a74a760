//! Backend trait abstraction for PSG chip implementations
//!
//! This module defines the interface a synthesizer engine drives. It only
//! exposes semantic setters; engines never poke at a chip's internal layout.

/// Number of tone channels on the chip
pub const NUM_CHANNELS: usize = 3;

/// DAC curve selection
///
/// The AY-3-8910 has a 16-step volume DAC, the YM2149 a 32-step one. The
/// envelope generator runs through 32 steps on both, so on AY every pair of
/// envelope steps shares one output level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChipMode {
    /// General Instrument AY-3-8910
    Ay,
    /// Yamaha YM2149
    #[default]
    Ym,
}

impl ChipMode {
    /// Map the boolean "YM mode" flag used by hosts to a chip mode.
    pub fn from_ym_flag(ym: bool) -> Self {
        if ym {
            ChipMode::Ym
        } else {
            ChipMode::Ay
        }
    }

    /// Whether this is the YM2149 curve
    pub fn is_ym(self) -> bool {
        self == ChipMode::Ym
    }

    /// Short lowercase name ("ay" or "ym")
    pub fn as_str(&self) -> &'static str {
        match self {
            ChipMode::Ay => "ay",
            ChipMode::Ym => "ym",
        }
    }
}

impl std::fmt::Display for ChipMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stereo panning curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanLaw {
    /// `left = 1 - pan`, `right = pan`
    #[default]
    Linear,
    /// `left = sqrt(1 - pan)`, `right = sqrt(pan)`; constant power across the field
    EqualPower,
}

impl PanLaw {
    /// Left/right gains for a pan position in `0.0..=1.0` (clamped).
    pub fn gains(self, pan: f64) -> (f64, f64) {
        let pan = pan.clamp(0.0, 1.0);
        match self {
            PanLaw::Linear => (1.0 - pan, pan),
            PanLaw::EqualPower => ((1.0 - pan).sqrt(), pan.sqrt()),
        }
    }
}

/// Common interface for PSG chip backends
///
/// All calls are synchronous, never block and never allocate, so they are safe
/// to use from a real-time audio callback. Channel-scoped setters ignore
/// channel indices outside `0..NUM_CHANNELS`.
///
/// # Example
///
/// ```
/// use aymidi_psg::{ChipMode, Psg, PsgBackend};
///
/// fn beep<B: PsgBackend>(chip: &mut B) -> (f64, f64) {
///     chip.set_mixer(0, true, false);
///     chip.set_tone_period(0, 284);
///     chip.set_volume(0, 15);
///     chip.process()
/// }
///
/// let mut psg = Psg::with_config(ChipMode::Ay, 2_000_000, 48_000);
/// let _ = beep(&mut psg);
/// ```
pub trait PsgBackend: Send {
    /// (Re)configure DAC curve, chip clock and host sample rate.
    ///
    /// Register state (periods, volumes, mixer, pan, envelope) is preserved.
    /// When the clock is too high for the sample rate an error is returned,
    /// but the configuration is applied anyway and the chip keeps running
    /// with degraded output.
    fn configure(&mut self, mode: ChipMode, clock_hz: u32, sample_rate: u32) -> crate::Result<()>;

    /// Set a channel's tone period in chip clock units (12-bit, 0 behaves as 1)
    fn set_tone_period(&mut self, channel: usize, period: u16);

    /// Enable or disable tone and noise contribution for a channel
    fn set_mixer(&mut self, channel: usize, tone_enabled: bool, noise_enabled: bool);

    /// Set a channel's fixed amplitude (0-15)
    fn set_volume(&mut self, channel: usize, volume: u8);

    /// Route the envelope generator to a channel instead of its fixed amplitude
    fn set_envelope_on(&mut self, channel: usize, enabled: bool);

    /// Set a channel's stereo position (`0.0` = left, `1.0` = right)
    fn set_pan(&mut self, channel: usize, pan: f64, law: PanLaw);

    /// Set the shared noise period (5-bit, 0 behaves as 1)
    fn set_noise_period(&mut self, period: u8);

    /// Set the shared envelope period (16-bit, 0 behaves as 1)
    fn set_envelope_period(&mut self, period: u16);

    /// Set the envelope shape (4-bit)
    ///
    /// Always restarts the envelope from its first step, even when the
    /// shape is unchanged.
    fn set_envelope_shape(&mut self, shape: u8);

    /// Render one stereo sample at the configured host sample rate
    fn process(&mut self) -> (f64, f64);

    /// Remove DC offset from the last rendered sample
    ///
    /// Returns the filtered pair; subsequent [`PsgBackend::last_output`] calls
    /// observe the filtered values. Default implementation is a no-op.
    fn remove_dc(&mut self) -> (f64, f64) {
        self.last_output()
    }

    /// The last rendered (and possibly DC-filtered) stereo sample
    fn last_output(&self) -> (f64, f64);
}
