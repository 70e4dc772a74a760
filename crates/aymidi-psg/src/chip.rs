//! Stereo AY-3-8910 / YM2149 emulation
//!
//! The generators tick at the chip clock divided by 8. Each host sample is
//! built from [`DECIMATE_FACTOR`] sub-samples; a fractional accumulator decides
//! on which sub-samples the chip advances, and the sub-samples are averaged
//! down to one output value per side.

use crate::backend::{ChipMode, PanLaw, PsgBackend, NUM_CHANNELS};
use crate::dc_filter::DcRemover;
use crate::generators::{EnvelopeGenerator, NoiseGenerator, ToneGenerator};
use crate::tables::dac_table;
use crate::PsgError;

/// Sub-samples rendered per host sample
pub const DECIMATE_FACTOR: u32 = 8;

const DEFAULT_MASTER_CLOCK: u32 = 2_000_000;
const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Chip clock to generator tick divider
const CLOCK_DIVIDER: u32 = 8;

/// Register-level view of one channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelRegisters {
    /// Tone period as written (before 12-bit masking)
    pub tone_period: u16,
    /// Fixed amplitude (0-15)
    pub volume: u8,
    /// Envelope routed to this channel
    pub envelope_on: bool,
    /// Tone contributes to the output
    pub tone_enabled: bool,
    /// Noise contributes to the output
    pub noise_enabled: bool,
    /// Stereo position (0.0 = left, 1.0 = right)
    pub pan: f64,
    /// Curve used for `pan`
    pub pan_law: PanLaw,
}

impl Default for ChannelRegisters {
    fn default() -> Self {
        Self {
            tone_period: 0,
            volume: 0,
            envelope_on: false,
            tone_enabled: true,
            noise_enabled: false,
            pan: 0.5,
            pan_law: PanLaw::Linear,
        }
    }
}

#[derive(Clone, Debug)]
struct Voice {
    tone: ToneGenerator,
    regs: ChannelRegisters,
    gain_left: f64,
    gain_right: f64,
}

impl Voice {
    fn new() -> Self {
        let regs = ChannelRegisters::default();
        let (gain_left, gain_right) = regs.pan_law.gains(regs.pan);
        Self {
            tone: ToneGenerator::new(),
            regs,
            gain_left,
            gain_right,
        }
    }
}

/// Stereo PSG emulator
#[derive(Clone)]
pub struct Psg {
    mode: ChipMode,
    clock_hz: u32,
    sample_rate: u32,
    step: f64,
    phase: f64,

    voices: [Voice; NUM_CHANNELS],
    noise: NoiseGenerator,
    envelope: EnvelopeGenerator,
    noise_period: u8,
    envelope_period: u16,

    dc: DcRemover,
    config_error: Option<PsgError>,
    left: f64,
    right: f64,
}

impl Psg {
    /// Create a YM2149 at 2 MHz rendering at 44.1 kHz
    pub fn new() -> Self {
        Self::with_config(ChipMode::Ym, DEFAULT_MASTER_CLOCK, DEFAULT_SAMPLE_RATE)
    }

    /// Create a chip with a custom mode, clock and sample rate
    ///
    /// The configuration is applied even when it is out of range;
    /// [`Psg::config_error`] tells whether it is valid.
    pub fn with_config(mode: ChipMode, clock_hz: u32, sample_rate: u32) -> Self {
        let mut chip = Self {
            mode,
            clock_hz: DEFAULT_MASTER_CLOCK,
            sample_rate: DEFAULT_SAMPLE_RATE,
            step: 0.0,
            phase: 0.0,
            voices: [Voice::new(), Voice::new(), Voice::new()],
            noise: NoiseGenerator::new(),
            envelope: EnvelopeGenerator::new(),
            noise_period: 0,
            envelope_period: 0,
            dc: DcRemover::new(),
            config_error: None,
            left: 0.0,
            right: 0.0,
        };
        // The outcome is kept in `config_error`
        let _ = chip.configure(mode, clock_hz, sample_rate);
        chip
    }

    /// Why the last configuration is out of range, if it is
    ///
    /// Set by every [`PsgBackend::configure`] call, including the one made by
    /// [`Psg::with_config`].
    pub fn config_error(&self) -> Option<&PsgError> {
        self.config_error.as_ref()
    }

    fn apply_config(&mut self, mode: ChipMode, clock_hz: u32, sample_rate: u32) -> crate::Result<()> {
        self.mode = mode;
        if sample_rate == 0 {
            return Err(PsgError::ZeroSampleRate);
        }

        if sample_rate != self.sample_rate {
            // History recorded at another rate no longer describes the offset
            self.dc.clear();
        }
        self.clock_hz = clock_hz;
        self.sample_rate = sample_rate;
        self.step = Self::step_for(clock_hz, sample_rate);
        self.phase = 0.0;

        if self.step >= 1.0 {
            return Err(PsgError::ClockTooHigh {
                clock_hz,
                sample_rate,
                step: self.step,
            });
        }
        Ok(())
    }

    /// Chip ticks per sub-sample for a clock/sample-rate pair
    ///
    /// Values of 1.0 or more mean the decimator drops chip ticks.
    pub fn step_for(clock_hz: u32, sample_rate: u32) -> f64 {
        clock_hz as f64 / (sample_rate as f64 * CLOCK_DIVIDER as f64 * DECIMATE_FACTOR as f64)
    }

    /// Current DAC curve
    pub fn mode(&self) -> ChipMode {
        self.mode
    }

    /// Current chip clock in Hz
    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Current host sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Chip ticks per sub-sample
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Register view of a channel, `None` for an invalid index
    pub fn channel_registers(&self, channel: usize) -> Option<ChannelRegisters> {
        self.voices.get(channel).map(|voice| voice.regs)
    }

    /// Shared noise period as written
    pub fn noise_period(&self) -> u8 {
        self.noise_period
    }

    /// Shared envelope period as written
    pub fn envelope_period(&self) -> u16 {
        self.envelope_period
    }

    /// Envelope shape (0-15)
    pub fn envelope_shape(&self) -> u8 {
        self.envelope.shape()
    }

    /// Advance all generators by one chip tick
    #[inline]
    fn tick(&mut self) {
        for voice in self.voices.iter_mut() {
            voice.tone.tick();
        }
        self.noise.tick();
        self.envelope.tick();
    }

    /// Mix the current generator outputs into a stereo pair
    #[inline]
    fn mix(&self) -> (f64, f64) {
        let dac = dac_table(self.mode);
        let noise = self.noise.output();
        let envelope = self.envelope.level();

        let mut left = 0.0;
        let mut right = 0.0;
        for voice in &self.voices {
            let tone_off = u32::from(!voice.regs.tone_enabled);
            let noise_off = u32::from(!voice.regs.noise_enabled);
            if (voice.tone.output() | tone_off) & (noise | noise_off) == 0 {
                continue;
            }
            let index = if voice.regs.envelope_on {
                envelope
            } else {
                voice.regs.volume as usize * 2 + 1
            };
            let level = dac[index];
            left += level * voice.gain_left;
            right += level * voice.gain_right;
        }
        (left, right)
    }
}

impl Default for Psg {
    fn default() -> Self {
        Self::new()
    }
}

impl PsgBackend for Psg {
    fn configure(&mut self, mode: ChipMode, clock_hz: u32, sample_rate: u32) -> crate::Result<()> {
        let result = self.apply_config(mode, clock_hz, sample_rate);
        self.config_error = result.clone().err();
        result
    }

    fn set_tone_period(&mut self, channel: usize, period: u16) {
        if let Some(voice) = self.voices.get_mut(channel) {
            voice.regs.tone_period = period;
            voice.tone.set_period(period);
        }
    }

    fn set_mixer(&mut self, channel: usize, tone_enabled: bool, noise_enabled: bool) {
        if let Some(voice) = self.voices.get_mut(channel) {
            voice.regs.tone_enabled = tone_enabled;
            voice.regs.noise_enabled = noise_enabled;
        }
    }

    fn set_volume(&mut self, channel: usize, volume: u8) {
        if let Some(voice) = self.voices.get_mut(channel) {
            voice.regs.volume = volume & 0x0f;
        }
    }

    fn set_envelope_on(&mut self, channel: usize, enabled: bool) {
        if let Some(voice) = self.voices.get_mut(channel) {
            voice.regs.envelope_on = enabled;
        }
    }

    fn set_pan(&mut self, channel: usize, pan: f64, law: PanLaw) {
        if let Some(voice) = self.voices.get_mut(channel) {
            voice.regs.pan = pan;
            voice.regs.pan_law = law;
            (voice.gain_left, voice.gain_right) = law.gains(pan);
        }
    }

    fn set_noise_period(&mut self, period: u8) {
        self.noise_period = period;
        self.noise.set_period(period);
    }

    fn set_envelope_period(&mut self, period: u16) {
        self.envelope_period = period;
        self.envelope.set_period(period);
    }

    fn set_envelope_shape(&mut self, shape: u8) {
        self.envelope.set_shape(shape);
    }

    fn process(&mut self) -> (f64, f64) {
        let mut left = 0.0;
        let mut right = 0.0;
        for _ in 0..DECIMATE_FACTOR {
            self.phase += self.step;
            if self.phase >= 1.0 {
                // At most one tick per sub-sample; surplus ticks are dropped
                self.phase = self.phase.fract();
                self.tick();
            }
            let (l, r) = self.mix();
            left += l;
            right += r;
        }
        self.left = left / DECIMATE_FACTOR as f64;
        self.right = right / DECIMATE_FACTOR as f64;
        (self.left, self.right)
    }

    fn remove_dc(&mut self) -> (f64, f64) {
        (self.left, self.right) = self.dc.process(self.left, self.right);
        (self.left, self.right)
    }

    fn last_output(&self) -> (f64, f64) {
        (self.left, self.right)
    }
}

impl std::fmt::Debug for Psg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Psg")
            .field("mode", &self.mode)
            .field("clock_hz", &self.clock_hz)
            .field("sample_rate", &self.sample_rate)
            .field("step", &self.step)
            .field("config_error", &self.config_error)
            .field("noise_period", &self.noise_period)
            .field("envelope_period", &self.envelope_period)
            .finish_non_exhaustive()
    }
}
