//! Synthesizer engine
//!
//! [`Synth`] owns the chip and the mirrored state the chip registers cannot
//! hold (notes, velocities, bend, vibrato, controller volume). Every operation
//! is total: out-of-range channels are ignored, nothing allocates, nothing
//! blocks, so the whole type is safe to drive from an audio callback.

use aymidi_psg::{ChipMode, PanLaw, PsgBackend, PsgError, NUM_CHANNELS};
use tracing::{debug, warn};

use crate::channel::{Channel, RESET_VOLUME};
use crate::config::SynthConfig;
use crate::controller::ControllerAction;
use crate::envelope::{self, EnvelopeShape};
use crate::event::AtomValue;
use crate::pitch;
use crate::property::PropertyKey;

/// Clock values up to this are taken as MHz
const MHZ_THRESHOLD: f64 = 100.0;

/// Values a reset restores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetDefaults {
    /// Channel volume (0-15)
    pub volume: u8,
    /// Shared envelope period
    pub envelope_period: u16,
}

impl ResetDefaults {
    /// Expressive and velocity protocols
    pub const STANDARD: Self = Self {
        volume: RESET_VOLUME,
        envelope_period: 0,
    };

    /// Legacy protocol: full volume and a slow envelope
    pub const LEGACY: Self = Self {
        volume: 15,
        envelope_period: 0x40,
    };
}

/// Three-voice synthesizer on top of a [`PsgBackend`]
#[derive(Debug)]
pub struct Synth<B: PsgBackend> {
    chip: B,
    clock_hz: u32,
    sample_rate: u32,
    mode: ChipMode,
    remove_dc: bool,
    configure_error: Option<PsgError>,

    noise_period: u8,
    envelope_period: u16,
    envelope_shape: EnvelopeShape,
    sample_counter: u32,
    channels: [Channel; NUM_CHANNELS],
}

impl<B: PsgBackend> Synth<B> {
    /// Configure the chip and reset every channel
    ///
    /// A clock that is too fast for the sample rate is logged and kept; see
    /// [`Synth::configure_error`].
    pub fn new(chip: B, config: &SynthConfig) -> Self {
        let mut synth = Self {
            chip,
            clock_hz: config.clock_hz,
            sample_rate: config.sample_rate,
            mode: config.mode,
            remove_dc: config.remove_dc,
            configure_error: None,
            noise_period: 0,
            envelope_period: 0,
            envelope_shape: EnvelopeShape::empty(),
            sample_counter: 0,
            channels: [Channel::default(); NUM_CHANNELS],
        };
        if let Err(err) = synth.reconfigure() {
            warn!("The sample rate is too low for the clock source: {err}");
        }
        synth.reset(ResetDefaults::STANDARD);
        synth
    }

    /// The chip
    pub fn chip(&self) -> &B {
        &self.chip
    }

    /// State of one channel
    pub fn channel(&self, channel: usize) -> Option<&Channel> {
        self.channels.get(channel)
    }

    /// State of all channels
    pub fn channels(&self) -> &[Channel; NUM_CHANNELS] {
        &self.channels
    }

    /// Chip clock in Hz
    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Host sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// DAC curve
    pub fn mode(&self) -> ChipMode {
        self.mode
    }

    /// Whether the DC remover runs after every sample
    pub fn remove_dc(&self) -> bool {
        self.remove_dc
    }

    /// Why the last chip configuration was rejected, if it was
    pub fn configure_error(&self) -> Option<&PsgError> {
        self.configure_error.as_ref()
    }

    /// Shared noise period
    pub fn noise_period(&self) -> u8 {
        self.noise_period
    }

    /// Shared envelope period
    pub fn envelope_period(&self) -> u16 {
        self.envelope_period
    }

    /// Envelope shape
    pub fn envelope_shape(&self) -> EnvelopeShape {
        self.envelope_shape
    }

    /// Samples rendered so far (wraps)
    pub fn sample_counter(&self) -> u32 {
        self.sample_counter
    }

    // ------------------------------------------------------------------
    // Notes
    // ------------------------------------------------------------------

    /// Start a note, retriggering whatever was playing
    ///
    /// Re-writes the envelope shape, which restarts the envelope.
    pub fn note_on(&mut self, channel: usize, note: u8, velocity: u8) {
        let Some(state) = self.channels.get_mut(channel) else {
            return;
        };
        state.note = Some(note);
        state.velocity = velocity;
        let level = state.level();
        let envelope_on = state.envelope_on;

        self.chip.set_volume(channel, level);
        self.chip.set_envelope_on(channel, envelope_on);
        self.chip.set_envelope_shape(self.envelope_shape.register());
        self.update_tone(channel);
    }

    /// Stop a note; ignored unless `note` is the one playing
    pub fn note_off(&mut self, channel: usize, note: u8) {
        if self.channels.get(channel).and_then(|state| state.note) == Some(note) {
            self.silence(channel);
        }
    }

    /// Stop whatever note is playing
    pub fn all_notes_off(&mut self, channel: usize) {
        if self.channels.get(channel).is_some_and(Channel::is_sounding) {
            self.silence(channel);
        }
    }

    /// Select a timbre: mixer and envelope routing from the program number
    ///
    /// Bit 0 set disables tone; `program & 3` of 1 or 2 enables noise;
    /// programs above 3 use the envelope. The channel is silenced.
    pub fn program_change(&mut self, channel: usize, program: u8) {
        let Some(state) = self.channels.get_mut(channel) else {
            return;
        };
        state.envelope_on = program > 3;
        self.silence(channel);
        self.set_mixer(channel, program & 1 == 0, matches!(program & 3, 1 | 2));
    }

    /// Set mixer flags and envelope routing without touching the note
    ///
    /// The envelope flag only reaches the chip while a note is sounding.
    pub fn set_timbre(&mut self, channel: usize, tone: bool, noise: bool, envelope_on: bool) {
        let Some(state) = self.channels.get_mut(channel) else {
            return;
        };
        state.envelope_on = envelope_on;
        let sounding = state.is_sounding();
        self.set_mixer(channel, tone, noise);
        if sounding {
            self.chip.set_envelope_on(channel, envelope_on);
        }
    }

    /// Set a channel's mixer flags
    pub fn set_mixer(&mut self, channel: usize, tone: bool, noise: bool) {
        let Some(state) = self.channels.get_mut(channel) else {
            return;
        };
        state.tone_enabled = tone;
        state.noise_enabled = noise;
        self.chip.set_mixer(channel, tone, noise);
    }

    /// Reset the shared registers and every channel
    pub fn reset(&mut self, defaults: ResetDefaults) {
        self.noise_period = 0;
        self.envelope_period = defaults.envelope_period;
        self.envelope_shape = EnvelopeShape::empty();
        self.chip.set_envelope_period(self.envelope_period);
        self.chip.set_envelope_shape(self.envelope_shape.register());
        self.chip.set_noise_period(self.noise_period);

        for channel in 0..NUM_CHANNELS {
            self.channels[channel].reset(defaults.volume);
            self.chip.set_volume(channel, 0);
            self.chip.set_envelope_on(channel, false);
            self.chip.set_mixer(channel, true, false);
            self.chip.set_pan(channel, 0.5, PanLaw::Linear);
        }
    }

    /// Silence every channel, center the pans and set the envelope period
    ///
    /// Channel volumes, mixer flags, noise period and envelope shape survive.
    pub fn reinitialize(&mut self, envelope_period: u16) {
        for channel in 0..NUM_CHANNELS {
            self.silence(channel);
            self.set_pan(channel, 0.5, PanLaw::Linear);
        }
        self.set_envelope_period(envelope_period);
    }

    fn silence(&mut self, channel: usize) {
        if let Some(state) = self.channels.get_mut(channel) {
            state.note = None;
            self.chip.set_volume(channel, 0);
            self.chip.set_envelope_on(channel, false);
        }
    }

    // ------------------------------------------------------------------
    // Pitch
    // ------------------------------------------------------------------

    /// Recompute and push the tone period of a sounding channel
    fn update_tone(&mut self, channel: usize) {
        let Some(state) = self.channels.get_mut(channel) else {
            return;
        };
        let Some(note) = state.note else {
            return;
        };
        let vibrato = pitch::modulation_offset(state.modulation_depth, self.sample_counter);
        let semitone = note as f64 + state.bend_semitones + vibrato;
        state.tone_period = pitch::note_to_period(self.clock_hz, semitone);
        self.chip.set_tone_period(channel, state.tone_period);
    }

    /// Store a pitch bend and retune
    pub fn set_pitch_bend(&mut self, channel: usize, semitones: f64) {
        if let Some(state) = self.channels.get_mut(channel) {
            state.bend_semitones = semitones;
            self.update_tone(channel);
        }
    }

    /// Retune a sounding note by `semitones` without storing the bend
    ///
    /// The next note starts unbent.
    pub fn bend_sounding_note(&mut self, channel: usize, semitones: f64) {
        let Some(state) = self.channels.get_mut(channel) else {
            return;
        };
        if let Some(note) = state.note {
            state.tone_period = pitch::note_to_period(self.clock_hz, note as f64 + semitones);
            self.chip.set_tone_period(channel, state.tone_period);
        }
    }

    /// Set vibrato depth in semitones and retune
    pub fn set_modulation(&mut self, channel: usize, depth: f64) {
        if let Some(state) = self.channels.get_mut(channel) {
            state.modulation_depth = depth;
            self.update_tone(channel);
        }
    }

    /// Re-push the plain note pitch and the level of a sounding note
    ///
    /// Stored bend and vibrato depth are kept.
    pub fn reset_controllers(&mut self, channel: usize) {
        let Some(state) = self.channels.get_mut(channel) else {
            return;
        };
        let Some(note) = state.note else {
            return;
        };
        state.tone_period = pitch::note_to_period(self.clock_hz, note as f64);
        let level = state.level();
        let envelope_on = state.envelope_on;
        self.chip.set_tone_period(channel, state.tone_period);
        self.chip.set_volume(channel, level);
        self.chip.set_envelope_on(channel, envelope_on);
    }

    // ------------------------------------------------------------------
    // Levels and routing
    // ------------------------------------------------------------------

    /// Set channel volume (0-15); a sounding note picks it up at once
    pub fn set_volume(&mut self, channel: usize, volume: u8) {
        let Some(state) = self.channels.get_mut(channel) else {
            return;
        };
        state.volume = volume.min(15);
        if state.is_sounding() {
            let level = state.level();
            self.chip.set_volume(channel, level);
        }
    }

    /// Route the envelope to a channel; a sounding note picks it up at once
    pub fn set_envelope_enabled(&mut self, channel: usize, enabled: bool) {
        let Some(state) = self.channels.get_mut(channel) else {
            return;
        };
        state.envelope_on = enabled;
        if state.is_sounding() {
            self.chip.set_envelope_on(channel, enabled);
        }
    }

    /// Set stereo position
    pub fn set_pan(&mut self, channel: usize, pan: f64, law: PanLaw) {
        let Some(state) = self.channels.get_mut(channel) else {
            return;
        };
        state.pan = pan.clamp(0.0, 1.0);
        state.pan_law = law;
        self.chip.set_pan(channel, state.pan, law);
    }

    // ------------------------------------------------------------------
    // Shared registers
    // ------------------------------------------------------------------

    /// Set the shared noise period
    pub fn set_noise_period(&mut self, period: u8) {
        self.noise_period = period;
        self.chip.set_noise_period(period);
    }

    /// Set the shared envelope period
    pub fn set_envelope_period(&mut self, period: u16) {
        self.envelope_period = period;
        self.chip.set_envelope_period(period);
    }

    /// Set the envelope shape (restarts the envelope)
    pub fn set_envelope_shape(&mut self, shape: EnvelopeShape) {
        self.envelope_shape = shape;
        self.chip.set_envelope_shape(shape.register());
    }

    /// Set or clear one envelope shape bit (restarts the envelope)
    pub fn set_envelope_flag(&mut self, flag: EnvelopeShape, on: bool) {
        let mut shape = self.envelope_shape;
        shape.set(flag, on);
        self.set_envelope_shape(shape);
    }

    // ------------------------------------------------------------------
    // Chip configuration
    // ------------------------------------------------------------------

    fn reconfigure(&mut self) -> aymidi_psg::Result<()> {
        debug!(
            mode = %self.mode,
            clock_hz = self.clock_hz,
            sample_rate = self.sample_rate,
            "configuring chip"
        );
        let result = self.chip.configure(self.mode, self.clock_hz, self.sample_rate);
        self.configure_error = result.clone().err();
        result
    }

    fn retune(&mut self) {
        for channel in 0..NUM_CHANNELS {
            self.update_tone(channel);
        }
    }

    /// Change the chip clock and retune sounding notes
    ///
    /// On error the clock is still applied.
    pub fn set_clock(&mut self, clock_hz: u32) -> aymidi_psg::Result<()> {
        self.clock_hz = clock_hz;
        let result = self.reconfigure();
        self.retune();
        result
    }

    /// Change the DAC curve
    pub fn set_mode(&mut self, mode: ChipMode) -> aymidi_psg::Result<()> {
        self.mode = mode;
        let result = self.reconfigure();
        self.retune();
        result
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Carry out a controller action on a channel
    ///
    /// Global actions ignore `channel`.
    pub fn apply_controller(&mut self, channel: usize, action: ControllerAction) {
        match action {
            ControllerAction::ResetControllers => self.reset_controllers(channel),
            ControllerAction::AllNotesOff => self.all_notes_off(channel),
            ControllerAction::Modulation(depth) => self.set_modulation(channel, depth),
            ControllerAction::Pan { pan, law } => self.set_pan(channel, pan, law),
            ControllerAction::Volume(volume) => self.set_volume(channel, volume),
            ControllerAction::EnvelopeEnable(on) => self.set_envelope_enabled(channel, on),
            ControllerAction::NoisePeriod(period) => self.set_noise_period(period),
            ControllerAction::EnvelopeCoarse(value) => {
                self.set_envelope_period(envelope::merge_coarse(self.envelope_period, value))
            }
            ControllerAction::EnvelopeFine(value) => {
                self.set_envelope_period(envelope::merge_fine(self.envelope_period, value))
            }
            ControllerAction::EnvelopePeriodBits { keep, bits } => {
                self.set_envelope_period(envelope::merge_bits(self.envelope_period, keep, bits))
            }
            ControllerAction::EnvelopeShape(shape) => self.set_envelope_shape(shape),
            ControllerAction::EnvelopeFlag { flag, on } => self.set_envelope_flag(flag, on),
            ControllerAction::ChipMode(mode) => {
                if let Err(err) = self.set_mode(mode) {
                    warn!("The sample rate is too low for the clock source: {err}");
                }
            }
        }
    }

    /// Apply an out-of-band property write
    ///
    /// Per-channel writes go straight to the chip whether or not a note is
    /// sounding. Values of the wrong type are ignored.
    pub fn set_property(&mut self, key: PropertyKey, value: AtomValue) {
        match key {
            PropertyKey::Clock => {
                let Some(clock) = value.as_f64().filter(|clock| clock.is_finite() && *clock > 0.0) else {
                    return;
                };
                let clock_hz = if clock <= MHZ_THRESHOLD { clock * 1e6 } else { clock };
                if let Err(err) = self.set_clock(clock_hz as u32) {
                    warn!("The sample rate is too low for the clock source: {err}");
                }
            }
            PropertyKey::YmMode => {
                if let Some(ym) = value.as_bool() {
                    if let Err(err) = self.set_mode(ChipMode::from_ym_flag(ym)) {
                        warn!("The sample rate is too low for the clock source: {err}");
                    }
                }
            }
            PropertyKey::NoisePeriod => {
                if let Some(period) = value.as_i64() {
                    self.set_noise_period(period.clamp(0, u8::MAX as i64) as u8);
                }
            }
            PropertyKey::EnvelopePeriod => {
                if let Some(period) = value.as_i64() {
                    self.set_envelope_period(period.clamp(0, u16::MAX as i64) as u16);
                }
            }
            PropertyKey::EnvelopeHold => self.set_flag_property(EnvelopeShape::HOLD, value),
            PropertyKey::EnvelopeAlternate => self.set_flag_property(EnvelopeShape::ALTERNATE, value),
            PropertyKey::EnvelopeAttack => self.set_flag_property(EnvelopeShape::ATTACK, value),
            PropertyKey::EnvelopeContinue => self.set_flag_property(EnvelopeShape::CONTINUE, value),
            PropertyKey::TonePeriod(channel) => {
                if let (Some(state), Some(period)) = (self.channels.get_mut(channel), value.as_i64()) {
                    state.tone_period = period.clamp(0, u16::MAX as i64) as u16;
                    self.chip.set_tone_period(channel, state.tone_period);
                }
            }
            PropertyKey::Level(channel) => {
                if let (Some(state), Some(level)) = (self.channels.get_mut(channel), value.as_i64()) {
                    state.volume = level.clamp(0, 15) as u8;
                    self.chip.set_volume(channel, state.volume);
                }
            }
            PropertyKey::Envelope(channel) => {
                if let (Some(state), Some(on)) = (self.channels.get_mut(channel), value.as_bool()) {
                    state.envelope_on = on;
                    self.chip.set_envelope_on(channel, on);
                }
            }
            PropertyKey::Tone(channel) => {
                if let (Some(state), Some(on)) = (self.channels.get(channel), value.as_bool()) {
                    let noise = state.noise_enabled;
                    self.set_mixer(channel, on, noise);
                }
            }
            PropertyKey::Noise(channel) => {
                if let (Some(state), Some(on)) = (self.channels.get(channel), value.as_bool()) {
                    let tone = state.tone_enabled;
                    self.set_mixer(channel, tone, on);
                }
            }
            PropertyKey::Pan(channel) => {
                if let (Some(state), Some(pan)) = (self.channels.get(channel), value.as_f64()) {
                    let law = state.pan_law;
                    self.set_pan(channel, pan, law);
                }
            }
        }
    }

    fn set_flag_property(&mut self, flag: EnvelopeShape, value: AtomValue) {
        if let Some(on) = value.as_bool() {
            self.set_envelope_flag(flag, on);
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Render one stereo sample
    ///
    /// Advances the sample counter and recomputes the pitch of every
    /// modulated channel before the chip runs.
    #[inline]
    pub fn render_sample(&mut self) -> (f32, f32) {
        self.sample_counter = self.sample_counter.wrapping_add(1);
        for channel in 0..NUM_CHANNELS {
            if self.channels[channel].is_modulated() {
                self.update_tone(channel);
            }
        }

        let (mut left, mut right) = self.chip.process();
        if self.remove_dc {
            (left, right) = self.chip.remove_dc();
        }
        (left as f32, right as f32)
    }
}
