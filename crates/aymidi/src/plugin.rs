//! Plugin instance and sample-accurate block rendering
//!
//! [`AyMidi`] is what a host talks to: it is instantiated once with a
//! configuration and the host's features, activated, fed one block at a time
//! through [`AyMidi::run`] and eventually deactivated.
//!
//! # Example
//!
//! ```
//! use aymidi::{AyMidi, HostFeatures, SimpleUridMap, SynthConfig, TimedEvent};
//!
//! let mut urids = SimpleUridMap::new();
//! let mut plugin = AyMidi::instantiate(
//!     &SynthConfig::default(),
//!     HostFeatures::with_urid_map(&mut urids),
//! )
//! .unwrap();
//! plugin.activate();
//!
//! let events = [
//!     TimedEvent::midi(0, &[0x90, 69, 127]).unwrap(),
//!     TimedEvent::midi(48, &[0x80, 69, 0]).unwrap(),
//! ];
//! let mut left = [0.0f32; 64];
//! let mut right = [0.0f32; 64];
//! plugin.run(&events, &mut left, &mut right);
//! ```

use aymidi_psg::{Psg, PsgBackend, NUM_CHANNELS};
use midly::live::{LiveEvent, SystemRealtime};
use tracing::{debug, trace};

use crate::config::SynthConfig;
use crate::error::{AymidiError, Result};
use crate::event::{EventBody, MidiBytes, TimedEvent};
use crate::host::HostFeatures;
use crate::property::PropertyMap;
use crate::protocol::MidiProtocol;
use crate::synth::Synth;

/// One synthesizer instance
pub struct AyMidi<B: PsgBackend = Psg> {
    synth: Synth<B>,
    protocol: Box<dyn MidiProtocol<B>>,
    properties: PropertyMap,
    active: bool,
}

impl AyMidi<Psg> {
    /// Create an instance on the built-in chip emulator
    pub fn instantiate(config: &SynthConfig, features: HostFeatures<'_>) -> Result<Self> {
        Self::with_backend(Psg::new(), config, features)
    }
}

impl<B: PsgBackend> AyMidi<B> {
    /// Create an instance on any chip backend
    ///
    /// Fails when the configuration is unusable or the host offers no URID
    /// map. A clock that is too fast for the sample rate only logs a warning.
    pub fn with_backend(chip: B, config: &SynthConfig, features: HostFeatures<'_>) -> Result<Self> {
        config.validate()?;
        let urid_map = features
            .urid_map
            .ok_or(AymidiError::MissingFeature { feature: "urid:map" })?;
        let properties = PropertyMap::new(urid_map);

        let mut protocol = config.protocol.create::<B>();
        debug!(protocol = %config.protocol, "selected MIDI protocol");

        let mut synth = Synth::new(chip, config);
        protocol.reset(&mut synth);

        Ok(Self {
            synth,
            protocol,
            properties,
            active: false,
        })
    }

    /// Start processing
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Stop processing; later blocks render silence
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Whether [`AyMidi::activate`] has been called more recently than
    /// [`AyMidi::deactivate`]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The engine
    pub fn synth(&self) -> &Synth<B> {
        &self.synth
    }

    /// The engine, mutably
    pub fn synth_mut(&mut self) -> &mut Synth<B> {
        &mut self.synth
    }

    /// Property URIDs resolved at instantiation
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// Render one block
    ///
    /// The block length is the shorter of the two buffers. Audio up to each
    /// event's frame is rendered before the event is applied, so sample `i`
    /// reflects exactly the events at frames `<= i`. Frames past the end of
    /// the block are applied at the end; a frame earlier than one already
    /// rendered is applied immediately.
    pub fn run(&mut self, events: &[TimedEvent], left: &mut [f32], right: &mut [f32]) {
        let frames = left.len().min(right.len());
        if !self.active {
            left.fill(0.0);
            right.fill(0.0);
            return;
        }

        let mut cursor = 0;
        for event in events {
            let offset = (event.frame as usize).min(frames);
            if offset > cursor {
                self.render(&mut left[cursor..offset], &mut right[cursor..offset]);
                cursor = offset;
            }
            self.handle_event(&event.body);
        }
        self.render(&mut left[cursor..frames], &mut right[cursor..frames]);
    }

    fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.synth.render_sample();
        }
    }

    /// Apply one event immediately
    pub fn handle_event(&mut self, body: &EventBody) {
        match *body {
            EventBody::Midi(bytes) => self.handle_midi(bytes),
            EventBody::PatchSet { property, value } => match self.properties.lookup(property) {
                Some(key) => self.synth.set_property(key, value),
                None => trace!(property = property.0, "unknown property"),
            },
        }
    }

    fn handle_midi(&mut self, bytes: MidiBytes) {
        match LiveEvent::parse(bytes.as_slice()) {
            Ok(LiveEvent::Midi { channel, message }) => {
                let channel = channel.as_int() as usize;
                if channel >= NUM_CHANNELS {
                    trace!(channel, "message for unused channel");
                    return;
                }
                self.protocol.channel_message(&mut self.synth, channel, message);
            }
            Ok(LiveEvent::Realtime(SystemRealtime::Reset)) => self.protocol.reset(&mut self.synth),
            Ok(other) => trace!(?other, "ignored MIDI event"),
            Err(err) => trace!(%err, bytes = ?bytes.as_slice(), "malformed MIDI event"),
        }
    }
}

impl<B: PsgBackend + std::fmt::Debug> std::fmt::Debug for AyMidi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AyMidi")
            .field("protocol", &self.protocol.variant())
            .field("active", &self.active)
            .field("synth", &self.synth)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::AtomValue;
    use crate::host::{SimpleUridMap, UridMap};
    use crate::property::PropertyKey;
    use crate::protocol::ProtocolVariant;

    fn plugin(config: &SynthConfig) -> AyMidi {
        let mut urids = SimpleUridMap::new();
        let mut plugin = AyMidi::instantiate(config, HostFeatures::with_urid_map(&mut urids)).unwrap();
        plugin.activate();
        plugin
    }

    fn quiet_config() -> SynthConfig {
        SynthConfig {
            remove_dc: false,
            ..SynthConfig::default()
        }
    }

    #[test]
    fn test_missing_urid_map_fails() {
        let result = AyMidi::instantiate(&SynthConfig::default(), HostFeatures::default());
        assert!(matches!(
            result,
            Err(AymidiError::MissingFeature { feature: "urid:map" })
        ));
    }

    #[test]
    fn test_invalid_config_fails() {
        let mut urids = SimpleUridMap::new();
        let result = AyMidi::instantiate(
            &SynthConfig::with_sample_rate(0),
            HostFeatures::with_urid_map(&mut urids),
        );
        assert!(matches!(result, Err(AymidiError::Config { .. })));
    }

    #[test]
    fn test_clock_too_high_still_instantiates() {
        let config = SynthConfig {
            clock_hz: 4_000_000,
            sample_rate: 22_050,
            ..SynthConfig::default()
        };
        let plugin = plugin(&config);
        assert!(plugin.synth().configure_error().is_some());
    }

    #[test]
    fn test_inactive_run_writes_silence() {
        let mut plugin = plugin(&quiet_config());
        plugin.deactivate();
        let mut left = [1.0f32; 16];
        let mut right = [1.0f32; 16];
        plugin.run(&[], &mut left, &mut right);
        assert!(left.iter().chain(right.iter()).all(|s| *s == 0.0));
        assert_eq!(plugin.synth().sample_counter(), 0);
    }

    #[test]
    fn test_run_renders_every_frame() {
        let mut plugin = plugin(&quiet_config());
        let mut left = [f32::NAN; 100];
        let mut right = [f32::NAN; 100];
        plugin.run(&[], &mut left, &mut right);
        assert_eq!(plugin.synth().sample_counter(), 100);
        assert!(left.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_channels_above_two_are_ignored() {
        let mut plugin = plugin(&quiet_config());
        let events = [TimedEvent::midi(0, &[0x93, 60, 127]).unwrap()];
        let mut left = [0.0f32; 8];
        let mut right = [0.0f32; 8];
        plugin.run(&events, &mut left, &mut right);
        assert!(plugin.synth().channels().iter().all(|c| c.note.is_none()));
    }

    #[test]
    fn test_system_reset_message() {
        let mut plugin = plugin(&quiet_config());
        plugin.handle_event(&EventBody::Midi(MidiBytes::new(&[0x90, 60, 127]).unwrap()));
        plugin.handle_event(&EventBody::Midi(MidiBytes::new(&[0xB0, 16, 100]).unwrap()));
        assert_eq!(plugin.synth().noise_period(), 25);

        plugin.handle_event(&EventBody::Midi(MidiBytes::new(&[0xFF]).unwrap()));
        assert_eq!(plugin.synth().noise_period(), 0);
        assert_eq!(plugin.synth().channel(0).unwrap().note, None);
    }

    #[test]
    fn test_patch_set_dispatch() {
        let mut urids = SimpleUridMap::new();
        let mut plugin =
            AyMidi::instantiate(&quiet_config(), HostFeatures::with_urid_map(&mut urids)).unwrap();
        let noise = urids.get(&PropertyKey::NoisePeriod.uri()).unwrap();
        let unknown = urids.map("https://github.com/berarma/aymidi#nonexistent");

        plugin.handle_event(&EventBody::PatchSet {
            property: noise,
            value: AtomValue::Int(12),
        });
        plugin.handle_event(&EventBody::PatchSet {
            property: unknown,
            value: AtomValue::Int(5),
        });
        assert_eq!(plugin.synth().noise_period(), 12);
    }

    #[test]
    fn test_malformed_midi_is_ignored() {
        let mut plugin = plugin(&quiet_config());
        plugin.handle_event(&EventBody::Midi(MidiBytes::new(&[0x90, 60]).unwrap()));
        plugin.handle_event(&EventBody::Midi(MidiBytes::new(&[0x3C]).unwrap()));
        assert!(plugin.synth().channels().iter().all(|c| c.note.is_none()));
    }

    #[test]
    fn test_protocol_selection() {
        let config = SynthConfig {
            protocol: ProtocolVariant::Legacy,
            ..quiet_config()
        };
        let plugin = plugin(&config);
        assert_eq!(plugin.synth().envelope_period(), 0x40);
        assert_eq!(plugin.synth().channel(0).unwrap().volume, 15);
    }
}
