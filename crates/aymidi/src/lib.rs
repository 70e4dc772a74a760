//! MIDI-driven AY-3-8910 / YM2149 synthesizer engine
//!
//! Turns timestamped MIDI messages and property writes into register-level
//! commands for a three-voice PSG and renders its output sample by sample,
//! applying every event exactly at its frame.
//!
//! # Layers
//! - [`Channel`]: per-voice note, velocity, bend, vibrato, mixer and pan state
//! - [`controller`]: pure controller-to-action tables
//! - [`pitch`]: note-to-period conversion, pitch bend, vibrato LFO
//! - [`Synth`]: note handling and register updates on top of a [`PsgBackend`]
//! - [`protocol`]: the three MIDI contracts ([`ProtocolVariant`])
//! - [`AyMidi`]: the plugin instance with its sample-accurate block loop
//!
//! # Quick start
//! ```
//! use aymidi::{AyMidi, HostFeatures, ProtocolVariant, SimpleUridMap, SynthConfig, TimedEvent};
//!
//! let config = SynthConfig {
//!     sample_rate: 48_000,
//!     protocol: ProtocolVariant::Expressive,
//!     ..SynthConfig::default()
//! };
//! let mut urids = SimpleUridMap::new();
//! let mut plugin = AyMidi::instantiate(&config, HostFeatures::with_urid_map(&mut urids))?;
//! plugin.activate();
//!
//! let events = [TimedEvent::midi(0, &[0x90, 60, 100]).unwrap()];
//! let (mut left, mut right) = (vec![0.0f32; 256], vec![0.0f32; 256]);
//! plugin.run(&events, &mut left, &mut right);
//! assert!(left.iter().any(|s| *s != 0.0));
//! # Ok::<(), aymidi::AymidiError>(())
//! ```

#![warn(missing_docs)]

pub mod channel;
pub mod config;
pub mod controller;
pub mod envelope;
pub mod error;
pub mod event;
pub mod host;
pub mod pitch;
pub mod plugin;
pub mod property;
pub mod protocol;
pub mod synth;

// Public API exports
pub use aymidi_psg::{ChipMode, PanLaw, Psg, PsgBackend};
pub use channel::Channel;
pub use config::SynthConfig;
pub use controller::ControllerAction;
pub use envelope::EnvelopeShape;
pub use error::{AymidiError, Result};
pub use event::{AtomValue, EventBody, MidiBytes, TimedEvent};
pub use host::{HostFeatures, SimpleUridMap, Urid, UridMap};
pub use plugin::AyMidi;
pub use property::{PropertyKey, PropertyMap, PROPERTY_BASE};
pub use protocol::{MidiProtocol, ProtocolVariant};
pub use synth::{ResetDefaults, Synth};
