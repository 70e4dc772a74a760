//! MIDI protocol variants
//!
//! The synthesizer has grown three incompatible MIDI contracts over time. Each
//! lives behind [`MidiProtocol`] and is chosen once, at construction, through
//! [`ProtocolVariant`].
//!
//! | Variant | Note-on while sounding | Pitch bend | Controllers |
//! |---|---|---|---|
//! | [`Expressive`] | retrigger | stored, plus vibrato | GP1-4, volume, pan, mod wheel |
//! | [`Velocity`] | retrigger | applied once | GP1-4, volume, pan |
//! | [`Legacy`] | rejected | ignored | sound controllers 1-10 |

use std::fmt;
use std::str::FromStr;

use aymidi_psg::PsgBackend;
use midly::MidiMessage;
use serde::{Deserialize, Serialize};

use crate::error::AymidiError;
use crate::synth::Synth;

mod expressive;
mod legacy;
mod velocity;

pub use expressive::Expressive;
pub use legacy::Legacy;
pub use velocity::Velocity;

/// Selects a [`MidiProtocol`] implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolVariant {
    /// Velocity, pitch bend and modulation wheel vibrato
    #[default]
    Expressive,
    /// Velocity-scaled levels, one-shot pitch bend
    Velocity,
    /// First controller set, one note per channel at a time
    Legacy,
}

impl ProtocolVariant {
    /// All variants
    pub const ALL: [ProtocolVariant; 3] = [
        ProtocolVariant::Expressive,
        ProtocolVariant::Velocity,
        ProtocolVariant::Legacy,
    ];

    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolVariant::Expressive => "expressive",
            ProtocolVariant::Velocity => "velocity",
            ProtocolVariant::Legacy => "legacy",
        }
    }

    /// Build the protocol object
    pub fn create<B: PsgBackend>(self) -> Box<dyn MidiProtocol<B>> {
        match self {
            ProtocolVariant::Expressive => Box::new(Expressive),
            ProtocolVariant::Velocity => Box::new(Velocity),
            ProtocolVariant::Legacy => Box::new(Legacy),
        }
    }
}

impl fmt::Display for ProtocolVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolVariant {
    type Err = AymidiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProtocolVariant::ALL
            .into_iter()
            .find(|variant| variant.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AymidiError::config(format!("unknown protocol '{s}'")))
    }
}

/// MIDI contract between incoming channel messages and a [`Synth`]
///
/// Channel indices handed to a protocol are already limited to the three
/// chip channels.
pub trait MidiProtocol<B: PsgBackend>: Send + fmt::Debug {
    /// Which variant this is
    fn variant(&self) -> ProtocolVariant;

    /// Handle a System Reset (and the reset at instantiation)
    fn reset(&mut self, synth: &mut Synth<B>);

    /// Handle a channel voice or mode message
    fn channel_message(&mut self, synth: &mut Synth<B>, channel: usize, message: MidiMessage);
}
