//! Out-of-band parameter keys
//!
//! Every parameter a host can set without MIDI is named by a URI under
//! [`PROPERTY_BASE`]. Per-channel keys end in `_a`, `_b` or `_c`.

use aymidi_psg::NUM_CHANNELS;

use crate::host::{Urid, UridMap};

/// Common prefix of all property URIs
pub const PROPERTY_BASE: &str = "https://github.com/berarma/aymidi#";

const CHANNEL_SUFFIXES: [&str; NUM_CHANNELS] = ["a", "b", "c"];

/// Parameter addressed by a property write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// Chip clock (Hz, or MHz for values up to 100)
    Clock,
    /// YM DAC curve when true, AY when false
    YmMode,
    /// Shared noise period
    NoisePeriod,
    /// Shared envelope period
    EnvelopePeriod,
    /// Envelope shape hold bit
    EnvelopeHold,
    /// Envelope shape alternate bit
    EnvelopeAlternate,
    /// Envelope shape attack bit
    EnvelopeAttack,
    /// Envelope shape continue bit
    EnvelopeContinue,
    /// Tone period of a channel
    TonePeriod(usize),
    /// Fixed level of a channel
    Level(usize),
    /// Envelope routing of a channel
    Envelope(usize),
    /// Mixer tone flag of a channel
    Tone(usize),
    /// Mixer noise flag of a channel
    Noise(usize),
    /// Stereo position of a channel
    Pan(usize),
}

impl PropertyKey {
    /// Every key the plugin understands
    pub fn all() -> impl Iterator<Item = PropertyKey> {
        let global = [
            PropertyKey::Clock,
            PropertyKey::YmMode,
            PropertyKey::NoisePeriod,
            PropertyKey::EnvelopePeriod,
            PropertyKey::EnvelopeHold,
            PropertyKey::EnvelopeAlternate,
            PropertyKey::EnvelopeAttack,
            PropertyKey::EnvelopeContinue,
        ];
        let per_channel = (0..NUM_CHANNELS).flat_map(|channel| {
            [
                PropertyKey::TonePeriod(channel),
                PropertyKey::Level(channel),
                PropertyKey::Envelope(channel),
                PropertyKey::Tone(channel),
                PropertyKey::Noise(channel),
                PropertyKey::Pan(channel),
            ]
        });
        global.into_iter().chain(per_channel)
    }

    /// Local name (the part after `#`)
    pub fn name(&self) -> String {
        let (stem, channel) = match *self {
            PropertyKey::Clock => return "clock".to_owned(),
            PropertyKey::YmMode => return "ymmode".to_owned(),
            PropertyKey::NoisePeriod => return "noise_period".to_owned(),
            PropertyKey::EnvelopePeriod => return "envelope_period".to_owned(),
            PropertyKey::EnvelopeHold => return "envelope_hold".to_owned(),
            PropertyKey::EnvelopeAlternate => return "envelope_alternate".to_owned(),
            PropertyKey::EnvelopeAttack => return "envelope_attack".to_owned(),
            PropertyKey::EnvelopeContinue => return "envelope_continue".to_owned(),
            PropertyKey::TonePeriod(channel) => ("tone_period", channel),
            PropertyKey::Level(channel) => ("level", channel),
            PropertyKey::Envelope(channel) => ("envelope", channel),
            PropertyKey::Tone(channel) => ("tone", channel),
            PropertyKey::Noise(channel) => ("noise", channel),
            PropertyKey::Pan(channel) => ("pan", channel),
        };
        let suffix = CHANNEL_SUFFIXES.get(channel).copied().unwrap_or("?");
        format!("{stem}_{suffix}")
    }

    /// Full property URI
    pub fn uri(&self) -> String {
        format!("{PROPERTY_BASE}{}", self.name())
    }

    /// Parse a full property URI
    pub fn from_uri(uri: &str) -> Option<Self> {
        let name = uri.strip_prefix(PROPERTY_BASE)?;
        let key = match name {
            "clock" => PropertyKey::Clock,
            "ymmode" => PropertyKey::YmMode,
            "noise_period" => PropertyKey::NoisePeriod,
            "envelope_period" => PropertyKey::EnvelopePeriod,
            "envelope_hold" => PropertyKey::EnvelopeHold,
            "envelope_alternate" => PropertyKey::EnvelopeAlternate,
            "envelope_attack" => PropertyKey::EnvelopeAttack,
            "envelope_continue" => PropertyKey::EnvelopeContinue,
            _ => {
                let (stem, suffix) = name.rsplit_once('_')?;
                let channel = CHANNEL_SUFFIXES.iter().position(|s| *s == suffix)?;
                match stem {
                    "tone_period" => PropertyKey::TonePeriod(channel),
                    "level" => PropertyKey::Level(channel),
                    "envelope" => PropertyKey::Envelope(channel),
                    "tone" => PropertyKey::Tone(channel),
                    "noise" => PropertyKey::Noise(channel),
                    "pan" => PropertyKey::Pan(channel),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

/// URIDs of every property, resolved once per instance
#[derive(Debug, Clone)]
pub struct PropertyMap {
    entries: Vec<(Urid, PropertyKey)>,
}

impl PropertyMap {
    /// Map every known property URI through the host
    pub fn new(map: &mut dyn UridMap) -> Self {
        let entries = PropertyKey::all().map(|key| (map.map(&key.uri()), key)).collect();
        Self { entries }
    }

    /// Key for a URID, `None` if it is not one of ours
    #[inline]
    pub fn lookup(&self, urid: Urid) -> Option<PropertyKey> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == urid)
            .map(|(_, key)| *key)
    }

    /// URID of a key
    pub fn urid(&self, key: PropertyKey) -> Option<Urid> {
        self.entries
            .iter()
            .find(|(_, candidate)| *candidate == key)
            .map(|(urid, _)| *urid)
    }
}
