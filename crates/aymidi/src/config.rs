//! Engine configuration
//!
//! A [`SynthConfig`] is everything an instance needs before the first block:
//! chip clock, host sample rate, DAC curve, DC removal and the MIDI protocol
//! variant. It can be built in code or loaded from JSON; missing fields take
//! their defaults.
//!
//! ```
//! use aymidi::{ProtocolVariant, SynthConfig};
//!
//! let config = SynthConfig::from_json_str(r#"{ "sample_rate": 48000, "protocol": "legacy" }"#)
//!     .unwrap();
//! assert_eq!(config.sample_rate, 48_000);
//! assert_eq!(config.clock_hz, 2_000_000);
//! assert_eq!(config.protocol, ProtocolVariant::Legacy);
//! ```

use std::path::Path;

use aymidi_psg::ChipMode;
use serde::{Deserialize, Serialize};

use crate::error::{AymidiError, Result};
use crate::protocol::ProtocolVariant;

/// Default chip clock in Hz
pub const DEFAULT_CLOCK_HZ: u32 = 2_000_000;

/// Default host sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Serde mirror of [`ChipMode`] (`"ay"` / `"ym"`)
#[derive(Serialize, Deserialize)]
#[serde(remote = "ChipMode", rename_all = "snake_case")]
enum ChipModeDef {
    Ay,
    Ym,
}

/// Instance configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SynthConfig {
    /// Chip clock in Hz
    pub clock_hz: u32,
    /// Host sample rate in Hz
    pub sample_rate: u32,
    /// DAC curve
    #[serde(with = "ChipModeDef")]
    pub mode: ChipMode,
    /// Run the DC remover after every sample
    pub remove_dc: bool,
    /// MIDI protocol variant
    pub protocol: ProtocolVariant,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            clock_hz: DEFAULT_CLOCK_HZ,
            sample_rate: DEFAULT_SAMPLE_RATE,
            mode: ChipMode::Ym,
            remove_dc: true,
            protocol: ProtocolVariant::default(),
        }
    }
}

impl SynthConfig {
    /// Default configuration at a given host sample rate
    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject values the engine cannot run with at all
    ///
    /// A clock that is merely too fast for the sample rate is accepted here;
    /// the engine reports it as a warning and keeps going.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(AymidiError::config("sample_rate must be non-zero"));
        }
        if self.clock_hz == 0 {
            return Err(AymidiError::config("clock_hz must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SynthConfig::default();
        assert_eq!(config.clock_hz, 2_000_000);
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.mode, ChipMode::Ym);
        assert!(config.remove_dc);
        assert_eq!(config.protocol, ProtocolVariant::Expressive);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = SynthConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SynthConfig::default());
    }

    #[test]
    fn test_mode_is_lowercase() {
        let config = SynthConfig::from_json_str(r#"{ "mode": "ay", "remove_dc": false }"#).unwrap();
        assert_eq!(config.mode, ChipMode::Ay);
        assert!(!config.remove_dc);

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""mode":"ay""#), "{json}");
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = SynthConfig::from_json_str(r#"{ "mode": "sid" }"#).unwrap_err();
        assert!(matches!(err, AymidiError::Json(_)));
    }

    #[test]
    fn test_validate_rejects_zero_rates() {
        let config = SynthConfig::with_sample_rate(0);
        assert!(matches!(config.validate(), Err(AymidiError::Config { .. })));

        let config = SynthConfig {
            clock_hz: 0,
            ..SynthConfig::default()
        };
        assert!(matches!(config.validate(), Err(AymidiError::Config { .. })));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("synth.json");
        std::fs::write(&path, r#"{ "clock_hz": 1773400, "protocol": "velocity" }"#).unwrap();

        let config = SynthConfig::from_json_file(&path).unwrap();
        assert_eq!(config.clock_hz, 1_773_400);
        assert_eq!(config.protocol, ProtocolVariant::Velocity);

        let missing = SynthConfig::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(AymidiError::Io(_))));
    }
}
