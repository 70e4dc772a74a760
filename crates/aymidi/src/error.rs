//! Error handling for the synthesizer engine.

use thiserror::Error;

/// Convenient result alias for engine construction and configuration.
pub type Result<T> = std::result::Result<T, AymidiError>;

/// Errors that may occur while configuring or instantiating the engine.
///
/// Nothing on the rendering path returns one of these: once an instance
/// exists, every event and every sample is handled without failing.
#[derive(Debug, Error)]
pub enum AymidiError {
    /// Configuration value out of range.
    #[error("invalid configuration: {msg}")]
    Config {
        /// Human-readable explanation of the rejected value.
        msg: String,
    },
    /// The host did not provide a capability the plugin cannot run without.
    #[error("host does not provide required feature '{feature}'")]
    MissingFeature {
        /// Name of the missing feature.
        feature: &'static str,
    },
    /// The sound chip rejected its configuration.
    #[error(transparent)]
    Psg(#[from] aymidi_psg::PsgError),
    /// Reading a configuration file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A configuration file is not valid JSON for [`crate::SynthConfig`].
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AymidiError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        AymidiError::Config { msg: msg.into() }
    }
}
