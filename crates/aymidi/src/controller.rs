//! Controller mapping tables
//!
//! Each protocol variant owns a table that turns (controller, value) into a
//! [`ControllerAction`]. The tables are pure; [`crate::Synth::apply_controller`]
//! carries the actions out.

use aymidi_psg::{ChipMode, PanLaw};

use crate::envelope::EnvelopeShape;
use crate::pitch;

/// MIDI controller numbers used by the tables
pub mod cc {
    /// Modulation wheel (MSB)
    pub const MODULATION: u8 = 1;
    /// Channel volume (MSB)
    pub const VOLUME: u8 = 7;
    /// Pan (MSB)
    pub const PAN: u8 = 10;
    /// General purpose 1: noise period
    pub const GENERAL_PURPOSE_1: u8 = 16;
    /// General purpose 2: envelope period coarse
    pub const GENERAL_PURPOSE_2: u8 = 17;
    /// General purpose 3: envelope period fine
    pub const GENERAL_PURPOSE_3: u8 = 18;
    /// General purpose 4: envelope shape
    pub const GENERAL_PURPOSE_4: u8 = 19;
    /// Sound controller 1
    pub const SOUND_CONTROLLER_1: u8 = 70;
    /// Sound controller 10
    pub const SOUND_CONTROLLER_10: u8 = 79;
    /// All sound off
    pub const ALL_SOUND_OFF: u8 = 120;
    /// Reset all controllers
    pub const RESET_CONTROLLERS: u8 = 121;
    /// All notes off
    pub const ALL_NOTES_OFF: u8 = 123;
}

/// State change requested by a controller message
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerAction {
    /// Re-push tone period and level of a sounding note
    ResetControllers,
    /// Silence the channel if it is sounding
    AllNotesOff,
    /// Set vibrato depth in semitones
    Modulation(f64),
    /// Set stereo position
    Pan {
        /// Position (0.0-1.0)
        pan: f64,
        /// Curve
        law: PanLaw,
    },
    /// Set channel volume (0-15)
    Volume(u8),
    /// Route the envelope to the channel
    EnvelopeEnable(bool),
    /// Set the shared noise period
    NoisePeriod(u8),
    /// Replace the coarse part of the envelope period (with correction)
    EnvelopeCoarse(u8),
    /// Replace the fine part of the envelope period
    EnvelopeFine(u8),
    /// Replace a bit range of the envelope period
    EnvelopePeriodBits {
        /// Bits that survive
        keep: u16,
        /// New bits
        bits: u16,
    },
    /// Replace the whole envelope shape
    EnvelopeShape(EnvelopeShape),
    /// Set or clear one envelope shape bit
    EnvelopeFlag {
        /// The bit
        flag: EnvelopeShape,
        /// New state
        on: bool,
    },
    /// Switch DAC curve and reinitialise the chip
    ChipMode(ChipMode),
}

/// Pan position for the expressive controller curve
///
/// Values 0 and 1 are both hard left so that 64 lands exactly in the middle.
#[inline]
fn centered_pan(value: u8) -> f64 {
    value.saturating_sub(1) as f64 / 126.0
}

/// Controller table shared by the expressive and velocity protocols
fn general_purpose(controller: u8, value: u8) -> Option<ControllerAction> {
    let action = match controller {
        cc::RESET_CONTROLLERS => ControllerAction::ResetControllers,
        cc::ALL_SOUND_OFF | cc::ALL_NOTES_OFF => ControllerAction::AllNotesOff,
        cc::PAN => ControllerAction::Pan {
            pan: centered_pan(value),
            law: PanLaw::EqualPower,
        },
        cc::VOLUME => ControllerAction::Volume(value >> 3),
        cc::GENERAL_PURPOSE_1 => ControllerAction::NoisePeriod(value >> 2),
        cc::GENERAL_PURPOSE_2 => ControllerAction::EnvelopeCoarse(value),
        cc::GENERAL_PURPOSE_3 => ControllerAction::EnvelopeFine(value),
        cc::GENERAL_PURPOSE_4 => ControllerAction::EnvelopeShape(EnvelopeShape::from_controller(value)),
        _ => return None,
    };
    Some(action)
}

/// Expressive protocol: general purpose controllers plus modulation wheel
pub fn expressive(controller: u8, value: u8) -> Option<ControllerAction> {
    match controller {
        cc::MODULATION => Some(ControllerAction::Modulation(pitch::modulation_depth(value))),
        _ => general_purpose(controller, value),
    }
}

/// Velocity protocol: general purpose controllers only
pub fn velocity(controller: u8, value: u8) -> Option<ControllerAction> {
    general_purpose(controller, value)
}

/// Legacy protocol: sound controllers 1-10 drive the chip registers
pub fn legacy(controller: u8, value: u8) -> Option<ControllerAction> {
    let on = value >= 64;
    let action = match controller {
        cc::PAN => ControllerAction::Pan {
            pan: value as f64 / 127.0,
            law: PanLaw::Linear,
        },
        cc::VOLUME => ControllerAction::Volume(value >> 3),
        cc::SOUND_CONTROLLER_1 => ControllerAction::EnvelopeEnable(on),
        71 => ControllerAction::EnvelopeFlag {
            flag: EnvelopeShape::HOLD,
            on,
        },
        72 => ControllerAction::EnvelopeFlag {
            flag: EnvelopeShape::ALTERNATE,
            on,
        },
        73 => ControllerAction::EnvelopeFlag {
            flag: EnvelopeShape::ATTACK,
            on,
        },
        74 => ControllerAction::EnvelopeFlag {
            flag: EnvelopeShape::CONTINUE,
            on,
        },
        75 => ControllerAction::EnvelopePeriodBits {
            keep: 0x01FF,
            bits: (value as u16) << 9,
        },
        76 => ControllerAction::EnvelopePeriodBits {
            keep: 0xFE03,
            bits: (value as u16) << 2,
        },
        77 => ControllerAction::EnvelopePeriodBits {
            keep: 0xFFFC,
            bits: (value as u16) >> 5,
        },
        78 => ControllerAction::NoisePeriod(value >> 2),
        cc::SOUND_CONTROLLER_10 => ControllerAction::ChipMode(ChipMode::from_ym_flag(on)),
        _ => return None,
    };
    Some(action)
}
