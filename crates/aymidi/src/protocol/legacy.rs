use aymidi_psg::PsgBackend;
use midly::MidiMessage;
use tracing::trace;

use super::{MidiProtocol, ProtocolVariant};
use crate::controller::{self, ControllerAction};
use crate::synth::{ResetDefaults, Synth};

/// Velocity used for every legacy note so the level equals the channel volume
const FULL_VELOCITY: u8 = 127;

/// The first controller set: one note per channel, sound controllers for
/// the chip registers
///
/// A note-on while the channel is sounding is dropped, velocity 0 means
/// note-off and note-off stops the channel whatever its key.
#[derive(Debug, Default, Clone, Copy)]
pub struct Legacy;

impl Legacy {
    fn note_off<B: PsgBackend>(synth: &mut Synth<B>, channel: usize) {
        synth.all_notes_off(channel);
    }
}

impl<B: PsgBackend> MidiProtocol<B> for Legacy {
    fn variant(&self) -> ProtocolVariant {
        ProtocolVariant::Legacy
    }

    fn reset(&mut self, synth: &mut Synth<B>) {
        synth.reset(ResetDefaults::LEGACY);
    }

    fn channel_message(&mut self, synth: &mut Synth<B>, channel: usize, message: MidiMessage) {
        match message {
            MidiMessage::NoteOff { .. } => Self::note_off(synth, channel),
            MidiMessage::NoteOn { vel, .. } if vel.as_int() == 0 => Self::note_off(synth, channel),
            MidiMessage::NoteOn { key, .. } => {
                if synth.channel(channel).is_some_and(|state| state.is_sounding()) {
                    trace!(channel, key = key.as_int(), "channel busy, note dropped");
                    return;
                }
                synth.note_on(channel, key.as_int(), FULL_VELOCITY);
            }
            MidiMessage::ProgramChange { program } => {
                let program = program.as_int();
                synth.set_mixer(channel, program & 1 == 0, !(program == 0 || program == 3));
            }
            MidiMessage::Controller { controller, value } => {
                match controller::legacy(controller.as_int(), value.as_int()) {
                    Some(ControllerAction::ChipMode(mode)) => {
                        synth.apply_controller(channel, ControllerAction::ChipMode(mode));
                        synth.reinitialize(ResetDefaults::LEGACY.envelope_period);
                    }
                    Some(action) => synth.apply_controller(channel, action),
                    None => trace!(channel, controller = controller.as_int(), "unmapped controller"),
                }
            }
            other => trace!(channel, ?other, "ignored message"),
        }
    }
}
