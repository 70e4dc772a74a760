use aymidi_psg::PsgBackend;
use midly::MidiMessage;
use tracing::trace;

use super::{MidiProtocol, ProtocolVariant};
use crate::controller;
use crate::pitch;
use crate::synth::{ResetDefaults, Synth};

/// Velocity-scaled levels without vibrato
///
/// Pitch bend retunes the sounding note once and is forgotten; program
/// change rewrites the timbre without stopping the note.
#[derive(Debug, Default, Clone, Copy)]
pub struct Velocity;

impl<B: PsgBackend> MidiProtocol<B> for Velocity {
    fn variant(&self) -> ProtocolVariant {
        ProtocolVariant::Velocity
    }

    fn reset(&mut self, synth: &mut Synth<B>) {
        synth.reset(ResetDefaults::STANDARD);
    }

    fn channel_message(&mut self, synth: &mut Synth<B>, channel: usize, message: MidiMessage) {
        match message {
            MidiMessage::NoteOff { key, .. } => synth.note_off(channel, key.as_int()),
            MidiMessage::NoteOn { key, vel } => synth.note_on(channel, key.as_int(), vel.as_int()),
            MidiMessage::PitchBend { bend } => {
                synth.bend_sounding_note(channel, pitch::bend_semitones(bend.0.as_int()))
            }
            MidiMessage::ProgramChange { program } => {
                let program = program.as_int();
                synth.set_timbre(channel, program & 1 == 0, matches!(program & 3, 1 | 2), program > 3);
            }
            MidiMessage::Controller { controller, value } => {
                match controller::velocity(controller.as_int(), value.as_int()) {
                    Some(action) => synth.apply_controller(channel, action),
                    None => trace!(channel, controller = controller.as_int(), "unmapped controller"),
                }
            }
            other => trace!(channel, ?other, "ignored message"),
        }
    }
}
