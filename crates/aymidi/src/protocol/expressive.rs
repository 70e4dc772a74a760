use aymidi_psg::PsgBackend;
use midly::MidiMessage;
use tracing::trace;

use super::{MidiProtocol, ProtocolVariant};
use crate::controller;
use crate::pitch;
use crate::synth::{ResetDefaults, Synth};

/// Velocity, stored pitch bend and modulation wheel vibrato
///
/// Note-on always retriggers the channel, even when a note is sounding.
/// A velocity of 0 retriggers at level 0 rather than releasing the note, so
/// an envelope-routed channel keeps sounding until a real note-off.
#[derive(Debug, Default, Clone, Copy)]
pub struct Expressive;

impl<B: PsgBackend> MidiProtocol<B> for Expressive {
    fn variant(&self) -> ProtocolVariant {
        ProtocolVariant::Expressive
    }

    fn reset(&mut self, synth: &mut Synth<B>) {
        synth.reset(ResetDefaults::STANDARD);
    }

    fn channel_message(&mut self, synth: &mut Synth<B>, channel: usize, message: MidiMessage) {
        match message {
            MidiMessage::NoteOff { key, .. } => synth.note_off(channel, key.as_int()),
            MidiMessage::NoteOn { key, vel } => synth.note_on(channel, key.as_int(), vel.as_int()),
            MidiMessage::PitchBend { bend } => {
                synth.set_pitch_bend(channel, pitch::bend_semitones(bend.0.as_int()))
            }
            MidiMessage::ProgramChange { program } => synth.program_change(channel, program.as_int()),
            MidiMessage::Controller { controller, value } => {
                match controller::expressive(controller.as_int(), value.as_int()) {
                    Some(action) => synth.apply_controller(channel, action),
                    None => trace!(channel, controller = controller.as_int(), "unmapped controller"),
                }
            }
            other => trace!(channel, ?other, "ignored message"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aymidi_psg::Psg;
    use midly::num::{u14, u7};
    use midly::PitchBend;

    use crate::config::SynthConfig;

    fn setup() -> (Expressive, Synth<Psg>) {
        let mut synth = Synth::new(Psg::new(), &SynthConfig::default());
        let mut protocol = Expressive;
        MidiProtocol::<Psg>::reset(&mut protocol, &mut synth);
        (protocol, synth)
    }

    fn note_on(key: u8, vel: u8) -> MidiMessage {
        MidiMessage::NoteOn {
            key: u7::new(key),
            vel: u7::new(vel),
        }
    }

    fn cc(controller: u8, value: u8) -> MidiMessage {
        MidiMessage::Controller {
            controller: u7::new(controller),
            value: u7::new(value),
        }
    }

    #[test]
    fn test_velocity_zero_note_on_still_retriggers() {
        let (mut protocol, mut synth) = setup();
        protocol.channel_message(&mut synth, 0, note_on(60, 100));
        protocol.channel_message(&mut synth, 0, note_on(62, 0));
        assert_eq!(synth.channel(0).unwrap().note, Some(62));
        assert_eq!(synth.chip().channel_registers(0).unwrap().volume, 0);
    }

    #[test]
    fn test_velocity_zero_does_not_release_envelope_voice() {
        let (mut protocol, mut synth) = setup();
        protocol.channel_message(&mut synth, 0, MidiMessage::ProgramChange { program: u7::new(4) });
        protocol.channel_message(&mut synth, 0, note_on(60, 100));
        protocol.channel_message(&mut synth, 0, note_on(60, 0));

        assert_eq!(synth.channel(0).unwrap().note, Some(60));
        assert!(synth.chip().channel_registers(0).unwrap().envelope_on);

        protocol.channel_message(
            &mut synth,
            0,
            MidiMessage::NoteOff {
                key: u7::new(60),
                vel: u7::new(0),
            },
        );
        assert_eq!(synth.channel(0).unwrap().note, None);
    }

    #[test]
    fn test_pitch_bend_message() {
        let (mut protocol, mut synth) = setup();
        let bend = MidiMessage::PitchBend {
            bend: PitchBend(u14::new(0x3000)),
        };
        protocol.channel_message(&mut synth, 1, bend);
        assert_eq!(synth.channel(1).unwrap().bend_semitones, 6.0);
    }

    #[test]
    fn test_modulation_wheel() {
        let (mut protocol, mut synth) = setup();
        protocol.channel_message(&mut synth, 2, cc(1, 127));
        assert_eq!(synth.channel(2).unwrap().modulation_depth, 0.5);
    }

    #[test]
    fn test_all_sound_off() {
        let (mut protocol, mut synth) = setup();
        protocol.channel_message(&mut synth, 0, note_on(60, 100));
        protocol.channel_message(&mut synth, 0, cc(120, 0));
        assert_eq!(synth.channel(0).unwrap().note, None);
    }

    #[test]
    fn test_envelope_shape_controller() {
        let (mut protocol, mut synth) = setup();
        protocol.channel_message(&mut synth, 0, cc(19, 0x60));
        assert_eq!(synth.chip().envelope_shape(), 0x0E);
    }
}
