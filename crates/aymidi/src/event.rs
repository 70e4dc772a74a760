//! Timed input events
//!
//! A processing block arrives as a slice of [`TimedEvent`]s ordered by frame
//! offset. Payloads are either raw MIDI bytes or a property write; both are
//! fixed-size so a host can build them without allocating.

use crate::host::Urid;

/// Raw MIDI message of up to three bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiBytes {
    bytes: [u8; 3],
    len: u8,
}

impl MidiBytes {
    /// Copy a message; `None` if it is empty or longer than three bytes
    pub fn new(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() || bytes.len() > 3 {
            return None;
        }
        let mut buffer = [0u8; 3];
        buffer[..bytes.len()].copy_from_slice(bytes);
        Some(Self {
            bytes: buffer,
            len: bytes.len() as u8,
        })
    }

    /// The message bytes
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

/// Typed property value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AtomValue {
    /// Floating point
    Float(f64),
    /// Integer
    Int(i64),
    /// Boolean
    Bool(bool),
}

impl AtomValue {
    /// Numeric value; booleans have none
    pub fn as_f64(self) -> Option<f64> {
        match self {
            AtomValue::Float(value) => Some(value),
            AtomValue::Int(value) => Some(value as f64),
            AtomValue::Bool(_) => None,
        }
    }

    /// Integer value, floats truncated toward zero; booleans have none
    pub fn as_i64(self) -> Option<i64> {
        match self {
            AtomValue::Float(value) if value.is_finite() => Some(value as i64),
            AtomValue::Float(_) | AtomValue::Bool(_) => None,
            AtomValue::Int(value) => Some(value),
        }
    }

    /// Boolean value; integers count as true when non-zero
    pub fn as_bool(self) -> Option<bool> {
        match self {
            AtomValue::Bool(value) => Some(value),
            AtomValue::Int(value) => Some(value != 0),
            AtomValue::Float(_) => None,
        }
    }
}

/// Event payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventBody {
    /// Raw MIDI message
    Midi(MidiBytes),
    /// Property write
    PatchSet {
        /// Mapped property URI
        property: Urid,
        /// New value
        value: AtomValue,
    },
}

/// Event with its frame offset inside the block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEvent {
    /// Frame offset from the start of the block
    pub frame: u32,
    /// Payload
    pub body: EventBody,
}

impl TimedEvent {
    /// MIDI event at a frame; `None` if the message does not fit
    pub fn midi(frame: u32, bytes: &[u8]) -> Option<Self> {
        MidiBytes::new(bytes).map(|bytes| Self {
            frame,
            body: EventBody::Midi(bytes),
        })
    }

    /// Property write at a frame
    pub fn patch_set(frame: u32, property: Urid, value: AtomValue) -> Self {
        Self {
            frame,
            body: EventBody::PatchSet { property, value },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midi_bytes_length() {
        assert!(MidiBytes::new(&[]).is_none());
        assert!(MidiBytes::new(&[0x90, 60, 100, 0]).is_none());
        assert_eq!(MidiBytes::new(&[0xFF]).unwrap().as_slice(), &[0xFF]);
        assert_eq!(MidiBytes::new(&[0xC0, 5]).unwrap().as_slice(), &[0xC0, 5]);
    }

    #[test]
    fn test_atom_conversions() {
        assert_eq!(AtomValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(AtomValue::Float(2.9).as_i64(), Some(2));
        assert_eq!(AtomValue::Float(f64::NAN).as_i64(), None);
        assert_eq!(AtomValue::Int(0).as_bool(), Some(false));
        assert_eq!(AtomValue::Bool(true).as_f64(), None);
        assert_eq!(AtomValue::Float(1.0).as_bool(), None);
    }

    #[test]
    fn test_timed_event_builders() {
        let event = TimedEvent::midi(10, &[0x90, 60, 100]).unwrap();
        assert_eq!(event.frame, 10);
        assert!(matches!(event.body, EventBody::Midi(_)));

        let event = TimedEvent::patch_set(0, Urid(7), AtomValue::Bool(true));
        assert_eq!(
            event.body,
            EventBody::PatchSet {
                property: Urid(7),
                value: AtomValue::Bool(true)
            }
        );
    }
}
