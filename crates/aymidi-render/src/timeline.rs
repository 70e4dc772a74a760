//! Standard MIDI File to sample-frame timeline conversion.
//!
//! Tracks are merged into one stream ordered by absolute tick (sequential
//! files play their tracks back to back), then every tick is converted to a
//! frame through the tempo map.

use aymidi::MidiBytes;
use midly::live::LiveEvent;
use midly::{Format, MetaMessage, Smf, Timing, TrackEventKind};
use tracing::{debug, trace};

/// Tempo assumed until the first Set Tempo meta event (120 BPM)
pub const DEFAULT_TEMPO_US: u32 = 500_000;

/// One channel message at an absolute frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEvent {
    /// Frame from the start of the song
    pub frame: u64,
    /// Encoded channel message
    pub bytes: MidiBytes,
}

/// Channel messages of a whole song, sorted by frame
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    /// Events in playback order
    pub events: Vec<FrameEvent>,
    /// Frame of the last event, including meta events such as End of Track
    pub end_frame: u64,
}

impl Timeline {
    /// Convert a parsed file at the given sample rate
    pub fn from_smf(smf: &Smf<'_>, sample_rate: u32) -> anyhow::Result<Self> {
        let merged = merge_tracks(smf);

        let us_per_tick = |tempo_us: u32| -> f64 {
            match smf.header.timing {
                Timing::Metrical(ticks_per_beat) => {
                    tempo_us as f64 / f64::from(ticks_per_beat.as_int().max(1))
                }
                Timing::Timecode(fps, subframes) => {
                    1_000_000.0 / (f64::from(fps.as_f32()) * f64::from(subframes.max(1)))
                }
            }
        };

        let mut tick_us = us_per_tick(DEFAULT_TEMPO_US);
        let mut elapsed_us = 0.0f64;
        let mut last_tick = 0u64;
        let mut timeline = Timeline::default();
        let mut buf = Vec::with_capacity(3);

        for (tick, kind) in merged {
            elapsed_us += (tick - last_tick) as f64 * tick_us;
            last_tick = tick;
            let frame = (elapsed_us * f64::from(sample_rate) / 1_000_000.0).round() as u64;
            timeline.end_frame = frame;

            match kind {
                TrackEventKind::Midi { channel, message } => {
                    buf.clear();
                    LiveEvent::Midi { channel, message }.write(&mut buf).map_err(anyhow::Error::msg)?;
                    match MidiBytes::new(&buf) {
                        Some(bytes) => timeline.events.push(FrameEvent { frame, bytes }),
                        None => trace!(len = buf.len(), "skipping oversized message"),
                    }
                }
                TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => {
                    tick_us = us_per_tick(tempo.as_int());
                    trace!(tick, tempo = tempo.as_int(), "tempo change");
                }
                _ => {}
            }
        }

        debug!(
            events = timeline.events.len(),
            end_frame = timeline.end_frame,
            "built timeline"
        );
        Ok(timeline)
    }

    /// Events whose frame lies in `start..end`
    pub fn window(&self, start: u64, end: u64) -> &[FrameEvent] {
        let from = self.events.partition_point(|event| event.frame < start);
        let to = self.events.partition_point(|event| event.frame < end);
        &self.events[from..to]
    }
}

/// All track events with absolute ticks, ordered by tick and then by track
fn merge_tracks<'a>(smf: &'a Smf<'a>) -> Vec<(u64, TrackEventKind<'a>)> {
    let mut merged = Vec::new();
    let mut track_start = 0u64;

    for track in &smf.tracks {
        let mut tick = track_start;
        for event in track {
            tick += u64::from(event.delta.as_int());
            merged.push((tick, event.kind));
        }
        if smf.header.format == Format::Sequential {
            track_start = tick;
        }
    }

    // Stable: simultaneous events keep their file order
    merged.sort_by_key(|(tick, _)| *tick);
    merged
}
