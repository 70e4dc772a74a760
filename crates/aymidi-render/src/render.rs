//! Block-wise rendering of a timeline into a WAV file.

use std::io::{Seek, Write};

use anyhow::{Context, Result};
use aymidi::{AyMidi, EventBody, PsgBackend, TimedEvent};
use tracing::debug;

use crate::timeline::Timeline;

/// Render settings
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Frames per `run` call
    pub block: usize,
    /// Frames rendered after the timeline ends
    pub tail_frames: u64,
}

/// WAV format written by the renderer
pub fn wav_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    }
}

/// Drive `plugin` through the timeline one block at a time and write the
/// interleaved output. Returns the number of frames written.
pub fn render_timeline<B, W>(
    plugin: &mut AyMidi<B>,
    timeline: &Timeline,
    options: RenderOptions,
    writer: &mut hound::WavWriter<W>,
) -> Result<u64>
where
    B: PsgBackend,
    W: Write + Seek,
{
    let block = options.block.max(1);
    let total = timeline.end_frame + 1 + options.tail_frames;
    let mut left = vec![0.0f32; block];
    let mut right = vec![0.0f32; block];
    let mut events: Vec<TimedEvent> = Vec::new();

    plugin.activate();

    let mut start = 0u64;
    while start < total {
        let frames = (total - start).min(block as u64) as usize;
        let end = start + frames as u64;

        events.clear();
        events.extend(timeline.window(start, end).iter().map(|event| TimedEvent {
            frame: (event.frame - start) as u32,
            body: EventBody::Midi(event.bytes),
        }));

        plugin.run(&events, &mut left[..frames], &mut right[..frames]);

        for (l, r) in left[..frames].iter().zip(&right[..frames]) {
            writer.write_sample(*l).context("failed to write sample")?;
            writer.write_sample(*r).context("failed to write sample")?;
        }
        start = end;
    }

    plugin.deactivate();
    debug!(frames = total, blocks = total.div_ceil(block as u64), "rendered");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::FrameEvent;
    use aymidi::{HostFeatures, MidiBytes, SimpleUridMap, SynthConfig};
    use std::io::Cursor;

    fn event(frame: u64, bytes: &[u8]) -> FrameEvent {
        FrameEvent {
            frame,
            bytes: MidiBytes::new(bytes).unwrap(),
        }
    }

    fn render(timeline: &Timeline, block: usize) -> Vec<f32> {
        let config = SynthConfig {
            remove_dc: false,
            ..SynthConfig::default()
        };
        let mut urids = SimpleUridMap::new();
        let mut plugin = AyMidi::instantiate(&config, HostFeatures::with_urid_map(&mut urids)).unwrap();

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, wav_spec(config.sample_rate)).unwrap();
            let options = RenderOptions { block, tail_frames: 10 };
            render_timeline(&mut plugin, timeline, options, &mut writer).unwrap();
            writer.finalize().unwrap();
        }

        cursor.set_position(0);
        let mut reader = hound::WavReader::new(cursor).unwrap();
        reader.samples::<f32>().map(|s| s.unwrap()).collect()
    }

    fn flat_note_timeline() -> Timeline {
        Timeline {
            events: vec![
                event(0, &[0xC0, 3]),
                event(100, &[0x90, 60, 127]),
                event(300, &[0x80, 60, 0]),
            ],
            end_frame: 300,
        }
    }

    #[test]
    fn test_length_includes_tail() {
        let samples = render(&flat_note_timeline(), 64);
        assert_eq!(samples.len(), 2 * 311);
    }

    #[test]
    fn test_events_land_on_absolute_frames() {
        let samples = render(&flat_note_timeline(), 64);
        let left: Vec<f32> = samples.iter().step_by(2).copied().collect();
        assert!(left[..100].iter().all(|s| *s == 0.0));
        assert!(left[100..300].iter().all(|s| *s > 0.0));
        assert!(left[300..].iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_block_length_does_not_change_output() {
        let timeline = flat_note_timeline();
        assert_eq!(render(&timeline, 7), render(&timeline, 256));
    }
}
