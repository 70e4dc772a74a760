//! Offline renderer for the AY/YM MIDI synth.
//!
//! Reads a Standard MIDI File, feeds it to a synth instance in fixed-size
//! processing blocks and writes the stereo output as a 32-bit float WAV file.

mod args;
mod render;
mod timeline;

use std::fs;

use anyhow::{bail, Context, Result};
use aymidi::{AyMidi, ChipMode, HostFeatures, SimpleUridMap, SynthConfig};
use midly::Smf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use args::CliArgs;
use render::{render_timeline, wav_spec, RenderOptions};
use timeline::Timeline;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    if args.show_help {
        CliArgs::print_help();
        if args.help_requested {
            return Ok(());
        }
        bail!("invalid arguments");
    }
    let (Some(input), Some(output)) = (args.input.as_ref(), args.output.as_ref()) else {
        CliArgs::print_help();
        bail!("an input MIDI file and an output WAV file (-o) are required");
    };

    let config = build_config(&args)?;

    let data = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let smf = Smf::parse(&data).with_context(|| format!("failed to parse {}", input.display()))?;
    let timeline = Timeline::from_smf(&smf, config.sample_rate)?;
    if timeline.events.is_empty() {
        warn!(file = %input.display(), "no channel messages, output is silence");
    }

    let mut urids = SimpleUridMap::new();
    let mut plugin = AyMidi::instantiate(&config, HostFeatures::with_urid_map(&mut urids))
        .context("failed to create synth instance")?;
    if let Some(err) = plugin.synth().configure_error() {
        warn!(%err, "chip configuration is degenerate, output may be aliased");
    }

    info!(
        input = %input.display(),
        output = %output.display(),
        sample_rate = config.sample_rate,
        protocol = %config.protocol,
        events = timeline.events.len(),
        "rendering"
    );

    let options = RenderOptions {
        block: args.block,
        tail_frames: (args.tail_secs * f64::from(config.sample_rate)).round() as u64,
    };
    let mut writer = hound::WavWriter::create(output, wav_spec(config.sample_rate))
        .with_context(|| format!("failed to create {}", output.display()))?;
    let frames = render_timeline(&mut plugin, &timeline, options, &mut writer)?;
    writer.finalize().context("failed to finalize WAV file")?;

    info!(
        frames,
        seconds = frames as f64 / f64::from(config.sample_rate),
        "done"
    );
    Ok(())
}

/// Configuration file (or defaults) with command-line overrides applied
fn build_config(args: &CliArgs) -> Result<SynthConfig> {
    let mut config = match &args.config {
        Some(path) => SynthConfig::from_json_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => SynthConfig::default(),
    };
    if let Some(sample_rate) = args.sample_rate {
        config.sample_rate = sample_rate;
    }
    if let Some(protocol) = args.protocol {
        config.protocol = protocol;
    }
    if args.ay_mode {
        config.mode = ChipMode::Ay;
    }
    config.validate()?;
    Ok(config)
}
