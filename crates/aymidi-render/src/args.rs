//! Command-line argument parsing for the offline renderer.

use std::env;
use std::path::PathBuf;

use aymidi::ProtocolVariant;

/// Default processing block length in frames
pub const DEFAULT_BLOCK: usize = 256;

/// Default silence rendered after the last MIDI event, in seconds
pub const DEFAULT_TAIL_SECS: f64 = 0.5;

/// Parsed command-line arguments.
#[derive(Debug)]
pub struct CliArgs {
    /// Standard MIDI File to render
    pub input: Option<PathBuf>,
    /// WAV file to write
    pub output: Option<PathBuf>,
    /// JSON engine configuration
    pub config: Option<PathBuf>,
    /// Sample rate override
    pub sample_rate: Option<u32>,
    /// Protocol override
    pub protocol: Option<ProtocolVariant>,
    /// Select the AY DAC curve instead of the configured mode
    pub ay_mode: bool,
    /// Frames per processing block
    pub block: usize,
    /// Seconds rendered after the last event
    pub tail_secs: f64,
    /// Whether help should be printed (requested or an argument was invalid)
    pub show_help: bool,
    /// Whether `-h`/`--help` was given
    pub help_requested: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            config: None,
            sample_rate: None,
            protocol: None,
            ay_mode: false,
            block: DEFAULT_BLOCK,
            tail_secs: DEFAULT_TAIL_SECS,
            show_help: false,
            help_requested: false,
        }
    }
}

impl CliArgs {
    /// Parse arguments from command line.
    pub fn parse() -> Self {
        Self::parse_from(env::args().skip(1))
    }

    /// Parse arguments from any iterator (program name already skipped).
    pub fn parse_from<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = Self::default();
        let mut iter = iter.into_iter();

        while let Some(arg) = iter.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
                _ => (arg.clone(), None),
            };

            match flag.as_str() {
                "--help" | "-h" => {
                    args.show_help = true;
                    args.help_requested = true;
                }
                "--ay" => {
                    args.ay_mode = true;
                }
                "-o" | "--output" | "--config" | "--sample-rate" | "--block" | "--protocol" | "--tail" => {
                    let Some(value) = inline.or_else(|| iter.next()) else {
                        eprintln!("{} requires an argument", flag);
                        args.show_help = true;
                        continue;
                    };
                    if let Err(msg) = args.apply_value(&flag, &value) {
                        eprintln!("{}", msg);
                        args.show_help = true;
                    }
                }
                _ if arg.starts_with('-') && arg.len() > 1 => {
                    eprintln!("Unknown flag: {}", arg);
                    args.show_help = true;
                }
                _ => {
                    if args.input.is_some() {
                        eprintln!("Unexpected extra argument: {}", arg);
                        args.show_help = true;
                    }
                    args.input = Some(PathBuf::from(arg));
                }
            }
        }

        args
    }

    fn apply_value(&mut self, flag: &str, value: &str) -> Result<(), String> {
        match flag {
            "-o" | "--output" => self.output = Some(PathBuf::from(value)),
            "--config" => self.config = Some(PathBuf::from(value)),
            "--sample-rate" => {
                let rate = value
                    .parse::<u32>()
                    .ok()
                    .filter(|rate| *rate > 0)
                    .ok_or_else(|| format!("Invalid sample rate: {}", value))?;
                self.sample_rate = Some(rate);
            }
            "--block" => {
                let block = value
                    .parse::<usize>()
                    .ok()
                    .filter(|block| *block > 0)
                    .ok_or_else(|| format!("Invalid block length: {}", value))?;
                self.block = block;
            }
            "--protocol" => {
                let protocol = value.parse::<ProtocolVariant>().map_err(|err| err.to_string())?;
                self.protocol = Some(protocol);
            }
            "--tail" => {
                let tail = value
                    .parse::<f64>()
                    .ok()
                    .filter(|tail| tail.is_finite() && *tail >= 0.0)
                    .ok_or_else(|| format!("Invalid tail length: {}", value))?;
                self.tail_secs = tail;
            }
            _ => return Err(format!("Unknown flag: {}", flag)),
        }
        Ok(())
    }

    /// Print help text to stderr.
    pub fn print_help() {
        eprintln!(
            "Usage:\n  aymidi-render [options] -o <out.wav> <in.mid>\n\n\
             Options:\n\
             \x20 -o, --output <file>    WAV file to write (32-bit float, stereo)\n\
             \x20 --config <file>        JSON engine configuration\n\
             \x20 --sample-rate <hz>     Output sample rate (default 44100)\n\
             \x20 --block <frames>       Processing block length (default {})\n\
             \x20 --protocol <name>      MIDI protocol:\n\
             \x20                          - expressive (default)\n\
             \x20                          - velocity\n\
             \x20                          - legacy\n\
             \x20 --ay                   Use the AY-3-8910 volume curve\n\
             \x20 --tail <secs>          Silence rendered after the last event (default {})\n\
             \x20 -h, --help             Show this help\n\n\
             MIDI channels 1-3 drive chip voices A-C; other channels are ignored.\n\
             With the expressive and velocity protocols a note-on with velocity 0\n\
             retriggers at level 0 instead of releasing; envelope programs (4-7)\n\
             need real note-off messages to stop.\n\
             Set RUST_LOG=debug for engine diagnostics.\n",
            DEFAULT_BLOCK, DEFAULT_TAIL_SECS
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["song.mid", "-o", "song.wav"]);
        assert_eq!(args.input, Some(PathBuf::from("song.mid")));
        assert_eq!(args.output, Some(PathBuf::from("song.wav")));
        assert_eq!(args.block, DEFAULT_BLOCK);
        assert_eq!(args.tail_secs, DEFAULT_TAIL_SECS);
        assert!(args.protocol.is_none());
        assert!(!args.ay_mode);
        assert!(!args.show_help);
    }

    #[test]
    fn test_all_options() {
        let args = parse(&[
            "--config",
            "synth.json",
            "--sample-rate=48000",
            "--block",
            "64",
            "--protocol",
            "Legacy",
            "--ay",
            "--tail",
            "2.5",
            "--output=out.wav",
            "in.mid",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("synth.json")));
        assert_eq!(args.sample_rate, Some(48_000));
        assert_eq!(args.block, 64);
        assert_eq!(args.protocol, Some(ProtocolVariant::Legacy));
        assert!(args.ay_mode);
        assert_eq!(args.tail_secs, 2.5);
        assert_eq!(args.output, Some(PathBuf::from("out.wav")));
        assert!(!args.show_help);
    }

    #[test]
    fn test_invalid_values_request_help() {
        assert!(parse(&["--block", "0"]).show_help);
        assert!(parse(&["--sample-rate", "fast"]).show_help);
        assert!(parse(&["--protocol", "gm"]).show_help);
        assert!(parse(&["--tail", "-1"]).show_help);
        assert!(parse(&["--frobnicate"]).show_help);
        assert!(parse(&["a.mid", "b.mid"]).show_help);
        assert!(!parse(&["--sample-rate", "fast"]).help_requested);
    }

    #[test]
    fn test_help_flag() {
        let args = parse(&["-h"]);
        assert!(args.show_help);
        assert!(args.help_requested);
    }

    #[test]
    fn test_missing_value_requests_help() {
        let args = parse(&["in.mid", "-o"]);
        assert!(args.show_help);
        assert!(args.output.is_none());
    }
}
