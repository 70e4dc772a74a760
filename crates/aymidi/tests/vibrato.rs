use aymidi::pitch::{note_to_period, MODULATION_PERIOD};
use aymidi::{AyMidi, HostFeatures, SimpleUridMap, SynthConfig, TimedEvent};

/// Render one frame at a time and record (sample counter, tone period of channel 0)
fn tone_periods(setup: &[TimedEvent], frames: usize) -> Vec<(u32, u16)> {
    let mut urids = SimpleUridMap::new();
    let mut plugin =
        AyMidi::instantiate(&SynthConfig::default(), HostFeatures::with_urid_map(&mut urids)).unwrap();
    plugin.activate();

    let mut left = [0.0f32; 1];
    let mut right = [0.0f32; 1];
    plugin.run(setup, &mut left, &mut right);

    let mut periods = Vec::with_capacity(frames);
    for _ in 0..frames {
        plugin.run(&[], &mut left, &mut right);
        let period = plugin.synth().chip().channel_registers(0).unwrap().tone_period;
        periods.push((plugin.synth().sample_counter(), period));
    }
    periods
}

#[test]
fn test_vibrato_repeats_every_8192_samples() {
    let setup = [
        TimedEvent::midi(0, &[0x90, 69, 100]).unwrap(),
        TimedEvent::midi(0, &[0xB0, 1, 127]).unwrap(),
    ];
    let periods = tone_periods(&setup, 3 * MODULATION_PERIOD as usize);

    let cycle = MODULATION_PERIOD as usize;
    for i in 0..2 * cycle {
        assert_eq!(periods[i].1, periods[i + cycle].1, "sample {}", periods[i].0);
    }

    let min = periods.iter().map(|(_, p)| *p).min().unwrap();
    let max = periods.iter().map(|(_, p)| *p).max().unwrap();
    assert_eq!(min, note_to_period(2_000_000, 69.5));
    assert_eq!(max, note_to_period(2_000_000, 68.5));

    for (counter, period) in &periods {
        match counter % MODULATION_PERIOD {
            2048 => assert_eq!(*period, min, "upward peak at {counter}"),
            6144 => assert_eq!(*period, max, "downward peak at {counter}"),
            _ => {}
        }
    }
}

#[test]
fn test_unmodulated_note_keeps_its_period() {
    let setup = [TimedEvent::midi(0, &[0x90, 69, 100]).unwrap()];
    let periods = tone_periods(&setup, 5000);
    let expected = note_to_period(2_000_000, 69.0);
    assert!(periods.iter().all(|(_, p)| *p == expected));
}

#[test]
fn test_vibrato_follows_bend() {
    // Bend +6 semitones (0x3000), then half depth vibrato
    let setup = [
        TimedEvent::midi(0, &[0x90, 57, 100]).unwrap(),
        TimedEvent::midi(0, &[0xE0, 0x00, 0x60]).unwrap(),
        TimedEvent::midi(0, &[0xB0, 1, 64]).unwrap(),
    ];
    let periods = tone_periods(&setup, MODULATION_PERIOD as usize);
    let at_zero_crossing = periods
        .iter()
        .find(|(counter, _)| counter % MODULATION_PERIOD == 4096)
        .map(|(_, p)| *p)
        .unwrap();
    assert_eq!(at_zero_crossing, note_to_period(2_000_000, 63.0));
}
