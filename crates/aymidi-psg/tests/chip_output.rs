use aymidi_psg::{ChipMode, PanLaw, Psg, PsgBackend};

const SAMPLE_RATE: u32 = 44_100;

fn render(psg: &mut Psg, samples: usize) -> Vec<f64> {
    (0..samples).map(|_| psg.process().0).collect()
}

fn rising_edges(signal: &[f64], threshold: f64) -> usize {
    signal
        .windows(2)
        .filter(|w| w[0] < threshold && w[1] >= threshold)
        .count()
}

fn tone_chip(period: u16) -> Psg {
    let mut psg = Psg::with_config(ChipMode::Ym, 2_000_000, SAMPLE_RATE);
    psg.set_mixer(0, true, false);
    psg.set_tone_period(0, period);
    psg.set_volume(0, 15);
    psg.set_pan(0, 0.0, PanLaw::Linear);
    psg
}

#[test]
fn test_tone_frequency() {
    // 2 MHz / (16 * 284) = 440.1 Hz
    let mut psg = tone_chip(284);
    let signal = render(&mut psg, SAMPLE_RATE as usize);
    let edges = rising_edges(&signal, 0.5);
    assert!((438..=442).contains(&edges), "expected ~440 cycles, got {edges}");
}

#[test]
fn test_tone_frequency_follows_clock() {
    let mut psg = tone_chip(284);
    psg.configure(ChipMode::Ym, 1_000_000, SAMPLE_RATE).unwrap();
    let signal = render(&mut psg, SAMPLE_RATE as usize);
    let edges = rising_edges(&signal, 0.5);
    assert!((218..=222).contains(&edges), "expected ~220 cycles, got {edges}");
}

#[test]
fn test_noise_is_irregular() {
    let mut psg = Psg::new();
    psg.set_mixer(0, false, true);
    psg.set_noise_period(1);
    psg.set_volume(0, 15);
    let signal = render(&mut psg, 4096);
    let high = signal.iter().filter(|s| **s > 0.25).count();
    assert!(high > 1000 && high < 3000, "noise duty {high}/4096");
}

#[test]
fn test_envelope_sweeps_levels() {
    let mut psg = Psg::new();
    psg.set_mixer(0, false, false);
    psg.set_envelope_on(0, true);
    psg.set_envelope_period(16);
    psg.set_envelope_shape(0x0E);
    let signal = render(&mut psg, 4096);

    let min = signal.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = signal.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert!(min < 0.05, "triangle reaches the bottom, min {min}");
    assert!(max > 0.3, "triangle reaches the top, max {max}");
}

#[test]
fn test_envelope_hold_stays_silent() {
    let mut psg = Psg::new();
    psg.set_mixer(0, false, false);
    psg.set_envelope_on(0, true);
    psg.set_envelope_period(1);
    psg.set_envelope_shape(0x00);
    let signal = render(&mut psg, 2048);
    assert!(signal[1024..].iter().all(|s| *s == 0.0));
}

#[test]
fn test_ay_and_ym_curves_differ() {
    let mut ay = Psg::with_config(ChipMode::Ay, 2_000_000, SAMPLE_RATE);
    let mut ym = Psg::with_config(ChipMode::Ym, 2_000_000, SAMPLE_RATE);
    for psg in [&mut ay, &mut ym] {
        psg.set_mixer(1, false, false);
        psg.set_volume(1, 8);
    }
    assert_ne!(ay.process(), ym.process());
}

#[test]
fn test_three_channels_mix() {
    let mut psg = Psg::new();
    for channel in 0..3 {
        psg.set_mixer(channel, false, false);
        psg.set_volume(channel, 15);
    }
    psg.set_pan(0, 0.0, PanLaw::Linear);
    psg.set_pan(1, 1.0, PanLaw::Linear);
    psg.set_pan(2, 0.5, PanLaw::Linear);
    let (left, right) = psg.process();
    assert_eq!(left, 1.5);
    assert_eq!(right, 1.5);
}
