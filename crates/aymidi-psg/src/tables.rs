//! PSG Hardware Constants
//!
//! DAC curves and envelope segment tables shared by the generators and the chip.

/// AY-3-8910 DAC curve (normalized to 0.0-1.0)
///
/// The AY has only 16 output levels; each level is duplicated so the table
/// can be indexed by the same 5-bit value as the YM curve.
pub const AY_DAC_TABLE: [f64; 32] = [
    0.0,
    0.0,
    0.00999465934234,
    0.00999465934234,
    0.0144502937362,
    0.0144502937362,
    0.0210574502174,
    0.0210574502174,
    0.0307011520562,
    0.0307011520562,
    0.0455481803616,
    0.0455481803616,
    0.0644998855573,
    0.0644998855573,
    0.107362478065,
    0.107362478065,
    0.126588845655,
    0.126588845655,
    0.20498970016,
    0.20498970016,
    0.292210269322,
    0.292210269322,
    0.372838941024,
    0.372838941024,
    0.492530708782,
    0.492530708782,
    0.635324635691,
    0.635324635691,
    0.805584802014,
    0.805584802014,
    1.0,
    1.0,
];

/// YM2149 DAC curve (normalized to 0.0-1.0), 32 levels
///
/// Fixed amplitudes use the odd entries (`volume * 2 + 1`); the envelope
/// walks through all of them.
pub const YM_DAC_TABLE: [f64; 32] = [
    0.0,
    0.0,
    0.00465400167849,
    0.00772106507973,
    0.0109559777218,
    0.0139620050355,
    0.0169985503929,
    0.0200198367285,
    0.024368657969,
    0.029694056611,
    0.0350652323186,
    0.0403906309606,
    0.0485389486534,
    0.0583352407111,
    0.0680552376593,
    0.0777752346075,
    0.0925154497597,
    0.111085679408,
    0.129747463188,
    0.148485542077,
    0.17666895552,
    0.211551079576,
    0.246387426566,
    0.281101701381,
    0.333730067903,
    0.400427252613,
    0.467383840696,
    0.53443198291,
    0.635172045472,
    0.75800717174,
    0.879926756695,
    1.0,
];

/// Highest envelope step (5-bit)
pub const ENVELOPE_TOP: i32 = 31;

/// What the envelope does during one of its two segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Count 0 → 31, then move to the other segment
    SlideUp,
    /// Count 31 → 0, then move to the other segment
    SlideDown,
    /// Stay at 31
    HoldTop,
    /// Stay at 0
    HoldBottom,
}

impl Segment {
    /// Level the envelope starts from when entering this segment
    #[inline]
    pub fn start_level(self) -> i32 {
        match self {
            Segment::SlideDown | Segment::HoldTop => ENVELOPE_TOP,
            Segment::SlideUp | Segment::HoldBottom => 0,
        }
    }
}

/// Two segments per envelope shape (register R13 values 0-15)
///
/// Shapes 0-7 all end holding at zero; only bits 2 (attack) matters for them.
/// Shapes 8-15 continue: alternate flips the direction of the second segment,
/// hold freezes it.
pub const SHAPE_SEGMENTS: [[Segment; 2]; 16] = {
    use Segment::*;
    [
        [SlideDown, HoldBottom],
        [SlideDown, HoldBottom],
        [SlideDown, HoldBottom],
        [SlideDown, HoldBottom],
        [SlideUp, HoldBottom],
        [SlideUp, HoldBottom],
        [SlideUp, HoldBottom],
        [SlideUp, HoldBottom],
        [SlideDown, SlideDown],
        [SlideDown, HoldBottom],
        [SlideDown, SlideUp],
        [SlideDown, HoldTop],
        [SlideUp, SlideUp],
        [SlideUp, HoldTop],
        [SlideUp, SlideDown],
        [SlideUp, HoldBottom],
    ]
};

/// DAC table for a chip mode
#[inline]
pub fn dac_table(mode: crate::ChipMode) -> &'static [f64; 32] {
    match mode {
        crate::ChipMode::Ay => &AY_DAC_TABLE,
        crate::ChipMode::Ym => &YM_DAC_TABLE,
    }
}
