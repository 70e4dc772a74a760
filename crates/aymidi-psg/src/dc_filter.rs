//! Stereo DC remover
//!
//! Channel outputs are unipolar (zero up to the DAC level), so the mixed
//! signal sits above zero. [`DcRemover`] subtracts the mean of the last
//! [`WINDOW`] samples from each side.

/// Samples averaged per side (about 23 ms at 44.1 kHz)
pub const WINDOW: usize = 1024;

/// Running mean over a fixed window
#[derive(Clone)]
struct Window {
    history: Box<[f64]>,
    head: usize,
    sum: f64,
}

impl Window {
    fn new() -> Self {
        Self {
            history: vec![0.0; WINDOW].into_boxed_slice(),
            head: 0,
            sum: 0.0,
        }
    }

    /// Push `sample` and return it minus the updated mean
    fn center(&mut self, sample: f64) -> f64 {
        let slot = &mut self.history[self.head];
        self.sum += sample - *slot;
        *slot = sample;
        self.head = (self.head + 1) % WINDOW;
        sample - self.sum / WINDOW as f64
    }

    fn clear(&mut self) {
        self.history.iter_mut().for_each(|s| *s = 0.0);
        self.head = 0;
        self.sum = 0.0;
    }
}

/// Running-mean DC remover for a left/right pair
#[derive(Clone)]
pub struct DcRemover {
    left: Window,
    right: Window,
}

impl DcRemover {
    /// Empty history on both sides
    pub fn new() -> Self {
        Self {
            left: Window::new(),
            right: Window::new(),
        }
    }

    /// Center one stereo frame
    #[inline]
    pub fn process(&mut self, left: f64, right: f64) -> (f64, f64) {
        (self.left.center(left), self.right.center(right))
    }

    /// Forget all history
    pub fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
    }
}

impl Default for DcRemover {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DcRemover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DcRemover")
            .field("mean_left", &(self.left.sum / WINDOW as f64))
            .field("mean_right", &(self.right.sum / WINDOW as f64))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_constant_input_settles_at_zero() {
        let mut dc = DcRemover::new();
        let mut out = (1.0, 1.0);
        for _ in 0..WINDOW + 1 {
            out = dc.process(0.5, 0.2);
        }
        assert_abs_diff_eq!(out.0, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out.1, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sides_are_independent() {
        let mut dc = DcRemover::new();
        for _ in 0..WINDOW {
            dc.process(0.3, 0.0);
        }
        let (left, right) = dc.process(0.3, 0.8);
        assert_abs_diff_eq!(left, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(right, 0.8 - 0.8 / WINDOW as f64, epsilon = 1e-9);
    }

    #[test]
    fn test_step_passes_through() {
        let mut dc = DcRemover::new();
        for _ in 0..2 * WINDOW {
            dc.process(0.25, 0.25);
        }
        let (left, _) = dc.process(0.75, 0.25);
        assert!(left > 0.4, "step should pass, got {left}");
    }

    #[test]
    fn test_clear_forgets_history() {
        let mut dc = DcRemover::new();
        for _ in 0..100 {
            dc.process(1.0, -1.0);
        }
        dc.clear();
        let (left, right) = dc.process(0.0, 0.0);
        assert_eq!((left, right), (0.0, 0.0));
    }
}
