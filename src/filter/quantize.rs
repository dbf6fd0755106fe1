use crate::error::{ensure_positive, Result};
use crate::shared::Sample;

use super::Filter;

/// Snaps values to the grid `base + k * step`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuantizeFilter {
    step: f32,
    base: f32,
}

impl QuantizeFilter {
    pub fn new(step: f32, base: f32) -> Result<Self> {
        ensure_positive("quantize step", step as f64)?;
        Ok(Self { step, base })
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn base(&self) -> f32 {
        self.base
    }

    pub fn quantize(&self, value: f32) -> f32 {
        ((value - self.base) / self.step).round() * self.step + self.base
    }
}

impl Filter for QuantizeFilter {
    fn smooth(&mut self, sample: Sample) -> Sample {
        sample.map(|v| self.quantize(v))
    }

    // stateless
    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snaps_to_offset_grid() {
        let q = QuantizeFilter::new(0.5, -4.0).unwrap();
        assert_eq!(q.quantize(0.1), 0.0);
        assert_eq!(q.quantize(0.3), 0.5);
        assert_eq!(q.quantize(-3.9), -4.0);
        assert_eq!(q.quantize(3.76), 4.0);

        let q = QuantizeFilter::new(2.0, 1.0).unwrap();
        assert_eq!(q.quantize(2.2), 3.0);
        assert_eq!(q.quantize(-0.2), -1.0);
    }

    #[test]
    fn idempotent_and_on_grid() {
        let mut q = QuantizeFilter::new(0.5, -4.0).unwrap();
        for i in -200..200 {
            let x = i as f32 * 0.037;
            let once = q.smooth(Sample::Value(x));
            let twice = q.smooth(once);
            assert_eq!(once, twice, "x = {x}");

            let k = (once.value().unwrap() - q.base()) / q.step();
            assert!((k - k.round()).abs() < 1e-4, "x = {x} landed off grid");
        }
    }

    #[test]
    fn no_signal_passes_through() {
        let mut q = QuantizeFilter::new(1.0, 0.0).unwrap();
        assert_eq!(q.smooth(Sample::NoSignal), Sample::NoSignal);
    }

    #[test]
    fn non_positive_step_is_rejected() {
        assert!(QuantizeFilter::new(0.0, 0.0).is_err());
        assert!(QuantizeFilter::new(-0.5, 0.0).is_err());
    }
}
