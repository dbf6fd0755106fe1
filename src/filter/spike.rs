use crate::error::{ensure_positive, Result};
use crate::shared::Sample;

use super::Filter;

/// Holds the last good value through short outliers.
///
/// A jump larger than `threshold` is replaced by the last accepted value.
/// The replacement is allowed for `spike_count_limit + 1` samples in a row;
/// after that the new level is accepted, so a real, sustained change in pitch
/// always gets through.
#[derive(Clone, Debug)]
pub struct SpikeFilter {
    threshold: f32,
    spike_count_limit: u32,
    last_valid: Option<f32>,
    spike_count: u32,
}

impl SpikeFilter {
    pub fn new(threshold: f32, spike_count_limit: u32) -> Result<Self> {
        ensure_positive("spike threshold", threshold as f64)?;
        ensure_positive("spike count limit", spike_count_limit as f64)?;
        Ok(Self {
            threshold,
            spike_count_limit,
            last_valid: None,
            spike_count: 0,
        })
    }

    pub fn last_valid(&self) -> Option<f32> {
        self.last_valid
    }

    pub fn spike_count(&self) -> u32 {
        self.spike_count
    }
}

impl Filter for SpikeFilter {
    fn smooth(&mut self, sample: Sample) -> Sample {
        // gaps pass through and leave the history alone
        let Sample::Value(value) = sample else {
            return sample;
        };

        match self.last_valid {
            Some(prev)
                if (value - prev).abs() > self.threshold
                    && self.spike_count <= self.spike_count_limit =>
            {
                self.spike_count += 1;
                log::trace!("spike {value} held at {prev} ({} in a row)", self.spike_count);
                Sample::Value(prev)
            }
            _ => {
                self.last_valid = Some(value);
                self.spike_count = 0;
                Sample::Value(value)
            }
        }
    }

    fn reset(&mut self) {
        self.last_valid = None;
        self.spike_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(filter: &mut SpikeFilter, input: &[f32]) -> Vec<f32> {
        input
            .iter()
            .map(|&v| filter.smooth(Sample::Value(v)).value().unwrap())
            .collect()
    }

    #[test]
    fn constant_stream_passes_through() {
        let mut f = SpikeFilter::new(15.0, 3).unwrap();
        assert_eq!(run(&mut f, &[220.0; 6]), vec![220.0; 6]);
    }

    #[test]
    fn isolated_spike_is_suppressed() {
        let mut f = SpikeFilter::new(15.0, 1).unwrap();
        let out = run(&mut f, &[220.0, 440.0, 221.0]);
        assert_eq!(out, vec![220.0, 220.0, 221.0]);
        assert_eq!(f.spike_count(), 0);
    }

    #[test]
    fn sustained_jump_is_eventually_accepted() {
        let mut f = SpikeFilter::new(15.0, 2).unwrap();
        // limit 2 holds three samples (counts 0, 1, 2 are all <= limit), the fourth wins
        let out = run(&mut f, &[220.0, 330.0, 330.0, 330.0, 330.0, 330.0]);
        assert_eq!(out, vec![220.0, 220.0, 220.0, 220.0, 330.0, 330.0]);
        assert_eq!(f.last_valid(), Some(330.0));
    }

    #[test]
    fn first_sample_is_never_a_spike() {
        let mut f = SpikeFilter::new(1.0, 1).unwrap();
        assert_eq!(f.smooth(Sample::Value(1000.0)), Sample::Value(1000.0));
    }

    #[test]
    fn no_signal_does_not_touch_state() {
        let mut f = SpikeFilter::new(15.0, 1).unwrap();
        f.smooth(Sample::Value(220.0));
        f.smooth(Sample::Value(500.0));
        assert_eq!(f.spike_count(), 1);
        assert_eq!(f.smooth(Sample::NoSignal), Sample::NoSignal);
        assert_eq!(f.spike_count(), 1);
        assert_eq!(f.last_valid(), Some(220.0));
    }

    #[test]
    fn small_moves_are_tracked() {
        let mut f = SpikeFilter::new(15.0, 3).unwrap();
        assert_eq!(run(&mut f, &[220.0, 230.0, 240.0, 250.0]), vec![220.0, 230.0, 240.0, 250.0]);
    }

    #[test]
    fn reset_forgets_history() {
        let mut f = SpikeFilter::new(15.0, 3).unwrap();
        f.smooth(Sample::Value(220.0));
        f.reset();
        assert_eq!(f.smooth(Sample::Value(880.0)), Sample::Value(880.0));
    }

    #[test]
    fn rejects_non_positive_config() {
        assert!(SpikeFilter::new(0.0, 3).is_err());
        assert!(SpikeFilter::new(-5.0, 3).is_err());
        assert!(SpikeFilter::new(f32::NAN, 3).is_err());
        assert!(SpikeFilter::new(15.0, 0).is_err());
    }
}
