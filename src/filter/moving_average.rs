use std::collections::VecDeque;

use crate::error::{ensure_positive, Result};
use crate::shared::Sample;

use super::Filter;

/// Windowed mean. Raw values pass through until the window is full.
/// A gap drops the oldest entry so stale pitch fades out of the average.
#[derive(Clone, Debug)]
pub struct MovingAverageFilter {
    window: VecDeque<f32>,
    window_size: usize,
    sum: f32,
}

impl MovingAverageFilter {
    pub fn new(window_size: usize) -> Result<Self> {
        ensure_positive("moving average window", window_size as f64)?;
        Ok(Self {
            window: VecDeque::with_capacity(window_size + 1),
            window_size,
            sum: 0.0,
        })
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    fn pop_oldest(&mut self) {
        if let Some(old) = self.window.pop_front() {
            self.sum -= old;
        }
        if self.window.is_empty() {
            // drop accumulated rounding error
            self.sum = 0.0;
        }
    }
}

impl Filter for MovingAverageFilter {
    fn smooth(&mut self, sample: Sample) -> Sample {
        let Sample::Value(value) = sample else {
            self.pop_oldest();
            return sample;
        };

        self.window.push_back(value);
        self.sum += value;
        while self.window.len() > self.window_size {
            self.pop_oldest();
        }

        if self.window.len() == self.window_size {
            Sample::Value(self.sum / self.window_size as f32)
        } else {
            sample
        }
    }

    fn reset(&mut self) {
        self.window.clear();
        self.sum = 0.0;
    }
}
