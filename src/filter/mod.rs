use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::shared::Sample;

mod moving_average;
mod quantize;
mod spike;

pub use moving_average::MovingAverageFilter;
pub use quantize::QuantizeFilter;
pub use spike::SpikeFilter;

// Serializable description of a filter stage, so a pipeline can be
// described in the config file and built at session start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterSpec {
    Spike { threshold: f32, spike_count_limit: u32 },
    MovingAverage { window: usize },
    Quantize { step: f32, base: f32 },
}

impl FilterSpec {
    pub fn to_filter(&self) -> Result<Box<dyn Filter>> {
        Ok(match self {
            FilterSpec::Spike { threshold, spike_count_limit } => {
                Box::new(SpikeFilter::new(*threshold, *spike_count_limit)?)
            }
            FilterSpec::MovingAverage { window } => Box::new(MovingAverageFilter::new(*window)?),
            FilterSpec::Quantize { step, base } => Box::new(QuantizeFilter::new(*step, *base)?),
        })
    }

    pub fn label(&self) -> String {
        match self {
            FilterSpec::Spike { threshold, spike_count_limit } => {
                format!("Spike({}, {})", threshold, spike_count_limit)
            }
            FilterSpec::MovingAverage { window } => format!("MovingAverage({})", window),
            FilterSpec::Quantize { step, base } => format!("Quantize({}, {})", step, base),
        }
    }
}

/// A per-tick transform of a scalar stream.
///
/// `NoSignal` never turns into a value; what a filter does with its own
/// history on a gap is up to the filter.
pub trait Filter: Send {
    fn smooth(&mut self, sample: Sample) -> Sample;

    /// Forget all history, as if freshly constructed.
    fn reset(&mut self);
}

/// Runs a sample through each stage in order.
pub fn run_chain(chain: &mut [Box<dyn Filter>], sample: Sample) -> Sample {
    chain.iter_mut().fold(sample, |s, f| f.smooth(s))
}
