// Estimation tick: one pitch estimate in, a new target y and maybe a scale
// event out.
//
//   hz -> spike (-> moving average) -> map to y band -> quantize -> controller target
//   smoothed hz -> pitch class -> detector -> listener

use crate::config::{GameConfig, RangeConfig};
use crate::error::Result;
use crate::filter::{run_chain, Filter, FilterSpec, QuantizeFilter};
use crate::motion::MotionController;
use crate::scale::{map_range, ScaleDetector, ScaleListener};
use crate::shared::{PitchClass, Sample, SessionStatus};

/// What one estimation tick saw and decided, for display and tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriverReport {
    pub frequency: Sample, // after spike filtering
    pub pitch_class: PitchClass,
    pub raw_y: Option<f32>, // mapped, before quantizing
    pub target_y: Option<f32>,
}

pub struct SamplingDriver {
    range: RangeConfig,
    freq_filters: Vec<Box<dyn Filter>>,
    quantize: QuantizeFilter,
    detector: ScaleDetector,
}

impl SamplingDriver {
    pub fn new(cfg: &GameConfig) -> Result<Self> {
        cfg.range.validate()?;
        cfg.estimation.validate()?;

        let mut specs = vec![cfg.spike.to_spec()];
        if let Some(window) = cfg.estimation.moving_average_window {
            specs.push(FilterSpec::MovingAverage { window });
        }
        let freq_filters = specs.iter().map(FilterSpec::to_filter).collect::<Result<Vec<_>>>()?;
        log::debug!(
            "sampling pipeline: {}",
            specs.iter().map(FilterSpec::label).collect::<Vec<_>>().join(" -> ")
        );

        Ok(Self {
            range: cfg.range.clone(),
            freq_filters,
            quantize: QuantizeFilter::new(cfg.quantize.step, cfg.quantize.base)?,
            detector: ScaleDetector::new(),
        })
    }

    pub fn detector(&self) -> &ScaleDetector {
        &self.detector
    }

    /// Fresh history for a new session.
    pub fn on_session_started(&mut self) {
        for f in &mut self.freq_filters {
            f.reset();
        }
        self.detector.reset();
    }

    /// Pitch -> y in the configured band, clamped to it.
    pub fn frequency_to_y(&self, hz: f32) -> f32 {
        let r = &self.range;
        map_range(hz, r.freq_min, r.freq_max, r.y_min, r.y_max).clamp(r.y_min, r.y_max)
    }

    /// Run one estimation tick. Returns `None` (and touches nothing) while
    /// the session isn't running.
    pub fn tick(
        &mut self,
        session: impl SessionStatus,
        estimate: Option<f32>,
        controller: &mut MotionController,
        listener: &mut (impl ScaleListener + ?Sized),
    ) -> Option<DriverReport> {
        if !session.is_running() {
            return None;
        }

        let frequency = run_chain(&mut self.freq_filters, Sample::from_hz(estimate));

        let report = match frequency {
            Sample::Value(hz) => {
                let raw_y = self.frequency_to_y(hz);
                let target_y = self.quantize.quantize(raw_y);
                controller.set_target(target_y);
                DriverReport {
                    frequency,
                    pitch_class: PitchClass::from_hz(hz),
                    raw_y: Some(raw_y),
                    target_y: Some(target_y),
                }
            }
            // silence: target stays where it was, the detector sees a blank
            Sample::NoSignal => DriverReport {
                frequency,
                pitch_class: PitchClass::BLANK,
                raw_y: None,
                target_y: None,
            },
        };

        self.detector.add_note_to(report.pitch_class, listener);
        Some(report)
    }
}
