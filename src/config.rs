// Tunables for the whole game, loaded from <dir>/voxrunner.json when present.
// Defaults are the values the game was tuned with.

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, ensure_range, ConfigError, Result};
use crate::filter::FilterSpec;

pub const CONFIG_FILE: &str = "voxrunner.json";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub spike: SpikeConfig,
    pub quantize: QuantizeConfig,
    pub range: RangeConfig,
    pub estimation: EstimationConfig,
    pub motion: MotionConfig,
    pub obstacles: ObstacleConfig,
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        self.spike.validate()?;
        self.quantize.validate()?;
        self.range.validate()?;
        self.estimation.validate()?;
        self.motion.validate()?;
        self.obstacles.validate(&self.range, &self.quantize)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikeConfig {
    pub threshold: f32, // Hz; ~30 Hz is a whole step around A3
    pub spike_count_limit: u32,
}

impl Default for SpikeConfig {
    fn default() -> Self {
        Self { threshold: 15.0, spike_count_limit: 3 }
    }
}

impl SpikeConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("spike.threshold", self.threshold as f64)?;
        ensure_positive("spike.spike_count_limit", self.spike_count_limit as f64)
    }

    pub fn to_spec(&self) -> FilterSpec {
        FilterSpec::Spike {
            threshold: self.threshold,
            spike_count_limit: self.spike_count_limit,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantizeConfig {
    pub step: f32, // smallest vertical move of the player
    pub base: f32,
}

impl Default for QuantizeConfig {
    fn default() -> Self {
        Self { step: 0.5, base: -4.0 }
    }
}

impl QuantizeConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("quantize.step", self.step as f64)
    }

    // Grid indices k with base + k * step strictly inside the band.
    pub fn lanes_inside(&self, range: &RangeConfig) -> RangeInclusive<i32> {
        let lo = ((range.y_min - self.base) / self.step).floor() as i32 + 1;
        let hi = ((range.y_max - self.base) / self.step).ceil() as i32 - 1;
        lo..=hi
    }
}

/// Pitch range the estimator covers and the vertical band it maps onto.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    pub freq_min: f32,
    pub freq_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self { freq_min: 40.0, freq_max: 600.0, y_min: -4.0, y_max: 4.0 }
    }
}

impl RangeConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("range.freq_min", self.freq_min as f64)?;
        ensure_range("range.freq", self.freq_min as f64, self.freq_max as f64)?;
        ensure_range("range.y", self.y_min as f64, self.y_max as f64)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationConfig {
    pub rate_hz: f32,
    // extra smoothing after the spike filter; off unless set
    pub moving_average_window: Option<usize>,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self { rate_hz: 30.0, moving_average_window: None }
    }
}

impl EstimationConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("estimation.rate_hz", self.rate_hz as f64)?;
        if let Some(window) = self.moving_average_window {
            ensure_positive("estimation.moving_average_window", window as f64)?;
        }
        Ok(())
    }

    pub fn period(&self) -> f32 {
        1.0 / self.rate_hz
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub physics_dt: f32,
    pub chase_time: f32,      // time constant of the chase spring, seconds
    pub wave_amplitude: f32,  // idle bob around follow y
    pub wave_speed: f32,      // units per second
    pub stable_threshold: f32, // seconds in ReachedTarget before cruising
    pub look_ahead: f32,      // horizontal distance of the point the entity faces
    pub turn_time: f32,
    pub snap_epsilon: f32,
    pub entity_x: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            physics_dt: 0.02,
            chase_time: 0.1,
            wave_amplitude: 0.25,
            wave_speed: 2.0,
            stable_threshold: 0.5,
            look_ahead: 5.0,
            turn_time: 0.02,
            snap_epsilon: 0.01,
            entity_x: -6.0,
        }
    }
}

impl MotionConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("motion.physics_dt", self.physics_dt as f64)?;
        ensure_positive("motion.chase_time", self.chase_time as f64)?;
        ensure_positive("motion.wave_amplitude", self.wave_amplitude as f64)?;
        ensure_positive("motion.wave_speed", self.wave_speed as f64)?;
        ensure_positive("motion.stable_threshold", self.stable_threshold as f64)?;
        ensure_positive("motion.look_ahead", self.look_ahead as f64)?;
        ensure_positive("motion.turn_time", self.turn_time as f64)?;
        ensure_positive("motion.snap_epsilon", self.snap_epsilon as f64)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    pub spawn_x: f32,
    pub despawn_x_min: f32,
    pub despawn_x_max: f32,
    pub scene_width: f32, // visible width, used to space blocks out
    pub max_active: usize,
    pub min_y_gap: u32,   // in quantize steps between consecutive blocks
    pub speed_per_level: f32,
    pub level_interval: f32, // seconds per level
    pub gap_std_dev: f32,
    pub block_half_width: f32,
    pub block_half_height: f32,
    pub entity_half_size: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            spawn_x: 15.0,
            despawn_x_min: -20.0,
            despawn_x_max: 20.0,
            scene_width: 26.0,
            max_active: 5,
            min_y_gap: 2,
            speed_per_level: 2.0,
            level_interval: 30.0,
            gap_std_dev: 1.0,
            block_half_width: 0.5,
            block_half_height: 0.25,
            entity_half_size: 0.3,
        }
    }
}

impl ObstacleConfig {
    pub fn validate(&self, range: &RangeConfig, quantize: &QuantizeConfig) -> Result<()> {
        ensure_range("obstacles.despawn_x", self.despawn_x_min as f64, self.despawn_x_max as f64)?;
        ensure_positive("obstacles.scene_width", self.scene_width as f64)?;
        ensure_positive("obstacles.max_active", self.max_active as f64)?;
        ensure_positive("obstacles.speed_per_level", self.speed_per_level as f64)?;
        ensure_positive("obstacles.level_interval", self.level_interval as f64)?;
        ensure_positive("obstacles.block_half_width", self.block_half_width as f64)?;
        ensure_positive("obstacles.block_half_height", self.block_half_height as f64)?;
        ensure_positive("obstacles.entity_half_size", self.entity_half_size as f64)?;

        // the lanes strictly inside the band must outnumber the required gap
        let lanes = quantize.lanes_inside(range).count();
        if lanes < 2 || lanes <= self.min_y_gap as usize {
            return Err(ConfigError::Invalid {
                field: "obstacles.min_y_gap",
                reason: format!("{} lanes can't keep blocks {} steps apart", lanes, self.min_y_gap),
            });
        }
        Ok(())
    }
}

// Missing file is fine (defaults); a broken one is an error.
pub fn load_config(dir: &Path) -> Result<GameConfig> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        log::info!("no {} in {}, using defaults", CONFIG_FILE, dir.display());
        return Ok(GameConfig::default());
    }
    let data = std::fs::read_to_string(&path)?;
    let config: GameConfig = serde_json::from_str(&data)?;
    config.validate()?;
    log::info!("loaded config from {}", path.display());
    Ok(config)
}

pub fn save_config(dir: &Path, config: &GameConfig) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(dir.join(CONFIG_FILE), json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let cfg: GameConfig =
            serde_json::from_str(r#"{ "spike": { "threshold": 20.0 }, "motion": { "wave_speed": 3.0 } }"#)
                .unwrap();
        assert_eq!(cfg.spike.threshold, 20.0);
        assert_eq!(cfg.spike.spike_count_limit, 3);
        assert_eq!(cfg.motion.wave_speed, 3.0);
        assert_eq!(cfg.motion.chase_time, 0.1);
        assert_eq!(cfg.range, RangeConfig::default());
    }

    #[test]
    fn non_positive_values_are_named() {
        let mut cfg = GameConfig::default();
        cfg.quantize.step = 0.0;
        match cfg.validate() {
            Err(ConfigError::NonPositive { field, .. }) => assert_eq!(field, "quantize.step"),
            other => panic!("unexpected {other:?}"),
        }

        let mut cfg = GameConfig::default();
        cfg.estimation.moving_average_window = Some(0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut cfg = GameConfig::default();
        cfg.range.y_min = 4.0;
        cfg.range.y_max = -4.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptyRange { field: "range.y", .. })));
    }

    #[test]
    fn obstacle_gap_must_fit_the_band() {
        let mut cfg = GameConfig::default();
        cfg.obstacles.min_y_gap = 15;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid { field: "obstacles.min_y_gap", .. })));
        cfg.obstacles.min_y_gap = 14;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn lanes_follow_the_quantize_base() {
        let range = RangeConfig::default();
        let on_edge = QuantizeConfig { step: 0.5, base: -4.0 };
        assert_eq!(on_edge.lanes_inside(&range), 1..=15);

        // -3.75 + 0 * 0.5 is already inside the band, -3.75 + 16 * 0.5 is not
        let offset = QuantizeConfig { step: 0.5, base: -3.75 };
        assert_eq!(offset.lanes_inside(&range), 0..=15);
    }

    #[test]
    fn estimation_period() {
        let cfg = EstimationConfig { rate_hz: 25.0, moving_average_window: None };
        assert!((cfg.period() - 0.04).abs() < 1e-6);
    }
}
