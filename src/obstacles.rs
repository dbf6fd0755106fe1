// Blocks scrolling in from the right. Kept in an arena: blocks are addressed
// by ObstacleId and removed through the field, never by mutating a list the
// blocks themselves hold on to.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{GameConfig, ObstacleConfig};
use crate::error::Result;
use crate::shared::{Pose, SessionStatus};

const MAX_SPAWN_TRIES: u32 = 10;
const MIN_COOLDOWN: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObstacleId {
    index: u32,
    generation: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    obstacle: Option<Obstacle>,
}

#[derive(Clone, Debug)]
pub struct ObstacleField {
    cfg: ObstacleConfig,
    // spawn lanes are the player's quantize grid: base + k * step
    base: f32,
    step: f32,
    lanes: RangeInclusive<i32>,
    slots: Vec<Slot>,
    free: Vec<usize>,
    level: u32,
    level_clock: f32,
    cooldown: f32,
    prev_y: f32,
    rng: StdRng,
}

impl ObstacleField {
    pub fn new(cfg: &GameConfig, seed: u64) -> Result<Self> {
        cfg.range.validate()?;
        cfg.quantize.validate()?;
        cfg.obstacles.validate(&cfg.range, &cfg.quantize)?;
        let mut field = Self {
            cfg: cfg.obstacles.clone(),
            base: cfg.quantize.base,
            step: cfg.quantize.step,
            lanes: cfg.quantize.lanes_inside(&cfg.range),
            slots: Vec::with_capacity(cfg.obstacles.max_active * 2),
            free: Vec::new(),
            level: 1,
            level_clock: 0.0,
            cooldown: 0.0,
            prev_y: 0.0,
            rng: StdRng::seed_from_u64(seed),
        };
        field.cooldown = field.next_cooldown();
        Ok(field)
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn speed(&self) -> f32 {
        self.level as f32 * self.cfg.speed_per_level
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.obstacle.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.obstacle.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObstacleId, &Obstacle)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.obstacle.as_ref().map(|o| (ObstacleId { index: i as u32, generation: s.generation }, o))
        })
    }

    pub fn insert(&mut self, obstacle: Obstacle) -> ObstacleId {
        let index = match self.free.pop() {
            Some(i) => i,
            None => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            }
        };
        let slot = &mut self.slots[index];
        slot.obstacle = Some(obstacle);
        ObstacleId { index: index as u32, generation: slot.generation }
    }

    /// Stale ids (already removed) return `None`.
    pub fn remove(&mut self, id: ObstacleId) -> Option<Obstacle> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let removed = slot.obstacle.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index as usize);
        Some(removed)
    }

    /// Back to level 1 with no blocks, for a new session.
    pub fn clear(&mut self) {
        let live: Vec<ObstacleId> = self.iter().map(|(id, _)| id).collect();
        for id in live {
            self.remove(id);
        }
        self.level = 1;
        self.level_clock = 0.0;
        self.prev_y = 0.0;
        self.cooldown = self.next_cooldown();
    }

    /// Scroll, despawn, spawn and level up. Frozen while not running.
    pub fn tick(&mut self, session: impl SessionStatus, dt: f32) {
        if !session.is_running() {
            return;
        }

        self.level_clock += dt;
        if self.level_clock >= self.cfg.level_interval {
            self.level_clock -= self.cfg.level_interval;
            self.level += 1;
            log::info!("level {} (block speed {})", self.level, self.speed());
        }

        let dx = self.speed() * dt;
        let (x_min, x_max) = (self.cfg.despawn_x_min, self.cfg.despawn_x_max);
        let mut gone = Vec::new();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if let Some(o) = slot.obstacle.as_mut() {
                o.x -= dx;
                if o.x < x_min || o.x > x_max {
                    gone.push(ObstacleId { index: i as u32, generation: slot.generation });
                }
            }
        }
        for id in gone {
            self.remove(id);
        }

        self.cooldown -= dt;
        if self.cooldown <= 0.0 {
            let y = self.spawn_y();
            self.prev_y = y;
            self.insert(Obstacle { x: self.cfg.spawn_x, y });
            self.cooldown = self.next_cooldown();
        }
    }

    /// First block overlapping an entity at `pose`.
    pub fn collision(&self, pose: &Pose) -> Option<ObstacleId> {
        let e = self.cfg.entity_half_size;
        self.iter()
            .find(|(_, o)| {
                (o.x - pose.x).abs() < self.cfg.block_half_width + e
                    && (o.y - pose.y).abs() < self.cfg.block_half_height + e
            })
            .map(|(id, _)| id)
    }

    // A lane strictly inside the band, at least min_y_gap lanes away from the
    // previous block when a few tries allow it.
    fn spawn_y(&mut self) -> f32 {
        let mut tries = 0;
        loop {
            let y = self.base + self.rng.random_range(self.lanes.clone()) as f32 * self.step;
            tries += 1;
            let gap = ((y - self.prev_y).abs() / self.step).ceil() as u32;
            if gap >= self.cfg.min_y_gap || tries > MAX_SPAWN_TRIES {
                return y;
            }
        }
    }

    // Roughly keeps max_active blocks on screen whatever the speed.
    fn next_cooldown(&mut self) -> f32 {
        let avg_gap = self.cfg.scene_width / self.cfg.max_active as f32;
        let gap = avg_gap + gaussian(&mut self.rng) * self.cfg.gap_std_dev;
        (gap / self.speed()).max(MIN_COOLDOWN)
    }
}

// Standard normal sample, Marsaglia polar method.
fn gaussian(rng: &mut impl Rng) -> f32 {
    loop {
        let v1 = 2.0 * rng.random::<f32>() - 1.0;
        let v2 = 2.0 * rng.random::<f32>() - 1.0;
        let s = v1 * v1 + v2 * v2;
        if s < 1.0 && s > 0.0 {
            return v1 * ((-2.0 * s.ln()) / s).sqrt();
        }
    }
}
