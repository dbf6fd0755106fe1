use crate::config::MotionConfig;
use crate::error::Result;
use crate::shared::{Pose, SessionStatus};

use super::damp::{move_towards, smooth_damp, smooth_damp_angle};

// There are three y values:
//   target: where the pitch says the entity should be (written by the sampling driver)
//   follow: where the entity is heading right now; chases target
//   actual: the pose; equals follow while chasing/settling, bobs around it while cruising
//
//   Cruise        -> target != follow                     -> Chase
//   Chase         -> target == follow                     -> ReachedTarget
//   ReachedTarget -> target != follow                     -> Chase
//   ReachedTarget -> settled for stable_threshold seconds -> Cruise
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionMode {
    Cruise,
    Chase,
    ReachedTarget,
}

#[derive(Clone, Debug)]
pub struct MotionController {
    cfg: MotionConfig,
    target_y: f32,
    follow_y: f32,
    pose: Pose,
    mode: MotionMode,
    stable_timer: f32,
    wave_dir: f32, // +1 heading to the top of the bob, -1 to the bottom
    chase_velocity: f32,
    look_y: f32,
}

impl MotionController {
    pub fn new(cfg: MotionConfig, start_y: f32) -> Result<Self> {
        cfg.validate()?;
        let pose = Pose { x: cfg.entity_x, y: start_y, rotation: 0.0 };
        Ok(Self {
            cfg,
            target_y: start_y,
            follow_y: start_y,
            pose,
            mode: MotionMode::Chase,
            stable_timer: 0.0,
            wave_dir: 1.0,
            chase_velocity: 0.0,
            look_y: start_y,
        })
    }

    pub fn mode(&self) -> MotionMode {
        self.mode
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn target_y(&self) -> f32 {
        self.target_y
    }

    pub fn follow_y(&self) -> f32 {
        self.follow_y
    }

    pub fn stable_timer(&self) -> f32 {
        self.stable_timer
    }

    pub fn look_y(&self) -> f32 {
        self.look_y
    }

    pub fn config(&self) -> &MotionConfig {
        &self.cfg
    }

    // written only by the sampling driver
    pub fn set_target(&mut self, y: f32) {
        self.target_y = y;
    }

    // session (re)start: chase from wherever the entity is now
    pub fn restart(&mut self) {
        let y = self.pose.y;
        self.target_y = y;
        self.follow_y = y;
        self.look_y = y;
        self.pose.rotation = 0.0;
        self.stable_timer = 0.0;
        self.chase_velocity = 0.0;
        self.wave_dir = 1.0;
        self.set_mode(MotionMode::Chase);
    }

    pub fn tick(&mut self, session: impl SessionStatus, dt: f32) -> MotionMode {
        if !session.is_running() {
            return self.mode;
        }
        self.update_mode(dt);

        let (new_y, look_y) = match self.mode {
            MotionMode::Cruise => self.cruise(dt),
            MotionMode::Chase => self.chase(dt),
            MotionMode::ReachedTarget => (self.follow_y, self.follow_y),
        };

        self.face(look_y, dt);
        self.pose.y = new_y;
        self.mode
    }

    fn off_target(&self) -> bool {
        (self.follow_y - self.target_y).abs() > self.cfg.snap_epsilon
    }

    fn update_mode(&mut self, dt: f32) {
        if self.off_target() {
            if self.mode != MotionMode::Chase {
                self.stable_timer = 0.0;
                self.set_mode(MotionMode::Chase);
            }
            return;
        }

        match self.mode {
            MotionMode::Chase => {
                self.stable_timer = 0.0;
                self.set_mode(MotionMode::ReachedTarget);
            }
            MotionMode::ReachedTarget => {
                if self.stable_timer >= self.cfg.stable_threshold {
                    self.stable_timer = 0.0;
                    self.set_mode(MotionMode::Cruise);
                } else {
                    self.stable_timer += dt;
                }
            }
            MotionMode::Cruise => {}
        }
    }

    fn set_mode(&mut self, mode: MotionMode) {
        if mode != self.mode {
            log::debug!("motion {:?} -> {:?} (follow {:.2}, target {:.2})", self.mode, mode, self.follow_y, self.target_y);
            if mode == MotionMode::Chase {
                self.chase_velocity = 0.0;
            }
            self.mode = mode;
        }
    }

    // Bob between follow -/+ amplitude at constant speed.
    fn cruise(&mut self, dt: f32) -> (f32, f32) {
        let amp = self.cfg.wave_amplitude;
        let eps = self.cfg.snap_epsilon;
        let top = self.follow_y + amp;
        let bottom = self.follow_y - amp;

        let look_y = if self.wave_dir > 0.0 { top } else { bottom };
        let new_y = move_towards(self.pose.y, look_y, self.cfg.wave_speed * dt);

        // flip at either bound, within epsilon
        if new_y >= top - eps {
            self.wave_dir = -1.0;
        } else if new_y <= bottom + eps {
            self.wave_dir = 1.0;
        }
        (new_y, look_y)
    }

    // Starts from the actual position, which differs from follow only on
    // the first chase tick after cruising.
    fn chase(&mut self, dt: f32) -> (f32, f32) {
        self.follow_y = smooth_damp(
            self.pose.y,
            self.target_y,
            &mut self.chase_velocity,
            self.cfg.chase_time,
            dt,
        );
        if (self.follow_y - self.target_y).abs() <= self.cfg.snap_epsilon {
            self.follow_y = self.target_y;
            self.chase_velocity = 0.0;
        }
        (self.follow_y, self.target_y)
    }

    fn face(&mut self, look_y: f32, dt: f32) {
        self.look_y = look_y;
        let angle = (look_y - self.pose.y).atan2(self.cfg.look_ahead).to_degrees();
        let mut angular_velocity = 0.0;
        self.pose.rotation = smooth_damp_angle(
            self.pose.rotation,
            angle,
            &mut angular_velocity,
            self.cfg.turn_time,
            dt,
        );
    }
}
