// Host-side glue: owns every component and serializes the two tick sources
// (estimation and physics) onto the caller's thread. The presentation layer
// only reads `hud()` and drains events.

use crossbeam_channel::{Receiver, Sender};

use crate::config::GameConfig;
use crate::driver::{DriverReport, SamplingDriver};
use crate::error::Result;
use crate::motion::{MotionController, MotionMode};
use crate::obstacles::{Obstacle, ObstacleField};
use crate::scale::ScaleListener;
use crate::session::{Combo, GameSession, SessionError, SessionState};
use crate::shared::{PitchClass, Pose, ScaleEvent, SessionStatus};

const EVENT_QUEUE: usize = 256;
// longest frame we try to catch up on; beyond that the simulation just slows down
const MAX_FRAME: f32 = 0.25;

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug)]
pub struct HudState {
    pub session: SessionState,
    pub score: u32,
    pub level: u32,
    pub pose: Pose,
    pub mode: MotionMode,
    pub target_y: f32,
    pub follow_y: f32,
    pub obstacles: Vec<Obstacle>,
    pub last_report: Option<DriverReport>,
    pub last_combo: Option<Combo>,
    pub run: Vec<PitchClass>,
}

// fans detector events out to the session (scoring) and the event queue (display)
struct Fanout<'a> {
    session: &'a mut GameSession,
    tx: &'a mut Sender<ScaleEvent>,
}

impl ScaleListener for Fanout<'_> {
    fn on_note_accepted(&mut self, note: PitchClass, streak: usize) {
        self.session.on_note_accepted(note, streak);
        self.tx.on_note_accepted(note, streak);
    }

    fn on_scale_discontinued(&mut self, final_streak: usize) {
        self.session.on_scale_discontinued(final_streak);
        self.tx.on_scale_discontinued(final_streak);
    }
}

pub struct Game {
    cfg: GameConfig,
    session: GameSession,
    driver: SamplingDriver,
    controller: MotionController,
    obstacles: ObstacleField,
    events_tx: Sender<ScaleEvent>,
    events_rx: Receiver<ScaleEvent>,
    estimation_clock: f32,
    physics_clock: f32,
    last_report: Option<DriverReport>,
}

impl Game {
    pub fn new(cfg: GameConfig, seed: u64) -> Result<Self> {
        cfg.validate()?;
        let (events_tx, events_rx) = crossbeam_channel::bounded(EVENT_QUEUE);
        let start_y = (cfg.range.y_min + cfg.range.y_max) * 0.5;
        Ok(Self {
            driver: SamplingDriver::new(&cfg)?,
            controller: MotionController::new(cfg.motion.clone(), start_y)?,
            obstacles: ObstacleField::new(&cfg, seed)?,
            session: GameSession::new(),
            events_tx,
            events_rx,
            estimation_clock: 0.0,
            physics_clock: 0.0,
            last_report: None,
            cfg,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.cfg
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn controller(&self) -> &MotionController {
        &self.controller
    }

    pub fn obstacles(&self) -> &ObstacleField {
        &self.obstacles
    }

    /// Ready -> Running. Filters, detector, controller and blocks start fresh.
    pub fn start(&mut self) -> std::result::Result<(), SessionError> {
        self.session.start()?;
        self.driver.on_session_started();
        self.controller.restart();
        self.obstacles.clear();
        self.estimation_clock = 0.0;
        self.physics_clock = 0.0;
        self.last_report = None;
        Ok(())
    }

    /// Over -> Ready.
    pub fn restart(&mut self) -> std::result::Result<(), SessionError> {
        self.session.restart()
    }

    pub fn end(&mut self) -> std::result::Result<(), SessionError> {
        self.session.end()
    }

    /// Advance wall-clock time by `elapsed` seconds. `estimate` is polled
    /// once per estimation tick and returns the current pitch in Hz, if any.
    pub fn tick(&mut self, elapsed: f32, mut estimate: impl FnMut() -> Option<f32>) {
        if !self.session.is_running() {
            return;
        }
        let elapsed = elapsed.clamp(0.0, MAX_FRAME);

        let period = self.cfg.estimation.period();
        let dt = self.cfg.motion.physics_dt;
        self.estimation_clock += elapsed;
        self.physics_clock += elapsed;

        // Step whichever clock is due earliest; the one with more time left
        // over became due first. Ties go to estimation so physics sees the
        // new target.
        while self.session.is_running() {
            let estimation_lead = self.estimation_clock - period;
            let physics_lead = self.physics_clock - dt;
            if estimation_lead < 0.0 && physics_lead < 0.0 {
                break;
            }
            if estimation_lead >= physics_lead {
                self.estimation_clock -= period;
                self.estimation_step(estimate());
            } else {
                self.physics_clock -= dt;
                self.physics_step(dt);
            }
        }

        self.session.tick(elapsed);
    }

    fn estimation_step(&mut self, hz: Option<f32>) {
        let running = self.session.is_running();
        let mut fanout = Fanout { session: &mut self.session, tx: &mut self.events_tx };
        let report = self.driver.tick(running, hz, &mut self.controller, &mut fanout);
        if report.is_some() {
            self.last_report = report;
        }
    }

    fn physics_step(&mut self, dt: f32) {
        self.controller.tick(&self.session, dt);
        self.obstacles.tick(&self.session, dt);
        if let Some(id) = self.obstacles.collision(&self.controller.pose()) {
            log::info!("hit obstacle {:?} at y {:.2}", id, self.controller.pose().y);
            if let Err(err) = self.session.end() {
                log::warn!("collision after the session stopped: {err}");
            }
        }
    }

    /// Scale events since the last call, oldest first.
    pub fn drain_events(&self) -> Vec<ScaleEvent> {
        self.events_rx.try_iter().collect()
    }

    pub fn hud(&self) -> HudState {
        HudState {
            session: self.session.state(),
            score: self.session.score(),
            level: self.obstacles.level(),
            pose: self.controller.pose(),
            mode: self.controller.mode(),
            target_y: self.controller.target_y(),
            follow_y: self.controller.follow_y(),
            obstacles: self.obstacles.iter().map(|(_, o)| *o).collect(),
            last_report: self.last_report,
            last_combo: self.session.last_combo(),
            run: self.driver.detector().run().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::class_to_hz;

    fn game() -> Game {
        Game::new(GameConfig::default(), 1).unwrap()
    }

    #[test]
    fn idle_until_started() {
        let mut g = game();
        let mut polled = 0;
        g.tick(1.0, || {
            polled += 1;
            Some(440.0)
        });
        assert_eq!(polled, 0);
        assert_eq!(g.hud().session, SessionState::Ready);
    }

    #[test]
    fn estimation_runs_at_its_own_rate() {
        let mut g = game();
        g.start().unwrap();
        let mut polled = 0;
        for _ in 0..60 {
            g.tick(1.0 / 60.0, || {
                polled += 1;
                None
            });
        }
        // one second at 30 Hz, give or take the accumulator edge
        assert!((29..=30).contains(&polled), "polled {polled}");
    }

    #[test]
    fn held_pitch_moves_the_entity() {
        let mut g = game();
        g.start().unwrap();
        let hz = 520.0;
        for _ in 0..60 {
            g.tick(1.0 / 60.0, || Some(hz));
        }
        let hud = g.hud();
        let expected = g.driver.frequency_to_y(hz);
        assert!((hud.target_y - expected).abs() <= g.config().quantize.step / 2.0 + 1e-4);
        assert!(hud.pose.y > 0.0);
    }

    #[test]
    fn scale_run_scores_and_reaches_the_queue() {
        let mut g = game();
        g.start().unwrap();
        let notes = [PitchClass::C, PitchClass::D, PitchClass::E];
        for note in notes {
            let hz = class_to_hz(note, 3);
            for _ in 0..12 {
                g.tick(1.0 / 30.0, || hz);
            }
        }
        for _ in 0..3 {
            g.tick(1.0 / 30.0, || None);
        }
        let events = g.drain_events();
        assert_eq!(
            events,
            vec![
                ScaleEvent::NoteAccepted { note: PitchClass::D, streak: 2 },
                ScaleEvent::NoteAccepted { note: PitchClass::E, streak: 3 },
                ScaleEvent::ScaleDiscontinued { final_streak: 3 },
            ]
        );
        assert!(g.session().score() >= 30);
        assert!(g.drain_events().is_empty());
    }

    fn rising(calls: &mut u32) -> Option<f32> {
        *calls += 1;
        Some(200.0 + 10.0 * *calls as f32)
    }

    #[test]
    fn long_frame_matches_short_frames() {
        // 15 physics steps and 7 estimation steps, never on the same instant
        let mut cfg = GameConfig::default();
        cfg.motion.physics_dt = 0.015;

        let mut long = Game::new(cfg.clone(), 3).unwrap();
        long.start().unwrap();
        let mut long_calls = 0;
        long.tick(0.235, || rising(&mut long_calls));

        let mut short = Game::new(cfg, 3).unwrap();
        short.start().unwrap();
        let mut short_calls = 0;
        for _ in 0..47 {
            short.tick(0.005, || rising(&mut short_calls));
        }

        assert_eq!(long_calls, 7);
        assert_eq!(short_calls, 7);
        let (a, b) = (long.hud(), short.hud());
        assert_eq!(a.target_y, b.target_y);
        assert!((a.pose.y - b.pose.y).abs() < 1e-4, "{} vs {}", a.pose.y, b.pose.y);
        assert!((a.follow_y - b.follow_y).abs() < 1e-4);
    }

    #[test]
    fn collision_stops_the_rest_of_the_frame() {
        let mut g = game();
        g.start().unwrap();
        let pose = g.controller.pose();
        g.obstacles.insert(Obstacle { x: pose.x + 0.1, y: pose.y });
        // the first physics step (0.02 s) comes before the first estimate (1/30 s)
        let mut polled = 0;
        g.tick(0.25, || {
            polled += 1;
            None
        });
        assert_eq!(g.hud().session, SessionState::Over);
        assert_eq!(polled, 0);
    }

    #[test]
    fn collision_ends_the_session() {
        let mut g = game();
        g.start().unwrap();
        let pose = g.controller.pose();
        g.obstacles.insert(Obstacle { x: pose.x + 0.1, y: pose.y });
        g.tick(0.05, || None);
        assert_eq!(g.hud().session, SessionState::Over);

        g.restart().unwrap();
        g.start().unwrap();
        assert!(g.obstacles().is_empty());
        assert_eq!(g.session().score(), 0);
    }
}
