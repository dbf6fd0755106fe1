// Reference session manager: lifecycle, score and the latest combo. A host
// with its own game loop can replace it; the core only needs SessionStatus
// and ScaleListener.

use thiserror::Error;

use crate::scale::ScaleListener;
use crate::shared::{PitchClass, SessionStatus};

pub const POINTS_PER_NOTE: u32 = 10;
const SECONDS_PER_POINT: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Ready,
    Running,
    Over,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("can't {action} a session that is {state:?}")]
pub struct SessionError {
    pub action: &'static str,
    pub state: SessionState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Combo {
    pub note: PitchClass,
    pub streak: usize,
}

#[derive(Clone, Debug)]
pub struct GameSession {
    state: SessionState,
    score: u32,
    clock: f32, // seconds since the last survival point
    elapsed: f32,
    last_combo: Option<Combo>,
    best_streak: usize,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Ready,
            score: 0,
            clock: 0.0,
            elapsed: 0.0,
            last_combo: None,
            best_streak: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Seconds spent running in this session.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn last_combo(&self) -> Option<Combo> {
        self.last_combo
    }

    pub fn best_streak(&self) -> usize {
        self.best_streak
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        self.require(SessionState::Ready, "start")?;
        self.score = 0;
        self.clock = 0.0;
        self.elapsed = 0.0;
        self.last_combo = None;
        self.best_streak = 0;
        self.state = SessionState::Running;
        log::info!("session started");
        Ok(())
    }

    pub fn end(&mut self) -> Result<(), SessionError> {
        self.require(SessionState::Running, "end")?;
        self.state = SessionState::Over;
        log::info!("session over, score {} after {:.1}s", self.score, self.elapsed);
        Ok(())
    }

    pub fn restart(&mut self) -> Result<(), SessionError> {
        self.require(SessionState::Over, "restart")?;
        self.state = SessionState::Ready;
        log::info!("session reset");
        Ok(())
    }

    /// One point per second survived.
    pub fn tick(&mut self, dt: f32) {
        if self.state != SessionState::Running {
            return;
        }
        self.elapsed += dt;
        self.clock += dt;
        while self.clock >= SECONDS_PER_POINT {
            self.clock -= SECONDS_PER_POINT;
            self.score += 1;
        }
    }

    fn require(&self, state: SessionState, action: &'static str) -> Result<(), SessionError> {
        if self.state == state {
            Ok(())
        } else {
            Err(SessionError { action, state: self.state })
        }
    }
}

impl SessionStatus for GameSession {
    fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }
}

impl ScaleListener for GameSession {
    fn on_note_accepted(&mut self, note: PitchClass, streak: usize) {
        self.last_combo = Some(Combo { note, streak });
        self.best_streak = self.best_streak.max(streak);
    }

    // the reward lands when the run ends, so longer runs pay more
    fn on_scale_discontinued(&mut self, final_streak: usize) {
        if self.state != SessionState::Running {
            return;
        }
        let reward = final_streak as u32 * POINTS_PER_NOTE;
        self.score += reward;
        log::debug!("scale run of {final_streak} rewarded {reward}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_in_order() {
        let mut s = GameSession::new();
        assert!(!s.is_running());
        s.start().unwrap();
        assert!(s.is_running());
        s.end().unwrap();
        assert_eq!(s.state(), SessionState::Over);
        s.restart().unwrap();
        assert_eq!(s.state(), SessionState::Ready);
    }

    #[test]
    fn out_of_order_transitions_are_refused() {
        let mut s = GameSession::new();
        assert_eq!(s.end(), Err(SessionError { action: "end", state: SessionState::Ready }));
        assert!(s.restart().is_err());
        s.start().unwrap();
        assert!(s.start().is_err());
        assert!(s.is_running());
    }

    #[test]
    fn survival_points_accrue_per_second() {
        let mut s = GameSession::new();
        s.tick(5.0);
        assert_eq!(s.score(), 0);
        s.start().unwrap();
        for _ in 0..125 {
            s.tick(0.02);
        }
        assert_eq!(s.score(), 2);
        assert!((s.elapsed() - 2.5).abs() < 1e-3);
    }

    #[test]
    fn finished_run_is_rewarded() {
        let mut s = GameSession::new();
        s.start().unwrap();
        s.on_note_accepted(PitchClass::D, 2);
        s.on_note_accepted(PitchClass::E, 3);
        assert_eq!(s.last_combo(), Some(Combo { note: PitchClass::E, streak: 3 }));
        s.on_scale_discontinued(3);
        assert_eq!(s.score(), 30);
        assert_eq!(s.best_streak(), 3);
    }

    #[test]
    fn start_clears_previous_score() {
        let mut s = GameSession::new();
        s.start().unwrap();
        s.on_scale_discontinued(4);
        s.end().unwrap();
        s.restart().unwrap();
        s.start().unwrap();
        assert_eq!(s.score(), 0);
        assert_eq!(s.last_combo(), None);
    }
}
