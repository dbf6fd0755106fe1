//! Control core for a voice-driven side scroller.
//!
//! A pitch estimate (Hz or nothing) comes in at a fixed rate and is turned
//! into a target height for the player ([`SamplingDriver`]), which a
//! three-state [`MotionController`] chases smoothly on the physics tick.
//! Alongside, a [`ScaleDetector`] watches for runs of neighbouring C major
//! notes and reports them to a [`ScaleListener`].
//!
//! [`Game`] wires all of it together with a reference [`GameSession`] and an
//! [`ObstacleField`] for hosts that just want a playable loop.

pub mod config;
pub mod driver;
pub mod error;
pub mod filter;
pub mod game;
pub mod motion;
pub mod obstacles;
pub mod scale;
pub mod session;
pub mod shared;

pub use config::GameConfig;
pub use driver::{DriverReport, SamplingDriver};
pub use error::{ConfigError, Result};
pub use filter::{Filter, FilterSpec, MovingAverageFilter, QuantizeFilter, SpikeFilter};
pub use game::{Game, HudState};
pub use motion::{MotionController, MotionMode};
pub use obstacles::{Obstacle, ObstacleField, ObstacleId};
pub use scale::{ScaleDetector, ScaleListener};
pub use session::{GameSession, SessionError, SessionState};
pub use shared::{PitchClass, Pose, Sample, ScaleEvent, SessionStatus};
