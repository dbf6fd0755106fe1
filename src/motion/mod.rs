mod controller;
pub mod damp;

pub use controller::{MotionController, MotionMode};
