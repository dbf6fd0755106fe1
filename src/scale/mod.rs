mod detector;
pub mod pitch;

pub use detector::{are_adjacent, ScaleDetector, ScaleListener, MAJOR_SCALE};
pub use pitch::{class_to_hz, map_range};
