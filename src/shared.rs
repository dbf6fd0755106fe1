// Types passed between the pitch pipeline, the detector, the motion
// controller and whoever hosts them.
//
// The flow per estimation tick:
//   raw Hz -> Sample -> SpikeFilter -> y position -> QuantizeFilter -> target y
//   raw Hz -> PitchClass -> ScaleDetector -> ScaleEvent -> ScaleListener
// and per physics tick the MotionController moves the Pose.

pub const NUM_PITCH_CLASSES: u8 = 12;

const NOTE_NAMES: [&str; 13] = [
    "Blank", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

// One value of a scalar stream, or an explicit gap. Filters only ever see
// finite positive values inside `Value`; every way in goes through `from_hz`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Sample {
    #[default]
    NoSignal,
    Value(f32),
}

impl Sample {
    // missing, non-finite or non-positive -> no signal
    pub fn from_hz(hz: Option<f32>) -> Self {
        match hz {
            Some(f) if f.is_finite() && f > 0.0 => Sample::Value(f),
            _ => Sample::NoSignal,
        }
    }

    pub fn value(self) -> Option<f32> {
        match self {
            Sample::Value(v) => Some(v),
            Sample::NoSignal => None,
        }
    }

    pub fn is_signal(self) -> bool {
        matches!(self, Sample::Value(_))
    }

    pub fn map(self, f: impl FnOnce(f32) -> f32) -> Self {
        match self {
            Sample::Value(v) => Sample::Value(f(v)),
            Sample::NoSignal => Sample::NoSignal,
        }
    }
}

impl From<Option<f32>> for Sample {
    fn from(hz: Option<f32>) -> Self {
        Sample::from_hz(hz)
    }
}

/// Octave-independent semitone: 0 is blank (no signal), 1..=12 is C..B.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PitchClass(u8);

impl PitchClass {
    pub const BLANK: PitchClass = PitchClass(0);
    pub const C: PitchClass = PitchClass(1);
    pub const D: PitchClass = PitchClass(3);
    pub const E: PitchClass = PitchClass(5);
    pub const F: PitchClass = PitchClass(6);
    pub const G: PitchClass = PitchClass(8);
    pub const A: PitchClass = PitchClass(10);
    pub const B: PitchClass = PitchClass(12);

    pub fn new(class: u8) -> Option<Self> {
        (class <= NUM_PITCH_CLASSES).then_some(PitchClass(class))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn is_blank(self) -> bool {
        self.0 == 0
    }

    pub fn name(self) -> &'static str {
        NOTE_NAMES[self.0 as usize]
    }
}

impl std::fmt::Display for PitchClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScaleEvent {
    NoteAccepted { note: PitchClass, streak: usize },
    ScaleDiscontinued { final_streak: usize },
}

// read-only view of the session, checked on every tick
pub trait SessionStatus {
    fn is_running(&self) -> bool;
}

impl SessionStatus for bool {
    fn is_running(&self) -> bool {
        *self
    }
}

impl<T: SessionStatus + ?Sized> SessionStatus for &T {
    fn is_running(&self) -> bool {
        (**self).is_running()
    }
}

// rotation in degrees, counter-clockwise, 0 = facing +x
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
}
