// Frequency <-> pitch class helpers.

use crate::shared::{PitchClass, NUM_PITCH_CLASSES};

const A4_HZ: f32 = 440.0;
const A4_MIDI: f32 = 69.0;

impl PitchClass {
    /// Nearest equal-tempered semitone of `hz`, folded to one octave
    /// (A4 = 440 Hz lands on A = 10). Unusable input is blank.
    pub fn from_hz(hz: f32) -> PitchClass {
        if !hz.is_finite() || hz <= 0.0 {
            return PitchClass::BLANK;
        }
        let midi = (12.0 * (hz / A4_HZ).log2() + A4_MIDI).round() as i32;
        let class = midi.rem_euclid(NUM_PITCH_CLASSES as i32) as u8 + 1;
        PitchClass::new(class).unwrap_or(PitchClass::BLANK)
    }
}

/// Reference frequency of a pitch class in a given octave (C4 = middle C).
/// Blank has no frequency.
pub fn class_to_hz(class: PitchClass, octave: i32) -> Option<f32> {
    if class.is_blank() {
        return None;
    }
    let midi = (octave + 1) * 12 + (class.index() as i32 - 1);
    Some(A4_HZ * 2f32.powf((midi as f32 - A4_MIDI) / 12.0))
}

/// Linear map of `v` from one range onto another. No clamping.
pub fn map_range(v: f32, old_min: f32, old_max: f32, new_min: f32, new_max: f32) -> f32 {
    let position = (v - old_min) / (old_max - old_min);
    new_min + position * (new_max - new_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a440_is_a() {
        assert_eq!(PitchClass::from_hz(440.0), PitchClass::A);
        assert_eq!(PitchClass::from_hz(440.0).index(), 10);
    }

    #[test]
    fn octaves_fold_together() {
        for hz in [110.0, 220.0, 880.0, 1760.0] {
            assert_eq!(PitchClass::from_hz(hz), PitchClass::from_hz(440.0));
        }
        assert_eq!(PitchClass::from_hz(261.63), PitchClass::C);
        assert_eq!(PitchClass::from_hz(523.25), PitchClass::C);
    }

    #[test]
    fn b_and_c_wrap() {
        assert_eq!(PitchClass::from_hz(246.94), PitchClass::B);
        assert_eq!(PitchClass::from_hz(493.88), PitchClass::B);
        // a quarter tone under C rounds up to C, not past 12
        assert_eq!(PitchClass::from_hz(257.0), PitchClass::C);
    }

    #[test]
    fn unusable_frequency_is_blank() {
        assert!(PitchClass::from_hz(0.0).is_blank());
        assert!(PitchClass::from_hz(-440.0).is_blank());
        assert!(PitchClass::from_hz(f32::NAN).is_blank());
    }

    #[test]
    fn every_class_round_trips_through_hz() {
        for i in 1..=12 {
            let class = PitchClass::new(i).unwrap();
            for octave in 2..6 {
                let hz = class_to_hz(class, octave).unwrap();
                assert_eq!(PitchClass::from_hz(hz), class, "{class} in octave {octave}");
            }
        }
        assert_eq!(class_to_hz(PitchClass::BLANK, 4), None);
        assert!((class_to_hz(PitchClass::A, 4).unwrap() - 440.0).abs() < 1e-3);
    }

    #[test]
    fn map_range_is_linear() {
        assert_eq!(map_range(40.0, 40.0, 600.0, -4.0, 4.0), -4.0);
        assert_eq!(map_range(600.0, 40.0, 600.0, -4.0, 4.0), 4.0);
        assert_eq!(map_range(320.0, 40.0, 600.0, -4.0, 4.0), 0.0);
    }
}
