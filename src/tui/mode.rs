use std::time::{Duration, Instant};

use voxrunner::scale::class_to_hz;
use voxrunner::{PitchClass, ScaleEvent};

use super::input::InputEvent;

// Without key release reporting a note lasts this long after its last
// press or auto-repeat.
const HOLD_WINDOW: Duration = Duration::from_millis(300);
const TOAST_TIME: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug)]
struct HeldNote {
    hz: f32,
    pressed_at: Instant,
}

// state local to the tui: the note being "sung" and the last banner
#[derive(Clone, Debug, Default)]
pub struct TuiState {
    held: Option<HeldNote>,
    toast: Option<(String, Instant)>,
}

impl TuiState {
    pub fn apply(&mut self, event: InputEvent, now: Instant) {
        match event {
            InputEvent::NotePress { class, octave } => {
                self.held = class_to_hz(class, octave).map(|hz| HeldNote { hz, pressed_at: now });
            }
            InputEvent::NoteRelease => self.held = None,
            _ => {}
        }
    }

    /// What the pretend pitch estimator hears right now.
    pub fn estimate(&self, now: Instant) -> Option<f32> {
        self.held
            .filter(|h| now.duration_since(h.pressed_at) <= HOLD_WINDOW)
            .map(|h| h.hz)
    }

    pub fn on_scale_event(&mut self, event: ScaleEvent, now: Instant) {
        let text = match event {
            ScaleEvent::NoteAccepted { note, streak } => format!("C major combo! {} streak: {}", note, streak),
            ScaleEvent::ScaleDiscontinued { final_streak } if final_streak > 1 => {
                format!("+{} for a {}-note run", final_streak * 10, final_streak)
            }
            ScaleEvent::ScaleDiscontinued { .. } => return,
        };
        self.toast = Some((text, now));
    }

    pub fn toast(&self, now: Instant) -> Option<&str> {
        self.toast
            .as_ref()
            .filter(|(_, at)| now.duration_since(*at) <= TOAST_TIME)
            .map(|(text, _)| text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_note_expires_without_repeat() {
        let mut ts = TuiState::default();
        let t0 = Instant::now();
        ts.apply(InputEvent::NotePress { class: PitchClass::A, octave: 4 }, t0);
        assert!((ts.estimate(t0).unwrap() - 440.0).abs() < 1e-3);
        assert_eq!(ts.estimate(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn release_silences_immediately() {
        let mut ts = TuiState::default();
        let t0 = Instant::now();
        ts.apply(InputEvent::NotePress { class: PitchClass::C, octave: 3 }, t0);
        ts.apply(InputEvent::NoteRelease, t0);
        assert_eq!(ts.estimate(t0), None);
    }

    #[test]
    fn single_note_break_shows_no_banner() {
        let mut ts = TuiState::default();
        let t0 = Instant::now();
        ts.on_scale_event(ScaleEvent::ScaleDiscontinued { final_streak: 1 }, t0);
        assert_eq!(ts.toast(t0), None);
        ts.on_scale_event(ScaleEvent::NoteAccepted { note: PitchClass::D, streak: 2 }, t0);
        assert_eq!(ts.toast(t0), Some("C major combo! D streak: 2"));
    }
}
