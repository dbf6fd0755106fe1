// Detects runs of consecutive notes from the C major scale.
//
//   C -> D -> E    a run of 3, two accepted steps
//   C              not a run yet
//   C -> E         broken (skips D)
//   F -> F#        broken (F# is not in the scale)
//   C -> blank     broken (silence counts as leaving the scale)

use crossbeam_channel::Sender;

use crate::shared::{PitchClass, ScaleEvent};

/// C D E F G A B, in scale order. B and C are neighbours too.
pub const MAJOR_SCALE: [PitchClass; 7] = [
    PitchClass::C,
    PitchClass::D,
    PitchClass::E,
    PitchClass::F,
    PitchClass::G,
    PitchClass::A,
    PitchClass::B,
];

/// Receives detector events. The session manager implements this; a
/// channel sender or a plain `Vec` work too.
pub trait ScaleListener {
    fn on_note_accepted(&mut self, note: PitchClass, streak: usize);
    fn on_scale_discontinued(&mut self, final_streak: usize);
}

impl ScaleEvent {
    pub fn dispatch(self, listener: &mut (impl ScaleListener + ?Sized)) {
        match self {
            ScaleEvent::NoteAccepted { note, streak } => listener.on_note_accepted(note, streak),
            ScaleEvent::ScaleDiscontinued { final_streak } => {
                listener.on_scale_discontinued(final_streak)
            }
        }
    }
}

impl ScaleListener for Vec<ScaleEvent> {
    fn on_note_accepted(&mut self, note: PitchClass, streak: usize) {
        self.push(ScaleEvent::NoteAccepted { note, streak });
    }

    fn on_scale_discontinued(&mut self, final_streak: usize) {
        self.push(ScaleEvent::ScaleDiscontinued { final_streak });
    }
}

// never blocks the tick; if nobody drains the channel the event is dropped
impl ScaleListener for Sender<ScaleEvent> {
    fn on_note_accepted(&mut self, note: PitchClass, streak: usize) {
        let _ = self.try_send(ScaleEvent::NoteAccepted { note, streak });
    }

    fn on_scale_discontinued(&mut self, final_streak: usize) {
        let _ = self.try_send(ScaleEvent::ScaleDiscontinued { final_streak });
    }
}

fn scale_position(note: PitchClass) -> Option<usize> {
    MAJOR_SCALE.iter().position(|&n| n == note)
}

/// Neighbours in scale order, wrapping B <-> C.
pub fn are_adjacent(a: PitchClass, b: PitchClass) -> bool {
    match (scale_position(a), scale_position(b)) {
        (Some(i), Some(j)) => {
            let d = i.abs_diff(j);
            d == 1 || d == MAJOR_SCALE.len() - 1
        }
        _ => false,
    }
}

#[derive(Clone, Debug, Default)]
pub struct ScaleDetector {
    run: Vec<PitchClass>,
}

impl ScaleDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current unbroken run, oldest first.
    pub fn run(&self) -> &[PitchClass] {
        &self.run
    }

    pub fn streak(&self) -> usize {
        self.run.len()
    }

    pub fn reset(&mut self) {
        self.run.clear();
    }

    /// Feed one pitch class (blank for silence). Returns the event this note
    /// produced, if any.
    pub fn add_note(&mut self, note: PitchClass) -> Option<ScaleEvent> {
        if scale_position(note).is_none() {
            return self.discontinue();
        }

        let Some(&top) = self.run.last() else {
            // a single note isn't a streak yet
            self.run.push(note);
            return None;
        };

        if note == top {
            // held note
            None
        } else if are_adjacent(note, top) {
            self.run.push(note);
            log::debug!("scale note {} accepted, streak {}", note, self.run.len());
            Some(ScaleEvent::NoteAccepted { note, streak: self.run.len() })
        } else {
            // the breaking note is dropped, not used to seed a new run
            self.discontinue()
        }
    }

    /// Same as [`add_note`](Self::add_note) but hands the event straight to
    /// a listener.
    pub fn add_note_to(&mut self, note: PitchClass, listener: &mut (impl ScaleListener + ?Sized)) {
        if let Some(event) = self.add_note(note) {
            event.dispatch(listener);
        }
    }

    fn discontinue(&mut self) -> Option<ScaleEvent> {
        if self.run.is_empty() {
            return None;
        }
        let final_streak = self.run.len();
        self.run.clear();
        log::debug!("scale run broken after {final_streak} notes");
        Some(ScaleEvent::ScaleDiscontinued { final_streak })
    }
}
