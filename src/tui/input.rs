use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use voxrunner::PitchClass;

// The keyboard stands in for the pitch estimator:
//
//   w e   t y u        C# D#    F# G# A#   (off-scale, breaks a run)
//  a s d f g h j       C  D  E  F  G  A  B  (octave 3)
//  Shift + the same    one octave up
//
//   Space              start / restart
//   Esc                quit

pub const BASE_OCTAVE: i32 = 3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    NotePress { class: PitchClass, octave: i32 },
    NoteRelease,
    StartPress,
    Quit,
}

pub fn poll_input(timeout: Duration) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }
    let mut events = Vec::new();
    // drain whatever piled up so key repeat can't lag behind the frame rate
    loop {
        if let Event::Key(key) = event::read()? {
            events.extend(handle_key(key.code, key.kind));
        }
        if !event::poll(Duration::ZERO)? {
            break;
        }
    }
    Ok(events)
}

fn handle_key(code: KeyCode, kind: KeyEventKind) -> Option<InputEvent> {
    let KeyCode::Char(c) = code else {
        return match (code, kind) {
            (KeyCode::Esc, KeyEventKind::Press) => Some(InputEvent::Quit),
            _ => None,
        };
    };

    if c == ' ' {
        return (kind == KeyEventKind::Press).then_some(InputEvent::StartPress);
    }

    let (class, octave) = char_to_note(c)?;
    match kind {
        KeyEventKind::Release => Some(InputEvent::NoteRelease),
        _ => Some(InputEvent::NotePress { class, octave }),
    }
}

// convert key to a pitch class and octave
fn char_to_note(c: char) -> Option<(PitchClass, i32)> {
    let octave = if c.is_ascii_uppercase() { BASE_OCTAVE + 1 } else { BASE_OCTAVE };
    let class = match c.to_ascii_lowercase() {
        'a' => 1, 'w' => 2, 's' => 3, 'e' => 4, 'd' => 5,
        'f' => 6, 't' => 7, 'g' => 8, 'y' => 9, 'h' => 10,
        'u' => 11, 'j' => 12,
        _ => return None,
    };
    Some((PitchClass::new(class)?, octave))
}
