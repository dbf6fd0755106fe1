use std::time::Instant;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use voxrunner::{GameConfig, HudState, SessionState};

use super::field::draw_field;
use super::mode::TuiState;

pub fn render(frame: &mut Frame, area: Rect, hud: &HudState, ts: &TuiState, cfg: &GameConfig, now: Instant) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // score + pitch readout
            Constraint::Min(10),   // play field
            Constraint::Length(1), // banner / help
        ])
        .split(area);

    draw_status(frame, sections[0], hud);
    draw_field(frame, sections[1], hud, cfg);
    draw_footer(frame, sections[2], hud, ts, now);
}

fn draw_status(frame: &mut Frame, area: Rect, hud: &HudState) {
    let pitch = match hud.last_report {
        Some(r) => match r.frequency.value() {
            Some(hz) => format!("{} {:.1} Hz", r.pitch_class, hz),
            None => "-".to_string(),
        },
        None => "-".to_string(),
    };
    let run: Vec<&str> = hud.run.iter().map(|n| n.name()).collect();
    let line = Line::from(vec![
        Span::styled(format!("Score: {}  ", hud.score), Style::default().fg(Color::LightMagenta)),
        Span::raw(format!("Level {}  ", hud.level)),
        Span::raw(format!("{:<12}", pitch)),
        Span::styled(format!("run [{}]", run.join(" ")), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_footer(frame: &mut Frame, area: Rect, hud: &HudState, ts: &TuiState, now: Instant) {
    let text = match (hud.session, ts.toast(now)) {
        (SessionState::Ready, _) => "space: start   a-j: sing C..B (shift = octave up)   esc: quit".to_string(),
        (SessionState::Over, _) => format!("game over, score {}   space: play again   esc: quit", hud.score),
        (SessionState::Running, Some(toast)) => toast.to_string(),
        (SessionState::Running, None) => String::new(),
    };
    frame.render_widget(Paragraph::new(text).style(Style::default().fg(Color::Yellow)), area);
}
