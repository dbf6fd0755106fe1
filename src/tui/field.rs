use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Line, Points, Rectangle};
use ratatui::widgets::Block;
use ratatui::Frame;
use voxrunner::{GameConfig, HudState, MotionMode};

const NOSE: f64 = 0.6; // drawn length of the player's heading

pub fn draw_field(frame: &mut Frame, area: Rect, hud: &HudState, cfg: &GameConfig) {
    let half_width = cfg.obstacles.scene_width as f64 / 2.0;
    let (y_min, y_max) = (cfg.range.y_min as f64, cfg.range.y_max as f64);
    let bw = cfg.obstacles.block_half_width as f64;
    let bh = cfg.obstacles.block_half_height as f64;

    let player_color = match hud.mode {
        MotionMode::Cruise => Color::LightCyan,
        MotionMode::Chase => Color::LightMagenta,
        MotionMode::ReachedTarget => Color::Magenta,
    };

    let canvas = Canvas::default()
        .block(Block::bordered())
        .marker(Marker::Braille)
        .x_bounds([-half_width, half_width])
        .y_bounds([y_min - 0.5, y_max + 0.5])
        .paint(|ctx| {
            for o in &hud.obstacles {
                ctx.draw(&Rectangle {
                    x: o.x as f64 - bw,
                    y: o.y as f64 - bh,
                    width: bw * 2.0,
                    height: bh * 2.0,
                    color: Color::Yellow,
                });
            }

            let (px, py) = (hud.pose.x as f64, hud.pose.y as f64);
            let heading = (hud.pose.rotation as f64).to_radians();
            ctx.draw(&Line {
                x1: px - NOSE * heading.cos(),
                y1: py - NOSE * heading.sin(),
                x2: px + NOSE * heading.cos(),
                y2: py + NOSE * heading.sin(),
                color: player_color,
            });

            // where the voice is pointing
            ctx.draw(&Points {
                coords: &[(px + 1.5, hud.target_y as f64)],
                color: Color::DarkGray,
            });
        });

    frame.render_widget(canvas, area);
}
