//! Rendering layer - all terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! game state. No game logic is performed; this module only translates the
//! 800x600 logical playfield into terminal cells and queues crossterm
//! commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};

use crate::consts::*;
use crate::sim::{Brick, GamePhase, GameState, PowerUp, PowerUpKind};

// ── Cell geometry ─────────────────────────────────────────────────────────────

/// Logical pixels per terminal column / row
const CELL_W: f32 = 10.0;
const CELL_H: f32 = 20.0;

/// Field size in cells (800x600 px at the scale above)
const FIELD_COLS: u16 = (SCREEN_WIDTH / CELL_W) as u16;
const FIELD_ROWS: u16 = (SCREEN_HEIGHT / CELL_H) as u16;

/// Top-left of the playfield on screen (row 0 is the HUD, row 1 the border)
const ORIGIN_X: u16 = 1;
const ORIGIN_Y: u16 = 2;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_HUD_HIGH: Color = Color::Cyan;
const C_PADDLE: Color = Color::White;
const C_BALL: Color = Color::White;
const C_POWERUP_WIDEN: Color = Color::Yellow;
const C_POWERUP_LIFE: Color = Color::Green;
const C_WIDEN_BAR: Color = Color::Green;
const C_HINT: Color = Color::DarkGrey;

fn cell_x(px: f32) -> u16 {
    ORIGIN_X + (px / CELL_W).clamp(0.0, (FIELD_COLS - 1) as f32) as u16
}

fn cell_y(px: f32) -> u16 {
    ORIGIN_Y + (px / CELL_H).clamp(0.0, (FIELD_ROWS - 1) as f32) as u16
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame. `flash` is a short-lived status message from
/// the event layer (brick points, power-up pickups).
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    flash: Option<&str>,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out)?;
    draw_hud(out, state, flash)?;

    for brick in &state.bricks {
        draw_brick(out, brick)?;
    }
    for powerup in &state.powerups {
        draw_powerup(out, powerup)?;
    }
    draw_paddle(out, state)?;
    draw_ball(out, state)?;
    draw_controls_hint(out)?;

    match state.phase {
        GamePhase::Paused => draw_overlay(out, "Paused - P to resume")?,
        GamePhase::GameOver => draw_game_over(out, state)?,
        GamePhase::Playing => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, ORIGIN_Y + FIELD_ROWS + 1))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W) -> std::io::Result<()> {
    let w = FIELD_COLS as usize;

    out.queue(style::SetForegroundColor(C_BORDER))?;
    out.queue(cursor::MoveTo(0, ORIGIN_Y - 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w))))?;

    for row in 0..FIELD_ROWS {
        out.queue(cursor::MoveTo(0, ORIGIN_Y + row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(ORIGIN_X + FIELD_COLS, ORIGIN_Y + row))?;
        out.queue(Print("│"))?;
    }

    // The bottom edge is open in play; the frame is only visual
    out.queue(cursor::MoveTo(0, ORIGIN_Y + FIELD_ROWS))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w))))?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &GameState, flash: Option<&str>) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!(
        "Score: {:>6}   Level: {}",
        state.score, state.level
    )))?;

    // High score - centre
    let high = format!("High: {}", state.high_score);
    let hx = (ORIGIN_X + FIELD_COLS / 2).saturating_sub(high.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(hx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HIGH))?;
    out.queue(Print(&high))?;

    // Lives - right
    let hearts: String = "♥".repeat(state.lives as usize);
    let lives_text = format!("Lives: {}", hearts);
    let rx = (ORIGIN_X + FIELD_COLS).saturating_sub(lives_text.chars().count() as u16);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives_text))?;

    // Widen countdown bar, right of the high score
    if let Some(effect) = state.paddle.widen {
        let remaining_secs = effect.remaining_ticks(state.time_ticks) / TICK_RATE as u64;
        let filled = (effect.fraction_remaining(state.time_ticks) * 5.0).ceil() as usize;
        let bar: String = "▓".repeat(filled.min(5)) + &"░".repeat(5 - filled.min(5));
        out.queue(cursor::MoveTo(hx + high.chars().count() as u16 + 2, 0))?;
        out.queue(style::SetForegroundColor(C_WIDEN_BAR))?;
        out.queue(Print(format!("WIDE {} {}s", bar, remaining_secs)))?;
    }

    if let Some(msg) = flash {
        let fx = (ORIGIN_X + FIELD_COLS / 2).saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(fx, ORIGIN_Y + 1))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(msg))?;
    }

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_brick<W: Write>(out: &mut W, brick: &Brick) -> std::io::Result<()> {
    let (r, g, b) = brick.color;
    let col_start = cell_x(brick.rect.left());
    let col_end = cell_x(brick.rect.right() - 1.0);
    let row = cell_y(brick.rect.top());

    out.queue(style::SetForegroundColor(Color::Rgb { r, g, b }))?;
    out.queue(cursor::MoveTo(col_start, row))?;
    out.queue(Print("█".repeat((col_end - col_start + 1) as usize)))?;
    Ok(())
}

fn draw_paddle<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    let rect = state.paddle.rect();
    let col_start = cell_x(rect.left());
    let col_end = cell_x(rect.right() - 1.0);
    let row = cell_y(rect.top());

    out.queue(style::SetForegroundColor(C_PADDLE))?;
    out.queue(cursor::MoveTo(col_start, row))?;
    out.queue(Print("▀".repeat((col_end - col_start + 1) as usize)))?;
    Ok(())
}

fn draw_ball<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_BALL))?;
    out.queue(cursor::MoveTo(
        cell_x(state.ball.pos.x),
        cell_y(state.ball.pos.y),
    ))?;
    out.queue(Print("●"))?;
    Ok(())
}

fn draw_powerup<W: Write>(out: &mut W, powerup: &PowerUp) -> std::io::Result<()> {
    let (glyph, color) = match powerup.kind {
        PowerUpKind::Widen => ("↔", C_POWERUP_WIDEN),
        PowerUpKind::ExtraLife => ("♥", C_POWERUP_LIFE),
    };
    out.queue(style::SetForegroundColor(color))?;
    out.queue(cursor::MoveTo(
        cell_x(powerup.pos.x),
        cell_y(powerup.pos.y),
    ))?;
    out.queue(Print(glyph))?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, ORIGIN_Y + FIELD_ROWS + 1))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "← → : Move   SPACE : Launch   P : Pause   R : Restart   Q : Quit",
    ))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_overlay<W: Write>(out: &mut W, msg: &str) -> std::io::Result<()> {
    let cx = ORIGIN_X + FIELD_COLS / 2;
    let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, ORIGIN_Y + FIELD_ROWS / 2))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(msg))?;
    Ok(())
}

fn draw_game_over<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    let score_line = format!("Final Score: {}   High: {}", state.score, state.high_score);
    let lines: &[(&str, Color)] = &[
        ("╔══════════════════╗", Color::Red),
        ("║    GAME  OVER    ║", Color::Red),
        ("╚══════════════════╝", Color::Red),
        (&score_line, Color::Yellow),
        ("R - Play Again  Q - Quit", Color::White),
    ];

    let cx = ORIGIN_X + FIELD_COLS / 2;
    let start_row = (ORIGIN_Y + FIELD_ROWS / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    Ok(())
}
