//! Block Buster entry point
//!
//! Terminal setup, the fixed 60 Hz frame loop, and input polling live here;
//! all gameplay is delegated to the pure `sim` module.

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};

use block_buster::consts::TICK_RATE;
use block_buster::display;
use block_buster::persistence;
use block_buster::sim::{tick, GameEvent, GameState, PowerUpKind, TickInput};

const FRAME: Duration = Duration::from_micros(1_000_000 / TICK_RATE as u64);

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames. Covers terminals that don't emit key-release events:
/// the OS key-repeat rate refreshes the window before it expires.
const HOLD_WINDOW: u64 = 4;

/// How long event flash messages stay on the HUD
const FLASH_FRAMES: u32 = 45;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

/// Map a simulation callout to a short HUD message. Sound assets are not
/// available in a terminal build, so the flash is the whole effect layer.
fn flash_for(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::BrickDestroyed { points } => Some(format!("+{points}")),
        GameEvent::PowerUpCollected {
            kind: PowerUpKind::Widen,
        } => Some("Paddle widened!".to_string()),
        GameEvent::PowerUpCollected {
            kind: PowerUpKind::ExtraLife,
        } => Some("+1 life".to_string()),
        GameEvent::BallLost => Some("Ball lost!".to_string()),
        GameEvent::LevelCleared { level } => Some(format!("Level {level}!")),
        GameEvent::PaddleHit | GameEvent::GameOver => None,
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until an explicit quit key. Held direction keys are tracked through
/// a `key_frame` freshness map so movement and edge-triggered commands can
/// arrive in the same frame without interfering.
fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<()> {
    let save_path = persistence::default_save_path();
    let mut saved_high = persistence::load_high_score(&save_path);

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let mut state = GameState::new(seed, saved_high);
    log::info!("session start with seed {}", seed);

    // Maps each held key to the frame it was last seen (press or repeat)
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut flash: Option<(String, u32)> = None;

    loop {
        let frame_start = Instant::now();
        frame += 1;
        let mut input = TickInput::default();

        // Drain all pending input events (non-blocking); quit is checked
        // here, at the start of event processing, once per tick.
        while let Ok(Event::Key(KeyEvent {
            code,
            kind,
            modifiers,
            ..
        })) = rx.try_recv()
        {
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code.clone(), frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(());
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        KeyCode::Char(' ') => input.launch = true,
                        KeyCode::Char('r') | KeyCode::Char('R') => input.restart = true,
                        KeyCode::Char('p') | KeyCode::Char('P') => input.toggle_pause = true,
                        _ => {}
                    }
                }
                // Repeat: refresh timestamp so the key stays "held"
                KeyEventKind::Repeat => {
                    key_frame.insert(code.clone(), frame);
                }
                // Release: remove immediately (keyboard-enhancement path)
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        input.move_left = is_held(&key_frame, &KeyCode::Left, frame)
            || is_held(&key_frame, &KeyCode::Char('a'), frame)
            || is_held(&key_frame, &KeyCode::Char('A'), frame);
        input.move_right = is_held(&key_frame, &KeyCode::Right, frame)
            || is_held(&key_frame, &KeyCode::Char('d'), frame)
            || is_held(&key_frame, &KeyCode::Char('D'), frame);

        let events = tick(&mut state, &input);
        for event in &events {
            if let Some(msg) = flash_for(event) {
                flash = Some((msg, FLASH_FRAMES));
            }
        }

        // Persist high-score improvements as they happen; failures are
        // logged inside the adapter and never interrupt play.
        if state.high_score > saved_high {
            persistence::save_high_score(&save_path, state.high_score);
            saved_high = state.high_score;
        }

        display::render(out, &state, flash.as_ref().map(|(msg, _)| msg.as_str()))?;

        if let Some((_, ttl)) = &mut flash {
            *ttl -= 1;
            if *ttl == 0 {
                flash = None;
            }
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    env_logger::init();

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the frame loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(ev) => {
                    if tx.send(ev).is_err() {
                        break; // receiver dropped, program exiting
                    }
                }
                Err(_) => break,
            }
        }
    });

    let result = run(&mut out, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
