//! Platform abstraction layer
//!
//! Handles host differences for:
//! - Input events (terminal keys mapped to `InputEvent`)
//! - Asset resolution (`AssetLoader`)

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::error::Result;
use crate::renderer::{FontHandle, SpriteHandle, TextureHandle};

/// Keys the scene can tell apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Char(char),
    Other,
}

/// The jump key
pub const JUMP_KEY: Key = Key::Space;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(Key),
    /// Key release, repeat, resize or anything else the scene ignores
    KeyOther,
}

/// Resolves named resources to handles. Failures are fatal at startup.
pub trait AssetLoader {
    fn load_texture(&mut self, name: &str) -> Result<TextureHandle>;
    fn load_sprite(&mut self, name: &str) -> Result<SpriteHandle>;
    fn load_font(&mut self, name: &str) -> Result<FontHandle>;
    fn release_texture(&mut self, texture: TextureHandle);
    fn release_sprite(&mut self, sprite: SpriteHandle);
    fn release_font(&mut self, font: FontHandle);
}

/// Map a terminal event to an input event
pub fn map_event(event: &Event) -> InputEvent {
    match event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) => {
            if *kind != KeyEventKind::Press {
                return InputEvent::KeyOther;
            }
            match code {
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => InputEvent::Quit,
                KeyCode::Char('q') | KeyCode::Esc => InputEvent::Quit,
                KeyCode::Char(' ') => InputEvent::KeyDown(Key::Space),
                KeyCode::Char(c) => InputEvent::KeyDown(Key::Char(*c)),
                _ => InputEvent::KeyDown(Key::Other),
            }
        }
        _ => InputEvent::KeyOther,
    }
}

/// How long the pump waits for a terminal event before checking for shutdown
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Forward terminal events into `tx` from a blocking thread.
///
/// Stops after forwarding `Quit`, when the receiver is dropped, or on a
/// terminal read error (reported as a final `Quit`).
pub fn spawn_input_pump(tx: mpsc::Sender<InputEvent>) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        loop {
            if tx.is_closed() {
                return;
            }
            let ready = match event::poll(POLL_INTERVAL) {
                Ok(ready) => ready,
                Err(e) => {
                    log::warn!("Terminal poll failed: {e}");
                    let _ = tx.blocking_send(InputEvent::Quit);
                    return;
                }
            };
            if !ready {
                continue;
            }
            let input = match event::read() {
                Ok(ev) => map_event(&ev),
                Err(e) => {
                    log::warn!("Terminal read failed: {e}");
                    InputEvent::Quit
                }
            };
            if tx.blocking_send(input).is_err() || input == InputEvent::Quit {
                return;
            }
        }
    })
}
