use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Sets a stop flag when the user presses `q` (or Ctrl+C) during a run.
///
/// The terminal is in raw mode while the listener is alive.
pub struct InputHandle {
    stop_signal: Arc<AtomicBool>,
    done: Arc<AtomicBool>,
    listener: Option<JoinHandle<()>>,
}

impl InputHandle {
    /// Starts listening, or returns `None` when nobody is at the keyboard.
    pub fn listen(stop_signal: Arc<AtomicBool>) -> Option<Self> {
        if !console::user_attended() {
            return None;
        }
        if let Err(e) = enable_raw_mode() {
            debug!("Key listener disabled: {e}");
            return None;
        }

        let done = Arc::new(AtomicBool::new(false));
        let listener = {
            let stop_signal = Arc::clone(&stop_signal);
            let done = Arc::clone(&done);
            thread::spawn(move || listen_for_quit(&stop_signal, &done))
        };

        Some(Self {
            stop_signal,
            done,
            listener: Some(listener),
        })
    }

    pub fn interrupted(&self) -> bool {
        self.stop_signal.load(Ordering::Relaxed)
    }
}

fn listen_for_quit(stop_signal: &AtomicBool, done: &AtomicBool) {
    while !done.load(Ordering::Relaxed) {
        match event::poll(POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(_) => break,
        }
        if let Ok(Event::Key(key_event)) = event::read() {
            let is_q = key_event.code == KeyCode::Char('q');
            let is_ctrl_c = key_event.code == KeyCode::Char('c')
                && key_event.modifiers.contains(KeyModifiers::CONTROL);

            if (is_q || is_ctrl_c) && key_event.kind == KeyEventKind::Press {
                stop_signal.store(true, Ordering::Relaxed);
                break;
            }
        }
    }
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        self.done.store(true, Ordering::Relaxed);
        if let Some(listener) = self.listener.take() {
            let _ = listener.join();
        }
        let _ = disable_raw_mode();
    }
}
