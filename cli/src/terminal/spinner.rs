use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use beacon_common::cache::AddressCache;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

const TICK: Duration = Duration::from_millis(100);
const TIP_DURATION: Duration = Duration::from_secs(1);
const MESSAGE_READ_TIME: Duration = Duration::from_secs(1);
const TIPS: &[&str] = &["You can press 'q' to finish early"];

/// Spinner that log lines are printed above instead of through.
static ACTIVE: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn active() -> std::sync::MutexGuard<'static, Option<ProgressBar>> {
    ACTIVE.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Spinner {
    bar: ProgressBar,
    progress: Arc<AddressCache<usize>>,
    ticker: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Starts a spinner. Pass `show_tips = false` when no key listener runs.
    pub fn start(label: &str, show_tips: bool) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
            bar.set_style(style.tick_strings(&[
                "▁▁▁▁▁",
                "▁▂▂▂▁",
                "▁▄▂▄▁",
                "▂▄▆▄▂",
                "▄▆█▆▄",
                "▂▄▆▄▂",
                "▁▄▂▄▁",
                "▁▂▂▂▁",
            ]));
        }
        bar.set_message(label.to_string());
        bar.enable_steady_tick(TICK);
        *active() = Some(bar.clone());

        let progress: Arc<AddressCache<usize>> = Arc::new(AddressCache::new());
        let ticker = spawn_ticker(bar.clone(), Arc::clone(&progress), label.to_string(), show_tips);

        Self {
            bar,
            progress,
            ticker: Some(ticker),
        }
    }

    /// Where producers post the running host count.
    pub fn progress(&self) -> Arc<AddressCache<usize>> {
        Arc::clone(&self.progress)
    }

    pub fn finish(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.bar.finish_and_clear();
        active().take();
        if let Some(ticker) = self.ticker.take() {
            let _ = ticker.join();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if self.ticker.is_some() {
            self.stop();
        }
    }
}

/// Alternates between the latest progress count and usage tips.
fn spawn_ticker(
    bar: ProgressBar,
    progress: Arc<AddressCache<usize>>,
    label: String,
    show_tips: bool,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut tip_index = 0;
        let mut showing_tip = false;
        let mut next_switch = Instant::now() + MESSAGE_READ_TIME;

        while !bar.is_finished() {
            let now = Instant::now();
            if progress.is_fresh() {
                if let Some(count) = progress.get() {
                    bar.set_message(progress_message(&label, count));
                    showing_tip = false;
                    next_switch = now + MESSAGE_READ_TIME;
                }
            } else if show_tips && now >= next_switch {
                if showing_tip {
                    let message = match progress.peek() {
                        Some(count) => progress_message(&label, count),
                        None => label.clone(),
                    };
                    bar.set_message(message);
                    next_switch = now + MESSAGE_READ_TIME;
                } else {
                    let tip = TIPS[tip_index % TIPS.len()];
                    bar.set_message(format!("{}", tip.italic().white()));
                    tip_index += 1;
                    next_switch = now + TIP_DURATION;
                }
                showing_tip = !showing_tip;
            }
            thread::sleep(TICK);
        }
    })
}

fn progress_message(label: &str, count: usize) -> String {
    format!("{label} ({} hosts found)", count.to_string().green().bold())
}

/// `tracing` writer that keeps log lines from tearing an active spinner.
pub struct SpinnerWriter;

impl Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let spinner = active().clone();
        match spinner {
            Some(bar) if !bar.is_hidden() => {
                let msg = String::from_utf8_lossy(buf);
                bar.println(msg.trim_end());
            }
            _ => io::stdout().write_all(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}
