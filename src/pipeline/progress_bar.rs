//! Progress display and per-file timing for batch runs (feature `progress`).
//!
//! * [`BatchProgress`] – an `indicatif` bar sized to the number of input files, whose
//!   message shows the current file and the last/average processing time.
//! * [`IterTimer`] – per-iteration durations smoothed by an **exponential moving average**:
//!   `ema ← α·dt + (1–α)·ema`, initialized with the first sample.
//! * [`fmt_dur`] – `"253µs"`, `"42ms"`, `"3.14s"` depending on the scale.
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

pub struct IterTimer {
    last: Instant,
    ema_ns: f64,
    alpha: f64,
    count: u64,
}

impl IterTimer {
    pub fn new(alpha: f64) -> Self {
        Self {
            last: Instant::now(),
            ema_ns: 0.0,
            alpha,
            count: 0,
        }
    }

    /// Close the current iteration and return its duration.
    #[inline]
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now.duration_since(self.last);
        self.last = now;
        self.count += 1;

        let dt_ns = dt.as_nanos() as f64;
        self.ema_ns = if self.count == 1 {
            dt_ns
        } else {
            self.alpha * dt_ns + (1.0 - self.alpha) * self.ema_ns
        };
        dt
    }

    #[inline]
    pub fn avg(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.ema_ns as u64)
        }
    }
}

#[inline]
pub fn fmt_dur(d: Duration) -> String {
    let us = d.as_micros();
    if us < 1_000 {
        format!("{us}µs")
    } else if us < 1_000_000 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.2}s", d.as_secs_f32())
    }
}

const TEMPLATE: &str =
    "{prefix} {bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | ETA {eta_precise} | {msg}";

/// Progress bar of one batch stage.
pub struct BatchProgress {
    bar: ProgressBar,
    timer: IterTimer,
}

impl BatchProgress {
    pub fn new(stage: &'static str, total: usize) -> Self {
        let bar = ProgressBar::new(total.max(1) as u64);
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(style);
        }
        bar.set_prefix(stage);
        bar.enable_steady_tick(Duration::from_millis(200));
        Self {
            bar,
            timer: IterTimer::new(0.2),
        }
    }

    /// Mark one file as done.
    pub fn file_done(&mut self, name: &str) {
        let last = self.timer.tick();
        let avg = self.timer.avg();
        self.bar.set_message(format!(
            "{name} | last: {}, avg: {}",
            fmt_dur(last),
            fmt_dur(avg)
        ));
        self.bar.inc(1);
    }

    pub fn finish(self) {
        self.bar.disable_steady_tick();
        self.bar.finish_and_clear();
    }
}
