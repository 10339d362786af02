use std::io::Write;
use std::time::{Duration, Instant};

use crate::constants::BYTES_PER_GB;
use crate::db::SizeProbe;
use crate::error::Result;

/// Size monitor states; `Done` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Polling,
    Done,
}

/// What the monitor saw on its final tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorReport {
    pub final_size_bytes: u64,
    pub elapsed: Duration,
    pub ticks: u64,
}

/// Polls database size until it reaches the target, printing progress
pub struct SizeMonitor<P> {
    probe: P,
    target_bytes: u64,
    interval: Duration,
    state: MonitorState,
    ticks: u64,
}

impl<P: SizeProbe> SizeMonitor<P> {
    pub fn new(probe: P, target_bytes: u64, interval: Duration) -> Self {
        Self {
            probe,
            target_bytes,
            interval,
            state: MonitorState::Polling,
            ticks: 0,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Current size in bytes; a failed query reads as zero for this tick
    pub async fn read_size(&self) -> u64 {
        match self.probe.database_size().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(error = %e, "Size query failed, counting tick as 0 bytes");
                0
            }
        }
    }

    /// Feed one size reading into the state machine
    pub fn observe(&mut self, size_bytes: u64) -> MonitorState {
        if self.state == MonitorState::Polling && size_bytes >= self.target_bytes {
            self.state = MonitorState::Done;
        }
        self.state
    }

    /// Poll until the target is reached
    ///
    /// Each tick overwrites a single progress line on `out`. The completion
    /// line is written once, after the tick that reached the target.
    pub async fn run<W: Write>(&mut self, out: &mut W, started: Instant) -> Result<MonitorReport> {
        loop {
            let size_bytes = self.read_size().await;
            let elapsed = round_to_secs(started.elapsed());
            self.ticks += 1;

            write!(out, "\r{}", progress_line(size_bytes, elapsed, self.target_bytes))?;
            out.flush()?;

            if self.observe(size_bytes) == MonitorState::Done {
                writeln!(out, "\n\n{}", completion_line(self.target_bytes, elapsed))?;
                out.flush()?;

                tracing::info!(size_bytes, ticks = self.ticks, "Target size reached");

                return Ok(MonitorReport {
                    final_size_bytes: size_bytes,
                    elapsed,
                    ticks: self.ticks,
                });
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}

pub fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GB
}

/// Live progress text, without the leading carriage return
pub fn progress_line(size_bytes: u64, elapsed: Duration, target_bytes: u64) -> String {
    let percent = if target_bytes == 0 {
        100.0
    } else {
        size_bytes as f64 / target_bytes as f64 * 100.0
    };

    format!(
        "[LIVE] Size: {:.3} GB | Elapsed: {} | Progress: {:.1}%",
        bytes_to_gb(size_bytes),
        format_elapsed(elapsed),
        percent
    )
}

pub fn completion_line(target_bytes: u64, elapsed: Duration) -> String {
    format!(
        "✅ Target of {:.1} GB reached in {}!",
        bytes_to_gb(target_bytes),
        format_elapsed(elapsed)
    )
}

/// Format as `1h2m3s`, `4m5s` or `6s`
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = round_to_secs(elapsed).as_secs();
    let (h, m, s) = (secs / 3600, secs % 3600 / 60, secs % 60);

    if h > 0 {
        format!("{h}h{m}m{s}s")
    } else if m > 0 {
        format!("{m}m{s}s")
    } else {
        format!("{s}s")
    }
}

fn round_to_secs(d: Duration) -> Duration {
    Duration::from_secs(d.as_secs_f64().round() as u64)
}
