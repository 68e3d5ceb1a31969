use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::game::RoundState;

/// Points for clearing `mines` mines in `elapsed_secs` whole seconds:
/// `mines * 1000 / elapsed_secs`. Rounds shorter than a second score nothing.
pub fn score(mines: usize, elapsed_secs: u64) -> Option<u64> {
    if elapsed_secs == 0 {
        return None;
    }
    Some(mines as u64 * 1000 / elapsed_secs)
}

/// `mm:ss` rendering of a round duration.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Wall-clock timer for a round, started on the first reveal.
#[derive(Debug, Clone, Default)]
pub struct GameTimer {
    started: Option<Instant>,
    final_elapsed: Duration,
}

impl GameTimer {
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
        self.final_elapsed = Duration::ZERO;
    }

    pub fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            self.final_elapsed = started.elapsed();
        }
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        match self.started {
            Some(started) => started.elapsed(),
            None => self.final_elapsed,
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed().as_secs()
    }
}

/// What the high-score keeper gets when a round ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub state: RoundState,
    pub elapsed_secs: u64,
    pub mines: usize,
}

impl RoundSummary {
    /// Only won rounds score.
    pub fn score(&self) -> Option<u64> {
        match self.state {
            RoundState::Won => score(self.mines, self.elapsed_secs),
            _ => None,
        }
    }
}
