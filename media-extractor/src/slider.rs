//! Bounded poll-until-ready wait for hover-revealed controls.
//!
//! Some players only render their volume slider after the pointer hovers the
//! volume button. [`ReadyWait`] re-checks a condition on a fixed interval and
//! gives up after a retry cap so a slider that never appears cannot keep a
//! timer alive forever.

use std::time::Duration;
use tracing::{trace, warn};

/// Interval between readiness checks
pub const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Misses tolerated before giving up
pub const MAX_RETRIES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    /// Still polling; `misses` checks have failed so far
    Waiting { misses: u32 },
    Ready,
    Expired,
}

#[derive(Debug, Clone)]
pub struct ReadyWait {
    interval: Duration,
    max_retries: u32,
    state: WaitState,
}

impl ReadyWait {
    pub fn new(interval: Duration, max_retries: u32) -> Self {
        Self {
            interval,
            max_retries,
            state: WaitState::Waiting { misses: 0 },
        }
    }

    pub fn state(&self) -> WaitState {
        self.state
    }

    /// Feed one check result. Terminal states are sticky.
    pub fn step(&mut self, ready: bool) -> WaitState {
        if let WaitState::Waiting { misses } = self.state {
            self.state = if ready {
                WaitState::Ready
            } else if misses + 1 > self.max_retries {
                WaitState::Expired
            } else {
                WaitState::Waiting { misses: misses + 1 }
            };
        }
        self.state
    }

    /// Sleep one interval, check, repeat until ready or expired
    pub async fn run<F>(mut self, mut check: F) -> WaitState
    where
        F: FnMut() -> bool,
    {
        loop {
            tokio::time::sleep(self.interval).await;
            match self.step(check()) {
                WaitState::Waiting { misses } => trace!("Control not ready, miss {}", misses),
                WaitState::Expired => {
                    warn!("Control never became ready after {} retries", self.max_retries);
                    return WaitState::Expired;
                }
                WaitState::Ready => return WaitState::Ready,
            }
        }
    }
}

impl Default for ReadyWait {
    fn default() -> Self {
        Self::new(POLL_INTERVAL, MAX_RETRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_step_ready() {
        let mut wait = ReadyWait::default();
        assert_eq!(wait.step(false), WaitState::Waiting { misses: 1 });
        assert_eq!(wait.step(true), WaitState::Ready);
        // Terminal
        assert_eq!(wait.step(false), WaitState::Ready);
    }

    #[test]
    fn test_step_expires_after_cap() {
        let mut wait = ReadyWait::new(POLL_INTERVAL, 2);
        assert_eq!(wait.step(false), WaitState::Waiting { misses: 1 });
        assert_eq!(wait.step(false), WaitState::Waiting { misses: 2 });
        assert_eq!(wait.step(false), WaitState::Expired);
        assert_eq!(wait.step(true), WaitState::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_becomes_ready() {
        let checks = Cell::new(0);
        let state = ReadyWait::default()
            .run(|| {
                checks.set(checks.get() + 1);
                checks.get() == 4
            })
            .await;
        assert_eq!(state, WaitState::Ready);
        assert_eq!(checks.get(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_expires() {
        let checks = Cell::new(0);
        let start = tokio::time::Instant::now();
        let state = ReadyWait::default()
            .run(|| {
                checks.set(checks.get() + 1);
                false
            })
            .await;
        assert_eq!(state, WaitState::Expired);
        assert_eq!(checks.get(), MAX_RETRIES + 1);
        assert_eq!(start.elapsed(), POLL_INTERVAL * (MAX_RETRIES + 1));
    }
}
