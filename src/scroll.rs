//! Scroll-driven load signals.
//!
//! Scroll events arrive far more often than the sentinel needs checking, so
//! checks are throttled: the first event of an interval is checked right away,
//! later ones only leave their sample behind for `on_tick` to check once the
//! interval has elapsed.

use std::time::{Duration, Instant};

use crate::config::BrowserConfig;

pub const DEFAULT_THRESHOLD_PX: f64 = 2000.0;
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSignal {
    pub direction: Direction,
}

/// Layout measurement taken on a scroll event.
///
/// For a next-page trigger both values are bottom edges; a previous-page
/// trigger is fed the top edges instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    /// Sentinel edge in document coordinates, `None` when no sentinel is mounted
    pub sentinel: Option<f64>,
    pub viewport_edge: f64,
}

impl ScrollSample {
    pub fn new(sentinel: Option<f64>, viewport_edge: f64) -> Self {
        Self {
            sentinel,
            viewport_edge,
        }
    }

    fn distance(&self) -> Option<f64> {
        self.sentinel.map(|edge| (edge - self.viewport_edge).abs())
    }
}

#[derive(Debug, Clone)]
pub struct ScrollTrigger {
    direction: Direction,
    threshold: f64,
    interval: Duration,
    last_check: Option<Instant>,
    trailing: Option<ScrollSample>,
}

impl ScrollTrigger {
    pub fn new(direction: Direction, threshold: f64, interval: Duration) -> Self {
        Self {
            direction,
            threshold,
            interval,
            last_check: None,
            trailing: None,
        }
    }

    pub fn from_config(direction: Direction, config: &BrowserConfig) -> Self {
        Self::new(direction, config.scroll_threshold_px, config.scroll_interval())
    }

    pub fn on_scroll(&mut self, sample: ScrollSample, now: Instant) -> Option<LoadSignal> {
        match self.last_check {
            Some(last) if now.saturating_duration_since(last) < self.interval => {
                self.trailing = Some(sample);
                None
            }
            _ => self.check(sample, now),
        }
    }

    /// Check the latest held-back sample once its interval is over
    pub fn on_tick(&mut self, now: Instant) -> Option<LoadSignal> {
        let due = self.next_deadline()?;
        if now < due {
            return None;
        }
        let sample = self.trailing.take()?;
        self.check(sample, now)
    }

    /// When `on_tick` should next be called, if a sample is waiting
    pub fn next_deadline(&self) -> Option<Instant> {
        self.trailing?;
        Some(self.last_check? + self.interval)
    }

    fn check(&mut self, sample: ScrollSample, now: Instant) -> Option<LoadSignal> {
        self.last_check = Some(now);
        self.trailing = None;
        let distance = sample.distance()?;
        (distance <= self.threshold).then_some(LoadSignal {
            direction: self.direction,
        })
    }
}

impl Default for ScrollTrigger {
    fn default() -> Self {
        Self::new(Direction::Next, DEFAULT_THRESHOLD_PX, DEFAULT_INTERVAL)
    }
}
