use crate::workflow::error::ValidationError;

pub const MIN_INTERVAL_SECS: f64 = 0.5;
pub const MAX_INTERVAL_SECS: f64 = 10.0;
pub const INTERVAL_STEP_SECS: f64 = 0.5;
pub const DEFAULT_INTERVAL_SECS: f64 = 1.0;
/// Newly loaded media pre-selects at most this much of its start.
pub const DEFAULT_MAX_WINDOW_SECS: f64 = 300.0;

/// Slack allowed when comparing a window end to the media duration, which
/// servers and probes report with differing precision.
const DURATION_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// `[0, min(duration, max_window)]`.
    pub fn initial(duration: f64, max_window: f64) -> Self {
        Self {
            start: 0.0,
            end: duration.min(max_window).max(0.0),
        }
    }

    pub fn validate(&self, duration: Option<f64>) -> Result<(), ValidationError> {
        let invalid = || ValidationError::InvalidTimeWindow {
            start: self.start,
            end: self.end,
            duration,
        };
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(invalid());
        }
        if self.start < 0.0 || self.end < self.start {
            return Err(invalid());
        }
        if let Some(duration) = duration {
            if self.end > duration + DURATION_EPSILON {
                return Err(invalid());
            }
        }
        Ok(())
    }
}

/// Seconds between sampled frames. Always within
/// [`MIN_INTERVAL_SECS`]..=[`MAX_INTERVAL_SECS`] and a multiple of
/// [`INTERVAL_STEP_SECS`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SamplingInterval(f64);

impl Default for SamplingInterval {
    fn default() -> Self {
        Self(DEFAULT_INTERVAL_SECS)
    }
}

impl SamplingInterval {
    /// Clamp and snap `seconds`. Non-finite input falls back to the default.
    pub fn new(seconds: f64) -> Self {
        if !seconds.is_finite() {
            return Self::default();
        }
        let snapped = (seconds / INTERVAL_STEP_SECS).round() * INTERVAL_STEP_SECS;
        Self(snapped.clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS))
    }

    pub fn seconds(self) -> f64 {
        self.0
    }
}
