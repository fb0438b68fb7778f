//! Splitting a time range into fixed-length query windows.

use chrono::{DateTime, Duration, Utc};

/// Iterator over `[start, end)` in consecutive half-open windows.
///
/// The last window is truncated at `end`. An empty or inverted range, or a
/// non-positive window length, yields nothing.
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use hydra::data::TimeWindows;
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
///
/// let windows: Vec<_> = TimeWindows::new(start, end, Duration::hours(24)).collect();
/// assert_eq!(windows.len(), 2);
/// assert_eq!(windows[1].1, end);
/// ```
#[derive(Debug, Clone)]
pub struct TimeWindows {
    cursor: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
}

impl TimeWindows {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, step: Duration) -> Self {
        Self {
            cursor: start,
            end,
            step,
        }
    }

    /// Number of windows left to yield.
    pub fn remaining(&self) -> usize {
        if self.cursor >= self.end || self.step <= Duration::zero() {
            return 0;
        }
        let span = (self.end - self.cursor).num_milliseconds();
        let step = self.step.num_milliseconds().max(1);
        ((span + step - 1) / step) as usize
    }
}

impl Iterator for TimeWindows {
    type Item = (DateTime<Utc>, DateTime<Utc>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.end || self.step <= Duration::zero() {
            return None;
        }
        let window_start = self.cursor;
        let window_end = window_start
            .checked_add_signed(self.step)
            .map_or(self.end, |t| t.min(self.end));
        self.cursor = window_end;
        Some((window_start, window_end))
    }
}
