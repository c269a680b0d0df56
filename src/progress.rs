//! Progress sources for the loading phase.

use core::time::Duration;

/// Percent of a known set of assets that have settled, loaded or failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AssetProgress {
    total: usize,
    settled: usize,
}

impl AssetProgress {
    pub fn new(total: usize) -> Self {
        AssetProgress { total, settled: 0 }
    }

    /// Mark one more asset as settled. A failed load counts too, so a broken
    /// image cannot hold the page hostage. Returns the new percentage.
    pub fn settle(&mut self) -> u8 {
        self.settled = (self.settled + 1).min(self.total);
        self.percent()
    }

    /// Rounded to the nearest whole percent. Nothing to load is 100.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.settled * 100 + self.total / 2) / self.total) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.settled >= self.total
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn settled(&self) -> usize {
        self.settled
    }
}

/// A loader that counts up on a fixed cadence regardless of real work.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimedProgress {
    interval: Duration,
    increment: u8,
    current: u8,
}

impl TimedProgress {
    /// +1 every 30 ms.
    pub fn new() -> Self {
        TimedProgress { interval: Duration::from_millis(30), increment: 1, current: 0 }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_increment(mut self, increment: u8) -> Self {
        self.increment = increment.max(1);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Advance one tick and return the new value, saturating at 100.
    pub fn next(&mut self) -> u8 {
        self.current = self.current.saturating_add(self.increment).min(100);
        self.current
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    pub fn is_complete(&self) -> bool {
        self.current >= 100
    }
}

impl Default for TimedProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_percent_rounds_to_nearest() {
        let mut p = AssetProgress::new(3);
        assert_eq!(p.percent(), 0);
        assert_eq!(p.settle(), 33);
        assert_eq!(p.settle(), 67);
        assert_eq!(p.settle(), 100);
        assert!(p.is_complete());
    }

    #[test]
    fn no_assets_is_complete() {
        let p = AssetProgress::new(0);
        assert_eq!(p.percent(), 100);
        assert!(p.is_complete());
    }

    #[test]
    fn extra_settles_do_not_overflow() {
        let mut p = AssetProgress::new(2);
        for _ in 0..5 {
            p.settle();
        }
        assert_eq!(p.settled(), 2);
        assert_eq!(p.percent(), 100);
    }

    #[test]
    fn timed_progress_counts_to_hundred() {
        let mut t = TimedProgress::new();
        assert_eq!(t.interval(), Duration::from_millis(30));
        let mut last = 0;
        for _ in 0..150 {
            let v = t.next();
            assert!(v >= last);
            last = v;
        }
        assert_eq!(t.current(), 100);
        assert!(t.is_complete());
    }

    #[test]
    fn large_increment_saturates() {
        let mut t = TimedProgress::new().with_increment(60);
        assert_eq!(t.next(), 60);
        assert_eq!(t.next(), 100);
    }
}
