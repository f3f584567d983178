use super::millis::MonotonicMillis;

/// Sample window length in milliseconds.
const SAMPLE_WINDOW_MS: u64 = 1000;

/// Ticks-per-second counter fed by an external tick source.
///
/// Every call to [`tick`](Self::tick) counts one tick. Once more than a second
/// has passed since the last sample, the count of the window that just closed
/// is published and counting restarts. The tick that closes a window belongs to
/// the next one. Published values are whole ticks per second with no smoothing.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_sample_ms: u64,
    count: u32,
    rate: u32,
    source: MonotonicMillis,
}

impl FrameClock {
    /// Starts the first window at `start_ms`.
    ///
    /// [`tick_now`](Self::tick_now) on this clock continues from `start_ms`,
    /// so it can be mixed with [`tick`](Self::tick) on the same timeline.
    pub fn new(start_ms: u64) -> Self {
        Self {
            last_sample_ms: start_ms,
            count: 0,
            rate: 0,
            source: MonotonicMillis::starting_at(start_ms),
        }
    }

    /// A clock driven by [`tick_now`](Self::tick_now), starting now.
    pub fn monotonic() -> Self {
        Self::with_source(MonotonicMillis::new())
    }

    /// Starts the first window at the current reading of `source`.
    pub fn with_source(source: MonotonicMillis) -> Self {
        Self {
            last_sample_ms: source.now(),
            count: 0,
            rate: 0,
            source,
        }
    }

    /// Counts one tick at `now_ms`. Returns the rate when a sample is published.
    pub fn tick(&mut self, now_ms: u64) -> Option<u32> {
        let mut published = None;

        if now_ms.saturating_sub(self.last_sample_ms) > SAMPLE_WINDOW_MS {
            self.rate = self.count;
            self.count = 0;
            self.last_sample_ms = now_ms;
            published = Some(self.rate);
        }

        self.count = self.count.saturating_add(1);
        published
    }

    /// Counts one tick against the clock's own monotonic source.
    pub fn tick_now(&mut self) -> Option<u32> {
        let now = self.source.now();
        self.tick(now)
    }

    /// Last published rate; 0 until the first window closes.
    pub fn rate(&self) -> u32 {
        self.rate
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::monotonic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishes_once_after_window_closes() {
        let mut clock = FrameClock::new(0);
        assert_eq!(clock.tick(0), None);
        assert_eq!(clock.tick(100), None);
        assert_eq!(clock.tick(900), None);
        assert_eq!(clock.rate(), 0);

        assert_eq!(clock.tick(1100), Some(3));
        assert_eq!(clock.rate(), 3);
    }

    #[test]
    fn exactly_one_second_does_not_publish() {
        // Strictly greater than the window.
        let mut clock = FrameClock::new(0);
        clock.tick(500);
        assert_eq!(clock.tick(1000), None);
        assert_eq!(clock.tick(1001), Some(2));
    }

    #[test]
    fn closing_tick_counts_toward_next_window() {
        let mut clock = FrameClock::new(0);
        clock.tick(10);
        assert_eq!(clock.tick(1011), Some(1));
        clock.tick(1500);
        assert_eq!(clock.tick(2012), Some(2));
    }

    #[test]
    fn idle_gap_publishes_only_the_previous_window() {
        let mut clock = FrameClock::new(0);
        for t in (0..1000).step_by(100) {
            clock.tick(t);
        }
        assert_eq!(clock.tick(5000), Some(10));
        assert_eq!(clock.tick(5100), None);
        assert_eq!(clock.rate(), 10);
    }

    #[test]
    fn tick_now_shares_the_start_timeline() {
        // A late start must not read as an open window from time zero.
        let mut clock = FrameClock::new(10_000);
        assert_eq!(clock.tick_now(), None);
        assert_eq!(clock.tick(10_500), None);
        assert_eq!(clock.tick(11_200), Some(2));
    }

    #[test]
    fn shared_source_keeps_manual_and_sampled_ticks_aligned() {
        let source = MonotonicMillis::starting_at(3000);
        let mut clock = FrameClock::with_source(source);
        assert_eq!(clock.tick_now(), None);
        let now = source.now();
        assert_eq!(clock.tick(now + SAMPLE_WINDOW_MS + 50), Some(1));
    }

    #[test]
    fn timestamps_before_start_never_publish() {
        let mut clock = FrameClock::new(2000);
        assert_eq!(clock.tick(0), None);
        assert_eq!(clock.tick(1500), None);
    }
}
