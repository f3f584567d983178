use std::time::Instant;

/// Millisecond tick source relative to a fixed origin.
#[derive(Debug, Copy, Clone)]
pub struct MonotonicMillis {
    origin: Instant,
    offset_ms: u64,
}

impl MonotonicMillis {
    /// Reads 0 now.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Reads `start_ms` now, so readings continue an existing timeline.
    pub fn starting_at(start_ms: u64) -> Self {
        Self {
            origin: Instant::now(),
            offset_ms: start_ms,
        }
    }

    /// Milliseconds since the origin, plus the starting offset.
    pub fn now(&self) -> u64 {
        let elapsed = u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.offset_ms.saturating_add(elapsed)
    }
}

impl Default for MonotonicMillis {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn starting_offset_carries_forward() {
        let source = MonotonicMillis::starting_at(5000);
        let first = source.now();
        assert!((5000..5100).contains(&first));

        thread::sleep(Duration::from_millis(20));
        assert!(source.now() >= first + 20);
    }
}
