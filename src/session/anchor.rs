//! Scroll anchor: keeps the newest transcript entry in view.
//!
//! The session does not know how a front end scrolls. It only reports growth
//! through [`ScrollAnchor`]; the [`GrowthTracker`] decides when growth happened.

/// Observer notified whenever the transcript gets longer.
pub trait ScrollAnchor: Send + Sync {
    /// Bring the latest entry into view. `len` is the new transcript length.
    fn reveal_latest(&self, len: usize);
}

/// Anchor that does nothing, for headless sessions.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopAnchor;

impl ScrollAnchor for NoopAnchor {
    fn reveal_latest(&self, _len: usize) {}
}

/// Remembers the last length an anchor was told about.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GrowthTracker {
    observed: usize,
}

impl GrowthTracker {
    /// Tracker that has observed an empty transcript.
    #[must_use]
    pub const fn new() -> Self {
        Self { observed: 0 }
    }

    /// Record the current length; returns it when it grew since the last call.
    ///
    /// An empty transcript never counts as growth.
    pub const fn observe(&mut self, len: usize) -> Option<usize> {
        let grew = len > self.observed;
        self.observed = len;
        if grew { Some(len) } else { None }
    }

    /// Forget everything observed, used when a session is torn down.
    pub const fn reset(&mut self) {
        self.observed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mount_does_not_fire() {
        let mut tracker = GrowthTracker::new();
        assert_eq!(tracker.observe(0), None);
    }

    #[test]
    fn test_fires_only_on_growth() {
        let mut tracker = GrowthTracker::new();
        assert_eq!(tracker.observe(1), Some(1));
        assert_eq!(tracker.observe(1), None);
        assert_eq!(tracker.observe(3), Some(3));
    }

    #[test]
    fn test_reset_starts_over() {
        let mut tracker = GrowthTracker::new();
        tracker.observe(4);
        tracker.reset();
        assert_eq!(tracker.observe(2), Some(2));
    }
}
