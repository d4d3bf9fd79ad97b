//! Fallback poll for content replaced without a notification.

use std::time::Duration;

use tokio::time::Instant;
use tokio::time::Interval;
use tokio::time::MissedTickBehavior;

/// Low-frequency timer driving [`crate::engine::TableEngine::reconcile`].
///
/// Ticks missed while the host was busy are skipped rather than replayed.
/// The interval is created on the first tick, inside the runtime.
#[derive(Debug)]
pub struct ReconcileTimer {
    period: Duration,
    interval: Option<Interval>,
}

impl ReconcileTimer {
    /// A zero period is raised to one millisecond.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next tick. The first tick is one period from the
    /// first call.
    pub async fn tick(&mut self) -> Instant {
        let period = self.period;
        let interval = self.interval.get_or_insert_with(|| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        interval.tick().await
    }

    /// Restart the period, e.g. after an explicit replacement notification
    /// made the next poll redundant.
    pub fn reset(&mut self) {
        if let Some(interval) = &mut self.interval {
            interval.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_after_one_period() {
        let start = Instant::now();
        let mut timer = ReconcileTimer::new(Duration::from_secs(2));
        let first = timer.tick().await;
        assert_eq!(first - start, Duration::from_secs(2));
        let second = timer.tick().await;
        assert_eq!(second - first, Duration::from_secs(2));
    }

    #[test]
    fn test_zero_period_clamped() {
        assert_eq!(ReconcileTimer::new(Duration::ZERO).period(), Duration::from_millis(1));
    }
}
