use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Periodic tick source for a synchronizer's silent refreshes.
/// The first tick fires one full period after creation, so the initial
/// foreground load isn't double-triggered.
pub struct PeriodicRefresher {
    interval: Interval,
}

impl PeriodicRefresher {
    pub fn new(period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        let mut interval = interval_at(Instant::now() + period, period);
        // A slow tick pushes the schedule back instead of bursting to catch up.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_a_full_period() {
        let start = Instant::now();
        let mut refresher = PeriodicRefresher::new(Duration::from_secs(20));
        refresher.tick().await;
        assert!(start.elapsed() >= Duration::from_secs(20));
        refresher.tick().await;
        assert!(start.elapsed() >= Duration::from_secs(40));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_period_does_not_panic() {
        let mut refresher = PeriodicRefresher::new(Duration::ZERO);
        refresher.tick().await;
    }
}
