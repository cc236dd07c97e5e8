use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::twin::Twin;

/// Repeating task driving `Twin::tick` once per period.
///
/// The first tick fires after `first_delay`. Cancelling hands back the time
/// still owed until the next tick, so a later spawn can resume the same
/// period instead of starting a fresh one. Cancellation takes effect at the
/// latest when the task next takes the twin lock, so a caller that cancels
/// while holding the lock is guaranteed no further tick applies.
pub struct Ticker {
    token: CancellationToken,
    handle: JoinHandle<()>,
    period: Duration,
    /// When the next tick is due. Written by the task under the twin lock.
    next_due: Arc<Mutex<Instant>>,
}

impl Ticker {
    pub fn spawn(twin: Arc<Mutex<Twin>>, period: Duration, first_delay: Duration) -> Self {
        let token = CancellationToken::new();
        let child = token.clone();
        let first_due = Instant::now() + first_delay.min(period);
        let next_due = Arc::new(Mutex::new(first_due));
        let due = next_due.clone();

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(first_due, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(
                period_ms = period.as_millis() as u64,
                first_delay_ms = first_delay.as_millis() as u64,
                "ticker started"
            );

            loop {
                tokio::select! {
                    biased;
                    _ = child.cancelled() => break,
                    _ = interval.tick() => {
                        let mut twin = twin.lock();
                        if child.is_cancelled() {
                            break;
                        }
                        twin.tick();
                        *due.lock() = Instant::now() + period;
                    }
                }
            }

            debug!("ticker stopped");
        });

        Self {
            token,
            handle,
            period,
            next_due,
        }
    }

    /// Stop the task and return the time still owed until the next tick.
    ///
    /// Never waits, so it is safe to call under the twin lock.
    pub fn cancel(self) -> Duration {
        self.token.cancel();
        drop(self.handle);
        let next_due = *self.next_due.lock();
        next_due
            .saturating_duration_since(Instant::now())
            .min(self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::render::{MockChartSink, MockRenderSink};
    use crate::simulation::ZeroNoise;

    fn shared_twin() -> Arc<Mutex<Twin>> {
        let mut renderer = MockRenderSink::new();
        renderer.expect_render().return_const(());
        let mut charts = MockChartSink::new();
        charts.expect_append().return_const(());
        charts.expect_clear().return_const(());

        let mut twin = Twin::new(
            &Config::default(),
            Box::new(ZeroNoise),
            Box::new(renderer),
            Box::new(charts),
        );
        twin.start();
        Arc::new(Mutex::new(twin))
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        let twin = shared_twin();
        let ticker = Ticker::spawn(twin.clone(), Duration::from_secs(1), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(twin.lock().state().time, 0);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(twin.lock().state().time, 1);

        ticker.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_under_lock_stops_ticks() {
        let twin = shared_twin();
        let ticker = Ticker::spawn(twin.clone(), Duration::from_secs(1), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(2500)).await;
        {
            let _guard = twin.lock();
            assert_eq!(ticker.cancel(), Duration::from_millis(500));
        }

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(twin.lock().state().time, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_exits_after_cancel() {
        let twin = shared_twin();
        let ticker = Ticker::spawn(twin, Duration::from_millis(100), Duration::from_millis(100));
        let token = ticker.token.clone();
        let handle = {
            let Ticker { handle, .. } = ticker;
            token.cancel();
            handle
        };

        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_keeps_partial_period() {
        let twin = shared_twin();
        let period = Duration::from_secs(1);

        let ticker = Ticker::spawn(twin.clone(), period, period);
        tokio::time::sleep(Duration::from_millis(700)).await;
        let owed = ticker.cancel();
        assert_eq!(owed, Duration::from_millis(300));

        tokio::time::sleep(Duration::from_secs(5)).await;
        let ticker = Ticker::spawn(twin.clone(), period, owed);
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(twin.lock().state().time, 1);

        // next tick is due a full period after the resumed one
        assert_eq!(ticker.cancel(), Duration::from_millis(900));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_delay_capped_at_period() {
        let twin = shared_twin();
        let ticker = Ticker::spawn(twin.clone(), Duration::from_secs(1), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(twin.lock().state().time, 1);
        ticker.cancel();
    }
}
