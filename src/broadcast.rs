use crate::abuse::RateLimiter;
use crate::state::AppState;
use std::sync::Arc;
use std::time::Duration;

/// How often match deadlines are checked
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Spawn a background task that applies expired voting, blitz and duel timers
pub fn spawn_timer_ticker(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let changed = state.tick_timers(chrono::Utc::now()).await;
            if changed > 0 {
                tracing::debug!(rooms = changed, "Timers applied");
            }
        }
    });
}

/// Spawn a background task that drops stale rate limiter entries
pub fn spawn_rate_limit_cleanup(limiter: RateLimiter) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(limiter.window() * 2).await;
            let removed = limiter.cleanup().await;
            if removed > 0 {
                tracing::debug!(removed, "Rate limiter entries expired");
            }
        }
    });
}
