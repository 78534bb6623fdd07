/// Housekeeping tasks
/// Expired sessions are removed on a fixed interval.
// region:    --- Imports
use crate::auth::session::delete_expired_sessions;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info};

// endregion: --- Imports

// region:    --- Session Reaper
pub struct SessionReaper {
    pool: Arc<PgPool>,
    period: Duration,
}

impl SessionReaper {
    pub fn new(pool: Arc<PgPool>, period_secs: u64) -> Self {
        Self {
            pool,
            period: Duration::from_secs(period_secs.max(1)),
        }
    }

    /// Spawn the reaper loop; a failed pass is logged and the loop continues.
    pub fn start(&self) -> JoinHandle<()> {
        let pool = Arc::clone(&self.pool);
        let period = self.period;
        info!("{:<12} --> Session reaper every {:?}", "Scheduler", period);
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = Self::reap(&pool).await {
                    error!("{:<12} --> Failed to delete expired sessions: {:?}", "Scheduler", e);
                }
            }
        })
    }

    pub async fn reap(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let removed = delete_expired_sessions(pool, Utc::now()).await?;
        debug!("{:<12} --> Removed {} expired sessions", "Scheduler", removed);
        Ok(removed)
    }
}
// endregion: --- Session Reaper
