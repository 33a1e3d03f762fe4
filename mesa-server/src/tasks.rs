//! Background task management
//!
//! Registration, panic capture, health checks and graceful shutdown of the
//! server's long-running jobs.
//!
//! # Task kinds
//!
//! - [`TaskKind::Worker`] - runs until shutdown
//! - [`TaskKind::Periodic`] - wakes on a fixed interval

use futures::FutureExt;
use sqlx::SqlitePool;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::auth::rate_limit::RateLimiter;
use crate::db::repository::{RepoResult, otp, session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Worker,
    Periodic,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Worker => write!(f, "Worker"),
            TaskKind::Periodic => write!(f, "Periodic"),
        }
    }
}

struct RegisteredTask {
    name: &'static str,
    kind: TaskKind,
    handle: JoinHandle<()>,
}

/// Background task registry
///
/// ```ignore
/// let mut tasks = BackgroundTasks::new();
/// tasks.spawn_periodic("session_purge", Duration::from_secs(3600), move || {
///     let pool = pool.clone();
///     async move { purge_expired(&pool).await; }
/// });
/// tasks.shutdown().await;
/// ```
pub struct BackgroundTasks {
    tasks: Vec<RegisteredTask>,
    shutdown: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Cancellation token tasks listen on for shutdown
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Register and start a task
    ///
    /// The future is wrapped to catch panics; an unexpected exit is logged.
    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let token = self.shutdown.clone();
        let wrapped_future = async move {
            let result: Result<(), Box<dyn std::any::Any + Send>> =
                AssertUnwindSafe(future).catch_unwind().await;
            match result {
                Ok(()) => {
                    if !token.is_cancelled() {
                        tracing::warn!(
                            task = %name,
                            kind = %kind,
                            "Background task completed unexpectedly"
                        );
                    }
                }
                Err(panic_info) => {
                    let panic_msg: String = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        (*s).to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    tracing::error!(
                        task = %name,
                        kind = %kind,
                        panic = %panic_msg,
                        "Background task panicked"
                    );
                }
            }
        };

        let handle = tokio::spawn(wrapped_future);
        tracing::debug!(task = %name, kind = %kind, "Registered background task");
        self.tasks.push(RegisteredTask { name, kind, handle });
    }

    /// Run `job` every `period` until shutdown
    ///
    /// The first run happens one full period after registration.
    pub fn spawn_periodic<F, Fut>(&mut self, name: &'static str, period: Duration, mut job: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let token = self.shutdown.clone();
        self.spawn(name, TaskKind::Periodic, async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => job().await,
                }
            }
        });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// (worker, periodic)
    pub fn count_by_kind(&self) -> (usize, usize) {
        self.tasks.iter().fold((0, 0), |(worker, periodic), task| match task.kind {
            TaskKind::Worker => (worker + 1, periodic),
            TaskKind::Periodic => (worker, periodic + 1),
        })
    }

    pub fn log_summary(&self) {
        let (worker, periodic) = self.count_by_kind();
        tracing::info!(
            total = self.tasks.len(),
            worker,
            periodic,
            "Background tasks registered"
        );
    }

    /// Number of tasks that have already exited; each one is logged
    pub fn check_health(&self) -> usize {
        let failed: Vec<_> = self.tasks.iter().filter(|t| t.handle.is_finished()).collect();
        for task in &failed {
            tracing::error!(
                task = %task.name,
                kind = %task.kind,
                "Background task unexpectedly finished"
            );
        }
        failed.len()
    }

    /// Cancel every task and wait for it to finish
    pub async fn shutdown(self) {
        tracing::info!("Shutting down {} background tasks...", self.tasks.len());
        self.shutdown.cancel();

        for task in self.tasks {
            match task.handle.await {
                Ok(()) => tracing::debug!(task = %task.name, "Task completed"),
                Err(e) if e.is_cancelled() => tracing::debug!(task = %task.name, "Task cancelled"),
                Err(e) => tracing::error!(task = %task.name, error = ?e, "Task panicked"),
            }
        }

        tracing::info!("All background tasks stopped");
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}

/// Rows removed by one purge run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeStats {
    pub sessions: u64,
    pub otp_codes: u64,
}

/// Delete sessions and OTP codes whose expiry is at or before `now`
pub async fn purge_expired(pool: &SqlitePool, now: i64) -> RepoResult<PurgeStats> {
    let sessions = session::delete_expired(pool, now).await?;
    let otp_codes = otp::delete_expired(pool, now).await?;
    Ok(PurgeStats { sessions, otp_codes })
}

/// Register the server's periodic jobs
pub fn register_jobs(
    tasks: &mut BackgroundTasks,
    pool: SqlitePool,
    rate_limiter: RateLimiter,
    purge_every: Duration,
) {
    tasks.spawn_periodic("session_purge", purge_every, move || {
        let pool = pool.clone();
        async move {
            match purge_expired(&pool, shared::util::now_millis()).await {
                Ok(stats) => tracing::info!(
                    sessions = stats.sessions,
                    otp_codes = stats.otp_codes,
                    "Purged expired sessions"
                ),
                Err(e) => tracing::error!(error = %e, "Session purge failed"),
            }
        }
    });

    tasks.spawn_periodic("rate_limit_cleanup", Duration::from_secs(60), move || {
        let limiter = rate_limiter.clone();
        async move { limiter.cleanup().await }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn periodic_job_runs_each_period_until_shutdown() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut tasks = BackgroundTasks::new();
        let counter = runs.clone();
        tasks.spawn_periodic("tick", Duration::from_secs(10), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        assert_eq!(tasks.count_by_kind(), (0, 1));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        assert_eq!(tasks.check_health(), 0);
        tasks.shutdown().await;
    }

    #[tokio::test]
    async fn panicking_task_is_reported_unhealthy() {
        let mut tasks = BackgroundTasks::new();
        tasks.spawn("boom", TaskKind::Worker, async { panic!("boom") });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(tasks.check_health(), 1);
        tasks.shutdown().await;
    }

    #[tokio::test]
    async fn purge_removes_only_expired_rows() {
        let (pool, rid) = testing::setup().await;
        let user = crate::db::repository::user::create(
            &pool,
            crate::db::repository::user::NewUser {
                restaurant_id: rid,
                email: "ana@example.com",
                name: "Ana",
                password_hash: "x",
                role: shared::models::Role::Waiter,
                hourly_rate: 10.0,
            },
        )
        .await
        .unwrap();

        let now = shared::util::now_millis();
        session::create(&pool, user.id, rid, now - 1).await.unwrap();
        let live = session::create(&pool, user.id, rid, now + 60_000).await.unwrap();
        otp::upsert(&pool, rid, "old@example.com", "hash", now - 1, now - 10).await.unwrap();
        otp::upsert(&pool, rid, "new@example.com", "hash", now + 60_000, now).await.unwrap();

        let stats = purge_expired(&pool, now).await.unwrap();
        assert_eq!(stats, PurgeStats { sessions: 1, otp_codes: 1 });
        assert!(session::find_valid(&pool, &live.id, now).await.unwrap().is_some());
        assert!(otp::find(&pool, rid, "new@example.com").await.unwrap().is_some());
    }
}
