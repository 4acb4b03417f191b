//! Periodic task that closes sign-in windows nobody closed by hand.

use crate::attendance_session::AttendanceSessionService;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Outcome of one pass over the open sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub examined: usize,
    pub closed: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct AutoCloseSweeper {
    sessions: AttendanceSessionService,
    interval: Duration,
}

impl AutoCloseSweeper {
    pub fn new(sessions: AttendanceSessionService, interval: Duration) -> Self {
        Self {
            sessions,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Runs one pass. A session that fails to close is logged and left for
    /// the next pass; it never stops the others.
    pub async fn tick(&self) -> SweepReport {
        let mut report = SweepReport::default();

        let open = match self.sessions.open_sessions().await {
            Ok(open) => open,
            Err(e) => {
                error!(error = %e, "Auto-close sweep could not list open sessions");
                return report;
            }
        };

        let now = self.sessions.now();
        for session in open {
            report.examined += 1;
            if !session.is_expired(now) {
                continue;
            }

            match self.sessions.close_if_expired(session.id).await {
                Ok(Some(_)) => report.closed += 1,
                Ok(None) => debug!(session_id = session.id, "Session changed before it could be closed"),
                Err(e) => {
                    report.failed += 1;
                    warn!(session_id = session.id, error = %e, "Failed to auto-close session");
                }
            }
        }

        if report.closed > 0 || report.failed > 0 {
            info!(
                examined = report.examined,
                closed = report.closed,
                failed = report.failed,
                "Auto-close sweep finished"
            );
        }
        report
    }

    /// Ticks every interval until `shutdown` resolves. A pass already under
    /// way when shutdown arrives runs to completion first.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(interval_secs = self.interval.as_secs_f64(), "Auto-close sweeper started");
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }
        info!("Auto-close sweeper stopped");
    }

    pub fn spawn<F>(self, shutdown: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(self.run_until(shutdown))
    }
}
