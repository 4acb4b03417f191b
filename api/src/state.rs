use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use services::attendance_query::AttendanceQueryService;
use services::attendance_session::AttendanceSessionService;
use services::auto_close::AutoCloseSweeper;
use services::catalog::DbScheduleCatalog;
use services::clock::Clock;
use std::sync::Arc;
use std::time::Duration;
use util::config;

/// Everything a handler needs, built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    sessions: AttendanceSessionService,
    queries: AttendanceQueryService,
    sweeper: AutoCloseSweeper,
}

impl AppState {
    pub fn new(db: DatabaseConnection, clock: Arc<dyn Clock>) -> Self {
        let catalog = Arc::new(DbScheduleCatalog::new(db.clone()));
        let sessions = AttendanceSessionService::new(db.clone(), catalog, clock)
            .with_auto_close_minutes(config::auto_close_minutes());
        let queries = AttendanceQueryService::from(&sessions);
        let sweeper = AutoCloseSweeper::new(
            sessions.clone(),
            Duration::from_secs(config::sweep_interval_seconds()),
        );

        Self {
            db,
            sessions,
            queries,
            sweeper,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn sessions(&self) -> &AttendanceSessionService {
        &self.sessions
    }

    pub fn queries(&self) -> &AttendanceQueryService {
        &self.queries
    }

    pub fn sweeper(&self) -> &AutoCloseSweeper {
        &self.sweeper
    }

    /// Today's date (UTC) according to the injected clock.
    pub fn today(&self) -> NaiveDate {
        self.sessions.now().date_naive()
    }
}
