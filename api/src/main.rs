use api::routes::routes;
use api::state::AppState;
use axum::Router;
use migration::Migrator;
use sea_orm_migration::MigratorTrait;
use services::clock::SystemClock;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_appender::rolling;
use util::config;

#[tokio::main]
async fn main() {
    let _log_guard = init_logging(&config::log_file(), &config::log_level());

    let db = db::connect().await.expect("Failed to connect to database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let app_state = AppState::new(db, Arc::new(SystemClock));

    // Ctrl-C stops the server first, then the sweeper.
    let (stop_sweeper, sweeper_stopped) = oneshot::channel::<()>();
    let sweeper = app_state.sweeper().clone().spawn(async move {
        let _ = sweeper_stopped.await;
    });

    let app = Router::new()
        .nest("/api", routes(app_state))
        .layer(CorsLayer::very_permissive());

    let addr: SocketAddr = format!("{}:{}", config::host(), config::port())
        .parse()
        .expect("Invalid address");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    info!(
        "Starting {} on http://{} (env = {})",
        config::project_name(),
        addr,
        config::env()
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(e) = served {
        error!(error = %e, "Server error");
    }

    let _ = stop_sweeper.send(());
    if let Err(e) = sweeper.await {
        error!(error = %e, "Auto-close sweeper task failed");
    }
    info!("Shutdown complete");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn init_logging(log_file: &str, log_level: &str) -> tracing_appender::non_blocking::WorkerGuard {
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let stdout_layer = config::log_to_stdout().then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(true)
    });

    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("api=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    guard
}
