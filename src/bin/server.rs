use std::sync::Arc;

use tracing::{error, info};

use super6::constants::MAX_TOTAL_STICKS;
use super6::env_config;
use super6::server::create_router;
use super6::storage::{load_or_compute, state_file_path};
use super6::value_iteration::SolverConfig;

#[tokio::main]
async fn main() {
    env_config::init_logging();
    env_config::init_base_path();

    let total = env_config::server_sticks();
    if total == 0 || total > MAX_TOTAL_STICKS {
        error!(total, max = MAX_TOTAL_STICKS, "SUPER6_STICKS out of range");
        std::process::exit(1);
    }
    info!(total, "starting Super Six API server");

    let path = state_file_path(total);
    let solution = match load_or_compute(total, &path, &SolverConfig::default()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to prepare strategy table");
            std::process::exit(1);
        }
    };

    let app = create_router(Arc::new(solution));

    let port = env_config::server_port();
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await {
        Ok(l) => l,
        Err(e) => {
            error!(port, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };
    info!(port, "server is running, press Ctrl+C to stop");
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "server error");
    }

    info!("stopping server");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to install CTRL+C signal handler");
        std::future::pending::<()>().await;
    }
}
