//! HostAudit - Host Security Auditor
//!
//! Audits a host's runtime state (processes, ports, startup items,
//! critical-file hashes), persists point-in-time baselines and reports
//! scored differences between a baseline and the live state.

mod api;
mod constants;
mod logic;

use std::net::SocketAddr;
use std::sync::Arc;

use logic::baseline::BaselineStore;
use logic::scan::{HostScanner, SystemScanner};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!(
        "Starting {} v{}...",
        constants::APP_NAME,
        constants::APP_VERSION
    );

    let db_path = constants::get_data_dir().join("baselines.db");
    let store = match BaselineStore::open(&db_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            log::error!("Failed to open baseline store at {:?}: {}", db_path, e);
            std::process::exit(1);
        }
    };
    log::info!("Baseline store ready at {:?}", db_path);

    let scanner: Arc<dyn HostScanner> = Arc::new(SystemScanner::new());
    let state = api::AppState { store, scanner };
    let app = api::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], constants::get_port()));
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listen address");
    axum::serve(listener, app).await.expect("server error");
}
