//! HTTP surface for marksheet.
//!
//! # Responsibility
//! - Run the startup hook (schema migration, generator realignment).
//! - Serve the read/write form endpoints over axum.

pub mod app;
pub mod render;

pub use app::{notice_location, router, AppState};

use log::{error, info};
use marksheet_core::db::prepare_store;
use marksheet_core::{sqlite_service, RealignOutcome, ReconcileError, StoreConfig};

/// Prepares the store and realigns the identity generator once.
///
/// Never fails: a store that cannot be prepared is logged and reported as a
/// failed realignment, and the server still starts so each request can fail
/// on its own.
pub fn bootstrap_store(config: &StoreConfig) -> RealignOutcome {
    if let Err(err) = prepare_store(config) {
        error!(
            "event=store_prepare module=web status=error action=continue error={}",
            err
        );
        return RealignOutcome::Failed(ReconcileError::from(err));
    }
    sqlite_service(config).realign()
}

/// Binds `addr` and serves the router until the listener fails.
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "event=server_listen module=web status=ok addr={}",
        listener.local_addr()?
    );
    axum::serve(listener, router(state)).await
}
