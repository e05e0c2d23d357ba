//! Payledger is a web app for tracking what you pay and receive against a budget.
//!
//! This library provides a REST API that directly serves HTML pages.

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod dashboard;
mod db;
mod endpoints;
mod error;
mod export;
mod group;
mod html;
mod internal_server_error;
mod ledger;
mod logging;
mod money;
mod navigation;
mod not_found;
mod routing;
mod split;
mod timezone;
mod upload;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, DEFAULT_MAX_UPLOAD_BYTES, UploadConfig};
pub use auth::{
    Email, PasswordHash, User, UserID, ValidatedPassword, create_user, get_user_by_email,
    get_user_by_id, update_password,
};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use group::{BudgetName, GroupFields, create_group};
pub use ledger::{EntryFields, EntryKind, EntryName, create_entry};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::Amount;
pub use routing::build_router;
pub use split::{SplitFields, create_split};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
