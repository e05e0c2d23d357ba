//! Endpoints for deleting payables and receivables.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    ledger::{EntryId, EntryKind, delete_entry},
};

/// The state needed for deleting payables and receivables.
#[derive(Debug, Clone)]
pub struct DeleteEntryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteEntryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Delete a payable and send the client to the dashboard.
pub async fn delete_payable_endpoint(
    Path(entry_id): Path<EntryId>,
    State(state): State<DeleteEntryState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    delete_entry_endpoint(EntryKind::Payable, entry_id, &state, user_id)
}

/// Delete a receivable and send the client to the dashboard.
pub async fn delete_receivable_endpoint(
    Path(entry_id): Path<EntryId>,
    State(state): State<DeleteEntryState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    delete_entry_endpoint(EntryKind::Receivable, entry_id, &state, user_id)
}

fn delete_entry_endpoint(
    kind: EntryKind,
    entry_id: EntryId,
    state: &DeleteEntryState,
    user_id: UserID,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_entry(kind, entry_id, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::DeleteMissingEntry(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting {kind} {entry_id}: {error}");
            error.into_alert_response()
        }
    }
}
