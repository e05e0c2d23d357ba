//! Budget split deletion endpoint.

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
    split::{SplitId, delete_split},
};

/// The state needed for deleting a budget split.
#[derive(Debug, Clone)]
pub struct DeleteSplitEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteSplitEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle split deletion and send the client back to the budget page.
pub async fn delete_split_endpoint(
    Path(split_id): Path<SplitId>,
    State(state): State<DeleteSplitEndpointState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_split(split_id, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BUDGET_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::DeleteMissingSplit) => Error::DeleteMissingSplit.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting budget split {split_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
