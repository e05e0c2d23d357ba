//! Budget group deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    group::{GroupId, delete_group, get_groups_with_splits, list::budget_groups_view},
};

/// The state needed for deleting a budget group.
#[derive(Debug, Clone)]
pub struct DeleteGroupEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteGroupEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle group deletion.
///
/// Responds with the re-rendered group cards, since the remaining groups are
/// renumbered, and a success alert.
pub async fn delete_group_endpoint(
    Path(group_id): Path<GroupId>,
    State(state): State<DeleteGroupEndpointState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_group(group_id, user_id, &connection) {
        Ok(_) => {}
        Err(Error::DeleteMissingGroup) => return Error::DeleteMissingGroup.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting budget group {group_id}: {error}"
            );
            return error.into_alert_response();
        }
    }

    match get_groups_with_splits(user_id, &connection) {
        Ok(groups) => html! {
            (budget_groups_view(&groups))
            (Alert::SuccessSimple { message: "Budget group deleted successfully".to_owned() }.into_markup())
        }
        .into_response(),
        Err(error) => {
            tracing::error!("Failed to retrieve budget groups after deletion: {error}");
            error.into_alert_response()
        }
    }
}
