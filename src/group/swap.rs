//! Endpoint for moving a budget group left or right on the budget page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    group::{GroupId, get_groups_with_splits, list::budget_groups_view, swap_group_order},
};

/// The state needed for reordering budget groups.
#[derive(Debug, Clone)]
pub struct SwapGroupEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SwapGroupEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The order the client wants the group to move to.
#[derive(Debug, Deserialize)]
pub struct GroupOrderForm {
    pub order: i64,
}

/// Move a group one place towards the requested order and respond with the
/// re-rendered group cards.
pub async fn swap_group_order_endpoint(
    Path(group_id): Path<GroupId>,
    State(state): State<SwapGroupEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<GroupOrderForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match swap_group_order(group_id, form.order, user_id, &connection) {
        Ok(group) => {
            tracing::debug!("Moved budget group {group_id} to order {}", group.order);
        }
        Err(error @ (Error::InvalidGroupOrder(_) | Error::NotFound)) => {
            return error.into_alert_response();
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while moving budget group {group_id}: {error}");
            return error.into_alert_response();
        }
    }

    match get_groups_with_splits(user_id, &connection) {
        Ok(groups) => budget_groups_view(&groups).into_response(),
        Err(error) => {
            tracing::error!("Failed to retrieve budget groups after moving group {group_id}: {error}");
            error.into_alert_response()
        }
    }
}
