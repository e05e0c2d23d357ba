//! Budget group editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    group::{GroupFormData, GroupId, form::group_form_fields, get_group, update_group},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
};

/// The state needed for the edit group page and endpoint.
#[derive(Debug, Clone)]
pub struct EditGroupState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditGroupState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the group editing page, pre-filled with the group's current values.
pub async fn get_edit_group_page(
    Path(group_id): Path<GroupId>,
    State(state): State<EditGroupState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let group = get_group(group_id, user_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve budget group {group_id}: {error}");
        }
    })?;

    let form_data = GroupFormData {
        name: group.name.to_string(),
        description: Some(group.description),
        amount: group.amount.as_decimal().to_string(),
    };

    Ok(edit_group_view(group_id, &form_data).into_response())
}

/// Handle group update form submission.
pub async fn update_group_endpoint(
    Path(group_id): Path<GroupId>,
    State(state): State<EditGroupState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<GroupFormData>,
) -> Response {
    let fields = match form_data.validate() {
        Ok(fields) => fields,
        Err(error) => {
            return edit_group_form_view(group_id, &form_data, &format!("Error: {error}"))
                .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_group(group_id, fields, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BUDGET_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingGroup) => Error::UpdateMissingGroup.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating budget group {group_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_group_view(group_id: GroupId, form_data: &GroupFormData) -> Markup {
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_GROUP_VIEW, group_id);
    let nav_bar = NavBar::new(&edit_url).into_html();
    let form = edit_group_form_view(group_id, form_data, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Edit Budget Group" }
            (form)
        }
    };

    base("Edit Group", &[dollar_input_styles()], &content)
}

fn edit_group_form_view(
    group_id: GroupId,
    form_data: &GroupFormData,
    error_message: &str,
) -> Markup {
    let update_url = endpoints::format_endpoint(endpoints::GROUP_API, group_id);

    html! {
        form
            hx-put=(update_url)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (group_form_fields(form_data))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Group" }
        }
    }
}
