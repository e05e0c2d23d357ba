//! Budget group creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
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
    group::{GroupFormData, create_group, form::group_form_fields},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
};

/// The state needed for creating a budget group.
#[derive(Debug, Clone)]
pub struct CreateGroupEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateGroupEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the group creation page.
pub async fn get_new_group_page() -> Response {
    new_group_view().into_response()
}

/// Handle group creation form submission.
pub async fn create_group_endpoint(
    State(state): State<CreateGroupEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<GroupFormData>,
) -> Response {
    let fields = match form_data.validate() {
        Ok(fields) => fields,
        Err(error) => {
            return new_group_form_view(&form_data, &format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_group(fields, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BUDGET_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a budget group: {error}");

            error.into_alert_response()
        }
    }
}

fn new_group_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_GROUP_VIEW).into_html();
    let empty_form = GroupFormData {
        name: String::new(),
        description: None,
        amount: String::new(),
    };
    let form = new_group_form_view(&empty_form, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Create Budget Group" }
            (form)
        }
    };

    base("Create Group", &[dollar_input_styles()], &content)
}

fn new_group_form_view(form_data: &GroupFormData, error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::GROUPS_API)
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

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Group" }
        }
    }
}
