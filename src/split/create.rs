//! Budget split creation page and endpoint.

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
    group::{BudgetGroup, GroupId, get_group, get_groups},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    split::{SplitFormData, create_split, form::split_form_fields},
};

/// The state needed for the new split page and endpoint.
#[derive(Debug, Clone)]
pub struct CreateSplitState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateSplitState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the split creation page with `group_id` preselected.
pub async fn get_new_split_page(
    Path(group_id): Path<GroupId>,
    State(state): State<CreateSplitState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let group = get_group(group_id, user_id, &connection)?;
    let groups = get_groups(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve budget groups: {error}"))?;

    let form_data = SplitFormData {
        group_id,
        name: String::new(),
        description: None,
        amount: String::new(),
    };

    Ok(new_split_view(&group, &form_data, &groups).into_response())
}

/// Handle split creation form submission.
pub async fn create_split_endpoint(
    State(state): State<CreateSplitState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<SplitFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let fields = match form_data.validate() {
        Ok(fields) => fields,
        Err(error) => {
            return match get_groups(user_id, &connection) {
                Ok(groups) => {
                    new_split_form_view(&form_data, &groups, &format!("Error: {error}"))
                        .into_response()
                }
                Err(error) => error.into_alert_response(),
            };
        }
    };

    match create_split(fields, user_id, &connection) {
        Ok(split) => {
            tracing::debug!("Created budget split {} in group {}", split.id, split.group_id);
            (
                HxRedirect(endpoints::BUDGET_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::InvalidGroup) => Error::InvalidGroup.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a budget split: {error}");
            error.into_alert_response()
        }
    }
}

fn new_split_view(group: &BudgetGroup, form_data: &SplitFormData, groups: &[BudgetGroup]) -> Markup {
    let new_split_url = endpoints::format_endpoint(endpoints::NEW_SPLIT_VIEW, group.id);
    let nav_bar = NavBar::new(&new_split_url).into_html();
    let form = new_split_form_view(form_data, groups, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Add Split to " (group.name) }
            (form)
        }
    };

    base("Create Split", &[dollar_input_styles()], &content)
}

fn new_split_form_view(
    form_data: &SplitFormData,
    groups: &[BudgetGroup],
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::SPLITS_API)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (split_form_fields(form_data, groups))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Split" }
        }
    }
}
