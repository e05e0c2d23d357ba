//! Budget split editing page and endpoint.

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
    group::{BudgetGroup, get_groups},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base,
        dollar_input_styles,
    },
    navigation::NavBar,
    split::{SplitFormData, SplitId, form::split_form_fields, get_split, update_split},
};

/// The state needed for the edit split page and endpoint.
#[derive(Debug, Clone)]
pub struct EditSplitState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditSplitState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the split editing page, pre-filled with the split's current values.
pub async fn get_edit_split_page(
    Path(split_id): Path<SplitId>,
    State(state): State<EditSplitState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let split = get_split(split_id, user_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve budget split {split_id}: {error}");
        }
    })?;
    let groups = get_groups(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve budget groups: {error}"))?;

    let form_data = SplitFormData {
        group_id: split.group_id,
        name: split.name.to_string(),
        description: Some(split.description),
        amount: split.amount.as_decimal().to_string(),
    };

    Ok(edit_split_view(split_id, &form_data, &groups).into_response())
}

/// Handle split update form submission.
pub async fn update_split_endpoint(
    Path(split_id): Path<SplitId>,
    State(state): State<EditSplitState>,
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
                Ok(groups) => edit_split_form_view(
                    split_id,
                    &form_data,
                    &groups,
                    &format!("Error: {error}"),
                )
                .into_response(),
                Err(error) => error.into_alert_response(),
            };
        }
    };

    match update_split(split_id, fields, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BUDGET_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::UpdateMissingSplit | Error::InvalidGroup)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating budget split {split_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_split_view(split_id: SplitId, form_data: &SplitFormData, groups: &[BudgetGroup]) -> Markup {
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_SPLIT_VIEW, split_id);
    let delete_url = endpoints::format_endpoint(endpoints::SPLIT_API, split_id);
    let nav_bar = NavBar::new(&edit_url).into_html();
    let form = edit_split_form_view(split_id, form_data, groups, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Edit Budget Split" }
            (form)

            button
                type="button"
                hx-delete=(delete_url)
                hx-confirm={ "Delete the split '" (form_data.name) "'? Its payables and receivables will be moved to Other." }
                hx-target-error="#alert-container"
                class={ "mt-6 " (BUTTON_DELETE_STYLE) }
            {
                "Delete Split"
            }
        }
    };

    base("Edit Split", &[dollar_input_styles()], &content)
}

fn edit_split_form_view(
    split_id: SplitId,
    form_data: &SplitFormData,
    groups: &[BudgetGroup],
    error_message: &str,
) -> Markup {
    let update_url = endpoints::format_endpoint(endpoints::SPLIT_API, split_id);

    html! {
        form
            hx-put=(update_url)
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

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Split" }
        }
    }
}

#[cfg(test)]
mod edit_split_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        Error,
        auth::UserID,
        db::initialize,
        endpoints,
        group::{BudgetName, create_group},
        split::{BudgetSplit, SplitFormData, create_split, get_split},
        test_utils::{
            assert_form_error_message, assert_form_input_with_value, assert_hx_endpoint,
            assert_hx_redirect, assert_valid_html, insert_test_user, must_get_form,
            parse_html_document, parse_html_fragment, test_group_fields, test_split_fields,
        },
    };

    use super::{EditSplitState, get_edit_split_page, update_split_endpoint};

    fn get_state() -> (EditSplitState, UserID, BudgetSplit) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user_id = insert_test_user(&connection, "test@test.com");
        let group = create_group(test_group_fields("Living"), user_id, &connection).unwrap();
        let split =
            create_split(test_split_fields(group.id, "Rent"), user_id, &connection).unwrap();

        (
            EditSplitState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user_id,
            split,
        )
    }

    #[tokio::test]
    async fn edit_page_is_prefilled() {
        let (state, user_id, split) = get_state();

        let response = get_edit_split_page(Path(split.id), State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::SPLIT_API, split.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Rent");

        let delete_button = html
            .select(&Selector::parse("button[hx-delete]").unwrap())
            .next()
            .expect("Could not find the delete button");
        assert_eq!(
            delete_button.value().attr("hx-delete"),
            Some(endpoints::format_endpoint(endpoints::SPLIT_API, split.id).as_str())
        );
    }

    #[tokio::test]
    async fn edit_page_for_other_users_split_is_not_found() {
        let (state, _, split) = get_state();
        let other_user = insert_test_user(&state.db_connection.lock().unwrap(), "o@test.com");

        let result = get_edit_split_page(Path(split.id), State(state), Extension(other_user)).await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }

    #[tokio::test]
    async fn update_changes_split() {
        let (state, user_id, split) = get_state();
        let form = SplitFormData {
            group_id: split.group_id,
            name: "Mortgage".to_owned(),
            description: Some("Fixed rate".to_owned()),
            amount: "700".to_owned(),
        };

        let response = update_split_endpoint(
            Path(split.id),
            State(state.clone()),
            Extension(user_id),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::BUDGET_VIEW);
        let updated = get_split(split.id, user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(updated.name, BudgetName::new_unchecked("Mortgage"));
        assert_eq!(updated.description, "Fixed rate");
    }

    #[tokio::test]
    async fn update_with_invalid_amount_shows_error() {
        let (state, user_id, split) = get_state();
        let form = SplitFormData {
            group_id: split.group_id,
            name: "Rent".to_owned(),
            description: None,
            amount: "lots".to_owned(),
        };

        let response =
            update_split_endpoint(Path(split.id), State(state), Extension(user_id), Form(form))
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Amount must be a number, got \"lots\"");
    }
}
