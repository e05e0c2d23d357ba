//! Pages and endpoints for editing payables and receivables.

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
    html::{BUTTON_DELETE_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles},
    ledger::{
        EntryFormData, EntryId, EntryKind, get_entry, update_entry,
        form::{EntryFormAction, EntryFormView, entry_form},
    },
    navigation::NavBar,
    split::get_all_splits,
    upload::{find_uploads_by_keys, get_payable_attachments},
};

/// The state needed for editing payables and receivables.
#[derive(Debug, Clone)]
pub struct EditEntryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditEntryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the edit page for a payable.
pub async fn get_edit_payable_page(
    Path(entry_id): Path<EntryId>,
    State(state): State<EditEntryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    edit_entry_page(EntryKind::Payable, entry_id, &state, user_id)
}

/// Render the edit page for a receivable.
pub async fn get_edit_receivable_page(
    Path(entry_id): Path<EntryId>,
    State(state): State<EditEntryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    edit_entry_page(EntryKind::Receivable, entry_id, &state, user_id)
}

/// Handle the payable edit form submission.
pub async fn update_payable_endpoint(
    Path(entry_id): Path<EntryId>,
    State(state): State<EditEntryState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<EntryFormData>,
) -> Response {
    update_entry_endpoint(EntryKind::Payable, entry_id, &state, user_id, form_data)
}

/// Handle the receivable edit form submission.
pub async fn update_receivable_endpoint(
    Path(entry_id): Path<EntryId>,
    State(state): State<EditEntryState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<EntryFormData>,
) -> Response {
    update_entry_endpoint(EntryKind::Receivable, entry_id, &state, user_id, form_data)
}

fn edit_entry_page(
    kind: EntryKind,
    entry_id: EntryId,
    state: &EditEntryState,
    user_id: UserID,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let entry = get_entry(kind, entry_id, user_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve {kind} {entry_id}: {error}");
        }
    })?;
    let splits = get_all_splits(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve budget splits: {error}"))?;
    let attachments = match kind {
        EntryKind::Payable => get_payable_attachments(entry_id, user_id, &connection)?,
        EntryKind::Receivable => Vec::new(),
    };

    let form_data = EntryFormData {
        name: entry.name.to_string(),
        amount: entry.amount.as_decimal().to_string(),
        date: entry.date,
        description: Some(entry.description),
        counterparty: Some(entry.counterparty),
        split_id: entry.split_id,
        file_keys: attachments.iter().map(|upload| upload.key.clone()).collect(),
    };

    let form = entry_form(
        &EntryFormView {
            kind,
            action: EntryFormAction::Update(entry_id),
            form_data: &form_data,
            splits: &splits,
            attachments: &attachments,
        },
        "",
    );

    Ok(edit_entry_view(kind, entry_id, &form_data.name, form).into_response())
}

fn edit_entry_view(kind: EntryKind, entry_id: EntryId, name: &str, form: Markup) -> Markup {
    let edit_url = endpoints::format_endpoint(kind.edit_view(), entry_id);
    let delete_url = endpoints::format_endpoint(kind.item_api(), entry_id);
    let nav_bar = NavBar::new(&edit_url).into_html();

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Edit " (kind.title()) }
            (form)

            button
                type="button"
                hx-delete=(delete_url)
                hx-confirm={ "Delete the " (kind) " '" (name) "'?" }
                hx-target-error="#alert-container"
                class={ "mt-6 " (BUTTON_DELETE_STYLE) }
            {
                "Delete " (kind.title())
            }
        }
    };

    base(&format!("Edit {}", kind.title()), &[dollar_input_styles()], &content)
}

fn update_entry_endpoint(
    kind: EntryKind,
    entry_id: EntryId,
    state: &EditEntryState,
    user_id: UserID,
    form_data: EntryFormData,
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
            let rendered = get_all_splits(user_id, &connection).and_then(|splits| {
                let attachments = find_uploads_by_keys(&form_data.file_keys, user_id, &connection)?;

                Ok(entry_form(
                    &EntryFormView {
                        kind,
                        action: EntryFormAction::Update(entry_id),
                        form_data: &form_data,
                        splits: &splits,
                        attachments: &attachments,
                    },
                    &format!("Error: {error}"),
                ))
            });

            return match rendered {
                Ok(form) => form.into_response(),
                Err(error) => error.into_alert_response(),
            };
        }
    };

    match update_entry(kind, entry_id, fields, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::UpdateMissingEntry(_) | Error::InvalidSplit)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating {kind} {entry_id}: {error}");
            error.into_alert_response()
        }
    }
}
