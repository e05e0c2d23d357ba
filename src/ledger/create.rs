//! Pages and endpoints for recording new payables ("Pay") and receivables ("Fund").

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
    html::{FORM_CONTAINER_STYLE, base, dollar_input_styles},
    ledger::{
        EntryFormData, EntryKind, create_entry,
        form::{EntryFormAction, EntryFormView, entry_form},
    },
    navigation::NavBar,
    split::get_all_splits,
    timezone::get_local_today,
    upload::find_uploads_by_keys,
};

/// The state needed for recording payables and receivables.
#[derive(Debug, Clone)]
pub struct CreateEntryState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateEntryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the page for recording a payable.
pub async fn get_new_payable_page(
    State(state): State<CreateEntryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    new_entry_page(EntryKind::Payable, &state, user_id)
}

/// Render the page for recording a receivable.
pub async fn get_new_receivable_page(
    State(state): State<CreateEntryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    new_entry_page(EntryKind::Receivable, &state, user_id)
}

/// Handle the payable form submission.
pub async fn create_payable_endpoint(
    State(state): State<CreateEntryState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<EntryFormData>,
) -> Response {
    create_entry_endpoint(EntryKind::Payable, &state, user_id, form_data)
}

/// Handle the receivable form submission.
pub async fn create_receivable_endpoint(
    State(state): State<CreateEntryState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<EntryFormData>,
) -> Response {
    create_entry_endpoint(EntryKind::Receivable, &state, user_id, form_data)
}

fn new_entry_page(
    kind: EntryKind,
    state: &CreateEntryState,
    user_id: UserID,
) -> Result<Response, Error> {
    let today = get_local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let splits = get_all_splits(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve budget splits: {error}"))?;

    let form_data = EntryFormData {
        name: String::new(),
        amount: String::new(),
        date: today,
        description: None,
        counterparty: None,
        split_id: None,
        file_keys: Vec::new(),
    };

    let form = entry_form(
        &EntryFormView {
            kind,
            action: EntryFormAction::Create,
            form_data: &form_data,
            splits: &splits,
            attachments: &[],
        },
        "",
    );

    Ok(new_entry_view(kind, form).into_response())
}

fn new_entry_view(kind: EntryKind, form: Markup) -> Markup {
    let nav_bar = NavBar::new(kind.new_view()).into_html();
    let heading = match kind {
        EntryKind::Payable => "Pay",
        EntryKind::Receivable => "Fund",
    };

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { (heading) }
            (form)
        }
    };

    base(&format!("New {}", kind.title()), &[dollar_input_styles()], &content)
}

fn create_entry_endpoint(
    kind: EntryKind,
    state: &CreateEntryState,
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
                        action: EntryFormAction::Create,
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

    match create_entry(kind, fields, user_id, &connection) {
        Ok(entry) => {
            tracing::debug!("Created {kind} {}", entry.id);
            (
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::InvalidSplit) => Error::InvalidSplit.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a {kind}: {error}");
            error.into_alert_response()
        }
    }
}
