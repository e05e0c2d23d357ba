//! The export page and the CSV download endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::header,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    export::report::{get_report_entries, write_report_csv},
    group::{GroupWithSplits, get_groups_with_splits},
    html::{BUTTON_PRIMARY_STYLE, CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    split::SplitId,
    timezone::get_local_today,
};

/// The state needed for the export page and download.
#[derive(Debug, Clone)]
pub struct ExportState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The splits the user ticked on the export page.
#[derive(Debug, Deserialize)]
pub struct ExportForm {
    #[serde(default)]
    pub split_id: Vec<SplitId>,
}

/// Render the page for choosing which splits to export.
pub async fn get_export_page(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let groups = get_groups_with_splits(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve budget groups: {error}"))?;

    Ok(export_view(&groups).into_response())
}

/// Respond with the selected splits' payables and receivables as a CSV attachment.
pub async fn download_export(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ExportForm>,
) -> Result<Response, Error> {
    if form.split_id.is_empty() {
        return Err(Error::NoSplitsSelected);
    }

    let today = get_local_today(&state.local_timezone)
        .inspect_err(|error| tracing::error!("could not get today's date: {error}"))?;

    let entries = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_report_entries(&form.split_id, user_id, &connection).inspect_err(|error| {
            tracing::error!("Failed to collect entries for export: {error}")
        })?
    };

    let csv = write_report_csv(&entries)
        .inspect_err(|error| tracing::error!("Failed to write export: {error}"))?;
    tracing::debug!("Exported {} entries for {user_id}", entries.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export_file_name(today)),
            ),
        ],
        csv,
    )
        .into_response())
}

fn export_file_name(date: time::Date) -> String {
    format!("Expense Report - {date}.csv")
}

fn export_view(groups: &[GroupWithSplits]) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPORT_VIEW).into_html();
    let has_splits = groups.iter().any(|group| !group.splits.is_empty());

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Export Expense Report" }

                @if has_splits {
                    form
                        method="post"
                        action=(endpoints::EXPORT_DOWNLOAD)
                        class="space-y-4"
                    {
                        p class="text-sm text-gray-600 dark:text-gray-400"
                        {
                            "Choose the budget splits to include in the spreadsheet."
                        }

                        @for group in groups.iter().filter(|group| !group.splits.is_empty()) {
                            fieldset class=(CARD_STYLE)
                            {
                                legend class="font-semibold" { (group.group.name) }

                                @for split in &group.splits {
                                    label class="flex items-center space-x-2 mt-2"
                                    {
                                        input
                                            type="checkbox"
                                            name="split_id"
                                            value=(split.id)
                                            class="rounded-sm border-gray-300 text-blue-600";

                                        span { (split.name) }
                                    }
                                }
                            }
                        }

                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Download CSV" }
                    }
                } @else {
                    p class="text-gray-500 dark:text-gray-400"
                    {
                        "There are no budget splits to export yet. "
                        a href=(endpoints::BUDGET_VIEW) class=(LINK_STYLE) { "Set up your budget" }
                    }
                }
            }
        }
    );

    base("Export", &[], &content)
}

#[cfg(test)]
mod export_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        body::to_bytes,
        extract::State,
        http::{StatusCode, header},
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        Error,
        auth::UserID,
        db::initialize,
        group::create_group,
        ledger::{EntryKind, create_entry},
        split::create_split,
        test_utils::{
            assert_content_type, assert_form_submit_button_with_text, assert_valid_html,
            get_header, insert_test_user, must_get_form, parse_html_document,
            test_entry_fields, test_group_fields, test_split_fields,
        },
        timezone::get_local_today,
    };

    use super::{ExportForm, ExportState, download_export, get_export_page};

    fn get_state() -> (ExportState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user_id = insert_test_user(&connection, "test@test.com");

        (
            ExportState {
                db_connection: Arc::new(Mutex::new(connection)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user_id,
        )
    }

    #[tokio::test]
    async fn export_page_lists_splits_as_checkboxes() {
        let (state, user_id) = get_state();
        let (food, rent) = {
            let connection = state.db_connection.lock().unwrap();
            let group = create_group(test_group_fields("Living"), user_id, &connection).unwrap();
            (
                create_split(test_split_fields(group.id, "Food"), user_id, &connection).unwrap(),
                create_split(test_split_fields(group.id, "Rent"), user_id, &connection).unwrap(),
            )
        };

        let response = get_export_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_eq!(form.value().attr("action"), Some("/export/download"));
        assert_form_submit_button_with_text(&form, "Download CSV");
        let values: Vec<String> = form
            .select(&Selector::parse("input[type=checkbox][name=split_id]").unwrap())
            .filter_map(|input| input.value().attr("value").map(str::to_owned))
            .collect();
        assert_eq!(values, vec![food.id.to_string(), rent.id.to_string()]);
    }

    #[tokio::test]
    async fn download_returns_csv_attachment() {
        let (state, user_id) = get_state();
        let food = {
            let connection = state.db_connection.lock().unwrap();
            let group = create_group(test_group_fields("Living"), user_id, &connection).unwrap();
            let food =
                create_split(test_split_fields(group.id, "Food"), user_id, &connection).unwrap();
            create_entry(
                EntryKind::Payable,
                test_entry_fields("Groceries", Some(food.id)),
                user_id,
                &connection,
            )
            .unwrap();
            food
        };

        let response = download_export(
            State(state),
            Extension(user_id),
            Form(ExportForm {
                split_id: vec![food.id],
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/csv; charset=utf-8");
        let today = get_local_today("Etc/UTC").unwrap();
        assert_eq!(
            get_header(&response, header::CONTENT_DISPOSITION.as_str()),
            format!("attachment; filename=\"Expense Report - {today}.csv\"")
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            String::from_utf8(body.to_vec()).unwrap(),
            "Title,Amount,Date,Category,Notes\nGroceries,($10.00),2025-01-15,Food,\n"
        );
    }

    #[test]
    fn form_accepts_repeated_split_ids() {
        let form: ExportForm = serde_html_form::from_str("split_id=3&split_id=5").unwrap();

        assert_eq!(form.split_id, vec![3, 5]);

        let form: ExportForm = serde_html_form::from_str("").unwrap();

        assert!(form.split_id.is_empty());
    }

    #[tokio::test]
    async fn download_without_splits_is_bad_request() {
        let (state, user_id) = get_state();

        let result = download_export(
            State(state),
            Extension(user_id),
            Form(ExportForm { split_id: vec![] }),
        )
        .await;

        assert_eq!(result.err(), Some(Error::NoSplitsSelected));
    }
}
