//! Dashboard page handler and view rendering.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    dashboard::{
        aggregation::{
            SplitTotal, get_activity, get_balance, get_split_totals, get_total_spent,
            get_week_cashflow,
        },
        cards::{Summary, split_cards_view, summary_cards_view},
        charts::{DashboardChart, chart_container, charts_script, split_budget_chart},
    },
    endpoints,
    html::{
        HeadElement, LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        link,
    },
    ledger::{EntryKind, LedgerEntry},
    money::format_currency,
    navigation::NavBar,
    split::SplitId,
    timezone::get_local_today,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Everything the dashboard shows, gathered under one database lock.
struct DashboardData {
    summary: Summary,
    split_totals: Vec<SplitTotal>,
    activity: Vec<LedgerEntry>,
}

/// Display the user's balance, this month's budget progress and recent activity.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = get_local_today(&state.local_timezone)
        .inspect_err(|error| tracing::error!("could not get today's date: {error}"))?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let data = build_dashboard_data(user_id, today, &connection)
        .inspect_err(|error| tracing::error!("could not build dashboard for {user_id}: {error}"))?;

    if data.activity.is_empty() && data.split_totals.len() <= 1 {
        return Ok(dashboard_no_data_view().into_response());
    }

    Ok(dashboard_view(&data).into_response())
}

fn build_dashboard_data(
    user_id: UserID,
    today: time::Date,
    connection: &Connection,
) -> Result<DashboardData, Error> {
    Ok(DashboardData {
        summary: Summary {
            balance: get_balance(user_id, connection)?,
            week_cashflow: get_week_cashflow(user_id, today, connection)?,
            spent_this_month: get_total_spent(user_id, today, connection)?,
        },
        split_totals: get_split_totals(user_id, today, connection)?,
        activity: get_activity(user_id, connection)?,
    })
}

fn dashboard_no_data_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let budget_link = link(endpoints::BUDGET_VIEW, "setting up a budget");
    let pay_link = link(endpoints::NEW_PAYABLE_VIEW, "recording a payment");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold" { "Nothing here yet..." }

            p
            {
                "Your balance and budget will show up here. Get started by "
                (budget_link) " or " (pay_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

fn dashboard_view(data: &DashboardData) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let chart = DashboardChart {
        id: "split-budget-chart",
        options: split_budget_chart(&data.split_totals).to_string(),
    };
    let split_names: HashMap<Option<SplitId>, &str> = data
        .split_totals
        .iter()
        .map(|total| (total.split_id, total.name.as_str()))
        .collect();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (summary_cards_view(&data.summary))
            (split_cards_view(&data.split_totals))

            section id="charts" class="w-full mx-auto mb-8" {
                (chart_container(&chart))
            }

            (activity_view(&data.activity, &split_names))
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&[chart]),
    ];

    base("Dashboard", &scripts, &content)
}

fn activity_view(activity: &[LedgerEntry], split_names: &HashMap<Option<SplitId>, &str>) -> Markup {
    html! {
        section id="activity" class="w-full mb-8" {
            h3 class="text-xl font-semibold mb-4" { "Activity" }

            @if activity.is_empty() {
                p class="text-gray-600 dark:text-gray-400" { "No payments yet." }
            } @else {
                div class="overflow-x-auto rounded" {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                        thead class=(TABLE_HEADER_STYLE) {
                            tr {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Split" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                            }
                        }
                        tbody {
                            @for entry in activity {
                                (activity_row(entry, split_names))
                            }
                        }
                    }
                }
            }
        }
    }
}

fn activity_row(entry: &LedgerEntry, split_names: &HashMap<Option<SplitId>, &str>) -> Markup {
    let edit_url = endpoints::format_endpoint(entry.kind.edit_view(), entry.id);
    let split_name = split_names.get(&entry.split_id).copied().unwrap_or_default();
    let (sign, style) = match entry.kind {
        EntryKind::Payable => ("-", "text-red-600 dark:text-red-400"),
        EntryKind::Receivable => ("+", "text-green-600 dark:text-green-400"),
    };

    html! {
        tr class=(TABLE_ROW_STYLE) data-kind=(entry.kind.to_string()) {
            td class=(TABLE_CELL_STYLE) {
                a href=(edit_url) class=(LINK_STYLE) { (entry.name.as_ref()) }
            }
            td class=(TABLE_CELL_STYLE) { (split_name) }
            td class=(TABLE_CELL_STYLE) { (entry.date.to_string()) }
            td class={ (TABLE_CELL_STYLE) " text-right " (style) } {
                (sign) (format_currency(entry.amount.as_decimal()))
            }
        }
    }
}
