//! The "My Budget" page listing groups and their splits.

use std::sync::{Arc, Mutex};

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
    endpoints,
    group::{GroupWithSplits, get_groups_with_splits},
    html::{
        BUTTON_LINK_STYLE, CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base,
        edit_delete_action_links,
    },
    money::{format_currency, subtract_amounts, sum_amounts},
    navigation::NavBar,
};

/// The id of the element that move and delete requests swap out.
pub(crate) const BUDGET_GROUPS_ID: &str = "budget-groups";

/// The state needed for the budget page.
#[derive(Debug, Clone)]
pub struct BudgetPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the budget page with every group and split of the user.
pub async fn get_budget_page(
    State(state): State<BudgetPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let groups = get_groups_with_splits(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve budget groups: {error}"))?;

    Ok(budget_view(&groups).into_response())
}

fn budget_view(groups: &[GroupWithSplits]) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGET_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full lg:max-w-5xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "My Budget" }

                    a href=(endpoints::NEW_GROUP_VIEW) class=(LINK_STYLE)
                    {
                        "Create Group"
                    }
                }

                (budget_groups_view(groups))
            }
        }
    );

    base("Budget", &[], &content)
}

/// The cards for all groups. Swapped in place after a group is moved or deleted.
pub(crate) fn budget_groups_view(groups: &[GroupWithSplits]) -> Markup {
    let last_index = groups.len().saturating_sub(1);

    html!(
        section id=(BUDGET_GROUPS_ID) class="grid gap-4 md:grid-cols-2 lg:grid-cols-3"
        {
            @for (index, group) in groups.iter().enumerate() {
                (group_card(group, index == 0, index == last_index))
            }

            @if groups.is_empty() {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "No budget groups created yet. "
                    a href=(endpoints::NEW_GROUP_VIEW) class=(LINK_STYLE)
                    {
                        "Create your first group"
                    }
                }
            }
        }
    )
}

fn group_card(group_with_splits: &GroupWithSplits, is_first: bool, is_last: bool) -> Markup {
    let GroupWithSplits { group, splits } = group_with_splits;
    let unallocated = sum_amounts(splits.iter().map(|split| split.amount.as_decimal()))
        .and_then(|allocated| subtract_amounts(group.amount.as_decimal(), allocated))
        .inspect_err(|error| {
            tracing::error!("Could not compute unallocated amount of group {}: {error}", group.id)
        })
        .ok();

    let edit_url = endpoints::format_endpoint(endpoints::EDIT_GROUP_VIEW, group.id);
    let delete_url = endpoints::format_endpoint(endpoints::GROUP_API, group.id);
    let new_split_url = endpoints::format_endpoint(endpoints::NEW_SPLIT_VIEW, group.id);
    let confirm_message = format!(
        "Are you sure you want to delete '{}'? Its {} split(s) will be deleted \
        and their payables and receivables moved to 'Other'.",
        group.name,
        splits.len()
    );
    let target = format!("#{BUDGET_GROUPS_ID}");

    html!(
        article class=(CARD_STYLE) data-group-id=(group.id)
        {
            header class="flex justify-between items-start gap-2"
            {
                div
                {
                    h2 class="text-lg font-semibold" { (group.name) }

                    @if !group.description.is_empty() {
                        p class="text-sm text-gray-500 dark:text-gray-400" { (group.description) }
                    }
                }

                span class="font-semibold" { (group.amount) }
            }

            ul class="my-3 divide-y divide-gray-200 dark:divide-gray-700"
            {
                @for split in splits {
                    li class="flex justify-between py-2"
                    {
                        a
                            href=(endpoints::format_endpoint(endpoints::EDIT_SPLIT_VIEW, split.id))
                            class=(LINK_STYLE)
                        {
                            (split.name)
                        }

                        span { (split.amount) }
                    }
                }

                @if splits.is_empty() {
                    li class="py-2 text-sm text-gray-500 dark:text-gray-400" { "No splits yet." }
                }
            }

            p class="text-sm"
            {
                "Unallocated: "
                @if let Some(unallocated) = unallocated {
                    span class=(if unallocated.is_sign_negative() { "text-red-600 dark:text-red-400" } else { "" })
                    {
                        (format_currency(unallocated))
                    }
                } @else {
                    span class="text-red-600 dark:text-red-400" { "too large to compute" }
                }
            }

            footer class="flex flex-wrap items-center gap-4 mt-3"
            {
                a href=(new_split_url) class=(LINK_STYLE) { "Add Split" }

                (edit_delete_action_links(&edit_url, &delete_url, &confirm_message, &target, "outerHTML"))

                (move_button(group.id, group.order - 1, "Move left", is_first, &target))
                (move_button(group.id, group.order + 1, "Move right", is_last, &target))
            }
        }
    )
}

fn move_button(
    group_id: i64,
    requested_order: i64,
    label: &str,
    disabled: bool,
    target: &str,
) -> Markup {
    let order_url = endpoints::format_endpoint(endpoints::GROUP_ORDER_API, group_id);

    html!(
        button
            type="button"
            hx-put=(order_url)
            hx-vals=(format!(r#"{{"order": {requested_order}}}"#))
            hx-target=(target)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            disabled[disabled]
            class=(BUTTON_LINK_STYLE)
        {
            (label)
        }
    )
}
