//! Cards for the headline figures and the per-split breakdown.

use maud::{Markup, html};
use rust_decimal::Decimal;

use crate::{
    dashboard::aggregation::SplitTotal,
    endpoints,
    html::{CARD_STYLE, LINK_STYLE},
    money::format_currency,
};

const POSITIVE_STYLE: &str = "text-green-600 dark:text-green-400";
const NEGATIVE_STYLE: &str = "text-red-600 dark:text-red-400";

/// The figures shown at the top of the dashboard.
pub(super) struct Summary {
    pub balance: Decimal,
    pub week_cashflow: Decimal,
    pub spent_this_month: Decimal,
}

fn amount_style(amount: Decimal) -> &'static str {
    if amount.is_sign_negative() && !amount.is_zero() {
        NEGATIVE_STYLE
    } else {
        POSITIVE_STYLE
    }
}

fn summary_card(label: &str, id: &str, amount: Decimal, style: &str) -> Markup {
    html! {
        div class=(CARD_STYLE) {
            h3 class="text-sm text-gray-600 dark:text-gray-400" { (label) }
            p id=(id) class={ "text-2xl font-bold " (style) } {
                (format_currency(amount))
            }
        }
    }
}

pub(super) fn summary_cards_view(summary: &Summary) -> Markup {
    html! {
        section class="w-full grid grid-cols-1 md:grid-cols-3 gap-4 mb-8" {
            (summary_card("Balance", "balance", summary.balance, amount_style(summary.balance)))
            (summary_card(
                "In/out this week",
                "week-cashflow",
                summary.week_cashflow,
                amount_style(summary.week_cashflow),
            ))
            (summary_card("Spent this month", "spent-this-month", summary.spent_this_month, ""))
        }
    }
}

/// One card per split with its budget, spending and what is left for the month.
pub(super) fn split_cards_view(totals: &[SplitTotal]) -> Markup {
    html! {
        section class="w-full mb-8" {
            div class="flex justify-between items-baseline mb-4" {
                h3 class="text-xl font-semibold" { "Splits" }
                span class="text-sm text-gray-600 dark:text-gray-400" { "This month" }
            }

            div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4" {
                @for total in totals {
                    (split_card(total))
                }
            }
        }
    }
}

fn split_card(total: &SplitTotal) -> Markup {
    html! {
        div
            class=(CARD_STYLE)
            data-split-id=[total.split_id]
        {
            h4 class="text-lg font-semibold mb-3 truncate" title=(total.name) {
                @if let Some(split_id) = total.split_id {
                    a
                        href=(endpoints::format_endpoint(endpoints::EDIT_SPLIT_VIEW, split_id))
                        class=(LINK_STYLE)
                    { (total.name) }
                } @else {
                    (total.name)
                }
            }

            dl class="grid grid-cols-2 gap-1 text-sm" {
                dt class="text-gray-600 dark:text-gray-400" { "Budgeted" }
                dd class="text-right" { (format_currency(total.budgeted)) }
                dt class="text-gray-600 dark:text-gray-400" { "Spent" }
                dd class="text-right" { (format_currency(total.spent)) }
                dt class="text-gray-600 dark:text-gray-400" { "Remaining" }
                dd class={ "text-right font-semibold " (amount_style(total.remaining)) } {
                    (format_currency(total.remaining))
                }
            }
        }
    }
}
