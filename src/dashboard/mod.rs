//! The dashboard: the user's balance, budget progress for the month and recent activity.

mod aggregation;
mod cards;
mod charts;
mod handlers;

pub use aggregation::{
    OTHER_BUCKET_NAME, SplitTotal, get_activity, get_balance, get_split_totals, get_total_spent,
    get_week_cashflow,
};
pub use handlers::{DashboardState, get_dashboard_page};
