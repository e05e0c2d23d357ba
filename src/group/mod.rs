//! Budget groups: the top-level budget categories and their ordering.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;
mod swap;

pub use create::{create_group_endpoint, get_new_group_page};
pub use db::{
    create_group, create_group_table, delete_group, get_group, get_groups,
    get_groups_with_splits, swap_group_order, update_group,
};
pub use delete::delete_group_endpoint;
pub use domain::{BudgetGroup, BudgetName, GroupFields, GroupFormData, GroupId, GroupWithSplits};
pub use edit::{get_edit_group_page, update_group_endpoint};
pub use list::get_budget_page;
pub use swap::swap_group_order_endpoint;
