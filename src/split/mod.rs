//! Budget splits: the shares of a group that payables and receivables are assigned to.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;

pub use create::{create_split_endpoint, get_new_split_page};
pub use db::{
    create_split, create_split_table, delete_split, get_all_splits, get_split, update_split,
};
pub use delete::delete_split_endpoint;
pub use domain::{BudgetSplit, SplitFields, SplitFormData, SplitId};
pub use edit::{get_edit_split_page, update_split_endpoint};
