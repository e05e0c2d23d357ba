//! Payables and receivables: the money the user pays out and takes in.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;

pub use create::{
    create_payable_endpoint, create_receivable_endpoint, get_new_payable_page,
    get_new_receivable_page,
};
pub use db::{
    create_entry, create_ledger_tables, delete_entry, get_entries, get_entry, update_entry,
};
pub use delete::{delete_payable_endpoint, delete_receivable_endpoint};
pub use domain::{
    EntryFields, EntryFormData, EntryId, EntryKind, EntryName, LedgerEntry, MIN_ENTRY_NAME_LENGTH,
};
pub use edit::{
    get_edit_payable_page, get_edit_receivable_page, update_payable_endpoint,
    update_receivable_endpoint,
};
