use rusqlite::Connection;
use rust_decimal::Decimal;
use time::macros::date;

use crate::{
    auth::{Email, PasswordHash, UserID, create_user},
    group::{BudgetName, GroupFields, GroupId},
    ledger::{EntryFields, EntryName},
    money::Amount,
    split::{SplitFields, SplitId},
};

/// Insert a user with a dummy password hash and return their ID.
#[track_caller]
pub(crate) fn insert_test_user(connection: &Connection, email: &str) -> UserID {
    create_user(
        Email::new(email).unwrap(),
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .unwrap()
    .id
}

/// Group fields with a budget of $500.
pub(crate) fn test_group_fields(name: &str) -> GroupFields {
    GroupFields {
        name: BudgetName::new_unchecked(name),
        description: String::new(),
        amount: Amount::new_unchecked(Decimal::new(500, 0)),
    }
}

/// Split fields with a budget of $100.
pub(crate) fn test_split_fields(group_id: GroupId, name: &str) -> SplitFields {
    SplitFields {
        group_id,
        name: BudgetName::new_unchecked(name),
        description: String::new(),
        amount: Amount::new_unchecked(Decimal::new(100, 0)),
    }
}

/// Entry fields for $10 dated 2025-01-15.
pub(crate) fn test_entry_fields(name: &str, split_id: Option<SplitId>) -> EntryFields {
    EntryFields {
        name: EntryName::new_unchecked(name),
        amount: Amount::new_unchecked(Decimal::new(10, 0)),
        description: String::new(),
        counterparty: String::new(),
        date: date!(2025 - 01 - 15),
        split_id,
        file_keys: Vec::new(),
    }
}
