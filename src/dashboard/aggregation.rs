//! Balance, spending and cashflow figures for the dashboard.
//!
//! Amounts are stored as TEXT, so sums are computed in Rust with exact
//! decimals rather than with SQLite's floating point `SUM`.

use std::{collections::HashMap, ops::RangeInclusive};

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use time::{Date, Duration};

use crate::{
    Error,
    auth::UserID,
    ledger::{EntryKind, LedgerEntry, get_entries},
    money::{Amount, add_amounts, subtract_amounts, sum_amounts},
    split::{SplitId, get_all_splits},
};

/// The name of the bucket for entries without a split.
pub const OTHER_BUCKET_NAME: &str = "Other";

/// How a split fared over a month.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitTotal {
    /// `None` for the "Other" bucket.
    pub split_id: Option<SplitId>,
    pub name: String,
    pub budgeted: Decimal,
    /// The sum of payables assigned to the split.
    pub spent: Decimal,
    /// The sum of receivables assigned to the split.
    pub received: Decimal,
    /// `budgeted + received - spent`.
    pub remaining: Decimal,
}

/// The user's net position: all receivables minus all payables.
pub fn get_balance(user_id: UserID, connection: &Connection) -> Result<Decimal, Error> {
    let received = sum_amounts(
        get_amounts(EntryKind::Receivable, user_id, None, connection)?
            .into_iter()
            .map(|(_, amount)| amount),
    )?;
    let paid = sum_amounts(
        get_amounts(EntryKind::Payable, user_id, None, connection)?
            .into_iter()
            .map(|(_, amount)| amount),
    )?;

    subtract_amounts(received, paid)
}

/// Payables and receivables merged into one list, most recently updated first.
pub fn get_activity(user_id: UserID, connection: &Connection) -> Result<Vec<LedgerEntry>, Error> {
    let mut activity = get_entries(EntryKind::Payable, user_id, connection)?;
    activity.extend(get_entries(EntryKind::Receivable, user_id, connection)?);
    activity.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

    Ok(activity)
}

/// The budgeted, spent and remaining amounts of every split for the month
/// containing `month`, in budget order, followed by the "Other" bucket.
pub fn get_split_totals(
    user_id: UserID,
    month: Date,
    connection: &Connection,
) -> Result<Vec<SplitTotal>, Error> {
    let range = month_range(month);
    let spent = totals_by_split(get_amounts(
        EntryKind::Payable,
        user_id,
        Some(&range),
        connection,
    )?)?;
    let received = totals_by_split(get_amounts(
        EntryKind::Receivable,
        user_id,
        Some(&range),
        connection,
    )?)?;

    let split_total = |split_id: Option<SplitId>,
                       name: String,
                       budgeted: Decimal|
     -> Result<SplitTotal, Error> {
        let spent = spent.get(&split_id).copied().unwrap_or_default();
        let received = received.get(&split_id).copied().unwrap_or_default();
        let remaining = subtract_amounts(add_amounts(budgeted, received)?, spent)?;

        Ok(SplitTotal {
            split_id,
            name,
            budgeted,
            spent,
            received,
            remaining,
        })
    };

    let mut totals = get_all_splits(user_id, connection)?
        .into_iter()
        .map(|split| split_total(Some(split.id), split.name.to_string(), split.amount.as_decimal()))
        .collect::<Result<Vec<SplitTotal>, Error>>()?;
    totals.push(split_total(None, OTHER_BUCKET_NAME.to_owned(), Decimal::ZERO)?);

    Ok(totals)
}

/// The sum of payables dated in the month containing `month`.
pub fn get_total_spent(
    user_id: UserID,
    month: Date,
    connection: &Connection,
) -> Result<Decimal, Error> {
    let range = month_range(month);

    sum_amounts(
        get_amounts(EntryKind::Payable, user_id, Some(&range), connection)?
            .into_iter()
            .map(|(_, amount)| amount),
    )
}

/// Receivables minus payables dated in the Sunday to Saturday week containing `today`.
pub fn get_week_cashflow(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Decimal, Error> {
    let range = week_range(today);
    let sum = |kind| -> Result<Decimal, Error> {
        sum_amounts(
            get_amounts(kind, user_id, Some(&range), connection)?
                .into_iter()
                .map(|(_, amount)| amount),
        )
    };

    subtract_amounts(sum(EntryKind::Receivable)?, sum(EntryKind::Payable)?)
}

/// The first to last day of the month containing `date`.
pub fn month_range(date: Date) -> RangeInclusive<Date> {
    let first = date.replace_day(1).unwrap_or(date);
    let last = first.replace_day(date.month().length(date.year())).unwrap_or(date);

    first..=last
}

/// The Sunday to Saturday week containing `date`.
pub fn week_range(date: Date) -> RangeInclusive<Date> {
    let sunday = date - Duration::days(date.weekday().number_days_from_sunday() as i64);

    sunday..=sunday + Duration::days(6)
}

fn totals_by_split(
    amounts: Vec<(Option<SplitId>, Decimal)>,
) -> Result<HashMap<Option<SplitId>, Decimal>, Error> {
    let mut totals = HashMap::new();
    for (split_id, amount) in amounts {
        let total = totals.entry(split_id).or_insert(Decimal::ZERO);
        *total = add_amounts(*total, amount)?;
    }

    Ok(totals)
}

/// The split and amount of each of the user's entries of `kind`, optionally
/// limited to those dated in `range`.
fn get_amounts(
    kind: EntryKind,
    user_id: UserID,
    range: Option<&RangeInclusive<Date>>,
    connection: &Connection,
) -> Result<Vec<(Option<SplitId>, Decimal)>, Error> {
    let rows = match range {
        Some(range) => connection
            .prepare(&format!(
                "SELECT split_id, amount FROM {} WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3",
                kind.table()
            ))?
            .query_map((user_id.as_i64(), range.start(), range.end()), map_row)?
            .collect::<Result<Vec<_>, _>>()?,
        None => connection
            .prepare(&format!(
                "SELECT split_id, amount FROM {} WHERE user_id = ?1",
                kind.table()
            ))?
            .query_map([user_id.as_i64()], map_row)?
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(rows)
}

fn map_row(row: &Row) -> Result<(Option<SplitId>, Decimal), rusqlite::Error> {
    let amount: Amount = row.get(1)?;

    Ok((row.get(0)?, amount.as_decimal()))
}
