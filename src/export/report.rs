//! Collecting the rows of an expense report and writing them as CSV.

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    auth::UserID,
    ledger::{EntryId, EntryKind},
    money::{Amount, format_currency, format_debit},
    split::SplitId,
};

/// The header row of every export.
pub const REPORT_COLUMNS: [&str; 5] = ["Title", "Amount", "Date", "Category", "Notes"];

/// A payable or receivable in one of the exported splits.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub id: EntryId,
    pub kind: EntryKind,
    pub name: String,
    pub amount: Amount,
    pub date: Date,
    pub split_name: String,
    pub description: String,
    pub created_at: OffsetDateTime,
}

#[derive(Serialize)]
struct ReportRow<'a> {
    title: &'a str,
    amount: String,
    date: String,
    category: &'a str,
    notes: &'a str,
}

impl<'a> From<&'a ReportEntry> for ReportRow<'a> {
    fn from(entry: &'a ReportEntry) -> Self {
        let amount = match entry.kind {
            EntryKind::Payable => format_debit(entry.amount.as_decimal()),
            EntryKind::Receivable => format_currency(entry.amount.as_decimal()),
        };

        Self {
            title: &entry.name,
            amount,
            date: entry.date.to_string(),
            category: &entry.split_name,
            notes: &entry.description,
        }
    }
}

/// Get the payables and receivables assigned to any of `split_ids`, oldest first.
///
/// Split IDs that do not belong to `user_id` are ignored.
pub fn get_report_entries(
    split_ids: &[SplitId],
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<ReportEntry>, Error> {
    if split_ids.is_empty() {
        return Err(Error::NoSplitsSelected);
    }

    let mut entries = get_report_entries_of_kind(EntryKind::Payable, split_ids, user_id, connection)?;
    entries.extend(get_report_entries_of_kind(
        EntryKind::Receivable,
        split_ids,
        user_id,
        connection,
    )?);
    entries.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });

    Ok(entries)
}

fn get_report_entries_of_kind(
    kind: EntryKind,
    split_ids: &[SplitId],
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<ReportEntry>, Error> {
    let placeholders = (2..split_ids.len() + 2)
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let query = format!(
        "SELECT e.id, e.name, e.amount, e.date, s.name, e.description, e.created_at
        FROM {table} e
        INNER JOIN budget_split s ON s.id = e.split_id AND s.user_id = e.user_id
        WHERE e.user_id = ?1 AND e.split_id IN ({placeholders})",
        table = kind.table()
    );

    let params = std::iter::once(Value::Integer(user_id.as_i64()))
        .chain(split_ids.iter().map(|split_id| Value::Integer(*split_id)));

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), |row| {
            Ok(ReportEntry {
                id: row.get(0)?,
                kind,
                name: row.get(1)?,
                amount: row.get(2)?,
                date: row.get(3)?,
                split_name: row.get(4)?,
                description: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?
        .map(|maybe_entry| maybe_entry.map_err(|error| error.into()))
        .collect()
}

/// Write `entries` as CSV with the [REPORT_COLUMNS] header.
pub fn write_report_csv(entries: &[ReportEntry]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);

    writer
        .write_record(REPORT_COLUMNS)
        .map_err(|error| Error::ExportError(error.to_string()))?;

    for entry in entries {
        writer
            .serialize(ReportRow::from(entry))
            .map_err(|error| Error::ExportError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::ExportError(error.to_string()))
}

#[cfg(test)]
mod report_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        auth::UserID,
        db::initialize,
        group::create_group,
        ledger::{EntryKind, create_entry},
        money::Amount,
        split::{BudgetSplit, create_split},
        test_utils::{insert_test_user, test_entry_fields, test_group_fields, test_split_fields},
    };

    use super::{get_report_entries, write_report_csv};

    fn get_test_connection() -> (Connection, UserID, BudgetSplit, BudgetSplit) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user_id = insert_test_user(&connection, "test@test.com");
        let group = create_group(test_group_fields("Living"), user_id, &connection).unwrap();
        let food = create_split(test_split_fields(group.id, "Food"), user_id, &connection).unwrap();
        let rent = create_split(test_split_fields(group.id, "Rent"), user_id, &connection).unwrap();

        (connection, user_id, food, rent)
    }

    #[test]
    fn empty_selection_is_an_error() {
        let (connection, user_id, _, _) = get_test_connection();

        assert_eq!(
            get_report_entries(&[], user_id, &connection),
            Err(Error::NoSplitsSelected)
        );
    }

    #[test]
    fn collects_selected_splits_oldest_first() {
        let (connection, user_id, food, rent) = get_test_connection();
        let mut fields = test_entry_fields("Groceries", Some(food.id));
        fields.date = date!(2025 - 02 - 01);
        create_entry(EntryKind::Payable, fields, user_id, &connection).unwrap();
        let mut fields = test_entry_fields("Refund", Some(food.id));
        fields.date = date!(2025 - 01 - 20);
        create_entry(EntryKind::Receivable, fields, user_id, &connection).unwrap();
        create_entry(
            EntryKind::Payable,
            test_entry_fields("Landlord", Some(rent.id)),
            user_id,
            &connection,
        )
        .unwrap();
        create_entry(
            EntryKind::Payable,
            test_entry_fields("Unassigned", None),
            user_id,
            &connection,
        )
        .unwrap();

        let names: Vec<String> = get_report_entries(&[food.id], user_id, &connection)
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect();

        assert_eq!(names, vec!["Refund", "Groceries"]);
    }

    #[test]
    fn ignores_splits_of_other_users() {
        let (connection, user_id, food, _) = get_test_connection();
        create_entry(
            EntryKind::Payable,
            test_entry_fields("Groceries", Some(food.id)),
            user_id,
            &connection,
        )
        .unwrap();
        let other_user = insert_test_user(&connection, "other@test.com");

        let entries = get_report_entries(&[food.id], other_user, &connection).unwrap();

        assert!(entries.is_empty());
    }

    #[test]
    fn csv_uses_debit_form_for_payables() {
        let (connection, user_id, food, _) = get_test_connection();
        let mut fields = test_entry_fields("Groceries", Some(food.id));
        fields.amount = Amount::new("1234.5").unwrap();
        fields.description = "Weekly shop, with snacks".to_owned();
        create_entry(EntryKind::Payable, fields, user_id, &connection).unwrap();
        let mut fields = test_entry_fields("Refund", Some(food.id));
        fields.date = date!(2025 - 01 - 16);
        create_entry(EntryKind::Receivable, fields, user_id, &connection).unwrap();
        let entries = get_report_entries(&[food.id], user_id, &connection).unwrap();

        let csv = String::from_utf8(write_report_csv(&entries).unwrap()).unwrap();

        assert_eq!(
            csv,
            "Title,Amount,Date,Category,Notes\n\
            Groceries,\"($1,234.50)\",2025-01-15,Food,\"Weekly shop, with snacks\"\n\
            Refund,$10.00,2025-01-16,Food,\n"
        );
    }

    #[test]
    fn csv_writes_max_amount_in_full() {
        let (connection, user_id, food, _) = get_test_connection();
        let mut fields = test_entry_fields("Yacht", Some(food.id));
        fields.amount = Amount::new("999,999,999,999.99").unwrap();
        create_entry(EntryKind::Payable, fields, user_id, &connection).unwrap();
        let entries = get_report_entries(&[food.id], user_id, &connection).unwrap();

        let csv = String::from_utf8(write_report_csv(&entries).unwrap()).unwrap();

        assert_eq!(
            csv,
            "Title,Amount,Date,Category,Notes\n\
            Yacht,\"($999,999,999,999.99)\",2025-01-15,Food,\n"
        );
    }

    #[test]
    fn csv_for_no_entries_has_only_header() {
        let csv = String::from_utf8(write_report_csv(&[]).unwrap()).unwrap();

        assert_eq!(csv, "Title,Amount,Date,Category,Notes\n");
    }
}
