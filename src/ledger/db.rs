//! Database operations for payables and receivables.
//!
//! Both kinds share one schema apart from the name of the counterparty column,
//! so every query is built from the [EntryKind].

use rusqlite::{Connection, Row, Transaction, TransactionBehavior};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    ledger::{EntryFields, EntryId, EntryKind, EntryName, LedgerEntry},
    split::SplitId,
    upload::set_payable_attachments,
};

/// Record a new payable or receivable.
///
/// For payables, uploads named in `fields.file_keys` that belong to the user
/// are attached; other keys are ignored.
///
/// # Errors
///
/// Returns an [Error::InvalidSplit] if `fields.split_id` is not one of the user's splits.
pub fn create_entry(
    kind: EntryKind,
    fields: EntryFields,
    user_id: UserID,
    connection: &Connection,
) -> Result<LedgerEntry, Error> {
    ensure_split_is_owned(fields.split_id, user_id, connection)?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;
    let now = OffsetDateTime::now_utc();

    let entry = transaction
        .prepare(&format!(
            "INSERT INTO {table} (user_id, name, amount, description, {counterparty}, date, split_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            RETURNING {columns}",
            table = kind.table(),
            counterparty = kind.counterparty_column(),
            columns = select_columns(kind),
        ))?
        .query_row(
            (
                user_id.as_i64(),
                fields.name.as_ref(),
                fields.amount,
                &fields.description,
                &fields.counterparty,
                fields.date,
                fields.split_id,
                now,
            ),
            |row| map_row(kind, row),
        )?;

    if kind == EntryKind::Payable {
        set_payable_attachments(entry.id, &fields.file_keys, user_id, &transaction)?;
    }

    transaction.commit()?;

    Ok(entry)
}

/// Retrieve a single payable or receivable owned by `user_id`.
pub fn get_entry(
    kind: EntryKind,
    entry_id: EntryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<LedgerEntry, Error> {
    connection
        .prepare(&format!(
            "SELECT {columns} FROM {table} WHERE id = :id AND user_id = :user_id",
            columns = select_columns(kind),
            table = kind.table(),
        ))?
        .query_row(
            &[(":id", &entry_id), (":user_id", &user_id.as_i64())],
            |row| map_row(kind, row),
        )
        .map_err(|error| error.into())
}

/// Retrieve all of the user's entries of one kind, most recently updated first.
pub fn get_entries(
    kind: EntryKind,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<LedgerEntry>, Error> {
    connection
        .prepare(&format!(
            "SELECT {columns} FROM {table} WHERE user_id = :user_id
            ORDER BY updated_at DESC, id DESC",
            columns = select_columns(kind),
            table = kind.table(),
        ))?
        .query_map(&[(":user_id", &user_id.as_i64())], |row| map_row(kind, row))?
        .map(|maybe_entry| maybe_entry.map_err(|error| error.into()))
        .collect()
}

/// Update a payable or receivable and bump its `updated_at` time.
///
/// For payables, the attachments are replaced with the uploads named in
/// `fields.file_keys`.
///
/// # Errors
///
/// Returns an:
/// - [Error::InvalidSplit] if `fields.split_id` is not one of the user's splits,
/// - [Error::UpdateMissingEntry] if the entry does not exist or belongs to someone else.
pub fn update_entry(
    kind: EntryKind,
    entry_id: EntryId,
    fields: EntryFields,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    ensure_split_is_owned(fields.split_id, user_id, connection)?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let rows_affected = transaction.execute(
        &format!(
            "UPDATE {table}
            SET name = ?1, amount = ?2, description = ?3, {counterparty} = ?4, date = ?5,
                split_id = ?6, updated_at = ?7
            WHERE id = ?8 AND user_id = ?9",
            table = kind.table(),
            counterparty = kind.counterparty_column(),
        ),
        (
            fields.name.as_ref(),
            fields.amount,
            &fields.description,
            &fields.counterparty,
            fields.date,
            fields.split_id,
            OffsetDateTime::now_utc(),
            entry_id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingEntry(kind));
    }

    if kind == EntryKind::Payable {
        set_payable_attachments(entry_id, &fields.file_keys, user_id, &transaction)?;
    }

    transaction.commit()?;

    Ok(())
}

/// Delete a payable or receivable. A payable's attachment links go with it,
/// the uploaded files themselves are kept.
pub fn delete_entry(
    kind: EntryKind,
    entry_id: EntryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        &format!(
            "DELETE FROM {table} WHERE id = ?1 AND user_id = ?2",
            table = kind.table()
        ),
        (entry_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingEntry(kind));
    }

    Ok(())
}

fn ensure_split_is_owned(
    split_id: Option<SplitId>,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(split_id) = split_id else {
        return Ok(());
    };

    let is_owned: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM budget_split WHERE id = ?1 AND user_id = ?2)",
        (split_id, user_id.as_i64()),
        |row| row.get(0),
    )?;

    if is_owned {
        Ok(())
    } else {
        Err(Error::InvalidSplit)
    }
}

/// Initialize the payable and receivable tables.
pub fn create_ledger_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    for kind in [EntryKind::Payable, EntryKind::Receivable] {
        connection.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                amount TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                {counterparty} TEXT NOT NULL DEFAULT '',
                date TEXT NOT NULL,
                split_id INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(split_id) REFERENCES budget_split(id) ON UPDATE CASCADE ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_{table}_user_date ON {table}(user_id, date);
            CREATE INDEX IF NOT EXISTS idx_{table}_split ON {table}(split_id);",
            table = kind.table(),
            counterparty = kind.counterparty_column(),
        ))?;
    }

    Ok(())
}

fn select_columns(kind: EntryKind) -> String {
    format!(
        "id, name, amount, description, {}, date, split_id, created_at, updated_at",
        kind.counterparty_column()
    )
}

fn map_row(kind: EntryKind, row: &Row) -> Result<LedgerEntry, rusqlite::Error> {
    let raw_name: String = row.get(1)?;

    Ok(LedgerEntry {
        id: row.get(0)?,
        kind,
        name: EntryName::new_unchecked(&raw_name),
        amount: row.get(2)?,
        description: row.get(3)?,
        counterparty: row.get(4)?,
        date: row.get(5)?,
        split_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[cfg(test)]
mod ledger_query_tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        Error,
        auth::UserID,
        db::initialize,
        group::create_group,
        ledger::{
            EntryKind, EntryName, create_entry, delete_entry, get_entries, get_entry,
            update_entry,
        },
        money::Amount,
        split::create_split,
        test_utils::{insert_test_user, test_entry_fields, test_group_fields, test_split_fields},
    };

    fn get_test_connection() -> (Connection, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user_id = insert_test_user(&connection, "test@test.com");

        (connection, user_id)
    }

    #[test]
    fn create_and_get_each_kind() {
        let (connection, user_id) = get_test_connection();

        for kind in [EntryKind::Payable, EntryKind::Receivable] {
            let entry =
                create_entry(kind, test_entry_fields("Groceries", None), user_id, &connection)
                    .unwrap();

            assert_eq!(entry.kind, kind);
            assert_eq!(entry.name, EntryName::new_unchecked("Groceries"));
            assert_eq!(entry.created_at, entry.updated_at);
            assert_eq!(get_entry(kind, entry.id, user_id, &connection), Ok(entry));
        }
    }

    #[test]
    fn payables_and_receivables_are_separate() {
        let (connection, user_id) = get_test_connection();
        let payable = create_entry(
            EntryKind::Payable,
            test_entry_fields("Groceries", None),
            user_id,
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_entries(EntryKind::Receivable, user_id, &connection),
            Ok(Vec::new())
        );
        assert_eq!(
            get_entries(EntryKind::Payable, user_id, &connection),
            Ok(vec![payable])
        );
    }

    #[test]
    fn create_with_other_users_split_fails() {
        let (connection, user_id) = get_test_connection();
        let other_user = insert_test_user(&connection, "other@test.com");
        let group = create_group(test_group_fields("Theirs"), other_user, &connection).unwrap();
        let split =
            create_split(test_split_fields(group.id, "Rent"), other_user, &connection).unwrap();

        let result = create_entry(
            EntryKind::Payable,
            test_entry_fields("Sneaky", Some(split.id)),
            user_id,
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidSplit));
    }

    #[test]
    fn get_entry_of_other_user_is_not_found() {
        let (connection, user_id) = get_test_connection();
        let other_user = insert_test_user(&connection, "other@test.com");
        let entry = create_entry(
            EntryKind::Receivable,
            test_entry_fields("Salary", None),
            user_id,
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_entry(EntryKind::Receivable, entry.id, other_user, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_entries_is_most_recently_updated_first() {
        let (connection, user_id) = get_test_connection();
        let first = create_entry(
            EntryKind::Payable,
            test_entry_fields("First", None),
            user_id,
            &connection,
        )
        .unwrap();
        let second = create_entry(
            EntryKind::Payable,
            test_entry_fields("Second", None),
            user_id,
            &connection,
        )
        .unwrap();

        let ids: Vec<_> = get_entries(EntryKind::Payable, user_id, &connection)
            .unwrap()
            .iter()
            .map(|entry| entry.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);

        update_entry(
            EntryKind::Payable,
            first.id,
            test_entry_fields("First again", None),
            user_id,
            &connection,
        )
        .unwrap();

        let ids: Vec<_> = get_entries(EntryKind::Payable, user_id, &connection)
            .unwrap()
            .iter()
            .map(|entry| entry.id)
            .collect();
        assert_eq!(ids[0], first.id);
    }

    #[test]
    fn update_entry_changes_fields() {
        let (connection, user_id) = get_test_connection();
        let entry = create_entry(
            EntryKind::Payable,
            test_entry_fields("Groceries", None),
            user_id,
            &connection,
        )
        .unwrap();
        let mut fields = test_entry_fields("Weekly shop", None);
        fields.amount = Amount::new_unchecked(Decimal::new(8999, 2));
        fields.counterparty = "Supermarket".to_owned();
        fields.date = date!(2025 - 01 - 31);

        update_entry(EntryKind::Payable, entry.id, fields, user_id, &connection).unwrap();

        let updated = get_entry(EntryKind::Payable, entry.id, user_id, &connection).unwrap();
        assert_eq!(updated.name, EntryName::new_unchecked("Weekly shop"));
        assert_eq!(updated.amount.as_decimal(), Decimal::new(8999, 2));
        assert_eq!(updated.counterparty, "Supermarket");
        assert_eq!(updated.date, date!(2025 - 01 - 31));
        assert!(updated.updated_at >= entry.updated_at);
    }

    #[test]
    fn update_entry_of_other_user_fails() {
        let (connection, user_id) = get_test_connection();
        let other_user = insert_test_user(&connection, "other@test.com");
        let entry = create_entry(
            EntryKind::Receivable,
            test_entry_fields("Salary", None),
            user_id,
            &connection,
        )
        .unwrap();

        let result = update_entry(
            EntryKind::Receivable,
            entry.id,
            test_entry_fields("Mine now", None),
            other_user,
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingEntry(EntryKind::Receivable)));
    }

    #[test]
    fn delete_entry_removes_it() {
        let (connection, user_id) = get_test_connection();
        let entry = create_entry(
            EntryKind::Payable,
            test_entry_fields("Groceries", None),
            user_id,
            &connection,
        )
        .unwrap();

        delete_entry(EntryKind::Payable, entry.id, user_id, &connection).unwrap();

        assert_eq!(
            get_entry(EntryKind::Payable, entry.id, user_id, &connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            delete_entry(EntryKind::Payable, entry.id, user_id, &connection),
            Err(Error::DeleteMissingEntry(EntryKind::Payable))
        );
    }
}
