//! Database operations for budget splits.

use rusqlite::{Connection, Row, Transaction, TransactionBehavior};

use crate::{
    Error,
    auth::UserID,
    group::{BudgetName, GroupId},
    split::{BudgetSplit, SplitFields, SplitId},
};

/// Create a split in one of the user's groups.
///
/// # Errors
///
/// Returns an [Error::InvalidGroup] if the group does not belong to `user_id`.
pub fn create_split(
    fields: SplitFields,
    user_id: UserID,
    connection: &Connection,
) -> Result<BudgetSplit, Error> {
    ensure_group_is_owned(fields.group_id, user_id, connection)?;

    connection.execute(
        "INSERT INTO budget_split (user_id, group_id, name, description, amount)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            user_id.as_i64(),
            fields.group_id,
            fields.name.as_ref(),
            &fields.description,
            fields.amount,
        ),
    )?;

    Ok(BudgetSplit {
        id: connection.last_insert_rowid(),
        group_id: fields.group_id,
        name: fields.name,
        description: fields.description,
        amount: fields.amount,
    })
}

/// Retrieve a single split owned by `user_id`.
pub fn get_split(
    split_id: SplitId,
    user_id: UserID,
    connection: &Connection,
) -> Result<BudgetSplit, Error> {
    connection
        .prepare(
            "SELECT id, group_id, name, description, amount FROM budget_split
            WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &split_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of the user's splits, ordered by their group's order and then by name.
pub fn get_all_splits(user_id: UserID, connection: &Connection) -> Result<Vec<BudgetSplit>, Error> {
    connection
        .prepare(
            "SELECT s.id, s.group_id, s.name, s.description, s.amount
            FROM budget_split s
            INNER JOIN budget_group g ON g.id = s.group_id
            WHERE s.user_id = :user_id
            ORDER BY g.sort_order ASC, s.name COLLATE NOCASE ASC, s.id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_split| maybe_split.map_err(|error| error.into()))
        .collect()
}

/// Update a split, possibly moving it to another of the user's groups.
///
/// # Errors
///
/// Returns an:
/// - [Error::InvalidGroup] if the target group does not belong to `user_id`,
/// - [Error::UpdateMissingSplit] if the split does not exist or belongs to someone else.
pub fn update_split(
    split_id: SplitId,
    fields: SplitFields,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    ensure_group_is_owned(fields.group_id, user_id, connection)?;

    let rows_affected = connection.execute(
        "UPDATE budget_split SET group_id = ?1, name = ?2, description = ?3, amount = ?4
        WHERE id = ?5 AND user_id = ?6",
        (
            fields.group_id,
            fields.name.as_ref(),
            &fields.description,
            fields.amount,
            split_id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingSplit);
    }

    Ok(())
}

/// Delete a split. Payables and receivables assigned to it become unassigned.
pub fn delete_split(
    split_id: SplitId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    for table in ["payable", "receivable"] {
        transaction.execute(
            &format!("UPDATE {table} SET split_id = NULL WHERE split_id = ?1 AND user_id = ?2"),
            (split_id, user_id.as_i64()),
        )?;
    }

    let rows_affected = transaction.execute(
        "DELETE FROM budget_split WHERE id = ?1 AND user_id = ?2",
        (split_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingSplit);
    }

    transaction.commit()?;

    Ok(())
}

fn ensure_group_is_owned(
    group_id: GroupId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let is_owned: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM budget_group WHERE id = ?1 AND user_id = ?2)",
        (group_id, user_id.as_i64()),
        |row| row.get(0),
    )?;

    if is_owned {
        Ok(())
    } else {
        Err(Error::InvalidGroup)
    }
}

/// Initialize the budget split table.
pub fn create_split_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget_split (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            group_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            amount TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(group_id) REFERENCES budget_group(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_budget_split_group ON budget_split(group_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<BudgetSplit, rusqlite::Error> {
    let raw_name: String = row.get(2)?;

    Ok(BudgetSplit {
        id: row.get(0)?,
        group_id: row.get(1)?,
        name: BudgetName::new_unchecked(&raw_name),
        description: row.get(3)?,
        amount: row.get(4)?,
    })
}
