//! Database operations for budget groups.

use std::collections::HashMap;

use rusqlite::{Connection, Row, Transaction, TransactionBehavior};

use crate::{
    Error,
    auth::UserID,
    group::{BudgetGroup, BudgetName, GroupFields, GroupId, GroupWithSplits},
    split::get_all_splits,
};

/// Order value a group is parked on while two groups trade places.
const PARKED_ORDER: i64 = -1;

/// Create a group at the end of the user's list, i.e. with `order` equal to
/// the number of groups the user already has.
pub fn create_group(
    fields: GroupFields,
    user_id: UserID,
    connection: &Connection,
) -> Result<BudgetGroup, Error> {
    let order = count_groups(user_id, connection)?;

    connection.execute(
        "INSERT INTO budget_group (user_id, name, description, amount, sort_order)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            user_id.as_i64(),
            fields.name.as_ref(),
            &fields.description,
            fields.amount,
            order,
        ),
    )?;

    Ok(BudgetGroup {
        id: connection.last_insert_rowid(),
        name: fields.name,
        description: fields.description,
        amount: fields.amount,
        order,
    })
}

/// Retrieve a single group owned by `user_id`.
pub fn get_group(
    group_id: GroupId,
    user_id: UserID,
    connection: &Connection,
) -> Result<BudgetGroup, Error> {
    connection
        .prepare(
            "SELECT id, name, description, amount, sort_order FROM budget_group
            WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &group_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve the user's groups ordered by `order`.
pub fn get_groups(user_id: UserID, connection: &Connection) -> Result<Vec<BudgetGroup>, Error> {
    connection
        .prepare(
            "SELECT id, name, description, amount, sort_order FROM budget_group
            WHERE user_id = :user_id ORDER BY sort_order ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_group| maybe_group.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the user's groups ordered by `order`, each with its splits.
pub fn get_groups_with_splits(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<GroupWithSplits>, Error> {
    let groups = get_groups(user_id, connection)?;

    let mut splits_by_group = HashMap::new();
    for split in get_all_splits(user_id, connection)? {
        splits_by_group
            .entry(split.group_id)
            .or_insert_with(Vec::new)
            .push(split);
    }

    Ok(groups
        .into_iter()
        .map(|group| GroupWithSplits {
            splits: splits_by_group.remove(&group.id).unwrap_or_default(),
            group,
        })
        .collect())
}

/// Count the groups owned by `user_id`.
fn count_groups(user_id: UserID, connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM budget_group WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Update a group's name, description and amount. The order is not touched.
pub fn update_group(
    group_id: GroupId,
    fields: GroupFields,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE budget_group SET name = ?1, description = ?2, amount = ?3
        WHERE id = ?4 AND user_id = ?5",
        (
            fields.name.as_ref(),
            &fields.description,
            fields.amount,
            group_id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingGroup);
    }

    Ok(())
}

/// Delete a group and its splits.
///
/// Payables and receivables assigned to the deleted splits become unassigned
/// and the remaining groups are renumbered so their orders stay dense.
pub fn delete_group(
    group_id: GroupId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    for table in ["payable", "receivable"] {
        transaction.execute(
            &format!(
                "UPDATE {table} SET split_id = NULL WHERE user_id = ?1 AND split_id IN
                (SELECT id FROM budget_split WHERE group_id = ?2 AND user_id = ?1)"
            ),
            (user_id.as_i64(), group_id),
        )?;
    }

    transaction.execute(
        "DELETE FROM budget_split WHERE group_id = ?1 AND user_id = ?2",
        (group_id, user_id.as_i64()),
    )?;

    let rows_affected = transaction.execute(
        "DELETE FROM budget_group WHERE id = ?1 AND user_id = ?2",
        (group_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        // Dropping the transaction rolls back the statements above.
        return Err(Error::DeleteMissingGroup);
    }

    renumber_groups(user_id, &transaction)?;
    transaction.commit()?;

    Ok(())
}

/// Close any gaps in the user's group orders while keeping their relative order.
fn renumber_groups(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let group_ids: Vec<GroupId> = connection
        .prepare("SELECT id FROM budget_group WHERE user_id = ?1 ORDER BY sort_order ASC")?
        .query_map([user_id.as_i64()], |row| row.get(0))?
        .collect::<Result<_, _>>()?;

    // Orders only ever decrease here, so walking in ascending order never
    // lands on a slot that is still taken.
    let mut statement = connection.prepare("UPDATE budget_group SET sort_order = ?1 WHERE id = ?2")?;
    for (order, group_id) in group_ids.into_iter().enumerate() {
        statement.execute((order as i64, group_id))?;
    }

    Ok(())
}

/// Move a group one place towards `requested_order` by trading orders with
/// its neighbour on that side.
///
/// Returns the group as it is after the move. Requesting the group's current
/// order, or moving the first group left or the last group right, leaves
/// everything as is.
///
/// # Errors
///
/// Returns an:
/// - [Error::InvalidGroupOrder] if `requested_order` is below -1 or above the number of groups,
/// - [Error::NotFound] if the user has no groups or `group_id` is not one of them.
pub fn swap_group_order(
    group_id: GroupId,
    requested_order: i64,
    user_id: UserID,
    connection: &Connection,
) -> Result<BudgetGroup, Error> {
    if requested_order < -1 {
        return Err(Error::InvalidGroupOrder(requested_order));
    }

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;
    let groups = get_groups(user_id, &transaction)?;

    if groups.is_empty() {
        return Err(Error::NotFound);
    }

    if requested_order > groups.len() as i64 {
        return Err(Error::InvalidGroupOrder(requested_order));
    }

    let index = groups
        .iter()
        .position(|group| group.id == group_id)
        .ok_or(Error::NotFound)?;
    let group = &groups[index];

    if requested_order == group.order {
        return Ok(group.clone());
    }

    let neighbour = if requested_order < group.order {
        index.checked_sub(1).and_then(|i| groups.get(i))
    } else {
        groups.get(index + 1)
    };

    let Some(neighbour) = neighbour else {
        return Ok(group.clone());
    };

    let mut statement = transaction
        .prepare("UPDATE budget_group SET sort_order = ?1 WHERE id = ?2 AND user_id = ?3")?;
    statement.execute((PARKED_ORDER, group.id, user_id.as_i64()))?;
    statement.execute((group.order, neighbour.id, user_id.as_i64()))?;
    statement.execute((neighbour.order, group.id, user_id.as_i64()))?;
    drop(statement);

    transaction.commit()?;

    Ok(BudgetGroup {
        order: neighbour.order,
        ..group.clone()
    })
}

/// Initialize the budget group table.
pub fn create_group_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget_group (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            amount TEXT NOT NULL,
            sort_order INTEGER NOT NULL,
            UNIQUE(user_id, sort_order),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<BudgetGroup, rusqlite::Error> {
    let raw_name: String = row.get(1)?;

    Ok(BudgetGroup {
        id: row.get(0)?,
        name: BudgetName::new_unchecked(&raw_name),
        description: row.get(2)?,
        amount: row.get(3)?,
        order: row.get(4)?,
    })
}

#[cfg(test)]
mod group_query_tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;

    use crate::{
        Error,
        auth::UserID,
        db::initialize,
        group::{
            BudgetName, GroupFields, create_group, delete_group, get_group, get_groups,
            get_groups_with_splits, update_group,
        },
        ledger::{EntryKind, create_entry, get_entry},
        money::Amount,
        split::create_split,
        test_utils::{insert_test_user, test_entry_fields, test_split_fields},
    };

    fn get_test_connection() -> (Connection, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user_id = insert_test_user(&connection, "test@test.com");

        (connection, user_id)
    }

    fn fields(name: &str) -> GroupFields {
        GroupFields {
            name: BudgetName::new_unchecked(name),
            description: String::new(),
            amount: Amount::new_unchecked(Decimal::new(500, 0)),
        }
    }

    #[test]
    fn create_group_appends_to_end() {
        let (connection, user_id) = get_test_connection();

        let first = create_group(fields("First"), user_id, &connection).unwrap();
        let second = create_group(fields("Second"), user_id, &connection).unwrap();

        assert_eq!(first.order, 0);
        assert_eq!(second.order, 1);
        assert_eq!(get_group(second.id, user_id, &connection), Ok(second));
    }

    #[test]
    fn orders_are_per_user() {
        let (connection, user_id) = get_test_connection();
        let other_user = insert_test_user(&connection, "other@test.com");
        create_group(fields("Mine"), user_id, &connection).unwrap();

        let theirs = create_group(fields("Theirs"), other_user, &connection).unwrap();

        assert_eq!(theirs.order, 0);
    }

    #[test]
    fn get_group_of_other_user_is_not_found() {
        let (connection, user_id) = get_test_connection();
        let other_user = insert_test_user(&connection, "other@test.com");
        let group = create_group(fields("Mine"), user_id, &connection).unwrap();

        assert_eq!(get_group(group.id, other_user, &connection), Err(Error::NotFound));
    }

    #[test]
    fn get_groups_is_sorted_by_order() {
        let (connection, user_id) = get_test_connection();
        for name in ["A", "B", "C"] {
            create_group(fields(name), user_id, &connection).unwrap();
        }

        let orders: Vec<i64> = get_groups(user_id, &connection)
            .unwrap()
            .iter()
            .map(|group| group.order)
            .collect();

        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn get_groups_with_splits_nests_splits() {
        let (connection, user_id) = get_test_connection();
        let living = create_group(fields("Living"), user_id, &connection).unwrap();
        let fun = create_group(fields("Fun"), user_id, &connection).unwrap();
        let rent = create_split(test_split_fields(living.id, "Rent"), user_id, &connection)
            .unwrap();

        let groups = get_groups_with_splits(user_id, &connection).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group, living);
        assert_eq!(groups[0].splits, vec![rent]);
        assert_eq!(groups[1].group, fun);
        assert!(groups[1].splits.is_empty());
    }

    #[test]
    fn update_group_keeps_order() {
        let (connection, user_id) = get_test_connection();
        create_group(fields("A"), user_id, &connection).unwrap();
        let group = create_group(fields("B"), user_id, &connection).unwrap();

        update_group(group.id, fields("Renamed"), user_id, &connection).unwrap();

        let updated = get_group(group.id, user_id, &connection).unwrap();
        assert_eq!(updated.name, BudgetName::new_unchecked("Renamed"));
        assert_eq!(updated.order, 1);
    }

    #[test]
    fn update_group_of_other_user_fails() {
        let (connection, user_id) = get_test_connection();
        let other_user = insert_test_user(&connection, "other@test.com");
        let group = create_group(fields("A"), user_id, &connection).unwrap();

        let result = update_group(group.id, fields("Hijacked"), other_user, &connection);

        assert_eq!(result, Err(Error::UpdateMissingGroup));
    }

    #[test]
    fn delete_group_renumbers_remaining_groups() {
        let (connection, user_id) = get_test_connection();
        let a = create_group(fields("A"), user_id, &connection).unwrap();
        let b = create_group(fields("B"), user_id, &connection).unwrap();
        let c = create_group(fields("C"), user_id, &connection).unwrap();

        delete_group(b.id, user_id, &connection).unwrap();

        let groups = get_groups(user_id, &connection).unwrap();
        assert_eq!(
            groups.iter().map(|g| (g.id, g.order)).collect::<Vec<_>>(),
            vec![(a.id, 0), (c.id, 1)]
        );
    }

    #[test]
    fn delete_group_unassigns_entries_of_its_splits() {
        let (connection, user_id) = get_test_connection();
        let group = create_group(fields("Living"), user_id, &connection).unwrap();
        let split =
            create_split(test_split_fields(group.id, "Rent"), user_id, &connection).unwrap();
        let entry = create_entry(
            EntryKind::Payable,
            test_entry_fields("Landlord", Some(split.id)),
            user_id,
            &connection,
        )
        .unwrap();

        delete_group(group.id, user_id, &connection).unwrap();

        let entry = get_entry(EntryKind::Payable, entry.id, user_id, &connection).unwrap();
        assert_eq!(entry.split_id, None);
        assert!(get_groups_with_splits(user_id, &connection).unwrap().is_empty());
    }

    #[test]
    fn delete_missing_group_fails() {
        let (connection, user_id) = get_test_connection();

        assert_eq!(
            delete_group(42, user_id, &connection),
            Err(Error::DeleteMissingGroup)
        );
    }
}
