//! Creates the application's database schema.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error, auth::create_user_table, group::create_group_table, ledger::create_ledger_tables,
    split::create_split_table, upload::create_upload_tables,
};

/// Enable foreign keys and create all tables that do not exist yet.
///
/// Tables are created in a single exclusive transaction so a partially
/// initialised database is never left behind.
///
/// # Errors
///
/// Returns an error if any of the SQL statements fail.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Must be set outside of a transaction to take effect.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_group_table(&transaction)?;
    create_split_table(&transaction)?;
    create_ledger_tables(&transaction)?;
    create_upload_tables(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn creates_all_tables() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        let mut tables: Vec<String> = connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        tables.sort();

        assert_eq!(
            tables,
            vec![
                "budget_group",
                "budget_split",
                "payable",
                "payable_attachment",
                "receivable",
                "uploaded_file",
                "user"
            ]
        );
    }

    #[test]
    fn can_initialize_twice() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        assert!(initialize(&connection).is_ok());
    }

    #[test]
    fn enables_foreign_keys() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        let enabled: bool = connection
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();
        assert!(enabled);
    }
}
