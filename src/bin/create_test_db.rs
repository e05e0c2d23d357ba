use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use payledger::{
    Amount, BudgetName, Email, EntryFields, EntryKind, EntryName, GroupFields, PasswordHash,
    SplitFields, ValidatedPassword, create_entry, create_group, create_split, create_user,
    initialize_db,
};

/// A utility for creating a demo database for the payledger server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// (group name, group budget, [(split name, split budget)])
const BUDGET: [(&str, &str, [(&str, &str); 2]); 3] = [
    ("Living", "2500", [("Rent", "1800"), ("Groceries", "600")]),
    ("Transport", "300", [("Fuel", "200"), ("Parking", "60")]),
    ("Fun", "400", [("Dining Out", "250"), ("Hobbies", "120")]),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = Connection::open(output_path)?;

    initialize_db(&connection)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(Email::new("test@test.com")?, password_hash, &connection)?;

    println!("Creating budget...");

    let mut split_ids = Vec::new();
    for (group_name, group_amount, splits) in BUDGET {
        let group = create_group(
            GroupFields {
                name: BudgetName::new(group_name)?,
                description: String::new(),
                amount: Amount::new(group_amount)?,
            },
            user.id,
            &connection,
        )?;

        for (split_name, split_amount) in splits {
            let split = create_split(
                SplitFields {
                    group_id: group.id,
                    name: BudgetName::new(split_name)?,
                    description: String::new(),
                    amount: Amount::new(split_amount)?,
                },
                user.id,
                &connection,
            )?;
            split_ids.push(split.id);
        }
    }

    println!("Creating payables and receivables...");

    let today = OffsetDateTime::now_utc().date();
    let entries = [
        (EntryKind::Receivable, "Salary", "4200", 20, None, "Employer"),
        (EntryKind::Payable, "Rent", "1800", 18, Some(split_ids[0]), "Landlord"),
        (EntryKind::Payable, "Supermarket", "143.27", 9, Some(split_ids[1]), "Countdown"),
        (EntryKind::Payable, "Petrol", "82.10", 6, Some(split_ids[2]), "Z Energy"),
        (EntryKind::Payable, "Dinner", "64.50", 3, Some(split_ids[4]), "Local Bistro"),
        (EntryKind::Receivable, "Refund", "19.99", 2, Some(split_ids[5]), "Hobby Shop"),
        (EntryKind::Payable, "Coffee", "5.50", 1, None, "Cafe"),
    ];

    for (kind, name, amount, days_ago, split_id, counterparty) in entries {
        create_entry(
            kind,
            EntryFields {
                name: EntryName::new(name)?,
                amount: Amount::new(amount)?,
                description: String::new(),
                counterparty: counterparty.to_owned(),
                date: today - Duration::days(days_ago),
                split_id,
                file_keys: Vec::new(),
            },
            user.id,
            &connection,
        )?;
    }

    println!("Success! Log in with test@test.com and the password \"test\".");

    Ok(())
}
