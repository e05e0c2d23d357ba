//! Core payable and receivable domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, endpoints, money::Amount, split::SplitId};

/// Database identifier for a payable or receivable.
pub type EntryId = i64;

/// The minimum number of graphemes in the name of a payable or receivable.
pub const MIN_ENTRY_NAME_LENGTH: usize = 3;

/// Whether money left the user's hands or came into them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Money paid out.
    Payable,
    /// Money received.
    Receivable,
}

impl EntryKind {
    pub(crate) fn table(&self) -> &'static str {
        match self {
            EntryKind::Payable => "payable",
            EntryKind::Receivable => "receivable",
        }
    }

    pub(crate) fn counterparty_column(&self) -> &'static str {
        match self {
            EntryKind::Payable => "paid_to",
            EntryKind::Receivable => "received_from",
        }
    }

    /// The form label for the other party of the entry.
    pub fn counterparty_label(&self) -> &'static str {
        match self {
            EntryKind::Payable => "Paid to",
            EntryKind::Receivable => "Received from",
        }
    }

    /// The capitalised name for headings, e.g. "Payable".
    pub fn title(&self) -> &'static str {
        match self {
            EntryKind::Payable => "Payable",
            EntryKind::Receivable => "Receivable",
        }
    }

    /// The page for recording a new entry of this kind.
    pub fn new_view(&self) -> &'static str {
        match self {
            EntryKind::Payable => endpoints::NEW_PAYABLE_VIEW,
            EntryKind::Receivable => endpoints::NEW_RECEIVABLE_VIEW,
        }
    }

    /// The page for editing an entry of this kind, with an `{id}` style parameter.
    pub fn edit_view(&self) -> &'static str {
        match self {
            EntryKind::Payable => endpoints::EDIT_PAYABLE_VIEW,
            EntryKind::Receivable => endpoints::EDIT_RECEIVABLE_VIEW,
        }
    }

    /// The route for creating entries of this kind.
    pub fn collection_api(&self) -> &'static str {
        match self {
            EntryKind::Payable => endpoints::PAYABLES_API,
            EntryKind::Receivable => endpoints::RECEIVABLES_API,
        }
    }

    /// The route for updating or deleting an entry of this kind, with an `{id}` style parameter.
    pub fn item_api(&self) -> &'static str {
        match self {
            EntryKind::Payable => endpoints::PAYABLE_API,
            EntryKind::Receivable => endpoints::RECEIVABLE_API,
        }
    }
}

impl Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.table())
    }
}

/// The name of a payable or receivable, at least [MIN_ENTRY_NAME_LENGTH] graphemes long.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryName(String);

impl EntryName {
    /// Create an entry name from user input.
    ///
    /// # Errors
    ///
    /// Returns [Error::NameTooShort] if the trimmed name has fewer than
    /// [MIN_ENTRY_NAME_LENGTH] graphemes.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.graphemes(true).count() < MIN_ENTRY_NAME_LENGTH {
            Err(Error::NameTooShort(MIN_ENTRY_NAME_LENGTH))
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create an entry name without validation.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for EntryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for EntryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A payable or receivable.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub kind: EntryKind,
    pub name: EntryName,
    pub amount: Amount,
    pub description: String,
    /// Who was paid for a payable, or who paid for a receivable.
    pub counterparty: String,
    pub date: Date,
    /// `None` means the entry is counted under "Other".
    pub split_id: Option<SplitId>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// The validated fields of an entry that the user can edit.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryFields {
    pub name: EntryName,
    pub amount: Amount,
    pub description: String,
    pub counterparty: String,
    pub date: Date,
    pub split_id: Option<SplitId>,
    /// Keys of uploaded images to attach. Only payables keep attachments.
    pub file_keys: Vec<String>,
}

/// Form data for creating and editing payables and receivables.
#[derive(Debug, Serialize, Deserialize)]
pub struct EntryFormData {
    pub name: String,
    pub amount: String,
    pub date: Date,
    pub description: Option<String>,
    pub counterparty: Option<String>,
    pub split_id: Option<SplitId>,
    #[serde(default)]
    pub file_keys: Vec<String>,
}

impl EntryFormData {
    /// Validate the raw form fields.
    ///
    /// # Errors
    ///
    /// Returns the first validation error: a name that is too short, or an
    /// amount that is not a positive number.
    pub fn validate(&self) -> Result<EntryFields, Error> {
        let mut file_keys = self.file_keys.clone();
        file_keys.sort();
        file_keys.dedup();

        Ok(EntryFields {
            name: EntryName::new(&self.name)?,
            amount: Amount::new(&self.amount)?,
            description: trimmed_or_empty(self.description.as_deref()),
            counterparty: trimmed_or_empty(self.counterparty.as_deref()),
            date: self.date,
            split_id: self.split_id,
            file_keys,
        })
    }
}

fn trimmed_or_empty(text: Option<&str>) -> String {
    text.map(str::trim).unwrap_or_default().to_owned()
}


#[cfg(test)]
mod entry_form_tests {
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        Error,
        ledger::{EntryFormData, EntryKind},
        money::Amount,
    };

    fn form(name: &str, amount: &str) -> EntryFormData {
        EntryFormData {
            name: name.to_owned(),
            amount: amount.to_owned(),
            date: date!(2025 - 03 - 14),
            description: None,
            counterparty: Some("  Landlord ".to_owned()),
            split_id: Some(2),
            file_keys: vec!["b".to_owned(), "a".to_owned(), "b".to_owned()],
        }
    }

    #[test]
    fn validate_accepts_good_form() {
        let fields = form("Rent", "$1,200").validate().unwrap();

        assert_eq!(fields.amount, Amount::new_unchecked(Decimal::new(1200, 0)));
        assert_eq!(fields.counterparty, "Landlord");
        assert_eq!(fields.description, "");
        assert_eq!(fields.split_id, Some(2));
        assert_eq!(fields.file_keys, vec!["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn validate_rejects_short_name() {
        assert_eq!(form("Rn", "10").validate(), Err(Error::NameTooShort(3)));
    }

    #[test]
    fn validate_rejects_non_number_amount() {
        assert_eq!(
            form("Rent", "ten").validate(),
            Err(Error::InvalidAmount("ten".to_owned()))
        );
    }

    #[test]
    fn validate_rejects_amount_above_max() {
        assert_eq!(
            form("Rent", "79228162514264337593543950335").validate(),
            Err(Error::AmountTooLarge)
        );
    }

    #[test]
    fn kind_displays_lowercase() {
        assert_eq!(EntryKind::Payable.to_string(), "payable");
        assert_eq!(EntryKind::Receivable.to_string(), "receivable");
    }
}
