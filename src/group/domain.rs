//! Core budget group domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, money::Amount, split::BudgetSplit};

/// A validated, non-empty name for a budget group or split.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct BudgetName(String);

impl BudgetName {
    /// Create a budget name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a budget name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for BudgetName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for BudgetName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BudgetName::new(s)
    }
}

impl Display for BudgetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a budget group.
pub type GroupId = i64;

/// A top-level budget category, e.g. 'Living costs', that is divided into splits.
///
/// `order` is the group's position on the budget page. A user's groups always
/// occupy the orders `0..n` exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetGroup {
    pub id: GroupId,
    pub name: BudgetName,
    pub description: String,
    pub amount: Amount,
    pub order: i64,
}

/// The validated fields of a group that the user can edit.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupFields {
    pub name: BudgetName,
    pub description: String,
    pub amount: Amount,
}

/// A group together with its splits, as shown on the budget page.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupWithSplits {
    pub group: BudgetGroup,
    pub splits: Vec<BudgetSplit>,
}

/// Form data for group creation and editing.
#[derive(Debug, Serialize, Deserialize)]
pub struct GroupFormData {
    pub name: String,
    pub description: Option<String>,
    pub amount: String,
}

impl GroupFormData {
    /// Validate the raw form fields.
    ///
    /// # Errors
    ///
    /// Returns the first validation error: an empty name, or an amount that
    /// is not a positive number.
    pub fn validate(&self) -> Result<GroupFields, Error> {
        Ok(GroupFields {
            name: BudgetName::new(&self.name)?,
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_owned(),
            amount: Amount::new(&self.amount)?,
        })
    }
}

#[cfg(test)]
mod budget_name_tests {
    use crate::{Error, group::BudgetName};

    #[test]
    fn new_fails_on_empty_string() {
        assert_eq!(BudgetName::new(""), Err(Error::EmptyName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        assert_eq!(BudgetName::new("\n\t \r"), Err(Error::EmptyName));
    }

    #[test]
    fn new_trims_name() {
        assert_eq!(
            BudgetName::new("  Groceries "),
            Ok(BudgetName::new_unchecked("Groceries"))
        );
    }
}
