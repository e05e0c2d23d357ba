//! Core budget split domain types.

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    group::{BudgetName, GroupId},
    money::Amount,
};

/// Database identifier for a budget split.
pub type SplitId = i64;

/// A share of a budget group's money, e.g. 'Rent' within 'Living costs'.
///
/// Payables and receivables are assigned to splits.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSplit {
    pub id: SplitId,
    pub group_id: GroupId,
    pub name: BudgetName,
    pub description: String,
    pub amount: Amount,
}

/// The validated fields of a split that the user can edit.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitFields {
    pub group_id: GroupId,
    pub name: BudgetName,
    pub description: String,
    pub amount: Amount,
}

/// Form data for split creation and editing.
#[derive(Debug, Serialize, Deserialize)]
pub struct SplitFormData {
    pub group_id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub amount: String,
}

impl SplitFormData {
    /// Validate the raw form fields.
    ///
    /// Whether the group belongs to the user is checked when the split is saved.
    ///
    /// # Errors
    ///
    /// Returns the first validation error: an empty name, or an amount that
    /// is not a positive number.
    pub fn validate(&self) -> Result<SplitFields, Error> {
        Ok(SplitFields {
            group_id: self.group_id,
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
