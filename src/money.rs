//! Money amounts stored as exact decimals.
//!
//! Amounts are kept as [Decimal] values everywhere, written to SQLite as TEXT
//! and formatted for display without passing through floating point.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::Error;

/// The largest amount a user may enter: $999,999,999,999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// A strictly positive amount of money rounded to cents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// Parse and validate an amount entered by a user.
    ///
    /// Surrounding whitespace, a leading dollar sign and thousands separators are
    /// ignored. The result is rounded to two decimal places.
    ///
    /// # Errors
    ///
    /// Returns an:
    /// - [Error::InvalidAmount] if `text` is not a number.
    /// - [Error::NonPositiveAmount] if the amount is zero or negative.
    /// - [Error::AmountTooLarge] if the amount is above [MAX_AMOUNT].
    pub fn new(text: &str) -> Result<Self, Error> {
        let amount = parse_decimal(text)?;

        if amount <= Decimal::ZERO {
            return Err(Error::NonPositiveAmount);
        }

        if amount > MAX_AMOUNT {
            return Err(Error::AmountTooLarge);
        }

        Ok(Self(amount))
    }

    /// Create an amount without validation.
    ///
    /// The caller should ensure that `amount` is greater than zero and at most [MAX_AMOUNT].
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the positive invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::new(s)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format_currency(self.0))
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        Decimal::from_str(text)
            .map(Amount)
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

fn parse_decimal(text: &str) -> Result<Decimal, Error> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix('$').unwrap_or(trimmed).replace(',', "");

    Decimal::from_str(&digits)
        .map(round_to_cents)
        .map_err(|_| Error::InvalidAmount(trimmed.to_owned()))
}

fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Add up amounts without any floating point error.
///
/// # Errors
///
/// Returns [Error::AmountOverflow] if the total does not fit in a [Decimal].
pub fn sum_amounts(amounts: impl IntoIterator<Item = Decimal>) -> Result<Decimal, Error> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| add_amounts(total, amount))
}

/// `a + b`, or [Error::AmountOverflow] if the result does not fit in a [Decimal].
pub fn add_amounts(a: Decimal, b: Decimal) -> Result<Decimal, Error> {
    a.checked_add(b).ok_or(Error::AmountOverflow)
}

/// `a - b`, or [Error::AmountOverflow] if the result does not fit in a [Decimal].
pub fn subtract_amounts(a: Decimal, b: Decimal) -> Result<Decimal, Error> {
    a.checked_sub(b).ok_or(Error::AmountOverflow)
}

/// Format `amount` as dollars and cents with thousands separators, e.g. "-$1,234.50".
pub fn format_currency(amount: Decimal) -> String {
    let amount = round_to_cents(amount);
    let digits = format!("{:.2}", amount.abs());
    let (dollars, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };

    format!("{sign}${}.{cents}", group_thousands(dollars))
}

/// Format `amount` using the debit convention: unsigned and wrapped in parentheses.
pub fn format_debit(amount: Decimal) -> String {
    format!("({})", format_currency(amount.abs()))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    grouped
}


#[cfg(test)]
mod amount_sql_tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;

    use crate::money::Amount;

    #[test]
    fn amount_survives_sqlite_without_float_drift() {
        let connection = Connection::open_in_memory().unwrap();
        connection
            .execute("CREATE TABLE t (amount TEXT NOT NULL)", ())
            .unwrap();
        let want = Amount::new_unchecked(Decimal::new(1000000000000001, 2));

        connection
            .execute("INSERT INTO t (amount) VALUES (?1)", (want,))
            .unwrap();
        let got: Amount = connection
            .query_row("SELECT amount FROM t", [], |row| row.get(0))
            .unwrap();

        assert_eq!(got, want);
    }
}
