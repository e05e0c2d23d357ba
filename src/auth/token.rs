//! The session token stored (encrypted) in the auth cookie.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::{Error, auth::UserID};

mod expiry_format {
    //! Serializes the expiry with two-digit hours.
    //!
    //! The default serializer for [time::OffsetDateTime] writes midnight as
    //! "0:00:00.0", which its own deserializer then rejects.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// e.g. "2021-01-01 00:00:00.0 +00:00:00".
    const EXPIRY_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(expiry: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = expiry
            .format(EXPIRY_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&text, EXPIRY_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Identifies the logged in user until `expires_at`.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    pub user_id: UserID,

    #[serde(with = "expiry_format")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// Create a token for `user_id` that expires `duration` from now, expressed in `local_offset`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidExpiry] if adding `duration` overflows.
    pub fn new(user_id: UserID, duration: Duration, local_offset: UtcOffset) -> Result<Self, Error> {
        let expires_at = OffsetDateTime::now_utc()
            .to_offset(local_offset)
            .checked_add(duration)
            .ok_or(Error::InvalidExpiry)?;

        Ok(Self {
            user_id,
            expires_at,
        })
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= OffsetDateTime::now_utc()
    }
}

#[cfg(test)]
mod token_tests {
    use time::{Duration, OffsetDateTime, UtcOffset, macros::datetime};

    use crate::auth::{UserID, token::Token};

    #[test]
    fn serialises_with_padded_expiry() {
        let token = Token {
            user_id: UserID::new(1),
            expires_at: datetime!(2025-12-21 03:54:00).assume_offset(UtcOffset::UTC),
        };

        let actual = serde_json::to_string(&token).unwrap();

        assert_eq!(
            actual,
            r#"{"user_id":1,"expires_at":"2025-12-21 03:54:00.0 +00:00:00"}"#
        );
    }

    #[test]
    fn round_trips_midnight_expiry() {
        let want = Token {
            user_id: UserID::new(3),
            expires_at: datetime!(2025-12-21 00:00:00).assume_offset(UtcOffset::UTC),
        };
        let text = r#"{"user_id":3,"expires_at":"2025-12-21 00:00:00.0 +00:00:00"}"#;

        let got: Token = serde_json::from_str(text).unwrap();

        assert_eq!(got, want);
    }

    #[test]
    fn new_token_expires_after_duration() {
        let token = Token::new(UserID::new(1), Duration::minutes(5), UtcOffset::UTC).unwrap();

        let remaining = token.expires_at - OffsetDateTime::now_utc();
        assert!(remaining > Duration::minutes(4) && remaining <= Duration::minutes(5));
        assert!(!token.is_expired());
    }

    #[test]
    fn past_token_is_expired() {
        let token = Token {
            user_id: UserID::new(1),
            expires_at: OffsetDateTime::now_utc() - Duration::seconds(1),
        };

        assert!(token.is_expired());
    }
}
