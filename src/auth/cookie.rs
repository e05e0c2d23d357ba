//! Reading and writing the encrypted auth cookie.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::{
    Error,
    auth::{Token, UserID},
};

/// The name of the cookie holding the JSON encoded [Token].
pub const COOKIE_TOKEN: &str = "token";
/// The default duration for which auth cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);

fn build_token_cookie(token: &Token) -> Result<Cookie<'static>, Error> {
    let value = serde_json::to_string(token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(Cookie::build((COOKIE_TOKEN, value))
        .expires(token.expires_at)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build())
}

/// Add an auth cookie for `user_id` to the cookie jar that expires `duration` from now.
///
/// # Errors
///
/// Returns an error if the expiry overflows or the token cannot be serialized.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
    local_offset: UtcOffset,
) -> Result<PrivateCookieJar, Error> {
    let token = Token::new(user_id, duration, local_offset)?;

    Ok(jar.add(build_token_cookie(&token)?))
}

/// Overwrite the auth cookie with an expired, empty one so the client deletes it.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Decrypt and decode the token in `jar`.
///
/// # Errors
///
/// Returns an:
/// - [Error::CookieMissing] if there is no auth cookie,
/// - [Error::InvalidCredentials] if the cookie does not hold a token or the token has expired.
pub fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;
    let token: Token =
        serde_json::from_str(cookie.value_trimmed()).map_err(|_| Error::InvalidCredentials)?;

    if token.is_expired() {
        return Err(Error::InvalidCredentials);
    }

    Ok(token)
}

/// Push the token expiry out to `duration` from now unless it already expires later.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
pub fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
    local_offset: UtcOffset,
) -> Result<PrivateCookieJar, Error> {
    let current = get_token_from_cookies(&jar)?;
    let extended = Token::new(current.user_id, duration, local_offset)?;

    let token = Token {
        user_id: current.user_id,
        expires_at: max(current.expires_at, extended.expires_at),
    };

    Ok(jar.add(build_token_cookie(&token)?))
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime, UtcOffset};

    use crate::{
        Error,
        auth::{Token, UserID},
    };

    use super::{
        COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, build_token_cookie,
        extend_auth_cookie_duration_if_needed, get_token_from_cookies, invalidate_auth_cookie,
        set_auth_cookie,
    };

    fn get_jar() -> PrivateCookieJar {
        PrivateCookieJar::new(Key::from(&Sha512::digest(b"foobar")))
    }

    #[track_caller]
    fn assert_date_time_close(left: OffsetDateTime, right: OffsetDateTime) {
        assert!(
            (left - right).abs() < Duration::seconds(1),
            "got date time {left:?}, want {right:?}"
        );
    }

    #[test]
    fn set_cookie_stores_token() {
        let jar = set_auth_cookie(
            get_jar(),
            UserID::new(1),
            DEFAULT_COOKIE_DURATION,
            UtcOffset::UTC,
        )
        .unwrap();

        let token = get_token_from_cookies(&jar).unwrap();

        assert_eq!(token.user_id, UserID::new(1));
        assert_date_time_close(
            token.expires_at,
            OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION,
        );
    }

    #[test]
    fn missing_cookie_is_an_error() {
        assert_eq!(
            get_token_from_cookies(&get_jar()),
            Err(Error::CookieMissing)
        );
    }

    #[test]
    fn garbage_cookie_is_invalid() {
        let jar = get_jar().add(Cookie::new(COOKIE_TOKEN, "not json"));

        assert_eq!(
            get_token_from_cookies(&jar),
            Err(Error::InvalidCredentials)
        );
    }

    #[test]
    fn expired_token_is_invalid() {
        let token = Token {
            user_id: UserID::new(1),
            expires_at: OffsetDateTime::now_utc() - Duration::minutes(1),
        };
        let jar = get_jar().add(build_token_cookie(&token).unwrap());

        assert_eq!(
            get_token_from_cookies(&jar),
            Err(Error::InvalidCredentials)
        );
    }

    #[test]
    fn extend_pushes_expiry_out() {
        let jar = set_auth_cookie(
            get_jar(),
            UserID::new(1),
            Duration::seconds(5),
            UtcOffset::UTC,
        )
        .unwrap();

        let jar =
            extend_auth_cookie_duration_if_needed(jar, Duration::minutes(10), UtcOffset::UTC)
                .unwrap();

        let cookie = jar.get(COOKIE_TOKEN).unwrap();
        let want = OffsetDateTime::now_utc() + Duration::minutes(10);
        assert_date_time_close(get_token_from_cookies(&jar).unwrap().expires_at, want);
        assert_date_time_close(cookie.expires_datetime().unwrap(), want);
    }

    #[test]
    fn extend_keeps_later_expiry() {
        let jar = set_auth_cookie(
            get_jar(),
            UserID::new(1),
            Duration::days(7),
            UtcOffset::UTC,
        )
        .unwrap();
        let before = get_token_from_cookies(&jar).unwrap().expires_at;

        let jar =
            extend_auth_cookie_duration_if_needed(jar, DEFAULT_COOKIE_DURATION, UtcOffset::UTC)
                .unwrap();

        assert_eq!(get_token_from_cookies(&jar).unwrap().expires_at, before);
    }

    #[test]
    fn invalidate_expires_cookie() {
        let jar = set_auth_cookie(
            get_jar(),
            UserID::new(1),
            DEFAULT_COOKIE_DURATION,
            UtcOffset::UTC,
        )
        .unwrap();

        let jar = invalidate_auth_cookie(jar);
        let cookie = jar.get(COOKIE_TOKEN).unwrap();

        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(
            get_token_from_cookies(&jar),
            Err(Error::InvalidCredentials)
        );
    }
}
