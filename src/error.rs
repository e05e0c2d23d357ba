//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{
    alert::Alert, html::error_view, internal_server_error::InternalServerError,
    ledger::EntryKind, not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no auth token in the cookie jar")]
    CookieMissing,

    /// Extending the auth token would overflow the date time.
    #[error("could not compute the new auth token expiry")]
    InvalidExpiry,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string is not a valid email address.
    #[error("{0} is not a valid email address")]
    InvalidEmail(String),

    /// A user with the email address is already registered.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// A name was shorter than the minimum number of characters.
    #[error("Name must be at least {0} characters")]
    NameTooShort(usize),

    /// A group or split name was empty or only whitespace.
    #[error("Name cannot be empty")]
    EmptyName,

    /// The amount text could not be parsed as a number.
    #[error("Amount must be a number, got \"{0}\"")]
    InvalidAmount(String),

    /// The amount was zero or negative.
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    /// The amount was larger than [crate::money::MAX_AMOUNT].
    #[error("Amount must be at most $999,999,999,999.99")]
    AmountTooLarge,

    /// A sum of amounts did not fit in a decimal.
    #[error("the total amount is too large to compute")]
    AmountOverflow,

    /// The requested group order is outside of the range `-1..=group_count`.
    #[error("the order {0} is out of range")]
    InvalidGroupOrder(i64),

    /// The budget group does not exist or belongs to another user.
    #[error("the budget group does not refer to one of your groups")]
    InvalidGroup,

    /// The budget split does not exist or belongs to another user.
    #[error("the budget split does not refer to one of your splits")]
    InvalidSplit,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a budget group that does not exist
    #[error("tried to update a budget group that is not in the database")]
    UpdateMissingGroup,

    /// Tried to delete a budget group that does not exist
    #[error("tried to delete a budget group that is not in the database")]
    DeleteMissingGroup,

    /// Tried to update a budget split that does not exist
    #[error("tried to update a budget split that is not in the database")]
    UpdateMissingSplit,

    /// Tried to delete a budget split that does not exist
    #[error("tried to delete a budget split that is not in the database")]
    DeleteMissingSplit,

    /// Tried to update a payable or receivable that does not exist
    #[error("tried to update a {0} that is not in the database")]
    UpdateMissingEntry(EntryKind),

    /// Tried to delete a payable or receivable that does not exist
    #[error("tried to delete a {0} that is not in the database")]
    DeleteMissingEntry(EntryKind),

    /// The multipart form could not be parsed.
    #[error("Could not parse multipart form: {0}")]
    MultipartError(String),

    /// The uploaded file is not an image.
    #[error("File is not an image")]
    NotAnImage,

    /// The uploaded file is larger than the limit in bytes.
    #[error("File is larger than {0} bytes")]
    FileTooLarge(usize),

    /// Reading or writing an uploaded file failed.
    #[error("file storage failed: {0}")]
    FileStorageError(String),

    /// The export request did not include any budget splits.
    #[error("no budget splits were selected")]
    NoSplitsSelected,

    /// The export spreadsheet could not be written.
    #[error("could not write the export: {0}")]
    ExportError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::NoSplitsSelected => (
                StatusCode::BAD_REQUEST,
                Html(
                    error_view(
                        "Bad Request",
                        "400",
                        "No budget splits selected",
                        "Go back and select at least one budget split to export.",
                    )
                    .into_string(),
                ),
            )
                .into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Not found".to_owned(),
                    details: "The item could not be found. \
                    Try refreshing the page to see if it has been deleted."
                        .to_owned(),
                },
            ),
            Error::InvalidGroupOrder(order) => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Could not move group".to_owned(),
                    details: format!("The position {order} is out of range."),
                },
            ),
            Error::InvalidGroup => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid budget group".to_owned(),
                    details: "The budget group could not be found.".to_owned(),
                },
            ),
            Error::InvalidSplit => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid budget split".to_owned(),
                    details: "The budget split could not be found.".to_owned(),
                },
            ),
            Error::UpdateMissingGroup => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update budget group".to_owned(),
                    details: "The budget group could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingGroup => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete budget group".to_owned(),
                    details: "The budget group could not be found. \
                    Try refreshing the page to see if the group has already been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingSplit => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update budget split".to_owned(),
                    details: "The budget split could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingSplit => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete budget split".to_owned(),
                    details: "The budget split could not be found. \
                    Try refreshing the page to see if the split has already been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingEntry(kind) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: format!("Could not update {kind}"),
                    details: format!("The {kind} could not be found."),
                },
            ),
            Error::DeleteMissingEntry(kind) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: format!("Could not delete {kind}"),
                    details: format!(
                        "The {kind} could not be found. \
                        Try refreshing the page to see if it has already been deleted."
                    ),
                },
            ),
            Error::NotAnImage => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid file".to_owned(),
                    details: "Only image files can be attached.".to_owned(),
                },
            ),
            Error::FileTooLarge(limit) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Alert::Error {
                    message: "File too large".to_owned(),
                    details: format!(
                        "Images must be at most {} MB.",
                        limit / (1024 * 1024)
                    ),
                },
            ),
            Error::MultipartError(error) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not upload file".to_owned(),
                    details: error,
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}
