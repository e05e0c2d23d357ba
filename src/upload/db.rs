//! Database operations for uploaded files and payable attachments.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{Error, auth::UserID, ledger::EntryId};

/// An image a user uploaded, stored on disk under its `key`.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub id: i64,
    /// The SHA-256 hex digest of the file contents.
    pub key: String,
    /// The file name the client sent.
    pub name: String,
    pub content_type: String,
    /// Size in bytes.
    pub size: i64,
    pub created_at: OffsetDateTime,
}

/// The metadata of a new upload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUpload {
    pub key: String,
    pub name: String,
    pub content_type: String,
    pub size: i64,
}

/// Record an upload for `user_id`.
///
/// Uploading the same content twice returns the existing record.
pub fn save_upload(
    upload: NewUpload,
    user_id: UserID,
    connection: &Connection,
) -> Result<UploadedFile, Error> {
    connection.execute(
        "INSERT OR IGNORE INTO uploaded_file (user_id, key, name, content_type, size, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            user_id.as_i64(),
            &upload.key,
            &upload.name,
            &upload.content_type,
            upload.size,
            OffsetDateTime::now_utc(),
        ),
    )?;

    get_upload_by_key(&upload.key, user_id, connection)
}

/// Retrieve the user's upload with `key`.
pub fn get_upload_by_key(
    key: &str,
    user_id: UserID,
    connection: &Connection,
) -> Result<UploadedFile, Error> {
    connection
        .prepare(
            "SELECT id, key, name, content_type, size, created_at FROM uploaded_file
            WHERE key = ?1 AND user_id = ?2",
        )?
        .query_row((key, user_id.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Find the uploads with the given keys that belong to `user_id`.
///
/// Keys of files owned by other users, or of files that do not exist, are skipped.
pub fn find_uploads_by_keys(
    keys: &[String],
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<UploadedFile>, Error> {
    let mut statement = connection.prepare(
        "SELECT id, key, name, content_type, size, created_at FROM uploaded_file
        WHERE key = ?1 AND user_id = ?2",
    )?;

    let mut uploads = Vec::with_capacity(keys.len());
    for key in keys {
        match statement.query_row((key, user_id.as_i64()), map_row) {
            Ok(upload) => uploads.push(upload),
            Err(rusqlite::Error::QueryReturnedNoRows) => {}
            Err(error) => return Err(error.into()),
        }
    }

    Ok(uploads)
}

/// Replace the attachments of a payable with the user's uploads named in `keys`.
pub fn set_payable_attachments(
    payable_id: EntryId,
    keys: &[String],
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "DELETE FROM payable_attachment WHERE payable_id = ?1",
        [payable_id],
    )?;

    let mut statement = connection.prepare(
        "INSERT OR IGNORE INTO payable_attachment (payable_id, upload_id) VALUES (?1, ?2)",
    )?;
    for upload in find_uploads_by_keys(keys, user_id, connection)? {
        statement.execute((payable_id, upload.id))?;
    }

    Ok(())
}

/// Retrieve the files attached to one of the user's payables.
pub fn get_payable_attachments(
    payable_id: EntryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<UploadedFile>, Error> {
    connection
        .prepare(
            "SELECT f.id, f.key, f.name, f.content_type, f.size, f.created_at
            FROM payable_attachment a
            INNER JOIN uploaded_file f ON f.id = a.upload_id
            INNER JOIN payable p ON p.id = a.payable_id
            WHERE a.payable_id = ?1 AND p.user_id = ?2
            ORDER BY f.id ASC",
        )?
        .query_map((payable_id, user_id.as_i64()), map_row)?
        .map(|maybe_upload| maybe_upload.map_err(|error| error.into()))
        .collect()
}

/// Initialize the uploaded file and payable attachment tables.
pub fn create_upload_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS uploaded_file (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            key TEXT NOT NULL,
            name TEXT NOT NULL,
            content_type TEXT NOT NULL,
            size INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(user_id, key),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS payable_attachment (
            payable_id INTEGER NOT NULL,
            upload_id INTEGER NOT NULL,
            PRIMARY KEY(payable_id, upload_id),
            FOREIGN KEY(payable_id) REFERENCES payable(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(upload_id) REFERENCES uploaded_file(id) ON UPDATE CASCADE ON DELETE CASCADE
        );",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<UploadedFile, rusqlite::Error> {
    Ok(UploadedFile {
        id: row.get(0)?,
        key: row.get(1)?,
        name: row.get(2)?,
        content_type: row.get(3)?,
        size: row.get(4)?,
        created_at: row.get(5)?,
    })
}
