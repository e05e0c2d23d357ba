//! Image uploads and the attachments that link them to payables.

mod db;
mod endpoint;
mod view;

pub use db::{
    NewUpload, UploadedFile, create_upload_tables, find_uploads_by_keys, get_payable_attachments,
    get_upload_by_key, save_upload, set_payable_attachments,
};
pub use endpoint::{UPLOAD_FIELD_NAME, UploadState, get_uploaded_file, upload_file_endpoint};
pub use view::{attachment_preview, attachments_input};
