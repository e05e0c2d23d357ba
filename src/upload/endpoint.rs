//! Endpoints for uploading images and serving them back to their owner.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Multipart, Path, State, multipart::Field},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::{
    AppState, Error,
    app_state::UploadConfig,
    auth::UserID,
    upload::{NewUpload, get_upload_by_key, save_upload, view::attachment_preview},
};

/// The name of the multipart field holding the image.
pub const UPLOAD_FIELD_NAME: &str = "file";

/// The state needed for uploading and serving files.
#[derive(Debug, Clone)]
pub struct UploadState {
    pub upload_config: UploadConfig,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UploadState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            upload_config: state.upload_config.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

struct ImageData {
    name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Store an uploaded image and respond with a preview holding a hidden
/// `file_keys` input, ready to be placed inside a payable form.
pub async fn upload_file_endpoint(
    State(state): State<UploadState>,
    Extension(user_id): Extension<UserID>,
    multipart: Multipart,
) -> Response {
    let image = match read_image(multipart, state.upload_config.max_upload_bytes).await {
        Ok(image) => image,
        Err(error) => {
            tracing::debug!("Rejected upload: {error}");
            return error.into_alert_response();
        }
    };

    let key = format!("{:x}", Sha256::digest(&image.bytes));

    if let Err(error) = store_file(&state.upload_config, &key, &image.bytes).await {
        tracing::error!("Could not store upload {key}: {error}");
        return error.into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let upload = NewUpload {
        key,
        name: image.name,
        content_type: image.content_type,
        size: image.bytes.len() as i64,
    };

    match save_upload(upload, user_id, &connection) {
        Ok(upload) => attachment_preview(&upload).into_response(),
        Err(error) => {
            tracing::error!("Could not save upload record: {error}");
            error.into_alert_response()
        }
    }
}

/// Serve one of the user's uploaded files.
pub async fn get_uploaded_file(
    Path(key): Path<String>,
    State(state): State<UploadState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let upload = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_upload_by_key(&key, user_id, &connection)?
    };

    let path = state.upload_config.upload_dir.join(&upload.key);
    let bytes = tokio::fs::read(&path).await.map_err(|error| {
        tracing::error!("Could not read upload {}: {error}", path.display());
        Error::NotFound
    })?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, upload.content_type),
            (header::CACHE_CONTROL, "private, max-age=31536000, immutable".to_owned()),
        ],
        bytes,
    )
        .into_response())
}

async fn read_image(mut multipart: Multipart, max_bytes: usize) -> Result<ImageData, Error> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.body_text()))?
    {
        if field.name() == Some(UPLOAD_FIELD_NAME) {
            return read_image_field(field, max_bytes).await;
        }
    }

    Err(Error::MultipartError(format!(
        "The form has no \"{UPLOAD_FIELD_NAME}\" field"
    )))
}

async fn read_image_field(mut field: Field<'_>, max_bytes: usize) -> Result<ImageData, Error> {
    let content_type = match field.content_type() {
        Some(content_type) if content_type.starts_with("image/") => content_type.to_owned(),
        _ => return Err(Error::NotAnImage),
    };
    let name = field.file_name().unwrap_or("image").to_owned();

    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|error| Error::MultipartError(error.body_text()))?
    {
        if bytes.len() + chunk.len() > max_bytes {
            return Err(Error::FileTooLarge(max_bytes));
        }

        bytes.extend_from_slice(&chunk);
    }

    if bytes.is_empty() {
        return Err(Error::MultipartError("The file is empty".to_owned()));
    }

    Ok(ImageData {
        name,
        content_type,
        bytes,
    })
}

async fn store_file(config: &UploadConfig, key: &str, bytes: &[u8]) -> Result<(), Error> {
    let path = config.upload_dir.join(key);

    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Ok(());
    }

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .map_err(|error| Error::FileStorageError(error.to_string()))?;
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|error| Error::FileStorageError(error.to_string()))
}

#[cfg(test)]
mod upload_endpoint_tests {
    use std::{
        path::PathBuf,
        sync::{Arc, Mutex},
    };

    use axum::{
        Extension,
        body::Body,
        extract::{FromRequest, Multipart, Path, State},
        http::{Request, StatusCode, header},
    };
    use rusqlite::Connection;
    use scraper::Selector;
    use sha2::{Digest, Sha256};

    use crate::{
        Error,
        app_state::UploadConfig,
        auth::UserID,
        db::initialize,
        endpoints,
        test_utils::{assert_valid_html, insert_test_user, parse_html_fragment},
    };

    use super::{UploadState, get_uploaded_file, upload_file_endpoint};

    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot really a png";

    fn get_state(test_name: &str, max_upload_bytes: usize) -> (UploadState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user_id = insert_test_user(&connection, "test@test.com");
        let upload_dir: PathBuf = std::env::temp_dir()
            .join(format!("payledger-{}-{test_name}", std::process::id()));

        (
            UploadState {
                upload_config: UploadConfig {
                    upload_dir,
                    max_upload_bytes,
                },
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user_id,
        )
    }

    async fn must_make_multipart(content_type: &str, data: &[u8]) -> Multipart {
        let boundary = "MY_BOUNDARY123456789";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"file\"; filename=\"receipt.png\"\r\n",
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(endpoints::UPLOADS_API)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        Multipart::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn upload_returns_preview_with_key() {
        let (state, user_id) = get_state("preview", 1024);
        let want_key = format!("{:x}", Sha256::digest(PNG_BYTES));

        let response = upload_file_endpoint(
            State(state.clone()),
            Extension(user_id),
            must_make_multipart("image/png", PNG_BYTES).await,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let input = html
            .select(&Selector::parse("input[type=hidden][name=file_keys]").unwrap())
            .next()
            .expect("Could not find the hidden file key input");
        assert_eq!(input.value().attr("value"), Some(want_key.as_str()));
        assert!(state.upload_config.upload_dir.join(&want_key).exists());
    }

    #[tokio::test]
    async fn upload_rejects_non_images() {
        let (state, user_id) = get_state("not-image", 1024);

        let response = upload_file_endpoint(
            State(state),
            Extension(user_id),
            must_make_multipart("text/plain", b"hello").await,
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upload_rejects_large_files() {
        let (state, user_id) = get_state("too-large", 8);

        let response = upload_file_endpoint(
            State(state),
            Extension(user_id),
            must_make_multipart("image/png", PNG_BYTES).await,
        )
        .await;

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn owner_can_fetch_upload() {
        let (state, user_id) = get_state("fetch", 1024);
        let key = format!("{:x}", Sha256::digest(PNG_BYTES));
        upload_file_endpoint(
            State(state.clone()),
            Extension(user_id),
            must_make_multipart("image/png", PNG_BYTES).await,
        )
        .await;

        let response = get_uploaded_file(Path(key), State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.as_ref(), PNG_BYTES);
    }

    #[tokio::test]
    async fn other_users_cannot_fetch_upload() {
        let (state, user_id) = get_state("other-user", 1024);
        let other_user = insert_test_user(&state.db_connection.lock().unwrap(), "o@test.com");
        let key = format!("{:x}", Sha256::digest(PNG_BYTES));
        upload_file_endpoint(
            State(state.clone()),
            Extension(user_id),
            must_make_multipart("image/png", PNG_BYTES).await,
        )
        .await;

        let result = get_uploaded_file(Path(key), State(state), Extension(other_user)).await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }
}
