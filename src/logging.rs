//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, Method, header::CONTENT_TYPE},
    middleware::Next,
    response::Response,
};

/// Bodies longer than this many bytes are truncated in the `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full text is logged at the `debug` level.
/// Binary bodies such as uploaded images are passed through untouched and
/// only their size is logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = read_body(body).await;

    let display_text = body_display_text(&parts.headers, &body_bytes);
    let display_text = if parts.method == Method::POST && is_form(&parts.headers) {
        let redacted = redact_field(&display_text, "password");
        redact_field(&redacted, "confirm_password")
    } else {
        display_text
    };
    log_body("Received request", &parts, &display_text);

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = read_body(body).await;
    log_body(
        "Sending response",
        &parts,
        &body_display_text(&parts.headers, &body_bytes),
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

async fn read_body(body: Body) -> Bytes {
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read body for logging: {error}");
            Bytes::new()
        }
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .is_some_and(|content_type| content_type == "application/x-www-form-urlencoded")
}

fn is_text(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(CONTENT_TYPE)
        .and_then(|content_type| content_type.to_str().ok())
    else {
        return true;
    };

    content_type.starts_with("text/")
        || content_type.starts_with("application/x-www-form-urlencoded")
        || content_type.starts_with("application/json")
}

fn body_display_text(headers: &HeaderMap, body: &Bytes) -> String {
    if is_text(headers) {
        String::from_utf8_lossy(body).to_string()
    } else {
        format!("<{} bytes>", body.len())
    }
}

fn redact_field(form_text: &str, field_name: &str) -> String {
    let Some(start) = form_text.find(&format!("{field_name}=")) else {
        return form_text.to_string();
    };

    let end = match form_text[start..].find('&') {
        Some(end) => start + end,
        None => form_text.len(),
    };
    let secret = &form_text[start..end];

    form_text.replace(secret, &format!("{field_name}=********"))
}

fn truncate(text: &str, limit: usize) -> &str {
    let mut end = limit.min(text.len());

    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

fn log_body(message: &str, headers: &impl std::fmt::Debug, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "{message}: {headers:#?}\nbody: {:}...",
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{message}: {headers:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod logging_tests {
    use super::{redact_field, truncate};

    #[test]
    fn redacts_password_fields() {
        let form = "email=a%40b.com&password=hunter2&confirm_password=hunter2";

        let redacted = redact_field(form, "password");
        let redacted = redact_field(&redacted, "confirm_password");

        assert_eq!(
            redacted,
            "email=a%40b.com&password=********&confirm_password=********"
        );
    }

    #[test]
    fn redact_leaves_other_forms_alone() {
        assert_eq!(redact_field("name=Rent", "password"), "name=Rent");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "h");
        assert_eq!(truncate("hi", 64), "hi");
    }
}
