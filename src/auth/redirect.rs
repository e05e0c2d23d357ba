//! Where to send the user after they log in.

use axum::{extract::Request, http::Uri};
use tracing::{error, warn};

use crate::endpoints;

/// Reduce `raw_url` to a local path and query, rejecting anything that could
/// leave the site or loop back to the log-in page.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    local_path_and_query(&uri)
}

// HX-Current-URL carries the full page URL, so only the path and query are kept.
fn local_path_and_query(uri: &Uri) -> Option<String> {
    let path_and_query = uri.path_and_query()?;
    let path = path_and_query.path();

    if !path.starts_with('/') || path.starts_with("//") || path == endpoints::LOG_IN_VIEW {
        return None;
    }

    Some(path_and_query.as_str().to_owned())
}

/// Build the log-in URL that returns the user to the page they requested.
///
/// Page requests return to their own URL. HTMX requests to `/api` routes
/// return to the page that issued them. Falls back to the dashboard when
/// neither is usable.
pub fn build_log_in_redirect_url(request: &Request) -> String {
    let target = if request.uri().path().starts_with("/api") {
        hx_current_page(request)
    } else {
        normalize_redirect_url(request.uri().to_string().as_str())
    };

    let target = target.unwrap_or_else(|| {
        warn!(
            "No usable redirect target for {}, falling back to the dashboard.",
            request.uri()
        );
        endpoints::DASHBOARD_VIEW.to_owned()
    });

    log_in_url_with_redirect(&target)
}

pub(super) fn log_in_url_with_redirect(target: &str) -> String {
    match serde_urlencoded::to_string([("redirect_url", target)]) {
        Ok(query) => format!("{}?{}", endpoints::LOG_IN_VIEW, query),
        Err(encode_error) => {
            error!("Could not encode redirect URL {target}: {encode_error}");
            endpoints::LOG_IN_VIEW.to_owned()
        }
    }
}

fn hx_current_page(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let current_url = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())?;

    current_url
        .parse::<Uri>()
        .ok()
        .and_then(|uri| local_path_and_query(&uri))
}
