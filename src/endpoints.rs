//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/groups/{group_id}', use [format_endpoint].

use std::fmt::Display;

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page listing the budget groups and their splits.
pub const BUDGET_VIEW: &str = "/budget";
/// The page for creating a new budget group.
pub const NEW_GROUP_VIEW: &str = "/budget/groups/new";
/// The page for editing a budget group.
pub const EDIT_GROUP_VIEW: &str = "/budget/groups/{group_id}/edit";
/// The page for creating a new split in a budget group.
pub const NEW_SPLIT_VIEW: &str = "/budget/groups/{group_id}/splits/new";
/// The page for editing a budget split.
pub const EDIT_SPLIT_VIEW: &str = "/budget/splits/{split_id}/edit";
/// The page for recording a new payable.
pub const NEW_PAYABLE_VIEW: &str = "/pay";
/// The page for editing a payable.
pub const EDIT_PAYABLE_VIEW: &str = "/payables/{payable_id}/edit";
/// The page for recording a new receivable.
pub const NEW_RECEIVABLE_VIEW: &str = "/fund";
/// The page for editing a receivable.
pub const EDIT_RECEIVABLE_VIEW: &str = "/receivables/{receivable_id}/edit";
/// The page for choosing budget splits to export.
pub const EXPORT_VIEW: &str = "/export";
/// The route that returns the export spreadsheet as a download.
pub const EXPORT_DOWNLOAD: &str = "/export/download";
/// The route for viewing an uploaded file.
pub const UPLOADED_FILE: &str = "/uploads/{key}";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route for instructions for resetting the user's password.
pub const FORGOT_PASSWORD_VIEW: &str = "/forgot_password";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route to create a budget group.
pub const GROUPS_API: &str = "/api/groups";
/// The route to update or delete a budget group.
pub const GROUP_API: &str = "/api/groups/{group_id}";
/// The route to move a budget group to another position.
pub const GROUP_ORDER_API: &str = "/api/groups/{group_id}/order";
/// The route to create a budget split.
pub const SPLITS_API: &str = "/api/splits";
/// The route to update or delete a budget split.
pub const SPLIT_API: &str = "/api/splits/{split_id}";
/// The route to create a payable.
pub const PAYABLES_API: &str = "/api/payables";
/// The route to update or delete a payable.
pub const PAYABLE_API: &str = "/api/payables/{payable_id}";
/// The route to create a receivable.
pub const RECEIVABLES_API: &str = "/api/receivables";
/// The route to update or delete a receivable.
pub const RECEIVABLE_API: &str = "/api/receivables/{receivable_id}";
/// The route to upload image attachments.
pub const UPLOADS_API: &str = "/api/uploads";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl Display) -> String {
    let param_start = match endpoint_path.find('{') {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::DASHBOARD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::BUDGET_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_GROUP_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_GROUP_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_SPLIT_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_SPLIT_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_PAYABLE_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_PAYABLE_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_RECEIVABLE_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_RECEIVABLE_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EXPORT_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EXPORT_DOWNLOAD);
        assert_endpoint_is_valid_uri(endpoints::UPLOADED_FILE);
        assert_endpoint_is_valid_uri(endpoints::REGISTER_VIEW);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::FORGOT_PASSWORD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(endpoints::LOG_IN_API);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::USERS);
        assert_endpoint_is_valid_uri(endpoints::GROUPS_API);
        assert_endpoint_is_valid_uri(endpoints::GROUP_API);
        assert_endpoint_is_valid_uri(endpoints::GROUP_ORDER_API);
        assert_endpoint_is_valid_uri(endpoints::SPLITS_API);
        assert_endpoint_is_valid_uri(endpoints::SPLIT_API);
        assert_endpoint_is_valid_uri(endpoints::PAYABLES_API);
        assert_endpoint_is_valid_uri(endpoints::PAYABLE_API);
        assert_endpoint_is_valid_uri(endpoints::RECEIVABLES_API);
        assert_endpoint_is_valid_uri(endpoints::RECEIVABLE_API);
        assert_endpoint_is_valid_uri(endpoints::UPLOADS_API);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn string_parameter() {
        let formatted_path = format_endpoint(super::UPLOADED_FILE, "abc123");

        assert_eq!(formatted_path, "/uploads/abc123");
    }
}
