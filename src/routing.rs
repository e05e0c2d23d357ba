//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_forgot_password_page, get_log_in_page, get_log_out,
        get_register_page, post_log_in, register_user,
    },
    dashboard::get_dashboard_page,
    endpoints,
    export::{download_export, get_export_page},
    group::{
        create_group_endpoint, delete_group_endpoint, get_budget_page, get_edit_group_page,
        get_new_group_page, swap_group_order_endpoint, update_group_endpoint,
    },
    internal_server_error::get_internal_server_error_page,
    ledger::{
        create_payable_endpoint, create_receivable_endpoint, delete_payable_endpoint,
        delete_receivable_endpoint, get_edit_payable_page, get_edit_receivable_page,
        get_new_payable_page, get_new_receivable_page, update_payable_endpoint,
        update_receivable_endpoint,
    },
    not_found::get_404_not_found,
    split::{
        create_split_endpoint, delete_split_endpoint, get_edit_split_page, get_new_split_page,
        update_split_endpoint,
    },
    upload::{get_uploaded_file, upload_file_endpoint},
};

/// Room for the multipart boundaries and headers around an uploaded file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(
            endpoints::FORGOT_PASSWORD_VIEW,
            get(get_forgot_password_page),
        )
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::BUDGET_VIEW, get(get_budget_page))
        .route(endpoints::NEW_GROUP_VIEW, get(get_new_group_page))
        .route(endpoints::EDIT_GROUP_VIEW, get(get_edit_group_page))
        .route(endpoints::NEW_SPLIT_VIEW, get(get_new_split_page))
        .route(endpoints::EDIT_SPLIT_VIEW, get(get_edit_split_page))
        .route(endpoints::NEW_PAYABLE_VIEW, get(get_new_payable_page))
        .route(endpoints::EDIT_PAYABLE_VIEW, get(get_edit_payable_page))
        .route(endpoints::NEW_RECEIVABLE_VIEW, get(get_new_receivable_page))
        .route(endpoints::EDIT_RECEIVABLE_VIEW, get(get_edit_receivable_page))
        .route(endpoints::EXPORT_VIEW, get(get_export_page))
        // A plain form post that downloads a file, so it redirects like a page.
        .route(endpoints::EXPORT_DOWNLOAD, post(download_export))
        .route(endpoints::UPLOADED_FILE, get(get_uploaded_file))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    let upload_body_limit =
        DefaultBodyLimit::max(state.upload_config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES);

    // These POST/PUT/DELETE routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::GROUPS_API, post(create_group_endpoint))
            .route(
                endpoints::GROUP_API,
                put(update_group_endpoint).delete(delete_group_endpoint),
            )
            .route(endpoints::GROUP_ORDER_API, put(swap_group_order_endpoint))
            .route(endpoints::SPLITS_API, post(create_split_endpoint))
            .route(
                endpoints::SPLIT_API,
                put(update_split_endpoint).delete(delete_split_endpoint),
            )
            .route(endpoints::PAYABLES_API, post(create_payable_endpoint))
            .route(
                endpoints::PAYABLE_API,
                put(update_payable_endpoint).delete(delete_payable_endpoint),
            )
            .route(endpoints::RECEIVABLES_API, post(create_receivable_endpoint))
            .route(
                endpoints::RECEIVABLE_API,
                put(update_receivable_endpoint).delete(delete_receivable_endpoint),
            )
            .route(
                endpoints::UPLOADS_API,
                post(upload_file_endpoint).layer(upload_body_limit),
            )
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
