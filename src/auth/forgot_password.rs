use axum::{response::IntoResponse, response::Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{base, link, log_in_register},
};

fn forgot_password_template() -> Markup {
    let content = html! {
        p class="text-justify text-gray-900 dark:text-white"
        {
            "Passwords are reset by whoever runs this server. Ask them to run
            the 'reset_password' program with your email address and the path
            to the database file, e.g. "
            code { "reset_password --db-path app.db --email you@example.com" }
            "."
        }

        p class="text-gray-900 dark:text-white"
        {
            "Remembered it? "
            (link(endpoints::LOG_IN_VIEW, "Log in here"))
        }
    };

    base(
        "Forgot Password",
        &[],
        &log_in_register("Forgot your password?", &content),
    )
}

/// Renders a page describing how the user's password can be reset.
pub async fn get_forgot_password_page() -> Response {
    forgot_password_template().into_response()
}
