//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered as out-of-band swaps into the `#alert-container`
//! element of the base layout so that HTMX requests can report their
//! outcome without replacing the page content.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// An alert message with its styling variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with extra details.
    #[allow(dead_code)]
    Success { message: String, details: String },
    /// A success message on its own.
    SuccessSimple { message: String },
    /// An error message with extra details.
    Error { message: String, details: String },
    /// An error message on its own.
    #[allow(dead_code)]
    ErrorSimple { message: String },
}

impl Alert {
    fn parts(&self) -> (bool, &str, &str) {
        match self {
            Alert::Success { message, details } => (true, message, details),
            Alert::SuccessSimple { message } => (true, message, ""),
            Alert::Error { message, details } => (false, message, details),
            Alert::ErrorSimple { message } => (false, message, ""),
        }
    }

    /// Render the alert as an out-of-band swap for `#alert-container`.
    pub fn into_markup(self) -> Markup {
        let (is_success, message, details) = self.parts();

        let style = if is_success {
            "flex items-start gap-3 p-4 text-sm text-green-800 rounded-lg bg-green-50 \
            border border-green-300 dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
        } else {
            "flex items-start gap-3 p-4 text-sm text-red-800 rounded-lg bg-red-50 \
            border border-red-300 dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(style) role="alert"
                {
                    div class="flex-1"
                    {
                        p class="font-medium" { (message) }

                        @if !details.is_empty() {
                            p class="mt-1" { (details) }
                        }
                    }

                    button
                        type="button"
                        class="ms-auto font-bold"
                        aria-label="Close"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "×"
                    }
                }
            }
        }
    }

    /// Render the alert as an HTML response body.
    pub fn into_html(self) -> Html<String> {
        Html(self.into_markup().into_string())
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
