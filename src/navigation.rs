//! The site header, plus a tab bar pinned to the bottom of the screen on phones.

use maud::{Markup, html};

use crate::endpoints;

/// A page that is reachable from the navigation bar.
struct Destination {
    url: &'static str,
    label: &'static str,
}

/// The pages in the order they appear, on every screen size.
const DESTINATIONS: [Destination; 5] = [
    Destination {
        url: endpoints::DASHBOARD_VIEW,
        label: "Dashboard",
    },
    Destination {
        url: endpoints::BUDGET_VIEW,
        label: "Budget",
    },
    Destination {
        url: endpoints::NEW_PAYABLE_VIEW,
        label: "Pay",
    },
    Destination {
        url: endpoints::NEW_RECEIVABLE_VIEW,
        label: "Fund",
    },
    Destination {
        url: endpoints::EXPORT_VIEW,
        label: "Export",
    },
];

const HEADER_LINK_STYLE: &str = "block py-2 px-3 rounded-sm lg:p-0 text-gray-900 \
    hover:bg-gray-100 lg:hover:bg-transparent lg:hover:text-blue-700 \
    dark:text-white dark:hover:bg-gray-700 lg:dark:hover:bg-transparent \
    lg:dark:hover:text-blue-500";

const HEADER_CURRENT_LINK_STYLE: &str = "block py-2 px-3 rounded-sm lg:p-0 text-white \
    bg-blue-700 lg:bg-transparent lg:text-blue-700 dark:text-white lg:dark:text-blue-500";

const TAB_STYLE: &str = "flex items-center justify-center rounded-lg px-1 py-2 \
    text-xs font-semibold text-gray-600 hover:bg-blue-50/70 hover:text-blue-700 \
    dark:text-gray-300 dark:hover:bg-blue-900/20 dark:hover:text-blue-200";

const TAB_CURRENT_STYLE: &str = "flex items-center justify-center rounded-lg px-1 py-2 \
    text-xs font-semibold bg-blue-50 text-blue-700 shadow-sm \
    dark:bg-blue-900/30 dark:text-blue-200";

/// The navigation bar for a page, highlighting the page's own link.
pub struct NavBar {
    current: Option<&'static str>,
}

impl NavBar {
    /// Create the navigation bar for the page served at `current_endpoint`.
    ///
    /// Pages that are not in the bar, e.g. an edit page, highlight nothing.
    pub fn new(current_endpoint: &str) -> Self {
        let current = DESTINATIONS
            .iter()
            .find(|destination| destination.url == current_endpoint)
            .map(|destination| destination.url);

        Self { current }
    }

    fn is_current(&self, destination: &Destination) -> bool {
        self.current == Some(destination.url)
    }

    pub fn into_html(self) -> Markup {
        // Header layout adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a href=(endpoints::ROOT) class="flex items-center space-x-3"
                    {
                        img src="/static/favicon-128x128.png" alt="Payledger Logo" class="h-8";

                        span class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Payledger"
                        }
                    }

                    ul class="hidden lg:flex lg:items-center lg:space-x-8 font-medium"
                    {
                        @for destination in &DESTINATIONS {
                            @let is_current = self.is_current(destination);
                            li {
                                a
                                    href=(destination.url)
                                    class=(if is_current { HEADER_CURRENT_LINK_STYLE } else { HEADER_LINK_STYLE })
                                    aria-current=[is_current.then_some("page")]
                                {
                                    (destination.label)
                                }
                            }
                        }

                        li { a href=(endpoints::LOG_OUT) class=(HEADER_LINK_STYLE) { "Log out" } }
                    }

                    a href=(endpoints::LOG_OUT) class={ "lg:hidden " (HEADER_LINK_STYLE) } { "Log out" }
                }
            }

            nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden" aria-label="Primary"
            {
                ul
                    class="mx-4 mb-4 grid grid-cols-5 gap-1 rounded-xl border border-gray-200
                    bg-white/95 p-2 shadow-lg backdrop-blur dark:border-gray-700 dark:bg-gray-900/95"
                {
                    @for destination in &DESTINATIONS {
                        @let is_current = self.is_current(destination);
                        li class="min-w-0" {
                            a
                                href=(destination.url)
                                class=(if is_current { TAB_CURRENT_STYLE } else { TAB_STYLE })
                                aria-current=[is_current.then_some("page")]
                            {
                                span class="truncate" { (destination.label) }
                            }
                        }
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use scraper::{Html, Selector};

    use crate::{endpoints, navigation::NavBar};

    fn current_links(endpoint: &str) -> Vec<String> {
        let html = Html::parse_fragment(&NavBar::new(endpoint).into_html().into_string());

        html.select(&Selector::parse("a[aria-current=page]").unwrap())
            .filter_map(|link| link.value().attr("href").map(str::to_owned))
            .collect()
    }

    #[test]
    fn pages_in_the_bar_are_highlighted_in_header_and_tab_bar() {
        for endpoint in [
            endpoints::DASHBOARD_VIEW,
            endpoints::BUDGET_VIEW,
            endpoints::NEW_PAYABLE_VIEW,
            endpoints::NEW_RECEIVABLE_VIEW,
            endpoints::EXPORT_VIEW,
        ] {
            assert_eq!(
                current_links(endpoint),
                vec![endpoint.to_owned(), endpoint.to_owned()],
                "{endpoint} should be highlighted once in each bar"
            );
        }
    }

    #[test]
    fn other_pages_highlight_nothing() {
        for endpoint in [
            endpoints::ROOT,
            endpoints::NEW_GROUP_VIEW,
            endpoints::GROUPS_API,
            endpoints::INTERNAL_ERROR_VIEW,
            endpoints::LOG_IN_VIEW,
            endpoints::LOG_OUT,
            endpoints::REGISTER_VIEW,
            endpoints::PAYABLES_API,
        ] {
            assert!(current_links(endpoint).is_empty(), "{endpoint} should not be highlighted");
        }
    }

    #[test]
    fn every_page_is_linked_on_small_screens() {
        let html = Html::parse_fragment(&NavBar::new(endpoints::DASHBOARD_VIEW).into_html().into_string());

        let tabs: Vec<String> = html
            .select(&Selector::parse("nav[aria-label=Primary] a").unwrap())
            .map(|link| link.text().collect())
            .collect();

        assert_eq!(tabs, vec!["Dashboard", "Budget", "Pay", "Fund", "Export"]);
    }
}
