//! The alert partial swapped into the out-of-band container by HTMX error
//! responses.

use maud::{Markup, html};

/// Render an error alert with a headline and an explanation of how to fix it.
pub(crate) fn error_alert(message: &str, details: &str) -> Markup {
    html! {
        div
            class="flex items-start p-4 mb-4 text-red-800 rounded-lg bg-red-50
                dark:bg-gray-800 dark:text-red-400 border border-red-300
                dark:border-red-800 shadow"
            role="alert"
        {
            div class="ms-2 text-sm"
            {
                span class="font-semibold" { (message) }

                @if !details.is_empty() {
                    p { (details) }
                }
            }

            button
                type="button"
                class="ms-auto -mx-1.5 -my-1.5 bg-red-50 text-red-500 rounded-lg
                    p-1.5 hover:bg-red-200 inline-flex items-center justify-center
                    h-8 w-8 dark:bg-gray-800 dark:text-red-400 dark:hover:bg-gray-700"
                aria-label="Close"
                onclick="this.parentElement.remove()"
            {
                "\u{2715}"
            }
        }
    }
}
