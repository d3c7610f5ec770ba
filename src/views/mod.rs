//! Server-rendered page views.
//!
//! The route table only knows a view by identity; rendering gets everything
//! else through [`PageContext`].

use maud::{html, Markup, DOCTYPE};
use std::collections::HashMap;
use std::sync::Arc;

use crate::earthquakes::{City, SearchOutcome};
use crate::routing::Params;

mod home;
mod results;

pub use home::Home;
pub use results::Results;

/// A renderable page component.
pub trait View: Send + Sync + std::fmt::Debug {
    /// Component name, e.g. `"Home"`.
    fn name(&self) -> &'static str;

    /// Whether the page shows a search outcome for its query parameters.
    fn wants_search(&self) -> bool {
        false
    }

    fn render(&self, page: &PageContext<'_>) -> Markup;
}

/// Shared reference to a view, as stored in route definitions.
pub type ViewRef = Arc<dyn View>;

/// Data available while rendering a page.
#[derive(Debug)]
pub struct PageContext<'a> {
    pub title: &'a str,
    pub params: &'a Params,
    pub query: &'a HashMap<String, String>,
    pub cities: &'a [City],
    /// Outcome of the search named by the query, or a user-facing error.
    pub search: Option<&'a Result<SearchOutcome, String>>,
}

/// Page chrome shared by every view.
pub fn layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
            }
            body {
                header {
                    nav { a href="/" { "USGS Earthquake" } }
                }
                main { (content) }
            }
        }
    }
}

/// Page rendered when no route matches.
pub fn not_found(title: &str, path: &str) -> Markup {
    layout(
        title,
        html! {
            h1 { "Page not found" }
            p { "Nothing lives at " code { (path) } "." }
            a href="/" { "Back to search" }
        },
    )
}
