use maud::{html, Markup};

use super::{layout, PageContext, View};
use crate::earthquakes::SearchOutcome;

/// Outcome of a closest-earthquake search.
#[derive(Debug, Clone, Copy, Default)]
pub struct Results;

impl View for Results {
    fn name(&self) -> &'static str {
        "Results"
    }

    fn wants_search(&self) -> bool {
        true
    }

    fn render(&self, page: &PageContext<'_>) -> Markup {
        let range = match (page.query.get("start_date"), page.query.get("end_date")) {
            (Some(start), Some(end)) => Some(format!("{} to {}", start, end)),
            _ => None,
        };

        layout(
            page.title,
            html! {
                h1 { "Closest earthquake" }
                @if let Some(range) = range {
                    p .range { (range) }
                }
                @match page.search {
                    None => {
                        p { "Choose a city and a date range to search." }
                    }
                    Some(Ok(SearchOutcome::Found(quake))) => {
                        dl {
                            dt { "City" } dd { (quake.city) }
                            dt { "Magnitude" }
                            dd { @if let Some(mag) = quake.magnitude { (mag) } @else { "unknown" } }
                            dt { "Place" }
                            dd { @if let Some(place) = &quake.place { (place) } @else { "unknown" } }
                            dt { "Date" }
                            dd { @if let Some(date) = quake.date { (date.format("%Y-%m-%d %H:%M UTC").to_string()) } @else { "unknown" } }
                            dt { "Distance" } dd { (format!("{:.1} km", quake.distance_km)) }
                        }
                    }
                    Some(Ok(SearchOutcome::NoResults { message })) => {
                        p .empty { (message) }
                    }
                    Some(Err(message)) => {
                        p .error { (message) }
                    }
                }
                a href="/" { "New search" }
            },
        )
    }
}
