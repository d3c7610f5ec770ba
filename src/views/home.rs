use maud::{html, Markup};

use super::{layout, PageContext, View};

/// Search form: pick a city and a date range.
#[derive(Debug, Clone, Copy, Default)]
pub struct Home;

impl View for Home {
    fn name(&self) -> &'static str {
        "Home"
    }

    fn render(&self, page: &PageContext<'_>) -> Markup {
        layout(
            page.title,
            html! {
                h1 { (page.title) }
                @if page.cities.is_empty() {
                    p .empty { "No cities registered yet." }
                } @else {
                    form method="get" action="/results" {
                        label for="city_id" { "City" }
                        select #city_id name="city_id" required {
                            @for city in page.cities {
                                option value=(city.id) { (city.name) }
                            }
                        }
                        label for="start_date" { "Start date" }
                        input #start_date type="date" name="start_date" required;
                        label for="end_date" { "End date" }
                        input #end_date type="date" name="end_date" required;
                        button type="submit" { "Search" }
                    }
                }
            },
        )
    }
}
