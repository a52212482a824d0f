//! Terminal rendering of a ranked place list.

use crate::geo::{format_coords, format_distance, Coordinate};
use crate::utilities::{self, RankedPlace};
use crate::widgets::HorizontalLine;
use chrono::{DateTime, TimeZone};
use colored::Color;

/// Columns between the box borders.
const INNER: usize = 62;
const INDENT: &str = "  ";
const NAME_WIDTH: usize = 25;
const RATING_WIDTH: usize = 12;

/// A boxed table: rank, name, distance, Yelp rating and open state.
pub fn render_place_list<Tz: TimeZone>(places: &[RankedPlace<'_>], origin: Coordinate, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let rule = HorizontalLine::new(Color::BrightBlack).inset(1, INNER - 1);
    let border = "═".repeat(INNER);
    let mut out = String::new();

    out.push_str(&format!("{INDENT}Nearby from {}\n", format_coords(origin)));
    out.push_str(&format!("{INDENT}At {}\n", at.format("%a %Y-%m-%d %H:%M %Z")));
    out.push_str(&format!("{INDENT}╔{border}╗\n"));

    if places.is_empty() {
        out.push_str(&format!("{INDENT}║ {:<w$} ║\n", "No places nearby", w = INNER - 2));
    }

    for (i, ranked) in places.iter().enumerate() {
        let place = ranked.place;
        let rating = match (place.yelp_provider.rating, place.yelp_provider.total_review_count) {
            (Some(r), Some(n)) => format!("{:.1}\u{2605} ({})", r, n),
            (Some(r), None) => format!("{:.1}\u{2605}", r),
            _ => "—".to_string(),
        };
        let open_tag = match &place.hours {
            None => "hours ?",
            Some(_) if utilities::should_show_by_opening_hours(place, at) => "open",
            Some(_) => "closed",
        };
        out.push_str(&format!(
            "{INDENT}║ {:>2}. {:<name_w$} {:>9}  {:<rating_w$} {:<7}║\n",
            i + 1,
            truncate(&place.name, NAME_WIDTH),
            format_distance(ranked.distance_km),
            truncate(&rating, RATING_WIDTH),
            open_tag,
            name_w = NAME_WIDTH,
            rating_w = RATING_WIDTH,
        ));
        if i + 1 < places.len() {
            out.push_str(&format!("{INDENT}║{}║\n", rule.render(INNER)));
        }
    }

    out.push_str(&format!("{INDENT}╚{border}╝\n"));
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max - 1).collect();
        t.push('…');
        t
    }
}
