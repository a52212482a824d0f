//! Place ranking and visibility.
//!
//! Pure functions over place records: great-circle distance sort plus the
//! two display gates (rating/review count and opening hours).

use crate::geo::{self, Coordinate};
use crate::place::Place;
use chrono::{DateTime, Datelike, TimeZone};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_RATING: f32 = 2.5;
pub const DEFAULT_MIN_REVIEW_COUNT: u32 = 4;

/// Product thresholds for the rating/review-count gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilityThresholds {
    pub min_rating: f32,
    pub min_review_count: u32,
}

impl Default for VisibilityThresholds {
    fn default() -> Self {
        Self {
            min_rating: DEFAULT_MIN_RATING,
            min_review_count: DEFAULT_MIN_REVIEW_COUNT,
        }
    }
}

/// A place paired with its distance from the query origin.
#[derive(Debug, Clone, Serialize)]
pub struct RankedPlace<'a> {
    #[serde(flatten)]
    pub place: &'a Place,
    pub distance_km: f64,
}

/// Borrowing variant of [`sort`]: pairs every place with its distance and
/// orders by it. Ties keep input order in both directions.
pub fn rank<'a, I>(places: I, origin: Coordinate, ascending: bool) -> Vec<RankedPlace<'a>>
where
    I: IntoIterator<Item = &'a Place>,
{
    let mut ranked: Vec<RankedPlace<'a>> = places
        .into_iter()
        .map(|place| RankedPlace {
            distance_km: geo::distance_km(origin, place.lat_long),
            place,
        })
        .collect();

    if ascending {
        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    } else {
        ranked.sort_by(|a, b| b.distance_km.total_cmp(&a.distance_km));
    }
    ranked
}

/// Reorder `places` by distance from `origin`. The input is left untouched.
pub fn sort(places: &[Place], origin: Coordinate, ascending: bool) -> Vec<Place> {
    rank(places, origin, ascending)
        .into_iter()
        .map(|r| r.place.clone())
        .collect()
}

/// Rating/review-count gate with the default thresholds.
pub fn should_show_by_rating_and_review_count(place: &Place) -> bool {
    should_show_by_rating_and_review_count_with(place, &VisibilityThresholds::default())
}

/// Hidden only when both the rating and the review count are below their
/// thresholds. Missing values count as zero.
pub fn should_show_by_rating_and_review_count_with(place: &Place, thresholds: &VisibilityThresholds) -> bool {
    let rating = place.yelp_provider.rating.unwrap_or(0.0);
    let reviews = place.yelp_provider.total_review_count.unwrap_or(0);
    rating >= thresholds.min_rating || reviews >= thresholds.min_review_count
}

/// Opening-hours gate, evaluated in the time zone of `at`.
///
/// No hours table at all, or one with no weekdays in it: shown. Otherwise
/// shown only if `at` falls within a period listed for that weekday.
pub fn should_show_by_opening_hours<Tz: TimeZone>(place: &Place, at: &DateTime<Tz>) -> bool {
    match &place.hours {
        None => true,
        Some(hours) if hours.is_empty() => true,
        Some(hours) => hours.is_open_at(at.weekday(), at.time()),
    }
}

/// Both gates applied, input order kept.
pub fn filter_visible<'a, Tz: TimeZone>(
    places: &'a [Place],
    at: &DateTime<Tz>,
    thresholds: &VisibilityThresholds,
) -> Vec<&'a Place> {
    places
        .iter()
        .filter(|p| should_show_by_rating_and_review_count_with(p, thresholds))
        .filter(|p| should_show_by_opening_hours(p, at))
        .collect()
}

/// Visible places ranked by distance: the list a "nearby" screen shows.
pub fn nearby<'a, Tz: TimeZone>(
    places: &'a [Place],
    origin: Coordinate,
    at: &DateTime<Tz>,
    thresholds: &VisibilityThresholds,
    ascending: bool,
) -> Vec<RankedPlace<'a>> {
    rank(filter_visible(places, at, thresholds), origin, ascending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::place::{Categories, OpenHours, OpenPeriod, ReviewProvider};
    use chrono::{NaiveDate, Utc, Weekday};
    use chrono_tz::Tz;

    fn empty_categories() -> Categories {
        Categories::new(vec![String::new()], vec![String::new()])
    }

    fn origin() -> Coordinate {
        Coordinate::new(0.0, 0.0)
    }

    /// 2016-12-05 was a Monday.
    fn monday(hour: u32, min: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2016, 12, 5)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
            .and_utc()
    }

    fn place_with_rating(rating: f32, reviews: u32) -> Place {
        Place::new("id", "name", origin(), Categories::default(), ReviewProvider::with_rating("url", rating, reviews))
    }

    fn place_with_hours(hours: OpenHours) -> Place {
        Place::new("", "", origin(), Categories::default(), ReviewProvider::new("")).with_hours(hours)
    }

    fn monday_ten_to_eight() -> OpenHours {
        OpenHours::default().with_day(Weekday::Mon, vec![OpenPeriod::from_hm(10, 0, 20, 0).unwrap()])
    }

    fn london_places() -> Vec<Place> {
        let yelp = ReviewProvider::new("https://mozilla.org");
        vec![
            // London Bridge Station
            Place::new("1", "Place 1", Coordinate::new(51.5054704, -0.0943248), empty_categories(), yelp.clone()),
            // old Mozilla London office
            Place::new("2", "Place 2", Coordinate::new(51.5100773, -0.1257861), empty_categories(), yelp.clone()),
            // Kensington Palace
            Place::new("3", "Place 3", Coordinate::new(51.4998605, -0.177838), empty_categories(), yelp),
        ]
    }

    fn mozilla_london() -> Coordinate {
        Coordinate::new(51.5046323, -0.0992547)
    }

    fn ids(places: &[Place]) -> Vec<&str> {
        places.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_sorting_by_distance() {
        let places = london_places();

        let ascending = sort(&places, mozilla_london(), true);
        assert_eq!(ids(&ascending), vec!["1", "2", "3"]);

        let descending = sort(&places, mozilla_london(), false);
        assert_eq!(ids(&descending), vec!["3", "2", "1"]);

        // input untouched
        assert_eq!(ids(&places), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_sort_monotonic_from_arbitrary_origin() {
        let mut places = london_places();
        places.push(Place::new("4", "Paris", Coordinate::new(48.8566, 2.3522), Categories::default(), ReviewProvider::new("")));
        places.push(Place::new("5", "Oslo", Coordinate::new(59.9139, 10.7522), Categories::default(), ReviewProvider::new("")));
        let from = Coordinate::new(52.52, 13.405);

        let asc = rank(&places, from, true);
        assert!(asc.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));

        let desc = rank(&places, from, false);
        assert!(desc.windows(2).all(|w| w[0].distance_km >= w[1].distance_km));
    }

    #[test]
    fn test_sort_ties_keep_input_order() {
        let here = Coordinate::new(10.0, 10.0);
        let places: Vec<Place> = ["a", "b", "c"]
            .iter()
            .map(|id| Place::new(*id, *id, here, Categories::default(), ReviewProvider::new("")))
            .collect();

        assert_eq!(ids(&sort(&places, origin(), true)), vec!["a", "b", "c"]);
        assert_eq!(ids(&sort(&places, origin(), false)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sort_empty() {
        assert!(sort(&[], origin(), true).is_empty());
    }

    #[test]
    fn test_should_show_by_rating_and_review_count() {
        assert!(!should_show_by_rating_and_review_count(&place_with_rating(1.0, 3)));
        assert!(should_show_by_rating_and_review_count(&place_with_rating(5.0, 3634)));
    }

    #[test]
    fn test_either_threshold_is_enough() {
        assert!(should_show_by_rating_and_review_count(&place_with_rating(1.0, 500)));
        assert!(should_show_by_rating_and_review_count(&place_with_rating(4.5, 0)));
    }

    #[test]
    fn test_missing_review_data_counts_as_zero() {
        let place = Place::new("x", "x", origin(), Categories::default(), ReviewProvider::new("u"));
        assert!(!should_show_by_rating_and_review_count(&place));
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = VisibilityThresholds { min_rating: 4.8, min_review_count: 10_000 };
        assert!(!should_show_by_rating_and_review_count_with(&place_with_rating(4.5, 3634), &strict));
    }

    #[test]
    fn test_opening_hours_open_now() {
        let place = place_with_hours(monday_ten_to_eight());
        assert!(should_show_by_opening_hours(&place, &monday(12, 0)));
    }

    #[test]
    fn test_opening_hours_closed_now() {
        let place = place_with_hours(monday_ten_to_eight());
        assert!(!should_show_by_opening_hours(&place, &monday(9, 0)));
        assert!(!should_show_by_opening_hours(&place, &monday(20, 0)));
    }

    #[test]
    fn test_opening_hours_no_hours() {
        let place = Place::new("", "", origin(), Categories::default(), ReviewProvider::new(""));
        for hour in [0, 6, 12, 23] {
            assert!(should_show_by_opening_hours(&place, &monday(hour, 0)));
        }
    }

    #[test]
    fn test_opening_hours_no_hours_today() {
        let tuesday_only = OpenHours::default().with_day(Weekday::Tue, vec![OpenPeriod::from_hm(10, 0, 20, 0).unwrap()]);
        let place = place_with_hours(tuesday_only);
        assert!(!should_show_by_opening_hours(&place, &monday(10, 0)));
    }

    #[test]
    fn test_opening_hours_empty_day_list() {
        let place = place_with_hours(OpenHours::default().with_day(Weekday::Mon, vec![]));
        assert!(!should_show_by_opening_hours(&place, &monday(12, 0)));
    }

    #[test]
    fn test_opening_hours_empty_table_shows() {
        let place: Place = serde_json::from_value(serde_json::json!({
            "id": "9",
            "name": "No hours yet",
            "coordinates": { "lat": 51.5, "lon": -0.1 },
            "yelp_provider": { "url": "u" },
            "hours": {}
        }))
        .unwrap();
        assert!(place.hours.as_ref().is_some_and(OpenHours::is_empty));
        assert!(should_show_by_opening_hours(&place, &monday(3, 0)));
        assert!(should_show_by_opening_hours(&place, &monday(12, 0)));
    }

    #[test]
    fn test_opening_hours_uses_local_time_zone() {
        // 2016-12-05 23:30 UTC is Tuesday 08:30 in Tokyo.
        let tokyo: Tz = "Asia/Tokyo".parse().unwrap();
        let at = monday(23, 30).with_timezone(&tokyo);

        let tuesday_morning = OpenHours::default().with_day(Weekday::Tue, vec![OpenPeriod::from_hm(8, 0, 9, 0).unwrap()]);
        let place = place_with_hours(tuesday_morning);
        assert!(should_show_by_opening_hours(&place, &at));
        assert!(!should_show_by_opening_hours(&place, &monday(23, 30)));
    }

    #[test]
    fn test_nearby_filters_then_ranks() {
        let mut places = london_places();
        for p in places.iter_mut() {
            p.yelp_provider = ReviewProvider::with_rating("u", 4.0, 100);
        }
        // Place 2 is closed on Mondays at noon.
        places[1].hours = Some(OpenHours::default().with_day(Weekday::Mon, vec![OpenPeriod::from_hm(18, 0, 23, 0).unwrap()]));
        // Place 3 is poorly rated.
        places[2].yelp_provider = ReviewProvider::with_rating("u", 1.0, 1);

        let result = nearby(&places, mozilla_london(), &monday(12, 0), &VisibilityThresholds::default(), true);
        let result_ids: Vec<&str> = result.iter().map(|r| r.place.id.as_str()).collect();
        assert_eq!(result_ids, vec!["1"]);
        assert!(result[0].distance_km < 1.0);
    }
}
