//! Place records as fetched from the remote database.

use super::hours::OpenHours;
use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};

/// Category labels, kept as parallel display-name / id lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Categories {
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub ids: Vec<String>,
}

impl Categories {
    pub fn new(names: Vec<String>, ids: Vec<String>) -> Self {
        Self { names, ids }
    }
}

/// Summary from a review site (Yelp, TripAdvisor).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewProvider {
    pub url: String,
    /// 0.0 to 5.0
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub total_review_count: Option<u32>,
}

impl ReviewProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), rating: None, total_review_count: None }
    }

    pub fn with_rating(url: impl Into<String>, rating: f32, total_review_count: u32) -> Self {
        Self {
            url: url.into(),
            rating: Some(rating),
            total_review_count: Some(total_review_count),
        }
    }
}

/// An immutable place record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    #[serde(rename = "coordinates")]
    pub lat_long: Coordinate,
    #[serde(default)]
    pub categories: Categories,
    pub yelp_provider: ReviewProvider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tripadvisor_provider: Option<ReviewProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<OpenHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photo_urls: Vec<String>,
}

impl Place {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        lat_long: Coordinate,
        categories: Categories,
        yelp_provider: ReviewProvider,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat_long,
            categories,
            yelp_provider,
            tripadvisor_provider: None,
            hours: None,
            address: None,
            url: None,
            photo_urls: Vec::new(),
        }
    }

    pub fn with_hours(mut self, hours: OpenHours) -> Self {
        self.hours = Some(hours);
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}
