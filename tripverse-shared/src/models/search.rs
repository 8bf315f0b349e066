use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Which pool a search draws its candidates from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Hotels,
    Flights,
    Packages,
    Destinations,
    Guides,
}

impl SearchType {
    /// Union order used when a request carries no search type.
    pub const ALL: [SearchType; 5] = [
        SearchType::Hotels,
        SearchType::Flights,
        SearchType::Packages,
        SearchType::Destinations,
        SearchType::Guides,
    ];

    /// Singular kind of the results drawn from this pool.
    pub fn result_kind(self) -> ResultKind {
        match self {
            SearchType::Hotels => ResultKind::Hotel,
            SearchType::Flights => ResultKind::Flight,
            SearchType::Packages => ResultKind::Package,
            SearchType::Destinations => ResultKind::Destination,
            SearchType::Guides => ResultKind::Guide,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::Hotels => "hotels",
            SearchType::Flights => "flights",
            SearchType::Packages => "packages",
            SearchType::Destinations => "destinations",
            SearchType::Guides => "guides",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Hotel,
    Flight,
    Package,
    Destination,
    Guide,
}

/// A submitted search. A new request replaces the previous one wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_type: Option<SearchType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depart_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guests: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passengers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub amenities: BTreeSet<String>,
}

impl SearchRequest {
    pub fn of_type(search_type: SearchType) -> Self {
        Self {
            search_type: Some(search_type),
            ..Self::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }
}

/// Flight-only fields of a result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightDetails {
    pub origin: String,
    pub destination: String,
    pub depart_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    pub airline: String,
    pub duration: String,
}

/// Package-only fields of a result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackageDetails {
    pub duration: String,
    pub group_size: String,
    pub start_date: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
}

/// Read-only projection of a searchable record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResultKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amenities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight: Option<FlightDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageDetails>,
}

impl SearchResult {
    pub fn new(id: impl Into<String>, kind: ResultKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            location: None,
            price: None,
            rating: None,
            image: None,
            description: None,
            amenities: Vec::new(),
            flight: None,
            package: None,
        }
    }

    /// Arrival side of a flight result, matched by location searches.
    pub fn destination(&self) -> Option<&str> {
        self.flight.as_ref().map(|f| f.destination.as_str())
    }
}
