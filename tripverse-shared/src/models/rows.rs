//! Row shapes of the hosted backend's tables, and their projection into search results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::search::{FlightDetails, PackageDetails, ResultKind, SearchResult};
use crate::models::user::UserRole;

pub const USERS: &str = "users";
pub const DESTINATIONS: &str = "destinations";
pub const HOTELS: &str = "hotels";
pub const FLIGHTS: &str = "flights";
pub const PACKAGES: &str = "packages";
pub const BOOKINGS: &str = "bookings";
pub const NEWSLETTER_SUBSCRIBERS: &str = "newsletter_subscribers";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfileRow {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DestinationRow {
    pub id: String,
    pub name: String,
    pub location: String,
    pub image_url: String,
    #[serde(default)]
    pub description: Option<String>,
    pub rating: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotelRow {
    pub id: String,
    pub name: String,
    pub location: String,
    pub image_url: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_per_night: f64,
    pub rating: f64,
    #[serde(default)]
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlightRow {
    pub id: String,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    #[serde(default)]
    pub return_date: Option<String>,
    pub price: f64,
    pub flight_duration: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageRow {
    pub id: String,
    pub title: String,
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub discount: Option<f64>,
    pub duration: String,
    pub group_size: String,
    pub start_date: String,
    pub image_url: String,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    Hotel,
    Flight,
    Package,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingRow {
    pub id: String,
    pub user_id: String,
    pub booking_type: BookingType,
    pub item_id: String,
    pub status: BookingStatus,
    pub amount: f64,
    pub booking_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsletterSubscriberRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
}

impl From<HotelRow> for SearchResult {
    fn from(row: HotelRow) -> Self {
        SearchResult {
            location: Some(row.location),
            price: Some(row.price_per_night),
            rating: Some(row.rating),
            image: Some(row.image_url),
            description: row.description,
            amenities: row.amenities,
            ..SearchResult::new(row.id, ResultKind::Hotel, row.name)
        }
    }
}

impl From<FlightRow> for SearchResult {
    fn from(row: FlightRow) -> Self {
        let name = format!("{}: {} to {}", row.airline, row.origin, row.destination);
        SearchResult {
            price: Some(row.price),
            image: Some(row.image_url),
            flight: Some(FlightDetails {
                origin: row.origin,
                destination: row.destination,
                depart_date: row.departure_date,
                return_date: row.return_date,
                airline: row.airline,
                duration: row.flight_duration,
            }),
            ..SearchResult::new(row.id, ResultKind::Flight, name)
        }
    }
}

impl From<PackageRow> for SearchResult {
    fn from(row: PackageRow) -> Self {
        SearchResult {
            location: Some(row.location),
            price: Some(row.price),
            image: Some(row.image_url),
            description: row.description,
            package: Some(PackageDetails {
                duration: row.duration,
                group_size: row.group_size,
                start_date: row.start_date,
                features: row.features,
                discount: row.discount,
            }),
            ..SearchResult::new(row.id, ResultKind::Package, row.title)
        }
    }
}

impl From<DestinationRow> for SearchResult {
    fn from(row: DestinationRow) -> Self {
        SearchResult {
            location: Some(row.location),
            rating: Some(row.rating),
            image: Some(row.image_url),
            description: row.description,
            ..SearchResult::new(row.id, ResultKind::Destination, row.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hotel_row_projection() {
        let row: HotelRow = serde_json::from_value(serde_json::json!({
            "id": "h-1",
            "name": "Mountain View Lodge",
            "location": "Swiss Alps, Switzerland",
            "image_url": "https://img/h-1",
            "description": "Cozy lodge",
            "price_per_night": 180,
            "rating": 4.5,
            "amenities": ["Fireplace"],
            "created_at": "2024-01-01T00:00:00+00:00"
        }))
        .unwrap();
        let result = SearchResult::from(row);
        assert_eq!(result.kind, ResultKind::Hotel);
        assert_eq!(result.price, Some(180.0));
        assert_eq!(result.amenities, vec!["Fireplace".to_string()]);
    }

    #[test]
    fn test_flight_row_projection_keeps_destination() {
        let row = FlightRow {
            id: "f-1".to_string(),
            airline: "Skyway Express".to_string(),
            origin: "Los Angeles (LAX)".to_string(),
            destination: "Tokyo (HND)".to_string(),
            departure_date: "2023-08-10".to_string(),
            return_date: None,
            price: 1200.0,
            flight_duration: "11h 45m".to_string(),
            image_url: "https://img/f-1".to_string(),
        };
        let result = SearchResult::from(row);
        assert_eq!(result.destination(), Some("Tokyo (HND)"));
        assert!(result.location.is_none());
        assert!(result.rating.is_none());
    }

    #[test]
    fn test_profile_row_without_timestamps() {
        let row: UserProfileRow = serde_json::from_value(serde_json::json!({
            "id": "u-1",
            "email": "a@b.com",
            "first_name": "A",
            "last_name": "B",
            "role": "hotel_staff"
        }))
        .unwrap();
        assert_eq!(row.role, UserRole::HotelStaff);
        assert!(row.created_at.is_none());
    }
}
