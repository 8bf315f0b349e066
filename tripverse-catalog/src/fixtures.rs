//! Demo data served when no backend is configured.

use serde_json::{json, Value};
use tripverse_shared::{FlightDetails, PackageDetails, ResultKind, SearchResult, SearchType};

const IMG: &str = "?q=80&w=1740&auto=format&fit=crop&ixlib=rb-4.0.3";

fn image(photo: &str) -> Option<String> {
    Some(format!("https://images.unsplash.com/{}{}", photo, IMG))
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn hotels() -> Vec<SearchResult> {
    vec![
        SearchResult {
            location: Some("Bali, Indonesia".to_string()),
            price: Some(250.0),
            rating: Some(4.8),
            image: image("photo-1571896349842-33c89424de2d"),
            amenities: strings(&["Pool", "Spa", "WiFi", "Restaurant"]),
            description: Some(
                "Experience unparalleled luxury at our 5-star resort with stunning ocean views."
                    .to_string(),
            ),
            ..SearchResult::new("hotel-1", ResultKind::Hotel, "Luxury Resort & Spa")
        },
        SearchResult {
            location: Some("Swiss Alps, Switzerland".to_string()),
            price: Some(180.0),
            rating: Some(4.5),
            image: image("photo-1566073771259-6a8506099945"),
            amenities: strings(&["Ski-in/Ski-out", "Fireplace", "Hot Tub"]),
            description: Some(
                "Cozy mountain lodge with breathtaking alpine views and premium amenities."
                    .to_string(),
            ),
            ..SearchResult::new("hotel-2", ResultKind::Hotel, "Mountain View Lodge")
        },
        SearchResult {
            location: Some("Paris, France".to_string()),
            price: Some(220.0),
            rating: Some(4.7),
            image: image("photo-1551882547-ff40c63fe5fa"),
            amenities: strings(&["City View", "Bar", "Fine Dining"]),
            description: Some(
                "Stylish boutique hotel in the heart of Paris, steps from major attractions."
                    .to_string(),
            ),
            ..SearchResult::new("hotel-3", ResultKind::Hotel, "Urban Boutique Hotel")
        },
    ]
}

pub fn flights() -> Vec<SearchResult> {
    vec![
        SearchResult {
            price: Some(850.0),
            image: image("photo-1569154941061-e231b4725ef1"),
            flight: Some(FlightDetails {
                origin: "New York (JFK)".to_string(),
                destination: "London (LHR)".to_string(),
                depart_date: "2023-07-15".to_string(),
                return_date: Some("2023-07-22".to_string()),
                airline: "Premium Airlines".to_string(),
                duration: "7h 15m".to_string(),
            }),
            ..SearchResult::new("flight-1", ResultKind::Flight, "Premium Airlines Flight 101")
        },
        SearchResult {
            price: Some(1200.0),
            image: image("photo-1542558848-25f6fceb17e7"),
            flight: Some(FlightDetails {
                origin: "Los Angeles (LAX)".to_string(),
                destination: "Tokyo (HND)".to_string(),
                depart_date: "2023-08-10".to_string(),
                return_date: Some("2023-08-24".to_string()),
                airline: "Skyway Express".to_string(),
                duration: "11h 45m".to_string(),
            }),
            ..SearchResult::new("flight-2", ResultKind::Flight, "Skyway Express Flight 202")
        },
    ]
}

pub fn packages() -> Vec<SearchResult> {
    vec![
        SearchResult {
            location: Some("Maldives".to_string()),
            price: Some(2950.0),
            rating: Some(4.9),
            image: image("photo-1573843981267-be1999ff37cd"),
            description: Some(
                "Enjoy a week in paradise with this all-inclusive Maldives package.".to_string(),
            ),
            package: Some(PackageDetails {
                duration: "7 Days".to_string(),
                group_size: "Up to 8 people".to_string(),
                start_date: "Flexible".to_string(),
                features: strings(&["All-Inclusive", "Snorkeling", "Private Villa"]),
                discount: None,
            }),
            ..SearchResult::new("package-1", ResultKind::Package, "Tropical Paradise Getaway")
        },
        SearchResult {
            location: Some("Italy, France, Spain".to_string()),
            price: Some(3200.0),
            rating: Some(4.7),
            image: image("photo-1499856871958-5b9627545d1a"),
            description: Some(
                "Experience the best of European culture with this comprehensive tour package."
                    .to_string(),
            ),
            package: Some(PackageDetails {
                duration: "12 Days".to_string(),
                group_size: "10-15 people".to_string(),
                start_date: "Monthly departures".to_string(),
                features: strings(&["Guided Tours", "Premium Hotels", "Transportation"]),
                discount: None,
            }),
            ..SearchResult::new("package-2", ResultKind::Package, "European Cultural Tour")
        },
    ]
}

pub fn destinations() -> Vec<SearchResult> {
    [
        ("destination-1", "Santorini", "Greece", "photo-1570077188670-e3a8d69ac5ff",
         "Famous for its stunning caldera, whitewashed buildings, and sunsets."),
        ("destination-2", "Kyoto", "Japan", "photo-1624253321171-1be53e12f5f4",
         "Historic city known for its classical Buddhist temples and gardens."),
        ("destination-3", "Machu Picchu", "Peru", "photo-1587595431973-160d0d94add1",
         "Ancient Incan citadel set high in the Andes Mountains."),
        ("destination-4", "Serengeti", "Tanzania", "photo-1516426122078-c23e76319801",
         "Home to the great wildlife migration and stunning savanna landscapes."),
    ]
    .into_iter()
    .zip([4.9, 4.8, 4.9, 4.9])
    .map(|((id, name, location, photo, description), rating)| SearchResult {
        location: Some(location.to_string()),
        rating: Some(rating),
        image: image(photo),
        description: Some(description.to_string()),
        ..SearchResult::new(id, ResultKind::Destination, name)
    })
    .collect()
}

pub fn guides() -> Vec<SearchResult> {
    vec![
        SearchResult {
            location: Some("Rome, Italy".to_string()),
            rating: Some(4.9),
            image: image("photo-1545167622-3a6ac756afa4"),
            description: Some(
                "Expert in Roman history with 10 years of experience leading tours in Italy."
                    .to_string(),
            ),
            ..SearchResult::new("guide-1", ResultKind::Guide, "Alex Johnson")
        },
        SearchResult {
            location: Some("Barcelona, Spain".to_string()),
            rating: Some(4.8),
            image: image("photo-1580489944761-15a19d654956"),
            description: Some(
                "Passionate local guide specializing in Gaudi architecture and Spanish culture."
                    .to_string(),
            ),
            ..SearchResult::new("guide-2", ResultKind::Guide, "Sofia Garcia")
        },
    ]
}

pub fn pool(search_type: SearchType) -> Vec<SearchResult> {
    match search_type {
        SearchType::Hotels => hotels(),
        SearchType::Flights => flights(),
        SearchType::Packages => packages(),
        SearchType::Destinations => destinations(),
        SearchType::Guides => guides(),
    }
}

/// `users` profile rows matching the demo identities of `MemoryIdentityProvider::with_demo_accounts`.
pub fn user_profiles() -> Vec<Value> {
    vec![
        json!({
            "id": "1",
            "email": "customer@example.com",
            "first_name": "John",
            "last_name": "Doe",
            "role": "customer",
            "avatar_url": "https://images.unsplash.com/photo-1599566150163-29194dcaad36?q=80&w=1374&auto=format&fit=crop&ixlib=rb-4.0.3"
        }),
        json!({
            "id": "2",
            "email": "agent@example.com",
            "first_name": "Sarah",
            "last_name": "Smith",
            "role": "agent",
            "avatar_url": "https://images.unsplash.com/photo-1580489944761-15a19d654956?q=80&w=1522&auto=format&fit=crop&ixlib=rb-4.0.3"
        }),
        json!({
            "id": "3",
            "email": "staff@example.com",
            "first_name": "Michael",
            "last_name": "Johnson",
            "role": "hotel_staff",
            "avatar_url": "https://images.unsplash.com/photo-1560250097-0b93528c311a?q=80&w=1374&auto=format&fit=crop&ixlib=rb-4.0.3"
        }),
    ]
}

/// `destinations` rows for the landing-page feed.
pub fn destination_rows() -> Vec<Value> {
    [
        ("dest-1", "Santorini", "Greece", "photo-1570077188670-e3a8d69ac5ff", 4.9,
         "Famous for its stunning caldera, whitewashed buildings, and sunsets."),
        ("dest-2", "Bali", "Indonesia", "photo-1537996194471-e657df975ab4", 4.8,
         "Beautiful beaches, lush rice terraces, and vibrant cultural experiences."),
        ("dest-3", "Tokyo", "Japan", "photo-1540959733332-eab4deabeeaf", 4.7,
         "An ultramodern city with traditional temples and gardens."),
        ("dest-4", "Swiss Alps", "Switzerland", "photo-1491555103944-7c647fd857e6", 4.9,
         "Majestic mountains, pristine lakes, and charming villages."),
    ]
    .into_iter()
    .map(|(id, name, location, photo, rating, description)| {
        json!({
            "id": id,
            "name": name,
            "location": location,
            "image_url": image(photo),
            "rating": rating,
            "description": description,
        })
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pools_are_disjoint_by_kind() {
        for search_type in SearchType::ALL {
            let results = pool(search_type);
            assert!(!results.is_empty());
            assert!(results.iter().all(|r| r.kind == search_type.result_kind()));
        }
    }

    #[test]
    fn test_flights_have_details_but_no_rating() {
        assert!(flights().iter().all(|f| f.flight.is_some() && f.rating.is_none()));
    }
}
