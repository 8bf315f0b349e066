use tripverse_shared::{SearchRequest, SearchResult};

/// Narrow a candidate set by the request's secondary filters.
///
/// Filters run in order (location, price, rating) and compose as AND. Source
/// order is kept and nothing is deduplicated. An empty location or a zero
/// rating floor means "no filter", the same as leaving the field unset.
pub fn apply_filters(candidates: Vec<SearchResult>, request: &SearchRequest) -> Vec<SearchResult> {
    let location = request
        .location
        .as_deref()
        .filter(|l| !l.is_empty())
        .map(str::to_lowercase);
    let rating_floor = request.rating.filter(|r| *r > 0.0);

    candidates
        .into_iter()
        .filter(|result| {
            location
                .as_deref()
                .map_or(true, |needle| matches_location(result, needle))
        })
        .filter(|result| within_price(result, request.min_price, request.max_price))
        .filter(|result| rating_floor.map_or(true, |floor| meets_rating(result, floor)))
        .collect()
}

/// `needle` is already lowercased.
fn matches_location(result: &SearchResult, needle: &str) -> bool {
    let contains = |field: Option<&str>| {
        field
            .map(|value| value.to_lowercase().contains(needle))
            .unwrap_or(false)
    };
    contains(result.location.as_deref()) || contains(result.destination())
}

fn within_price(result: &SearchResult, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    match result.price {
        Some(price) => min.map_or(true, |m| price >= m) && max.map_or(true, |m| price <= m),
        None => false,
    }
}

fn meets_rating(result: &SearchResult, floor: f64) -> bool {
    result.rating.map_or(false, |rating| rating >= floor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripverse_shared::{FlightDetails, ResultKind, SearchType};

    fn hotel(id: &str, location: &str, price: Option<f64>, rating: Option<f64>) -> SearchResult {
        SearchResult {
            location: Some(location.to_string()),
            price,
            rating,
            ..SearchResult::new(id, ResultKind::Hotel, id)
        }
    }

    fn flight(id: &str, destination: &str, price: f64) -> SearchResult {
        SearchResult {
            price: Some(price),
            flight: Some(FlightDetails {
                origin: "New York (JFK)".to_string(),
                destination: destination.to_string(),
                depart_date: "2023-07-15".to_string(),
                return_date: None,
                airline: "Premium Airlines".to_string(),
                duration: "7h 15m".to_string(),
            }),
            ..SearchResult::new(id, ResultKind::Flight, id)
        }
    }

    fn ids(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let pool = vec![
            hotel("a", "Bali", Some(180.0), Some(4.5)),
            hotel("b", "Paris", Some(220.0), Some(4.7)),
            hotel("c", "Rome", Some(600.0), Some(4.9)),
        ];
        let request = SearchRequest::of_type(SearchType::Hotels)
            .with_price_range(Some(100.0), Some(300.0));
        assert_eq!(ids(&apply_filters(pool.clone(), &request)), vec!["a", "b"]);

        let exact = SearchRequest::default().with_price_range(Some(220.0), Some(220.0));
        assert_eq!(ids(&apply_filters(pool.clone(), &exact)), vec!["b"]);

        let none = SearchRequest::default().with_price_range(Some(221.0), Some(221.0));
        assert!(apply_filters(pool, &none).is_empty());
    }

    #[test]
    fn test_single_bound_excludes_missing_price() {
        let pool = vec![
            hotel("priced", "Bali", Some(50.0), None),
            hotel("unpriced", "Bali", None, None),
        ];
        let min_only = SearchRequest::default().with_price_range(Some(0.0), None);
        assert_eq!(ids(&apply_filters(pool.clone(), &min_only)), vec!["priced"]);

        let max_only = SearchRequest::default().with_price_range(None, Some(10.0));
        assert!(apply_filters(pool.clone(), &max_only).is_empty());

        assert_eq!(apply_filters(pool, &SearchRequest::default()).len(), 2);
    }

    #[test]
    fn test_location_matches_location_or_flight_destination() {
        let pool = vec![
            hotel("lodge", "Swiss Alps, Switzerland", Some(180.0), Some(4.5)),
            flight("jfk-lhr", "London (LHR)", 850.0),
            hotel("paris", "Paris, France", Some(220.0), Some(4.7)),
        ];
        let swiss = SearchRequest::default().with_location("SWISS");
        assert_eq!(ids(&apply_filters(pool.clone(), &swiss)), vec!["lodge"]);

        let london = SearchRequest::default().with_location("london");
        assert_eq!(ids(&apply_filters(pool.clone(), &london)), vec!["jfk-lhr"]);

        let blank = SearchRequest::default().with_location("");
        assert_eq!(apply_filters(pool, &blank).len(), 3);
    }

    #[test]
    fn test_rating_floor_excludes_unrated() {
        let pool = vec![
            hotel("high", "Bali", Some(1.0), Some(4.8)),
            hotel("low", "Bali", Some(1.0), Some(4.5)),
            flight("unrated", "Bali", 1.0),
        ];
        let request = SearchRequest::default().with_rating(4.6);
        assert_eq!(ids(&apply_filters(pool.clone(), &request)), vec!["high"]);

        let zero = SearchRequest::default().with_rating(0.0);
        assert_eq!(apply_filters(pool, &zero).len(), 3);
    }

    #[test]
    fn test_filters_compose_as_and() {
        let pool = vec![
            hotel("match", "Bali, Indonesia", Some(250.0), Some(4.8)),
            hotel("wrong-place", "Paris", Some(250.0), Some(4.8)),
            hotel("too-dear", "Bali", Some(900.0), Some(4.8)),
            hotel("too-low", "Bali", Some(250.0), Some(3.0)),
        ];
        let request = SearchRequest::default()
            .with_location("bali")
            .with_price_range(None, Some(300.0))
            .with_rating(4.0);
        assert_eq!(ids(&apply_filters(pool, &request)), vec!["match"]);
    }

    #[test]
    fn test_duplicates_and_order_are_kept() {
        let pool = vec![
            hotel("b", "Bali", Some(1.0), None),
            hotel("a", "Bali", Some(1.0), None),
            hotel("b", "Bali", Some(1.0), None),
        ];
        assert_eq!(ids(&apply_filters(pool, &SearchRequest::default())), vec!["b", "a", "b"]);
    }
}
