//! Input checks the UI layer runs before handing a request to the core.
//! The resolver and the session controller never call these themselves.

use crate::{CoreError, CoreResult};
use tripverse_shared::{SearchRequest, SignupData};

/// Loose check: non-empty and contains `@`.
pub fn is_valid_email(email: &str) -> bool {
    !email.trim().is_empty() && email.contains('@')
}

/// Method form of the checks below, e.g. `request.validate()?`.
pub trait Validate {
    fn validate(&self) -> CoreResult<()>;
}

impl Validate for SearchRequest {
    fn validate(&self) -> CoreResult<()> {
        validate_search_request(self)
    }
}

impl Validate for SignupData {
    fn validate(&self) -> CoreResult<()> {
        validate_signup(self)
    }
}

pub fn validate_search_request(request: &SearchRequest) -> CoreResult<()> {
    for (field, count) in [("guests", request.guests), ("passengers", request.passengers)] {
        if count == Some(0) {
            return Err(CoreError::ValidationError(format!("{} must be at least 1", field)));
        }
    }

    for (field, price) in [("minPrice", request.min_price), ("maxPrice", request.max_price)] {
        if let Some(price) = price {
            if !price.is_finite() || price < 0.0 {
                return Err(CoreError::ValidationError(format!(
                    "{} must be a non-negative number",
                    field
                )));
            }
        }
    }

    if let (Some(min), Some(max)) = (request.min_price, request.max_price) {
        if min > max {
            return Err(CoreError::ValidationError(
                "minPrice must not exceed maxPrice".to_string(),
            ));
        }
    }

    if let Some(rating) = request.rating {
        if !(0.0..=5.0).contains(&rating) {
            return Err(CoreError::ValidationError(
                "rating must be between 0 and 5".to_string(),
            ));
        }
    }

    if let (Some(check_in), Some(check_out)) = (request.check_in, request.check_out) {
        if check_out < check_in {
            return Err(CoreError::ValidationError(
                "checkOut must not precede checkIn".to_string(),
            ));
        }
    }

    if let (Some(depart), Some(ret)) = (request.depart_date, request.return_date) {
        if ret < depart {
            return Err(CoreError::ValidationError(
                "returnDate must not precede departDate".to_string(),
            ));
        }
    }

    Ok(())
}

pub fn validate_signup(data: &SignupData) -> CoreResult<()> {
    if !is_valid_email(&data.email) {
        return Err(CoreError::ValidationError(
            "Please enter a valid email address.".to_string(),
        ));
    }
    if data.password.expose().is_empty() {
        return Err(CoreError::ValidationError("Password is required".to_string()));
    }
    if data.first_name.trim().is_empty() || data.last_name.trim().is_empty() {
        return Err(CoreError::ValidationError(
            "First and last name are required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tripverse_shared::{Masked, SearchType, UserRole};

    #[test]
    fn test_search_request_bounds() {
        let ok = SearchRequest::of_type(SearchType::Hotels).with_price_range(Some(100.0), Some(300.0));
        assert!(ok.validate().is_ok());

        let inverted = SearchRequest::default().with_price_range(Some(300.0), Some(100.0));
        assert!(validate_search_request(&inverted).is_err());

        let negative = SearchRequest::default().with_price_range(Some(-1.0), None);
        assert!(validate_search_request(&negative).is_err());

        let rating = SearchRequest::default().with_rating(5.5);
        assert!(validate_search_request(&rating).is_err());

        let guests = SearchRequest {
            guests: Some(0),
            ..SearchRequest::default()
        };
        assert!(validate_search_request(&guests).is_err());
    }

    #[test]
    fn test_dates_must_be_ordered() {
        let request = SearchRequest {
            depart_date: NaiveDate::from_ymd_opt(2024, 7, 22),
            return_date: NaiveDate::from_ymd_opt(2024, 7, 15),
            ..SearchRequest::default()
        };
        assert!(validate_search_request(&request).is_err());
    }

    #[test]
    fn test_signup_checks() {
        let mut data = SignupData {
            email: "a@b.com".to_string(),
            password: Masked::from("x"),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            role: UserRole::Customer,
        };
        assert!(data.validate().is_ok());

        data.email = "not-an-email".to_string();
        assert!(validate_signup(&data).is_err());
        assert!(!is_valid_email(""));
    }
}
