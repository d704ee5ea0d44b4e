use axum::http::StatusCode;
use chrono::{Months, NaiveDate};

pub mod auth;
pub mod health;
pub mod kpi;
pub mod operators;
pub mod reports;

// Common error mappers
pub fn internal_error<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, format!("internal error: {e}"))
}

pub fn bad_request(msg: &str) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, msg.to_string())
}

pub fn not_found(what: &str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("{what} not found"))
}

pub fn unauthorized(msg: &str) -> (StatusCode, String) {
    (StatusCode::UNAUTHORIZED, msg.to_string())
}

pub fn forbidden(msg: &str) -> (StatusCode, String) {
    (StatusCode::FORBIDDEN, msg.to_string())
}

/// Parse a `YYYY-MM` month into its half-open date range.
pub fn month_bounds(month: &str) -> Result<(NaiveDate, NaiveDate), (StatusCode, String)> {
    let start = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map_err(|_| bad_request("month must be formatted YYYY-MM"))?;
    let end = start
        .checked_add_months(Months::new(1))
        .ok_or_else(|| bad_request("month out of range"))?;
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_half_open() {
        let (start, end) = month_bounds("2025-06").unwrap();
        assert_eq!(start, "2025-06-01".parse::<NaiveDate>().unwrap());
        assert_eq!(end, "2025-07-01".parse::<NaiveDate>().unwrap());
    }

    #[test]
    fn month_bounds_crosses_year() {
        let (start, end) = month_bounds("2025-12").unwrap();
        assert_eq!(start, "2025-12-01".parse::<NaiveDate>().unwrap());
        assert_eq!(end, "2026-01-01".parse::<NaiveDate>().unwrap());
    }

    #[test]
    fn month_bounds_rejects_garbage() {
        assert!(month_bounds("2025").is_err());
        assert!(month_bounds("2025-13").is_err());
        assert!(month_bounds("june").is_err());
    }
}
