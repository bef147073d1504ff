use chrono::NaiveDate;

use crate::error::{AppError, AppResult};
use crate::services::pnl_calculator::DateRange;

/// `0x` followed by exactly 40 hex digits
pub fn is_valid_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Parses a strict `YYYY-MM-DD` calendar date
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Both dates parse, `start <= end`, and `start` is not after `today`
pub fn validate_date_range(start: &str, end: &str, today: NaiveDate) -> AppResult<DateRange> {
    let start = parse_date(start).ok_or_else(|| {
        AppError::ValidationError("Invalid start date format. Use YYYY-MM-DD".to_string())
    })?;
    let end = parse_date(end).ok_or_else(|| {
        AppError::ValidationError("Invalid end date format. Use YYYY-MM-DD".to_string())
    })?;

    if start > end {
        return Err(AppError::ValidationError(
            "Start date must be before end date".to_string(),
        ));
    }
    if start > today {
        return Err(AppError::ValidationError(
            "Start date cannot be in the future".to_string(),
        ));
    }

    Ok(DateRange::new(start, end))
}

pub fn validate_pnl_request(
    address: &str,
    start: &str,
    end: &str,
    today: NaiveDate,
) -> AppResult<DateRange> {
    if !is_valid_address(address) {
        return Err(AppError::ValidationError("Invalid address format".to_string()));
    }
    validate_date_range(start, end, today)
}

/// Lowercase CoinGecko-style ids: letters, digits, `-` and `_`
pub fn is_valid_token_id(token_id: &str) -> bool {
    !token_id.is_empty()
        && token_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::ValidationError(msg) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn address_format() {
        assert!(is_valid_address(ZERO_ADDRESS));
        assert!(is_valid_address("0xAbCdEf0123456789abcdef0123456789ABCDEF01"));
        assert!(!is_valid_address("not-an-address"));
        assert!(!is_valid_address("0x123"));
        assert!(!is_valid_address("0X0000000000000000000000000000000000000000"));
        assert!(!is_valid_address("0x000000000000000000000000000000000000000g"));
        assert!(!is_valid_address("0xé000000000000000000000000000000000000000"));
    }

    #[test]
    fn date_format() {
        assert_eq!(parse_date("2025-01-01"), NaiveDate::from_ymd_opt(2025, 1, 1));
        assert!(parse_date("2024-02-29").is_some());
        assert!(parse_date("2025-13-01").is_none());
        assert!(parse_date("2025-02-30").is_none());
        assert!(parse_date("01-01-2025").is_none());
        assert!(parse_date("2025-1-01").is_none());
        assert!(parse_date("2025-01-01T00:00:00Z").is_none());
    }

    #[test]
    fn range_checks() {
        let range = validate_date_range("2020-01-01", "2020-01-02", today()).unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());

        assert!(validate_date_range("2025-06-15", "2025-06-15", today()).is_ok());
        // end may run past today
        assert!(validate_date_range("2025-06-01", "2025-07-01", today()).is_ok());

        assert_eq!(
            message(validate_date_range("2025-05-02", "2025-05-01", today()).unwrap_err()),
            "Start date must be before end date"
        );
        assert_eq!(
            message(validate_date_range("2025-06-16", "2025-06-20", today()).unwrap_err()),
            "Start date cannot be in the future"
        );
        assert_eq!(
            message(validate_date_range("2025/01/01", "2025-01-02", today()).unwrap_err()),
            "Invalid start date format. Use YYYY-MM-DD"
        );
        assert_eq!(
            message(validate_date_range("2025-01-01", "tomorrow", today()).unwrap_err()),
            "Invalid end date format. Use YYYY-MM-DD"
        );
    }

    #[test]
    fn pnl_request_checks_address_first() {
        assert!(validate_pnl_request(ZERO_ADDRESS, "2020-01-01", "2020-01-02", today()).is_ok());
        assert_eq!(
            message(validate_pnl_request("bad", "nope", "2020-01-02", today()).unwrap_err()),
            "Invalid address format"
        );
    }

    #[test]
    fn token_ids() {
        assert!(is_valid_token_id("bitcoin"));
        assert!(is_valid_token_id("usd-coin"));
        assert!(is_valid_token_id("wrapped_btc2"));
        assert!(!is_valid_token_id(""));
        assert!(!is_valid_token_id(".."));
        assert!(!is_valid_token_id("bit coin"));
        assert!(!is_valid_token_id("btc/../eth"));
    }
}
