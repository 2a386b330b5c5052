//! Validation utilities

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::types::{BooksError, BooksResult, SCHEMA_VERSION};

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: &BigDecimal, what: &str) -> BooksResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(BooksError::InvalidAmount(format!(
            "{} must be positive, got {}",
            what, amount
        )))
    } else {
        Ok(())
    }
}

/// A GSTIN is accepted for B2B classification / ITC eligibility purely by
/// being exactly 15 characters. No checksum or structural validation.
pub fn is_classifiable_gstin(gstin: Option<&str>) -> bool {
    matches!(gstin, Some(g) if g.len() == 15)
}

/// Validate the schema version stamped on a persisted record
pub fn check_schema_version(record: &str, found: u16) -> BooksResult<()> {
    if found != SCHEMA_VERSION {
        return Err(BooksError::SchemaVersion {
            record: record.to_string(),
            expected: SCHEMA_VERSION,
            found,
        });
    }
    Ok(())
}

/// First and last day of a calendar month
pub fn month_bounds(year: i32, month: u32) -> BooksResult<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        BooksError::Validation(format!("Invalid period: month {} year {}", month, year))
    })?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let end = next_month
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| BooksError::Validation(format!("Invalid period end for month {}", month)))?;
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gstin_length_is_the_only_rule() {
        assert!(is_classifiable_gstin(Some("29ABCDE1234F1Z5")));
        assert!(!is_classifiable_gstin(Some("")));
        assert!(!is_classifiable_gstin(Some("29ABCDE1234F1Z")));
        assert!(!is_classifiable_gstin(Some("29ABCDE1234F1Z55")));
        assert!(!is_classifiable_gstin(None));
    }

    #[test]
    fn month_bounds_cover_december_rollover() {
        let (start, end) = month_bounds(2024, 12).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());

        let (start, end) = month_bounds(2024, 2).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        assert!(month_bounds(2024, 13).is_err());
    }

    #[test]
    fn positive_amount_check() {
        assert!(validate_positive_amount(&BigDecimal::from(1), "amount").is_ok());
        assert!(validate_positive_amount(&BigDecimal::from(0), "amount").is_err());
        assert!(validate_positive_amount(&BigDecimal::from(-5), "amount").is_err());
    }
}
