//! Year-scoped bill numbers of the form `{PREFIX}/{year}/{sequence}`

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::*;

/// A parsed bill number
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillNumber {
    pub prefix: String,
    pub year: i32,
    /// Starts at 1 each calendar year
    pub sequence: u32,
}

impl BillNumber {
    /// Create a bill number
    pub fn new(prefix: &str, year: i32, sequence: u32) -> Self {
        Self {
            prefix: prefix.to_string(),
            year,
            sequence,
        }
    }

    /// First number of a year
    pub fn first(prefix: &str, year: i32) -> Self {
        Self::new(prefix, year, 1)
    }

    /// The number following this one in the same year
    pub fn next(&self) -> BillingResult<Self> {
        let sequence = self.sequence.checked_add(1).ok_or_else(|| {
            BillingError::Conflict(format!("Bill number sequence exhausted after {}", self))
        })?;
        Ok(Self::new(&self.prefix, self.year, sequence))
    }

    /// `{PREFIX}/{year}/`, the prefix every number of that year starts with
    pub fn year_prefix(prefix: &str, year: i32) -> String {
        format!("{}/{}/", prefix, year)
    }

    /// Parse `HMS/2024/0007`
    pub fn parse(value: &str) -> BillingResult<Self> {
        let malformed = || BillingError::InvalidInput(format!("Malformed bill number: {}", value));

        let mut parts = value.rsplitn(3, '/');
        let sequence = parts.next().ok_or_else(malformed)?;
        let year = parts.next().ok_or_else(malformed)?;
        let prefix = parts.next().ok_or_else(malformed)?;

        if prefix.is_empty() || !sequence.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }

        Ok(Self {
            prefix: prefix.to_string(),
            year: year.parse().map_err(|_| malformed())?,
            sequence: sequence.parse().map_err(|_| malformed())?,
        })
    }
}

impl fmt::Display for BillNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{:04}", self.prefix, self.year, self.sequence)
    }
}

/// Next number for `year` given the highest number already issued for it.
///
/// A `latest` from another prefix or year starts the sequence over at 1.
pub fn next_bill_number(prefix: &str, year: i32, latest: Option<&str>) -> BillingResult<BillNumber> {
    match latest {
        Some(latest) => {
            let latest = BillNumber::parse(latest)?;
            if latest.prefix == prefix && latest.year == year {
                latest.next()
            } else {
                Ok(BillNumber::first(prefix, year))
            }
        }
        None => Ok(BillNumber::first(prefix, year)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_number_of_year() {
        let number = next_bill_number("HMS", 2024, None).unwrap();
        assert_eq!(number.to_string(), "HMS/2024/0001");
    }

    #[test]
    fn test_increments_latest() {
        let number = next_bill_number("HMS", 2024, Some("HMS/2024/0005")).unwrap();
        assert_eq!(number.to_string(), "HMS/2024/0006");
    }

    #[test]
    fn test_sequence_resets_each_year() {
        let number = next_bill_number("HMS", 2025, Some("HMS/2024/0412")).unwrap();
        assert_eq!(number.to_string(), "HMS/2025/0001");
    }

    #[test]
    fn test_sequence_past_four_digits() {
        let number = next_bill_number("HMS", 2024, Some("HMS/2024/9999")).unwrap();
        assert_eq!(number.sequence, 10000);
        assert_eq!(number.to_string(), "HMS/2024/10000");
    }

    #[test]
    fn test_exhausted_sequence_is_a_conflict() {
        let latest = format!("HMS/2024/{}", u32::MAX);
        let result = next_bill_number("HMS", 2024, Some(&latest));
        assert!(matches!(result, Err(BillingError::Conflict(_))));
    }

    #[test]
    fn test_parse() {
        let number = BillNumber::parse("HMS/2024/0007").unwrap();
        assert_eq!(number, BillNumber::new("HMS", 2024, 7));
        assert_eq!(BillNumber::year_prefix("HMS", 2024), "HMS/2024/");

        assert!(BillNumber::parse("HMS-2024-0007").is_err());
        assert!(BillNumber::parse("/2024/0007").is_err());
        assert!(BillNumber::parse("HMS/20x4/0007").is_err());
        assert!(BillNumber::parse("HMS/2024/+7").is_err());
    }
}
