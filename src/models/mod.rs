pub mod category;
pub mod expense;
pub mod income;

use std::fmt::Debug;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Serialize, de::DeserializeOwned};

/// A dated, amount-bearing record classified by a single key
/// (category for expenses, source for incomes).
pub trait Record {
    fn id(&self) -> u64;
    fn key(&self) -> &str;
    fn amount(&self) -> Decimal;
    fn date(&self) -> NaiveDate;
}

/// A record type backed by a REST collection.
pub trait Resource: Record + Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Creation payload, the record without its server-assigned id.
    type New: Serialize + Clone + Debug + Send + Sync + 'static;

    /// Collection path segment, e.g. `expenses`.
    const PATH: &'static str;
    /// Human name used in messages.
    const NOUN: &'static str;

    fn from_new(id: u64, new: Self::New) -> Self;
}

/// Parses a `YYYY-MM-DD` date. Full timestamps are accepted too and
/// truncated to their date part.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    raw.get(..10)
        .filter(|_| raw.as_bytes().get(10).is_some_and(|b| *b == b'T' || *b == b' '))
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Serde adapter for `YYYY-MM-DD` dates.
pub mod date_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid date '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_timestamped_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(parse_date("2024-03-09"), Some(expected));
        assert_eq!(parse_date(" 2024-03-09 "), Some(expected));
        assert_eq!(parse_date("2024-03-09T14:30:00Z"), Some(expected));
        assert_eq!(parse_date("2024-03-09 08:00:00"), Some(expected));
    }

    #[test]
    fn rejects_garbage_dates() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("09/03/2024"), None);
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date("2024-03-09garbage"), None);
    }
}
