//! DATE/TIME/TIMESTAMP type support for PostgreSQL.
//!
//! Like `Numeric`, these wrap the text representation PostgreSQL sends in
//! text-format results rather than unpacking the binary microsecond-offset
//! encoding — the driver is text-only end to end (spec §4.2), so there is
//! no binary path to decode on the read side either.

use super::{FromPg, ToPg, TypeError};
use crate::protocol::types::oid;

/// DATE (`YYYY-MM-DD`, stored as text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Date(pub String);

/// TIME / TIME WITH TIME ZONE, stored as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Time(pub String);

/// TIMESTAMP / TIMESTAMPTZ, stored as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp(pub String);

impl Date {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[cfg(feature = "chrono")]
    pub fn to_chrono(&self) -> Result<chrono::NaiveDate, chrono::ParseError> {
        chrono::NaiveDate::parse_from_str(&self.0, "%Y-%m-%d")
    }
}

impl Time {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Timestamp {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[cfg(feature = "chrono")]
    pub fn to_chrono(&self) -> Result<chrono::DateTime<chrono::Utc>, chrono::ParseError> {
        let s = self.0.replace(' ', "T");
        chrono::DateTime::parse_from_rfc3339(&s).map(|dt| dt.with_timezone(&chrono::Utc))
    }
}

macro_rules! text_only_pg_type {
    ($ty:ident, $expected_oid:expr, $expected_name:expr) => {
        impl FromPg for $ty {
            fn from_pg(bytes: &[u8], oid_val: u32, format: i16) -> Result<Self, TypeError> {
                if oid_val != $expected_oid {
                    return Err(TypeError::UnexpectedOid {
                        expected: $expected_name,
                        got: oid_val,
                    });
                }
                if format == 1 {
                    return Err(TypeError::InvalidData(format!(
                        "binary {} decoding is not supported",
                        $expected_name
                    )));
                }
                let s = std::str::from_utf8(bytes)
                    .map_err(|e| TypeError::InvalidData(e.to_string()))?;
                Ok($ty(s.to_string()))
            }
        }

        impl ToPg for $ty {
            fn to_pg(&self) -> (Vec<u8>, u32, i16) {
                (self.0.as_bytes().to_vec(), $expected_oid, 0)
            }
        }
    };
}

text_only_pg_type!(Date, oid::DATE, "date");
text_only_pg_type!(Time, oid::TIME, "time");
text_only_pg_type!(Timestamp, oid::TIMESTAMP, "timestamp");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_round_trip_text() {
        let d = Date::from_pg(b"2024-01-15", oid::DATE, 0).unwrap();
        assert_eq!(d.as_str(), "2024-01-15");
        let (bytes, oid_val, fmt) = d.to_pg();
        assert_eq!(bytes, b"2024-01-15");
        assert_eq!(oid_val, oid::DATE);
        assert_eq!(fmt, 0);
    }

    #[test]
    fn timestamp_wrong_oid_rejected() {
        let err = Timestamp::from_pg(b"2024-01-15 00:00:00", oid::DATE, 0).unwrap_err();
        assert!(matches!(err, TypeError::UnexpectedOid { .. }));
    }

    #[test]
    fn time_binary_format_unsupported() {
        let err = Time::from_pg(&[0u8; 8], oid::TIME, 1).unwrap_err();
        assert!(matches!(err, TypeError::InvalidData(_)));
    }
}
