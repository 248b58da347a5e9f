//! Typed decoders shared by the field tables
//!
//! Windows stores Amcache numbers as text. Timestamps come in two flavors:
//! FILETIME ticks (100ns since 1601-01-01 UTC) and Unix epoch seconds.

use std::num::IntErrorKind;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::errors::ConvertError;

/// Seconds between 1601-01-01 and 1970-01-01
const FILETIME_UNIX_OFFSET_SECS: i64 = 11_644_473_600;
const FILETIME_TICKS_PER_SEC: i64 = 10_000_000;

/// Integer types the tables decode into
pub trait Integer: FromStr<Err = std::num::ParseIntError> {
    /// Type name used in error messages
    const NAME: &'static str;
}

macro_rules! integer_names {
    ($($ty:ty),*) => {
        $(impl Integer for $ty {
            const NAME: &'static str = stringify!($ty);
        })*
    };
}

integer_names!(i32, u32, i64, u64);

/// Parse decimal text as `T`, tolerating surrounding whitespace
pub fn parse_int<T: Integer>(text: &str) -> Result<T, ConvertError> {
    text.trim()
        .parse::<T>()
        .map_err(|source| ConvertError::InvalidInteger {
            text: text.to_string(),
            expected: T::NAME,
            source,
        })
}

/// Convert FILETIME ticks to a UTC instant
pub fn filetime_to_utc(ticks: i64) -> Result<DateTime<Utc>, ConvertError> {
    let out_of_range = || ConvertError::TimestampOutOfRange {
        value: ticks,
        unit: "FILETIME",
    };

    if ticks < 0 {
        return Err(out_of_range());
    }

    let secs = ticks / FILETIME_TICKS_PER_SEC - FILETIME_UNIX_OFFSET_SECS;
    let nanos = (ticks % FILETIME_TICKS_PER_SEC) as u32 * 100;
    DateTime::from_timestamp(secs, nanos).ok_or_else(out_of_range)
}

/// Convert Unix epoch seconds to a UTC instant
pub fn unix_seconds_to_utc(secs: i64) -> Result<DateTime<Utc>, ConvertError> {
    DateTime::from_timestamp(secs, 0).ok_or(ConvertError::TimestampOutOfRange {
        value: secs,
        unit: "epoch seconds",
    })
}

/// Parse epoch seconds text into an optional instant.
///
/// Non-positive values mean "not set". With `tolerate_overflow`, values too
/// large for an integer or an instant also mean "not set" instead of an
/// error; text that is not a number at all is still an error.
pub fn epoch_seconds(text: &str, tolerate_overflow: bool) -> Result<Option<DateTime<Utc>>, ConvertError> {
    let secs = match parse_int::<i64>(text) {
        Ok(secs) => secs,
        Err(ConvertError::InvalidInteger { ref source, .. })
            if tolerate_overflow
                && matches!(
                    source.kind(),
                    IntErrorKind::PosOverflow | IntErrorKind::NegOverflow
                ) =>
        {
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    if secs <= 0 {
        return Ok(None);
    }

    match unix_seconds_to_utc(secs) {
        Ok(instant) => Ok(Some(instant)),
        Err(_) if tolerate_overflow => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_int_types() {
        assert_eq!(parse_int::<i32>("1033").unwrap(), 1033);
        assert_eq!(parse_int::<i32>(" -4 ").unwrap(), -4);
        assert_eq!(parse_int::<u64>("18446744073709551615").unwrap(), u64::MAX);
    }

    #[test]
    fn test_parse_int_reports_expected_type() {
        let err = parse_int::<u32>("-1").unwrap_err();
        assert!(err.to_string().contains("u32"));
        assert!(err.to_string().contains("'-1'"));
    }

    #[test]
    fn test_filetime_conversion() {
        // 2014-02-19 15:43:12 UTC
        let ticks = 130_372_981_920_000_000;
        let expected = Utc.with_ymd_and_hms(2014, 2, 19, 15, 43, 12).unwrap();
        assert_eq!(filetime_to_utc(ticks).unwrap(), expected);
    }

    #[test]
    fn test_filetime_keeps_sub_second_ticks() {
        let ticks = 130_372_981_920_000_000 + 1_234_567;
        let instant = filetime_to_utc(ticks).unwrap();
        assert_eq!(instant.timestamp_subsec_nanos(), 123_456_700);
    }

    #[test]
    fn test_filetime_epoch_start() {
        let instant = filetime_to_utc(0).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(1601, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_filetime_negative_rejected() {
        assert!(filetime_to_utc(-1).is_err());
    }

    #[test]
    fn test_epoch_seconds_non_positive_unset() {
        assert_eq!(epoch_seconds("0", false).unwrap(), None);
        assert_eq!(epoch_seconds("-10", false).unwrap(), None);
    }

    #[test]
    fn test_epoch_seconds_value() {
        let instant = epoch_seconds("1392824592", false).unwrap().unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2014, 2, 19, 15, 43, 12).unwrap());
    }

    #[test]
    fn test_epoch_seconds_overflow_tolerated() {
        assert_eq!(epoch_seconds("99999999999999999999999", true).unwrap(), None);
        assert_eq!(epoch_seconds("9223372036854775807", true).unwrap(), None);
    }

    #[test]
    fn test_epoch_seconds_overflow_strict() {
        assert!(epoch_seconds("99999999999999999999999", false).is_err());
        assert!(epoch_seconds("9223372036854775807", false).is_err());
    }

    #[test]
    fn test_epoch_seconds_garbage_always_error() {
        assert!(epoch_seconds("yesterday", true).is_err());
    }
}
