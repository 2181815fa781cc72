//! Decoding of foltia schedule times.
//!
//! `startdatetime` and `enddatetime` are BIGINT columns holding wall-clock
//! digits `YYYYMMDDhhmm` (e.g. `202310181930` for 2023-10-18 19:30).

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::types::BroadcastTime;

/// Decode a stored `YYYYMMDDhhmm` value.
pub fn decode(field: &'static str, value: i64) -> Result<BroadcastTime, CoreError> {
    let invalid = || CoreError::InvalidCode { field, code: value };
    if value < 0 {
        return Err(invalid());
    }

    let minute = (value % 100) as u32;
    let hour = (value / 100 % 100) as u32;
    let day = (value / 10_000 % 100) as u32;
    let month = (value / 1_000_000 % 100) as u32;
    let year = i32::try_from(value / 100_000_000).map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_wall_clock_digits() {
        let t = decode("startdatetime", 202310181930).unwrap();
        assert_eq!(
            t,
            NaiveDate::from_ymd_opt(2023, 10, 18)
                .unwrap()
                .and_hms_opt(19, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_decode_rejects_impossible_dates() {
        assert!(decode("startdatetime", 202302300000).is_err());
        assert!(decode("startdatetime", 202310182460).is_err());
        assert!(decode("enddatetime", -1).is_err());
    }
}
