use chrono::{DateTime, NaiveTime, Utc};

use crate::error::{Error, Result};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_clock(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| Error::BadRequest(format!("Invalid time of day '{raw}', expected HH:MM")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_clock_formats() {
        assert_eq!(
            parse_clock("09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert_eq!(
            parse_clock("17:05:10").unwrap(),
            NaiveTime::from_hms_opt(17, 5, 10).unwrap()
        );
        assert!(parse_clock("25:00").is_err());
        assert!(parse_clock("noon").is_err());
    }
}
