use time::{macros::format_description, OffsetDateTime, UtcOffset};

/// Wall-clock readings before this year mean the RTC was never set.
pub const MIN_VALID_YEAR: i32 = 2020;

/// Local time and date strings captured when data is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stamp {
    /// `HH:MM:SS`
    pub time: String,
    /// `Sun, 23. Nov 2025`
    pub date: String,
}

pub fn offset_from_minutes(minutes: i32) -> UtcOffset {
    UtcOffset::from_whole_seconds(minutes * 60).unwrap_or(UtcOffset::UTC)
}

/// Format `unix` seconds in `offset`, or `None` if the clock is not valid.
pub fn local_stamp(unix: i64, offset: UtcOffset) -> Option<Stamp> {
    let local = OffsetDateTime::from_unix_timestamp(unix).ok()?.to_offset(offset);
    if local.year() < MIN_VALID_YEAR {
        return None;
    }
    Some(Stamp {
        time: local
            .format(format_description!("[hour]:[minute]:[second]"))
            .ok()?,
        date: local
            .format(format_description!(
                "[weekday repr:short], [day]. [month repr:short] [year]"
            ))
            .ok()?,
    })
}

/// `HH:MM` from a stamp time.
pub fn short_time(time: &str) -> &str {
    time.get(..5).unwrap_or(time)
}

/// `DD-Mon` from a stamp date; anything shorter is shown as-is.
pub fn short_date(date: &str) -> String {
    match (date.get(5..7), date.get(9..12)) {
        (Some(day), Some(mon)) if date.len() > 12 => format!("{}-{}", day, mon),
        _ => date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-11-23 00:00:00 UTC
    const NOV_23: i64 = 1_763_856_000;

    #[test]
    fn formats_in_local_offset() {
        let s = local_stamp(NOV_23, offset_from_minutes(330)).unwrap();
        assert_eq!(s.time, "05:30:00");
        assert_eq!(s.date, "Sun, 23. Nov 2025");
    }

    #[test]
    fn unset_clock_is_rejected() {
        assert!(local_stamp(0, UtcOffset::UTC).is_none());
        assert!(local_stamp(1_500_000_000, UtcOffset::UTC).is_none());
    }

    #[test]
    fn header_forms() {
        assert_eq!(short_time("05:30:00"), "05:30");
        assert_eq!(short_time(""), "");
        assert_eq!(short_date("Sun, 23. Nov 2025"), "23-Nov");
        assert_eq!(short_date("--"), "--");
    }

    #[test]
    fn bad_offset_falls_back_to_utc() {
        assert_eq!(offset_from_minutes(100_000), UtcOffset::UTC);
    }
}
