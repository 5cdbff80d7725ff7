use chrono::{DateTime, Local};

/// Formats epoch seconds as a local `M/D/YYYY` date string.
pub fn format_epoch_date(secs: i64) -> Option<String> {
    let utc = DateTime::from_timestamp(secs, 0)?;
    Some(utc.with_timezone(&Local).format("%-m/%-d/%Y").to_string())
}

/// Groups digits in thousands for log lines, e.g. `1234567` -> `1,234,567`.
pub fn format_count(num: u64) -> String {
    let digits = num.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(48213), "48,213");
        assert_eq!(format_count(1234567890), "1,234,567,890");
    }

    #[test]
    fn test_format_epoch_date() {
        let secs = 1_684_000_000;
        let local = Local.timestamp_opt(secs, 0).unwrap();
        let expected = format!("{}/{}/{}", local.month(), local.day(), local.year());
        assert_eq!(format_epoch_date(secs).as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn test_format_epoch_date_out_of_range() {
        assert_eq!(format_epoch_date(i64::MAX), None);
    }
}
