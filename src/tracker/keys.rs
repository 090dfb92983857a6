use chrono::NaiveDate;

/// Prefix shared by every daily record key.
pub const STATS_KEY_PREFIX: &str = "stats-";

/// Key of the marker holding the date most recently treated as "today".
pub const LAST_DATE_KEY: &str = "last-date";

/// This is the standard way of converting a date to a string in fittrack.
pub fn date_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Store key of the daily record for `date`.
pub fn date_key(date: NaiveDate) -> String {
    format!("{STATS_KEY_PREFIX}{}", date_string(date))
}

/// Inverse of [date_key]. Keys written with non-canonical date formats fail to parse and get
/// skipped by consumers.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    let raw = key.strip_prefix(STATS_KEY_PREFIX)?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{date_key, date_string, parse_date_key};

    #[test]
    fn date_key_uses_iso_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(date_key(date), "stats-2024-06-05");
        assert_eq!(date_string(date), "2024-06-05");
    }

    #[test]
    fn parse_date_key_inverts_date_key() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(parse_date_key(&date_key(date)), Some(date));
    }

    #[test]
    fn parse_date_key_rejects_foreign_keys() {
        assert_eq!(parse_date_key("last-date"), None);
        assert_eq!(parse_date_key("stats-June 5th, 2024"), None);
        assert_eq!(parse_date_key("stats-2024-13-05"), None);
    }
}
