//! Record key derivation.
//!
//! A flight's key is its calendar date rendered as `YYYY-MM-DD`. A second
//! flight on the same day gets a disambiguator, `YYYY-MM-DD-(1)`, the third
//! `YYYY-MM-DD-(2)`, and so on.

use std::collections::HashSet;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{Error, Result};

/// Format used for the date portion of a key.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date prefix followed by nothing or by `-` and anything at all.
///
/// Month and day accept a single digit so keys written with an unpadded day
/// (`2015-05-4-(2)`) still load.
const KEY_PATTERN: &str = r"(?s)^(\d{4})-(\d{1,2})-(\d{1,2})(?:-.*)?$";

fn key_regex() -> &'static Regex {
    static KEY_REGEX: OnceLock<Regex> = OnceLock::new();
    KEY_REGEX.get_or_init(|| Regex::new(KEY_PATTERN).expect("key pattern is valid"))
}

/// Render the undecorated key for a date.
#[must_use]
pub fn base_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Derive a key for `date` that collides with none of `existing_keys`.
///
/// The base key is returned as is when free. Otherwise the disambiguator
/// starts at the number of existing keys sharing the base prefix and is
/// incremented until the result is unused, which keeps keys unique even after
/// earlier duplicates were deleted out of order.
pub fn derive<'a>(date: NaiveDate, existing_keys: impl IntoIterator<Item = &'a str>) -> String {
    let base = base_key(date);
    let existing: HashSet<&str> = existing_keys.into_iter().collect();

    if !existing.contains(base.as_str()) {
        return base;
    }

    let mut n = existing.iter().filter(|key| key.starts_with(&base)).count();
    loop {
        let candidate = format!("{base}-({n})");
        if !existing.contains(candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}

/// Recover the flight date from a key, discarding any disambiguator.
///
/// # Errors
///
/// Returns [`Error::MalformedKey`] if the key does not start with a valid
/// `YYYY-MM-DD` date, or if anything after the date does not begin with `-`.
pub fn strip_disambiguator(key: &str) -> Result<NaiveDate> {
    let captures = key_regex()
        .captures(key)
        .ok_or_else(|| Error::malformed_key(key))?;

    let field = |index: usize| -> Result<u32> {
        captures[index]
            .parse()
            .map_err(|_| Error::malformed_key(key))
    };

    let year = i32::try_from(field(1)?).map_err(|_| Error::malformed_key(key))?;
    NaiveDate::from_ymd_opt(year, field(2)?, field(3)?).ok_or_else(|| Error::malformed_key(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_base_key_is_zero_padded() {
        assert_eq!(base_key(date(2015, 5, 4)), "2015-05-04");
    }

    #[test]
    fn test_derive_unused_date() {
        let key = derive(date(2020, 1, 1), ["2019-12-31"]);
        assert_eq!(key, "2020-01-01");
    }

    #[test]
    fn test_derive_three_same_day_inserts() {
        let mut keys: Vec<String> = Vec::new();
        for _ in 0..3 {
            let key = derive(date(2020, 1, 1), keys.iter().map(String::as_str));
            keys.push(key);
        }
        assert_eq!(keys, ["2020-01-01", "2020-01-01-(1)", "2020-01-01-(2)"]);
    }

    #[test]
    fn test_derive_skips_collision_after_delete() {
        // "-(1)" was deleted, so the count of two lands on the surviving "-(2)".
        let existing = ["2020-01-01", "2020-01-01-(2)"];
        assert_eq!(derive(date(2020, 1, 1), existing), "2020-01-01-(3)");
    }

    #[test]
    fn test_derive_reuses_base_when_base_deleted() {
        let existing = ["2020-01-01-(1)", "2020-01-01-(2)"];
        assert_eq!(derive(date(2020, 1, 1), existing), "2020-01-01");
    }

    #[test]
    fn test_derive_ignores_other_dates() {
        let existing = ["2020-01-01", "2020-01-02", "2020-01-02-(1)"];
        assert_eq!(derive(date(2020, 1, 1), existing), "2020-01-01-(1)");
    }

    #[test]
    fn test_derive_never_collides_across_churn() {
        let day = date(2022, 7, 14);
        let mut keys: Vec<String> = Vec::new();
        for round in 0..20 {
            let key = derive(day, keys.iter().map(String::as_str));
            assert!(!keys.contains(&key), "round {round} reissued {key}");
            keys.push(key);
            if round % 3 == 0 {
                keys.remove(round % keys.len());
            }
        }
        let unique: HashSet<&String> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn test_strip_plain_key() {
        assert_eq!(strip_disambiguator("2021-05-01").unwrap(), date(2021, 5, 1));
    }

    #[test]
    fn test_strip_disambiguated_key() {
        assert_eq!(
            strip_disambiguator("2021-05-01-(12)").unwrap(),
            date(2021, 5, 1)
        );
    }

    #[test]
    fn test_strip_unpadded_day() {
        assert_eq!(strip_disambiguator("2015-05-4").unwrap(), date(2015, 5, 4));
        assert_eq!(
            strip_disambiguator("2015-05-4-(2)").unwrap(),
            date(2015, 5, 4)
        );
    }

    #[test]
    fn test_strip_accepts_any_dash_suffix() {
        assert_eq!(
            strip_disambiguator("2021-05-01-copy").unwrap(),
            date(2021, 5, 1)
        );
        assert_eq!(strip_disambiguator("2021-05-01-").unwrap(), date(2021, 5, 1));
    }

    #[test]
    fn test_strip_rejects_malformed_keys() {
        for key in [
            "",
            "2021/05/01",
            "21-05-01",
            "2021-05-01x",
            "2021-05-01(1)",
            "2021-13-01",
            "2021-02-30",
            "2021-05-123",
            "flight",
        ] {
            let err = strip_disambiguator(key).unwrap_err();
            assert!(matches!(err, Error::MalformedKey { .. }), "accepted {key:?}");
        }
    }

    #[test]
    fn test_strip_inverts_derive() {
        let day = date(2019, 11, 3);
        let key = derive(day, ["2019-11-03", "2019-11-03-(1)"]);
        assert_eq!(strip_disambiguator(&key).unwrap(), day);
    }
}
