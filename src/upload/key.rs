// Storage key module
// Object keys are the upload time truncated to the minute

use chrono::{DateTime, Utc};

/// Extension appended to every object key
const KEY_EXTENSION: &str = ".i16";

const KEY_TIME_FORMAT: &str = "%Y-%m-%d-%H-%M";

/// Object key derived from an upload's creation time, e.g. `2024-03-09-14-05.i16`.
///
/// Uploads completing within the same minute share a key; the later one
/// overwrites the earlier one in the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn from_time(time: DateTime<Utc>) -> Self {
        Self(format!("{}{KEY_EXTENSION}", time.format(KEY_TIME_FORMAT)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether `key` has the `YYYY-MM-DD-HH-MM.i16` shape
    pub fn is_well_formed(key: &str) -> bool {
        let Some(stem) = key.strip_suffix(KEY_EXTENSION) else {
            return false;
        };
        stem.len() == 16
            && stem.char_indices().all(|(i, c)| match i {
                4 | 7 | 10 | 13 => c == '-',
                _ => c.is_ascii_digit(),
            })
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_key_format() {
        let time = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 59).unwrap();
        let key = StorageKey::from_time(time);
        assert_eq!(key.as_str(), "2024-03-09-14-05.i16");
        assert_eq!(key.to_string(), "2024-03-09-14-05.i16");
    }

    #[test]
    fn test_same_minute_collides() {
        let a = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let c = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(StorageKey::from_time(a), StorageKey::from_time(b));
        assert_ne!(StorageKey::from_time(b), StorageKey::from_time(c));
        assert_eq!(StorageKey::from_time(c).as_str(), "2025-01-01-00-00.i16");
    }

    #[test]
    fn test_is_well_formed() {
        assert!(StorageKey::is_well_formed("2024-03-09-14-05.i16"));
        assert!(StorageKey::is_well_formed(StorageKey::from_time(Utc::now()).as_str()));
        assert!(!StorageKey::is_well_formed("2024-03-09-14-05.bin"));
        assert!(!StorageKey::is_well_formed("2024-03-09-14.i16"));
        assert!(!StorageKey::is_well_formed("2024/03/09-14-05.i16"));
        assert!(!StorageKey::is_well_formed("abcd-03-09-14-05.i16"));
    }
}
