//! Article and DiaryEntry - the data a submission touches
//!
//! # Key Properties
//! - **Article**: a transient copy of a remote post, fetched per submission
//! - **DiaryEntry**: one `HH:MM text` line, consumed by a single append
//! - **Append-only**: a new body is always `old + "\n" + entry`

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A diary article as last seen on the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Server-assigned post number
    pub number: u64,
    pub name: String,
    /// Markdown body
    pub body_md: String,
    /// Work-in-progress flag
    pub wip: bool,
}

impl Article {
    /// Full body after appending `entry`. Existing content is kept verbatim.
    pub fn body_with(&self, entry: &DiaryEntry) -> String {
        format!("{}\n{}", self.body_md, entry)
    }
}

/// A single timestamped line to append
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiaryEntry {
    timestamp: String,
    text: String,
}

impl DiaryEntry {
    /// Build an entry stamped with the local wall-clock `at`.
    ///
    /// Returns `None` when `text` is blank after trimming.
    pub fn new(at: NaiveDateTime, text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        Some(Self {
            timestamp: at.format("%H:%M").to_string(),
            text: text.to_string(),
        })
    }

    /// `HH:MM`
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for DiaryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.timestamp, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(h, m, 42)
            .unwrap()
    }

    fn article(body: &str) -> Article {
        Article {
            number: 7,
            name: "dairy".to_string(),
            body_md: body.to_string(),
            wip: true,
        }
    }

    #[test]
    fn test_render() {
        let entry = DiaryEntry::new(at(9, 5), "world").unwrap();
        assert_eq!(entry.timestamp(), "09:05");
        assert_eq!(entry.to_string(), "09:05 world");
    }

    #[test]
    fn test_text_is_trimmed() {
        let entry = DiaryEntry::new(at(23, 59), "  late night \n").unwrap();
        assert_eq!(entry.text(), "late night");
        assert_eq!(entry.to_string(), "23:59 late night");
    }

    #[test]
    fn test_blank_text_rejected() {
        assert!(DiaryEntry::new(at(9, 5), "").is_none());
        assert!(DiaryEntry::new(at(9, 5), " \t ").is_none());
    }

    #[test]
    fn test_append_keeps_existing_body() {
        let entry = DiaryEntry::new(at(9, 5), "world").unwrap();
        assert_eq!(article("hello").body_with(&entry), "hello\n09:05 world");
    }

    #[test]
    fn test_append_multiline_body() {
        let body = "# Today\n\n- 08:00 coffee\n";
        let entry = DiaryEntry::new(at(10, 30), "standup").unwrap();
        let updated = article(body).body_with(&entry);
        assert!(updated.starts_with(body));
        assert_eq!(updated, "# Today\n\n- 08:00 coffee\n\n10:30 standup");
    }

    #[test]
    fn test_append_to_empty_body() {
        let entry = DiaryEntry::new(at(0, 0), "midnight").unwrap();
        assert_eq!(article("").body_with(&entry), "\n00:00 midnight");
    }
}
