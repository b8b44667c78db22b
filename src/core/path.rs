//! ArticlePath - where a given day's diary article lives
//!
//! Derived from the local date, never stored:
//! - category: `dairy/24/01/02`
//! - full name: `dairy/24/01/02/dairy`
//! - template: `Templates/dairy/24/01/02/dairy`

use std::fmt;

use chrono::NaiveDate;

use crate::config::DiaryConfig;

/// Location of one day's article and the template it is created from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArticlePath {
    category: String,
    name: String,
    full_name: String,
    template_full_name: String,
}

impl ArticlePath {
    /// Path for `date` using the configured root, name and template prefix
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use esa_diary::config::DiaryConfig;
    /// use esa_diary::core::path::ArticlePath;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    /// let path = ArticlePath::for_date(date, &DiaryConfig::default());
    /// assert_eq!(path.full_name(), "dairy/24/01/02/dairy");
    /// ```
    pub fn for_date(date: NaiveDate, layout: &DiaryConfig) -> Self {
        let category = format!("{}/{}", layout.root, date.format("%y/%m/%d"));
        let full_name = format!("{}/{}", category, layout.article_name);
        let template_full_name = format!("{}/{}", layout.template_root, full_name);

        Self {
            category,
            name: layout.article_name.clone(),
            full_name,
            template_full_name,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lookup key (`category/name`)
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn template_full_name(&self) -> &str {
        &self.template_full_name
    }
}

impl fmt::Display for ArticlePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name)
    }
}
