//! Pagination metadata and list filters.

use serde::Serialize;

use crate::validator::{permitted_value, Validator};

/// Pagination metadata returned alongside a page of records.
///
/// The zero value (no records) serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "is_zero")]
    pub current_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub page_size: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub first_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub last_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub total_records: i64,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

/// Compute pagination metadata for `total_records` split into pages of
/// `page_size`, with `page` as the current page.
///
/// `page` and `page_size` must be positive; [`Filters::validate`] enforces this
/// for values coming from a request.
pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records == 0 {
        return Metadata::default();
    }
    debug_assert!(page_size > 0, "page_size must be positive");

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}

/// Paging and sorting options for list endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    /// Sort key; a leading `-` means descending.
    pub sort: String,
    /// Every value `sort` may take.
    pub sort_safelist: Vec<String>,
}

impl Filters {
    pub const MAX_PAGE: i64 = 10_000_000;
    pub const MAX_PAGE_SIZE: i64 = 100;

    /// Record every filter violation into `v`.
    pub fn validate(&self, v: &mut Validator) {
        v.check(self.page > 0, "page", "must be greater than zero");
        v.check(
            self.page <= Self::MAX_PAGE,
            "page",
            "must be a maximum of 10 million",
        );
        v.check(self.page_size > 0, "page_size", "must be greater than zero");
        v.check(
            self.page_size <= Self::MAX_PAGE_SIZE,
            "page_size",
            "must be a maximum of 100",
        );
        v.check(
            permitted_value(&self.sort, &self.sort_safelist),
            "sort",
            "invalid sort value",
        );
    }

    /// Column name to order by, without the direction prefix.
    ///
    /// # Panics
    /// If `sort` is not in the safelist. Callers must run [`Filters::validate`]
    /// first; reaching this with an unchecked value is a programming error.
    pub fn sort_column(&self) -> &str {
        if !self.sort_safelist.iter().any(|s| s == &self.sort) {
            panic!("unsafe sort parameter: {}", self.sort);
        }
        self.sort.trim_start_matches('-')
    }

    pub fn sort_direction(&self) -> &'static str {
        if self.sort.starts_with('-') {
            "DESC"
        } else {
            "ASC"
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}
