// Stockroom
// Copyright 2025 The Stockroom Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Pagination and sorting controls for list queries.

use crate::validation::Validator;
use derive_getters::Getters;
use derive_more::Constructor;
use serde::{Deserialize, Serialize};

/// Columns that list queries may sort by.  `Filters::sort` accepts each of
/// these verbatim for ascending order or prefixed with `-` for descending.
const SORT_COLUMNS: [&str; 4] = ["id", "title", "year", "price"];

/// Highest page number a caller may request.
const MAX_PAGE: u64 = 10_000_000;

/// Largest page size a caller may request.
const MAX_PAGE_SIZE: u64 = 100;

/// Pagination and sorting parameters for a list query, as decoded from a
/// request's query string with the documented defaults filled in.
#[derive(Clone, Constructor, Debug, Deserialize, Eq, Getters, PartialEq)]
pub struct Filters {
    /// 1-based page number to return.
    #[serde(default = "default_page")]
    page: u64,

    /// Number of entries per page.
    #[serde(default = "default_page_size")]
    page_size: u64,

    /// Sort key, one of `SORT_COLUMNS` with an optional `-` prefix for
    /// descending order.
    #[serde(default = "default_sort")]
    sort: String,
}

/// Default page number when the caller does not supply one.
fn default_page() -> u64 {
    1
}

/// Default page size when the caller does not supply one.
fn default_page_size() -> u64 {
    20
}

/// Default sort key when the caller does not supply one.
fn default_sort() -> String {
    "id".to_owned()
}

impl Default for Filters {
    fn default() -> Self {
        Filters::new(default_page(), default_page_size(), default_sort())
    }
}

impl Filters {
    /// Runs all validation rules against the filters, recording every failure
    /// in `v`.  The filters must not reach a query unless this passes.
    pub fn validate(&self, v: &mut Validator) {
        v.check(self.page > 0, "page", "must be greater than zero");
        v.check(self.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
        v.check(self.page_size > 0, "page_size", "must be greater than zero");
        v.check(self.page_size <= MAX_PAGE_SIZE, "page_size", "must be a maximum of 100");
        let column = self.sort.strip_prefix('-').unwrap_or(&self.sort);
        v.check(SORT_COLUMNS.contains(&column), "sort", "invalid sort value");
    }

    /// Returns the row count for the query's `LIMIT` clause.
    pub(crate) fn limit(&self) -> u64 {
        self.page_size
    }

    /// Returns the row count for the query's `OFFSET` clause.
    ///
    /// Panics on a page number of zero, which `validate` rejects; callers must have run
    /// `validate` first.
    pub(crate) fn offset(&self) -> u64 {
        assert!(self.page >= 1, "unvalidated page number {}", self.page);
        (self.page - 1) * self.page_size
    }

    /// Returns the column name to sort by.
    ///
    /// The returned name is interpolated into SQL text, so this panics if the
    /// sort key is not in the allow-list; callers must have run `validate`
    /// first.
    pub(crate) fn sort_column(&self) -> &str {
        let column = self.sort.strip_prefix('-').unwrap_or(&self.sort);
        assert!(SORT_COLUMNS.contains(&column), "unvalidated sort key {:?}", self.sort);
        column
    }

    /// Returns the SQL sort direction keyword for the sort key.
    pub(crate) fn sort_direction(&self) -> &'static str {
        if self.sort.starts_with('-') {
            "DESC"
        } else {
            "ASC"
        }
    }
}

/// Pagination details of a list query's result page.
#[derive(Clone, Constructor, Debug, Default, Eq, Getters, PartialEq, Serialize)]
pub struct Metadata {
    /// Page number the entries belong to.
    current_page: u64,

    /// Requested page size.
    page_size: u64,

    /// First page available, always 1 when there are any records.
    first_page: u64,

    /// Last page available given the total record count.
    last_page: u64,

    /// Total number of records matching the query across all pages.
    total_records: u64,
}

impl Metadata {
    /// Computes the metadata for a result page.  An empty result set yields
    /// all-zero metadata.
    pub(crate) fn compute(total_records: u64, page: u64, page_size: u64) -> Metadata {
        if total_records == 0 {
            return Metadata::default();
        }
        Metadata {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: total_records.div_ceil(page_size),
            total_records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Convenience helper that validates `filters` and returns the failing
    /// field names.
    fn validate(filters: &Filters) -> Result<(), Vec<String>> {
        let mut v = Validator::new();
        filters.validate(&mut v);
        v.into_result().map_err(|e| e.iter().map(|(f, _)| f.to_owned()).collect())
    }

    #[test]
    fn test_filters_defaults() {
        let filters: Filters = serde_json::from_str("{}").unwrap();
        assert_eq!(Filters::new(1, 20, "id".to_owned()), filters);
        assert_eq!(filters, Filters::default());
    }

    #[test]
    fn test_filters_validate_ok() {
        assert_eq!(Ok(()), validate(&Filters::default()));
        assert_eq!(Ok(()), validate(&Filters::new(10_000_000, 100, "-price".to_owned())));
        for sort in ["id", "title", "year", "price", "-id", "-title", "-year", "-price"] {
            assert_eq!(Ok(()), validate(&Filters::new(1, 1, sort.to_owned())), "sort: {}", sort);
        }
    }

    #[test]
    fn test_filters_validate_page() {
        assert_eq!(
            Err(vec!["page".to_owned()]),
            validate(&Filters::new(0, 20, "id".to_owned()))
        );
        assert_eq!(
            Err(vec!["page".to_owned()]),
            validate(&Filters::new(10_000_001, 20, "id".to_owned()))
        );
    }

    #[test]
    fn test_filters_validate_page_size() {
        assert_eq!(
            Err(vec!["page_size".to_owned()]),
            validate(&Filters::new(1, 0, "id".to_owned()))
        );
        assert_eq!(
            Err(vec!["page_size".to_owned()]),
            validate(&Filters::new(1, 101, "id".to_owned()))
        );
    }

    #[test]
    fn test_filters_validate_sort() {
        for sort in ["version", "-version", "id; DROP TABLE materials", "", "-", "--id"] {
            assert_eq!(
                Err(vec!["sort".to_owned()]),
                validate(&Filters::new(1, 20, sort.to_owned())),
                "sort: {}",
                sort
            );
        }
    }

    #[test]
    fn test_filters_limit_offset() {
        let filters = Filters::new(3, 25, "id".to_owned());
        assert_eq!(25, filters.limit());
        assert_eq!(50, filters.offset());

        let filters = Filters::default();
        assert_eq!(20, filters.limit());
        assert_eq!(0, filters.offset());
    }

    #[test]
    fn test_filters_sort_column_and_direction() {
        let filters = Filters::new(1, 20, "year".to_owned());
        assert_eq!("year", filters.sort_column());
        assert_eq!("ASC", filters.sort_direction());

        let filters = Filters::new(1, 20, "-price".to_owned());
        assert_eq!("price", filters.sort_column());
        assert_eq!("DESC", filters.sort_direction());
    }

    #[test]
    #[should_panic(expected = "unvalidated sort key")]
    fn test_filters_sort_column_rejects_unvalidated_keys() {
        let _ = Filters::new(1, 20, "version".to_owned()).sort_column();
    }

    #[test]
    #[should_panic(expected = "unvalidated page number")]
    fn test_filters_offset_rejects_unvalidated_page() {
        let _ = Filters::new(0, 20, "id".to_owned()).offset();
    }

    #[test]
    fn test_metadata_compute_empty() {
        assert_eq!(Metadata::default(), Metadata::compute(0, 3, 20));
        assert_eq!(0, *Metadata::compute(0, 3, 20).total_records());
    }

    #[test]
    fn test_metadata_compute_rounding() {
        assert_eq!(Metadata::new(1, 20, 1, 1, 1), Metadata::compute(1, 1, 20));
        assert_eq!(Metadata::new(1, 20, 1, 1, 20), Metadata::compute(20, 1, 20));
        assert_eq!(Metadata::new(1, 20, 1, 2, 21), Metadata::compute(21, 1, 20));
        assert_eq!(Metadata::new(4, 5, 1, 7, 33), Metadata::compute(33, 4, 5));
    }
}
