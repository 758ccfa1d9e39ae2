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

//! The `Material` entity and its validation rules.

use crate::model::{ModelError, ModelResult, Price};
use crate::validation::Validator;
use derive_getters::Getters;
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Maximum length of a material title in bytes, per the schema.
const MAX_TITLE_BYTES: usize = 500;

/// Oldest acceptable year for a material.
const MIN_YEAR: i32 = 1888;

/// A material's version number, used as an optimistic-concurrency token.
///
/// Every successful update increments the version by exactly one; reads never
/// change it.  We store this as a `u32` but guarantee that it is usable in an
/// `i32` context because the database backends need it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Version(u32);

impl Version {
    /// Returns the initial version assigned to newly inserted materials.
    pub fn initial() -> Version {
        Version(1)
    }

    /// Returns the version recorded by the next successful update.
    pub fn next(self) -> Version {
        Version(self.0 + 1)
    }

    /// Creates a version from an `i32` with range validation.
    pub(crate) fn from_i32(version: i32) -> ModelResult<Version> {
        match u32::try_from(version) {
            Ok(version) => Ok(Version(version)),
            Err(e) => Err(ModelError(format!("Version cannot be represented: {}", e))),
        }
    }

    /// Returns the version as an `i32`.
    pub(crate) fn as_i32(&self) -> i32 {
        i32::try_from(self.0).expect("i32 compatibility validated at construction time")
    }

    /// Returns the version as a `u32`.
    #[cfg(test)]
    pub(crate) fn as_u32(&self) -> u32 {
        self.0
    }
}

/// A sellable crafting material as persisted in the store.
///
/// The `id` is assigned by the store at insertion time and is immutable and
/// never reused; `created_at` is set once at insertion and never exposed in
/// serialized output.
#[derive(Clone, Constructor, Debug, Getters, PartialEq, Serialize)]
pub struct Material {
    /// Server-assigned unique identifier.
    id: i64,

    /// Human-readable name of the material.
    title: String,

    /// Calendar year the material entered the catalog.
    year: i32,

    /// Price of the material, serialized through its custom text codec.
    price: Price,

    /// Insertion timestamp.  Recorded for tracing purposes only.
    #[serde(skip)]
    created_at: OffsetDateTime,

    /// Optimistic-concurrency token.
    version: Version,
}

impl Material {
    /// Runs all validation rules against this material, recording every
    /// failure in `v`.  `now` supplies the upper bound for the year check.
    pub fn validate(&self, v: &mut Validator, now: OffsetDateTime) {
        validate_fields(v, &self.title, self.year, self.price, now);
    }

    /// Returns the same material carrying a new `version`.
    pub(crate) fn with_version(mut self, version: Version) -> Material {
        self.version = version;
        self
    }
}

/// Input fields to create a new material, as decoded from a request body.
#[derive(Constructor, Debug, Deserialize, Getters, PartialEq)]
pub struct NewMaterial {
    /// Human-readable name of the material.
    title: String,

    /// Calendar year the material entered the catalog.
    year: i32,

    /// Price of the material, decoded through its custom text codec.
    price: Price,
}

impl NewMaterial {
    /// Runs all validation rules against the input fields, recording every
    /// failure in `v`.  `now` supplies the upper bound for the year check.
    pub fn validate(&self, v: &mut Validator, now: OffsetDateTime) {
        validate_fields(v, &self.title, self.year, self.price, now);
    }

    /// Decomposes the input into its owned parts.
    pub(crate) fn into_parts(self) -> (String, i32, Price) {
        (self.title, self.year, self.price)
    }
}

/// Partial update to an existing material, as decoded from a request body.
/// Absent fields keep their current value.
#[derive(Constructor, Debug, Default, Deserialize, PartialEq)]
pub struct MaterialPatch {
    /// Replacement title, if any.
    title: Option<String>,

    /// Replacement year, if any.
    year: Option<i32>,

    /// Replacement price, if any.
    price: Option<Price>,
}

impl MaterialPatch {
    /// Applies the patch on top of `material`, leaving id, creation time and
    /// version untouched.
    pub(crate) fn apply(self, mut material: Material) -> Material {
        if let Some(title) = self.title {
            material.title = title;
        }
        if let Some(year) = self.year {
            material.year = year;
        }
        if let Some(price) = self.price {
            material.price = price;
        }
        material
    }
}

/// Shared validation rules for a material's mutable fields.  All checks run
/// unconditionally so that every failure is collected.
fn validate_fields(v: &mut Validator, title: &str, year: i32, price: Price, now: OffsetDateTime) {
    v.check(!title.is_empty(), "title", "must be provided");
    v.check(title.len() <= MAX_TITLE_BYTES, "title", "must not be more than 500 bytes long");
    v.check(year >= MIN_YEAR, "year", "must be at least 1888");
    v.check(year <= now.year(), "year", "must not be in the future");
    v.check(price.as_i32() > 0, "price", "must be a positive integer");
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    /// Fixed validation instant so that the year upper bound is predictable.
    const NOW: OffsetDateTime = datetime!(2023-06-12 10:00:00 UTC);

    /// Convenience helper to validate a `(title, year, price)` triple.
    fn validate(title: &str, year: i32, price: i32) -> Result<(), Vec<String>> {
        let mut v = Validator::new();
        validate_fields(&mut v, title, year, Price::new(price), NOW);
        v.into_result().map_err(|e| e.iter().map(|(f, _)| f.to_owned()).collect())
    }

    #[test]
    fn test_version_sequence() {
        assert_eq!(1, Version::initial().as_u32());
        assert_eq!(2, Version::initial().next().as_u32());
        assert_eq!(Version::initial().next(), Version::from_i32(2).unwrap());
    }

    #[test]
    fn test_version_from_i32_negative() {
        assert!(Version::from_i32(-1).is_err());
        assert_eq!(5, Version::from_i32(5).unwrap().as_i32());
    }

    #[test]
    fn test_validate_ok() {
        assert_eq!(Ok(()), validate("Oak Resin", 2020, 50));
        assert_eq!(Ok(()), validate("x", MIN_YEAR, 1));
        assert_eq!(Ok(()), validate(&"x".repeat(MAX_TITLE_BYTES), NOW.year(), i32::MAX));
    }

    #[test]
    fn test_validate_title() {
        assert_eq!(Err(vec!["title".to_owned()]), validate("", 2020, 50));
        assert_eq!(Err(vec!["title".to_owned()]), validate(&"x".repeat(501), 2020, 50));
    }

    #[test]
    fn test_validate_title_counts_bytes_not_chars() {
        // 170 three-byte characters are only 170 characters but 510 bytes.
        let title = "\u{20ac}".to_string().repeat(170);
        assert_eq!(170, title.chars().count());
        assert_eq!(Err(vec!["title".to_owned()]), validate(&title, 2020, 50));
    }

    #[test]
    fn test_validate_year() {
        assert_eq!(Err(vec!["year".to_owned()]), validate("Oak Resin", 1887, 50));
        assert_eq!(Err(vec!["year".to_owned()]), validate("Oak Resin", NOW.year() + 1, 50));
        assert_eq!(Ok(()), validate("Oak Resin", NOW.year(), 50));
    }

    #[test]
    fn test_validate_price_exactly_one_error() {
        for bad in [0, -1, i32::MIN] {
            assert_eq!(Err(vec!["price".to_owned()]), validate("Oak Resin", 2020, bad));
        }
    }

    #[test]
    fn test_validate_collects_all_failures() {
        assert_eq!(
            Err(vec!["price".to_owned(), "title".to_owned(), "year".to_owned()]),
            validate("", 1500, 0)
        );
    }

    #[test]
    fn test_material_serialization_hides_created_at() {
        let material =
            Material::new(7, "Oak Resin".to_owned(), 2020, Price::new(50), NOW, Version::initial());
        let json = serde_json::to_value(&material).unwrap();
        assert_eq!(
            serde_json::json!({
                "id": 7,
                "title": "Oak Resin",
                "year": 2020,
                "price": "50 $",
                "version": 1,
            }),
            json
        );
    }

    #[test]
    fn test_newmaterial_deserialization() {
        let new: NewMaterial =
            serde_json::from_str(r#"{"title": "Oak Resin", "year": 2020, "price": "50 $"}"#)
                .unwrap();
        assert_eq!(NewMaterial::new("Oak Resin".to_owned(), 2020, Price::new(50)), new);
    }

    #[test]
    fn test_materialpatch_deserialization_and_apply() {
        let patch: MaterialPatch = serde_json::from_str(r#"{"price": "75 $"}"#).unwrap();
        assert_eq!(MaterialPatch::new(None, None, Some(Price::new(75))), patch);

        let material =
            Material::new(7, "Oak Resin".to_owned(), 2020, Price::new(50), NOW, Version::initial());
        let patched = patch.apply(material);
        assert_eq!(
            Material::new(7, "Oak Resin".to_owned(), 2020, Price::new(75), NOW, Version::initial()),
            patched
        );
    }
}
