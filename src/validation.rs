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

//! Generic rule-checking helper that collects field-keyed error messages.
//!
//! Validation never short-circuits: every failing check is recorded so that a
//! caller can report all problems in a single response.  A `Validator` is
//! constructed fresh for every validation pass and discarded afterwards; it
//! carries no cross-request state.

use std::collections::BTreeMap;
use std::fmt;

/// Accumulator for field-keyed validation error messages.
#[derive(Debug, Default)]
pub struct Validator {
    /// Collected errors, keyed by field name.  Only the first message recorded
    /// for a field is kept.
    errors: BTreeMap<String, String>,
}

impl Validator {
    /// Creates an empty validator.
    pub fn new() -> Self {
        Validator::default()
    }

    /// Records `message` under `field` when `ok` is false and no message has
    /// been recorded for that field yet.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    /// Records `message` under `field` unconditionally, unless the field
    /// already has a message.
    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.entry(field.to_owned()).or_insert_with(|| message.to_owned());
    }

    /// Returns true if no errors have been recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consumes the validator, yielding the collected errors if there are any.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

/// Aggregate of all validation failures from one validation pass.
///
/// Guaranteed to be non-empty: a successful pass yields `Ok(())` from
/// `Validator::into_result` instead.
#[derive(Debug, Eq, PartialEq)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    /// Returns the message recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Returns the number of fields with a recorded error.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no errors are recorded.  Never the case in practice
    /// but required for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
