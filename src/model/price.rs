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

//! The `Price` data type.

use derive_more::Constructor;
use serde::de::Visitor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a textual price cannot be decoded.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
#[error("invalid price format")]
pub struct InvalidPriceFormat;

/// A material's price, with a fixed textual encoding of the form `<int> $`.
///
/// The quantity is deliberately unbounded here: decoding accepts any 32-bit
/// integer, and positivity is an entity validation rule enforced before any
/// write (see `Material`).  The wire representation is a JSON string, e.g.
/// the integer `100` encodes as `"100 $"`.
#[derive(Clone, Constructor, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Price(i32);

impl Price {
    /// Returns the price quantity as an `i32`.
    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} $", self.0)
    }
}

impl FromStr for Price {
    type Err = InvalidPriceFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(quantity), Some("$"), None) => {
                quantity.parse::<i32>().map(Price).map_err(|_| InvalidPriceFormat)
            }
            _ => Err(InvalidPriceFormat),
        }
    }
}

impl Serialize for Price {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Visitor to deserialize a `Price` from a string.
struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(r#"an integer quantity followed by " $""#)
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Price::from_str(v).map_err(|e| E::custom(format!("{}", e)))
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(PriceVisitor)
    }
}
