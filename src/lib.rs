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

//! Resource-model core for a crafting-materials catalog service.
//!
//! This crate implements the storage-facing half of a conventional CRUD
//! service and adheres to the following layered architecture:
//!
//! 1.  `model`: High-level data types that represent concepts in the domain of
//!     the application: the `Material` entity, the `Price` value type with its
//!     custom text encoding, and the pagination `Filters` and `Metadata`.
//!
//! 1.  `db`: The persistence layer.  Provides a thin abstraction over a
//!     PostgreSQL database (for production use) and a SQLite database
//!     (primarily for unit tests), plus the five store operations on the
//!     `materials` table.
//!
//! 1.  `driver`: The business logic layer.  Validates untrusted inputs and
//!     coordinates access to the database.  This is the surface consumed by
//!     an HTTP layer, which lives outside of this crate.
//!
//! There are result and error types in every layer, such as `DbResult` and
//! `DriverResult`, and errors float up transparently via the `?` operator.
//!
//! Concurrent updates to a material are detected optimistically: every update
//! must present the version it last observed and loses with a conflict error
//! if another writer got there first.  There are no locks, no caches and no
//! multi-statement transactions anywhere in this crate.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

pub mod clocks;
pub mod db;
pub mod driver;
pub mod env;
pub mod model;
pub mod validation;
