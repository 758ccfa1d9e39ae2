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

//! Common utilities to write driver tests.

use crate::clocks::testutils::SettableClock;
use crate::db::{materials, sqlite, Db};
use crate::driver::Driver;
use std::sync::Arc;
use time::macros::datetime;

/// State of a running test.
pub(super) struct TestContext {
    /// The driver under test.
    driver: Driver,

    /// The clock injected into `driver`, exposed to let tests move time.
    clock: Arc<SettableClock>,

    /// Direct access to the database that backs `driver`.
    db: Arc<dyn Db + Send + Sync>,
}

impl TestContext {
    /// Initializes the driver against an empty in-memory database with a clock frozen at an
    /// arbitrary but known instant.
    pub(super) async fn setup() -> TestContext {
        let db: Arc<dyn Db + Send + Sync> = Arc::from(sqlite::testutils::setup().await);
        let mut ex = db.ex().await.unwrap();
        materials::init_schema(&mut ex).await.unwrap();
        drop(ex);

        let clock = Arc::new(SettableClock::new(datetime!(2023-06-12 10:00:00 UTC)));
        let driver = Driver::new(db.clone(), clock.clone());
        TestContext { driver, clock, db }
    }

    /// Returns a clone of the driver for a one-shot operation.
    pub(super) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Returns the clock injected into the driver.
    pub(super) fn clock(&self) -> &SettableClock {
        &self.clock
    }

    /// Returns the database that backs the driver.
    pub(super) fn db(&self) -> &Arc<dyn Db + Send + Sync> {
        &self.db
    }
}
