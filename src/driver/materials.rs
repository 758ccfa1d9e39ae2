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

//! Driver operations on catalog materials.

use crate::db::materials;
use crate::driver::{Driver, DriverError, DriverResult};
use crate::model::{Filters, Material, MaterialPatch, Metadata, NewMaterial, Version};
use crate::validation::Validator;

impl Driver {
    /// Validates and persists a new material, returning the stored entity with its assigned id
    /// and initial version.
    pub async fn create_material(self, new: NewMaterial) -> DriverResult<Material> {
        let now = self.clock.now_utc();

        let mut v = Validator::new();
        new.validate(&mut v, now);
        v.into_result().map_err(DriverError::InvalidInput)?;

        let mut ex = self.db.ex().await?;
        let (title, year, price) = new.into_parts();
        let id = materials::create(&mut ex, &title, year, price, now).await?;
        Ok(Material::new(id, title, year, price, now, Version::initial()))
    }

    /// Fetches the material with the given `id`.
    pub async fn get_material(self, id: i64) -> DriverResult<Material> {
        let mut ex = self.db.ex().await?;
        Ok(materials::get(&mut ex, id).await?)
    }

    /// Applies `patch` to the material with the given `id` and persists the result, returning
    /// the updated entity with its bumped version.
    ///
    /// The write is conditional on the version observed by the read, so a material modified by
    /// someone else in between yields `DriverError::Conflict` and stays untouched.
    pub async fn update_material(self, id: i64, patch: MaterialPatch) -> DriverResult<Material> {
        let mut ex = self.db.ex().await?;
        let material = patch.apply(materials::get(&mut ex, id).await?);

        let mut v = Validator::new();
        material.validate(&mut v, self.clock.now_utc());
        v.into_result().map_err(DriverError::InvalidInput)?;

        let version = materials::update(&mut ex, &material).await?;
        Ok(material.with_version(version))
    }

    /// Deletes the material with the given `id`.
    pub async fn delete_material(self, id: i64) -> DriverResult<()> {
        let mut ex = self.db.ex().await?;
        Ok(materials::delete(&mut ex, id).await?)
    }

    /// Fetches the page of materials selected by `filters` whose title contains `title`,
    /// together with the pagination metadata for the full result set.
    pub async fn list_materials(
        self,
        title: &str,
        filters: Filters,
    ) -> DriverResult<(Vec<Material>, Metadata)> {
        let mut v = Validator::new();
        filters.validate(&mut v);
        v.into_result().map_err(DriverError::InvalidInput)?;

        let mut ex = self.db.ex().await?;
        Ok(materials::list(&mut ex, title, &filters).await?)
    }
}
