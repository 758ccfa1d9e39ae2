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

//! Database operations to manipulate catalog materials.

#[cfg(feature = "postgres")]
use crate::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use crate::db::sqlite;
use crate::db::{bounded, DbError, DbResult, Executor};
use crate::model::{Filters, Material, Metadata, Price, Version};
use futures::TryStreamExt;
use sqlx::Row;
use time::OffsetDateTime;

/// Validates that a statement affecting the material `id` touched at most 1 row, mapping zero
/// affected rows to `missing`.
fn ensure_one_row(id: i64, affected: u64, missing: DbError) -> DbResult<()> {
    match affected {
        0 => Err(missing),
        1 => Ok(()),
        _ => Err(DbError::BackendError(format!(
            "Statement for material {} affected {} rows",
            id, affected
        ))),
    }
}

/// Initializes the database schema.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ref mut ex) => {
            postgres::run_schema(ex, include_str!("postgres.sql")).await
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ref mut ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Inserts a new material and returns its server-assigned id.
///
/// The caller supplies the `created_at` timestamp; the version takes the schema default of 1.
pub async fn create(
    ex: &mut Executor,
    title: &str,
    year: i32,
    price: Price,
    created_at: OffsetDateTime,
) -> DbResult<i64> {
    bounded(async move {
        match ex {
            #[cfg(feature = "postgres")]
            Executor::Postgres(ref mut ex) => {
                let query_str = "
                    INSERT INTO materials (title, year, price, created_at)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id
                ";
                let row = sqlx::query(query_str)
                    .bind(title)
                    .bind(year)
                    .bind(price.as_i32())
                    .bind(created_at)
                    .fetch_one(ex.conn())
                    .await
                    .map_err(postgres::map_sqlx_error)?;
                row.try_get("id").map_err(postgres::map_sqlx_error)
            }

            #[cfg(any(feature = "sqlite", test))]
            Executor::Sqlite(ref mut ex) => {
                let (created_at_sec, created_at_nsec) = sqlite::unpack_timestamp(created_at);

                let query_str = "
                    INSERT INTO materials (title, year, price, created_at_sec, created_at_nsec)
                    VALUES (?, ?, ?, ?, ?)
                ";
                let result = sqlx::query(query_str)
                    .bind(title)
                    .bind(year)
                    .bind(price.as_i32())
                    .bind(created_at_sec)
                    .bind(created_at_nsec)
                    .execute(ex.conn())
                    .await
                    .map_err(sqlite::map_sqlx_error)?;
                Ok(result.last_insert_rowid())
            }

            #[allow(unused)]
            _ => unreachable!(),
        }
    })
    .await
}

/// Fetches the material with the given `id`.
///
/// Ids below 1 are never assigned, so they fail fast with `NotFound` without touching the
/// database.
pub async fn get(ex: &mut Executor, id: i64) -> DbResult<Material> {
    if id < 1 {
        return Err(DbError::NotFound);
    }

    bounded(async move {
        let maybe_material = match ex {
            #[cfg(feature = "postgres")]
            Executor::Postgres(ref mut ex) => {
                let query_str = "
                    SELECT id, title, year, price, created_at, version
                    FROM materials
                    WHERE id = $1
                ";
                match sqlx::query(query_str)
                    .bind(id)
                    .fetch_optional(ex.conn())
                    .await
                    .map_err(postgres::map_sqlx_error)?
                {
                    Some(row) => Some(postgres_row_to_material(&row)?),
                    None => None,
                }
            }

            #[cfg(any(feature = "sqlite", test))]
            Executor::Sqlite(ref mut ex) => {
                let query_str = "
                    SELECT id, title, year, price, created_at_sec, created_at_nsec, version
                    FROM materials
                    WHERE id = ?
                ";
                match sqlx::query(query_str)
                    .bind(id)
                    .fetch_optional(ex.conn())
                    .await
                    .map_err(sqlite::map_sqlx_error)?
                {
                    Some(row) => Some(sqlite_row_to_material(&row)?),
                    None => None,
                }
            }

            #[allow(unused)]
            _ => unreachable!(),
        };
        maybe_material.ok_or(DbError::NotFound)
    })
    .await
}

/// Persists the mutable fields of `material` and returns the new version.
///
/// The statement only matches the row if it still carries the version recorded in `material`,
/// which is how concurrent updates against the same entity are detected: a row that changed or
/// disappeared since `material` was read yields `DbError::Conflict` and mutates nothing.
pub async fn update(ex: &mut Executor, material: &Material) -> DbResult<Version> {
    bounded(async move {
        let rows_affected = match ex {
            #[cfg(feature = "postgres")]
            Executor::Postgres(ref mut ex) => {
                let query_str = "
                    UPDATE materials
                    SET title = $1, year = $2, price = $3, version = version + 1
                    WHERE id = $4 AND version = $5
                ";
                sqlx::query(query_str)
                    .bind(material.title())
                    .bind(*material.year())
                    .bind(material.price().as_i32())
                    .bind(*material.id())
                    .bind(material.version().as_i32())
                    .execute(ex.conn())
                    .await
                    .map_err(postgres::map_sqlx_error)?
                    .rows_affected()
            }

            #[cfg(any(feature = "sqlite", test))]
            Executor::Sqlite(ref mut ex) => {
                let query_str = "
                    UPDATE materials
                    SET title = ?, year = ?, price = ?, version = version + 1
                    WHERE id = ? AND version = ?
                ";
                sqlx::query(query_str)
                    .bind(material.title())
                    .bind(*material.year())
                    .bind(material.price().as_i32())
                    .bind(*material.id())
                    .bind(material.version().as_i32())
                    .execute(ex.conn())
                    .await
                    .map_err(sqlite::map_sqlx_error)?
                    .rows_affected()
            }

            #[allow(unused)]
            _ => unreachable!(),
        };
        ensure_one_row(*material.id(), rows_affected, DbError::Conflict)?;
        Ok(material.version().next())
    })
    .await
}

/// Deletes the material with the given `id`.
///
/// Ids below 1 are never assigned, so they fail fast with `NotFound` without touching the
/// database.
pub async fn delete(ex: &mut Executor, id: i64) -> DbResult<()> {
    if id < 1 {
        return Err(DbError::NotFound);
    }

    bounded(async move {
        let rows_affected = match ex {
            #[cfg(feature = "postgres")]
            Executor::Postgres(ref mut ex) => {
                let query_str = "DELETE FROM materials WHERE id = $1";
                sqlx::query(query_str)
                    .bind(id)
                    .execute(ex.conn())
                    .await
                    .map_err(postgres::map_sqlx_error)?
                    .rows_affected()
            }

            #[cfg(any(feature = "sqlite", test))]
            Executor::Sqlite(ref mut ex) => {
                let query_str = "DELETE FROM materials WHERE id = ?";
                sqlx::query(query_str)
                    .bind(id)
                    .execute(ex.conn())
                    .await
                    .map_err(sqlite::map_sqlx_error)?
                    .rows_affected()
            }

            #[allow(unused)]
            _ => unreachable!(),
        };
        ensure_one_row(id, rows_affected, DbError::NotFound)
    })
    .await
}

/// Fetches the page of materials selected by `filters` whose title contains `title` as a
/// literal, case-insensitive substring (an empty `title` matches everything; pattern
/// metacharacters have no special meaning), together with the pagination metadata for the full
/// result set.
///
/// The total record count is computed with a window function in the same pass as the page
/// itself, so selection and counting always observe the same snapshot.  `filters` must have been
/// validated beforehand because its sort key is interpolated into the query.
pub async fn list(
    ex: &mut Executor,
    title: &str,
    filters: &Filters,
) -> DbResult<(Vec<Material>, Metadata)> {
    let limit = i64::try_from(filters.limit()).expect("Validated page_size must have fit");
    let offset = i64::try_from(filters.offset()).expect("Validated page must have fit");

    bounded(async move {
        let mut materials = vec![];
        let mut total_records = 0u64;

        match ex {
            #[cfg(feature = "postgres")]
            Executor::Postgres(ref mut ex) => {
                // The sort key comes from a closed allow-list, checked again by sort_column().
                let query_str = format!(
                    "
                    SELECT count(*) OVER() AS total_records,
                        id, title, year, price, created_at, version
                    FROM materials
                    WHERE ($1 = '' OR strpos(lower(title), lower($1)) > 0)
                    ORDER BY {} {}, id ASC
                    LIMIT $2 OFFSET $3
                    ",
                    filters.sort_column(),
                    filters.sort_direction()
                );
                let mut rows = sqlx::query(&query_str)
                    .bind(title)
                    .bind(limit)
                    .bind(offset)
                    .fetch(ex.conn());

                while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                    let total: i64 =
                        row.try_get("total_records").map_err(postgres::map_sqlx_error)?;
                    total_records = parse_total_records(total)?;
                    materials.push(postgres_row_to_material(&row)?);
                }
            }

            #[cfg(any(feature = "sqlite", test))]
            Executor::Sqlite(ref mut ex) => {
                let query_str = format!(
                    "
                    SELECT count(*) OVER() AS total_records,
                        id, title, year, price, created_at_sec, created_at_nsec, version
                    FROM materials
                    WHERE (? = '' OR instr(lower(title), lower(?)) > 0)
                    ORDER BY {} {}, id ASC
                    LIMIT ? OFFSET ?
                    ",
                    filters.sort_column(),
                    filters.sort_direction()
                );
                let mut rows = sqlx::query(&query_str)
                    .bind(title)
                    .bind(title)
                    .bind(limit)
                    .bind(offset)
                    .fetch(ex.conn());

                while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                    let total: i64 =
                        row.try_get("total_records").map_err(sqlite::map_sqlx_error)?;
                    total_records = parse_total_records(total)?;
                    materials.push(sqlite_row_to_material(&row)?);
                }
            }

            #[allow(unused)]
            _ => unreachable!(),
        }

        // A page past the end of the result set selects no rows, so the window count is
        // unavailable and the metadata comes back zero-valued, same as for an empty match.
        let metadata = Metadata::compute(total_records, *filters.page(), *filters.page_size());
        Ok((materials, metadata))
    })
    .await
}

/// Converts the window-function count of a list query into a `u64`.
fn parse_total_records(total: i64) -> DbResult<u64> {
    u64::try_from(total)
        .map_err(|e| DbError::DataIntegrityError(format!("Invalid total_records {}: {}", total, e)))
}

/// Creates a `Material` from a PostgreSQL row.
#[cfg(feature = "postgres")]
fn postgres_row_to_material(row: &sqlx::postgres::PgRow) -> DbResult<Material> {
    let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
    let title: String = row.try_get("title").map_err(postgres::map_sqlx_error)?;
    let year: i32 = row.try_get("year").map_err(postgres::map_sqlx_error)?;
    let price: i32 = row.try_get("price").map_err(postgres::map_sqlx_error)?;
    let created_at: OffsetDateTime = row.try_get("created_at").map_err(postgres::map_sqlx_error)?;
    let version: i32 = row.try_get("version").map_err(postgres::map_sqlx_error)?;

    Ok(Material::new(id, title, year, Price::new(price), created_at, Version::from_i32(version)?))
}

/// Creates a `Material` from an SQLite row.
#[cfg(any(feature = "sqlite", test))]
fn sqlite_row_to_material(row: &sqlx::sqlite::SqliteRow) -> DbResult<Material> {
    let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
    let title: String = row.try_get("title").map_err(sqlite::map_sqlx_error)?;
    let year: i32 = row.try_get("year").map_err(sqlite::map_sqlx_error)?;
    let price: i32 = row.try_get("price").map_err(sqlite::map_sqlx_error)?;
    let created_at_sec: i64 = row.try_get("created_at_sec").map_err(sqlite::map_sqlx_error)?;
    let created_at_nsec: i64 = row.try_get("created_at_nsec").map_err(sqlite::map_sqlx_error)?;
    let version: i32 = row.try_get("version").map_err(sqlite::map_sqlx_error)?;

    let created_at = sqlite::build_timestamp(created_at_sec, created_at_nsec)?;
    Ok(Material::new(id, title, year, Price::new(price), created_at, Version::from_i32(version)?))
}
