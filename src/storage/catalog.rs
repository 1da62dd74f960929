//! Postgres access for makes, colors, body styles, models and cars.

use crate::domain::{
    Car, CarModel, LookupEntity, LookupKind, Model, PagedResponse, Paging,
};
use crate::infra::retry::{retry, Backoff};
use crate::storage::{classify, schema, StoreError};
use crate::sync::{ModelRelations, RelationLookup};
use async_trait::async_trait;
use serde::Deserialize;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::collections::HashMap;

const FLATTEN_RELATIONS_SQL: &str = "SELECT make.name AS make,
        bs.name AS body_style,
        make.id AS make_id,
        bs.id AS body_style_id
    FROM models AS model
        INNER JOIN makes AS make ON model.make_id = make.id
        INNER JOIN body_styles AS bs ON model.body_style_id = bs.id
    WHERE model.id = $1
    LIMIT 1";

const MODEL_SELECT: &str = "SELECT model.id, model.name,
        make.id AS make_id, make.name AS make_name,
        bs.id AS body_style_id, bs.name AS body_style_name
    FROM models AS model
        INNER JOIN makes AS make ON model.make_id = make.id
        INNER JOIN body_styles AS bs ON model.body_style_id = bs.id";

const CAR_SELECT: &str = "SELECT car.id, car.year,
        model.id AS model_id, model.name AS model_name,
        make.id AS make_id, make.name AS make_name,
        bs.id AS body_style_id, bs.name AS body_style_name,
        c.id AS color_id, c.name AS color_name
    FROM cars AS car
        INNER JOIN models AS model ON car.model_id = model.id
        INNER JOIN makes AS make ON model.make_id = make.id
        INNER JOIN body_styles AS bs ON model.body_style_id = bs.id
        INNER JOIN colors AS c ON car.color_id = c.id";

const CAR_FILTER: &str = "strpos(make.name, $1) > 0
        AND strpos(model.name, $2) > 0
        AND strpos(c.name, $3) > 0
        AND strpos(bs.name, $4) > 0
        AND strpos(car.year::text, $5) > 0";

/// Substring filters for the relational car search. Missing fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogFilter {
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, rename = "bodyStyle")]
    pub body_style: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

impl CatalogFilter {
    /// Bind values in `CAR_FILTER` order, lowercased like the stored names.
    fn binds(&self) -> [String; 5] {
        let norm = |v: &Option<String>| v.as_deref().unwrap_or("").trim().to_lowercase();
        [
            norm(&self.make),
            norm(&self.model),
            norm(&self.color),
            norm(&self.body_style),
            norm(&self.year),
        ]
    }
}

#[derive(Clone)]
pub struct CatalogStore {
    pool: PgPool,
}

impl CatalogStore {
    /// Connects with bounded retries, then makes sure the tables exist.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        backoff: Backoff,
    ) -> Result<Self, StoreError> {
        let pool = retry("postgres", backoff, |_| {
            PgPoolOptions::new()
                .max_connections(max_connections)
                .connect(database_url)
        })
        .await?;
        schema::apply(&pool).await?;
        tracing::info!("db connected successfully");
        Ok(Self { pool })
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // --- lookups (makes, colors, body styles) ---

    pub async fn list_lookups(
        &self,
        kind: LookupKind,
        paging: Paging,
    ) -> Result<PagedResponse<LookupEntity>, StoreError> {
        let table = kind.table_name();
        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await?;
        let rows = sqlx::query(&format!(
            "SELECT id, name FROM {} ORDER BY id ASC LIMIT $1 OFFSET $2",
            table
        ))
        .bind(paging.limit)
        .bind(paging.offset)
        .fetch_all(&self.pool)
        .await?;
        let results = rows
            .iter()
            .map(|r| lookup_from_row(r, "id", "name"))
            .collect::<Result<_, _>>()?;
        Ok(PagedResponse { total, results })
    }

    pub async fn get_lookup(
        &self,
        kind: LookupKind,
        id: i64,
    ) -> Result<Option<LookupEntity>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT id, name FROM {} WHERE id = $1",
            kind.table_name()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| lookup_from_row(&r, "id", "name"))
            .transpose()
            .map_err(StoreError::from)
    }

    /// Looks up by (already normalized) name, optionally ignoring one id.
    pub async fn find_lookup_by_name(
        &self,
        kind: LookupKind,
        name: &str,
        excluding: Option<i64>,
    ) -> Result<Option<LookupEntity>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT id, name FROM {} WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2) LIMIT 1",
            kind.table_name()
        ))
        .bind(name)
        .bind(excluding)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| lookup_from_row(&r, "id", "name"))
            .transpose()
            .map_err(StoreError::from)
    }

    /// Returns the rows whose ids are in `ids`, in id order.
    pub async fn get_lookups_by_ids(
        &self,
        kind: LookupKind,
        ids: &[i64],
    ) -> Result<Vec<LookupEntity>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT id, name FROM {} WHERE id = ANY($1) ORDER BY id ASC",
            kind.table_name()
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|r| lookup_from_row(r, "id", "name"))
            .collect::<Result<_, _>>()
            .map_err(StoreError::from)
    }

    pub async fn insert_lookup(
        &self,
        kind: LookupKind,
        name: &str,
    ) -> Result<LookupEntity, StoreError> {
        let row = sqlx::query(&format!(
            "INSERT INTO {} (name) VALUES ($1) RETURNING id, name",
            kind.table_name()
        ))
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, &format!("a {} with the name '{}'", kind, name)))?;
        Ok(lookup_from_row(&row, "id", "name")?)
    }

    pub async fn update_lookup(
        &self,
        kind: LookupKind,
        id: i64,
        name: &str,
    ) -> Result<LookupEntity, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE {} SET name = $2 WHERE id = $1 RETURNING id, name",
            kind.table_name()
        ))
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify(e, &format!("a {} with the name '{}'", kind, name)))?;
        match row {
            Some(r) => Ok(lookup_from_row(&r, "id", "name")?),
            None => Err(StoreError::NotFound {
                entity: kind.label(),
                id,
            }),
        }
    }

    /// Returns `false` when no row had this id.
    pub async fn delete_lookup(&self, kind: LookupKind, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", kind.table_name()))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, &format!("{} with id {}", kind, id)))?;
        Ok(result.rows_affected() > 0)
    }

    // --- models ---

    pub async fn list_models(&self, paging: Paging) -> Result<PagedResponse<Model>, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM models")
            .fetch_one(&self.pool)
            .await?;
        let rows = sqlx::query(&format!(
            "{} ORDER BY model.id ASC LIMIT $1 OFFSET $2",
            MODEL_SELECT
        ))
        .bind(paging.limit)
        .bind(paging.offset)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<i64> = rows
            .iter()
            .map(|r| r.try_get::<i64, _>("id"))
            .collect::<Result<_, _>>()?;
        let mut colors = self.colors_for_models(&ids).await?;

        let results = rows
            .iter()
            .map(|r| {
                let id: i64 = r.try_get("id")?;
                model_from_row(r, colors.remove(&id).unwrap_or_default())
            })
            .collect::<Result<_, sqlx::Error>>()?;
        Ok(PagedResponse { total, results })
    }

    pub async fn get_model(&self, id: i64) -> Result<Option<Model>, StoreError> {
        let row = sqlx::query(&format!("{} WHERE model.id = $1", MODEL_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut colors = self.colors_for_models(&[id]).await?;
        Ok(Some(model_from_row(
            &row,
            colors.remove(&id).unwrap_or_default(),
        )?))
    }

    pub async fn find_model_by_name(
        &self,
        name: &str,
        excluding: Option<i64>,
    ) -> Result<Option<i64>, StoreError> {
        let id = sqlx::query_scalar(
            "SELECT id FROM models WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2) LIMIT 1",
        )
        .bind(name)
        .bind(excluding)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    /// Inserts the model row and its color links in one transaction.
    pub async fn insert_model(
        &self,
        name: &str,
        make_id: i64,
        body_style_id: i64,
        color_ids: &[i64],
    ) -> Result<i64, StoreError> {
        let what = format!("a model with the name '{}'", name);
        let mut tx = self.pool.begin().await?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO models (name, make_id, body_style_id) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(name)
        .bind(make_id)
        .bind(body_style_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| classify(e, &what))?;
        link_colors(&mut tx, id, color_ids).await?;
        tx.commit().await?;
        Ok(id)
    }

    /// Rewrites the model row and replaces its color links in one transaction.
    pub async fn update_model(
        &self,
        id: i64,
        name: &str,
        make_id: i64,
        body_style_id: i64,
        color_ids: &[i64],
    ) -> Result<(), StoreError> {
        let what = format!("a model with the name '{}'", name);
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE models SET name = $2, make_id = $3, body_style_id = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(name)
        .bind(make_id)
        .bind(body_style_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| classify(e, &what))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "model", id });
        }
        sqlx::query("DELETE FROM model_colors WHERE model_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link_colors(&mut tx, id, color_ids).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn delete_model(&self, id: i64) -> Result<bool, StoreError> {
        let what = format!("model with id {}", id);
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM model_colors WHERE model_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM models WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| classify(e, &what))?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn colors_for_models(
        &self,
        model_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<LookupEntity>>, StoreError> {
        let mut out: HashMap<i64, Vec<LookupEntity>> = HashMap::new();
        if model_ids.is_empty() {
            return Ok(out);
        }
        let rows = sqlx::query(
            "SELECT mc.model_id, c.id, c.name
             FROM model_colors AS mc
                INNER JOIN colors AS c ON mc.color_id = c.id
             WHERE mc.model_id = ANY($1)
             ORDER BY c.id ASC",
        )
        .bind(model_ids)
        .fetch_all(&self.pool)
        .await?;
        for row in rows {
            let model_id: i64 = row.try_get("model_id")?;
            out.entry(model_id)
                .or_default()
                .push(lookup_from_row(&row, "id", "name")?);
        }
        Ok(out)
    }

    // --- cars ---

    pub async fn list_cars(&self, paging: Paging) -> Result<PagedResponse<Car>, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars")
            .fetch_one(&self.pool)
            .await?;
        let rows = sqlx::query(&format!(
            "{} ORDER BY car.id ASC LIMIT $1 OFFSET $2",
            CAR_SELECT
        ))
        .bind(paging.limit)
        .bind(paging.offset)
        .fetch_all(&self.pool)
        .await?;
        let results = rows.iter().map(car_from_row).collect::<Result<_, _>>()?;
        Ok(PagedResponse { total, results })
    }

    pub async fn get_car(&self, id: i64) -> Result<Option<Car>, StoreError> {
        let row = sqlx::query(&format!("{} WHERE car.id = $1", CAR_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref()
            .map(car_from_row)
            .transpose()
            .map_err(StoreError::from)
    }

    pub async fn insert_car(
        &self,
        model_id: i64,
        color_id: i64,
        year: i32,
    ) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar(
            "INSERT INTO cars (model_id, color_id, year) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(model_id)
        .bind(color_id)
        .bind(year)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "car"))?;
        Ok(id)
    }

    pub async fn update_car(
        &self,
        id: i64,
        model_id: i64,
        color_id: i64,
        year: i32,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE cars SET model_id = $2, color_id = $3, year = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(model_id)
        .bind(color_id)
        .bind(year)
        .execute(&self.pool)
        .await
        .map_err(|e| classify(e, "car"))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "car", id });
        }
        Ok(())
    }

    pub async fn delete_car(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Relational car search: every provided filter must appear as a substring.
    pub async fn search_catalog(
        &self,
        filter: &CatalogFilter,
        paging: Paging,
    ) -> Result<PagedResponse<Car>, StoreError> {
        let [make, model, color, body_style, year] = filter.binds();

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM ({} WHERE {}) AS matched",
            CAR_SELECT, CAR_FILTER
        ))
        .bind(&make)
        .bind(&model)
        .bind(&color)
        .bind(&body_style)
        .bind(&year)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(&format!(
            "{} WHERE {} ORDER BY car.id ASC LIMIT $6 OFFSET $7",
            CAR_SELECT, CAR_FILTER
        ))
        .bind(&make)
        .bind(&model)
        .bind(&color)
        .bind(&body_style)
        .bind(&year)
        .bind(paging.limit)
        .bind(paging.offset)
        .fetch_all(&self.pool)
        .await?;
        let results = rows.iter().map(car_from_row).collect::<Result<_, _>>()?;
        Ok(PagedResponse { total, results })
    }
}

#[async_trait]
impl RelationLookup for CatalogStore {
    async fn model_relations(&self, model_id: i64) -> Result<Option<ModelRelations>, StoreError> {
        let row = sqlx::query(FLATTEN_RELATIONS_SQL)
            .bind(model_id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(ModelRelations {
            make: row.try_get("make")?,
            body_style: row.try_get("body_style")?,
            make_id: row.try_get("make_id")?,
            body_style_id: row.try_get("body_style_id")?,
        }))
    }
}

async fn link_colors(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    model_id: i64,
    color_ids: &[i64],
) -> Result<(), StoreError> {
    if color_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO model_colors (model_id, color_id)
         SELECT $1, color_id FROM UNNEST($2::BIGINT[]) AS color_id
         ON CONFLICT DO NOTHING",
    )
    .bind(model_id)
    .bind(color_ids)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

fn lookup_from_row(row: &PgRow, id_col: &str, name_col: &str) -> Result<LookupEntity, sqlx::Error> {
    Ok(LookupEntity {
        id: row.try_get(id_col)?,
        name: row.try_get(name_col)?,
    })
}

fn model_from_row(row: &PgRow, available_colors: Vec<LookupEntity>) -> Result<Model, sqlx::Error> {
    Ok(Model {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        make: lookup_from_row(row, "make_id", "make_name")?,
        body_style: lookup_from_row(row, "body_style_id", "body_style_name")?,
        available_colors,
    })
}

fn car_from_row(row: &PgRow) -> Result<Car, sqlx::Error> {
    Ok(Car {
        id: row.try_get("id")?,
        year: row.try_get("year")?,
        model: CarModel {
            id: row.try_get("model_id")?,
            name: row.try_get("model_name")?,
            make: Some(lookup_from_row(row, "make_id", "make_name")?),
            body_style: Some(lookup_from_row(row, "body_style_id", "body_style_name")?),
        },
        color: lookup_from_row(row, "color_id", "color_name")?,
    })
}
