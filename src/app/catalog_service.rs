//! The catalog service.
//!
//! Validates writes against the relational store, applies them, and then hands
//! a post-commit [`CatalogEvent`] to the sync hooks. A failed index update never
//! turns a successful write into an error.

use crate::app::inputs::{CarInput, LookupInput, ModelInput, ValidModel};
use crate::app::CatalogError;
use crate::domain::events::{changed_car_fields, changed_lookup_fields, changed_model_fields};
use crate::domain::{Car, CatalogEvent, EntityEvent, LookupEntity, LookupKind, Model, PagedResponse, Paging};
use crate::storage::{CatalogFilter, CatalogStore};
use crate::sync::{Outcome, SyncHooks};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Page size used when walking every car for a reindex.
const REINDEX_PAGE: i64 = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReindexReport {
    pub total: i64,
    pub indexed: u64,
    pub failed: u64,
}

#[derive(Clone)]
pub struct CatalogService {
    store: CatalogStore,
    hooks: Arc<SyncHooks>,
}

impl CatalogService {
    pub fn new(store: CatalogStore, hooks: Arc<SyncHooks>) -> Self {
        Self { store, hooks }
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn hooks(&self) -> &Arc<SyncHooks> {
        &self.hooks
    }

    async fn publish(&self, event: CatalogEvent) -> Outcome {
        self.hooks.dispatch(&event).await
    }

    // --- makes, colors, body styles ---

    pub async fn list_lookups(
        &self,
        kind: LookupKind,
        paging: Paging,
    ) -> Result<PagedResponse<LookupEntity>, CatalogError> {
        Ok(self.store.list_lookups(kind, paging).await?)
    }

    pub async fn get_lookup(&self, kind: LookupKind, id: i64) -> Result<LookupEntity, CatalogError> {
        self.store
            .get_lookup(kind, id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Can't find {} with id {}", kind, id)))
    }

    pub async fn create_lookup(
        &self,
        kind: LookupKind,
        input: &LookupInput,
    ) -> Result<LookupEntity, CatalogError> {
        let name = input.validated_name()?;
        self.ensure_lookup_name_free(kind, &name, None).await?;

        let created = self.store.insert_lookup(kind, &name).await?;
        tracing::info!(entity = %kind, id = created.id, name = %created.name, "created");
        self.publish(CatalogEvent::lookup(kind, EntityEvent::Inserted(created.clone())))
            .await;
        Ok(created)
    }

    /// Renames a lookup entity. The update event fires even when the name is
    /// unchanged so the index is re-propagated.
    pub async fn update_lookup(
        &self,
        kind: LookupKind,
        id: i64,
        input: &LookupInput,
    ) -> Result<LookupEntity, CatalogError> {
        let name = input.validated_name()?;
        self.ensure_lookup_name_free(kind, &name, Some(id)).await?;

        let before = self.store.get_lookup(kind, id).await?.ok_or_else(|| {
            CatalogError::Unprocessable(format!("Can't find {} with id {}", kind, id))
        })?;
        let updated = self.store.update_lookup(kind, id, &name).await?;
        let changed = changed_lookup_fields(&before, &updated);
        tracing::info!(entity = %kind, id, ?changed, "updated");

        self.publish(CatalogEvent::lookup(
            kind,
            EntityEvent::Updated {
                entity: updated.clone(),
                changed,
            },
        ))
        .await;
        Ok(updated)
    }

    pub async fn delete_lookup(&self, kind: LookupKind, id: i64) -> Result<String, CatalogError> {
        if self.store.get_lookup(kind, id).await?.is_none() {
            return Err(CatalogError::Unprocessable(format!(
                "Can't find {} with id {}",
                kind, id
            )));
        }
        if !self.store.delete_lookup(kind, id).await? {
            return Err(CatalogError::Unprocessable(format!(
                "Can't find {} with id {}",
                kind, id
            )));
        }
        self.publish(CatalogEvent::lookup(kind, EntityEvent::Deleted { id }))
            .await;
        Ok(format!("Deleted {} with id {}", kind, id))
    }

    async fn ensure_lookup_name_free(
        &self,
        kind: LookupKind,
        name: &str,
        excluding: Option<i64>,
    ) -> Result<(), CatalogError> {
        match self.store.find_lookup_by_name(kind, name, excluding).await? {
            Some(_) => Err(CatalogError::Unprocessable(format!(
                "A {} with the name '{}' already exists",
                kind, name
            ))),
            None => Ok(()),
        }
    }

    // --- models ---

    pub async fn list_models(&self, paging: Paging) -> Result<PagedResponse<Model>, CatalogError> {
        Ok(self.store.list_models(paging).await?)
    }

    pub async fn get_model(&self, id: i64) -> Result<Model, CatalogError> {
        self.store
            .get_model(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Can't find model with id {}", id)))
    }

    pub async fn create_model(&self, input: &ModelInput) -> Result<Model, CatalogError> {
        let valid = self.validate_model(input, None).await?;
        let id = self
            .store
            .insert_model(&valid.name, valid.make_id, valid.body_style_id, &valid.color_ids)
            .await?;
        let model = self.reload_model(id).await?;
        tracing::info!(model_id = id, name = %model.name, "created model");
        self.publish(CatalogEvent::Model(EntityEvent::Inserted(model.clone())))
            .await;
        Ok(model)
    }

    /// Rewrites a model and propagates its make, body style and name to every
    /// indexed car of that model.
    pub async fn update_model(&self, id: i64, input: &ModelInput) -> Result<Model, CatalogError> {
        let valid = self.validate_model(input, Some(id)).await?;
        let before = self.store.get_model(id).await?.ok_or_else(|| {
            CatalogError::Unprocessable(format!("Can't find model with id {}", id))
        })?;

        self.store
            .update_model(id, &valid.name, valid.make_id, valid.body_style_id, &valid.color_ids)
            .await?;
        let model = self.reload_model(id).await?;
        let changed = changed_model_fields(&before, &model);
        tracing::info!(model_id = id, ?changed, "updated model");

        self.publish(CatalogEvent::Model(EntityEvent::Updated {
            entity: model.clone(),
            changed,
        }))
        .await;
        Ok(model)
    }

    pub async fn delete_model(&self, id: i64) -> Result<String, CatalogError> {
        if self.store.get_model(id).await?.is_none() {
            return Err(CatalogError::Unprocessable(format!(
                "Can't find model with id {}",
                id
            )));
        }
        if !self.store.delete_model(id).await? {
            return Err(CatalogError::Unprocessable(format!(
                "Can't find model with id {}",
                id
            )));
        }
        self.publish(CatalogEvent::Model(EntityEvent::Deleted { id }))
            .await;
        Ok(format!("Deleted model with id {}", id))
    }

    /// Field checks first, then name uniqueness, then every referenced row.
    async fn validate_model(
        &self,
        input: &ModelInput,
        id: Option<i64>,
    ) -> Result<ValidModel, CatalogError> {
        let valid = input.validate()?;

        if self.store.find_model_by_name(&valid.name, id).await?.is_some() {
            return Err(CatalogError::Unprocessable(format!(
                "A model with the name '{}' already exists",
                valid.name
            )));
        }
        if self.store.get_lookup(LookupKind::Make, valid.make_id).await?.is_none() {
            return Err(CatalogError::Unprocessable(format!(
                "Can't find make with id {}",
                valid.make_id
            )));
        }
        if self
            .store
            .get_lookup(LookupKind::BodyStyle, valid.body_style_id)
            .await?
            .is_none()
        {
            return Err(CatalogError::Unprocessable(format!(
                "Can't find body-style with id {}",
                valid.body_style_id
            )));
        }

        let found = self
            .store
            .get_lookups_by_ids(LookupKind::Color, &valid.color_ids)
            .await?;
        if let Some(missing) = valid
            .color_ids
            .iter()
            .find(|id| !found.iter().any(|c| c.id == **id))
        {
            return Err(CatalogError::Unprocessable(format!(
                "Can't find color with id {}",
                missing
            )));
        }

        Ok(valid)
    }

    async fn reload_model(&self, id: i64) -> Result<Model, CatalogError> {
        match self.store.get_model(id).await? {
            Some(model) => Ok(model),
            None => {
                tracing::error!(model_id = id, "unable to retrieve model after write");
                Err(CatalogError::Store(crate::storage::StoreError::NotFound {
                    entity: "model",
                    id,
                }))
            }
        }
    }

    // --- cars ---

    pub async fn list_cars(&self, paging: Paging) -> Result<PagedResponse<Car>, CatalogError> {
        Ok(self.store.list_cars(paging).await?)
    }

    pub async fn get_car(&self, id: i64) -> Result<Car, CatalogError> {
        self.store
            .get_car(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Can't find car with id {}", id)))
    }

    pub async fn create_car(&self, input: &CarInput) -> Result<Car, CatalogError> {
        let (model, color, year) = self.validate_car(input).await?;
        let id = self.store.insert_car(model.id, color.id, year).await?;
        tracing::info!(car_id = id, model_id = model.id, color_id = color.id, year, "created car");

        self.publish(CatalogEvent::Car(EntityEvent::Inserted(Car::shallow(
            id, year, &model, &color,
        ))))
        .await;
        self.reload_car(id).await
    }

    pub async fn update_car(&self, id: i64, input: &CarInput) -> Result<Car, CatalogError> {
        let (model, color, year) = self.validate_car(input).await?;
        let before = self.store.get_car(id).await?.ok_or_else(|| {
            CatalogError::Unprocessable(format!("Can't find car with id {}", id))
        })?;

        self.store.update_car(id, model.id, color.id, year).await?;
        let shallow = Car::shallow(id, year, &model, &color);
        let changed = changed_car_fields(&before, &shallow);
        tracing::info!(car_id = id, ?changed, "updated car");

        self.publish(CatalogEvent::Car(EntityEvent::Updated {
            entity: shallow,
            changed,
        }))
        .await;
        self.reload_car(id).await
    }

    pub async fn delete_car(&self, id: i64) -> Result<String, CatalogError> {
        if !self.store.delete_car(id).await? {
            return Err(CatalogError::Unprocessable(format!(
                "Can't find car with id {}",
                id
            )));
        }
        self.publish(CatalogEvent::Car(EntityEvent::Deleted { id }))
            .await;
        Ok(format!("Deleted car with id {}", id))
    }

    /// The color must be one of the model's available colors.
    async fn validate_car(
        &self,
        input: &CarInput,
    ) -> Result<(Model, LookupEntity, i32), CatalogError> {
        let valid = input.validate()?;

        let model = self.store.get_model(valid.model_id).await?.ok_or_else(|| {
            CatalogError::Unprocessable(format!("Can't find model with id {}", valid.model_id))
        })?;
        let color = model
            .offers_color(valid.color_id)
            .cloned()
            .ok_or_else(|| {
                CatalogError::Unprocessable(format!(
                    "Color with id {} is not available for model {}",
                    valid.color_id, valid.model_id
                ))
            })?;

        Ok((model, color, valid.year))
    }

    async fn reload_car(&self, id: i64) -> Result<Car, CatalogError> {
        match self.store.get_car(id).await? {
            Some(car) => Ok(car),
            None => {
                tracing::error!(car_id = id, "unable to retrieve car after write");
                Err(CatalogError::Store(crate::storage::StoreError::NotFound {
                    entity: "car",
                    id,
                }))
            }
        }
    }

    // --- relational search and reconciliation ---

    pub async fn search_catalog(
        &self,
        filter: &CatalogFilter,
        paging: Paging,
    ) -> Result<PagedResponse<Car>, CatalogError> {
        Ok(self.store.search_catalog(filter, paging).await?)
    }

    /// Re-flattens and rewrites the document of every car in the store.
    pub async fn reindex_all(&self) -> Result<ReindexReport, CatalogError> {
        let mut report = ReindexReport::default();
        let mut offset = 0;
        loop {
            let page = self
                .store
                .list_cars(Paging::new(offset, REINDEX_PAGE))
                .await?;
            report.total = page.total;
            if page.results.is_empty() {
                break;
            }
            let fetched = page.results.len() as i64;
            for car in page.results {
                match self.publish(CatalogEvent::Car(EntityEvent::Inserted(car))).await {
                    Outcome::Applied => report.indexed += 1,
                    _ => report.failed += 1,
                }
            }
            offset += fetched;
        }
        tracing::info!(
            total = report.total,
            indexed = report.indexed,
            failed = report.failed,
            "reindex finished"
        );
        Ok(report)
    }
}
