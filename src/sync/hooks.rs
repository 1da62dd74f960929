//! Post-commit hooks that project relational changes into the search index.
//!
//! Every event goes through [`SyncHooks::dispatch`]. Handlers never fail the
//! write that triggered them: errors are logged with the entity involved and
//! counted in [`SyncStats`] so drift between the store and the index shows up
//! on the health endpoint.

use crate::domain::{Car, CatalogEvent, EntityEvent, LookupEntity, LookupKind, Model};
use crate::search::{CarIndex, IndexError};
use crate::sync::flatten::Flattener;
use crate::sync::SyncError;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Default)]
pub struct SyncStats {
    dispatched: AtomicU64,
    applied: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct SyncStatsSnapshot {
    /// Events received.
    pub dispatched: u64,
    /// Events that resulted in an index write.
    pub applied: u64,
    /// Events dropped by a guard (missing id or name, or no index configured).
    pub skipped: u64,
    /// Events whose index write failed. The index may be stale for these.
    pub failed: u64,
}

impl SyncStats {
    pub fn snapshot(&self) -> SyncStatsSnapshot {
        SyncStatsSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            applied: self.applied.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// What a handler did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Skipped(&'static str),
    /// No index projection exists for this event.
    Ignored,
    /// The index write failed and was swallowed.
    Failed,
}

pub struct SyncHooks {
    index: Arc<dyn CarIndex>,
    flattener: Flattener,
    stats: SyncStats,
}

impl SyncHooks {
    pub fn new(index: Arc<dyn CarIndex>, flattener: Flattener) -> Self {
        Self {
            index,
            flattener,
            stats: SyncStats::default(),
        }
    }

    pub fn stats(&self) -> SyncStatsSnapshot {
        self.stats.snapshot()
    }

    /// Routes `event` to its handler. Never fails; see the module docs.
    pub async fn dispatch(&self, event: &CatalogEvent) -> Outcome {
        self.stats.dispatched.fetch_add(1, Ordering::Relaxed);
        let entity = event.entity_kind();
        let action = event.action();
        let entity_id = event.entity_id();

        let result = match event {
            CatalogEvent::Car(e) => self.on_car(e).await,
            CatalogEvent::Model(e) => self.on_model(e).await,
            CatalogEvent::Make(e) => self.on_lookup(LookupKind::Make, e).await,
            CatalogEvent::Color(e) => self.on_lookup(LookupKind::Color, e).await,
            CatalogEvent::BodyStyle(e) => self.on_lookup(LookupKind::BodyStyle, e).await,
        };

        match result {
            Ok(Outcome::Applied) => {
                self.stats.applied.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(entity, action, entity_id, "index sync applied");
                Outcome::Applied
            }
            Ok(Outcome::Skipped(reason)) => {
                self.stats.skipped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(entity, action, entity_id, reason, "index sync skipped");
                Outcome::Skipped(reason)
            }
            Ok(outcome) => outcome,
            Err(SyncError::Index(IndexError::Disabled)) => {
                self.stats.skipped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(entity, action, entity_id, "search index disabled, sync skipped");
                Outcome::Skipped("index disabled")
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    entity,
                    action,
                    entity_id,
                    error = %e,
                    "index sync failed, index may be stale"
                );
                Outcome::Failed
            }
        }
    }

    async fn on_car(&self, event: &EntityEvent<Car>) -> Result<Outcome, SyncError> {
        match event {
            EntityEvent::Inserted(car) => self.index_car(car).await,
            EntityEvent::Updated { entity, changed } => {
                tracing::debug!(car_id = entity.id, ?changed, "car updated, reindexing");
                self.index_car(entity).await
            }
            EntityEvent::Deleted { id } => {
                self.index.delete(*id).await?;
                Ok(Outcome::Applied)
            }
        }
    }

    async fn index_car(&self, car: &Car) -> Result<Outcome, SyncError> {
        if car.id <= 0 {
            return Err(SyncError::MissingCarId);
        }
        let document = self.flattener.flatten(car).await?;
        tracing::info!(car_id = car.id, "indexing car");
        self.index.index(&document).await?;
        Ok(Outcome::Applied)
    }

    async fn on_lookup(
        &self,
        kind: LookupKind,
        event: &EntityEvent<LookupEntity>,
    ) -> Result<Outcome, SyncError> {
        let EntityEvent::Updated { entity, changed } = event else {
            return Ok(Outcome::Ignored);
        };
        tracing::debug!(entity = %kind, id = entity.id, ?changed, "lookup entity updated");

        if entity.id <= 0 || entity.name.trim().is_empty() {
            return Ok(Outcome::Skipped("missing id or name"));
        }

        let updated = self
            .index
            .bulk_update_field(entity.id, kind.index_field(), &entity.name)
            .await?;
        tracing::info!(
            field = kind.index_field(),
            id = entity.id,
            value = %entity.name,
            updated,
            "propagated rename to index"
        );
        Ok(Outcome::Applied)
    }

    async fn on_model(&self, event: &EntityEvent<Model>) -> Result<Outcome, SyncError> {
        let EntityEvent::Updated { entity, changed } = event else {
            return Ok(Outcome::Ignored);
        };
        tracing::debug!(model_id = entity.id, ?changed, "model updated");

        let updated = self.index.update_by_model_data(entity).await?;
        tracing::info!(model_id = entity.id, updated, "propagated model data to index");
        Ok(Outcome::Applied)
    }
}
