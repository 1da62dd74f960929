//! Flattens a shallowly-loaded car into the document the search index stores.

use crate::domain::Car;
use crate::search::CarDocument;
use crate::storage::StoreError;
use crate::sync::SyncError;
use async_trait::async_trait;
use std::sync::Arc;

/// Make and body style reached through a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRelations {
    pub make: String,
    pub body_style: String,
    pub make_id: i64,
    pub body_style_id: i64,
}

/// Resolves a model's make and body style with one joined query.
#[async_trait]
pub trait RelationLookup: Send + Sync {
    /// `None` when the join yields no row.
    async fn model_relations(&self, model_id: i64) -> Result<Option<ModelRelations>, StoreError>;
}

#[derive(Clone)]
pub struct Flattener {
    lookup: Arc<dyn RelationLookup>,
}

impl Flattener {
    pub fn new(lookup: Arc<dyn RelationLookup>) -> Self {
        Self { lookup }
    }

    /// Joins the car's model relations and returns the flat document.
    ///
    /// Only `car.model.{id,name}` and `car.color.{id,name}` are read from the
    /// car; make and body style always come from the store.
    pub async fn flatten(&self, car: &Car) -> Result<CarDocument, SyncError> {
        let relations = self.lookup.model_relations(car.model.id).await?;

        let Some(relations) = relations else {
            tracing::error!(
                car_id = car.id,
                model_id = car.model.id,
                "error fetching relations for car"
            );
            return Err(SyncError::UnresolvedRelations {
                car_id: car.id,
                model_id: car.model.id,
            });
        };

        Ok(CarDocument {
            id: car.id,
            year: car.year,
            model: car.model.name.clone(),
            color: car.color.name.clone(),
            color_id: car.color.id,
            model_id: car.model.id,
            make: relations.make,
            body_style: relations.body_style,
            make_id: relations.make_id,
            body_style_id: relations.body_style_id,
        })
    }
}
