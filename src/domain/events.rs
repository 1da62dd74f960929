//! Post-commit events emitted by the catalog service after a relational write.

use crate::domain::entities::{BodyStyle, Car, Color, LookupEntity, LookupKind, Make, Model};

/// What happened to a single entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityEvent<T> {
    Inserted(T),
    /// `changed` lists the properties that differ from the previous snapshot.
    Updated { entity: T, changed: Vec<String> },
    Deleted { id: i64 },
}

impl<T> EntityEvent<T> {
    pub fn action(&self) -> &'static str {
        match self {
            EntityEvent::Inserted(_) => "inserted",
            EntityEvent::Updated { .. } => "updated",
            EntityEvent::Deleted { .. } => "deleted",
        }
    }
}

/// One event per entity kind; the sync hooks route on this tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    Make(EntityEvent<Make>),
    Color(EntityEvent<Color>),
    BodyStyle(EntityEvent<BodyStyle>),
    Model(EntityEvent<Model>),
    Car(EntityEvent<Car>),
}

impl CatalogEvent {
    pub fn lookup(kind: LookupKind, event: EntityEvent<LookupEntity>) -> Self {
        match kind {
            LookupKind::Make => CatalogEvent::Make(event),
            LookupKind::Color => CatalogEvent::Color(event),
            LookupKind::BodyStyle => CatalogEvent::BodyStyle(event),
        }
    }

    pub fn entity_kind(&self) -> &'static str {
        match self {
            CatalogEvent::Make(_) => "make",
            CatalogEvent::Color(_) => "color",
            CatalogEvent::BodyStyle(_) => "body_style",
            CatalogEvent::Model(_) => "model",
            CatalogEvent::Car(_) => "car",
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            CatalogEvent::Make(e) | CatalogEvent::Color(e) | CatalogEvent::BodyStyle(e) => {
                e.action()
            }
            CatalogEvent::Model(e) => e.action(),
            CatalogEvent::Car(e) => e.action(),
        }
    }

    /// Id of the entity the event is about.
    pub fn entity_id(&self) -> i64 {
        fn id_of<T>(event: &EntityEvent<T>, id: impl Fn(&T) -> i64) -> i64 {
            match event {
                EntityEvent::Inserted(entity) | EntityEvent::Updated { entity, .. } => id(entity),
                EntityEvent::Deleted { id } => *id,
            }
        }
        match self {
            CatalogEvent::Make(e) | CatalogEvent::Color(e) | CatalogEvent::BodyStyle(e) => {
                id_of(e, |l| l.id)
            }
            CatalogEvent::Model(e) => id_of(e, |m| m.id),
            CatalogEvent::Car(e) => id_of(e, |c| c.id),
        }
    }
}

/// Property names that differ between two lookup snapshots.
pub fn changed_lookup_fields(before: &LookupEntity, after: &LookupEntity) -> Vec<String> {
    let mut changed = Vec::new();
    if before.name != after.name {
        changed.push("name".to_string());
    }
    changed
}

pub fn changed_model_fields(before: &Model, after: &Model) -> Vec<String> {
    let mut changed = Vec::new();
    if before.name != after.name {
        changed.push("name".to_string());
    }
    if before.make.id != after.make.id {
        changed.push("make".to_string());
    }
    if before.body_style.id != after.body_style.id {
        changed.push("bodyStyle".to_string());
    }
    let mut old_colors: Vec<i64> = before.available_colors.iter().map(|c| c.id).collect();
    let mut new_colors: Vec<i64> = after.available_colors.iter().map(|c| c.id).collect();
    old_colors.sort_unstable();
    new_colors.sort_unstable();
    if old_colors != new_colors {
        changed.push("availableColors".to_string());
    }
    changed
}

pub fn changed_car_fields(before: &Car, after: &Car) -> Vec<String> {
    let mut changed = Vec::new();
    if before.year != after.year {
        changed.push("year".to_string());
    }
    if before.model.id != after.model.id {
        changed.push("model".to_string());
    }
    if before.color.id != after.color.id {
        changed.push("color".to_string());
    }
    changed
}
