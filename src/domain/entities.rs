//! Canonical catalog entities as they are stored in Postgres.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A flat, name-keyed reference record (make, color or body style).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LookupEntity {
    pub id: i64,
    pub name: String,
}

pub type Make = LookupEntity;
pub type Color = LookupEntity;
pub type BodyStyle = LookupEntity;

/// The three lookup tables share a shape; this selects which one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Make,
    Color,
    BodyStyle,
}

impl LookupKind {
    pub fn table_name(self) -> &'static str {
        match self {
            LookupKind::Make => "makes",
            LookupKind::Color => "colors",
            LookupKind::BodyStyle => "body_styles",
        }
    }

    /// Name of the flattened field holding this entity's name in the search index.
    /// The matching id field is `{index_field}_id`.
    pub fn index_field(self) -> &'static str {
        match self {
            LookupKind::Make => "make",
            LookupKind::Color => "color",
            LookupKind::BodyStyle => "body_style",
        }
    }

    /// Human-readable label used in error messages and logs.
    pub fn label(self) -> &'static str {
        match self {
            LookupKind::Make => "make",
            LookupKind::Color => "color",
            LookupKind::BodyStyle => "body-style",
        }
    }
}

impl std::fmt::Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A model with its make, body style and available colors fully loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: i64,
    pub name: String,
    #[schema(value_type = LookupEntity)]
    pub make: Make,
    #[schema(value_type = LookupEntity)]
    pub body_style: BodyStyle,
    #[schema(value_type = Vec<LookupEntity>)]
    pub available_colors: Vec<Color>,
}

impl Model {
    /// The color with `color_id`, if this model is offered in it.
    pub fn offers_color(&self, color_id: i64) -> Option<&Color> {
        self.available_colors.iter().find(|c| c.id == color_id)
    }
}

/// The model side of a car.
///
/// Freshly inserted cars only carry `id` and `name`; reads from the store and
/// search hits also carry the make and body style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarModel {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<LookupEntity>)]
    pub make: Option<Make>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<LookupEntity>)]
    pub body_style: Option<BodyStyle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Car {
    pub id: i64,
    pub year: i32,
    pub model: CarModel,
    #[schema(value_type = LookupEntity)]
    pub color: Color,
}

impl Car {
    /// Strips the model down to the shallow shape a freshly saved car has.
    pub fn shallow(id: i64, year: i32, model: &Model, color: &Color) -> Self {
        Car {
            id,
            year,
            model: CarModel {
                id: model.id,
                name: model.name.clone(),
                make: None,
                body_style: None,
            },
            color: color.clone(),
        }
    }
}

/// Names are stored trimmed and lowercased so uniqueness is case-insensitive.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub const MIN_YEAR: i32 = 1000;
pub const MAX_YEAR: i32 = 9999;

/// Years are four-digit integers.
pub fn is_valid_year(year: i64) -> bool {
    (MIN_YEAR as i64..=MAX_YEAR as i64).contains(&year)
}
