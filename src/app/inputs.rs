//! Request bodies for catalog writes and their field-level validation.

use crate::app::CatalogError;
use crate::domain::entities::{is_valid_year, normalize_name};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

#[derive(Deserialize, Debug, Clone, Default, ToSchema)]
pub struct LookupInput {
    /// Stored lowercased.
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModelInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub make_id: Option<i64>,
    #[serde(default)]
    pub body_style_id: Option<i64>,
    #[serde(default)]
    pub color_ids: Option<Vec<i64>>,
}

#[derive(Deserialize, Debug, Clone, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarInput {
    #[serde(default)]
    pub model_id: Option<i64>,
    #[serde(default)]
    pub color_id: Option<i64>,
    /// Four-digit year, as a number or numeric string.
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub year: Option<JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidModel {
    pub name: String,
    pub make_id: i64,
    pub body_style_id: i64,
    pub color_ids: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidCar {
    pub model_id: i64,
    pub color_id: i64,
    pub year: i32,
}

fn missing(field: &str) -> CatalogError {
    CatalogError::BadRequest(format!("Missing {} field", field))
}

impl LookupInput {
    pub fn validated_name(&self) -> Result<String, CatalogError> {
        let name = self.name.as_deref().map(normalize_name).unwrap_or_default();
        if name.is_empty() {
            return Err(missing("name"));
        }
        Ok(name)
    }
}

impl ModelInput {
    pub fn validate(&self) -> Result<ValidModel, CatalogError> {
        let make_id = self.make_id.ok_or_else(|| missing("makeId"))?;
        let color_ids = self.color_ids.clone().ok_or_else(|| missing("colorIds"))?;
        let name = self.name.as_deref().map(normalize_name).unwrap_or_default();
        if name.is_empty() {
            return Err(missing("name"));
        }
        let body_style_id = self.body_style_id.ok_or_else(|| missing("bodyStyleId"))?;

        let mut color_ids = color_ids;
        color_ids.sort_unstable();
        color_ids.dedup();

        Ok(ValidModel {
            name,
            make_id,
            body_style_id,
            color_ids,
        })
    }
}

impl CarInput {
    pub fn validate(&self) -> Result<ValidCar, CatalogError> {
        let model_id = self.model_id.ok_or_else(|| missing("modelId"))?;
        let color_id = self.color_id.ok_or_else(|| missing("colorId"))?;
        let year = self.year.as_ref().ok_or_else(|| missing("year"))?;

        let year = parse_year(year)
            .ok_or_else(|| CatalogError::BadRequest("Bad input for year field".to_string()))?;

        Ok(ValidCar {
            model_id,
            color_id,
            year,
        })
    }
}

fn parse_year(value: &JsonValue) -> Option<i32> {
    let year = match value {
        JsonValue::Number(n) => n.as_i64()?,
        JsonValue::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    if is_valid_year(year) {
        i32::try_from(year).ok()
    } else {
        None
    }
}
