use crate::app::CatalogService;
use crate::domain::Paging;
use crate::search::{CarIndex, CarSearchTerms};
use crate::storage::CatalogFilter;
use crate::sync::SyncStatsSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub index: Arc<dyn CarIndex>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: JsonValue) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Rows to skip (default 0).
    #[serde(default)]
    pub offset: Option<i64>,
    /// Page size (default 100).
    #[serde(default)]
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn paging(&self) -> Paging {
        Paging::from_optional(self.offset, self.limit)
    }
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TermSearchParams {
    /// Free text matched against year, make, model, color and body style.
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Per-field index search. Query-string flattening does not mix with numeric
/// fields, so paging is repeated here instead of nesting [`PageParams`].
#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct FieldSearchParams {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub body_style: Option<String>,
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl FieldSearchParams {
    pub fn terms(&self) -> CarSearchTerms {
        CarSearchTerms {
            year: self.year,
            make: self.make.clone(),
            model: self.model.clone(),
            color: self.color.clone(),
            body_style: self.body_style.clone(),
        }
    }

    pub fn paging(&self) -> Paging {
        Paging::from_optional(self.offset, self.limit)
    }
}

/// Substring filters for the relational search; year is matched as text.
#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSearchParams {
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub body_style: Option<String>,
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl CatalogSearchParams {
    pub fn filter(&self) -> CatalogFilter {
        CatalogFilter {
            make: self.make.clone(),
            model: self.model.clone(),
            color: self.color.clone(),
            body_style: self.body_style.clone(),
            year: self.year.clone(),
        }
    }

    pub fn paging(&self) -> Paging {
        Paging::from_optional(self.offset, self.limit)
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
    pub search_index: String,
    pub sync: SyncStatsSnapshot,
    pub timestamp: String,
}
