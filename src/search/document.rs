//! The flattened car document stored in the `cars` index.

use crate::domain::{Car, CarModel, LookupEntity};
use serde::{Deserialize, Serialize};

/// One car with its model, make, body style and color joined inline.
///
/// Field names are part of the index contract and must not be renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarDocument {
    pub id: i64,
    pub year: i32,
    pub model: String,
    pub color: String,
    pub color_id: i64,
    pub model_id: i64,
    pub make: String,
    pub body_style: String,
    pub make_id: i64,
    pub body_style_id: i64,
}

impl CarDocument {
    /// Rebuilds the nested car shape from a search hit.
    pub fn into_car(self) -> Car {
        Car {
            id: self.id,
            year: self.year,
            model: CarModel {
                id: self.model_id,
                name: self.model,
                make: Some(LookupEntity {
                    id: self.make_id,
                    name: self.make,
                }),
                body_style: Some(LookupEntity {
                    id: self.body_style_id,
                    name: self.body_style,
                }),
            },
            color: LookupEntity {
                id: self.color_id,
                name: self.color,
            },
        }
    }
}
