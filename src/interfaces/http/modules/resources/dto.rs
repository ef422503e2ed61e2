//! Resource catalog DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::Resource;

/// Catalog entry in API responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResourceDto {
    pub id: String,
    /// `parking_space` or `charger`
    pub kind: String,
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
}

impl From<Resource> for ResourceDto {
    fn from(r: Resource) -> Self {
        Self {
            id: r.id,
            kind: r.kind.to_string(),
            name: r.name,
            x: r.x,
            y: r.y,
        }
    }
}

fn default_kind() -> String {
    "parking_space".to_string()
}

/// Request to add a resource to the catalog
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateResourceRequest {
    #[validate(length(min = 1, max = 128))]
    pub id: String,
    /// `parking_space` (default) or `charger`
    #[serde(default = "default_kind")]
    pub kind: String,
    #[validate(length(max = 255))]
    pub name: Option<String>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub x: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub y: f64,
}
