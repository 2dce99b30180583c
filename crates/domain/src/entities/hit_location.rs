//! Hit location entity - flat body-table rows, never nested

use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// One row of the hit-location table (legacy `where` column maps to `name`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitLocation {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub sort_index: u32,
    #[serde(default)]
    pub dr: i32,
    #[serde(default)]
    pub roll: String,
    #[serde(default)]
    pub penalty: i32,
}

impl HitLocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            sort_index: 0,
            dr: 0,
            roll: String::new(),
            penalty: 0,
        }
    }
}
