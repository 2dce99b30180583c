//! Move mode entity - flat movement rows (ground, air, water...), never nested

use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// One movement mode (legacy `mode` column maps to `name`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveMode {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub sort_index: u32,
    #[serde(default)]
    pub basic: i32,
    #[serde(default)]
    pub enhanced: Option<i32>,
    /// Whether this is the mode the sheet currently moves with
    #[serde(default)]
    pub default_mode: bool,
}

impl MoveMode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            sort_index: 0,
            basic: 0,
            enhanced: None,
            default_mode: false,
        }
    }
}
