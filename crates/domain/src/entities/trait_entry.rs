//! Trait entity - advantages, disadvantages, and quirks ("ads" in the legacy schema)

use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

use super::containable::Containable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitEntry {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub sort_index: u32,
    #[serde(default)]
    pub contained_by: Option<EntityId>,
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub vtt_notes: String,
    #[serde(default)]
    pub page_ref: Option<String>,
}

impl TraitEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            sort_index: 0,
            contained_by: None,
            open: false,
            points: 0,
            notes: String::new(),
            vtt_notes: String::new(),
            page_ref: None,
        }
    }
}

impl Containable for TraitEntry {
    fn open(&self) -> bool {
        self.open
    }

    fn set_open(&mut self, open: bool) {
        self.open = open;
    }
}
