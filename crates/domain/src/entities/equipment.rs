//! Equipment entity - carried and owned gear, possibly nested in containers
//!
//! # Simple Data Struct
//!
//! This is a data-carrying struct with no invariants to protect. All fields are
//! public because there's no invalid state that can be constructed - any
//! combination of values is valid. Sibling ordering and containment invariants
//! are owned by `EntityTree`, not by the entity itself.
//!
//! # Carried / Equipped Coupling
//!
//! `carried` decides which equipment collection the entity belongs to.
//! The flags are stored on every entity for resilience against partial
//! updates, but consumers treat the containment root as authoritative and
//! read them by walking up the chain.

use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

use super::containable::Containable;

/// A piece of equipment on the sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: EntityId,
    pub name: String,
    /// Position among siblings (contiguous 0..n-1 within one parent+collection)
    #[serde(default)]
    pub sort_index: u32,
    /// Containing entity, None for collection roots
    #[serde(default)]
    pub contained_by: Option<EntityId>,
    /// Whether children render expanded
    #[serde(default)]
    pub open: bool,
    /// How many of this item the sheet holds
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub weight: f64,
    /// Selects the carried vs. other collection
    #[serde(default)]
    pub carried: bool,
    #[serde(default)]
    pub equipped: bool,
    #[serde(default)]
    pub uses: Option<i32>,
    #[serde(default)]
    pub max_uses: Option<i32>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub vtt_notes: String,
    #[serde(default)]
    pub page_ref: Option<String>,
}

fn default_count() -> u32 {
    1
}

impl Equipment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            sort_index: 0,
            contained_by: None,
            open: false,
            count: 1,
            cost: 0.0,
            weight: 0.0,
            carried: true,
            equipped: false,
            uses: None,
            max_uses: None,
            notes: String::new(),
            vtt_notes: String::new(),
            page_ref: None,
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_carried(mut self, carried: bool) -> Self {
        self.carried = carried;
        self
    }
}

impl Containable for Equipment {
    fn open(&self) -> bool {
        self.open
    }

    fn set_open(&mut self, open: bool) {
        self.open = open;
    }
}
