//! Note entity - free-form sheet notes, nestable like equipment

use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

use super::containable::Containable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEntry {
    pub id: EntityId,
    /// Optional title; legacy consumers only see the joined text
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sort_index: u32,
    #[serde(default)]
    pub contained_by: Option<EntityId>,
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub vtt_notes: String,
}

impl NoteEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            sort_index: 0,
            contained_by: None,
            open: false,
            text: String::new(),
            vtt_notes: String::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

impl Containable for NoteEntry {
    fn open(&self) -> bool {
        self.open
    }

    fn set_open(&mut self, open: bool) {
        self.open = open;
    }
}
