//! Legacy projection of move-mode rows (flat, no child maps).

use serde::Serialize;

use crate::entities::Entity;
use crate::error::DomainError;
use crate::ids::EntityId;
use crate::tree::EntityTree;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveModeView {
    /// Legacy column name for the mode label
    #[serde(rename = "mode")]
    pub mode: String,
    pub basic: i32,
    pub enhanced: Option<i32>,
    #[serde(rename = "default")]
    pub default_mode: bool,
}

impl MoveModeView {
    pub fn project(tree: &EntityTree, id: EntityId) -> Result<Self, DomainError> {
        let entity = tree
            .get(id)
            .ok_or_else(|| DomainError::not_found("Entity", id.to_string()))?;
        let Entity::MoveMode(mode) = entity else {
            return Err(DomainError::validation(format!(
                "{} is a {}, not a move mode",
                id,
                entity.kind()
            )));
        };
        Ok(Self {
            mode: mode.name.clone(),
            basic: mode.basic,
            enhanced: mode.enhanced,
            default_mode: mode.default_mode,
        })
    }
}
