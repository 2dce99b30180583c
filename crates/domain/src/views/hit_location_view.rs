//! Legacy projection of hit-location rows (flat, no child maps).

use serde::Serialize;

use crate::entities::Entity;
use crate::error::DomainError;
use crate::ids::EntityId;
use crate::tree::EntityTree;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitLocationView {
    /// Legacy column name for the location label
    #[serde(rename = "where")]
    pub location: String,
    pub dr: i32,
    pub roll: String,
    pub penalty: i32,
}

impl HitLocationView {
    pub fn project(tree: &EntityTree, id: EntityId) -> Result<Self, DomainError> {
        let entity = tree
            .get(id)
            .ok_or_else(|| DomainError::not_found("Entity", id.to_string()))?;
        let Entity::HitLocation(row) = entity else {
            return Err(DomainError::validation(format!(
                "{} is a {}, not a hit location",
                id,
                entity.kind()
            )));
        };
        Ok(Self {
            location: row.name.clone(),
            dr: row.dr,
            roll: row.roll.clone(),
            penalty: row.penalty,
        })
    }
}
