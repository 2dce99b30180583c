//! The `Entity` enum - one record in the sheet tree, of any kind.
//!
//! Wire shape is internally tagged (`"kind": "equipment"` etc.) so a modern
//! record array can hold heterogeneous kinds and still deserialize into the
//! right struct.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::collection::{Collection, Family};
use crate::error::DomainError;
use crate::ids::EntityId;

use super::containable::Containable;
use super::equipment::Equipment;
use super::hit_location::HitLocation;
use super::move_mode::MoveMode;
use super::note::NoteEntry;
use super::skill::Skill;
use super::spell::Spell;
use super::trait_entry::TraitEntry;

/// Kind discriminator, mirroring the wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Equipment,
    Trait,
    Skill,
    Spell,
    Note,
    HitLocation,
    MoveMode,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Equipment => "equipment",
            Self::Trait => "trait",
            Self::Skill => "skill",
            Self::Spell => "spell",
            Self::Note => "note",
            Self::HitLocation => "hit location",
            Self::MoveMode => "move mode",
        };
        write!(f, "{label}")
    }
}

/// One sheet record of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Entity {
    Equipment(Equipment),
    Trait(TraitEntry),
    Skill(Skill),
    Spell(Spell),
    Note(NoteEntry),
    HitLocation(HitLocation),
    MoveMode(MoveMode),
}

macro_rules! dispatch {
    ($self:expr, $e:ident => $body:expr) => {
        match $self {
            Entity::Equipment($e) => $body,
            Entity::Trait($e) => $body,
            Entity::Skill($e) => $body,
            Entity::Spell($e) => $body,
            Entity::Note($e) => $body,
            Entity::HitLocation($e) => $body,
            Entity::MoveMode($e) => $body,
        }
    };
}

impl Entity {
    /// Create a fresh entity of the kind belonging to `collection`.
    pub fn new(collection: Collection, name: impl Into<String>) -> Self {
        match collection {
            Collection::EquipmentCarried => Self::Equipment(Equipment::new(name)),
            Collection::EquipmentOther => {
                Self::Equipment(Equipment::new(name).with_carried(false))
            }
            Collection::Traits => Self::Trait(TraitEntry::new(name)),
            Collection::Skills => Self::Skill(Skill::new(name)),
            Collection::Spells => Self::Spell(Spell::new(name)),
            Collection::Notes => Self::Note(NoteEntry::new(name)),
            Collection::HitLocations => Self::HitLocation(HitLocation::new(name)),
            Collection::MoveModes => Self::MoveMode(MoveMode::new(name)),
        }
    }

    pub fn id(&self) -> EntityId {
        dispatch!(self, e => e.id)
    }

    /// Replace the id with a freshly generated one (used when duplicating a subtree).
    pub fn reissue_id(&mut self) {
        dispatch!(self, e => e.id = EntityId::new());
    }

    pub fn name(&self) -> &str {
        dispatch!(self, e => e.name.as_str())
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Equipment(_) => EntityKind::Equipment,
            Self::Trait(_) => EntityKind::Trait,
            Self::Skill(_) => EntityKind::Skill,
            Self::Spell(_) => EntityKind::Spell,
            Self::Note(_) => EntityKind::Note,
            Self::HitLocation(_) => EntityKind::HitLocation,
            Self::MoveMode(_) => EntityKind::MoveMode,
        }
    }

    pub fn family(&self) -> Family {
        self.collection().family()
    }

    /// The collection this entity currently belongs to.
    ///
    /// Derived, not stored: for equipment the `carried` flag selects between
    /// the two equipment buckets, every other kind has exactly one home.
    pub fn collection(&self) -> Collection {
        match self {
            Self::Equipment(e) => {
                if e.carried {
                    Collection::EquipmentCarried
                } else {
                    Collection::EquipmentOther
                }
            }
            Self::Trait(_) => Collection::Traits,
            Self::Skill(_) => Collection::Skills,
            Self::Spell(_) => Collection::Spells,
            Self::Note(_) => Collection::Notes,
            Self::HitLocation(_) => Collection::HitLocations,
            Self::MoveMode(_) => Collection::MoveModes,
        }
    }

    /// Re-home the entity into `collection`.
    ///
    /// Only meaningful movement is between the two equipment buckets; for any
    /// other kind the target must already be its home collection.
    pub fn set_collection(&mut self, collection: Collection) -> Result<(), DomainError> {
        match self {
            Self::Equipment(e) => match collection {
                Collection::EquipmentCarried => {
                    e.carried = true;
                    Ok(())
                }
                Collection::EquipmentOther => {
                    e.carried = false;
                    Ok(())
                }
                other => Err(DomainError::validation(format!(
                    "cannot place equipment into the {other} collection"
                ))),
            },
            _ if self.collection() == collection => Ok(()),
            _ => Err(DomainError::validation(format!(
                "cannot place a {} into the {collection} collection",
                self.kind()
            ))),
        }
    }

    pub fn sort_index(&self) -> u32 {
        dispatch!(self, e => e.sort_index)
    }

    pub fn set_sort_index(&mut self, index: u32) {
        dispatch!(self, e => e.sort_index = index);
    }

    pub fn contained_by(&self) -> Option<EntityId> {
        match self {
            Self::Equipment(e) => e.contained_by,
            Self::Trait(e) => e.contained_by,
            Self::Skill(e) => e.contained_by,
            Self::Spell(e) => e.contained_by,
            Self::Note(e) => e.contained_by,
            Self::HitLocation(_) | Self::MoveMode(_) => None,
        }
    }

    /// Set the containing entity. Flat kinds silently stay rooted; the tree
    /// validates containment before calling this.
    pub fn set_contained_by(&mut self, parent: Option<EntityId>) {
        match self {
            Self::Equipment(e) => e.contained_by = parent,
            Self::Trait(e) => e.contained_by = parent,
            Self::Skill(e) => e.contained_by = parent,
            Self::Spell(e) => e.contained_by = parent,
            Self::Note(e) => e.contained_by = parent,
            Self::HitLocation(_) | Self::MoveMode(_) => {}
        }
    }

    /// Quantity for quantity-bearing kinds (equipment), None otherwise.
    pub fn count(&self) -> Option<u32> {
        match self {
            Self::Equipment(e) => Some(e.count),
            _ => None,
        }
    }

    pub fn set_count(&mut self, count: u32) {
        if let Self::Equipment(e) = self {
            e.count = count;
        }
    }

    pub fn supports_children(&self) -> bool {
        self.family().supports_containment()
    }

    pub fn as_containable(&self) -> Option<&dyn Containable> {
        match self {
            Self::Equipment(e) => Some(e),
            Self::Trait(e) => Some(e),
            Self::Skill(e) => Some(e),
            Self::Spell(e) => Some(e),
            Self::Note(e) => Some(e),
            Self::HitLocation(_) | Self::MoveMode(_) => None,
        }
    }

    pub fn as_containable_mut(&mut self) -> Option<&mut dyn Containable> {
        match self {
            Self::Equipment(e) => Some(e),
            Self::Trait(e) => Some(e),
            Self::Skill(e) => Some(e),
            Self::Spell(e) => Some(e),
            Self::Note(e) => Some(e),
            Self::HitLocation(_) | Self::MoveMode(_) => None,
        }
    }
}
