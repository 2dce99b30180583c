//! Sheetbridge domain - the canonical entity tree, the legacy/modern address
//! translation, and the legacy view projections.
//!
//! Everything in this crate is pure and synchronous. Persistence, prompting,
//! and localization are collaborators of the engine crate; nothing here does
//! I/O, and nothing outside `addressing`/`views` knows what the legacy schema
//! looks like.

pub mod addressing;
pub mod collection;
pub mod entities;
pub mod error;
pub mod ids;
pub mod tree;
pub mod views;

// Re-export the working vocabulary
pub use addressing::{pad_index, LegacyKey, ModernAddress, INDEX_PAD_WIDTH, LEGACY_ROOT};
pub use collection::{Collection, Family};
pub use entities::{
    Containable, Entity, EntityKind, Equipment, HitLocation, MoveMode, NoteEntry, Skill, Spell,
    TraitEntry,
};
pub use error::DomainError;
pub use ids::{EntityId, RecordId};
pub use tree::{EntityBatch, EntityTree, EntityUpdate};
pub use views::{
    collection_view, legacy_sheet, EquipmentView, HitLocationView, MoveModeView, NoteView,
    SkillView, SpellView, TraitView,
};
