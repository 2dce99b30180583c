//! Read-only legacy projections of the modern tree.
//!
//! Every adapter is an explicit, eagerly-computed struct: projecting walks the
//! tree and builds the full legacy record, children wrapped recursively in the
//! same adapter keyed by zero-padded position strings. Nothing is cached -
//! each call recomputes from current entity state, so a projection taken after
//! a mutation always reflects it.

mod equipment_view;
mod hit_location_view;
mod move_mode_view;
mod note_view;
mod skill_view;
mod spell_view;
mod trait_view;

pub use equipment_view::EquipmentView;
pub use hit_location_view::HitLocationView;
pub use move_mode_view::MoveModeView;
pub use note_view::NoteView;
pub use skill_view::SkillView;
pub use spell_view::SpellView;
pub use trait_view::TraitView;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::addressing::pad_index;
use crate::collection::Collection;
use crate::error::DomainError;
use crate::ids::EntityId;
use crate::tree::EntityTree;

/// Legacy `notes` column: primary and VTT notes newline-joined, blanks dropped.
pub(crate) fn joined_notes(primary: &str, vtt: &str) -> String {
    [primary, vtt]
        .iter()
        .filter(|part| !part.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}

/// Project the children of `id` into `contains`/`collapsed` maps.
///
/// Exactly one of the two maps receives the children, selected by `open`; the
/// other always comes back empty.
pub(crate) fn split_children<T>(
    tree: &EntityTree,
    id: EntityId,
    open: bool,
    project: impl Fn(&EntityTree, EntityId) -> Result<T, DomainError> + Copy,
) -> Result<(BTreeMap<String, T>, BTreeMap<String, T>), DomainError> {
    let mut populated = BTreeMap::new();
    for (position, child) in tree.children_of(id).into_iter().enumerate() {
        populated.insert(pad_index(position), project(tree, child)?);
    }
    if open {
        Ok((populated, BTreeMap::new()))
    } else {
        Ok((BTreeMap::new(), populated))
    }
}

fn project_roots<T: Serialize>(
    tree: &EntityTree,
    collection: Collection,
    project: impl Fn(&EntityTree, EntityId) -> Result<T, DomainError> + Copy,
) -> Result<Value, DomainError> {
    let mut map = serde_json::Map::new();
    for (position, id) in tree.roots_of(collection).into_iter().enumerate() {
        let view = project(tree, id)?;
        let value = serde_json::to_value(view)
            .map_err(|e| DomainError::malformed(format!("view does not serialize: {e}")))?;
        map.insert(pad_index(position), value);
    }
    Ok(Value::Object(map))
}

/// Project one collection into its legacy dictionary shape.
pub fn collection_view(tree: &EntityTree, collection: Collection) -> Result<Value, DomainError> {
    match collection {
        Collection::EquipmentCarried | Collection::EquipmentOther => {
            project_roots(tree, collection, EquipmentView::project)
        }
        Collection::Traits => project_roots(tree, collection, TraitView::project),
        Collection::Skills => project_roots(tree, collection, SkillView::project),
        Collection::Spells => project_roots(tree, collection, SpellView::project),
        Collection::Notes => project_roots(tree, collection, NoteView::project),
        Collection::HitLocations => project_roots(tree, collection, HitLocationView::project),
        Collection::MoveModes => project_roots(tree, collection, MoveModeView::project),
    }
}

/// Assemble the complete legacy-shaped sheet document (all eight buckets).
pub fn legacy_sheet(tree: &EntityTree) -> Result<Value, DomainError> {
    let mut equipment = serde_json::Map::new();
    equipment.insert(
        "carried".into(),
        collection_view(tree, Collection::EquipmentCarried)?,
    );
    equipment.insert(
        "other".into(),
        collection_view(tree, Collection::EquipmentOther)?,
    );

    let mut sheet = serde_json::Map::new();
    sheet.insert("equipment".into(), Value::Object(equipment));
    for collection in [
        Collection::Traits,
        Collection::Skills,
        Collection::Spells,
        Collection::Notes,
        Collection::HitLocations,
        Collection::MoveModes,
    ] {
        sheet.insert(
            collection.legacy_path().into(),
            collection_view(tree, collection)?,
        );
    }
    Ok(Value::Object(sheet))
}
