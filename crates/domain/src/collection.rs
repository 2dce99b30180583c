//! Collections and collection families.
//!
//! A collection is a named top-level bucket of one entity family. Equipment is
//! the only family split across two collections (carried / other); every other
//! family owns exactly one. The legacy and modern path names for each bucket
//! live here so that nothing outside the addressing/patch/view layers has to
//! know which schema it is talking to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity family a collection groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Family {
    Equipment,
    Trait,
    Skill,
    Spell,
    Note,
    HitLocation,
    MoveMode,
}

impl Family {
    /// Whether entities of this family may contain children.
    pub fn supports_containment(self) -> bool {
        !matches!(self, Self::HitLocation | Self::MoveMode)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Equipment => "equipment",
            Self::Trait => "trait",
            Self::Skill => "skill",
            Self::Spell => "spell",
            Self::Note => "note",
            Self::HitLocation => "hit location",
            Self::MoveMode => "move mode",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One of the eight named top-level buckets of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    EquipmentCarried,
    EquipmentOther,
    Traits,
    Skills,
    Spells,
    Notes,
    HitLocations,
    MoveModes,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::EquipmentCarried,
        Collection::EquipmentOther,
        Collection::Traits,
        Collection::Skills,
        Collection::Spells,
        Collection::Notes,
        Collection::HitLocations,
        Collection::MoveModes,
    ];

    pub fn family(self) -> Family {
        match self {
            Self::EquipmentCarried | Self::EquipmentOther => Family::Equipment,
            Self::Traits => Family::Trait,
            Self::Skills => Family::Skill,
            Self::Spells => Family::Spell,
            Self::Notes => Family::Note,
            Self::HitLocations => Family::HitLocation,
            Self::MoveModes => Family::MoveMode,
        }
    }

    pub fn supports_containment(self) -> bool {
        self.family().supports_containment()
    }

    /// Dotted path of this bucket in the legacy schema.
    pub fn legacy_path(self) -> &'static str {
        match self {
            Self::EquipmentCarried => "equipment.carried",
            Self::EquipmentOther => "equipment.other",
            Self::Traits => "ads",
            Self::Skills => "skills",
            Self::Spells => "spells",
            Self::Notes => "notes",
            Self::HitLocations => "hitlocations",
            Self::MoveModes => "move",
        }
    }

    /// Path of this bucket in the modern schema (fixed rename table).
    pub fn modern_path(self) -> &'static str {
        match self {
            Self::EquipmentCarried => "equipmentV2.carried",
            Self::EquipmentOther => "equipmentV2.other",
            Self::Traits => "adsV2",
            Self::Skills => "skillsV2",
            Self::Spells => "spellsV2",
            Self::Notes => "allNotes",
            Self::HitLocations => "hitlocationsV2",
            Self::MoveModes => "moveV2",
        }
    }

    /// Match a collection at the front of a legacy segment list.
    ///
    /// Returns the collection and how many segments it consumed (two for the
    /// equipment buckets, one for everything else).
    pub fn from_legacy_segments(segments: &[&str]) -> Option<(Collection, usize)> {
        match segments {
            ["equipment", "carried", ..] => Some((Self::EquipmentCarried, 2)),
            ["equipment", "other", ..] => Some((Self::EquipmentOther, 2)),
            ["ads", ..] => Some((Self::Traits, 1)),
            ["skills", ..] => Some((Self::Skills, 1)),
            ["spells", ..] => Some((Self::Spells, 1)),
            ["notes", ..] => Some((Self::Notes, 1)),
            ["hitlocations", ..] => Some((Self::HitLocations, 1)),
            ["move", ..] => Some((Self::MoveModes, 1)),
            _ => None,
        }
    }

    pub fn from_modern_path(path: &str) -> Option<Collection> {
        Self::ALL.into_iter().find(|c| c.modern_path() == path)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.legacy_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_table_is_total_and_distinct() {
        let mut modern: Vec<&str> = Collection::ALL.iter().map(|c| c.modern_path()).collect();
        modern.sort_unstable();
        modern.dedup();
        assert_eq!(modern.len(), Collection::ALL.len());

        for collection in Collection::ALL {
            assert_eq!(
                Collection::from_modern_path(collection.modern_path()),
                Some(collection)
            );
        }
    }

    #[test]
    fn test_legacy_segment_matching() {
        assert_eq!(
            Collection::from_legacy_segments(&["equipment", "carried", "00000"]),
            Some((Collection::EquipmentCarried, 2))
        );
        assert_eq!(
            Collection::from_legacy_segments(&["ads", "00001", "name"]),
            Some((Collection::Traits, 1))
        );
        assert_eq!(Collection::from_legacy_segments(&["equipment"]), None);
        assert_eq!(Collection::from_legacy_segments(&["wildcard"]), None);
    }

    #[test]
    fn test_flat_collections_reject_containment() {
        assert!(!Collection::HitLocations.supports_containment());
        assert!(!Collection::MoveModes.supports_containment());
        assert!(Collection::EquipmentOther.supports_containment());
        assert!(Collection::Notes.supports_containment());
    }
}
