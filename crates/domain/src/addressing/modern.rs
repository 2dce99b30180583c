//! Modern addresses and the legacy ⟷ modern translation.
//!
//! Translation is bijective for a fixed snapshot: both sides carry the same
//! (collection, index-chain, property) triple, only the spelling differs. It
//! is *not* stable across mutations - indices encode position, not identity.

use std::fmt;

use crate::collection::Collection;
use crate::error::DomainError;

use super::legacy_key::LegacyKey;

/// An address in the modern schema: collection path, positional index chain,
/// optional trailing property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModernAddress {
    pub collection: Collection,
    pub indices: Vec<usize>,
    pub property: Option<String>,
}

impl ModernAddress {
    /// Translate a parsed legacy key (rename table lives on [`Collection`]).
    pub fn from_legacy(key: &LegacyKey) -> Self {
        Self {
            collection: key.collection,
            indices: key.indices.clone(),
            property: key.property.clone(),
        }
    }

    /// Translate back to the legacy spelling, re-applying zero padding.
    pub fn to_legacy(&self) -> LegacyKey {
        LegacyKey {
            collection: self.collection,
            indices: self.indices.clone(),
            property: self.property.clone(),
        }
    }

    /// Parse the modern spelling (`equipmentV2.carried.0.1.count`).
    pub fn parse(path: &str) -> Result<Self, DomainError> {
        let (collection, rest) = Collection::ALL
            .into_iter()
            .find_map(|c| {
                let prefix = c.modern_path();
                match path.strip_prefix(prefix) {
                    Some("") => Some((c, "")),
                    Some(tail) => tail.strip_prefix('.').map(|t| (c, t)),
                    None => None,
                }
            })
            .ok_or_else(|| {
                DomainError::malformed(format!("unrecognized modern collection in '{path}'"))
            })?;

        let mut indices = Vec::new();
        let mut property = None;
        let mut segments = rest.split('.').filter(|s| !s.is_empty()).peekable();
        while let Some(segment) = segments.peek() {
            if segment.bytes().all(|b| b.is_ascii_digit()) {
                let parsed = segment.parse::<usize>().map_err(|_| {
                    DomainError::malformed(format!("'{path}': index '{segment}' is out of range"))
                })?;
                indices.push(parsed);
                segments.next();
            } else {
                let remainder: Vec<&str> = segments.collect();
                property = Some(remainder.join("."));
                break;
            }
        }

        Ok(Self {
            collection,
            indices,
            property,
        })
    }
}

impl fmt::Display for ModernAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.collection.modern_path())?;
        for index in &self.indices {
            write!(f, ".{index}")?;
        }
        if let Some(property) = &self.property {
            write!(f, ".{property}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_to_modern_applies_rename_table() {
        let cases = [
            ("equipment.carried.00000", "equipmentV2.carried.0"),
            ("equipment.other.00002.name", "equipmentV2.other.2.name"),
            ("ads.00001", "adsV2.1"),
            ("skills.00000", "skillsV2.0"),
            ("spells.00000", "spellsV2.0"),
            ("notes.00003", "allNotes.3"),
            ("hitlocations.00002.dr", "hitlocationsV2.2.dr"),
            ("move.00000.basic", "moveV2.0.basic"),
        ];
        for (legacy, modern) in cases {
            let key = LegacyKey::parse(legacy).expect("valid legacy key");
            let address = ModernAddress::from_legacy(&key);
            assert_eq!(address.to_string(), modern, "legacy {legacy}");
        }
    }

    #[test]
    fn test_round_trip_is_identity_on_canonical_keys() {
        let keys = [
            "equipment.carried.00000.contains.00001.count",
            "ads.00004",
            "notes.00000.contains.00002",
            "hitlocations.00011.dr",
            "equipment.other",
        ];
        for text in keys {
            let canonical = LegacyKey::parse(text).expect("valid key").to_string();
            let reparsed = LegacyKey::parse(&canonical).expect("canonical parses");
            let round_tripped = ModernAddress::from_legacy(&reparsed).to_legacy().to_string();
            assert_eq!(round_tripped, canonical);
        }
    }

    #[test]
    fn test_parse_modern_spelling() {
        let address = ModernAddress::parse("equipmentV2.carried.0.3.count").expect("valid");
        assert_eq!(address.collection, Collection::EquipmentCarried);
        assert_eq!(address.indices, vec![0, 3]);
        assert_eq!(address.property.as_deref(), Some("count"));

        let bare = ModernAddress::parse("adsV2").expect("collection only");
        assert!(bare.indices.is_empty());
        assert_eq!(bare.property, None);
    }

    #[test]
    fn test_parse_modern_rejects_unknown_collection() {
        let err = ModernAddress::parse("adsV3.0").expect_err("unknown collection");
        assert!(matches!(err, DomainError::Malformed(_)));
    }
}
