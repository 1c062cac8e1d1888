//! Innate combat traits.
//!
//! A unit carries a [`TraitSet`]: at most one entry per [`TraitKind`], each
//! with an optional magnitude. Resolution code asks the set for a kind and
//! gets the magnitude back; it never scans raw lists.

use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    TypeInfo,
    MaxEncodedLen,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum TraitKind {
    /// Strikes back at whoever attacks this unit
    Counter,
    /// Attacks ignore armor
    Pierce,
    /// Bonus damage when attacking from behind the target
    Backstab,
    /// Two hits per attack
    DoubleAttack,
    /// Attacks poison the target
    Poison,
    /// Heals self after attacking (player units only)
    Healing,
    /// Heals at the end of every pass
    Regeneration,
    /// Blocks incoming hits
    Shield,
    /// Signals the host when the unit dies
    OnDeathTrigger,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Encode,
    Decode,
    TypeInfo,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct CombatTrait {
    pub kind: TraitKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<i32>,
}

impl CombatTrait {
    pub const fn new(kind: TraitKind) -> Self {
        Self { kind, magnitude: None }
    }

    pub const fn with_magnitude(kind: TraitKind, magnitude: i32) -> Self {
        Self {
            kind,
            magnitude: Some(magnitude),
        }
    }
}

/// Capability set keyed by [`TraitKind`], kept sorted by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, TypeInfo, Serialize, Deserialize)]
#[serde(from = "Vec<CombatTrait>", into = "Vec<CombatTrait>")]
pub struct TraitSet {
    entries: Vec<CombatTrait>,
}

impl TraitSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a trait, replacing any existing entry of the same kind.
    pub fn insert(&mut self, entry: CombatTrait) {
        match self.entries.binary_search_by_key(&entry.kind, |t| t.kind) {
            Ok(idx) => self.entries[idx] = entry,
            Err(idx) => self.entries.insert(idx, entry),
        }
    }

    pub fn with(mut self, entry: CombatTrait) -> Self {
        self.insert(entry);
        self
    }

    pub fn get(&self, kind: TraitKind) -> Option<&CombatTrait> {
        self.entries
            .binary_search_by_key(&kind, |t| t.kind)
            .ok()
            .map(|idx| &self.entries[idx])
    }

    pub fn has(&self, kind: TraitKind) -> bool {
        self.get(kind).is_some()
    }

    /// Magnitude of `kind` if the unit has it, using `fallback` when the
    /// trait carries no explicit value.
    pub fn magnitude_or(&self, kind: TraitKind, fallback: i32) -> Option<i32> {
        self.get(kind).map(|t| t.magnitude.unwrap_or(fallback))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CombatTrait> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<CombatTrait>> for TraitSet {
    fn from(list: Vec<CombatTrait>) -> Self {
        list.into_iter().collect()
    }
}

impl From<TraitSet> for Vec<CombatTrait> {
    fn from(set: TraitSet) -> Self {
        set.entries
    }
}

impl FromIterator<CombatTrait> for TraitSet {
    fn from_iter<I: IntoIterator<Item = CombatTrait>>(iter: I) -> Self {
        let mut set = TraitSet::new();
        for entry in iter {
            set.insert(entry);
        }
        set
    }
}

/// Decodes through [`FromIterator`] so a payload in any order comes out sorted.
impl Decode for TraitSet {
    fn decode<I: parity_scale_codec::Input>(
        input: &mut I,
    ) -> Result<Self, parity_scale_codec::Error> {
        Ok(Vec::<CombatTrait>::decode(input)?.into_iter().collect())
    }
}
