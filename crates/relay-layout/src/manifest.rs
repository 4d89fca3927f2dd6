//! Deck manifest model
//!
//! The manifest is a tabletop save file: a list of object states, each
//! carrying an ordered list of card ids and the atlases those cards live in.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::constants::CARD_ID_MODULUS;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "ObjectStates", default)]
    pub object_states: Vec<ObjectState>,
}

impl Manifest {
    /// Build the deck for the object state at `index`
    pub fn deck(&self, index: usize) -> Option<Deck> {
        self.object_states.get(index).map(Deck::from_object_state)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectState {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(rename = "DeckIDs", default)]
    pub deck_ids: Vec<u32>,
    #[serde(default)]
    pub contained_objects: Vec<ContainedObject>,
    #[serde(default)]
    pub custom_deck: BTreeMap<String, CustomDeckEntry>,
}

impl ObjectState {
    /// Ordered card ids, falling back to the contained objects when the id list is absent
    pub fn card_ids(&self) -> Vec<u32> {
        if !self.deck_ids.is_empty() {
            return self.deck_ids.clone();
        }
        self.contained_objects.iter().map(|c| c.card_id).collect()
    }

    pub fn nickname_for(&self, card_id: u32) -> Option<&str> {
        self.contained_objects
            .iter()
            .find(|c| c.card_id == card_id)
            .map(|c| c.nickname.as_str())
            .filter(|n| !n.is_empty())
    }

    /// Display label: nickname, then name, then a placeholder
    pub fn label(&self) -> &str {
        if !self.nickname.is_empty() {
            &self.nickname
        } else if !self.name.is_empty() {
            &self.name
        } else {
            "(unnamed deck)"
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainedObject {
    #[serde(rename = "CardID")]
    pub card_id: u32,
    #[serde(rename = "Nickname", default)]
    pub nickname: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomDeckEntry {
    #[serde(rename = "FaceURL", alias = "FaceUrl", default)]
    pub face_url: String,
    #[serde(rename = "BackURL", alias = "BackUrl", default)]
    pub back_url: String,
    #[serde(default = "one")]
    pub num_width: u32,
    #[serde(default = "one")]
    pub num_height: u32,
    #[serde(default)]
    pub unique_back: bool,
}

fn one() -> u32 {
    1
}

/// Grid description of one atlas, as listed in the manifest
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasSpec {
    pub face_url: String,
    pub back_url: String,
    /// Cells per row (never zero)
    pub grid_width: u32,
    /// Cells per column (never zero)
    pub grid_height: u32,
    /// The back atlas holds one back per card instead of a single shared image
    pub unique_back: bool,
}

impl AtlasSpec {
    /// Grid dimensions of the back atlas
    pub fn back_grid(&self) -> (u32, u32) {
        if self.unique_back {
            (self.grid_width, self.grid_height)
        } else {
            (1, 1)
        }
    }
}

impl From<&CustomDeckEntry> for AtlasSpec {
    fn from(entry: &CustomDeckEntry) -> Self {
        Self {
            face_url: entry.face_url.clone(),
            back_url: entry.back_url.clone(),
            grid_width: entry.num_width.max(1),
            grid_height: entry.num_height.max(1),
            unique_back: entry.unique_back,
        }
    }
}

/// Key of the atlas a card lives in: the id with its two position digits dropped
pub fn atlas_key(card_id: u32) -> String {
    (card_id / CARD_ID_MODULUS).to_string()
}

/// A selected deck: ordered card ids plus the atlases they reference
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    pub name: String,
    pub card_ids: Vec<u32>,
    pub atlases: BTreeMap<String, AtlasSpec>,
    nicknames: HashMap<u32, String>,
}

impl Deck {
    pub fn new(
        name: impl Into<String>,
        card_ids: Vec<u32>,
        atlases: BTreeMap<String, AtlasSpec>,
    ) -> Self {
        Self {
            name: name.into(),
            card_ids,
            atlases,
            nicknames: HashMap::new(),
        }
    }

    pub fn from_object_state(state: &ObjectState) -> Self {
        let atlases = state
            .custom_deck
            .iter()
            .map(|(key, entry)| (key.clone(), AtlasSpec::from(entry)))
            .collect();
        let nicknames = state
            .contained_objects
            .iter()
            .filter(|c| !c.nickname.is_empty())
            .map(|c| (c.card_id, c.nickname.clone()))
            .collect();
        Self {
            name: state.label().to_string(),
            card_ids: state.card_ids(),
            atlases,
            nicknames,
        }
    }

    pub fn card_count(&self) -> usize {
        self.card_ids.len()
    }

    /// Atlas for a card, if the manifest lists one
    pub fn atlas_for(&self, card_id: u32) -> Option<&AtlasSpec> {
        self.atlases.get(&atlas_key(card_id))
    }

    pub fn nickname(&self, card_id: u32) -> Option<&str> {
        self.nicknames.get(&card_id).map(String::as_str)
    }
}
