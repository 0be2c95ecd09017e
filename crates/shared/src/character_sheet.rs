//! Character context wire types (`GET /v1/context/character/{char_id}`)
//!
//! The character engine stores the sheet as a loosely-typed JSON blob. Only
//! the parts combat needs are modelled here; everything else is ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ttrpg_domain::{Ability, CharacterId, CharacterSnapshot, HitPoints, InventoryEntry};

/// Response from the character context endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterContextResponse {
    pub id: CharacterId,
    pub name: String,
    #[serde(default)]
    pub kingdom: Option<String>,
    pub character_sheet: CharacterSheetData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSheetData {
    pub combat_stats: CombatStatsData,
    #[serde(default)]
    pub abilities: AbilitiesData,
    #[serde(default)]
    pub inventory: Vec<InventoryItemData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStatsData {
    pub max_hp: i64,
    pub current_hp: i64,
    #[serde(default)]
    pub status_effects: Vec<String>,
}

/// Abilities arrive either as a list or as a name -> rank map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AbilitiesData {
    List(Vec<AbilityEntryData>),
    Ranked(BTreeMap<String, i64>),
}

impl Default for AbilitiesData {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AbilityEntryData {
    Name(String),
    Detailed {
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl AbilitiesData {
    pub fn to_abilities(&self) -> Vec<Ability> {
        match self {
            Self::List(entries) => entries
                .iter()
                .map(|entry| match entry {
                    AbilityEntryData::Name(name) => Ability {
                        id: name.clone(),
                        name: name.clone(),
                    },
                    AbilityEntryData::Detailed { id, name } => Ability {
                        id: id.clone(),
                        name: name.clone().unwrap_or_else(|| id.clone()),
                    },
                })
                .collect(),
            Self::Ranked(ranks) => ranks
                .keys()
                .map(|name| Ability {
                    id: name.clone(),
                    name: name.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItemData {
    /// Older sheets used `template_id` for the same field
    #[serde(alias = "template_id")]
    pub item_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl From<CharacterContextResponse> for CharacterSnapshot {
    fn from(response: CharacterContextResponse) -> Self {
        let sheet = response.character_sheet;
        Self {
            id: response.id,
            name: response.name,
            hit_points: HitPoints::new(sheet.combat_stats.current_hp, sheet.combat_stats.max_hp),
            abilities: sheet.abilities.to_abilities(),
            inventory: sheet
                .inventory
                .into_iter()
                .map(|item| InventoryEntry {
                    item_id: item.item_id,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}
