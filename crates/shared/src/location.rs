//! Location context wire types (`GET /v1/context/location/{location_id}`)

use serde::{Deserialize, Serialize};

use ttrpg_domain::{HitPoints, LocationId, LocationSnapshot, NpcInstanceId, NpcSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationContextResponse {
    pub id: LocationId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub npc_instances: Vec<NpcInstanceData>,
}

/// NPC instance as listed in a location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcInstanceData {
    pub id: NpcInstanceId,
    pub template_id: String,
    #[serde(default)]
    pub name_override: Option<String>,
    pub current_hp: i64,
    pub max_hp: i64,
    #[serde(default)]
    pub status_effects: Vec<String>,
    #[serde(default)]
    pub behavior_tags: Vec<String>,
}

impl From<NpcInstanceData> for NpcSnapshot {
    fn from(data: NpcInstanceData) -> Self {
        Self {
            id: data.id,
            template_id: data.template_id,
            name_override: data.name_override,
            hit_points: HitPoints::new(data.current_hp, data.max_hp),
            behavior_tags: data.behavior_tags,
        }
    }
}

impl From<LocationContextResponse> for LocationSnapshot {
    fn from(response: LocationContextResponse) -> Self {
        Self {
            id: response.id,
            name: response.name,
            npcs: response.npc_instances.into_iter().map(Into::into).collect(),
        }
    }
}
