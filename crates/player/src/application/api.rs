//! Typed story engine API built on the object-safe `RawApiPort`

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use ttrpg_domain::{
    CharacterId, CharacterSnapshot, Encounter, EncounterId, LocationId, LocationSnapshot,
};
use ttrpg_shared::{
    ActionResponse, CharacterContextResponse, CombatEncounterResponse, CombatStartRequest,
    LocationContextResponse, PlayerActionRequest,
};

use crate::application::{CombatError, ParseResponse};
use crate::ports::outbound::{ApiError, CombatServicePort, RawApiPort};

/// Story engine client used by the combat controller and the binary
#[derive(Clone)]
pub struct CombatApi {
    raw: Arc<dyn RawApiPort>,
}

impl CombatApi {
    pub fn new(raw: Arc<dyn RawApiPort>) -> Self {
        Self { raw }
    }

    fn to_body<B: Serialize>(body: &B) -> Result<serde_json::Value, ApiError> {
        serde_json::to_value(body).map_err(|e| ApiError::RequestFailed(e.to_string()))
    }

    /// Create an encounter (`POST /v1/combat/start`).
    pub async fn start_combat(
        &self,
        request: &CombatStartRequest,
    ) -> Result<Encounter, CombatError> {
        let body = Self::to_body(request)?;
        let response: CombatEncounterResponse = self
            .raw
            .post_json("/v1/combat/start", &body)
            .await?
            .parse()?;

        tracing::info!(
            encounter_id = %response.id,
            turn_order = ?response.turn_order,
            "Combat started"
        );
        Ok(response.into_encounter()?)
    }
}

#[async_trait]
impl CombatServicePort for CombatApi {
    async fn submit_player_action(
        &self,
        encounter_id: EncounterId,
        request: &PlayerActionRequest,
    ) -> Result<ActionResponse, ApiError> {
        let body = Self::to_body(request)?;
        self.raw
            .post_json(&format!("/v1/combat/{encounter_id}/player_action"), &body)
            .await?
            .parse()
    }

    async fn resolve_npc_turn(
        &self,
        encounter_id: EncounterId,
    ) -> Result<ActionResponse, ApiError> {
        self.raw
            .post_empty_with_response_json(&format!("/v1/combat/{encounter_id}/npc_action"))
            .await?
            .parse()
    }

    async fn fetch_character(
        &self,
        character_id: CharacterId,
    ) -> Result<CharacterSnapshot, ApiError> {
        let response: CharacterContextResponse = self
            .raw
            .get_json(&format!("/v1/context/character/{character_id}"))
            .await?
            .parse()?;
        Ok(response.into())
    }

    async fn fetch_location(&self, location_id: LocationId) -> Result<LocationSnapshot, ApiError> {
        let response: LocationContextResponse = self
            .raw
            .get_json(&format!("/v1/context/location/{location_id}"))
            .await?
            .parse()?;
        Ok(response.into())
    }
}
