//! Combat service port - the four story engine calls the combat controller makes

use async_trait::async_trait;

use ttrpg_domain::{CharacterId, CharacterSnapshot, EncounterId, LocationId, LocationSnapshot};
use ttrpg_shared::{ActionResponse, PlayerActionRequest};

use super::ApiError;

/// Authoritative combat service as seen by one client.
///
/// Implementations must not retry on their own; retry policy belongs to the
/// controller.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CombatServicePort: Send + Sync {
    /// Submit the local player's action for resolution.
    async fn submit_player_action(
        &self,
        encounter_id: EncounterId,
        request: &PlayerActionRequest,
    ) -> Result<ActionResponse, ApiError>;

    /// Ask the service to resolve the current non-player turn.
    async fn resolve_npc_turn(&self, encounter_id: EncounterId)
        -> Result<ActionResponse, ApiError>;

    async fn fetch_character(
        &self,
        character_id: CharacterId,
    ) -> Result<CharacterSnapshot, ApiError>;

    async fn fetch_location(&self, location_id: LocationId) -> Result<LocationSnapshot, ApiError>;
}
