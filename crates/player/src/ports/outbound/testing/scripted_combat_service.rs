use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use ttrpg_domain::{
    CharacterId, CharacterSnapshot, EncounterId, HitPoints, LocationId, LocationSnapshot,
    NpcInstanceId, NpcSnapshot,
};
use ttrpg_shared::{ActionResponse, PlayerActionRequest};

use crate::ports::outbound::{ApiError, CombatServicePort};

#[derive(Default)]
struct World {
    characters: HashMap<CharacterId, CharacterSnapshot>,
    npcs: Vec<NpcSnapshot>,
    player_responses: VecDeque<Result<ActionResponse, ApiError>>,
    npc_responses: VecDeque<Result<ActionResponse, ApiError>>,
    failing_characters: HashSet<CharacterId>,
    failing_location_calls: HashSet<usize>,
    submitted: Vec<PlayerActionRequest>,
    npc_turns_requested: usize,
    location_calls: usize,
    action_latency: Duration,
}

/// In-memory story engine for controller tests.
///
/// Action calls pop scripted responses; context calls read the current world,
/// which tests mutate between turns to simulate damage.
#[derive(Default)]
pub struct ScriptedCombatService {
    world: Mutex<World>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedCombatService {
    pub fn new() -> Self {
        Self::default()
    }

    fn world(&self) -> MutexGuard<'_, World> {
        self.world.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_character(&self, id: u64, name: &str, hp: i64) -> &Self {
        self.insert_character(CharacterSnapshot {
            id: CharacterId::new(id),
            name: name.to_string(),
            hit_points: HitPoints::new(hp, hp.max(1)),
            abilities: Vec::new(),
            inventory: Vec::new(),
        })
    }

    pub fn insert_character(&self, character: CharacterSnapshot) -> &Self {
        self.world().characters.insert(character.id, character);
        self
    }

    pub fn add_npc(&self, id: u64, template_id: &str, hp: i64) -> &Self {
        self.world().npcs.push(NpcSnapshot {
            id: NpcInstanceId::new(id),
            template_id: template_id.to_string(),
            name_override: None,
            hit_points: HitPoints::new(hp, hp.max(1)),
            behavior_tags: Vec::new(),
        });
        self
    }

    pub fn remove_npc(&self, id: u64) {
        self.world().npcs.retain(|npc| npc.id != NpcInstanceId::new(id));
    }

    pub fn set_character_hp(&self, id: u64, hp: i64) {
        if let Some(character) = self.world().characters.get_mut(&CharacterId::new(id)) {
            character.hit_points.current = hp;
        }
    }

    pub fn set_npc_hp(&self, id: u64, hp: i64) {
        if let Some(npc) = self
            .world()
            .npcs
            .iter_mut()
            .find(|npc| npc.id == NpcInstanceId::new(id))
        {
            npc.hit_points.current = hp;
        }
    }

    pub fn fail_character(&self, id: u64) {
        self.world().failing_characters.insert(CharacterId::new(id));
    }

    /// Fail the n-th (zero-based) location fetch.
    pub fn fail_location_call(&self, call: usize) {
        self.world().failing_location_calls.insert(call);
    }

    pub fn push_player_response(&self, response: Result<ActionResponse, ApiError>) -> &Self {
        self.world().player_responses.push_back(response);
        self
    }

    pub fn push_npc_response(&self, response: Result<ActionResponse, ApiError>) -> &Self {
        self.world().npc_responses.push_back(response);
        self
    }

    /// Delay applied to both action endpoints.
    pub fn set_action_latency(&self, latency: Duration) {
        self.world().action_latency = latency;
    }

    pub fn submitted(&self) -> Vec<PlayerActionRequest> {
        self.world().submitted.clone()
    }

    pub fn npc_turns_requested(&self) -> usize {
        self.world().npc_turns_requested
    }

    pub fn location_calls(&self) -> usize {
        self.world().location_calls
    }

    /// Highest number of action calls observed running at once.
    pub fn max_concurrent_actions(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn action<F>(&self, pop: F) -> Result<ActionResponse, ApiError>
    where
        F: FnOnce(&mut World) -> Option<Result<ActionResponse, ApiError>>,
    {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let latency = self.world().action_latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let response = pop(&mut *self.world())
            .unwrap_or_else(|| Err(ApiError::RequestFailed("no scripted response".into())));

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}

#[async_trait]
impl CombatServicePort for ScriptedCombatService {
    async fn submit_player_action(
        &self,
        _encounter_id: EncounterId,
        request: &PlayerActionRequest,
    ) -> Result<ActionResponse, ApiError> {
        self.world().submitted.push(request.clone());
        self.action(|world| world.player_responses.pop_front()).await
    }

    async fn resolve_npc_turn(
        &self,
        _encounter_id: EncounterId,
    ) -> Result<ActionResponse, ApiError> {
        self.world().npc_turns_requested += 1;
        self.action(|world| world.npc_responses.pop_front()).await
    }

    async fn fetch_character(
        &self,
        character_id: CharacterId,
    ) -> Result<CharacterSnapshot, ApiError> {
        let world = self.world();
        if world.failing_characters.contains(&character_id) {
            return Err(ApiError::RequestFailed("character service down".into()));
        }
        world
            .characters
            .get(&character_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Character {character_id}")))
    }

    async fn fetch_location(&self, location_id: LocationId) -> Result<LocationSnapshot, ApiError> {
        let mut world = self.world();
        let call = world.location_calls;
        world.location_calls += 1;
        if world.failing_location_calls.contains(&call) {
            return Err(ApiError::RequestFailed("world engine down".into()));
        }
        Ok(LocationSnapshot {
            id: location_id,
            name: "Old Mill".into(),
            npcs: world.npcs.clone(),
        })
    }
}
