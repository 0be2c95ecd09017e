//! Participant refresh - re-fetches every combatant in the turn order

use std::collections::HashSet;
use std::time::Duration;

use ttrpg_domain::{ActorId, ActorRef, Encounter, Participant, Side};

use crate::ports::outbound::api_port::with_timeout;
use crate::ports::outbound::CombatServicePort;

/// A participant that could not be fetched this cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub actor_id: ActorId,
    /// `None` when the identifier itself could not be interpreted
    pub side: Option<Side>,
    pub reason: String,
}

/// Result of one full refresh cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub participants: Vec<Participant>,
    pub failures: Vec<FetchFailure>,
}

impl Roster {
    fn fail(&mut self, actor_id: &ActorId, side: Option<Side>, reason: impl Into<String>) {
        self.failures.push(FetchFailure {
            actor_id: actor_id.clone(),
            side,
            reason: reason.into(),
        });
    }

    /// Sides with at least one failed fetch.
    pub fn unconfirmed_sides(&self) -> HashSet<Side> {
        self.failures.iter().filter_map(|f| f.side).collect()
    }
}

/// Fetch a fresh snapshot for every identifier in the turn order.
///
/// Player ids use the character context; NPC ids look themselves up in the
/// encounter location's current NPC list. An NPC missing from that list has
/// been removed by the world engine and is simply left out.
pub async fn fetch_roster(
    service: &dyn CombatServicePort,
    encounter: &Encounter,
    timeout: Duration,
) -> Roster {
    let mut roster = Roster::default();
    let mut seen = HashSet::new();

    for actor_id in encounter.turn_order() {
        if !seen.insert(actor_id) {
            continue;
        }

        match actor_id.resolve() {
            Ok(ActorRef::Player(character_id)) => {
                match with_timeout(timeout, service.fetch_character(character_id)).await {
                    Ok(character) => roster
                        .participants
                        .push(Participant::player(actor_id.clone(), character)),
                    Err(e) => {
                        tracing::warn!(actor_id = %actor_id, error = %e, "Character fetch failed");
                        roster.fail(actor_id, Some(Side::Players), e.to_string());
                    }
                }
            }
            Ok(ActorRef::Npc(npc_id)) => {
                match with_timeout(timeout, service.fetch_location(encounter.location_id())).await
                {
                    Ok(location) => match location.find_npc(npc_id) {
                        Some(npc) => roster
                            .participants
                            .push(Participant::npc(actor_id.clone(), npc.clone())),
                        None => {
                            tracing::debug!(
                                actor_id = %actor_id,
                                location_id = %encounter.location_id(),
                                "NPC no longer present in location"
                            );
                        }
                    },
                    Err(e) => {
                        tracing::warn!(actor_id = %actor_id, error = %e, "Location fetch failed");
                        roster.fail(actor_id, Some(Side::Opponents), e.to_string());
                    }
                }
            }
            Err(e) => {
                tracing::warn!(actor_id = %actor_id, "Unrecognized turn order entry");
                roster.fail(actor_id, None, e.to_string());
            }
        }
    }

    roster
}
