//! Combat controller - the event loop that owns one encounter
//!
//! Commands from the handle and completions of service calls arrive on one
//! queue and are folded through the transition table one at a time. Service
//! calls run as spawned tasks that post their result back as an event, so
//! the loop itself never awaits the network.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use ttrpg_domain::{ActorId, CharacterId, Encounter};
use ttrpg_shared::PlayerActionRequest;

use super::handle::CombatHandle;
use super::refresh::fetch_roster;
use super::state::{CombatOutcome, CombatState};
use super::transitions::{apply, CombatEvent, Effect};
use super::view::CombatView;
use super::CombatConfig;
use crate::ports::outbound::api_port::with_timeout;
use crate::ports::outbound::CombatServicePort;

/// A spawned task that is aborted when dropped
struct ScheduledTask(JoinHandle<()>);

impl ScheduledTask {
    /// Post `event` to the controller after `delay`.
    fn after(
        delay: Duration,
        events: mpsc::UnboundedSender<CombatEvent>,
        event: CombatEvent,
    ) -> Self {
        Self(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(event);
        }))
    }

    fn spawn<F>(task: F) -> Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        Self(tokio::spawn(task.in_current_span()))
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Drives one encounter from the first refresh to victory, defeat or exit.
pub struct CombatController {
    id: Uuid,
    service: Arc<dyn CombatServicePort>,
    config: CombatConfig,
    state: CombatState,
    events_tx: mpsc::UnboundedSender<CombatEvent>,
    events_rx: mpsc::UnboundedReceiver<CombatEvent>,
    views: watch::Sender<Arc<CombatView>>,
    shutdown: CancellationToken,
    in_flight: Option<ScheduledTask>,
    retry_timer: Option<ScheduledTask>,
    settle_timer: Option<ScheduledTask>,
}

impl CombatController {
    pub fn new(
        service: Arc<dyn CombatServicePort>,
        encounter: Encounter,
        local_character: CharacterId,
        config: CombatConfig,
    ) -> (Self, CombatHandle) {
        let state = CombatState::new(
            encounter,
            ActorId::player(local_character),
            config.log_capacity,
        );
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (views, views_rx) = watch::channel(Arc::new(CombatView::from_state(&state)));
        let shutdown = CancellationToken::new();

        let handle = CombatHandle::new(events_tx.clone(), views_rx, shutdown.clone());
        let controller = Self {
            id: Uuid::new_v4(),
            service,
            config,
            state,
            events_tx,
            events_rx,
            views,
            shutdown,
            in_flight: None,
            retry_timer: None,
            settle_timer: None,
        };
        (controller, handle)
    }

    /// Run until the settle delay after a decisive outcome, or until exit.
    pub async fn run(self) -> CombatOutcome {
        let span = tracing::info_span!(
            "combat",
            controller_id = %self.id,
            encounter_id = %self.state.encounter().id(),
            actor_id = %self.state.local_actor(),
        );
        self.event_loop().instrument(span).await
    }

    async fn event_loop(mut self) -> CombatOutcome {
        tracing::info!(
            turn_order = ?self.state.encounter().turn_order(),
            "Combat controller started"
        );
        self.dispatch(CombatEvent::Start);

        while !self.state.is_ended() {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => self.dispatch(CombatEvent::Exit),
                event = self.events_rx.recv() => match event {
                    Some(event) => self.dispatch(event),
                    None => break,
                },
            }
        }

        self.teardown();
        let outcome = self.state.outcome().unwrap_or(CombatOutcome::Abandoned);
        tracing::info!(outcome = %outcome, "Combat controller stopped");
        outcome
    }

    fn dispatch(&mut self, event: CombatEvent) {
        for effect in apply(&mut self.state, event) {
            self.execute(effect);
        }
        self.publish();
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::SubmitAction(request) => self.submit_action(request),
            Effect::ResolveOpponentTurn => self.resolve_opponent_turn(),
            Effect::RefreshParticipants => self.refresh_participants(),
            Effect::ScheduleOpponentRetry => {
                self.retry_timer = Some(ScheduledTask::after(
                    self.config.retry_delay,
                    self.events_tx.clone(),
                    CombatEvent::RetryOpponentTurn,
                ));
            }
            Effect::ScheduleExit => {
                tracing::debug!(
                    settle_ms = %self.config.settle_delay.as_millis(),
                    "Scheduling exit"
                );
                self.settle_timer = Some(ScheduledTask::after(
                    self.config.settle_delay,
                    self.events_tx.clone(),
                    CombatEvent::SettleElapsed,
                ));
            }
            Effect::Teardown => self.teardown(),
        }
    }

    fn submit_action(&mut self, request: PlayerActionRequest) {
        let service = Arc::clone(&self.service);
        let events = self.events_tx.clone();
        let encounter_id = self.state.encounter().id();
        let timeout = self.config.request_timeout;

        self.in_flight = Some(ScheduledTask::spawn(async move {
            let result =
                with_timeout(timeout, service.submit_player_action(encounter_id, &request)).await;
            if events.send(CombatEvent::ActionSubmitted(result)).is_err() {
                tracing::debug!("Controller gone, dropping action response");
            }
        }));
    }

    fn resolve_opponent_turn(&mut self) {
        let service = Arc::clone(&self.service);
        let events = self.events_tx.clone();
        let encounter_id = self.state.encounter().id();
        let timeout = self.config.request_timeout;

        self.in_flight = Some(ScheduledTask::spawn(async move {
            let result = with_timeout(timeout, service.resolve_npc_turn(encounter_id)).await;
            if events.send(CombatEvent::OpponentTurnResolved(result)).is_err() {
                tracing::debug!("Controller gone, dropping opponent turn response");
            }
        }));
    }

    fn refresh_participants(&mut self) {
        let service = Arc::clone(&self.service);
        let events = self.events_tx.clone();
        let encounter = self.state.encounter().clone();
        let timeout = self.config.request_timeout;

        self.in_flight = Some(ScheduledTask::spawn(async move {
            let roster = fetch_roster(service.as_ref(), &encounter, timeout).await;
            if events.send(CombatEvent::ParticipantsRefreshed(roster)).is_err() {
                tracing::debug!("Controller gone, dropping participant refresh");
            }
        }));
    }

    /// Cancel every outstanding task and publish the final view.
    fn teardown(&mut self) {
        self.in_flight = None;
        self.retry_timer = None;
        self.settle_timer = None;
        self.events_rx.close();
        self.publish();
    }

    fn publish(&self) {
        self.views
            .send_replace(Arc::new(CombatView::from_state(&self.state)));
    }
}
