//! Presentation-side handle to a running combat controller

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::state::CombatOutcome;
use super::transitions::{CombatEvent, PlayerCommand};
use super::view::CombatView;
use crate::application::CombatError;

/// Cloneable handle held by the presentation layer.
///
/// Commands go through the controller's event queue; views come back as
/// immutable snapshots over a watch channel.
#[derive(Clone)]
pub struct CombatHandle {
    events: mpsc::UnboundedSender<CombatEvent>,
    views: watch::Receiver<Arc<CombatView>>,
    shutdown: CancellationToken,
}

impl CombatHandle {
    pub(super) fn new(
        events: mpsc::UnboundedSender<CombatEvent>,
        views: watch::Receiver<Arc<CombatView>>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            events,
            views,
            shutdown,
        }
    }

    /// Queue a menu command. Commands that are not legal in the current
    /// state are ignored by the controller.
    pub fn send(&self, command: PlayerCommand) -> Result<(), CombatError> {
        self.events
            .send(CombatEvent::Command(command))
            .map_err(|_| CombatError::ControllerClosed)
    }

    /// Leave combat now, in queue order with other events.
    pub fn exit(&self) -> Result<(), CombatError> {
        self.events
            .send(CombatEvent::Exit)
            .map_err(|_| CombatError::ControllerClosed)
    }

    /// Stop the controller immediately, ahead of anything already queued.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// The latest published view.
    pub fn view(&self) -> Arc<CombatView> {
        self.views.borrow().clone()
    }

    /// Wait for the next published view.
    pub async fn changed(&mut self) -> Result<Arc<CombatView>, CombatError> {
        self.views
            .changed()
            .await
            .map_err(|_| CombatError::ControllerClosed)?;
        Ok(self.views.borrow_and_update().clone())
    }

    /// Wait until a published view satisfies `predicate` (checked against the current one first).
    pub async fn wait_for<F>(&mut self, mut predicate: F) -> Result<Arc<CombatView>, CombatError>
    where
        F: FnMut(&CombatView) -> bool,
    {
        let view = self
            .views
            .wait_for(|view| predicate(view))
            .await
            .map_err(|_| CombatError::ControllerClosed)?;
        Ok(view.clone())
    }

    /// The single "combat ended" signal: resolves once the controller stops.
    pub async fn ended(&mut self) -> Result<CombatOutcome, CombatError> {
        let view = self.wait_for(|view| view.ended).await?;
        Ok(view.outcome.unwrap_or(CombatOutcome::Abandoned))
    }
}
