//! TTRPG Player - composition root binary.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttrpg_player::infrastructure::http_client::ApiAdapter;
use ttrpg_player::ports::outbound::CombatServicePort;
use ttrpg_player::{CombatApi, CombatController, CombatOutcome, PlayerConfig};
use ttrpg_shared::CombatStartRequest;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttrpg_player=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting TTRPG Player");

    let config = PlayerConfig::from_env()?;

    // HTTP
    let raw_api = Arc::new(ApiAdapter::new(
        &config.story_engine_url,
        config.combat.request_timeout,
    )?);
    let api = CombatApi::new(raw_api);

    let encounter = api
        .start_combat(&CombatStartRequest::new(
            config.location_id,
            [config.character_id],
            config.npc_template_ids.clone(),
        ))
        .await?;

    let service: Arc<dyn CombatServicePort> = Arc::new(api);
    let (controller, handle) =
        CombatController::new(service, encounter, config.character_id, config.combat.clone());
    let controller_task = tokio::spawn(controller.run());

    ttrpg_player::ui::terminal::run(handle).await?;
    let outcome = controller_task.await?;

    match outcome {
        CombatOutcome::Victory | CombatOutcome::Defeat => println!("{}", outcome.message()),
        CombatOutcome::Abandoned => println!("You left the fight."),
    }
    Ok(())
}
