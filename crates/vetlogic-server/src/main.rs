//! `VetLogic` server binary.
//!
//! Loads `vetlogic-config.yaml` (or the path given as the first
//! argument), restores the player's save, wires the `DeepSeek` generator
//! and the question bank into a game session, starts energy regeneration,
//! and serves the API until `Ctrl-C`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vetlogic_ai::{ChatClient, DeepSeekGenerator, PromptEngine, QuestionSource, SupabaseClient};
use vetlogic_core::{GameSession, VetLogicConfig};
use vetlogic_store::{FileStorage, GameStore, spawn_energy_regen};
use vetlogic_server::{AppState, start_server};

/// Default configuration file, relative to the working directory.
const CONFIG_PATH: &str = "vetlogic-config.yaml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("vetlogic-server starting");

    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(CONFIG_PATH), PathBuf::from);
    let config = VetLogicConfig::load_or_default(&config_path)?;
    info!(
        config = %config_path.display(),
        llm_configured = config.llm.api_key.is_some(),
        bank_configured = config.question_bank.credentials().is_some(),
        "configuration loaded"
    );

    let prompts = match std::env::var_os("VETLOGIC_PROMPTS_DIR") {
        Some(dir) => {
            let engine = PromptEngine::from_dir(Path::new(&dir))?;
            info!(dir = %Path::new(&dir).display(), "prompt overrides loaded");
            engine
        }
        None => PromptEngine::builtin()?,
    };

    let timeout = Duration::from_millis(config.llm.timeout_ms);
    let mut generator = DeepSeekGenerator::with_prompts(ChatClient::new(&config.llm), prompts);
    if let Some((url, key)) = config.question_bank.credentials() {
        generator = generator.with_templates(SupabaseClient::new(url, key, timeout)?);
        info!("case templates enabled");
    }
    info!(model = %config.llm.model, "case generator configured");

    let bank = QuestionSource::from_config(&config.question_bank, timeout)?;
    info!(bank = bank.name(), "question bank configured");

    let storage = FileStorage::new(config.storage.save_dir.clone());
    let store = GameStore::load(storage, &config.storage.save_key, config.rules.clone());
    info!(
        dir = %config.storage.save_dir.display(),
        key = %config.storage.save_key,
        outcome = ?store.outcome(),
        "save loaded"
    );
    let store = Arc::new(Mutex::new(store));

    let energy = &config.rules.energy;
    let regen = spawn_energy_regen(
        Arc::clone(&store),
        energy.regen_amount,
        Duration::from_millis(energy.regen_interval_ms),
    );

    let session = GameSession::new(store, generator, bank, config.player.user_id.as_str()).await?;
    info!(player = %config.player.user_id, "game session ready");

    let served = start_server(&config.server, Arc::new(AppState::new(session))).await;
    regen.shutdown().await;
    served?;
    Ok(())
}
