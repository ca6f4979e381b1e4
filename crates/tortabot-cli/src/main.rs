use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tortabot_application::{ConversationEngine, ConversationService};
use tortabot_core::catalog::Catalog;
use tortabot_core::settings::Settings;
use tortabot_core::store::{StoreDirectory, StoreLocator, StoreLocatorOracle};
use tortabot_infrastructure::{CatalogStorage, InMemoryConversationRepository, SettingsStorage};
use tortabot_interaction::{GeminiApiAgent, GeminiNluOracle, GeminiStoreLocator};
use tracing_subscriber::EnvFilter;

mod repl;

#[derive(Parser)]
#[command(name = "tortabot")]
#[command(about = "Tortabot - chat with the bakery order assistant from a terminal", long_about = None)]
struct Cli {
    /// Catalog JSON replacing the bundled one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Settings TOML (defaults to ~/.config/tortabot/settings.toml)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Run with the rule-based pipeline only, never calling Gemini
    #[arg(long)]
    offline: bool,

    /// Conversation id for this session
    #[arg(long, default_value = "cli-session")]
    conversation_id: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tortabot=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => SettingsStorage::with_path(path).load()?,
        None => SettingsStorage::new()?.load()?,
    };
    let catalog = match &cli.catalog {
        Some(path) => CatalogStorage::with_override(path).load()?,
        None => CatalogStorage::bundled().load()?,
    };
    let directory = Arc::new(StoreDirectory::bundled()?);

    let engine = build_engine(catalog, directory, settings, cli.offline);
    let service = ConversationService::new(
        Arc::new(engine),
        Arc::new(InMemoryConversationRepository::new()),
    );

    repl::run(&service, &cli.conversation_id).await
}

/// Wires the engine, attaching Gemini oracles when credentials are available.
fn build_engine(
    catalog: Catalog,
    directory: Arc<StoreDirectory>,
    settings: Settings,
    offline: bool,
) -> ConversationEngine {
    let agent = if offline {
        None
    } else {
        match GeminiApiAgent::try_from_env() {
            Ok(agent) => Some(agent),
            Err(e) => {
                tracing::warn!(error = %e, "Gemini unavailable, continuing with rules only");
                None
            }
        }
    };

    let Some(agent) = agent else {
        let locator = StoreLocator::new(directory, None);
        return ConversationEngine::new(Arc::new(catalog), locator, settings);
    };

    tracing::info!(model = agent.model(), "Using Gemini oracles");
    let store_oracle: Arc<dyn StoreLocatorOracle> = Arc::new(GeminiStoreLocator::new(agent.clone()));
    let locator = StoreLocator::new(directory, Some(store_oracle));
    let nlu = GeminiNluOracle::new(agent, &settings, &catalog);
    let engine = ConversationEngine::new(Arc::new(catalog), locator, settings);
    match nlu {
        Ok(nlu) => engine.with_nlu_oracle(Arc::new(nlu)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to prepare the NLU prompt, continuing with rules only");
            engine
        }
    }
}
