use std::io::Write as IoWrite;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use codeloom_core::creator::{Creator, CreatorRepository};
use codeloom_core::{Backend, EngineConfig};
use codeloom_engine::GenerationEngine;
use codeloom_infrastructure::{
    LlamaServerGateway, ModelCatalog, Settings, SettingsStore, TomlDirCreatorRepository,
};

#[derive(Parser)]
#[command(name = "codeloom")]
#[command(about = "Codeloom - prompt-to-code generation over a local LLM runtime", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List models from the catalog
    Models,
    /// Generate code from a prompt and stream it to stdout
    Generate {
        /// What to build
        prompt: String,
        /// Model id (defaults to the last used model, then the first
        /// catalog entry)
        #[arg(long)]
        model: Option<String>,
        /// Backend to load on: cpu or gpu
        #[arg(long)]
        backend: Option<String>,
        /// Name of a saved creator to style the output
        #[arg(long)]
        creator: Option<String>,
        /// Base URL of the llama server
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        server: String,
    },
    /// Manage saved creators
    Creators {
        #[command(subcommand)]
        action: CreatorAction,
    },
}

#[derive(Subcommand)]
enum CreatorAction {
    /// List saved creators
    List,
    /// Save a new creator
    Add {
        name: String,
        role: String,
        style: String,
    },
    /// Delete a creator by id
    Remove { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Models => list_models(),
        Commands::Generate {
            prompt,
            model,
            backend,
            creator,
            server,
        } => generate(prompt, model, backend, creator, server).await,
        Commands::Creators { action } => creators(action).await,
    }
}

fn list_models() -> Result<()> {
    let catalog = ModelCatalog::new_default()?;
    let models = catalog.load()?;
    if models.is_empty() {
        println!("No models in {:?}", catalog.path());
        return Ok(());
    }
    for model in models {
        println!(
            "{:<20} {:<24} ctx {}",
            model.id, model.display_name, model.context_window
        );
    }
    Ok(())
}

async fn generate(
    prompt: String,
    model: Option<String>,
    backend: Option<String>,
    creator: Option<String>,
    server: String,
) -> Result<()> {
    let catalog = ModelCatalog::new_default()?;
    let models = catalog.load()?;
    let settings_store = SettingsStore::new_default()?;
    let settings = settings_store.load()?;

    let model_id = model
        .or(settings.selected_model_id)
        .or_else(|| models.first().map(|m| m.id.clone()))
        .context("no model available; add one to models.toml or pass --model")?;
    let model = catalog.find(&model_id)?;

    let backend = match backend {
        Some(raw) => Backend::from_str(&raw)
            .map_err(|_| anyhow::anyhow!("unknown backend '{raw}', expected cpu or gpu"))?,
        None => settings.backend,
    };

    let gateway = Arc::new(LlamaServerGateway::new(server));
    let engine = GenerationEngine::new(gateway, EngineConfig::default());
    engine.set_available_models(models);
    engine.select_model(model.clone());
    engine.select_backend(backend);

    if let Some(name) = creator {
        let repo = TomlDirCreatorRepository::new_default()?;
        repo.ensure_seeded().await?;
        let found = repo
            .get_all()
            .await?
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(&name))
            .with_context(|| format!("no creator named '{name}'"))?;
        engine.set_creator(Some(&found));
    }

    engine.load_model().await;
    let state = engine.state_snapshot();
    if !state.is_model_loaded {
        bail!(state.error.unwrap_or_else(|| "model load failed".to_string()));
    }

    // Mirror the live buffer to stdout as fragments arrive.
    let mut rx = engine.subscribe();
    let printer = tokio::spawn(async move {
        let mut printed = 0usize;
        while rx.changed().await.is_ok() {
            let code = rx.borrow().generated_code.clone();
            if code.len() > printed && code.is_char_boundary(printed) {
                print!("{}", &code[printed..]);
                let _ = std::io::stdout().flush();
            }
            printed = code.len();
        }
    });

    engine.generate(prompt).await;
    engine.wait_for_idle().await;
    printer.abort();

    let state = engine.state_snapshot();
    if let Some(error) = state.error {
        bail!(error);
    }
    println!("\n--- language: {} ---", state.language);

    settings_store.save(&Settings {
        selected_model_id: Some(model.id),
        backend,
    })?;
    Ok(())
}

async fn creators(action: CreatorAction) -> Result<()> {
    let repo = TomlDirCreatorRepository::new_default()?;
    repo.ensure_seeded().await?;
    match action {
        CreatorAction::List => {
            for creator in repo.get_all().await? {
                println!("{}  {:<12} {}", creator.id, creator.name, creator.role);
            }
        }
        CreatorAction::Add { name, role, style } => {
            let creator = Creator::new(name, role, style);
            repo.save(&creator).await?;
            println!("saved {}", creator.id);
        }
        CreatorAction::Remove { id } => {
            repo.delete(&id).await?;
            println!("removed {id}");
        }
    }
    Ok(())
}
