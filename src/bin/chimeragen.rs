//! CLI for chimeragen - hybrid animal creatures and their battles.

use chimeragen::animals;
use chimeragen::completion::{Completion, CompletionTracker, RemoteImageLoader};
use chimeragen::image::{write_image, GeneratedImage, ImageProviderKind, ImageResult, SavedImage};
use chimeragen::secret::{FileSecretStore, MemorySecretStore, SecretStore};
use chimeragen::{
    ChimeraError, GeminiProvider, Orchestrator, PollinationsProvider, Session, Slot,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chimeragen")]
#[command(about = "Fuse two animals into a chimera image and stage chimera battles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Image provider to use
    #[arg(
        short,
        long,
        global = true,
        value_enum,
        env = "CHIMERAGEN_PROVIDER",
        default_value = "pollinations"
    )]
    provider: ProviderArg,

    /// Gemini API key for this run (overrides the saved key)
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one chimera from two animals
    Chimera(ChimeraArgs),

    /// Generate two chimeras and the battle between them
    Battle(BattleArgs),

    /// Manage the saved Gemini API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// List available providers
    Providers {
        /// Probe each provider
        #[arg(long)]
        check: bool,
    },

    /// List selectable animals
    Animals,
}

#[derive(Args)]
struct ChimeraArgs {
    /// First animal
    animal_a: String,

    /// Second animal
    animal_b: String,

    #[command(flatten)]
    render: RenderArgs,
}

#[derive(Args)]
struct BattleArgs {
    /// Animals of the first chimera [default: Lion,Eagle]
    #[arg(long, value_parser = parse_pair)]
    first: Option<[String; 2]>,

    /// Animals of the second chimera [default: Shark,Wolf]
    #[arg(long, value_parser = parse_pair)]
    second: Option<[String; 2]>,

    #[command(flatten)]
    render: RenderArgs,
}

#[derive(Args)]
struct RenderArgs {
    /// Write the image to this file (extension added from the image format if missing)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Wait for URL-based images to finish rendering
    #[arg(long)]
    wait: bool,

    /// Longest wait for a URL-based image, in seconds
    #[arg(long, default_value_t = 15)]
    ready_timeout: u64,
}

#[derive(Subcommand)]
enum KeyAction {
    /// Save a key
    Set {
        /// The API key
        key: String,
    },
    /// Remove the saved key
    Clear,
    /// Show whether a key is saved
    Status,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProviderArg {
    Pollinations,
    Gemini,
}

impl From<ProviderArg> for ImageProviderKind {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Pollinations => ImageProviderKind::Pollinations,
            ProviderArg::Gemini => ImageProviderKind::Gemini,
        }
    }
}

fn parse_pair(raw: &str) -> Result<[String; 2], String> {
    let mut parts = raw.split(',').map(str::trim);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) if !a.is_empty() && !b.is_empty() => {
            Ok([canonical_animal(a), canonical_animal(b)])
        }
        _ => Err(format!("expected two animals separated by a comma, got '{raw}'")),
    }
}

fn canonical_animal(name: &str) -> String {
    animals::lookup(name).map(str::to_string).unwrap_or_else(|| {
        tracing::warn!(animal = name, "not on the animal roster, using as given");
        name.to_string()
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Chimera(ref args) => {
            generate_chimera(&cli, args).await?;
        }
        Commands::Battle(ref args) => {
            generate_battle(&cli, args).await?;
        }
        Commands::Key { ref action } => {
            manage_key(action, cli.json)?;
        }
        Commands::Providers { check } => {
            list_providers(&cli, check).await?;
        }
        Commands::Animals => {
            list_animals(cli.json)?;
        }
    }

    Ok(())
}

fn secret_store(cli: &Cli) -> Arc<dyn SecretStore> {
    if let Some(ref key) = cli.api_key {
        return Arc::new(MemorySecretStore::with_value(key.clone()));
    }
    match FileSecretStore::default_location() {
        Some(store) => Arc::new(store),
        None => Arc::new(MemorySecretStore::new()),
    }
}

fn build_orchestrator(cli: &Cli) -> anyhow::Result<Orchestrator> {
    let pollinations = PollinationsProvider::builder().build()?;
    let gemini = GeminiProvider::builder()
        .secret_store(secret_store(cli))
        .build()?;

    Ok(Orchestrator::fixed(cli.provider.into())
        .with_provider(Arc::new(pollinations))
        .with_provider(Arc::new(gemini)))
}

/// Turns a generation failure into a user-facing error carrying only its message.
fn user_error(err: ChimeraError, json_output: bool) -> anyhow::Error {
    if json_output {
        let result = serde_json::json!({
            "success": false,
            "kind": err.kind().to_string(),
            "message": err.message(),
        });
        println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());
    }
    anyhow::anyhow!(err.message())
}

async fn generate_chimera(cli: &Cli, args: &ChimeraArgs) -> anyhow::Result<()> {
    let animal_a = canonical_animal(&args.animal_a);
    let animal_b = canonical_animal(&args.animal_b);

    let mut session = Session::new(build_orchestrator(cli)?);
    if !cli.json {
        eprintln!("Fusing {animal_a} + {animal_b}...");
    }

    let chimera = session
        .generate(Slot::First, &animal_a, &animal_b)
        .await
        .map_err(|e| user_error(e, cli.json))?;

    let label = format!("{} ({} × {})", chimera.name, animal_a, animal_b);
    render(&chimera.image, &label, &args.render, cli.json).await
}

async fn generate_battle(cli: &Cli, args: &BattleArgs) -> anyhow::Result<()> {
    let mut session = Session::new(build_orchestrator(cli)?);
    let [default_first, default_second] = animals::default_pairs().map(|p| p.map(str::to_string));
    let first = args.first.clone().unwrap_or(default_first);
    let second = args.second.clone().unwrap_or(default_second);

    for (slot, pair) in [(Slot::First, &first), (Slot::Second, &second)] {
        if !cli.json {
            eprintln!("Fusing {} + {}...", pair[0], pair[1]);
        }
        session
            .generate(slot, &pair[0], &pair[1])
            .await
            .map_err(|e| user_error(e, cli.json))?;
    }

    let (first, second) = match (session.chimera(Slot::First), session.chimera(Slot::Second)) {
        (Some(a), Some(b)) => (a.name.clone(), b.name.clone()),
        _ => anyhow::bail!("Generate both chimeras first!"),
    };
    if !cli.json {
        eprintln!("{first} vs {second} - FIGHT!");
    }

    let battle = session.battle().await.map_err(|e| user_error(e, cli.json))?;
    render(&battle, &format!("{first} vs {second}"), &args.render, cli.json).await
}

async fn render(
    image: &GeneratedImage,
    label: &str,
    args: &RenderArgs,
    json_output: bool,
) -> anyhow::Result<()> {
    let mut status = "ready";
    let mut saved: Option<SavedImage> = None;

    match &image.result {
        ImageResult::InlineData { .. } => {
            if let Some(ref path) = args.output {
                saved = Some(image.save(path)?);
            }
        }
        ImageResult::RemoteUrl { url } => {
            status = "dispatched";
            if args.wait || args.output.is_some() {
                let tracker = CompletionTracker::new(Duration::from_secs(args.ready_timeout));
                let loader = RemoteImageLoader::new();
                match tracker.await_ready(image, loader.fetch(url)).await {
                    Completion::Loaded(data) => {
                        status = "ready";
                        if let Some(ref path) = args.output {
                            saved = Some(write_image(path, &data, None)?);
                        }
                    }
                    Completion::LoadFailed(e) => {
                        status = "failed";
                        if !json_output {
                            eprintln!("{}", e.message());
                        }
                    }
                    Completion::TimedOut => {
                        status = "pending";
                        if !json_output {
                            eprintln!("Image is still rendering; open the URL to view it later.");
                        }
                    }
                    Completion::Ready => {}
                }
            }
        }
    }

    if json_output {
        let url = match &image.result {
            ImageResult::RemoteUrl { url } => Some(url.to_string()),
            ImageResult::InlineData { .. } => None,
        };
        let result = serde_json::json!({
            "success": true,
            "label": label,
            "provider": image.provider.to_string(),
            "kind": image.result.kind(),
            "status": status,
            "url": url,
            "mime_type": image.result.mime_type(),
            "output": saved.as_ref().map(|s| s.path.display().to_string()),
            "format": saved.as_ref().and_then(|s| s.format),
            "size_bytes": saved.as_ref().map(|s| s.size_bytes),
            "seed": image.metadata.seed,
            "model": image.metadata.model,
            "duration_ms": image.metadata.duration_ms,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{label} via {}", image.provider);
        if let ImageResult::RemoteUrl { url } = &image.result {
            println!("URL: {url}");
        }
        if let Some(ref saved) = saved {
            println!("Saved: {} ({} bytes)", saved.path.display(), saved.size_bytes);
        } else if let Some(mime) = image.result.mime_type() {
            println!("Inline {mime} image; pass --output to save it");
        }
    }

    Ok(())
}

fn manage_key(action: &KeyAction, json_output: bool) -> anyhow::Result<()> {
    let store = FileSecretStore::default_location()
        .ok_or_else(|| anyhow::anyhow!("no user config directory to store the key in"))?;

    let configured = match action {
        KeyAction::Set { key } => {
            store.set(key.trim())?;
            !key.trim().is_empty()
        }
        KeyAction::Clear => {
            store.set("")?;
            false
        }
        KeyAction::Status => store.get().is_some(),
    };

    if json_output {
        let result = serde_json::json!({
            "configured": configured,
            "path": store.path().display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if configured {
        println!("Gemini API key saved in {}", store.path().display());
    } else {
        println!("No Gemini API key saved ({})", store.path().display());
    }

    Ok(())
}

async fn list_providers(cli: &Cli, check: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct ProviderInfo {
        name: String,
        kind: ImageProviderKind,
        requires_key: bool,
        key_configured: bool,
        selected: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        health: Option<String>,
    }

    let orchestrator = build_orchestrator(cli)?;
    let key_configured = secret_store(cli).get().is_some();
    let mut providers = Vec::new();

    for kind in ImageProviderKind::ALL {
        let Some(provider) = orchestrator.provider(kind) else {
            continue;
        };
        let health = if check {
            Some(match provider.health_check().await {
                Ok(()) => "ok".to_string(),
                Err(e) => e.message(),
            })
        } else {
            None
        };
        providers.push(ProviderInfo {
            name: provider.name().to_string(),
            kind,
            requires_key: kind.requires_credential(),
            key_configured: !kind.requires_credential() || key_configured,
            selected: orchestrator.active_provider() == kind,
            health,
        });
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&providers)?);
    } else {
        println!("Available providers:\n");
        for p in &providers {
            let marker = if p.selected { "*" } else { " " };
            let ready = if p.key_configured { "✓" } else { "✗" };
            println!("{marker} {ready} {} ({})", p.name, p.kind);
            if p.requires_key {
                println!("    API key: GEMINI_API_KEY or `chimeragen key set`");
            }
            if let Some(ref health) = p.health {
                println!("    health: {health}");
            }
        }
    }

    Ok(())
}

fn list_animals(json_output: bool) -> anyhow::Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(&animals::ANIMALS)?);
    } else {
        for animal in animals::ANIMALS {
            println!("{animal}");
        }
    }
    Ok(())
}
