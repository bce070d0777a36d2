mod api;
mod http;
mod llm;
mod server;
mod x_api;

use clap::{Args, Parser, Subcommand};
use engagement_patterns::config::EngineConfig;
use engagement_patterns::history::{FileHistorySource, HistorySource};
use engagement_patterns::profile::JsonProfileStore;
use engagement_patterns::{
    Draft, EngagementEngine, EngineError, LearnedProfile, PostType, ScoreResult,
};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "engagement-patterns", about = "Personalized engagement pattern engine")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Learn(LearnArgs),
    Profile(ProfileArgs),
    Score(ScoreArgs),
    Serve(ServeArgs),
    /// Write the default configuration to a TOML file.
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug, Clone)]
struct InitConfigArgs {
    #[arg(long, default_value = "config/engine.toml")]
    path: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct LearnArgs {
    #[arg(long, conflicts_with = "username")]
    user_id: Option<String>,
    #[arg(long)]
    username: Option<String>,
    /// JSON history file, or a directory of `<user_id>.json` files.
    #[arg(long)]
    history: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct ProfileArgs {
    #[arg(long)]
    user_id: String,
}

#[derive(Args, Debug, Clone)]
struct ScoreArgs {
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    user_id: Option<String>,
    #[arg(long, default_value = "tweet")]
    post_type: String,
    #[arg(long)]
    reply_context: Option<String>,
    #[arg(long)]
    ai: bool,
    #[arg(long)]
    ai_model: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
    #[arg(long)]
    history: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let (config, config_path) = EngineConfig::load(cli.config)?;
    tracing::debug!(config_path = ?config_path, "configuration loaded");

    match cli.command {
        Command::Learn(args) => run_learn(config, args).await,
        Command::Profile(args) => run_profile(config, args).await,
        Command::Score(args) => run_score(config, args).await,
        Command::Serve(args) => {
            let history = history_source(&config, args.history.clone())?;
            let engine = build_engine(config, None).await?.with_history(history);
            server::serve(args, engine).await
        }
        Command::InitConfig(args) => {
            EngineConfig::default().write(&args.path)?;
            println!("Wrote default configuration to {}", args.path.display());
            Ok(())
        }
    }
}

async fn build_engine(
    config: EngineConfig,
    ai_model: Option<String>,
) -> Result<EngagementEngine, String> {
    let store = JsonProfileStore::load(config.store.path.clone()).await?;
    let augmenter = llm::LlmClient::from_env(ai_model, config.augment.timeout());
    let mut engine = EngagementEngine::new(config, Arc::new(store));
    if let Some(client) = augmenter {
        engine = engine.with_augmenter(Arc::new(client));
    }
    Ok(engine)
}

fn history_source(
    config: &EngineConfig,
    path: Option<PathBuf>,
) -> Result<Arc<dyn HistorySource>, String> {
    let estimate = config.learning.impression_estimate;
    if let Some(path) = path {
        return Ok(Arc::new(FileHistorySource::new(path, estimate)));
    }
    let client = x_api::XApiClient::from_env(estimate)
        .ok_or_else(|| "X API credentials are not set (X_API_BEARER_TOKEN or X_OAUTH_CLIENT_ID/SECRET); pass --history for offline data".to_string())?;
    Ok(Arc::new(client))
}

async fn run_learn(config: EngineConfig, args: LearnArgs) -> Result<(), String> {
    let user_id = match (args.user_id, args.username) {
        (Some(user_id), _) => user_id,
        (None, Some(username)) => {
            let client = x_api::XApiClient::from_env(config.learning.impression_estimate)
                .ok_or_else(|| "X API credentials are required to resolve --username".to_string())?;
            let user = client.fetch_user_by_username(&username).await?;
            println!("Resolved @{} ({}, {} followers)", user.username, user.name, user.followers);
            user.id
        }
        (None, None) => return Err("pass --user-id or --username".to_string()),
    };

    let history = history_source(&config, args.history)?;
    let engine = build_engine(config, None).await?.with_history(history);

    match engine.learn(&user_id).await {
        Ok(report) => {
            print_profile(&report.profile);
            println!("\n{}", report.insights.summary);
            for line in &report.insights.what_works {
                println!("- {}", line);
            }
            println!("Optimal length: {}", report.insights.optimal_length);
            Ok(())
        }
        Err(EngineError::InsufficientHistory { found, required }) => Err(format!(
            "not enough history yet: found {} posts, need {} more",
            found,
            required.saturating_sub(found)
        )),
        Err(err) => Err(err.to_string()),
    }
}

async fn run_profile(config: EngineConfig, args: ProfileArgs) -> Result<(), String> {
    let store = JsonProfileStore::load(config.store.path.clone()).await?;
    let engine = EngagementEngine::new(config, Arc::new(store));

    match engine.learned_profile(&args.user_id).await.map_err(|err| err.to_string())? {
        Some(profile) => print_profile(&profile),
        None => println!("No learned patterns yet for {}", args.user_id),
    }
    Ok(())
}

async fn run_score(config: EngineConfig, args: ScoreArgs) -> Result<(), String> {
    let post_type = PostType::from_str(&args.post_type)
        .ok_or_else(|| format!("invalid post type: {}", args.post_type))?;
    let text = read_text(args.text)?;
    let draft = Draft {
        text,
        post_type,
        reply_context: args.reply_context,
    };

    let engine = build_engine(config, args.ai_model).await?;

    let result = engine.score_draft(args.user_id.as_deref(), &draft).await;
    print_score(&result);

    if args.ai {
        if !engine.has_augmenter() {
            println!("\nAI feedback not configured: set XAI_API_KEY");
            return Ok(());
        }
        // Feedback is optional; a failure leaves the numeric score as is.
        if let Ok(feedback) = engine.augment_draft(args.user_id.as_deref(), &draft).await {
            println!("\nAI feedback:");
            if let Some(hook) = feedback.hook_rewrite {
                println!("  Hook rewrite: {}", hook);
            }
            if let Some(engagement) = feedback.predicted_engagement {
                println!("  Predicted engagement: {:?}", engagement);
            }
            if let Some(tone) = feedback.tone {
                println!("  Tone: {}", tone);
            }
            for suggestion in feedback.suggestions {
                println!("  - {}", suggestion);
            }
        }
    }

    Ok(())
}

fn print_score(result: &ScoreResult) {
    println!(
        "Score: {}/100 ({}){}",
        result.score,
        result.color_bucket.label(),
        if result.personalized { " [personalized]" } else { "" }
    );
    for factor in &result.factors {
        println!(
            "  {:<20} {:>2}/10  {}",
            factor.name.label(),
            factor.raw_score,
            factor.feedback
        );
    }
}

fn print_profile(profile: &LearnedProfile) {
    println!(
        "Profile for {} ({} posts, analyzed {})",
        profile.user_id,
        profile.sample_size,
        profile.last_analyzed_at.to_rfc3339()
    );
    println!("Average engagement rate: {:.2}%", profile.avg_engagement_rate);
    println!(
        "Optimal length: {}-{} characters",
        profile.optimal_length_min, profile.optimal_length_max
    );
    println!("Effectiveness:");
    for (feature, score) in profile.effectiveness.iter() {
        println!("  {:<12} {}", feature.name(), score);
    }
    let w = &profile.weights;
    println!(
        "Weights: hook {} | reply {} | length {} | readability {} | hashtags {} | emojis {}",
        w.hook, w.reply_potential, w.length, w.readability, w.hashtags, w.emojis
    );
    if !profile.top_hooks.is_empty() {
        println!("Top hooks:");
        for hook in &profile.top_hooks {
            println!("  - {}", hook);
        }
    }
    if !profile.top_ctas.is_empty() {
        println!("Top calls to action:");
        for cta in &profile.top_ctas {
            println!("  - {}", cta);
        }
    }
}

fn read_text(arg: Option<String>) -> Result<String, String> {
    if let Some(text) = arg {
        if !text.trim().is_empty() {
            return Ok(text);
        }
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| format!("failed reading stdin: {}", err))?;
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Err("missing draft text: pass --text or pipe stdin".to_string());
    }
    Ok(trimmed.to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
