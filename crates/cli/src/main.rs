use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use notes_indexer::IndexStats;
use notes_rag::{ConceptCollider, Idea, RagPipeline};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

use crate::config::{AppConfig, ConfigOverrides};
use crate::flags::{EmbedMode, PairModeFlag};

mod app;
mod config;
mod flags;

#[derive(Parser)]
#[command(name = "notes")]
#[command(about = "Semantic search, Q&A and idea collisions over a markdown notes folder", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Notes directory (overrides NOTE_LOCAL_PATH, defaults to the current directory)
    #[arg(long, global = true)]
    notes: Option<PathBuf>,

    /// Index directory (overrides NOTES_INDEX_DIR, defaults to <notes>/.notes-index)
    #[arg(long, global = true)]
    index_dir: Option<PathBuf>,

    /// Glob selecting notes, relative to the notes directory (overrides NOTE_FILE_GLOB)
    #[arg(long, global = true)]
    glob: Option<String>,

    /// Only index notes whose frontmatter status is publish/published
    #[arg(long, global = true)]
    only_published: bool,

    /// Override embedding backend in this process (overrides NOTES_EMBEDDING_MODE)
    #[arg(long, global = true, value_enum)]
    embed_mode: Option<EmbedMode>,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the notes directory (incremental unless --full or paths are given)
    Index(IndexArgs),

    /// Semantic search over indexed notes
    Search(SearchArgs),

    /// Answer a question from the notes
    Ask(AskArgs),

    /// Pick two notes and synthesize an idea connecting them
    Collide(CollideArgs),

    /// Show index location and size
    Status(StatusArgs),
}

#[derive(Args)]
struct IndexArgs {
    /// Re-index only these notes (absolute or relative to the notes directory)
    paths: Vec<PathBuf>,

    /// Rebuild the whole index from scratch
    #[arg(long, conflicts_with = "paths")]
    full: bool,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Maximum number of results
    #[arg(short = 'k', long, default_value_t = 5)]
    k: usize,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AskArgs {
    /// Question to answer
    question: String,

    /// Number of note chunks given to the model
    #[arg(short = 'k', long, default_value_t = 5)]
    k: usize,

    /// Chat provider: openai, deepseek, qwen, bigmodel (overrides DEFAULT_AI_PROVIDER)
    #[arg(long)]
    provider: Option<String>,

    /// Replace the default assistant persona
    #[arg(long)]
    persona: Option<String>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CollideArgs {
    /// How the two notes are picked
    #[arg(long, value_enum, default_value = "random")]
    mode: PairModeFlag,

    /// Seed for reproducible picks
    #[arg(long)]
    seed: Option<u64>,

    /// Extra angle for the model to explore
    #[arg(long)]
    hint: Option<String>,

    /// Chat provider: openai, deepseek, qwen, bigmodel (overrides DEFAULT_AI_PROVIDER)
    #[arg(long)]
    provider: Option<String>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct StatusArgs {
    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON parsing
    let json_output = match &cli.command {
        Commands::Index(args) => args.json,
        Commands::Search(args) => args.json,
        Commands::Ask(args) => args.json,
        Commands::Collide(args) => args.json,
        Commands::Status(args) => args.json,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = AppConfig::resolve(ConfigOverrides {
        notes_root: cli.notes,
        index_dir: cli.index_dir,
        glob: cli.glob,
        only_published: cli.only_published,
        embed_mode: cli.embed_mode,
    })?;
    log::debug!("Resolved configuration: {config:?}");

    match cli.command {
        Commands::Index(args) => run_index(args, &config).await?,
        Commands::Search(args) => run_search(args, &config).await?,
        Commands::Ask(args) => run_ask(args, &config).await?,
        Commands::Collide(args) => run_collide(args, &config).await?,
        Commands::Status(args) => run_status(args, &config).await?,
    }

    Ok(())
}

/// Index the notes directory
async fn run_index(args: IndexArgs, config: &AppConfig) -> Result<()> {
    let indexer = app::open_indexer(config).await?;
    let stats = if !args.paths.is_empty() {
        indexer.index_paths(&args.paths).await?
    } else if args.full {
        indexer.index_full().await?
    } else {
        indexer.index().await?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_index_stats(&stats);
    }
    Ok(())
}

fn print_index_stats(stats: &IndexStats) {
    eprintln!(
        "Indexed {} notes, {} chunks ({} removed, {} entries total) in {}ms",
        stats.files, stats.chunks, stats.removed, stats.total_entries, stats.time_ms
    );
    if !stats.errors.is_empty() {
        eprintln!("{} notes could not be read:", stats.errors.len());
        for err in &stats.errors {
            eprintln!("  {err}");
        }
    }
}

/// Search indexed notes
async fn run_search(args: SearchArgs, config: &AppConfig) -> Result<()> {
    let store = app::open_store(config).await?;
    let hits = store
        .search(&args.query, args.k)
        .await
        .context("Search failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }
    if hits.is_empty() {
        eprintln!("No results. Run `notes index` first if the index is empty.");
    }
    for (i, hit) in hits.iter().enumerate() {
        println!("{}. {} (score: {:.3})", i + 1, hit.title, hit.score);
        println!("   Source: {}", hit.source_id);
        if hit.sibling_count > 1 {
            println!("   Chunk: {}/{}", hit.order + 1, hit.sibling_count);
        }
        if !hit.tags.is_empty() {
            println!("   Tags: {}", hit.tags.join(", "));
        }
        println!();
    }
    Ok(())
}

/// Answer a question from the notes
async fn run_ask(args: AskArgs, config: &AppConfig) -> Result<()> {
    let llm = app::chat_gateway(args.provider.as_deref())?;
    let selector = app::open_selector(config).await?;
    let mut pipeline = RagPipeline::new(selector, llm);
    if let Some(persona) = args.persona {
        pipeline = pipeline.with_persona(persona);
    }

    let answer = pipeline.answer(&args.question, args.k).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
        return Ok(());
    }
    println!("{}", answer.answer.trim());
    if !answer.citations.is_empty() {
        println!();
        println!("Sources:");
        for (i, citation) in answer.citations.iter().enumerate() {
            println!(
                "[{}] {} ({}, score: {:.3})",
                i + 1,
                citation.title,
                citation.source_id,
                citation.score
            );
        }
    }
    Ok(())
}

/// Pick two notes and synthesize an idea from them
async fn run_collide(args: CollideArgs, config: &AppConfig) -> Result<()> {
    let llm = app::chat_gateway(args.provider.as_deref())?;
    let selector = app::open_selector(config).await?;
    let mut collider = ConceptCollider::new(selector, llm);
    if let Some(hint) = args.hint {
        collider = collider.with_hint(hint);
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let result = collider.collide(args.mode.as_domain(), &mut rng).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    let [first, second] = &result.source_notes;
    println!(
        "{} ({}) x {} ({}) [{}]",
        first.title, first.source_id, second.title, second.source_id, result.mode
    );
    println!();
    match &result.idea {
        Idea::Parsed(draft) => {
            println!("{}", draft.title);
            if !draft.connection.is_empty() {
                println!();
                println!("{}", draft.connection);
            }
            if !draft.outline.is_empty() {
                println!();
                for point in &draft.outline {
                    println!("- {point}");
                }
            }
        }
        Idea::Raw { raw } => println!("{}", raw.trim()),
    }
    Ok(())
}

/// Show index location and size
async fn run_status(args: StatusArgs, config: &AppConfig) -> Result<()> {
    let report = app::status(config).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("Notes:      {}", report.notes_root);
    println!("Index:      {}", report.index_dir);
    println!("Glob:       {}", report.glob);
    if report.only_published {
        println!("Filter:     published only");
    }
    println!("Embeddings: {}", report.embed_mode);
    if !report.built {
        println!("Status:     not built (run `notes index`)");
        return Ok(());
    }
    println!(
        "Status:     {} chunks from {} notes{}",
        report.entries,
        report.sources,
        report
            .dimension
            .map(|d| format!(", dimension {d}"))
            .unwrap_or_default()
    );
    if let Some(problem) = &report.problem {
        println!("Problem:    {problem}");
    }
    Ok(())
}
