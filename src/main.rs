use std::path::Path;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

pub mod bigram;
pub mod cli;
pub mod config;
pub mod data_dir;
pub mod engine;
pub mod entry;
pub mod error;
pub mod index;
pub mod loader;
pub mod merge;
pub mod rank;
pub mod scorer;
pub mod token;

use cli::Cli;
use config::{Config, GLOBAL_SCOPE};
use data_dir::DataDir;
use engine::Engine;
use entry::{Entry, EntryKind};
use rank::RankedEntry;

/// Exact query that triggers the built-in demo instead of a lookup.
const MAGIC_DEMO: &str = "Show me a magic demo!";

fn init_tracing(verbose: u8, log_file: Option<&Path>) -> error::Result<()> {
    let filter = if let Ok(env) = std::env::var("LORE_LOG") {
        EnvFilter::new(env)
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Arc::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .without_time()
                .init();
        }
    }

    Ok(())
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        Cli::print_completions(shell);
        return Ok(());
    }

    init_tracing(cli.verbose, cli.log_file.as_deref())?;

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let config_paths = if cli.config.is_empty() {
        vec![loader::ensure_config(&data_dir)?]
    } else {
        cli.config.clone()
    };
    let mut config = Config::load(&config_paths)?;
    if let Some(min_score) = cli.min_score {
        config.scoring.min_score = min_score;
        config.scoring.validate()?;
    }

    let host = resolve_host(cli.host.as_deref());
    let layers = loader::load_layers(&config, host.as_deref())?;

    let engine = Engine::new(config.scoring.clone());
    let report = engine.build(layers);
    tracing::debug!(
        indexed = report.indexed,
        skipped = report.skipped.len(),
        "index ready"
    );

    if let Some(name) = cli.tool.as_deref() {
        return show_tool(&engine, name);
    }

    let query = cli.query_text();
    if query.trim().is_empty() {
        let mut cmd = Cli::command();
        cmd.print_help()?;
        return Ok(());
    }

    if query == MAGIC_DEMO {
        return magic_demo(&engine, &config);
    }

    let results = engine.rank(&query)?;

    if cli.votes {
        return print_votes(&engine, &results, cli.count);
    }

    match results.first() {
        Some(top) => print_answer(&engine, top),
        None => {
            print_no_match(&config, host.as_deref());
            Ok(())
        }
    }
}

/// The host scope, from the flag or the environment.
fn resolve_host(flag: Option<&str>) -> Option<String> {
    flag.map(str::to_string)
        .or_else(|| std::env::var("LORE_HOST").ok())
        .or_else(|| std::env::var("HOSTNAME").ok())
        .filter(|host| !host.is_empty())
}

fn show_tool(engine: &Engine, name: &str) -> error::Result<()> {
    let index = engine.snapshot()?;
    let entry = index
        .get(name)
        .filter(|e| matches!(e.kind, EntryKind::Tool { .. }))
        .ok_or_else(|| error::Error::NotFound {
            kind: "tool",
            name: name.to_string(),
        })?;

    print_tool(entry);
    Ok(())
}

fn print_answer(engine: &Engine, top: &RankedEntry) -> error::Result<()> {
    let index = engine.snapshot()?;
    let entry =
        index
            .get(&top.identity)
            .ok_or_else(|| error::Error::NotFound {
                kind: "entry",
                name: top.identity.clone(),
            })?;

    match entry.kind {
        EntryKind::Knowledge => println!("{}", entry.secondary_text),
        EntryKind::Tool { .. } => print_tool(entry),
    }
    Ok(())
}

fn print_tool(entry: &Entry) {
    println!("tool: {}", entry.identity);
    if !entry.secondary_text.is_empty() {
        println!("{}", entry.secondary_text);
    }
    if let EntryKind::Tool { exec: Some(ref exec) } = entry.kind {
        println!("exec: {exec}");
    }
}

fn print_votes(
    engine: &Engine,
    results: &[RankedEntry],
    count: usize,
) -> error::Result<()> {
    if results.is_empty() {
        println!("No candidates.");
        return Ok(());
    }

    let index = engine.snapshot()?;
    for ranked in results.iter().take(count) {
        let Some(entry) = index.get(&ranked.identity) else {
            continue;
        };
        println!(
            "{:>8.3}  {:<9}  {}  ({})",
            ranked.score,
            entry.kind.label(),
            ranked.identity,
            entry.origin_layer
        );
    }
    println!("\n{} candidate(s)", results.len());
    Ok(())
}

fn print_no_match(config: &Config, host: Option<&str>) {
    println!("I don't know anything matching that yet.");
    if let Some((_, path)) = config.source_layers(host).last() {
        println!("Teach me: add a tag line to {}", path.display());
    }
}

fn magic_demo(engine: &Engine, config: &Config) -> error::Result<()> {
    let index = engine.snapshot()?;

    println!("Thank you for using lore!");
    if index.is_empty() {
        println!("It looks like your database doesn't have any knowledge in it yet.");
    } else {
        let (knowledge, tools) =
            index
                .entries()
                .fold((0usize, 0usize), |(k, t), entry| match entry.kind {
                    EntryKind::Knowledge => (k + 1, t),
                    EntryKind::Tool { .. } => (k, t + 1),
                });
        println!("Your database has {knowledge} knowledge item(s) and {tools} tool(s)!");
    }

    if let Some(path) = config.knowledge.sources.get(GLOBAL_SCOPE) {
        println!("You can add knowledge entries at {}", path.display());
    }
    if let Some(path) = config.knowledge.tools.get(GLOBAL_SCOPE) {
        println!("or drop tool manifests into {}", path.display());
    }
    println!("Then ask me something, e.g.: lore how do I install knowledge?");
    Ok(())
}
