//! breedpath command-line driver
//!
//! Loads the entity and combination feeds, runs a search for the selected
//! starting creatures and prints the results grouped by depth (or as JSON).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use breedpath::{
    group_by_depth, load_entities, render, sort_by_ability_name, Derivation, DerivationReport,
    LoadReport, Planner, SearchConfig, SortOrder,
};

#[derive(Parser)]
#[command(name = "breedpath")]
#[command(author, version, about = "Find the best breeding paths to every reachable creature")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search breeding paths from a set of owned creatures.
    Search(SearchArgs),

    /// Autocomplete a creature name.
    Suggest {
        /// Entity feed (JSON array).
        #[arg(long)]
        entities: PathBuf,

        /// Text to complete.
        query: String,

        /// Maximum number of suggestions.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Entity feed (JSON array).
    #[arg(long)]
    entities: PathBuf,

    /// Combination feed (JSON array).
    #[arg(long)]
    combinations: PathBuf,

    /// Starting creatures, by key or name, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    start: Vec<String>,

    /// Number of breeding generations [default: from config].
    #[arg(long)]
    depth: Option<u32>,

    /// Sort each depth group by this ability.
    #[arg(long)]
    sort_by: Option<String>,

    /// Sort ascending instead of descending.
    #[arg(long)]
    ascending: bool,

    /// Print JSON reports instead of text.
    #[arg(long)]
    json: bool,

    /// Write one DOT file per derived creature into this directory.
    #[arg(long)]
    dot_dir: Option<PathBuf>,

    /// Worker threads for the pair scan (overrides config).
    #[arg(long)]
    workers: Option<usize>,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Search(args) => run_search(&args),
        Commands::Suggest {
            entities,
            query,
            limit,
        } => {
            let (catalog, report) = load_entities(&entities)
                .with_context(|| format!("loading {}", entities.display()))?;
            log_report(&report);
            for name in catalog.suggest(&query, limit) {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn log_report(report: &LoadReport) {
    for skipped in &report.skipped {
        tracing::warn!(
            feed = report.feed,
            index = skipped.index,
            reason = %skipped.reason,
            "record skipped"
        );
    }
}

fn run_search(args: &SearchArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SearchConfig::from_file(path)?,
        None => SearchConfig::default(),
    };
    if let Some(workers) = args.workers {
        config.workers = workers;
    }

    let (planner, reports) = Planner::from_feeds(&args.entities, &args.combinations, config)?;
    for report in &reports {
        log_report(report);
    }

    let outcome = planner.plan(&args.start, args.depth)?;
    let order = if args.ascending {
        SortOrder::Ascending
    } else {
        SortOrder::Descending
    };
    let rows: Vec<&Derivation> = match &args.sort_by {
        Some(ability) => sort_by_ability_name(&outcome, ability, order)?,
        None => outcome.iter().collect(),
    };

    if let Some(dir) = &args.dot_dir {
        write_dot_files(dir, &planner, &rows)?;
    }

    if args.json {
        let reports: Vec<DerivationReport> = rows.iter().map(|d| DerivationReport::from(*d)).collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!(
        "{} creatures reachable in {} round(s) ({})",
        outcome.len(),
        outcome.rounds(),
        outcome.stop_reason()
    );
    for (depth, group) in group_by_depth(rows) {
        println!();
        println!("depth {depth}");
        for d in group {
            let scores = d
                .entity
                .abilities
                .iter()
                .filter(|(_, score)| *score > 0)
                .map(|(ability, score)| format!("{ability}={score}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!(
                "  {:<20} unique={:<3} {}",
                d.entity.to_string(),
                d.graph.unique_entity_count(),
                scores
            );
        }
    }
    Ok(())
}

fn write_dot_files(dir: &Path, planner: &Planner, rows: &[&Derivation]) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    for d in rows {
        let path = dir.join(format!("{}.dot", d.entity.key));
        fs::write(&path, render::to_dot(&d.graph, planner.catalog()))
            .with_context(|| format!("writing {}", path.display()))?;
    }
    tracing::info!(files = rows.len(), dir = %dir.display(), "wrote DOT files");
    Ok(())
}
