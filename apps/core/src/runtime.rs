use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::client::RestSearchClient;
use crate::config::{self, Config};
use crate::display::{author_name, highlight_summary, site_path_line, size_kb};
use crate::logging;
use crate::model::{FacetValue, PromotedResult, ResultRow};
use crate::orchestrator::FetchOutcome;
use crate::preference_store::SqlitePreferenceStore;
use crate::preferences::{FileTypeSelection, FileTypeTag, Preferences, SortOrder};
use crate::sections::Section;
use crate::session::SearchSession;

#[derive(Debug, Parser)]
#[command(name = "powersearch", version, about = "SharePoint search from the terminal")]
pub struct Cli {
    /// Config file (toml, json or json5).
    #[arg(long, global = true, env = "POWERSEARCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Overrides `site_url` from the config file.
    #[arg(long, global = true)]
    pub site: Option<String>,

    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a query and print the accumulated pages.
    Search(SearchArgs),
    /// Show or edit recent searches.
    History(HistoryArgs),
    /// Print the effective config.
    Config {
        /// Write the defaults when no config file exists.
        #[arg(long)]
        init: bool,
    },
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    pub query: String,

    /// File type tag; repeatable. Saved as the new selection.
    #[arg(long = "type", value_parser = parse_file_type)]
    pub types: Vec<FileTypeTag>,

    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<SortOrder>,

    #[arg(long, value_parser = parse_section)]
    pub section: Option<Section>,

    /// Pages to fetch, stopping early when the total is reached.
    #[arg(long, default_value_t = 1)]
    pub pages: usize,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[arg(long, conflicts_with = "remove")]
    pub clear: bool,

    #[arg(long)]
    pub remove: Option<String>,
}

fn parse_file_type(raw: &str) -> Result<FileTypeTag, String> {
    FileTypeTag::parse(raw).ok_or_else(|| format!("unknown file type `{raw}`"))
}

fn parse_sort(raw: &str) -> Result<SortOrder, String> {
    SortOrder::parse(raw).ok_or_else(|| format!("unknown sort order `{raw}`"))
}

fn parse_section(raw: &str) -> Result<Section, String> {
    Section::parse(raw).ok_or_else(|| format!("unknown section `{raw}`"))
}

#[derive(Debug, Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    total_rows: u64,
    has_next_page: bool,
    spelling_suggestion: Option<&'a str>,
    query_modification: Option<&'a str>,
    promoted: &'a [PromotedResult],
    refiners: Vec<(&'a str, &'a [FacetValue])>,
    rows: Vec<&'a ResultRow>,
}

pub fn run() -> Result<()> {
    run_with(Cli::parse())
}

pub fn run_with(cli: Cli) -> Result<()> {
    let mut cfg = config::load(cli.config.as_deref()).context("loading config")?;
    if let Some(site) = &cli.site {
        cfg.site_url = site.clone();
        config::validate(&cfg).map_err(anyhow::Error::msg)?;
    }
    let level = cli.log_level.clone().unwrap_or_else(|| cfg.log_level.clone());
    let _guard = logging::init(&level, &logging::logs_dir()).context("starting logging")?;
    tracing::info!(site = %cfg.site_url, config = %cfg.config_path.display(), "powersearch starting");

    match cli.command {
        Command::Search(args) => search(&cfg, args),
        Command::History(args) => history(&cfg, args),
        Command::Config { init } => show_config(&cfg, init),
    }
}

fn search(cfg: &Config, args: SearchArgs) -> Result<()> {
    if args.query.trim().is_empty() {
        bail!("query is empty");
    }

    let store = SqlitePreferenceStore::open(&cfg.preferences_db_path)
        .with_context(|| format!("opening {}", cfg.preferences_db_path.display()))?;
    let mut session = SearchSession::from_config(cfg, store)?;

    if !args.types.is_empty() {
        session.set_file_types(FileTypeSelection::from_tags(args.types.iter().copied()))?;
    }
    if let Some(sort) = args.sort {
        session.set_sort_order(sort)?;
    }
    if let Some(section) = args.section {
        session.enter_section(section);
    }
    session.select_recent(&args.query)?;

    let token = std::env::var(&cfg.access_token_env).ok();
    if token.is_none() {
        tracing::warn!(env = %cfg.access_token_env, "no access token set; sending anonymous request");
    }
    let client = RestSearchClient::new(
        &cfg.site_url,
        token,
        std::time::Duration::from_secs(cfg.request_timeout_secs),
    )?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;

    runtime.block_on(async {
        for _ in 0..args.pages.max(1) {
            match session.fetch_next_page(&client).await? {
                FetchOutcome::Applied { has_next_page, .. } if has_next_page => continue,
                _ => break,
            }
        }
        anyhow::Ok(())
    })?;

    let first = session.first_page();
    let output = SearchOutput {
        query: &args.query,
        total_rows: session
            .orchestrator()
            .latest_page()
            .map(|page| page.total_rows)
            .unwrap_or_default(),
        has_next_page: session.has_next_page(),
        spelling_suggestion: first.and_then(|page| page.spelling_suggestion.as_deref()),
        query_modification: first.and_then(|page| page.query_modification.as_deref()),
        promoted: first.map(|page| page.promoted.as_slice()).unwrap_or_default(),
        refiners: first
            .map(|page| {
                page.facets
                    .iter()
                    .map(|facet| (facet.name.as_str(), facet.values.as_slice()))
                    .collect()
            })
            .unwrap_or_default(),
        rows: session.rows(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text(&output);
    }
    Ok(())
}

fn print_text(output: &SearchOutput<'_>) {
    if let Some(suggestion) = output.spelling_suggestion {
        println!("Did you mean: {suggestion}");
    }
    for promoted in output.promoted {
        println!("* {} <{}>", promoted.title, promoted.url);
    }
    for row in &output.rows {
        let title = row.filename().or(row.title()).unwrap_or("(untitled)");
        println!("{title}");
        if let Some(path) = row.path() {
            println!("  {}", site_path_line(path));
        }
        let mut meta = Vec::new();
        if let Some(author) = row.created_by() {
            meta.push(author_name(author).to_string());
        }
        if let Some(modified) = row.last_modified() {
            meta.push(modified.to_string());
        }
        if let Some(size) = row.size_bytes() {
            meta.push(size_kb(size));
        }
        if !meta.is_empty() {
            println!("  {}", meta.join(" - "));
        }
        if let Some(summary) = row.summary() {
            println!("  {}", highlight_summary(summary, output.query));
        }
    }
    println!(
        "{} of {} results{}",
        output.rows.len(),
        output.total_rows,
        if output.has_next_page { " (more available)" } else { "" }
    );
}

fn history(cfg: &Config, args: HistoryArgs) -> Result<()> {
    let store = SqlitePreferenceStore::open(&cfg.preferences_db_path)
        .with_context(|| format!("opening {}", cfg.preferences_db_path.display()))?;
    let mut preferences = Preferences::new(store);

    if args.clear {
        preferences.clear_recent_searches()?;
        println!("recent searches cleared");
        return Ok(());
    }
    if let Some(query) = &args.remove {
        preferences.remove_recent_search(query)?;
    }
    for entry in preferences.recent_searches()?.entries() {
        println!("{entry}");
    }
    Ok(())
}

fn show_config(cfg: &Config, init: bool) -> Result<()> {
    if init && !cfg.config_path.exists() {
        config::save(cfg)?;
        println!("wrote default config to {}", cfg.config_path.display());
    }
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
