use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use worklin::config::AppConfig;
use worklin::links::Reconciler;
use worklin::search::{search_pages, SearchFilters};
use worklin::store::{ReferenceStore, RemoteStore};
use worklin::suggest::{
    CollaboratorSuggestions, PageSuggestions, ReferenceKind, SuggestionSource, SuggestionSources,
};
use worklin::BackendClient;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Page links, backlinks and reference suggestions",
    long_about = None
)]
struct Cli {
    /// Config file (defaults to ~/.config/worklin/config.toml)
    #[arg(long, env = "WORKLIN_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        #[arg(long, help = "Overwrite an existing file")]
        force: bool,
    },
    /// List pages linking to a page
    Backlinks { page: String },
    /// Show outgoing and incoming links of a page
    Links { page: String },
    /// Query suggestions the way the editor overlay does
    Suggest {
        #[arg(long, help = "Suggest collaborators instead of pages")]
        mention: bool,
        #[arg(default_value = "")]
        query: String,
    },
    /// Search pages by title, type, tags and update time
    Search {
        query: Option<String>,
        #[arg(long = "type")]
        page_type: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long, help = "Updated at or after (RFC 3339)")]
        from: Option<DateTime<Utc>>,
        #[arg(long, help = "Updated at or before (RFC 3339)")]
        to: Option<DateTime<Utc>>,
    },
    /// Reconcile a page's stored links against a content file
    Sync { page: String, file: PathBuf },
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(|| {
        AppConfig::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("worklin=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let path = config_path(&cli);

    if let Commands::Init { force } = cli.command {
        if path.exists() && !force {
            eprintln!("Config already exists at: {}", path.display());
            return Ok(());
        }
        AppConfig::write_default(&path)?;
        println!("Created default config at: {}", path.display());
        return Ok(());
    }

    if !path.exists() {
        AppConfig::write_default(&path)?;
        eprintln!(
            "Created default config at: {}\n\
             Please edit it with your backend URL, workspace and API token, then run again.",
            path.display()
        );
        return Ok(());
    }

    let config = match AppConfig::load_from_path(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", path.display(), e);
            eprintln!("Fix the config file or delete it to regenerate defaults.");
            std::process::exit(1);
        }
    };

    let store = Arc::new(RemoteStore::new(BackendClient::from_config(&config.backend)));
    let workspace = config.backend.workspace_id.as_str();

    match cli.command {
        Commands::Init { .. } => {}
        Commands::Backlinks { page } => {
            let edges = Reconciler::new(store).backlinks(&page).await;
            if edges.is_empty() {
                println!("No backlinks to {page}");
            }
            for edge in edges {
                println!("{}", edge.source_id);
            }
        }
        Commands::Links { page } => {
            let (outgoing, incoming) =
                futures::future::join(store.find_by_source(&page), store.find_by_target(&page))
                    .await;
            println!("Links from {page}:");
            for edge in outgoing? {
                println!("  -> {}", edge.target_id);
            }
            println!("Links to {page}:");
            for edge in incoming? {
                println!("  <- {}", edge.source_id);
            }
        }
        Commands::Suggest { mention, query } => {
            let sources = SuggestionSources {
                pages: Arc::new(PageSuggestions::new(store.clone(), workspace, &config.suggest)),
                collaborators: Arc::new(CollaboratorSuggestions::new(
                    store,
                    workspace,
                    &config.suggest,
                )),
            };
            let kind = if mention {
                ReferenceKind::Collaborator
            } else {
                ReferenceKind::Page
            };
            let candidates = sources.for_kind(kind).query(&query).await;
            if candidates.is_empty() {
                println!("No results");
            }
            for c in candidates {
                println!("{}{}\t{}", kind.trigger(), c.label, c.id);
            }
        }
        Commands::Search {
            query,
            page_type,
            tags,
            from,
            to,
        } => {
            let filters = SearchFilters {
                query,
                page_type,
                tags,
                updated_from: from,
                updated_to: to,
            };
            let pages =
                search_pages(store.as_ref(), workspace, &filters, config.suggest.search_limit)
                    .await;
            for page in pages {
                println!(
                    "{}\t{}\t{}\t{}",
                    page.id,
                    page.title,
                    page.page_type,
                    page.updated_at.to_rfc3339()
                );
            }
        }
        Commands::Sync { page, file } => {
            let content = std::fs::read_to_string(&file)?;
            let diff = Reconciler::new(store).try_reconcile(&page, &content).await?;
            if diff.is_empty() {
                println!("Links already up to date");
            } else {
                println!(
                    "Added {} link(s), removed {} link(s)",
                    diff.added.len(),
                    diff.removed.len()
                );
            }
        }
    }

    Ok(())
}
