mod adapter;
mod auth;
mod config;
mod convert;
mod detail;
mod error;
mod github;
mod index;
mod listing;
mod output;
mod pager;
mod render;
mod source;
mod types;

use std::io::IsTerminal;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{ColorMode, Config};
use crate::error::Result;
use crate::github::GitHub;
use crate::index::IndexCache;
use crate::output::OutputSink;
use crate::render::Directive;
use crate::source::{Period, Query, StateFilter};

/// GitHub listings in the terminal. Every listing is numbered; `ghx view N`
/// opens item N of the last one.
#[derive(Parser, Debug)]
#[command(name = "ghx", version, about)]
struct Cli {
    /// Open the item in the web browser instead of printing it
    #[arg(long, global = true)]
    browser: bool,

    /// Never page output
    #[arg(long, global = true)]
    no_pager: bool,

    #[arg(long, global = true, value_enum)]
    color: Option<ColorMode>,

    /// Maximum number of items to list
    #[arg(long, short = 'n', global = true)]
    limit: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Repositories, yours or a user's
    Repos { user: Option<String> },
    /// Starred repositories
    Starred { user: Option<String> },
    /// Issues in OWNER/REPO, or the ones you are subscribed to
    Issues {
        repo: Option<String>,
        #[arg(long, value_enum, default_value_t = StateFilter::Open)]
        state: StateFilter,
    },
    /// Pull requests in OWNER/REPO, or the ones you opened
    Pulls {
        repo: Option<String>,
        #[arg(long, value_enum, default_value_t = StateFilter::Open)]
        state: StateFilter,
    },
    Notifications {
        /// Include notifications already marked as read
        #[arg(long)]
        all: bool,
    },
    /// Activity feed, yours or a user's public events
    Feed { user: Option<String> },
    Followers { user: Option<String> },
    Following { user: Option<String> },
    /// A user profile, indexed as item 1
    User { login: String },
    SearchRepos {
        #[arg(required = true)]
        query: Vec<String>,
    },
    SearchIssues {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Most starred repositories created recently
    Trending {
        #[arg(long, short)]
        language: Option<String>,
        #[arg(long, value_enum, default_value_t = Period::Weekly)]
        period: Period,
    },
    /// Show item N of the last listing
    View { position: usize },
    /// Forget the last listing
    Clear,
}

impl Command {
    fn query(&self) -> Option<Query> {
        let query = match self {
            Command::Repos { user } => Query::Repos { user: user.clone() },
            Command::Starred { user } => Query::Starred { user: user.clone() },
            Command::Issues { repo, state } => Query::Issues {
                repo: repo.clone(),
                state: *state,
            },
            Command::Pulls { repo, state } => Query::PullRequests {
                repo: repo.clone(),
                state: *state,
            },
            Command::Notifications { all } => Query::Notifications { all: *all },
            Command::Feed { user } => Query::Feed { user: user.clone() },
            Command::Followers { user } => Query::Followers { user: user.clone() },
            Command::Following { user } => Query::Following { user: user.clone() },
            Command::User { login } => Query::User {
                login: login.clone(),
            },
            Command::SearchRepos { query } => Query::SearchRepos {
                query: query.join(" "),
            },
            Command::SearchIssues { query } => Query::SearchIssues {
                query: query.join(" "),
            },
            Command::Trending { language, period } => Query::Trending {
                language: language.clone(),
                period: *period,
            },
            Command::View { .. } | Command::Clear => return None,
        };
        Some(query)
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load();

    if let Err(e) = run(cli, config).await {
        if e.is_lookup_miss() {
            eprintln!("{}", e);
        } else {
            eprintln!("ghx: {}", e);
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let cache = IndexCache::default_location()?;
    tracing::debug!(index = %cache.path().display(), "using index");

    if let Command::Clear = cli.command {
        return cache.clear();
    }

    let directive = directive(&cli, &config)?;
    let mut sink = OutputSink::stdout(config.display.pager_command.clone());

    // Opening an already indexed item in the browser needs no API access.
    if let (Command::View { position }, true) = (&cli.command, cli.browser) {
        let (url, _) = listing::view(&cache, *position)?;
        sink.deliver(&url, Some(&url), &directive)?;
        return Ok(());
    }

    let token = auth::load_token(&config.github)?;
    let github = GitHub::new(token, &config.github)?;

    match cli.command.query() {
        Some(query) => {
            let limit = cli.limit.unwrap_or(config.display.limit).max(1);
            listing::run_list(&github, &query, limit, &cache, &mut sink, &directive).await?;
        }
        None => {
            if let Command::View { position } = cli.command {
                listing::run_view(&github, &cache, position, &mut sink, &directive).await?;
            }
        }
    }
    Ok(())
}

/// Terminal-dependent rendering settings for this invocation.
fn directive(cli: &Cli, config: &Config) -> Result<Directive> {
    let (columns, rows) = crossterm::terminal::size().unwrap_or((100, 40));
    let interactive = std::io::stdout().is_terminal();

    let color_enabled = match cli.color.unwrap_or(config.display.color) {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => interactive && std::env::var_os("NO_COLOR").is_none(),
    };

    let page_threshold = match config.display.page_threshold {
        0 => usize::from(rows).saturating_sub(1),
        n => n,
    };

    Ok(Directive {
        terminal_width: usize::from(columns),
        page_threshold,
        max_column_width: config.display.max_column_width,
        color_enabled,
        pager_enabled: interactive && config.display.pager && !cli.no_pager,
        browser_open: cli.browser,
        palette: config.colors.palette()?,
    })
}
