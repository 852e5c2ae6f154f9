use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use tfidf_core::config::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use tfidf_core::screens::ingestion::expand_selection;
use tfidf_core::screens::InspectionStatus;
use tfidf_core::{ApiClient, ClientConfig, EventSink, Metric, NoticeLevel, Route, Settled, Shell, UiEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "tfidf")]
#[command(about = "Terminal client for the TF-IDF indexing and search service", long_about = None)]
struct Cli {
    /// Base URL of the indexing/search service
    #[arg(long, env = "TFIDF_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,
    /// Request timeout seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
    /// User-Agent sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive shell (the default)
    Shell,
    /// Index .txt files (directories are expanded), then print the index tables
    Index {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print the current index tables
    View,
    /// Run one query and print the ranked results
    Search {
        query: String,
        /// Similarity method: cosine or euclidean
        #[arg(long, default_value_t = Metric::Cosine)]
        metric: Metric,
    },
}

const HELP: &str = "\
commands:
  go <target>          switch screen: /, /view-index, /search
  select <paths...>    choose .txt files or directories to index
  index                submit the selected files for indexing
  proceed              from the index view, continue to search
  query <text>         set the query text
  append <text>        add a line to the query
  metric <name>        cosine or euclidean
  search               run the query
  show                 redraw the screen
  help                 this text
  quit";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let config = ClientConfig::new(&cli.api_url)?
        .with_timeout(Duration::from_secs(cli.timeout_secs))
        .with_user_agent(cli.user_agent.clone());
    let api = ApiClient::new(config)?;
    if let Err(err) = api.health().await {
        tracing::warn!(error = %err, base = %api.config().base_url, "service is not reachable yet");
    }

    let (events, rx) = EventSink::channel();
    let shell = Shell::new(api, events);

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => interactive(shell, rx).await,
        Commands::Index { paths } => run_index(shell, rx, &paths).await,
        Commands::View => run_view(shell, rx).await,
        Commands::Search { query, metric } => run_search(shell, rx, query, metric).await,
    }
}

/// Awaits `pending`, prints notices and follows navigation until no work is
/// left. Returns whether an error notice was printed.
async fn drive(
    shell: &mut Shell,
    rx: &mut UnboundedReceiver<UiEvent>,
    mut pending: Option<JoinHandle<Settled>>,
) -> Result<bool> {
    let mut failed = false;
    loop {
        if let Some(handle) = pending.take() {
            handle.await?;
        }
        while let Ok(event) = rx.try_recv() {
            match event {
                UiEvent::Notice(notice) => {
                    failed |= notice.level == NoticeLevel::Error;
                    println!("{notice}");
                }
                UiEvent::Navigate(nav) => {
                    if let Some(handle) = shell.follow(nav) {
                        pending = Some(handle);
                    }
                }
            }
        }
        if pending.is_none() {
            return Ok(failed);
        }
    }
}

fn finish(shell: &mut Shell, failed: bool, what: &str) -> Result<()> {
    println!("{}", shell.render());
    if failed || shell.boundary().has_fault() {
        bail!("{what} failed");
    }
    Ok(())
}

async fn run_index(mut shell: Shell, mut rx: UnboundedReceiver<UiEvent>, paths: &[PathBuf]) -> Result<()> {
    let decode = {
        let screen = shell.ingestion().ok_or_else(|| anyhow!("indexing screen is not mounted"))?;
        screen.select_files(expand_selection(paths));
        screen.decode_all()
    };
    let mut failed = drive(&mut shell, &mut rx, decode).await?;
    if !failed {
        let submit = shell.ingestion().and_then(|screen| screen.submit_indexing());
        failed = drive(&mut shell, &mut rx, submit).await?;
    }
    // success always lands on the index view
    let reached = shell.route() == Route::ViewIndex;
    finish(&mut shell, failed || !reached, "indexing")
}

async fn run_view(mut shell: Shell, mut rx: UnboundedReceiver<UiEvent>) -> Result<()> {
    let fetch = shell.navigate(Route::ViewIndex, None);
    let failed = drive(&mut shell, &mut rx, fetch).await?;
    let loaded = matches!(shell.inspection().map(|s| s.status()), Some(InspectionStatus::Ready(_)));
    finish(&mut shell, failed || !loaded, "fetching the index")
}

async fn run_search(
    mut shell: Shell,
    mut rx: UnboundedReceiver<UiEvent>,
    query: String,
    metric: Metric,
) -> Result<()> {
    shell.navigate(Route::Search, None);
    let submit = {
        let screen = shell.query().ok_or_else(|| anyhow!("search screen is not mounted"))?;
        screen.set_query(query);
        screen.set_metric(metric);
        screen.submit_query()
    };
    let issued = submit.is_some();
    let failed = drive(&mut shell, &mut rx, submit).await?;
    finish(&mut shell, failed || !issued, "search")
}

enum Flow {
    Continue(Option<JoinHandle<Settled>>),
    Quit,
}

fn unavailable(command: &str, shell: &Shell) -> Flow {
    println!("`{command}` is not available on {}", shell.route().path());
    Flow::Continue(None)
}

fn execute(shell: &mut Shell, line: &str) -> Flow {
    let (command, rest) = match line.trim_start().split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim_start()),
        None => (line.trim(), ""),
    };

    match command {
        "" | "show" => Flow::Continue(None),
        "help" | "?" => {
            println!("{HELP}");
            Flow::Continue(None)
        }
        "quit" | "exit" | "q" => Flow::Quit,
        "go" => match Route::from_path(rest) {
            Some(route) => Flow::Continue(shell.navigate(route, None)),
            None => {
                println!("unknown target {rest:?}");
                Flow::Continue(None)
            }
        },
        "select" => match shell.ingestion() {
            Some(screen) => {
                let paths: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
                if !screen.select_files(expand_selection(&paths)) {
                    println!("file picker is disabled while a request is running");
                    return Flow::Continue(None);
                }
                if screen.candidates().is_empty() {
                    return Flow::Continue(None);
                }
                Flow::Continue(screen.decode_all())
            }
            None => unavailable(command, shell),
        },
        "index" => match shell.ingestion() {
            Some(screen) => Flow::Continue(screen.submit_indexing()),
            None => unavailable(command, shell),
        },
        "proceed" => match shell.inspection() {
            Some(screen) => {
                if !screen.proceed_to_query() {
                    println!("the index is not loaded");
                }
                Flow::Continue(None)
            }
            None => unavailable(command, shell),
        },
        "query" | "append" | "metric" => {
            let Some(screen) = shell.query() else {
                return unavailable(command, shell);
            };
            let applied = match command {
                "query" => screen.set_query(rest),
                "append" => screen.append_line(rest),
                _ => match rest.parse::<Metric>() {
                    Ok(metric) => screen.set_metric(metric),
                    Err(err) => {
                        println!("{err}");
                        return Flow::Continue(None);
                    }
                },
            };
            if !applied {
                println!("input is disabled while a search is running");
            }
            Flow::Continue(None)
        }
        "search" => match shell.query() {
            Some(screen) => Flow::Continue(screen.submit_query()),
            None => unavailable(command, shell),
        },
        other => {
            println!("unknown command {other:?}; type `help`");
            Flow::Continue(None)
        }
    }
}

/// Redraws once `handle` settles, since results land in screen state
/// without an event of their own.
fn watch(handle: JoinHandle<Settled>, redraw: &UnboundedSender<()>) {
    let redraw = redraw.clone();
    tokio::spawn(async move {
        if let Ok(settled) = handle.await {
            tracing::debug!(?settled, "action settled");
        }
        let _ = redraw.send(());
    });
}

async fn interactive(mut shell: Shell, mut rx: UnboundedReceiver<UiEvent>) -> Result<()> {
    let (redraw_tx, mut redraw_rx) = mpsc::unbounded_channel::<()>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}\n\ntype `help` for commands", shell.render());
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match execute(&mut shell, &line) {
                    Flow::Quit => break,
                    Flow::Continue(pending) => {
                        if let Some(handle) = pending {
                            watch(handle, &redraw_tx);
                        }
                        println!("{}", shell.render());
                    }
                }
            }
            Some(event) = rx.recv() => {
                match event {
                    UiEvent::Notice(notice) => println!("{notice}"),
                    UiEvent::Navigate(nav) => {
                        if let Some(handle) = shell.follow(nav) {
                            watch(handle, &redraw_tx);
                        }
                        println!("{}", shell.render());
                    }
                }
            }
            Some(()) = redraw_rx.recv() => println!("{}", shell.render()),
        }
    }
    Ok(())
}
