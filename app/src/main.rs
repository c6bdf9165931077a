//! Seekmark command line
//!
//! There is no browser to attach to from here, so tabs, content scripts and
//! the player live in a simulated host for the lifetime of the process.
//! Bookmarks themselves are persisted in the configured database.

mod host;
mod state;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use seekmark_core::{BookmarkFilter, BookmarkRecord, Config};
use state::AppState;

#[derive(Parser)]
#[command(name = "seekmark", about = "Bookmark and resume episode playback positions")]
struct Cli {
    /// JSON config file, defaults apply when it does not exist
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List stored bookmarks
    List {
        #[arg(long)]
        episode_url: Option<String>,
        #[arg(long)]
        series_name: Option<String>,
    },
    /// Delete a bookmark
    Delete { id: String },
    /// Bookmark an episode playing in a simulated tab, close the tab and resume it
    Demo {
        #[arg(long, default_value = "https://www.netflix.com/watch/81091396")]
        url: String,
        #[arg(long, default_value_t = 754_000)]
        time_ms: u64,
        #[arg(long, default_value = "Demo bookmark")]
        name: String,
    },
}

fn print_bookmark(bookmark: &BookmarkRecord) {
    println!(
        "{}  {:>10}ms  {}  {}  {}",
        bookmark.id,
        bookmark.time_ms,
        bookmark.series_name.as_deref().unwrap_or("-"),
        bookmark.name,
        bookmark.episode_url
    );
}

async fn demo(state: &AppState, url: &str, time_ms: u64, name: &str) -> Result<()> {
    let tab_id = state.host().open_playing_tab(url, time_ms)?;

    let bookmark = state.bookmarks().create(name).await?;
    print_bookmark(&bookmark);

    state.host().close_tab(tab_id)?;

    let result = state.bookmarks().open(&bookmark.id).await?;
    if result.success {
        println!("Resumed at {}ms", bookmark.time_ms);
    } else {
        println!(
            "Could not resume: {}",
            result.reason.as_deref().unwrap_or("unknown reason")
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    seekmark_core::init_logging();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    let state = AppState::new(&config).context("initializing seekmark")?;

    match cli.command {
        Command::List {
            episode_url,
            series_name,
        } => {
            let filter = BookmarkFilter {
                episode_url,
                series_name,
                ..BookmarkFilter::default()
            };
            for bookmark in state.bookmarks().find(&filter)? {
                print_bookmark(&bookmark);
            }
        }
        Command::Delete { id } => {
            state.bookmarks().destroy(&id)?;
            println!("Deleted {}", id);
        }
        Command::Demo { url, time_ms, name } => {
            demo(&state, &url, time_ms, &name).await?;
        }
    }

    Ok(())
}
