mod command;
mod config;
mod launcher;
mod render;
mod source;
mod state;
mod stories;
mod viewer;

use command::Command;
use config::Config;
use launcher::OverlayLauncher;
use source::{FetchError, LoadGuard, LoadTicket, StorySource};
use state::{FileStorage, Storage, ViewedStore};
use std::path::Path;
use std::time::Duration;
use stories::RawRow;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use viewer::{StoryViewer, ViewerKey, ViewerState};

type LoadResult = (LoadTicket, Result<Vec<RawRow>, FetchError>);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("story_hub=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::var("CONFIG").unwrap_or_else(|_| "config.json".to_string());
    let config = Config::load(Path::new(&config_path))?;

    let viewed = ViewedStore::load(FileStorage::open(Path::new(&config.state_file)));
    let source = StorySource::new(
        &config.stories_url,
        Duration::from_secs(config.fetch_timeout_secs),
    )?;
    let mut guard = LoadGuard::default();
    let mut launcher = OverlayLauncher::new(config.new_window_hosts.clone());
    let (tx, mut rx) = mpsc::unbounded_channel::<LoadResult>();

    let mut viewer = StoryViewer::new(Vec::new(), viewed);
    spawn_load(&source, &mut guard, &tx);
    println!("Loading stories...");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some(command) = command::parse(&line) else {
                    if !line.trim().is_empty() {
                        println!("Unknown command. Type 'h' for help.");
                    }
                    continue;
                };
                match command {
                    Command::Quit => break,
                    Command::Reload => {
                        spawn_load(&source, &mut guard, &tx);
                        println!("Reloading stories...");
                    }
                    other => run(other, &mut viewer, &mut launcher),
                }
            }
            Some((ticket, result)) = rx.recv() => {
                if apply_load(&mut viewer, &guard, ticket, result) {
                    println!("{}", render::strip(viewer.stories(), viewer.viewed()));
                }
            }
        }
    }

    Ok(())
}

/// Starts a fetch in the background. Its result arrives on `tx` tagged with a fresh ticket,
/// which makes any still-pending earlier fetch stale.
fn spawn_load(
    source: &StorySource,
    guard: &mut LoadGuard,
    tx: &mpsc::UnboundedSender<LoadResult>,
) {
    let ticket = guard.begin();
    let source = source.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = source.fetch_rows().await;
        if tx.send((ticket, result)).is_err() {
            tracing::debug!("prompt exited before story load finished");
        }
    });
}

/// Installs a finished load into the viewer. Stale results are dropped and leave the
/// current strip untouched; a failed fetch is reported once and yields no stories.
fn apply_load<S: Storage>(
    viewer: &mut StoryViewer<S>,
    guard: &LoadGuard,
    ticket: LoadTicket,
    result: Result<Vec<RawRow>, FetchError>,
) -> bool {
    let Some(result) = guard.settle(ticket, result) else {
        tracing::debug!(?ticket, "discarding stale story load");
        return false;
    };
    let stories = match result {
        Ok(rows) => {
            let stories = stories::build(&rows, viewer.viewed().viewed());
            tracing::info!(count = stories.len(), "stories loaded");
            stories
        }
        Err(e) => {
            tracing::warn!(error = %e, "story fetch failed");
            println!("Could not load stories.");
            Vec::new()
        }
    };
    viewer.replace_stories(stories);
    true
}

fn run<S: Storage>(command: Command, viewer: &mut StoryViewer<S>, launcher: &mut OverlayLauncher) {
    match command {
        Command::Help => println!("{}", command::HELP),
        Command::List => println!("{}", render::strip(viewer.stories(), viewer.viewed())),
        Command::Open(index) => match viewer.open(index) {
            Ok(_) => show(viewer),
            Err(e) => {
                tracing::debug!(error = %e, "open rejected");
                println!("No story #{}.", index + 1);
            }
        },
        Command::Key(ViewerKey::Escape)
            if viewer.state() == ViewerState::Closed && launcher.current().is_some() =>
        {
            launcher.close();
            println!("Overlay closed.");
        }
        Command::Key(key) => {
            viewer.handle_key(key);
            show(viewer);
        }
        Command::LearnMore => {
            if !viewer.learn_more(launcher) {
                println!("Nothing to open.");
            }
        }
        Command::Reload | Command::Quit => {}
    }
}

fn show<S: Storage>(viewer: &StoryViewer<S>) {
    match (viewer.state(), viewer.current()) {
        (ViewerState::Open(index), Some(story)) => {
            println!("{}", render::story(story, index, viewer.stories().len()));
        }
        _ => println!("{}", render::strip(viewer.stories(), viewer.viewed())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryStorage;
    use crate::stories::parse_csv;

    fn empty_viewer() -> StoryViewer<MemoryStorage> {
        StoryViewer::new(Vec::new(), ViewedStore::load(MemoryStorage::default()))
    }

    fn ids<S: Storage>(viewer: &StoryViewer<S>) -> Vec<&str> {
        viewer.stories().iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn superseded_load_leaves_strip_alone() {
        let mut viewer = empty_viewer();
        let mut guard = LoadGuard::default();

        let first = guard.begin();
        assert!(apply_load(&mut viewer, &guard, first, Ok(parse_csv("h\nt,i,,A"))));
        assert_eq!(ids(&viewer), vec!["story-0"]);

        let slow = guard.begin();
        let fresh = guard.begin();
        assert!(!apply_load(&mut viewer, &guard, slow, Ok(parse_csv("h\n,,,\nt,i,,B"))));
        assert_eq!(ids(&viewer), vec!["story-0"]);

        assert!(apply_load(&mut viewer, &guard, fresh, Ok(parse_csv("h\nt,i,,A\nt,i,,C"))));
        assert_eq!(ids(&viewer), vec!["story-0", "story-1"]);
    }

    #[test]
    fn stale_failure_does_not_clear_strip() {
        let mut viewer = empty_viewer();
        let mut guard = LoadGuard::default();
        let first = guard.begin();
        apply_load(&mut viewer, &guard, first, Ok(parse_csv("h\nt,i,,A")));

        let stale = guard.begin();
        let _current = guard.begin();
        let failure = FetchError::Status {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: String::new(),
        };
        assert!(!apply_load(&mut viewer, &guard, stale, Err(failure)));
        assert_eq!(ids(&viewer), vec!["story-0"]);
    }

    #[test]
    fn current_failure_empties_strip() {
        let mut viewer = empty_viewer();
        let mut guard = LoadGuard::default();
        let first = guard.begin();
        apply_load(&mut viewer, &guard, first, Ok(parse_csv("h\nt,i,,A")));

        let retry = guard.begin();
        let failure = FetchError::Status {
            status: reqwest::StatusCode::NOT_FOUND,
            body: String::new(),
        };
        assert!(apply_load(&mut viewer, &guard, retry, Err(failure)));
        assert!(viewer.stories().is_empty());
    }

    #[test]
    fn reload_orders_by_viewed_in_session() {
        let mut viewer = empty_viewer();
        let mut guard = LoadGuard::default();
        let csv = "h\nt,i,,A\nt,i,,B";
        let first = guard.begin();
        apply_load(&mut viewer, &guard, first, Ok(parse_csv(csv)));
        viewer.open(0).unwrap();

        let second = guard.begin();
        apply_load(&mut viewer, &guard, second, Ok(parse_csv(csv)));
        assert_eq!(viewer.state(), ViewerState::Closed);
        assert_eq!(ids(&viewer), vec!["story-1", "story-0"]);
    }
}
