use serde::Deserialize;
use std::path::Path;

const DEFAULT_STORIES_URL: &str =
    "https://docs.google.com/spreadsheets/d/1p63AK6_2JPI1prbQpglHi5spB2f1y2PbcdnsvtS74g8/export?format=csv";

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_stories_url")]
    pub stories_url: String,
    #[serde(default = "default_state_file")]
    pub state_file: String,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Links on these hosts skip the overlay and open in a new window.
    #[serde(default = "default_new_window_hosts")]
    pub new_window_hosts: Vec<String>,
}

fn default_stories_url() -> String {
    DEFAULT_STORIES_URL.to_string()
}

fn default_state_file() -> String {
    "story-state.json".to_string()
}

fn default_fetch_timeout() -> u64 {
    15
}

fn default_new_window_hosts() -> Vec<String> {
    vec!["spotify.com".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stories_url: default_stories_url(),
            state_file: default_state_file(),
            fetch_timeout_secs: default_fetch_timeout(),
            new_window_hosts: default_new_window_hosts(),
        }
    }
}

impl Config {
    /// Reads the JSON config at `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Config::default()
            }
            Err(e) => return Err(e.into()),
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("STORIES_URL") {
            self.stories_url = url;
        }
        if let Ok(file) = std::env::var("STATE_FILE") {
            self.state_file = file;
        }
    }
}
