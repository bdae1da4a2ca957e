use url::Url;

/// Receives links the viewer wants shown outside itself.
pub trait LinkLauncher {
    fn open(&mut self, url: &str, title: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launch {
    Overlay { url: String, title: String },
    NewWindow { url: String },
}

/// Shows links in an in-page overlay, rewriting video pages to their embeddable
/// form and sending configured hosts to a new window instead.
#[derive(Debug, Default)]
pub struct OverlayLauncher {
    new_window_hosts: Vec<String>,
    current: Option<Launch>,
}

impl OverlayLauncher {
    pub fn new(new_window_hosts: Vec<String>) -> Self {
        Self {
            new_window_hosts,
            current: None,
        }
    }

    pub fn resolve(&self, url: &str, title: &str) -> Launch {
        if self.new_window_hosts.iter().any(|host| url.contains(host.as_str())) {
            return Launch::NewWindow {
                url: url.to_string(),
            };
        }
        Launch::Overlay {
            url: embed_url(url).unwrap_or_else(|| url.to_string()),
            title: title.to_string(),
        }
    }

    /// The most recent launch, if any.
    pub fn current(&self) -> Option<&Launch> {
        self.current.as_ref()
    }

    pub fn close(&mut self) {
        self.current = None;
    }
}

impl LinkLauncher for OverlayLauncher {
    fn open(&mut self, url: &str, title: &str) {
        let launch = self.resolve(url, title);
        match &launch {
            Launch::Overlay { url, title } => {
                tracing::info!(%url, "opening overlay");
                println!("┌ {title}\n└ {url}");
            }
            Launch::NewWindow { url } => {
                tracing::info!(%url, "opening new window");
                println!("↗ {url}");
            }
        }
        self.current = Some(launch);
    }
}

/// `youtube.com/watch?v=ID` and `youtu.be/ID` become `youtube.com/embed/ID`.
fn embed_url(raw: &str) -> Option<String> {
    let id = if raw.contains("youtube.com/watch") {
        let parsed = Url::parse(raw).ok()?;
        parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
    } else if raw.contains("youtu.be/") {
        let parsed = Url::parse(raw).ok()?;
        Some(parsed.path().trim_start_matches('/').to_string())
    } else {
        None
    }?;
    if id.is_empty() {
        return None;
    }
    Some(format!("https://www.youtube.com/embed/{id}"))
}
