use crate::viewer::ViewerKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Zero-based position in the strip.
    Open(usize),
    Key(ViewerKey),
    LearnMore,
    List,
    Reload,
    Help,
    Quit,
}

pub const HELP: &str = "\
  <number>      open story (1-based)
  n, right      next story
  p, left       previous story
  x, esc        close story
  l, more       learn more
  ls            list stories
  r, reload     reload stories
  q, quit       exit";

/// Parses one prompt line. Returns None for blank or unrecognized input.
pub fn parse(line: &str) -> Option<Command> {
    let word = line.trim().to_ascii_lowercase();
    let command = match word.as_str() {
        "n" | "next" | "right" => Command::Key(ViewerKey::ArrowRight),
        "p" | "prev" | "left" => Command::Key(ViewerKey::ArrowLeft),
        "x" | "esc" | "close" => Command::Key(ViewerKey::Escape),
        "l" | "more" => Command::LearnMore,
        "ls" | "list" => Command::List,
        "r" | "reload" => Command::Reload,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        other => {
            let position: usize = other.parse().ok()?;
            Command::Open(position.checked_sub(1)?)
        }
    };
    Some(command)
}
