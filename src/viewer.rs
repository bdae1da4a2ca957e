use crate::launcher::LinkLauncher;
use crate::state::{Storage, ViewedStore};
use crate::stories::Story;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerState {
    #[default]
    Closed,
    Open(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewerError {
    #[error("no story at position {index} ({len} available)")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKey {
    Escape,
    ArrowLeft,
    ArrowRight,
}

/// Modal story viewer over one loaded story strip.
pub struct StoryViewer<S: Storage> {
    stories: Vec<Story>,
    viewed: ViewedStore<S>,
    state: ViewerState,
}

impl<S: Storage> StoryViewer<S> {
    pub fn new(stories: Vec<Story>, viewed: ViewedStore<S>) -> Self {
        Self {
            stories,
            viewed,
            state: ViewerState::Closed,
        }
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn viewed(&self) -> &ViewedStore<S> {
        &self.viewed
    }

    pub fn current(&self) -> Option<&Story> {
        match self.state {
            ViewerState::Open(index) => self.stories.get(index),
            ViewerState::Closed => None,
        }
    }

    /// Swaps in a freshly loaded strip. Any open story is closed.
    pub fn replace_stories(&mut self, stories: Vec<Story>) {
        self.state = ViewerState::Closed;
        self.stories = stories;
    }

    /// Opens the story at `index`, marking it viewed. Valid while already open.
    pub fn open(&mut self, index: usize) -> Result<&Story, ViewerError> {
        if index >= self.stories.len() {
            return Err(ViewerError::IndexOutOfRange {
                index,
                len: self.stories.len(),
            });
        }
        self.show(index);
        Ok(&self.stories[index])
    }

    /// Callers guarantee `index < self.stories.len()`.
    fn show(&mut self, index: usize) {
        let id = &self.stories[index].id;
        if self.viewed.mark_viewed(id) {
            tracing::debug!(story = %id, "marked viewed");
        }
        self.state = ViewerState::Open(index);
    }

    /// Advances to the next story, closing past the last one.
    pub fn next(&mut self) -> ViewerState {
        if let ViewerState::Open(index) = self.state {
            if index + 1 < self.stories.len() {
                self.show(index + 1);
            } else {
                self.close();
            }
        }
        self.state
    }

    /// Steps back one story. No-op on the first story or when closed.
    pub fn prev(&mut self) -> ViewerState {
        if let ViewerState::Open(index) = self.state {
            if index > 0 {
                self.show(index - 1);
            }
        }
        self.state
    }

    pub fn close(&mut self) {
        self.state = ViewerState::Closed;
    }

    /// Closes the viewer and hands the current story's link to `launcher`.
    /// Returns false without changing state when there is nothing to launch.
    pub fn learn_more(&mut self, launcher: &mut dyn LinkLauncher) -> bool {
        let Some(story) = self.current() else {
            return false;
        };
        let Some(link) = story.link.clone() else {
            return false;
        };
        let title = story.title.clone();
        self.close();
        launcher.open(&link, &title);
        true
    }

    pub fn handle_key(&mut self, key: ViewerKey) -> ViewerState {
        if self.state == ViewerState::Closed {
            return self.state;
        }
        match key {
            ViewerKey::Escape => self.close(),
            ViewerKey::ArrowRight => {
                self.next();
            }
            ViewerKey::ArrowLeft => {
                self.prev();
            }
        }
        self.state
    }
}
