use crate::state::{Storage, ViewedStore};
use crate::stories::Story;

/// One line per story, unviewed stories with a filled ring.
pub fn strip<S: Storage>(stories: &[Story], viewed: &ViewedStore<S>) -> String {
    if stories.is_empty() {
        return "No stories to show.".to_string();
    }
    stories
        .iter()
        .enumerate()
        .map(|(index, story)| {
            let ring = if viewed.has(&story.id) { '○' } else { '●' };
            format!("{ring} {:>2}. {}  <{}>", index + 1, story.title, story.thumbnail_url)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full view of the story at `index` out of `len`.
pub fn story(story: &Story, index: usize, len: usize) -> String {
    let prev = if index > 0 { "‹ p" } else { "   " };
    let next = if index + 1 < len { "n ›" } else { "   " };
    let mut out = format!(
        "{prev}  [{}/{len}] {}  {next}\n      {}",
        index + 1,
        story.title,
        story.image_url
    );
    if story.link.is_some() {
        out.push_str("\n      [l] Learn More");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryStorage;

    fn story_with(id: &str, title: &str, link: Option<&str>) -> Story {
        Story {
            id: id.into(),
            thumbnail_url: "t".into(),
            image_url: "https://img/x.png".into(),
            link: link.map(Into::into),
            title: title.into(),
        }
    }

    #[test]
    fn strip_marks_viewed_stories() {
        let mut viewed = ViewedStore::load(MemoryStorage::default());
        viewed.mark_viewed("story-1");
        let stories = vec![
            story_with("story-0", "Fresh", None),
            story_with("story-1", "Seen", None),
        ];
        assert_eq!(strip(&stories, &viewed), "●  1. Fresh  <t>\n○  2. Seen  <t>");
    }

    #[test]
    fn empty_strip_says_so() {
        let viewed = ViewedStore::load(MemoryStorage::default());
        assert_eq!(strip(&[], &viewed), "No stories to show.");
    }

    #[test]
    fn first_story_hides_prev() {
        let out = story(&story_with("story-0", "A", Some("l")), 0, 2);
        assert!(!out.contains("‹ p"));
        assert!(out.contains("n ›"));
        assert!(out.contains("Learn More"));
    }

    #[test]
    fn last_story_hides_next_and_missing_link_hides_learn_more() {
        let out = story(&story_with("story-1", "B", None), 1, 2);
        assert!(out.contains("‹ p"));
        assert!(!out.contains("n ›"));
        assert!(!out.contains("Learn More"));
    }
}
