use crate::state::ViewedSet;

pub const UNTITLED: &str = "Untitled";

/// One CSV line split into trimmed cells.
pub type RawRow = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub id: String,
    pub thumbnail_url: String,
    pub image_url: String,
    pub link: Option<String>,
    pub title: String,
}

/// Splits exported CSV text into rows, dropping the header line.
///
/// Cells are split on every comma; quoted fields are not understood.
pub fn parse_csv(text: &str) -> Vec<RawRow> {
    text.split('\n')
        .skip(1)
        .map(|line| line.split(',').map(|cell| cell.trim().to_string()).collect())
        .collect()
}

/// Column layout of a story row: thumbnail, image, link, title.
struct StoryRow<'a> {
    thumbnail: &'a str,
    image: &'a str,
    link: Option<&'a str>,
    title: Option<&'a str>,
}

impl<'a> StoryRow<'a> {
    /// Fails unless both the thumbnail and image columns are present and non-empty.
    fn decode(cells: &'a [String]) -> Option<Self> {
        let thumbnail = non_empty(cells.first())?;
        let image = non_empty(cells.get(1))?;
        Some(Self {
            thumbnail,
            image,
            link: non_empty(cells.get(2)),
            title: non_empty(cells.get(3)),
        })
    }

    fn into_story(self, index: usize) -> Story {
        Story {
            id: format!("story-{index}"),
            thumbnail_url: self.thumbnail.to_string(),
            image_url: self.image.to_string(),
            link: self.link.map(str::to_string),
            title: self.title.unwrap_or(UNTITLED).to_string(),
        }
    }
}

fn non_empty(cell: Option<&String>) -> Option<&str> {
    cell.map(String::as_str).filter(|s| !s.is_empty())
}

/// Builds the story strip: ids follow source position, invalid rows are dropped,
/// and viewed stories move behind unviewed ones without disturbing relative order.
pub fn build(rows: &[RawRow], viewed: &ViewedSet) -> Vec<Story> {
    let mut stories: Vec<Story> = rows
        .iter()
        .enumerate()
        .filter_map(|(index, cells)| StoryRow::decode(cells).map(|row| row.into_story(index)))
        .collect();
    let dropped = rows.len() - stories.len();
    if dropped > 0 {
        tracing::debug!(dropped, "skipped story rows without thumbnail or image");
    }
    // sort_by_key is stable
    stories.sort_by_key(|story| viewed.contains(&story.id));
    stories
}
