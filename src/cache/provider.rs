//! Chapter content and the provider port.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Pre-paginated content of one chapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterContent {
    /// Stable content identity, independent of the chapter's position
    pub id: String,
    /// Chapter index in the book
    pub index: usize,
    pub title: String,
    /// Page descriptors produced by the host paginator
    #[serde(default)]
    pub pages: Vec<String>,
}

impl ChapterContent {
    pub fn new(id: impl Into<String>, index: usize, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            index,
            title: title.into(),
            pages: Vec::new(),
        }
    }

    /// Builder: attach page descriptors
    pub fn with_pages(mut self, pages: Vec<String>) -> Self {
        self.pages = pages;
        self
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Host-supplied chapter loader.
///
/// Must be idempotent: the cache calls it speculatively and may discard the
/// result.
pub trait ContentProvider {
    /// Content of chapter `index`, `None` when unavailable
    fn load_chapter(&mut self, index: usize) -> Option<ChapterContent>;
}

impl<F> ContentProvider for F
where
    F: FnMut(usize) -> Option<ChapterContent>,
{
    fn load_chapter(&mut self, index: usize) -> Option<ChapterContent> {
        self(index)
    }
}

/// Provider backed by chapters held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    chapters: BTreeMap<usize, ChapterContent>,
    /// Every index requested, in order
    requests: Vec<usize>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider holding `chapters`, keyed by their own index
    pub fn from_chapters(chapters: impl IntoIterator<Item = ChapterContent>) -> Self {
        Self {
            chapters: chapters.into_iter().map(|c| (c.index, c)).collect(),
            requests: Vec::new(),
        }
    }

    /// `count` generated chapters with ids `chapter-<index>`
    pub fn numbered(count: usize) -> Self {
        Self::from_chapters((0..count).map(|index| {
            ChapterContent::new(format!("chapter-{}", index), index, format!("Chapter {}", index + 1))
                .with_pages(vec![format!("chapter-{}/page-0", index)])
        }))
    }

    /// Parse a JSON array of chapters
    pub fn from_json(json: &str) -> Result<Self> {
        let chapters: Vec<ChapterContent> =
            serde_json::from_str(json).context("Failed to parse chapter list")?;
        Ok(Self::from_chapters(chapters))
    }

    pub fn insert(&mut self, chapter: ChapterContent) {
        self.chapters.insert(chapter.index, chapter);
    }

    /// Make chapter `index` unavailable
    pub fn remove(&mut self, index: usize) -> Option<ChapterContent> {
        self.chapters.remove(&index)
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.keys().next_back().map_or(0, |last| last + 1)
    }

    pub fn requests(&self) -> &[usize] {
        &self.requests
    }

    /// Number of times `index` was requested
    pub fn request_count(&self, index: usize) -> usize {
        self.requests.iter().filter(|&&i| i == index).count()
    }
}

impl ContentProvider for InMemoryProvider {
    fn load_chapter(&mut self, index: usize) -> Option<ChapterContent> {
        self.requests.push(index);
        self.chapters.get(&index).cloned()
    }
}
