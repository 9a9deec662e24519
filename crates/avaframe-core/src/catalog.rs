//! Frame catalog: the list of frames a user can pick from, grouped by
//! category.
//!
//! Records only carry metadata and a source URL. Fetching the image behind
//! `src` is left to the host, which then uploads the pixels to the session.

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, EditorResult};

/// Category id that matches every frame.
pub const ALL_CATEGORY: &str = "all";

/// Category assigned to user-added frames.
pub const PERSONAL_CATEGORY: &str = "personal";

/// One selectable frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub id: String,
    pub name: String,
    pub thumbnail: String,
    pub src: String,
    pub category: String,
}

/// A filter entry shown above the frame grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

impl Category {
    fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

/// The built-in category list.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new(ALL_CATEGORY, "All Frames"),
        Category::new("holidays", "Holidays"),
        Category::new("business", "Business"),
        Category::new("social", "Social Media"),
        Category::new(PERSONAL_CATEGORY, "Personal"),
        Category::new("events", "Events"),
        Category::new("decorative", "Decorative"),
    ]
}

/// Starter frames shown before the user adds their own.
pub fn sample_frames() -> Vec<FrameRecord> {
    let record = |id: &str, name: &str, thumbnail: &str, src: &str, category: &str| FrameRecord {
        id: id.to_string(),
        name: name.to_string(),
        thumbnail: thumbnail.to_string(),
        src: src.to_string(),
        category: category.to_string(),
    };
    let drive = "https://drive.google.com/file/d/1jRD_7EUNEKVcQThBk4zDRUdOgd28Cgkr/view?usp=drive_link";

    vec![
        record(
            "frame1",
            "Facebook Profile",
            "https://i.imgur.com/59BflFY.jpeg",
            "https://i.imgur.com/59BflFY.jpeg",
            "social",
        ),
        record("frame2", "Business Card", drive, drive, "business"),
        record(
            "frame3",
            "Personal Avatar",
            "https://via.placeholder.com/150/6366f1/ffffff?text=AVA",
            "https://via.placeholder.com/800/6366f1/ffffff?text=Personal+Frame",
            PERSONAL_CATEGORY,
        ),
        record(
            "frame4",
            "Event Badge",
            "https://via.placeholder.com/150/be123c/ffffff?text=EVT",
            "https://via.placeholder.com/800/be123c/ffffff?text=Event+Frame",
            "events",
        ),
        record(
            "frame5",
            "Holiday Theme",
            "https://via.placeholder.com/150/059669/ffffff?text=HOL",
            "https://via.placeholder.com/800/059669/ffffff?text=Holiday+Frame",
            "holidays",
        ),
        record(
            "frame6",
            "Decorative Border",
            "https://via.placeholder.com/150/8b5cf6/ffffff?text=DEC",
            "https://via.placeholder.com/800/8b5cf6/ffffff?text=Decorative+Frame",
            "decorative",
        ),
    ]
}

/// Frames, categories, and the user's current picks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameCatalog {
    frames: Vec<FrameRecord>,
    categories: Vec<Category>,
    selected_frame: Option<String>,
    selected_category: String,
}

impl Default for FrameCatalog {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FrameCatalog {
    pub fn new(frames: Vec<FrameRecord>) -> Self {
        Self {
            frames,
            categories: default_categories(),
            selected_frame: None,
            selected_category: ALL_CATEGORY.to_string(),
        }
    }

    /// Catalog preloaded with [`sample_frames`].
    pub fn with_samples() -> Self {
        Self::new(sample_frames())
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn selected_category(&self) -> &str {
        &self.selected_category
    }

    /// Frames in the selected category, in catalog order.
    pub fn filtered(&self) -> Vec<&FrameRecord> {
        if self.selected_category == ALL_CATEGORY {
            return self.frames.iter().collect();
        }
        self.frames
            .iter()
            .filter(|frame| frame.category == self.selected_category)
            .collect()
    }

    pub fn selected_frame(&self) -> Option<&FrameRecord> {
        let id = self.selected_frame.as_deref()?;
        self.frames.iter().find(|frame| frame.id == id)
    }

    /// Remember `id` as the picked frame and return its record, if known.
    pub fn select_frame(&mut self, id: &str) -> Option<&FrameRecord> {
        self.selected_frame = Some(id.to_string());
        self.selected_frame()
    }

    pub fn set_category(&mut self, id: &str) -> EditorResult<()> {
        if !self.categories.iter().any(|c| c.id == id) {
            return Err(EditorError::invalid_input(format!("unknown category: {id}")));
        }
        self.selected_category = id.to_string();
        Ok(())
    }

    /// Add a user-uploaded frame at the front of the catalog.
    pub fn add_custom_frame(&mut self, src: &str, now_ms: u64) -> &FrameRecord {
        self.push_front(FrameRecord {
            id: format!("custom-{now_ms}"),
            name: "Custom Frame".to_string(),
            thumbnail: src.to_string(),
            src: src.to_string(),
            category: PERSONAL_CATEGORY.to_string(),
        })
    }

    /// Add a frame referenced by an `http(s)` URL at the front of the catalog.
    ///
    /// Only the URL shape is checked; reachability is the host's concern.
    pub fn add_frame_from_url(&mut self, url: &str, now_ms: u64) -> EditorResult<&FrameRecord> {
        let url = url.trim();
        if !is_http_url(url) {
            return Err(EditorError::invalid_input(format!(
                "frame URL must be http(s): '{url}'"
            )));
        }

        Ok(self.push_front(FrameRecord {
            id: format!("url-{now_ms}"),
            name: "URL Frame".to_string(),
            thumbnail: url.to_string(),
            src: url.to_string(),
            category: PERSONAL_CATEGORY.to_string(),
        }))
    }

    fn push_front(&mut self, record: FrameRecord) -> &FrameRecord {
        self.frames.insert(0, record);
        &self.frames[0]
    }
}

fn is_http_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
            !host.is_empty() && !url.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, category: &str) -> FrameRecord {
        FrameRecord {
            id: id.to_string(),
            name: id.to_uppercase(),
            thumbnail: format!("https://cdn.test/{id}-thumb.png"),
            src: format!("https://cdn.test/{id}.png"),
            category: category.to_string(),
        }
    }

    fn catalog() -> FrameCatalog {
        FrameCatalog::new(vec![
            record("a", "social"),
            record("b", "business"),
            record("c", "social"),
        ])
    }

    #[test]
    fn test_samples_cover_every_category() {
        let mut c = FrameCatalog::with_samples();
        assert_eq!(c.frames().len(), 6);

        let ids: Vec<String> = c.categories().iter().map(|cat| cat.id.clone()).collect();
        for id in ids.iter().filter(|id| id.as_str() != ALL_CATEGORY) {
            c.set_category(id).unwrap();
            assert_eq!(c.filtered().len(), 1, "category {id}");
        }
        assert_eq!(c.select_frame("frame3").map(|f| f.name.as_str()), Some("Personal Avatar"));
    }

    #[test]
    fn test_defaults() {
        let c = FrameCatalog::default();
        assert!(c.frames().is_empty());
        assert_eq!(c.selected_category(), "all");
        assert_eq!(c.categories().len(), 7);
        assert!(c.selected_frame().is_none());
    }

    #[test]
    fn test_filter_by_category() {
        let mut c = catalog();
        assert_eq!(c.filtered().len(), 3);

        c.set_category("social").unwrap();
        let ids: Vec<_> = c.filtered().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);

        c.set_category("holidays").unwrap();
        assert!(c.filtered().is_empty());
    }

    #[test]
    fn test_unknown_category_rejected() {
        let mut c = catalog();
        assert!(matches!(
            c.set_category("nope"),
            Err(EditorError::InvalidInput(_))
        ));
        assert_eq!(c.selected_category(), "all");
    }

    #[test]
    fn test_select_frame() {
        let mut c = catalog();
        assert_eq!(c.select_frame("b").map(|f| f.id.as_str()), Some("b"));
        assert_eq!(c.selected_frame().map(|f| f.category.as_str()), Some("business"));
        assert!(c.select_frame("zzz").is_none());
    }

    #[test]
    fn test_add_custom_frame_goes_first() {
        let mut c = catalog();
        let added = c.add_custom_frame("blob:local/1", 1700).clone();
        assert_eq!(added.id, "custom-1700");
        assert_eq!(added.category, "personal");
        assert_eq!(added.thumbnail, added.src);
        assert_eq!(c.frames()[0], added);
        assert_eq!(c.frames().len(), 4);
    }

    #[test]
    fn test_add_frame_from_url() {
        let mut c = catalog();
        let added = c
            .add_frame_from_url("https://example.com/frame.png", 42)
            .unwrap()
            .clone();
        assert_eq!(added.id, "url-42");
        assert_eq!(added.name, "URL Frame");
        assert_eq!(c.frames()[0].src, "https://example.com/frame.png");
    }

    #[test]
    fn test_add_frame_from_bad_url() {
        let mut c = catalog();
        for url in ["ftp://x.com/a.png", "not a url", "https://", "http:///path", "javascript:alert(1)"] {
            assert!(c.add_frame_from_url(url, 1).is_err(), "{url}");
        }
        assert_eq!(c.frames().len(), 3);
    }
}
