use crate::api::{ApiClient, TagCreateRequest, TagUpdateRequest};
use crate::models::Tag;
use leptos::prelude::*;

/// Preset swatches offered for tags and folders.
pub(crate) const PRESET_COLORS: [&str; 16] = [
    "#EF4444", "#F97316", "#F59E0B", "#EAB308", "#84CC16", "#22C55E", "#10B981", "#14B8A6",
    "#06B6D4", "#0EA5E9", "#3B82F6", "#6366F1", "#8B5CF6", "#A855F7", "#D946EF", "#EC4899",
];

pub(crate) const DEFAULT_COLOR: &str = "#6366F1";

#[derive(Clone, Copy)]
pub(crate) struct TagsStore {
    api: RwSignal<ApiClient>,
    pub tags: RwSignal<Vec<Tag>>,
    pub is_loading: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
}

impl TagsStore {
    pub fn new(api: RwSignal<ApiClient>) -> Self {
        Self {
            api,
            tags: RwSignal::new(vec![]),
            is_loading: RwSignal::new(false),
            error: RwSignal::new(None),
        }
    }

    pub async fn load_tags(self, with_counts: bool) {
        self.is_loading.set(true);
        self.error.set(None);
        let api = self.api.get_untracked();
        match api.get_tags(with_counts).await {
            Ok(tags) => self.tags.set(tags),
            Err(e) => self.error.set(Some(e.to_string())),
        }
        self.is_loading.set(false);
    }

    pub async fn create_tag(self, req: TagCreateRequest) -> Option<Tag> {
        self.error.set(None);
        let api = self.api.get_untracked();
        match api.create_tag(&req).await {
            Ok(tag) => {
                self.load_tags(true).await;
                Some(tag)
            }
            Err(e) => {
                self.error.set(Some(e.to_string()));
                None
            }
        }
    }

    pub async fn update_tag(self, id: String, req: TagUpdateRequest) -> Option<Tag> {
        self.error.set(None);
        let api = self.api.get_untracked();
        match api.update_tag(&id, &req).await {
            Ok(tag) => {
                self.load_tags(true).await;
                Some(tag)
            }
            Err(e) => {
                self.error.set(Some(e.to_string()));
                None
            }
        }
    }

    pub async fn delete_tag(self, id: String) -> bool {
        self.error.set(None);
        let api = self.api.get_untracked();
        match api.delete_tag(&id).await {
            Ok(()) => {
                self.load_tags(true).await;
                true
            }
            Err(e) => {
                self.error.set(Some(e.to_string()));
                false
            }
        }
    }

    pub fn clear_error(&self) {
        self.error.set(None);
    }

    pub fn reset(&self) {
        self.tags.set(vec![]);
        self.error.set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_is_unique_hex() {
        let mut seen = std::collections::HashSet::new();
        for c in PRESET_COLORS {
            assert!(c.len() == 7 && c.starts_with('#'), "{c}");
            assert!(c[1..].chars().all(|ch| ch.is_ascii_hexdigit()), "{c}");
            assert!(seen.insert(c), "duplicate {c}");
        }
        assert!(PRESET_COLORS.contains(&DEFAULT_COLOR));
    }
}
