use crate::api::{ApiClient, CreateShareRequest, UpdateShareRequest};
use crate::config;
use crate::models::LectureShare;
use crate::telegram;
use leptos::prelude::*;

pub(crate) const SLUG_MIN_LEN: usize = 3;
pub(crate) const SLUG_MAX_LEN: usize = 50;

/// Keeps what a custom slug may contain: lowercase ASCII letters, digits, `-`.
pub(crate) fn sanitize_slug(input: &str) -> String {
    input
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

pub(crate) fn is_valid_slug(slug: &str) -> bool {
    (SLUG_MIN_LEN..=SLUG_MAX_LEN).contains(&slug.len()) && sanitize_slug(slug) == slug
}

pub(crate) fn web_share_url(origin: &str, slug: &str) -> String {
    format!("{origin}?share={slug}")
}

pub(crate) fn telegram_share_url(bot_username: &str, slug: &str) -> String {
    telegram::generate_deep_link(bot_username, &format!("share_{slug}"))
}

/// What a share exposes, edited in the share modal before saving.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ShareVisibility {
    pub is_public: bool,
    pub show_transcription: bool,
    pub show_summary: bool,
    pub show_key_points: bool,
}

impl Default for ShareVisibility {
    fn default() -> Self {
        Self {
            is_public: true,
            show_transcription: true,
            show_summary: true,
            show_key_points: true,
        }
    }
}

impl From<&LectureShare> for ShareVisibility {
    fn from(s: &LectureShare) -> Self {
        Self {
            is_public: s.is_public,
            show_transcription: s.show_transcription,
            show_summary: s.show_summary,
            show_key_points: s.show_key_points,
        }
    }
}

/// Share state of a single lecture, owned by the share modal.
#[derive(Clone, Copy)]
pub(crate) struct ShareStore {
    api: RwSignal<ApiClient>,
    lecture_id: StoredValue<String>,
    pub share: RwSignal<Option<LectureShare>>,
    pub visibility: RwSignal<ShareVisibility>,
    pub custom_slug: RwSignal<String>,
    pub slug_available: RwSignal<Option<bool>>,
    pub is_loading: RwSignal<bool>,
    pub is_saving: RwSignal<bool>,
    pub is_deleting: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
}

impl ShareStore {
    pub fn new(api: RwSignal<ApiClient>, lecture_id: String) -> Self {
        Self {
            api,
            lecture_id: StoredValue::new(lecture_id),
            share: RwSignal::new(None),
            visibility: RwSignal::new(ShareVisibility::default()),
            custom_slug: RwSignal::new(String::new()),
            slug_available: RwSignal::new(None),
            is_loading: RwSignal::new(false),
            is_saving: RwSignal::new(false),
            is_deleting: RwSignal::new(false),
            error: RwSignal::new(None),
        }
    }

    fn lecture_id(&self) -> String {
        self.lecture_id.get_value()
    }

    fn accept(&self, share: LectureShare) {
        self.visibility.set(ShareVisibility::from(&share));
        self.share.set(Some(share));
    }

    /// A lecture without a share answers with an error; that is not surfaced.
    pub async fn load(self) {
        self.is_loading.set(true);
        self.error.set(None);
        self.custom_slug.set(String::new());
        match self.api.get_untracked().get_share(&self.lecture_id()).await {
            Ok(res) => self.accept(res.share),
            Err(e) => {
                tracing::debug!("no share for lecture: {}", e);
                self.share.set(None);
            }
        }
        self.is_loading.set(false);
    }

    pub fn set_custom_slug(&self, input: &str) {
        self.custom_slug.set(sanitize_slug(input));
        self.slug_available.set(None);
    }

    pub async fn check_slug(self) -> Option<bool> {
        let slug = self.custom_slug.get_untracked();
        if !is_valid_slug(&slug) {
            self.slug_available.set(None);
            return None;
        }
        match self.api.get_untracked().check_slug_availability(&slug).await {
            Ok(res) => {
                self.slug_available.set(Some(res.available));
                Some(res.available)
            }
            Err(e) => {
                self.error.set(Some(e.to_string()));
                None
            }
        }
    }

    pub async fn create(self) -> bool {
        let slug = self.custom_slug.get_untracked();
        let slug = slug.trim();
        if !slug.is_empty() && !is_valid_slug(slug) {
            self.error.set(Some(format!(
                "Slug must be {SLUG_MIN_LEN}-{SLUG_MAX_LEN} characters of a-z, 0-9 or -"
            )));
            return false;
        }
        let v = self.visibility.get_untracked();
        let req = CreateShareRequest {
            custom_slug: Some(slug.to_string()).filter(|s| !s.is_empty()),
            show_transcription: Some(v.show_transcription),
            show_summary: Some(v.show_summary),
            show_key_points: Some(v.show_key_points),
        };

        self.is_saving.set(true);
        self.error.set(None);
        let ok = match self.api.get_untracked().create_share(&self.lecture_id(), &req).await {
            Ok(res) => {
                tracing::info!("share created: {}", res.share.slug);
                self.accept(res.share);
                true
            }
            Err(e) => {
                self.error.set(Some(e.to_string()));
                false
            }
        };
        self.is_saving.set(false);
        ok
    }

    pub async fn update(self, visibility: ShareVisibility) -> bool {
        if self.share.with_untracked(|s| s.is_none()) {
            return false;
        }
        self.visibility.set(visibility);
        let req = UpdateShareRequest {
            is_public: Some(visibility.is_public),
            show_transcription: Some(visibility.show_transcription),
            show_summary: Some(visibility.show_summary),
            show_key_points: Some(visibility.show_key_points),
        };

        self.is_saving.set(true);
        self.error.set(None);
        let ok = match self.api.get_untracked().update_share(&self.lecture_id(), &req).await {
            Ok(res) => {
                self.accept(res.share);
                true
            }
            Err(e) => {
                self.error.set(Some(e.to_string()));
                false
            }
        };
        self.is_saving.set(false);
        ok
    }

    pub async fn delete(self) -> bool {
        if self.share.with_untracked(|s| s.is_none()) {
            return false;
        }
        self.is_deleting.set(true);
        self.error.set(None);
        let ok = match self.api.get_untracked().delete_share(&self.lecture_id()).await {
            Ok(()) => {
                self.share.set(None);
                self.visibility.set(ShareVisibility::default());
                true
            }
            Err(e) => {
                self.error.set(Some(e.to_string()));
                false
            }
        };
        self.is_deleting.set(false);
        ok
    }

    pub fn web_url(&self) -> Option<String> {
        self.share
            .with(|s| s.as_ref().map(|s| web_share_url(&config::page_origin(), &s.slug)))
    }

    pub fn telegram_url(&self) -> Option<String> {
        self.share
            .with(|s| s.as_ref().map(|s| telegram_share_url(config::bot_username(), &s.slug)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_slug_lowercases_and_strips() {
        assert_eq!(sanitize_slug("My Talk_2024!"), "mytalk2024");
        assert_eq!(sanitize_slug("intro-to-rust"), "intro-to-rust");
        assert_eq!(sanitize_slug("Привет-abc"), "-abc");
    }

    #[test]
    fn test_slug_length_bounds() {
        assert!(!is_valid_slug("ab"));
        assert!(is_valid_slug("abc"));
        assert!(is_valid_slug(&"a".repeat(50)));
        assert!(!is_valid_slug(&"a".repeat(51)));
        assert!(!is_valid_slug("Abc"));
        assert!(!is_valid_slug("a b c"));
    }

    #[test]
    fn test_share_urls() {
        assert_eq!(
            web_share_url("https://app.example.com", "my-talk"),
            "https://app.example.com?share=my-talk"
        );
        assert_eq!(
            telegram_share_url("uznotes_bot", "my-talk"),
            "https://t.me/uznotes_bot?startapp=share_my-talk"
        );
    }

    #[test]
    fn test_visibility_defaults_to_everything_shown() {
        let v = ShareVisibility::default();
        assert!(v.is_public && v.show_transcription && v.show_summary && v.show_key_points);
    }
}
