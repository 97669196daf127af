use crate::deeplink::DeepLink;
use crate::storage::{load_json_from_storage, save_json_to_storage, VIEW_STATE_KEY};
use leptos::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub(crate) enum View {
    #[default]
    Home,
    Upload,
    Lectures,
    Folders,
    Settings,
    LectureDetail,
    SharedLecture,
}

impl View {
    /// Full-screen views render without the sidebar/tab-bar layout.
    pub fn is_standalone(self) -> bool {
        matches!(self, Self::LectureDetail | Self::SharedLecture)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ViewState {
    pub current_view: View,
    pub previous_view: Option<View>,
    pub selected_lecture_id: Option<String>,
    pub shared_slug: Option<String>,
    pub sidebar_open: bool,
}

impl ViewState {
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        self.sidebar_open = false;
        if view != View::LectureDetail {
            self.selected_lecture_id = None;
        }
        if view != View::SharedLecture {
            self.shared_slug = None;
        }
    }

    pub fn open_lecture_detail(&mut self, lecture_id: String) {
        self.previous_view = Some(self.current_view);
        self.current_view = View::LectureDetail;
        self.selected_lecture_id = Some(lecture_id);
        self.sidebar_open = false;
    }

    pub fn open_shared_lecture(&mut self, slug: String) {
        self.previous_view = Some(self.current_view);
        self.current_view = View::SharedLecture;
        self.shared_slug = Some(slug);
        self.sidebar_open = false;
    }

    /// Lecture links open even without a session; the auth gate shows
    /// sign-in first and the persisted detail view opens afterwards.
    pub fn follow_link(&mut self, link: DeepLink) {
        match link {
            DeepLink::SharedLecture(slug) => self.open_shared_lecture(slug),
            DeepLink::Lecture(id) => self.open_lecture_detail(id),
        }
    }

    /// One level of history only.
    pub fn go_back(&mut self) {
        self.current_view = self.previous_view.take().unwrap_or_default();
        self.selected_lecture_id = None;
        self.shared_slug = None;
    }

    pub fn to_persisted(&self) -> PersistedView {
        PersistedView {
            current_view: self.current_view,
            previous_view: self.previous_view,
            selected_lecture_id: self.selected_lecture_id.clone(),
        }
    }

    /// The shared slug is never persisted, so a restored shared view (or a
    /// detail view without its id) falls back to home.
    pub fn from_persisted(p: PersistedView) -> Self {
        let mut state = Self {
            current_view: p.current_view,
            previous_view: p.previous_view,
            selected_lecture_id: p.selected_lecture_id,
            shared_slug: None,
            sidebar_open: false,
        };
        let orphaned = match state.current_view {
            View::SharedLecture => true,
            View::LectureDetail => state.selected_lecture_id.is_none(),
            _ => false,
        };
        if orphaned {
            state.current_view = View::Home;
            state.previous_view = None;
            state.selected_lecture_id = None;
        }
        state
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PersistedView {
    pub current_view: View,
    #[serde(default)]
    pub previous_view: Option<View>,
    #[serde(default)]
    pub selected_lecture_id: Option<String>,
}

/// Stored shape: `{ "state": {...}, "version": 0 }`.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct PersistedEnvelope {
    state: PersistedView,
    #[serde(default)]
    version: u32,
}

#[derive(Clone, Copy)]
pub(crate) struct ViewStore {
    pub state: RwSignal<ViewState>,
}

impl ViewStore {
    pub fn new() -> Self {
        let restored = load_json_from_storage::<PersistedEnvelope>(VIEW_STATE_KEY)
            .map(|env| ViewState::from_persisted(env.state))
            .unwrap_or_default();
        Self {
            state: RwSignal::new(restored),
        }
    }

    fn apply(&self, f: impl FnOnce(&mut ViewState)) {
        self.state.update(f);
        let persisted = self.state.with_untracked(|s| s.to_persisted());
        save_json_to_storage(
            VIEW_STATE_KEY,
            &PersistedEnvelope {
                state: persisted,
                version: 0,
            },
        );
    }

    pub fn current(&self) -> View {
        self.state.with(|s| s.current_view)
    }

    pub fn selected_lecture_id(&self) -> Option<String> {
        self.state.with(|s| s.selected_lecture_id.clone())
    }

    pub fn shared_slug(&self) -> Option<String> {
        self.state.with(|s| s.shared_slug.clone())
    }

    pub fn sidebar_open(&self) -> bool {
        self.state.with(|s| s.sidebar_open)
    }

    pub fn set_view(&self, view: View) {
        tracing::debug!("navigate to {}", view);
        self.apply(|s| s.set_view(view));
    }

    pub fn open_lecture_detail(&self, lecture_id: String) {
        self.apply(|s| s.open_lecture_detail(lecture_id));
    }

    pub fn follow_link(&self, link: DeepLink) {
        tracing::info!("following link {:?}", link);
        self.apply(|s| s.follow_link(link));
    }

    pub fn go_back(&self) {
        self.apply(ViewState::go_back);
    }

    // Sidebar state is transient; no persistence round trip.
    pub fn open_sidebar(&self) {
        self.state.update(|s| s.sidebar_open = true);
    }

    pub fn close_sidebar(&self) {
        self.state.update(|s| s.sidebar_open = false);
    }

    pub fn toggle_sidebar(&self) {
        self.state.update(|s| s.sidebar_open = !s.sidebar_open);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_preserves_prior_view_for_one_go_back() {
        let mut s = ViewState::default();
        s.set_view(View::Lectures);
        s.open_lecture_detail("lec-1".into());
        assert_eq!(s.current_view, View::LectureDetail);
        assert_eq!(s.selected_lecture_id.as_deref(), Some("lec-1"));

        s.go_back();
        assert_eq!(s.current_view, View::Lectures);
        assert!(s.selected_lecture_id.is_none());
        assert!(s.previous_view.is_none());

        s.go_back();
        assert_eq!(s.current_view, View::Home);
    }

    #[test]
    fn test_go_back_without_history_goes_home() {
        let mut s = ViewState::default();
        s.set_view(View::Settings);
        s.go_back();
        assert_eq!(s.current_view, View::Home);
    }

    #[test]
    fn test_set_view_clears_selection_and_slug() {
        let mut s = ViewState::default();
        s.open_shared_lecture("talk".into());
        s.sidebar_open = true;
        s.set_view(View::Folders);
        assert!(s.shared_slug.is_none());
        assert!(!s.sidebar_open);

        s.open_lecture_detail("a".into());
        s.set_view(View::LectureDetail);
        assert_eq!(s.selected_lecture_id.as_deref(), Some("a"));
        s.set_view(View::Upload);
        assert!(s.selected_lecture_id.is_none());
    }

    #[test]
    fn test_shared_lecture_remembers_previous() {
        let mut s = ViewState::default();
        s.set_view(View::Upload);
        s.open_shared_lecture("my-talk".into());
        assert_eq!(s.previous_view, Some(View::Upload));
        s.go_back();
        assert_eq!(s.current_view, View::Upload);
        assert!(s.shared_slug.is_none());
    }

    #[test]
    fn test_persisted_shape_excludes_transient_fields() {
        let mut s = ViewState::default();
        s.set_view(View::Lectures);
        s.open_lecture_detail("x".into());
        s.sidebar_open = true;

        let json = serde_json::to_value(s.to_persisted()).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "currentView": "lecture-detail",
                "previousView": "lectures",
                "selectedLectureId": "x"
            })
        );
    }

    #[test]
    fn test_restore_round_trip_and_orphans() {
        let restored = ViewState::from_persisted(PersistedView {
            current_view: View::LectureDetail,
            previous_view: Some(View::Lectures),
            selected_lecture_id: Some("x".into()),
        });
        assert_eq!(restored.current_view, View::LectureDetail);
        assert_eq!(restored.previous_view, Some(View::Lectures));

        let shared = ViewState::from_persisted(PersistedView {
            current_view: View::SharedLecture,
            previous_view: Some(View::Home),
            selected_lecture_id: None,
        });
        assert_eq!(shared.current_view, View::Home);
        assert!(shared.previous_view.is_none());
    }

    #[test]
    fn test_lecture_link_survives_sign_in() {
        let link = crate::deeplink::resolve(None, None, Some("lec-7"))
            .target()
            .expect("lecture link");
        let mut s = ViewState::default();
        s.follow_link(link);
        assert_eq!(s.current_view, View::LectureDetail);

        // Signing in reloads nothing; the persisted view still points at the lecture.
        let restored = ViewState::from_persisted(s.to_persisted());
        assert_eq!(restored.current_view, View::LectureDetail);
        assert_eq!(restored.selected_lecture_id.as_deref(), Some("lec-7"));
        assert_eq!(restored.previous_view, Some(View::Home));
    }

    #[test]
    fn test_start_param_share_link_opens_shared_view() {
        let link = crate::deeplink::resolve(Some("share_talk"), None, None)
            .target()
            .expect("share link");
        let mut s = ViewState::default();
        s.set_view(View::Lectures);
        s.follow_link(link);
        assert_eq!(s.current_view, View::SharedLecture);
        assert_eq!(s.shared_slug.as_deref(), Some("talk"));
        assert_eq!(s.previous_view, Some(View::Lectures));
    }

    #[test]
    fn test_corrupt_entry_is_rejected() {
        let parsed = serde_json::from_str::<PersistedEnvelope>(r#"{"state": {"currentView": "nowhere"}}"#);
        assert!(parsed.is_err());
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::storage::remove_key;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_view_store_persists_and_restores() {
        remove_key(VIEW_STATE_KEY);
        let store = ViewStore::new();
        store.set_view(View::Folders);
        store.open_lecture_detail("lec-7".into());

        let again = ViewStore::new();
        assert_eq!(again.current(), View::LectureDetail);
        assert_eq!(again.selected_lecture_id().as_deref(), Some("lec-7"));
        remove_key(VIEW_STATE_KEY);
    }
}
