mod auth;
mod config;
mod folders;
mod lectures;
mod linking;
mod poll;
mod share;
mod subscription;
mod tags;
mod upload;
mod view;

pub(crate) use auth::AuthStore;
pub(crate) use config::ConfigStore;
pub(crate) use folders::{flatten_tree, in_folder, unorganized, FoldersStore};
pub(crate) use lectures::{LectureFilter, LecturesStore, StatusFilter};
pub(crate) use linking::{LinkingStore, Provider};
pub(crate) use share::{ShareStore, ShareVisibility};
pub(crate) use subscription::SubscriptionStore;
pub(crate) use tags::{TagsStore, DEFAULT_COLOR, PRESET_COLORS};
pub(crate) use upload::UploadStore;
pub(crate) use view::{View, ViewStore};

use crate::api::ApiClient;
use crate::session::SessionEvents;
use crate::util::time_string;
use leptos::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LogKind {
    Info,
    Success,
    Error,
}

/// A line in the upload and connection logs.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LogEntry {
    pub time: String,
    pub message: String,
    pub kind: LogKind,
}

impl LogEntry {
    pub fn now(message: String, kind: LogKind) -> Self {
        Self {
            time: time_string(),
            message,
            kind,
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,
    pub view: ViewStore,
    pub auth: AuthStore,
    pub lectures: LecturesStore,
    pub folders: FoldersStore,
    pub tags: TagsStore,
    pub subscription: SubscriptionStore,
    pub upload: UploadStore,
    pub config: ConfigStore,
    pub linking: LinkingStore,
}

impl AppState {
    pub fn new() -> Self {
        let events = SessionEvents::new();
        let api_client = RwSignal::new(ApiClient::from_env(events.clone()));

        let state = Self {
            api_client,
            view: ViewStore::new(),
            auth: AuthStore::new(api_client),
            lectures: LecturesStore::new(api_client),
            folders: FoldersStore::new(api_client),
            tags: TagsStore::new(api_client),
            subscription: SubscriptionStore::new(api_client),
            upload: UploadStore::new(api_client),
            config: ConfigStore::new(api_client),
            linking: LinkingStore::new(api_client),
        };

        let (auth, lectures, folders, tags, subscription, upload, linking) = (
            state.auth,
            state.lectures,
            state.folders,
            state.tags,
            state.subscription,
            state.upload,
            state.linking,
        );
        events.on_logout(move || {
            auth.reset_session();
            lectures.reset();
            folders.reset();
            tags.reset();
            subscription.reset();
            upload.reset();
            linking.reset();
        });

        state
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::models::{AuthTokens, Folder, Lecture, MinutesBalance, User};
    use crate::storage;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn lecture(id: &str) -> Lecture {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": "Week 1",
            "originalFilename": "week1.mp3",
            "status": "transcribing",
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .expect("lecture")
    }

    #[wasm_bindgen_test]
    fn rejected_session_signs_out_every_store() {
        storage::save_tokens(&AuthTokens {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        });
        let state = AppState::new();

        state.auth.is_authenticated.set(true);
        state.auth.user.set(Some(
            serde_json::from_value::<User>(serde_json::json!({"id": "u1", "createdAt": ""}))
                .expect("user"),
        ));
        state.lectures.lectures.set(vec![lecture("l1")]);
        state.lectures.selected.set(Some(lecture("l1")));
        state.folders.folders.set(vec![serde_json::from_value::<Folder>(
            serde_json::json!({"id": "f1", "name": "Math"}),
        )
        .expect("folder")]);
        state.folders.selected_folder_id.set(Some("f1".to_string()));
        state.subscription.balance.set(Some(MinutesBalance {
            plan_minutes_remaining: 30.0,
            plan_minutes_total: 60.0,
            plan_minutes_used: 30.0,
            bonus_minutes: 0.0,
            total_available: 30.0,
            billing_cycle_start: String::new(),
            billing_cycle_end: String::new(),
            plan_name: "free".to_string(),
            plan_display_name: "Free".to_string(),
            status: "active".to_string(),
        }));
        state.upload.title.set("draft".to_string());

        state.api_client.get_untracked().reject_session();

        assert_eq!(storage::load_string(storage::ACCESS_TOKEN_KEY), None);
        assert_eq!(storage::load_string(storage::REFRESH_TOKEN_KEY), None);
        assert!(!state.auth.is_authenticated.get_untracked());
        assert!(state.auth.user.get_untracked().is_none());
        assert!(state.lectures.lectures.get_untracked().is_empty());
        assert!(state.lectures.selected.get_untracked().is_none());
        assert!(state.folders.folders.get_untracked().is_empty());
        assert!(state.folders.selected_folder_id.get_untracked().is_none());
        assert!(state.subscription.balance.get_untracked().is_none());
        assert!(state.upload.title.get_untracked().is_empty());
    }
}
