use crate::api::ApiClient;
use crate::config::normalize_api_url;
use crate::state::{LogEntry, LogKind};
use crate::storage;
use leptos::prelude::*;

#[derive(Clone, Copy)]
pub(crate) struct ConfigStore {
    api: RwSignal<ApiClient>,
    pub api_url: RwSignal<String>,
    pub is_connected: RwSignal<bool>,
    pub is_testing: RwSignal<bool>,
    pub logs: RwSignal<Vec<LogEntry>>,
}

impl ConfigStore {
    pub fn new(api: RwSignal<ApiClient>) -> Self {
        let api_url = api.with_untracked(|c| c.base_url.clone());
        Self {
            api,
            api_url: RwSignal::new(api_url),
            is_connected: RwSignal::new(false),
            is_testing: RwSignal::new(false),
            logs: RwSignal::new(vec![]),
        }
    }

    /// Persists the new base URL and points the shared client at it.
    pub fn set_api_url(&self, url: &str) {
        let url = normalize_api_url(url);
        storage::save_api_url(&url);
        self.api.update(|c| *c = c.with_base_url(url.clone()));
        self.api_url.set(url);
        self.is_connected.set(false);
    }

    pub async fn test_connection(self) -> bool {
        self.is_testing.set(true);
        let api = self.api.get_untracked();
        let url = self.api_url.get_untracked();
        let ok = match api.test_connection().await {
            Ok(health) => {
                self.add_log(
                    format!("Connected to {url} - Status: {}", health.status),
                    LogKind::Success,
                );
                true
            }
            Err(e) => {
                tracing::warn!("health check against {} failed: {}", url, e);
                self.add_log(format!("Connection failed: {e}"), LogKind::Error);
                false
            }
        };
        self.is_connected.set(ok);
        self.is_testing.set(false);
        ok
    }

    pub fn add_log(&self, message: String, kind: LogKind) {
        self.logs.update(|logs| logs.push(LogEntry::now(message, kind)));
    }

    pub fn clear_logs(&self) {
        self.logs.set(vec![]);
    }
}
