use crate::api::ApiClient;
use crate::models::LinkedAccountsStatus;
use crate::state::poll::{Deadline, PollGuard};
use crate::telegram;
use crate::util::now_ms;
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

pub(crate) const LINK_POLL_INTERVAL_MS: u32 = 3_000;
pub(crate) const LINK_POLL_LIMIT_MS: i64 = 5 * 60 * 1_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Provider {
    Google,
    Telegram,
}

#[derive(Clone, Copy)]
pub(crate) struct LinkingStore {
    api: RwSignal<ApiClient>,
    pub status: RwSignal<Option<LinkedAccountsStatus>>,
    pub is_loading: RwSignal<bool>,
    pub linking: RwSignal<Option<Provider>>,
    pub unlinking: RwSignal<Option<Provider>>,
    pub error: RwSignal<Option<String>>,
    poll: StoredValue<PollGuard>,
}

impl LinkingStore {
    pub fn new(api: RwSignal<ApiClient>) -> Self {
        Self {
            api,
            status: RwSignal::new(None),
            is_loading: RwSignal::new(false),
            linking: RwSignal::new(None),
            unlinking: RwSignal::new(None),
            error: RwSignal::new(None),
            poll: StoredValue::new(PollGuard::default()),
        }
    }

    pub async fn fetch_status(self) {
        self.is_loading.set(true);
        match self.api.get_untracked().get_linked_accounts_status().await {
            Ok(status) => {
                self.status.set(Some(status));
                self.error.set(None);
            }
            Err(e) => self.error.set(Some(e.to_string())),
        }
        self.is_loading.set(false);
    }

    /// Opens the bot deep link, then waits for the backend to report the
    /// Telegram account as linked. Gives up after five minutes.
    pub async fn link_telegram(self, on_linked: impl Fn() + 'static) {
        self.linking.set(Some(Provider::Telegram));
        self.error.set(None);

        let init = match self.api.get_untracked().init_telegram_link().await {
            Ok(init) => init,
            Err(e) => {
                self.error.set(Some(e.to_string()));
                self.linking.set(None);
                return;
            }
        };
        if !telegram::open_telegram_link(&init.deep_link) {
            telegram::open_in_new_window(&init.deep_link);
        }

        let ticket = self.poll.with_value(|p| p.begin());
        let deadline = Deadline::new(now_ms(), LINK_POLL_LIMIT_MS);
        spawn_local(async move {
            loop {
                TimeoutFuture::new(LINK_POLL_INTERVAL_MS).await;
                if !ticket.is_current() {
                    return;
                }
                if deadline.expired_at(now_ms()) {
                    tracing::info!("telegram linking timed out");
                    self.linking.set(None);
                    return;
                }

                let Ok(status) = self.api.get_untracked().get_linked_accounts_status().await
                else {
                    continue;
                };
                if !ticket.is_current() {
                    return;
                }
                let linked = status.telegram.linked;
                self.status.set(Some(status));
                if linked {
                    self.linking.set(None);
                    on_linked();
                    return;
                }
            }
        });
    }

    pub fn cancel_linking(&self) {
        self.poll.with_value(|p| p.cancel());
        self.linking.set(None);
    }

    pub async fn link_google(self, id_token: String) -> bool {
        self.linking.set(Some(Provider::Google));
        self.error.set(None);
        let api = self.api.get_untracked();
        let result = match api.init_google_link().await {
            Ok(init) => api.complete_google_link(&init.token, &id_token).await,
            Err(e) => Err(e),
        };
        let ok = match result {
            Ok(res) => {
                if res.merged {
                    tracing::info!("google link merged accounts: {}", res.message);
                }
                self.fetch_status().await;
                true
            }
            Err(e) => {
                self.error.set(Some(e.to_string()));
                false
            }
        };
        self.linking.set(None);
        ok
    }

    pub async fn unlink(self, provider: Provider) -> bool {
        self.unlinking.set(Some(provider));
        self.error.set(None);
        let api = self.api.get_untracked();
        let result = match provider {
            Provider::Google => api.unlink_google().await,
            Provider::Telegram => api.unlink_telegram().await,
        };
        let ok = match result {
            Ok(()) => {
                self.fetch_status().await;
                true
            }
            Err(e) => {
                self.error.set(Some(e.to_string()));
                false
            }
        };
        self.unlinking.set(None);
        ok
    }

    /// An account keeps at least one sign-in method.
    pub fn can_unlink(&self, provider: Provider) -> bool {
        self.status.with(|s| {
            s.as_ref().is_some_and(|s| match provider {
                Provider::Google => s.google.linked && s.telegram.linked,
                Provider::Telegram => s.telegram.linked && s.google.linked,
            })
        })
    }

    pub fn reset(&self) {
        self.cancel_linking();
        self.status.set(None);
        self.unlinking.set(None);
        self.error.set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_poll_stops_after_five_minutes() {
        let deadline = Deadline::new(1_000, LINK_POLL_LIMIT_MS);
        assert!(!deadline.expired_at(1_000 + 299_999));
        assert!(deadline.expired_at(1_000 + 300_000));
        assert_eq!(LINK_POLL_INTERVAL_MS, 3_000);
    }
}
