use crate::api::{ApiClient, ApiResult};
use crate::models::{AuthPayload, User};
use crate::telegram;
use leptos::prelude::*;

#[derive(Clone, Copy)]
pub(crate) struct AuthStore {
    api: RwSignal<ApiClient>,
    pub user: RwSignal<Option<User>>,
    pub is_authenticated: RwSignal<bool>,
    pub is_loading: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
    pub is_telegram_auth: RwSignal<bool>,
    pub is_new_user: RwSignal<bool>,
    initialized: RwSignal<bool>,
}

impl AuthStore {
    pub fn new(api: RwSignal<ApiClient>) -> Self {
        let has_token = api.with_untracked(|c| c.is_authenticated());
        Self {
            api,
            user: RwSignal::new(None),
            is_authenticated: RwSignal::new(has_token),
            is_loading: RwSignal::new(false),
            error: RwSignal::new(None),
            is_telegram_auth: RwSignal::new(false),
            is_new_user: RwSignal::new(false),
            initialized: RwSignal::new(false),
        }
    }

    /// Drops the signed-in user; runs on every logout broadcast.
    pub fn reset_session(&self) {
        self.user.set(None);
        self.is_authenticated.set(false);
        self.error.set(None);
        self.is_telegram_auth.set(false);
        self.is_new_user.set(false);
    }

    fn accept(&self, payload: AuthPayload, via_telegram: bool) {
        tracing::info!(user_id = %payload.user.id, new_user = payload.is_new_user, "signed in");
        self.user.set(Some(payload.user));
        self.is_authenticated.set(true);
        self.is_new_user.set(payload.is_new_user);
        if via_telegram {
            self.is_telegram_auth.set(true);
        }
    }

    async fn sign_in(
        &self,
        attempt: impl std::future::Future<Output = ApiResult<AuthPayload>>,
        via_telegram: bool,
    ) -> bool {
        self.is_loading.set(true);
        self.error.set(None);
        let ok = match attempt.await {
            Ok(payload) => {
                self.accept(payload, via_telegram);
                true
            }
            Err(e) => {
                self.error.set(Some(e.to_string()));
                false
            }
        };
        self.is_loading.set(false);
        ok
    }

    /// Runs once per page load: tries Telegram sign-in before falling back
    /// to a stored token.
    pub async fn initialize(self) {
        if self.initialized.get_untracked() {
            return;
        }
        self.initialized.set(true);

        let api = self.api.get_untracked();

        if telegram::initialize() {
            if let Some(raw) = telegram::init_data_raw().filter(|r| !telegram::is_mock_init_data(r)) {
                self.is_loading.set(true);
                match api.telegram_auth(&raw).await {
                    Ok(payload) => {
                        self.accept(payload, true);
                        self.is_loading.set(false);
                        return;
                    }
                    Err(e) => tracing::warn!("Telegram auth failed, trying stored token: {}", e),
                }
                self.is_loading.set(false);
            }
        }

        if api.is_authenticated() {
            self.is_authenticated.set(true);
            match api.get_me().await {
                Ok(user) => self.user.set(Some(user)),
                Err(e) => {
                    tracing::info!("stored token rejected: {}", e);
                    api.logout();
                    self.is_authenticated.set(false);
                    self.user.set(None);
                }
            }
        }
    }

    pub async fn login_with_password(self, email: String, password: String) -> bool {
        let api = self.api.get_untracked();
        self.sign_in(api.login(&email, &password), false).await
    }

    pub async fn register(self, email: String, password: String) -> bool {
        let api = self.api.get_untracked();
        self.sign_in(api.register(&email, &password), false).await
    }

    pub async fn login_with_google(self, id_token: String) -> bool {
        let api = self.api.get_untracked();
        self.sign_in(api.google_auth(&id_token), false).await
    }

    pub async fn login_with_telegram(self) -> bool {
        let Some(raw) = telegram::init_data_raw() else {
            self.error.set(Some("Not running inside Telegram".to_string()));
            return false;
        };
        let api = self.api.get_untracked();
        self.sign_in(api.telegram_auth(&raw), true).await
    }

    /// Explicit sign-out goes through the same broadcast as a rejected
    /// session so every store drops its per-user state.
    pub fn logout(&self) {
        let api = self.api.get_untracked();
        api.logout();
        self.reset_session();
        api.events().emit_logout();
    }

    pub async fn fetch_user(self) {
        let api = self.api.get_untracked();
        if !api.is_authenticated() {
            return;
        }
        match api.get_me().await {
            Ok(user) => self.user.set(Some(user)),
            Err(e) => tracing::error!("Failed to fetch user: {}", e),
        }
    }

    pub fn clear_error(&self) {
        self.error.set(None);
    }
}
