use crate::models::AuthTokens;
use serde::{Deserialize, Serialize};

pub(crate) const ACCESS_TOKEN_KEY: &str = "accessToken";
pub(crate) const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub(crate) const API_URL_KEY: &str = "apiUrl";
pub(crate) const VIEW_STATE_KEY: &str = "view-storage";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn load_string(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

pub(crate) fn save_string(key: &str, value: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(key, value);
    }
}

pub(crate) fn remove_key(key: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(key);
    }
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let json = load_string(key)?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        save_string(key, &json);
    }
}

pub(crate) fn load_access_token() -> Option<String> {
    load_string(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty())
}

pub(crate) fn save_tokens(tokens: &AuthTokens) {
    save_string(ACCESS_TOKEN_KEY, &tokens.access_token);
    save_string(REFRESH_TOKEN_KEY, &tokens.refresh_token);
}

/// Both tokens always go together; a half-cleared pair is never left behind.
pub(crate) fn clear_tokens() {
    remove_key(ACCESS_TOKEN_KEY);
    remove_key(REFRESH_TOKEN_KEY);
}

pub(crate) fn load_api_url() -> Option<String> {
    load_string(API_URL_KEY)
}

pub(crate) fn save_api_url(url: &str) {
    save_string(API_URL_KEY, url);
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_token_pair_roundtrip_and_clear() {
        clear_tokens();
        assert!(load_access_token().is_none());

        save_tokens(&AuthTokens {
            access_token: "a1".to_string(),
            refresh_token: "r1".to_string(),
        });
        assert_eq!(load_access_token().as_deref(), Some("a1"));
        assert_eq!(load_string(REFRESH_TOKEN_KEY).as_deref(), Some("r1"));

        clear_tokens();
        assert!(load_access_token().is_none());
        assert!(load_string(REFRESH_TOKEN_KEY).is_none());
    }

    #[wasm_bindgen_test]
    fn test_json_roundtrip() {
        save_json_to_storage("lecture-notes-test", &vec![1u32, 2, 3]);
        let loaded: Option<Vec<u32>> = load_json_from_storage("lecture-notes-test");
        assert_eq!(loaded, Some(vec![1, 2, 3]));
        remove_key("lecture-notes-test");
    }
}
