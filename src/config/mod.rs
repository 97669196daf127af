use crate::storage::load_api_url;
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_LOCAL_API_URL: &str = "http://localhost:3000";
pub(crate) const DEFAULT_BOT_USERNAME: &str = "uznotes_bot";

/// Runtime configuration resolved once at startup.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        // 1) Settings page override.
        if let Some(url) = load_api_url().filter(|u| !u.trim().is_empty()) {
            return Self { api_url: url };
        }

        let Some(window) = web_sys::window() else {
            return Self {
                api_url: DEFAULT_LOCAL_API_URL.to_string(),
            };
        };

        // 2) Deploy-time injection: `window.ENV.API_URL` (or legacy `api_url`).
        if let Some(env) = window.get("ENV") {
            if !env.is_undefined() && env.is_object() {
                for key in ["API_URL", "api_url"] {
                    if let Ok(v) = js_sys::Reflect::get(&env, &key.into()) {
                        if let Some(url_str) = v.as_string() {
                            return Self { api_url: url_str };
                        }
                    }
                }
            }
        }

        // 3) Derived from the page host.
        let hostname = window.location().hostname().unwrap_or_default();
        Self {
            api_url: default_api_url_for_host(&hostname),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Local development talks to the backend directly; anywhere else (tunnels,
/// the Telegram webview) requests go same-origin through the dev proxy.
pub(crate) fn default_api_url_for_host(hostname: &str) -> String {
    match hostname {
        "localhost" | "127.0.0.1" => DEFAULT_LOCAL_API_URL.to_string(),
        _ => String::new(),
    }
}

pub(crate) fn page_origin() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

pub(crate) fn normalize_api_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

pub(crate) fn google_client_id() -> Option<&'static str> {
    option_env!("GOOGLE_CLIENT_ID").filter(|s| !s.is_empty())
}

pub(crate) fn bot_username() -> &'static str {
    option_env!("TELEGRAM_BOT_USERNAME")
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_BOT_USERNAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_api_url_for_localhost() {
        assert_eq!(default_api_url_for_host("localhost"), "http://localhost:3000");
        assert_eq!(default_api_url_for_host("127.0.0.1"), "http://localhost:3000");
    }

    #[test]
    fn test_default_api_url_relative_elsewhere() {
        assert_eq!(default_api_url_for_host("abc.ngrok-free.dev"), "");
    }

    #[test]
    fn test_normalize_api_url_trims_trailing_slash() {
        assert_eq!(normalize_api_url(" https://api.example.com/ "), "https://api.example.com");
        assert_eq!(normalize_api_url("https://api.example.com//"), "https://api.example.com");
    }
}
