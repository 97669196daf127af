//! Bridge to the host `window.Telegram.WebApp` object.
//!
//! Every call degrades to a no-op when the page is not running inside
//! Telegram, so callers never branch on the environment themselves.

use crate::util::{js_call as call, js_get as get};
use serde::Deserialize;
use std::cell::RefCell;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

const TEST_USER_ID: &str = "\"id\":12345678";

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub is_premium: Option<bool>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub(crate) struct SafeAreaInsets {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub right: f64,
}

thread_local! {
    static BACK_HANDLER: RefCell<Option<Closure<dyn FnMut()>>> = const { RefCell::new(None) };
    static MAIN_HANDLER: RefCell<Option<Closure<dyn FnMut()>>> = const { RefCell::new(None) };
}

fn web_app() -> Option<JsValue> {
    let window: JsValue = web_sys::window()?.into();
    let telegram = get(&window, "Telegram")?;
    get(&telegram, "WebApp")
}

fn call_app(method: &str, args: &[JsValue]) -> Option<JsValue> {
    call(&web_app()?, method, args)
}

/// Decode a plain JS object through its JSON form.
fn from_js<T: for<'de> Deserialize<'de>>(value: &JsValue) -> Option<T> {
    let json = js_sys::JSON::stringify(value).ok()?.as_string()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn init_data_raw() -> Option<String> {
    get(&web_app()?, "initData")?
        .as_string()
        .filter(|s| !s.is_empty())
}

/// Inside Telegram the host always supplies signed init data.
pub(crate) fn is_telegram_environment() -> bool {
    init_data_raw().is_some()
}

/// Development shims inject fake init data that the backend would reject.
pub(crate) fn is_mock_init_data(raw: &str) -> bool {
    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    decoded.contains("mock") || decoded.contains(TEST_USER_ID)
}

/// Signal readiness, expand to full height and expose theme colours.
/// Returns whether the host platform is present.
pub(crate) fn initialize() -> bool {
    if !is_telegram_environment() {
        tracing::info!("not running inside a Telegram Mini App");
        return false;
    }
    call_app("ready", &[]);
    call_app("expand", &[]);
    set_header_color("bg_color");
    set_background_color("bg_color");
    bind_theme_css_vars();
    bind_safe_area_css_vars();
    tracing::info!("Telegram WebApp initialized");
    true
}

pub(crate) fn user() -> Option<TelegramUser> {
    let unsafe_data = get(&web_app()?, "initDataUnsafe")?;
    from_js(&get(&unsafe_data, "user")?)
}

/// Start parameter from the host, else the `startapp` query parameter.
pub(crate) fn start_param() -> Option<String> {
    let from_host = web_app()
        .and_then(|app| get(&app, "initDataUnsafe"))
        .and_then(|d| get(&d, "start_param"))
        .and_then(|v| v.as_string())
        .filter(|s| !s.is_empty());
    if from_host.is_some() {
        return from_host;
    }

    let href = web_sys::window()?.location().href().ok()?;
    crate::deeplink::query_param(&href, "startapp")
}

pub(crate) fn safe_area_insets() -> SafeAreaInsets {
    web_app()
        .and_then(|app| get(&app, "safeAreaInset"))
        .and_then(|v| from_js(&v))
        .unwrap_or_default()
}

pub(crate) fn content_safe_area_insets() -> SafeAreaInsets {
    web_app()
        .and_then(|app| get(&app, "contentSafeAreaInset"))
        .and_then(|v| from_js(&v))
        .unwrap_or_default()
}

/// `bg_color` -> `--tg-theme-bg-color`
pub(crate) fn theme_css_var(key: &str) -> String {
    format!("--tg-theme-{}", key.replace('_', "-"))
}

fn root_style() -> Option<web_sys::CssStyleDeclaration> {
    web_sys::window()?
        .document()?
        .document_element()?
        .dyn_into::<web_sys::HtmlElement>()
        .ok()
        .map(|e| e.style())
}

/// Insets as `--tg-safe-area-inset-*` / `--tg-content-safe-area-inset-*` pixels.
fn bind_safe_area_css_vars() {
    let Some(style) = root_style() else {
        return;
    };
    for (prefix, insets) in [
        ("--tg-safe-area-inset", safe_area_insets()),
        ("--tg-content-safe-area-inset", content_safe_area_insets()),
    ] {
        for (side, px) in [
            ("top", insets.top),
            ("bottom", insets.bottom),
            ("left", insets.left),
            ("right", insets.right),
        ] {
            let _ = style.set_property(&format!("{prefix}-{side}"), &format!("{px}px"));
        }
    }
}

fn bind_theme_css_vars() {
    let Some(params) = web_app().and_then(|app| get(&app, "themeParams")) else {
        return;
    };
    let Some(style) = root_style() else {
        return;
    };

    let obj: &js_sys::Object = params.unchecked_ref();
    for key in js_sys::Object::keys(obj).iter() {
        let Some(key) = key.as_string() else { continue };
        if let Some(value) = get(&params, &key).and_then(|v| v.as_string()) {
            let _ = style.set_property(&theme_css_var(&key), &value);
        }
    }
}

pub(crate) fn show_back_button(on_click: impl FnMut() + 'static) {
    let Some(button) = web_app().and_then(|app| get(&app, "BackButton")) else {
        return;
    };
    hide_back_button();

    let closure = Closure::<dyn FnMut()>::new(on_click);
    call(&button, "onClick", &[closure.as_ref().clone()]);
    call(&button, "show", &[]);
    BACK_HANDLER.with(|h| *h.borrow_mut() = Some(closure));
}

pub(crate) fn hide_back_button() {
    let Some(button) = web_app().and_then(|app| get(&app, "BackButton")) else {
        return;
    };
    BACK_HANDLER.with(|h| {
        if let Some(closure) = h.borrow_mut().take() {
            call(&button, "offClick", &[closure.as_ref().clone()]);
        }
    });
    call(&button, "hide", &[]);
}

pub(crate) fn show_main_button(text: &str, on_click: impl FnMut() + 'static) {
    let Some(button) = web_app().and_then(|app| get(&app, "MainButton")) else {
        return;
    };
    hide_main_button();

    let params = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&params, &"text".into(), &text.into());
    let _ = js_sys::Reflect::set(&params, &"is_visible".into(), &true.into());
    let _ = js_sys::Reflect::set(&params, &"is_active".into(), &true.into());
    call(&button, "setParams", &[params.into()]);

    let closure = Closure::<dyn FnMut()>::new(on_click);
    call(&button, "onClick", &[closure.as_ref().clone()]);
    MAIN_HANDLER.with(|h| *h.borrow_mut() = Some(closure));
}

pub(crate) fn set_main_button_loading(loading: bool) {
    let Some(button) = web_app().and_then(|app| get(&app, "MainButton")) else {
        return;
    };
    if loading {
        call(&button, "showProgress", &[JsValue::FALSE]);
        call(&button, "disable", &[]);
    } else {
        call(&button, "hideProgress", &[]);
        call(&button, "enable", &[]);
    }
}

pub(crate) fn hide_main_button() {
    let Some(button) = web_app().and_then(|app| get(&app, "MainButton")) else {
        return;
    };
    MAIN_HANDLER.with(|h| {
        if let Some(closure) = h.borrow_mut().take() {
            call(&button, "offClick", &[closure.as_ref().clone()]);
        }
    });
    call(&button, "hide", &[]);
}

pub(crate) fn set_header_color(color: &str) {
    call_app("setHeaderColor", &[color.into()]);
}

pub(crate) fn set_background_color(color: &str) {
    call_app("setBackgroundColor", &[color.into()]);
}

/// Open a `t.me` link without closing the Mini App. False outside Telegram.
pub(crate) fn open_telegram_link(url: &str) -> bool {
    is_telegram_environment() && call_app("openTelegramLink", &[url.into()]).is_some()
}

pub(crate) fn share_fallback_url(url: &str, text: &str) -> String {
    format!(
        "https://t.me/share/url?url={}&text={}",
        urlencoding::encode(url),
        urlencoding::encode(text)
    )
}

/// Native share sheet inside Telegram; a new browser window elsewhere.
pub(crate) fn share_url(url: &str, text: &str) {
    let target = share_fallback_url(url, text);
    if open_telegram_link(&target) {
        return;
    }
    open_in_new_window(&target);
}

pub(crate) fn open_in_new_window(url: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.open_with_url_and_target(url, "_blank");
    }
}

pub(crate) fn close() {
    call_app("close", &[]);
}

pub(crate) fn generate_deep_link(bot_username: &str, start_param: &str) -> String {
    format!(
        "https://t.me/{}?startapp={}",
        bot_username,
        urlencoding::encode(start_param)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_init_data_detection() {
        assert!(is_mock_init_data("query_id=mock&user=%7B%7D"));
        assert!(is_mock_init_data(
            "user=%7B%22id%22%3A12345678%2C%22first_name%22%3A%22Test%22%7D&hash=abc"
        ));
        assert!(!is_mock_init_data(
            "user=%7B%22id%22%3A987654%7D&auth_date=1700000000&hash=f00"
        ));
    }

    #[test]
    fn test_theme_css_var_names() {
        assert_eq!(theme_css_var("bg_color"), "--tg-theme-bg-color");
        assert_eq!(theme_css_var("secondary_bg_color"), "--tg-theme-secondary-bg-color");
    }

    #[test]
    fn test_generate_deep_link_encodes_param() {
        assert_eq!(
            generate_deep_link("uznotes_bot", "share_my-talk"),
            "https://t.me/uznotes_bot?startapp=share_my-talk"
        );
        assert_eq!(
            generate_deep_link("bot", "a b"),
            "https://t.me/bot?startapp=a%20b"
        );
    }

    #[test]
    fn test_share_fallback_url() {
        assert_eq!(
            share_fallback_url("https://app.example.com?share=x", "Check this"),
            "https://t.me/share/url?url=https%3A%2F%2Fapp.example.com%3Fshare%3Dx&text=Check%20this"
        );
    }

    #[test]
    fn test_user_payload_parses() {
        let user: TelegramUser = serde_json::from_str(
            r#"{"id": 42, "first_name": "Aziz", "username": "aziz", "is_premium": true}"#,
        )
        .expect("user");
        assert_eq!(user.id, 42);
        assert_eq!(user.username.as_deref(), Some("aziz"));
        assert!(user.last_name.is_none());
    }
}
