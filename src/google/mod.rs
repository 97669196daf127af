//! Google Identity Services button, loaded on demand.

use crate::util::{js_call, js_get};
use std::cell::RefCell;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

const GSI_SCRIPT_SRC: &str = "https://accounts.google.com/gsi/client";

thread_local! {
    static ON_LOAD: RefCell<Option<Closure<dyn FnMut()>>> = const { RefCell::new(None) };
    static ON_CREDENTIAL: RefCell<Option<Closure<dyn FnMut(JsValue)>>> = const { RefCell::new(None) };
}

fn identity() -> Option<JsValue> {
    let window: JsValue = web_sys::window()?.into();
    let google = js_get(&window, "google")?;
    let accounts = js_get(&google, "accounts")?;
    js_get(&accounts, "id")
}

fn set(target: &js_sys::Object, key: &str, value: &JsValue) {
    let _ = js_sys::Reflect::set(target, &JsValue::from_str(key), value);
}

/// Renders the "Continue with Google" button into the element with
/// `container_id`. `on_credential` receives the ID token.
pub(crate) fn render_button(
    client_id: &'static str,
    container_id: &'static str,
    on_credential: impl FnMut(String) + 'static,
) {
    let mut on_credential = on_credential;
    let callback = Closure::<dyn FnMut(JsValue)>::new(move |response: JsValue| {
        match js_get(&response, "credential").and_then(|c| c.as_string()) {
            Some(token) => on_credential(token),
            None => tracing::warn!("Google sign-in returned no credential"),
        }
    });
    ON_CREDENTIAL.with(|c| *c.borrow_mut() = Some(callback));

    let mount = move || {
        let Some(id) = identity() else {
            tracing::error!("Google Identity Services unavailable");
            return;
        };
        let config = js_sys::Object::new();
        set(&config, "client_id", &client_id.into());
        ON_CREDENTIAL.with(|c| {
            if let Some(cb) = c.borrow().as_ref() {
                set(&config, "callback", cb.as_ref());
            }
        });
        js_call(&id, "initialize", &[config.into()]);

        let Some(container) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(container_id))
        else {
            return;
        };
        let options = js_sys::Object::new();
        for (k, v) in [
            ("theme", "outline"),
            ("size", "large"),
            ("type", "standard"),
            ("text", "continue_with"),
            ("shape", "pill"),
            ("logo_alignment", "left"),
        ] {
            set(&options, k, &v.into());
        }
        set(&options, "width", &JsValue::from_f64(300.0));
        js_call(&id, "renderButton", &[container.into(), options.into()]);
    };

    if identity().is_some() {
        mount();
        return;
    }
    load_script(mount);
}

fn load_script(on_load: impl FnMut() + 'static) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Ok(script) = document
        .create_element("script")
        .map(|e| e.unchecked_into::<web_sys::HtmlScriptElement>())
    else {
        return;
    };
    script.set_src(GSI_SCRIPT_SRC);
    script.set_async(true);

    let on_load = Closure::<dyn FnMut()>::new(on_load);
    script.set_onload(Some(on_load.as_ref().unchecked_ref()));
    ON_LOAD.with(|l| *l.borrow_mut() = Some(on_load));

    if let Some(head) = document.head() {
        let _ = head.append_child(&script);
    }
}
