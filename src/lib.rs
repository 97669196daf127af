mod api;
mod app;
mod components;
mod config;
mod deeplink;
mod google;
mod logging;
mod models;
mod pages;
mod session;
mod state;
mod storage;
mod telegram;
mod upload;
mod util;

pub use app::App;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    logging::init();
    tracing::info!("lecture notes client {}", env!("CARGO_PKG_VERSION"));
    leptos::mount::mount_to_body(App);
}
