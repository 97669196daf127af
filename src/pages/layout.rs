use crate::state::{AppContext, View};
use icons::{FileText, Folder, House, LogOut, Menu, Mic, Settings, X};
use leptos::ev;
use leptos::prelude::*;
use leptos_dom::helpers::window_event_listener;
use wasm_bindgen::JsCast;

const SIDEBAR_ITEMS: [(View, &str); 5] = [
    (View::Home, "Home"),
    (View::Lectures, "My lectures"),
    (View::Folders, "Folders"),
    (View::Upload, "New recording"),
    (View::Settings, "Settings"),
];

const TAB_ITEMS: [(View, &str); 4] = [
    (View::Home, "Home"),
    (View::Lectures, "Lectures"),
    (View::Folders, "Folders"),
    (View::Settings, "Settings"),
];

fn nav_icon(view: View) -> AnyView {
    match view {
        View::Lectures => view! { <FileText class="size-5" /> }.into_any(),
        View::Folders => view! { <Folder class="size-5" /> }.into_any(),
        View::Upload => view! { <Mic class="size-5" /> }.into_any(),
        View::Settings => view! { <Settings class="size-5" /> }.into_any(),
        _ => view! { <House class="size-5" /> }.into_any(),
    }
}

fn title_for(view: View) -> &'static str {
    match view {
        View::Upload => "New recording",
        View::Lectures => "My lectures",
        View::Folders => "Folders",
        View::Settings => "Settings",
        _ => "Lecture Notes",
    }
}

#[component]
pub fn AppLayout(children: Children) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let view_store = app_state.0.view;
    let auth = app_state.0.auth;

    let user_name = move || auth.user.with(|u| u.as_ref().map(|u| u.display_name()));
    let avatar = move || {
        user_name()
            .and_then(|n| n.chars().next())
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_else(|| "U".to_string())
    };

    // Cmd/Ctrl+B toggles the sidebar unless the user is typing.
    let key_handle = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        let typing = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
            .is_some_and(|el| matches!(el.tag_name().to_lowercase().as_str(), "input" | "textarea" | "select"));
        if typing {
            return;
        }
        if (ev.meta_key() || ev.ctrl_key()) && ev.key().eq_ignore_ascii_case("b") {
            ev.prevent_default();
            view_store.toggle_sidebar();
        }
    });
    on_cleanup(move || key_handle.remove());

    view! {
        <div class="flex min-h-screen bg-background text-foreground">
            <Show when=move || view_store.sidebar_open()>
                <div
                    class="fixed inset-0 z-40 bg-black/40 md:hidden"
                    on:click=move |_| view_store.close_sidebar()
                />
            </Show>

            <aside class=move || {
                let base = "fixed inset-y-0 left-0 z-50 flex w-64 flex-col border-r bg-card transition-transform md:static md:translate-x-0";
                if view_store.sidebar_open() {
                    format!("{base} translate-x-0")
                } else {
                    format!("{base} -translate-x-full")
                }
            }>
                <div class="flex items-center justify-between px-4 py-4">
                    <span class="text-sm font-semibold">"Lecture Notes"</span>
                    <button
                        class="rounded-md p-1 text-muted-foreground md:hidden"
                        aria-label="Close menu"
                        on:click=move |_| view_store.close_sidebar()
                    >
                        <X class="size-5" />
                    </button>
                </div>

                <nav class="flex flex-1 flex-col gap-1 px-2">
                    {SIDEBAR_ITEMS
                        .into_iter()
                        .map(|(target, label)| {
                            let class = move || {
                                if view_store.current() == target {
                                    "flex items-center gap-3 rounded-lg bg-accent px-3 py-2 text-sm font-medium"
                                } else {
                                    "flex items-center gap-3 rounded-lg px-3 py-2 text-sm text-muted-foreground hover:bg-accent/50"
                                }
                            };
                            view! {
                                <button class=class on:click=move |_| view_store.set_view(target)>
                                    {nav_icon(target)}
                                    <span>{label}</span>
                                </button>
                            }
                        })
                        .collect_view()}
                </nav>

                <Show when=move || user_name().is_some()>
                    <div class="flex items-center gap-3 border-t px-4 py-3">
                        <div class="flex size-8 items-center justify-center rounded-full bg-primary text-sm font-semibold text-primary-foreground">
                            {avatar}
                        </div>
                        <span class="min-w-0 flex-1 truncate text-sm">{move || user_name().unwrap_or_default()}</span>
                        <button
                            class="rounded-md p-1 text-muted-foreground hover:text-foreground"
                            aria-label="Sign out"
                            on:click=move |_| auth.logout()
                        >
                            <LogOut class="size-4" />
                        </button>
                    </div>
                </Show>
            </aside>

            <div class="flex min-w-0 flex-1 flex-col">
                <header class="sticky top-0 z-30 flex items-center gap-3 border-b bg-background/90 px-4 pb-3 pt-[calc(0.75rem+var(--tg-content-safe-area-inset-top,0px))] backdrop-blur">
                    <button
                        class="rounded-md p-1 text-muted-foreground md:hidden"
                        aria-label="Open menu"
                        on:click=move |_| view_store.open_sidebar()
                    >
                        <Menu class="size-5" />
                    </button>
                    <h1 class="text-base font-semibold">{move || title_for(view_store.current())}</h1>
                </header>

                <main class="flex-1 px-4 pb-24 pt-4 md:pb-8">{children()}</main>
            </div>

            <nav class="fixed inset-x-0 bottom-0 z-30 border-t bg-background/95 backdrop-blur md:hidden">
                <div class="mx-auto flex max-w-md justify-around py-1 pb-[max(env(safe-area-inset-bottom),0.25rem)]">
                    {TAB_ITEMS
                        .into_iter()
                        .map(|(target, label)| {
                            let class = move || {
                                if view_store.current() == target {
                                    "flex flex-col items-center gap-0.5 px-3 py-1 text-[11px] text-primary"
                                } else {
                                    "flex flex-col items-center gap-0.5 px-3 py-1 text-[11px] text-muted-foreground"
                                }
                            };
                            view! {
                                <button class=class on:click=move |_| view_store.set_view(target)>
                                    {nav_icon(target)}
                                    <span>{label}</span>
                                </button>
                            }
                        })
                        .collect_view()}
                </div>
            </nav>
        </div>
    }
}
