use super::confirm;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, ErrorAlert, Label, Modal, ModalBody, ModalFooter, Spinner,
};
use crate::state::{AppContext, ShareStore, ShareVisibility};
use crate::telegram;
use gloo_timers::future::TimeoutFuture;
use icons::{Check, Link, Trash2};
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen_futures::JsFuture;

const COPIED_RESET_MS: u32 = 2_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VisibilityField {
    Public,
    Transcription,
    Summary,
    KeyPoints,
}

impl VisibilityField {
    const SECTIONS: [VisibilityField; 3] = [Self::Transcription, Self::Summary, Self::KeyPoints];

    fn label(self) -> &'static str {
        match self {
            Self::Public => "Anyone with the link can view",
            Self::Transcription => "Show transcript",
            Self::Summary => "Show summary",
            Self::KeyPoints => "Show key points",
        }
    }

    fn get(self, v: &ShareVisibility) -> bool {
        match self {
            Self::Public => v.is_public,
            Self::Transcription => v.show_transcription,
            Self::Summary => v.show_summary,
            Self::KeyPoints => v.show_key_points,
        }
    }

    fn flipped(self, mut v: ShareVisibility) -> ShareVisibility {
        match self {
            Self::Public => v.is_public = !v.is_public,
            Self::Transcription => v.show_transcription = !v.show_transcription,
            Self::Summary => v.show_summary = !v.show_summary,
            Self::KeyPoints => v.show_key_points = !v.show_key_points,
        }
        v
    }
}

fn switch_class(on: bool) -> &'static str {
    if on {
        "relative inline-flex h-6 w-10 shrink-0 items-center rounded-full bg-primary transition-colors"
    } else {
        "relative inline-flex h-6 w-10 shrink-0 items-center rounded-full bg-muted transition-colors"
    }
}

fn knob_class(on: bool) -> &'static str {
    if on {
        "inline-block size-5 translate-x-[18px] rounded-full bg-white shadow transition-transform"
    } else {
        "inline-block size-5 translate-x-0.5 rounded-full bg-white shadow transition-transform"
    }
}

/// Before a share exists toggles only edit the draft; afterwards each
/// toggle is saved right away.
#[component]
fn VisibilityToggle(store: ShareStore, field: VisibilityField) -> impl IntoView {
    let on = Signal::derive(move || store.visibility.with(|v| field.get(v)));
    let on_toggle = move |_| {
        let next = field.flipped(store.visibility.get_untracked());
        if store.share.with_untracked(|s| s.is_some()) {
            spawn_local(async move {
                store.update(next).await;
            });
        } else {
            store.visibility.set(next);
        }
    };

    view! {
        <label class="flex items-center justify-between gap-3 py-1">
            <span class="text-sm">{field.label()}</span>
            <button
                type="button"
                role="switch"
                class=move || switch_class(on.get())
                aria-checked=move || on.get().to_string()
                disabled=move || store.is_saving.get()
                on:click=on_toggle
            >
                <span class=move || knob_class(on.get()) />
            </button>
        </label>
    }
}

#[component]
pub fn ShareModal(open: RwSignal<bool>, lecture_id: String) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let lectures = app_state.0.lectures;
    let store = ShareStore::new(app_state.0.api_client, lecture_id);
    let copied: RwSignal<bool> = RwSignal::new(false);

    Effect::new(move |_| {
        if open.get() {
            spawn_local(store.load());
        }
    });

    let has_share = move || store.share.with(|s| s.is_some());

    let on_copy = move |_| {
        let Some(url) = store.web_url() else {
            return;
        };
        let Some(window) = web_sys::window() else {
            return;
        };
        let promise = window.navigator().clipboard().write_text(&url);
        spawn_local(async move {
            match JsFuture::from(promise).await {
                Ok(_) => {
                    copied.set(true);
                    TimeoutFuture::new(COPIED_RESET_MS).await;
                    copied.set(false);
                }
                Err(e) => tracing::warn!("clipboard write failed: {:?}", e),
            }
        });
    };

    let on_telegram = move |_| {
        let Some(url) = store.telegram_url() else {
            return;
        };
        let title = lectures
            .selected
            .with_untracked(|l| l.as_ref().map(|l| l.display_title().to_string()))
            .unwrap_or_default();
        telegram::share_url(&url, &title);
    };

    let on_check = move |_| {
        spawn_local(async move {
            store.check_slug().await;
        });
    };

    let on_create = move |_| {
        spawn_local(async move {
            store.create().await;
        });
    };

    let on_delete = move |_| {
        if !confirm("Stop sharing? The link will stop working.") {
            return;
        }
        spawn_local(async move {
            store.delete().await;
        });
    };

    let slug_hint = move || match store.slug_available.get() {
        Some(true) => Some(("text-xs text-emerald-600", "Available")),
        Some(false) => Some(("text-xs text-destructive", "Already taken")),
        None => None,
    };

    view! {
        <Modal open=open title="Share recording">
            <ModalBody>
                <ErrorAlert error=store.error />

                <Show
                    when=move || !store.is_loading.get()
                    fallback=|| view! {
                        <div class="flex justify-center py-8">
                            <Spinner class="size-6" />
                        </div>
                    }
                >
                    <Show
                        when=has_share
                        fallback=move || view! {
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="share-slug">"Custom link (optional)"</Label>
                                <div class="flex gap-2">
                                    <input
                                        id="share-slug"
                                        class="border-input h-10 min-w-0 flex-1 rounded-xl border bg-transparent px-3 text-sm"
                                        placeholder="my-talk"
                                        prop:value=move || store.custom_slug.get()
                                        on:input=move |ev| store.set_custom_slug(&event_target_value(&ev))
                                    />
                                    <Button
                                        variant=ButtonVariant::Outline
                                        attr:disabled=move || store.custom_slug.with(|s| s.is_empty())
                                        on:click=on_check
                                    >
                                        "Check"
                                    </Button>
                                </div>
                                {move || slug_hint().map(|(class, text)| view! { <span class=class>{text}</span> })}
                            </div>
                        }
                    >
                        <div class="flex flex-col gap-2">
                            <div class="flex items-center gap-2 rounded-xl border p-2">
                                <Link class="size-4 shrink-0 text-muted-foreground" />
                                <span class="min-w-0 flex-1 truncate text-sm">
                                    {move || store.web_url().unwrap_or_default()}
                                </span>
                                <Button size=ButtonSize::Sm variant=ButtonVariant::Outline on:click=on_copy>
                                    <Show when=move || copied.get() fallback=|| "Copy">
                                        <Check />
                                        "Copied"
                                    </Show>
                                </Button>
                            </div>
                            <Button variant=ButtonVariant::Telegram on:click=on_telegram>
                                "Share in Telegram"
                            </Button>
                        </div>
                        <VisibilityToggle store=store field=VisibilityField::Public />
                    </Show>

                    <div class="flex flex-col">
                        {VisibilityField::SECTIONS
                            .into_iter()
                            .map(|field| view! { <VisibilityToggle store=store field=field /> })
                            .collect_view()}
                    </div>
                </Show>
            </ModalBody>

            <ModalFooter>
                <Show
                    when=has_share
                    fallback=move || view! {
                        <Button variant=ButtonVariant::Outline on:click=move |_| open.set(false)>
                            "Cancel"
                        </Button>
                        <Button attr:disabled=move || store.is_saving.get() on:click=on_create>
                            <Show when=move || store.is_saving.get()>
                                <Spinner />
                            </Show>
                            "Create link"
                        </Button>
                    }
                >
                    <Button
                        variant=ButtonVariant::Destructive
                        attr:disabled=move || store.is_deleting.get()
                        on:click=on_delete
                    >
                        <Trash2 />
                        "Stop sharing"
                    </Button>
                    <Button on:click=move |_| open.set(false)>"Done"</Button>
                </Show>
            </ModalFooter>
        </Modal>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flipped_touches_only_its_field() {
        let v = ShareVisibility::default();
        let next = VisibilityField::Summary.flipped(v);
        assert!(!next.show_summary);
        assert!(next.show_transcription && next.show_key_points && next.is_public);
        assert_eq!(VisibilityField::Summary.flipped(next), v);
    }

    #[test]
    fn test_public_is_not_a_section_toggle() {
        assert!(!VisibilityField::SECTIONS.contains(&VisibilityField::Public));
    }
}
