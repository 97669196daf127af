use super::pill_class;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, ErrorAlert, Input, Label, LogView, ProgressBar, Spinner,
};
use crate::models::{Language, SummarizationType};
use crate::state::AppContext;
use crate::telegram;
use crate::util::format_bytes;
use icons::{Upload, X};
use leptos::prelude::*;
use leptos::task::spawn_local;
use strum::IntoEnumIterator;
use wasm_bindgen::JsCast;

fn first_file(files: Option<web_sys::FileList>) -> Option<web_sys::File> {
    files.and_then(|f| f.get(0))
}

fn type_hint(kind: SummarizationType) -> &'static str {
    match kind {
        SummarizationType::Lecture => "Lectures and meetings, split into chapters",
        SummarizationType::Custdev => "Customer interviews: pain points, suggestions, actions",
    }
}

#[component]
pub fn UploadPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let upload = app_state.0.upload;
    let lectures = app_state.0.lectures;
    let auth = app_state.0.auth;

    let dragging: RwSignal<bool> = RwSignal::new(false);

    let on_file_change = move |ev: web_sys::Event| {
        let input = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok());
        if let Some(file) = first_file(input.as_ref().and_then(|i| i.files())) {
            upload.set_file(Some(file));
        }
        // Allow picking the same file again after a reset.
        if let Some(input) = input {
            input.set_value("");
        }
    };

    let on_drop = move |ev: web_sys::DragEvent| {
        ev.prevent_default();
        dragging.set(false);
        if let Some(file) = first_file(ev.data_transfer().and_then(|dt| dt.files())) {
            upload.set_file(Some(file));
        }
    };

    let begin_upload = move || {
        upload.start_upload(move || {
            spawn_local(lectures.load_lectures(1));
        });
    };
    let on_upload = move |_| begin_upload();

    let can_upload = move || {
        auth.is_authenticated.get() && upload.file.with(|f| f.is_some()) && !upload.is_uploading.get()
    };

    // Inside Telegram the host's main button mirrors the upload button.
    if telegram::is_telegram_environment() {
        Effect::new(move |_| {
            if upload.file.with(|f| f.is_some()) {
                telegram::show_main_button("Upload", move || {
                    if can_upload() {
                        begin_upload();
                    }
                });
            } else {
                telegram::hide_main_button();
            }
        });
        Effect::new(move |_| telegram::set_main_button_loading(upload.is_uploading.get()));
        on_cleanup(telegram::hide_main_button);
    }

    let title = upload.title;

    view! {
        <div class="mx-auto flex max-w-xl flex-col gap-4">
            <div class="flex flex-col gap-1">
                <h2 class="text-xl font-semibold">"New recording"</h2>
                <p class="text-sm text-muted-foreground">"Upload audio or video to transcribe."</p>
            </div>

            <div
                class=move || {
                    if dragging.get() {
                        "rounded-2xl border-2 border-dashed border-primary bg-primary/5 p-6"
                    } else {
                        "rounded-2xl border-2 border-dashed p-6"
                    }
                }
                on:dragover=move |ev: web_sys::DragEvent| {
                    ev.prevent_default();
                    dragging.set(true);
                }
                on:dragleave=move |ev: web_sys::DragEvent| {
                    ev.prevent_default();
                    dragging.set(false);
                }
                on:drop=on_drop
            >
                <input
                    type="file"
                    id="file-input"
                    accept="video/*,audio/*"
                    class="hidden"
                    on:change=on_file_change
                />
                {move || match upload.file_summary() {
                    None => view! {
                        <label for="file-input" class="flex cursor-pointer flex-col items-center gap-2 text-center">
                            <Upload class="size-8 text-muted-foreground" />
                            <span class="text-sm">"Tap to choose a file or drop it here"</span>
                            <span class="text-xs text-muted-foreground">"MP4, MP3, WAV, WebM up to 2 GB"</span>
                        </label>
                    }
                    .into_any(),
                    Some((name, size)) => view! {
                        <div class="flex items-center gap-3">
                            <div class="min-w-0 flex-1">
                                <p class="truncate text-sm font-medium">{name}</p>
                                <p class="text-xs text-muted-foreground">{format_bytes(size)}</p>
                            </div>
                            <Show when=move || !upload.is_uploading.get()>
                                <button
                                    class="rounded-md p-1 text-muted-foreground hover:text-foreground"
                                    aria-label="Remove file"
                                    on:click=move |_| {
                                        upload.set_file(None);
                                        upload.set_title(String::new());
                                    }
                                >
                                    <X class="size-4" />
                                </button>
                            </Show>
                        </div>
                    }
                    .into_any(),
                }}
            </div>

            <Card>
                <div class="flex flex-col gap-1.5">
                    <Label html_for="lecture-title">"Title (optional)"</Label>
                    <Input id="lecture-title" placeholder="Defaults to the file name" bind_value=title />
                </div>

                <div class="flex flex-col gap-1.5">
                    <Label>"Language"</Label>
                    <div class="flex flex-wrap gap-2">
                        {Language::iter()
                            .map(|lang| {
                                view! {
                                    <button
                                        type="button"
                                        class=move || pill_class(upload.language.get() == lang)
                                        on:click=move |_| upload.set_language(lang)
                                    >
                                        {lang.label()}
                                    </button>
                                }
                            })
                            .collect_view()}
                    </div>
                </div>

                <div class="flex flex-col gap-1.5">
                    <Label>"Analysis type"</Label>
                    <div class="grid grid-cols-2 gap-2">
                        {SummarizationType::iter()
                            .map(|kind| {
                                let class = move || {
                                    if upload.summarization_type.get() == kind {
                                        "flex flex-col gap-1 rounded-xl border border-primary bg-primary/5 p-3 text-left"
                                    } else {
                                        "flex flex-col gap-1 rounded-xl border p-3 text-left"
                                    }
                                };
                                view! {
                                    <button class=class on:click=move |_| upload.set_summarization_type(kind)>
                                        <span class="text-sm font-medium">{kind.label()}</span>
                                        <span class="text-xs text-muted-foreground">{type_hint(kind)}</span>
                                    </button>
                                }
                            })
                            .collect_view()}
                    </div>
                </div>
            </Card>

            <ErrorAlert error=upload.error />

            {move || {
                upload.progress.get().map(|p| {
                    let pct = f64::from(p.percentage);
                    view! {
                        <div class="flex flex-col gap-1">
                            <ProgressBar percentage=pct />
                            <div class="flex justify-between text-xs text-muted-foreground">
                                <span>{format!("{} / {}", format_bytes(p.bytes_uploaded), format_bytes(p.bytes_total))}</span>
                                <span>{format!("{}%", p.percentage)}</span>
                            </div>
                        </div>
                    }
                })
            }}

            <div class="flex gap-2">
                <Button class="flex-1" size=ButtonSize::Lg attr:disabled=move || !can_upload() on:click=on_upload>
                    <Show when=move || upload.is_uploading.get() fallback=|| view! { <Upload /> }>
                        <Spinner />
                    </Show>
                    {move || if upload.is_uploading.get() { "Uploading..." } else { "Upload" }}
                </Button>
                <Show when=move || upload.is_uploading.get()>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Lg
                        on:click=move |_| upload.cancel_upload()
                    >
                        "Cancel"
                    </Button>
                </Show>
            </div>

            <div class="flex flex-col gap-2">
                <div class="flex items-center justify-between">
                    <span class="text-xs font-medium text-muted-foreground">"Log"</span>
                    <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=move |_| upload.clear_logs()>
                        "Clear"
                    </Button>
                </div>
                <LogView entries=upload.logs />
            </div>
        </div>
    }
}
