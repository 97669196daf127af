use super::{pill_class, toggle_id};
use crate::api::{LectureUpdateRequest, TagCreateRequest};
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, ColorPicker, ErrorAlert, Input, Label, Modal, ModalBody,
    ModalFooter, Spinner,
};
use crate::models::{Language, Lecture};
use crate::state::{flatten_tree, AppContext, DEFAULT_COLOR};
use icons::{Check, Plus};
use leptos::prelude::*;
use leptos::task::spawn_local;
use strum::IntoEnumIterator;

/// Native folder picker over the folder tree, indented by depth. `exclude`
/// hides a folder and its descendants.
#[component]
pub(super) fn FolderSelect(
    value: RwSignal<Option<String>>,
    #[prop(into)] none_label: String,
    #[prop(into, optional)] exclude: Signal<Option<String>>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let folders = app_state.0.folders;

    let options = move || {
        let exclude = exclude.get();
        folders.tree.with(|tree| {
            flatten_tree(tree, exclude.as_deref())
                .into_iter()
                .map(|(depth, f)| (f.id.clone(), format!("{}{}", "\u{00a0}\u{00a0}".repeat(depth), f.name)))
                .collect::<Vec<_>>()
        })
    };

    view! {
        <select
            class="border-input h-10 w-full rounded-xl border bg-transparent px-3 text-sm"
            prop:value=move || value.get().unwrap_or_default()
            on:change=move |ev| {
                let v = event_target_value(&ev);
                value.set((!v.is_empty()).then_some(v));
            }
        >
            <option value="">{none_label}</option>
            {move || {
                options()
                    .into_iter()
                    .map(|(id, name)| {
                        let selected = value.with_untracked(|v| v.as_deref() == Some(id.as_str()));
                        view! { <option value=id selected=selected>{name}</option> }
                    })
                    .collect_view()
            }}
        </select>
    }
}

#[component]
pub fn LectureEditModal(
    open: RwSignal<bool>,
    #[prop(into)] lecture: Signal<Option<Lecture>>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let lectures = app_state.0.lectures;
    let folders = app_state.0.folders;
    let tags = app_state.0.tags;

    let title: RwSignal<String> = RwSignal::new(String::new());
    let language: RwSignal<Language> = RwSignal::new(Language::default());
    let folder_id: RwSignal<Option<String>> = RwSignal::new(None);
    let selected_tags: RwSignal<Vec<String>> = RwSignal::new(vec![]);
    let loading_tags: RwSignal<bool> = RwSignal::new(false);
    let saving: RwSignal<bool> = RwSignal::new(false);

    let creating_tag: RwSignal<bool> = RwSignal::new(false);
    let new_tag_name: RwSignal<String> = RwSignal::new(String::new());
    let new_tag_color: RwSignal<Option<String>> = RwSignal::new(Some(DEFAULT_COLOR.to_string()));

    // Refill the form every time the modal opens.
    Effect::new(move |_| {
        if !open.get() {
            return;
        }
        let Some(l) = lecture.get_untracked() else {
            return;
        };
        title.set(l.title.clone().unwrap_or_default());
        language.set(l.language.unwrap_or_default());
        folder_id.set(l.folder_id.clone());
        creating_tag.set(false);

        spawn_local(folders.load_folders_tree());
        spawn_local(tags.load_tags(false));
        loading_tags.set(true);
        spawn_local(async move {
            let current = lectures.get_lecture_tags(l.id).await;
            selected_tags.set(current.into_iter().map(|t| t.id).collect());
            loading_tags.set(false);
        });
    });

    let on_create_tag = move |_| {
        let name = new_tag_name.get_untracked().trim().to_string();
        if name.is_empty() {
            return;
        }
        let color = new_tag_color.get_untracked();
        spawn_local(async move {
            if let Some(tag) = tags.create_tag(TagCreateRequest { name, color }).await {
                selected_tags.update(|ids| ids.push(tag.id));
                creating_tag.set(false);
                new_tag_name.set(String::new());
            }
        });
    };

    let on_save = move |_| {
        let Some(l) = lecture.get_untracked() else {
            return;
        };
        if saving.get_untracked() {
            return;
        }
        saving.set(true);
        let title_val = title.get_untracked().trim().to_string();
        let patch = LectureUpdateRequest {
            title: (!title_val.is_empty()).then_some(title_val),
            language: Some(language.get_untracked()),
            folder_id: Some(folder_id.get_untracked()),
        };
        let tag_ids = selected_tags.get_untracked();
        spawn_local(async move {
            let updated = lectures.update_lecture(l.id.clone(), patch).await;
            let tagged = lectures.set_lecture_tags(l.id, tag_ids).await;
            saving.set(false);
            if updated.is_some() && tagged.is_some() {
                open.set(false);
            }
        });
    };

    let placeholder = move || {
        lecture.with(|l| l.as_ref().map(|l| l.original_filename.clone()).unwrap_or_default())
    };

    view! {
        <Modal open=open title="Edit recording">
            <ModalBody>
                <ErrorAlert error=lectures.error on_dismiss=Callback::new(move |_| lectures.clear_error()) />

                <div class="flex flex-col gap-1.5">
                    <Label html_for="edit-title">"Title"</Label>
                    <Input id="edit-title" placeholder=placeholder() bind_value=title />
                </div>

                <div class="flex flex-col gap-1.5">
                    <Label>"Language"</Label>
                    <div class="flex flex-wrap gap-2">
                        {Language::iter()
                            .map(|lang| view! {
                                <button
                                    type="button"
                                    class=move || pill_class(language.get() == lang)
                                    on:click=move |_| language.set(lang)
                                >
                                    {lang.label()}
                                </button>
                            })
                            .collect_view()}
                    </div>
                </div>

                <div class="flex flex-col gap-1.5">
                    <Label>"Folder"</Label>
                    <FolderSelect value=folder_id none_label="No folder" />
                </div>

                <div class="flex flex-col gap-1.5">
                    <div class="flex items-center justify-between">
                        <Label>"Tags"</Label>
                        <Show when=move || !creating_tag.get()>
                            <Button
                                variant=ButtonVariant::Ghost
                                size=ButtonSize::Sm
                                on:click=move |_| creating_tag.set(true)
                            >
                                <Plus />
                                "New tag"
                            </Button>
                        </Show>
                    </div>

                    <Show
                        when=move || !loading_tags.get()
                        fallback=|| view! { <span class="text-xs text-muted-foreground">"Loading tags..."</span> }
                    >
                        <div class="flex flex-wrap gap-2">
                            {move || {
                                tags.tags
                                    .get()
                                    .into_iter()
                                    .map(|tag| {
                                        let id = tag.id.clone();
                                        let id_for_click = tag.id.clone();
                                        let color = tag.color.clone().unwrap_or_else(|| DEFAULT_COLOR.to_string());
                                        let active = Signal::derive(move || selected_tags.with(|ids| ids.contains(&id)));
                                        view! {
                                            <button
                                                type="button"
                                                class=move || pill_class(active.get())
                                                on:click=move |_| selected_tags.update(|ids| toggle_id(ids, &id_for_click))
                                            >
                                                <span class="size-2 rounded-full" style=format!("background-color: {color}") />
                                                {tag.name}
                                                <Show when=move || active.get()>
                                                    <Check class="size-3" />
                                                </Show>
                                            </button>
                                        }
                                    })
                                    .collect_view()
                            }}
                            <Show when=move || tags.tags.with(|t| t.is_empty()) && !creating_tag.get()>
                                <span class="text-xs text-muted-foreground">"No tags yet"</span>
                            </Show>
                        </div>
                    </Show>

                    <Show when=move || creating_tag.get()>
                        <div class="flex flex-col gap-2 rounded-xl border p-3">
                            <Input placeholder="Tag name" bind_value=new_tag_name />
                            <ColorPicker value=new_tag_color />
                            <div class="flex justify-end gap-2">
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Sm
                                    on:click=move |_| creating_tag.set(false)
                                >
                                    "Cancel"
                                </Button>
                                <Button
                                    size=ButtonSize::Sm
                                    attr:disabled=move || new_tag_name.with(|n| n.trim().is_empty())
                                    on:click=on_create_tag
                                >
                                    "Create"
                                </Button>
                            </div>
                        </div>
                    </Show>
                </div>
            </ModalBody>

            <ModalFooter>
                <Button variant=ButtonVariant::Outline on:click=move |_| open.set(false)>
                    "Cancel"
                </Button>
                <Button attr:disabled=move || saving.get() on:click=on_save>
                    <Show when=move || saving.get()>
                        <Spinner />
                    </Show>
                    "Save"
                </Button>
            </ModalFooter>
        </Modal>
    }
}
