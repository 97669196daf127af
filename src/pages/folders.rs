use super::lecture_edit::FolderSelect;
use super::{confirm, toggle_id, LectureRow};
use crate::api::{FolderCreateRequest, FolderUpdateRequest, LectureUpdateRequest};
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, ColorPicker, EmptyState, ErrorAlert, Input, Label, Modal,
    ModalBody, ModalFooter, Spinner,
};
use crate::models::Folder;
use crate::state::{flatten_tree, in_folder, unorganized, AppContext, DEFAULT_COLOR};
use icons::{Folder as FolderIcon, FolderPlus, Inbox, Pencil, Trash2};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn FoldersPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let folders = app_state.0.folders;
    let lectures = app_state.0.lectures;

    // `None` shows the unorganized bucket.
    let current: RwSignal<Option<String>> = RwSignal::new(None);

    let form_open: RwSignal<bool> = RwSignal::new(false);
    let editing_id: RwSignal<Option<String>> = RwSignal::new(None);
    let form_name: RwSignal<String> = RwSignal::new(String::new());
    let form_color: RwSignal<Option<String>> = RwSignal::new(None);
    let form_parent: RwSignal<Option<String>> = RwSignal::new(None);
    let saving: RwSignal<bool> = RwSignal::new(false);

    let selecting: RwSignal<bool> = RwSignal::new(false);
    let selected: RwSignal<Vec<String>> = RwSignal::new(vec![]);
    let move_target: RwSignal<Option<String>> = RwSignal::new(None);
    let moving: RwSignal<bool> = RwSignal::new(false);

    spawn_local(folders.load_folders());
    spawn_local(folders.load_folders_tree());
    spawn_local(lectures.load_lectures(1));

    let open_create = move |_| {
        editing_id.set(None);
        form_name.set(String::new());
        form_color.set(None);
        form_parent.set(current.get_untracked());
        form_open.set(true);
    };

    let open_edit = move |folder: &Folder| {
        editing_id.set(Some(folder.id.clone()));
        form_name.set(folder.name.clone());
        form_color.set(folder.color.clone());
        form_parent.set(folder.parent_id.clone());
        form_open.set(true);
    };

    let on_save = move |_| {
        let name = form_name.get_untracked().trim().to_string();
        if name.is_empty() || saving.get_untracked() {
            return;
        }
        saving.set(true);
        let color = form_color.get_untracked();
        let parent_id = form_parent.get_untracked();
        spawn_local(async move {
            let saved = match editing_id.get_untracked() {
                Some(id) => folders
                    .update_folder(
                        id,
                        FolderUpdateRequest {
                            name: Some(name),
                            color: Some(color),
                            parent_id: Some(parent_id),
                        },
                    )
                    .await
                    .is_some(),
                None => folders
                    .create_folder(FolderCreateRequest {
                        name,
                        color,
                        parent_id,
                    })
                    .await
                    .is_some(),
            };
            saving.set(false);
            if saved {
                form_open.set(false);
            }
        });
    };

    let on_delete = move |folder: &Folder| {
        let message = format!(
            "Delete \"{}\"? Its recordings will move to Unorganized.",
            folder.name
        );
        if !confirm(&message) {
            return;
        }
        let id = folder.id.clone();
        spawn_local(async move {
            if folders.delete_folder(id.clone()).await {
                if current.get_untracked().as_deref() == Some(id.as_str()) {
                    current.set(None);
                }
                lectures.reload().await;
            }
        });
    };

    let clear_selection = move || {
        selected.set(vec![]);
        selecting.set(false);
    };

    let on_move = move |_| {
        let ids = selected.get_untracked();
        if ids.is_empty() || moving.get_untracked() {
            return;
        }
        moving.set(true);
        let target = move_target.get_untracked();
        spawn_local(async move {
            for id in ids {
                let patch = LectureUpdateRequest {
                    folder_id: Some(target.clone()),
                    ..Default::default()
                };
                lectures.update_lecture(id, patch).await;
            }
            folders.load_folders().await;
            folders.load_folders_tree().await;
            moving.set(false);
            clear_selection();
        });
    };

    let unorganized_count = move || lectures.lectures.with(|l| unorganized(l).len());

    let bucket_lectures = move || {
        let folder = current.get();
        lectures.lectures.with(|all| {
            let picked = match folder.as_deref() {
                Some(id) => in_folder(all, id),
                None => unorganized(all),
            };
            picked.into_iter().cloned().collect::<Vec<_>>()
        })
    };

    let bucket_title = move || match current.get() {
        Some(id) => folders.folder_name(&id).unwrap_or_else(|| "Folder".to_string()),
        None => "Unorganized".to_string(),
    };

    let row_class = move |active: bool| {
        if active {
            "group flex w-full items-center gap-2 rounded-lg bg-accent px-2 py-2 text-sm font-medium"
        } else {
            "group flex w-full items-center gap-2 rounded-lg px-2 py-2 text-sm hover:bg-accent/50"
        }
    };

    view! {
        <div class="mx-auto flex max-w-3xl flex-col gap-4">
            <div class="flex items-center justify-between gap-2">
                <div class="flex flex-col">
                    <h2 class="text-xl font-semibold">"Folders"</h2>
                    <span class="text-xs text-muted-foreground">"Keep your recordings organized"</span>
                </div>
                <Button size=ButtonSize::Sm on:click=open_create>
                    <FolderPlus />
                    "New folder"
                </Button>
            </div>

            <ErrorAlert error=folders.error on_dismiss=Callback::new(move |_| folders.clear_error()) />

            <div class="grid gap-4 md:grid-cols-[16rem_1fr]">
                <nav class="flex flex-col gap-0.5 rounded-2xl border p-2">
                    <button
                        type="button"
                        class=move || row_class(current.get().is_none())
                        on:click=move |_| current.set(None)
                    >
                        <Inbox class="size-4 text-muted-foreground" />
                        <span class="flex-1 text-left">"Unorganized"</span>
                        <span class="text-xs text-muted-foreground">{unorganized_count}</span>
                    </button>

                    {move || {
                        if folders.is_loading.get() && folders.tree.with(|t| t.is_empty()) {
                            return view! {
                                <div class="flex justify-center py-4">
                                    <Spinner />
                                </div>
                            }
                            .into_any();
                        }
                        folders.tree.with(|tree| {
                            flatten_tree(tree, None)
                                .into_iter()
                                .map(|(depth, folder)| {
                                    let id = folder.id.clone();
                                    let id_for_click = folder.id.clone();
                                    let for_edit = folder.clone();
                                    let for_delete = folder.clone();
                                    let color = folder.color.clone().unwrap_or_else(|| DEFAULT_COLOR.to_string());
                                    let count = folder.lecture_count.filter(|c| *c > 0);
                                    view! {
                                        <div
                                            class=move || row_class(current.get().as_deref() == Some(id.as_str()))
                                            style=format!("padding-left: {}rem", 0.5 + depth as f32)
                                            on:click=move |_| current.set(Some(id_for_click.clone()))
                                        >
                                            <span style=format!("color: {color}")>
                                                <FolderIcon class="size-4" />
                                            </span>
                                            <span class="min-w-0 flex-1 truncate">{folder.name.clone()}</span>
                                            {count.map(|c| view! { <span class="text-xs text-muted-foreground">{c}</span> })}
                                            <button
                                                type="button"
                                                class="rounded p-1 text-muted-foreground opacity-60 hover:opacity-100"
                                                aria-label="Edit folder"
                                                on:click=move |ev| {
                                                    ev.stop_propagation();
                                                    open_edit(&for_edit);
                                                }
                                            >
                                                <Pencil class="size-3.5" />
                                            </button>
                                            <button
                                                type="button"
                                                class="rounded p-1 text-destructive opacity-60 hover:opacity-100"
                                                aria-label="Delete folder"
                                                on:click=move |ev| {
                                                    ev.stop_propagation();
                                                    on_delete(&for_delete);
                                                }
                                            >
                                                <Trash2 class="size-3.5" />
                                            </button>
                                        </div>
                                    }
                                })
                                .collect_view()
                                .into_any()
                        })
                    }}
                </nav>

                <section class="flex min-w-0 flex-col gap-3">
                    <div class="flex items-center justify-between gap-2">
                        <h3 class="truncate text-base font-semibold">{bucket_title}</h3>
                        <Show
                            when=move || selecting.get()
                            fallback=move || view! {
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    on:click=move |_| selecting.set(true)
                                >
                                    "Select"
                                </Button>
                            }
                        >
                            <div class="flex gap-2">
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Sm
                                    on:click=move |_| {
                                        selected.set(bucket_lectures().into_iter().map(|l| l.id).collect())
                                    }
                                >
                                    "All"
                                </Button>
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Sm
                                    on:click=move |_| clear_selection()
                                >
                                    "Done"
                                </Button>
                            </div>
                        </Show>
                    </div>

                    <Show when=move || selecting.get() && selected.with(|s| !s.is_empty())>
                        <div class="flex flex-col gap-2 rounded-xl border bg-muted/40 p-3">
                            <span class="text-xs text-muted-foreground">
                                {move || format!("Move {} selected to", selected.with(|s| s.len()))}
                            </span>
                            <div class="flex gap-2">
                                <div class="min-w-0 flex-1">
                                    <FolderSelect value=move_target none_label="Unorganized" />
                                </div>
                                <Button attr:disabled=move || moving.get() on:click=on_move>
                                    <Show when=move || moving.get()>
                                        <Spinner />
                                    </Show>
                                    "Move"
                                </Button>
                            </div>
                        </div>
                    </Show>

                    {move || {
                        let items = bucket_lectures();
                        if items.is_empty() {
                            return view! {
                                <EmptyState>
                                    <span class="text-sm text-muted-foreground">"This folder is empty"</span>
                                </EmptyState>
                            }
                            .into_any();
                        }
                        items
                            .into_iter()
                            .map(|lecture| {
                                let id = lecture.id.clone();
                                let checked = Signal::derive(move || selected.with(|s| s.contains(&id)));
                                let toggle_key = lecture.id.clone();
                                view! {
                                    <div class="flex items-center gap-2">
                                        <input
                                            type="checkbox"
                                            class=move || if selecting.get() { "size-4 accent-primary" } else { "hidden" }
                                            prop:checked=move || checked.get()
                                            on:change=move |_| selected.update(|s| toggle_id(s, &toggle_key))
                                        />
                                        <div class="min-w-0 flex-1">
                                            <LectureRow lecture=lecture />
                                        </div>
                                    </div>
                                }
                            })
                            .collect_view()
                            .into_any()
                    }}
                </section>
            </div>

            <Modal
                open=form_open
                title=Signal::derive(move || {
                    if editing_id.with(|e| e.is_some()) { "Edit folder" } else { "New folder" }.to_string()
                })
            >
                <ModalBody>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="folder-name">"Name"</Label>
                        <Input id="folder-name" placeholder="Folder name" bind_value=form_name />
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label>"Parent"</Label>
                        <FolderSelect value=form_parent none_label="Top level" exclude=editing_id />
                    </div>
                    <ColorPicker value=form_color label="Color" />
                </ModalBody>
                <ModalFooter>
                    <Button variant=ButtonVariant::Outline on:click=move |_| form_open.set(false)>
                        "Cancel"
                    </Button>
                    <Button
                        attr:disabled=move || saving.get() || form_name.with(|n| n.trim().is_empty())
                        on:click=on_save
                    >
                        <Show when=move || saving.get()>
                            <Spinner />
                        </Show>
                        {move || if editing_id.with(|e| e.is_some()) { "Save" } else { "Create" }}
                    </Button>
                </ModalFooter>
            </Modal>
        </div>
    }
}
