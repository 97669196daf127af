use super::lecture_edit::{FolderSelect, LectureEditModal};
use super::{pill_class, LectureRow};
use crate::components::ui::{Button, ButtonSize, ButtonVariant, EmptyState, ErrorAlert, Spinner};
use crate::models::Lecture;
use crate::state::{AppContext, LectureFilter, StatusFilter, View, DEFAULT_COLOR};
use icons::{ChevronLeft, ChevronRight, Pencil, RefreshCw, X};
use leptos::prelude::*;
use leptos::task::spawn_local;
use strum::IntoEnumIterator;

#[component]
pub fn LecturesPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let lectures = app_state.0.lectures;
    let folders = app_state.0.folders;
    let tags = app_state.0.tags;
    let view_store = app_state.0.view;

    // Only `tag_ids` is used; folder and status live in their stores.
    let tag_selection: RwSignal<LectureFilter> = RwSignal::new(LectureFilter::default());
    let editing: RwSignal<Option<Lecture>> = RwSignal::new(None);
    let edit_open: RwSignal<bool> = RwSignal::new(false);

    spawn_local(lectures.load_lectures(1));
    spawn_local(folders.load_folders_tree());
    spawn_local(tags.load_tags(false));
    lectures.start_list_polling();
    on_cleanup(move || lectures.stop_list_polling());

    let filter = Memo::new(move |_| LectureFilter {
        folder_id: folders.selected_folder_id.get(),
        tag_ids: tag_selection.with(|f| f.tag_ids.clone()),
        status: lectures.status_filter.get(),
    });

    let visible = move || {
        let filter = filter.get();
        lectures
            .lectures
            .with(|all| filter.apply(all).into_iter().cloned().collect::<Vec<_>>())
    };

    let toggle_tag = move |id: &str| tag_selection.update(|f| f.toggle_tag(id));

    let has_filters = move || {
        folders.selected_folder_id.with(|f| f.is_some()) || tag_selection.with(|f| !f.tag_ids.is_empty())
    };
    let clear_filters = move |_| {
        folders.select_folder(None);
        tag_selection.set(LectureFilter::default());
    };

    let go_to_page = move |page: u32| spawn_local(lectures.load_lectures(page));

    let total_label = move || {
        let total = lectures.pagination.with(|p| p.as_ref().map(|p| p.total).unwrap_or(0));
        format!("{total} recordings")
    };

    view! {
        <div class="mx-auto flex max-w-2xl flex-col gap-4">
            <div class="flex items-center justify-between gap-2">
                <div class="flex flex-col">
                    <h2 class="text-xl font-semibold">"My lectures"</h2>
                    <span class="text-xs text-muted-foreground">{total_label}</span>
                </div>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Icon
                    attr:aria-label="Refresh"
                    attr:disabled=move || lectures.is_loading.get()
                    on:click=move |_| spawn_local(lectures.reload())
                >
                    <span class=move || if lectures.is_loading.get() { "animate-spin" } else { "" }>
                        <RefreshCw class="size-4" />
                    </span>
                </Button>
            </div>

            <div class="-mx-1 flex gap-2 overflow-x-auto px-1 pb-1">
                {StatusFilter::iter()
                    .map(|status| view! {
                        <button
                            type="button"
                            class=move || pill_class(lectures.status_filter.get() == status)
                            on:click=move |_| lectures.set_status_filter(status)
                        >
                            {status.label()}
                        </button>
                    })
                    .collect_view()}
            </div>

            <div class="flex flex-col gap-2">
                <div class="flex items-center gap-2">
                    <div class="flex-1">
                        <FolderSelect value=folders.selected_folder_id none_label="All folders" />
                    </div>
                    <Show when=has_filters>
                        <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=clear_filters>
                            "Clear"
                        </Button>
                    </Show>
                </div>
                <Show when=move || tags.tags.with(|t| !t.is_empty())>
                    <div class="-mx-1 flex gap-2 overflow-x-auto px-1 pb-1">
                        {move || {
                            tags.tags
                                .get()
                                .into_iter()
                                .map(|tag| {
                                    let id = tag.id.clone();
                                    let active = Signal::derive(move || tag_selection.with(|f| f.tag_ids.contains(&id)));
                                    let color = tag.color.clone().unwrap_or_else(|| DEFAULT_COLOR.to_string());
                                    let tag_id = tag.id.clone();
                                    view! {
                                        <button
                                            type="button"
                                            class=move || pill_class(active.get())
                                            on:click=move |_| toggle_tag(&tag_id)
                                        >
                                            <span class="size-2 rounded-full" style=format!("background-color: {color}") />
                                            {tag.name}
                                            <Show when=move || active.get()>
                                                <X class="size-3" />
                                            </Show>
                                        </button>
                                    }
                                })
                                .collect_view()
                        }}
                    </div>
                </Show>
            </div>

            <ErrorAlert error=lectures.error on_dismiss=Callback::new(move |_| lectures.clear_error()) />

            {move || {
                let items = visible();
                if items.is_empty() && lectures.is_loading.get() {
                    return view! {
                        <div class="flex justify-center py-10">
                            <Spinner class="size-6" />
                        </div>
                    }
                    .into_any();
                }
                if items.is_empty() {
                    return view! {
                        <EmptyState>
                            <span class="text-sm font-medium">"No recordings yet"</span>
                            <span class="text-xs text-muted-foreground">
                                "Upload your first recording to get a transcript and summary."
                            </span>
                            <Button size=ButtonSize::Sm on:click=move |_| view_store.set_view(View::Upload)>
                                "Upload"
                            </Button>
                        </EmptyState>
                    }
                    .into_any();
                }
                items
                    .into_iter()
                    .map(|lecture| {
                        let for_edit = lecture.clone();
                        view! {
                            <div class="flex items-center gap-2">
                                <div class="min-w-0 flex-1">
                                    <LectureRow lecture=lecture />
                                </div>
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Icon
                                    attr:aria-label="Edit"
                                    on:click=move |_| {
                                        editing.set(Some(for_edit.clone()));
                                        edit_open.set(true);
                                    }
                                >
                                    <Pencil />
                                </Button>
                            </div>
                        }
                    })
                    .collect_view()
                    .into_any()
            }}

            {move || {
                lectures.pagination.get().filter(|p| p.total_pages > 1).map(|p| {
                    let page = p.page;
                    view! {
                        <div class="flex items-center justify-center gap-3">
                            <Button
                                variant=ButtonVariant::Outline
                                size=ButtonSize::Icon
                                attr:aria-label="Previous page"
                                attr:disabled={!p.has_prev}
                                on:click=move |_| go_to_page(page.saturating_sub(1).max(1))
                            >
                                <ChevronLeft />
                            </Button>
                            <span class="text-sm text-muted-foreground">
                                {format!("{} / {}", p.page, p.total_pages)}
                            </span>
                            <Button
                                variant=ButtonVariant::Outline
                                size=ButtonSize::Icon
                                attr:aria-label="Next page"
                                attr:disabled={!p.has_next}
                                on:click=move |_| go_to_page(page + 1)
                            >
                                <ChevronRight />
                            </Button>
                        </div>
                    }
                })
            }}

            <LectureEditModal open=edit_open lecture=editing />
        </div>
    }
}
