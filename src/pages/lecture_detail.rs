use super::lecture_edit::LectureEditModal;
use super::lecture_tabs::{
    ActionsView, CallSummaryView, KeyPointsView, MindMapView, PainPointsView, SuggestionsView,
    SummaryView, TranscriptView,
};
use super::share_modal::ShareModal;
use super::{confirm, StatusBadge, TagChip};
use crate::components::ui::{
    Badge, Button, ButtonSize, ButtonVariant, EmptyState, ErrorAlert, Spinner, Tabs,
};
use crate::models::{
    ActionItem, Lecture, LectureStatus, MindMap, PainPoint, ProductSuggestion, SummarizationType,
    Tag,
};
use crate::state::AppContext;
use crate::telegram;
use crate::util::format_date;
use icons::{ChevronLeft, Link, Pencil, Trash2, X};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::future::Future;

const LECTURE_TABS: &[(&str, &str)] = &[
    ("transcript", "Transcript"),
    ("summary", "Summary"),
    ("keypoints", "Key points"),
];

const CUSTDEV_TABS: &[(&str, &str)] = &[
    ("overview", "Overview"),
    ("pain", "Pain points"),
    ("suggestions", "Suggestions"),
    ("actions", "Actions"),
    ("mindmap", "Mind map"),
    ("transcript", "Transcript"),
];

fn tabs_for(kind: SummarizationType) -> &'static [(&'static str, &'static str)] {
    match kind {
        SummarizationType::Lecture => LECTURE_TABS,
        SummarizationType::Custdev => CUSTDEV_TABS,
    }
}

/// What the page header shows; compared so unrelated updates do not re-render it.
#[derive(Clone, Debug, PartialEq)]
struct Header {
    title: String,
    status: LectureStatus,
    kind: SummarizationType,
    meta: String,
    error_message: Option<String>,
}

impl From<&Lecture> for Header {
    fn from(l: &Lecture) -> Self {
        let mut meta = vec![];
        if let Some(d) = l.duration_formatted.clone() {
            meta.push(d);
        }
        if let Some(lang) = l.language {
            meta.push(lang.label().to_string());
        }
        meta.push(format_date(&l.created_at));
        Self {
            title: l.display_title().to_string(),
            status: l.status,
            kind: l.summarization_type,
            meta: meta.join(" · "),
            error_message: l.error_message.clone(),
        }
    }
}

/// Starts `load` unless the content is already present. Returns the
/// loading flag and the load error.
fn lazy_load<Fut>(
    ready: bool,
    load: impl FnOnce() -> Fut,
) -> (RwSignal<bool>, RwSignal<Option<String>>)
where
    Fut: Future<Output = Result<(), String>> + 'static,
{
    let loading = RwSignal::new(!ready);
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    if !ready {
        let fut = load();
        spawn_local(async move {
            if let Err(e) = fut.await {
                tracing::warn!("tab content failed to load: {}", e);
                error.set(Some(e));
            }
            loading.set(false);
        });
    }
    (loading, error)
}

#[component]
fn TabBody(
    loading: RwSignal<bool>,
    error: RwSignal<Option<String>>,
    children: ChildrenFn,
) -> impl IntoView {
    view! {
        <ErrorAlert error=error />
        <Show
            when=move || !loading.get()
            fallback=|| view! {
                <div class="flex justify-center py-10">
                    <Spinner class="size-6" />
                </div>
            }
        >
            {children()}
        </Show>
    }
}

#[component]
fn TranscriptTab(id: String, seek: Callback<f64>) -> impl IntoView {
    let lectures = expect_context::<AppContext>().0.lectures;
    let ready = lectures
        .selected
        .with_untracked(|l| l.as_ref().is_some_and(|l| l.transcription.is_some()));
    let (loading, error) = lazy_load(ready, move || lectures.load_transcript(id));

    view! {
        <TabBody loading=loading error=error>
            {move || {
                lectures
                    .selected
                    .with(|l| l.as_ref().and_then(|l| l.transcription.clone()))
                    .map(|t| view! { <TranscriptView transcription=t seek=seek /> })
            }}
        </TabBody>
    }
}

#[component]
fn SummaryTab(id: String, seek: Callback<f64>) -> impl IntoView {
    let lectures = expect_context::<AppContext>().0.lectures;
    let ready = lectures
        .selected
        .with_untracked(|l| l.as_ref().is_some_and(|l| l.summary.is_some()));
    let (loading, error) = lazy_load(ready, move || lectures.load_summary(id));

    view! {
        <TabBody loading=loading error=error>
            {move || {
                lectures
                    .selected
                    .with(|l| l.as_ref().and_then(|l| l.summary.clone()))
                    .map(|s| view! { <SummaryView overview=s.overview chapters=s.chapters seek=seek /> })
            }}
        </TabBody>
    }
}

#[component]
fn KeyPointsTab(id: String, seek: Callback<f64>) -> impl IntoView {
    let lectures = expect_context::<AppContext>().0.lectures;
    let ready = lectures
        .selected
        .with_untracked(|l| l.as_ref().is_some_and(|l| l.key_points.is_some()));
    let (loading, error) = lazy_load(ready, move || lectures.load_key_points(id));

    view! {
        <TabBody loading=loading error=error>
            {move || {
                lectures
                    .selected
                    .with(|l| l.as_ref().and_then(|l| l.key_points.clone()))
                    .map(|points| view! { <KeyPointsView points=points seek=seek /> })
            }}
        </TabBody>
    }
}

#[component]
fn OverviewTab(id: String, seek: Callback<f64>) -> impl IntoView {
    let lectures = expect_context::<AppContext>().0.lectures;
    let ready = lectures.custdev.with_untracked(|c| c.is_some());
    let (loading, error) = lazy_load(ready, move || lectures.load_custdev(id));

    view! {
        <TabBody loading=loading error=error>
            {move || lectures.custdev.get().map(|data| view! { <CallSummaryView data=data seek=seek /> })}
        </TabBody>
    }
}

/// Per-page cache of the CustDev sections served by their own endpoints.
#[derive(Clone, Copy)]
struct CustDevSlots {
    pain_points: RwSignal<Option<Vec<PainPoint>>>,
    suggestions: RwSignal<Option<Vec<ProductSuggestion>>>,
    actions: RwSignal<Option<Vec<ActionItem>>>,
    mind_map: RwSignal<Option<MindMap>>,
}

impl CustDevSlots {
    fn new() -> Self {
        Self {
            pain_points: RwSignal::new(None),
            suggestions: RwSignal::new(None),
            actions: RwSignal::new(None),
            mind_map: RwSignal::new(None),
        }
    }
}

#[component]
fn PainPointsTab(id: String, slots: CustDevSlots, seek: Callback<f64>) -> impl IntoView {
    let lectures = expect_context::<AppContext>().0.lectures;
    let slot = slots.pain_points;
    let (loading, error) = lazy_load(slot.with_untracked(|s| s.is_some()), move || async move {
        slot.set(Some(lectures.load_pain_points(id).await?));
        Ok::<(), String>(())
    });

    view! {
        <TabBody loading=loading error=error>
            {move || slot.get().map(|points| view! { <PainPointsView points=points seek=seek /> })}
        </TabBody>
    }
}

#[component]
fn SuggestionsTab(id: String, slots: CustDevSlots) -> impl IntoView {
    let lectures = expect_context::<AppContext>().0.lectures;
    let slot = slots.suggestions;
    let (loading, error) = lazy_load(slot.with_untracked(|s| s.is_some()), move || async move {
        slot.set(Some(lectures.load_suggestions(id).await?));
        Ok::<(), String>(())
    });

    view! {
        <TabBody loading=loading error=error>
            {move || slot.get().map(|s| view! { <SuggestionsView suggestions=s /> })}
        </TabBody>
    }
}

#[component]
fn ActionsTab(id: String, slots: CustDevSlots, seek: Callback<f64>) -> impl IntoView {
    let lectures = expect_context::<AppContext>().0.lectures;
    let slot = slots.actions;
    let (loading, error) = lazy_load(slot.with_untracked(|s| s.is_some()), move || async move {
        slot.set(Some(lectures.load_actions(id).await?));
        Ok::<(), String>(())
    });

    view! {
        <TabBody loading=loading error=error>
            {move || slot.get().map(|actions| view! { <ActionsView actions=actions seek=seek /> })}
        </TabBody>
    }
}

#[component]
fn MindMapTab(id: String, slots: CustDevSlots) -> impl IntoView {
    let lectures = expect_context::<AppContext>().0.lectures;
    let slot = slots.mind_map;
    let (loading, error) = lazy_load(slot.with_untracked(|s| s.is_some()), move || async move {
        slot.set(Some(lectures.load_mind_map(id).await?));
        Ok::<(), String>(())
    });

    view! {
        <TabBody loading=loading error=error>
            {move || slot.get().map(|map| view! { <MindMapView map=map /> })}
        </TabBody>
    }
}

#[component]
pub fn LectureDetailPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let lectures = app_state.0.lectures;
    let view_store = app_state.0.view;

    let Some(lecture_id) = view_store.selected_lecture_id() else {
        return view! {
            <EmptyState>
                <span>"Recording not found"</span>
                <Button variant=ButtonVariant::Outline on:click=move |_| view_store.go_back()>
                    "Back"
                </Button>
            </EmptyState>
        }
        .into_any();
    };

    let active: RwSignal<&'static str> = RwSignal::new(LECTURE_TABS[0].0);
    let edit_open: RwSignal<bool> = RwSignal::new(false);
    let share_open: RwSignal<bool> = RwSignal::new(false);
    let deleting: RwSignal<bool> = RwSignal::new(false);
    let slots = CustDevSlots::new();
    let audio_ref: NodeRef<leptos::html::Audio> = NodeRef::new();

    lectures.custdev.set(None);
    spawn_local(lectures.select_lecture(lecture_id.clone()));
    telegram::show_back_button(move || view_store.go_back());
    on_cleanup(move || {
        lectures.clear_selection();
        telegram::hide_back_button();
    });

    // Memos keep the player and tabs mounted while lazy content lands in `selected`.
    let header = Memo::new(move |_| lectures.selected.with(|l| l.as_ref().map(Header::from)));
    let status = Memo::new(move |_| header.with(|h| h.as_ref().map(|h| h.status)));
    let audio_url = Memo::new(move |_| {
        lectures.selected.with(|l| l.as_ref().and_then(|l| l.audio_url.clone()))
    });

    let kind = Memo::new(move |_| header.with(|h| h.as_ref().map(|h| h.kind).unwrap_or_default()));
    let tabs = Signal::derive(move || tabs_for(kind.get()).to_vec());

    // Keep the active tab valid once the lecture type is known.
    Effect::new(move |_| {
        let available = tabs_for(kind.get());
        if !available.iter().any(|(id, _)| *id == active.get_untracked()) {
            active.set(available[0].0);
        }
    });

    let seek = Callback::new(move |secs: f64| {
        if let Some(audio) = audio_ref.get() {
            audio.set_current_time(secs);
            let _ = audio.play();
        }
    });

    let on_delete = {
        let id = lecture_id.clone();
        move |_| {
            if deleting.get_untracked() || !confirm("Delete this recording? This cannot be undone.") {
                return;
            }
            deleting.set(true);
            let id = id.clone();
            spawn_local(async move {
                let deleted = lectures.delete_lecture(id).await;
                deleting.set(false);
                if deleted {
                    view_store.go_back();
                }
            });
        }
    };

    let tags_lecture_id = lecture_id.clone();

    let tab_content = {
        let id = lecture_id.clone();
        move || {
            let id = id.clone();
            match active.get() {
                "summary" => view! { <SummaryTab id=id seek=seek /> }.into_any(),
                "keypoints" => view! { <KeyPointsTab id=id seek=seek /> }.into_any(),
                "overview" => view! { <OverviewTab id=id seek=seek /> }.into_any(),
                "pain" => view! { <PainPointsTab id=id slots=slots seek=seek /> }.into_any(),
                "suggestions" => view! { <SuggestionsTab id=id slots=slots /> }.into_any(),
                "actions" => view! { <ActionsTab id=id slots=slots seek=seek /> }.into_any(),
                "mindmap" => view! { <MindMapTab id=id slots=slots /> }.into_any(),
                _ => view! { <TranscriptTab id=id seek=seek /> }.into_any(),
            }
        }
    };

    view! {
        <div class="mx-auto flex min-h-screen max-w-2xl flex-col gap-4 p-4">
            <div class="flex items-center gap-2">
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Icon
                    attr:aria-label="Back"
                    on:click=move |_| view_store.go_back()
                >
                    <ChevronLeft />
                </Button>
                <div class="flex-1" />
                <Show when=move || status.get() == Some(LectureStatus::Completed)>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Icon
                        attr:aria-label="Share"
                        on:click=move |_| share_open.set(true)
                    >
                        <Link />
                    </Button>
                </Show>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Icon
                    attr:aria-label="Edit"
                    attr:disabled=move || status.get().is_none()
                    on:click=move |_| edit_open.set(true)
                >
                    <Pencil />
                </Button>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Icon
                    attr:aria-label="Delete"
                    attr:disabled=move || deleting.get() || status.get().is_none()
                    on:click=on_delete
                >
                    <Trash2 class="text-destructive" />
                </Button>
            </div>

            <ErrorAlert error=lectures.error on_dismiss=Callback::new(move |_| lectures.clear_error()) />

            {move || match header.get() {
                None => view! {
                    <div class="flex justify-center py-16">
                        <Spinner class="size-6" />
                    </div>
                }
                .into_any(),
                Some(h) => view! {
                    <div class="flex flex-col gap-2">
                        <h1 class="text-lg font-semibold leading-tight">{h.title}</h1>
                        <div class="flex flex-wrap items-center gap-2">
                            <StatusBadge status=h.status />
                            <Badge class="bg-secondary text-secondary-foreground">{h.kind.label()}</Badge>
                            <span class="text-xs text-muted-foreground">{h.meta}</span>
                        </div>
                        {h.error_message.map(|msg| view! {
                            <p class="rounded-xl bg-destructive/10 p-3 text-sm text-destructive">{msg}</p>
                        })}
                    </div>
                }
                .into_any(),
            }}

            <Show when=move || header.with(|h| h.is_some())>
                <LectureTags lecture_id=tags_lecture_id.clone() />
            </Show>

            {move || audio_url.get().map(|src| view! {
                <audio node_ref=audio_ref controls=true preload="metadata" class="w-full" src=src />
            })}

            {move || match status.get() {
                None => None,
                Some(LectureStatus::Completed) => Some(
                    view! {
                        <div class="flex flex-col gap-4">
                            <Tabs tabs=tabs active=active />
                            {tab_content.clone()}
                        </div>
                    }
                    .into_any(),
                ),
                Some(LectureStatus::Failed) => Some(
                    view! { <EmptyState>"Processing failed"</EmptyState> }.into_any(),
                ),
                Some(s) => Some(
                    view! {
                        <EmptyState>
                            <Spinner class="size-6" />
                            <span>{format!("{}...", s.label())}</span>
                            <span class="text-xs">"This page updates when processing finishes."</span>
                        </EmptyState>
                    }
                    .into_any(),
                ),
            }}

            <LectureEditModal open=edit_open lecture=lectures.selected />
            <ShareModal open=share_open lecture_id=lecture_id />
        </div>
    }
    .into_any()
}

/// Tags on the open lecture. Removing one takes effect before the server
/// answers; adding one waits for the refreshed list.
#[component]
fn LectureTags(lecture_id: String) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let lectures = app_state.0.lectures;
    let tags = app_state.0.tags;
    let requested = StoredValue::new(false);

    if tags.tags.with_untracked(|t| t.is_empty()) {
        spawn_local(tags.load_tags(false));
    }

    {
        let id = lecture_id.clone();
        Effect::new(move |_| {
            let missing = lectures
                .selected
                .with(|s| s.as_ref().is_some_and(|l| l.id == id && l.tags.is_none()));
            if missing && !requested.get_value() {
                requested.set_value(true);
                spawn_local(lectures.load_selected_tags(id.clone()));
            }
        });
    }

    let attached = Memo::new(move |_| {
        lectures
            .selected
            .with(|s| s.as_ref().and_then(|l| l.tags.clone()))
            .unwrap_or_default()
    });
    let available = Memo::new(move |_| {
        attached.with(|on| {
            tags.tags.with(|all| {
                all.iter()
                    .filter(|t| !on.iter().any(|a| a.id == t.id))
                    .cloned()
                    .collect::<Vec<Tag>>()
            })
        })
    });

    let on_add = {
        let id = lecture_id.clone();
        move |ev: web_sys::Event| {
            let tag_id = event_target_value(&ev);
            if tag_id.is_empty() {
                return;
            }
            let id = id.clone();
            spawn_local(async move {
                lectures.add_tag_to_lecture(id, tag_id).await;
            });
        }
    };

    view! {
        <div class="flex flex-wrap items-center gap-1.5">
            <For each=move || attached.get() key=|t| t.id.clone() let:tag>
                {
                    let lecture_id = lecture_id.clone();
                    let tag_id = tag.id.clone();
                    view! {
                        <span class="inline-flex items-center gap-0.5">
                            <TagChip tag=tag />
                            <button
                                type="button"
                                class="text-muted-foreground hover:text-destructive"
                                aria-label="Remove tag"
                                on:click=move |_| {
                                    let (lecture_id, tag_id) = (lecture_id.clone(), tag_id.clone());
                                    spawn_local(async move {
                                        lectures.remove_tag_from_lecture(lecture_id, tag_id).await;
                                    });
                                }
                            >
                                <X class="size-3" />
                            </button>
                        </span>
                    }
                }
            </For>
            <Show when=move || available.with(|a| !a.is_empty())>
                <select
                    class="h-7 rounded-full border border-dashed bg-transparent px-2 text-[11px] text-muted-foreground"
                    prop:value=""
                    on:change=on_add.clone()
                >
                    <option value="">"+ Tag"</option>
                    {move || {
                        available
                            .get()
                            .into_iter()
                            .map(|t| view! { <option value=t.id>{t.name}</option> })
                            .collect_view()
                    }}
                </select>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custdev_recordings_get_analysis_tabs() {
        let ids: Vec<_> = tabs_for(SummarizationType::Custdev).iter().map(|(id, _)| *id).collect();
        assert_eq!(ids.first(), Some(&"overview"));
        assert!(ids.contains(&"mindmap"));
        assert!(ids.contains(&"transcript"));
    }

    #[test]
    fn test_lecture_tabs_start_with_transcript() {
        assert_eq!(tabs_for(SummarizationType::Lecture)[0].0, "transcript");
        assert!(!tabs_for(SummarizationType::Lecture).iter().any(|(id, _)| *id == "mindmap"));
    }
}
