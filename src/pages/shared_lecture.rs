use super::lecture_tabs::{KeyPointsView, SummaryView, TranscriptView};
use crate::components::ui::{Badge, Button, ButtonSize, ButtonVariant, EmptyState, Spinner, Tabs};
use crate::models::PublicLecture;
use crate::state::AppContext;
use crate::telegram;
use crate::util::format_date;
use icons::ChevronLeft;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Tabs for the sections the owner chose to share.
fn public_tabs(lecture: &PublicLecture) -> Vec<(&'static str, &'static str)> {
    let mut tabs = vec![];
    if lecture.summary.is_some() {
        tabs.push(("summary", "Summary"));
    }
    if lecture.key_points.as_ref().is_some_and(|k| !k.is_empty()) {
        tabs.push(("keypoints", "Key points"));
    }
    if lecture.transcription.is_some() {
        tabs.push(("transcript", "Transcript"));
    }
    tabs
}

#[component]
pub fn SharedLecturePage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let lectures = app_state.0.lectures;
    let view_store = app_state.0.view;
    let auth = app_state.0.auth;

    let lecture: RwSignal<Option<PublicLecture>> = RwSignal::new(None);
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let active: RwSignal<&'static str> = RwSignal::new("summary");

    match view_store.shared_slug() {
        Some(slug) => spawn_local(async move {
            match lectures.load_public_lecture(slug).await {
                Ok(l) => {
                    if let Some(&(first, _)) = public_tabs(&l).first() {
                        active.set(first);
                    }
                    lecture.set(Some(l));
                }
                Err(e) => {
                    tracing::warn!("shared lecture unavailable: {}", e);
                    error.set(Some(e));
                }
            }
        }),
        None => error.set(Some("Link is missing".to_string())),
    }

    // Opened from a chat without a session there is nothing to go back to.
    let leave = move || {
        if !auth.is_authenticated.get_untracked() && telegram::is_telegram_environment() {
            telegram::close();
        } else {
            view_store.go_back();
        }
    };

    telegram::show_back_button(leave);
    on_cleanup(telegram::hide_back_button);

    let tabs = Signal::derive(move || lecture.with(|l| l.as_ref().map(public_tabs).unwrap_or_default()));

    let content = move || {
        let Some(l) = lecture.get() else {
            return None;
        };
        match active.get() {
            "keypoints" => l
                .key_points
                .map(|points| view! { <KeyPointsView points=points /> }.into_any()),
            "transcript" => l
                .transcription
                .map(|t| view! { <TranscriptView transcription=t /> }.into_any()),
            _ => l
                .summary
                .map(|s| view! { <SummaryView overview=s.overview chapters=s.chapters /> }.into_any()),
        }
    };

    view! {
        <div class="mx-auto flex min-h-screen max-w-2xl flex-col gap-4 p-4">
            <div class="flex items-center gap-2">
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Icon
                    attr:aria-label="Back"
                    on:click=move |_| leave()
                >
                    <ChevronLeft />
                </Button>
                <span class="text-sm text-muted-foreground">"Shared recording"</span>
            </div>

            {move || {
                if let Some(message) = error.get() {
                    return view! {
                        <EmptyState>
                            <span class="font-medium text-foreground">"This link is not available"</span>
                            <span class="text-xs">{message}</span>
                        </EmptyState>
                    }
                    .into_any();
                }
                let Some(l) = lecture.get() else {
                    return view! {
                        <div class="flex justify-center py-16">
                            <Spinner class="size-6" />
                        </div>
                    }
                    .into_any();
                };
                let title = l.title.clone().unwrap_or_else(|| "Untitled recording".to_string());
                let mut meta = vec![];
                if let Some(owner) = l.owner_name.clone() {
                    meta.push(owner);
                }
                if let Some(d) = l.duration_formatted.clone() {
                    meta.push(d);
                }
                meta.push(format_date(&l.created_at));
                view! {
                    <div class="flex flex-col gap-2">
                        <h1 class="text-lg font-semibold leading-tight">{title}</h1>
                        <div class="flex flex-wrap items-center gap-2">
                            <Badge class="bg-secondary text-secondary-foreground">
                                {l.summarization_type.label()}
                            </Badge>
                            <span class="text-xs text-muted-foreground">{meta.join(" · ")}</span>
                        </div>
                    </div>
                    <Show
                        when=move || tabs.with(|t| !t.is_empty())
                        fallback=|| view! { <EmptyState>"Nothing has been shared yet"</EmptyState> }
                    >
                        <Tabs tabs=tabs active=active />
                        {content}
                    </Show>
                }
                .into_any()
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn public(json: &str) -> PublicLecture {
        serde_json::from_str(json).expect("public lecture")
    }

    #[test]
    fn test_public_tabs_follow_shared_sections() {
        let l = public(r#"{"slug":"talk","summary":{"overview":"o","chapters":[]},"keyPoints":[]}"#);
        assert_eq!(public_tabs(&l), vec![("summary", "Summary")]);
    }

    #[test]
    fn test_public_tabs_empty_when_everything_hidden() {
        let l = public(r#"{"slug":"talk","transcription":null,"summary":null,"keyPoints":null}"#);
        assert!(public_tabs(&l).is_empty());
    }
}
