use super::LectureRow;
use crate::components::ui::{Button, ButtonSize, ButtonVariant, Card, ProgressBar};
use crate::models::{Lecture, LectureStatus, UserStats};
use crate::state::{AppContext, View};
use icons::{ChevronRight, Mic};
use leptos::prelude::*;
use leptos::task::spawn_local;

const RECENT_COUNT: usize = 3;

/// Counts from the loaded page, used until the stats endpoint answers.
fn local_stats(lectures: &[Lecture]) -> UserStats {
    let count = |status: LectureStatus| lectures.iter().filter(|l| l.status == status).count() as u32;
    UserStats {
        total: lectures.len() as u32,
        completed: count(LectureStatus::Completed),
        processing: lectures.iter().filter(|l| l.status.is_processing()).count() as u32,
        failed: count(LectureStatus::Failed),
    }
}

#[component]
fn StatCard(label: &'static str, #[prop(into)] value: Signal<u32>, tone: &'static str) -> impl IntoView {
    view! {
        <div class=format!("flex flex-col gap-1 rounded-2xl p-3 {tone}")>
            <span class="text-2xl font-semibold">{move || value.get()}</span>
            <span class="text-xs opacity-80">{label}</span>
        </div>
    }
}

#[component]
pub fn HomePage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let auth = app_state.0.auth;
    let lectures = app_state.0.lectures;
    let subscription = app_state.0.subscription;
    let view_store = app_state.0.view;

    let server_stats: RwSignal<Option<UserStats>> = RwSignal::new(None);

    if auth.is_authenticated.get_untracked() {
        spawn_local(lectures.load_lectures(1));
        spawn_local(subscription.fetch_balance());
        spawn_local(async move {
            server_stats.set(lectures.user_stats().await);
        });
    }

    let stats = Memo::new(move |_| {
        server_stats
            .get()
            .unwrap_or_else(|| lectures.lectures.with(|l| local_stats(l)))
    });

    let greeting = move || {
        auth.user.with(|u| match u {
            Some(u) => format!("Hello, {}", u.display_name()),
            None => "Hello".to_string(),
        })
    };

    view! {
        <div class="mx-auto flex max-w-2xl flex-col gap-5">
            <section class="flex flex-col gap-1">
                <span class="text-sm text-muted-foreground">{greeting}</span>
                <h2 class="text-xl font-semibold">"Turn recordings into notes"</h2>
                <p class="text-sm text-muted-foreground">
                    "Transcription, summaries and key points for lectures and interviews."
                </p>
            </section>

            <button
                class="flex items-center gap-3 rounded-2xl bg-primary p-4 text-left text-primary-foreground"
                on:click=move |_| view_store.set_view(View::Upload)
            >
                <div class="flex size-10 items-center justify-center rounded-xl bg-white/15">
                    <Mic class="size-5" />
                </div>
                <div class="flex flex-1 flex-col">
                    <span class="font-medium">"New recording"</span>
                    <span class="text-xs opacity-80">"Upload audio or video"</span>
                </div>
                <ChevronRight class="size-5" />
            </button>

            <section class="flex flex-col gap-2">
                <h3 class="text-sm font-semibold">"Overview"</h3>
                <div class="grid grid-cols-3 gap-2">
                    <StatCard label="Ready" value=Signal::derive(move || stats.get().completed) tone="bg-emerald-500/10 text-emerald-700" />
                    <StatCard label="Processing" value=Signal::derive(move || stats.get().processing) tone="bg-amber-500/10 text-amber-700" />
                    <StatCard label="Total" value=Signal::derive(move || stats.get().total) tone="bg-violet-500/10 text-violet-700" />
                </div>
            </section>

            {move || {
                subscription.balance.get().map(|b| {
                    let used = b.used_percentage();
                    view! {
                        <Card>
                            <div class="flex items-center justify-between text-sm">
                                <span class="font-medium">{b.plan_display_name.clone()}</span>
                                <span class="text-muted-foreground">
                                    {format!("{:.0} min left", b.total_available)}
                                </span>
                            </div>
                            <ProgressBar percentage=used />
                        </Card>
                    }
                })
            }}

            <Show when=move || lectures.lectures.with(|l| !l.is_empty())>
                <section class="flex flex-col gap-2">
                    <div class="flex items-center justify-between">
                        <h3 class="text-sm font-semibold">"Recent"</h3>
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            on:click=move |_| view_store.set_view(View::Lectures)
                        >
                            "See all"
                            <ChevronRight />
                        </Button>
                    </div>
                    <div class="flex flex-col gap-2">
                        {move || {
                            lectures
                                .lectures
                                .get()
                                .into_iter()
                                .take(RECENT_COUNT)
                                .map(|l| view! { <LectureRow lecture=l /> })
                                .collect_view()
                        }}
                    </div>
                </section>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_stats_counts_processing_states() {
        let lectures: Vec<Lecture> = ["completed", "failed", "transcribing", "uploaded", "completed"]
            .iter()
            .enumerate()
            .map(|(i, s)| {
                serde_json::from_value(serde_json::json!({ "id": i.to_string(), "status": s }))
                    .expect("lecture")
            })
            .collect();
        let stats = local_stats(&lectures);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.processing, 2);
    }
}
