mod auth;
mod folders;
mod home;
mod layout;
mod lecture_detail;
mod lecture_edit;
mod lecture_tabs;
mod lectures;
mod settings;
mod share_modal;
mod shared_lecture;
mod upload;

pub use auth::AuthPage;
pub use folders::FoldersPage;
pub use home::HomePage;
pub use layout::AppLayout;
pub use lecture_detail::LectureDetailPage;
pub use lectures::LecturesPage;
pub use settings::SettingsPage;
pub use shared_lecture::SharedLecturePage;
pub use upload::UploadPage;

use crate::models::{Lecture, LectureStatus, Tag};
use crate::state::AppContext;
use crate::util::format_date;
use leptos::prelude::*;

/// Adds `id` if absent, removes it otherwise.
fn toggle_id(ids: &mut Vec<String>, id: &str) {
    if let Some(pos) = ids.iter().position(|x| x == id) {
        ids.remove(pos);
    } else {
        ids.push(id.to_string());
    }
}

/// Native confirmation dialog; a missing window counts as "no".
fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// Toggle chip used for filters and option pickers.
fn pill_class(active: bool) -> &'static str {
    if active {
        "inline-flex h-7 shrink-0 items-center gap-1 rounded-full bg-primary px-3 text-xs font-medium text-primary-foreground"
    } else {
        "inline-flex h-7 shrink-0 items-center gap-1 rounded-full border px-3 text-xs text-muted-foreground hover:bg-accent"
    }
}

fn status_class(status: LectureStatus) -> &'static str {
    match status {
        LectureStatus::Completed => "bg-emerald-500/10 text-emerald-600",
        LectureStatus::Failed => "bg-destructive/10 text-destructive",
        _ => "bg-amber-500/10 text-amber-600",
    }
}

#[component]
pub fn StatusBadge(status: LectureStatus) -> impl IntoView {
    view! {
        <span class=format!(
            "inline-flex shrink-0 items-center gap-1 rounded-full px-2 py-0.5 text-xs font-medium {}",
            status_class(status)
        )>
            {status.is_processing().then(|| view! {
                <span class="size-1.5 animate-pulse rounded-full bg-current" />
            })}
            {status.label()}
        </span>
    }
}

#[component]
pub fn TagChip(tag: Tag) -> impl IntoView {
    let color = tag.color.clone().unwrap_or_else(|| crate::state::DEFAULT_COLOR.to_string());
    view! {
        <span
            class="inline-flex items-center rounded-full px-2 py-0.5 text-[11px] font-medium"
            style=format!("background-color: {color}22; color: {color}")
        >
            {tag.name}
        </span>
    }
}

/// Tappable lecture summary used by the home, list and folder views.
#[component]
pub fn LectureRow(lecture: Lecture) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let id = lecture.id.clone();
    let status = lecture.status;
    let title = lecture.display_title().to_string();
    let meta = {
        let duration = lecture
            .duration_formatted
            .clone()
            .unwrap_or_else(|| "Processing...".to_string());
        let language = lecture
            .language
            .map(|l| l.to_string().to_uppercase())
            .unwrap_or_default();
        format!("{duration} · {language} · {}", format_date(&lecture.created_at))
    };
    let tags = lecture.tags.clone().unwrap_or_default();

    view! {
        <button
            type="button"
            class="flex w-full items-center gap-3 rounded-xl border bg-card p-3 text-left transition-colors hover:bg-accent/50"
            on:click=move |_| app_state.0.view.open_lecture_detail(id.clone())
        >
            <div class="min-w-0 flex-1">
                <div class="truncate text-sm font-medium">{title}</div>
                <div class="truncate text-xs text-muted-foreground">{meta}</div>
                {(!tags.is_empty()).then(|| view! {
                    <div class="mt-1 flex flex-wrap gap-1">
                        {tags.into_iter().map(|t| view! { <TagChip tag=t /> }).collect_view()}
                    </div>
                })}
            </div>
            <StatusBadge status=status />
        </button>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_id_adds_then_removes() {
        let mut ids = vec!["a".to_string()];
        toggle_id(&mut ids, "b");
        assert_eq!(ids, vec!["a", "b"]);
        toggle_id(&mut ids, "a");
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn test_status_class_by_outcome() {
        assert!(status_class(LectureStatus::Completed).contains("emerald"));
        assert!(status_class(LectureStatus::Failed).contains("destructive"));
        assert_eq!(
            status_class(LectureStatus::Transcribing),
            status_class(LectureStatus::Uploaded)
        );
    }
}
