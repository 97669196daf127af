use crate::components::ui::{Badge, EmptyState};
use crate::models::{
    ActionItem, Chapter, CustDevData, KeyPoint, MindMap, PainPoint, Priority, ProductSuggestion,
    Transcription,
};
use crate::util::{format_duration, format_timestamp};
use leptos::prelude::*;
use serde_json::Value;

/// Fields that name a mind map item; shown first, before its qualifiers.
const PRIMARY_KEYS: &[&str] = &["pain", "goal", "opportunity", "text", "action", "key", "feature"];

fn priority_class(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "bg-destructive/10 text-destructive",
        Priority::Medium => "bg-amber-500/10 text-amber-600",
        Priority::Low => "bg-muted text-muted-foreground",
    }
}

fn ms_to_secs(ms: u64) -> f64 {
    ms as f64 / 1000.0
}

fn item_line(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        Value::Object(fields) => {
            let mut parts: Vec<&str> = PRIMARY_KEYS
                .iter()
                .filter_map(|k| fields.get(*k).and_then(Value::as_str))
                .collect();
            parts.extend(
                fields
                    .iter()
                    .filter(|(k, _)| !PRIMARY_KEYS.contains(&k.as_str()))
                    .filter_map(|(_, v)| v.as_str()),
            );
            (!parts.is_empty()).then(|| parts.join(" · "))
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Flattens one mind map branch into its heading and display lines.
/// Scalar fields become `field: value`; arrays contribute one line per item.
fn branch_lines(key: &str, branch: &Value) -> (String, Vec<String>) {
    let label = branch
        .get("label")
        .and_then(Value::as_str)
        .unwrap_or(key)
        .to_string();
    let mut lines = vec![];
    if let Value::Object(fields) = branch {
        for (field, value) in fields.iter().filter(|(k, _)| k.as_str() != "label") {
            match value {
                Value::Array(items) => lines.extend(items.iter().filter_map(item_line)),
                Value::String(s) => lines.push(format!("{field}: {s}")),
                _ => {}
            }
        }
    } else if let Some(line) = item_line(branch) {
        lines.push(line);
    }
    (label, lines)
}

/// Timestamp that seeks the player when one is attached.
#[component]
fn Timestamp(label: String, secs: Option<f64>, seek: Option<Callback<f64>>) -> impl IntoView {
    match (secs, seek) {
        (Some(secs), Some(seek)) => view! {
            <button
                type="button"
                class="shrink-0 rounded-md bg-primary/10 px-1.5 py-0.5 font-mono text-xs text-primary hover:bg-primary/20"
                on:click=move |_| seek.run(secs)
            >
                {label}
            </button>
        }
        .into_any(),
        _ => view! {
            <span class="shrink-0 px-1.5 py-0.5 font-mono text-xs text-muted-foreground">{label}</span>
        }
        .into_any(),
    }
}

#[component]
pub(super) fn TranscriptView(
    transcription: Transcription,
    #[prop(optional)] seek: Option<Callback<f64>>,
) -> impl IntoView {
    if transcription.segments.is_empty() {
        return if transcription.full_text.trim().is_empty() {
            view! { <EmptyState>"No transcript"</EmptyState> }.into_any()
        } else {
            view! { <p class="whitespace-pre-wrap text-sm leading-relaxed">{transcription.full_text}</p> }
                .into_any()
        };
    }

    let words = transcription
        .word_count
        .map(|n| view! { <span class="text-xs text-muted-foreground">{format!("{n} words")}</span> });

    view! {
        <div class="flex flex-col gap-3">
            {words}
            {transcription
                .segments
                .into_iter()
                .map(|segment| {
                    let secs = segment.start_seconds();
                    view! {
                        <div class="flex gap-2">
                            <Timestamp label=segment.start_time_formatted.clone() secs=secs seek=seek />
                            <div class="flex min-w-0 flex-col gap-0.5">
                                {segment.speaker.map(|s| view! {
                                    <span class="text-xs font-medium text-muted-foreground">{s}</span>
                                })}
                                <p class="text-sm leading-relaxed">{segment.text}</p>
                            </div>
                        </div>
                    }
                })
                .collect_view()}
        </div>
    }
    .into_any()
}

#[component]
pub(super) fn SummaryView(
    overview: String,
    chapters: Vec<Chapter>,
    #[prop(optional)] seek: Option<Callback<f64>>,
) -> impl IntoView {
    view! {
        <div class="flex flex-col gap-4">
            {(!overview.trim().is_empty()).then(|| view! {
                <div class="flex flex-col gap-1">
                    <h3 class="text-sm font-semibold">"Overview"</h3>
                    <p class="whitespace-pre-wrap text-sm leading-relaxed">{overview}</p>
                </div>
            })}
            {(!chapters.is_empty()).then(|| view! {
                <div class="flex flex-col gap-3">
                    <h3 class="text-sm font-semibold">"Chapters"</h3>
                    {chapters
                        .into_iter()
                        .map(|chapter| {
                            let label = if chapter.start_time_formatted.is_empty() {
                                format_duration(chapter.start_time)
                            } else {
                                chapter.start_time_formatted.clone()
                            };
                            view! {
                                <div class="flex gap-2 rounded-xl border p-3">
                                    <Timestamp label=label secs=Some(chapter.start_time) seek=seek />
                                    <div class="flex min-w-0 flex-col gap-1">
                                        <span class="text-sm font-medium">{chapter.title}</span>
                                        <p class="text-sm text-muted-foreground">{chapter.summary}</p>
                                    </div>
                                </div>
                            }
                        })
                        .collect_view()}
                </div>
            })}
        </div>
    }
}

#[component]
pub(super) fn KeyPointsView(
    points: Vec<KeyPoint>,
    #[prop(optional)] seek: Option<Callback<f64>>,
) -> impl IntoView {
    if points.is_empty() {
        return view! { <EmptyState>"No key points"</EmptyState> }.into_any();
    }
    view! {
        <ol class="flex flex-col gap-3">
            {points
                .into_iter()
                .map(|point| {
                    let stamp = point.timestamp.map(|secs| {
                        let label = point
                            .timestamp_formatted
                            .clone()
                            .unwrap_or_else(|| format_duration(secs));
                        view! { <Timestamp label=label secs=Some(secs) seek=seek /> }
                    });
                    view! {
                        <li class="flex gap-3 rounded-xl border p-3">
                            <span class="flex size-6 shrink-0 items-center justify-center rounded-full bg-primary/10 text-xs font-semibold text-primary">
                                {point.index}
                            </span>
                            <div class="flex min-w-0 flex-1 flex-col gap-1">
                                <div class="flex items-start justify-between gap-2">
                                    <span class="text-sm font-medium">{point.title}</span>
                                    {stamp}
                                </div>
                                {point.description.map(|d| view! {
                                    <p class="text-sm text-muted-foreground">{d}</p>
                                })}
                            </div>
                        </li>
                    }
                })
                .collect_view()}
        </ol>
    }
    .into_any()
}

#[component]
pub(super) fn CallSummaryView(
    data: CustDevData,
    #[prop(optional)] seek: Option<Callback<f64>>,
) -> impl IntoView {
    let feedback = data.positive_feedback.unwrap_or_default();
    view! {
        <div class="flex flex-col gap-4">
            {data.call_summary.map(|s| view! {
                <div class="flex flex-col gap-2 rounded-xl border p-3">
                    <span class="text-sm font-semibold">{s.title}</span>
                    <p class="text-sm leading-relaxed">{s.overview}</p>
                    {(!s.customer_mood.is_empty()).then(|| view! {
                        <span class="text-xs text-muted-foreground">{format!("Customer mood: {}", s.customer_mood)}</span>
                    })}
                </div>
            })}
            {(!feedback.is_empty()).then(|| view! {
                <div class="flex flex-col gap-2">
                    <h3 class="text-sm font-semibold">"Positive feedback"</h3>
                    {feedback
                        .into_iter()
                        .map(|f| {
                            let stamp = f.timestamp_ms.map(|ms| view! {
                                <Timestamp label=format_timestamp(ms) secs=Some(ms_to_secs(ms)) seek=seek />
                            });
                            view! {
                                <div class="flex items-start gap-2 rounded-xl border p-3">
                                    <div class="flex min-w-0 flex-1 flex-col gap-0.5">
                                        <span class="text-sm font-medium">{f.feature}</span>
                                        <span class="text-sm text-muted-foreground">{f.benefit}</span>
                                    </div>
                                    {stamp}
                                </div>
                            }
                        })
                        .collect_view()}
                </div>
            })}
        </div>
    }
}

#[component]
pub(super) fn PainPointsView(
    points: Vec<PainPoint>,
    #[prop(optional)] seek: Option<Callback<f64>>,
) -> impl IntoView {
    if points.is_empty() {
        return view! { <EmptyState>"No pain points found"</EmptyState> }.into_any();
    }
    points
        .into_iter()
        .map(|p| {
            let stamp = p.timestamp_ms.map(|ms| view! {
                <Timestamp label=format_timestamp(ms) secs=Some(ms_to_secs(ms)) seek=seek />
            });
            view! {
                <div class="flex items-start gap-2 rounded-xl border border-destructive/20 p-3">
                    <div class="flex min-w-0 flex-1 flex-col gap-0.5">
                        <span class="text-sm font-medium">{p.pain_point}</span>
                        <span class="text-sm text-muted-foreground">{p.impact}</span>
                    </div>
                    {stamp}
                </div>
            }
        })
        .collect_view()
        .into_any()
}

#[component]
pub(super) fn SuggestionsView(suggestions: Vec<ProductSuggestion>) -> impl IntoView {
    if suggestions.is_empty() {
        return view! { <EmptyState>"No suggestions"</EmptyState> }.into_any();
    }
    suggestions
        .into_iter()
        .map(|s| view! {
            <div class="flex flex-col gap-1 rounded-xl border p-3">
                <div class="flex items-center gap-2">
                    <Badge class="bg-secondary text-secondary-foreground">{s.kind}</Badge>
                    <Badge class=priority_class(s.priority)>{s.priority.to_string()}</Badge>
                </div>
                <p class="text-sm">{s.description}</p>
                {s.related_pain_point.map(|p| view! {
                    <span class="text-xs text-muted-foreground">{format!("Addresses: {p}")}</span>
                })}
            </div>
        })
        .collect_view()
        .into_any()
}

#[component]
pub(super) fn ActionsView(
    actions: Vec<ActionItem>,
    #[prop(optional)] seek: Option<Callback<f64>>,
) -> impl IntoView {
    if actions.is_empty() {
        return view! { <EmptyState>"No action items"</EmptyState> }.into_any();
    }
    actions
        .into_iter()
        .map(|a| {
            let stamp = a.timestamp_ms.map(|ms| view! {
                <Timestamp label=format_timestamp(ms) secs=Some(ms_to_secs(ms)) seek=seek />
            });
            view! {
                <div class="flex items-start gap-2 rounded-xl border p-3">
                    <div class="flex min-w-0 flex-1 flex-col gap-1">
                        <p class="text-sm">{a.action}</p>
                        <div class="flex items-center gap-2">
                            <span class="text-xs text-muted-foreground">{a.owner}</span>
                            <Badge class=priority_class(a.priority)>{a.priority.to_string()}</Badge>
                        </div>
                    </div>
                    {stamp}
                </div>
            }
        })
        .collect_view()
        .into_any()
}

#[component]
pub(super) fn MindMapView(map: MindMap) -> impl IntoView {
    let branches: Vec<(String, Vec<String>)> = map
        .branches
        .iter()
        .map(|(key, value)| branch_lines(key, value))
        .filter(|(_, lines)| !lines.is_empty())
        .collect();

    view! {
        <div class="flex flex-col gap-3">
            <div class="flex flex-col items-center gap-1 rounded-2xl bg-primary p-4 text-center text-primary-foreground">
                <span class="font-semibold">{map.central_node.label}</span>
                <span class="text-xs opacity-80">{map.central_node.description}</span>
            </div>
            <div class="grid gap-3 sm:grid-cols-2">
                {branches
                    .into_iter()
                    .map(|(label, lines)| view! {
                        <div class="flex flex-col gap-2 rounded-xl border p-3">
                            <span class="text-sm font-semibold">{label}</span>
                            <ul class="flex list-disc flex-col gap-1 pl-4 text-sm text-muted-foreground">
                                {lines.into_iter().map(|l| view! { <li>{l}</li> }).collect_view()}
                            </ul>
                        </div>
                    })
                    .collect_view()}
            </div>
            {(!map.connections.is_empty()).then(|| view! {
                <div class="flex flex-col gap-1">
                    <h3 class="text-sm font-semibold">"Connections"</h3>
                    {map.connections
                        .into_iter()
                        .map(|c| view! {
                            <p class="text-xs text-muted-foreground">
                                {format!("{} → {}: {}", c.from, c.to, c.reason)}
                            </p>
                        })
                        .collect_view()}
                </div>
            })}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_branch_lines_uses_label_and_items() {
        let branch = json!({
            "label": "Customer profile",
            "items": [{"key": "Role", "value": "PM"}, {"key": "Team", "value": "12"}]
        });
        let (label, lines) = branch_lines("customerProfile", &branch);
        assert_eq!(label, "Customer profile");
        assert_eq!(lines, vec!["Role · PM", "Team · 12"]);
    }

    #[test]
    fn test_branch_lines_puts_primary_field_first() {
        let branch = json!({
            "items": [{"emotion": "annoyed", "pain": "Slow export", "severity": "Major"}]
        });
        let (label, lines) = branch_lines("painPoints", &branch);
        assert_eq!(label, "painPoints");
        assert_eq!(lines, vec!["Slow export · annoyed · Major"]);
    }

    #[test]
    fn test_branch_lines_scalar_fields_and_string_lists() {
        let branch = json!({
            "label": "Journey",
            "currentStage": "Onboarding",
            "touchpoints": ["Email", "Docs"]
        });
        let (_, lines) = branch_lines("journeyStage", &branch);
        assert!(lines.contains(&"currentStage: Onboarding".to_string()));
        assert!(lines.contains(&"Email".to_string()));
        assert!(lines.contains(&"Docs".to_string()));
    }

    #[test]
    fn test_priority_class_highlights_high() {
        assert!(priority_class(Priority::High).contains("destructive"));
        assert_ne!(priority_class(Priority::Medium), priority_class(Priority::Low));
    }
}
