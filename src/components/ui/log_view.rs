use crate::state::{LogEntry, LogKind};
use leptos::html;
use leptos::prelude::*;

fn line_class(kind: LogKind) -> &'static str {
    match kind {
        LogKind::Info => "text-muted-foreground",
        LogKind::Success => "text-emerald-600",
        LogKind::Error => "text-destructive",
    }
}

/// Monospace log that keeps itself scrolled to the newest line.
#[component]
pub fn LogView(#[prop(into)] entries: Signal<Vec<LogEntry>>) -> impl IntoView {
    let container: NodeRef<html::Div> = NodeRef::new();

    Effect::new(move |_| {
        entries.track();
        if let Some(el) = container.get() {
            el.set_scroll_top(el.scroll_height());
        }
    });

    view! {
        <div
            node_ref=container
            class="max-h-48 overflow-y-auto rounded-xl bg-muted/50 p-3 font-mono text-xs leading-relaxed"
        >
            {move || {
                let entries = entries.get();
                if entries.is_empty() {
                    return view! { <span class="text-muted-foreground">"No logs yet"</span> }.into_any();
                }
                entries
                    .into_iter()
                    .map(|e| {
                        view! {
                            <div class=line_class(e.kind)>{format!("[{}] {}", e.time, e.message)}</div>
                        }
                    })
                    .collect_view()
                    .into_any()
            }}
        </div>
    }
}
