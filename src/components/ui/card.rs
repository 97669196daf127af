use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Card, div, "bg-card text-card-foreground flex flex-col gap-3 rounded-2xl border p-4 shadow-sm"}
    clx! {CardHeader, div, "flex items-start justify-between gap-2"}
    clx! {CardTitle, h2, "leading-none font-semibold"}
    clx! {CardDescription, p, "text-muted-foreground text-sm"}
    clx! {CardContent, div, "flex flex-col gap-3"}
    clx! {Badge, span, "inline-flex items-center gap-1 rounded-full px-2 py-0.5 text-xs font-medium"}
    clx! {EmptyState, div, "flex flex-col items-center gap-2 py-10 text-center text-sm text-muted-foreground"}
}

pub use components::*;
