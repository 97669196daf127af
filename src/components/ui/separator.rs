use leptos::prelude::*;
use tw_merge::*;

/// Horizontal rule between sections.
#[component]
pub fn Separator(#[prop(into, optional)] class: String) -> impl IntoView {
    let class = tw_merge!("shrink-0 bg-border w-full h-[1px]", class);

    view! { <div class=class role="separator" /> }
}
