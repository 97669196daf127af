use icons::LoaderCircle;
use leptos::prelude::*;
use tw_merge::tw_merge;

#[component]
pub fn Spinner(#[prop(into, optional)] class: String) -> impl IntoView {
    let merged_class = tw_merge!("size-4 animate-spin", class);

    view! { <LoaderCircle class=merged_class attr:role="status" attr:aria-label="Loading" /> }
}

/// Centered spinner with a caption, used while a whole screen loads.
#[component]
pub fn LoadingScreen(#[prop(into, default = "Loading...".to_string())] message: String) -> impl IntoView {
    view! {
        <div class="flex min-h-[40vh] flex-col items-center justify-center gap-3 text-muted-foreground">
            <Spinner class="size-8 text-primary" />
            <p class="text-sm">{message}</p>
        </div>
    }
}
