use leptos::prelude::*;
use tw_merge::tw_merge;

#[component]
pub fn ProgressBar(
    /// 0..=100; values outside are clamped.
    #[prop(into)] percentage: Signal<f64>,
    #[prop(into, optional)] class: String,
) -> impl IntoView {
    let class = tw_merge!("h-2 w-full overflow-hidden rounded-full bg-muted", class);
    let width = move || format!("width: {}%", percentage.get().clamp(0.0, 100.0));

    view! {
        <div class=class role="progressbar" aria-valuemin="0" aria-valuemax="100">
            <div class="h-full rounded-full bg-primary transition-[width] duration-300" style=width />
        </div>
    }
}
