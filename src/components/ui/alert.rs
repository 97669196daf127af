use icons::X;
use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Alert, div, "relative w-full rounded-xl border px-4 py-3 text-sm"}
    clx! {AlertDescription, p, "text-sm leading-relaxed"}
}

pub use components::*;

/// Destructive alert shown while `error` holds a message. With `on_dismiss`
/// it gets a close button.
#[component]
pub fn ErrorAlert(
    #[prop(into)] error: Signal<Option<String>>,
    #[prop(optional)] on_dismiss: Option<Callback<()>>,
) -> impl IntoView {
    view! {
        {move || {
            error.get().map(|e| {
                view! {
                    <Alert class="border-destructive/30 bg-destructive/5 flex items-start gap-2">
                        <AlertDescription class="text-destructive text-xs flex-1">{e}</AlertDescription>
                        {on_dismiss.map(|cb| view! {
                            <button
                                type="button"
                                class="text-destructive/70 hover:text-destructive"
                                aria-label="Dismiss"
                                on:click=move |_| cb.run(())
                            >
                                <X class="size-3.5" />
                            </button>
                        })}
                    </Alert>
                }
            })
        }}
    }
}
