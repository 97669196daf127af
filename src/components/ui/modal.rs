use icons::X;
use leptos::ev;
use leptos::prelude::*;
use leptos_dom::helpers::window_event_listener;
use leptos_ui::clx;
use tw_merge::tw_merge;

mod components {
    use super::*;
    clx! {ModalBody, div, "flex flex-col gap-4"}
    clx! {ModalFooter, footer, "flex flex-col-reverse gap-2 pt-2 sm:flex-row sm:justify-end"}
}

pub use components::*;

/// Bottom sheet on phones, centered card on wider screens. Clicking the
/// backdrop, the close button or pressing Escape sets `open` to false.
#[component]
pub fn Modal(
    open: RwSignal<bool>,
    #[prop(into)] title: Signal<String>,
    #[prop(into, optional)] class: String,
    children: ChildrenFn,
) -> impl IntoView {
    let panel_class = tw_merge!(
        "relative flex max-h-[90vh] w-full flex-col gap-4 overflow-y-auto rounded-t-2xl border bg-background p-5 shadow-lg sm:max-w-lg sm:rounded-2xl",
        class
    );
    let panel_class = StoredValue::new(panel_class);
    let children = StoredValue::new(children);

    let key_handle = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Escape" && open.get_untracked() {
            open.set(false);
        }
    });
    on_cleanup(move || key_handle.remove());

    view! {
        <Show when=move || open.get()>
            <div
                data-name="ModalBackdrop"
                class="fixed inset-0 z-50 flex items-end justify-center bg-black/50 sm:items-center"
                on:click=move |_| open.set(false)
            >
                <div
                    data-name="ModalContent"
                    role="dialog"
                    aria-modal="true"
                    class=panel_class.get_value()
                    on:click=|ev| ev.stop_propagation()
                >
                    <div class="flex items-center justify-between gap-2">
                        <h3 class="text-base font-semibold leading-none">{move || title.get()}</h3>
                        <button
                            type="button"
                            class="rounded-md p-1 text-muted-foreground hover:text-foreground"
                            aria-label="Close"
                            on:click=move |_| open.set(false)
                        >
                            <X class="size-4" />
                        </button>
                    </div>
                    {children.with_value(|c| c())}
                </div>
            </div>
        </Show>
    }
}
