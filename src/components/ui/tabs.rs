use leptos::prelude::*;

/// Horizontally scrollable tab strip; `active` holds the selected tab id.
#[component]
pub fn Tabs(
    #[prop(into)] tabs: Signal<Vec<(&'static str, &'static str)>>,
    active: RwSignal<&'static str>,
) -> impl IntoView {
    view! {
        <div class="-mx-1 flex gap-1 overflow-x-auto border-b px-1" role="tablist">
            <For
                each=move || tabs.get()
                key=|(id, _)| *id
                children=move |(id, label)| {
                    let class = move || {
                        if active.get() == id {
                            "shrink-0 border-b-2 border-primary px-3 py-2 text-sm font-medium text-foreground"
                        } else {
                            "shrink-0 border-b-2 border-transparent px-3 py-2 text-sm text-muted-foreground hover:text-foreground"
                        }
                    };
                    view! {
                        <button
                            type="button"
                            role="tab"
                            class=class
                            aria-selected=move || (active.get() == id).to_string()
                            on:click=move |_| active.set(id)
                        >
                            {label}
                        </button>
                    }
                }
            />
        </div>
    }
}
