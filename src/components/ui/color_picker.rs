use crate::state::PRESET_COLORS;
use leptos::prelude::*;

/// Swatch grid; the leading slashed swatch clears the colour.
#[component]
pub fn ColorPicker(
    value: RwSignal<Option<String>>,
    #[prop(into, optional)] label: Option<String>,
) -> impl IntoView {
    let ring = move |selected: bool| {
        if selected {
            "ring-2 ring-offset-2 ring-foreground"
        } else {
            ""
        }
    };

    view! {
        <div class="flex flex-col gap-2">
            {label.map(|l| view! { <span class="text-xs font-medium text-muted-foreground">{l}</span> })}
            <div class="flex flex-wrap gap-2">
                <button
                    type="button"
                    title="No color"
                    class=move || format!(
                        "size-7 rounded-full border text-xs text-muted-foreground {}",
                        ring(value.with(|v| v.is_none()))
                    )
                    on:click=move |_| value.set(None)
                >
                    "/"
                </button>
                {PRESET_COLORS
                    .iter()
                    .map(|color| {
                        let color = *color;
                        view! {
                            <button
                                type="button"
                                title=color
                                class=move || format!(
                                    "size-7 rounded-full {}",
                                    ring(value.with(|v| v.as_deref() == Some(color)))
                                )
                                style=format!("background-color: {color}")
                                on:click=move |_| value.set(Some(color.to_string()))
                            />
                        }
                    })
                    .collect_view()}
            </div>
        </div>
    }
}
