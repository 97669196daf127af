use super::confirm;
use crate::api::{TagCreateRequest, TagUpdateRequest};
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardDescription, CardHeader, CardTitle, ColorPicker,
    ErrorAlert, Input, LogView, Modal, ModalBody, ProgressBar, Separator, Spinner,
};
use crate::config;
use crate::google;
use crate::models::Tag;
use crate::state::{AppContext, Provider, DEFAULT_COLOR};
use crate::util::{format_date, format_date_time, format_price};
use icons::{Check, Crown, Link, LogOut, Pencil, Trash2, Unlink};
use leptos::prelude::*;
use leptos::task::spawn_local;

const GOOGLE_LINK_BUTTON_ID: &str = "google-link-button";

#[component]
fn AccountCard() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let auth = app_state.0.auth;

    view! {
        {move || {
            auth.user.get().map(|user| {
                let name = user.display_name();
                let initial = name
                    .chars()
                    .next()
                    .map(|c| c.to_uppercase().to_string())
                    .unwrap_or_else(|| "U".to_string());
                view! {
                    <Card>
                        <div class="flex items-center gap-3">
                            <div class="flex size-12 items-center justify-center rounded-full bg-primary text-lg font-semibold text-primary-foreground">
                                {initial}
                            </div>
                            <div class="flex min-w-0 flex-col">
                                <span class="truncate font-medium">{name}</span>
                                <span class="truncate text-xs text-muted-foreground">
                                    {user.email.clone().unwrap_or_default()}
                                </span>
                            </div>
                        </div>
                    </Card>
                }
            })
        }}
    }
}

#[component]
fn SubscriptionCard(pricing_open: RwSignal<bool>) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let subscription = app_state.0.subscription;

    spawn_local(subscription.fetch_balance());
    spawn_local(subscription.fetch_subscription());

    view! {
        <Card>
            <CardHeader>
                <div class="flex flex-col gap-1">
                    <CardTitle class="text-base">"Subscription"</CardTitle>
                    <CardDescription class="text-xs">"Transcription minutes"</CardDescription>
                </div>
                <Button size=ButtonSize::Sm on:click=move |_| pricing_open.set(true)>
                    <Crown />
                    "Upgrade"
                </Button>
            </CardHeader>

            {move || {
                if subscription.loading_balance.get() && subscription.balance.with(|b| b.is_none()) {
                    return view! { <Spinner /> }.into_any();
                }
                match subscription.balance.get() {
                    Some(b) => {
                        let used = b.used_percentage();
                        view! {
                            <div class="flex flex-col gap-2">
                                <div class="flex items-center justify-between text-sm">
                                    <span class="font-medium">{b.plan_display_name.clone()}</span>
                                    <span class="text-muted-foreground">
                                        {format!("{:.0} / {:.0} min", b.plan_minutes_remaining, b.plan_minutes_total)}
                                    </span>
                                </div>
                                <ProgressBar percentage=used />
                                <div class="flex justify-between text-xs text-muted-foreground">
                                    <span>{format!("Bonus: {:.0} min", b.bonus_minutes)}</span>
                                    <span>{format!("Renews {}", format_date(&b.billing_cycle_end))}</span>
                                </div>
                            </div>
                        }
                        .into_any()
                    }
                    None => view! {
                        <span class="text-sm text-muted-foreground">"No active plan"</span>
                    }
                    .into_any(),
                }
            }}
        </Card>
    }
}

#[component]
fn PricingModal(open: RwSignal<bool>) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let subscription = app_state.0.subscription;

    Effect::new(move |_| {
        if open.get() {
            spawn_local(subscription.fetch_plans());
            spawn_local(subscription.fetch_packages());
        }
    });

    let current_plan = move || subscription.balance.with(|b| b.as_ref().map(|b| b.plan_name.clone()));

    view! {
        <Modal open=open title="Plans">
            <ModalBody>
                <ErrorAlert error=subscription.error on_dismiss=Callback::new(move |_| subscription.clear_error()) />

                <div class="flex flex-col gap-3">
                    {move || {
                        subscription
                            .plans
                            .get()
                            .into_iter()
                            .filter(|p| p.is_active)
                            .map(|plan| {
                                let is_current = current_plan().as_deref() == Some(plan.name.as_str());
                                let name = plan.name.clone();
                                let features = plan.features.clone().unwrap_or_default();
                                let variant = if is_current { ButtonVariant::Outline } else { ButtonVariant::Default };
                                view! {
                                    <div class="flex flex-col gap-2 rounded-xl border p-3">
                                        <div class="flex items-center justify-between">
                                            <span class="font-medium">{plan.display_name.clone()}</span>
                                            <span class="text-sm">
                                                {if plan.price_uzs == 0 {
                                                    "Free".to_string()
                                                } else {
                                                    format!("{} UZS / mo", format_price(plan.price_uzs))
                                                }}
                                            </span>
                                        </div>
                                        <span class="text-xs text-muted-foreground">
                                            {format!("{} minutes per month", plan.minutes_per_month)}
                                        </span>
                                        <ul class="flex flex-col gap-1 text-xs">
                                            {features
                                                .into_iter()
                                                .map(|f| view! {
                                                    <li class="flex items-center gap-1.5">
                                                        <Check class="size-3 text-emerald-600" />
                                                        {f}
                                                    </li>
                                                })
                                                .collect_view()}
                                        </ul>
                                        <Button
                                            size=ButtonSize::Sm
                                            variant=variant
                                            attr:disabled=move || is_current || subscription.activating_plan.get()
                                            on:click=move |_| spawn_local({
                                                let name = name.clone();
                                                async move {
                                                    subscription.activate_plan(name).await;
                                                }
                                            })
                                        >
                                            {if is_current { "Current plan" } else { "Choose" }}
                                        </Button>
                                    </div>
                                }
                            })
                            .collect_view()
                    }}
                </div>

                <Separator />

                <div class="flex flex-col gap-2">
                    <span class="text-sm font-semibold">"Extra minutes"</span>
                    {move || {
                        subscription
                            .packages
                            .get()
                            .into_iter()
                            .filter(|p| p.is_active)
                            .map(|package| {
                                let name = package.name.clone();
                                view! {
                                    <div class="flex items-center justify-between gap-2 rounded-xl border p-3">
                                        <div class="flex flex-col">
                                            <span class="text-sm font-medium">{package.display_name.clone()}</span>
                                            <span class="text-xs text-muted-foreground">
                                                {format!("{} min · {} UZS", package.minutes, format_price(package.price_uzs))}
                                            </span>
                                        </div>
                                        <Button
                                            size=ButtonSize::Sm
                                            variant=ButtonVariant::Outline
                                            attr:disabled=move || subscription.purchasing_package.get()
                                            on:click=move |_| spawn_local({
                                                let name = name.clone();
                                                async move {
                                                    subscription.purchase_package(name).await;
                                                }
                                            })
                                        >
                                            "Buy"
                                        </Button>
                                    </div>
                                }
                            })
                            .collect_view()
                    }}
                </div>
            </ModalBody>
        </Modal>
    }
}

#[component]
fn TransactionsCard() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let subscription = app_state.0.subscription;

    spawn_local(subscription.fetch_transactions(1));

    view! {
        <Card>
            <CardTitle class="text-base">"History"</CardTitle>
            {move || {
                let items = subscription.transactions.get();
                if items.is_empty() {
                    return view! {
                        <span class="text-sm text-muted-foreground">"No transactions yet"</span>
                    }
                    .into_any();
                }
                items
                    .into_iter()
                    .map(|t| {
                        let (sign, tone) = if t.kind.is_credit() {
                            ("+", "text-emerald-600")
                        } else {
                            ("-", "text-muted-foreground")
                        };
                        view! {
                            <div class="flex items-center justify-between gap-2 text-sm">
                                <div class="flex min-w-0 flex-col">
                                    <span class="truncate">
                                        {t.description.clone().unwrap_or_else(|| t.kind.label().to_string())}
                                    </span>
                                    <span class="text-xs text-muted-foreground">{format_date_time(&t.created_at)}</span>
                                </div>
                                <span class=format!("shrink-0 font-medium {tone}")>
                                    {format!("{sign}{:.1} min", t.minutes.abs())}
                                </span>
                            </div>
                        }
                    })
                    .collect_view()
                    .into_any()
            }}
            {move || {
                subscription.transactions_pagination.get().filter(|p| p.total_pages > 1).map(|p| {
                    let page = p.page;
                    view! {
                        <div class="flex items-center justify-between">
                            <Button
                                variant=ButtonVariant::Ghost
                                size=ButtonSize::Sm
                                attr:disabled={!p.has_prev}
                                on:click=move |_| spawn_local(subscription.fetch_transactions(page.saturating_sub(1).max(1)))
                            >
                                "Newer"
                            </Button>
                            <span class="text-xs text-muted-foreground">
                                {format!("{} / {}", p.page, p.total_pages)}
                            </span>
                            <Button
                                variant=ButtonVariant::Ghost
                                size=ButtonSize::Sm
                                attr:disabled={!p.has_next}
                                on:click=move |_| spawn_local(subscription.fetch_transactions(page + 1))
                            >
                                "Older"
                            </Button>
                        </div>
                    }
                })
            }}
        </Card>
    }
}

#[component]
fn LinkedAccountsCard() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let linking = app_state.0.linking;
    let auth = app_state.0.auth;

    spawn_local(linking.fetch_status());

    let google_linked = move || linking.status.with(|s| s.as_ref().is_some_and(|s| s.google.linked));

    // Offer Google linking through the GIS button once we know it's unlinked.
    Effect::new(move |_| {
        if linking.status.with(|s| s.is_none()) || google_linked() {
            return;
        }
        if let Some(client_id) = config::google_client_id() {
            google::render_button(client_id, GOOGLE_LINK_BUTTON_ID, move |id_token| {
                spawn_local(async move {
                    if linking.link_google(id_token).await {
                        auth.fetch_user().await;
                    }
                });
            });
        }
    });

    let on_unlink = move |provider: Provider| {
        let message = match provider {
            Provider::Google => "Unlink Google? You will sign in with Telegram only.",
            Provider::Telegram => "Unlink Telegram? You will sign in with Google only.",
        };
        if confirm(message) {
            spawn_local(async move {
                linking.unlink(provider).await;
            });
        }
    };

    let row = move |provider: Provider| {
        let (title, detail) = match provider {
            Provider::Google => (
                "Google",
                Signal::derive(move || {
                    linking.status.with(|s| {
                        s.as_ref().filter(|s| s.google.linked).map(|s| {
                            s.google.email.clone().unwrap_or_else(|| "Connected".to_string())
                        })
                    })
                }),
            ),
            Provider::Telegram => (
                "Telegram",
                Signal::derive(move || {
                    linking.status.with(|s| {
                        s.as_ref().filter(|s| s.telegram.linked).map(|s| {
                            s.telegram
                                .username
                                .as_ref()
                                .map(|u| format!("@{u}"))
                                .unwrap_or_else(|| "Connected".to_string())
                        })
                    })
                }),
            ),
        };

        view! {
            <div class="flex items-center justify-between gap-3">
                <div class="flex min-w-0 flex-col">
                    <span class="text-sm font-medium">{title}</span>
                    <span class="truncate text-xs text-muted-foreground">
                        {move || detail.get().unwrap_or_else(|| "Not connected".to_string())}
                    </span>
                </div>
                {move || {
                    if detail.with(|d| d.is_some()) {
                        view! {
                            <Button
                                variant=ButtonVariant::Outline
                                size=ButtonSize::Sm
                                attr:disabled=move || {
                                    !linking.can_unlink(provider) || linking.unlinking.get() == Some(provider)
                                }
                                on:click=move |_| on_unlink(provider)
                            >
                                <Unlink />
                                "Unlink"
                            </Button>
                        }
                        .into_any()
                    } else if provider == Provider::Telegram {
                        view! {
                            <Show
                                when=move || linking.linking.get() == Some(Provider::Telegram)
                                fallback=move || view! {
                                    <Button
                                        variant=ButtonVariant::Telegram
                                        size=ButtonSize::Sm
                                        on:click=move |_| spawn_local(linking.link_telegram(move || {
                                            spawn_local(auth.fetch_user());
                                        }))
                                    >
                                        <Link />
                                        "Connect"
                                    </Button>
                                }
                            >
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Sm
                                    on:click=move |_| linking.cancel_linking()
                                >
                                    <Spinner />
                                    "Waiting..."
                                </Button>
                            </Show>
                        }
                        .into_any()
                    } else if config::google_client_id().is_some() {
                        view! { <div id=GOOGLE_LINK_BUTTON_ID /> }.into_any()
                    } else {
                        view! { <span class="text-xs text-muted-foreground">"Unavailable"</span> }.into_any()
                    }
                }}
            </div>
        }
    };

    view! {
        <Card>
            <CardTitle class="text-base">"Linked accounts"</CardTitle>
            <ErrorAlert error=linking.error />
            <Show
                when=move || linking.status.with(|s| s.is_some())
                fallback=|| view! { <Spinner /> }
            >
                {row(Provider::Google)}
                <Separator />
                {row(Provider::Telegram)}
            </Show>
        </Card>
    }
}

#[component]
fn TagManagerCard() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let tags = app_state.0.tags;

    let editing: RwSignal<Option<String>> = RwSignal::new(None);
    let name: RwSignal<String> = RwSignal::new(String::new());
    let color: RwSignal<Option<String>> = RwSignal::new(Some(DEFAULT_COLOR.to_string()));
    let modal_open: RwSignal<bool> = RwSignal::new(false);
    let saving: RwSignal<bool> = RwSignal::new(false);

    spawn_local(tags.load_tags(true));

    let open_new = move |_| {
        editing.set(None);
        name.set(String::new());
        color.set(Some(DEFAULT_COLOR.to_string()));
        modal_open.set(true);
    };

    let open_edit = move |tag: &Tag| {
        editing.set(Some(tag.id.clone()));
        name.set(tag.name.clone());
        color.set(tag.color.clone());
        modal_open.set(true);
    };

    let on_save = move |_| {
        let tag_name = name.get_untracked().trim().to_string();
        if tag_name.is_empty() || saving.get_untracked() {
            return;
        }
        saving.set(true);
        let tag_color = color.get_untracked();
        spawn_local(async move {
            let ok = match editing.get_untracked() {
                Some(id) => tags
                    .update_tag(
                        id,
                        TagUpdateRequest {
                            name: Some(tag_name),
                            color: Some(tag_color),
                        },
                    )
                    .await
                    .is_some(),
                None => tags
                    .create_tag(TagCreateRequest {
                        name: tag_name,
                        color: tag_color,
                    })
                    .await
                    .is_some(),
            };
            saving.set(false);
            if ok {
                modal_open.set(false);
            }
        });
    };

    let on_delete = move |tag: &Tag| {
        if !confirm(&format!("Delete tag \"{}\"?", tag.name)) {
            return;
        }
        let id = tag.id.clone();
        spawn_local(async move {
            tags.delete_tag(id).await;
        });
    };

    view! {
        <Card>
            <CardHeader>
                <CardTitle class="text-base">"Tags"</CardTitle>
                <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=open_new>
                    "New tag"
                </Button>
            </CardHeader>
            <ErrorAlert error=tags.error on_dismiss=Callback::new(move |_| tags.clear_error()) />
            {move || {
                let list = tags.tags.get();
                if list.is_empty() {
                    return view! { <span class="text-sm text-muted-foreground">"No tags yet"</span> }.into_any();
                }
                list.into_iter()
                    .map(|tag| {
                        let dot = tag.color.clone().unwrap_or_else(|| DEFAULT_COLOR.to_string());
                        let for_edit = tag.clone();
                        let for_delete = tag.clone();
                        view! {
                            <div class="flex items-center gap-2 text-sm">
                                <span class="size-2.5 rounded-full" style=format!("background-color: {dot}") />
                                <span class="min-w-0 flex-1 truncate">{tag.name.clone()}</span>
                                {tag.lecture_count.map(|c| view! { <span class="text-xs text-muted-foreground">{c}</span> })}
                                <button
                                    type="button"
                                    class="rounded p-1 text-muted-foreground hover:text-foreground"
                                    aria-label="Edit tag"
                                    on:click=move |_| open_edit(&for_edit)
                                >
                                    <Pencil class="size-3.5" />
                                </button>
                                <button
                                    type="button"
                                    class="rounded p-1 text-destructive"
                                    aria-label="Delete tag"
                                    on:click=move |_| on_delete(&for_delete)
                                >
                                    <Trash2 class="size-3.5" />
                                </button>
                            </div>
                        }
                    })
                    .collect_view()
                    .into_any()
            }}

            <Modal
                open=modal_open
                title=Signal::derive(move || {
                    if editing.with(|e| e.is_some()) { "Edit tag" } else { "New tag" }.to_string()
                })
            >
                <ModalBody>
                    <Input placeholder="Tag name" bind_value=name />
                    <ColorPicker value=color />
                    <Button
                        attr:disabled=move || saving.get() || name.with(|n| n.trim().is_empty())
                        on:click=on_save
                    >
                        <Show when=move || saving.get()>
                            <Spinner />
                        </Show>
                        "Save"
                    </Button>
                </ModalBody>
            </Modal>
        </Card>
    }
}

#[component]
fn ApiConfigCard() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let config_store = app_state.0.config;

    let draft: RwSignal<String> = RwSignal::new(config_store.api_url.get_untracked());

    let on_save = move |_| {
        config_store.set_api_url(&draft.get_untracked());
        draft.set(config_store.api_url.get_untracked());
        spawn_local(async move {
            config_store.test_connection().await;
        });
    };

    view! {
        <Card>
            <CardHeader>
                <div class="flex flex-col gap-1">
                    <CardTitle class="text-base">"Server"</CardTitle>
                    <CardDescription class="text-xs">"Leave empty to use this site's origin"</CardDescription>
                </div>
                <Show when=move || config_store.is_connected.get()>
                    <span class="inline-flex items-center gap-1 text-xs text-emerald-600">
                        <Check class="size-3" />
                        "Connected"
                    </span>
                </Show>
            </CardHeader>
            <div class="flex gap-2">
                <Input class="flex-1" placeholder="http://localhost:3000" bind_value=draft />
                <Button attr:disabled=move || config_store.is_testing.get() on:click=on_save>
                    <Show when=move || config_store.is_testing.get()>
                        <Spinner />
                    </Show>
                    "Test"
                </Button>
            </div>
            <Show when=move || config_store.logs.with(|l| !l.is_empty())>
                <LogView entries=config_store.logs />
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    class="self-end"
                    on:click=move |_| config_store.clear_logs()
                >
                    "Clear"
                </Button>
            </Show>
        </Card>
    }
}

#[component]
pub fn SettingsPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let auth = app_state.0.auth;
    let pricing_open: RwSignal<bool> = RwSignal::new(false);

    view! {
        <div class="mx-auto flex max-w-2xl flex-col gap-4">
            <h2 class="text-xl font-semibold">"Settings"</h2>
            <AccountCard />
            <SubscriptionCard pricing_open=pricing_open />
            <TransactionsCard />
            <LinkedAccountsCard />
            <TagManagerCard />
            <ApiConfigCard />

            <Button variant=ButtonVariant::Destructive on:click=move |_| auth.logout()>
                <LogOut />
                "Sign out"
            </Button>

            <p class="text-center text-xs text-muted-foreground">
                {concat!("Lecture Notes v", env!("CARGO_PKG_VERSION"))}
            </p>

            <PricingModal open=pricing_open />
        </div>
    }
}
