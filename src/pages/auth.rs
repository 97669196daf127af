use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardHeader, CardTitle,
    ErrorAlert, Input, Label, Separator, Spinner,
};
use crate::config;
use crate::google;
use crate::state::AppContext;
use crate::telegram;
use leptos::prelude::*;
use leptos::task::spawn_local;

const GOOGLE_BUTTON_ID: &str = "google-signin-button";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    SignIn,
    SignUp,
}

#[component]
pub fn AuthPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let auth = app_state.0.auth;

    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let mode: RwSignal<Mode> = RwSignal::new(Mode::SignIn);
    let in_telegram = telegram::is_telegram_environment();
    let telegram_label = telegram::user()
        .map(|u| format!("Continue as {}", u.first_name))
        .unwrap_or_else(|| "Continue with Telegram".to_string());

    // The button container must be mounted before GIS renders into it.
    Effect::new(move |_| {
        if let Some(client_id) = config::google_client_id() {
            google::render_button(client_id, GOOGLE_BUTTON_ID, move |id_token| {
                spawn_local(async move {
                    auth.login_with_google(id_token).await;
                });
            });
        }
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if auth.is_loading.get_untracked() {
            return;
        }
        let email_val = email.get_untracked();
        let password_val = password.get_untracked();
        spawn_local(async move {
            match mode.get_untracked() {
                Mode::SignIn => auth.login_with_password(email_val, password_val).await,
                Mode::SignUp => auth.register(email_val, password_val).await,
            };
        });
    };

    let on_telegram = move |_| {
        spawn_local(async move {
            auth.login_with_telegram().await;
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center gap-4 px-4 py-10">
                <div class="flex flex-col items-center gap-1 text-center">
                    <span class="text-lg font-semibold">"Lecture Notes"</span>
                    <span class="text-xs text-muted-foreground">
                        "Transcripts and summaries for your recordings"
                    </span>
                </div>

                <Card>
                    <CardHeader class="flex-col">
                        <CardTitle class="text-lg">
                            {move || match mode.get() {
                                Mode::SignIn => "Sign in",
                                Mode::SignUp => "Create account",
                            }}
                        </CardTitle>
                        <CardDescription class="text-xs">"Sign in to continue."</CardDescription>
                    </CardHeader>

                    <CardContent>
                        <div on:click=move |_| auth.clear_error()>
                            <ErrorAlert error=auth.error />
                        </div>

                        {in_telegram.then(|| view! {
                            <Button
                                class="w-full"
                                variant=ButtonVariant::Telegram
                                attr:disabled=move || auth.is_loading.get()
                                on:click=on_telegram
                            >
                                {telegram_label}
                            </Button>
                        })}

                        <div id=GOOGLE_BUTTON_ID class="flex min-h-10 justify-center" />

                        <Separator />

                        <form class="flex flex-col gap-3" on:submit=on_submit>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="email">"Email"</Label>
                                <Input
                                    id="email"
                                    r#type="email"
                                    placeholder="you@example.com"
                                    bind_value=email
                                    required=true
                                />
                            </div>

                            <div class="flex flex-col gap-1.5">
                                <Label html_for="password">"Password"</Label>
                                <Input
                                    id="password"
                                    r#type="password"
                                    placeholder="••••••••"
                                    bind_value=password
                                    required=true
                                />
                            </div>

                            <Button class="w-full" attr:disabled=move || auth.is_loading.get()>
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || auth.is_loading.get()>
                                        <Spinner />
                                    </Show>
                                    {move || match (auth.is_loading.get(), mode.get()) {
                                        (true, _) => "Signing in...",
                                        (false, Mode::SignIn) => "Continue",
                                        (false, Mode::SignUp) => "Sign up",
                                    }}
                                </span>
                            </Button>
                        </form>

                        <Button
                            variant=ButtonVariant::Link
                            size=ButtonSize::Sm
                            class="self-center text-xs"
                            on:click=move |_| {
                                auth.clear_error();
                                mode.update(|m| {
                                    *m = match m {
                                        Mode::SignIn => Mode::SignUp,
                                        Mode::SignUp => Mode::SignIn,
                                    }
                                });
                            }
                        >
                            {move || match mode.get() {
                                Mode::SignIn => "No account? Sign up",
                                Mode::SignUp => "Have an account? Sign in",
                            }}
                        </Button>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}
