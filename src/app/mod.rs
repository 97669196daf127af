use crate::components::ui::LoadingScreen;
use crate::deeplink;
use crate::pages::{
    AppLayout, AuthPage, FoldersPage, HomePage, LectureDetailPage, LecturesPage, SettingsPage,
    SharedLecturePage, UploadPage,
};
use crate::state::{AppContext, AppState, View};
use crate::telegram;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::Router;
use leptos_router::hooks::use_query_map;

#[component]
pub fn App() -> impl IntoView {
    provide_context(AppContext(AppState::new()));

    // Views are switched by the view store; the router only supplies the
    // query map for deep links.
    view! {
        <Router>
            <Shell />
        </Router>
    }
}

#[component]
fn Shell() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let auth = app_state.0.auth;
    let view_store = app_state.0.view;
    let initializing: RwSignal<bool> = RwSignal::new(true);

    let query = use_query_map();
    let links = query.with_untracked(|q| {
        deeplink::resolve(
            telegram::start_param().as_deref(),
            q.get("share").as_deref(),
            q.get("lecture").as_deref(),
        )
    });

    spawn_local(async move {
        auth.initialize().await;
        if links.strip_query {
            deeplink::strip_query_from_url();
        }
        if let Some(link) = links.target() {
            view_store.follow_link(link);
        }
        initializing.set(false);
    });

    // Memos so sidebar toggles and repeated auth writes do not remount pages.
    let current = Memo::new(move |_| view_store.current());
    let signed_in = Memo::new(move |_| auth.is_authenticated.get());

    move || {
        if initializing.get() {
            return view! { <LoadingScreen /> }.into_any();
        }
        let current = current.get();
        // Shared lectures are public.
        if current == View::SharedLecture {
            return view! { <SharedLecturePage /> }.into_any();
        }
        if !signed_in.get() {
            return view! { <AuthPage /> }.into_any();
        }
        if current.is_standalone() {
            return view! { <LectureDetailPage /> }.into_any();
        }
        view! { <AppLayout>{page_for(current)}</AppLayout> }.into_any()
    }
}

fn page_for(view: View) -> AnyView {
    match view {
        View::Upload => view! { <UploadPage /> }.into_any(),
        View::Lectures => view! { <LecturesPage /> }.into_any(),
        View::Folders => view! { <FoldersPage /> }.into_any(),
        View::Settings => view! { <SettingsPage /> }.into_any(),
        _ => view! { <HomePage /> }.into_any(),
    }
}
