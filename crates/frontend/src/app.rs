use contracts::domain::a003_program::Program;
use contracts::shared::lang::{pick_label, Lang};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::dashboards::ProgramResultsDashboard;
use crate::domain::a002_indicator_response::ui::EvaluationPage;
use crate::domain::a003_program::api::fetch_programs;
use crate::shared::api_client::ApiClient;
use crate::shared::config::ClientConfig;
use crate::shared::state::loadable::Loadable;
use crate::system::auth::context::{use_app, AuthProvider};
use crate::system::auth::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Evaluation,
    Results,
}

#[component]
pub fn App(config: ClientConfig) -> impl IntoView {
    let session = Session::restore();
    if !session.is_authenticated() {
        log::warn!("No access token in storage; the backend will ask for a login");
    }
    let client = ApiClient::new(session, config.api.clone());

    view! {
        <AuthProvider client=client default_lang=config.ui.default_lang>
            <Workspace />
        </AuthProvider>
    }
}

/// Program selector, page switch and the active page
#[component]
fn Workspace() -> impl IntoView {
    let ctx = use_app();
    let lang = ctx.lang;
    let programs = RwSignal::new(Loadable::<Vec<Program>>::Pending);
    let (selected, set_selected) = signal(None::<i64>);
    let (page, set_page) = signal(Page::Evaluation);

    Effect::new(move |_| {
        let client = ctx.client();
        spawn_local(async move {
            let result = fetch_programs(&client).await;
            if let Ok(list) = &result {
                log::info!("Loaded {} programs", list.len());
                if selected.get_untracked().is_none() {
                    set_selected.set(list.first().map(|p| p.id));
                }
            }
            programs.set(Loadable::from_result(result));
        });
    });

    let program_name = Signal::derive(move || {
        let id = selected.get();
        programs.with(|p| {
            p.ready()
                .and_then(|list| list.iter().find(|program| Some(program.id) == id))
                .map(|program| program.label(lang.get()).to_string())
                .unwrap_or_default()
        })
    });

    let user_name = move || {
        ctx.auth.with(|state| {
            state
                .user_info
                .as_ref()
                .map(|u| format!("{} ({})", u.display_name(), u.role.as_str()))
                .unwrap_or_default()
        })
    };

    let tab_class = move |target: Page| {
        move || {
            if page.get() == target {
                "top-bar__tab top-bar__tab--active"
            } else {
                "top-bar__tab"
            }
        }
    };

    view! {
        <div class="app" dir=move || lang.get().dir() lang=move || lang.get().code()>
            <header class="top-bar">
                <select
                    class="top-bar__program"
                    prop:value=move || selected.get().map(|id| id.to_string()).unwrap_or_default()
                    on:change=move |ev| set_selected.set(event_target_value(&ev).parse().ok())
                >
                    {move || {
                        programs
                            .with(|p| p.ready().cloned().unwrap_or_default())
                            .into_iter()
                            .map(|program| view! {
                                <option value=program.id.to_string()>
                                    {program.label(lang.get()).to_string()}
                                </option>
                            })
                            .collect_view()
                    }}
                </select>

                <nav class="top-bar__pages">
                    <button class=tab_class(Page::Evaluation) on:click=move |_| set_page.set(Page::Evaluation)>
                        {move || pick_label(lang.get(), "التقييم", "Evaluation")}
                    </button>
                    <button class=tab_class(Page::Results) on:click=move |_| set_page.set(Page::Results)>
                        {move || pick_label(lang.get(), "النتائج", "Results")}
                    </button>
                </nav>

                <button
                    class="top-bar__lang"
                    on:click=move |_| lang.update(|l| *l = match *l {
                        Lang::En => Lang::Ar,
                        Lang::Ar => Lang::En,
                    })
                >
                    {move || match lang.get() {
                        Lang::En => "العربية",
                        Lang::Ar => "English",
                    }}
                </button>
                <span class="top-bar__user">{user_name}</span>
            </header>

            <main class="app__content">
                {move || programs.with(|p| match p {
                    Loadable::Failed(err) => Some(view! {
                        <div class="page-error">{err.clone()}</div>
                    }),
                    _ => None,
                })}

                // The evaluation page stays mounted across page switches so
                // unsaved edits survive a look at the results
                {move || selected.get().map(|program_id| view! {
                    <div style:display=move || if page.get() == Page::Evaluation { "" } else { "none" }>
                        <EvaluationPage program_id=program_id />
                    </div>
                    <Show when=move || page.get() == Page::Results>
                        <ProgramResultsDashboard program_id=program_id program_name=program_name />
                    </Show>
                })}
            </main>
        </div>
    }
}
