use contracts::domain::a002_indicator_response::evidence::ALLOWED_MIME_TYPES;
use contracts::domain::a002_indicator_response::{Evidence, EvidenceKind};
use contracts::shared::lang::pick_label;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;
use web_sys::{File, HtmlInputElement};

use crate::domain::a002_indicator_response::evidence_api::{self, EvidenceTarget};
use crate::shared::components::ui::Button;
use crate::shared::dialogs::{alert, confirm};
use crate::shared::state::loadable::Loadable;
use crate::system::auth::context::use_app;

/// Files and links attached to one indicator response
#[component]
pub fn EvidencePanel(target: EvidenceTarget, #[prop(into)] can_edit: Signal<bool>) -> impl IntoView {
    let ctx = use_app();
    let lang = ctx.lang;

    let items = RwSignal::new(Loadable::<Vec<Evidence>>::Pending);
    let (message, set_message) = signal(None::<String>);
    let (busy, set_busy) = signal(false);
    let (url_input, set_url_input) = signal(String::new());
    let (url_name, set_url_name) = signal(String::new());

    let reload = move || {
        let client = ctx.client();
        spawn_local(async move {
            let result = evidence_api::fetch_evidence(&client, target).await;
            items.set(Loadable::from_result(result));
        });
    };
    reload();

    let on_files = move |ev: web_sys::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        let files: Vec<File> = match input.files() {
            Some(list) => (0..list.length()).filter_map(|i| list.get(i)).collect(),
            None => Vec::new(),
        };
        // Same files can be picked again
        input.set_value("");
        if files.is_empty() {
            return;
        }

        set_busy.set(true);
        set_message.set(None);
        let client = ctx.client();
        spawn_local(async move {
            let report = evidence_api::upload_evidence_files(&client, target, files).await;
            if !report.errors.is_empty() {
                let text = report.errors.join("\n");
                alert(&text);
                set_message.set(Some(text));
            }
            if !report.uploaded.is_empty() {
                reload();
            }
            set_busy.set(false);
        });
    };

    let on_add_url = Callback::new(move |_: leptos::ev::MouseEvent| {
        let raw = url_input.get_untracked();
        let name = url_name.get_untracked();
        set_busy.set(true);
        set_message.set(None);
        let client = ctx.client();
        spawn_local(async move {
            match evidence_api::add_evidence_url(&client, target, &raw, &name).await {
                Ok(_) => {
                    set_url_input.set(String::new());
                    set_url_name.set(String::new());
                    reload();
                }
                Err(err) => set_message.set(Some(err.to_string())),
            }
            set_busy.set(false);
        });
    });

    let download = move |evidence: Evidence| {
        let client = ctx.client();
        spawn_local(async move {
            if let Err(err) = evidence_api::download_evidence(&client, &evidence).await {
                set_message.set(Some(err.to_string()));
            }
        });
    };

    let delete = move |id: i64, name: String| {
        if !confirm(&format!("Delete evidence \"{}\"?", name)) {
            return;
        }
        let client = ctx.client();
        spawn_local(async move {
            match evidence_api::delete_evidence(&client, id).await {
                Ok(()) => items.update(|state| {
                    if let Loadable::Ready(list) = state {
                        list.retain(|e| e.id != id);
                    }
                }),
                Err(err) => set_message.set(Some(err.to_string())),
            }
        });
    };

    view! {
        <div class="evidence-panel">
            {move || match items.get() {
                Loadable::Pending => view! {
                    <div class="evidence-panel__loading">"Loading evidence…"</div>
                }.into_any(),
                Loadable::Failed(err) => view! {
                    <div class="evidence-panel__error">{err}</div>
                }.into_any(),
                Loadable::Ready(list) if list.is_empty() => view! {
                    <div class="evidence-panel__empty">
                        {pick_label(lang.get(), "لا توجد أدلة", "No evidence attached")}
                    </div>
                }.into_any(),
                Loadable::Ready(list) => view! {
                    <ul class="evidence-list">
                        {list.into_iter().map(|evidence| {
                            let id = evidence.id;
                            let name = evidence.name.clone();
                            let link = match evidence.kind {
                                EvidenceKind::File => {
                                    let label = evidence.name.clone();
                                    view! {
                                        <a href="#" class="evidence-item__file" on:click=move |ev| {
                                            ev.prevent_default();
                                            download(evidence.clone());
                                        }>{label}</a>
                                    }.into_any()
                                }
                                EvidenceKind::Url => view! {
                                    <a
                                        href=evidence.location.clone()
                                        class="evidence-item__url"
                                        target="_blank"
                                        rel="noopener noreferrer"
                                    >{evidence.name.clone()}</a>
                                }.into_any(),
                            };
                            view! {
                                <li class="evidence-item">
                                    {link}
                                    <Show when=move || can_edit.get()>
                                        <Button
                                            variant="ghost"
                                            size="sm"
                                            on_click=Callback::new({
                                                let name = name.clone();
                                                move |_| delete(id, name.clone())
                                            })
                                        >
                                            "×"
                                        </Button>
                                    </Show>
                                </li>
                            }
                        }).collect_view()}
                    </ul>
                }.into_any(),
            }}

            {move || message.get().map(|m| view! {
                <div class="evidence-panel__message">{m}</div>
            })}

            <Show when=move || can_edit.get()>
                <div class="evidence-panel__upload">
                    <input
                        type="file"
                        multiple=true
                        accept=ALLOWED_MIME_TYPES.join(",")
                        disabled=move || busy.get()
                        on:change=on_files
                    />
                    <input
                        type="url"
                        class="evidence-panel__url"
                        placeholder="https://"
                        prop:value=move || url_input.get()
                        on:input=move |ev| set_url_input.set(event_target_value(&ev))
                    />
                    <input
                        type="text"
                        class="evidence-panel__url-name"
                        placeholder=move || pick_label(lang.get(), "اسم الرابط", "Link name")
                        prop:value=move || url_name.get()
                        on:input=move |ev| set_url_name.set(event_target_value(&ev))
                    />
                    <Button
                        variant="secondary"
                        size="sm"
                        on_click=on_add_url
                        busy=Signal::derive(move || busy.get())
                    >
                        {move || pick_label(lang.get(), "إضافة رابط", "Add link")}
                    </Button>
                </div>
            </Show>
        </div>
    }
}
