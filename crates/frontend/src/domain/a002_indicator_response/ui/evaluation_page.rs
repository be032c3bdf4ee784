use std::collections::HashMap;

use contracts::domain::a001_quality_domain::{Indicator, QualityDomain};
use contracts::domain::a002_indicator_response::ProgressSummary;
use contracts::shared::lang::pick_label;
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::indicator_row::IndicatorRow;
use crate::domain::a001_quality_domain::api as domains_api;
use crate::domain::a002_indicator_response::api;
use crate::shared::components::page_header::PageHeader;
use crate::shared::components::progress_bar::ProgressBar;
use crate::shared::components::ui::{Badge, Button};
use crate::shared::dialogs::confirm;
use crate::shared::state::loadable::{join_all, Joined, Loadable};
use crate::shared::state::response_store::{ResponseKey, ResponseStore};
use crate::system::auth::context::{can_edit_responses, use_app};

/// Indicator evaluation form for one program, grouped by quality domain
#[component]
pub fn EvaluationPage(program_id: i64) -> impl IntoView {
    let ctx = use_app();
    let lang = ctx.lang;
    let can_edit = can_edit_responses();

    let domains = RwSignal::new(Loadable::<Vec<QualityDomain>>::Pending);
    let responses = RwSignal::new(Loadable::<usize>::Pending);
    let indicators = RwSignal::new(HashMap::<i64, Vec<Indicator>>::new());
    let store = RwSignal::new(ResponseStore::new(program_id));
    let (status, set_status) = signal(None::<String>);
    let (saving, set_saving) = signal(false);

    // Domains and responses load independently; indicators follow per domain
    Effect::new(move |_| {
        let client = ctx.client();
        spawn_local(async move {
            let result = domains_api::fetch_domains(&client).await;
            if let Ok(list) = &result {
                for domain_id in list.iter().map(|d| d.id) {
                    let client = client.clone();
                    spawn_local(async move {
                        match domains_api::fetch_indicators(&client, domain_id).await {
                            Ok(items) => indicators.update(|map| {
                                map.insert(domain_id, items);
                            }),
                            Err(err) => {
                                log::warn!("Indicators of domain {} not loaded: {}", domain_id, err)
                            }
                        }
                    });
                }
            }
            domains.set(Loadable::from_result(result));
        });
    });

    Effect::new(move |_| {
        let client = ctx.client();
        spawn_local(async move {
            let result = api::fetch_responses(&client, program_id)
                .await
                .map(|list| {
                    let count = list.len();
                    store.update(|s| s.load(list));
                    count
                });
            responses.set(Loadable::from_result(result));
        });
    });

    let joined = Memo::new(move |_| {
        join_all(&[
            domains.with(|d| d.status()),
            responses.with(|r| r.status()),
        ])
    });

    let summary = Memo::new(move |_| {
        domains.with(|d| {
            let list = d.ready().map(Vec::as_slice).unwrap_or(&[]);
            indicators.with(|map| {
                store.with(|s| ProgressSummary::compute(list, map, &s.answered_by_domain()))
            })
        })
    });
    let unsaved = Memo::new(move |_| store.with(|s| s.unsaved_count()));

    let on_save = Callback::new(move |_: leptos::ev::MouseEvent| {
        if saving.get_untracked() {
            return;
        }
        set_saving.set(true);
        set_status.set(None);
        let client = ctx.client();
        spawn_local(async move {
            let report = api::save_all(&client, store, None).await;
            let message = report
                .error_message()
                .unwrap_or_else(|| format!("Saved {} responses", report.saved));
            set_status.set(Some(message));
            set_saving.set(false);
        });
    });

    let on_remove = Callback::new(move |key: ResponseKey| {
        if !store.with_untracked(|s| s.is_discardable(&key))
            && !confirm("This response has unsaved changes. Remove it anyway?")
        {
            return;
        }
        let client = ctx.client();
        spawn_local(async move {
            if let Err(err) = api::remove_response(&client, store, key).await {
                log::warn!("Deleting response {} failed: {}", key, err);
                set_status.set(Some(format!("Response {} was not deleted: {}", key, err)));
            }
        });
    });

    view! {
        <div class="evaluation-page" dir=move || lang.get().dir()>
            <PageHeader
                title=Signal::derive(move || {
                    pick_label(lang.get(), "تقييم المؤشرات النوعية", "Qualitative indicators").to_string()
                })
                subtitle=format!("Program #{}", program_id)
            >
                <Show when=move || { unsaved.get() > 0 }>
                    <Badge variant="warning">
                        {move || format!("{} unsaved", unsaved.get())}
                    </Badge>
                </Show>
                <Button
                    on_click=on_save
                    busy=Signal::derive(move || saving.get())
                    disabled=Signal::derive(move || !can_edit.get() || unsaved.get() == 0)
                >
                    {move || pick_label(lang.get(), "حفظ", "Save")}
                </Button>
            </PageHeader>

            {move || status.get().map(|message| view! {
                <div class="page-status">{message}</div>
            })}

            {move || match joined.get() {
                Joined::Waiting => view! {
                    <div class="page-loading">"Loading…"</div>
                }.into_any(),
                Joined::Failed(errors) => view! {
                    <div class="page-error">
                        <strong>"Some data could not be loaded"</strong>
                        <ul>
                            {errors.into_iter().map(|e| view! { <li>{e}</li> }).collect_view()}
                        </ul>
                    </div>
                }.into_any(),
                Joined::Ready => ().into_any(),
            }}

            <Show when=move || joined.get() != Joined::Waiting>
                <div class="evaluation-summary">
                    <ProgressBar
                        percent=Signal::derive(move || summary.with(|s| s.overall))
                        completed=Signal::derive(move || summary.with(|s| s.overall >= 100.0))
                    />
                    <span class="evaluation-summary__domains">
                        {move || summary.with(|s| format!(
                            "{} of {} domains complete",
                            s.completed_count(),
                            s.domains.len()
                        ))}
                    </span>
                </div>

                <For
                    each=move || domains.with(|d| d.ready().cloned().unwrap_or_default())
                    key=|domain| domain.id
                    children=move |domain| view! {
                        <DomainSection
                            domain=domain
                            program_id=program_id
                            store=store
                            indicators=indicators
                            summary=summary
                            on_remove=on_remove
                        />
                    }
                />
            </Show>
        </div>
    }
}

#[component]
fn DomainSection(
    domain: QualityDomain,
    program_id: i64,
    store: RwSignal<ResponseStore>,
    indicators: RwSignal<HashMap<i64, Vec<Indicator>>>,
    summary: Memo<ProgressSummary>,
    on_remove: Callback<ResponseKey>,
) -> impl IntoView {
    let lang = use_app().lang;
    let domain_id = domain.id;

    let list = Memo::new(move |_| indicators.with(|map| map.get(&domain_id).cloned()));
    let percent = Signal::derive(move || summary.with(|s| s.progress_for(domain_id)));
    let completed = Signal::derive(move || summary.with(|s| s.is_completed(domain_id)));
    let counts = move || {
        summary.with(|s| {
            s.domains
                .iter()
                .find(|d| d.domain_id == domain_id)
                .map(|d| format!("{}/{}", d.answered, d.total))
                .unwrap_or_default()
        })
    };

    view! {
        <section class="domain-section">
            <div class="domain-section__header">
                <h2 class="domain-section__title">{move || domain.label(lang.get()).to_string()}</h2>
                <span class="domain-section__count">{counts}</span>
                <ProgressBar percent=percent completed=completed />
            </div>
            {move || match list.get() {
                None => view! {
                    <div class="domain-section__loading">"Loading indicators…"</div>
                }.into_any(),
                Some(items) if items.is_empty() => view! {
                    <div class="domain-section__empty">"No indicators in this domain"</div>
                }.into_any(),
                Some(items) => view! {
                    <div class="indicator-list">
                        {items.into_iter().map(|indicator| view! {
                            <IndicatorRow
                                indicator=indicator
                                program_id=program_id
                                store=store
                                on_remove=on_remove
                            />
                        }).collect_view()}
                    </div>
                }.into_any(),
            }}
        </section>
    }
}
