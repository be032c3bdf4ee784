use chrono::Utc;
use contracts::dashboards::d400_program_results::export::{
    export_file_name, to_csv, to_json, to_print_html, ExportFormat,
};
use contracts::dashboards::d400_program_results::grading::format_percentage;
use contracts::dashboards::d400_program_results::{
    DomainScore, DomainWeight, Grade, ProgramAnalysis, WeightedResult,
};
use contracts::shared::lang::{pick_label, Lang};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::dashboards::d400_program_results::api;
use crate::shared::components::page_header::PageHeader;
use crate::shared::components::score_card::ScoreCard;
use crate::shared::components::ui::{Button, GradeBadge};
use crate::shared::export::{download_text, print_html};
use crate::shared::state::loadable::{join_all, Joined, Loadable};
use crate::system::auth::context::use_app;

/// Weighted quality results of one program
#[component]
pub fn ProgramResultsDashboard(
    program_id: i64,
    #[prop(into)]
    program_name: Signal<String>,
) -> impl IntoView {
    let ctx = use_app();
    let lang = ctx.lang;

    let weights = RwSignal::new(Loadable::<Vec<DomainWeight>>::Pending);
    let scores = RwSignal::new(Loadable::<Vec<DomainScore>>::Pending);
    let server_result = RwSignal::new(Loadable::<WeightedResult>::Pending);
    let (export_error, set_export_error) = signal(None::<String>);

    // Three independent requests; a failure in one leaves the others alone
    Effect::new(move |_| {
        let client = ctx.client();
        spawn_local(async move {
            weights.set(Loadable::from_result(api::fetch_domain_weights(&client).await));
        });
    });
    Effect::new(move |_| {
        let client = ctx.client();
        spawn_local(async move {
            scores.set(Loadable::from_result(
                api::fetch_domain_scores(&client, program_id).await,
            ));
        });
    });
    Effect::new(move |_| {
        let client = ctx.client();
        spawn_local(async move {
            server_result.set(Loadable::from_result(
                api::fetch_weighted_result(&client, program_id).await,
            ));
        });
    });

    let joined = Memo::new(move |_| {
        join_all(&[
            weights.with(|w| w.status()),
            scores.with(|s| s.status()),
            server_result.with(|r| r.status()),
        ])
    });

    // The server result is only used for reconciliation; the analysis is
    // computed locally as soon as weights and scores are in
    let analysis = Memo::new(move |_| {
        weights.with(|w| {
            scores.with(|s| {
                let (Some(w), Some(s)) = (w.ready(), s.ready()) else {
                    return None;
                };
                server_result.with(|r| {
                    Some(
                        ProgramAnalysis::build(program_id, w, s, r.ready())
                            .map_err(|e| e.to_string()),
                    )
                })
            })
        })
    });
    let ready = move || analysis.with(|a| a.as_ref().and_then(|r| r.as_ref().ok()).cloned());

    let export = move |format: ExportFormat| {
        let Some(analysis) = ready() else {
            return;
        };
        let now = Utc::now();
        let result = match format {
            ExportFormat::Csv => download_text(
                &to_csv(&analysis, lang.get_untracked()),
                format.mime_type(),
                &export_file_name(program_id, format, now),
            ),
            ExportFormat::Json => match serde_json::to_string_pretty(&to_json(&analysis, now)) {
                Ok(text) => download_text(
                    &text,
                    format.mime_type(),
                    &export_file_name(program_id, format, now),
                ),
                Err(e) => Err(format!("Failed to serialize export: {}", e)),
            },
            ExportFormat::Print => print_html(&to_print_html(
                &analysis,
                &program_name.get_untracked(),
                lang.get_untracked(),
                now,
            )),
        };
        match result {
            Ok(()) => log::info!("Exported program {} as {}", program_id, format.extension()),
            Err(err) => {
                log::error!("Export failed: {}", err);
                set_export_error.set(Some(err));
            }
        }
    };

    let card_label = move |ar: &'static str, en: &'static str| {
        Signal::derive(move || pick_label(lang.get(), ar, en).to_string())
    };

    view! {
        <div class="results-dashboard" dir=move || lang.get().dir()>
            <PageHeader
                title=Signal::derive(move || {
                    format!(
                        "{}: {}",
                        pick_label(lang.get(), "نتائج الجودة", "Quality results"),
                        program_name.get()
                    )
                })
            >
                <Button
                    variant="secondary"
                    size="sm"
                    disabled=Signal::derive(move || ready().is_none())
                    on_click=Callback::new(move |_| export(ExportFormat::Csv))
                >
                    "CSV"
                </Button>
                <Button
                    variant="secondary"
                    size="sm"
                    disabled=Signal::derive(move || ready().is_none())
                    on_click=Callback::new(move |_| export(ExportFormat::Json))
                >
                    "JSON"
                </Button>
                <Button
                    variant="secondary"
                    size="sm"
                    disabled=Signal::derive(move || ready().is_none())
                    on_click=Callback::new(move |_| export(ExportFormat::Print))
                >
                    {move || pick_label(lang.get(), "طباعة / PDF", "Print / PDF")}
                </Button>
            </PageHeader>

            {move || export_error.get().map(|err| view! {
                <div class="page-error">{err}</div>
            })}

            {move || match joined.get() {
                Joined::Waiting => view! {
                    <div class="page-loading">"Loading results…"</div>
                }.into_any(),
                Joined::Failed(errors) => view! {
                    <div class="page-error">
                        <strong>"Some results could not be loaded"</strong>
                        <ul>
                            {errors.into_iter().map(|e| view! { <li>{e}</li> }).collect_view()}
                        </ul>
                    </div>
                }.into_any(),
                Joined::Ready => ().into_any(),
            }}

            {move || analysis.with(|a| match a {
                Some(Err(err)) => Some(view! {
                    <div class="page-error">{err.clone()}</div>
                }),
                _ => None,
            })}

            <Show when=move || joined.get() != Joined::Waiting && ready().is_some()>
                <div class="score-cards">
                    <ScoreCard
                        label=card_label("الدرجة النهائية", "Final score")
                        value=Signal::derive(move || ready().map(|a| a.final_program_score))
                        graded=true
                    />
                    <ScoreCard
                        label=card_label("أقوى مجال", "Strongest domain")
                        value=Signal::derive(move || {
                            ready().and_then(|a| a.strongest().map(|r| r.domain_score))
                        })
                        graded=true
                        subtitle=Signal::derive(move || {
                            ready().and_then(|a| {
                                a.strongest().map(|r| r.label(lang.get()).to_string())
                            })
                        })
                    />
                    <ScoreCard
                        label=card_label("أضعف مجال", "Weakest domain")
                        value=Signal::derive(move || {
                            ready().and_then(|a| a.weakest().map(|r| r.domain_score))
                        })
                        graded=true
                        subtitle=Signal::derive(move || {
                            ready().and_then(|a| {
                                a.weakest().map(|r| r.label(lang.get()).to_string())
                            })
                        })
                    />
                    <ScoreCard
                        label=card_label("مجموع الأوزان", "Weight total")
                        value=Signal::derive(move || ready().map(|a| a.weight_total.total))
                        subtitle=Signal::derive(move || {
                            ready().map(|a| format!("{} indicators", a.total_indicators()))
                        })
                    />
                </div>

                <ResultsTable analysis=Signal::derive(move || ready()) lang=lang.into() />

                <div class="grade-distribution">
                    {move || ready().map(|a| {
                        a.grade_distribution()
                            .into_iter()
                            .map(|(grade, count)| view! {
                                <div class="grade-distribution__item">
                                    <GradeBadge grade=grade lang=lang />
                                    <span class="grade-distribution__count">{count}</span>
                                </div>
                            })
                            .collect_view()
                    })}
                </div>

                {move || ready().filter(|a| !a.warnings.is_empty()).map(|a| view! {
                    <div class="results-warnings">
                        <strong>{pick_label(lang.get(), "تنبيهات", "Data warnings")}</strong>
                        <ul>
                            {a.warnings.iter().map(|w| view! { <li>{w.to_string()}</li> }).collect_view()}
                        </ul>
                    </div>
                })}
            </Show>
        </div>
    }
}

#[component]
fn ResultsTable(analysis: Signal<Option<ProgramAnalysis>>, lang: Signal<Lang>) -> impl IntoView {
    view! {
        <table class="results-table">
            <thead>
                <tr>
                    <th>{move || pick_label(lang.get(), "المجال", "Domain")}</th>
                    <th>{move || pick_label(lang.get(), "المؤشرات", "Indicators")}</th>
                    <th>{move || pick_label(lang.get(), "الوزن", "Weight")}</th>
                    <th>{move || pick_label(lang.get(), "الدرجة", "Score")}</th>
                    <th>{move || pick_label(lang.get(), "الدرجة الموزونة", "Weighted score")}</th>
                    <th>{move || pick_label(lang.get(), "التقدير", "Grade")}</th>
                </tr>
            </thead>
            <tbody>
                <For
                    each=move || analysis.get().map(|a| a.rows).unwrap_or_default()
                    key=|row| row.domain_id
                    children=move |row| {
                        let label = row.clone();
                        let grade = row.grade;
                        view! {
                            <tr>
                                <td>{move || label.label(lang.get()).to_string()}</td>
                                <td class="num">{row.indicator_count}</td>
                                <td class="num">{format_percentage(row.domain_weight)}</td>
                                <td class="num">{format_percentage(row.domain_score)}</td>
                                <td class="num">{format!("{:.2}", row.domain_weighted_score)}</td>
                                <td><GradeBadge grade=grade lang=lang /></td>
                            </tr>
                        }
                    }
                />
            </tbody>
            <tfoot>
                {move || analysis.get().map(|a| view! {
                    <tr class="results-table__total">
                        <td colspan="4">{pick_label(lang.get(), "الدرجة النهائية", "Final score")}</td>
                        <td class="num">{format_percentage(a.final_program_score)}</td>
                        <td><GradeBadge grade=Grade::from_score(a.final_program_score) lang=lang /></td>
                    </tr>
                })}
            </tfoot>
        </table>
    }
}
