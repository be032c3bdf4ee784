use contracts::domain::a001_quality_domain::Indicator;
use contracts::domain::a002_indicator_response::Evaluation;
use contracts::shared::lang::{pick_label, Lang};
use leptos::prelude::*;

use super::evidence_panel::EvidencePanel;
use crate::domain::a002_indicator_response::evidence_api::EvidenceTarget;
use crate::shared::components::ui::{Button, EntryStateBadge};
use crate::shared::state::response_store::{ResponseKey, ResponseStore};
use crate::system::auth::context::{can_edit_responses, use_app};

/// One indicator with its answer, notes and evidence.
/// Inputs are read-only unless the user may edit responses.
#[component]
pub fn IndicatorRow(
    indicator: Indicator,
    program_id: i64,
    store: RwSignal<ResponseStore>,
    on_remove: Callback<ResponseKey>,
) -> impl IntoView {
    let lang = use_app().lang;
    let can_edit = can_edit_responses();
    let key = ResponseKey::new(indicator.domain, indicator.id);
    let target = EvidenceTarget {
        program_id,
        domain_id: indicator.domain,
        indicator_id: indicator.id,
    };

    let entry = Memo::new(move |_| store.with(|s| s.get(&key).cloned()));
    let (show_evidence, set_show_evidence) = signal(false);

    let select = move |evaluation: Evaluation| {
        let notes = entry.get_untracked().map(|e| e.notes).unwrap_or_default();
        store.update(|s| s.set_response(key.domain_id, key.indicator_id, evaluation, notes));
    };

    let radio_name = format!("evaluation-{}", key);
    let options = Evaluation::ALL
        .into_iter()
        .map(|evaluation| {
            view! {
                <label class="evaluation-option">
                    <input
                        type="radio"
                        name=radio_name.clone()
                        prop:checked=move || {
                            entry.with(|e| e.as_ref().map(|e| e.evaluation) == Some(evaluation))
                        }
                        disabled=move || !can_edit.get()
                        on:change=move |_| select(evaluation)
                    />
                    {move || match lang.get() {
                        Lang::Ar => evaluation.label_ar(),
                        Lang::En => evaluation.label(),
                    }}
                </label>
            }
        })
        .collect_view();

    view! {
        <div class="indicator-row" data-key=key.to_string()>
            <div class="indicator-row__main">
                <div class="indicator-row__text">{indicator.text.clone()}</div>
                <div class="indicator-row__options">{options}</div>
                <EntryStateBadge state=Signal::derive(move || entry.get().map(|e| e.state)) />
            </div>

            // Notes belong to an answer; pick an evaluation first
            <textarea
                class="indicator-row__notes"
                placeholder=move || pick_label(lang.get(), "ملاحظات", "Notes")
                prop:value=move || entry.with(|e| e.as_ref().map(|e| e.notes.clone()).unwrap_or_default())
                disabled=move || !can_edit.get() || entry.with(|e| e.is_none())
                on:change=move |ev| {
                    let notes = event_target_value(&ev);
                    store.update(|s| {
                        s.set_notes(&key, notes);
                    });
                }
            ></textarea>

            <div class="indicator-row__actions">
                <Button
                    variant="ghost"
                    size="sm"
                    on_click=Callback::new(move |_| set_show_evidence.update(|v| *v = !*v))
                >
                    {move || pick_label(lang.get(), "الأدلة", "Evidence")}
                </Button>
                <Show when=move || can_edit.get() && entry.with(|e| e.is_some())>
                    <Button
                        variant="danger"
                        size="sm"
                        on_click=Callback::new(move |_| on_remove.run(key))
                    >
                        {move || pick_label(lang.get(), "حذف", "Remove")}
                    </Button>
                </Show>
            </div>

            <Show when=move || show_evidence.get()>
                <EvidencePanel target=target can_edit=can_edit />
            </Show>
        </div>
    }
}
