use contracts::dashboards::d400_program_results::grading::Grade;
use contracts::shared::lang::Lang;
use leptos::prelude::*;

use crate::shared::state::response_store::EntryState;

/// Badge component with different variants
#[component]
pub fn Badge(
    /// Badge variant: "primary", "success", "warning", "error", "neutral" (default)
    #[prop(optional, into)]
    variant: MaybeProp<String>,
    /// Badge content
    children: Children,
    /// Additional CSS classes
    #[prop(optional, into)]
    class: MaybeProp<String>,
) -> impl IntoView {
    let variant_class = move || match variant.get().as_deref().unwrap_or("neutral") {
        "primary" => "badge--primary",
        "success" => "badge--success",
        "warning" => "badge--warning",
        "error" => "badge--error",
        _ => "badge--neutral",
    };

    let additional_class = move || class.get().unwrap_or_default();

    view! {
        <span class=move || format!("badge {} {}", variant_class(), additional_class())>
            {children()}
        </span>
    }
}

/// Qualitative grade label for a score
#[component]
pub fn GradeBadge(
    #[prop(into)]
    grade: Signal<Grade>,
    #[prop(optional, into)]
    lang: Signal<Lang>,
) -> impl IntoView {
    let text = move || match lang.get() {
        Lang::Ar => grade.get().label_ar(),
        Lang::En => grade.get().label(),
    };

    view! {
        <span class=move || {
            let g = grade.get();
            format!("badge badge--{} {}", g.badge_variant(), g.color_class())
        }>
            {text}
        </span>
    }
}

/// Save state of one response entry; the error message goes into the tooltip
#[component]
pub fn EntryStateBadge(#[prop(into)] state: Signal<Option<EntryState>>) -> impl IntoView {
    move || {
        state.get().map(|state| {
            let variant = match &state {
                EntryState::Clean => "badge--success",
                EntryState::Dirty => "badge--warning",
                EntryState::Saving => "badge--neutral",
                EntryState::Error(_) => "badge--error",
            };
            let title = match &state {
                EntryState::Error(message) => message.clone(),
                _ => String::new(),
            };
            view! {
                <span class=format!("badge badge--status {}", variant) title=title>
                    {state.label()}
                </span>
            }
        })
    }
}
