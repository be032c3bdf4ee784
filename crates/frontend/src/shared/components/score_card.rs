use contracts::dashboards::d400_program_results::grading::{format_percentage, Grade};
use leptos::prelude::*;

/// Summary card for a percentage score, colored by its grade
#[component]
pub fn ScoreCard(
    /// Label displayed above the value
    #[prop(into)]
    label: Signal<String>,
    /// Score in percent (None = loading/unavailable)
    #[prop(into)]
    value: Signal<Option<f64>>,
    /// Color the card by grade; plain card otherwise
    #[prop(optional)]
    graded: bool,
    /// Optional subtitle below the value
    #[prop(into, optional)]
    subtitle: Signal<Option<String>>,
) -> impl IntoView {
    let grade = move || value.get().filter(|_| graded).map(Grade::from_score);

    let card_class = move || match grade() {
        Some(grade) => format!("score-card score-card--graded {}", grade.color_class()),
        None => "score-card".to_string(),
    };

    let formatted = move || match value.get() {
        Some(v) => format_percentage(v),
        None => "—".to_string(),
    };

    let grade_view = move || {
        grade().map(|g| view! { <span class="score-card__grade">{g.label()}</span> })
    };

    let subtitle_view = move || {
        subtitle.get().map(|s| {
            view! { <div class="score-card__subtitle">{s}</div> }
        })
    };

    view! {
        <div class=card_class>
            <div class="score-card__content">
                <div class="score-card__label">{move || label.get()}</div>
                <div class="score-card__value">
                    {formatted}
                    {grade_view}
                </div>
                {subtitle_view}
            </div>
        </div>
    }
}
