use leptos::prelude::*;

/// Horizontal completion bar for a 0–100 percentage
#[component]
pub fn ProgressBar(
    #[prop(into)]
    percent: Signal<f64>,
    /// Highlights the bar once it reaches 100%
    #[prop(optional, into)]
    completed: Signal<bool>,
) -> impl IntoView {
    let width = move || format!("width: {:.1}%;", percent.get().clamp(0.0, 100.0));
    let class = move || {
        if completed.get() {
            "progress-bar progress-bar--completed"
        } else {
            "progress-bar"
        }
    };

    view! {
        <div class=class role="progressbar" aria-valuemin="0" aria-valuemax="100"
            aria-valuenow=move || format!("{:.0}", percent.get())
        >
            <div class="progress-bar__fill" style=width></div>
            <span class="progress-bar__label">{move || format!("{:.0}%", percent.get())}</span>
        </div>
    }
}
