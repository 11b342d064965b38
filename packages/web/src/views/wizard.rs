use dioxus::prelude::*;

/// "Step 1 of 2" with a progress bar.
#[component]
pub fn StepHeader(step: usize, count: usize, title: String) -> Element {
    let percent = step * 100 / count.max(1);
    rsx! {
        div {
            class: "step-header",
            span { class: "muted", "Step {step} of {count}" }
            h2 { "{title}" }
            div {
                class: "step-progress",
                div { class: "step-progress-fill", style: "width: {percent}%" }
            }
        }
    }
}
