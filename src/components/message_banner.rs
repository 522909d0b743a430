//! Banner for the single feedback message slot.

use leptos::prelude::*;

use crate::state::form::FormState;

#[component]
pub fn MessageBanner() -> impl IntoView {
    let form = expect_context::<RwSignal<FormState>>();
    let current = move || form.with(|s| s.feedback.current().cloned());

    view! {
        <Show when=move || form.with(|s| s.feedback.current().is_some())>
            <p class=move || current().map_or("message", |m| m.kind.css_class()) role="status">
                {move || current().map(|m| m.text).unwrap_or_default()}
            </p>
        </Show>
    }
}
