//! Account page: login view and the multi-step registration view.
//!
//! SYSTEM CONTEXT
//! ==============
//! Owns the page's `FormController`. The controller pushes a snapshot into
//! a `RwSignal<FormState>` after every change; all markup reads from that
//! snapshot and every handler calls back into the controller.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;

use crate::components::form_field::{FieldGroup, FormField};
use crate::components::message_banner::MessageBanner;
use crate::config::{FormConfig, StepSpec};
use crate::controller::FormController;
use crate::state::form::{ActiveView, FormState, LOGIN_EMAIL, LOGIN_PASSWORD};

/// Context handle on the page controller.
pub type ControllerHandle = StoredValue<FormController, LocalStorage>;

/// CSS `display` value for a section that may be hidden.
pub(crate) fn display_for(visible: bool) -> &'static str {
    if visible { "block" } else { "none" }
}

pub(crate) fn step_heading(index: usize, count: usize, title: &str) -> String {
    format!("Step {} of {count}: {title}", index + 1)
}

#[component]
pub fn AuthPage() -> impl IntoView {
    let controller = FormController::browser(FormConfig::from_document());
    let form = RwSignal::new(controller.state());
    controller.subscribe(move |state| form.set(state.clone()));
    let steps = controller.config().steps.clone();
    let controller: ControllerHandle = StoredValue::new_local(controller);

    provide_context(form);
    provide_context(controller);

    // Effects only run in the browser, so this reads the real localStorage.
    Effect::new(move || {
        controller.with_value(FormController::check_logged_in_status);
    });

    view! {
        <div class="auth-page">
            <h1>"WinkLink"</h1>
            <MessageBanner/>
            <LoginView/>
            <RegisterView steps=steps/>
        </div>
    }
}

#[component]
fn LoginView() -> impl IntoView {
    let form = expect_context::<RwSignal<FormState>>();
    let controller = expect_context::<ControllerHandle>();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        #[cfg(feature = "hydrate")]
        {
            let controller = controller.get_value();
            leptos::task::spawn_local(async move {
                let _ = controller.submit_login().await;
            });
        }
    };

    let on_show_register = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        controller.with_value(FormController::switch_to_register);
    };

    view! {
        <section
            id="login-view"
            class="auth-view"
            style:display=move || display_for(form.with(|s| s.is_view_visible(ActiveView::Login)))
        >
            <h2>"Log in"</h2>
            <form id="login-form" class="auth-form" on:submit=on_submit>
                <FormField group=FieldGroup::Login name=LOGIN_EMAIL label="Email" input_type="email"/>
                <FormField group=FieldGroup::Login name=LOGIN_PASSWORD label="Password" input_type="password"/>
                <button
                    class="auth-button"
                    type="submit"
                    disabled=move || !form.with(|s| s.login_submit.enabled)
                >
                    {move || form.with(|s| s.login_submit.label.clone())}
                </button>
            </form>
            <p class="auth-switch">
                "New device? "
                <a id="show-register" href="#" on:click=on_show_register>"Register it"</a>
            </p>
            <button class="auth-link" type="button" on:click=move |_| controller.with_value(FormController::logout)>"Log out"</button>
        </section>
    }
}

#[component]
fn RegisterView(steps: Vec<StepSpec>) -> impl IntoView {
    let form = expect_context::<RwSignal<FormState>>();
    let controller = expect_context::<ControllerHandle>();
    let count = steps.len();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        #[cfg(feature = "hydrate")]
        {
            let controller = controller.get_value();
            leptos::task::spawn_local(async move {
                let _ = controller.submit_registration().await;
            });
        }
    };

    let on_show_login = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        controller.with_value(FormController::switch_to_login);
    };

    let step_views = steps
        .into_iter()
        .enumerate()
        .map(|(index, step)| {
            let heading = step_heading(index, count, step.title);
            let fields = step
                .fields
                .into_iter()
                .map(|f| {
                    view! {
                        <FormField
                            group=FieldGroup::Register
                            name=f.name
                            label=f.label
                            input_type=f.input_type
                            required=f.required
                        />
                    }
                })
                .collect_view();
            let is_last = index + 1 == count;
            view! {
                <fieldset
                    class="form-step"
                    style:display=move || display_for(form.with(|s| s.is_step_visible(index)))
                >
                    <legend>{heading}</legend>
                    {fields}
                    <div class="form-step__nav">
                        <Show when=move || { index > 0 }>
                            <button
                                class="auth-button auth-button--secondary prev-step"
                                type="button"
                                on:click=move |_| controller.with_value(FormController::retreat_step)
                            >
                                "Back"
                            </button>
                        </Show>
                        <Show
                            when=move || !is_last
                            fallback=move || {
                                view! {
                                    <button
                                        class="auth-button"
                                        type="submit"
                                        disabled=move || !form.with(|s| s.register_submit.enabled)
                                    >
                                        {move || form.with(|s| s.register_submit.label.clone())}
                                    </button>
                                }
                            }
                        >
                            <button
                                class="auth-button next-step"
                                type="button"
                                disabled=move || !form.with(|s| s.next_control(index).is_some_and(|c| c.enabled))
                                on:click=move |_| {
                                    controller.with_value(FormController::advance_step);
                                }
                            >
                                {move || form.with(|s| s.next_control(index).map(|c| c.label.clone()).unwrap_or_default())}
                            </button>
                        </Show>
                    </div>
                </fieldset>
            }
        })
        .collect_view();

    view! {
        <section
            id="register-view"
            class="auth-view"
            style:display=move || display_for(form.with(|s| s.is_view_visible(ActiveView::Register)))
        >
            <h2>"Register a device"</h2>
            <form id="register-form" class="auth-form" on:submit=on_submit>
                {step_views}
            </form>
            <p class="auth-switch">
                "Already registered? "
                <a id="show-login" href="#" on:click=on_show_login>"Log in"</a>
            </p>
        </section>
    }
}
