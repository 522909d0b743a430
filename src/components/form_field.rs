//! Labelled input bound to one controller field.

use leptos::prelude::*;

use crate::config::FIELD_SERIAL_NUMBER;
use crate::controller::FormController;
use crate::pages::auth::ControllerHandle;
use crate::state::form::FormState;

/// Which field map an input writes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldGroup {
    Login,
    Register,
}

#[component]
pub fn FormField(
    group: FieldGroup,
    name: &'static str,
    label: &'static str,
    input_type: &'static str,
    #[prop(optional)] required: bool,
) -> impl IntoView {
    let form = expect_context::<RwSignal<FormState>>();
    let controller = expect_context::<ControllerHandle>();

    let value = move || {
        form.with(|s| match group {
            FieldGroup::Login => s.login_value(name).to_owned(),
            FieldGroup::Register => s.register_value(name).to_owned(),
        })
    };
    let invalid = move || group == FieldGroup::Register && form.with(|s| s.is_invalid(name));

    let store_text = move |text: String| {
        controller.with_value(|c: &FormController| match group {
            FieldGroup::Login => c.set_login_field(name, text),
            FieldGroup::Register => c.set_register_field(name, text),
        });
    };

    // Serial ownership is checked on change (blur), not per keystroke.
    let checks_serial = group == FieldGroup::Register && name == FIELD_SERIAL_NUMBER;
    let check_serial = move || {
        if !checks_serial {
            return;
        }
        #[cfg(feature = "hydrate")]
        {
            let controller = controller.get_value();
            leptos::task::spawn_local(async move {
                controller.check_serial().await;
            });
        }
    };

    view! {
        <label class="form-field">
            <span class="form-field__label">{label}</span>
            <input
                class="form-field__input"
                class:invalid=invalid
                type=input_type
                name=name
                required=required
                prop:value=value
                on:input=move |ev| store_text(event_target_value(&ev))
                on:change=move |_| check_serial()
            />
        </label>
    }
}
