//! Login/registration form state: active view, step cursor, field values.
//!
//! SYSTEM CONTEXT
//! ==============
//! Owned by `FormController`, which wraps every mutation with change
//! notification and network calls. Everything here is synchronous and
//! side-effect free so the navigation rules can be tested directly.
//!
//! INVARIANTS
//! ==========
//! - Exactly one view is active (`ActiveView` is an enum).
//! - The cursor is always in `[0, step_count - 1]`; exactly one step is
//!   visible and it is the cursor.
//! - Step validation only inspects the fields of the visible step.

#[cfg(test)]
#[path = "form_test.rs"]
mod form_test;

use std::collections::{BTreeMap, BTreeSet};

use super::feedback::Feedback;
use crate::config::{
    FIELD_DEVICE_NAME, FIELD_EMAIL, FIELD_PASSWORD, FIELD_SERIAL_NUMBER, FIELD_USERNAME, FieldSpec, StepSpec,
};
use crate::net::types::{LoginRequest, RegisterRequest};

pub const LOGIN_EMAIL: &str = "email";
pub const LOGIN_PASSWORD: &str = "password";

pub const LOGIN_LABEL: &str = "Login";
pub const REGISTER_LABEL: &str = "Register";
pub const NEXT_LABEL: &str = "Next";

/// Which of the two mutually exclusive views is shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActiveView {
    #[default]
    Login,
    Register,
}

/// Controls that can be put in a busy state during a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlId {
    LoginSubmit,
    RegisterSubmit,
    /// The "next" button of the given step.
    Next(usize),
}

/// Enabled flag and label of a button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlState {
    pub enabled: bool,
    pub label: String,
    idle_label: String,
    /// Outstanding `set_busy` calls not yet matched by `restore`.
    holds: usize,
}

impl ControlState {
    pub fn new(label: &str) -> Self {
        Self { enabled: true, label: label.to_owned(), idle_label: label.to_owned(), holds: 0 }
    }

    /// Disable and swap in `busy_label`. Nests: each call needs its own
    /// `restore`.
    pub fn set_busy(&mut self, busy_label: &str) {
        self.holds += 1;
        self.enabled = false;
        busy_label.clone_into(&mut self.label);
    }

    /// Release one busy hold; re-enable and put the idle label back once
    /// none remain.
    pub fn restore(&mut self) {
        self.holds = self.holds.saturating_sub(1);
        if self.holds == 0 {
            self.enabled = true;
            self.label.clone_from(&self.idle_label);
        }
    }

    pub fn is_idle(&self) -> bool {
        self.enabled && self.label == self.idle_label
    }
}

/// Local input problems. `Display` is the user-facing message.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields for this step.")]
    MissingFields(Vec<String>),
    #[error("{label} must be at most {max} characters.")]
    TooLong { field: String, label: String, max: usize },
    #[error("Please enter your email and password.")]
    MissingCredentials,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormState {
    pub view: ActiveView,
    pub feedback: Feedback,
    pub login_submit: ControlState,
    pub register_submit: ControlState,
    steps: Vec<StepSpec>,
    cursor: usize,
    next_controls: Vec<ControlState>,
    register_fields: BTreeMap<String, String>,
    login_fields: BTreeMap<String, String>,
    invalid: BTreeSet<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(crate::config::default_steps())
    }
}

impl FormState {
    /// Fresh state for `steps`. An empty layout gets one empty step so the
    /// cursor always has somewhere to point.
    pub fn new(mut steps: Vec<StepSpec>) -> Self {
        if steps.is_empty() {
            steps.push(StepSpec { title: "", fields: Vec::new() });
        }
        let register_fields = steps
            .iter()
            .flat_map(|s| s.fields.iter())
            .map(|f| (f.name.to_owned(), String::new()))
            .collect();
        let login_fields = [LOGIN_EMAIL, LOGIN_PASSWORD].into_iter().map(|k| (k.to_owned(), String::new())).collect();
        let next_controls = steps.iter().map(|_| ControlState::new(NEXT_LABEL)).collect();
        Self {
            view: ActiveView::Login,
            feedback: Feedback::default(),
            login_submit: ControlState::new(LOGIN_LABEL),
            register_submit: ControlState::new(REGISTER_LABEL),
            steps,
            cursor: 0,
            next_controls,
            register_fields,
            login_fields,
            invalid: BTreeSet::new(),
        }
    }

    // =========================================================
    // Views
    // =========================================================

    pub fn switch_to_register(&mut self) {
        self.view = ActiveView::Register;
        self.show_step(0);
    }

    pub fn switch_to_login(&mut self) {
        self.view = ActiveView::Login;
        self.show_step(0);
    }

    pub fn is_view_visible(&self, view: ActiveView) -> bool {
        self.view == view
    }

    // =========================================================
    // Steps
    // =========================================================

    pub fn steps(&self) -> &[StepSpec] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_last_step(&self) -> bool {
        self.cursor + 1 == self.steps.len()
    }

    /// Make `index` the only visible step, clamping past-the-end indices.
    pub fn show_step(&mut self, index: usize) {
        self.cursor = index.min(self.steps.len() - 1);
    }

    pub fn is_step_visible(&self, index: usize) -> bool {
        index == self.cursor
    }

    /// Validate the visible step and move forward one step on success.
    ///
    /// # Errors
    ///
    /// Returns the first validation problem; the cursor is left unchanged.
    pub fn advance_step(&mut self) -> Result<usize, ValidationError> {
        self.validate_current_step()?;
        if !self.is_last_step() {
            self.show_step(self.cursor + 1);
        }
        Ok(self.cursor)
    }

    pub fn retreat_step(&mut self) -> usize {
        self.show_step(self.cursor.saturating_sub(1));
        self.cursor
    }

    /// Check the visible step's fields, updating invalid markers as a side
    /// effect: failing fields are marked, passing ones cleared.
    ///
    /// # Errors
    ///
    /// `MissingFields` if any required field is blank, else `TooLong` for the
    /// first field over its length limit.
    pub fn validate_current_step(&mut self) -> Result<(), ValidationError> {
        let fields = self.steps[self.cursor].fields.clone();
        let mut missing = Vec::new();
        let mut too_long: Option<&FieldSpec> = None;
        for field in &fields {
            let value = self.register_value(field.name).trim();
            if field.required && value.is_empty() {
                missing.push(field.name.to_owned());
                self.mark_invalid(field.name, true);
            } else if field.max_len.is_some_and(|max| value.len() > max) {
                too_long.get_or_insert(field);
                self.mark_invalid(field.name, true);
            } else {
                self.mark_invalid(field.name, false);
            }
        }
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }
        if let Some(field) = too_long {
            return Err(ValidationError::TooLong {
                field: field.name.to_owned(),
                label: field.label.to_owned(),
                max: field.max_len.unwrap_or_default(),
            });
        }
        Ok(())
    }

    pub fn next_control(&self, step: usize) -> Option<&ControlState> {
        self.next_controls.get(step)
    }

    // =========================================================
    // Controls
    // =========================================================

    pub fn control(&self, id: ControlId) -> Option<&ControlState> {
        match id {
            ControlId::LoginSubmit => Some(&self.login_submit),
            ControlId::RegisterSubmit => Some(&self.register_submit),
            ControlId::Next(step) => self.next_controls.get(step),
        }
    }

    pub fn control_mut(&mut self, id: ControlId) -> Option<&mut ControlState> {
        match id {
            ControlId::LoginSubmit => Some(&mut self.login_submit),
            ControlId::RegisterSubmit => Some(&mut self.register_submit),
            ControlId::Next(step) => self.next_controls.get_mut(step),
        }
    }

    // =========================================================
    // Fields
    // =========================================================

    pub fn register_value(&self, name: &str) -> &str {
        self.register_fields.get(name).map_or("", String::as_str)
    }

    /// Store a registration input. Unknown names are ignored.
    pub fn set_register_value(&mut self, name: &str, value: String) {
        if let Some(slot) = self.register_fields.get_mut(name) {
            *slot = value;
        }
    }

    pub fn login_value(&self, name: &str) -> &str {
        self.login_fields.get(name).map_or("", String::as_str)
    }

    /// Store a login input. Unknown names are ignored.
    pub fn set_login_value(&mut self, name: &str, value: String) {
        if let Some(slot) = self.login_fields.get_mut(name) {
            *slot = value;
        }
    }

    pub fn is_invalid(&self, name: &str) -> bool {
        self.invalid.contains(name)
    }

    pub fn mark_invalid(&mut self, name: &str, invalid: bool) {
        if invalid {
            self.invalid.insert(name.to_owned());
        } else {
            self.invalid.remove(name);
        }
    }

    /// Empty every registration input and drop all invalid markers.
    pub fn clear_registration(&mut self) {
        for value in self.register_fields.values_mut() {
            value.clear();
        }
        self.invalid.clear();
    }

    // =========================================================
    // Payloads
    // =========================================================

    /// Login credentials, trimmed.
    ///
    /// # Errors
    ///
    /// `MissingCredentials` when either field is blank.
    pub fn login_payload(&self) -> Result<LoginRequest, ValidationError> {
        let email = self.login_value(LOGIN_EMAIL).trim();
        let password = self.login_value(LOGIN_PASSWORD);
        if email.is_empty() || password.trim().is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        Ok(LoginRequest { email: email.to_owned(), password: password.to_owned() })
    }

    /// Every registration field, regardless of which step holds it.
    pub fn register_payload(&self) -> RegisterRequest {
        RegisterRequest {
            serial_number: self.register_value(FIELD_SERIAL_NUMBER).trim().to_owned(),
            email: self.register_value(FIELD_EMAIL).trim().to_owned(),
            username: self.register_value(FIELD_USERNAME).trim().to_owned(),
            password: self.register_value(FIELD_PASSWORD).to_owned(),
            device_name: self.register_value(FIELD_DEVICE_NAME).trim().to_owned(),
        }
    }
}
