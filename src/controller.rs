//! Form navigator and submitter.
//!
//! SYSTEM CONTEXT
//! ==============
//! The single owner of login/registration state. DOM handlers call into a
//! cloned `FormController`; the view layer subscribes to state snapshots.
//! Collaborators (backend, storage, timer) are injected so the whole flow
//! runs natively in tests.
//!
//! CONCURRENCY
//! ===========
//! Single-threaded. State sits in a `RefCell` and no borrow is held across
//! an `.await`, so a device lookup can be in flight while a registration is
//! submitting. Controls disabled for a request are re-enabled by a
//! `BusyGuard` drop, which runs on every exit path including the future
//! being dropped.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::config::{FIELD_SERIAL_NUMBER, FormConfig};
use crate::net::api::{Backend, HttpBackend};
use crate::net::types::{ApiError, DeviceLookupRequest};
use crate::state::feedback::MessageKind;
use crate::state::form::{ControlId, FormState, ValidationError};
use crate::util::storage::{AUTH_TOKEN_KEY, KeyValueStore, LocalStorage, USER_ID_KEY};
use crate::util::timer::{BrowserTimer, Timer};

pub const DEVICE_REGISTERED: &str = "This device is already registered.";
pub const NETWORK_ERROR: &str = "Network error. Please try again.";
pub const LOGIN_FAILED: &str = "Login failed.";
pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const REGISTER_FAILED: &str = "Registration failed.";
pub const REGISTER_SUCCESS: &str = "Registration successful! Please log in.";
pub const ALREADY_LOGGED_IN: &str = "You are already logged in.";
pub const LOGGED_OUT: &str = "You have been logged out.";

pub const LOGGING_IN_LABEL: &str = "Logging in...";
pub const REGISTERING_LABEL: &str = "Registering...";
pub const CHECKING_LABEL: &str = "Checking...";

/// Why a submission did not complete. The user has already been shown a
/// message by the time this is returned.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SubmitError {
    fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Invalid(err) => err.to_string(),
            Self::Api(err) => err.user_message(fallback, NETWORK_ERROR),
        }
    }
}

/// Result of a serial-number change check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerialCheck {
    /// Field was blank; no request issued.
    Skipped,
    Owned,
    Available,
    /// Lookup failed; treated as available.
    Failed,
    /// A newer lookup started before this one answered; reply discarded.
    Superseded,
}

type Listener = Rc<dyn Fn(&FormState)>;

struct Inner {
    config: FormConfig,
    state: RefCell<FormState>,
    listener: RefCell<Option<Listener>>,
    backend: Rc<dyn Backend>,
    store: Rc<dyn KeyValueStore>,
    timer: Rc<dyn Timer>,
    /// Ticket of the most recently started serial lookup.
    lookup_seq: Cell<u64>,
}

/// Cheap-to-clone handle on the shared form state.
#[derive(Clone)]
pub struct FormController {
    inner: Rc<Inner>,
}

impl FormController {
    pub fn new(
        config: FormConfig,
        backend: Rc<dyn Backend>,
        store: Rc<dyn KeyValueStore>,
        timer: Rc<dyn Timer>,
    ) -> Self {
        let state = FormState::new(config.steps.clone());
        Self {
            inner: Rc::new(Inner {
                config,
                state: RefCell::new(state),
                listener: RefCell::new(None),
                backend,
                store,
                timer,
                lookup_seq: Cell::new(0),
            }),
        }
    }

    /// Controller wired to `fetch`, `localStorage` and `setTimeout`.
    pub fn browser(config: FormConfig) -> Self {
        let backend = Rc::new(HttpBackend::new(&config));
        Self::new(config, backend, Rc::new(LocalStorage), Rc::new(BrowserTimer))
    }

    pub fn config(&self) -> &FormConfig {
        &self.inner.config
    }

    /// Register the (single) state observer; it is called after every change.
    pub fn subscribe(&self, listener: impl Fn(&FormState) + 'static) {
        *self.inner.listener.borrow_mut() = Some(Rc::new(listener));
    }

    pub fn state(&self) -> FormState {
        self.inner.state.borrow().clone()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&FormState) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    fn update<R>(&self, f: impl FnOnce(&mut FormState) -> R) -> R {
        let out = f(&mut self.inner.state.borrow_mut());
        self.notify();
        out
    }

    fn notify(&self) {
        let listener = self.inner.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(&self.inner.state.borrow());
        }
    }

    // =========================================================
    // View toggle
    // =========================================================

    pub fn switch_to_register(&self) {
        self.update(FormState::switch_to_register);
    }

    pub fn switch_to_login(&self) {
        self.update(FormState::switch_to_login);
    }

    // =========================================================
    // Fields
    // =========================================================

    pub fn set_register_field(&self, name: &str, value: String) {
        self.update(|s| s.set_register_value(name, value));
    }

    pub fn set_login_field(&self, name: &str, value: String) {
        self.update(|s| s.set_login_value(name, value));
    }

    // =========================================================
    // Step navigation
    // =========================================================

    pub fn show_step(&self, index: usize) {
        self.update(|s| s.show_step(index));
    }

    /// Validate the visible step and advance. Returns whether the cursor moved
    /// or the form was already on a valid last step.
    pub fn advance_step(&self) -> bool {
        match self.update(FormState::advance_step) {
            Ok(_) => true,
            Err(err) => {
                self.show_message(err.to_string(), MessageKind::Error);
                false
            }
        }
    }

    pub fn retreat_step(&self) {
        self.update(FormState::retreat_step);
    }

    // =========================================================
    // Feedback
    // =========================================================

    /// Replace the visible message and schedule its clear after the
    /// configured lifetime. Returns the message ticket.
    pub fn show_message(&self, text: impl Into<String>, kind: MessageKind) -> u64 {
        let ticket = self.update(|s| s.feedback.show(text, kind));
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        self.inner.timer.schedule(
            self.inner.config.message_ttl,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    FormController { inner }.clear_message(ticket);
                }
            }),
        );
        ticket
    }

    /// Clear the message if `ticket` is still the visible one.
    pub fn clear_message(&self, ticket: u64) -> bool {
        let cleared = self.inner.state.borrow_mut().feedback.clear_if_current(ticket);
        if cleared {
            self.notify();
        }
        cleared
    }

    fn busy(&self, control: ControlId, label: &str) -> BusyGuard<'_> {
        self.update(|s| {
            if let Some(c) = s.control_mut(control) {
                c.set_busy(label);
            }
        });
        BusyGuard { controller: self, control }
    }

    // =========================================================
    // Serial lookup gate
    // =========================================================

    /// Ask the backend whether the entered serial is already owned.
    ///
    /// Runs on the serial field's change event. The serial step's "next"
    /// control is busy while any lookup is outstanding and is always
    /// re-enabled afterwards, even when the device is owned. Only the most
    /// recently started lookup may update the field; older replies are
    /// dropped as `Superseded`.
    pub async fn check_serial(&self) -> SerialCheck {
        let serial = self.with_state(|s| s.register_value(FIELD_SERIAL_NUMBER).trim().to_owned());
        if serial.is_empty() {
            return SerialCheck::Skipped;
        }
        let step = self.inner.config.step_of(FIELD_SERIAL_NUMBER).unwrap_or_default();
        let _guard = self.busy(ControlId::Next(step), CHECKING_LABEL);
        let ticket = self.inner.lookup_seq.get() + 1;
        self.inner.lookup_seq.set(ticket);

        let request = DeviceLookupRequest { serial_number: serial };
        let reply = self.inner.backend.lookup_device(&request).await;
        if self.inner.lookup_seq.get() != ticket {
            log::debug!("dropping stale lookup for {}", request.serial_number);
            return SerialCheck::Superseded;
        }
        match reply {
            Ok(reply) if reply.device_owner => {
                self.update(|s| s.mark_invalid(FIELD_SERIAL_NUMBER, true));
                self.show_message(DEVICE_REGISTERED, MessageKind::Error);
                SerialCheck::Owned
            }
            Ok(_) => {
                self.update(|s| s.mark_invalid(FIELD_SERIAL_NUMBER, false));
                SerialCheck::Available
            }
            Err(err) => {
                log::warn!("device lookup failed: {err}");
                self.update(|s| s.mark_invalid(FIELD_SERIAL_NUMBER, false));
                SerialCheck::Failed
            }
        }
    }

    // =========================================================
    // Submission
    // =========================================================

    /// Submit the login form and persist the returned session.
    ///
    /// # Errors
    ///
    /// Returns why the login did not complete; the matching message is
    /// already visible.
    pub async fn submit_login(&self) -> Result<(), SubmitError> {
        let result = self.try_login().await;
        if let Err(err) = &result {
            self.show_message(err.user_message(LOGIN_FAILED), MessageKind::Error);
        }
        result
    }

    async fn try_login(&self) -> Result<(), SubmitError> {
        let request = self.with_state(FormState::login_payload)?;
        let _guard = self.busy(ControlId::LoginSubmit, LOGGING_IN_LABEL);

        let response = self.inner.backend.login(&request).await?;
        let store = &self.inner.store;
        store.set(AUTH_TOKEN_KEY, &response.token);
        match response.user_id.as_deref() {
            Some(user_id) => store.set(USER_ID_KEY, user_id),
            None => store.remove(USER_ID_KEY),
        }
        log::info!("login succeeded for {}", request.email);
        self.show_message(LOGIN_SUCCESS, MessageKind::Success);
        Ok(())
    }

    /// Re-validate the visible step, then submit every registration field.
    ///
    /// On success the form is cleared and the login view shown.
    ///
    /// # Errors
    ///
    /// Returns why the registration did not complete; the matching message
    /// is already visible.
    pub async fn submit_registration(&self) -> Result<(), SubmitError> {
        let result = self.try_register().await;
        if let Err(err) = &result {
            self.show_message(err.user_message(REGISTER_FAILED), MessageKind::Error);
        }
        result
    }

    async fn try_register(&self) -> Result<(), SubmitError> {
        let request = self.update(|s| s.validate_current_step().map(|()| s.register_payload()))?;

        let response = {
            let _guard = self.busy(ControlId::RegisterSubmit, REGISTERING_LABEL);
            self.inner.backend.register(&request).await?
        };
        if let Some(message) = response.message.as_deref() {
            log::info!("registration accepted: {message}");
        }
        self.update(|s| {
            s.clear_registration();
            s.switch_to_login();
        });
        self.show_message(REGISTER_SUCCESS, MessageKind::Success);
        Ok(())
    }

    // =========================================================
    // Session probe
    // =========================================================

    pub fn session_token(&self) -> Option<String> {
        self.inner.store.get(AUTH_TOKEN_KEY)
    }

    /// Announce an existing session on load. Token freshness is not checked.
    pub fn check_logged_in_status(&self) -> bool {
        let logged_in = self.session_token().is_some();
        if logged_in {
            self.show_message(ALREADY_LOGGED_IN, MessageKind::Info);
        }
        logged_in
    }

    /// Forget the stored session. The active view is left as is.
    pub fn logout(&self) {
        self.inner.store.remove(AUTH_TOKEN_KEY);
        self.inner.store.remove(USER_ID_KEY);
        self.show_message(LOGGED_OUT, MessageKind::Info);
    }
}

/// Restores a control's enabled state and label when dropped.
struct BusyGuard<'a> {
    controller: &'a FormController,
    control: ControlId,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let control = self.control;
        self.controller.update(|s| {
            if let Some(c) = s.control_mut(control) {
                c.restore();
            }
        });
    }
}
