//! Client configuration: API base, message lifetime, registration step layout.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser bundle has no environment variables. The only runtime knob is
//! an optional `<meta name="winklink-api-base">` tag in the host document; all
//! other values are compiled-in defaults.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

/// Same-origin by default; endpoint paths are appended to this base.
pub const DEFAULT_API_BASE: &str = "";
pub const DEFAULT_MESSAGE_TTL_MS: u64 = 5_000;
/// Name of the `<meta>` tag that overrides the API base.
pub const API_BASE_META: &str = "winklink-api-base";
/// Backend column limit for serial numbers.
pub const SERIAL_NUMBER_MAX_LEN: usize = 12;

pub const FIELD_SERIAL_NUMBER: &str = "serial_number";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_USERNAME: &str = "username";
pub const FIELD_PASSWORD: &str = "password";
pub const FIELD_DEVICE_NAME: &str = "device_name";

/// One input on a registration step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub input_type: &'static str,
    pub required: bool,
    /// Upper bound on the trimmed length in UTF-8 bytes, which is what the
    /// backend stores.
    pub max_len: Option<usize>,
}

impl FieldSpec {
    const fn required(name: &'static str, label: &'static str, input_type: &'static str) -> Self {
        Self { name, label, input_type, required: true, max_len: None }
    }

    const fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }
}

/// One registration sub-form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepSpec {
    pub title: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl StepSpec {
    /// Whether `field` belongs to this step.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.name == field)
    }
}

/// Registration layout matching the backend's three insert stages.
pub fn default_steps() -> Vec<StepSpec> {
    vec![
        StepSpec {
            title: "Device",
            fields: vec![
                FieldSpec::required(FIELD_SERIAL_NUMBER, "Serial number", "text").with_max_len(SERIAL_NUMBER_MAX_LEN),
                FieldSpec::required(FIELD_EMAIL, "Email", "email"),
            ],
        },
        StepSpec {
            title: "Account",
            fields: vec![
                FieldSpec::required(FIELD_USERNAME, "Username", "text"),
                FieldSpec::required(FIELD_PASSWORD, "Password", "password"),
            ],
        },
        StepSpec { title: "Name your device", fields: vec![FieldSpec::required(FIELD_DEVICE_NAME, "Device name", "text")] },
    ]
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormConfig {
    pub api_base: String,
    pub message_ttl: Duration,
    pub steps: Vec<StepSpec>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_owned(),
            message_ttl: Duration::from_millis(DEFAULT_MESSAGE_TTL_MS),
            steps: default_steps(),
        }
    }
}

impl FormConfig {
    /// Build config from the host document, falling back to defaults.
    ///
    /// Only the API base is read (from the `winklink-api-base` meta tag).
    /// Outside the browser this is equivalent to `FormConfig::default()`.
    pub fn from_document() -> Self {
        let mut config = Self::default();
        if let Some(raw) = read_api_base_meta() {
            config.api_base = normalize_api_base(&raw);
        }
        config
    }

    /// Full URL for an API path such as `/api/login`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Index of the step holding `field`, if any.
    pub fn step_of(&self, field: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.contains(field))
    }

    /// Every registration field name in step order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.steps.iter().flat_map(|s| s.fields.iter().map(|f| f.name))
    }
}

pub(crate) fn normalize_api_base(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn read_api_base_meta() -> Option<String> {
    #[cfg(feature = "hydrate")]
    {
        let doc = web_sys::window()?.document()?;
        let meta = doc.query_selector(&format!("meta[name=\"{API_BASE_META}\"]")).ok()??;
        meta.get_attribute("content")
    }
    #[cfg(not(feature = "hydrate"))]
    {
        None
    }
}
