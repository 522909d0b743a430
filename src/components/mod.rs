//! Reusable view pieces for the account page.

pub mod form_field;
pub mod message_banner;
