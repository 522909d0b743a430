//! # winklink-client
//!
//! Leptos + WASM account client for WinkLink devices: a login view and a
//! three-step device registration form talking to the WinkLink REST API.
//!
//! All navigation, validation and submission rules live in
//! [`controller::FormController`]; the `pages` and `components` modules only
//! render its state and forward DOM events.

pub mod app;
pub mod components;
pub mod config;
pub mod controller;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

#[cfg(test)]
mod testing;

/// WASM entry point: install logging and hydrate the server-rendered page.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
