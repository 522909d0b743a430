//! Page modules for top-level screens.
//!
//! ARCHITECTURE
//! ============
//! A page builds the controller, provides it via context, and delegates
//! field and message rendering to `components`.

pub mod auth;
