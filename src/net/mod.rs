//! Networking modules for the account REST endpoints.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` defines the `Backend` seam and its `fetch` implementation, and
//! `types` defines the JSON bodies exchanged with the backend.

pub mod api;
pub mod types;
