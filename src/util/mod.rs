//! Browser-environment adapters.
//!
//! SYSTEM CONTEXT
//! ==============
//! Storage and timers are isolated here behind small traits so the form
//! controller can be driven natively in tests.

pub mod storage;
pub mod timer;
