//! Client-side form state.
//!
//! DESIGN
//! ======
//! `form` holds navigation and field data, `feedback` the single message
//! slot. Both are plain values; `crate::controller` owns and mutates them.

pub mod feedback;
pub mod form;
