//! Core engine — the session state machine, the tracker that drives it,
//! and the end-of-run accountant.

pub mod accountant;
pub mod session;
pub mod tracker;
