//! Shared types, the option store adapter trait, and core utilities for setkit.
//!
//! Store adapters depend on this crate only, so they compile without pulling
//! in the field pipeline.

pub mod error;
pub mod prelude;
pub mod store_adapter;

// vim: ts=4
