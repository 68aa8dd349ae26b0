//! Workspace placeholder crate.
//!
//! This crate exists so host applications can depend on `msc-workspace` and
//! pull in the `core-service` façade without wiring each member crate
//! individually.

pub use core_service;
