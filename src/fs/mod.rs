//! Filesystem utilities for simfleet.
//!
//! Rewrites of project files (manifests, converted sources, patched scripts)
//! go through atomic writes so an interrupted run never leaves a half-written
//! file inside a Unity project.

pub mod atomic;
mod size;

pub use atomic::atomic_write;
pub use atomic::atomic_write_file;
pub use size::{dir_size, format_bytes};
