//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (`core-auth`, `core-runtime`). Host applications can depend
//! on `wearther-workspace` with `desktop-shims` enabled and get the session
//! layer wired to the desktop HTTP client and settings store.

#[cfg(feature = "desktop-shims")]
pub use core_auth;
#[cfg(feature = "desktop-shims")]
pub use core_runtime;
