//! # Lens Cure
//!
//! A one-dimensional model of UV-induced polymerisation curing across a
//! contact lens, built as a [Twine](https://github.com/isentropic-dev/twine)
//! model.
//!
//! ## Crate layout
//!
//! - [`models`]: The contact-lens curing model, its parameter sets, and its
//!   [`twine_core::Model`] adapter.
//! - [`support`]: Supporting utilities used by models.
//!
//! ## Utility code lifecycle
//!
//! Modules in [`support`] are part of the public API because they're useful,
//! but their APIs are not stable. Breaking changes may occur as needed.
//!
//! Utility code starts in a model's internal `core` module and moves to
//! [`support`] once it is useful beyond that model, as the rate laws in
//! [`support::kinetics`] have.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (solver progress at `debug`/`trace`,
//! a summary per solve at `info`, and uncured nodes at `warn`) and never
//! installs a subscriber itself.

pub mod models;
pub mod support;
