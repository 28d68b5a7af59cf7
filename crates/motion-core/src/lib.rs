//! Inkstream Motion Core
//!
//! Derives motion series from buffered stylus samples:
//! - **Window filtering:** select the trailing time slice a consumer wants
//! - **Derivation:** velocity and acceleration at configurable time-window
//!   granularities, with a 1 ms dt floor for duplicate timestamps
//!
//! This crate is pure computation — no I/O, no broker dependencies.
//! All inputs are data; all outputs are data. Every function is safe to
//! run concurrently on snapshots from any number of consumer threads.

pub mod derive;
pub mod window;

pub use derive::DerivationEngine;
pub use window::WindowFilter;
