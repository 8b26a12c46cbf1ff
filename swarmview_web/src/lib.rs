//! Browser client for swarm optimization runs.
//!
//! Native builds compile only the UI model so the workspace can be built and
//! tested without a wasm toolchain. The Leptos app needs `--features web` on a
//! wasm32 target.

pub mod ui_model;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
mod web;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use web::start;
