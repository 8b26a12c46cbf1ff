#[path = "core/config.rs"]
pub mod config;

#[path = "core/convergence.rs"]
pub mod convergence;

#[path = "core/error.rs"]
pub mod error;

#[path = "core/float_fmt.rs"]
pub mod float_fmt;

#[path = "core/orchestrator.rs"]
pub mod orchestrator;

#[path = "core/playback.rs"]
pub mod playback;

#[path = "core/protocol.rs"]
pub mod protocol;

#[path = "core/request.rs"]
pub mod request;

#[path = "core/schema.rs"]
pub mod schema;

#[path = "core/stats.rs"]
pub mod stats;

#[path = "core/time.rs"]
pub mod time;

#[path = "core/validation.rs"]
pub mod validation;

#[path = "core/viewport.rs"]
pub mod viewport;
