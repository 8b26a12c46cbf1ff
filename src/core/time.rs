//! Wall-clock shim for run timing.
//!
//! The browser target has no usable `std::time::Instant`; there the clock is
//! backed by `performance.now()`.

#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;

#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

/// Seconds elapsed since `start`, as shown in the "Finished in" status line.
pub fn seconds_since(start: Instant) -> f64 {
    start.elapsed().as_secs_f64()
}
