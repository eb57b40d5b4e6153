#![cfg_attr(not(feature = "std"), no_std)]

//! # Link Core
//!
//! Firmware core for a battery-powered wireless input-state transmitter:
//! an interrupt-driven cooperative scheduler, an ACK-based link state
//! machine with bounded retries and exponential backoff, and a two-mode
//! power controller (Sleep / Awake).

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod types;
pub mod hal;
pub mod irq;
pub mod tasks;
pub mod link;
pub mod power;
pub mod scheduler;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use types::*;
pub use irq::*;
pub use tasks::*;
pub use link::*;
pub use power::*;
pub use scheduler::*;
pub use hal::*;

/// Link library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration matching the reference transmitter hardware
pub fn default_config() -> LinkConfig {
    LinkConfig::default()
}
