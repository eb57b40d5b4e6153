//! Host-based integration tests for the transmitter core
//!
//! The scenario tests drive the full scheduler through the mock hardware
//! harness; the bench-board tests exercise the firmware composition crate.

#[cfg(test)]
mod scenarios;

#[cfg(test)]
mod backoff;
