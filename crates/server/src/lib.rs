//! Server crate for the playlist recommendation pipeline.
//!
//! This crate contains the orchestrator that launches runs concurrently,
//! consumes their events and tracks their state.

pub mod orchestrator;

pub use orchestrator::{RunEvents, RunOrchestrator};
