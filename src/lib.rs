//! Partner onboarding workflows for the Wayfarer travel marketplace.
//!
//! The crate exposes the onboarding application lifecycle (submission,
//! administrator transitions, current-status queries) behind collaborator
//! traits for persistence, identity, payments, and notifications, plus the
//! axum surface that the serving binary mounts.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
