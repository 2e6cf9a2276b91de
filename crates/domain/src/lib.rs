//! # fireminder-domain
//!
//! Pure domain model for the fireminder daemon.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps
//! - Define **DeviceConfig** (one watched streaming device and its policy)
//! - Define **DeviceSnapshot** (what is on screen at one poll)
//! - Define **IdleTracker** (how long the screen state has been unchanged)
//! - Define the **launch decision** (the rule table that decides when the
//!   idle-target app gets launched)
//! - Define **StateReport** (the telemetry payload)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod decision;
pub mod device;
pub mod idle;
pub mod report;
pub mod snapshot;
