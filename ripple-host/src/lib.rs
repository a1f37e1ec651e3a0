//! # ripple-host — Host Integration for Ripple
//!
//! Glue between a game (or any embedding application) and the
//! game-agnostic `ripple-core` engine.
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │                   Host                     │
//! │  ┌─────────────┐ ┌────────────┐ ┌───────┐ │
//! │  │ Occurrences │ │ Membership │ │ Runner│ │
//! │  └──────┬──────┘ └─────┬──────┘ └───┬───┘ │
//! │         │ submit       │ resolve    │ tick│
//! │         ▼              ▼            ▼     │
//! │    ┌──────────────────────────────────┐   │
//! │    │           ripple-core            │   │
//! │    └──────────────────────────────────┘   │
//! └───────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config` — one TOML file for engine, runner and logging
//! - `logging` — tracing subscriber setup
//! - `membership` — who lives in which household, city, region
//! - `events` — catalogue of world occurrences
//! - `runner` — background tokio tick loop

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod membership;
pub mod runner;

pub use config::{HostConfig, LoggingConfig, RunnerConfig};
pub use error::HostError;
pub use events::Occurrence;
pub use membership::{MembershipTable, SharedMembership};
pub use runner::{SharedSimulation, TickRunner};
