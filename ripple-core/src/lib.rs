//! # Ripple Core Library
//!
//! Game-agnostic simulation engine for autonomous characters whose
//! behaviour emerges from numeric state instead of scripts.
//!
//! Every agent carries five fixed-shape vectors:
//!
//! - **Intention** (8) — what it wants to do, a distribution over drives
//! - **Emotion** (8) — Plutchik affects in [-1, 1]
//! - **Personality** (5) — Big Five traits, fixed for life
//! - **Social influence** (6) — pressures from the surrounding society
//! - **Environment** (4) — conditions where the agent stands
//!
//! World events enter at a locality tier and ripple outward
//! (personal → family → city → regional → national → global), each hop
//! delayed and attenuated, through a time-ordered [`EventQueue`]. The
//! [`Simulation`] driver advances game-time, applies due impacts, and
//! recomputes intention for every agent it touched.
//!
//! ## Quick start
//!
//! ```
//! use ripple_core::{
//!     AgentState, GameTime, ImpactPayload, LocalityTier, OriginContext, SimConfig, Simulation,
//! };
//! use ripple_core::vector::{EmotionVector, PersonalityVector, emotion};
//!
//! let agent = AgentState::new("Mira", PersonalityVector::new([0.6, 0.5, 0.7, 0.6, 0.3]), GameTime::ZERO);
//! let id = agent.id;
//! let mut sim = Simulation::new(SimConfig::default(), move |_: LocalityTier, _: &OriginContext| vec![id])?;
//! sim.enter(agent)?;
//!
//! let mut delta = EmotionVector::zeros();
//! delta[emotion::JOY] = 0.5;
//! sim.submit_event(LocalityTier::Personal, ImpactPayload::new(delta), OriginContext::from_agent(id), GameTime::ZERO, 1.0)?;
//! sim.tick(GameTime::ZERO)?;
//!
//! assert!(sim.get_current_vectors(id)?.emotion[emotion::JOY] > 0.0);
//! # Ok::<(), ripple_core::SimError>(())
//! ```

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod agent;
pub mod clock;
pub mod config;
pub mod driver;
pub mod emotion;
pub mod error;
pub mod event;
pub mod intention;
pub mod locality;
pub mod propagation;
pub mod queue;
pub mod snapshot;
pub mod types;
pub mod vector;

pub use agent::{AgentRegistry, AgentState};
pub use clock::{ClockPhase, SimulationClock};
pub use config::SimConfig;
pub use driver::{AgentFailure, EventIngest, Simulation, TickReport};
pub use error::{Result, SimError};
pub use event::{ImpactPayload, WorldEvent};
pub use locality::{LocalityResolver, LocalityTier, LocalityTopology, OriginContext};
pub use propagation::{Cascade, PropagationConfig, PropagationEngine};
pub use queue::EventQueue;
pub use snapshot::VectorSnapshot;
pub use types::*;
