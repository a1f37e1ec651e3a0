//! Simulation driver — advances game-time and applies due events.
//!
//! A [`Simulation`] is an explicit context value: independent instances
//! never share a clock, queue or registry.
//!
//! ## Tick
//!
//! | Phase       | Work                                                        |
//! |-------------|-------------------------------------------------------------|
//! | `Draining`  | Pop every event due at the target; per member: decay to the |
//! |             | delivery time, then apply impact × magnitude.               |
//! | `Advancing` | Touched agents only, on rayon workers: decay to the target, |
//! |             | recompute intention, write back.                            |
//! | `Idle`      | Clock at target.                                            |
//!
//! A numeric failure for one agent drops that agent out of the rest of
//! the tick with its last good state; everyone else proceeds.

use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::agent::{AgentRegistry, AgentState};
use crate::clock::{ClockPhase, SimulationClock};
use crate::config::SimConfig;
use crate::emotion::{EmotionEngine, apply_impact};
use crate::error::{Result, SimError};
use crate::event::{ImpactPayload, WorldEvent};
use crate::intention::{IntentionEngine, compute_intention_with_momentum};
use crate::locality::{LocalityResolver, LocalityTier, OriginContext};
use crate::propagation::{Cascade, PropagationEngine};
use crate::queue::{EventQueue, QueueStats};
use crate::snapshot::VectorSnapshot;
use crate::types::{AgentId, EventId, GameTime};

/// An agent whose update failed during a tick.
#[derive(Debug)]
pub struct AgentFailure {
    /// The agent left at its last good state.
    pub agent: AgentId,
    /// What went wrong.
    pub error: SimError,
}

/// Summary of one [`Simulation::tick`].
#[derive(Debug, Default)]
pub struct TickReport {
    /// Clock value after the tick.
    pub game_time: GameTime,
    /// Events popped and applied.
    pub events_delivered: usize,
    /// Agents whose emotion and intention were rewritten.
    pub agents_updated: usize,
    /// Agents skipped because of numeric failure.
    pub failures: Vec<AgentFailure>,
    /// Events still waiting in the queue.
    pub events_pending: usize,
}

/// Submission handle that can live on another thread.
///
/// Shares the queue with the [`Simulation`] it came from. Submissions
/// that would land in time the clock already passed are refused by the
/// queue with [`SimError::NonMonotonicTime`].
#[derive(Debug, Clone)]
pub struct EventIngest {
    queue: EventQueue,
    propagation: PropagationEngine,
}

impl EventIngest {
    /// Inject an occurrence; returns the id of its originating event.
    ///
    /// # Errors
    /// See [`PropagationEngine::originate`].
    pub fn submit_event(
        &self,
        tier: LocalityTier,
        impact: ImpactPayload,
        origin: OriginContext,
        created_at: GameTime,
        base_magnitude: f64,
    ) -> Result<EventId> {
        submit(&self.propagation, &self.queue, tier, impact, origin, created_at, base_magnitude)
            .map(|cascade| cascade.id)
    }

    /// Withdraw one pending delivery.
    ///
    /// # Errors
    /// Returns [`SimError::EventNotPending`] if it was already delivered or withdrawn.
    pub fn withdraw_event(&self, id: EventId) -> Result<()> {
        self.queue.withdraw(id)
    }

    /// Withdraw every pending delivery of a cascade.
    pub fn withdraw_cascade(&self, cascade: EventId) -> usize {
        self.queue.withdraw_cascade(cascade)
    }
}

/// The simulation context: config, clock, queue, registry and resolver.
pub struct Simulation {
    config: SimConfig,
    intention: IntentionEngine,
    emotion: EmotionEngine,
    propagation: PropagationEngine,
    clock: SimulationClock,
    queue: EventQueue,
    registry: AgentRegistry,
    resolver: Box<dyn LocalityResolver>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("clock", &self.clock)
            .field("agents", &self.registry.len())
            .field("queue", &self.queue.stats())
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Create a simulation at game-time zero.
    ///
    /// # Errors
    /// Returns `SimError::Config` if the configuration does not validate.
    pub fn new(config: SimConfig, resolver: impl LocalityResolver + 'static) -> Result<Self> {
        Self::starting_at(config, resolver, GameTime::ZERO)
    }

    /// Create a simulation whose clock starts at `start`.
    ///
    /// # Errors
    /// Returns `SimError::Config` if the configuration does not validate, or
    /// [`SimError::OutOfRangeValue`] if `start` is not finite.
    pub fn starting_at(
        config: SimConfig,
        resolver: impl LocalityResolver + 'static,
        start: GameTime,
    ) -> Result<Self> {
        config.validate()?;
        if !start.is_finite() {
            return Err(SimError::OutOfRangeValue {
                what: "start time",
                value: start.hours(),
            });
        }
        let queue = EventQueue::new();
        queue.close_until(start);
        Ok(Self {
            intention: config.intention.clone(),
            emotion: EmotionEngine::new(config.emotion.clone()),
            propagation: PropagationEngine::new(config.propagation),
            clock: SimulationClock::starting_at(start),
            queue,
            registry: AgentRegistry::new(),
            resolver: Box::new(resolver),
            config,
        })
    }

    /// The configuration this simulation was built with.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Current game-time.
    #[must_use]
    pub fn now(&self) -> GameTime {
        self.clock.now()
    }

    /// Current clock phase (always `Idle` between calls).
    #[must_use]
    pub fn phase(&self) -> ClockPhase {
        self.clock.phase()
    }

    /// Agents in the simulation.
    #[must_use]
    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Host-side mutable access (social/environment setters, removal).
    pub fn registry_mut(&mut self) -> &mut AgentRegistry {
        &mut self.registry
    }

    /// Add an agent, stamping its `last_update` with the current time.
    ///
    /// # Errors
    /// Returns [`SimError::DuplicateAgent`] if the id is taken.
    pub fn enter(&mut self, mut agent: AgentState) -> Result<AgentId> {
        agent.last_update = self.clock.now();
        self.registry.enter(agent)
    }

    /// Remove an agent.
    ///
    /// # Errors
    /// Returns [`SimError::AgentNotFound`] if no such agent exists.
    pub fn leave(&mut self, id: AgentId) -> Result<AgentState> {
        self.registry.leave(id)
    }

    /// A submission handle sharing this simulation's queue.
    #[must_use]
    pub fn ingest(&self) -> EventIngest {
        EventIngest {
            queue: self.queue.clone(),
            propagation: self.propagation,
        }
    }

    /// Queue depth and lifetime counters.
    #[must_use]
    pub fn queue_stats(&self) -> QueueStats {
        self.queue.stats()
    }

    /// When the next pending event is due, if any.
    #[must_use]
    pub fn next_event_time(&self) -> Option<GameTime> {
        self.queue.next_due_time()
    }

    /// Inject an occurrence and schedule its cascade.
    ///
    /// # Errors
    /// - [`SimError::NonMonotonicTime`] if `created_at` is before the clock.
    /// - [`SimError::OutOfRangeValue`] if `base_magnitude` is outside (0, 1].
    pub fn submit_event(
        &self,
        tier: LocalityTier,
        impact: ImpactPayload,
        origin: OriginContext,
        created_at: GameTime,
        base_magnitude: f64,
    ) -> Result<EventId> {
        self.submit_cascade(tier, impact, origin, created_at, base_magnitude)
            .map(|cascade| cascade.id)
    }

    /// Like [`submit_event`](Self::submit_event) but returns every scheduled delivery.
    ///
    /// # Errors
    /// Same as [`submit_event`](Self::submit_event).
    pub fn submit_cascade(
        &self,
        tier: LocalityTier,
        impact: ImpactPayload,
        origin: OriginContext,
        created_at: GameTime,
        base_magnitude: f64,
    ) -> Result<Cascade> {
        let now = self.clock.now();
        if created_at < now {
            warn!(requested = %created_at, current = %now, "Rejected event created in the past");
            return Err(SimError::NonMonotonicTime {
                requested: created_at,
                current: now,
            });
        }
        submit(&self.propagation, &self.queue, tier, impact, origin, created_at, base_magnitude)
    }

    /// Withdraw one pending delivery before it is popped.
    ///
    /// # Errors
    /// Returns [`SimError::EventNotPending`] if it was already delivered or withdrawn.
    pub fn withdraw_event(&self, id: EventId) -> Result<()> {
        self.queue.withdraw(id)
    }

    /// Withdraw whatever is still pending of a cascade.
    pub fn withdraw_cascade(&self, cascade: EventId) -> usize {
        self.queue.withdraw_cascade(cascade)
    }

    /// Read-only vectors of one agent for dialogue and memory layers.
    ///
    /// # Errors
    /// Returns [`SimError::AgentNotFound`] for an unknown id.
    pub fn get_current_vectors(&self, id: AgentId) -> Result<VectorSnapshot> {
        self.registry
            .get(id)
            .map(|agent| VectorSnapshot::of(agent, self.clock.now()))
            .ok_or(SimError::AgentNotFound(id))
    }

    /// Advance the clock by `delta_hours`.
    ///
    /// # Errors
    /// Same as [`tick`](Self::tick).
    pub fn advance(&mut self, delta_hours: f64) -> Result<TickReport> {
        let target = self.clock.now() + delta_hours;
        self.tick(target)
    }

    /// Advance the clock to `target`, delivering every event due by then.
    ///
    /// # Errors
    /// Returns [`SimError::NonMonotonicTime`] if `target` is before the
    /// clock; nothing changes in that case. Per-agent numeric failures are
    /// reported in [`TickReport::failures`], not as an error.
    pub fn tick(&mut self, target: GameTime) -> Result<TickReport> {
        self.clock.check_target(target)?;

        self.clock.enter(ClockPhase::Draining);
        self.queue.close_until(target);
        let mut report = TickReport::default();
        let mut touched = BTreeSet::new();
        let mut failed = BTreeSet::new();

        while let Some(event) = self.queue.pop_if_due(target) {
            report.events_delivered += 1;
            let members: BTreeSet<AgentId> = self
                .resolver
                .members_of(event.tier, &event.origin)
                .into_iter()
                .collect();
            trace!(
                event = %event.id,
                tier = %event.tier,
                at = %event.deliver_at,
                magnitude = event.magnitude,
                members = members.len(),
                "Delivering event"
            );

            for id in members {
                if failed.contains(&id) {
                    continue;
                }
                let Some(agent) = self.registry.get_mut(id) else {
                    continue;
                };
                match deliver(&self.emotion, agent, &event) {
                    Ok(()) => {
                        touched.insert(id);
                    }
                    Err(error) => {
                        warn!(agent = %id, event = %event.id, %error, "Event delivery failed");
                        touched.remove(&id);
                        failed.insert(id);
                        report.failures.push(AgentFailure { agent: id, error });
                    }
                }
            }
        }

        self.clock.enter(ClockPhase::Advancing);
        let emotion = &self.emotion;
        let intention = &self.intention;
        let outcomes: Vec<(AgentId, Result<()>)> = self
            .registry
            .values_mut()
            .filter(|agent| touched.contains(&agent.id))
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|agent| (agent.id, recompute(emotion, intention, agent, target)))
            .collect();

        for (id, outcome) in outcomes {
            match outcome {
                Ok(()) => report.agents_updated += 1,
                Err(error) => {
                    warn!(agent = %id, %error, "Agent recompute failed");
                    report.failures.push(AgentFailure { agent: id, error });
                }
            }
        }

        self.clock.finish_at(target);
        report.game_time = target;
        report.events_pending = self.queue.len();

        debug!(
            game_time = %target,
            delivered = report.events_delivered,
            updated = report.agents_updated,
            failures = report.failures.len(),
            pending = report.events_pending,
            "Tick complete"
        );
        Ok(report)
    }
}

fn submit(
    propagation: &PropagationEngine,
    queue: &EventQueue,
    tier: LocalityTier,
    impact: ImpactPayload,
    origin: OriginContext,
    created_at: GameTime,
    base_magnitude: f64,
) -> Result<Cascade> {
    let event = WorldEvent::originate(tier, impact, origin, created_at, base_magnitude);
    propagation.originate(event, queue).inspect_err(|error| {
        warn!(%tier, at = %created_at, %error, "Rejected event submission");
    })
}

/// Decay to the delivery time, then fold in the scaled impact.
fn deliver(engine: &EmotionEngine, agent: &mut AgentState, event: &WorldEvent) -> Result<()> {
    let elapsed = event.deliver_at.hours_since(agent.last_update).max(0.0);
    let decayed = engine.decay(&agent.emotion, agent.personality(), elapsed)?;
    let impacted = apply_impact(&decayed, &event.impact.emotion, event.magnitude)?;
    agent.emotion = impacted;
    agent.last_update = agent.last_update.max(event.deliver_at);
    Ok(())
}

/// Decay to `target` and recompute intention. Writes only on success.
fn recompute(
    emotion: &EmotionEngine,
    intention: &IntentionEngine,
    agent: &mut AgentState,
    target: GameTime,
) -> Result<()> {
    let elapsed = target.hours_since(agent.last_update).max(0.0);
    let decayed = emotion.decay(&agent.emotion, agent.personality(), elapsed)?;
    let next = compute_intention_with_momentum(
        agent.personality(),
        &decayed,
        agent.social_influence(),
        agent.environment(),
        &agent.intention,
        intention.weights_for(&agent.archetype),
    )?;
    agent.emotion = decayed;
    agent.intention = next;
    agent.last_update = agent.last_update.max(target);
    Ok(())
}
