//! Integration Tests — End-to-End Simulation Flows
//!
//! These tests drive a full [`Simulation`]: submission → cascade →
//! delivery → emotion/intention update, across ticks and threads.

use std::sync::Arc;

use parking_lot::Mutex;

use ripple_core::intention::{IntentionWeights, compute_intention};
use ripple_core::vector::{
    EmotionVector, EnvironmentVector, IntentionVector, PersonalityVector, Projection, SocialVector,
    emotion, intention,
};
use ripple_core::{
    AgentId, AgentState, ClockPhase, GameTime, ImpactPayload, LocalityTier, OriginContext,
    SimConfig, SimError, Simulation,
};

fn h(hours: f64) -> GameTime {
    GameTime::from_hours(hours)
}

fn joy(amount: f64) -> ImpactPayload {
    let mut delta = EmotionVector::zeros();
    delta[emotion::JOY] = amount;
    ImpactPayload::new(delta).describe("festival", "A festival in the square")
}

fn villager(name: &str) -> AgentState {
    AgentState::new(name, PersonalityVector::new([0.5; 5]), GameTime::ZERO)
}

/// Resolver that reaches the same fixed set of agents at every tier.
fn reach(ids: Vec<AgentId>) -> impl Fn(LocalityTier, &OriginContext) -> Vec<AgentId> + Send + Sync {
    move |_: LocalityTier, _: &OriginContext| ids.clone()
}

// ---------------------------------------------------------------------------
// Worked cascade: personal → national, global cut off
// ---------------------------------------------------------------------------

#[test]
fn reference_cascade_through_the_driver() {
    let agent = villager("Hild");
    let id = agent.id;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let resolver = move |tier: LocalityTier, _: &OriginContext| {
        log.lock().push(tier);
        vec![id]
    };

    let mut sim = Simulation::new(SimConfig::default(), resolver).expect("valid config");
    sim.enter(agent).expect("unique");

    let cascade = sim
        .submit_cascade(LocalityTier::Personal, joy(0.5), OriginContext::from_agent(id), GameTime::ZERO, 1.0)
        .expect("submitted");
    let plan: Vec<(LocalityTier, f64)> = cascade
        .deliveries
        .iter()
        .map(|d| (d.tier, d.deliver_at.hours()))
        .collect();
    assert_eq!(
        plan,
        vec![
            (LocalityTier::Personal, 0.0),
            (LocalityTier::Family, 1.0),
            (LocalityTier::City, 5.0),
            (LocalityTier::Regional, 29.0),
            (LocalityTier::National, 101.0),
        ]
    );

    // One delivery per checkpoint, none in between.
    for (target, expected) in [(0.0, 1), (0.5, 0), (1.0, 1), (5.0, 1), (28.0, 0), (29.0, 1), (101.0, 1)] {
        let report = sim.tick(h(target)).expect("tick");
        assert_eq!(report.events_delivered, expected, "at {target}h");
    }

    // Global (0.0009) was never scheduled.
    let report = sim.tick(h(24.0 * 30.0)).expect("tick");
    assert_eq!(report.events_delivered, 0);
    assert!(sim.next_event_time().is_none());
    assert_eq!(
        *seen.lock(),
        vec![
            LocalityTier::Personal,
            LocalityTier::Family,
            LocalityTier::City,
            LocalityTier::Regional,
            LocalityTier::National,
        ]
    );
    assert_eq!(sim.queue_stats().total_delivered, 5);
}

// ---------------------------------------------------------------------------
// Joy raises socialize and nurture
// ---------------------------------------------------------------------------

#[test]
fn joy_event_raises_socialize_and_nurture() {
    let agent = villager("Osric");
    let id = agent.id;
    let personality = *agent.personality();
    let mut sim = Simulation::new(SimConfig::default(), reach(vec![id])).expect("valid");
    sim.enter(agent).expect("unique");

    let weights = IntentionWeights::default();
    let before = compute_intention(
        &personality,
        &EmotionVector::zeros(),
        &SocialVector::zeros(),
        &EnvironmentVector::zeros(),
        &weights,
    )
    .expect("finite");

    sim.submit_event(LocalityTier::Personal, joy(0.5), OriginContext::from_agent(id), GameTime::ZERO, 1.0)
        .expect("submitted");
    sim.tick(GameTime::ZERO).expect("tick");

    let snap = sim.get_current_vectors(id).expect("present");
    assert!((snap.emotion[emotion::JOY] - 0.5).abs() < 1e-12);
    assert!(snap.intention[intention::SOCIALIZE] > before[intention::SOCIALIZE]);
    assert!(snap.intention[intention::NURTURE] > before[intention::NURTURE]);
    assert!((snap.intention.sum() - 1.0).abs() < 1e-9);

    let expected = compute_intention(
        &personality,
        &snap.emotion,
        &SocialVector::zeros(),
        &EnvironmentVector::zeros(),
        &weights,
    )
    .expect("finite");
    for i in 0..intention::DIM {
        assert!((snap.intention[i] - expected[i]).abs() < 1e-12);
    }
}

#[test]
fn emotion_only_weights_follow_the_joy_column() {
    let agent = villager("Eadric");
    let id = agent.id;
    let mut config = SimConfig::default();
    config.intention.default = IntentionWeights {
        personality: 0.0,
        emotion: 1.0,
        social: 0.0,
        environment: 0.0,
        ..IntentionWeights::default()
    };
    let mut sim = Simulation::new(config, reach(vec![id])).expect("valid");
    sim.enter(agent).expect("unique");

    sim.submit_event(LocalityTier::Personal, joy(0.5), OriginContext::from_agent(id), GameTime::ZERO, 1.0)
        .expect("submitted");
    sim.tick(GameTime::ZERO).expect("tick");

    let snap = sim.get_current_vectors(id).expect("present");
    let uniform = IntentionVector::uniform();
    assert!(snap.intention[intention::SOCIALIZE] > uniform[intention::SOCIALIZE]);
    assert!(snap.intention[intention::NURTURE] > uniform[intention::NURTURE]);
    // Joy column: socialize 0.6, nurture 0.4.
    let ratio = snap.intention[intention::SOCIALIZE] / snap.intention[intention::NURTURE];
    assert!((ratio - 1.5).abs() < 1e-9);
    assert_eq!(snap.dominant_intention(), "socialize");
}

// ---------------------------------------------------------------------------
// Idempotent tick
// ---------------------------------------------------------------------------

#[test]
fn repeated_tick_to_same_time_is_a_no_op() {
    let agent = villager("Sefa");
    let id = agent.id;
    let mut sim = Simulation::new(SimConfig::default(), reach(vec![id])).expect("valid");
    sim.enter(agent).expect("unique");
    sim.submit_event(LocalityTier::Family, joy(0.8), OriginContext::from_agent(id), h(2.0), 1.0)
        .expect("submitted");

    let first = sim.tick(h(6.0)).expect("tick");
    assert!(first.events_delivered > 0);
    let after_first = sim.get_current_vectors(id).expect("present");
    let stats = sim.queue_stats();

    let second = sim.tick(h(6.0)).expect("tick");
    assert_eq!(second.events_delivered, 0);
    assert_eq!(second.agents_updated, 0);
    assert_eq!(sim.get_current_vectors(id).expect("present"), after_first);
    assert_eq!(sim.queue_stats(), stats);
    assert_eq!(sim.now(), h(6.0));
    assert_eq!(sim.phase(), ClockPhase::Idle);
}

// ---------------------------------------------------------------------------
// Irregular intervals: decay uses real elapsed time
// ---------------------------------------------------------------------------

#[test]
fn sparse_and_dense_ticking_agree() {
    fn run(targets: &[f64]) -> EmotionVector {
        let agent = villager("Tam").with_id(AgentId(uuid_from(7)));
        let id = agent.id;
        let mut sim = Simulation::new(SimConfig::default(), reach(vec![id])).expect("valid");
        sim.enter(agent).expect("unique");
        sim.submit_event(LocalityTier::Personal, joy(0.9), OriginContext::from_agent(id), GameTime::ZERO, 1.0)
            .expect("submitted");
        sim.submit_event(LocalityTier::Personal, joy(-0.3), OriginContext::from_agent(id), h(12.0), 1.0)
            .expect("submitted");
        // Touch once more at the end so both runs settle at 48h.
        sim.submit_event(LocalityTier::Personal, ImpactPayload::default(), OriginContext::from_agent(id), h(48.0), 1.0)
            .expect("submitted");
        for &t in targets {
            sim.tick(h(t)).expect("tick");
        }
        sim.get_current_vectors(id).expect("present").emotion
    }

    let dense: Vec<f64> = (0..=48).map(f64::from).collect();
    let sparse = run(&[0.0, 48.0]);
    let stepped = run(&dense);
    for i in 0..emotion::DIM {
        assert!((sparse[i] - stepped[i]).abs() < 1e-9, "component {i}");
    }
}

fn uuid_from(n: u128) -> uuid::Uuid {
    uuid::Uuid::from_u128(n)
}

// ---------------------------------------------------------------------------
// Withdrawal
// ---------------------------------------------------------------------------

#[test]
fn withdrawn_cascade_stops_rippling() {
    let agent = villager("Brannoc");
    let id = agent.id;
    let mut sim = Simulation::new(SimConfig::default(), reach(vec![id])).expect("valid");
    sim.enter(agent).expect("unique");

    let cascade = sim
        .submit_cascade(LocalityTier::Personal, joy(0.5), OriginContext::from_agent(id), GameTime::ZERO, 1.0)
        .expect("submitted");
    assert_eq!(sim.tick(GameTime::ZERO).expect("tick").events_delivered, 1);

    // Already delivered: too late.
    assert!(matches!(sim.withdraw_event(cascade.id), Err(SimError::EventNotPending(_))));

    let family = cascade.deliveries[1].event;
    sim.withdraw_event(family).expect("still pending");
    assert_eq!(sim.withdraw_cascade(cascade.id), 3);

    let report = sim.tick(h(1000.0)).expect("tick");
    assert_eq!(report.events_delivered, 0);
    assert_eq!(report.events_pending, 0);
    assert_eq!(sim.queue_stats().total_withdrawn, 4);
}

// ---------------------------------------------------------------------------
// Per-agent numeric failure is isolated
// ---------------------------------------------------------------------------

#[test]
fn numeric_failure_spares_other_agents() {
    let steady = villager("Anwen");
    let volatile = villager("Cadoc").with_archetype("volatile");
    let (steady_id, volatile_id) = (steady.id, volatile.id);

    let mut config = SimConfig::default();
    config.intention.register_archetype(
        "volatile",
        IntentionWeights {
            emotion: f64::MAX,
            m_emotion: Projection::new([[2.0; emotion::DIM]; 8]),
            ..IntentionWeights::default()
        },
    );
    let mut sim = Simulation::new(config, reach(vec![steady_id, volatile_id])).expect("valid");
    sim.enter(steady).expect("unique");
    sim.enter(volatile).expect("unique");

    sim.submit_event(LocalityTier::Personal, joy(1.0), OriginContext::default(), GameTime::ZERO, 1.0)
        .expect("submitted");
    let report = sim.tick(GameTime::ZERO).expect("tick itself succeeds");

    assert_eq!(report.agents_updated, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].agent, volatile_id);
    assert!(matches!(report.failures[0].error, SimError::NumericDrift { .. }));

    let failed = sim.get_current_vectors(volatile_id).expect("present");
    assert_eq!(failed.intention, IntentionVector::uniform());
    let fine = sim.get_current_vectors(steady_id).expect("present");
    assert_ne!(fine.intention, IntentionVector::uniform());
}

// ---------------------------------------------------------------------------
// Concurrent ingestion
// ---------------------------------------------------------------------------

#[test]
fn concurrent_ingestion_loses_nothing() {
    let agent = villager("Gwen");
    let id = agent.id;
    let mut sim = Simulation::new(SimConfig::default(), reach(vec![id])).expect("valid");
    sim.enter(agent).expect("unique");

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let ingest = sim.ingest();
            scope.spawn(move || {
                for i in 0..25 {
                    let at = h(f64::from(worker * 25 + i) * 0.1);
                    ingest
                        .submit_event(LocalityTier::City, joy(0.01), OriginContext::from_agent(id), at, 1.0)
                        .expect("submitted");
                }
            });
        }
    });

    // City origin → regional (0.3) → national (0.045) → global (0.00225, cut).
    assert_eq!(sim.queue_stats().depth, 100 * 3);
    let report = sim.tick(h(24.0 * 14.0)).expect("tick");
    assert_eq!(report.events_delivered, 300);
    assert_eq!(report.events_pending, 0);
    assert_eq!(report.agents_updated, 1);
}

#[test]
fn ingest_handle_works_alongside_ticks() {
    let agent = villager("Rhys");
    let id = agent.id;
    let mut sim = Simulation::new(SimConfig::default(), reach(vec![id])).expect("valid");
    sim.enter(agent).expect("unique");
    let ingest = sim.ingest();

    let producer = std::thread::spawn(move || {
        (0..50)
            .map(|i| {
                ingest.submit_event(
                    LocalityTier::Global,
                    joy(0.02),
                    OriginContext::default(),
                    h(100.0 + f64::from(i)),
                    1.0,
                )
            })
            .filter(Result::is_ok)
            .count()
    });

    let mut delivered = 0;
    for step in 1..=10 {
        delivered += sim.tick(h(f64::from(step) * 5.0)).expect("tick").events_delivered;
    }
    let accepted = producer.join().expect("producer thread");
    delivered += sim.tick(h(200.0)).expect("tick").events_delivered;

    assert_eq!(accepted, 50);
    assert_eq!(delivered, 50);
}
