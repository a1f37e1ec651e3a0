//! World events — occurrences that ripple through the locality tiers.
//!
//! An event lives only inside the [`EventQueue`](crate::queue::EventQueue)
//! from creation until it is popped and applied, exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::locality::{LocalityTier, OriginContext};
use crate::types::{EventId, GameTime};
use crate::vector::EmotionVector;

/// What an event does to the agents it reaches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactPayload {
    /// Emotion delta at full magnitude.
    pub emotion: EmotionVector,
    /// Category ("murder", "festival", "trade_deal", ...). Opaque to the engine.
    #[serde(default)]
    pub kind: String,
    /// Human-readable description for dialogue/memory collaborators.
    #[serde(default)]
    pub description: String,
    /// Extra key/value metadata for collaborators. Opaque to the engine.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl ImpactPayload {
    /// Payload with only an emotion delta.
    #[must_use]
    pub fn new(emotion: EmotionVector) -> Self {
        Self {
            emotion,
            ..Self::default()
        }
    }

    /// Builder: set kind and description.
    #[must_use]
    pub fn describe(mut self, kind: impl Into<String>, description: impl Into<String>) -> Self {
        self.kind = kind.into();
        self.description = description.into();
        self
    }

    /// Builder: attach a metadata entry.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A scheduled delivery of an impact at one locality tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEvent {
    /// Unique identifier of this delivery.
    pub id: EventId,
    /// Identifier of the originating event; equal to `id` for the origin.
    pub cascade: EventId,
    /// Tier where the cascade began.
    pub origin_tier: LocalityTier,
    /// Tier this copy is delivered at.
    pub tier: LocalityTier,
    /// Emotion delta and collaborator metadata.
    pub impact: ImpactPayload,
    /// Who/where the cascade came from, for membership resolution.
    pub origin: OriginContext,
    /// Game-time the originating occurrence happened.
    pub created_at: GameTime,
    /// Game-time this copy becomes due (`>= created_at`).
    pub deliver_at: GameTime,
    /// Multiplier on the impact, in (0, 1]; shrinks as the cascade widens.
    pub magnitude: f64,
    /// Wall-clock time the cascade was submitted (diagnostics only).
    pub submitted_at: DateTime<Utc>,
}

impl WorldEvent {
    /// An originating event, due at its own creation time.
    #[must_use]
    pub fn originate(
        tier: LocalityTier,
        impact: ImpactPayload,
        origin: OriginContext,
        created_at: GameTime,
        magnitude: f64,
    ) -> Self {
        let id = EventId::new();
        Self {
            id,
            cascade: id,
            origin_tier: tier,
            tier,
            impact,
            origin,
            created_at,
            deliver_at: created_at,
            magnitude,
            submitted_at: Utc::now(),
        }
    }

    /// A derived copy of this event for a broader tier.
    #[must_use]
    pub fn derive(&self, tier: LocalityTier, deliver_at: GameTime, magnitude: f64) -> Self {
        Self {
            id: EventId::new(),
            cascade: self.cascade,
            origin_tier: self.origin_tier,
            tier,
            impact: self.impact.clone(),
            origin: self.origin.clone(),
            created_at: self.created_at,
            deliver_at,
            magnitude,
            submitted_at: self.submitted_at,
        }
    }

    /// Whether this is the originating event of its cascade.
    #[must_use]
    pub fn is_origin(&self) -> bool {
        self.id == self.cascade
    }

    /// The impact actually applied: emotion delta × magnitude.
    #[must_use]
    pub fn scaled_impact(&self) -> EmotionVector {
        self.impact.emotion.scaled(self.magnitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::emotion;

    #[test]
    fn derived_events_share_cascade_and_payload() {
        let mut delta = EmotionVector::zeros();
        delta[emotion::SADNESS] = 0.6;
        let origin = WorldEvent::originate(
            LocalityTier::Personal,
            ImpactPayload::new(delta).describe("death", "The miller died"),
            OriginContext::default(),
            GameTime::from_hours(10.0),
            1.0,
        );
        assert!(origin.is_origin());
        assert_eq!(origin.deliver_at, origin.created_at);

        let child = origin.derive(LocalityTier::Family, GameTime::from_hours(11.0), 0.8);
        assert!(!child.is_origin());
        assert_eq!(child.cascade, origin.id);
        assert_eq!(child.origin_tier, LocalityTier::Personal);
        assert_eq!(child.impact, origin.impact);
        assert_eq!(child.created_at, origin.created_at);
        assert!((child.scaled_impact()[emotion::SADNESS] - 0.48).abs() < 1e-12);
    }
}
