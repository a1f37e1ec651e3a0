//! Agent state and the registry that owns it.
//!
//! Every simulated character gets one [`AgentState`] carrying its five
//! vectors. The host decides who enters and leaves through
//! [`AgentRegistry::enter`] / [`AgentRegistry::leave`]; the engine only
//! rewrites emotion, intention and `last_update` of agents already present.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::types::{AgentId, GameTime};
use crate::vector::{
    EmotionVector, EnvironmentVector, IntentionVector, PersonalityVector, SocialVector,
};

/// Archetype used when none is given.
pub const DEFAULT_ARCHETYPE: &str = "generic";

/// One agent's full vectorial state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    /// Stable identifier for the agent's lifetime.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Selects the intention weight set.
    pub archetype: String,
    personality: PersonalityVector,
    pub(crate) emotion: EmotionVector,
    pub(crate) intention: IntentionVector,
    social_influence: SocialVector,
    environment: EnvironmentVector,
    /// Game-time the emotion was last decayed to.
    pub last_update: GameTime,
}

impl AgentState {
    /// A fresh agent: neutral emotion, uniform intention, zero social and
    /// environment inputs.
    #[must_use]
    pub fn new(name: impl Into<String>, personality: PersonalityVector, now: GameTime) -> Self {
        Self {
            id: AgentId::new(),
            name: name.into(),
            archetype: DEFAULT_ARCHETYPE.to_string(),
            personality,
            emotion: EmotionVector::zeros(),
            intention: IntentionVector::uniform(),
            social_influence: SocialVector::zeros(),
            environment: EnvironmentVector::zeros(),
            last_update: now,
        }
    }

    /// Use a specific id instead of a random one.
    #[must_use]
    pub fn with_id(mut self, id: AgentId) -> Self {
        self.id = id;
        self
    }

    /// Assign an archetype.
    #[must_use]
    pub fn with_archetype(mut self, archetype: impl Into<String>) -> Self {
        self.archetype = archetype.into();
        self
    }

    /// Start from a non-neutral emotion, clamped into range.
    #[must_use]
    pub fn with_emotion(mut self, emotion: EmotionVector) -> Self {
        self.emotion = emotion.clamped(crate::vector::emotion::MIN, crate::vector::emotion::MAX);
        self
    }

    /// Current affect, each component in [-1, 1].
    #[must_use]
    pub fn emotion(&self) -> &EmotionVector {
        &self.emotion
    }

    /// Current drive distribution (sums to 1).
    #[must_use]
    pub fn intention(&self) -> &IntentionVector {
        &self.intention
    }

    /// Big Five traits. Fixed for the agent's lifetime.
    #[must_use]
    pub fn personality(&self) -> &PersonalityVector {
        &self.personality
    }

    /// Social pressures acting on the agent.
    #[must_use]
    pub fn social_influence(&self) -> &SocialVector {
        &self.social_influence
    }

    /// Environmental conditions around the agent.
    #[must_use]
    pub fn environment(&self) -> &EnvironmentVector {
        &self.environment
    }

    /// Overwrite the current affect, clamped into [-1, 1]. Host-side only.
    ///
    /// # Errors
    /// Returns [`SimError::NumericDrift`] if any component is not finite.
    pub fn set_emotion(&mut self, emotion: EmotionVector) -> Result<()> {
        if !emotion.is_finite() {
            return Err(SimError::NumericDrift { stage: "emotion" });
        }
        self.emotion = emotion.clamped(crate::vector::emotion::MIN, crate::vector::emotion::MAX);
        Ok(())
    }

    /// Replace the social inputs. Host-side only.
    ///
    /// # Errors
    /// Returns [`SimError::NumericDrift`] if any component is not finite.
    pub fn set_social_influence(&mut self, social: SocialVector) -> Result<()> {
        if !social.is_finite() {
            return Err(SimError::NumericDrift { stage: "social influence" });
        }
        self.social_influence = social;
        Ok(())
    }

    /// Replace the environment inputs. Host-side only.
    ///
    /// # Errors
    /// Returns [`SimError::NumericDrift`] if any component is not finite.
    pub fn set_environment(&mut self, environment: EnvironmentVector) -> Result<()> {
        if !environment.is_finite() {
            return Err(SimError::NumericDrift { stage: "environment" });
        }
        self.environment = environment;
        Ok(())
    }
}

/// Owns every [`AgentState`], one per id.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: BTreeMap<AgentId, AgentState>,
}

impl AgentRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an agent to the simulation.
    ///
    /// # Errors
    /// Returns [`SimError::DuplicateAgent`] if the id is already present.
    pub fn enter(&mut self, agent: AgentState) -> Result<AgentId> {
        let id = agent.id;
        if self.agents.contains_key(&id) {
            return Err(SimError::DuplicateAgent(id));
        }
        self.agents.insert(id, agent);
        Ok(id)
    }

    /// Remove an agent; its state is dropped.
    ///
    /// # Errors
    /// Returns [`SimError::AgentNotFound`] if no such agent exists.
    pub fn leave(&mut self, id: AgentId) -> Result<AgentState> {
        self.agents.remove(&id).ok_or(SimError::AgentNotFound(id))
    }

    /// Look up an agent.
    #[must_use]
    pub fn get(&self, id: AgentId) -> Option<&AgentState> {
        self.agents.get(&id)
    }

    /// Mutable access to an agent.
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut AgentState> {
        self.agents.get_mut(&id)
    }

    /// Whether an agent is registered.
    #[must_use]
    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    /// Visit every agent in id order.
    pub fn for_each(&self, mut f: impl FnMut(&AgentState)) {
        for agent in self.agents.values() {
            f(agent);
        }
    }

    /// All registered ids, in order.
    #[must_use]
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    /// Number of registered agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether no agents are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut AgentState> {
        self.agents.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::{emotion, environment};

    fn agent(name: &str) -> AgentState {
        AgentState::new(name, PersonalityVector::new([0.5; 5]), GameTime::ZERO)
    }

    #[test]
    fn new_agent_starts_neutral() {
        let a = agent("Mira");
        assert_eq!(a.archetype, DEFAULT_ARCHETYPE);
        assert_eq!(a.emotion, EmotionVector::zeros());
        assert!((a.intention.sum() - 1.0).abs() < 1e-12);
        assert_eq!(*a.social_influence(), SocialVector::zeros());
        assert_eq!(a.last_update, GameTime::ZERO);
    }

    #[test]
    fn with_emotion_clamps() {
        let a = agent("Tor").with_emotion(EmotionVector::new([2.0, -3.0, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0]));
        assert!((a.emotion[emotion::JOY] - 1.0).abs() < f64::EPSILON);
        assert!((a.emotion[emotion::SADNESS] + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn set_emotion_clamps_and_rejects_nan() {
        let mut a = agent("Pell");
        a.set_emotion(EmotionVector::new([4.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -9.0]))
            .expect("finite");
        assert!((a.emotion()[emotion::JOY] - 1.0).abs() < f64::EPSILON);
        assert!((a.emotion()[emotion::ANTICIPATION] + 1.0).abs() < f64::EPSILON);

        let mut bad = EmotionVector::zeros();
        bad[emotion::FEAR] = f64::NAN;
        assert!(matches!(a.set_emotion(bad), Err(SimError::NumericDrift { .. })));
        assert!((a.emotion()[emotion::JOY] - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn setters_reject_non_finite() {
        let mut a = agent("Ilse");
        let mut env = EnvironmentVector::zeros();
        env[environment::SAFETY] = f64::NAN;
        assert!(a.set_environment(env).is_err());
        assert_eq!(*a.environment(), EnvironmentVector::zeros());

        env[environment::SAFETY] = 0.9;
        a.set_environment(env).expect("finite");
        assert!((a.environment()[environment::SAFETY] - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn enter_and_leave() {
        let mut registry = AgentRegistry::new();
        let a = agent("Ana");
        let id = registry.enter(a.clone()).expect("first entry");
        assert!(matches!(registry.enter(a), Err(SimError::DuplicateAgent(dup)) if dup == id));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(id));

        let gone = registry.leave(id).expect("present");
        assert_eq!(gone.name, "Ana");
        assert!(registry.is_empty());
        assert!(matches!(registry.leave(id), Err(SimError::AgentNotFound(_))));
    }

    #[test]
    fn for_each_visits_everyone() {
        let mut registry = AgentRegistry::new();
        for name in ["a", "b", "c"] {
            registry.enter(agent(name)).expect("unique");
        }
        let mut seen = 0;
        registry.for_each(|_| seen += 1);
        assert_eq!(seen, 3);
        assert_eq!(registry.ids().len(), 3);
    }
}
