//! Read-only view of an agent for dialogue and memory layers.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::agent::AgentState;
use crate::types::{AgentId, GameTime};
use crate::vector::{EmotionVector, IntentionVector, PersonalityVector, emotion, intention, personality};

/// A copy of the vectors a dialogue layer needs. Never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSnapshot {
    /// Whose snapshot this is.
    pub agent: AgentId,
    /// Agent's display name.
    pub name: String,
    /// Game-time the snapshot was taken.
    pub taken_at: GameTime,
    /// Current drive distribution.
    pub intention: IntentionVector,
    /// Current affect.
    pub emotion: EmotionVector,
    /// Fixed traits.
    pub personality: PersonalityVector,
}

impl VectorSnapshot {
    /// Snapshot `agent` at `taken_at`.
    #[must_use]
    pub fn of(agent: &AgentState, taken_at: GameTime) -> Self {
        Self {
            agent: agent.id,
            name: agent.name.clone(),
            taken_at,
            intention: agent.intention,
            emotion: agent.emotion,
            personality: *agent.personality(),
        }
    }

    /// The strongest drive.
    #[must_use]
    pub fn dominant_intention(&self) -> &'static str {
        self.intention.dominant(&intention::LABELS)
    }

    /// The strongest affect.
    #[must_use]
    pub fn dominant_emotion(&self) -> &'static str {
        self.emotion.dominant(&emotion::LABELS)
    }

    /// Short plain-text summary: top three drives, moods and traits.
    #[must_use]
    pub fn character_sheet(&self) -> String {
        let mut sheet = String::new();
        let _ = writeln!(sheet, "{}", self.name);
        write_line(&mut sheet, "Drives", &self.intention.top(&intention::LABELS, 3));
        write_line(&mut sheet, "Mood", &self.emotion.top(&emotion::LABELS, 3));
        write_line(&mut sheet, "Traits", &self.personality.top(&personality::LABELS, 3));
        sheet
    }
}

fn write_line(out: &mut String, heading: &str, entries: &[(&'static str, f64)]) {
    let parts: Vec<String> = entries
        .iter()
        .map(|(label, value)| format!("{label} {value:.2}"))
        .collect();
    let _ = writeln!(out, "{heading}: {}", parts.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_labels_and_sheet() {
        let agent = AgentState::new(
            "Bram",
            PersonalityVector::new([0.9, 0.2, 0.4, 0.7, 0.1]),
            GameTime::ZERO,
        )
        .with_emotion(EmotionVector::new([0.1, 0.0, 0.6, 0.3, 0.0, 0.0, 0.0, 0.0]));
        let mut snap = VectorSnapshot::of(&agent, GameTime::from_hours(2.0));
        snap.intention = IntentionVector::new([0.05, 0.4, 0.1, 0.05, 0.05, 0.25, 0.05, 0.05]);

        assert_eq!(snap.dominant_intention(), "socialize");
        assert_eq!(snap.dominant_emotion(), "anger");

        let sheet = snap.character_sheet();
        assert!(sheet.starts_with("Bram\n"));
        assert!(sheet.contains("Drives: socialize 0.40, dominate 0.25, achieve 0.10"));
        assert!(sheet.contains("Mood: anger 0.60, fear 0.30, joy 0.10"));
        assert!(sheet.contains("Traits: openness 0.90, agreeableness 0.70, extraversion 0.40"));
    }
}
