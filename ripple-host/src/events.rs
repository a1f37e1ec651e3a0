//! World occurrences that feed the simulation.
//!
//! Each [`Occurrence`] knows the tier it starts at, how strongly it hits,
//! and the emotional shift it causes in everyone it reaches. Hosts build
//! one from game state and submit it; the engine handles the ripple.

use ripple_core::driver::EventIngest;
use ripple_core::vector::{EmotionVector, emotion};
use ripple_core::{AgentId, EventId, GameTime, ImpactPayload, LocalityTier, OriginContext};

/// Something that happened in the world.
#[derive(Debug, Clone, PartialEq)]
pub enum Occurrence {
    /// An agent died.
    Death {
        /// Who died.
        deceased: AgentId,
        /// How, for the dialogue layer.
        cause: String,
    },

    /// Two agents married.
    Marriage {
        /// The spouses.
        spouses: (AgentId, AgentId),
    },

    /// Something was stolen.
    Theft {
        /// The victim.
        victim: AgentId,
        /// What was taken.
        item: String,
    },

    /// A public celebration.
    Festival {
        /// Festival name.
        name: String,
    },

    /// A natural or man-made catastrophe.
    Disaster {
        /// "flood", "fire", "plague", ...
        kind: String,
        /// 0.0 (minor) to 1.0 (devastating); used as the base magnitude.
        severity: f64,
    },

    /// A trade agreement between settlements or guilds.
    TradeDeal {
        /// -1.0 (ruinous) to 1.0 (generous).
        fairness: f64,
    },

    /// Anything else, fully specified by the caller.
    Custom {
        /// Category label.
        kind: String,
        /// Human-readable description.
        description: String,
        /// Tier it starts at.
        tier: LocalityTier,
        /// Emotion delta at full magnitude.
        emotion: EmotionVector,
    },
}

impl Occurrence {
    /// Category label carried in the impact metadata.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Death { .. } => "death",
            Self::Marriage { .. } => "marriage",
            Self::Theft { .. } => "theft",
            Self::Festival { .. } => "festival",
            Self::Disaster { .. } => "disaster",
            Self::TradeDeal { .. } => "trade_deal",
            Self::Custom { kind, .. } => kind,
        }
    }

    /// Tier the cascade starts at.
    #[must_use]
    pub fn tier(&self) -> LocalityTier {
        match self {
            Self::Theft { .. } => LocalityTier::Personal,
            Self::Death { .. } | Self::Marriage { .. } => LocalityTier::Family,
            Self::Festival { .. } | Self::TradeDeal { .. } => LocalityTier::City,
            Self::Disaster { .. } => LocalityTier::Regional,
            Self::Custom { tier, .. } => *tier,
        }
    }

    /// Agent the occurrence centres on, if any.
    #[must_use]
    pub fn source(&self) -> Option<AgentId> {
        match self {
            Self::Death { deceased, .. } => Some(*deceased),
            Self::Marriage { spouses, .. } => Some(spouses.0),
            Self::Theft { victim, .. } => Some(*victim),
            Self::Festival { .. } | Self::Disaster { .. } | Self::TradeDeal { .. } | Self::Custom { .. } => None,
        }
    }

    /// Base magnitude in (0, 1].
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        match self {
            Self::Disaster { severity, .. } => severity.clamp(0.05, 1.0),
            _ => 1.0,
        }
    }

    /// Emotion delta at full magnitude.
    #[must_use]
    pub fn emotion_delta(&self) -> EmotionVector {
        let mut delta = EmotionVector::zeros();
        match self {
            Self::Death { .. } => {
                delta[emotion::SADNESS] = 0.6;
                delta[emotion::SURPRISE] = 0.3;
                delta[emotion::FEAR] = 0.2;
                delta[emotion::JOY] = -0.3;
            }
            Self::Marriage { .. } => {
                delta[emotion::JOY] = 0.5;
                delta[emotion::TRUST] = 0.3;
                delta[emotion::ANTICIPATION] = 0.2;
            }
            Self::Theft { .. } => {
                delta[emotion::ANGER] = 0.5;
                delta[emotion::TRUST] = -0.4;
                delta[emotion::FEAR] = 0.2;
                delta[emotion::DISGUST] = 0.2;
            }
            Self::Festival { .. } => {
                delta[emotion::JOY] = 0.4;
                delta[emotion::ANTICIPATION] = 0.3;
                delta[emotion::TRUST] = 0.1;
                delta[emotion::SURPRISE] = 0.1;
            }
            Self::Disaster { .. } => {
                delta[emotion::FEAR] = 0.6;
                delta[emotion::SURPRISE] = 0.5;
                delta[emotion::SADNESS] = 0.4;
                delta[emotion::JOY] = -0.4;
            }
            Self::TradeDeal { fairness } => {
                let fairness = fairness.clamp(-1.0, 1.0);
                delta[emotion::TRUST] = 0.4 * fairness;
                delta[emotion::JOY] = 0.2 * fairness;
                delta[emotion::ANGER] = (-0.3 * fairness).max(0.0);
            }
            Self::Custom { emotion, .. } => delta = *emotion,
        }
        delta
    }

    /// Human-readable one-liner for the dialogue layer.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Death { deceased, cause } => format!("{deceased} died ({cause})"),
            Self::Marriage { spouses } => format!("{} married {}", spouses.0, spouses.1),
            Self::Theft { victim, item } => format!("{item} was stolen from {victim}"),
            Self::Festival { name } => format!("The {name} festival began"),
            Self::Disaster { kind, severity } => format!("A {kind} struck (severity {severity:.2})"),
            Self::TradeDeal { fairness } => format!("A trade deal was struck (fairness {fairness:+.2})"),
            Self::Custom { description, .. } => description.clone(),
        }
    }

    /// Impact payload with kind, description and the emotion delta.
    #[must_use]
    pub fn impact(&self) -> ImpactPayload {
        let payload = ImpactPayload::new(self.emotion_delta()).describe(self.kind(), self.description());
        match self {
            Self::Marriage { spouses } => payload.with_meta("partner", spouses.1.to_string()),
            Self::Theft { item, .. } => payload.with_meta("item", item.clone()),
            Self::Disaster { kind, .. } => payload.with_meta("disaster", kind.clone()),
            _ => payload,
        }
    }

    /// Submit through an ingest handle at game-time `at`.
    ///
    /// `origin` supplies the locality units; the occurrence's own source
    /// agent is filled in when the origin has none.
    ///
    /// # Errors
    /// See [`EventIngest::submit_event`].
    pub fn submit(
        &self,
        ingest: &EventIngest,
        mut origin: OriginContext,
        at: GameTime,
    ) -> ripple_core::Result<EventId> {
        if origin.source.is_none() {
            origin.source = self.source();
        }
        ingest.submit_event(self.tier(), self.impact(), origin, at, self.magnitude())
    }
}
