//! Locality tiers, the propagation topology, and the membership contract.
//!
//! Events ripple outward through six concentric tiers:
//!
//! ```text
//! personal → family → city → regional → national → global
//! ```
//!
//! Each hop *into* a tier has a fixed delay and attenuation. Who belongs to
//! "family X" or "city Y" is not the engine's business: it asks a
//! [`LocalityResolver`] supplied by the host.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, SimError};
use crate::types::AgentId;

/// One level of the spatial/social hierarchy, narrowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalityTier {
    /// The agents directly involved.
    Personal,
    /// Their household and kin.
    Family,
    /// Everyone in the same settlement.
    City,
    /// The surrounding region.
    Regional,
    /// The whole nation.
    National,
    /// Everyone.
    Global,
}

impl LocalityTier {
    /// All tiers in propagation order.
    pub const ALL: [Self; 6] = [
        Self::Personal,
        Self::Family,
        Self::City,
        Self::Regional,
        Self::National,
        Self::Global,
    ];

    /// Position in [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The next broader tier, or `None` at global.
    #[must_use]
    pub const fn broader(self) -> Option<Self> {
        match self {
            Self::Personal => Some(Self::Family),
            Self::Family => Some(Self::City),
            Self::City => Some(Self::Regional),
            Self::Regional => Some(Self::National),
            Self::National => Some(Self::Global),
            Self::Global => None,
        }
    }

    /// Lower-case label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Family => "family",
            Self::City => "city",
            Self::Regional => "regional",
            Self::National => "national",
            Self::Global => "global",
        }
    }
}

impl fmt::Display for LocalityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Delay and attenuation of the hop into a tier from its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hop {
    /// Game-hours between arrival at the previous tier and this one.
    pub delay_hours: f64,
    /// Magnitude multiplier applied on entering this tier, in (0, 1].
    pub attenuation: f64,
}

impl Hop {
    /// Construct a hop.
    #[must_use]
    pub const fn new(delay_hours: f64, attenuation: f64) -> Self {
        Self {
            delay_hours,
            attenuation,
        }
    }
}

/// The static hop table, one entry per non-personal tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalityTopology {
    /// personal → family.
    #[serde(default = "default_family")]
    pub family: Hop,
    /// family → city.
    #[serde(default = "default_city")]
    pub city: Hop,
    /// city → regional.
    #[serde(default = "default_regional")]
    pub regional: Hop,
    /// regional → national.
    #[serde(default = "default_national")]
    pub national: Hop,
    /// national → global.
    #[serde(default = "default_global")]
    pub global: Hop,
}

impl Default for LocalityTopology {
    fn default() -> Self {
        Self {
            family: default_family(),
            city: default_city(),
            regional: default_regional(),
            national: default_national(),
            global: default_global(),
        }
    }
}

impl LocalityTopology {
    /// The hop into `tier`, or `None` for personal (nothing precedes it).
    #[must_use]
    pub const fn hop_into(&self, tier: LocalityTier) -> Option<Hop> {
        match tier {
            LocalityTier::Personal => None,
            LocalityTier::Family => Some(self.family),
            LocalityTier::City => Some(self.city),
            LocalityTier::Regional => Some(self.regional),
            LocalityTier::National => Some(self.national),
            LocalityTier::Global => Some(self.global),
        }
    }

    /// Delays must be finite and non-negative, attenuation in (0, 1].
    ///
    /// # Errors
    /// Returns `SimError::Config` naming the first bad tier.
    pub fn validate(&self) -> Result<()> {
        for tier in LocalityTier::ALL {
            let Some(hop) = self.hop_into(tier) else {
                continue;
            };
            if !hop.delay_hours.is_finite() || hop.delay_hours < 0.0 {
                return Err(SimError::Config(format!(
                    "delay into {tier} must be finite and >= 0, got {}",
                    hop.delay_hours
                )));
            }
            if !(hop.attenuation > 0.0 && hop.attenuation <= 1.0) {
                return Err(SimError::Config(format!(
                    "attenuation into {tier} must be in (0, 1], got {}",
                    hop.attenuation
                )));
            }
        }
        Ok(())
    }
}

fn default_family() -> Hop {
    Hop::new(1.0, 0.8)
}

fn default_city() -> Hop {
    Hop::new(4.0, 0.5)
}

fn default_regional() -> Hop {
    Hop::new(24.0, 0.3)
}

fn default_national() -> Hop {
    Hop::new(72.0, 0.15)
}

fn default_global() -> Hop {
    Hop::new(168.0, 0.05)
}

/// Where an event came from, as far as membership resolution cares.
///
/// Opaque to the engine: it is carried on every event of a cascade and
/// handed back to the [`LocalityResolver`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginContext {
    /// The agent that caused the event, if any.
    pub source: Option<AgentId>,
    /// Named unit at each tier ("smith household", "ashford", ...).
    #[serde(default)]
    pub units: BTreeMap<LocalityTier, String>,
}

impl OriginContext {
    /// Context for an event caused by `agent`.
    #[must_use]
    pub fn from_agent(agent: AgentId) -> Self {
        Self {
            source: Some(agent),
            units: BTreeMap::new(),
        }
    }

    /// Builder: name the unit at `tier`.
    #[must_use]
    pub fn with_unit(mut self, tier: LocalityTier, unit: impl Into<String>) -> Self {
        self.units.insert(tier, unit.into());
        self
    }

    /// The unit named at `tier`, if any.
    #[must_use]
    pub fn unit(&self, tier: LocalityTier) -> Option<&str> {
        self.units.get(&tier).map(String::as_str)
    }
}

/// Resolves which agents an event reaches at a given tier.
///
/// Must be read-only and side-effect free from the engine's perspective.
pub trait LocalityResolver: Send + Sync {
    /// Agents reached at `tier` by an event from `origin`.
    fn members_of(&self, tier: LocalityTier, origin: &OriginContext) -> Vec<AgentId>;
}

impl<F> LocalityResolver for F
where
    F: Fn(LocalityTier, &OriginContext) -> Vec<AgentId> + Send + Sync,
{
    fn members_of(&self, tier: LocalityTier, origin: &OriginContext) -> Vec<AgentId> {
        self(tier, origin)
    }
}
