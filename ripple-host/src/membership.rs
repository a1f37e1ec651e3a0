//! Locality membership — who belongs to which household, city, region.
//!
//! The engine only knows tiers. This table maps `(tier, unit)` pairs such
//! as `(City, "ashford")` to the agents living there, and answers the
//! engine's [`LocalityResolver`] queries:
//!
//! - **personal** → the source agent, if known
//! - **family / city / regional / national** → everyone in the origin's
//!   unit at that tier (taken from the event, or else from where the
//!   source agent lives)
//! - **global** → everyone known

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::RwLock;
use ripple_core::{AgentId, LocalityResolver, LocalityTier, OriginContext};

/// Agent placement per tier.
#[derive(Debug, Clone, Default)]
pub struct MembershipTable {
    units: BTreeMap<(LocalityTier, String), BTreeSet<AgentId>>,
    placement: BTreeMap<AgentId, BTreeMap<LocalityTier, String>>,
}

impl MembershipTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make an agent known without placing it anywhere.
    pub fn register(&mut self, agent: AgentId) {
        self.placement.entry(agent).or_default();
    }

    /// Put `agent` into `unit` at `tier`, moving it out of its previous
    /// unit at that tier.
    pub fn place(&mut self, agent: AgentId, tier: LocalityTier, unit: impl Into<String>) {
        let unit = unit.into();
        let previous = self
            .placement
            .entry(agent)
            .or_default()
            .insert(tier, unit.clone());
        if let Some(old) = previous {
            self.drop_member(tier, old, agent);
        }
        self.units.entry((tier, unit)).or_default().insert(agent);
    }

    /// Forget an agent everywhere.
    pub fn remove(&mut self, agent: AgentId) {
        if let Some(placed) = self.placement.remove(&agent) {
            for (tier, unit) in placed {
                self.drop_member(tier, unit, agent);
            }
        }
    }

    /// Agents in `unit` at `tier`.
    #[must_use]
    pub fn members(&self, tier: LocalityTier, unit: &str) -> Vec<AgentId> {
        self.units
            .get(&(tier, unit.to_string()))
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Where `agent` lives, as an origin for events it causes.
    #[must_use]
    pub fn origin_for(&self, agent: AgentId) -> OriginContext {
        let mut origin = OriginContext::from_agent(agent);
        if let Some(placed) = self.placement.get(&agent) {
            origin.units.clone_from(placed);
        }
        origin
    }

    /// Number of known agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.placement.len()
    }

    /// Whether no agent is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placement.is_empty()
    }

    fn drop_member(&mut self, tier: LocalityTier, unit: String, agent: AgentId) {
        let key = (tier, unit);
        if let Some(set) = self.units.get_mut(&key) {
            set.remove(&agent);
            if set.is_empty() {
                self.units.remove(&key);
            }
        }
    }

    fn unit_for<'a>(&'a self, tier: LocalityTier, origin: &'a OriginContext) -> Option<&'a str> {
        origin.unit(tier).or_else(|| {
            let source = origin.source?;
            self.placement.get(&source)?.get(&tier).map(String::as_str)
        })
    }
}

impl LocalityResolver for MembershipTable {
    fn members_of(&self, tier: LocalityTier, origin: &OriginContext) -> Vec<AgentId> {
        match tier {
            LocalityTier::Personal => origin
                .source
                .filter(|id| self.placement.contains_key(id))
                .into_iter()
                .collect(),
            LocalityTier::Global => self.placement.keys().copied().collect(),
            _ => self
                .unit_for(tier, origin)
                .map(|unit| self.members(tier, unit))
                .unwrap_or_default(),
        }
    }
}

/// A [`MembershipTable`] the host keeps editing after handing it to a
/// simulation. Clones share the table.
#[derive(Debug, Clone, Default)]
pub struct SharedMembership(Arc<RwLock<MembershipTable>>);

impl SharedMembership {
    /// Wrap a table.
    #[must_use]
    pub fn new(table: MembershipTable) -> Self {
        Self(Arc::new(RwLock::new(table)))
    }

    /// Read access.
    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, MembershipTable> {
        self.0.read()
    }

    /// Write access.
    pub fn write(&self) -> parking_lot::RwLockWriteGuard<'_, MembershipTable> {
        self.0.write()
    }
}

impl LocalityResolver for SharedMembership {
    fn members_of(&self, tier: LocalityTier, origin: &OriginContext) -> Vec<AgentId> {
        self.0.read().members_of(tier, origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn village() -> (MembershipTable, [AgentId; 4]) {
        let ids = [AgentId::new(), AgentId::new(), AgentId::new(), AgentId::new()];
        let mut table = MembershipTable::new();
        for (i, id) in ids.iter().enumerate() {
            let household = if i < 2 { "miller" } else { "smith" };
            let city = if i < 3 { "ashford" } else { "brackwater" };
            table.place(*id, LocalityTier::Family, household);
            table.place(*id, LocalityTier::City, city);
            table.place(*id, LocalityTier::Regional, "vale");
        }
        (table, ids)
    }

    #[test]
    fn personal_resolves_the_source_only() {
        let (table, ids) = village();
        let origin = OriginContext::from_agent(ids[0]);
        assert_eq!(table.members_of(LocalityTier::Personal, &origin), vec![ids[0]]);
        let stranger = OriginContext::from_agent(AgentId::new());
        assert!(table.members_of(LocalityTier::Personal, &stranger).is_empty());
    }

    #[test]
    fn tier_units_come_from_the_source_agent() {
        let (table, ids) = village();
        let origin = OriginContext::from_agent(ids[2]);
        let family = table.members_of(LocalityTier::Family, &origin);
        assert_eq!(family.len(), 2);
        assert!(family.contains(&ids[2]) && family.contains(&ids[3]));
        assert_eq!(table.members_of(LocalityTier::City, &origin).len(), 3);
        assert_eq!(table.members_of(LocalityTier::Regional, &origin).len(), 4);
        assert!(table.members_of(LocalityTier::National, &origin).is_empty());
        assert_eq!(table.members_of(LocalityTier::Global, &origin).len(), 4);
    }

    #[test]
    fn explicit_unit_overrides_the_source() {
        let (table, ids) = village();
        let origin = OriginContext::from_agent(ids[0]).with_unit(LocalityTier::City, "brackwater");
        assert_eq!(table.members_of(LocalityTier::City, &origin), vec![ids[3]]);
    }

    #[test]
    fn moving_and_removing() {
        let (mut table, ids) = village();
        table.place(ids[0], LocalityTier::City, "brackwater");
        assert_eq!(table.members(LocalityTier::City, "ashford").len(), 2);
        assert_eq!(table.members(LocalityTier::City, "brackwater").len(), 2);

        table.remove(ids[3]);
        assert_eq!(table.members(LocalityTier::City, "brackwater"), vec![ids[0]]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.origin_for(ids[1]).unit(LocalityTier::Family), Some("miller"));
    }

    #[test]
    fn shared_table_sees_later_edits() {
        let shared = SharedMembership::default();
        let id = AgentId::new();
        let origin = OriginContext::from_agent(id);
        assert!(shared.members_of(LocalityTier::Global, &origin).is_empty());
        shared.write().register(id);
        assert_eq!(shared.members_of(LocalityTier::Personal, &origin), vec![id]);
    }
}
