//! The per-guild channel ledger.

use std::collections::HashMap;

use crate::entry::{ChannelEntry, SeedChannel};
use crate::id::ChannelId;
use crate::ordinal::Ordinal;

/// Ordered registry of the voice channels managed for one guild.
///
/// `entries` and `order` always hold the same set of ids. The map serves
/// occupancy updates, the sequence serves positional rules during a sweep.
#[derive(Debug, Clone)]
pub struct ChannelLedger {
    /// Name prefix of the managed set.
    prefix: String,
    /// Entries keyed by channel id.
    entries: HashMap<ChannelId, ChannelEntry>,
    /// Channel ids in managed order.
    order: Vec<ChannelId>,
    /// Set once the guild snapshot has been consumed.
    seeded: bool,
}

impl ChannelLedger {
    /// Create an empty, unseeded ledger for channels named `"{prefix} {n}"`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entries: HashMap::new(),
            order: Vec::new(),
            seeded: false,
        }
    }

    /// Name prefix of the managed set.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether the snapshot has already been consumed.
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Populate the ledger from the guild snapshot.
    ///
    /// `channels` must already be filtered to the managed category. Each one
    /// starts with occupancy 0, and the sequence is sorted by ordinal (stable,
    /// malformed names as 0). Runs once; later calls return `false` and change
    /// nothing.
    pub fn seed<I>(&mut self, channels: I) -> bool
    where
        I: IntoIterator<Item = SeedChannel>,
    {
        if self.seeded {
            tracing::debug!(prefix = %self.prefix, "ledger already seeded, ignoring snapshot");
            return false;
        }
        self.seeded = true;

        let mut keyed = Vec::new();
        for channel in channels {
            if self.entries.contains_key(&channel.id) {
                continue;
            }

            let ordinal = Ordinal::parse(&channel.name, &self.prefix);
            if !ordinal.is_parsed() {
                tracing::warn!(
                    channel = %channel.id,
                    name = %channel.name,
                    prefix = %self.prefix,
                    "channel name has no numeric suffix, ordering it first"
                );
            }

            keyed.push((ordinal.sort_key(), channel.id.clone()));
            self.entries
                .insert(channel.id.clone(), ChannelEntry::new(channel.id, channel.name));
        }

        keyed.sort_by_key(|(ordinal, _)| *ordinal);
        self.order = keyed.into_iter().map(|(_, id)| id).collect();

        tracing::info!(
            prefix = %self.prefix,
            channels = self.order.len(),
            "seeded channel ledger"
        );
        true
    }

    /// Change the occupancy of a tracked channel by `delta`, clamping at 0.
    ///
    /// Returns the new occupancy, or `None` when the channel is not tracked.
    pub fn adjust_occupancy(&mut self, id: &ChannelId, delta: i32) -> Option<u32> {
        self.entries.get_mut(id).map(|entry| entry.apply(delta))
    }

    /// Append an entry at the tail of the sequence.
    ///
    /// An id that is already tracked keeps its position and has its entry
    /// replaced.
    pub fn insert(&mut self, entry: ChannelEntry) {
        let id = entry.id.clone();
        if self.entries.insert(id.clone(), entry).is_none() {
            self.order.push(id);
        }
    }

    /// Remove a channel from both views, preserving the order of the rest.
    pub fn remove(&mut self, id: &ChannelId) -> Option<ChannelEntry> {
        let entry = self.entries.remove(id)?;
        if let Some(pos) = self.position_of(id) {
            self.order.remove(pos);
        }
        Some(entry)
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &ChannelId) -> Option<&ChannelEntry> {
        self.entries.get(id)
    }

    /// Whether a channel is tracked.
    pub fn contains(&self, id: &ChannelId) -> bool {
        self.entries.contains_key(id)
    }

    /// Entry at position `index` of the sequence.
    pub fn entry_at(&self, index: usize) -> Option<&ChannelEntry> {
        self.order.get(index).and_then(|id| self.entries.get(id))
    }

    /// Position of a channel in the sequence.
    pub fn position_of(&self, id: &ChannelId) -> Option<usize> {
        self.order.iter().position(|o| o == id)
    }

    /// Entries in managed order.
    pub fn ordered(&self) -> impl Iterator<Item = &ChannelEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Channel ids in managed order.
    pub fn ordered_ids(&self) -> &[ChannelId] {
        &self.order
    }

    /// Number of tracked channels.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sum of occupancy across all channels.
    pub fn total_occupancy(&self) -> u64 {
        self.entries.values().map(|e| u64::from(e.occupancy)).sum()
    }

    /// Owned copy of the ordered view, for status reporting.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            prefix: self.prefix.clone(),
            seeded: self.seeded,
            channels: self.ordered().cloned().collect(),
        }
    }
}

/// Point-in-time copy of a ledger's ordered view.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedgerSnapshot {
    pub prefix: String,
    pub seeded: bool,
    pub channels: Vec<ChannelEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn category() -> ChannelId {
        ChannelId::new("cat")
    }

    fn seed_channel(id: &str, name: &str) -> SeedChannel {
        SeedChannel::new(id, name, Some(category()))
    }

    fn names(ledger: &ChannelLedger) -> Vec<&str> {
        ledger.ordered().map(|e| e.name.as_str()).collect()
    }

    fn assert_consistent(ledger: &ChannelLedger) {
        assert_eq!(ledger.entries.len(), ledger.order.len());
        for id in &ledger.order {
            assert!(ledger.entries.contains_key(id), "{} in order but not in map", id);
        }
    }

    #[test]
    fn seed_sorts_by_ordinal() {
        let mut ledger = ChannelLedger::new("Voice");
        let seeded = ledger.seed(vec![
            seed_channel("1", "Voice 1"),
            seed_channel("3", "Voice 3"),
            seed_channel("2", "Voice 2"),
        ]);

        assert!(seeded);
        assert!(ledger.is_seeded());
        assert_eq!(names(&ledger), vec!["Voice 1", "Voice 2", "Voice 3"]);
        assert!(ledger.ordered().all(ChannelEntry::is_empty));
        assert_consistent(&ledger);
    }

    #[test]
    fn seed_orders_numerically_not_lexically() {
        let mut ledger = ChannelLedger::new("Voice");
        ledger.seed(vec![
            seed_channel("10", "Voice 10"),
            seed_channel("9", "Voice 9"),
            seed_channel("1", "Voice 1"),
        ]);

        assert_eq!(names(&ledger), vec!["Voice 1", "Voice 9", "Voice 10"]);
    }

    #[test]
    fn seed_puts_malformed_names_first() {
        let mut ledger = ChannelLedger::new("Voice");
        ledger.seed(vec![
            seed_channel("2", "Voice 2"),
            seed_channel("x", "Voice lounge"),
            seed_channel("1", "Voice 1"),
        ]);

        assert_eq!(names(&ledger), vec!["Voice lounge", "Voice 1", "Voice 2"]);
    }

    #[test]
    fn seed_runs_once() {
        let mut ledger = ChannelLedger::new("Voice");
        assert!(ledger.seed(vec![seed_channel("1", "Voice 1")]));
        assert!(!ledger.seed(vec![seed_channel("2", "Voice 2")]));

        assert_eq!(ledger.len(), 1);
        assert!(!ledger.contains(&ChannelId::new("2")));
    }

    #[test]
    fn seed_with_no_channels_still_marks_seeded() {
        let mut ledger = ChannelLedger::new("Voice");
        assert!(ledger.seed(Vec::new()));
        assert!(ledger.is_seeded());
        assert!(ledger.is_empty());
    }

    #[test]
    fn seed_ignores_duplicate_ids() {
        let mut ledger = ChannelLedger::new("Voice");
        ledger.seed(vec![seed_channel("1", "Voice 1"), seed_channel("1", "Voice 5")]);

        assert_eq!(ledger.len(), 1);
        assert_eq!(names(&ledger), vec!["Voice 1"]);
        assert_consistent(&ledger);
    }

    #[test]
    fn occupancy_never_goes_negative() {
        let mut ledger = ChannelLedger::new("Voice");
        let id = ChannelId::new("1");
        ledger.insert(ChannelEntry::new(id.clone(), "Voice 1"));

        assert_eq!(ledger.adjust_occupancy(&id, 1), Some(1));
        for _ in 0..5 {
            ledger.adjust_occupancy(&id, -1);
        }
        assert_eq!(ledger.get(&id).unwrap().occupancy, 0);
    }

    #[test]
    fn unknown_ids_are_noops() {
        let mut ledger = ChannelLedger::new("Voice");
        ledger.insert(ChannelEntry::new(ChannelId::new("1"), "Voice 1"));
        let before = ledger.snapshot();

        let ghost = ChannelId::new("ghost");
        assert_eq!(ledger.adjust_occupancy(&ghost, 1), None);
        assert_eq!(ledger.adjust_occupancy(&ghost, -1), None);
        assert!(ledger.remove(&ghost).is_none());

        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn remove_preserves_relative_order() {
        let mut ledger = ChannelLedger::new("Voice");
        for n in 1..=4 {
            let id = ChannelId::new(n.to_string());
            ledger.insert(ChannelEntry::new(id, format!("Voice {}", n)));
        }

        let removed = ledger.remove(&ChannelId::new("2")).unwrap();
        assert_eq!(removed.name, "Voice 2");
        assert_eq!(names(&ledger), vec!["Voice 1", "Voice 3", "Voice 4"]);
        assert_eq!(ledger.position_of(&ChannelId::new("4")), Some(2));
        assert_consistent(&ledger);
    }

    #[test]
    fn insert_appends_and_replaces_in_place() {
        let mut ledger = ChannelLedger::new("Voice");
        ledger.insert(ChannelEntry::new(ChannelId::new("1"), "Voice 1"));
        ledger.insert(ChannelEntry::new(ChannelId::new("2"), "Voice 2"));
        ledger.insert(ChannelEntry::with_occupancy(ChannelId::new("1"), "Voice 1", 4));

        assert_eq!(names(&ledger), vec!["Voice 1", "Voice 2"]);
        assert_eq!(ledger.entry_at(0).unwrap().occupancy, 4);
        assert_eq!(ledger.total_occupancy(), 4);
        assert_consistent(&ledger);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(u8),
        Remove(u8),
        Adjust(u8, i32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..16).prop_map(Op::Insert),
            (0u8..16).prop_map(Op::Remove),
            (0u8..16, -3i32..4).prop_map(|(id, d)| Op::Adjust(id, d)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn membership_stays_consistent(ops in prop::collection::vec(op(), 0..64)) {
            let mut ledger = ChannelLedger::new("Voice");
            let mut shadow: HashMap<ChannelId, i64> = HashMap::new();

            for op in ops {
                match op {
                    Op::Insert(n) => {
                        let id = ChannelId::new(n.to_string());
                        ledger.insert(ChannelEntry::new(id.clone(), format!("Voice {}", n)));
                        shadow.insert(id, 0);
                    }
                    Op::Remove(n) => {
                        let id = ChannelId::new(n.to_string());
                        ledger.remove(&id);
                        shadow.remove(&id);
                    }
                    Op::Adjust(n, delta) => {
                        let id = ChannelId::new(n.to_string());
                        ledger.adjust_occupancy(&id, delta);
                        if let Some(v) = shadow.get_mut(&id) {
                            *v = (*v + i64::from(delta)).max(0);
                        }
                    }
                }
            }

            prop_assert_eq!(ledger.entries.len(), ledger.order.len());
            prop_assert_eq!(ledger.len(), shadow.len());
            for (id, occupancy) in &shadow {
                prop_assert_eq!(i64::from(ledger.get(id).unwrap().occupancy), *occupancy);
            }
        }

        #[test]
        fn seed_yields_ascending_ordinals(ordinals in prop::collection::hash_set(0i64..500, 0..32)) {
            let mut ledger = ChannelLedger::new("Voice");
            ledger.seed(ordinals.iter().map(|n| seed_channel(&n.to_string(), &format!("Voice {}", n))));

            let keys: Vec<i64> = ledger
                .ordered()
                .map(|e| Ordinal::parse(&e.name, "Voice").sort_key())
                .collect();
            prop_assert_eq!(keys.len(), ordinals.len());
            prop_assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
