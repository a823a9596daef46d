//! Branch target buffer implementation

use std::collections::{BTreeMap, HashMap};

/// Result of a BTB lookup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BtbOutcome {
    Hit,
    Miss,
}

impl BtbOutcome {
    pub fn is_hit(&self) -> bool {
        *self == BtbOutcome::Hit
    }
}

/// Fully-associative branch target buffer with LRU replacement.
///
/// Every entry carries the reference stamp of its last access, and the
/// stamps are kept in order so the least recently used entry is always
/// the first one in `recency`.
pub struct BranchTargetBuffer {
    capacity: usize,

    pub history: BtbHistory,

    entries: Vec<BtbEntry>,
    /// Tag to slot in `entries`
    slots: HashMap<u32, usize>,
    /// Reference stamp to slot in `entries`
    recency: BTreeMap<u64, usize>,
    ref_counter: u64,
}

impl BranchTargetBuffer {
    pub fn make(capacity: usize) -> Self {
        assert!(capacity > 0);

        Self {
            capacity,
            history: BtbHistory::default(),
            entries: Vec::new(),
            slots: HashMap::new(),
            recency: BTreeMap::new(),
            ref_counter: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of valid entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the entry tagged with `address` without touching its recency
    pub fn peek(&self, address: u32) -> Option<&BtbEntry> {
        self.slots.get(&address).map(|&i| &self.entries[i])
    }

    /// Tags ordered from least to most recently used
    pub fn lru_order(&self) -> Vec<u32> {
        self.recency.values().map(|&i| self.entries[i].tag).collect()
    }

    /// Classify `address` as a hit or a miss.
    /// A hit makes the entry the most recently used one.
    pub fn lookup(&mut self, address: u32) -> BtbOutcome {
        match self.slots.get(&address).copied() {
            Some(i) => {
                self.touch(i);
                self.history.num_hit += 1;
                BtbOutcome::Hit
            }
            None => {
                self.history.num_miss += 1;
                BtbOutcome::Miss
            }
        }
    }

    /// Record the resolved target of `address`.
    ///
    /// An existing entry is retrained to `target` if it differs; otherwise a
    /// new entry is inserted, evicting the least recently used one when the
    /// buffer is full. Returns are recorded with no target and never
    /// overwrite a known one.
    pub fn update(&mut self, address: u32, target: Option<u32>) {
        if let Some(i) = self.slots.get(&address).copied() {
            if target.is_some() && self.entries[i].target != target {
                self.entries[i].target = target;
            }
            self.touch(i);
            return;
        }

        let i = self.get_index_to_replace();
        let entry = BtbEntry {
            tag: address,
            target,
            prv_ref: 0,
        };
        if i == self.entries.len() {
            self.entries.push(entry);
        } else {
            let evicted = std::mem::replace(&mut self.entries[i], entry);
            self.slots.remove(&evicted.tag);
            self.recency.remove(&evicted.prv_ref);
            self.history.num_evict += 1;
        }
        self.slots.insert(address, i);
        self.touch(i);

        debug_assert!(self.entries.len() <= self.capacity);
    }

    /// Lookup followed by update, as one step
    pub fn lookup_and_update(
        &mut self,
        address: u32,
        target: Option<u32>,
    ) -> BtbOutcome {
        let outcome = self.lookup(address);
        self.update(address, target);
        outcome
    }

    /// Slot for a new entry: a free one while the buffer is filling up,
    /// the least recently used one afterwards
    fn get_index_to_replace(&self) -> usize {
        if self.entries.len() < self.capacity {
            return self.entries.len();
        }
        match self.recency.first_key_value() {
            Some((_, &i)) => i,
            None => unreachable!("full BTB with no recency information"),
        }
    }

    /// Stamp the entry with a fresh reference counter
    fn touch(&mut self, i: usize) {
        self.ref_counter += 1;
        let entry = &mut self.entries[i];
        self.recency.remove(&entry.prv_ref);
        entry.prv_ref = self.ref_counter;
        self.recency.insert(entry.prv_ref, i);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BtbEntry {
    pub tag: u32,
    pub target: Option<u32>,
    pub prv_ref: u64,
}

#[derive(Clone, Copy, Default, Debug)]
pub struct BtbHistory {
    pub num_hit: u64,
    pub num_miss: u64,
    pub num_evict: u64,
}
