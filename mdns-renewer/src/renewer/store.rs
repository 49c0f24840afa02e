use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::ops::{Index, IndexMut};
use std::time::Instant;

use slab::Slab;

use super::entry::{RenewalEntry, RenewalKey};

/// Stable handle of an entry slot in the store's arena.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub(crate) struct EntryHandle(pub(crate) usize);

impl Index<EntryHandle> for Slab<RenewalEntry> {
    type Output = RenewalEntry;
    fn index(&self, handle: EntryHandle) -> &RenewalEntry {
        &self[handle.0]
    }
}

impl IndexMut<EntryHandle> for Slab<RenewalEntry> {
    fn index_mut(&mut self, handle: EntryHandle) -> &mut RenewalEntry {
        &mut self[handle.0]
    }
}

/// Owns every renewal entry together with the identity index and the
/// schedule.
///
/// All three structures are only ever updated together: `insert` adds an
/// entry to each of them and `pop_due` takes it out of each of them, handing
/// ownership back to the caller. An entry is therefore scheduled exactly once
/// for as long as it is indexed, and a heap item never refers to a vacated
/// slot.
#[derive(Debug, Default)]
pub(crate) struct RenewalStore {
    entries: Slab<RenewalEntry>,
    index: HashMap<RenewalKey, EntryHandle>,
    /// Min-heap on (schedule time, insertion sequence); the sequence keeps
    /// entries due at the same instant in FIFO order.
    schedule: BinaryHeap<Reverse<(Instant, u64, EntryHandle)>>,
    next_seq: u64,
}

impl RenewalStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        debug_assert_eq!(self.entries.len(), self.index.len());
        debug_assert_eq!(self.entries.len(), self.schedule.len());
        self.entries.len()
    }

    pub(crate) fn get(&self, key: &RenewalKey) -> Option<&RenewalEntry> {
        self.index.get(key).map(|&handle| &self.entries[handle])
    }

    /// Mutable access to an indexed entry.
    ///
    /// The entry keeps its place in the schedule; changes to its `time` take
    /// effect when its current slot comes due.
    pub(crate) fn get_mut(&mut self, key: &RenewalKey) -> Option<&mut RenewalEntry> {
        let handle = *self.index.get(key)?;
        Some(&mut self.entries[handle])
    }

    /// Schedules `entry` at its `time`.
    ///
    /// # Panics
    ///
    /// Panics if an entry with the same key is already stored.
    pub(crate) fn insert(&mut self, mut entry: RenewalEntry) -> EntryHandle {
        assert!(
            !self.index.contains_key(&entry.key),
            "renewal of {} is already scheduled",
            entry.key
        );

        entry.schedule_time = entry.time;
        let schedule_time = entry.schedule_time;
        let key = entry.key.clone();

        let handle = EntryHandle(self.entries.insert(entry));
        self.index.insert(key, handle);
        self.schedule.push(Reverse((schedule_time, self.next_seq, handle)));
        self.next_seq += 1;

        handle
    }

    /// Earliest schedule time, if any entry is stored.
    pub(crate) fn next_wake(&self) -> Option<Instant> {
        self.schedule
            .peek()
            .map(|&Reverse((schedule_time, _, _))| schedule_time)
    }

    /// Removes and returns the earliest entry if it is due at `now`.
    pub(crate) fn pop_due(&mut self, now: Instant) -> Option<RenewalEntry> {
        let &Reverse((schedule_time, _, handle)) = self.schedule.peek()?;
        if schedule_time > now {
            return None;
        }

        self.schedule.pop();
        let entry = self.entries.remove(handle.0);
        let indexed = self.index.remove(&entry.key);
        debug_assert_eq!(indexed, Some(handle));
        debug_assert_eq!(entry.schedule_time, schedule_time);

        Some(entry)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &RenewalEntry> {
        self.entries.iter().map(|(_, entry)| entry)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.schedule.clear();
    }
}
