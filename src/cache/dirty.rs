//! Dirty Queue Module
//!
//! Ordered buffer of mutations waiting to be replayed against the sink.

use std::collections::VecDeque;
use std::mem;

use crate::cache::DirtyRecord;

// == Dirty Queue ==
/// Append-only log of caller mutations between two flushes.
///
/// Records for the same key are kept side by side and never coalesced; replaying
/// them in order makes the sink converge on the last write.
#[derive(Debug)]
pub struct DirtyQueue<V> {
    records: VecDeque<DirtyRecord<V>>,
}

impl<V> Default for DirtyQueue<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> DirtyQueue<V> {
    // == Constructor ==
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            records: VecDeque::new(),
        }
    }

    /// Appends an upsert of `key`.
    pub fn push_upsert(&mut self, key: String, value: V) {
        self.records.push_back(DirtyRecord::upsert(key, value));
    }

    /// Appends a removal of `key`, whether or not the key is cached.
    pub fn push_remove(&mut self, key: String) {
        self.records.push_back(DirtyRecord::remove(key));
    }

    // == Take ==
    /// Detaches every pending record, leaving an empty queue behind.
    pub fn take(&mut self) -> VecDeque<DirtyRecord<V>> {
        mem::take(&mut self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates pending records in append order.
    pub fn iter(&self) -> impl Iterator<Item = &DirtyRecord<V>> {
        self.records.iter()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Mutation;

    #[test]
    fn test_queue_keeps_append_order() {
        let mut queue = DirtyQueue::new();

        queue.push_upsert("k".to_string(), "1");
        queue.push_remove("k".to_string());
        queue.push_upsert("k".to_string(), "2");

        let mutations: Vec<&Mutation<&str>> = queue.iter().map(|r| &r.mutation).collect();
        assert_eq!(
            mutations,
            vec![&Mutation::Upsert("1"), &Mutation::Remove, &Mutation::Upsert("2")]
        );
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_take_empties_queue() {
        let mut queue = DirtyQueue::new();
        queue.push_upsert("a".to_string(), 1);
        queue.push_upsert("b".to_string(), 2);

        let taken = queue.take();

        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].key, "a");
        assert!(queue.is_empty());

        queue.push_remove("c".to_string());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_take_on_empty_queue() {
        let mut queue: DirtyQueue<u8> = DirtyQueue::new();
        assert!(queue.take().is_empty());
    }
}
