//! Recency List Module
//!
//! Doubly-linked list ordering entries by access time, used for LRU eviction.

use crate::cache::CacheEntry;

/// Null link in the arena.
const NIL: usize = usize::MAX;

// == Node Handle ==
/// Stable handle to a node of a [`RecencyList`].
///
/// A handle stays valid until its node is removed; after that the slot may be
/// reused, so callers must drop handles of removed nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node<V> {
    entry: Option<CacheEntry<V>>,
    prev: usize,
    next: usize,
}

// == Recency List ==
/// Tracks access order for LRU eviction strategy.
///
/// Nodes live in a `Vec` arena linked by index:
/// - Front = Most recently used
/// - Back = Least recently used
///
/// Every operation is O(1); freed slots are recycled through a free list.
#[derive(Debug)]
pub struct RecencyList<V> {
    nodes: Vec<Node<V>>,
    head: usize,
    tail: usize,
    free: usize,
    len: usize,
}

impl<V> Default for RecencyList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RecencyList<V> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            head: NIL,
            tail: NIL,
            free: NIL,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts an entry as the most recently used one.
    pub fn push_front(&mut self, entry: CacheEntry<V>) -> NodeId {
        let idx = if self.free != NIL {
            let idx = self.free;
            self.free = self.nodes[idx].next;
            self.nodes[idx].entry = Some(entry);
            idx
        } else {
            self.nodes.push(Node {
                entry: Some(entry),
                prev: NIL,
                next: NIL,
            });
            self.nodes.len() - 1
        };

        self.link_front(idx);
        self.len += 1;
        NodeId(idx)
    }

    // == Move To Front ==
    /// Marks a node as recently used.
    ///
    /// Returns false if the handle does not point at a live node.
    pub fn move_to_front(&mut self, id: NodeId) -> bool {
        if !self.is_live(id) {
            return false;
        }
        if self.head != id.0 {
            self.unlink(id.0);
            self.link_front(id.0);
        }
        true
    }

    // == Remove ==
    /// Unlinks a node and returns its entry.
    pub fn remove(&mut self, id: NodeId) -> Option<CacheEntry<V>> {
        if !self.is_live(id) {
            return None;
        }
        let idx = id.0;
        self.unlink(idx);
        let entry = self.nodes[idx].entry.take();
        self.nodes[idx].next = self.free;
        self.free = idx;
        self.len -= 1;
        entry
    }

    // == Pop Back ==
    /// Returns and removes the least recently used entry.
    ///
    /// Returns None if the list is empty.
    pub fn pop_back(&mut self) -> Option<CacheEntry<V>> {
        if self.tail == NIL {
            None
        } else {
            self.remove(NodeId(self.tail))
        }
    }

    // == Accessors ==
    /// Returns the entry behind a handle.
    pub fn get(&self, id: NodeId) -> Option<&CacheEntry<V>> {
        self.nodes.get(id.0).and_then(|node| node.entry.as_ref())
    }

    /// Returns the entry behind a handle for in-place updates.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut CacheEntry<V>> {
        self.nodes.get_mut(id.0).and_then(|node| node.entry.as_mut())
    }

    /// Returns the most recently used entry.
    pub fn front(&self) -> Option<&CacheEntry<V>> {
        self.get(NodeId(self.head))
    }

    /// Returns the least recently used entry without removing it.
    pub fn back(&self) -> Option<&CacheEntry<V>> {
        self.get(NodeId(self.tail))
    }

    /// Returns the number of linked nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = NIL;
        self.tail = NIL;
        self.free = NIL;
        self.len = 0;
    }

    /// Iterates from most to least recently used.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            list: self,
            current: self.head,
            remaining: self.len,
        }
    }

    // == Internal Linking ==
    fn is_live(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.0)
            .is_some_and(|node| node.entry.is_some())
    }

    fn link_front(&mut self, idx: usize) {
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = self.head;
        if self.head != NIL {
            self.nodes[self.head].prev = idx;
        } else {
            self.tail = idx;
        }
        self.head = idx;
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        if prev != NIL {
            self.nodes[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.nodes[next].prev = prev;
        } else {
            self.tail = prev;
        }
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = NIL;
    }
}

// == Iterator ==
/// Iterator over entries in MRU to LRU order.
pub struct Iter<'a, V> {
    list: &'a RecencyList<V>,
    current: usize,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a CacheEntry<V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == NIL || self.remaining == 0 {
            return None;
        }
        let node = &self.list.nodes[self.current];
        self.current = node.next;
        self.remaining -= 1;
        node.entry.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str) -> CacheEntry<u32> {
        CacheEntry::new(key.to_string(), 0)
    }

    fn keys(list: &RecencyList<u32>) -> Vec<&str> {
        list.iter().map(|e| e.key.as_str()).collect()
    }

    #[test]
    fn test_list_new() {
        let list: RecencyList<u32> = RecencyList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.front().is_none());
        assert!(list.back().is_none());
    }

    #[test]
    fn test_push_front_orders_newest_first() {
        let mut list = RecencyList::new();

        list.push_front(entry("key1"));
        list.push_front(entry("key2"));
        list.push_front(entry("key3"));

        assert_eq!(list.len(), 3);
        assert_eq!(keys(&list), vec!["key3", "key2", "key1"]);
        // key1 is oldest (added first)
        assert_eq!(list.back().map(|e| e.key.as_str()), Some("key1"));
    }

    #[test]
    fn test_move_to_front() {
        let mut list = RecencyList::new();

        let a = list.push_front(entry("a"));
        list.push_front(entry("b"));
        list.push_front(entry("c"));

        assert!(list.move_to_front(a));

        assert_eq!(keys(&list), vec!["a", "c", "b"]);
        assert_eq!(list.back().map(|e| e.key.as_str()), Some("b"));
    }

    #[test]
    fn test_move_head_is_noop() {
        let mut list = RecencyList::new();

        list.push_front(entry("a"));
        let b = list.push_front(entry("b"));

        assert!(list.move_to_front(b));
        assert_eq!(keys(&list), vec!["b", "a"]);
    }

    #[test]
    fn test_pop_back() {
        let mut list = RecencyList::new();

        list.push_front(entry("key1"));
        list.push_front(entry("key2"));
        list.push_front(entry("key3"));

        assert_eq!(list.pop_back().map(|e| e.key), Some("key1".to_string()));
        assert_eq!(list.len(), 2);
        assert_eq!(list.pop_back().map(|e| e.key), Some("key2".to_string()));
        assert_eq!(list.pop_back().map(|e| e.key), Some("key3".to_string()));
        assert!(list.pop_back().is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_middle() {
        let mut list = RecencyList::new();

        list.push_front(entry("key1"));
        let key2 = list.push_front(entry("key2"));
        list.push_front(entry("key3"));

        let removed = list.remove(key2);

        assert_eq!(removed.map(|e| e.key), Some("key2".to_string()));
        assert_eq!(list.len(), 2);
        assert_eq!(keys(&list), vec!["key3", "key1"]);
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let mut list = RecencyList::new();

        let a = list.push_front(entry("a"));
        list.remove(a);

        assert!(list.remove(a).is_none());
        assert!(!list.move_to_front(a));
        assert!(list.get(a).is_none());
    }

    #[test]
    fn test_slots_are_recycled() {
        let mut list = RecencyList::new();

        let a = list.push_front(entry("a"));
        list.push_front(entry("b"));
        list.remove(a);
        let c = list.push_front(entry("c"));

        assert_eq!(c, a);
        assert_eq!(keys(&list), vec!["c", "b"]);
        assert_eq!(list.nodes.len(), 2);
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut list = RecencyList::new();

        let a = list.push_front(entry("a"));
        if let Some(e) = list.get_mut(a) {
            e.value = 7;
        }

        assert_eq!(list.get(a).map(|e| e.value), Some(7));
    }

    #[test]
    fn test_order_after_multiple_touches() {
        let mut list = RecencyList::new();

        let a = list.push_front(entry("a"));
        let b = list.push_front(entry("b"));
        let c = list.push_front(entry("c"));

        // [c, b, a] -> touch a, c, b -> [b, c, a]
        list.move_to_front(a);
        list.move_to_front(c);
        list.move_to_front(b);

        assert_eq!(list.pop_back().map(|e| e.key), Some("a".to_string()));
        assert_eq!(list.pop_back().map(|e| e.key), Some("c".to_string()));
        assert_eq!(list.pop_back().map(|e| e.key), Some("b".to_string()));
    }

    #[test]
    fn test_clear() {
        let mut list = RecencyList::new();

        list.push_front(entry("a"));
        list.push_front(entry("b"));
        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 0);
    }
}
