//! Cache Entry Module
//!
//! Defines resident cache entries and the pending-mutation records of the
//! write-back buffer.

// == Cache Entry ==
/// A resident key-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<V> {
    /// The lookup key
    pub key: String,
    /// The stored value, never interpreted by the cache
    pub value: V,
}

impl<V> CacheEntry<V> {
    /// Creates a new entry.
    pub fn new(key: String, value: V) -> Self {
        Self { key, value }
    }
}

// == Mutation ==
/// What a pending record does to its key in the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation<V> {
    /// Insert or replace the value
    Upsert(V),
    /// Remove the key
    Remove,
}

// == Dirty Record ==
/// A mutation requested by a caller that has not reached the sink yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirtyRecord<V> {
    /// The mutated key
    pub key: String,
    pub mutation: Mutation<V>,
}

impl<V> DirtyRecord<V> {
    /// Creates an upsert record.
    pub fn upsert(key: String, value: V) -> Self {
        Self {
            key,
            mutation: Mutation::Upsert(value),
        }
    }

    /// Creates a removal record.
    pub fn remove(key: String) -> Self {
        Self {
            key,
            mutation: Mutation::Remove,
        }
    }

    pub fn is_remove(&self) -> bool {
        matches!(self.mutation, Mutation::Remove)
    }
}
