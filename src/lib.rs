//! oa-hashtable: a single-threaded open-addressing hash table with a
//! pluggable hasher and a configurable load-factor ceiling.
//!
//! Internal design:
//!
//! Summary
//! - One component, [`HashTable<K, V, S>`](HashTable): a slot array, an
//!   occupied-entry count (the load), a load-factor ceiling fixed at
//!   construction, and a `BuildHasher` supplied by the caller (default:
//!   `std::collections::hash_map::RandomState`).
//! - Collisions resolve by linear probing from the home slot
//!   (`hash % capacity`). Removal leaves a tombstone so entries displaced
//!   past the vacated slot stay reachable; insertion reclaims the first
//!   tombstone on its probe path.
//! - When an insertion would push `load / capacity` above the ceiling, the
//!   slot array doubles (repeatedly, if needed) and every entry is
//!   relocated before the insert completes.
//!
//! Hasher and rehashing invariants
//! - Each entry stores its `u64` hash from insertion time and relocation
//!   always uses the stored hash; `K: Hash` runs once per `set` and never
//!   during resize.
//! - The hasher is an opaque capability. It is assumed deterministic for a
//!   given key and is never validated; a pathological hasher costs probe
//!   time, not correctness.
//!
//! Termination
//! - Probe loops are bounded by one full cycle of the slot array, so
//!   lookups of absent keys terminate even when `max_load = 1.0` lets the
//!   table fill completely.
//!
//! Notes and non-goals
//! - Single-threaded: no internal locking; callers serialize access.
//! - Capacity never shrinks; tombstones are only discarded on growth.
//! - No iteration-order guarantee.
//! - Errors are two synchronous kinds: [`ConfigError`] at construction and
//!   [`KeyNotFound`] from `get`/`get_mut`/`pop`. Everything else is total.

mod table;
mod table_proptest;

// Public surface
pub use table::{
    ConfigError, HashTable, Iter, IterMut, KeyNotFound, DEFAULT_CAPACITY, DEFAULT_MAX_LOAD,
};
