//! Core table: slot layout, linear probing, load tracking, and resize.

use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::{fmt, mem};
use std::collections::hash_map::RandomState;

/// Capacity used by [`HashTable::new`].
pub const DEFAULT_CAPACITY: usize = 4;

/// Load-factor ceiling used by [`HashTable::new`].
pub const DEFAULT_MAX_LOAD: f64 = 0.5;

/// Construction parameters rejected by the validating constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Requested capacity was zero.
    Capacity,
    /// Requested load-factor ceiling was outside `(0.0, 1.0]`.
    MaxLoad,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Capacity => f.write_str("size parameter must be a positive integer."),
            ConfigError::MaxLoad => {
                f.write_str("max_load parameter must be a float between 0.0 and 1.0.")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Returned by [`HashTable::get`] and [`HashTable::pop`] when no entry has
/// the requested key. The table is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyNotFound;

impl fmt::Display for KeyNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("key not found")
    }
}

impl std::error::Error for KeyNotFound {}

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
}

/// A tombstone marks a slot vacated by `pop`. Probes cross it, so entries
/// displaced past this slot stay reachable; `set` may reclaim it.
#[derive(Debug)]
enum Slot<K, V> {
    Empty,
    Tombstone,
    Occupied(Entry<K, V>),
}

impl<K, V> Default for Slot<K, V> {
    fn default() -> Self {
        Slot::Empty
    }
}

fn new_slots<K, V>(capacity: usize) -> Vec<Slot<K, V>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, Default::default);
    slots
}

/// An open-addressing hash table.
///
/// Entries live directly in a slot array of length `capacity`. A key's home
/// slot is `hash % capacity`; collisions resolve by linear probing. Each
/// entry stores its hash at insertion, so relocation during resize never
/// calls `K: Hash` again. Once `load / capacity` would exceed the `max_load`
/// ceiling fixed at construction, the slot array grows (doubling) and every
/// entry is rehashed into it.
pub struct HashTable<K, V, S = RandomState> {
    hasher: S,
    slots: Vec<Slot<K, V>>,
    load: usize,
    max_load: f64,
}

impl<K, V> HashTable<K, V>
where
    K: Eq + Hash,
{
    /// A table with [`DEFAULT_CAPACITY`], [`DEFAULT_MAX_LOAD`], and the
    /// standard library's general-purpose hasher.
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    /// A table with validated `capacity` and `max_load`.
    ///
    /// `capacity` must be positive and `max_load` must lie in `(0.0, 1.0]`.
    pub fn with_config(capacity: usize, max_load: f64) -> Result<Self, ConfigError> {
        Self::with_config_and_hasher(capacity, max_load, Default::default())
    }
}

impl<K, V> Default for HashTable<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Default capacity and load ceiling with a caller-supplied hasher.
    ///
    /// The hasher is trusted to be deterministic per key; nothing about its
    /// behavior is checked. A degenerate hasher degrades probing to linear
    /// scans but stays correct.
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            slots: new_slots(DEFAULT_CAPACITY),
            load: 0,
            max_load: DEFAULT_MAX_LOAD,
        }
    }

    /// Validated `capacity` and `max_load` with a caller-supplied hasher.
    pub fn with_config_and_hasher(
        capacity: usize,
        max_load: f64,
        hasher: S,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::Capacity);
        }
        // NaN fails both bounds and lands here too.
        if !(max_load > 0.0 && max_load <= 1.0) {
            return Err(ConfigError::MaxLoad);
        }
        Ok(Self {
            hasher,
            slots: new_slots(capacity),
            load: 0,
            max_load,
        })
    }

    /// Number of occupied entries.
    pub fn load(&self) -> usize {
        self.load
    }

    pub fn is_empty(&self) -> bool {
        self.load == 0
    }

    /// Number of allocated slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Load-factor ceiling fixed at construction.
    pub fn max_load(&self) -> f64 {
        self.max_load
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn home_index(&self, hash: u64) -> usize {
        (hash % self.slots.len() as u64) as usize
    }

    /// Walks the probe sequence for `key`: stops at the first empty slot or
    /// after one full cycle, crossing tombstones. The cycle bound makes
    /// lookups terminate even when no slot is empty.
    fn find_index<Q>(&self, hash: u64, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let capacity = self.slots.len();
        let mut index = self.home_index(hash);
        for _ in 0..capacity {
            match &self.slots[index] {
                Slot::Empty => return None,
                Slot::Occupied(entry) if entry.hash == hash && entry.key.borrow() == key => {
                    return Some(index);
                }
                _ => {}
            }
            index = (index + 1) % capacity;
        }
        None
    }

    /// First reusable slot (tombstone or empty) on the probe path.
    /// Callers must have established that `key` is absent and that at least
    /// one slot is free, so reclaiming an early tombstone cannot shadow a
    /// live entry.
    fn free_index(&self, hash: u64) -> usize {
        let capacity = self.slots.len();
        let mut index = self.home_index(hash);
        loop {
            match self.slots[index] {
                Slot::Empty | Slot::Tombstone => return index,
                Slot::Occupied(_) => index = (index + 1) % capacity,
            }
        }
    }

    fn max_load_reached(&self) -> bool {
        (self.load + 1) as f64 / self.slots.len() as f64 > self.max_load
    }

    /// Inserts `key -> value`, or overwrites the value of an existing entry
    /// with an equal key.
    ///
    /// An update never changes `load` and never resizes. An insertion that
    /// would push `load / capacity` past the ceiling grows the table first,
    /// so the load-factor invariant holds again before this returns.
    pub fn set(&mut self, key: K, value: V) {
        let hash = self.make_hash(&key);
        if let Some(index) = self.find_index(hash, &key) {
            match &mut self.slots[index] {
                Slot::Occupied(entry) => entry.value = value,
                _ => unreachable!("find_index returned a vacant slot"),
            }
            return;
        }
        if self.max_load_reached() {
            self.grow();
        }
        let index = self.free_index(hash);
        self.slots[index] = Slot::Occupied(Entry { key, value, hash });
        self.load += 1;
    }

    /// Returns the value stored for `key`.
    pub fn get<Q>(&self, key: &Q) -> Result<&V, KeyNotFound>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        let index = self.find_index(hash, key).ok_or(KeyNotFound)?;
        match &self.slots[index] {
            Slot::Occupied(entry) => Ok(&entry.value),
            _ => unreachable!("find_index returned a vacant slot"),
        }
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V, KeyNotFound>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        let index = self.find_index(hash, key).ok_or(KeyNotFound)?;
        match &mut self.slots[index] {
            Slot::Occupied(entry) => Ok(&mut entry.value),
            _ => unreachable!("find_index returned a vacant slot"),
        }
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        self.find_index(hash, key).is_some()
    }

    /// Removes the entry for `key` and returns its value.
    ///
    /// The vacated slot becomes a tombstone, so entries that probed through
    /// it remain reachable. Capacity never shrinks.
    pub fn pop<Q>(&mut self, key: &Q) -> Result<V, KeyNotFound>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        let index = self.find_index(hash, key).ok_or(KeyNotFound)?;
        match mem::replace(&mut self.slots[index], Slot::Tombstone) {
            Slot::Occupied(entry) => {
                self.load -= 1;
                Ok(entry.value)
            }
            _ => unreachable!("find_index returned a vacant slot"),
        }
    }

    /// Iterates occupied entries in slot order. The order is an artifact of
    /// hashing and probing, not a guarantee.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.slots.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            slots: self.slots.iter_mut(),
        }
    }

    /// Doubles capacity until one more insertion fits under the ceiling,
    /// then relocates every entry into a fresh slot array. Relocation uses
    /// the hash stored in each entry; `K: Hash` is not invoked. Tombstones
    /// are not carried over. `load` is unchanged.
    fn grow(&mut self) {
        let mut new_capacity = self.slots.len() * 2;
        while (self.load + 1) as f64 / new_capacity as f64 > self.max_load {
            new_capacity *= 2;
        }
        let old = mem::replace(&mut self.slots, new_slots(new_capacity));
        for slot in old {
            if let Slot::Occupied(entry) = slot {
                let mut index = self.home_index(entry.hash);
                while matches!(self.slots[index], Slot::Occupied(_)) {
                    index = (index + 1) % new_capacity;
                }
                self.slots[index] = Slot::Occupied(entry);
            }
        }
    }
}

impl<K, V, S> fmt::Debug for HashTable<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.slots.iter().filter_map(|slot| match slot {
                Slot::Occupied(entry) => Some((&entry.key, &entry.value)),
                _ => None,
            }))
            .finish()
    }
}

/// Iterator over immutable entries in a [`HashTable`].
pub struct Iter<'a, K, V> {
    slots: core::slice::Iter<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Slot::Occupied(entry) = slot {
                return Some((&entry.key, &entry.value));
            }
        }
        None
    }
}

/// Iterator over entries in a [`HashTable`] with mutable value access.
pub struct IterMut<'a, K, V> {
    slots: core::slice::IterMut<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Slot::Occupied(entry) = slot {
                return Some((&entry.key, &mut entry.value));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::hash::Hasher;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0 // force every key onto the same home slot
        }
    }

    /// Invariant: `new` starts empty with the documented defaults.
    #[test]
    fn new_uses_defaults() {
        let t: HashTable<i32, i32> = HashTable::new();
        assert_eq!(t.load(), 0);
        assert!(t.is_empty());
        assert_eq!(t.capacity(), DEFAULT_CAPACITY);
        assert_eq!(t.max_load(), DEFAULT_MAX_LOAD);
    }

    /// Invariant: zero capacity is rejected; the boundary values of the
    /// load ceiling are classified exactly.
    #[test]
    fn config_validation() {
        assert_eq!(
            HashTable::<i32, i32>::with_config(0, 0.5).unwrap_err(),
            ConfigError::Capacity
        );
        for bad in [0.0, -0.5, 1.5, f64::NAN] {
            assert_eq!(
                HashTable::<i32, i32>::with_config(4, bad).unwrap_err(),
                ConfigError::MaxLoad
            );
        }
        assert!(HashTable::<i32, i32>::with_config(1, 1.0).is_ok());
        assert!(HashTable::<i32, i32>::with_config(1, 0.01).is_ok());
    }

    #[test]
    fn config_error_messages() {
        assert_eq!(
            ConfigError::Capacity.to_string(),
            "size parameter must be a positive integer."
        );
        assert_eq!(
            ConfigError::MaxLoad.to_string(),
            "max_load parameter must be a float between 0.0 and 1.0."
        );
    }

    /// Invariant: a popped slot becomes a tombstone that later keys probe
    /// across, and `set` reclaims it for a new entry.
    #[test]
    fn tombstone_is_crossed_and_reclaimed() {
        let mut t: HashTable<&str, i32, ConstBuildHasher> =
            HashTable::with_config_and_hasher(8, 1.0, ConstBuildHasher).unwrap();
        // All keys hash to 0, so they occupy slots 0, 1, 2 in insert order.
        t.set("a", 1);
        t.set("b", 2);
        t.set("c", 3);

        assert_eq!(t.pop("b"), Ok(2));
        assert!(matches!(t.slots[1], Slot::Tombstone));
        // "c" sits past the tombstone and must still be reachable.
        assert_eq!(t.get("c"), Ok(&3));

        // The next insertion reuses the vacated slot instead of extending
        // the probe chain.
        t.set("d", 4);
        match &t.slots[1] {
            Slot::Occupied(entry) => assert_eq!(entry.key, "d"),
            other => panic!("expected slot 1 reclaimed, got {:?}", other),
        }
        assert_eq!(t.load(), 3);
        assert_eq!(t.capacity(), 8);
    }

    /// Invariant: at `max_load = 1.0` the table may fill completely; misses
    /// still terminate and the next insertion grows.
    #[test]
    fn full_table_at_unit_max_load() {
        let mut t: HashTable<&str, i32, ConstBuildHasher> =
            HashTable::with_config_and_hasher(2, 1.0, ConstBuildHasher).unwrap();
        t.set("a", 1);
        t.set("b", 2);
        assert_eq!(t.capacity(), 2);
        assert_eq!(t.load(), 2);

        // No empty slot left; the miss must stop after one full cycle.
        assert_eq!(t.get("x"), Err(KeyNotFound));

        t.set("c", 3);
        assert_eq!(t.capacity(), 4);
        for (k, v) in [("a", 1), ("b", 2), ("c", 3)] {
            assert_eq!(t.get(k), Ok(&v));
        }
    }

    /// Invariant: growth doubles repeatedly until one more insertion fits
    /// under the ceiling, not just once.
    #[test]
    fn growth_loops_past_one_doubling() {
        let mut t: HashTable<i32, i32> = HashTable::with_config(4, 0.1).unwrap();
        // 1/4 and 1/8 both exceed 0.1; the first insertion must land at 16.
        t.set(1, 1);
        assert_eq!(t.capacity(), 16);
        assert_eq!(t.load(), 1);
        assert_eq!(t.get(&1), Ok(&1));
    }

    /// Invariant: the key's hash is computed once per `set` and carried
    /// through every resize; relocation never re-invokes `Hash`.
    #[test]
    fn resize_uses_stored_hashes() {
        #[derive(Clone)]
        struct CountedKey {
            id: u32,
            hashes: Rc<Cell<u32>>,
        }
        impl PartialEq for CountedKey {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }
        impl Eq for CountedKey {}
        impl Hash for CountedKey {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.hashes.set(self.hashes.get() + 1);
                self.id.hash(state);
            }
        }

        let hashes = Rc::new(Cell::new(0));
        let mut t: HashTable<CountedKey, u32> = HashTable::new();
        for id in 0..10 {
            t.set(
                CountedKey {
                    id,
                    hashes: hashes.clone(),
                },
                id,
            );
        }
        // 10 insertions under the default config force several resizes.
        assert!(t.capacity() > DEFAULT_CAPACITY);
        assert_eq!(hashes.get(), 10);
    }

    /// Invariant: after every `set`, `load / capacity <= max_load`.
    #[test]
    fn load_factor_ceiling_holds_after_every_set() {
        let mut t: HashTable<u32, u32> = HashTable::new();
        for i in 0..64 {
            t.set(i, i);
            assert!(t.load() as f64 / t.capacity() as f64 <= t.max_load());
        }
        assert_eq!(t.load(), 64);
    }

    /// Invariant: equal-hash, unequal keys resolve by key equality.
    #[test]
    fn colliding_keys_stay_distinct() {
        let mut t: HashTable<String, i32, ConstBuildHasher> =
            HashTable::with_hasher(ConstBuildHasher);
        for i in 0..20 {
            t.set(format!("k{}", i), i);
        }
        assert_eq!(t.load(), 20);
        for i in 0..20 {
            assert_eq!(t.get(&format!("k{}", i)), Ok(&i));
        }
    }
}
