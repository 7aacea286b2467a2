//! An associative array implemented with an open-addressing hash table.
//!
//! Collisions are resolved by double hashing: the probe sequence of a key is
//! `h1, h1 + h2, h1 + 2 * h2, ...` modulo the capacity, where `h1` and `h2` come
//! from two independent hash strategies. Removal leaves a tombstone in place so
//! that probe chains through the slot stay intact.

pub mod hash;

use std::fmt;
use std::mem;
use std::ops::Index;

use crate::error::{Error, Result};

/// Default number of slots of a new table.
pub const DEFAULT_CAPACITY: usize = 8;
/// Default upper bound of live entries per slot.
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;
/// Default number of non-empty slots per live entry above which tombstones are compacted.
pub const DEFAULT_TOMBSTONE_RATIO: usize = 2;
/// Largest number of slots a table may have.
pub const MAX_CAPACITY: usize = 1 << 31;

/// A hash strategy: maps a key to a slot index for a table of the given capacity.
pub type HashFn<K> = Box<dyn Fn(&K, usize) -> Result<usize>>;

/// Sizing parameters of a [`HashArray`].
#[derive(Clone, Debug, PartialEq)]
pub struct HashArrayConfig {
    /// Number of slots after construction and after [`HashArray::clear`].
    /// Rounded up to the next power of two.
    pub initial_capacity: usize,
    /// The table doubles before an insert would push the live entries above
    /// `max_load_factor * capacity`.
    pub max_load_factor: f64,
    /// The table is rebuilt at the same capacity once non-empty slots exceed
    /// `tombstone_ratio` times the live entries.
    pub tombstone_ratio: usize,
}

impl HashArrayConfig {
    /// Sets the number of slots of a new or cleared table.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Sets the fraction of slots live entries may fill before the table doubles.
    pub fn with_max_load_factor(mut self, max_load_factor: f64) -> Self {
        self.max_load_factor = max_load_factor;
        self
    }

    /// Sets the non-empty to live slot ratio above which tombstones are compacted.
    pub fn with_tombstone_ratio(mut self, tombstone_ratio: usize) -> Self {
        self.tombstone_ratio = tombstone_ratio;
        self
    }

    /// Checks that the parameters describe a usable table.
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 {
            return Err(Error::invalid_configuration(
                "initial capacity must be positive",
            ));
        }
        if self.initial_capacity > MAX_CAPACITY {
            return Err(Error::invalid_configuration(format!(
                "initial capacity {} exceeds {}",
                self.initial_capacity, MAX_CAPACITY
            )));
        }
        if !(self.max_load_factor > 0.0 && self.max_load_factor < 1.0) {
            return Err(Error::invalid_configuration(format!(
                "max load factor {} is not in (0, 1)",
                self.max_load_factor
            )));
        }
        if self.load_limit(self.capacity()) == 0 {
            return Err(Error::invalid_configuration(format!(
                "max load factor {} admits no entry in {} slots",
                self.max_load_factor,
                self.capacity()
            )));
        }
        if self.tombstone_ratio == 0 {
            return Err(Error::invalid_configuration(
                "tombstone ratio must be at least 1",
            ));
        }
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.initial_capacity.next_power_of_two()
    }

    /// Maximum number of live entries for the given capacity.
    fn load_limit(&self, capacity: usize) -> usize {
        (self.max_load_factor * capacity as f64) as usize
    }
}

impl Default for HashArrayConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            tombstone_ratio: DEFAULT_TOMBSTONE_RATIO,
        }
    }
}

/// An associative array implemented with a double-hashing hash table.
///
/// ```
/// use avl_dhash::HashArray;
/// let mut array = HashArray::new();
/// assert_eq!(array.add("one", 1), Ok(true));
/// assert_eq!(array.add("one", 2), Ok(false));
/// assert_eq!(array.find(&"one"), Ok(Some(&2)));
/// assert_eq!(array.remove(&"one"), Ok(true));
/// assert_eq!(array.find(&"one"), Ok(None));
/// ```
pub struct HashArray<K, V> {
    slots: Vec<Option<Slot<K, V>>>,
    num_live: usize,
    num_non_empty: usize,
    config: HashArrayConfig,
    hash1: HashFn<K>,
    hash2: HashFn<K>,
}

/// A non-empty slot. Removal clears `occupied` and keeps the slot allocated.
struct Slot<K, V> {
    key: K,
    value: V,
    occupied: bool,
}

/// Start index and step of a probe sequence.
#[derive(Clone, Copy, Debug)]
struct ProbeOrigin {
    start: usize,
    step: usize,
}

/// Slot indexes of one full probe cycle.
struct Probe {
    index: usize,
    step: usize,
    capacity: usize,
    remaining: usize,
}

impl<K, V> HashArray<K, V>
where
    K: AsRef<str> + Eq + 'static,
{
    /// Creates an empty array hashing the keys' text with the Horner strategies
    /// of [`hash`].
    pub fn new() -> Self {
        Self::with_hashers(hash::string_hash1::<K>, hash::string_hash2::<K>)
    }
}

impl<K: Eq, V> HashArray<K, V> {
    /// Creates an empty array with the default sizing and the given hash strategies.
    /// `hash1` yields the probe origin, `hash2` the probe step.
    pub fn with_hashers<H1, H2>(hash1: H1, hash2: H2) -> Self
    where
        H1: Fn(&K, usize) -> Result<usize> + 'static,
        H2: Fn(&K, usize) -> Result<usize> + 'static,
    {
        let config = HashArrayConfig::default();
        Self::from_parts(config, Box::new(hash1), Box::new(hash2))
    }

    /// Creates an empty array with the given sizing and hash strategies.
    pub fn with_config<H1, H2>(config: HashArrayConfig, hash1: H1, hash2: H2) -> Result<Self>
    where
        H1: Fn(&K, usize) -> Result<usize> + 'static,
        H2: Fn(&K, usize) -> Result<usize> + 'static,
    {
        config.validate()?;
        Ok(Self::from_parts(config, Box::new(hash1), Box::new(hash2)))
    }

    fn from_parts(config: HashArrayConfig, hash1: HashFn<K>, hash2: HashFn<K>) -> Self {
        Self {
            slots: empty_slots(config.capacity()),
            num_live: 0,
            num_non_empty: 0,
            config,
            hash1,
            hash2,
        }
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.num_live
    }

    /// Returns true if the array holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.num_live == 0
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of slots holding a removed entry.
    pub fn tombstones(&self) -> usize {
        self.num_non_empty - self.num_live
    }

    /// Returns the sizing parameters the array was built with.
    pub fn config(&self) -> &HashArrayConfig {
        &self.config
    }

    /// Inserts a key-value pair, or replaces the value if the key is present.
    /// Returns `Ok(true)` if a new binding was created and `Ok(false)` on update.
    ///
    /// May grow the table or compact its tombstones first. On error the array is
    /// left untouched.
    pub fn add(&mut self, key: K, value: V) -> Result<bool> {
        let mut capacity = self.capacity();
        while self.num_live + 1 > self.config.load_limit(capacity) {
            capacity = capacity
                .checked_mul(2)
                .filter(|capacity| *capacity <= MAX_CAPACITY)
                .ok_or_else(|| {
                    Error::invalid_configuration(format!(
                        "hash array cannot grow beyond {} slots",
                        MAX_CAPACITY
                    ))
                })?;
        }
        let origin = self.probe_origin(&key, capacity)?;

        if capacity != self.capacity() {
            log::debug!(
                "growing hash array from {} to {} slots ({} live entries)",
                self.capacity(),
                capacity,
                self.num_live
            );
            self.rebuild(capacity)?;
        } else if self.num_non_empty > self.config.tombstone_ratio.saturating_mul(self.num_live) {
            log::debug!(
                "compacting hash array of {} slots ({} tombstones)",
                capacity,
                self.tombstones()
            );
            self.rebuild(capacity)?;
        }

        Ok(self.place(key, value, origin))
    }

    /// Same as [`HashArray::add`].
    pub fn set(&mut self, key: K, value: V) -> Result<bool> {
        self.add(key, value)
    }

    /// Returns a reference to the value bound to the key.
    pub fn find(&self, key: &K) -> Result<Option<&V>> {
        Ok(self
            .find_index(key)?
            .and_then(|index| self.slots[index].as_ref())
            .map(|slot| &slot.value))
    }

    /// Same as [`HashArray::find`].
    pub fn get(&self, key: &K) -> Result<Option<&V>> {
        self.find(key)
    }

    /// Returns a mutable reference to the value bound to the key.
    pub fn find_mut(&mut self, key: &K) -> Result<Option<&mut V>> {
        let index = match self.find_index(key)? {
            Some(index) => index,
            None => return Ok(None),
        };
        Ok(self.slots[index].as_mut().map(|slot| &mut slot.value))
    }

    /// Returns true if the key is bound to a value.
    pub fn contains(&self, key: &K) -> Result<bool> {
        Ok(self.find_index(key)?.is_some())
    }

    /// Removes the key, leaving a tombstone in its slot.
    /// Returns whether the key was present.
    pub fn remove(&mut self, key: &K) -> Result<bool> {
        match self.find_index(key)? {
            None => Ok(false),
            Some(index) => {
                if let Some(slot) = self.slots[index].as_mut() {
                    slot.occupied = false;
                }
                self.num_live -= 1;
                Ok(true)
            }
        }
    }

    /// Returns the live keys in slot order.
    pub fn keys(&self) -> Vec<&K> {
        self.slots
            .iter()
            .flatten()
            .filter(|slot| slot.occupied)
            .map(|slot| &slot.key)
            .collect()
    }

    /// Drops all entries and returns to the configured initial capacity.
    pub fn clear(&mut self) {
        self.slots = empty_slots(self.config.capacity());
        self.num_live = 0;
        self.num_non_empty = 0;
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        let capacity = self.capacity();
        assert!(capacity.is_power_of_two());
        assert!(self.num_live <= self.num_non_empty);
        assert!(self.num_non_empty <= capacity);
        assert!(self.num_live <= self.config.load_limit(capacity));

        let mut num_live = 0;
        let mut num_non_empty = 0;
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(slot) = slot {
                num_non_empty += 1;
                if slot.occupied {
                    num_live += 1;
                    // Reachable through its probe sequence, and no earlier duplicate
                    assert_eq!(self.find_index(&slot.key), Ok(Some(index)));
                }
            }
        }
        assert_eq!(num_live, self.num_live);
        assert_eq!(num_non_empty, self.num_non_empty);
    }

    fn probe_origin(&self, key: &K, capacity: usize) -> Result<ProbeOrigin> {
        let start = (self.hash1)(key, capacity)? % capacity;
        // Odd steps visit every slot of a power-of-two table
        let step = ((self.hash2)(key, capacity)? % capacity) | 1;
        Ok(ProbeOrigin { start, step })
    }

    fn find_index(&self, key: &K) -> Result<Option<usize>> {
        let origin = self.probe_origin(key, self.capacity())?;
        for index in Probe::new(origin, self.capacity()) {
            match &self.slots[index] {
                // Inserts never skip an empty slot, so the key is absent
                None => break,
                Some(slot) if slot.occupied && slot.key == *key => return Ok(Some(index)),
                Some(_) => {}
            }
        }
        Ok(None)
    }

    /// Binds the key in the current slot array, given its probe origin for the
    /// current capacity. Returns whether a new binding was created.
    fn place(&mut self, key: K, value: V, origin: ProbeOrigin) -> bool {
        let mut first_tombstone = None;
        for index in Probe::new(origin, self.capacity()) {
            match self.slots[index].as_mut() {
                None => {
                    let target = match first_tombstone {
                        Some(tombstone) => tombstone,
                        None => {
                            self.num_non_empty += 1;
                            index
                        }
                    };
                    self.slots[target] = Some(Slot::new(key, value));
                    self.num_live += 1;
                    return true;
                }
                Some(slot) if slot.occupied => {
                    if slot.key == key {
                        slot.value = value;
                        return false;
                    }
                }
                Some(_) => {
                    // Keep probing, the key may be live further down the chain
                    if first_tombstone.is_none() {
                        first_tombstone = Some(index);
                    }
                }
            }
        }

        // Full cycle without an empty slot
        match first_tombstone {
            Some(target) => {
                self.slots[target] = Some(Slot::new(key, value));
                self.num_live += 1;
                true
            }
            None => unreachable!("load limit leaves a free slot on every probe cycle"),
        }
    }

    /// Reinserts every live entry into a fresh slot array of the given capacity,
    /// dropping tombstones. All keys are hashed before anything is moved.
    fn rebuild(&mut self, capacity: usize) -> Result<()> {
        let origins = self
            .slots
            .iter()
            .flatten()
            .filter(|slot| slot.occupied)
            .map(|slot| self.probe_origin(&slot.key, capacity))
            .collect::<Result<Vec<_>>>()?;

        let old_slots = mem::replace(&mut self.slots, empty_slots(capacity));
        self.num_live = 0;
        self.num_non_empty = 0;

        let live = old_slots.into_iter().flatten().filter(|slot| slot.occupied);
        for (slot, origin) in live.zip(origins) {
            self.place(slot.key, slot.value, origin);
        }
        Ok(())
    }
}

impl<K, V> Default for HashArray<K, V>
where
    K: AsRef<str> + Eq + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq, V> Index<&K> for HashArray<K, V> {
    type Output = V;

    /// Returns the value bound to the key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present or cannot be hashed.
    fn index(&self, key: &K) -> &V {
        match self.find(key) {
            Ok(Some(value)) => value,
            Ok(None) => panic!("key not found in hash array"),
            Err(err) => panic!("{}", err),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for HashArray<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a HashArray<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> HashArray<K, V> {
    /// Returns an iterator over every non-empty slot in slot order.
    ///
    /// This is a raw scan: removed entries still holding a slot are yielded too.
    /// Use [`HashArray::keys`] for live keys only.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.slots.iter(),
        }
    }
}

/// An iterator over the non-empty slots of a [`HashArray`], tombstones included.
pub struct Iter<'a, K, V> {
    slots: std::slice::Iter<'a, Option<Slot<K, V>>>,
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.slots
            .by_ref()
            .flatten()
            .next()
            .map(|slot| (&slot.key, &slot.value))
    }
}

impl<K, V> Slot<K, V> {
    fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            occupied: true,
        }
    }
}

impl Probe {
    fn new(origin: ProbeOrigin, capacity: usize) -> Self {
        Self {
            index: origin.start,
            step: origin.step,
            capacity,
            remaining: capacity,
        }
    }
}

impl Iterator for Probe {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let index = self.index;
        self.index = (self.index + self.step) % self.capacity;
        Some(index)
    }
}

fn empty_slots<K, V>(capacity: usize) -> Vec<Option<Slot<K, V>>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, || None);
    slots
}
