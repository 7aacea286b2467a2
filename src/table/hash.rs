//! Horner-style string hashes used as the default probe strategies.
//!
//! Both hashes run the same polynomial over the key's characters and differ
//! only in the multiplier, which decorrelates the probe origin from the probe
//! step. The result is mapped through `h * 2 + 1` so that a power-of-two table
//! never sees an even step.

use crate::error::Result;

/// Polynomial hash of `text` modulo `capacity`, evaluated with Horner's rule.
///
/// ```
/// use avl_dhash::table::hash::horner;
/// assert_eq!(horner("", 8, 7), 1);
/// assert!(horner("key", 8, 7) < 8);
/// ```
pub fn horner(text: &str, capacity: usize, multiplier: usize) -> usize {
    let capacity = capacity.max(1) as u128;
    let multiplier = multiplier as u128;
    let mut hash: u128 = 0;
    for ch in text.chars() {
        hash = (multiplier * hash + ch as u128) % capacity;
    }
    ((hash * 2 + 1) % capacity) as usize
}

/// Probe origin: Horner hash with multiplier `capacity - 1`.
pub fn string_hash1<K: AsRef<str> + ?Sized>(key: &K, capacity: usize) -> Result<usize> {
    Ok(horner(key.as_ref(), capacity, capacity.saturating_sub(1)))
}

/// Probe step: Horner hash with multiplier `capacity + 1`.
pub fn string_hash2<K: AsRef<str> + ?Sized>(key: &K, capacity: usize) -> Result<usize> {
    Ok(horner(key.as_ref(), capacity, capacity + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horner() {
        // ('a' = 97) -> 97 % 8 = 1 -> 1 * 2 + 1 = 3
        assert_eq!(horner("a", 8, 7), 3);
        // 7 * 1 + 98 = 105 % 8 = 1 -> 3
        assert_eq!(horner("ab", 8, 7), 3);
        // 9 * 1 + 98 = 107 % 8 = 3 -> 7
        assert_eq!(horner("ab", 8, 9), 7);
    }

    #[test]
    fn test_odd_step_for_power_of_two() {
        for capacity in [2, 8, 64, 1024] {
            for key in ["", "a", "key", "another key", "ключ"] {
                assert_eq!(string_hash2(key, capacity).unwrap() % 2, 1);
                assert!(string_hash1(key, capacity).unwrap() < capacity);
            }
        }
    }

    #[test]
    fn test_strategies_differ() {
        let differ = (0..64)
            .map(|i| format!("key{i}"))
            .filter(|key| string_hash1(key, 64).unwrap() != string_hash2(key, 64).unwrap())
            .count();
        assert!(differ > 0);
    }
}
