use super::{merge, split, AvlTree, HashArray};

use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug)]
enum TreeOp {
    Insert(i16),
    Remove(i16),
    Contains(i16),
}

#[derive(Clone, Debug)]
enum ArrayOp {
    Add(String, u32),
    Remove(String),
    Find(String),
    Clear,
}

fn tree_ops_strategy() -> impl Strategy<Value = Vec<TreeOp>> {
    // Narrow key range so duplicates and removals of present keys are frequent
    let key = -64i16..64;
    let op = prop_oneof![
        50 => key.clone().prop_map(TreeOp::Insert),
        35 => key.clone().prop_map(TreeOp::Remove),
        15 => key.prop_map(TreeOp::Contains),
    ];
    prop::collection::vec(op, 0..=500)
}

fn array_key_strategy() -> impl Strategy<Value = String> + Clone {
    "[a-z]{0,3}"
}

fn array_ops_strategy() -> impl Strategy<Value = Vec<ArrayOp>> {
    let key = array_key_strategy();
    let op = prop_oneof![
        50 => (key.clone(), any::<u32>()).prop_map(|(k, v)| ArrayOp::Add(k, v)),
        30 => key.clone().prop_map(ArrayOp::Remove),
        19 => key.prop_map(ArrayOp::Find),
        1 => Just(ArrayOp::Clear),
    ];
    prop::collection::vec(op, 0..=1000)
}

/// Sorted multiset contents of a key-count model.
fn expand(model: &BTreeMap<i16, usize>) -> Vec<i16> {
    model
        .iter()
        .flat_map(|(key, count)| std::iter::repeat(*key).take(*count))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_tree_equivalence(ops in tree_ops_strategy()) {
        let mut tree = AvlTree::new();
        let mut model: BTreeMap<i16, usize> = BTreeMap::new();

        for op in ops {
            match op {
                TreeOp::Insert(key) => {
                    tree.insert(key);
                    *model.entry(key).or_default() += 1;
                }
                TreeOp::Remove(key) => {
                    let expected = match model.get_mut(&key) {
                        None => false,
                        Some(count) => {
                            *count -= 1;
                            if *count == 0 {
                                model.remove(&key);
                            }
                            true
                        }
                    };
                    prop_assert_eq!(tree.remove(&key), expected);
                }
                TreeOp::Contains(key) => {
                    prop_assert_eq!(tree.contains(&key), model.contains_key(&key));
                }
            }
            tree.check_consistency();
        }

        let expected = expand(&model);
        prop_assert_eq!(tree.len(), expected.len());
        let got: Vec<i16> = tree.iter().copied().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_merge_is_sorted_union(
        first in prop::collection::vec(any::<i16>(), 0..200),
        second in prop::collection::vec(any::<i16>(), 0..200),
    ) {
        let first_tree: AvlTree<i16> = first.iter().copied().collect();
        let second_tree: AvlTree<i16> = second.iter().copied().collect();

        let merged = merge(&first_tree, &second_tree);
        merged.check_consistency();

        let mut expected: Vec<i16> = first.iter().chain(second.iter()).copied().collect();
        expected.sort();
        let got: Vec<i16> = merged.iter().copied().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_split_reassembles(
        values in prop::collection::vec(any::<i16>(), 0..200),
        pivot in prop::option::of(any::<i16>()),
    ) {
        let tree: AvlTree<i16> = values.iter().copied().collect();
        let (left, right) = split(&tree, pivot.as_ref());
        left.check_consistency();
        right.check_consistency();

        let mut joined: Vec<i16> = left.iter().copied().collect();
        joined.extend(right.iter().copied());
        let original: Vec<i16> = tree.iter().copied().collect();
        prop_assert_eq!(joined, original);

        if let (Some(max_left), Some(min_right)) = (left.iter().last(), right.iter().next()) {
            prop_assert!(max_left <= min_right);
        }
        match pivot {
            None => {
                prop_assert_eq!(left.len(), tree.len() / 2);
            }
            Some(pivot) => {
                prop_assert!(left.iter().all(|key| *key < pivot));
                prop_assert!(right.iter().all(|key| *key >= pivot));
            }
        }
    }

    #[test]
    fn prop_array_equivalence(ops in array_ops_strategy()) {
        let mut array: HashArray<String, u32> = HashArray::new();
        let mut model: HashMap<String, u32> = HashMap::new();

        for op in ops {
            match op {
                ArrayOp::Add(key, value) => {
                    let new = model.insert(key.clone(), value).is_none();
                    prop_assert_eq!(array.add(key, value), Ok(new));
                    let limit = array.config().max_load_factor * array.capacity() as f64;
                    prop_assert!(array.len() as f64 <= limit);
                }
                ArrayOp::Remove(key) => {
                    let removed = model.remove(&key).is_some();
                    prop_assert_eq!(array.remove(&key), Ok(removed));
                }
                ArrayOp::Find(key) => {
                    prop_assert_eq!(array.find(&key), Ok(model.get(&key)));
                }
                ArrayOp::Clear => {
                    array.clear();
                    model.clear();
                }
            }

            prop_assert_eq!(array.len(), model.len());
        }

        array.check_consistency();
        let mut got: Vec<&String> = array.keys();
        let mut expected: Vec<&String> = model.keys().collect();
        got.sort();
        expected.sort();
        prop_assert_eq!(got, expected);
    }
}
