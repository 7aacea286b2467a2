//! Two independent in-memory collections.
//!
//! * [`AvlTree`]: a height-balanced binary search tree of ordered keys with
//!   in-order, level-order and related traversals, plus [`merge`] and [`split`].
//! * [`HashArray`]: an associative array on an open-addressing hash table with
//!   double hashing, tombstone deletion and automatic growth.
//!
//! ```
//! use avl_dhash::{AvlTree, HashArray};
//!
//! let tree: AvlTree<i32> = [5, 3, 8].into_iter().collect();
//! assert_eq!(tree.in_order(), vec![&3, &5, &8]);
//!
//! let mut array = HashArray::new();
//! array.add(String::from("five"), 5).unwrap();
//! assert_eq!(array[&String::from("five")], 5);
//! ```

pub mod error;
pub mod table;
pub mod tree;

pub use error::{Error, Result};
pub use table::{HashArray, HashArrayConfig};
pub use tree::{merge, split, AvlTree};


#[cfg(test)]
mod proptests;
