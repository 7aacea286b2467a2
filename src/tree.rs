use std::cmp::{self, Ordering};
use std::collections::VecDeque;
use std::fmt;

/// A height-balanced binary search tree of ordered keys.
///
/// Equal keys are not rejected: an insert of a key equal to a node's key descends
/// into the right subtree, so duplicates are kept as distinct nodes.
pub struct AvlTree<K: Ord> {
    root: Link<K>,
    num_nodes: usize,
}

type Link<K> = Option<Box<Node<K>>>;

#[derive(Clone)]
struct Node<K> {
    key: K,
    left: Link<K>,
    right: Link<K>,
    height: usize,
}

impl<K: Ord> AvlTree<K> {
    /// Creates an empty tree.
    /// No memory is allocated until the first key is inserted.
    pub fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
        }
    }

    /// Returns true if the tree contains no keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of keys in the tree, duplicates included.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the height of the tree. A single leaf has height 1.
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// Clears the tree, deallocating all nodes.
    pub fn clear(&mut self) {
        self.root = None;
        self.num_nodes = 0;
    }

    /// Returns true if the tree contains a key equal to the given one.
    pub fn contains(&self, key: &K) -> bool {
        let mut current = &self.root;
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Equal => return true,
                Ordering::Less => &node.left,
                Ordering::Greater => &node.right,
            }
        }
        false
    }

    /// Inserts a key into the tree.
    pub fn insert(&mut self, key: K) {
        self.root = Some(insert(self.root.take(), key));
        self.num_nodes += 1;
    }

    /// Removes one node holding a key equal to the given one.
    /// Returns whether such a node was found.
    pub fn remove(&mut self, key: &K) -> bool {
        let mut removed = false;
        self.root = remove(self.root.take(), key, &mut removed);
        if removed {
            debug_assert!(self.num_nodes >= 1);
            self.num_nodes -= 1;
        }
        removed
    }

    /// Returns an iterator over the keys in ascending order.
    pub fn iter(&self) -> Iter<'_, K> {
        let mut iter = Iter {
            stack: Vec::with_capacity(self.height()),
            remaining: self.num_nodes,
        };
        iter.push_left_spine(&self.root);
        iter
    }

    /// Returns all keys in ascending order.
    pub fn in_order(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.num_nodes);
        in_order(&self.root, &mut keys);
        keys
    }

    /// Returns the root key followed by the in-order keys of its left and then
    /// its right subtree.
    ///
    /// Only the root is visited ahead of its children; both subtrees are listed
    /// in in-order sequence. For trees of height two or less this is the same as
    /// a pre-order traversal.
    pub fn pre_order(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.num_nodes);
        if let Some(root) = &self.root {
            keys.push(&root.key);
            in_order(&root.left, &mut keys);
            in_order(&root.right, &mut keys);
        }
        keys
    }

    /// Returns the in-order keys of the root's left and then right subtree,
    /// followed by the root key.
    ///
    /// Mirror of [`AvlTree::pre_order`]: only the root is deferred behind its
    /// children.
    pub fn post_order(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.num_nodes);
        if let Some(root) = &self.root {
            in_order(&root.left, &mut keys);
            in_order(&root.right, &mut keys);
            keys.push(&root.key);
        }
        keys
    }

    /// Returns all keys in level order, root first, left to right within a level.
    pub fn bfs(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.num_nodes);
        let mut queue: VecDeque<&Node<K>> = VecDeque::new();
        if let Some(root) = &self.root {
            queue.push_back(root);
        }
        while let Some(node) = queue.pop_front() {
            keys.push(&node.key);
            if let Some(left) = &node.left {
                queue.push_back(left);
            }
            if let Some(right) = &node.right {
                queue.push_back(right);
            }
        }
        keys
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        let num_nodes = check_node(&self.root);
        assert_eq!(num_nodes, self.num_nodes);

        let keys = self.in_order();
        assert_eq!(num_nodes, keys.len());
        assert!(keys.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}

impl<K: Ord> Default for AvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone> Clone for AvlTree<K> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            num_nodes: self.num_nodes,
        }
    }
}

impl<K: Ord + fmt::Debug> fmt::Debug for AvlTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K: Ord> FromIterator<K> for AvlTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for AvlTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K: Ord> IntoIterator for &'a AvlTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over the keys of an [`AvlTree`].
pub struct Iter<'a, K> {
    stack: Vec<&'a Node<K>>,
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    fn push_left_spine(&mut self, mut link: &'a Link<K>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = &node.left;
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(&node.right);
        self.remaining -= 1;
        Some(&node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

/// Builds a tree holding the keys of both trees.
///
/// Both in-order sequences are concatenated and the result is rebuilt by
/// repeated insertion, so duplicates across the two trees are kept.
pub fn merge<K: Ord + Clone>(first: &AvlTree<K>, second: &AvlTree<K>) -> AvlTree<K> {
    log::trace!("merging trees of {} and {} keys", first.len(), second.len());
    first.iter().chain(second.iter()).cloned().collect()
}

/// Splits the in-order sequence of a tree into two new trees.
///
/// Without a pivot the split happens at the midpoint (`len / 2`). With a pivot it
/// happens at the first position whose key is not less than the pivot, which is
/// the index of the pivot's first occurrence when the tree contains it. The left
/// tree receives the keys before the split index, the right tree the rest.
pub fn split<K: Ord + Clone>(tree: &AvlTree<K>, pivot: Option<&K>) -> (AvlTree<K>, AvlTree<K>) {
    let keys = tree.in_order();
    let index = match pivot {
        None => keys.len() / 2,
        Some(pivot) => keys.partition_point(|key| *key < pivot),
    };
    log::trace!("splitting tree of {} keys at index {}", keys.len(), index);

    let (left, right) = keys.split_at(index);
    (
        left.iter().map(|key| (*key).clone()).collect(),
        right.iter().map(|key| (*key).clone()).collect(),
    )
}

impl<K> Node<K> {
    fn leaf(key: K) -> Box<Self> {
        Box::new(Node {
            key,
            left: None,
            right: None,
            height: 1,
        })
    }

    /// Right subtree height minus left subtree height.
    fn balance_factor(&self) -> isize {
        height(&self.right) as isize - height(&self.left) as isize
    }

    fn adjust_height(&mut self) {
        self.height = cmp::max(height(&self.left), height(&self.right)) + 1;
    }
}

fn height<K>(link: &Link<K>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

fn balance_factor<K>(link: &Link<K>) -> isize {
    link.as_ref().map_or(0, |node| node.balance_factor())
}

/// Promotes the right child to subtree root.
/// Only the heights of the two nodes involved are recomputed.
fn rotate_left<K>(mut node: Box<Node<K>>) -> Box<Node<K>> {
    match node.right.take() {
        None => node,
        Some(mut right) => {
            node.right = right.left.take();
            node.adjust_height();
            right.left = Some(node);
            right.adjust_height();
            right
        }
    }
}

/// Promotes the left child to subtree root.
/// Only the heights of the two nodes involved are recomputed.
fn rotate_right<K>(mut node: Box<Node<K>>) -> Box<Node<K>> {
    match node.left.take() {
        None => node,
        Some(mut left) => {
            node.left = left.right.take();
            node.adjust_height();
            left.right = Some(node);
            left.adjust_height();
            left
        }
    }
}

/// Adjusts the height of the given node and restores the AVL condition if needed.
/// The height difference between the subtrees must not exceed 2, which always
/// holds after a single insert or remove below this node.
/// Returns the new subtree root.
fn rebalance_node<K>(mut node: Box<Node<K>>) -> Box<Node<K>> {
    node.adjust_height();
    let balance = node.balance_factor();
    debug_assert!((-2..=2).contains(&balance));
    if balance == 2 {
        // Right heavy, right child leaning left needs a double rotation
        if balance_factor(&node.right) < 0 {
            node.right = node.right.take().map(rotate_right);
        }
        rotate_left(node)
    } else if balance == -2 {
        // Left heavy, left child leaning right needs a double rotation
        if balance_factor(&node.left) > 0 {
            node.left = node.left.take().map(rotate_left);
        }
        rotate_right(node)
    } else {
        node
    }
}

fn insert<K: Ord>(link: Link<K>, key: K) -> Box<Node<K>> {
    match link {
        None => Node::leaf(key),
        Some(mut node) => {
            if key < node.key {
                node.left = Some(insert(node.left.take(), key));
            } else {
                node.right = Some(insert(node.right.take(), key));
            }
            rebalance_node(node)
        }
    }
}

/// Detaches the smallest node of the given subtree.
/// Returns the detached node and what remains of the subtree.
fn remove_min<K>(mut node: Box<Node<K>>) -> (Box<Node<K>>, Link<K>) {
    match node.left.take() {
        None => {
            let rest = node.right.take();
            (node, rest)
        }
        Some(left) => {
            let (min, rest) = remove_min(left);
            node.left = rest;
            (min, Some(rebalance_node(node)))
        }
    }
}

fn remove<K: Ord>(link: Link<K>, key: &K, removed: &mut bool) -> Link<K> {
    let mut node = link?;
    match key.cmp(&node.key) {
        Ordering::Less => node.left = remove(node.left.take(), key, removed),
        Ordering::Greater => node.right = remove(node.right.take(), key, removed),
        Ordering::Equal => {
            *removed = true;
            let Node { left, right, .. } = *node;
            // Replace the node by the smallest node of its right subtree
            return match right {
                None => left,
                Some(right) => {
                    let (mut min, rest) = remove_min(right);
                    min.left = left;
                    min.right = rest;
                    Some(rebalance_node(min))
                }
            };
        }
    }
    Some(rebalance_node(node))
}

fn in_order<'a, K>(link: &'a Link<K>, keys: &mut Vec<&'a K>) {
    if let Some(node) = link {
        in_order(&node.left, keys);
        keys.push(&node.key);
        in_order(&node.right, keys);
    }
}

/// Checks ordering, cached heights and the AVL condition of a subtree.
/// Returns the number of nodes in it.
#[cfg(any(test, feature = "consistency_check"))]
fn check_node<K: Ord>(link: &Link<K>) -> usize {
    match link {
        None => 0,
        Some(node) => {
            if let Some(left) = &node.left {
                assert!(left.key <= node.key);
            }
            if let Some(right) = &node.right {
                assert!(right.key >= node.key);
            }

            let left_height = height(&node.left);
            let right_height = height(&node.right);
            assert_eq!(node.height, cmp::max(left_height, right_height) + 1);

            // AVL condition (nearly balance)
            assert!(left_height <= right_height + 1);
            assert!(right_height <= left_height + 1);

            check_node(&node.left) + check_node(&node.right) + 1
        }
    }
}
