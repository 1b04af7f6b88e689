use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Ordering;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::Node;

/// The core AVL tree implementation backing `AvlMap`.
pub(crate) struct RawAvlMap<K, V> {
    /// Arena storing all tree nodes (keys, links, heights).
    nodes: Arena<Node<K>>,
    /// Arena storing all values (separate from nodes for cache efficiency).
    values: Arena<V>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Total number of key-value pairs in the tree.
    len: usize,
}

/// Ancestor handles recorded during a descent, root first. The inline
/// capacity of 32 covers AVL trees of a few million entries before the
/// path spills to the heap.
type Path = SmallVec<[Handle; 32]>;

impl<K, V> RawAvlMap<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            values: Arena::new(),
            root: None,
            len: 0,
        }
    }

    /// Creates a new tree with room for `capacity` entries.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            values: Arena::with_capacity(capacity),
            root: None,
            len: 0,
        }
    }

    /// Returns the number of key-value pairs in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree contains no elements.
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the capacity of the tree.
    pub(crate) fn capacity(&self) -> usize {
        self.values.capacity()
    }

    /// Clears all elements from the tree.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.values.clear();
        self.root = None;
        self.len = 0;
    }

    /// Returns a reference to a node by handle.
    pub(crate) fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    /// Returns a reference to a node by handle from a raw pointer.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `RawAvlMap<K, V>`.
    pub(crate) unsafe fn node_ptr<'a>(ptr: *const Self, handle: Handle) -> &'a Node<K> {
        // SAFETY: We only access the `nodes` field through addr_of, avoiding
        // aliasing with the `values` field.
        unsafe { Arena::get_ptr(core::ptr::addr_of!((*ptr).nodes), handle) }
    }

    /// Returns a reference to a value by handle.
    pub(crate) fn value(&self, handle: Handle) -> &V {
        self.values.get(handle)
    }

    /// Returns a mutable reference to a value by handle from a raw pointer.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `RawAvlMap<K, V>`.
    /// - The caller must ensure no other mutable references to the values arena exist.
    /// - The caller must have logical exclusive access to the value at `handle`.
    pub(crate) unsafe fn value_mut_ptr<'a>(ptr: *mut Self, handle: Handle) -> &'a mut V {
        // SAFETY: We only access the `values` field, avoiding aliasing with the
        // `nodes` field.
        unsafe { (*core::ptr::addr_of_mut!((*ptr).values)).get_mut(handle) }
    }

    /// Returns the key and value stored at a node handle.
    pub(crate) fn key_value(&self, handle: Handle) -> (&K, &V) {
        let node = self.nodes.get(handle);
        (node.key(), self.values.get(node.value()))
    }

    /// Returns the handle of the minimum (leftmost) node, if any.
    pub(crate) fn first(&self) -> Option<Handle> {
        self.root.map(|root| self.min_in_subtree(root))
    }

    /// Returns the handle of the maximum (rightmost) node, if any.
    pub(crate) fn last(&self) -> Option<Handle> {
        self.root.map(|root| self.max_in_subtree(root))
    }

    /// Returns the leftmost descendant of `handle` (including itself).
    pub(crate) fn min_in_subtree(&self, handle: Handle) -> Handle {
        let mut current = handle;
        while let Some(left) = self.nodes.get(current).left() {
            current = left;
        }
        current
    }

    /// Returns the rightmost descendant of `handle` (including itself).
    pub(crate) fn max_in_subtree(&self, handle: Handle) -> Handle {
        let mut current = handle;
        while let Some(right) = self.nodes.get(current).right() {
            current = right;
        }
        current
    }

    /// Returns the handle of the in-order successor of `handle`, if any.
    ///
    /// Successor step: the right subtree's minimum when a right child exists;
    /// otherwise the first ancestor reached through a left-child edge.
    pub(crate) fn successor(&self, handle: Handle) -> Option<Handle> {
        let node = self.nodes.get(handle);
        if let Some(right) = node.right() {
            return Some(self.min_in_subtree(right));
        }
        let mut current = handle;
        let mut parent = node.parent();
        while let Some(p) = parent {
            let p_node = self.nodes.get(p);
            if p_node.right() == Some(current) {
                current = p;
                parent = p_node.parent();
            } else {
                return Some(p);
            }
        }
        None
    }

    /// Returns the handle of the in-order predecessor of `handle`, if any.
    pub(crate) fn predecessor(&self, handle: Handle) -> Option<Handle> {
        let node = self.nodes.get(handle);
        if let Some(left) = node.left() {
            return Some(self.max_in_subtree(left));
        }
        let mut current = handle;
        let mut parent = node.parent();
        while let Some(p) = parent {
            let p_node = self.nodes.get(p);
            if p_node.left() == Some(current) {
                current = p;
                parent = p_node.parent();
            } else {
                return Some(p);
            }
        }
        None
    }

    /// In-order successor step from a raw pointer.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `RawAvlMap<K, V>`.
    pub(crate) unsafe fn successor_ptr(ptr: *const Self, handle: Handle) -> Option<Handle> {
        // SAFETY: Only the nodes arena is read; the caller may hold live
        // `&mut V` references into the values arena.
        unsafe {
            let node = Self::node_ptr(ptr, handle);
            if let Some(right) = node.right() {
                let mut current = right;
                while let Some(left) = Self::node_ptr(ptr, current).left() {
                    current = left;
                }
                return Some(current);
            }
            let mut current = handle;
            let mut parent = node.parent();
            while let Some(p) = parent {
                let p_node = Self::node_ptr(ptr, p);
                if p_node.right() == Some(current) {
                    current = p;
                    parent = p_node.parent();
                } else {
                    return Some(p);
                }
            }
            None
        }
    }

    /// In-order predecessor step from a raw pointer.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `RawAvlMap<K, V>`.
    pub(crate) unsafe fn predecessor_ptr(ptr: *const Self, handle: Handle) -> Option<Handle> {
        // SAFETY: Only the nodes arena is read; see `successor_ptr`.
        unsafe {
            let node = Self::node_ptr(ptr, handle);
            if let Some(left) = node.left() {
                let mut current = left;
                while let Some(right) = Self::node_ptr(ptr, current).right() {
                    current = right;
                }
                return Some(current);
            }
            let mut current = handle;
            let mut parent = node.parent();
            while let Some(p) = parent {
                let p_node = Self::node_ptr(ptr, p);
                if p_node.left() == Some(current) {
                    current = p;
                    parent = p_node.parent();
                } else {
                    return Some(p);
                }
            }
            None
        }
    }

    /// Points `parent`'s child link (or the root) at `new` instead of `old`.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            Some(p) => {
                let node = self.nodes.get_mut(p);
                if node.left() == Some(old) {
                    node.set_left(new);
                } else {
                    node.set_right(new);
                }
            }
            None => self.root = new,
        }
    }

    fn height_of(&self, node: Option<Handle>) -> u8 {
        node.map_or(0, |handle| self.nodes.get(handle).height())
    }

    /// Recomputes `handle`'s height from its children.
    fn update_height(&mut self, handle: Handle) {
        let (left, right) = {
            let node = self.nodes.get(handle);
            (node.left(), node.right())
        };
        let height = 1 + self.height_of(left).max(self.height_of(right));
        self.nodes.get_mut(handle).set_height(height);
    }

    /// height(left) - height(right). Positive means left-heavy.
    fn balance_factor(&self, handle: Handle) -> i16 {
        let node = self.nodes.get(handle);
        i16::from(self.height_of(node.left())) - i16::from(self.height_of(node.right()))
    }

    /// Single left rotation at `handle`: the right child becomes the local
    /// root. Every relocated node's parent link is reassigned, including the
    /// new local root's link to the original parent, and heights are
    /// recomputed bottom-up for the two nodes that changed depth.
    fn rotate_left(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let parent = node.parent();
        let pivot = node.right().expect("`RawAvlMap::rotate_left()` - no right child to pivot on!");
        let inner = self.nodes.get(pivot).left();

        self.nodes.get_mut(handle).set_right(inner);
        if let Some(inner) = inner {
            self.nodes.get_mut(inner).set_parent(Some(handle));
        }
        self.nodes.get_mut(pivot).set_left(Some(handle));
        self.nodes.get_mut(pivot).set_parent(parent);
        self.nodes.get_mut(handle).set_parent(Some(pivot));
        self.replace_child(parent, handle, Some(pivot));

        self.update_height(handle);
        self.update_height(pivot);
    }

    /// Single right rotation at `handle`; mirror of `rotate_left`.
    fn rotate_right(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let parent = node.parent();
        let pivot = node.left().expect("`RawAvlMap::rotate_right()` - no left child to pivot on!");
        let inner = self.nodes.get(pivot).right();

        self.nodes.get_mut(handle).set_left(inner);
        if let Some(inner) = inner {
            self.nodes.get_mut(inner).set_parent(Some(handle));
        }
        self.nodes.get_mut(pivot).set_right(Some(handle));
        self.nodes.get_mut(pivot).set_parent(parent);
        self.nodes.get_mut(handle).set_parent(Some(pivot));
        self.replace_child(parent, handle, Some(pivot));

        self.update_height(handle);
        self.update_height(pivot);
    }

    /// Restores the balance invariant at `handle` after one of its subtrees
    /// changed height: a double rotation when the heavy child leans the other
    /// way (LR/RL), a single rotation when it does not (LL/RR), or a plain
    /// height update when the factor is already within [-1, 1].
    fn balance(&mut self, handle: Handle) {
        match self.balance_factor(handle) {
            2 => {
                let left = self.nodes.get(handle).left().expect("`RawAvlMap::balance()` - left-heavy node without a left child!");
                if self.balance_factor(left) == -1 {
                    self.rotate_left(left);
                }
                self.rotate_right(handle);
            }
            -2 => {
                let right = self.nodes.get(handle).right().expect("`RawAvlMap::balance()` - right-heavy node without a right child!");
                if self.balance_factor(right) == 1 {
                    self.rotate_right(right);
                }
                self.rotate_left(handle);
            }
            _ => self.update_height(handle),
        }
    }

    /// Applies `balance` to every recorded ancestor, deepest first. Rotations
    /// re-attach the rotated subtree to its parent themselves, so this is a
    /// plain reverse scan of the path.
    fn rebalance_path(&mut self, path: &[Handle]) {
        for &handle in path.iter().rev() {
            self.balance(handle);
        }
    }

    /// Removes the node at `target`, whose strict ancestors (root first) are
    /// recorded in `path`. Returns the key, the value, and the handle of the
    /// in-order successor.
    fn remove_at(&mut self, target: Handle, mut path: Path) -> (K, V, Option<Handle>) {
        // The successor must be captured before any link changes; it is never
        // the target itself, and the target's slot is the only one freed, so
        // the handle stays valid after the splice.
        let next = self.successor(target);

        let (parent, left, right) = {
            let node = self.nodes.get(target);
            (node.parent(), node.left(), node.right())
        };

        if let (Some(left), Some(right)) = (left, right) {
            // Two children: the left subtree's maximum replaces the target,
            // adopting its children and parent. Record the walk down to the
            // replacement so the reverse pass rebalances the whole chain.
            let mark = path.len();
            let mut replacement = left;
            while let Some(right_child) = self.nodes.get(replacement).right() {
                path.push(replacement);
                replacement = right_child;
            }
            // The replacement sits where the target was: one level above the
            // recorded walk.
            path.insert(mark, replacement);

            let repl_parent = self.nodes.get(replacement).parent().expect("`RawAvlMap::remove_at()` - replacement has no parent!");
            if repl_parent != target {
                // The replacement is the rightmost node of a deeper chain:
                // splice its (at most left) child into its old position, then
                // adopt the target's left subtree.
                let repl_left = self.nodes.get(replacement).left();
                self.nodes.get_mut(repl_parent).set_right(repl_left);
                if let Some(repl_left) = repl_left {
                    self.nodes.get_mut(repl_left).set_parent(Some(repl_parent));
                }
                self.nodes.get_mut(replacement).set_left(Some(left));
                self.nodes.get_mut(left).set_parent(Some(replacement));
            }
            self.nodes.get_mut(replacement).set_right(Some(right));
            self.nodes.get_mut(right).set_parent(Some(replacement));
            self.nodes.get_mut(replacement).set_parent(parent);
            self.replace_child(parent, target, Some(replacement));
        } else {
            // Zero or one child: splice the child (if any) into the target's
            // place.
            let child = left.or(right);
            if let Some(child) = child {
                self.nodes.get_mut(child).set_parent(parent);
            }
            self.replace_child(parent, target, child);
        }

        self.len -= 1;
        let (key, value_handle) = self.nodes.take(target).into_parts();
        let value = self.values.take(value_handle);
        self.rebalance_path(&path);
        (key, value, next)
    }

    /// Removes and returns the minimum entry, if any.
    pub(crate) fn pop_first(&mut self) -> Option<(K, V)> {
        let mut path = Path::new();
        let mut current = self.root?;
        while let Some(left) = self.nodes.get(current).left() {
            path.push(current);
            current = left;
        }
        let (key, value, _) = self.remove_at(current, path);
        Some((key, value))
    }

    /// Removes and returns the maximum entry, if any.
    pub(crate) fn pop_last(&mut self) -> Option<(K, V)> {
        let mut path = Path::new();
        let mut current = self.root?;
        while let Some(right) = self.nodes.get(current).right() {
            path.push(current);
            current = right;
        }
        let (key, value, _) = self.remove_at(current, path);
        Some((key, value))
    }

    /// Drains all key-value pairs in ascending key order, leaving the tree
    /// empty. O(n): a plain in-order walk with an explicit stack, no
    /// rebalancing.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let mut result = Vec::with_capacity(self.len);
        let mut stack: Vec<Handle> = Vec::new();
        let mut current = self.root;

        while current.is_some() || !stack.is_empty() {
            while let Some(handle) = current {
                stack.push(handle);
                current = self.nodes.get(handle).left();
            }
            // Right subtree is read before the node is taken; nothing below
            // or to the right of a node is taken before the node itself.
            let handle = stack.pop().expect("`RawAvlMap::drain_to_vec()` - empty traversal stack!");
            current = self.nodes.get(handle).right();
            let (key, value_handle) = self.nodes.take(handle).into_parts();
            result.push((key, self.values.take(value_handle)));
        }

        self.nodes.clear();
        self.values.clear();
        self.root = None;
        self.len = 0;
        result
    }
}

impl<K: Ord, V> RawAvlMap<K, V> {
    /// Searches for a key and returns its node handle if present.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root?;
        loop {
            let node = self.nodes.get(current);
            match key.cmp(node.key().borrow()) {
                Ordering::Less => current = node.left()?,
                Ordering::Greater => current = node.right()?,
                Ordering::Equal => return Some(current),
            }
        }
    }

    /// Returns a reference to the value corresponding to the key.
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(self.values.get(self.nodes.get(handle).value()))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        let value_handle = self.nodes.get(handle).value();
        Some(self.values.get_mut(value_handle))
    }

    /// Returns the key-value pair corresponding to the key.
    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(self.key_value(handle))
    }

    /// Returns true if the tree contains the specified key.
    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).is_some()
    }

    /// Inserts a key-value pair. Returns the handle of the entry and whether
    /// a new node was created.
    ///
    /// An exact key match mutates nothing: the existing entry keeps its value
    /// and the offered one is dropped, so repeated inserts are idempotent.
    pub(crate) fn insert(&mut self, key: K, value: V) -> (Handle, bool) {
        let Some(root) = self.root else {
            let value_handle = self.values.alloc(value);
            let node_handle = self.nodes.alloc(Node::new_leaf(key, value_handle, None));
            self.root = Some(node_handle);
            self.len = 1;
            return (node_handle, true);
        };

        let mut path = Path::new();
        let mut current = root;
        let go_left = loop {
            path.push(current);
            let node = self.nodes.get(current);
            match key.cmp(node.key()) {
                Ordering::Less => match node.left() {
                    Some(left) => current = left,
                    None => break true,
                },
                Ordering::Greater => match node.right() {
                    Some(right) => current = right,
                    None => break false,
                },
                Ordering::Equal => return (current, false),
            }
        };

        let value_handle = self.values.alloc(value);
        let node_handle = self.nodes.alloc(Node::new_leaf(key, value_handle, Some(current)));
        let parent = self.nodes.get_mut(current);
        if go_left {
            parent.set_left(Some(node_handle));
        } else {
            parent.set_right(Some(node_handle));
        }
        self.len += 1;
        self.rebalance_path(&path);
        (node_handle, true)
    }

    /// Removes a key. Returns the removed key, the removed value, and the
    /// handle of the in-order successor (captured before the splice), or
    /// `None` without side effects when the key is absent.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V, Option<Handle>)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut path = Path::new();
        let mut current = self.root?;
        let target = loop {
            let node = self.nodes.get(current);
            match key.cmp(node.key().borrow()) {
                Ordering::Less => {
                    path.push(current);
                    current = node.left()?;
                }
                Ordering::Greater => {
                    path.push(current);
                    current = node.right()?;
                }
                Ordering::Equal => break current,
            }
        };
        Some(self.remove_at(target, path))
    }
}

impl<K: Clone, V: Clone> Clone for RawAvlMap<K, V> {
    /// Deep copy. Handles are arena indices, so cloning the arenas
    /// slot-for-slot preserves shape, heights, and parent links with no
    /// fixup pass.
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            values: self.values.clone(),
            root: self.root,
            len: self.len,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    impl<K: Ord, V> RawAvlMap<K, V> {
        /// Checks BST order, height bookkeeping, balance factors, parent
        /// back-references, and arena length agreement over the whole tree.
        fn assert_invariants(&self) {
            fn walk<K: Ord, V>(tree: &RawAvlMap<K, V>, handle: Handle, parent: Option<Handle>) -> (usize, u8) {
                let node = tree.node(handle);
                assert_eq!(node.parent(), parent, "parent back-reference is wrong");

                let (mut count, mut left_height, mut right_height) = (1, 0, 0);
                if let Some(left) = node.left() {
                    assert!(tree.node(left).key() < node.key(), "left child key out of order");
                    let (c, h) = walk(tree, left, Some(handle));
                    count += c;
                    left_height = h;
                }
                if let Some(right) = node.right() {
                    assert!(tree.node(right).key() > node.key(), "right child key out of order");
                    let (c, h) = walk(tree, right, Some(handle));
                    count += c;
                    right_height = h;
                }

                let height = 1 + left_height.max(right_height);
                assert_eq!(node.height(), height, "stored height is stale");
                let factor = i16::from(left_height) - i16::from(right_height);
                assert!((-1..=1).contains(&factor), "balance factor {factor} out of range");
                (count, height)
            }

            let count = self.root.map_or(0, |root| walk(self, root, None).0);
            assert_eq!(count, self.len, "node count disagrees with len");
            assert_eq!(self.nodes.len(), self.len, "node arena disagrees with len");
            assert_eq!(self.values.len(), self.len, "value arena disagrees with len");
        }

        fn keys_in_order(&self) -> Vec<&K> {
            let mut keys = Vec::with_capacity(self.len);
            let mut current = self.first();
            while let Some(handle) = current {
                keys.push(self.node(handle).key());
                current = self.successor(handle);
            }
            keys
        }
    }

    #[test]
    fn mixed_inserts_stay_ordered_and_balanced() {
        let mut tree: RawAvlMap<i32, ()> = RawAvlMap::new();
        for key in [5, 3, 7, 1, 4, 2, 6, 0, 8] {
            tree.insert(key, ());
            tree.assert_invariants();
        }
        assert_eq!(tree.keys_in_order(), [&0, &1, &2, &3, &4, &5, &6, &7, &8]);
    }

    #[test]
    fn ascending_inserts_trigger_left_rotations() {
        let mut tree: RawAvlMap<i32, ()> = RawAvlMap::new();
        for key in 1..=64 {
            tree.insert(key, ());
            tree.assert_invariants();
        }
        // A balanced tree over 64 ascending keys must stay logarithmic.
        let root = tree.root.unwrap();
        assert!(tree.node(root).height() <= 7);
    }

    #[test]
    fn descending_inserts_trigger_right_rotations() {
        let mut tree: RawAvlMap<i32, ()> = RawAvlMap::new();
        for key in (1..=64).rev() {
            tree.insert(key, ());
            tree.assert_invariants();
        }
        let root = tree.root.unwrap();
        assert!(tree.node(root).height() <= 7);
    }

    #[test]
    fn zigzag_inserts_trigger_double_rotations() {
        // 3, 1, 2 is the LR case; 1, 3, 2 is the RL case.
        for keys in [[3, 1, 2], [1, 3, 2]] {
            let mut tree: RawAvlMap<i32, ()> = RawAvlMap::new();
            for key in keys {
                tree.insert(key, ());
                tree.assert_invariants();
            }
            assert_eq!(tree.node(tree.root.unwrap()).key(), &2);
        }
    }

    #[test]
    fn insert_existing_key_is_idempotent() {
        let mut tree: RawAvlMap<i32, &str> = RawAvlMap::new();
        let (first, created) = tree.insert(5, "first");
        assert!(created);
        let (second, created) = tree.insert(5, "second");
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(&5), Some(&"first"));
        tree.assert_invariants();
    }

    #[test]
    fn remove_returns_presplice_successor() {
        let mut tree: RawAvlMap<i32, ()> = RawAvlMap::new();
        for key in 1..=16 {
            tree.insert(key, ());
        }
        // 8 sits in the middle of the tree with two children.
        let expected = tree.search(&9).unwrap();
        let (key, (), next) = tree.remove(&8).unwrap();
        assert_eq!(key, 8);
        assert_eq!(next, Some(expected));
        assert!(!tree.contains_key(&8));
        tree.assert_invariants();
        let remaining: Vec<i32> = tree.keys_in_order().into_iter().copied().collect();
        assert_eq!(remaining, (1..=16).filter(|k| *k != 8).collect::<Vec<_>>());
    }

    #[test]
    fn remove_maximum_returns_end() {
        let mut tree: RawAvlMap<i32, ()> = RawAvlMap::new();
        for key in [2, 1, 3] {
            tree.insert(key, ());
        }
        let (key, (), next) = tree.remove(&3).unwrap();
        assert_eq!(key, 3);
        assert_eq!(next, None);
        tree.assert_invariants();
    }

    #[test]
    fn remove_absent_key_has_no_side_effects() {
        let mut tree: RawAvlMap<i32, ()> = RawAvlMap::new();
        for key in [5, 3, 7] {
            tree.insert(key, ());
        }
        assert!(tree.remove(&42).is_none());
        assert_eq!(tree.len(), 3);
        tree.assert_invariants();
    }

    #[test]
    fn successor_and_predecessor_walk_the_whole_tree() {
        let mut tree: RawAvlMap<i32, ()> = RawAvlMap::new();
        for key in [5, 3, 7, 1, 4, 2, 6, 0, 8] {
            tree.insert(key, ());
        }

        let mut forward = Vec::new();
        let mut current = tree.first();
        while let Some(handle) = current {
            forward.push(*tree.node(handle).key());
            current = tree.successor(handle);
        }
        assert_eq!(forward, [0, 1, 2, 3, 4, 5, 6, 7, 8]);

        let mut backward = Vec::new();
        let mut current = tree.last();
        while let Some(handle) = current {
            backward.push(*tree.node(handle).key());
            current = tree.predecessor(handle);
        }
        assert_eq!(backward, [8, 7, 6, 5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn drain_empties_in_ascending_order() {
        let mut tree: RawAvlMap<i32, i32> = RawAvlMap::new();
        for key in [5, 3, 7, 1, 4] {
            tree.insert(key, key * 10);
        }
        let drained = tree.drain_to_vec();
        assert_eq!(drained, [(1, 10), (3, 30), (4, 40), (5, 50), (7, 70)]);
        assert!(tree.is_empty());
        assert_eq!(tree.root, None);
    }

    #[test]
    fn clone_is_deep_and_link_correct() {
        let mut tree: RawAvlMap<i32, i32> = RawAvlMap::new();
        for key in 0..32 {
            tree.insert(key, key);
        }
        let mut copy = tree.clone();
        copy.assert_invariants();
        copy.remove(&7);
        *copy.get_mut(&3).unwrap() = -3;
        copy.assert_invariants();

        assert_eq!(tree.get(&7), Some(&7));
        assert_eq!(tree.get(&3), Some(&3));
        tree.assert_invariants();
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i16),
        Remove(i16),
        PopFirst,
        PopLast,
        Clear,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            8 => (-500i16..500).prop_map(Op::Insert),
            5 => (-500i16..500).prop_map(Op::Remove),
            1 => Just(Op::PopFirst),
            1 => Just(Op::PopLast),
            1 => Just(Op::Clear),
        ]
    }

    proptest! {
        /// Invariants hold after every operation of a random sequence, and
        /// the in-order key sequence is strictly ascending throughout.
        #[test]
        fn invariants_hold_under_random_operations(ops in prop::collection::vec(op_strategy(), 0..512)) {
            let mut tree: RawAvlMap<i16, i16> = RawAvlMap::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        tree.insert(key, key);
                    }
                    Op::Remove(key) => {
                        tree.remove(&key);
                    }
                    Op::PopFirst => {
                        tree.pop_first();
                    }
                    Op::PopLast => {
                        tree.pop_last();
                    }
                    Op::Clear => tree.clear(),
                }

                tree.assert_invariants();
                let keys = tree.keys_in_order();
                prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
            }
        }
    }
}
