use core::fmt;

use crate::raw::{Handle, RawAvlMap};

/// A position in an [`AvlMap`]: either a live entry or the end sentinel.
///
/// Cursors are returned by [`AvlMap::find`], [`AvlMap::insert`],
/// [`AvlMap::remove_next`], [`AvlMap::cursor_front`], [`AvlMap::cursor_back`],
/// and [`AvlMap::cursor_end`]. A cursor borrows the map immutably and can step
/// to the in-order neighbor of its current position in either direction;
/// stepping costs amortized O(1) and never allocates.
///
/// Two cursors are equal when they denote the same position in the same map:
/// the end sentinel equals itself and never equals a live entry.
///
/// # Examples
///
/// ```
/// use alva_tree::AvlMap;
///
/// let map = AvlMap::from([(2, "b"), (1, "a"), (3, "c")]);
///
/// let mut cursor = map.find(&2);
/// assert_eq!(cursor.key_value(), Some((&2, &"b")));
///
/// cursor.move_next();
/// assert_eq!(cursor.key(), Some(&3));
///
/// cursor.move_next();
/// assert!(cursor.is_end());
/// assert_eq!(cursor.key(), None);
/// ```
///
/// [`AvlMap`]: crate::AvlMap
/// [`AvlMap::find`]: crate::AvlMap::find
/// [`AvlMap::insert`]: crate::AvlMap::insert
/// [`AvlMap::remove_next`]: crate::AvlMap::remove_next
/// [`AvlMap::cursor_front`]: crate::AvlMap::cursor_front
/// [`AvlMap::cursor_back`]: crate::AvlMap::cursor_back
/// [`AvlMap::cursor_end`]: crate::AvlMap::cursor_end
pub struct Cursor<'a, K, V> {
    tree: &'a RawAvlMap<K, V>,
    node: Option<Handle>,
}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(crate) fn new(tree: &'a RawAvlMap<K, V>, node: Option<Handle>) -> Self {
        Self { tree, node }
    }

    /// Returns true if the cursor is at the end sentinel.
    ///
    /// # Examples
    ///
    /// ```
    /// use alva_tree::AvlMap;
    ///
    /// let map = AvlMap::from([(1, "a")]);
    /// assert!(!map.find(&1).is_end());
    /// assert!(map.find(&9).is_end());
    /// ```
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// Returns the key at the cursor, or `None` at the end sentinel.
    #[must_use]
    pub fn key(&self) -> Option<&'a K> {
        self.node.map(|handle| self.tree.node(handle).key())
    }

    /// Returns the value at the cursor, or `None` at the end sentinel.
    #[must_use]
    pub fn value(&self) -> Option<&'a V> {
        self.node.map(|handle| self.tree.value(self.tree.node(handle).value()))
    }

    /// Returns the entry at the cursor, or `None` at the end sentinel.
    #[must_use]
    pub fn key_value(&self) -> Option<(&'a K, &'a V)> {
        self.node.map(|handle| self.tree.key_value(handle))
    }

    /// Moves the cursor to the in-order successor of its position.
    ///
    /// From the last entry this reaches the end sentinel; at the end sentinel
    /// it stays put.
    pub fn move_next(&mut self) {
        if let Some(handle) = self.node {
            self.node = self.tree.successor(handle);
        }
    }

    /// Moves the cursor to the in-order predecessor of its position.
    ///
    /// From the first entry this reaches the end sentinel; at the end sentinel
    /// it wraps to the last entry, so the whole map can be walked backwards
    /// starting from [`AvlMap::cursor_end`].
    ///
    /// # Examples
    ///
    /// ```
    /// use alva_tree::AvlMap;
    ///
    /// let map = AvlMap::from([(1, "a"), (2, "b")]);
    /// let mut cursor = map.cursor_end();
    /// cursor.move_prev();
    /// assert_eq!(cursor.key(), Some(&2));
    /// cursor.move_prev();
    /// assert_eq!(cursor.key(), Some(&1));
    /// cursor.move_prev();
    /// assert!(cursor.is_end());
    /// ```
    ///
    /// [`AvlMap::cursor_end`]: crate::AvlMap::cursor_end
    pub fn move_prev(&mut self) {
        self.node = match self.node {
            Some(handle) => self.tree.predecessor(handle),
            None => self.tree.last(),
        };
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    /// Positional identity: cursors into different maps never compare equal,
    /// even when both are at the end sentinel.
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.tree, other.tree) && self.node == other.node
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key_value() {
            Some((key, value)) => f.debug_struct("Cursor").field("key", key).field("value", value).finish(),
            None => f.write_str("Cursor(end)"),
        }
    }
}
