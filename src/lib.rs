//! AVL tree collections for Rust.
//!
//! This crate provides [`AvlMap`] and [`AvlSet`], ordered associative containers
//! backed by a height-balanced binary search tree:
//!
//! - Guaranteed O(log n) lookup, insertion, and removal for any insertion order
//! - In-order [cursors](avl_map::Cursor) that can step to the next or previous
//!   key from any position, including the position returned by a removal
//! - Deep, shape-preserving [`Clone`] and shape-independent equality
//!
//! # Example
//!
//! ```
//! use alva_tree::AvlMap;
//!
//! let mut seen = AvlMap::new();
//! seen.insert("badger", 3);
//! seen.insert("heron", 1);
//! seen.insert("otter", 2);
//!
//! assert_eq!(seen.get(&"heron"), Some(&1));
//! assert_eq!(seen.len(), 3);
//!
//! // Entries come back in key order.
//! let names: Vec<_> = seen.keys().copied().collect();
//! assert_eq!(names, ["badger", "heron", "otter"]);
//!
//! // Removal hands back the in-order successor position.
//! let (removed, next) = seen.remove_next(&"heron");
//! assert_eq!(removed, Some(1));
//! assert_eq!(next.key(), Some(&"otter"));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Familiar API** - Mirrors `std::collections::BTreeMap`/`BTreeSet` where the
//!   operations overlap
//! - **Stable positions** - Nodes live in an arena addressed by handles, so
//!   removing one key never moves or reallocates any other entry
//!
//! # Implementation
//!
//! The trees are classic AVL trees: every node stores the height of its subtree,
//! and the difference in height between the two children of any node never
//! exceeds one, restored after each mutation by single or double rotations.
//! Nodes are stored in a slot arena and refer to each other by index handles;
//! the parent link is a plain back-reference with no ownership semantics, which
//! is what lets cursors walk to the in-order successor in amortized constant
//! time without auxiliary state.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
// NOTE: We have to allow unsafe code for the mutable iterators, which hand out
// `&mut V` while still walking the node arena.
// #![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod raw;

pub mod avl_map;
pub mod avl_set;

pub use avl_map::AvlMap;
pub use avl_set::AvlSet;
