// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element ancestry and origins supplied by the host.

use alloc::vec::Vec;

use kurbo::Point;

/// Host view of the element tree.
///
/// The engine uses it to build the closest-first ancestor path of an event target and to
/// resolve non-point [`Origin`](crate::types::Origin)s.
pub trait ElementTree<E> {
    /// Returns the parent of `element`, or `None` if `element` is a root.
    fn parent_of(&self, element: &E) -> Option<E>;

    /// Page-space top-left of `element`, if known.
    fn origin_of(&self, _element: &E) -> Option<Point> {
        None
    }
}

/// A tree where every element is a root with no known origin.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoParent;

impl<E> ElementTree<E> for NoParent {
    #[inline]
    fn parent_of(&self, _element: &E) -> Option<E> {
        None
    }
}

/// Ancestor path of `target`, closest first: `[target, parent, ..., root]`.
///
/// Caller ensures acyclic ancestry.
pub fn path_to_root<E: Clone, T: ElementTree<E> + ?Sized>(tree: &T, target: &E) -> Vec<E> {
    let mut out = Vec::new();
    let mut cur = target.clone();
    loop {
        let parent = tree.parent_of(&cur);
        out.push(cur);
        match parent {
            Some(p) => cur = p,
            None => break,
        }
    }
    out
}
