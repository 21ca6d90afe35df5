// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named, ordered, synchronous channels.
//!
//! ## Overview
//!
//! A [`Channel`] is an ordered list of boxed listeners. Firing calls every listener in
//! registration order; registering the same closure twice makes it run twice.
//! Each channel has exactly one payload type, so listeners are type-checked against it.
//!
//! [`Signals`] groups the engine's own channels:
//!
//! - `collect-targets`: registrants receive a read-only [`CollectTargets`] view and append to
//!   a shared target accumulator.
//! - `fired`: observers receive a read-only [`Fired`] view after every dispatch.
//!
//! The outer session channels live in [`session::SessionSignals`](crate::session::SessionSignals),
//! a separate namespace.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::event::PointerEvent;
use crate::eventable::Eventables;
use crate::interaction::Interaction;
use crate::types::{Pointer, PointerEventType, RawEvent, Target};

/// Ordered list of listeners of type `F` (an unsized `dyn FnMut(..)`).
pub struct Channel<F: ?Sized> {
    listeners: Vec<Box<F>>,
}

impl<F: ?Sized> core::fmt::Debug for Channel<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Channel")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<F: ?Sized> Default for Channel<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> Channel<F> {
    /// An empty channel.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Append a listener.
    pub fn push(&mut self, listener: Box<F>) {
        self.listeners.push(listener);
    }

    /// Number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether the channel has no listeners.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Listeners in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut F> {
        self.listeners.iter_mut().map(|l| &mut **l)
    }
}

/// Payload of `collect-targets`: one ancestor of the event target being offered to registrants.
#[derive(Debug)]
pub struct CollectTargets<'a, E, M = ()> {
    /// Interaction the event belongs to.
    pub interaction: &'a Interaction<E, M>,
    /// Pointer sample.
    pub pointer: &'a Pointer,
    /// Raw occurrence.
    pub raw: &'a RawEvent,
    /// Element the raw event originated from.
    pub event_target: &'a E,
    /// Kind of event being collected for.
    pub kind: PointerEventType,
    /// Full ancestor path of `event_target`, closest first.
    pub path: &'a [E],
    /// Index of `element` in `path`.
    pub depth: usize,
    /// Ancestor currently offered.
    pub element: &'a E,
    /// Handler registry, for kind and option checks.
    pub eventables: &'a Eventables<E, M>,
}

impl<E, M> CollectTargets<'_, E, M> {
    /// Path segment from the event target up to and including `element`.
    ///
    /// A `depth` past the end of `path` yields the whole path.
    pub fn path_to_element(&self) -> &[E] {
        self.path.get(..=self.depth).unwrap_or(self.path)
    }
}

/// Payload of `fired`: the full context of a completed dispatch.
#[derive(Debug)]
pub struct Fired<'a, E, M = ()> {
    /// Interaction the event belongs to.
    pub interaction: &'a Interaction<E, M>,
    /// Pointer sample.
    pub pointer: &'a Pointer,
    /// Raw occurrence.
    pub raw: &'a RawEvent,
    /// Element the raw event originated from.
    pub event_target: &'a E,
    /// Targets the dispatch walked (or would have walked, had it not stopped early).
    pub targets: &'a [Target<E, M>],
    /// Kind of event dispatched.
    pub kind: PointerEventType,
    /// The dispatched event, in the canonical coordinate frame.
    pub pointer_event: &'a PointerEvent<E, M>,
}

/// Listener type of the `collect-targets` channel.
pub type CollectTargetsListener<E, M> =
    dyn FnMut(&CollectTargets<'_, E, M>, &mut Vec<Target<E, M>>);

/// Listener type of the `fired` channel.
pub type FiredListener<E, M> = dyn FnMut(&Fired<'_, E, M>);

/// The engine's own channels.
pub struct Signals<E, M = ()> {
    collect_targets: Channel<CollectTargetsListener<E, M>>,
    fired: Channel<FiredListener<E, M>>,
}

impl<E, M> core::fmt::Debug for Signals<E, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Signals")
            .field("collect_targets", &self.collect_targets)
            .field("fired", &self.fired)
            .finish()
    }
}

impl<E, M> Default for Signals<E, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, M> Signals<E, M> {
    /// Channels with no listeners.
    pub fn new() -> Self {
        Self {
            collect_targets: Channel::new(),
            fired: Channel::new(),
        }
    }

    /// Register a `collect-targets` listener.
    pub fn on_collect_targets(
        &mut self,
        listener: impl FnMut(&CollectTargets<'_, E, M>, &mut Vec<Target<E, M>>) + 'static,
    ) {
        self.collect_targets.push(Box::new(listener));
    }

    /// Register a `fired` listener.
    pub fn on_fired(&mut self, listener: impl FnMut(&Fired<'_, E, M>) + 'static) {
        self.fired.push(Box::new(listener));
    }

    /// Offer one ancestor to every registrant.
    pub fn fire_collect_targets(
        &mut self,
        payload: &CollectTargets<'_, E, M>,
        targets: &mut Vec<Target<E, M>>,
    ) {
        for listener in self.collect_targets.iter_mut() {
            listener(payload, targets);
        }
    }

    /// Broadcast a completed dispatch.
    pub fn fire_fired(&mut self, payload: &Fired<'_, E, M>) {
        for listener in self.fired.iter_mut() {
            listener(payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    #[test]
    fn channel_fires_in_registration_order_with_duplicates() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut ch: Channel<dyn FnMut(u32)> = Channel::new();
        let a = log.clone();
        let shared = Rc::new(move |x: u32| a.borrow_mut().push(("shared", x)));
        let b = log.clone();
        let s1 = shared.clone();
        ch.push(Box::new(move |x: u32| s1(x)));
        ch.push(Box::new(move |x: u32| b.borrow_mut().push(("other", x))));
        let s2 = shared.clone();
        ch.push(Box::new(move |x: u32| s2(x)));
        for l in ch.iter_mut() {
            l(7);
        }
        assert_eq!(ch.len(), 3);
        assert_eq!(
            *log.borrow(),
            vec![("shared", 7), ("other", 7), ("shared", 7)]
        );
    }

    #[test]
    fn path_to_element_is_clamped_to_the_path() {
        use crate::types::{PointerEventOptions, PointerId, PointerType};
        use kurbo::Point;

        let interaction: Interaction<u32> = Interaction::new();
        let pointer = Pointer::at(PointerId(1), PointerType::Mouse, Point::ZERO);
        let raw = RawEvent::default();
        let eventables = Eventables::new(PointerEventOptions::default());
        let path = [3, 2, 1];
        let mut payload = CollectTargets {
            interaction: &interaction,
            pointer: &pointer,
            raw: &raw,
            event_target: &path[0],
            kind: PointerEventType::Down,
            path: &path,
            depth: 1,
            element: &path[1],
            eventables: &eventables,
        };
        assert_eq!(payload.path_to_element(), &[3, 2]);
        payload.depth = 7;
        assert_eq!(payload.path_to_element(), &[3, 2, 1]);
    }

    #[test]
    fn empty_channel() {
        let ch: Channel<dyn FnMut()> = Channel::default();
        assert!(ch.is_empty());
    }
}
