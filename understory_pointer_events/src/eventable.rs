// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capability handlers and their registry.
//!
//! ## Overview
//!
//! An [`Eventable`] is the receiving end of a [`Target`](crate::types::Target): the
//! dispatcher calls [`Eventable::fire`] once per visited target.
//! Handlers are owned by an [`Eventables`] registry inside the
//! [`Dispatcher`](crate::dispatcher::Dispatcher) and referred to by [`EventableId`].
//!
//! [`Listeners`] is a ready-made handler holding ordered callbacks per event kind.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::event::PointerEvent;
use crate::types::{
    EventKinds, EventableId, EventableOptions, Origin, PointerEventOptions, PointerEventType,
};

/// A handler that can receive dispatched pointer events.
pub trait Eventable<E, M = ()> {
    /// Option overrides for this handler.
    fn options(&self) -> &EventableOptions<E>;

    /// Event kinds this handler wants to receive.
    fn kinds(&self) -> EventKinds {
        EventKinds::all()
    }

    /// Handle `event`. `event.current_target` is the element this handler is bound to.
    fn fire(&mut self, event: &mut PointerEvent<E, M>);
}

/// Registry of handlers plus the engine defaults they resolve their options against.
pub struct Eventables<E, M = ()> {
    defaults: PointerEventOptions<E>,
    entries: Vec<Box<dyn Eventable<E, M>>>,
}

impl<E, M> core::fmt::Debug for Eventables<E, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Eventables")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<E, M> Eventables<E, M> {
    /// An empty registry with the given defaults.
    pub fn new(defaults: PointerEventOptions<E>) -> Self {
        Self {
            defaults,
            entries: Vec::new(),
        }
    }

    /// Register a handler.
    pub fn insert(&mut self, eventable: impl Eventable<E, M> + 'static) -> EventableId {
        self.insert_boxed(Box::new(eventable))
    }

    /// Register an already boxed handler.
    pub fn insert_boxed(&mut self, eventable: Box<dyn Eventable<E, M>>) -> EventableId {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "EventableId uses 32-bit indices."
        )]
        let id = EventableId(self.entries.len() as u32);
        self.entries.push(eventable);
        id
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The handler registered as `id`.
    pub fn get(&self, id: EventableId) -> Option<&dyn Eventable<E, M>> {
        self.entries.get(id.idx()).map(|e| &**e)
    }

    /// The handler registered as `id`, mutably.
    pub fn get_mut(&mut self, id: EventableId) -> Option<&mut (dyn Eventable<E, M> + 'static)> {
        self.entries.get_mut(id.idx()).map(|e| &mut **e)
    }

    /// Engine defaults.
    pub fn defaults(&self) -> &PointerEventOptions<E> {
        &self.defaults
    }

    /// Replace the engine defaults.
    pub fn set_defaults(&mut self, defaults: PointerEventOptions<E>) {
        self.defaults = defaults;
    }

    /// Whether handler `id` listens to `kind`. Unknown handlers listen to nothing.
    pub fn listens_to(&self, id: EventableId, kind: PointerEventType) -> bool {
        self.get(id)
            .is_some_and(|e| e.kinds().contains(EventKinds::from(kind)))
    }

    /// Effective hold duration of handler `id`.
    pub fn hold_duration(&self, id: EventableId) -> u64 {
        self.get(id)
            .and_then(|e| e.options().hold_duration)
            .unwrap_or(self.defaults.hold_duration)
    }
}

impl<E: Clone, M> Eventables<E, M> {
    /// Effective options of handler `id`; unknown handlers get the defaults.
    pub fn options(&self, id: EventableId) -> PointerEventOptions<E> {
        match self.get(id) {
            Some(e) => e.options().resolve(&self.defaults),
            None => self.defaults.clone(),
        }
    }

    /// Effective origin of handler `id`.
    pub fn origin(&self, id: EventableId) -> Origin<E> {
        self.get(id)
            .and_then(|e| e.options().origin.clone())
            .unwrap_or_else(|| self.defaults.origin.clone())
    }
}

type Callback<E, M> = Box<dyn FnMut(&mut PointerEvent<E, M>)>;

/// A handler made of ordered callbacks per event kind.
///
/// Callbacks for the event's kind run in registration order until one of them calls
/// [`PointerEvent::stop_immediate_propagation`].
pub struct Listeners<E, M = ()> {
    options: EventableOptions<E>,
    callbacks: Vec<(PointerEventType, Callback<E, M>)>,
}

impl<E, M> core::fmt::Debug for Listeners<E, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Listeners")
            .field("kinds", &self.kinds())
            .field("callbacks", &self.callbacks.len())
            .finish_non_exhaustive()
    }
}

impl<E, M> Default for Listeners<E, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, M> Listeners<E, M> {
    /// A handler with no callbacks and default options.
    pub fn new() -> Self {
        Self::with_options(EventableOptions::default())
    }

    /// A handler with no callbacks and the given option overrides.
    pub fn with_options(options: EventableOptions<E>) -> Self {
        Self {
            options,
            callbacks: Vec::new(),
        }
    }

    /// Append a callback for `kind`.
    pub fn on(
        &mut self,
        kind: PointerEventType,
        callback: impl FnMut(&mut PointerEvent<E, M>) + 'static,
    ) -> &mut Self {
        self.callbacks.push((kind, Box::new(callback)));
        self
    }

    /// Builder form of [`on`](Self::on).
    pub fn with(
        mut self,
        kind: PointerEventType,
        callback: impl FnMut(&mut PointerEvent<E, M>) + 'static,
    ) -> Self {
        self.on(kind, callback);
        self
    }

    /// Mutable option overrides.
    pub fn options_mut(&mut self) -> &mut EventableOptions<E> {
        &mut self.options
    }
}

impl<E, M> Eventable<E, M> for Listeners<E, M> {
    fn options(&self) -> &EventableOptions<E> {
        &self.options
    }

    fn kinds(&self) -> EventKinds {
        self.callbacks
            .iter()
            .fold(EventKinds::empty(), |acc, (kind, _)| acc | EventKinds::from(*kind))
    }

    fn fire(&mut self, event: &mut PointerEvent<E, M>) {
        for (kind, callback) in &mut self.callbacks {
            if *kind != event.kind {
                continue;
            }
            callback(event);
            if event.immediate_propagation_stopped {
                break;
            }
        }
    }
}
