// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatcher: walks resolved targets and delivers one pointer event to each.
//!
//! ## Overview
//!
//! [`Dispatcher::fire`] takes a target list (collected on demand by
//! [`Dispatcher::collect_event_targets`]) and an event (built on demand), then for each
//! target in order:
//!
//! 1) copies the target's `props` onto the event,
//! 2) shifts coordinates into the handler's origin,
//! 3) sets `current_target` / `eventable` and calls the handler,
//! 4) shifts coordinates back to the canonical frame.
//!
//! ## Stopping
//!
//! - `immediate_propagation_stopped` ends the walk after the current handler.
//! - `propagation_stopped` ends the walk at the next element boundary: remaining targets bound
//!   to the same element as `current_target` still run.
//!
//! After the walk, whether it finished or stopped early, `fired` is broadcast.
//!
//! ## Taps
//!
//! For `tap`, a [`TapPolicy`] decides the `double` flag when the event is built. A double tap
//! dispatches a fresh `doubletap` event, and the interaction remembers that one as its
//! previous tap; otherwise the tap itself is remembered.

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::Point;

use crate::event::PointerEvent;
use crate::eventable::{Eventable, Eventables};
use crate::interaction::Interaction;
use crate::signals::{Fired, Signals};
use crate::tap::{NoDoubleTap, TapPolicy};
use crate::timer::Scheduler;
use crate::tree::ElementTree;
use crate::types::{
    EventableId, Origin, Pointer, PointerEventOptions, PointerEventType, RawEvent, Target,
};

/// Inputs of a single [`Dispatcher::fire`] call.
#[derive(Debug)]
pub struct FireArgs<'a, E, M = ()> {
    /// Interaction the event belongs to.
    pub interaction: &'a mut Interaction<E, M>,
    /// Pointer sample.
    pub pointer: &'a Pointer,
    /// Raw occurrence.
    pub raw: &'a RawEvent,
    /// Element the raw event originated from.
    pub event_target: &'a E,
    /// Kind of event to dispatch.
    pub kind: PointerEventType,
    /// Pre-resolved targets; collected when `None`.
    pub targets: Option<Vec<Target<E, M>>>,
    /// Pre-built event; built when `None`.
    pub pointer_event: Option<PointerEvent<E, M>>,
}

impl<'a, E, M> FireArgs<'a, E, M> {
    /// Dispatch a freshly built event of `kind` to collected targets.
    pub fn new(
        interaction: &'a mut Interaction<E, M>,
        pointer: &'a Pointer,
        raw: &'a RawEvent,
        event_target: &'a E,
        kind: PointerEventType,
    ) -> Self {
        Self {
            interaction,
            pointer,
            raw,
            event_target,
            kind,
            targets: None,
            pointer_event: None,
        }
    }

    /// Dispatch `pointer_event`; the kind is read off the event.
    pub fn from_event(
        interaction: &'a mut Interaction<E, M>,
        pointer: &'a Pointer,
        raw: &'a RawEvent,
        event_target: &'a E,
        pointer_event: PointerEvent<E, M>,
    ) -> Self {
        Self {
            interaction,
            pointer,
            raw,
            event_target,
            kind: pointer_event.kind,
            targets: None,
            pointer_event: Some(pointer_event),
        }
    }

    /// Use `targets` instead of collecting.
    pub fn with_targets(mut self, targets: Vec<Target<E, M>>) -> Self {
        self.targets = Some(targets);
        self
    }
}

/// The pointer event engine.
///
/// ## Usage
///
/// - Construct with [`Dispatcher::new`] from an [`ElementTree`] and a [`Scheduler`].
/// - Register handlers via [`Dispatcher::eventables_mut`] and registrants via
///   [`Dispatcher::signals_mut`] (for example [`ElementTargets`](crate::targets::ElementTargets)).
/// - Either call [`Dispatcher::fire`] directly, or wire the engine onto a session bus with
///   [`gesture::install`](crate::gesture::install) to get hold, tap and double-tap recognition.
pub struct Dispatcher<E, T, S, M = ()> {
    pub(crate) signals: Signals<E, M>,
    pub(crate) eventables: Eventables<E, M>,
    pub(crate) tree: T,
    pub(crate) scheduler: S,
    pub(crate) tap_policy: Box<dyn TapPolicy<E, M>>,
}

impl<E, T, S, M> core::fmt::Debug for Dispatcher<E, T, S, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("signals", &self.signals)
            .field("eventables", &self.eventables)
            .finish_non_exhaustive()
    }
}

impl<E, T, S, M> Dispatcher<E, T, S, M>
where
    E: Clone + PartialEq + 'static,
    T: ElementTree<E>,
    S: Scheduler<E>,
    M: Clone + Default + 'static,
{
    /// Create an engine with default options and no double-tap correlation.
    pub fn new(tree: T, scheduler: S) -> Self {
        Self::with_defaults(tree, scheduler, PointerEventOptions::default())
    }

    /// Create an engine with explicit default options.
    pub fn with_defaults(tree: T, scheduler: S, defaults: PointerEventOptions<E>) -> Self {
        Self {
            signals: Signals::new(),
            eventables: Eventables::new(defaults),
            tree,
            scheduler,
            tap_policy: Box::new(NoDoubleTap),
        }
    }

    /// Set the policy deciding whether a tap completes a double tap.
    pub fn set_tap_policy(&mut self, policy: impl TapPolicy<E, M> + 'static) {
        self.tap_policy = Box::new(policy);
    }

    /// Engine channels.
    pub fn signals_mut(&mut self) -> &mut Signals<E, M> {
        &mut self.signals
    }

    /// Handler registry.
    pub fn eventables(&self) -> &Eventables<E, M> {
        &self.eventables
    }

    /// Handler registry, mutably.
    pub fn eventables_mut(&mut self) -> &mut Eventables<E, M> {
        &mut self.eventables
    }

    /// Shorthand for [`Eventables::insert`].
    pub fn insert_eventable(&mut self, eventable: impl Eventable<E, M> + 'static) -> EventableId {
        self.eventables.insert(eventable)
    }

    /// Element tree.
    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Element tree, mutably.
    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    /// Scheduler.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Scheduler, mutably.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Dispatch one pointer event and return it, in the canonical coordinate frame.
    pub fn fire(&mut self, args: FireArgs<'_, E, M>) -> PointerEvent<E, M> {
        let FireArgs {
            interaction,
            pointer,
            raw,
            event_target,
            kind,
            targets,
            pointer_event,
        } = args;

        let targets = match targets {
            Some(t) => t,
            None => self.collect_event_targets(&*interaction, pointer, raw, event_target, kind),
        };
        let mut event = match pointer_event {
            Some(ev) => ev,
            None => self.build_event(&*interaction, pointer, raw, event_target, kind),
        };

        for (i, target) in targets.iter().enumerate() {
            event.props = target.props.clone();
            let origin = self.origin_for(target);
            event.subtract_origin(origin);
            event.eventable = Some(target.eventable);
            event.current_target = Some(target.element.clone());

            match self.eventables.get_mut(target.eventable) {
                Some(handler) => {
                    tracing::trace!(kind = kind.as_str(), index = i, "invoking target");
                    handler.fire(&mut event);
                }
                None => {
                    tracing::debug!(index = i, "skipping target with unregistered eventable");
                }
            }

            event.add_origin(origin);

            if event.immediate_propagation_stopped {
                tracing::debug!(kind = kind.as_str(), index = i, "immediate propagation stopped");
                break;
            }
            if event.propagation_stopped
                && targets
                    .get(i + 1)
                    .is_some_and(|next| event.current_target.as_ref() != Some(&next.element))
            {
                tracing::debug!(kind = kind.as_str(), index = i, "propagation stopped");
                break;
            }
        }

        self.signals.fire_fired(&Fired {
            interaction: &*interaction,
            pointer,
            raw,
            event_target,
            targets: &targets,
            kind,
            pointer_event: &event,
        });

        if kind == PointerEventType::Tap {
            let effective = if event.double {
                tracing::debug!("tap completes a double tap");
                self.fire(FireArgs::new(
                    &mut *interaction,
                    pointer,
                    raw,
                    event_target,
                    PointerEventType::DoubleTap,
                ))
            } else {
                event.clone()
            };
            interaction.tap_time = effective.time_stamp;
            interaction.prev_tap = Some(effective);
        }

        event
    }

    fn build_event(
        &self,
        interaction: &Interaction<E, M>,
        pointer: &Pointer,
        raw: &RawEvent,
        event_target: &E,
        kind: PointerEventType,
    ) -> PointerEvent<E, M> {
        let now = self.scheduler.now();
        let mut event = PointerEvent::new(kind, pointer, raw, event_target.clone(), now);
        match kind {
            PointerEventType::Tap => {
                event.dt = now.saturating_sub(interaction.tap_time);
                event.double = self.tap_policy.is_double(interaction, &event);
            }
            PointerEventType::DoubleTap => {
                event.dt = now.saturating_sub(interaction.tap_time);
            }
            _ => {}
        }
        event
    }

    /// Page-space origin of `target`'s handler; unresolvable origins are `(0, 0)`.
    fn origin_for(&self, target: &Target<E, M>) -> Point {
        let resolved = match self.eventables.origin(target.eventable) {
            Origin::Point(p) => Some(p),
            Origin::SelfElement => self.tree.origin_of(&target.element),
            Origin::Parent => self
                .tree
                .parent_of(&target.element)
                .and_then(|p| self.tree.origin_of(&p)),
            Origin::Element(e) => self.tree.origin_of(&e),
        };
        resolved.unwrap_or(Point::ZERO)
    }
}
