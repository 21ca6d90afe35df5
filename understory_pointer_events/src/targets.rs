// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element bindings: a `collect-targets` registrant keyed by element.
//!
//! ## Matching
//!
//! When an ancestor is offered, every binding for that element contributes a target if
//!
//! - its handler listens to the event kind, and
//! - the handler's `ignore_from` element is not on the path from the event target up to the
//!   bound element, and
//! - the handler's `allow_from` element, when set, is on that path.
//!
//! Bindings contribute in the order they were added.

use alloc::vec::Vec;

use crate::signals::{CollectTargets, Signals};
use crate::types::{EventableId, Target};

#[derive(Clone, Debug)]
struct Binding<E, M> {
    element: E,
    eventable: EventableId,
    props: M,
}

/// Handlers bound to elements.
#[derive(Clone, Debug)]
pub struct ElementTargets<E, M = ()> {
    bindings: Vec<Binding<E, M>>,
}

impl<E, M> Default for ElementTargets<E, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, M> ElementTargets<E, M> {
    /// No bindings.
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Bind `eventable` to `element` with explicit extra properties.
    pub fn bind_with_props(&mut self, element: E, eventable: EventableId, props: M) -> &mut Self {
        self.bindings.push(Binding {
            element,
            eventable,
            props,
        });
        self
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<E, M: Default> ElementTargets<E, M> {
    /// Bind `eventable` to `element`.
    pub fn bind(&mut self, element: E, eventable: EventableId) -> &mut Self {
        self.bind_with_props(element, eventable, M::default())
    }
}

impl<E: Clone + PartialEq, M: Clone> ElementTargets<E, M> {
    /// Append the targets this registrant contributes for `payload.element`.
    pub fn collect(&self, payload: &CollectTargets<'_, E, M>, targets: &mut Vec<Target<E, M>>) {
        for binding in &self.bindings {
            if binding.element != *payload.element
                || !payload.eventables.listens_to(binding.eventable, payload.kind)
            {
                continue;
            }
            let options = payload.eventables.options(binding.eventable);
            let scope = payload.path_to_element();
            if let Some(ignore) = &options.ignore_from
                && scope.contains(ignore)
            {
                continue;
            }
            if let Some(allow) = &options.allow_from
                && !scope.contains(allow)
            {
                continue;
            }
            targets.push(Target {
                eventable: binding.eventable,
                element: binding.element.clone(),
                props: binding.props.clone(),
            });
        }
    }
}

impl<E, M> ElementTargets<E, M>
where
    E: Clone + PartialEq + 'static,
    M: Clone + 'static,
{
    /// Register this set of bindings on `signals`.
    ///
    /// Bindings are fixed from here on; install another registrant for later additions.
    pub fn install(self, signals: &mut Signals<E, M>) {
        signals.on_collect_targets(move |payload, targets| self.collect(payload, targets));
    }
}
