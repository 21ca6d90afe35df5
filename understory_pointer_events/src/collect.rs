// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Target collection: ask registrants which handlers observe an event.
//!
//! ## Traversal
//!
//! The ancestor path of the event target is built closest first, and each ancestor is offered
//! to the `collect-targets` registrants in that order. Registrants append to one shared list,
//! so the path order becomes the dispatch order (bubbling order).
//!
//! ## Filters
//!
//! - `tap` collects nothing if the pointer moved while down, or if it is released over a
//!   different element than the one it was pressed on.
//! - `hold` keeps only targets whose hold duration equals the minimum computed for the pointer
//!   at press time, so only the fastest handlers receive it.

use alloc::vec::Vec;

use crate::dispatcher::Dispatcher;
use crate::interaction::Interaction;
use crate::signals::CollectTargets;
use crate::timer::Scheduler;
use crate::tree::{ElementTree, path_to_root};
use crate::types::{Pointer, PointerEventType, RawEvent, Target};

impl<E, T, S, M> Dispatcher<E, T, S, M>
where
    E: Clone + PartialEq + 'static,
    T: ElementTree<E>,
    S: Scheduler<E>,
    M: Clone + Default + 'static,
{
    /// Collect the targets that should observe an event of `kind`, in dispatch order.
    pub fn collect_event_targets(
        &mut self,
        interaction: &Interaction<E, M>,
        pointer: &Pointer,
        raw: &RawEvent,
        event_target: &E,
        kind: PointerEventType,
    ) -> Vec<Target<E, M>> {
        let info = interaction.pointer_info(pointer.id);

        if kind == PointerEventType::Tap
            && (interaction.pointer_was_moved
                || info.and_then(|p| p.down_target.as_ref()) != Some(event_target))
        {
            return Vec::new();
        }

        let mut targets = self.traverse(interaction, pointer, raw, event_target, kind);

        if kind == PointerEventType::Hold {
            let min = info.and_then(|p| p.hold.duration());
            targets.retain(|t| Some(self.eventables.hold_duration(t.eventable)) == min);
        }

        tracing::trace!(kind = kind.as_str(), count = targets.len(), "collected targets");
        targets
    }

    /// Offer every ancestor of `event_target` to the registrants, without kind filters.
    pub(crate) fn traverse(
        &mut self,
        interaction: &Interaction<E, M>,
        pointer: &Pointer,
        raw: &RawEvent,
        event_target: &E,
        kind: PointerEventType,
    ) -> Vec<Target<E, M>> {
        let path = path_to_root(&self.tree, event_target);
        let mut targets = Vec::new();
        for (depth, element) in path.iter().enumerate() {
            let payload = CollectTargets {
                interaction,
                pointer,
                raw,
                event_target,
                kind,
                path: &path,
                depth,
                element,
                eventables: &self.eventables,
            };
            self.signals.fire_collect_targets(&payload, &mut targets);
        }
        targets
    }
}
