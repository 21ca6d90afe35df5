// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The synthetic pointer event handed to each target's handler.

use kurbo::{Point, Vec2};

use crate::types::{EventableId, Pointer, PointerEventType, PointerId, PointerType, RawEvent};

/// A pointer event as seen by handlers.
///
/// Built once per [`Dispatcher::fire`](crate::dispatcher::Dispatcher::fire) call (or supplied
/// pre-built by the caller). While the dispatcher walks its targets it sets
/// `current_target`, `eventable` and `props` for the visited target and shifts `page`/`client`
/// into that target's origin; the shift is undone before the next target is visited.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerEvent<E, M = ()> {
    /// Event kind.
    pub kind: PointerEventType,
    /// Pointer that produced the event.
    pub pointer_id: PointerId,
    /// Device class of that pointer.
    pub pointer_type: PointerType,
    /// Page-space position, relative to the current target's origin during a handler call.
    pub page: Point,
    /// Viewport-space position, relative to the current target's origin during a handler call.
    pub client: Point,
    /// Pressed button mask copied from the raw event.
    pub buttons: u16,
    /// Element the raw event originated from.
    pub target: E,
    /// Element of the target currently being visited.
    pub current_target: Option<E>,
    /// Handler currently being invoked.
    pub eventable: Option<EventableId>,
    /// Extra properties of the target currently being visited.
    pub props: M,
    /// Creation time in milliseconds on the session clock.
    pub time_stamp: u64,
    /// For `tap` and `doubletap`: milliseconds since the interaction's previous tap.
    pub dt: u64,
    /// For `tap`: whether this tap completes a double tap.
    pub double: bool,
    /// Set by [`stop_propagation`](Self::stop_propagation).
    pub propagation_stopped: bool,
    /// Set by [`stop_immediate_propagation`](Self::stop_immediate_propagation).
    pub immediate_propagation_stopped: bool,
}

impl<E, M: Default> PointerEvent<E, M> {
    /// Create an event of `kind` from a pointer sample.
    pub fn new(
        kind: PointerEventType,
        pointer: &Pointer,
        raw: &RawEvent,
        target: E,
        time_stamp: u64,
    ) -> Self {
        Self {
            kind,
            pointer_id: pointer.id,
            pointer_type: pointer.pointer_type,
            page: pointer.page,
            client: pointer.client,
            buttons: raw.buttons,
            target,
            current_target: None,
            eventable: None,
            props: M::default(),
            time_stamp,
            dt: 0,
            double: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }
}

impl<E, M> PointerEvent<E, M> {
    /// Stop propagation once the current element has been fully visited.
    ///
    /// Remaining targets bound to the same element still run.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Stop propagation right after the current handler returns.
    pub fn stop_immediate_propagation(&mut self) {
        self.immediate_propagation_stopped = true;
        self.propagation_stopped = true;
    }

    /// Express coordinates relative to `origin`.
    pub fn subtract_origin(&mut self, origin: Point) {
        let offset: Vec2 = origin.to_vec2();
        self.page -= offset;
        self.client -= offset;
    }

    /// Undo [`subtract_origin`](Self::subtract_origin).
    pub fn add_origin(&mut self, origin: Point) {
        let offset: Vec2 = origin.to_vec2();
        self.page += offset;
        self.client += offset;
    }
}
