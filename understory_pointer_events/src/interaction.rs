// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interaction state: tracked pointers, hold timers, and tap memory.
//!
//! ## Ownership
//!
//! An [`Interaction`] is owned by the calling session, one per multi-pointer gesture stream.
//! The upstream session maintains its pointer list and the `pointer_is_down` /
//! `pointer_was_moved` flags (see [`Session`](crate::session::Session) for a reference driver).
//! The engine only writes the tap memory and each pointer's [`HoldTimer`].

use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use kurbo::Point;

use crate::event::PointerEvent;
use crate::timer::TimerHandle;
use crate::types::{Pointer, PointerId};

/// Hold timer state of one pointer.
///
/// ```text
///   Idle --down, hold targets found--> Armed --timeout--> Fired
///    ^                                   |                  |
///    +-----------move / up / cancel------+------------------+
/// ```
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum HoldTimer {
    /// No timer is scheduled.
    #[default]
    Idle,
    /// A timer is scheduled to fire after `duration` milliseconds.
    Armed {
        /// Minimum hold duration across the competing targets.
        duration: u64,
        /// Handle of the scheduled callback.
        handle: TimerHandle,
    },
    /// The hold event was dispatched; the pointer is still down.
    Fired {
        /// Duration the hold was armed with.
        duration: u64,
    },
}

impl HoldTimer {
    /// Whether no timer is scheduled and no hold has fired.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The minimum duration this pointer was armed with, if any.
    pub fn duration(&self) -> Option<u64> {
        match *self {
            Self::Idle => None,
            Self::Armed { duration, .. } | Self::Fired { duration } => Some(duration),
        }
    }

    /// Handle of the pending timer, if armed.
    pub fn handle(&self) -> Option<TimerHandle> {
        match *self {
            Self::Armed { handle, .. } => Some(handle),
            _ => None,
        }
    }
}

/// State of one tracked pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerInfo<E> {
    /// Latest sample for this pointer.
    pub pointer: Pointer,
    /// Element the pointer was pressed on, while down.
    pub down_target: Option<E>,
    /// Page position at the last press.
    pub down_page: Point,
    /// Time of the last press.
    pub down_time: u64,
    /// Hold timer state.
    pub hold: HoldTimer,
}

impl<E> PointerInfo<E> {
    /// A record for a pointer that has not been pressed.
    pub fn new(pointer: Pointer) -> Self {
        Self {
            pointer,
            down_target: None,
            down_page: pointer.page,
            down_time: 0,
            hold: HoldTimer::Idle,
        }
    }
}

/// Identity of an [`Interaction`], used to route hold timeouts back to the one that armed them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct InteractionId(pub u64);

impl InteractionId {
    /// A process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// One tracked multi-pointer gesture session.
///
/// Clones share the original's [`InteractionId`].
#[derive(Clone, Debug, PartialEq)]
pub struct Interaction<E, M = ()> {
    /// Identity stamped on the hold timeouts this interaction arms.
    pub id: InteractionId,
    /// Tracked pointers, in the order they were first seen.
    pub pointers: Vec<PointerInfo<E>>,
    /// Whether any pointer is pressed.
    pub pointer_is_down: bool,
    /// Whether the pressed pointer moved beyond tolerance since the press.
    pub pointer_was_moved: bool,
    /// Last dispatched `tap` or `doubletap` event.
    pub prev_tap: Option<PointerEvent<E, M>>,
    /// Time stamp of `prev_tap`, or `0`.
    pub tap_time: u64,
}

impl<E, M> Default for Interaction<E, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, M> Interaction<E, M> {
    /// An interaction with a fresh id, no pointers and no tap memory.
    pub fn new() -> Self {
        Self::with_id(InteractionId::next())
    }

    /// Like [`new`](Self::new), with a caller-chosen id.
    pub fn with_id(id: InteractionId) -> Self {
        Self {
            id,
            pointers: Vec::new(),
            pointer_is_down: false,
            pointer_was_moved: false,
            prev_tap: None,
            tap_time: 0,
        }
    }

    /// Index of the pointer with `id` in [`pointers`](Self::pointers).
    pub fn pointer_index(&self, id: PointerId) -> Option<usize> {
        self.pointers.iter().position(|p| p.pointer.id == id)
    }

    /// Record of the pointer with `id`.
    pub fn pointer_info(&self, id: PointerId) -> Option<&PointerInfo<E>> {
        self.pointers.iter().find(|p| p.pointer.id == id)
    }

    /// Mutable record of the pointer with `id`.
    pub fn pointer_info_mut(&mut self, id: PointerId) -> Option<&mut PointerInfo<E>> {
        self.pointers.iter_mut().find(|p| p.pointer.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PointerType;

    #[test]
    fn hold_timer_accessors() {
        let handle = TimerHandle(3);
        assert!(HoldTimer::Idle.is_idle());
        assert_eq!(HoldTimer::Idle.duration(), None);
        let armed = HoldTimer::Armed {
            duration: 300,
            handle,
        };
        assert!(!armed.is_idle());
        assert_eq!(armed.duration(), Some(300));
        assert_eq!(armed.handle(), Some(handle));
        let fired = HoldTimer::Fired { duration: 300 };
        assert_eq!(fired.duration(), Some(300));
        assert_eq!(fired.handle(), None);
    }

    #[test]
    fn pointer_lookup_by_id() {
        let mut interaction: Interaction<u32> = Interaction::new();
        for id in [5, 9] {
            interaction.pointers.push(PointerInfo::new(Pointer::at(
                PointerId(id),
                PointerType::Touch,
                Point::ZERO,
            )));
        }
        assert_eq!(interaction.pointer_index(PointerId(9)), Some(1));
        assert_eq!(interaction.pointer_index(PointerId(1)), None);
        if let Some(info) = interaction.pointer_info_mut(PointerId(5)) {
            info.down_target = Some(2);
        }
        assert_eq!(
            interaction
                .pointer_info(PointerId(5))
                .and_then(|p| p.down_target),
            Some(2)
        );
    }

    #[test]
    fn new_interaction_has_no_tap_memory() {
        let interaction: Interaction<u32> = Interaction::default();
        assert!(interaction.prev_tap.is_none());
        assert_eq!(interaction.tap_time, 0);
        assert!(!interaction.pointer_is_down);
    }

    #[test]
    fn interactions_get_distinct_ids() {
        let a: Interaction<u32> = Interaction::new();
        let b: Interaction<u32> = Interaction::new();
        assert_ne!(a.id, b.id);
        assert_eq!(a.clone().id, a.id);
        let c: Interaction<u32> = Interaction::with_id(InteractionId(42));
        assert_eq!(c.id, InteractionId(42));
    }
}
