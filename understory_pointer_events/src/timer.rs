// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Delayed-callback facility used for hold recognition.
//!
//! ## Overview
//!
//! The engine never sleeps or spawns. It asks a [`Scheduler`] to remember a
//! [`HoldTimeout`] for a while and expects the host to hand each elapsed timeout back through
//! [`Dispatcher::hold_elapsed`](crate::dispatcher::Dispatcher::hold_elapsed), on the same
//! thread that delivers input.
//! Cancelled or superseded timeouts that are still delivered are ignored there.
//!
//! [`ManualScheduler`] is a deterministic implementation driven by an explicit clock, suited
//! to tests and to hosts that already own a frame clock.
//!
//! Several interactions may share one scheduler. Each [`HoldTimeout`] names the
//! [`Interaction`] that armed it, and it must be delivered to that interaction.

use alloc::vec::Vec;

use crate::dispatcher::Dispatcher;
use crate::event::PointerEvent;
use crate::interaction::{Interaction, InteractionId};
use crate::tree::ElementTree;
use crate::types::{Pointer, RawEvent};

/// Opaque handle of a scheduled timeout.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TimerHandle(pub u64);

/// Everything needed to dispatch `hold` once the timer elapses.
///
/// Captured at press time; the hold event reports the press position and target.
#[derive(Clone, Debug, PartialEq)]
pub struct HoldTimeout<E> {
    /// Interaction that armed the timer.
    pub interaction: InteractionId,
    /// Pointer sample at press time.
    pub pointer: Pointer,
    /// Raw press occurrence.
    pub raw: RawEvent,
    /// Element the pointer was pressed on.
    pub event_target: E,
}

/// Clock and delayed-callback facility.
pub trait Scheduler<E> {
    /// Current time in milliseconds.
    fn now(&self) -> u64;
    /// Schedule `timeout` to be delivered after `delay` milliseconds.
    fn set_timeout(&mut self, delay: u64, timeout: HoldTimeout<E>) -> TimerHandle;
    /// Forget a scheduled timeout. Unknown handles are ignored.
    fn clear_timeout(&mut self, handle: TimerHandle);
}

#[derive(Clone, Debug)]
struct Pending<E> {
    deadline: u64,
    handle: TimerHandle,
    timeout: HoldTimeout<E>,
}

/// A scheduler with a manually advanced clock.
#[derive(Clone, Debug)]
pub struct ManualScheduler<E> {
    now: u64,
    next_handle: u64,
    pending: Vec<Pending<E>>,
}

impl<E> Default for ManualScheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ManualScheduler<E> {
    /// A scheduler whose clock starts at `0`.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// A scheduler whose clock starts at `now`.
    pub fn starting_at(now: u64) -> Self {
        Self {
            now,
            next_handle: 1,
            pending: Vec::new(),
        }
    }

    /// Number of timeouts not yet delivered or cleared.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Deadline of the earliest pending timeout.
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.iter().map(|p| p.deadline).min()
    }

    /// Move the clock to `now` (never backwards) and take every timeout that is due.
    ///
    /// Due timeouts are returned by deadline, then in scheduling order.
    pub fn advance_to(&mut self, now: u64) -> Vec<(TimerHandle, HoldTimeout<E>)> {
        self.take_due(now, |_| true)
    }

    /// Move the clock to `now` and take the due timeouts armed by `interaction`.
    ///
    /// Due timeouts of other interactions stay queued.
    pub fn advance_interaction_to(
        &mut self,
        now: u64,
        interaction: InteractionId,
    ) -> Vec<(TimerHandle, HoldTimeout<E>)> {
        self.take_due(now, |t| t.interaction == interaction)
    }

    fn take_due(
        &mut self,
        now: u64,
        mut wanted: impl FnMut(&HoldTimeout<E>) -> bool,
    ) -> Vec<(TimerHandle, HoldTimeout<E>)> {
        self.now = self.now.max(now);
        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) = core::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.deadline <= now && wanted(&p.timeout));
        self.pending = pending;
        due.sort_by_key(|p| (p.deadline, p.handle));
        due.into_iter().map(|p| (p.handle, p.timeout)).collect()
    }

    /// Advance the clock by `delta` milliseconds; see [`advance_to`](Self::advance_to).
    pub fn advance_by(&mut self, delta: u64) -> Vec<(TimerHandle, HoldTimeout<E>)> {
        self.advance_to(self.now.saturating_add(delta))
    }
}

impl<E> Scheduler<E> for ManualScheduler<E> {
    fn now(&self) -> u64 {
        self.now
    }

    fn set_timeout(&mut self, delay: u64, timeout: HoldTimeout<E>) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.push(Pending {
            deadline: self.now.saturating_add(delay),
            handle,
            timeout,
        });
        handle
    }

    fn clear_timeout(&mut self, handle: TimerHandle) {
        self.pending.retain(|p| p.handle != handle);
    }
}

impl<E, T, M> Dispatcher<E, T, ManualScheduler<E>, M>
where
    E: Clone + PartialEq + 'static,
    T: ElementTree<E>,
    M: Clone + Default + 'static,
{
    /// Advance the manual clock to `now` and deliver the due hold timeouts `interaction` armed.
    ///
    /// Timeouts armed by other interactions stay queued for their own call.
    /// Returns the `hold` events that were dispatched.
    pub fn advance_timers(
        &mut self,
        interaction: &mut Interaction<E, M>,
        now: u64,
    ) -> Vec<PointerEvent<E, M>> {
        let due = self
            .scheduler_mut()
            .advance_interaction_to(now, interaction.id);
        due.into_iter()
            .filter_map(|(handle, timeout)| self.hold_elapsed(interaction, handle, timeout))
            .collect()
    }
}
