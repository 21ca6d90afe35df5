// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture recognition on top of the session stream: hold, tap and plain passthrough.
//!
//! ## Hold
//!
//! On `down`, the engine collects every handler on the ancestor path that listens to `hold`
//! and arms one timer for the smallest hold duration among them (see [`HoldTimer`]).
//! When the host delivers the elapsed timeout through [`Dispatcher::hold_elapsed`], `hold` is
//! dispatched to the handlers whose duration equals that minimum.
//! A real `move`, an `up` or a `cancel` of the pointer clears the timer.
//!
//! A `down` for a pointer whose timer is already armed is ignored.
//!
//! ## Tap
//!
//! On `up`, a `tap` is dispatched if the pointer was not moved while down. Target collection
//! additionally requires that the pointer is released over the element it was pressed on.
//!
//! ## Wiring
//!
//! [`install`] registers the listeners on a [`SessionSignals`] whose context is the
//! [`Dispatcher`]. Registration order fixes dispatch order: hold arming runs before the plain
//! `down` dispatch, and on release the timer is cleared before `up` is dispatched, which in
//! turn precedes `tap`.

use crate::dispatcher::{Dispatcher, FireArgs};
use crate::event::PointerEvent;
use crate::interaction::{HoldTimer, Interaction, PointerInfo};
use crate::session::{MoveSignal, NewSignal, PointerSignal, SessionSignals, UpdatePointerSignal};
use crate::timer::{HoldTimeout, Scheduler, TimerHandle};
use crate::tree::ElementTree;
use crate::types::PointerEventType;

impl<E, T, S, M> Dispatcher<E, T, S, M>
where
    E: Clone + PartialEq + 'static,
    T: ElementTree<E>,
    S: Scheduler<E>,
    M: Clone + Default + 'static,
{
    /// Deliver an elapsed hold timeout.
    ///
    /// Dispatches `hold` and returns the event if `handle` is still the pointer's armed timer.
    /// Timeouts that were cleared, superseded or already delivered return `None`, as do
    /// timeouts armed by a different interaction.
    pub fn hold_elapsed(
        &mut self,
        interaction: &mut Interaction<E, M>,
        handle: TimerHandle,
        timeout: HoldTimeout<E>,
    ) -> Option<PointerEvent<E, M>> {
        if timeout.interaction != interaction.id {
            tracing::debug!(
                handle = handle.0,
                armed_by = timeout.interaction.0,
                delivered_to = interaction.id.0,
                "hold timeout delivered to the wrong interaction"
            );
            return None;
        }
        let Some(info) = interaction.pointer_info_mut(timeout.pointer.id) else {
            tracing::debug!(id = timeout.pointer.id.0, "hold timeout for unknown pointer");
            return None;
        };
        let duration = match info.hold {
            HoldTimer::Armed {
                duration,
                handle: armed,
            } if armed == handle => duration,
            _ => {
                tracing::debug!(handle = handle.0, "ignoring stale hold timeout");
                return None;
            }
        };
        info.hold = HoldTimer::Fired { duration };
        tracing::debug!(id = timeout.pointer.id.0, duration, "hold elapsed");

        Some(self.fire(FireArgs::new(
            interaction,
            &timeout.pointer,
            &timeout.raw,
            &timeout.event_target,
            PointerEventType::Hold,
        )))
    }

    /// Clear the pointer's timer, if any, and return it to idle.
    fn cancel_hold(&mut self, info: &mut PointerInfo<E>) {
        if let Some(handle) = info.hold.handle() {
            tracing::debug!(id = info.pointer.id.0, "hold cancelled");
            self.scheduler.clear_timeout(handle);
        }
        info.hold = HoldTimer::Idle;
    }
}

fn on_new<E, T, S, M>(_: &mut Dispatcher<E, T, S, M>, signal: &mut NewSignal<'_, E, M>) {
    signal.interaction.prev_tap = None;
    signal.interaction.tap_time = 0;
}

fn on_update_pointer<E, T, S, M>(
    _: &mut Dispatcher<E, T, S, M>,
    signal: &mut UpdatePointerSignal<'_, E>,
) {
    // An armed timer survives so that `down` can recognize the re-entrant press.
    if signal.down && !matches!(signal.pointer_info.hold, HoldTimer::Armed { .. }) {
        signal.pointer_info.hold = HoldTimer::Idle;
    }
}

fn on_move<E, T, S, M>(d: &mut Dispatcher<E, T, S, M>, signal: &mut MoveSignal<'_, E, M>)
where
    E: Clone + PartialEq + 'static,
    T: ElementTree<E>,
    S: Scheduler<E>,
    M: Clone + Default + 'static,
{
    let interaction = &mut *signal.interaction;
    if signal.duplicate_move || (interaction.pointer_is_down && !interaction.pointer_was_moved) {
        return;
    }
    if interaction.pointer_is_down
        && let Some(info) = interaction.pointers.get_mut(signal.pointer_index)
    {
        d.cancel_hold(info);
    }
    let _ = d.fire(FireArgs::new(
        interaction,
        signal.pointer,
        signal.raw,
        signal.event_target,
        PointerEventType::Move,
    ));
}

fn on_down<E, T, S, M>(d: &mut Dispatcher<E, T, S, M>, signal: &mut PointerSignal<'_, E, M>)
where
    E: Clone + PartialEq + 'static,
    T: ElementTree<E>,
    S: Scheduler<E>,
    M: Clone + Default + 'static,
{
    let Some(info) = signal.interaction.pointers.get(signal.pointer_index) else {
        return;
    };
    if !info.hold.is_idle() {
        tracing::debug!(id = signal.pointer.id.0, "ignoring re-entrant down");
        return;
    }

    let targets = d.traverse(
        &*signal.interaction,
        signal.pointer,
        signal.raw,
        signal.event_target,
        PointerEventType::Hold,
    );
    let Some(duration) = targets
        .iter()
        .map(|t| d.eventables.hold_duration(t.eventable))
        .min()
    else {
        return;
    };

    let handle = d.scheduler.set_timeout(
        duration,
        HoldTimeout {
            interaction: signal.interaction.id,
            pointer: *signal.pointer,
            raw: *signal.raw,
            event_target: signal.event_target.clone(),
        },
    );
    tracing::debug!(
        id = signal.pointer.id.0,
        duration,
        candidates = targets.len(),
        "hold armed"
    );
    if let Some(info) = signal.interaction.pointers.get_mut(signal.pointer_index) {
        info.hold = HoldTimer::Armed { duration, handle };
    }
}

fn on_release<E, T, S, M>(d: &mut Dispatcher<E, T, S, M>, signal: &mut PointerSignal<'_, E, M>)
where
    E: Clone + PartialEq + 'static,
    T: ElementTree<E>,
    S: Scheduler<E>,
    M: Clone + Default + 'static,
{
    if let Some(info) = signal.interaction.pointers.get_mut(signal.pointer_index) {
        d.cancel_hold(info);
    }
}

fn on_up_tap<E, T, S, M>(d: &mut Dispatcher<E, T, S, M>, signal: &mut PointerSignal<'_, E, M>)
where
    E: Clone + PartialEq + 'static,
    T: ElementTree<E>,
    S: Scheduler<E>,
    M: Clone + Default + 'static,
{
    if signal.interaction.pointer_was_moved {
        return;
    }
    let _ = d.fire(FireArgs::new(
        &mut *signal.interaction,
        signal.pointer,
        signal.raw,
        signal.event_target,
        PointerEventType::Tap,
    ));
}

/// A session listener that dispatches every occurrence 1:1 as a `kind` pointer event.
pub fn create_signal_listener<E, T, S, M>(
    kind: PointerEventType,
) -> impl FnMut(&mut Dispatcher<E, T, S, M>, &mut PointerSignal<'_, E, M>) + 'static
where
    E: Clone + PartialEq + 'static,
    T: ElementTree<E> + 'static,
    S: Scheduler<E> + 'static,
    M: Clone + Default + 'static,
{
    move |d, signal| {
        let _ = d.fire(FireArgs::new(
            &mut *signal.interaction,
            signal.pointer,
            signal.raw,
            signal.event_target,
            kind,
        ));
    }
}

/// Wire hold, tap and passthrough recognition onto `signals`.
pub fn install<E, T, S, M>(signals: &mut SessionSignals<Dispatcher<E, T, S, M>, E, M>)
where
    E: Clone + PartialEq + 'static,
    T: ElementTree<E> + 'static,
    S: Scheduler<E> + 'static,
    M: Clone + Default + 'static,
{
    signals.on_new(on_new);
    signals.on_update_pointer(on_update_pointer);
    signals.on_move(on_move);
    signals.on_down(on_down);
    signals.on_up(on_release);
    signals.on_cancel(on_release);
    signals.on_down(create_signal_listener::<E, T, S, M>(PointerEventType::Down));
    signals.on_up(create_signal_listener::<E, T, S, M>(PointerEventType::Up));
    signals.on_cancel(create_signal_listener::<E, T, S, M>(PointerEventType::Cancel));
    signals.on_up(on_up_tap);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eventable::Listeners;
    use crate::session::Session;
    use crate::targets::ElementTargets;
    use crate::tap::TapInterval;
    use crate::timer::ManualScheduler;
    use crate::types::{EventableOptions, Pointer, PointerId, PointerType, RawEvent};
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use kurbo::Point;

    /// 3 -> 2 -> 1
    struct Chain;
    impl ElementTree<u32> for Chain {
        fn parent_of(&self, element: &u32) -> Option<u32> {
            match element {
                2 | 3 => Some(element - 1),
                _ => None,
            }
        }
    }

    type Engine = Dispatcher<u32, Chain, ManualScheduler<u32>>;
    type Log = Rc<RefCell<Vec<(&'static str, PointerEventType, Option<u32>)>>>;

    struct Harness {
        engine: Engine,
        session: Session<Engine, u32>,
        interaction: Interaction<u32>,
        log: Log,
    }

    impl Harness {
        /// `handlers`: `(name, bound element, hold duration)`.
        fn new(handlers: &[(&'static str, u32, u64)]) -> Self {
            let mut engine: Engine = Dispatcher::new(Chain, ManualScheduler::new());
            let log: Log = Rc::default();
            let mut bindings = ElementTargets::new();
            for &(name, element, duration) in handlers {
                let mut listeners = Listeners::with_options(EventableOptions {
                    hold_duration: Some(duration),
                    ..Default::default()
                });
                for kind in PointerEventType::ALL {
                    let log = log.clone();
                    listeners.on(kind, move |ev| {
                        log.borrow_mut().push((name, ev.kind, ev.current_target));
                    });
                }
                let id = engine.insert_eventable(listeners);
                bindings.bind(element, id);
            }
            bindings.install(engine.signals_mut());

            let mut session = Session::new();
            install(session.signals_mut());
            let mut interaction = Interaction::new();
            session.new_interaction(&mut engine, &mut interaction);
            Self {
                engine,
                session,
                interaction,
                log,
            }
        }

        fn down(&mut self, x: f64, target: u32) {
            self.session.pointer_down(
                &mut self.engine,
                &mut self.interaction,
                pointer(x),
                &RawEvent::default(),
                target,
            );
        }

        fn move_to(&mut self, x: f64, target: u32) {
            self.session.pointer_move(
                &mut self.engine,
                &mut self.interaction,
                pointer(x),
                &RawEvent::default(),
                target,
            );
        }

        fn up(&mut self, x: f64, target: u32) {
            self.session.pointer_up(
                &mut self.engine,
                &mut self.interaction,
                pointer(x),
                &RawEvent::default(),
                target,
            );
        }

        fn cancel(&mut self, x: f64, target: u32) {
            self.session.pointer_cancel(
                &mut self.engine,
                &mut self.interaction,
                pointer(x),
                &RawEvent::default(),
                target,
            );
        }

        fn advance(&mut self, now: u64) -> Vec<PointerEvent<u32>> {
            self.engine.advance_timers(&mut self.interaction, now)
        }

        fn hold(&self) -> HoldTimer {
            self.interaction
                .pointer_info(PointerId(1))
                .map(|p| p.hold)
                .unwrap_or_default()
        }

        fn kinds(&self) -> Vec<PointerEventType> {
            let mut kinds: Vec<_> = self.log.borrow().iter().map(|(_, k, _)| *k).collect();
            kinds.dedup();
            kinds
        }

        fn count(&self, kind: PointerEventType) -> usize {
            self.log.borrow().iter().filter(|(_, k, _)| *k == kind).count()
        }
    }

    fn pointer(x: f64) -> Pointer {
        Pointer::at(PointerId(1), PointerType::Touch, Point::new(x, 0.0))
    }

    #[test]
    fn up_without_move_dispatches_exactly_one_tap() {
        let mut h = Harness::new(&[("a", 3, 600)]);
        h.down(0.0, 3);
        h.up(0.0, 3);
        assert_eq!(
            h.kinds(),
            vec![
                PointerEventType::Down,
                PointerEventType::Up,
                PointerEventType::Tap
            ]
        );
        assert_eq!(h.count(PointerEventType::Tap), 1);
        assert_eq!(
            h.interaction.prev_tap.as_ref().map(|t| t.kind),
            Some(PointerEventType::Tap)
        );
    }

    #[test]
    fn up_after_move_dispatches_no_tap() {
        let mut h = Harness::new(&[("a", 3, 600)]);
        h.down(0.0, 3);
        h.move_to(30.0, 3);
        h.up(30.0, 3);
        assert_eq!(h.count(PointerEventType::Tap), 0);
        assert_eq!(h.count(PointerEventType::Move), 1);
        assert!(h.interaction.prev_tap.is_none());
    }

    #[test]
    fn up_over_another_element_dispatches_no_tap() {
        let mut h = Harness::new(&[("a", 3, 600)]);
        h.down(0.0, 3);
        h.up(0.0, 2);
        assert_eq!(h.count(PointerEventType::Tap), 0);
    }

    #[test]
    fn down_arms_hold_and_dispatches_plain_down() {
        let mut h = Harness::new(&[("a", 3, 600)]);
        h.down(0.0, 3);
        assert!(matches!(h.hold(), HoldTimer::Armed { duration: 600, .. }));
        assert_eq!(h.kinds(), vec![PointerEventType::Down]);
        assert_eq!(h.engine.scheduler().next_deadline(), Some(600));
    }

    #[test]
    fn hold_goes_to_the_fastest_handler_only() {
        let mut h = Harness::new(&[("slow", 3, 500), ("fast", 2, 300), ("slowest", 1, 800)]);
        h.down(0.0, 3);
        assert!(matches!(h.hold(), HoldTimer::Armed { duration: 300, .. }));

        assert!(h.advance(299).is_empty());
        let fired = h.advance(300);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].kind, PointerEventType::Hold);
        assert_eq!(fired[0].target, 3);
        assert_eq!(h.hold(), HoldTimer::Fired { duration: 300 });

        let holds: Vec<_> = h
            .log
            .borrow()
            .iter()
            .filter(|(_, k, _)| *k == PointerEventType::Hold)
            .map(|(n, _, el)| (*n, *el))
            .collect();
        assert_eq!(holds, vec![("fast", Some(2))]);

        // Nothing else is pending.
        assert!(h.advance(10_000).is_empty());
    }

    #[test]
    fn elements_without_hold_handlers_arm_nothing() {
        let mut h = Harness::new(&[]);
        h.down(0.0, 3);
        assert_eq!(h.hold(), HoldTimer::Idle);
        assert_eq!(h.engine.scheduler().pending_len(), 0);
    }

    #[test]
    fn real_move_cancels_hold() {
        let mut h = Harness::new(&[("a", 3, 600)]);
        h.down(0.0, 3);
        h.move_to(30.0, 3);
        assert_eq!(h.hold(), HoldTimer::Idle);
        assert_eq!(h.engine.scheduler().pending_len(), 0);
        assert!(h.advance(1_000).is_empty());
        assert_eq!(h.count(PointerEventType::Hold), 0);
    }

    #[test]
    fn small_or_duplicate_moves_keep_hold_and_dispatch_nothing() {
        let mut h = Harness::new(&[("a", 3, 600)]);
        h.down(0.0, 3);
        // Within tolerance.
        h.move_to(0.5, 3);
        // Repeat of the previous sample.
        h.move_to(0.5, 3);
        assert!(matches!(h.hold(), HoldTimer::Armed { .. }));
        assert_eq!(h.count(PointerEventType::Move), 0);
        assert_eq!(h.advance(600).len(), 1);
    }

    #[test]
    fn duplicate_move_after_real_move_dispatches_nothing() {
        let mut h = Harness::new(&[("a", 3, 600)]);
        h.down(0.0, 3);
        h.move_to(30.0, 3);
        h.move_to(30.0, 3);
        assert_eq!(h.count(PointerEventType::Move), 1);
    }

    #[test]
    fn hover_moves_dispatch_move() {
        let mut h = Harness::new(&[("a", 3, 600)]);
        h.move_to(1.0, 3);
        h.move_to(2.0, 3);
        assert_eq!(h.count(PointerEventType::Move), 2);
        assert_eq!(h.hold(), HoldTimer::Idle);
    }

    #[test]
    fn up_and_cancel_clear_the_timer() {
        let mut h = Harness::new(&[("a", 3, 600)]);
        h.down(0.0, 3);
        h.up(0.0, 3);
        assert_eq!(h.engine.scheduler().pending_len(), 0);

        h.down(0.0, 3);
        h.cancel(0.0, 3);
        assert_eq!(h.engine.scheduler().pending_len(), 0);
        assert!(h.advance(1_000).is_empty());
        assert_eq!(
            h.kinds(),
            vec![
                PointerEventType::Down,
                PointerEventType::Up,
                PointerEventType::Tap,
                PointerEventType::Down,
                PointerEventType::Cancel,
            ]
        );
    }

    #[test]
    fn re_entrant_down_keeps_the_armed_timer() {
        let mut h = Harness::new(&[("a", 3, 600)]);
        h.down(0.0, 3);
        let first = h.hold();
        h.down(0.0, 3);
        assert_eq!(h.hold(), first);
        assert_eq!(h.engine.scheduler().pending_len(), 1);
        // The plain down is still dispatched twice.
        assert_eq!(h.count(PointerEventType::Down), 2);
    }

    #[test]
    fn stale_timeout_is_ignored() {
        let mut h = Harness::new(&[("a", 3, 600)]);
        h.down(0.0, 3);
        let stale = HoldTimeout {
            interaction: h.interaction.id,
            pointer: pointer(0.0),
            raw: RawEvent::default(),
            event_target: 3,
        };
        assert!(
            h.engine
                .hold_elapsed(&mut h.interaction, TimerHandle(999), stale)
                .is_none()
        );
        assert_eq!(h.count(PointerEventType::Hold), 0);
        assert!(matches!(h.hold(), HoldTimer::Armed { .. }));
    }

    #[test]
    fn interactions_sharing_a_dispatcher_each_get_their_hold() {
        let mut h = Harness::new(&[("a", 3, 600)]);
        let mut other: Interaction<u32> = Interaction::new();
        h.session.new_interaction(&mut h.engine, &mut other);
        let second = Pointer::at(PointerId(2), PointerType::Touch, Point::ZERO);

        h.down(0.0, 3);
        h.session
            .pointer_down(&mut h.engine, &mut other, second, &RawEvent::default(), 3);
        assert_eq!(h.engine.scheduler().pending_len(), 2);

        // Draining the first interaction leaves the second one's timer queued.
        assert_eq!(h.advance(1_000).len(), 1);
        assert_eq!(h.engine.scheduler().pending_len(), 1);
        let fired = h.engine.advance_timers(&mut other, 1_000);
        assert_eq!(fired.len(), 1);
        assert_eq!(
            other.pointer_info(PointerId(2)).map(|p| p.hold),
            Some(HoldTimer::Fired { duration: 600 })
        );
        assert_eq!(h.count(PointerEventType::Hold), 2);
    }

    #[test]
    fn timeout_delivered_to_another_interaction_is_ignored() {
        let mut h = Harness::new(&[("a", 3, 600)]);
        h.down(0.0, 3);
        let mut other: Interaction<u32> = Interaction::new();
        let mut due = h.engine.scheduler_mut().advance_to(600);
        let Some((handle, timeout)) = due.pop() else {
            panic!("the hold timer should be due");
        };
        assert!(
            h.engine
                .hold_elapsed(&mut other, handle, timeout.clone())
                .is_none()
        );
        assert!(matches!(h.hold(), HoldTimer::Armed { .. }));
        // The owner still accepts it.
        assert!(
            h.engine
                .hold_elapsed(&mut h.interaction, handle, timeout)
                .is_some()
        );
        assert_eq!(h.count(PointerEventType::Hold), 1);
    }

    #[test]
    fn double_tap_follows_the_policy() {
        let mut h = Harness::new(&[("a", 3, 600)]);
        h.engine.set_tap_policy(TapInterval { max_interval: 300 });

        h.down(0.0, 3);
        h.up(0.0, 3);
        let _ = h.advance(100);
        h.down(0.0, 3);
        h.up(0.0, 3);
        assert_eq!(h.count(PointerEventType::Tap), 2);
        assert_eq!(h.count(PointerEventType::DoubleTap), 1);
        let prev = h.interaction.prev_tap.as_ref().map(|t| (t.kind, t.dt));
        assert_eq!(prev, Some((PointerEventType::DoubleTap, 100)));

        // A third tap starts over.
        let _ = h.advance(150);
        h.down(0.0, 3);
        h.up(0.0, 3);
        assert_eq!(h.count(PointerEventType::DoubleTap), 1);
    }

    #[test]
    fn new_interaction_resets_tap_memory() {
        let mut h = Harness::new(&[("a", 3, 600)]);
        h.down(0.0, 3);
        h.up(0.0, 3);
        assert!(h.interaction.prev_tap.is_some());
        h.session.new_interaction(&mut h.engine, &mut h.interaction);
        assert!(h.interaction.prev_tap.is_none());
        assert_eq!(h.interaction.tap_time, 0);
    }
}
