// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hold, tap and double-tap driven through a session with a manual clock.
//!
//! A photo (2) in a gallery (1) wants a quick hold (300 ms) for a preview; the gallery wants
//! the default hold (600 ms) for a context menu. Only the quicker one receives `hold`.
//!
//! Run:
//! - `cargo run -p understory_examples --example pointer_events_gestures`

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Point;
use understory_pointer_events::dispatcher::Dispatcher;
use understory_pointer_events::eventable::Listeners;
use understory_pointer_events::gesture;
use understory_pointer_events::interaction::Interaction;
use understory_pointer_events::session::Session;
use understory_pointer_events::tap::TapInterval;
use understory_pointer_events::targets::ElementTargets;
use understory_pointer_events::timer::ManualScheduler;
use understory_pointer_events::tree::ElementTree;
use understory_pointer_events::types::{
    EventableOptions, Pointer, PointerEventType, PointerId, PointerType, RawEvent,
};

struct Gallery;
impl ElementTree<u32> for Gallery {
    fn parent_of(&self, element: &u32) -> Option<u32> {
        (*element == 2).then_some(1)
    }
}

type Engine = Dispatcher<u32, Gallery, ManualScheduler<u32>>;
type Log = Rc<RefCell<Vec<(&'static str, PointerEventType)>>>;

fn handler(log: &Log, name: &'static str, hold_duration: Option<u64>) -> Listeners<u32> {
    let mut listeners = Listeners::with_options(EventableOptions {
        hold_duration,
        ..Default::default()
    });
    for kind in [
        PointerEventType::Hold,
        PointerEventType::Tap,
        PointerEventType::DoubleTap,
    ] {
        let log = log.clone();
        listeners.on(kind, move |ev| log.borrow_mut().push((name, ev.kind)));
    }
    listeners
}

fn main() {
    let mut engine: Engine = Dispatcher::new(Gallery, ManualScheduler::new());
    engine.set_tap_policy(TapInterval { max_interval: 300 });
    let log: Log = Rc::default();

    let photo = engine.insert_eventable(handler(&log, "photo", Some(300)));
    let gallery = engine.insert_eventable(handler(&log, "gallery", None));
    let mut bindings = ElementTargets::new();
    bindings.bind(2, photo).bind(1, gallery);
    bindings.install(engine.signals_mut());

    let mut session: Session<Engine, u32> = Session::new();
    gesture::install(session.signals_mut());

    let mut interaction = Interaction::new();
    session.new_interaction(&mut engine, &mut interaction);
    let finger = Pointer::at(PointerId(7), PointerType::Touch, Point::new(40.0, 40.0));
    let raw = RawEvent::default();

    // Press and keep still.
    session.pointer_down(&mut engine, &mut interaction, finger, &raw, 2);
    let held = engine.advance_timers(&mut interaction, 1_000);
    session.pointer_up(&mut engine, &mut interaction, finger, &raw, 2);
    println!("== Hold ==\n  {:?}", log.borrow());
    assert_eq!(held.len(), 1);
    assert_eq!(log.borrow()[0], ("photo", PointerEventType::Hold));
    log.borrow_mut().clear();

    // Two quick taps, well after the release above.
    let _ = engine.advance_timers(&mut interaction, 2_000);
    session.pointer_down(&mut engine, &mut interaction, finger, &raw, 2);
    session.pointer_up(&mut engine, &mut interaction, finger, &raw, 2);
    let _ = engine.advance_timers(&mut interaction, 2_120);
    session.pointer_down(&mut engine, &mut interaction, finger, &raw, 2);
    session.pointer_up(&mut engine, &mut interaction, finger, &raw, 2);
    println!("== Taps ==\n  {:?}", log.borrow());

    let double_taps = log
        .borrow()
        .iter()
        .filter(|(_, kind)| *kind == PointerEventType::DoubleTap)
        .count();
    // Both handlers are on the path, so each sees the double tap.
    assert_eq!(double_taps, 2);
    assert_eq!(
        interaction.prev_tap.map(|t| t.kind),
        Some(PointerEventType::DoubleTap)
    );
}
