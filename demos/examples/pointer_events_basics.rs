// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bubbling dispatch with local coordinates and stop propagation.
//!
//! A list item (3) sits in a list (2) inside a window (1). Handlers on each element log what
//! they see; the list stops propagation so the window never hears about the press.
//!
//! Run:
//! - `cargo run -p understory_examples --example pointer_events_basics`

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Point;
use understory_pointer_events::dispatcher::{Dispatcher, FireArgs};
use understory_pointer_events::eventable::Listeners;
use understory_pointer_events::interaction::Interaction;
use understory_pointer_events::targets::ElementTargets;
use understory_pointer_events::timer::ManualScheduler;
use understory_pointer_events::tree::ElementTree;
use understory_pointer_events::types::{
    EventableOptions, Origin, Pointer, PointerEventType, PointerId, PointerType, RawEvent,
};

struct Window;
impl ElementTree<u32> for Window {
    fn parent_of(&self, element: &u32) -> Option<u32> {
        match element {
            3 => Some(2),
            2 => Some(1),
            _ => None,
        }
    }

    fn origin_of(&self, element: &u32) -> Option<Point> {
        match element {
            1 => Some(Point::ZERO),
            2 => Some(Point::new(20.0, 40.0)),
            3 => Some(Point::new(20.0, 70.0)),
            _ => None,
        }
    }
}

type Log = Rc<RefCell<Vec<String>>>;

fn logger(log: &Log, name: &'static str, stop: bool) -> Listeners<u32> {
    let log = log.clone();
    Listeners::with_options(EventableOptions {
        origin: Some(Origin::SelfElement),
        ..Default::default()
    })
    .with(PointerEventType::Down, move |ev| {
        log.borrow_mut().push(format!("{name}: down at local {:?}", ev.page));
        if stop {
            ev.stop_propagation();
        }
    })
}

fn main() {
    let mut engine: Dispatcher<u32, Window, ManualScheduler<u32>> =
        Dispatcher::new(Window, ManualScheduler::starting_at(16));
    let log: Log = Rc::default();

    let item = engine.insert_eventable(logger(&log, "item", false));
    let list = engine.insert_eventable(logger(&log, "list", true));
    let window = engine.insert_eventable(logger(&log, "window", false));

    let mut bindings = ElementTargets::new();
    bindings.bind(3, item).bind(2, list).bind(1, window);
    bindings.install(engine.signals_mut());

    let observed = Rc::new(RefCell::new(Vec::new()));
    let o = observed.clone();
    engine.signals_mut().on_fired(move |fired| {
        o.borrow_mut().push((fired.kind, fired.targets.len(), fired.pointer_event.page));
    });

    let mut interaction = Interaction::new();
    let pointer = Pointer::at(PointerId(1), PointerType::Mouse, Point::new(25.0, 75.0));
    let ev = engine.fire(FireArgs::new(
        &mut interaction,
        &pointer,
        &RawEvent::default(),
        &3,
        PointerEventType::Down,
    ));

    println!("== Handlers ==");
    for line in log.borrow().iter() {
        println!("  {line}");
    }
    println!("== Fired ==\n  {:?}", observed.borrow());

    assert_eq!(
        *log.borrow(),
        vec![
            "item: down at local (5.0, 5.0)".to_string(),
            "list: down at local (5.0, 35.0)".to_string(),
        ]
    );
    // Three targets were collected even though only two ran.
    assert_eq!(
        *observed.borrow(),
        vec![(PointerEventType::Down, 3, Point::new(25.0, 75.0))]
    );
    assert_eq!(ev.time_stamp, 16);
    assert!(ev.propagation_stopped);
}
