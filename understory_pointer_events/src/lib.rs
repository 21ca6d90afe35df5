// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_pointer_events --heading-base-level=0

//! Understory Pointer Events: deterministic, `no_std` pointer event dispatch with hold, tap and
//! double-tap recognition.
//!
//! ## Overview
//!
//! This crate turns a stream of raw pointer occurrences (down, move, up, cancel) into pointer
//! events delivered to handlers bound to UI elements.
//! It does not perform hit testing: each occurrence arrives with the element it originated from,
//! and an [`ElementTree`](crate::tree::ElementTree) supplies that element's ancestors.
//!
//! ## Pieces
//!
//! - [`Signals`](crate::signals::Signals): the engine's channels. Registrants on
//!   `collect-targets` decide which handlers observe an event; observers on `fired` see every
//!   completed dispatch.
//! - [`Dispatcher`](crate::dispatcher::Dispatcher): owns handlers, channels, the element tree
//!   and a [`Scheduler`](crate::timer::Scheduler). [`fire`](crate::dispatcher::Dispatcher::fire)
//!   walks the targets in bubbling order, shifting coordinates into each handler's origin and
//!   honoring stop requests.
//! - [`collect_event_targets`](crate::dispatcher::Dispatcher::collect_event_targets): asks the
//!   registrants about each ancestor, closest first, and applies the `tap` and `hold` filters.
//! - [`gesture`](crate::gesture): hold timers, tap and passthrough dispatch, wired onto a
//!   [`SessionSignals`](crate::session::SessionSignals) bus with
//!   [`gesture::install`](crate::gesture::install).
//! - [`Session`](crate::session::Session): a reference upstream driver maintaining the
//!   [`Interaction`](crate::interaction::Interaction) state the engine reads.
//!
//! ## Timers
//!
//! Nothing here sleeps. Hold recognition schedules timeouts on the
//! [`Scheduler`](crate::timer::Scheduler), and the host hands elapsed ones back through
//! [`hold_elapsed`](crate::dispatcher::Dispatcher::hold_elapsed).
//! [`ManualScheduler`](crate::timer::ManualScheduler) is a deterministic clock for tests and
//! frame-driven hosts.
//!
//! ## Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use kurbo::Point;
//! use understory_pointer_events::dispatcher::Dispatcher;
//! use understory_pointer_events::eventable::Listeners;
//! use understory_pointer_events::gesture;
//! use understory_pointer_events::interaction::Interaction;
//! use understory_pointer_events::session::Session;
//! use understory_pointer_events::targets::ElementTargets;
//! use understory_pointer_events::timer::ManualScheduler;
//! use understory_pointer_events::tree::ElementTree;
//! use understory_pointer_events::types::{
//!     Pointer, PointerEventType, PointerId, PointerType, RawEvent,
//! };
//!
//! // A button (2) inside a panel (1).
//! struct Ui;
//! impl ElementTree<u32> for Ui {
//!     fn parent_of(&self, element: &u32) -> Option<u32> {
//!         (*element == 2).then_some(1)
//!     }
//! }
//!
//! let mut engine: Dispatcher<u32, Ui, ManualScheduler<u32>> =
//!     Dispatcher::new(Ui, ManualScheduler::new());
//!
//! let taps = Rc::new(Cell::new(0));
//! let counter = taps.clone();
//! let button = engine.insert_eventable(
//!     Listeners::new().with(PointerEventType::Tap, move |_| counter.set(counter.get() + 1)),
//! );
//! let mut bindings = ElementTargets::new();
//! bindings.bind(2, button);
//! bindings.install(engine.signals_mut());
//!
//! let mut session = Session::new();
//! gesture::install(session.signals_mut());
//!
//! let mut interaction = Interaction::new();
//! session.new_interaction(&mut engine, &mut interaction);
//! let pointer = Pointer::at(PointerId(1), PointerType::Touch, Point::new(4.0, 4.0));
//! session.pointer_down(&mut engine, &mut interaction, pointer, &RawEvent::default(), 2);
//! session.pointer_up(&mut engine, &mut interaction, pointer, &RawEvent::default(), 2);
//!
//! assert_eq!(taps.get(), 1);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod collect;
pub mod dispatcher;
pub mod event;
pub mod eventable;
pub mod gesture;
pub mod interaction;
pub mod session;
pub mod signals;
pub mod tap;
pub mod targets;
pub mod timer;
pub mod tree;
pub mod types;
