// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types: pointer identity, event kinds, targets, options, and origins.
//!
//! ## Overview
//!
//! These types describe the inputs the engine consumes from the upstream session
//! and the target entries it routes to.
//! They are shared by the [`dispatcher`](crate::dispatcher), target collection and the
//! [`gesture`](crate::gesture) controller.

use kurbo::Point;

/// Default minimum press duration, in milliseconds, before a `hold` is recognized.
pub const DEFAULT_HOLD_DURATION: u64 = 600;

/// Kinds of pointer events produced by the engine.
///
/// `Down`, `Move`, `Up` and `Cancel` mirror the raw stream; `Tap`, `DoubleTap` and `Hold`
/// are derived from its timing and movement.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PointerEventType {
    /// A pointer was pressed.
    Down,
    /// A pointer moved.
    Move,
    /// A pointer was released.
    Up,
    /// The pointer stream was cancelled.
    Cancel,
    /// Press and release on the same target without movement in between.
    Tap,
    /// A tap correlated with the previous one.
    DoubleTap,
    /// A press held for at least the minimum configured duration.
    Hold,
}

impl PointerEventType {
    /// Every kind, in the order they are documented.
    pub const ALL: [Self; 7] = [
        Self::Down,
        Self::Move,
        Self::Up,
        Self::Cancel,
        Self::Tap,
        Self::DoubleTap,
        Self::Hold,
    ];

    /// Lowercase event name, e.g. `"doubletap"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Move => "move",
            Self::Up => "up",
            Self::Cancel => "cancel",
            Self::Tap => "tap",
            Self::DoubleTap => "doubletap",
            Self::Hold => "hold",
        }
    }
}

bitflags::bitflags! {
    /// Set of event kinds a handler listens to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EventKinds: u8 {
        /// [`PointerEventType::Down`].
        const DOWN       = 0b0000_0001;
        /// [`PointerEventType::Move`].
        const MOVE       = 0b0000_0010;
        /// [`PointerEventType::Up`].
        const UP         = 0b0000_0100;
        /// [`PointerEventType::Cancel`].
        const CANCEL     = 0b0000_1000;
        /// [`PointerEventType::Tap`].
        const TAP        = 0b0001_0000;
        /// [`PointerEventType::DoubleTap`].
        const DOUBLE_TAP = 0b0010_0000;
        /// [`PointerEventType::Hold`].
        const HOLD       = 0b0100_0000;
    }
}

impl From<PointerEventType> for EventKinds {
    fn from(kind: PointerEventType) -> Self {
        match kind {
            PointerEventType::Down => Self::DOWN,
            PointerEventType::Move => Self::MOVE,
            PointerEventType::Up => Self::UP,
            PointerEventType::Cancel => Self::CANCEL,
            PointerEventType::Tap => Self::TAP,
            PointerEventType::DoubleTap => Self::DOUBLE_TAP,
            PointerEventType::Hold => Self::HOLD,
        }
    }
}

/// Stable identity of a contact point, assigned by the input layer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct PointerId(pub u32);

/// Device class of a pointer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum PointerType {
    /// Mouse or trackpad.
    #[default]
    Mouse,
    /// Finger on a touch surface.
    Touch,
    /// Stylus.
    Pen,
}

/// A pointer sample as delivered by the upstream session.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pointer {
    /// Identity, stable for the lifetime of the contact.
    pub id: PointerId,
    /// Device class.
    pub pointer_type: PointerType,
    /// Position in page space.
    pub page: Point,
    /// Position in viewport space.
    pub client: Point,
}

impl Pointer {
    /// A pointer whose page and client positions coincide.
    pub fn at(id: PointerId, pointer_type: PointerType, pos: Point) -> Self {
        Self {
            id,
            pointer_type,
            page: pos,
            client: pos,
        }
    }
}

/// Raw input occurrence data that is not part of the pointer sample.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RawEvent {
    /// Time of the occurrence in milliseconds, on the session clock.
    pub time_stamp: u64,
    /// Pressed button mask.
    pub buttons: u16,
}

/// Handle of a registered [`Eventable`](crate::eventable::Eventable).
///
/// Returned by [`Eventables::insert`](crate::eventable::Eventables::insert).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EventableId(pub(crate) u32);

impl EventableId {
    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// One entry of a dispatch: a handler bound to an element, plus extra properties.
///
/// Produced transiently by the target collector for a single dispatch.
/// `props` is copied onto the [`PointerEvent`](crate::event::PointerEvent) before the
/// handler runs, replacing whatever the previous target contributed.
#[derive(Clone, Debug, PartialEq)]
pub struct Target<E, M = ()> {
    /// Handler that receives the event.
    pub eventable: EventableId,
    /// Element the handler is bound to; becomes the event's `current_target`.
    pub element: E,
    /// Extra properties merged onto the event for this target only.
    pub props: M,
}

/// Coordinate origin a handler wants its events expressed in.
#[derive(Clone, Debug, PartialEq)]
pub enum Origin<E> {
    /// A fixed page-space point.
    Point(Point),
    /// Top-left of the bound element's parent.
    Parent,
    /// Top-left of the bound element itself.
    SelfElement,
    /// Top-left of the given element.
    Element(E),
}

impl<E> Default for Origin<E> {
    fn default() -> Self {
        Self::Point(Point::ZERO)
    }
}

/// Engine-wide defaults for pointer event handlers.
///
/// Per-handler overrides live in [`EventableOptions`] and are resolved against these.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerEventOptions<E> {
    /// Minimum press duration before `hold`, in milliseconds.
    pub hold_duration: u64,
    /// Coordinate origin for dispatched events.
    pub origin: Origin<E>,
    /// When set, only events whose path passes through this element are accepted.
    pub allow_from: Option<E>,
    /// When set, events whose path passes through this element are rejected.
    pub ignore_from: Option<E>,
}

impl<E> Default for PointerEventOptions<E> {
    fn default() -> Self {
        Self {
            hold_duration: DEFAULT_HOLD_DURATION,
            origin: Origin::default(),
            allow_from: None,
            ignore_from: None,
        }
    }
}

/// Per-handler option overrides; `None` falls back to [`PointerEventOptions`].
#[derive(Clone, Debug, PartialEq)]
pub struct EventableOptions<E> {
    /// Overrides [`PointerEventOptions::hold_duration`].
    pub hold_duration: Option<u64>,
    /// Overrides [`PointerEventOptions::origin`].
    pub origin: Option<Origin<E>>,
    /// Overrides [`PointerEventOptions::allow_from`].
    pub allow_from: Option<E>,
    /// Overrides [`PointerEventOptions::ignore_from`].
    pub ignore_from: Option<E>,
}

impl<E> Default for EventableOptions<E> {
    fn default() -> Self {
        Self {
            hold_duration: None,
            origin: None,
            allow_from: None,
            ignore_from: None,
        }
    }
}

impl<E: Clone> EventableOptions<E> {
    /// Fill unset fields from `defaults`.
    pub fn resolve(&self, defaults: &PointerEventOptions<E>) -> PointerEventOptions<E> {
        PointerEventOptions {
            hold_duration: self.hold_duration.unwrap_or(defaults.hold_duration),
            origin: self
                .origin
                .clone()
                .unwrap_or_else(|| defaults.origin.clone()),
            allow_from: self
                .allow_from
                .clone()
                .or_else(|| defaults.allow_from.clone()),
            ignore_from: self
                .ignore_from
                .clone()
                .or_else(|| defaults.ignore_from.clone()),
        }
    }
}
