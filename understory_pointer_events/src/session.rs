// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Outer session bus and a reference upstream driver.
//!
//! ## Channels
//!
//! [`SessionSignals`] carries the raw input stream of one or more interactions:
//!
//! - `new`: an interaction was created.
//! - `update-pointer`: a pointer record was added or refreshed; `down` tells whether the
//!   refresh comes from a press.
//! - `down`, `move`, `up`, `cancel`: raw occurrences for one pointer.
//!
//! Listeners receive a mutable context `C` (typically the
//! [`Dispatcher`](crate::dispatcher::Dispatcher)) and the channel's payload.
//! This namespace is separate from the engine's own [`Signals`](crate::signals::Signals).
//!
//! ## Driver
//!
//! [`Session`] owns a [`SessionSignals`] and keeps the [`Interaction`] fields the engine reads
//! (pointer list, press target, `pointer_is_down`, `pointer_was_moved`) up to date, so the
//! engine can be driven without a windowing layer. Hosts with their own input pipeline can
//! fire the channels directly instead.

use alloc::boxed::Box;

use crate::interaction::{Interaction, PointerInfo};
use crate::signals::Channel;
use crate::types::{Pointer, RawEvent};

/// Payload of `new`.
#[derive(Debug)]
pub struct NewSignal<'a, E, M = ()> {
    /// The interaction that was created.
    pub interaction: &'a mut Interaction<E, M>,
}

/// Payload of `update-pointer`.
#[derive(Debug)]
pub struct UpdatePointerSignal<'a, E> {
    /// The refreshed record.
    pub pointer_info: &'a mut PointerInfo<E>,
    /// Index of the record in the interaction's pointer list.
    pub pointer_index: usize,
    /// Whether the refresh comes from a press.
    pub down: bool,
}

/// Payload of `down`, `up` and `cancel`.
#[derive(Debug)]
pub struct PointerSignal<'a, E, M = ()> {
    /// Interaction the pointer belongs to.
    pub interaction: &'a mut Interaction<E, M>,
    /// Pointer sample.
    pub pointer: &'a Pointer,
    /// Raw occurrence.
    pub raw: &'a RawEvent,
    /// Element the occurrence originated from.
    pub event_target: &'a E,
    /// Index of the pointer's record in `interaction.pointers`.
    pub pointer_index: usize,
}

/// Payload of `move`.
#[derive(Debug)]
pub struct MoveSignal<'a, E, M = ()> {
    /// Interaction the pointer belongs to.
    pub interaction: &'a mut Interaction<E, M>,
    /// Pointer sample.
    pub pointer: &'a Pointer,
    /// Raw occurrence.
    pub raw: &'a RawEvent,
    /// Element the occurrence originated from.
    pub event_target: &'a E,
    /// Index of the pointer's record in `interaction.pointers`.
    pub pointer_index: usize,
    /// The sample repeats the previous coordinates of this pointer.
    pub duplicate_move: bool,
}

/// Listener type of `new`.
pub type NewListener<C, E, M> = dyn FnMut(&mut C, &mut NewSignal<'_, E, M>);
/// Listener type of `update-pointer`.
pub type UpdatePointerListener<C, E> = dyn FnMut(&mut C, &mut UpdatePointerSignal<'_, E>);
/// Listener type of `down`, `up` and `cancel`.
pub type PointerListener<C, E, M> = dyn FnMut(&mut C, &mut PointerSignal<'_, E, M>);
/// Listener type of `move`.
pub type MoveListener<C, E, M> = dyn FnMut(&mut C, &mut MoveSignal<'_, E, M>);

/// The session channels.
pub struct SessionSignals<C, E, M = ()> {
    new: Channel<NewListener<C, E, M>>,
    update_pointer: Channel<UpdatePointerListener<C, E>>,
    down: Channel<PointerListener<C, E, M>>,
    move_: Channel<MoveListener<C, E, M>>,
    up: Channel<PointerListener<C, E, M>>,
    cancel: Channel<PointerListener<C, E, M>>,
}

impl<C, E, M> core::fmt::Debug for SessionSignals<C, E, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionSignals")
            .field("new", &self.new)
            .field("update_pointer", &self.update_pointer)
            .field("down", &self.down)
            .field("move", &self.move_)
            .field("up", &self.up)
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl<C, E, M> Default for SessionSignals<C, E, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, E, M> SessionSignals<C, E, M> {
    /// Channels with no listeners.
    pub fn new() -> Self {
        Self {
            new: Channel::new(),
            update_pointer: Channel::new(),
            down: Channel::new(),
            move_: Channel::new(),
            up: Channel::new(),
            cancel: Channel::new(),
        }
    }

    /// Register a `new` listener.
    pub fn on_new(&mut self, listener: impl FnMut(&mut C, &mut NewSignal<'_, E, M>) + 'static) {
        self.new.push(Box::new(listener));
    }

    /// Register an `update-pointer` listener.
    pub fn on_update_pointer(
        &mut self,
        listener: impl FnMut(&mut C, &mut UpdatePointerSignal<'_, E>) + 'static,
    ) {
        self.update_pointer.push(Box::new(listener));
    }

    /// Register a `down` listener.
    pub fn on_down(&mut self, listener: impl FnMut(&mut C, &mut PointerSignal<'_, E, M>) + 'static) {
        self.down.push(Box::new(listener));
    }

    /// Register a `move` listener.
    pub fn on_move(&mut self, listener: impl FnMut(&mut C, &mut MoveSignal<'_, E, M>) + 'static) {
        self.move_.push(Box::new(listener));
    }

    /// Register an `up` listener.
    pub fn on_up(&mut self, listener: impl FnMut(&mut C, &mut PointerSignal<'_, E, M>) + 'static) {
        self.up.push(Box::new(listener));
    }

    /// Register a `cancel` listener.
    pub fn on_cancel(
        &mut self,
        listener: impl FnMut(&mut C, &mut PointerSignal<'_, E, M>) + 'static,
    ) {
        self.cancel.push(Box::new(listener));
    }

    /// Fire `new`.
    pub fn fire_new(&mut self, ctx: &mut C, payload: &mut NewSignal<'_, E, M>) {
        for listener in self.new.iter_mut() {
            listener(ctx, payload);
        }
    }

    /// Fire `update-pointer`.
    pub fn fire_update_pointer(&mut self, ctx: &mut C, payload: &mut UpdatePointerSignal<'_, E>) {
        for listener in self.update_pointer.iter_mut() {
            listener(ctx, payload);
        }
    }

    /// Fire `down`.
    pub fn fire_down(&mut self, ctx: &mut C, payload: &mut PointerSignal<'_, E, M>) {
        for listener in self.down.iter_mut() {
            listener(ctx, payload);
        }
    }

    /// Fire `move`.
    pub fn fire_move(&mut self, ctx: &mut C, payload: &mut MoveSignal<'_, E, M>) {
        for listener in self.move_.iter_mut() {
            listener(ctx, payload);
        }
    }

    /// Fire `up`.
    pub fn fire_up(&mut self, ctx: &mut C, payload: &mut PointerSignal<'_, E, M>) {
        for listener in self.up.iter_mut() {
            listener(ctx, payload);
        }
    }

    /// Fire `cancel`.
    pub fn fire_cancel(&mut self, ctx: &mut C, payload: &mut PointerSignal<'_, E, M>) {
        for listener in self.cancel.iter_mut() {
            listener(ctx, payload);
        }
    }
}

/// Default distance, in page units, a pressed pointer may travel before it counts as moved.
pub const DEFAULT_MOVE_TOLERANCE: f64 = 1.0;

/// Reference upstream driver: turns raw pointer occurrences into session signals.
///
/// All methods take the listener context `ctx` and the target [`Interaction`] explicitly,
/// so one driver can serve several interactions.
pub struct Session<C, E, M = ()> {
    signals: SessionSignals<C, E, M>,
    /// Distance a pressed pointer may travel before `pointer_was_moved` is set.
    pub move_tolerance: f64,
}

impl<C, E, M> core::fmt::Debug for Session<C, E, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("signals", &self.signals)
            .field("move_tolerance", &self.move_tolerance)
            .finish()
    }
}

impl<C, E: Clone, M> Default for Session<C, E, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, E: Clone, M> Session<C, E, M> {
    /// A driver with no listeners and the default move tolerance.
    pub fn new() -> Self {
        Self {
            signals: SessionSignals::new(),
            move_tolerance: DEFAULT_MOVE_TOLERANCE,
        }
    }

    /// The session channels, for registration.
    pub fn signals_mut(&mut self) -> &mut SessionSignals<C, E, M> {
        &mut self.signals
    }

    /// Announce a freshly created interaction.
    pub fn new_interaction(&mut self, ctx: &mut C, interaction: &mut Interaction<E, M>) {
        self.signals.fire_new(ctx, &mut NewSignal { interaction });
    }

    /// A pointer was pressed over `event_target`.
    pub fn pointer_down(
        &mut self,
        ctx: &mut C,
        interaction: &mut Interaction<E, M>,
        pointer: Pointer,
        raw: &RawEvent,
        event_target: E,
    ) {
        let pointer_index = self.update_pointer(ctx, interaction, pointer, true);
        if let Some(info) = interaction.pointers.get_mut(pointer_index) {
            info.down_target = Some(event_target.clone());
            info.down_page = pointer.page;
            info.down_time = raw.time_stamp;
        }
        interaction.pointer_is_down = true;
        interaction.pointer_was_moved = false;
        self.signals.fire_down(
            ctx,
            &mut PointerSignal {
                interaction,
                pointer: &pointer,
                raw,
                event_target: &event_target,
                pointer_index,
            },
        );
    }

    /// A pointer moved over `event_target`. Unknown pointers are tracked as hovering.
    pub fn pointer_move(
        &mut self,
        ctx: &mut C,
        interaction: &mut Interaction<E, M>,
        pointer: Pointer,
        raw: &RawEvent,
        event_target: E,
    ) {
        let duplicate_move = interaction
            .pointer_info(pointer.id)
            .is_some_and(|p| p.pointer.page == pointer.page && p.pointer.client == pointer.client);
        let pointer_index = self.update_pointer(ctx, interaction, pointer, false);

        if interaction.pointer_is_down
            && !interaction.pointer_was_moved
            && let Some(info) = interaction.pointers.get(pointer_index)
            && info.down_target.is_some()
            && (pointer.page - info.down_page).hypot() > self.move_tolerance
        {
            tracing::trace!(id = pointer.id.0, "pointer moved beyond tolerance");
            interaction.pointer_was_moved = true;
        }

        self.signals.fire_move(
            ctx,
            &mut MoveSignal {
                interaction,
                pointer: &pointer,
                raw,
                event_target: &event_target,
                pointer_index,
                duplicate_move,
            },
        );
    }

    /// A pointer was released over `event_target`.
    pub fn pointer_up(
        &mut self,
        ctx: &mut C,
        interaction: &mut Interaction<E, M>,
        pointer: Pointer,
        raw: &RawEvent,
        event_target: E,
    ) {
        let pointer_index = self.update_pointer(ctx, interaction, pointer, false);
        self.signals.fire_up(
            ctx,
            &mut PointerSignal {
                interaction: &mut *interaction,
                pointer: &pointer,
                raw,
                event_target: &event_target,
                pointer_index,
            },
        );
        Self::release(interaction, pointer);
    }

    /// A pointer's gesture was aborted by the platform.
    pub fn pointer_cancel(
        &mut self,
        ctx: &mut C,
        interaction: &mut Interaction<E, M>,
        pointer: Pointer,
        raw: &RawEvent,
        event_target: E,
    ) {
        let pointer_index = self.update_pointer(ctx, interaction, pointer, false);
        self.signals.fire_cancel(
            ctx,
            &mut PointerSignal {
                interaction: &mut *interaction,
                pointer: &pointer,
                raw,
                event_target: &event_target,
                pointer_index,
            },
        );
        Self::release(interaction, pointer);
    }

    /// Add or refresh the record for `pointer`, announce it, and return its index.
    fn update_pointer(
        &mut self,
        ctx: &mut C,
        interaction: &mut Interaction<E, M>,
        pointer: Pointer,
        down: bool,
    ) -> usize {
        let pointer_index = match interaction.pointer_index(pointer.id) {
            Some(i) => i,
            None => {
                interaction.pointers.push(PointerInfo::new(pointer));
                interaction.pointers.len() - 1
            }
        };
        if let Some(pointer_info) = interaction.pointers.get_mut(pointer_index) {
            pointer_info.pointer = pointer;
            self.signals.fire_update_pointer(
                ctx,
                &mut UpdatePointerSignal {
                    pointer_info,
                    pointer_index,
                    down,
                },
            );
        }
        pointer_index
    }

    fn release(interaction: &mut Interaction<E, M>, pointer: Pointer) {
        if let Some(i) = interaction.pointer_index(pointer.id) {
            interaction.pointers.remove(i);
        }
        interaction.pointer_is_down = interaction
            .pointers
            .iter()
            .any(|p| p.down_target.is_some());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PointerId, PointerType};
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use kurbo::Point;

    type Log = Vec<String>;

    fn at(x: f64, y: f64) -> Pointer {
        Pointer::at(PointerId(1), PointerType::Touch, Point::new(x, y))
    }

    fn recording_session() -> Session<Log, u32> {
        let mut s: Session<Log, u32> = Session::new();
        let sig = s.signals_mut();
        sig.on_new(|log, _| log.push("new".into()));
        sig.on_update_pointer(|log, p| {
            log.push(alloc::format!("update {} {}", p.pointer_index, p.down));
        });
        sig.on_down(|log, p| log.push(alloc::format!("down {}", p.event_target)));
        sig.on_move(|log, p| {
            log.push(alloc::format!(
                "move dup={} moved={}",
                p.duplicate_move, p.interaction.pointer_was_moved
            ));
        });
        sig.on_up(|log, p| log.push(alloc::format!("up {}", p.interaction.pointers.len())));
        sig.on_cancel(|log, _| log.push("cancel".into()));
        s
    }

    #[test]
    fn press_move_release_sequence() {
        let mut s = recording_session();
        let mut log = Log::new();
        let mut interaction: Interaction<u32> = Interaction::new();
        let raw = RawEvent::default();

        s.new_interaction(&mut log, &mut interaction);
        s.pointer_down(&mut log, &mut interaction, at(10.0, 10.0), &raw, 7);
        assert!(interaction.pointer_is_down);
        assert_eq!(interaction.pointers[0].down_target, Some(7));

        // Within tolerance: not yet moved.
        s.pointer_move(&mut log, &mut interaction, at(10.5, 10.0), &raw, 7);
        // Same coordinates again: duplicate.
        s.pointer_move(&mut log, &mut interaction, at(10.5, 10.0), &raw, 7);
        s.pointer_move(&mut log, &mut interaction, at(20.0, 10.0), &raw, 7);
        s.pointer_up(&mut log, &mut interaction, at(20.0, 10.0), &raw, 7);

        assert_eq!(
            log,
            vec![
                "new",
                "update 0 true",
                "down 7",
                "update 0 false",
                "move dup=false moved=false",
                "update 0 false",
                "move dup=true moved=false",
                "update 0 false",
                "move dup=false moved=true",
                "update 0 false",
                "up 1",
            ]
        );
        assert!(interaction.pointers.is_empty());
        assert!(!interaction.pointer_is_down);
    }

    #[test]
    fn hover_move_tracks_an_unpressed_pointer() {
        let mut s = recording_session();
        let mut log = Log::new();
        let mut interaction: Interaction<u32> = Interaction::new();
        s.pointer_move(&mut log, &mut interaction, at(1.0, 1.0), &RawEvent::default(), 3);
        assert_eq!(interaction.pointers.len(), 1);
        assert_eq!(interaction.pointers[0].down_target, None);
        assert!(!interaction.pointer_is_down);
        assert!(!interaction.pointer_was_moved);
    }

    #[test]
    fn releasing_one_of_two_pointers_keeps_interaction_down() {
        let mut s = recording_session();
        let mut log = Log::new();
        let mut interaction: Interaction<u32> = Interaction::new();
        let raw = RawEvent::default();
        let second = Pointer::at(PointerId(2), PointerType::Touch, Point::new(50.0, 50.0));
        s.pointer_down(&mut log, &mut interaction, at(0.0, 0.0), &raw, 1);
        s.pointer_down(&mut log, &mut interaction, second, &raw, 2);
        s.pointer_cancel(&mut log, &mut interaction, at(0.0, 0.0), &raw, 1);
        assert!(interaction.pointer_is_down);
        assert_eq!(interaction.pointers.len(), 1);
        assert_eq!(interaction.pointers[0].pointer.id, PointerId(2));
        assert_eq!(log.last().map(String::as_str), Some("cancel"));
    }

    #[test]
    fn move_tolerance_is_configurable() {
        let mut s = recording_session();
        s.move_tolerance = 0.0;
        let mut log = Log::new();
        let mut interaction: Interaction<u32> = Interaction::new();
        let raw = RawEvent::default();
        s.pointer_down(&mut log, &mut interaction, at(10.0, 10.0), &raw, 7);
        s.pointer_move(&mut log, &mut interaction, at(10.5, 10.0), &raw, 7);
        assert!(interaction.pointer_was_moved);
    }
}
