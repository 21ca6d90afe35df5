// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Double-tap correlation.
//!
//! Whether a tap completes a double tap is a toolkit decision. The dispatcher asks a
//! [`TapPolicy`] once per freshly built `tap` event and stores the answer in
//! [`PointerEvent::double`]. The default, [`NoDoubleTap`], never correlates.

use crate::event::PointerEvent;
use crate::interaction::Interaction;
use crate::types::PointerEventType;

/// Decides whether a tap completes a double tap.
pub trait TapPolicy<E, M = ()> {
    /// `tap.dt` already holds the time since `interaction.tap_time`.
    fn is_double(&self, interaction: &Interaction<E, M>, tap: &PointerEvent<E, M>) -> bool;
}

impl<E, M, F> TapPolicy<E, M> for F
where
    F: Fn(&Interaction<E, M>, &PointerEvent<E, M>) -> bool,
{
    fn is_double(&self, interaction: &Interaction<E, M>, tap: &PointerEvent<E, M>) -> bool {
        self(interaction, tap)
    }
}

/// Never reports a double tap.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoDoubleTap;

impl<E, M> TapPolicy<E, M> for NoDoubleTap {
    fn is_double(&self, _: &Interaction<E, M>, _: &PointerEvent<E, M>) -> bool {
        false
    }
}

/// Reports a double tap when the previous tap hit the same target within `max_interval`.
///
/// A tap that follows a `doubletap` starts a new sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TapInterval {
    /// Longest gap between the two taps, in milliseconds (exclusive).
    pub max_interval: u64,
}

impl<E: PartialEq, M> TapPolicy<E, M> for TapInterval {
    fn is_double(&self, interaction: &Interaction<E, M>, tap: &PointerEvent<E, M>) -> bool {
        interaction.prev_tap.as_ref().is_some_and(|prev| {
            prev.kind != PointerEventType::DoubleTap
                && prev.target == tap.target
                && tap.dt < self.max_interval
        })
    }
}
