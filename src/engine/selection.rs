use serde::Serialize;
use tracing::{debug, trace};
use ulid::Ulid;

use crate::model::*;
use crate::observability;

use super::classify::classify;
use super::{ColumnInputs, GridError};

/// Drag state of one venue column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Button held. `anchor` is the slot the drag began on.
    Dragging { anchor: usize, range: SlotRange },
}

impl DragState {
    pub fn selection(&self) -> Selection {
        match self {
            DragState::Idle => Selection::Empty,
            DragState::Dragging { range, .. } => Selection::Range(*range),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PointerEvent {
    Down(usize),
    Over(usize),
    Up,
    Click(usize),
    /// Pointer-down registered outside the grid's bounds.
    Outside,
    /// The viewed day changed; slot indices no longer mean anything.
    DayChanged,
}

impl PointerEvent {
    pub fn label(&self) -> &'static str {
        match self {
            PointerEvent::Down(_) => "down",
            PointerEvent::Over(_) => "over",
            PointerEvent::Up => "up",
            PointerEvent::Click(_) => "click",
            PointerEvent::Outside => "outside",
            PointerEvent::DayChanged => "day_changed",
        }
    }
}

/// What a transition asks the outside world to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    /// A drag completed; open the booking form for this range.
    RangeSelected(Span),
    /// A booked run was clicked; show this booking's details.
    BookingActivated(Ulid),
}

/// Pure transition: `(state, event) -> (state, effect)`.
///
/// Pointer-down only starts a drag on an `Available` slot, and pointer-over
/// only moves the range onto `Available` or `Selected` slots. The range always
/// spans the anchor and the hovered slot. Read-only columns never select but
/// still activate bookings.
pub fn transition(
    state: DragState,
    event: PointerEvent,
    inputs: &ColumnInputs<'_, '_>,
    can_select: bool,
) -> Result<(DragState, Option<Effect>), GridError> {
    let ColumnInputs { grid, bookings, now } = *inputs;
    match (state, event) {
        (_, PointerEvent::Down(i)) => {
            let view = classify(grid, i, now, bookings, Selection::Empty)?;
            if can_select && view.status == SlotStatus::Available {
                let range = SlotRange { lower: i, upper: i };
                return Ok((DragState::Dragging { anchor: i, range }, None));
            }
            Ok((state, None))
        }
        (DragState::Dragging { anchor, range }, PointerEvent::Over(j)) => {
            let view = classify(grid, j, now, bookings, state.selection())?;
            match view.status {
                SlotStatus::Available | SlotStatus::Selected => {
                    let range = SlotRange::spanning(anchor, j);
                    Ok((DragState::Dragging { anchor, range }, None))
                }
                _ => {
                    trace!(
                        slot = j,
                        status = observability::status_label(view.status),
                        ?range,
                        "hover refused"
                    );
                    Ok((state, None))
                }
            }
        }
        (DragState::Idle, PointerEvent::Over(j)) => {
            grid.slot_start(j)?;
            Ok((state, None))
        }
        (DragState::Dragging { range, .. }, PointerEvent::Up) => {
            let span = grid.range_span(range)?;
            Ok((DragState::Idle, Some(Effect::RangeSelected(span))))
        }
        (DragState::Idle, PointerEvent::Up) => Ok((state, None)),
        (_, PointerEvent::Click(i)) => {
            let view = classify(grid, i, now, bookings, state.selection())?;
            Ok((state, view.booking.map(|b| Effect::BookingActivated(b.id))))
        }
        (_, PointerEvent::Outside | PointerEvent::DayChanged) => Ok((DragState::Idle, None)),
    }
}

/// Owns the drag state of exactly one venue column.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    state: DragState,
    read_only: bool,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// A controller for viewers who may look but not book.
    pub fn read_only() -> Self {
        Self {
            state: DragState::Idle,
            read_only: true,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn selection(&self) -> Selection {
        self.state.selection()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Apply one pointer event. On error the state is left untouched.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        inputs: &ColumnInputs<'_, '_>,
    ) -> Result<Option<Effect>, GridError> {
        count_event(event);
        let before = self.state;
        let (after, effect) = transition(before, event, inputs, !self.read_only)?;

        if let PointerEvent::Outside | PointerEvent::DayChanged = event {
            log_cancelled(before, event);
        }
        match effect {
            Some(Effect::RangeSelected(span)) => {
                debug!(start = span.start, end = span.end, "range selected");
                metrics::counter!(observability::RANGES_SELECTED_TOTAL).increment(1);
            }
            Some(Effect::BookingActivated(id)) => {
                debug!(booking = %id, "booking activated");
                metrics::counter!(observability::BOOKINGS_ACTIVATED_TOTAL).increment(1);
            }
            None if before != after => trace!(?before, ?after, "drag state changed"),
            None => {}
        }

        self.state = after;
        Ok(effect)
    }

    /// Pointer-down outside the column. Needs no inputs and cannot fail.
    pub fn cancel(&mut self) {
        count_event(PointerEvent::Outside);
        log_cancelled(self.state, PointerEvent::Outside);
        self.state = DragState::Idle;
    }
}

fn count_event(event: PointerEvent) {
    metrics::counter!(observability::POINTER_EVENTS_TOTAL, "event" => event.label())
        .increment(1);
}

fn log_cancelled(before: DragState, reason: PointerEvent) {
    if let DragState::Dragging { range, .. } = before {
        debug!(?range, reason = reason.label(), "drag cancelled");
        metrics::counter!(observability::DRAGS_CANCELLED_TOTAL, "reason" => reason.label())
            .increment(1);
    }
}
