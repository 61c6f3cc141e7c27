mod classify;
mod error;
pub(crate) mod grid;
mod overlay;
mod runs;
mod selection;

pub use classify::{PRIORITY, SlotView, classify, classify_all};
pub use error::GridError;
pub use grid::{SlotGrid, day_floor};
pub use overlay::{OverlayCard, OverlaySpan, overlay_card, overlay_span};
pub use runs::{Run, compact, expand, run_at};
pub use selection::{DragState, Effect, PointerEvent, SelectionController, transition};

use std::time::Instant;

use ulid::Ulid;

use crate::config::GridMetrics;
use crate::model::*;
use crate::observability;

/// Read-only inputs of one classification pass over one venue-day.
#[derive(Debug, Clone, Copy)]
pub struct ColumnInputs<'g, 'b> {
    pub grid: &'g SlotGrid,
    /// Bookings for this venue and day, in the order they were supplied.
    pub bookings: &'b [Booking],
    pub now: Ms,
}

/// Everything needed to draw one venue column for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFrame<'a> {
    pub venue_id: Ulid,
    pub slots: Vec<SlotView<'a>>,
    pub runs: Vec<Run>,
    pub overlays: Vec<OverlayCard>,
}

impl ColumnFrame<'_> {
    /// The booking a click on `slot` should open, if the slot is booked.
    pub fn booking_at(&self, slot: usize) -> Option<Ulid> {
        self.slots.get(slot).and_then(|s| s.booking).map(|b| b.id)
    }
}

/// One render pass: classify every slot with `now` coarsened to the stride,
/// compact into runs and lay out the booking cards.
pub fn render_column<'b>(
    venue_id: Ulid,
    inputs: &ColumnInputs<'_, 'b>,
    selection: Selection,
    geometry: &GridMetrics,
    viewer: Option<Ulid>,
) -> Result<ColumnFrame<'b>, GridError> {
    let started = Instant::now();
    for b in inputs.bookings {
        b.validate()?;
    }
    let now = inputs.grid.coarsen_now(inputs.now);
    let slots = classify_all(inputs.grid, now, inputs.bookings, selection)?;
    let runs = compact(&slots);
    let overlays = inputs
        .bookings
        .iter()
        .filter_map(|b| overlay_card(inputs.grid, b, geometry, viewer))
        .collect();
    metrics::histogram!(observability::RENDER_DURATION_SECONDS)
        .record(started.elapsed().as_secs_f64());
    Ok(ColumnFrame {
        venue_id,
        slots,
        runs,
        overlays,
    })
}
