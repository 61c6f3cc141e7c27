use serde::Serialize;
use ulid::Ulid;

use crate::config::GridMetrics;
use crate::model::*;

use super::SlotGrid;

/// Absolute placement of a booking card over the grid, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlaySpan {
    pub top: f64,
    pub height: f64,
}

/// A booking rendered as a floating card rather than as grid cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayCard {
    pub booking_id: Ulid,
    pub span: OverlaySpan,
    /// Height in slots, rounded to the nearest slot.
    pub slots: i64,
    pub label: String,
    /// Second line, only on cards taller than one slot.
    pub secondary: Option<String>,
    pub owned_by_viewer: bool,
}

/// Nearest whole number of strides in `ms`, halves rounding up.
fn round_slots(ms: Ms, stride: Ms) -> i64 {
    (ms as f64 / stride as f64 + 0.5).floor() as i64
}

/// Card geometry for `span` on `grid`:
/// `top = round((from - day_start) / stride) * pitch` and
/// `height = round((to - from) / stride) * pitch - borders`.
pub fn overlay_span(grid: &SlotGrid, span: Span, metrics: &GridMetrics) -> (OverlaySpan, i64) {
    let stride = grid.stride();
    let slots = round_slots(span.duration_ms(), stride);
    let top_slots = round_slots(span.start - grid.day_start(), stride);
    let pitch = metrics.cell_pitch_px();
    let geometry = OverlaySpan {
        top: top_slots as f64 * pitch,
        height: slots as f64 * pitch - metrics.border_adjustment_px(),
    };
    (geometry, slots)
}

/// Build the card for `booking`, clipped to the grid's day. Returns `None`
/// for bookings that don't touch the day.
pub fn overlay_card(
    grid: &SlotGrid,
    booking: &Booking,
    metrics: &GridMetrics,
    viewer: Option<Ulid>,
) -> Option<OverlayCard> {
    let visible = booking.span().clip(&grid.day())?;
    let (span, slots) = overlay_span(grid, visible, metrics);
    let secondary = (slots > 1).then(|| {
        booking
            .org_name
            .clone()
            .unwrap_or_else(|| booking.owner_id.to_string())
    });
    Some(OverlayCard {
        booking_id: booking.id,
        span,
        slots,
        label: booking.label.clone(),
        secondary,
        owned_by_viewer: viewer == Some(booking.owner_id),
    })
}
