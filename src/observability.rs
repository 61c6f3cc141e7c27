use crate::model::SlotStatus;

// ── Interaction metrics ─────────────────────────────────────────

/// Counter: pointer events handled. Labels: event.
pub const POINTER_EVENTS_TOTAL: &str = "slotgrid_pointer_events_total";

/// Counter: drags completed with a committed range.
pub const RANGES_SELECTED_TOTAL: &str = "slotgrid_ranges_selected_total";

/// Counter: drags abandoned. Labels: reason (outside, day_changed).
pub const DRAGS_CANCELLED_TOTAL: &str = "slotgrid_drags_cancelled_total";

/// Counter: clicks that opened a booking's details.
pub const BOOKINGS_ACTIVATED_TOTAL: &str = "slotgrid_bookings_activated_total";

// ── Render metrics ──────────────────────────────────────────────

/// Histogram: one column's classification pass, in seconds.
pub const RENDER_DURATION_SECONDS: &str = "slotgrid_render_duration_seconds";

/// Gauge: venue columns on the board.
pub const COLUMNS_ACTIVE: &str = "slotgrid_columns_active";

/// Install the fmt subscriber. Safe to call more than once; later calls are no-ops.
/// The host application picks a metrics recorder; without one, metrics are dropped.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

/// Short label for a status, for logs and metrics.
pub fn status_label(status: SlotStatus) -> &'static str {
    match status {
        SlotStatus::Available => "available",
        SlotStatus::Booked => "booked",
        SlotStatus::Selected => "selected",
        SlotStatus::Past => "past",
        SlotStatus::BlockedBySelection => "blocked_by_selection",
    }
}
