//! Time-grid booking engine for shared venues.
//!
//! For one venue-day, classifies every fixed-stride slot into a status,
//! merges contiguous slots into renderable runs, lays out booking cards, and
//! runs the drag gesture that picks a free range to book. Pure and
//! single-threaded; bookings and "now" are handed in per render.

pub mod board;
pub mod config;
pub mod engine;
pub mod model;
pub mod observability;

pub use board::{Board, GridListener, VenueColumn, partition_by_venue};
pub use config::{GridConfig, GridMetrics};
pub use engine::{
    ColumnFrame, ColumnInputs, DragState, Effect, GridError, OverlayCard, OverlaySpan,
    PointerEvent, Run, SelectionController, SlotGrid, SlotView, render_column,
};
pub use model::{Booking, Ms, Selection, SlotRange, SlotStatus, Span, Venue};
