use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::engine::GridError;

/// Milliseconds on the pre-localized timeline. The only time type.
pub type Ms = i64;

pub const MINUTE_MS: Ms = 60_000;
pub const HOUR_MS: Ms = 60 * MINUTE_MS;
pub const DAY_MS: Ms = 24 * HOUR_MS;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: Ms) -> bool {
        self.start <= t && t < self.end
    }

    /// Intersection with `other`, or `None` when they don't overlap.
    pub fn clip(&self, other: &Span) -> Option<Span> {
        self.overlaps(other)
            .then(|| Span::new(self.start.max(other.start), self.end.min(other.end)))
    }
}

/// A shared space that can be reserved. One grid column per venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub id: Ulid,
    pub name: String,
}

/// An existing reservation, as handed over by the data-fetching layer.
///
/// `from`/`to` need not be slot-aligned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    pub venue_id: Ulid,
    pub owner_id: Ulid,
    pub from: Ms,
    pub to: Ms,
    pub label: String,
    /// Organisation the booking was made for, shown on multi-slot cards.
    #[serde(default)]
    pub org_name: Option<String>,
}

impl Booking {
    pub fn span(&self) -> Span {
        Span::new(self.from, self.to)
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if self.from >= self.to {
            return Err(GridError::InvalidBooking(self.id));
        }
        Ok(())
    }

    /// Half-open occupancy: the slot starting at `slot_start` belongs to this booking.
    pub fn occupies(&self, slot_start: Ms) -> bool {
        slot_start >= self.from && slot_start < self.to
    }
}

/// Per-slot display/interaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotStatus {
    Available,
    Booked,
    Selected,
    Past,
    /// Lies beyond an existing booking, counted from the selection's lower bound.
    BlockedBySelection,
}

/// Inclusive range of slot indices, `lower <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRange {
    pub lower: usize,
    pub upper: usize,
}

impl SlotRange {
    /// Range covering both endpoints, whichever order they come in.
    pub fn spanning(a: usize, b: usize) -> Self {
        Self {
            lower: a.min(b),
            upper: a.max(b),
        }
    }

    pub fn contains(&self, i: usize) -> bool {
        self.lower <= i && i <= self.upper
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.upper - self.lower + 1
    }
}

/// The live selection of one venue column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    Empty,
    Range(SlotRange),
}

impl Selection {
    pub fn contains(&self, i: usize) -> bool {
        match self {
            Selection::Empty => false,
            Selection::Range(r) => r.contains(i),
        }
    }

    pub fn range(&self) -> Option<SlotRange> {
        match self {
            Selection::Empty => None,
            Selection::Range(r) => Some(*r),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Empty)
    }
}
