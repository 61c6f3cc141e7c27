use ulid::Ulid;

use crate::model::*;

use super::{GridError, SlotGrid};

/// Tie-break order when several conditions hold for one slot. The first
/// status whose condition holds wins; `Available` always holds.
pub const PRIORITY: [SlotStatus; 5] = [
    SlotStatus::Booked,
    SlotStatus::Selected,
    SlotStatus::Past,
    SlotStatus::BlockedBySelection,
    SlotStatus::Available,
];

/// Classification of one slot for one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotView<'a> {
    pub index: usize,
    pub status: SlotStatus,
    /// Set only for `Booked` slots.
    pub booking: Option<&'a Booking>,
}

impl SlotView<'_> {
    pub fn owner(&self) -> Option<Ulid> {
        self.booking.map(|b| b.owner_id)
    }
}

/// Everything one slot's conditions are evaluated against.
struct Probe<'a> {
    index: usize,
    start: Ms,
    now: Ms,
    bookings: &'a [Booking],
    selection: Selection,
    /// Start of the selection's lower slot, when a selection is live.
    anchor: Option<Ms>,
    booking: Option<&'a Booking>,
}

impl Probe<'_> {
    fn holds(&self, status: SlotStatus) -> bool {
        match status {
            SlotStatus::Booked => self.booking.is_some(),
            SlotStatus::Selected => self.selection.contains(self.index),
            SlotStatus::Past => self.now > self.start,
            SlotStatus::BlockedBySelection => self.anchor.is_some_and(|anchor| {
                self.bookings
                    .iter()
                    .any(|b| strictly_between(anchor, self.start, b.from))
            }),
            SlotStatus::Available => true,
        }
    }
}

/// `t` lies strictly inside the open interval between `a` and `b`, in either order.
fn strictly_between(a: Ms, b: Ms, t: Ms) -> bool {
    (a < t && t < b) || (b < t && t < a)
}

/// Classify slot `i`. A pure function of its inputs.
///
/// The first booking in input order that occupies the slot owns it. While a
/// selection is live, any slot with a booking start strictly between it and
/// the selection's lower slot is `BlockedBySelection`: a selection may not
/// straddle an existing booking.
pub fn classify<'a>(
    grid: &SlotGrid,
    i: usize,
    now: Ms,
    bookings: &'a [Booking],
    selection: Selection,
) -> Result<SlotView<'a>, GridError> {
    let anchor = anchor_start(grid, selection)?;
    classify_with_anchor(grid, i, now, bookings, selection, anchor)
}

/// Classify every slot of the day in order.
pub fn classify_all<'a>(
    grid: &SlotGrid,
    now: Ms,
    bookings: &'a [Booking],
    selection: Selection,
) -> Result<Vec<SlotView<'a>>, GridError> {
    let anchor = anchor_start(grid, selection)?;
    (0..grid.len())
        .map(|i| classify_with_anchor(grid, i, now, bookings, selection, anchor))
        .collect()
}

fn anchor_start(grid: &SlotGrid, selection: Selection) -> Result<Option<Ms>, GridError> {
    selection
        .range()
        .map(|r| grid.slot_start(r.lower))
        .transpose()
}

fn classify_with_anchor<'a>(
    grid: &SlotGrid,
    i: usize,
    now: Ms,
    bookings: &'a [Booking],
    selection: Selection,
    anchor: Option<Ms>,
) -> Result<SlotView<'a>, GridError> {
    let start = grid.slot_start(i)?;
    let probe = Probe {
        index: i,
        start,
        now,
        bookings,
        selection,
        anchor,
        booking: bookings.iter().find(|b| b.occupies(start)),
    };
    let status = PRIORITY
        .into_iter()
        .find(|s| probe.holds(*s))
        .unwrap_or(SlotStatus::Available);
    Ok(SlotView {
        index: i,
        status,
        booking: probe.booking.filter(|_| status == SlotStatus::Booked),
    })
}
