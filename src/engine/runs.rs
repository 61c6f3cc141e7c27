use serde::Serialize;
use ulid::Ulid;

use crate::model::SlotStatus;

use super::SlotView;

/// Maximal group of contiguous slots sharing a status (and owner, if booked).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Run {
    pub start_slot: usize,
    pub length: usize,
    pub status: SlotStatus,
    pub owner_id: Option<Ulid>,
    /// Booking under the run's first slot. A same-owner run can cover several
    /// bookings, so clicks resolve through the slot, not the run.
    pub booking_id: Option<Ulid>,
}

impl Run {
    pub fn end_slot(&self) -> usize {
        self.start_slot + self.length
    }

    pub fn contains(&self, slot: usize) -> bool {
        self.start_slot <= slot && slot < self.end_slot()
    }
}

/// Merge classified slots into the minimal list of runs.
///
/// Booked slots only merge when their owners match; every other status
/// merges on status alone.
pub fn compact(slots: &[SlotView<'_>]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for slot in slots {
        let owner = slot.owner();
        if let Some(last) = runs.last_mut()
            && last.end_slot() == slot.index
            && last.status == slot.status
            && last.owner_id == owner
        {
            last.length += 1;
            continue;
        }
        runs.push(Run {
            start_slot: slot.index,
            length: 1,
            status: slot.status,
            owner_id: owner,
            booking_id: slot.booking.map(|b| b.id),
        });
    }
    runs
}

/// Expand runs back into per-slot `(status, owner)` pairs.
pub fn expand(runs: &[Run]) -> Vec<(SlotStatus, Option<Ulid>)> {
    runs.iter()
        .flat_map(|r| std::iter::repeat_n((r.status, r.owner_id), r.length))
        .collect()
}

/// The run covering `slot`. Runs are sorted and contiguous, so binary search.
pub fn run_at(runs: &[Run], slot: usize) -> Option<&Run> {
    let idx = runs.partition_point(|r| r.end_slot() <= slot);
    runs.get(idx).filter(|r| r.contains(slot))
}
