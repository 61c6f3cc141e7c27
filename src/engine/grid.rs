use crate::model::*;

use super::GridError;

/// Slot boundaries for one day: `day_start + i * stride` for every `i` with
/// the start falling before the next midnight.
///
/// Rebuilt whenever the viewed day changes; never cached across days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotGrid {
    day_start: Ms,
    stride: Ms,
    starts: Vec<Ms>,
}

impl SlotGrid {
    pub fn for_day(day_start: Ms, stride: Ms) -> Result<Self, GridError> {
        validate_stride(stride)?;
        let starts = (0..DAY_MS / stride).map(|i| day_start + i * stride).collect();
        Ok(Self {
            day_start,
            stride,
            starts,
        })
    }

    /// Grid for the day containing `instant`.
    pub fn containing(instant: Ms, stride: Ms) -> Result<Self, GridError> {
        Self::for_day(day_floor(instant), stride)
    }

    pub fn day_start(&self) -> Ms {
        self.day_start
    }

    pub fn day(&self) -> Span {
        Span::new(self.day_start, self.day_start + DAY_MS)
    }

    pub fn stride(&self) -> Ms {
        self.stride
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn starts(&self) -> &[Ms] {
        &self.starts
    }

    /// Start instant of slot `i`. Out-of-range indices fail rather than clamp.
    pub fn slot_start(&self, i: usize) -> Result<Ms, GridError> {
        self.starts
            .get(i)
            .copied()
            .ok_or(GridError::SlotOutOfRange {
                index: i,
                len: self.starts.len(),
            })
    }

    /// The committed time range for an inclusive slot range.
    pub fn range_span(&self, range: SlotRange) -> Result<Span, GridError> {
        let start = self.slot_start(range.lower)?;
        let end = self.slot_start(range.upper)? + self.stride;
        Ok(Span::new(start, end))
    }

    /// Index of the slot containing `instant`, if it falls on this day.
    pub fn index_of(&self, instant: Ms) -> Option<usize> {
        if !self.day().contains_instant(instant) {
            return None;
        }
        Some(((instant - self.day_start) / self.stride) as usize)
    }

    /// `now` rounded up to the next slot boundary, so `Past` stays stable
    /// for the whole slot and the slot containing `now` reads as past.
    pub fn coarsen_now(&self, now: Ms) -> Ms {
        let offset = (now - self.day_start).rem_euclid(self.stride);
        if offset == 0 { now } else { now + self.stride - offset }
    }
}

/// Midnight at or before `instant`.
pub fn day_floor(instant: Ms) -> Ms {
    instant - instant.rem_euclid(DAY_MS)
}

pub(crate) fn validate_stride(stride: Ms) -> Result<(), GridError> {
    if stride <= 0 || DAY_MS % stride != 0 {
        return Err(GridError::InvalidStride(stride));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRIDE: Ms = 30 * MINUTE_MS;
    const DAY: Ms = 19_000 * DAY_MS;

    #[test]
    fn half_hour_grid_has_48_slots() {
        let grid = SlotGrid::for_day(DAY, STRIDE).unwrap();
        assert_eq!(grid.len(), 48);
        assert_eq!(grid.starts()[0], DAY);
        assert_eq!(grid.starts()[47], DAY + 23 * HOUR_MS + 30 * MINUTE_MS);
        // The next midnight is not part of the day.
        assert!(!grid.starts().contains(&(DAY + DAY_MS)));
    }

    #[test]
    fn starts_are_strictly_increasing_by_stride() {
        let grid = SlotGrid::for_day(DAY, 15 * MINUTE_MS).unwrap();
        assert_eq!(grid.len(), 96);
        for w in grid.starts().windows(2) {
            assert_eq!(w[1] - w[0], 15 * MINUTE_MS);
        }
    }

    #[test]
    fn rejects_bad_strides() {
        assert_eq!(SlotGrid::for_day(DAY, 0), Err(GridError::InvalidStride(0)));
        assert_eq!(SlotGrid::for_day(DAY, -STRIDE), Err(GridError::InvalidStride(-STRIDE)));
        assert_eq!(
            SlotGrid::for_day(DAY, 7 * MINUTE_MS),
            Err(GridError::InvalidStride(7 * MINUTE_MS))
        );
    }

    #[test]
    fn slot_start_fails_fast_out_of_range() {
        let grid = SlotGrid::for_day(DAY, STRIDE).unwrap();
        assert_eq!(grid.slot_start(47).unwrap(), DAY + 47 * STRIDE);
        assert_eq!(
            grid.slot_start(48),
            Err(GridError::SlotOutOfRange { index: 48, len: 48 })
        );
    }

    #[test]
    fn containing_floors_to_midnight() {
        let grid = SlotGrid::containing(DAY + 13 * HOUR_MS + 7, STRIDE).unwrap();
        assert_eq!(grid.day_start(), DAY);
        assert_eq!(day_floor(DAY - 1), DAY - DAY_MS);
    }

    #[test]
    fn index_of_instant() {
        let grid = SlotGrid::for_day(DAY, STRIDE).unwrap();
        assert_eq!(grid.index_of(DAY), Some(0));
        assert_eq!(grid.index_of(DAY + 9 * HOUR_MS + 45 * MINUTE_MS), Some(19));
        assert_eq!(grid.index_of(DAY + DAY_MS), None);
        assert_eq!(grid.index_of(DAY - 1), None);
    }

    #[test]
    fn range_span_adds_one_stride_past_upper() {
        let grid = SlotGrid::for_day(DAY, STRIDE).unwrap();
        let span = grid.range_span(SlotRange { lower: 18, upper: 19 }).unwrap();
        assert_eq!(span, Span::new(DAY + 9 * HOUR_MS, DAY + 10 * HOUR_MS));
    }

    #[test]
    fn coarsen_now_rounds_up_to_boundary() {
        let grid = SlotGrid::for_day(DAY, STRIDE).unwrap();
        let nine = DAY + 9 * HOUR_MS;
        assert_eq!(grid.coarsen_now(nine), nine);
        assert_eq!(grid.coarsen_now(nine + 1), nine + STRIDE);
        assert_eq!(grid.coarsen_now(nine + 29 * MINUTE_MS), nine + STRIDE);
    }
}
