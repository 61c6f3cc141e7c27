use std::collections::HashMap;

use tracing::{debug, info};
use ulid::Ulid;

use crate::config::GridConfig;
use crate::engine::*;
use crate::model::*;
use crate::observability;

/// Receives what completed gestures produce. Both calls happen synchronously
/// inside [`Board::handle`].
pub trait GridListener {
    /// A drag finished; `span` is the time range to offer for booking.
    fn range_selected(&mut self, venue_id: Ulid, span: Span);
    /// A booked run was clicked.
    fn booking_activated(&mut self, booking: &Booking);
}

/// One venue's column and its private selection state.
#[derive(Debug, Clone)]
pub struct VenueColumn {
    pub venue: Venue,
    controller: SelectionController,
}

impl VenueColumn {
    pub fn selection(&self) -> Selection {
        self.controller.selection()
    }
}

/// All venue columns for the viewed day. Columns never share selection state:
/// each owns its own [`SelectionController`].
#[derive(Debug, Clone)]
pub struct Board {
    config: GridConfig,
    grid: SlotGrid,
    columns: Vec<VenueColumn>,
    /// Signed-in user. Without one, columns are read-only.
    viewer: Option<Ulid>,
}

impl Board {
    pub fn new(config: GridConfig, day: Ms, viewer: Option<Ulid>) -> Result<Self, GridError> {
        config.validate()?;
        let grid = SlotGrid::containing(day, config.stride_ms)?;
        Ok(Self {
            config,
            grid,
            columns: Vec::new(),
            viewer,
        })
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn columns(&self) -> &[VenueColumn] {
        &self.columns
    }

    /// Add a column. Returns false if the venue already has one.
    pub fn add_venue(&mut self, venue: Venue) -> bool {
        if self.columns.iter().any(|c| c.venue.id == venue.id) {
            return false;
        }
        let controller = if self.viewer.is_some() {
            SelectionController::new()
        } else {
            SelectionController::read_only()
        };
        debug!(venue = %venue.id, name = %venue.name, "column added");
        self.columns.push(VenueColumn { venue, controller });
        metrics::gauge!(observability::COLUMNS_ACTIVE).set(self.columns.len() as f64);
        true
    }

    pub fn selection(&self, venue_id: Ulid) -> Result<Selection, GridError> {
        Ok(self.column(venue_id)?.selection())
    }

    /// Switch to the day containing `instant`. Every in-flight drag is
    /// cancelled, since its indices refer to the old day's slots.
    pub fn set_day(&mut self, instant: Ms) -> Result<(), GridError> {
        let grid = SlotGrid::containing(instant, self.config.stride_ms)?;
        if grid.day_start() == self.grid.day_start() {
            return Ok(());
        }
        self.grid = grid;
        let inputs = ColumnInputs {
            grid: &self.grid,
            bookings: &[],
            now: instant,
        };
        for column in &mut self.columns {
            column.controller.handle(PointerEvent::DayChanged, &inputs)?;
        }
        info!(day_start = self.grid.day_start(), "viewed day changed");
        Ok(())
    }

    /// Render one column. `bookings` are that venue's bookings for the day.
    pub fn render<'a>(
        &self,
        venue_id: Ulid,
        bookings: &'a [Booking],
        now: Ms,
    ) -> Result<ColumnFrame<'a>, GridError> {
        let column = self.column(venue_id)?;
        let inputs = ColumnInputs {
            grid: &self.grid,
            bookings,
            now,
        };
        render_column(
            venue_id,
            &inputs,
            column.selection(),
            &self.config.metrics,
            self.viewer,
        )
    }

    /// Render every column, in the order venues were added.
    pub fn render_all<'a>(
        &self,
        by_venue: &'a HashMap<Ulid, Vec<Booking>>,
        now: Ms,
    ) -> Result<Vec<ColumnFrame<'a>>, GridError> {
        self.columns
            .iter()
            .map(|c| {
                let bookings = by_venue.get(&c.venue.id).map_or(&[][..], Vec::as_slice);
                self.render(c.venue.id, bookings, now)
            })
            .collect()
    }

    /// Feed a pointer event to one column and forward its effect to `listener`.
    ///
    /// A pointer-down in one column lies outside every other column, so it
    /// cancels their drags.
    pub fn handle(
        &mut self,
        venue_id: Ulid,
        event: PointerEvent,
        bookings: &[Booking],
        now: Ms,
        listener: &mut impl GridListener,
    ) -> Result<Option<Effect>, GridError> {
        let target = self.column_index(venue_id)?;
        let inputs = ColumnInputs {
            grid: &self.grid,
            bookings,
            now,
        };

        if let PointerEvent::Down(i) = event {
            self.grid.slot_start(i)?;
            for (idx, column) in self.columns.iter_mut().enumerate() {
                if idx != target && column.controller.is_dragging() {
                    column.controller.cancel();
                }
            }
        }

        let effect = self.columns[target].controller.handle(event, &inputs)?;
        match effect {
            Some(Effect::RangeSelected(span)) => {
                info!(venue = %venue_id, start = span.start, end = span.end, "range committed");
                listener.range_selected(venue_id, span);
            }
            Some(Effect::BookingActivated(id)) => {
                if let Some(booking) = bookings.iter().find(|b| b.id == id) {
                    listener.booking_activated(booking);
                }
            }
            None => {}
        }
        Ok(effect)
    }

    /// A pointer-down landed outside the whole board.
    pub fn pointer_down_outside(&mut self) {
        for column in &mut self.columns {
            column.controller.cancel();
        }
    }

    fn column_index(&self, venue_id: Ulid) -> Result<usize, GridError> {
        self.columns
            .iter()
            .position(|c| c.venue.id == venue_id)
            .ok_or(GridError::UnknownVenue(venue_id))
    }

    fn column(&self, venue_id: Ulid) -> Result<&VenueColumn, GridError> {
        Ok(&self.columns[self.column_index(venue_id)?])
    }
}

/// Group bookings by venue, keeping input order within each venue.
pub fn partition_by_venue(
    bookings: impl IntoIterator<Item = Booking>,
) -> HashMap<Ulid, Vec<Booking>> {
    let mut by_venue: HashMap<Ulid, Vec<Booking>> = HashMap::new();
    for booking in bookings {
        by_venue.entry(booking.venue_id).or_default().push(booking);
    }
    by_venue
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRIDE: Ms = 30 * MINUTE_MS;
    const DAY: Ms = 20_000 * DAY_MS;

    #[derive(Default)]
    struct Recorder {
        ranges: Vec<(Ulid, Span)>,
        activated: Vec<Ulid>,
    }

    impl GridListener for Recorder {
        fn range_selected(&mut self, venue_id: Ulid, span: Span) {
            self.ranges.push((venue_id, span));
        }

        fn booking_activated(&mut self, booking: &Booking) {
            self.activated.push(booking.id);
        }
    }

    fn venue(name: &str) -> Venue {
        Venue {
            id: Ulid::new(),
            name: name.into(),
        }
    }

    fn board_with(venues: &[Venue]) -> Board {
        let mut board = Board::new(GridConfig::default(), DAY, Some(Ulid::new())).unwrap();
        for v in venues {
            assert!(board.add_venue(v.clone()));
        }
        board
    }

    fn booking(venue_id: Ulid, lower: i64, upper_exclusive: i64) -> Booking {
        Booking {
            id: Ulid::new(),
            venue_id,
            owner_id: Ulid::new(),
            from: DAY + lower * STRIDE,
            to: DAY + upper_exclusive * STRIDE,
            label: "Band practice".into(),
            org_name: None,
        }
    }

    #[test]
    fn duplicate_venue_rejected() {
        let hall = venue("Hall");
        let mut board = board_with(std::slice::from_ref(&hall));
        assert!(!board.add_venue(hall));
        assert_eq!(board.columns().len(), 1);
    }

    #[test]
    fn unknown_venue_is_an_error() {
        let mut board = board_with(&[]);
        let ghost = Ulid::new();
        let err = board
            .handle(ghost, PointerEvent::Up, &[], DAY, &mut Recorder::default())
            .unwrap_err();
        assert_eq!(err, GridError::UnknownVenue(ghost));
        assert!(board.render(ghost, &[], DAY).is_err());
    }

    #[test]
    fn columns_select_independently() {
        let (a, b) = (venue("Studio"), venue("Amphi"));
        let mut board = board_with(&[a.clone(), b.clone()]);
        let mut rec = Recorder::default();
        board.handle(a.id, PointerEvent::Down(20), &[], DAY, &mut rec).unwrap();
        assert!(board.selection(b.id).unwrap().is_empty());
        assert_eq!(
            board.selection(a.id).unwrap(),
            Selection::Range(SlotRange { lower: 20, upper: 20 })
        );
    }

    #[test]
    fn down_in_other_column_cancels_drag() {
        let (a, b) = (venue("Studio"), venue("Amphi"));
        let mut board = board_with(&[a.clone(), b.clone()]);
        let mut rec = Recorder::default();
        board.handle(a.id, PointerEvent::Down(20), &[], DAY, &mut rec).unwrap();
        board.handle(b.id, PointerEvent::Down(30), &[], DAY, &mut rec).unwrap();
        assert!(board.selection(a.id).unwrap().is_empty());
        assert!(!board.selection(b.id).unwrap().is_empty());
    }

    #[test]
    fn out_of_range_down_leaves_other_drags_alone() {
        let (a, b) = (venue("Studio"), venue("Amphi"));
        let mut board = board_with(&[a.clone(), b.clone()]);
        let mut rec = Recorder::default();
        board.handle(a.id, PointerEvent::Down(20), &[], DAY, &mut rec).unwrap();
        let err = board
            .handle(b.id, PointerEvent::Down(48), &[], DAY, &mut rec)
            .unwrap_err();
        assert_eq!(err, GridError::SlotOutOfRange { index: 48, len: 48 });
        assert_eq!(
            board.selection(a.id).unwrap(),
            Selection::Range(SlotRange { lower: 20, upper: 20 })
        );
    }

    #[test]
    fn completed_drag_reaches_listener() {
        let a = venue("Studio");
        let mut board = board_with(std::slice::from_ref(&a));
        let mut rec = Recorder::default();
        for event in [PointerEvent::Down(20), PointerEvent::Over(22), PointerEvent::Up] {
            board.handle(a.id, event, &[], DAY, &mut rec).unwrap();
        }
        assert_eq!(rec.ranges, vec![(a.id, Span::new(DAY + 20 * STRIDE, DAY + 23 * STRIDE))]);
        assert!(board.selection(a.id).unwrap().is_empty());
    }

    #[test]
    fn click_on_booking_reaches_listener() {
        let a = venue("Studio");
        let mut board = board_with(std::slice::from_ref(&a));
        let b = booking(a.id, 10, 12);
        let bookings = [b.clone()];
        let mut rec = Recorder::default();
        board.handle(a.id, PointerEvent::Click(11), &bookings, DAY, &mut rec).unwrap();
        assert_eq!(rec.activated, vec![b.id]);
    }

    #[test]
    fn click_reports_booking_under_pointer_not_run_head() {
        let a = venue("Studio");
        let mut board = board_with(std::slice::from_ref(&a));
        let first = booking(a.id, 10, 12);
        let mut second = booking(a.id, 12, 14);
        second.owner_id = first.owner_id;
        let bookings = [first.clone(), second.clone()];
        let mut rec = Recorder::default();
        board.handle(a.id, PointerEvent::Click(13), &bookings, DAY, &mut rec).unwrap();
        board.handle(a.id, PointerEvent::Click(10), &bookings, DAY, &mut rec).unwrap();
        assert_eq!(rec.activated, vec![second.id, first.id]);
    }

    #[test]
    fn set_day_clears_every_drag() {
        let (a, b) = (venue("Studio"), venue("Amphi"));
        let mut board = board_with(&[a.clone(), b.clone()]);
        let mut rec = Recorder::default();
        board.handle(a.id, PointerEvent::Down(20), &[], DAY, &mut rec).unwrap();
        board.set_day(DAY + DAY_MS + HOUR_MS).unwrap();
        assert_eq!(board.grid().day_start(), DAY + DAY_MS);
        assert!(board.selection(a.id).unwrap().is_empty());
        // Releasing after the switch commits nothing.
        board.handle(a.id, PointerEvent::Up, &[], DAY, &mut rec).unwrap();
        assert!(rec.ranges.is_empty());
    }

    #[test]
    fn set_day_same_day_keeps_drag() {
        let a = venue("Studio");
        let mut board = board_with(std::slice::from_ref(&a));
        let mut rec = Recorder::default();
        board.handle(a.id, PointerEvent::Down(20), &[], DAY, &mut rec).unwrap();
        board.set_day(DAY + 5 * HOUR_MS).unwrap();
        assert!(!board.selection(a.id).unwrap().is_empty());
    }

    #[test]
    fn outside_board_cancels_all() {
        let a = venue("Studio");
        let mut board = board_with(std::slice::from_ref(&a));
        let mut rec = Recorder::default();
        board.handle(a.id, PointerEvent::Down(20), &[], DAY, &mut rec).unwrap();
        board.pointer_down_outside();
        assert!(board.selection(a.id).unwrap().is_empty());
    }

    #[test]
    fn signed_out_board_is_read_only() {
        let a = venue("Studio");
        let mut board = Board::new(GridConfig::default(), DAY, None).unwrap();
        board.add_venue(a.clone());
        let mut rec = Recorder::default();
        board.handle(a.id, PointerEvent::Down(20), &[], DAY, &mut rec).unwrap();
        assert!(board.selection(a.id).unwrap().is_empty());
    }

    #[test]
    fn render_all_partitions_by_venue() {
        let (a, b) = (venue("Studio"), venue("Amphi"));
        let board = board_with(&[a.clone(), b.clone()]);
        let by_venue = partition_by_venue(vec![
            booking(a.id, 2, 4),
            booking(b.id, 6, 7),
            booking(a.id, 8, 9),
        ]);
        assert_eq!(by_venue[&a.id].len(), 2);
        assert!(by_venue[&a.id][0].from < by_venue[&a.id][1].from);

        let frames = board.render_all(&by_venue, DAY).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].venue_id, a.id);
        assert_eq!(frames[0].overlays.len(), 2);
        assert_eq!(frames[1].overlays.len(), 1);
        assert_eq!(frames[1].slots[6].status, SlotStatus::Booked);
    }

    #[test]
    fn render_rejects_inverted_booking() {
        let a = venue("Studio");
        let board = board_with(std::slice::from_ref(&a));
        let mut bad = booking(a.id, 4, 5);
        bad.to = bad.from;
        assert_eq!(
            board.render(a.id, std::slice::from_ref(&bad), DAY),
            Err(GridError::InvalidBooking(bad.id))
        );
    }
}
