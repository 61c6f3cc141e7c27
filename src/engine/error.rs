use ulid::Ulid;

use crate::model::Ms;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    SlotOutOfRange { index: usize, len: usize },
    InvalidStride(Ms),
    InvalidBooking(Ulid),
    UnknownVenue(Ulid),
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::SlotOutOfRange { index, len } => {
                write!(f, "slot index {index} out of range for a {len}-slot day")
            }
            GridError::InvalidStride(stride) => {
                write!(f, "invalid slot stride: {stride}ms does not evenly divide a day")
            }
            GridError::InvalidBooking(id) => {
                write!(f, "invalid booking {id}: from must precede to")
            }
            GridError::UnknownVenue(id) => write!(f, "unknown venue: {id}"),
        }
    }
}

impl std::error::Error for GridError {}
