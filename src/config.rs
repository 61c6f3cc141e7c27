use serde::{Deserialize, Serialize};

use crate::engine::GridError;
use crate::engine::grid::validate_stride;
use crate::model::{MINUTE_MS, Ms};

pub const DEFAULT_STRIDE_MS: Ms = 30 * MINUTE_MS;
pub const DEFAULT_CELL_HEIGHT_REM: f64 = 2.5;
pub const DEFAULT_CELL_BORDER_Y_REM: f64 = 0.0625;
pub const DEFAULT_ROOT_FONT_SIZE: f64 = 16.0;

/// Pixel geometry of the grid's cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridMetrics {
    pub cell_height_rem: f64,
    /// Border above and below every cell.
    pub cell_border_y_rem: f64,
    pub root_font_size: f64,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            cell_height_rem: DEFAULT_CELL_HEIGHT_REM,
            cell_border_y_rem: DEFAULT_CELL_BORDER_Y_REM,
            root_font_size: DEFAULT_ROOT_FONT_SIZE,
        }
    }
}

impl GridMetrics {
    /// Distance in pixels from one slot's top edge to the next, borders included.
    pub fn cell_pitch_px(&self) -> f64 {
        (self.cell_height_rem + 2.0 * self.cell_border_y_rem) * self.root_font_size
    }

    /// Both borders of a single cell, in pixels.
    pub fn border_adjustment_px(&self) -> f64 {
        2.0 * self.cell_border_y_rem * self.root_font_size
    }

    /// Content height of a grid cell drawn for a run of `len` slots. The
    /// interior borders between merged slots become content.
    pub fn run_height_px(&self, len: usize) -> f64 {
        let n = len as f64;
        let interior_borders = n.max(1.0) - 1.0;
        (self.cell_height_rem * n * self.root_font_size
            + self.root_font_size * interior_borders * 2.0 * self.cell_border_y_rem)
            .floor()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub stride_ms: Ms,
    pub metrics: GridMetrics,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            stride_ms: DEFAULT_STRIDE_MS,
            metrics: GridMetrics::default(),
        }
    }
}

impl GridConfig {
    /// Overlay `SLOTGRID_*` environment variables on the defaults.
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Result<Self, GridError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, GridError> {
        let defaults = Self::default();
        let stride_minutes: Option<Ms> =
            lookup("SLOTGRID_STRIDE_MINUTES").and_then(|s| s.parse().ok());
        let parse_f64 = |key: &str, default: f64| {
            lookup(key)
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(default)
        };

        let config = Self {
            stride_ms: stride_minutes
                .map_or(Some(defaults.stride_ms), |m| m.checked_mul(MINUTE_MS))
                .ok_or(GridError::InvalidStride(Ms::MAX))?,
            metrics: GridMetrics {
                cell_height_rem: parse_f64(
                    "SLOTGRID_CELL_HEIGHT_REM",
                    defaults.metrics.cell_height_rem,
                ),
                cell_border_y_rem: parse_f64(
                    "SLOTGRID_CELL_BORDER_Y_REM",
                    defaults.metrics.cell_border_y_rem,
                ),
                root_font_size: parse_f64(
                    "SLOTGRID_ROOT_FONT_SIZE",
                    defaults.metrics.root_font_size,
                ),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GridError> {
        validate_stride(self.stride_ms)
    }
}
