//! Grid placement of CC chart panels.

use tracing::warn;

use crate::extractor::Extraction;

pub const DEFAULT_COLS: usize = 3;
pub const DEFAULT_TITLE: &str = "MIDI CC Values Over Time";

/// Value axis shared by every panel, a little wider than 0..=127.
pub const Y_RANGE: (f64, f64) = (-5.0, 132.0);

/// Number of distinct panel colours before they repeat.
const PALETTE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    pub cols: usize,
    /// Computed from the number of panels when `None`.
    pub rows: Option<usize>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub channel: u8,
    pub controller: u8,
    pub row: usize,
    pub col: usize,
    pub title: String,
    pub color: usize,
    pub y_range: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub title: String,
    pub rows: usize,
    pub cols: usize,
    pub panels: Vec<Panel>,
    /// Panels that didn't fit in a fixed size grid.
    pub dropped: usize,
}

impl GridLayout {
    pub fn compute(extraction: &Extraction, config: &GridConfig) -> Self {
        let pairs: Vec<(u8, u8)> = extraction.timeline.pairs().collect();
        let cols = config.cols.max(1);
        let rows = config.rows.unwrap_or_else(|| pairs.len().div_ceil(cols));
        let capacity = rows.saturating_mul(cols);

        let dropped = pairs.len().saturating_sub(capacity);
        if dropped > 0 {
            warn!(
                "Not enough subplots for all CCs ({} of {} shown). Increase --rows or --cols.",
                capacity,
                pairs.len()
            );
        }

        let panels = pairs
            .into_iter()
            .take(capacity)
            .enumerate()
            .map(|(idx, (channel, controller))| Panel {
                channel,
                controller,
                row: idx / cols,
                col: idx % cols,
                title: panel_title(extraction, channel, controller),
                color: idx % PALETTE_SIZE,
                y_range: Y_RANGE,
            })
            .collect();

        Self {
            title: extraction
                .track_title
                .clone()
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            rows,
            cols,
            panels,
            dropped,
        }
    }

    /// Panels of one grid row, left to right.
    pub fn row(&self, row: usize) -> impl Iterator<Item = &Panel> {
        self.panels.iter().filter(move |p| p.row == row)
    }
}

fn panel_title(extraction: &Extraction, channel: u8, controller: u8) -> String {
    match extraction.metadata.name_for(controller) {
        Some(name) => format!("Ch {} CC {}: {}", channel, controller, name),
        None => format!("Ch {} CC {}", channel, controller),
    }
}
