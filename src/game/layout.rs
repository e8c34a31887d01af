use serde::{Deserialize, Serialize};

use super::card::Position;

/// Drawing area the board is centred in. Units are canvas pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardLayout {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub card_width: f32,
    pub card_height: f32,
    pub margin: f32,
    pub top_offset: f32,
    pub side_padding: f32,
    pub bottom_padding: f32,
}

impl Default for BoardLayout {
    fn default() -> Self {
        BoardLayout {
            canvas_width: 1200.0,
            canvas_height: 800.0,
            card_width: 110.0,
            card_height: 110.0,
            margin: 18.0,
            top_offset: 180.0,
            side_padding: 20.0,
            bottom_padding: 40.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GridPlacement {
    pub card_width: f32,
    pub card_height: f32,
    pub margin: f32,
    pub scale: f32,
    pub slots: Vec<Position>,
}

impl BoardLayout {
    fn available(&self) -> (f32, f32) {
        (
            (self.canvas_width - 2.0 * self.side_padding).max(1.0),
            (self.canvas_height - self.top_offset - self.bottom_padding).max(1.0),
        )
    }

    fn grid_extent(&self, cols: u32, rows: u32, scale: f32) -> (f32, f32) {
        let gap = self.margin * scale;
        let width = cols as f32 * self.card_width * scale + cols.saturating_sub(1) as f32 * gap;
        let height = rows as f32 * self.card_height * scale + rows.saturating_sub(1) as f32 * gap;
        (width, height)
    }

    /// Shrink factor that keeps the grid inside the usable area. Never above 1.
    pub fn fit_scale(&self, cols: u32, rows: u32) -> f32 {
        let (grid_width, grid_height) = self.grid_extent(cols, rows, 1.0);
        if grid_width <= 0.0 || grid_height <= 0.0 {
            return 1.0;
        }
        let (available_width, available_height) = self.available();
        (available_width / grid_width)
            .min(available_height / grid_height)
            .min(1.0)
    }

    /// Row-major slots for a `cols x rows` grid, centred below the top offset.
    pub fn place(&self, cols: u32, rows: u32, count: usize) -> GridPlacement {
        let scale = self.fit_scale(cols, rows);
        let card_width = self.card_width * scale;
        let card_height = self.card_height * scale;
        let margin = self.margin * scale;
        let (grid_width, grid_height) = self.grid_extent(cols, rows, scale);

        let (available_width, available_height) = self.available();
        let start_x = self.side_padding + (available_width - grid_width) / 2.0;
        let start_y = self.top_offset + (available_height - grid_height) / 2.0;

        let slots = (0..count)
            .map(|i| {
                let col = i as u32 % cols.max(1);
                let row = i as u32 / cols.max(1);
                Position {
                    col,
                    row,
                    x: start_x + col as f32 * (card_width + margin),
                    y: start_y + row as f32 * (card_height + margin),
                }
            })
            .collect();

        GridPlacement {
            card_width,
            card_height,
            margin,
            scale,
            slots,
        }
    }
}
