//! Pixel placement of tiles according to a row template

use crate::template::RowTemplate;
use crate::{Error, GridConfig, Overflow, Result, RowHeight};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// Where a tile sits: its grid cell and the resulting pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub row: usize,
    pub column: u32,
    pub span: u32,
    pub rect: Rect,
}

/// Output of one layout pass, in tile order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridLayout {
    pub column_width: u32,
    /// `None` for tiles left out by `Overflow::Truncate`
    pub placements: Vec<Option<Placement>>,
    pub rows: usize,
    pub height: u32,
}

/// Width of one column once the gutters are taken out
pub fn column_width(container_width: u32, columns: u32, padding: u32) -> u32 {
    if columns == 0 {
        return 0;
    }
    let gutters = padding.saturating_mul(columns - 1);
    container_width.saturating_sub(gutters) / columns
}

/// Pixel width of a tile spanning `span` columns
pub fn span_width(span: u32, column_width: u32, padding: u32) -> u32 {
    span * column_width + span.saturating_sub(1) * padding
}

fn row_height(spans: &[u32], template: &RowTemplate, cw: u32, config: &GridConfig) -> u32 {
    if let Some(px) = template.row_height() {
        return px;
    }
    match config.row_height {
        RowHeight::Fixed(px) => px,
        RowHeight::Aspect(ratio) => scale(cw, ratio),
        RowHeight::SpanAspect(ratio) => {
            let narrowest = spans.iter().copied().min().unwrap_or(1);
            scale(span_width(narrowest, cw, config.padding), ratio)
        }
    }
}

fn scale(px: u32, ratio: f32) -> u32 {
    (px as f32 * ratio.max(0.0)).round() as u32
}

/// Lay `tile_count` tiles into rows following `template`.
///
/// Tiles fill rows in order, one tile per span slot. When tiles run out the
/// pass stops, leaving the last row partially filled. When tiles outlast the
/// template the row pattern repeats, unless the grid truncates.
pub fn layout_tiles(
    template: &RowTemplate,
    columns: u32,
    tile_count: usize,
    container_width: u32,
    config: &GridConfig,
) -> Result<GridLayout> {
    if columns == 0 {
        return Err(Error::Layout("column count must be positive".into()));
    }
    if template.columns() != columns {
        return Err(Error::Layout(format!(
            "template spans {} columns but the grid has {}",
            template.columns(),
            columns
        )));
    }

    let padding = config.padding;
    let cw = column_width(container_width, columns, padding);
    let mut placements = Vec::with_capacity(tile_count);
    let mut top = 0u32;
    let mut height = 0u32;
    let mut row = 0usize;

    while placements.len() < tile_count {
        if config.overflow == Overflow::Truncate && row >= template.row_count() {
            break;
        }
        let spans = template.row_cycled(row);
        let rh = row_height(spans, template, cw, config);
        let mut column = 0u32;
        for &span in spans {
            if placements.len() == tile_count {
                break;
            }
            placements.push(Some(Placement {
                row,
                column,
                span,
                rect: Rect {
                    x: column * (cw + padding),
                    y: top,
                    width: span_width(span, cw, padding),
                    height: rh,
                },
            }));
            column += span;
        }
        height = top + rh;
        top = height + padding;
        row += 1;
    }

    placements.resize(tile_count, None);

    Ok(GridLayout {
        column_width: cw,
        placements,
        rows: row,
        height,
    })
}
