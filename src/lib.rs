//! Tilegrid
//!
//! A responsive tile-grid layout engine. Posts become tiles, tiles are laid
//! into a pixel grid following a row template (rows of column spans), and the
//! grid re-lays itself when the container is resized or crosses a small-screen
//! breakpoint.
//!
//! # Example
//!
//! ```
//! use tilegrid::engine::{Grid, GridStrategies};
//! use tilegrid::render::MemoryTarget;
//! use tilegrid::template::{RowTemplate, TemplateSpec};
//! use tilegrid::tile::PostTileData;
//! use tilegrid::GridConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let template = RowTemplate::from_spec(&TemplateSpec::from("1 1 1 1\n2 2\n4"), 4)?;
//! let target = MemoryTarget::new(400);
//! let mut grid = Grid::new(
//!     GridConfig::default(),
//!     GridStrategies::default(),
//!     template,
//!     Box::new(target.clone()),
//! );
//!
//! let posts: Vec<PostTileData> = (1..=6)
//!     .map(|id| PostTileData::new(id, format!("/?p={}", id), format!("Post {}", id)))
//!     .collect();
//! grid.update_tiles(&posts);
//! grid.resize()?;
//! grid.redraw(false, |report| assert_eq!(report.container_height, 200));
//! assert_eq!(target.last_frame().map(|f| f.tiles.len()), Some(6));
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod breakpoint;
pub mod debounce;
pub mod engine;
pub mod instance;
pub mod layout;
pub mod options;
pub mod palette;
pub mod registry;
pub mod render;
pub mod template;
pub mod tile;

pub use breakpoint::BreakpointController;
pub use debounce::Debouncer;
pub use engine::{Grid, GridStrategies, LayoutState};
pub use instance::TileGridInstance;
pub use options::DisplayOptions;
pub use registry::{GridPayload, PageRegistry};
pub use template::{RowTemplate, TemplateKey, TemplateSpec, TemplateStore};
pub use tile::{PostTileData, Tile};

/// Configuration owned by one grid for its lifetime
///
/// The defaults lay square cells with no gutter and repeat the row pattern
/// when there are more tiles than template slots.
///
/// # Examples
///
/// ```
/// let cfg = tilegrid::GridConfig::default();
/// assert_eq!(cfg.padding, 0);
/// assert_eq!(cfg.overflow, tilegrid::Overflow::Repeat);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    /// Column count used when the column strategy does not take it from the template
    pub columns: u32,
    /// Gap between neighbouring tiles and rows, in pixels
    pub padding: u32,
    /// How tall each row is
    pub row_height: RowHeight,
    /// What happens to tiles beyond the last template row
    pub overflow: Overflow,
    /// Animated redraw settings
    pub animation: AnimationConfig,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 4,
            padding: 0,
            row_height: RowHeight::default(),
            overflow: Overflow::default(),
            animation: AnimationConfig::default(),
        }
    }
}

/// Rule for deriving a row's pixel height
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowHeight {
    /// Every row is this many pixels tall
    Fixed(u32),
    /// Row height is the column width times the ratio
    Aspect(f32),
    /// Row height keeps the narrowest tile in the row at the ratio
    SpanAspect(f32),
}

impl Default for RowHeight {
    fn default() -> Self {
        RowHeight::Aspect(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    /// Cycle the row pattern until every tile is placed
    #[default]
    Repeat,
    /// Place at most one pass of the template; remaining tiles stay hidden
    Truncate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    #[default]
    EaseOut,
    EaseInOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationConfig {
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 300,
            easing: Easing::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GridConfig::default();
        assert_eq!(config.columns, 4);
        assert_eq!(config.row_height, RowHeight::Aspect(1.0));
        assert_eq!(config.animation.duration_ms, 300);
    }

    #[test]
    fn test_easing_names() {
        let e: Easing = serde_json::from_str("\"ease-in-out\"").unwrap();
        assert_eq!(e, Easing::EaseInOut);
        let o: Overflow = serde_json::from_str("\"truncate\"").unwrap();
        assert_eq!(o, Overflow::Truncate);
    }
}
