//! The grid engine
//!
//! A [`Grid`] owns its tiles, the active row template and the render target,
//! and moves between two states:
//!
//! - `Dirty`: tiles, template or container width changed and placements are stale
//! - `Clean`: every tile's placement matches the active template and width
//!
//! `resize()` is the only way from `Dirty` to `Clean`. It is a no-op on a
//! clean grid, so running it twice gives identical placements. `redraw()`
//! pushes the current placements to the render target and reports
//! completion exactly once.

use crate::layout::{layout_tiles, GridLayout, Placement};
use crate::render::{Frame, RenderTarget, TileFrame};
use crate::template::RowTemplate;
use crate::tile::{PostTileData, PostTileFactory, Tile, TileFactory};
use crate::{GridConfig, Result};
use log::{debug, warn};
use std::time::Duration;
use tokio::runtime::Handle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutState {
    Clean,
    Dirty,
}

/// Decides how many columns the grid lays out for a template
pub trait ColumnStrategy: Send + Sync {
    fn columns(&self, template: &RowTemplate, config: &GridConfig) -> u32;
}

/// Column count comes from the template itself
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateColumns;

impl ColumnStrategy for TemplateColumns {
    fn columns(&self, template: &RowTemplate, _config: &GridConfig) -> u32 {
        template.columns()
    }
}

/// Column count comes from the grid configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfiguredColumns;

impl ColumnStrategy for ConfiguredColumns {
    fn columns(&self, _template: &RowTemplate, config: &GridConfig) -> u32 {
        config.columns
    }
}

/// The strategy pair a grid is built with
pub struct GridStrategies {
    pub layout_columns: Box<dyn ColumnStrategy>,
    pub create_tile: Box<dyn TileFactory>,
}

impl Default for GridStrategies {
    fn default() -> Self {
        Self {
            layout_columns: Box::new(TemplateColumns),
            create_tile: Box::new(PostTileFactory::default()),
        }
    }
}

/// Passed to the completion callback of a redraw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedrawReport {
    /// Counts redraws on this grid, starting at 1
    pub generation: u64,
    pub container_height: u32,
    /// Height the wrapping element needs to enclose every tile
    pub wrapper_height: u32,
    pub tile_count: usize,
    pub animated: bool,
}

/// How a redraw's completion was delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawCompletion {
    /// The callback already ran
    Immediate,
    /// The callback runs when the animation ends
    Scheduled,
}

pub struct Grid {
    config: GridConfig,
    strategies: GridStrategies,
    target: Box<dyn RenderTarget>,
    template: RowTemplate,
    /// Template of the last successful layout pass
    last_good: Option<RowTemplate>,
    tiles: Vec<Tile>,
    state: LayoutState,
    container_width: u32,
    column_width: u32,
    container_height: u32,
    rows: usize,
    redraws: u64,
}

impl Grid {
    pub fn new(
        config: GridConfig,
        strategies: GridStrategies,
        template: RowTemplate,
        target: Box<dyn RenderTarget>,
    ) -> Self {
        let container_width = target.container_width();
        Self {
            config,
            strategies,
            target,
            template,
            last_good: None,
            tiles: Vec::new(),
            state: LayoutState::Dirty,
            container_width,
            column_width: 0,
            container_height: 0,
            rows: 0,
            redraws: 0,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn template(&self) -> &RowTemplate {
        &self.template
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.state == LayoutState::Dirty
    }

    pub fn mark_dirty(&mut self) {
        self.state = LayoutState::Dirty;
    }

    /// Width measured at the last layout pass
    pub fn container_width(&self) -> u32 {
        self.container_width
    }

    /// Measure the container's current width
    pub fn measure_width(&self) -> u32 {
        self.target.container_width()
    }

    pub fn column_width(&self) -> u32 {
        self.column_width
    }

    /// Height of the laid-out rows
    pub fn container_height(&self) -> u32 {
        self.container_height
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Height the wrapper around the grid needs: the lowest tile edge plus one gutter
    pub fn wrapper_height(&self) -> u32 {
        self.tiles
            .iter()
            .filter_map(|t| t.placement.map(|p| p.rect.bottom()))
            .max()
            .map_or(0, |bottom| bottom + self.config.padding)
    }

    pub fn placements(&self) -> Vec<Option<Placement>> {
        self.tiles.iter().map(|t| t.placement).collect()
    }

    /// Replace the tile list; order decides how rows fill
    pub fn set_tiles(&mut self, tiles: Vec<Tile>) {
        self.tiles = tiles;
        self.state = LayoutState::Dirty;
    }

    /// Build tiles from posts with the grid's tile factory.
    ///
    /// Posts the factory rejects are skipped with a warning. Returns the
    /// number of tiles created.
    pub fn update_tiles(&mut self, posts: &[PostTileData]) -> usize {
        let tiles: Vec<Tile> = posts
            .iter()
            .filter_map(|post| match self.strategies.create_tile.create_tile(post) {
                Ok(tile) => Some(tile),
                Err(e) => {
                    warn!("skipping tile for post {}: {}", post.id, e);
                    None
                }
            })
            .collect();
        let created = tiles.len();
        self.set_tiles(tiles);
        created
    }

    /// Like [`Grid::update_tiles`] but from raw host JSON, skipping records
    /// that do not deserialize.
    pub fn update_tiles_from_json(&mut self, posts: &[serde_json::Value]) -> usize {
        let parsed: Vec<PostTileData> = posts
            .iter()
            .enumerate()
            .filter_map(|(i, raw)| match serde_json::from_value(raw.clone()) {
                Ok(post) => Some(post),
                Err(e) => {
                    warn!("skipping malformed post record {}: {}", i, e);
                    None
                }
            })
            .collect();
        self.update_tiles(&parsed)
    }

    pub fn set_template(&mut self, template: RowTemplate) {
        self.template = template;
        self.state = LayoutState::Dirty;
    }

    /// Recompute placements if the grid is dirty or the container width changed.
    ///
    /// On a layout fault the grid falls back to the last template that laid
    /// out successfully (or clears all placements if there is none), ends up
    /// `Clean` either way, and returns the fault.
    pub fn resize(&mut self) -> Result<()> {
        let width = self.target.container_width();
        if width != self.container_width {
            self.container_width = width;
            self.state = LayoutState::Dirty;
        }
        if self.state == LayoutState::Clean {
            return Ok(());
        }

        let result = self.compute(&self.template);
        let outcome = match result {
            Ok(layout) => {
                self.apply_layout(layout);
                self.last_good = Some(self.template.clone());
                Ok(())
            }
            Err(e) => {
                warn!("layout failed: {}", e);
                self.recover();
                Err(e)
            }
        };
        self.state = LayoutState::Clean;
        outcome
    }

    fn compute(&self, template: &RowTemplate) -> Result<GridLayout> {
        let columns = self.strategies.layout_columns.columns(template, &self.config);
        layout_tiles(
            template,
            columns,
            self.tiles.len(),
            self.container_width,
            &self.config,
        )
    }

    fn recover(&mut self) {
        if let Some(good) = self.last_good.clone() {
            if good != self.template {
                match self.compute(&good) {
                    Ok(layout) => {
                        debug!("restored last good template");
                        self.template = good;
                        self.apply_layout(layout);
                        return;
                    }
                    Err(e) => warn!("last good template no longer lays out: {}", e),
                }
            }
        }
        self.apply_layout(GridLayout {
            placements: vec![None; self.tiles.len()],
            ..Default::default()
        });
    }

    fn apply_layout(&mut self, layout: GridLayout) {
        debug!(
            "laid out {} tiles in {} rows ({}px columns, {}px tall)",
            self.tiles.len(),
            layout.rows,
            layout.column_width,
            layout.height
        );
        for (tile, placement) in self.tiles.iter_mut().zip(layout.placements) {
            tile.placement = placement;
        }
        self.column_width = layout.column_width;
        self.container_height = layout.height;
        self.rows = layout.rows;
    }

    /// Push the current placements to the render target.
    ///
    /// Without animation `on_complete` runs before this returns. With
    /// animation it runs once the configured duration has elapsed on the
    /// current tokio runtime; outside a runtime the frame is still animated
    /// by the target but completion is reported right away.
    pub fn redraw<F>(&mut self, animate: bool, on_complete: F) -> RedrawCompletion
    where
        F: FnOnce(RedrawReport) + Send + 'static,
    {
        self.redraws += 1;
        let transition = animate.then_some(self.config.animation);
        let frame = Frame {
            tiles: self
                .tiles
                .iter()
                .map(|t| TileFrame {
                    id: t.id,
                    rect: t.placement.map(|p| p.rect),
                    content: t.content.clone(),
                })
                .collect(),
            container_height: self.container_height,
            transition,
        };
        self.target.apply(&frame);

        let report = RedrawReport {
            generation: self.redraws,
            container_height: self.container_height,
            wrapper_height: self.wrapper_height(),
            tile_count: self.tiles.len(),
            animated: animate,
        };

        let duration = Duration::from_millis(self.config.animation.duration_ms);
        if !animate || duration.is_zero() {
            on_complete(report);
            return RedrawCompletion::Immediate;
        }
        match Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    tokio::time::sleep(duration).await;
                    on_complete(report);
                });
                RedrawCompletion::Scheduled
            }
            Err(_) => {
                debug!("no runtime for animation timer; completing redraw immediately");
                on_complete(report);
                RedrawCompletion::Immediate
            }
        }
    }
}
