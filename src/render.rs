//! Render targets
//!
//! The grid does not draw anything itself. After a layout pass it hands a
//! [`Frame`] to a [`RenderTarget`], which owns the real container (a DOM
//! element, a widget, a test buffer) and reports that container's width.

use crate::layout::Rect;
use crate::tile::TileContent;
use crate::AnimationConfig;
use std::sync::{Arc, Mutex, MutexGuard};

/// One tile as it should appear after a redraw
#[derive(Debug, Clone, PartialEq)]
pub struct TileFrame {
    pub id: u64,
    /// `None` hides the tile
    pub rect: Option<Rect>,
    pub content: TileContent,
}

/// Everything a target needs to paint one redraw
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub tiles: Vec<TileFrame>,
    pub container_height: u32,
    /// Transition to animate towards this frame; `None` snaps into place
    pub transition: Option<AnimationConfig>,
}

/// Container the grid measures and paints into
pub trait RenderTarget: Send {
    /// Current width of the container in pixels
    fn container_width(&self) -> u32;

    /// Move every tile to its new rectangle.
    ///
    /// A frame that arrives while a previous transition is still running
    /// replaces that transition's targets.
    fn apply(&mut self, frame: &Frame);
}

#[derive(Debug, Default)]
struct MemoryState {
    width: u32,
    frames: Vec<Frame>,
}

/// In-memory target that records every frame.
///
/// Clones share state, so a test can keep one handle to resize the
/// container and inspect frames while the grid owns the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryTarget {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryTarget {
    pub fn new(width: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                width,
                frames: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_width(&self, width: u32) {
        self.lock().width = width;
    }

    pub fn frame_count(&self) -> usize {
        self.lock().frames.len()
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.lock().frames.last().cloned()
    }
}

impl RenderTarget for MemoryTarget {
    fn container_width(&self) -> u32 {
        self.lock().width
    }

    fn apply(&mut self, frame: &Frame) {
        self.lock().frames.push(frame.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_target_shares_state_between_clones() {
        let handle = MemoryTarget::new(640);
        let mut owned: Box<dyn RenderTarget> = Box::new(handle.clone());
        assert_eq!(owned.container_width(), 640);

        handle.set_width(320);
        assert_eq!(owned.container_width(), 320);

        owned.apply(&Frame {
            container_height: 42,
            ..Default::default()
        });
        assert_eq!(handle.frame_count(), 1);
        assert_eq!(handle.last_frame().unwrap().container_height, 42);
    }
}
