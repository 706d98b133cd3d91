//! Small-screen template switching
//!
//! The controller keeps a grid on its small-screen template while the
//! container is narrower than the threshold. Crossing into the small side
//! remembers whatever template was active (default or user-selected), and
//! crossing back restores exactly that template.

use crate::engine::Grid;
use crate::template::RowTemplate;
use log::debug;

/// Which side of the threshold the applied template belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Small,
    Default,
}

pub struct BreakpointController {
    small: Option<RowTemplate>,
    default: RowTemplate,
    threshold_px: u32,
    applied: Side,
    /// Template to restore when leaving the small side
    remembered: Option<RowTemplate>,
}

impl BreakpointController {
    pub const DEFAULT_THRESHOLD: u32 = 800;

    /// Measure the grid's container once and apply the matching template.
    ///
    /// Without a small template the controller never switches.
    pub fn new(
        grid: &mut Grid,
        small: Option<RowTemplate>,
        default: RowTemplate,
        threshold_px: u32,
    ) -> Self {
        let mut controller = Self {
            small,
            default,
            threshold_px,
            applied: Side::Default,
            remembered: None,
        };

        let width = grid.measure_width();
        match &controller.small {
            Some(small) if width < threshold_px => {
                grid.set_template(small.clone());
                controller.remembered = Some(controller.default.clone());
                controller.applied = Side::Small;
            }
            _ => {
                if grid.template() != &controller.default {
                    grid.set_template(controller.default.clone());
                }
            }
        }
        debug!(
            "breakpoint at {}px, container {}px, applied {:?}",
            threshold_px, width, controller.applied
        );
        controller
    }

    pub fn threshold(&self) -> u32 {
        self.threshold_px
    }

    pub fn applied(&self) -> Side {
        self.applied
    }

    pub fn remembered(&self) -> Option<&RowTemplate> {
        self.remembered.as_ref()
    }

    pub fn default_template(&self) -> &RowTemplate {
        &self.default
    }

    /// Re-measure after a (debounced) resize and swap templates on a crossing.
    ///
    /// Returns true when the grid's template changed.
    pub fn on_resize(&mut self, grid: &mut Grid) -> bool {
        let width = grid.measure_width();
        if width < self.threshold_px {
            let Some(small) = &self.small else {
                return false;
            };
            if self.applied == Side::Small {
                return false;
            }
            if self.remembered.is_none() {
                self.remembered = Some(grid.template().clone());
            }
            grid.set_template(small.clone());
            self.applied = Side::Small;
            debug!("container {}px below {}px: small template", width, self.threshold_px);
            true
        } else if let Some(previous) = self.remembered.take() {
            grid.set_template(previous);
            self.applied = Side::Default;
            debug!("container {}px: restored previous template", width);
            true
        } else {
            false
        }
    }

    /// Apply a template the user picked.
    ///
    /// The choice holds until the next resize re-evaluates the width. Picked
    /// while on the small side, it becomes the template restored when the
    /// container widens again.
    pub fn select(&mut self, grid: &mut Grid, template: RowTemplate) {
        // a remembered template means the container is still below the threshold
        if self.remembered.is_some() {
            self.remembered = Some(template.clone());
        }
        grid.set_template(template);
        self.applied = Side::Default;
    }
}
