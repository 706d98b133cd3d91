//! Page-level display options
//!
//! These are the options a host page hands over for every grid it renders.
//! Field names and defaults follow the host's option store, so a JSON dump of
//! those options deserializes directly; absent fields take their defaults.

use crate::palette::Palette;
use crate::{AnimationConfig, Easing, Error, GridConfig, Overflow, Result, RowHeight};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Container widths below this use the small-screen template
    pub small_screen_breakpoint: u32,
    /// Gutter between tiles in pixels
    pub padding: u32,
    /// Hex colours for tiles without a colour of their own
    pub colors: Vec<String>,
    /// Byline background colour, or `random` to pick one from `colors` per post
    pub byline_color: String,
    /// Byline background opacity
    pub byline_opacity: f32,
    pub text_only: bool,
    pub images_only: bool,
    pub hide_byline: bool,
    /// Master switch; when false none of the individual animations run
    pub animated: bool,
    pub animate_init: bool,
    pub animate_resize: bool,
    pub animate_template: bool,
    pub animation_duration_ms: u64,
    pub easing: Easing,
    /// Column count; inferred from the default template when absent
    pub columns: Option<u32>,
    /// Row height as a fraction of column width
    pub row_aspect: f32,
    pub overflow: Overflow,
    /// Quiet period before a burst of resize events is handled
    pub resize_debounce_ms: u64,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            small_screen_breakpoint: 800,
            padding: 10,
            colors: ["#009999", "#1D7373", "#006363", "#33CCCC", "#5CCCCC"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            byline_color: String::from("#000"),
            byline_opacity: 0.8,
            text_only: false,
            images_only: false,
            hide_byline: false,
            animated: true,
            animate_init: true,
            animate_resize: true,
            animate_template: true,
            animation_duration_ms: 300,
            easing: Easing::default(),
            columns: None,
            row_aspect: 1.0,
            overflow: Overflow::default(),
            resize_debounce_ms: 200,
        }
    }
}

impl DisplayOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.columns == Some(0) {
            return Err(Error::ConfigError("columns must be positive".into()));
        }
        if !(self.row_aspect.is_finite() && self.row_aspect > 0.0) {
            return Err(Error::ConfigError(format!(
                "row_aspect must be positive, got {}",
                self.row_aspect
            )));
        }
        if !(0.0..=1.0).contains(&self.byline_opacity) {
            return Err(Error::ConfigError(format!(
                "byline_opacity must be within 0..=1, got {}",
                self.byline_opacity
            )));
        }
        Ok(())
    }

    pub fn animate_init(&self) -> bool {
        self.animated && self.animate_init
    }

    pub fn animate_resize(&self) -> bool {
        self.animated && self.animate_resize
    }

    pub fn animate_template(&self) -> bool {
        self.animated && self.animate_template
    }

    pub fn palette(&self) -> Result<Palette> {
        Palette::from_hex_list(self.colors.as_slice())
    }

    /// Colours for byline backgrounds, translucent at `byline_opacity`.
    ///
    /// A fixed `byline_color` gives a one-colour palette; `random` (or an
    /// empty value) draws from the tile colours instead.
    pub fn byline_palette(&self) -> Result<Palette> {
        let color = self.byline_color.trim();
        if color.is_empty() || color.eq_ignore_ascii_case("random") {
            Palette::from_hex_list_alpha(self.colors.as_slice(), self.byline_opacity)
        } else {
            Palette::from_hex_list_alpha(&[color], self.byline_opacity)
        }
    }

    /// Grid configuration for a grid with `columns` columns
    pub fn grid_config(&self, columns: u32) -> GridConfig {
        GridConfig {
            columns,
            padding: self.padding,
            row_height: RowHeight::Aspect(self.row_aspect),
            overflow: self.overflow,
            animation: AnimationConfig {
                duration_ms: self.animation_duration_ms,
                easing: self.easing,
            },
        }
    }
}
