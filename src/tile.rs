//! Tiles and the tile factory
//!
//! A tile is one visual unit for one post. The factory turns a post record
//! into a [`Tile`] whose [`TileContent`] describes what to draw: an image
//! layer when the post has an image, otherwise a solid colour, plus an
//! optional byline with the title and category. The content can be handed
//! to any render target or turned into HTML with [`TileContent::markup`].

use crate::layout::Placement;
use crate::options::DisplayOptions;
use crate::palette::Palette;
use crate::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Post record supplied by the host for one tile
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostTileData {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub hide_byline: bool,
    /// Byline background as an `rgba(...)` colour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byline_color: Option<String>,
}

impl PostTileData {
    pub fn new(id: u64, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, img: impl Into<String>) -> Self {
        self.img = Some(img.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_byline_color(mut self, color: impl Into<String>) -> Self {
        self.byline_color = Some(color.into());
        self
    }

    pub fn hiding_byline(mut self) -> Self {
        self.hide_byline = true;
        self
    }

    /// Image URL, treating an empty string as no image
    pub fn image(&self) -> Option<&str> {
        self.img.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Background layer of a tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TileBackground {
    Image { url: String },
    Color,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Byline {
    pub title: String,
    pub category: String,
    /// Byline sits on a colour tile rather than over an image
    pub text_only: bool,
    pub background: Option<String>,
}

/// Render description for one tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileContent {
    pub background: TileBackground,
    pub background_color: String,
    pub byline: Option<Byline>,
    /// Navigation target when the tile is clicked
    pub href: Option<String>,
}

impl TileContent {
    pub fn has_image(&self) -> bool {
        matches!(self.background, TileBackground::Image { .. })
    }

    /// CSS classes for the tile body
    pub fn classes(&self) -> String {
        let mut class = if self.has_image() {
            String::from("tile-bg")
        } else {
            String::from("tile-color")
        };
        if self.byline.is_none() {
            class.push_str(" hide-byline");
        }
        class
    }

    /// HTML for the tile body with all text and attributes escaped
    pub fn markup(&self) -> String {
        let mut style = format!("background-color: {};", escape_text(&self.background_color));
        if let TileBackground::Image { url } = &self.background {
            let _ = write!(style, " background-image: url({});", escape_text(url));
        }

        let mut html = format!("<div class='{}' style='{}'", self.classes(), style);
        if let Some(href) = &self.href {
            let _ = write!(html, " data-href='{}'", escape_text(href));
        }
        html.push('>');

        if let Some(byline) = &self.byline {
            html.push_str(if byline.text_only {
                "<div class='tile-byline tile-text-only'"
            } else {
                "<div class='tile-byline'"
            });
            if let Some(bg) = &byline.background {
                let _ = write!(html, " style='background-color: {};'", escape_text(bg));
            }
            html.push('>');
            let _ = write!(
                html,
                "<div class='title'>{}</div><div class='category'>{}</div></div>",
                escape_text(&byline.title),
                escape_text(&byline.category)
            );
        }
        html.push_str("</div>");
        html
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// One post laid out in the grid
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub id: u64,
    pub content: TileContent,
    /// Set by the grid's layout pass; `None` until laid out or when hidden
    pub placement: Option<Placement>,
}

impl Tile {
    pub fn new(id: u64, content: TileContent) -> Self {
        Self {
            id,
            content,
            placement: None,
        }
    }
}

/// Strategy that turns post records into tiles
pub trait TileFactory: Send + Sync {
    fn create_tile(&self, post: &PostTileData) -> Result<Tile>;
}

/// Default factory: image-or-colour background with an optional byline
#[derive(Debug, Clone)]
pub struct PostTileFactory {
    /// Colour used when a post carries none
    pub fallback_color: String,
}

impl Default for PostTileFactory {
    fn default() -> Self {
        Self {
            fallback_color: String::from("#009999"),
        }
    }
}

impl TileFactory for PostTileFactory {
    fn create_tile(&self, post: &PostTileData) -> Result<Tile> {
        let url = post.url.trim();
        let title = post.title.trim();
        if url.is_empty() && title.is_empty() {
            return Err(Error::InvalidPost(format!(
                "post {} has neither url nor title",
                post.id
            )));
        }

        let background = match post.image() {
            Some(img) => TileBackground::Image {
                url: img.to_string(),
            },
            None => TileBackground::Color,
        };
        let byline = (!post.hide_byline).then(|| Byline {
            title: title.to_string(),
            category: post.category.clone(),
            text_only: background == TileBackground::Color,
            background: post
                .byline_color
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        });
        let href = if url.is_empty() {
            debug!("post {} has no url; tile will not link", post.id);
            None
        } else {
            Some(url.to_string())
        };
        let background_color = if post.color.trim().is_empty() {
            self.fallback_color.clone()
        } else {
            post.color.trim().to_string()
        };

        Ok(Tile::new(
            post.id,
            TileContent {
                background,
                background_color,
                byline,
                href,
            },
        ))
    }
}

/// Apply the page's display options to posts before they become tiles.
///
/// Text-only mode strips images; images-only mode drops posts without one
/// (so both together yield no tiles). Posts without a colour get one from
/// the palette and a byline background from `bylines`; a global byline
/// switch hides every byline.
pub fn prepare_posts(
    posts: Vec<PostTileData>,
    options: &DisplayOptions,
    palette: &Palette,
    bylines: &Palette,
) -> Vec<PostTileData> {
    posts
        .into_iter()
        .filter_map(|mut post| {
            if options.text_only {
                post.img = None;
            }
            if options.images_only && post.image().is_none() {
                debug!("dropping post {} without image", post.id);
                return None;
            }
            if post.color.trim().is_empty() {
                if let Some(color) = palette.color_for(post.id) {
                    post.color = color.to_string();
                }
            }
            if post.byline_color.is_none() {
                post.byline_color = bylines.color_for(post.id).map(str::to_string);
            }
            if options.hide_byline {
                post.hide_byline = true;
            }
            Some(post)
        })
        .collect()
}
