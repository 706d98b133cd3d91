//! Tile colours: hex parsing, rgba conversion and per-post selection

use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    /// Parse `#rgb` or `#rrggbb` (the `#` is optional)
    pub fn from_hex(color: &str, alpha: f32) -> Result<Self> {
        let digits = color.trim().trim_start_matches('#');
        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => digits.to_string(),
            _ => {
                return Err(Error::ConfigError(format!(
                    "colour '{}' is not #rgb or #rrggbb",
                    color
                )))
            }
        };
        let bytes = hex::decode(&expanded)
            .map_err(|e| Error::ConfigError(format!("colour '{}': {}", color, e)))?;
        Ok(Self {
            r: bytes[0],
            g: bytes[1],
            b: bytes[2],
            a: alpha.clamp(0.0, 1.0),
        })
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

/// `#rrggbb` to an `rgba(...)` string with the given opacity
pub fn hex_to_rgba(color: &str, opacity: f32) -> Result<String> {
    Ok(Rgba::from_hex(color, opacity)?.to_string())
}

/// Colours tiles are painted with when a post has none of its own
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    /// Build an opaque palette from hex colours
    pub fn from_hex_list<S: AsRef<str>>(colors: &[S]) -> Result<Self> {
        Self::from_hex_list_alpha(colors, 1.0)
    }

    /// Build a palette whose colours all carry `alpha`
    pub fn from_hex_list_alpha<S: AsRef<str>>(colors: &[S], alpha: f32) -> Result<Self> {
        let colors = colors
            .iter()
            .map(|c| hex_to_rgba(c.as_ref(), alpha))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { colors })
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Colour for a post. Stable for a given id and palette.
    pub fn color_for(&self, post_id: u64) -> Option<&str> {
        if self.colors.is_empty() {
            return None;
        }
        let digest = Sha256::digest(post_id.to_le_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let index = u64::from_le_bytes(head) % self.colors.len() as u64;
        self.colors.get(index as usize).map(String::as_str)
    }
}
