//! Per-page registry of grid instances
//!
//! The host renders any number of grids on one page. Each registration gets
//! a page-unique id and a payload entry; the page's client data is a pure
//! serialization of all entries. Page assets need enqueueing once, when the
//! first grid is registered.

use crate::options::DisplayOptions;
use crate::template::{TemplateKey, TemplateSpec};
use crate::tile::{prepare_posts, PostTileData};
use crate::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A user-selectable template: its slug and display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateName {
    pub slug: String,
    pub name: String,
}

/// Client data for one grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPayload {
    pub id: String,
    pub row_templates: BTreeMap<TemplateKey, TemplateSpec>,
    /// Names of the integer-keyed templates, in key order
    #[serde(default)]
    pub template_names: Vec<TemplateName>,
    pub posts: Vec<PostTileData>,
    #[serde(default)]
    pub options: DisplayOptions,
}

impl GridPayload {
    pub fn from_json(json: &str) -> Result<Self> {
        let payload: Self = serde_json::from_str(json)?;
        payload.options.validate()?;
        Ok(payload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Assets {
    #[default]
    NotNeeded,
    Pending,
    Enqueued,
}

/// Grids registered while rendering one page
#[derive(Debug, Default)]
pub struct PageRegistry {
    next_id: usize,
    assets: Assets,
    grids: BTreeMap<String, GridPayload>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a grid and return its element id.
    ///
    /// `grids` are the selectable templates in display order (the first is
    /// the default); `small` is the small-screen template. An empty post list
    /// renders nothing and returns `None`.
    pub fn register(
        &mut self,
        grids: Vec<(String, TemplateSpec)>,
        small: Option<TemplateSpec>,
        posts: Vec<PostTileData>,
        options: DisplayOptions,
    ) -> Result<Option<String>> {
        if posts.is_empty() {
            return Ok(None);
        }
        options.validate()?;
        let palette = options.palette()?;
        let bylines = options.byline_palette()?;

        let id = format!("wp_tiles_{}", self.next_id);
        self.next_id += 1;

        let mut row_templates = BTreeMap::new();
        let mut template_names = Vec::with_capacity(grids.len());
        for (index, (name, spec)) in grids.into_iter().enumerate() {
            row_templates.insert(TemplateKey::Index(index), spec);
            template_names.push(TemplateName {
                slug: slugify(&name),
                name,
            });
        }
        if let Some(spec) = small {
            row_templates.insert(TemplateKey::small(), spec);
        }

        let posts = prepare_posts(posts, &options, &palette, &bylines);
        debug!("registered grid {} with {} posts", id, posts.len());

        if self.assets == Assets::NotNeeded {
            self.assets = Assets::Pending;
        }
        self.grids.insert(
            id.clone(),
            GridPayload {
                id: id.clone(),
                row_templates,
                template_names,
                posts,
                options,
            },
        );
        Ok(Some(id))
    }

    /// True exactly once per page, after the first grid was registered
    pub fn take_asset_request(&mut self) -> bool {
        if self.assets == Assets::Pending {
            self.assets = Assets::Enqueued;
            true
        } else {
            false
        }
    }

    pub fn get(&self, id: &str) -> Option<&GridPayload> {
        self.grids.get(id)
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Client data for the page, keyed by grid id
    pub fn payload(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.grids
                .iter()
                .filter_map(|(id, grid)| match serde_json::to_value(grid) {
                    Ok(v) => Some((id.clone(), v)),
                    Err(e) => {
                        warn!("grid {} could not be serialized: {}", id, e);
                        None
                    }
                })
                .collect(),
        )
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.grids)?)
    }
}

/// Lower-case, alphanumeric words joined by single dashes
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posts() -> Vec<PostTileData> {
        vec![PostTileData::new(1, "/1", "one"), PostTileData::new(2, "/2", "two")]
    }

    #[test]
    fn ids_count_up_per_page() {
        let mut page = PageRegistry::new();
        let a = page
            .register(vec![("Grid".into(), "4".into())], None, posts(), Default::default())
            .unwrap();
        let b = page
            .register(vec![("Grid".into(), "4".into())], None, posts(), Default::default())
            .unwrap();
        assert_eq!(a.as_deref(), Some("wp_tiles_0"));
        assert_eq!(b.as_deref(), Some("wp_tiles_1"));
        assert_eq!(page.len(), 2);
    }

    #[test]
    fn empty_posts_register_nothing() {
        let mut page = PageRegistry::new();
        let id = page
            .register(vec![("Grid".into(), "4".into())], None, vec![], Default::default())
            .unwrap();
        assert!(id.is_none());
        assert!(page.is_empty());
        assert!(!page.take_asset_request());
    }

    #[test]
    fn assets_are_requested_once() {
        let mut page = PageRegistry::new();
        assert!(!page.take_asset_request());
        page.register(vec![("Grid".into(), "4".into())], None, posts(), Default::default())
            .unwrap();
        page.register(vec![("Grid".into(), "4".into())], None, posts(), Default::default())
            .unwrap();
        assert!(page.take_asset_request());
        assert!(!page.take_asset_request());
    }

    #[test]
    fn payload_keys_templates_by_index_and_small() {
        let mut page = PageRegistry::new();
        let id = page
            .register(
                vec![
                    ("My Grid!".into(), "1 1 1 1".into()),
                    ("Big one".into(), "4".into()),
                ],
                Some("2 2".into()),
                posts(),
                Default::default(),
            )
            .unwrap()
            .unwrap();

        let payload = page.payload();
        let grid = &payload[&id];
        assert_eq!(grid["id"], id.as_str());
        assert_eq!(grid["rowTemplates"]["0"], "1 1 1 1");
        assert_eq!(grid["rowTemplates"]["1"], "4");
        assert_eq!(grid["rowTemplates"]["small"], "2 2");
        assert_eq!(grid["templateNames"][0]["slug"], "my-grid");
        assert_eq!(grid["posts"].as_array().map(Vec::len), Some(2));
        assert!(grid["posts"][0]["color"].as_str().unwrap().starts_with("rgba("));
        assert_eq!(grid["posts"][0]["bylineColor"], "rgba(0,0,0,0.8)");

        let back: BTreeMap<String, GridPayload> = serde_json::from_str(&page.to_json().unwrap()).unwrap();
        assert_eq!(back.get(&id), page.get(&id));
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("  Hello, World  "), "hello-world");
        assert_eq!(slugify("3 col -- mixed"), "3-col-mixed");
        assert_eq!(slugify("!!!"), "");
    }
}
