//! One mounted grid on a page
//!
//! Wires a [`GridPayload`] to the engine: builds the template store, the grid
//! and its breakpoint controller, performs the initial layout, and handles
//! resize notifications and template-control clicks afterwards. Instances
//! share nothing with each other.

use crate::breakpoint::BreakpointController;
use crate::debounce::Debouncer;
use crate::engine::{Grid, GridStrategies};
use crate::options::DisplayOptions;
use crate::registry::GridPayload;
use crate::render::RenderTarget;
use crate::template::{RowTemplate, TemplateKey, TemplateSpec, TemplateStore};
use crate::{Error, Result};
use log::{debug, warn};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A clickable entry in the grid's template list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateControl {
    /// Position in the list; clicking selects template key `index`
    pub index: usize,
    pub slug: String,
    pub name: String,
    pub selected: bool,
}

pub struct TileGridInstance {
    id: String,
    options: DisplayOptions,
    store: TemplateStore,
    grid: Grid,
    breakpoints: BreakpointController,
    controls: Vec<TemplateControl>,
    diagnostics: Vec<Error>,
    wrapper_height: Arc<AtomicU32>,
    completed: Arc<AtomicU64>,
}

impl TileGridInstance {
    /// Build the grid for `payload` inside `target` and draw it once.
    ///
    /// Templates that fail to parse are skipped and kept as diagnostics; the
    /// mount only fails when no usable default template remains.
    pub fn mount(payload: &GridPayload, target: Box<dyn RenderTarget>) -> Result<Self> {
        let options = payload.options.clone();
        options.validate()?;

        let columns = match options.columns {
            Some(columns) => columns,
            None => infer_columns(payload)?,
        };

        let (store, rejected) = TemplateStore::from_specs(&payload.row_templates, columns);
        let mut diagnostics = Vec::new();
        for (key, e) in rejected {
            warn!("grid {}: template {} rejected: {}", payload.id, key, e);
            diagnostics.push(e);
        }

        let fallback = store
            .alternates()
            .next()
            .map(|(i, _)| TemplateKey::Index(i))
            .unwrap_or(TemplateKey::DEFAULT);
        let default = store.select(&TemplateKey::DEFAULT, &fallback)?.clone();
        let small = store.get(&TemplateKey::small()).cloned();

        let mut grid = Grid::new(
            options.grid_config(columns),
            GridStrategies::default(),
            default.clone(),
            target,
        );
        let created = grid.update_tiles(&payload.posts);
        if created < payload.posts.len() {
            debug!(
                "grid {}: {} of {} posts became tiles",
                payload.id,
                created,
                payload.posts.len()
            );
        }

        let breakpoints =
            BreakpointController::new(&mut grid, small, default, options.small_screen_breakpoint);
        let controls = build_controls(payload, &store);

        let mut instance = Self {
            id: payload.id.clone(),
            options,
            store,
            grid,
            breakpoints,
            controls,
            diagnostics,
            wrapper_height: Arc::new(AtomicU32::new(0)),
            completed: Arc::new(AtomicU64::new(0)),
        };
        let animate = instance.options.animate_init();
        instance.relayout(animate);
        Ok(instance)
    }

    fn relayout(&mut self, animate: bool) {
        if let Err(e) = self.grid.resize() {
            warn!("grid {}: {}", self.id, e);
            self.diagnostics.push(e);
        }
        let wrapper = Arc::clone(&self.wrapper_height);
        let completed = Arc::clone(&self.completed);
        self.grid.redraw(animate, move |report| {
            wrapper.store(report.wrapper_height, Ordering::SeqCst);
            completed.fetch_add(1, Ordering::SeqCst);
        });
    }

    /// Handle a settled resize: re-check the breakpoint, re-lay and redraw.
    ///
    /// Returns true when the breakpoint swapped templates.
    pub fn handle_resize(&mut self) -> bool {
        let swapped = self.breakpoints.on_resize(&mut self.grid);
        let animate = self.options.animate_resize();
        self.relayout(animate);
        swapped
    }

    /// The user clicked control `index`.
    ///
    /// An unknown or rejected template falls back to the default and is
    /// recorded as a diagnostic.
    pub fn select_template(&mut self, index: usize) {
        let key = TemplateKey::Index(index);
        if !self.store.contains(&key) {
            let e = Error::TemplateNotFound {
                key: key.to_string(),
            };
            warn!("grid {}: {}", self.id, e);
            self.diagnostics.push(e);
        }
        let template = match self.store.select(&key, &TemplateKey::DEFAULT) {
            Ok(t) => t.clone(),
            Err(_) => self.breakpoints.default_template().clone(),
        };
        self.breakpoints.select(&mut self.grid, template);
        for control in &mut self.controls {
            control.selected = control.index == index;
        }
        let animate = self.options.animate_template();
        self.relayout(animate);
    }

    /// A debounced resize handler for this instance.
    ///
    /// Feed every host resize notification into the returned debouncer; the
    /// instance handles the last one once resizing has been quiet for
    /// `resize_debounce_ms`. Dropping the instance turns the handler into a
    /// no-op.
    pub fn resize_listener(this: &Arc<Mutex<Self>>) -> Result<Debouncer<()>> {
        let wait = {
            let guard = this.lock().unwrap_or_else(|e| e.into_inner());
            Duration::from_millis(guard.options.resize_debounce_ms)
        };
        let weak = Arc::downgrade(this);
        Debouncer::new(
            move |()| {
                if let Some(instance) = weak.upgrade() {
                    let mut guard = instance.lock().unwrap_or_else(|e| e.into_inner());
                    guard.handle_resize();
                }
            },
            wait,
            false,
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn options(&self) -> &DisplayOptions {
        &self.options
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    pub fn breakpoints(&self) -> &BreakpointController {
        &self.breakpoints
    }

    /// Template list to show; empty when there is nothing to choose between
    pub fn controls(&self) -> &[TemplateControl] {
        &self.controls
    }

    pub fn diagnostics(&self) -> &[Error] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Error> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Wrapper height reported by the most recent completed redraw
    pub fn wrapper_height(&self) -> u32 {
        self.wrapper_height.load(Ordering::SeqCst)
    }

    /// Number of redraws whose completion has fired
    pub fn completed_redraws(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }
}

/// Column count for a payload that does not configure one.
///
/// Every count implied by a template's first row is a candidate; the one
/// under which the most templates validate wins, ties going to the count the
/// default template implies. A malformed default therefore cannot force its
/// own width onto the rest of the templates.
fn infer_columns(payload: &GridPayload) -> Result<u32> {
    let mut candidates: Vec<u32> = Vec::new();
    // BTreeMap order puts the default key first
    for columns in payload.row_templates.values().filter_map(TemplateSpec::infer_columns) {
        if !candidates.contains(&columns) {
            candidates.push(columns);
        }
    }
    let accepted = |columns: u32| {
        payload
            .row_templates
            .values()
            .filter(|spec| RowTemplate::from_spec(spec, columns).is_ok())
            .count()
    };
    let columns = candidates
        .iter()
        .rev()
        .copied()
        .max_by_key(|c| accepted(*c))
        .ok_or_else(|| {
            Error::ConfigError(format!("grid {}: cannot determine column count", payload.id))
        })?;
    debug!("grid {}: inferred {} columns", payload.id, columns);
    Ok(columns)
}

fn build_controls(payload: &GridPayload, store: &TemplateStore) -> Vec<TemplateControl> {
    let controls: Vec<TemplateControl> = if payload.template_names.is_empty() {
        store
            .alternates()
            .map(|(index, _)| TemplateControl {
                index,
                slug: format!("template-{}", index + 1),
                name: format!("Template {}", index + 1),
                selected: false,
            })
            .collect()
    } else {
        payload
            .template_names
            .iter()
            .enumerate()
            .map(|(index, n)| TemplateControl {
                index,
                slug: n.slug.clone(),
                name: n.name.clone(),
                selected: false,
            })
            .collect()
    };
    if controls.len() > 1 {
        controls
    } else {
        Vec::new()
    }
}
