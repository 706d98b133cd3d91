//! Row templates and the per-grid template store
//!
//! A row template is an ordered list of rows, each row an ordered list of
//! column spans. Every row must fill the grid exactly: its spans sum to the
//! configured column count and each span is positive.
//!
//! Templates arrive in three shapes which all parse to the same value:
//!
//! - structured rows: `[[1, 1, 1, 1], [2, 2], [4]]`
//! - an array of lines: `["1 1 1 1", "2, 2", "4"]`
//! - a newline-delimited string: `"1 1 1 1\n2 2\n\n4"`
//!
//! Blank lines are dropped and tokens are split on commas and whitespace.

use crate::{Error, Result};
use log::debug;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Unvalidated template description as supplied by the host page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateSpec {
    /// Already-structured rows of spans
    Rows(Vec<Vec<i64>>),
    /// One string per row
    Lines(Vec<String>),
    /// Newline-delimited rows
    Text(String),
}

impl TemplateSpec {
    /// Column count implied by the first non-empty row, if it can be read.
    pub fn infer_columns(&self) -> Option<u32> {
        let rows = self.raw_rows().ok()?;
        let sum = checked_sum(rows.first()?)?;
        u32::try_from(sum).ok().filter(|c| *c > 0)
    }

    fn raw_rows(&self) -> Result<Vec<Vec<i64>>> {
        match self {
            TemplateSpec::Rows(rows) => Ok(rows.clone()),
            TemplateSpec::Lines(lines) => parse_lines(lines.iter().map(String::as_str)),
            TemplateSpec::Text(text) => parse_lines(text.lines()),
        }
    }
}

impl From<&str> for TemplateSpec {
    fn from(text: &str) -> Self {
        TemplateSpec::Text(text.to_string())
    }
}

impl From<Vec<Vec<i64>>> for TemplateSpec {
    fn from(rows: Vec<Vec<i64>>) -> Self {
        TemplateSpec::Rows(rows)
    }
}

fn checked_sum(spans: &[i64]) -> Option<i64> {
    spans.iter().try_fold(0i64, |acc, s| acc.checked_add(*s))
}

fn parse_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Result<Vec<Vec<i64>>> {
    let mut rows = Vec::new();
    for line in lines.map(str::trim).filter(|l| !l.is_empty()) {
        let row = rows.len();
        let spans = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| {
                t.parse::<i64>()
                    .map_err(|_| Error::malformed(row, format!("invalid span '{}'", t)))
            })
            .collect::<Result<Vec<_>>>()?;
        rows.push(spans);
    }
    Ok(rows)
}

/// A validated, immutable row template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowTemplate {
    columns: u32,
    rows: Vec<Vec<u32>>,
    /// Explicit row height in pixels, overriding the grid's row-height rule
    #[serde(skip_serializing_if = "Option::is_none")]
    row_height: Option<u32>,
}

impl RowTemplate {
    /// Parse and validate a template against the grid's column count
    pub fn from_spec(spec: &TemplateSpec, columns: u32) -> Result<Self> {
        Self::from_rows(spec.raw_rows()?, columns)
    }

    /// Validate structured rows against the grid's column count
    pub fn from_rows(rows: Vec<Vec<i64>>, columns: u32) -> Result<Self> {
        if columns == 0 {
            return Err(Error::ConfigError("column count must be positive".into()));
        }
        if rows.is_empty() {
            return Err(Error::malformed(0, "template has no rows"));
        }

        let mut validated = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            if row.is_empty() {
                return Err(Error::malformed(index, "row has no spans"));
            }
            if let Some(bad) = row.iter().find(|s| **s <= 0) {
                return Err(Error::malformed(index, format!("non-positive span {}", bad)));
            }
            let sum = checked_sum(&row)
                .ok_or_else(|| Error::malformed(index, "span sum overflows"))?;
            if sum != i64::from(columns) {
                return Err(Error::malformed(
                    index,
                    format!("spans sum to {}, expected {}", sum, columns),
                ));
            }
            let spans = row
                .into_iter()
                .map(|s| u32::try_from(s).map_err(|_| Error::malformed(index, "span out of range")))
                .collect::<Result<Vec<_>>>()?;
            validated.push(spans);
        }

        Ok(Self {
            columns,
            rows: validated,
            row_height: None,
        })
    }

    /// Same template with a fixed pixel row height
    pub fn with_row_height(mut self, px: u32) -> Self {
        self.row_height = Some(px);
        self
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> &[Vec<u32>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row_height(&self) -> Option<u32> {
        self.row_height
    }

    /// Row pattern for the given row index, repeating the template cyclically
    pub fn row_cycled(&self, index: usize) -> &[u32] {
        &self.rows[index % self.rows.len()]
    }

    /// Number of tiles one pass over the template consumes
    pub fn slots(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

impl fmt::Display for RowTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let line: Vec<String> = row.iter().map(u32::to_string).collect();
            write!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// Key a template is registered under.
///
/// Integer keys are user-selectable alternates in display order (key 0 is
/// the default); named keys are special slots such as `"small"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemplateKey {
    Index(usize),
    Named(String),
}

impl TemplateKey {
    pub const DEFAULT: TemplateKey = TemplateKey::Index(0);

    pub fn small() -> Self {
        TemplateKey::Named("small".to_string())
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKey::Index(i) => write!(f, "{}", i),
            TemplateKey::Named(name) => f.write_str(name),
        }
    }
}

impl FromStr for TemplateKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().parse::<usize>() {
            Ok(i) => TemplateKey::Index(i),
            Err(_) => TemplateKey::Named(s.trim().to_string()),
        })
    }
}

impl From<usize> for TemplateKey {
    fn from(i: usize) -> Self {
        TemplateKey::Index(i)
    }
}

impl From<&str> for TemplateKey {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(key) => key,
            Err(never) => match never {},
        }
    }
}

impl Serialize for TemplateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TemplateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(TemplateKey::from(raw.as_str()))
    }
}

/// Named templates for one grid instance
#[derive(Debug, Clone)]
pub struct TemplateStore {
    columns: u32,
    templates: BTreeMap<TemplateKey, RowTemplate>,
}

impl TemplateStore {
    pub fn new(columns: u32) -> Self {
        Self {
            columns,
            templates: BTreeMap::new(),
        }
    }

    /// Build a store from raw specs.
    ///
    /// Specs that fail to parse are left out and returned alongside the
    /// store, so the caller can report them and fall back.
    pub fn from_specs<'a, I>(specs: I, columns: u32) -> (Self, Vec<(TemplateKey, Error)>)
    where
        I: IntoIterator<Item = (&'a TemplateKey, &'a TemplateSpec)>,
    {
        let mut store = Self::new(columns);
        let mut rejected = Vec::new();
        for (key, spec) in specs {
            if let Err(e) = store.insert_spec(key.clone(), spec) {
                rejected.push((key.clone(), e));
            }
        }
        (store, rejected)
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Parse `spec` and register it under `key`
    pub fn insert_spec(&mut self, key: TemplateKey, spec: &TemplateSpec) -> Result<()> {
        let template = RowTemplate::from_spec(spec, self.columns)?;
        self.insert(key, template)
    }

    /// Register an already-parsed template, replacing any previous one
    pub fn insert(&mut self, key: TemplateKey, template: RowTemplate) -> Result<()> {
        if template.columns() != self.columns {
            return Err(Error::malformed(
                0,
                format!(
                    "template spans {} columns, store expects {}",
                    template.columns(),
                    self.columns
                ),
            ));
        }
        debug!("registered template {} ({} rows)", key, template.row_count());
        self.templates.insert(key, template);
        Ok(())
    }

    pub fn get(&self, key: &TemplateKey) -> Option<&RowTemplate> {
        self.templates.get(key)
    }

    pub fn contains(&self, key: &TemplateKey) -> bool {
        self.templates.contains_key(key)
    }

    /// The template under `key`, else the one under `fallback`
    pub fn select(&self, key: &TemplateKey, fallback: &TemplateKey) -> Result<&RowTemplate> {
        if let Some(t) = self.templates.get(key) {
            return Ok(t);
        }
        match self.templates.get(fallback) {
            Some(t) => {
                debug!("template {} missing, using {}", key, fallback);
                Ok(t)
            }
            None => Err(Error::TemplateNotFound {
                key: key.to_string(),
            }),
        }
    }

    /// Integer-keyed templates in display order
    pub fn alternates(&self) -> impl Iterator<Item = (usize, &RowTemplate)> {
        self.templates.iter().filter_map(|(k, t)| match k {
            TemplateKey::Index(i) => Some((*i, t)),
            TemplateKey::Named(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
