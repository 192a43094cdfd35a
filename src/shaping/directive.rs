//! Shape directives
//!
//! A directive names which parts of a response to keep. Paths are dot
//! separated field names (`image.url`); a path through a sequence, set or
//! mapping applies to every element.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::errors::{ShapeError, ShapeResult};

/// Output filter for one shaping call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeDirective {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub include: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub exclude: BTreeSet<String>,
    /// Omit fields the producer did not explicitly set
    #[serde(default)]
    pub exclude_unset: bool,
    /// Omit fields whose value is null
    #[serde(default)]
    pub exclude_none: bool,
    /// Omit fields equal to their declared default
    #[serde(default)]
    pub exclude_defaults: bool,
}

impl ShapeDirective {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn exclude<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn exclude_unset(mut self) -> Self {
        self.exclude_unset = true;
        self
    }

    pub fn exclude_none(mut self) -> Self {
        self.exclude_none = true;
        self
    }

    pub fn exclude_defaults(mut self) -> Self {
        self.exclude_defaults = true;
        self
    }

    /// True when the directive filters nothing.
    pub fn is_passthrough(&self) -> bool {
        self.include.is_empty()
            && self.exclude.is_empty()
            && !self.exclude_unset
            && !self.exclude_none
            && !self.exclude_defaults
    }
}

/// Prefix tree of dot-paths. A terminal node selects its whole subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PathTree {
    terminal: bool,
    children: BTreeMap<String, PathTree>,
}

impl PathTree {
    /// Parses a set of dot-paths. Empty paths and empty segments are rejected.
    pub(crate) fn parse<'p>(paths: impl IntoIterator<Item = &'p String>) -> ShapeResult<Self> {
        let mut root = PathTree::default();
        for path in paths {
            let segments: Vec<&str> = path.split('.').collect();
            if segments.iter().any(|s| s.is_empty()) {
                return Err(ShapeError::invalid_path(path.as_str(), "empty path segment"));
            }

            let mut node = &mut root;
            for segment in segments {
                node = node.children.entry(segment.to_string()).or_default();
            }
            node.terminal = true;
        }
        Ok(root)
    }

    pub(crate) fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub(crate) fn child(&self, name: &str) -> Option<&PathTree> {
        self.children.get(name)
    }

    /// Every full path in the tree, segments in order.
    pub(crate) fn paths(&self) -> Vec<Vec<&str>> {
        let mut out = Vec::new();
        self.collect(&mut Vec::new(), &mut out);
        out
    }

    fn collect<'t>(&'t self, prefix: &mut Vec<&'t str>, out: &mut Vec<Vec<&'t str>>) {
        if self.terminal {
            out.push(prefix.clone());
        }
        for (name, child) in &self.children {
            prefix.push(name);
            child.collect(prefix, out);
            prefix.pop();
        }
    }
}
