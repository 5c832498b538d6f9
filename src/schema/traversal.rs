//! Relationship-path resolution.
//!
//! Given an accessor chain such as `Author.books.title`, find the
//! properties that reach it, one per hop. Chains are compared whole, so
//! the search rebuilds candidate chains hop by hop, breadth first, and
//! stops at the first one equal to the target.
//!
//! Results are memoized per schema. Schemas never change after they are
//! built, so cached entries are never invalidated.

use std::collections::VecDeque;

use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::model::AnyKeyPath;
use super::{AnyProperty, AnySchema};

// ============================================================================
// Configuration
// ============================================================================

/// Limits and caching for relationship-path resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Longest chain (in hops) that will be searched. Longer targets are
    /// reported unreachable without searching.
    pub max_depth: usize,
    /// Memoize results per target chain.
    pub cache: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { max_depth: 8, cache: true }
    }
}

impl ResolverConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = false;
        self
    }
}

// ============================================================================
// Cache
// ============================================================================

/// Target chain → resolved properties. Empty vectors record unreachable chains.
#[derive(Default)]
pub(crate) struct PathCache {
    entries: RwLock<HashMap<AnyKeyPath, Vec<AnyProperty>>>,
}

impl PathCache {
    fn get(&self, target: &AnyKeyPath) -> Option<Vec<AnyProperty>> {
        self.entries.read().get(target).cloned()
    }

    /// Racing writers insert equal values, so last-writer-wins is fine.
    fn insert(&self, target: AnyKeyPath, properties: Vec<AnyProperty>) {
        self.entries.write().insert(target, properties);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }
}

// ============================================================================
// Search
// ============================================================================

impl AnySchema {
    /// Resolve `target` to the properties describing each hop, root first.
    ///
    /// Returns an empty vector when the chain cannot be reached from this
    /// schema, including when it is longer than
    /// [`ResolverConfig::max_depth`]. `Schema::resolve` tells the two apart.
    pub fn properties_for(&self, target: impl AsRef<AnyKeyPath>) -> Vec<AnyProperty> {
        let target = target.as_ref();

        if self.config.cache {
            if let Some(hit) = self.cache.get(target) {
                tracing::trace!(schema = %self.name, target = %target, "path cache hit");
                return hit;
            }
        }

        let resolved = self.search(target);
        if self.config.cache {
            self.cache.insert(target.clone(), resolved.clone());
        }
        resolved
    }

    /// Number of memoized chains.
    pub fn cached_paths(&self) -> usize {
        self.cache.len()
    }

    fn search(&self, target: &AnyKeyPath) -> Vec<AnyProperty> {
        if target.root() != self.model {
            tracing::debug!(schema = %self.name, target = %target, "target rooted at another model");
            return Vec::new();
        }

        let depth = target.len();
        if depth > self.config.max_depth {
            tracing::warn!(
                schema = %self.name,
                target = %target,
                depth,
                max_depth = self.config.max_depth,
                "target chain exceeds max_depth"
            );
            return Vec::new();
        }

        let mut frontier: VecDeque<(AnyKeyPath, Vec<AnyProperty>)> = self
            .iter()
            .map(|property| (property.key_path().clone(), vec![property.clone()]))
            .collect();
        let mut visited = 0usize;

        while let Some((chain, path)) = frontier.pop_front() {
            visited += 1;
            if chain == *target {
                tracing::trace!(schema = %self.name, target = %target, visited, "resolved path");
                return path;
            }

            // A candidate already as long as the target can only grow past
            // it. This bound is what terminates the search on cyclic graphs.
            if chain.len() >= depth {
                continue;
            }

            let Some(related) = path.last().and_then(|p| p.property_type().related()) else {
                continue;
            };
            for next in related.schema().iter() {
                let mut extended = path.clone();
                extended.push(next.clone());
                frontier.push_back((chain.appending(next.key_path()), extended));
            }
        }

        tracing::debug!(schema = %self.name, target = %target, visited, "path unreachable");
        Vec::new()
    }
}
